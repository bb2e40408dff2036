//! JSON encoding helpers shared by the decoded tree.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Serialize, Serializer};

/// Enum code exposed with both its numeric value and symbolic name.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct Coded {
    pub value: u32,
    pub name: &'static str,
}

/// Serialize a byte blob as a standard base64 string.
pub(crate) fn base64<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&BASE64.encode(bytes.as_ref()))
}

/// Serialize a list of byte blobs as a list of base64 strings.
pub(crate) fn base64_chunks<S>(chunks: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(chunks.iter().map(|chunk| BASE64.encode(chunk)))
}

/// Serialize a 4-byte signature as text, replacing invalid UTF-8.
pub(crate) fn signature<S>(magic: &[u8; 4], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&String::from_utf8_lossy(magic))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        #[serde(serialize_with = "super::base64")]
        blob: Vec<u8>,
        #[serde(serialize_with = "super::base64_chunks")]
        chunks: Vec<Vec<u8>>,
        #[serde(serialize_with = "super::signature")]
        magic: [u8; 4],
    }

    #[test]
    fn blobs_encode_as_base64() {
        let sample = Sample {
            blob: vec![0xde, 0xad, 0xbe, 0xef],
            chunks: vec![vec![1, 2], vec![]],
            magic: *b"CoSA",
        };
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value["blob"], "3q2+7w==");
        assert_eq!(value["chunks"][0], "AQI=");
        assert_eq!(value["chunks"][1], "");
        assert_eq!(value["magic"], "CoSA");
    }
}
