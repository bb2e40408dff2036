//! Top-level framing: block header, tags, and the decoded container.

use serde::{Serialize, Serializer};

use crate::encoding::{self, Coded};

use super::control::MixerBlock;
use super::dapm::{DapmGraphBlock, DapmWidgetBlock};
use super::error::TopologyError;
use super::layout;
use super::record::{FixedRecord, RawRecord};
use super::vendor::{CoefficientBlock, VendorConfigBlob, VendorFirmwareImage};

/// Block type carried in the header `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockTag {
    Mixer,
    DapmGraph,
    DapmWidget,
    DaiLink,
    Coeff,
    VendorFw,
    VendorConfig,
    VendorCoeff,
    VendorCodec,
    Unknown(u32),
}

impl BlockTag {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => BlockTag::Mixer,
            2 => BlockTag::DapmGraph,
            3 => BlockTag::DapmWidget,
            4 => BlockTag::DaiLink,
            5 => BlockTag::Coeff,
            1000 => BlockTag::VendorFw,
            1001 => BlockTag::VendorConfig,
            1002 => BlockTag::VendorCoeff,
            1003 => BlockTag::VendorCodec,
            other => BlockTag::Unknown(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            BlockTag::Mixer => 1,
            BlockTag::DapmGraph => 2,
            BlockTag::DapmWidget => 3,
            BlockTag::DaiLink => 4,
            BlockTag::Coeff => 5,
            BlockTag::VendorFw => 1000,
            BlockTag::VendorConfig => 1001,
            BlockTag::VendorCoeff => 1002,
            BlockTag::VendorCodec => 1003,
            BlockTag::Unknown(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockTag::Mixer => "SND_SOC_FW_MIXER",
            BlockTag::DapmGraph => "SND_SOC_FW_DAPM_GRAPH",
            BlockTag::DapmWidget => "SND_SOC_FW_DAPM_WIDGET",
            BlockTag::DaiLink => "SND_SOC_FW_DAI_LINK",
            BlockTag::Coeff => "SND_SOC_FW_COEFF",
            BlockTag::VendorFw => "SND_SOC_FW_VENDOR_FW",
            BlockTag::VendorConfig => "SND_SOC_FW_VENDOR_CONFIG",
            BlockTag::VendorCoeff => "SND_SOC_FW_VENDOR_COEFF",
            BlockTag::VendorCodec => "SND_SOC_FW_VENDOR_CODEC",
            BlockTag::Unknown(_) => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for BlockTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Coded {
            value: self.code(),
            name: self.name(),
        }
        .serialize(serializer)
    }
}

/// Fixed 24-byte header in front of every block.
///
/// The header is decoded as-is; magic and ABI checks happen in the parser so
/// that the caller decides which signature is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    #[serde(serialize_with = "encoding::signature")]
    pub magic: [u8; 4],
    pub abi_version: u32,
    pub tag: BlockTag,
    pub vendor_type: u32,
    pub vendor_version: u32,
    /// Payload bytes that follow the header.
    pub size: u32,
}

impl FixedRecord for BlockHeader {
    const LAYOUT: &'static layout::RecordLayout = &layout::BLOCK_HEADER;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            magic: record.bytes("magic")?,
            abi_version: record.u32("abi")?,
            tag: BlockTag::from_code(record.u32("type")?),
            vendor_type: record.u32("vendor_type")?,
            vendor_version: record.u32("vendor_version")?,
            size: record.u32("size")?,
        })
    }
}

/// Decoded payload of one block.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockBody {
    Mixer(MixerBlock),
    DapmGraph(DapmGraphBlock),
    DapmWidget(DapmWidgetBlock),
    Coefficients(CoefficientBlock),
    VendorFirmware(VendorFirmwareImage),
    VendorConfig(VendorConfigBlob),
    /// Payload of an unsupported block, skipped without interpretation.
    Skipped { length: usize },
}

/// One tagged, length-framed unit of the container.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// Offset of the block header in the input.
    pub offset: usize,
    #[serde(flatten)]
    pub header: BlockHeader,
    pub body: BlockBody,
}

/// Ordered blocks of one decoded container.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Container {
    blocks: Vec<Block>,
}

impl Container {
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockBody, BlockHeader, BlockTag};
    use crate::topology::reader::TopologyReader;
    use crate::topology::record::decode;

    #[test]
    fn tag_codes_round_trip() {
        for code in [1u32, 2, 3, 4, 5, 1000, 1001, 1002, 1003, 7, 999] {
            assert_eq!(BlockTag::from_code(code).code(), code);
        }
        assert_eq!(BlockTag::from_code(7), BlockTag::Unknown(7));
        assert_eq!(BlockTag::VendorFw.name(), "SND_SOC_FW_VENDOR_FW");
    }

    #[test]
    fn header_decodes_fields() {
        let mut data = b"CoSA".to_vec();
        for word in [1u32, 1000, 0, 3, 20] {
            data.extend_from_slice(&word.to_le_bytes());
        }
        let mut reader = TopologyReader::new(&data);
        let header: BlockHeader = decode(&mut reader).unwrap();
        assert_eq!(header.magic, *b"CoSA");
        assert_eq!(header.abi_version, 1);
        assert_eq!(header.tag, BlockTag::VendorFw);
        assert_eq!(header.vendor_version, 3);
        assert_eq!(header.size, 20);
        assert_eq!(reader.position(), 24);
    }

    #[test]
    fn skipped_body_serializes_with_kind() {
        let value = serde_json::to_value(BlockBody::Skipped { length: 8 }).unwrap();
        assert_eq!(value["kind"], "skipped");
        assert_eq!(value["length"], 8);
    }
}
