use thiserror::Error;

use super::block::BlockTag;

/// Fatal errors returned by topology decoding.
///
/// Every variant carries the byte offset at which decoding stopped; see
/// [`TopologyError::offset`].
///
/// # Examples
/// ```
/// use abetopo_core::TopologyError;
///
/// let err = TopologyError::UnsupportedAbi { offset: 0, version: 2 };
/// assert!(err.to_string().contains("unsupported ABI version 2"));
/// assert_eq!(err.offset(), 0);
/// ```
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("bad block magic at offset {offset:#x}: expected {expected:02x?}, got {found:02x?}")]
    BadMagic {
        offset: usize,
        expected: [u8; 4],
        found: [u8; 4],
    },
    #[error("unsupported ABI version {version} at offset {offset:#x}")]
    UnsupportedAbi { offset: usize, version: u32 },
    #[error("truncated {record} at offset {offset:#x}: need {needed} bytes, got {available}")]
    TruncatedRecord {
        offset: usize,
        record: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("invalid UTF-8 in {record} field `{field}` at offset {offset:#x}")]
    InvalidText {
        offset: usize,
        record: &'static str,
        field: &'static str,
    },
    #[error(
        "framing violation in {tag} block at offset {offset:#x}: body should end at {expected:#x}, decoder stopped at {actual:#x}"
    )]
    FramingViolation {
        offset: usize,
        tag: BlockTag,
        expected: usize,
        actual: usize,
    },
    #[error("{record} layout has no {kind} field `{field}` (record at offset {offset:#x})")]
    MissingField {
        offset: usize,
        record: &'static str,
        field: &'static str,
        kind: &'static str,
    },
}

impl TopologyError {
    /// Byte offset into the input at which the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            TopologyError::BadMagic { offset, .. }
            | TopologyError::UnsupportedAbi { offset, .. }
            | TopologyError::TruncatedRecord { offset, .. }
            | TopologyError::InvalidText { offset, .. }
            | TopologyError::FramingViolation { offset, .. }
            | TopologyError::MissingField { offset, .. } => *offset,
        }
    }
}
