//! Block dispatcher: header validation, tag dispatch, framing checks.

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};

use super::block::{Block, BlockBody, BlockHeader, BlockTag, Container};
use super::error::TopologyError;
use super::layout;
use super::options::DecodeOptions;
use super::reader::TopologyReader;
use super::record::{self, FixedRecord};

/// Decode a whole topology container.
///
/// Blocks are decoded back to back until the input is exhausted. An empty
/// input yields an empty container. Any structural error aborts the run;
/// no partial container is returned. Unsupported block types and control
/// kinds are reported to `sink` and decoding continues.
///
/// # Examples
/// ```
/// use abetopo_core::{DecodeOptions, Diagnostic, decode_container};
///
/// let mut diagnostics: Vec<Diagnostic> = Vec::new();
/// let container = decode_container(&[], &DecodeOptions::default(), &mut diagnostics)?;
/// assert!(container.is_empty());
/// # Ok::<(), abetopo_core::TopologyError>(())
/// ```
///
/// # Errors
/// Returns `TopologyError` for bad signatures, unsupported ABI versions,
/// truncated records, invalid text, and blocks whose body does not end
/// exactly where the header says it should.
pub fn decode_container(
    data: &[u8],
    options: &DecodeOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<Container, TopologyError> {
    Decoder::new(data, options, sink).run()
}

/// Byte range a block body must account for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockFrame {
    /// Offset of the header that opened the frame.
    pub offset: usize,
    pub tag: BlockTag,
    pub body_start: usize,
    pub expected_end: usize,
}

impl BlockFrame {
    fn new(offset: usize, header: &BlockHeader, body_start: usize) -> Self {
        Self {
            offset,
            tag: header.tag,
            body_start,
            expected_end: body_start.saturating_add(header.size as usize),
        }
    }

    /// Re-anchor the frame on an embedded header (coefficient sub-blocks).
    pub fn reframe(&mut self, offset: usize, header: &BlockHeader, body_start: usize) {
        *self = Self::new(offset, header, body_start);
    }

    fn validate(&self, position: usize) -> Result<(), TopologyError> {
        if position != self.expected_end {
            return Err(TopologyError::FramingViolation {
                offset: self.offset,
                tag: self.tag,
                expected: self.expected_end,
                actual: position,
            });
        }
        Ok(())
    }
}

pub(crate) struct Decoder<'a, 's> {
    pub reader: TopologyReader<'a>,
    pub options: &'s DecodeOptions,
    sink: &'s mut dyn DiagnosticSink,
}

impl<'a, 's> Decoder<'a, 's> {
    pub fn new(data: &'a [u8], options: &'s DecodeOptions, sink: &'s mut dyn DiagnosticSink) -> Self {
        Self {
            reader: TopologyReader::new(data),
            options,
            sink,
        }
    }

    fn run(mut self) -> Result<Container, TopologyError> {
        let mut container = Container::default();
        while self.reader.peek(1).is_some() {
            let block = self.decode_block()?;
            container.push(block);
        }
        debug!(blocks = container.len(), "topology decoded");
        Ok(container)
    }

    pub fn decode<T: FixedRecord>(&mut self) -> Result<T, TopologyError> {
        record::decode(&mut self.reader)
    }

    pub fn report(&mut self, offset: usize, kind: DiagnosticKind) {
        self.sink.report(Diagnostic { offset, kind });
    }

    fn decode_block(&mut self) -> Result<Block, TopologyError> {
        let offset = self.reader.position();
        let header = self.decode_block_header()?;
        let mut frame = BlockFrame::new(offset, &header, self.reader.position());
        debug!(
            offset,
            tag = %header.tag,
            size = header.size,
            vendor_type = header.vendor_type,
            "block"
        );

        let body = self.decode_body(&header, &mut frame)?;
        frame.validate(self.reader.position())?;

        Ok(Block {
            offset,
            header,
            body,
        })
    }

    /// Decode and validate a block header at the current position.
    pub fn decode_block_header(&mut self) -> Result<BlockHeader, TopologyError> {
        let offset = self.reader.position();
        let header: BlockHeader = self.decode()?;
        if header.magic != self.options.magic {
            return Err(TopologyError::BadMagic {
                offset,
                expected: self.options.magic,
                found: header.magic,
            });
        }
        if header.abi_version != layout::SUPPORTED_ABI_VERSION {
            return Err(TopologyError::UnsupportedAbi {
                offset,
                version: header.abi_version,
            });
        }
        Ok(header)
    }

    fn decode_body(
        &mut self,
        header: &BlockHeader,
        frame: &mut BlockFrame,
    ) -> Result<BlockBody, TopologyError> {
        match header.tag {
            BlockTag::Mixer => self.decode_mixer_block().map(BlockBody::Mixer),
            BlockTag::DapmGraph => self.decode_dapm_graph_block().map(BlockBody::DapmGraph),
            BlockTag::DapmWidget => self.decode_dapm_widget_block().map(BlockBody::DapmWidget),
            BlockTag::Coeff => self.decode_coefficient_block(header, frame),
            BlockTag::VendorFw => self.decode_vendor_firmware().map(BlockBody::VendorFirmware),
            BlockTag::VendorConfig => self
                .decode_vendor_config(header.size)
                .map(BlockBody::VendorConfig),
            tag => {
                self.report(frame.offset, DiagnosticKind::UnsupportedTag { tag });
                self.skip_body(frame)
            }
        }
    }

    /// Consume whatever is left of the frame without interpreting it.
    pub fn skip_body(&mut self, frame: &BlockFrame) -> Result<BlockBody, TopologyError> {
        let length = frame.expected_end.saturating_sub(self.reader.position());
        self.reader.seek_relative(length, "skipped block body")?;
        Ok(BlockBody::Skipped { length })
    }
}

#[cfg(test)]
mod tests {
    use super::decode_container;
    use crate::diagnostics::{Diagnostic, DiagnosticKind};
    use crate::topology::block::{BlockBody, BlockTag};
    use crate::topology::error::TopologyError;
    use crate::topology::options::DecodeOptions;

    fn header(tag: u32, vendor_type: u32, size: u32) -> Vec<u8> {
        let mut data = b"CoSA".to_vec();
        for word in [1u32, tag, vendor_type, 0, size] {
            data.extend_from_slice(&word.to_le_bytes());
        }
        data
    }

    fn decode(data: &[u8]) -> (Result<usize, TopologyError>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let result = decode_container(data, &DecodeOptions::default(), &mut diagnostics)
            .map(|container| container.len());
        (result, diagnostics)
    }

    #[test]
    fn empty_input_is_empty_container() {
        let (result, diagnostics) = decode(&[]);
        assert_eq!(result.unwrap(), 0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn bad_magic_is_fatal() {
        let mut data = header(1001, 0, 0);
        data[..4].copy_from_slice(b"ASoC");
        let (result, _) = decode(&data);
        assert!(matches!(
            result.unwrap_err(),
            TopologyError::BadMagic {
                offset: 0,
                found: [b'A', b'S', b'o', b'C'],
                ..
            }
        ));
    }

    #[test]
    fn custom_magic_is_honored() {
        let mut data = header(1001, 0, 0);
        data[..4].copy_from_slice(b"ASoC");
        let options = DecodeOptions {
            magic: *b"ASoC",
            ..DecodeOptions::default()
        };
        let mut diagnostics = Vec::new();
        let container = decode_container(&data, &options, &mut diagnostics).unwrap();
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn unsupported_abi_is_fatal() {
        let mut data = header(1001, 0, 0);
        data[4..8].copy_from_slice(&2u32.to_le_bytes());
        let (result, _) = decode(&data);
        assert!(matches!(
            result.unwrap_err(),
            TopologyError::UnsupportedAbi { version: 2, .. }
        ));
    }

    #[test]
    fn truncated_header_is_fatal() {
        let data = header(1001, 0, 0);
        let (result, _) = decode(&data[..10]);
        assert!(matches!(
            result.unwrap_err(),
            TopologyError::TruncatedRecord {
                offset: 0,
                record: "block header",
                ..
            }
        ));
    }

    #[test]
    fn trailing_partial_block_is_an_error() {
        let mut data = header(1001, 0, 2);
        data.extend_from_slice(&[1, 2]);
        data.extend_from_slice(&[0u8; 5]);
        let (result, _) = decode(&data);
        assert!(matches!(
            result.unwrap_err(),
            TopologyError::TruncatedRecord { offset: 26, .. }
        ));
    }

    #[test]
    fn unknown_tag_is_skipped_with_diagnostic() {
        let mut data = header(4, 0, 6);
        data.extend_from_slice(&[0xaa; 6]);
        data.extend_from_slice(&header(1001, 0, 1));
        data.push(0x55);

        let mut diagnostics = Vec::new();
        let container =
            decode_container(&data, &DecodeOptions::default(), &mut diagnostics).unwrap();
        assert_eq!(container.len(), 2);
        assert!(matches!(
            container.blocks()[0].body,
            BlockBody::Skipped { length: 6 }
        ));
        assert_eq!(container.blocks()[1].offset, 30);
        assert_eq!(
            diagnostics,
            vec![Diagnostic {
                offset: 0,
                kind: DiagnosticKind::UnsupportedTag {
                    tag: BlockTag::DaiLink
                },
            }]
        );
    }

    #[test]
    fn skipped_body_beyond_input_is_truncated() {
        let mut data = header(77, 0, 100);
        data.extend_from_slice(&[0u8; 4]);
        let (result, diagnostics) = decode(&data);
        assert!(matches!(
            result.unwrap_err(),
            TopologyError::TruncatedRecord { offset: 24, .. }
        ));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn body_shorter_than_declared_size_violates_framing() {
        // Vendor firmware header with all-zero segment sizes but 4 extra
        // declared bytes.
        let mut data = header(1000, 0, 24);
        data.extend_from_slice(&[0u8; 24]);
        let (result, _) = decode(&data);
        assert!(matches!(
            result.unwrap_err(),
            TopologyError::FramingViolation {
                offset: 0,
                tag: BlockTag::VendorFw,
                expected: 48,
                actual: 44,
            }
        ));
    }
}
