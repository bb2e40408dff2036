//! Coefficient tables and ABE vendor payloads.

use serde::Serialize;
use tracing::debug;

use crate::diagnostics::DiagnosticKind;
use crate::encoding;

use super::block::{BlockBody, BlockHeader};
use super::control::{Control, ControlBody, ControlHeader, ElementCount};
use super::error::TopologyError;
use super::kind::ControlShape;
use super::layout;
use super::parser::{BlockFrame, Decoder};
use super::record::{FixedRecord, RawRecord};

/// Equal-size coefficient chunks described by a `{count, size, id}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoefficientSet {
    pub count: u32,
    /// Total byte size of all chunks.
    pub size: u32,
    pub id: u32,
    #[serde(serialize_with = "encoding::base64_chunks")]
    pub values: Vec<Vec<u8>>,
}

impl CoefficientSet {
    /// Bytes per chunk (`size / count`, zero when `count` is zero).
    pub fn chunk_size(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            (self.size / self.count) as usize
        }
    }
}

impl FixedRecord for CoefficientSet {
    const LAYOUT: &'static layout::RecordLayout = &layout::COEFF_DATA;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            count: record.u32("count")?,
            size: record.u32("size")?,
            id: record.u32("id")?,
            values: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoefficientBlock {
    /// Number of new coefficient controls announced by the block.
    pub count: u32,
    pub control: Control,
    /// Embedded header that frames the coefficient data.
    pub data_header: BlockHeader,
    pub data: CoefficientSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorFirmwareImage {
    pub version: u32,
    pub pmem_size: u32,
    pub cmem_size: u32,
    pub dmem_size: u32,
    pub smem_size: u32,
    #[serde(serialize_with = "encoding::base64")]
    pub pmem: Vec<u8>,
    #[serde(serialize_with = "encoding::base64")]
    pub cmem: Vec<u8>,
    #[serde(serialize_with = "encoding::base64")]
    pub dmem: Vec<u8>,
    #[serde(serialize_with = "encoding::base64")]
    pub smem: Vec<u8>,
}

impl FixedRecord for VendorFirmwareImage {
    const LAYOUT: &'static layout::RecordLayout = &layout::ABE_FIRMWARE_HEADER;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            version: record.u32("version")?,
            pmem_size: record.u32("pmem_size")?,
            cmem_size: record.u32("cmem_size")?,
            dmem_size: record.u32("dmem_size")?,
            smem_size: record.u32("smem_size")?,
            pmem: Vec::new(),
            cmem: Vec::new(),
            dmem: Vec::new(),
            smem: Vec::new(),
        })
    }
}

/// Opaque ABE configuration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorConfigBlob {
    #[serde(serialize_with = "encoding::base64")]
    pub data: Vec<u8>,
}

impl Decoder<'_, '_> {
    /// Coefficient block: control count, one control, then an embedded
    /// sub-block whose header replaces the outer frame.
    pub(crate) fn decode_coefficient_block(
        &mut self,
        header: &BlockHeader,
        frame: &mut BlockFrame,
    ) -> Result<BlockBody, TopologyError> {
        if header.vendor_type != 0 {
            self.report(
                frame.offset,
                DiagnosticKind::UnsupportedVendorType {
                    tag: header.tag,
                    vendor_type: header.vendor_type,
                },
            );
            return self.skip_body(frame);
        }

        let count = self.decode::<ElementCount>()?.count;
        debug!(count, "new coefficients");

        let control_offset = self.reader.position();
        let control_header: ControlHeader = self.decode()?;
        let body = match control_header.shape() {
            ControlShape::Enumerated => ControlBody::Enumerated(self.decode_enum_control()?),
            _ => {
                self.report(
                    control_offset,
                    DiagnosticKind::IgnoredCoefficientControl {
                        control: control_header.control_type(),
                    },
                );
                ControlBody::Unsupported
            }
        };

        let data_offset = self.reader.position();
        let data_header = self.decode_block_header()?;
        frame.reframe(data_offset, &data_header, self.reader.position());

        let mut data: CoefficientSet = self.decode()?;
        let chunk_size = data.chunk_size();
        // Zero-byte chunks carry nothing; `count` alone is kept.
        if chunk_size > 0 {
            let chunks = data.count as usize;
            self.reader
                .require_len(chunk_size * chunks, "coefficient chunks")?;
            data.values.reserve_exact(chunks);
            for _ in 0..chunks {
                data.values
                    .push(self.reader.read_vec(chunk_size, "coefficient chunk")?);
            }
        }
        debug!(id = data.id, size = data.size, count = data.count, "coefficient data");

        Ok(BlockBody::Coefficients(CoefficientBlock {
            count,
            control: Control {
                header: control_header,
                body,
            },
            data_header,
            data,
        }))
    }

    /// ABE firmware: header, then pmem, cmem, dmem and smem in that order.
    pub(crate) fn decode_vendor_firmware(&mut self) -> Result<VendorFirmwareImage, TopologyError> {
        let mut image: VendorFirmwareImage = self.decode()?;
        image.pmem = self.reader.read_vec(image.pmem_size as usize, "ABE pmem")?;
        image.cmem = self.reader.read_vec(image.cmem_size as usize, "ABE cmem")?;
        image.dmem = self.reader.read_vec(image.dmem_size as usize, "ABE dmem")?;
        image.smem = self.reader.read_vec(image.smem_size as usize, "ABE smem")?;
        debug!(
            version = image.version,
            pmem = image.pmem_size,
            cmem = image.cmem_size,
            dmem = image.dmem_size,
            smem = image.smem_size,
            "ABE firmware"
        );
        Ok(image)
    }

    pub(crate) fn decode_vendor_config(&mut self, size: u32) -> Result<VendorConfigBlob, TopologyError> {
        debug!(size, "ABE config");
        let data = self.reader.read_vec(size as usize, "ABE config")?;
        Ok(VendorConfigBlob { data })
    }
}
