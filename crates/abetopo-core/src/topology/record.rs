//! Generic fixed-record decoding driven by the tables in `layout`.

use super::error::TopologyError;
use super::layout::{FieldKind, RecordLayout};
use super::reader::TopologyReader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    U32(u32),
    I32(i32),
    Bool(bool),
    Bytes(Vec<u8>),
    Text(String),
    TextArray(Vec<String>),
    U32Array(Vec<u32>),
}

/// A fixed record decoded field by field, in layout order.
#[derive(Debug)]
pub struct RawRecord {
    layout: &'static RecordLayout,
    offset: usize,
    values: Vec<(&'static str, FieldValue)>,
}

impl RawRecord {
    /// Offset of the first byte of the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn field(&self, name: &'static str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    fn missing(&self, field: &'static str, kind: &'static str) -> TopologyError {
        TopologyError::MissingField {
            offset: self.offset,
            record: self.layout.name,
            field,
            kind,
        }
    }

    pub fn u32(&self, name: &'static str) -> Result<u32, TopologyError> {
        match self.field(name) {
            Some(FieldValue::U32(value)) => Ok(*value),
            _ => Err(self.missing(name, "u32")),
        }
    }

    pub fn i32(&self, name: &'static str) -> Result<i32, TopologyError> {
        match self.field(name) {
            Some(FieldValue::I32(value)) => Ok(*value),
            _ => Err(self.missing(name, "i32")),
        }
    }

    pub fn bool(&self, name: &'static str) -> Result<bool, TopologyError> {
        match self.field(name) {
            Some(FieldValue::Bool(value)) => Ok(*value),
            _ => Err(self.missing(name, "bool")),
        }
    }

    pub fn bytes<const N: usize>(&self, name: &'static str) -> Result<[u8; N], TopologyError> {
        match self.field(name) {
            Some(FieldValue::Bytes(value)) => value
                .as_slice()
                .try_into()
                .map_err(|_| self.missing(name, "byte array")),
            _ => Err(self.missing(name, "byte array")),
        }
    }

    pub fn text(&self, name: &'static str) -> Result<String, TopologyError> {
        match self.field(name) {
            Some(FieldValue::Text(value)) => Ok(value.clone()),
            _ => Err(self.missing(name, "text")),
        }
    }

    pub fn texts(&self, name: &'static str) -> Result<Vec<String>, TopologyError> {
        match self.field(name) {
            Some(FieldValue::TextArray(value)) => Ok(value.clone()),
            _ => Err(self.missing(name, "text array")),
        }
    }

    pub fn u32s(&self, name: &'static str) -> Result<Vec<u32>, TopologyError> {
        match self.field(name) {
            Some(FieldValue::U32Array(value)) => Ok(value.clone()),
            _ => Err(self.missing(name, "u32 array")),
        }
    }
}

/// A typed record with a fixed wire layout.
pub trait FixedRecord: Sized {
    const LAYOUT: &'static RecordLayout;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError>;
}

/// Decode one typed record at the reader position.
pub fn decode<T: FixedRecord>(reader: &mut TopologyReader<'_>) -> Result<T, TopologyError> {
    let record = decode_raw(reader, T::LAYOUT)?;
    T::from_record(&record)
}

/// Decode `layout` at the reader position, consuming exactly
/// `layout.size()` bytes.
///
/// The whole record must be available up front; a short input fails with
/// `TruncatedRecord` before any field is interpreted.
pub fn decode_raw(
    reader: &mut TopologyReader<'_>,
    layout: &'static RecordLayout,
) -> Result<RawRecord, TopologyError> {
    let offset = reader.position();
    let bytes = reader.read(layout.size(), layout.name)?;

    let mut values = Vec::with_capacity(layout.fields.len());
    let mut cursor = 0usize;
    for spec in layout.fields {
        let width = spec.kind.width();
        let raw = &bytes[cursor..cursor + width];
        let field_offset = offset + cursor;
        cursor += width;

        let value = match spec.kind {
            FieldKind::U32 => FieldValue::U32(le_u32(raw)),
            FieldKind::I32 => FieldValue::I32(le_u32(raw) as i32),
            FieldKind::Bool => FieldValue::Bool(raw[0] != 0),
            FieldKind::Bytes(_) => FieldValue::Bytes(raw.to_vec()),
            FieldKind::Text(_) => {
                FieldValue::Text(decode_text(raw, layout.name, spec.name, field_offset)?)
            }
            FieldKind::TextArray { width, .. } => FieldValue::TextArray(
                raw.chunks_exact(width)
                    .enumerate()
                    .map(|(idx, slot)| {
                        decode_text(slot, layout.name, spec.name, field_offset + idx * width)
                    })
                    .collect::<Result<_, _>>()?,
            ),
            FieldKind::U32Array(_) => FieldValue::U32Array(raw.chunks_exact(4).map(le_u32).collect()),
            FieldKind::Padding(_) => continue,
        };
        values.push((spec.name, value));
    }

    Ok(RawRecord {
        layout,
        offset,
        values,
    })
}

fn le_u32(raw: &[u8]) -> u32 {
    u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])
}

/// Decode a NUL-padded UTF-8 field, dropping trailing NULs only.
fn decode_text(
    raw: &[u8],
    record: &'static str,
    field: &'static str,
    offset: usize,
) -> Result<String, TopologyError> {
    let text = std::str::from_utf8(raw).map_err(|_| TopologyError::InvalidText {
        offset,
        record,
        field,
    })?;
    Ok(text.trim_end_matches('\0').to_string())
}
