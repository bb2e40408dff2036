//! Wire layout of the ABE topology container (source of truth).
//!
//! Every fixed-size record is described as an ordered field table. The
//! generic decoder in `record` walks these tables; no other module does
//! byte-offset arithmetic on fixed records. All integers are little-endian
//! and records are packed.

/// ASoC firmware signature `0x41536F43` as stored on disk (little-endian).
pub const SND_SOC_FW_MAGIC: [u8; 4] = *b"CoSA";
pub const SUPPORTED_ABI_VERSION: u32 = 1;

pub const TEXT_SIZE: usize = 32;
pub const ENUM_NUM_TEXTS: usize = 16;
/// Width of the enumerated-control value area, in 32-bit words.
pub const ENUM_VALUE_WORDS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U32,
    I32,
    /// Single byte, non-zero is `true`.
    Bool,
    /// Raw byte array kept as-is (signatures).
    Bytes(usize),
    /// NUL-padded UTF-8 of the given width.
    Text(usize),
    /// `count` consecutive NUL-padded UTF-8 slots of `width` bytes each.
    TextArray { count: usize, width: usize },
    U32Array(usize),
    /// Consumed and dropped.
    Padding(usize),
}

impl FieldKind {
    pub const fn width(self) -> usize {
        match self {
            FieldKind::U32 | FieldKind::I32 => 4,
            FieldKind::Bool => 1,
            FieldKind::Bytes(len) | FieldKind::Text(len) | FieldKind::Padding(len) => len,
            FieldKind::TextArray { count, width } => count * width,
            FieldKind::U32Array(len) => len * 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

#[derive(Debug)]
pub struct RecordLayout {
    /// Record name used in error messages.
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut idx = 0;
        while idx < self.fields.len() {
            total += self.fields[idx].kind.width();
            idx += 1;
        }
        total
    }
}

pub const BLOCK_HEADER: RecordLayout = RecordLayout {
    name: "block header",
    fields: &[
        field("magic", FieldKind::Bytes(4)),
        field("abi", FieldKind::U32),
        field("type", FieldKind::U32),
        field("vendor_type", FieldKind::U32),
        field("vendor_version", FieldKind::U32),
        field("size", FieldKind::U32),
    ],
};

pub const ELEMENT_COUNT: RecordLayout = RecordLayout {
    name: "element count",
    fields: &[field("count", FieldKind::U32)],
};

pub const CONTROL_HEADER: RecordLayout = RecordLayout {
    name: "control header",
    fields: &[
        field("name", FieldKind::Text(TEXT_SIZE)),
        field("index", FieldKind::U32),
        field("access", FieldKind::U32),
        field("tlv_size", FieldKind::U32),
    ],
};

pub const MIXER_CONTROL: RecordLayout = RecordLayout {
    name: "mixer control",
    fields: &[
        field("min", FieldKind::U32),
        field("max", FieldKind::U32),
        field("platform_max", FieldKind::U32),
        field("reg", FieldKind::U32),
        field("rreg", FieldKind::U32),
        field("shift", FieldKind::U32),
        field("rshift", FieldKind::U32),
        field("invert", FieldKind::U32),
    ],
};

pub const CONTROL_TLV: RecordLayout = RecordLayout {
    name: "control TLV",
    fields: &[
        field("numid", FieldKind::U32),
        field("length", FieldKind::U32),
    ],
};

pub const ENUM_CONTROL: RecordLayout = RecordLayout {
    name: "enum control",
    fields: &[
        field("reg", FieldKind::U32),
        field("reg2", FieldKind::U32),
        field("shift_l", FieldKind::U32),
        field("shift_r", FieldKind::U32),
        field("max", FieldKind::U32),
        field("mask", FieldKind::U32),
        field("count", FieldKind::U32),
        field(
            "texts",
            FieldKind::TextArray {
                count: ENUM_NUM_TEXTS,
                width: TEXT_SIZE,
            },
        ),
        field("values", FieldKind::U32Array(ENUM_NUM_TEXTS)),
        field(
            "reserved",
            FieldKind::Padding((ENUM_VALUE_WORDS - ENUM_NUM_TEXTS) * 4),
        ),
    ],
};

pub const DAPM_GRAPH_ELEM: RecordLayout = RecordLayout {
    name: "DAPM graph element",
    fields: &[
        field("sink", FieldKind::Text(TEXT_SIZE)),
        field("control", FieldKind::Text(TEXT_SIZE)),
        field("source", FieldKind::Text(TEXT_SIZE)),
    ],
};

pub const DAPM_WIDGET: RecordLayout = RecordLayout {
    name: "DAPM widget",
    fields: &[
        field("id", FieldKind::U32),
        field("name", FieldKind::Text(TEXT_SIZE)),
        field("sname", FieldKind::Text(TEXT_SIZE)),
        field("reg", FieldKind::I32),
        field("shift", FieldKind::U32),
        field("mask", FieldKind::U32),
        field("invert", FieldKind::Bool),
        field("ignore_suspend", FieldKind::Bool),
        field("pad", FieldKind::Padding(2)),
        field("kcontrol_count", FieldKind::U32),
    ],
};

pub const COEFF_DATA: RecordLayout = RecordLayout {
    name: "coefficient data",
    fields: &[
        field("count", FieldKind::U32),
        field("size", FieldKind::U32),
        field("id", FieldKind::U32),
    ],
};

pub const ABE_FIRMWARE_HEADER: RecordLayout = RecordLayout {
    name: "ABE firmware header",
    fields: &[
        field("version", FieldKind::U32),
        field("pmem_size", FieldKind::U32),
        field("cmem_size", FieldKind::U32),
        field("dmem_size", FieldKind::U32),
        field("smem_size", FieldKind::U32),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes_match_wire_format() {
        assert_eq!(BLOCK_HEADER.size(), 24);
        assert_eq!(ELEMENT_COUNT.size(), 4);
        assert_eq!(CONTROL_HEADER.size(), 44);
        assert_eq!(MIXER_CONTROL.size(), 32);
        assert_eq!(CONTROL_TLV.size(), 8);
        assert_eq!(ENUM_CONTROL.size(), 1052);
        assert_eq!(DAPM_GRAPH_ELEM.size(), 96);
        assert_eq!(DAPM_WIDGET.size(), 88);
        assert_eq!(COEFF_DATA.size(), 12);
        assert_eq!(ABE_FIRMWARE_HEADER.size(), 20);
    }

    #[test]
    fn field_names_are_unique_per_layout() {
        for layout in [
            &BLOCK_HEADER,
            &CONTROL_HEADER,
            &ENUM_CONTROL,
            &DAPM_WIDGET,
            &ABE_FIRMWARE_HEADER,
        ] {
            for (idx, spec) in layout.fields.iter().enumerate() {
                let dup = layout.fields[idx + 1..]
                    .iter()
                    .any(|other| other.name == spec.name);
                assert!(!dup, "duplicate field {} in {}", spec.name, layout.name);
            }
        }
    }
}
