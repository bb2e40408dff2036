//! Control type codes and the control-kind classifier.
//!
//! A control header's `index & 0xff` names the kernel control type. The
//! classifier reduces that code to the sub-record shape that follows the
//! header on the wire.

use serde::{Serialize, Serializer};

use crate::encoding::Coded;

/// Shape of the record that follows a control header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlShape {
    Scalar,
    Enumerated,
    Unsupported(u8),
}

/// Map a control type code to the record shape it selects.
///
/// # Examples
/// ```
/// use abetopo_core::topology::{ControlShape, classify_control};
///
/// assert_eq!(classify_control(1), ControlShape::Scalar);
/// assert_eq!(classify_control(66), ControlShape::Enumerated);
/// assert_eq!(classify_control(0), ControlShape::Unsupported(0));
/// ```
pub fn classify_control(code: u8) -> ControlShape {
    match code {
        1 | 2 | 3 | 4 | 8 | 9 | 11 | 12 | 64 | 68 => ControlShape::Scalar,
        6 | 7 | 10 | 65 | 66 | 67 | 69 => ControlShape::Enumerated,
        other => ControlShape::Unsupported(other),
    }
}

/// Kernel control type carried in the low byte of a control index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlType {
    Ext,
    Volsw,
    VolswSx,
    VolswS8,
    VolswXrSx,
    Enum,
    EnumExt,
    Bytes,
    BoolExt,
    EnumValue,
    Range,
    Strobe,
    DapmVolsw,
    DapmEnumDouble,
    DapmEnumVirt,
    DapmEnumValue,
    DapmPin,
    DapmEnumExt,
    Unknown(u8),
}

impl ControlType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ControlType::Ext,
            1 => ControlType::Volsw,
            2 => ControlType::VolswSx,
            3 => ControlType::VolswS8,
            4 => ControlType::VolswXrSx,
            6 => ControlType::Enum,
            7 => ControlType::EnumExt,
            8 => ControlType::Bytes,
            9 => ControlType::BoolExt,
            10 => ControlType::EnumValue,
            11 => ControlType::Range,
            12 => ControlType::Strobe,
            64 => ControlType::DapmVolsw,
            65 => ControlType::DapmEnumDouble,
            66 => ControlType::DapmEnumVirt,
            67 => ControlType::DapmEnumValue,
            68 => ControlType::DapmPin,
            69 => ControlType::DapmEnumExt,
            other => ControlType::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ControlType::Ext => 0,
            ControlType::Volsw => 1,
            ControlType::VolswSx => 2,
            ControlType::VolswS8 => 3,
            ControlType::VolswXrSx => 4,
            ControlType::Enum => 6,
            ControlType::EnumExt => 7,
            ControlType::Bytes => 8,
            ControlType::BoolExt => 9,
            ControlType::EnumValue => 10,
            ControlType::Range => 11,
            ControlType::Strobe => 12,
            ControlType::DapmVolsw => 64,
            ControlType::DapmEnumDouble => 65,
            ControlType::DapmEnumVirt => 66,
            ControlType::DapmEnumValue => 67,
            ControlType::DapmPin => 68,
            ControlType::DapmEnumExt => 69,
            ControlType::Unknown(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlType::Ext => "CONTROL_EXT",
            ControlType::Volsw => "CONTROL_VOLSW",
            ControlType::VolswSx => "CONTROL_VOLSW_SX",
            ControlType::VolswS8 => "CONTROL_VOLSW_S8",
            ControlType::VolswXrSx => "CONTROL_VOLSW_XR_SX",
            ControlType::Enum => "CONTROL_ENUM",
            ControlType::EnumExt => "CONTROL_ENUM_EXT",
            ControlType::Bytes => "CONTROL_BYTES",
            ControlType::BoolExt => "CONTROL_BOOL_EXT",
            ControlType::EnumValue => "CONTROL_ENUM_VALUE",
            ControlType::Range => "CONTROL_RANGE",
            ControlType::Strobe => "CONTROL_STROBE",
            ControlType::DapmVolsw => "DAPM_VOLSW",
            ControlType::DapmEnumDouble => "DAPM_ENUM_DOUBLE",
            ControlType::DapmEnumVirt => "DAPM_ENUM_VIRT",
            ControlType::DapmEnumValue => "DAPM_ENUM_VALUE",
            ControlType::DapmPin => "DAPM_PIN",
            ControlType::DapmEnumExt => "DAPM_ENUM_EXT",
            ControlType::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn shape(self) -> ControlShape {
        classify_control(self.code())
    }
}

impl std::fmt::Display for ControlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl Serialize for ControlType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Coded {
            value: u32::from(self.code()),
            name: self.name(),
        }
        .serialize(serializer)
    }
}
