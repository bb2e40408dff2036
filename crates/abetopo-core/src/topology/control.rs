//! Kcontrol records: headers, scalar mixers, TLVs, enumerated tables.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use tracing::debug;

use crate::diagnostics::{ControlContext, DiagnosticKind};
use crate::encoding;

use super::error::TopologyError;
use super::kind::{ControlShape, ControlType};
use super::layout;
use super::parser::Decoder;
use super::record::{FixedRecord, RawRecord};

/// Leading `count` word of mixer, graph, widget and coefficient blocks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementCount {
    pub count: u32,
}

impl FixedRecord for ElementCount {
    const LAYOUT: &'static layout::RecordLayout = &layout::ELEMENT_COUNT;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            count: record.u32("count")?,
        })
    }
}

/// Common header in front of every control record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHeader {
    pub name: String,
    pub index: u32,
    pub access_flags: u32,
    /// Non-zero when a TLV follows a scalar mixer record.
    pub tlv_size: u32,
}

impl ControlHeader {
    /// Control type derived from the low byte of `index`.
    pub fn control_type(&self) -> ControlType {
        ControlType::from_code((self.index & 0xff) as u8)
    }

    pub fn shape(&self) -> ControlShape {
        self.control_type().shape()
    }
}

impl FixedRecord for ControlHeader {
    const LAYOUT: &'static layout::RecordLayout = &layout::CONTROL_HEADER;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            name: record.text("name")?,
            index: record.u32("index")?,
            access_flags: record.u32("access")?,
            tlv_size: record.u32("tlv_size")?,
        })
    }
}

impl Serialize for ControlHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ControlHeader", 5)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("access_flags", &self.access_flags)?;
        state.serialize_field("tlv_size", &self.tlv_size)?;
        state.serialize_field("control_type", &self.control_type())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlTlv {
    pub numid: u32,
    pub length: u32,
    #[serde(serialize_with = "encoding::base64")]
    pub value: Vec<u8>,
}

impl FixedRecord for ControlTlv {
    const LAYOUT: &'static layout::RecordLayout = &layout::CONTROL_TLV;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            numid: record.u32("numid")?,
            length: record.u32("length")?,
            value: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarMixerControl {
    pub min: u32,
    pub max: u32,
    pub platform_max: u32,
    pub reg: u32,
    pub rreg: u32,
    pub shift: u32,
    pub rshift: u32,
    pub invert: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlv: Option<ControlTlv>,
}

impl FixedRecord for ScalarMixerControl {
    const LAYOUT: &'static layout::RecordLayout = &layout::MIXER_CONTROL;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            min: record.u32("min")?,
            max: record.u32("max")?,
            platform_max: record.u32("platform_max")?,
            reg: record.u32("reg")?,
            rreg: record.u32("rreg")?,
            shift: record.u32("shift")?,
            rshift: record.u32("rshift")?,
            invert: record.u32("invert")?,
            tlv: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub label: String,
    pub value: u32,
}

/// Text/value table of an enumerated control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnumEntries {
    /// Non-empty slots only, exported as a `label -> value` map.
    Labeled {
        #[serde(serialize_with = "serialize_labeled")]
        values: Vec<EnumEntry>,
    },
    /// Every slot, blank labels included, as parallel lists.
    Slots { texts: Vec<String>, values: Vec<u32> },
}

impl EnumEntries {
    /// Drop blank slots, pairing the remaining labels with their values.
    ///
    /// A label repeated in the table keeps its first position and takes the
    /// value of its last slot.
    pub fn labeled(self) -> Self {
        match self {
            EnumEntries::Slots { texts, values } => {
                let mut entries: Vec<EnumEntry> = Vec::new();
                for (label, value) in texts.into_iter().zip(values) {
                    if label.is_empty() {
                        continue;
                    }
                    match entries.iter_mut().find(|entry| entry.label == label) {
                        Some(entry) => entry.value = value,
                        None => entries.push(EnumEntry { label, value }),
                    }
                }
                EnumEntries::Labeled { values: entries }
            }
            labeled => labeled,
        }
    }

    /// `(label, value)` pairs of the non-empty slots, in slot order.
    pub fn pairs(&self) -> Vec<(&str, u32)> {
        match self {
            EnumEntries::Labeled { values } => values
                .iter()
                .map(|entry| (entry.label.as_str(), entry.value))
                .collect(),
            EnumEntries::Slots { texts, values } => texts
                .iter()
                .zip(values.iter().copied())
                .filter(|(label, _)| !label.is_empty())
                .map(|(label, value)| (label.as_str(), value))
                .collect(),
        }
    }
}

fn serialize_labeled<S: Serializer>(entries: &[EnumEntry], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|entry| (&entry.label, entry.value)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumeratedControl {
    pub reg: u32,
    pub reg2: u32,
    pub shift_l: u32,
    pub shift_r: u32,
    pub max: u32,
    pub mask: u32,
    pub count: u32,
    #[serde(flatten)]
    pub entries: EnumEntries,
}

impl FixedRecord for EnumeratedControl {
    const LAYOUT: &'static layout::RecordLayout = &layout::ENUM_CONTROL;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            reg: record.u32("reg")?,
            reg2: record.u32("reg2")?,
            shift_l: record.u32("shift_l")?,
            shift_r: record.u32("shift_r")?,
            max: record.u32("max")?,
            mask: record.u32("mask")?,
            count: record.u32("count")?,
            entries: EnumEntries::Slots {
                texts: record.texts("texts")?,
                values: record.u32s("values")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlBody {
    Mixer(ScalarMixerControl),
    Enumerated(EnumeratedControl),
    /// Control type without a decodable record; only the header was read.
    Unsupported,
}

/// A control header with the record that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub header: ControlHeader,
    pub body: ControlBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct MixerBlock {
    pub count: u32,
    pub controls: Vec<Control>,
}

impl Decoder<'_, '_> {
    pub(crate) fn decode_mixer_block(&mut self) -> Result<MixerBlock, TopologyError> {
        let count = self.decode::<ElementCount>()?.count;
        debug!(count, "adding kcontrols");

        let mut controls = Vec::new();
        for _ in 0..count {
            let offset = self.reader.position();
            let header: ControlHeader = self.decode()?;
            let body = match header.shape() {
                ControlShape::Scalar => {
                    let mixer = self.decode_scalar_control(&header)?;
                    debug!(name = %header.name, access = header.access_flags, "mixer kcontrol");
                    ControlBody::Mixer(mixer)
                }
                ControlShape::Enumerated => {
                    let control = self.decode_enum_control()?;
                    debug!(name = %header.name, max = control.max, "enum kcontrol");
                    ControlBody::Enumerated(control)
                }
                ControlShape::Unsupported(_) => {
                    self.report(
                        offset,
                        DiagnosticKind::UnsupportedControlKind {
                            control: header.control_type(),
                            context: ControlContext::MixerBlock,
                        },
                    );
                    ControlBody::Unsupported
                }
            };
            controls.push(Control { header, body });
        }

        Ok(MixerBlock { count, controls })
    }

    /// Scalar mixer record plus its TLV when the header announces one.
    fn decode_scalar_control(
        &mut self,
        header: &ControlHeader,
    ) -> Result<ScalarMixerControl, TopologyError> {
        let mut mixer: ScalarMixerControl = self.decode()?;
        if header.tlv_size != 0 {
            let mut tlv: ControlTlv = self.decode()?;
            tlv.value = self.reader.read_vec(tlv.length as usize, "control TLV value")?;
            debug!(numid = tlv.numid, length = tlv.length, "TLV");
            mixer.tlv = Some(tlv);
        }
        Ok(mixer)
    }

    pub(crate) fn decode_enum_control(&mut self) -> Result<EnumeratedControl, TopologyError> {
        let mut control: EnumeratedControl = self.decode()?;
        if !self.options.keep_empty_enum_slots {
            control.entries = control.entries.labeled();
        }
        Ok(control)
    }

    /// Controls attached to a DAPM widget.
    ///
    /// All controls of one widget share the kind of the first header. Scalar
    /// widgets carry `kcontrol_count` header/mixer pairs (no TLVs); an
    /// enumerated widget carries a single enum record.
    pub(crate) fn decode_widget_controls(
        &mut self,
        kcontrol_count: u32,
    ) -> Result<Vec<Control>, TopologyError> {
        if kcontrol_count == 0 {
            return Ok(Vec::new());
        }

        let offset = self.reader.position();
        let first: ControlHeader = self.decode()?;
        debug!(
            name = %first.name,
            kcontrol_count,
            index = first.index,
            "widget controls"
        );

        match first.shape() {
            ControlShape::Scalar => {
                let mut controls = Vec::new();
                let mut pending = Some(first);
                for _ in 0..kcontrol_count {
                    let header = match pending.take() {
                        Some(header) => header,
                        None => self.decode()?,
                    };
                    let mixer: ScalarMixerControl = self.decode()?;
                    controls.push(Control {
                        header,
                        body: ControlBody::Mixer(mixer),
                    });
                }
                Ok(controls)
            }
            ControlShape::Enumerated => {
                let control = self.decode_enum_control()?;
                Ok(vec![Control {
                    header: first,
                    body: ControlBody::Enumerated(control),
                }])
            }
            ControlShape::Unsupported(_) => {
                self.report(
                    offset,
                    DiagnosticKind::UnsupportedControlKind {
                        control: first.control_type(),
                        context: ControlContext::DapmWidget,
                    },
                );
                Ok(vec![Control {
                    header: first,
                    body: ControlBody::Unsupported,
                }])
            }
        }
    }
}
