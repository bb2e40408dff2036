//! DAPM routing graph and widget blocks.

use serde::Serialize;
use tracing::debug;

use super::control::{Control, ElementCount};
use super::error::TopologyError;
use super::layout;
use super::parser::Decoder;
use super::record::{FixedRecord, RawRecord};

/// One `sink <- control <- source` route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DapmGraphEdge {
    pub sink: String,
    /// `None` for a direct connection.
    pub control: Option<String>,
    pub source: String,
}

impl FixedRecord for DapmGraphEdge {
    const LAYOUT: &'static layout::RecordLayout = &layout::DAPM_GRAPH_ELEM;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        let control = record.text("control")?;
        Ok(Self {
            sink: record.text("sink")?,
            control: (!control.is_empty()).then_some(control),
            source: record.text("source")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DapmGraphBlock {
    pub count: u32,
    pub routes: Vec<DapmGraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DapmWidget {
    pub id: u32,
    pub name: String,
    pub sname: String,
    pub reg: i32,
    pub shift: u32,
    pub mask: u32,
    pub invert: bool,
    pub ignore_suspend: bool,
    pub kcontrol_count: u32,
    pub controls: Vec<Control>,
}

impl FixedRecord for DapmWidget {
    const LAYOUT: &'static layout::RecordLayout = &layout::DAPM_WIDGET;

    fn from_record(record: &RawRecord) -> Result<Self, TopologyError> {
        Ok(Self {
            id: record.u32("id")?,
            name: record.text("name")?,
            sname: record.text("sname")?,
            reg: record.i32("reg")?,
            shift: record.u32("shift")?,
            mask: record.u32("mask")?,
            invert: record.bool("invert")?,
            ignore_suspend: record.bool("ignore_suspend")?,
            kcontrol_count: record.u32("kcontrol_count")?,
            controls: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DapmWidgetBlock {
    pub count: u32,
    pub widgets: Vec<DapmWidget>,
}

impl Decoder<'_, '_> {
    pub(crate) fn decode_dapm_graph_block(&mut self) -> Result<DapmGraphBlock, TopologyError> {
        let count = self.decode::<ElementCount>()?.count;
        debug!(count, "adding DAPM routes");

        let mut routes = Vec::new();
        for _ in 0..count {
            routes.push(self.decode::<DapmGraphEdge>()?);
        }
        Ok(DapmGraphBlock { count, routes })
    }

    pub(crate) fn decode_dapm_widget_block(&mut self) -> Result<DapmWidgetBlock, TopologyError> {
        let count = self.decode::<ElementCount>()?.count;
        debug!(count, "adding DAPM widgets");

        let mut widgets = Vec::new();
        for _ in 0..count {
            let mut widget: DapmWidget = self.decode()?;
            debug!(name = %widget.name, id = widget.id, "creating DAPM widget");
            widget.controls = self.decode_widget_controls(widget.kcontrol_count)?;
            widgets.push(widget);
        }
        Ok(DapmWidgetBlock { count, widgets })
    }
}
