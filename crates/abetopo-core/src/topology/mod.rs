//! ABE/ASoC topology container decoding.
//!
//! The container is a flat run of blocks, each a 24-byte header followed by
//! `size` payload bytes. Layering:
//! - `layout`: record field tables and wire constants (source of truth)
//! - `reader`: bounds-checked forward cursor
//! - `record`: one generic fixed-record decoder driven by `layout`
//! - `kind`: control type codes and the control-kind classifier
//! - `parser`: block dispatch and the framing check
//! - `control`, `dapm`, `vendor`: per-tag body decoders
//! - `error`: fatal, offset-carrying errors
//!
//! After each block body is decoded the reader must sit exactly at
//! `body_start + size`; anything else is a `FramingViolation` and stops the
//! run. Coefficient blocks re-anchor this check on their embedded header.

pub mod block;
pub mod control;
pub mod dapm;
pub mod error;
pub mod kind;
pub mod layout;
pub mod options;
pub mod parser;
pub mod reader;
pub mod record;
pub mod vendor;

pub use block::{Block, BlockBody, BlockHeader, BlockTag, Container};
pub use control::{
    Control, ControlBody, ControlHeader, ControlTlv, EnumEntries, EnumEntry, EnumeratedControl,
    MixerBlock, ScalarMixerControl,
};
pub use dapm::{DapmGraphBlock, DapmGraphEdge, DapmWidget, DapmWidgetBlock};
pub use error::TopologyError;
pub use kind::{ControlShape, ControlType, classify_control};
pub use options::DecodeOptions;
pub use parser::decode_container;
pub use vendor::{CoefficientBlock, CoefficientSet, VendorConfigBlob, VendorFirmwareImage};
