//! Non-fatal decode diagnostics and the sink they are reported to.
//!
//! The decoder never configures or touches a global logger for these; the
//! caller passes a [`DiagnosticSink`] into [`crate::decode_container`] and
//! chooses whether diagnostics are collected, logged, or both.

use serde::Serialize;

use crate::topology::{BlockTag, ControlType};

/// Where an unsupported control was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlContext {
    MixerBlock,
    DapmWidget,
}

impl std::fmt::Display for ControlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlContext::MixerBlock => f.write_str("mixer block"),
            ControlContext::DapmWidget => f.write_str("DAPM widget"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "id", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Block tag without a decoder; its payload was skipped.
    UnsupportedTag { tag: BlockTag },
    /// Known tag with a vendor type that has no decoder; payload skipped.
    UnsupportedVendorType { tag: BlockTag, vendor_type: u32 },
    /// Control type with no known record shape; nothing after its header
    /// was read.
    UnsupportedControlKind {
        control: ControlType,
        context: ControlContext,
    },
    /// Coefficient control that is not enumerated; ignored.
    IgnoredCoefficientControl { control: ControlType },
}

/// A warning-class condition raised while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Offset of the header that triggered the diagnostic.
    pub offset: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::UnsupportedTag { tag } => {
                write!(f, "block type {tag} not supported at offset {:#x}", self.offset)
            }
            DiagnosticKind::UnsupportedVendorType { tag, vendor_type } => write!(
                f,
                "vendor type {vendor_type} not supported for {tag} at offset {:#x}",
                self.offset
            ),
            DiagnosticKind::UnsupportedControlKind { control, context } => write!(
                f,
                "invalid control type {control} in {context} at offset {:#x}",
                self.offset
            ),
            DiagnosticKind::IgnoredCoefficientControl { control } => write!(
                f,
                "invalid coefficient control type {control} at offset {:#x}",
                self.offset
            ),
        }
    }
}

/// Receiver for diagnostics emitted during a decode run.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink that forwards every diagnostic to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(offset = diagnostic.offset, "{}", diagnostic);
    }
}

/// Collects diagnostics and logs each one as it arrives, so warnings raised
/// before a fatal error are still visible.
#[derive(Debug, Default)]
pub struct RecordingSink {
    diagnostics: Vec<Diagnostic>,
}

impl RecordingSink {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        TracingSink.report(diagnostic.clone());
        self.diagnostics.push(diagnostic);
    }
}
