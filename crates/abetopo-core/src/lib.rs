//! Core library for decoding ASoC/ABE topology firmware containers.
//!
//! A container is a run of typed blocks (mixer controls, DAPM routes and
//! widgets, coefficient tables, ABE firmware and configuration). This crate
//! decodes it into typed records and wraps them in a deterministic,
//! serializable report for the CLI:
//! - `topology`: byte-oriented decoders (layout/reader/record/parser)
//! - `diagnostics`: non-fatal conditions and the sink they go to
//! - `source`: file access, the only module doing I/O
//!
//! Invariants:
//! - Every block ends exactly `size` bytes after its header, or the run stops.
//! - Blocks appear in the report in file order.
//! - Unsupported content is skipped with a diagnostic, never silently.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use abetopo_core::{DecodeOptions, decode_topology_file};
//!
//! let report = decode_topology_file(Path::new("omap4_abe"), &DecodeOptions::default())?;
//! println!("{} blocks", report.summary.blocks_total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;

pub mod diagnostics;
mod dump;
pub(crate) mod encoding;
mod source;
pub mod topology;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, RecordingSink, TracingSink};
pub use dump::{DumpError, decode_topology_bytes, decode_topology_file};
pub use source::{SourceError, TopologyFile};
pub use topology::{Block, BlockTag, DecodeOptions, TopologyError, decode_container};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the input has no modification time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded container plus input metadata.
///
/// # Examples
/// ```
/// use abetopo_core::make_stub_report;
///
/// let report = make_stub_report("omap4_abe", 24);
/// assert_eq!(report.report_version, abetopo_core::REPORT_VERSION);
/// assert!(report.blocks.is_empty());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TopologyReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp; the input's modification time.
    pub generated_at: String,
    pub input: InputInfo,
    pub summary: ContainerSummary,
    /// Decoded blocks in file order.
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use abetopo_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "abetopo".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "abetopo");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in reports.
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Block counts for the decoded container.
///
/// # Examples
/// ```
/// use abetopo_core::{BlockTag, ContainerSummary, TagCount};
///
/// let summary = ContainerSummary {
///     blocks_total: 2,
///     blocks_by_tag: vec![TagCount { tag: BlockTag::VendorFw, blocks: 2 }],
/// };
/// assert_eq!(summary.blocks_by_tag[0].tag.code(), 1000);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerSummary {
    pub blocks_total: u64,
    /// One entry per tag seen, ordered by tag code.
    pub blocks_by_tag: Vec<TagCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: BlockTag,
    pub blocks: u64,
}

/// Build an empty report for `input_path`.
///
/// # Examples
/// ```
/// use abetopo_core::make_stub_report;
///
/// let report = make_stub_report("abe.bin", 0);
/// assert_eq!(report.input.path, "abe.bin");
/// assert_eq!(report.generated_at, abetopo_core::DEFAULT_GENERATED_AT);
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> TopologyReport {
    TopologyReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "abetopo".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: ContainerSummary::default(),
        blocks: vec![],
        diagnostics: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_diagnostics_when_empty() {
        let mut report = make_stub_report("abe.bin", 0);
        let value = serde_json::to_value(&report).expect("report json");
        assert!(value.get("diagnostics").is_none());
        assert_eq!(value["summary"]["blocks_total"], 0);
        assert_eq!(value["tool"]["name"], "abetopo");

        report.diagnostics.push(Diagnostic {
            offset: 0,
            kind: DiagnosticKind::UnsupportedTag {
                tag: BlockTag::DaiLink,
            },
        });
        let value = serde_json::to_value(&report).expect("report json");
        assert_eq!(value["diagnostics"][0]["id"], "unsupported_tag");
    }

    #[test]
    fn tag_count_serializes_code_and_name() {
        let count = TagCount {
            tag: BlockTag::Mixer,
            blocks: 3,
        };
        let value = serde_json::to_value(count).expect("tag count json");
        assert_eq!(value["tag"]["value"], 1);
        assert_eq!(value["tag"]["name"], "SND_SOC_FW_MIXER");
        assert_eq!(value["blocks"], 3);
    }
}
