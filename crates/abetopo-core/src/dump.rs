use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::diagnostics::RecordingSink;
use crate::source::{SourceError, TopologyFile};
use crate::topology::{BlockTag, Container, DecodeOptions, TopologyError, decode_container};
use crate::{ContainerSummary, DEFAULT_GENERATED_AT, TagCount, TopologyReport, make_stub_report};

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Decode error: {0}")]
    Topology(#[from] TopologyError),
}

/// Decode a topology file into a report.
///
/// `generated_at` is taken from the file's modification time so repeated
/// runs on the same file produce identical reports.
pub fn decode_topology_file(
    path: &Path,
    options: &DecodeOptions,
) -> Result<TopologyReport, DumpError> {
    let file = TopologyFile::open(path)?;
    let mut report = decode_topology_bytes(&path.display().to_string(), file.data(), options)?;
    report.generated_at =
        system_time_to_rfc3339(file.modified()).unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    Ok(report)
}

/// Decode an in-memory container into a report labelled with `input_path`.
pub fn decode_topology_bytes(
    input_path: &str,
    data: &[u8],
    options: &DecodeOptions,
) -> Result<TopologyReport, TopologyError> {
    let mut sink = RecordingSink::default();
    let container = decode_container(data, options, &mut sink)?;

    let mut report = make_stub_report(input_path, data.len() as u64);
    report.summary = summarize(&container);
    report.blocks = container.into_blocks();
    report.diagnostics = sink.into_diagnostics();
    Ok(report)
}

fn summarize(container: &Container) -> ContainerSummary {
    let mut by_code: BTreeMap<u32, (BlockTag, u64)> = BTreeMap::new();
    for block in container.blocks() {
        let tag = block.header.tag;
        by_code.entry(tag.code()).or_insert((tag, 0)).1 += 1;
    }

    ContainerSummary {
        blocks_total: container.len() as u64,
        blocks_by_tag: by_code
            .into_values()
            .map(|(tag, blocks)| TagCount { tag, blocks })
            .collect(),
    }
}

fn system_time_to_rfc3339(time: Option<SystemTime>) -> Option<String> {
    let time = time?;
    OffsetDateTime::from(time).format(&Rfc3339).ok()
}
