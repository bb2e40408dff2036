//! Writes the synthetic topology containers used by the golden tests.
//!
//! Run from the repository root: `cargo run -p abetopo-core --bin topology_fixtures`.

use std::fs;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"CoSA";
const ABI_VERSION: u32 = 1;
const TEXT_SIZE: usize = 32;
const ENUM_SLOTS: usize = 16;
const ENUM_RESERVED_WORDS: usize = 112;

const TAG_MIXER: u32 = 1;
const TAG_DAPM_GRAPH: u32 = 2;
const TAG_DAPM_WIDGET: u32 = 3;
const TAG_DAI_LINK: u32 = 4;
const TAG_COEFF: u32 = 5;
const TAG_VENDOR_FW: u32 = 1000;
const TAG_VENDOR_CONFIG: u32 = 1001;

const CONTROL_EXT: u32 = 0;
const CONTROL_VOLSW: u32 = 1;
const CONTROL_VOLSW_SX: u32 = 2;
const CONTROL_ENUM: u32 = 6;
const DAPM_VOLSW: u32 = 64;
const DAPM_ENUM_DOUBLE: u32 = 65;

const SND_SOC_NOPM: i32 = -1;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_container(&root.join("abe_full"), &abe_full())?;
    write_container(&root.join("unsupported"), &unsupported())?;
    Ok(())
}

fn write_container(dir: &Path, data: &[u8]) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;
    let path = dir.join("input.bin");
    fs::write(&path, data).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

/// Every supported block kind, in the order the ABE firmware ships them.
fn abe_full() -> Vec<u8> {
    let mut out = Vec::new();

    let mut fw = words(&[0x0950, 8, 4, 4, 2]);
    fw.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22, 0x33]);
    fw.extend_from_slice(&[0x10, 0x20, 0x30, 0x40]);
    fw.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd]);
    fw.extend_from_slice(&[0x5a, 0xa5]);
    out.extend(block(TAG_VENDOR_FW, 0, &fw));

    out.extend(block(TAG_VENDOR_CONFIG, 0, &[1, 2, 3, 4, 5, 6]));

    let mut mixer = words(&[3]);
    mixer.extend(control_header("DL1 Mixer Voice", CONTROL_VOLSW, 3, 0));
    mixer.extend(mixer_control(120, 0x10, 0));
    mixer.extend(control_header("DL1 Voice Playback Volume", CONTROL_VOLSW_SX, 3, 16));
    mixer.extend(mixer_control(120, 0x12, 1));
    mixer.extend(words(&[1, 8]));
    mixer.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0xe0, 0xf1, 0xff, 0xff]);
    mixer.extend(control_header("Capture Route", CONTROL_ENUM, 3, 0));
    mixer.extend(enum_control(0x20, &["Off", "On"], &[0, 1]));
    out.extend(block(TAG_MIXER, 0, &mixer));

    let mut graph = words(&[2]);
    graph.extend(graph_edge("DL1 Mixer", "DL1 Mixer Voice", "MM_DL"));
    graph.extend(graph_edge("PDM_DL1", "", "DL1 Mixer"));
    out.extend(block(TAG_DAPM_GRAPH, 0, &graph));

    let mut widgets = words(&[3]);
    widgets.extend(widget(4, "DL1 Mixer", "", SND_SOC_NOPM, false, false, 2));
    widgets.extend(control_header("DL1 Mixer Voice", DAPM_VOLSW, 3, 0));
    widgets.extend(mixer_control(1, 0x30, 0));
    widgets.extend(control_header("DL1 Mixer Tones", DAPM_VOLSW, 3, 0));
    widgets.extend(mixer_control(1, 0x30, 1));
    widgets.extend(widget(5, "Capture Mux", "", SND_SOC_NOPM, false, false, 1));
    widgets.extend(control_header("Capture Mux", DAPM_ENUM_DOUBLE, 3, 0));
    widgets.extend(enum_control(0x31, &["None", "", "AMIC"], &[0, 0, 2]));
    widgets.extend(widget(1, "PDM_DL1", "Playback", 0, true, true, 0));
    out.extend(block(TAG_DAPM_WIDGET, 0, &widgets));

    let mut coeff_data = words(&[2, 16, 3]);
    coeff_data.extend_from_slice(&[1, 0, 0, 0, 2, 0, 0, 0]);
    coeff_data.extend_from_slice(&[3, 0, 0, 0, 4, 0, 0, 0]);
    let mut coeff = words(&[1]);
    coeff.extend(control_header("DL1 Equalizer", CONTROL_ENUM, 3, 0));
    coeff.extend(enum_control(0x40, &["Flat", "Lowpass"], &[0, 1]));
    coeff.extend(block(TAG_COEFF, 0, &coeff_data));
    out.extend(block(TAG_COEFF, 0, &coeff));

    out
}

/// Unsupported content that is skipped with diagnostics.
fn unsupported() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(block(TAG_DAI_LINK, 0, &[0u8; 8]));
    out.extend(block(77, 0, &[0xff; 4]));
    out.extend(block(TAG_COEFF, 2, &[0u8; 12]));

    let mut mixer = words(&[2]);
    mixer.extend(control_header("Ext Switch", CONTROL_EXT, 3, 0));
    mixer.extend(control_header("Master Volume", CONTROL_VOLSW, 3, 0));
    mixer.extend(mixer_control(64, 0x50, 0));
    out.extend(block(TAG_MIXER, 0, &mixer));

    let mut coeff = words(&[1]);
    coeff.extend(control_header("Bogus Coeff", CONTROL_VOLSW, 3, 0));
    coeff.extend(block(TAG_COEFF, 0, &words(&[0, 0, 9])));
    out.extend(block(TAG_COEFF, 0, &coeff));

    out
}

fn block(tag: u32, vendor_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.extend(words(&[ABI_VERSION, tag, vendor_type, 0, payload.len() as u32]));
    out.extend_from_slice(payload);
    out
}

fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn text(value: &str) -> [u8; TEXT_SIZE] {
    let mut slot = [0u8; TEXT_SIZE];
    slot[..value.len()].copy_from_slice(value.as_bytes());
    slot
}

fn control_header(name: &str, index: u32, access: u32, tlv_size: u32) -> Vec<u8> {
    let mut out = text(name).to_vec();
    out.extend(words(&[index, access, tlv_size]));
    out
}

fn mixer_control(max: u32, reg: u32, shift: u32) -> Vec<u8> {
    words(&[0, max, max, reg, reg, shift, shift, 0])
}

fn enum_control(reg: u32, texts: &[&str], values: &[u32]) -> Vec<u8> {
    let count = texts.len() as u32;
    let mut out = words(&[reg, reg, 0, 0, count, 0x3, count]);
    for idx in 0..ENUM_SLOTS {
        out.extend_from_slice(&text(texts.get(idx).copied().unwrap_or("")));
    }
    for idx in 0..ENUM_SLOTS {
        out.extend(words(&[values.get(idx).copied().unwrap_or(0)]));
    }
    out.extend(vec![0u8; ENUM_RESERVED_WORDS * 4]);
    out
}

fn graph_edge(sink: &str, control: &str, source: &str) -> Vec<u8> {
    let mut out = text(sink).to_vec();
    out.extend_from_slice(&text(control));
    out.extend_from_slice(&text(source));
    out
}

fn widget(
    id: u32,
    name: &str,
    sname: &str,
    reg: i32,
    invert: bool,
    ignore_suspend: bool,
    kcontrol_count: u32,
) -> Vec<u8> {
    let mut out = words(&[id]);
    out.extend_from_slice(&text(name));
    out.extend_from_slice(&text(sname));
    out.extend_from_slice(&reg.to_le_bytes());
    out.extend(words(&[0, 1]));
    out.extend_from_slice(&[u8::from(invert), u8::from(ignore_suspend), 0, 0]);
    out.extend(words(&[kcontrol_count]));
    out
}
