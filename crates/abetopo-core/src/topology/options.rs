use super::layout;

/// Caller-controlled decoding behavior.
///
/// # Examples
/// ```
/// use abetopo_core::DecodeOptions;
///
/// let options = DecodeOptions {
///     keep_empty_enum_slots: true,
///     ..DecodeOptions::default()
/// };
/// assert_eq!(options.magic, *b"CoSA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep all 16 enumerated-control slots (blank labels included) as
    /// parallel `texts`/`values` lists instead of a `label -> value` map of
    /// the non-empty slots.
    pub keep_empty_enum_slots: bool,
    /// Signature every block header must start with.
    pub magic: [u8; 4],
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            keep_empty_enum_slots: false,
            magic: layout::SND_SOC_FW_MAGIC,
        }
    }
}
