/// Size formatting and parsing — human-readable byte counts.
///
/// All internal sizes are `u64` bytes. Floating point only appears at the
/// display and parsing boundary.
use thiserror::Error;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// Unit suffixes accepted by [`parse_size`], longest first so `"KB"` is not
/// read as `"B"`.
const UNITS: &[(&str, u64)] = &[
    ("kb", KB),
    ("mb", MB),
    ("gb", GB),
    ("tb", TB),
    ("k", KB),
    ("m", MB),
    ("g", GB),
    ("t", TB),
    ("b", 1),
];

/// Format a byte count with a binary unit.
///
/// Units are 1024-based but labelled KB/MB/GB/TB, which is what users
/// expect from a disk tool.
pub fn format_size(bytes: u64) -> String {
    let b = bytes as f64;
    match bytes {
        0..KB => format!("{bytes} B"),
        KB..MB => format!("{:.1} KB", b / KB as f64),
        MB..GB => format!("{:.1} MB", b / MB as f64),
        GB..TB => format!("{:.2} GB", b / GB as f64),
        _ => format!("{:.2} TB", b / TB as f64),
    }
}

/// A size string that [`parse_size`] could not understand.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid size {input:?}: expected a number with an optional unit (B, KB, MB, GB, TB)")]
pub struct SizeParseError {
    pub input: String,
}

/// Parse a human size such as `"100MB"`, `"1.5 GB"` or `"4096"`.
///
/// Units are case-insensitive and 1024-based. A bare number is bytes.
pub fn parse_size(input: &str) -> Result<u64, SizeParseError> {
    let invalid = || SizeParseError {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, mult)| lower.strip_suffix(suffix).map(|n| (n, *mult)))
        .unwrap_or((lower.as_str(), 1));

    let number = number.trim_end();
    if number.is_empty() || number.starts_with(['+', '-']) {
        return Err(invalid());
    }
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    let bytes = (value * multiplier as f64).round();
    if bytes > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}
