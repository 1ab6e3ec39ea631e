//! Parsing of user-entered port input and rendering of port output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Dec,
    Hex,
    Bin,
    /// Each character is queued as its code point.
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    #[default]
    Ascii,
    Hex,
    Dec,
    Bin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputParseError {
    #[error("Please enter a value")]
    Empty,
    #[error("Please enter a valid decimal number (0-65535)")]
    InvalidDec,
    #[error("Please enter a valid hex number (0x0000-0xFFFF)")]
    InvalidHex,
    #[error("Please enter a valid binary number (0b0000-0b1111111111111111)")]
    InvalidBin,
    #[error("character {0:?} does not fit in a 16-bit port value")]
    WideChar(char),
}

/// Parse user text into the values to queue on a port.
pub fn parse_input(text: &str, mode: InputMode) -> Result<Vec<u16>, InputParseError> {
    if text.trim().is_empty() {
        return Err(InputParseError::Empty);
    }
    let trimmed = text.trim();
    let single = |digits: &str, radix: u32, err: InputParseError| {
        u16::from_str_radix(digits, radix)
            .map(|v| vec![v])
            .map_err(|_| err)
    };
    match mode {
        InputMode::String => text
            .chars()
            .map(|c| u16::try_from(u32::from(c)).map_err(|_| InputParseError::WideChar(c)))
            .collect(),
        InputMode::Dec => single(trimmed, 10, InputParseError::InvalidDec),
        InputMode::Hex => single(
            strip_prefix_ci(trimmed, "0x"),
            16,
            InputParseError::InvalidHex,
        ),
        InputMode::Bin => single(
            strip_prefix_ci(trimmed, "0b"),
            2,
            InputParseError::InvalidBin,
        ),
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> &'a str {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &s[prefix.len()..],
        _ => s,
    }
}

pub fn format_value(value: u16, format: DisplayFormat) -> String {
    match format {
        DisplayFormat::Ascii => ascii_char(value).to_string(),
        DisplayFormat::Hex => format!("0x{value:04x}"),
        DisplayFormat::Dec => value.to_string(),
        DisplayFormat::Bin => format!("{value:016b}"),
    }
}

fn ascii_char(value: u16) -> char {
    match u8::try_from(value) {
        Ok(b) if b == b' ' || b.is_ascii_graphic() => char::from(b),
        _ => '.',
    }
}

/// Render a port's output log as display lines.
///
/// ASCII output shows the newline (10) as `.` and breaks the line after it;
/// other formats are a single space-separated line.
pub fn render_values(values: &[u16], format: DisplayFormat) -> Vec<String> {
    if format != DisplayFormat::Ascii {
        let line = values
            .iter()
            .map(|v| format_value(*v, format))
            .collect::<Vec<_>>()
            .join(" ");
        return vec![line];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for v in values {
        current.push(ascii_char(*v));
        if *v == 10 {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
