//! Minimal TOML reader for `ui.toml`
//!
//! Handles only the subset the UI configuration needs. It does NOT
//! support the full TOML spec.
//!
//! Supported:
//! - `[display]`, `[touch]`, `[sound]`, `[fifo]` and `[layout]` headers
//! - `key = value` pairs (string, integer, boolean)
//! - Comments (`# ...`), including trailing ones
//!
//! Parsing starts from [`UiConfig::default`], so omitted keys keep their
//! defaults. Unknown sections and keys are rejected.

use evetouch_protocol::{ChipModel, Effect};

use super::types::UiConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section (or outside any section)
    UnknownKey,
    /// Value of the wrong type or out of range
    InvalidValue,
    /// Line is neither a header, a comment nor `key = value`
    InvalidLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Touch,
    Sound,
    Fifo,
    Layout,
}

/// Parse `ui.toml` contents into a [`UiConfig`]
pub fn parse_config(input: &str) -> Result<UiConfig, ParseError> {
    let mut config = UiConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    validate(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "display" => Ok(Section::Display),
        "touch" => Ok(Section::Touch),
        "sound" => Ok(Section::Sound),
        "fifo" => Ok(Section::Fifo),
        "layout" => Ok(Section::Layout),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut UiConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Display => match key {
            "chip" => config.chip = parse_chip(value)?,
            "refresh_ms" => config.refresh_ms = parse_int(value)?,
            "tracking_refresh_ms" => config.tracking_refresh_ms = parse_int(value)?,
            "background" => config.background = parse_color(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Touch => match key {
            "repeats_per_second" => config.touch.repeats_per_second = parse_int(value)?,
            "debounce_ms" => config.touch.debounce_ms = parse_int(value)?,
            "sound" => config.touch.sound = parse_bool(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Sound => match key {
            "volume" => config.sound.volume = parse_int(value)?,
            "press" => config.sound.press = parse_effect(value)?,
            "repeat" => config.sound.repeat = parse_effect(value)?,
            "unpress" => config.sound.unpress = parse_effect(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Fifo => match key {
            // 0 means wait forever
            "wait_limit" => {
                let polls: u32 = parse_int(value)?;
                config.fifo.wait_limit = (polls > 0).then_some(polls);
            }
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Layout => match key {
            "width" => config.layout.width = parse_int(value)?,
            "height" => config.layout.height = parse_int(value)?,
            "cols" => config.layout.cols = parse_int(value)?,
            "rows" => config.layout.rows = parse_int(value)?,
            "margin" => config.layout.margin = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
    }
    Ok(())
}

fn validate(config: &UiConfig) -> Result<(), ParseError> {
    let layout = &config.layout;
    if layout.cols == 0 || layout.rows == 0 || layout.width == 0 || layout.height == 0 {
        return Err(ParseError::InvalidValue);
    }
    if config.touch.repeats_per_second == 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(())
}

fn strip_comment(s: &str) -> &str {
    let mut quoted = false;
    for (pos, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            // A '#' inside a quoted string is part of the value
            '#' if !quoted => return s[..pos].trim(),
            _ => {}
        }
    }
    s
}

/// Split a line into key and value, dropping a trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value, quoted or bare
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse an `0xRRGGBB` or `"#RRGGBB"` color
fn parse_color(value: &str) -> Result<u32, ParseError> {
    let value = parse_string(value);
    let hex = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix('#'))
        .ok_or(ParseError::InvalidValue)?;
    match u32::from_str_radix(hex, 16) {
        Ok(rgb) if rgb <= 0xFF_FF_FF => Ok(rgb),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_chip(value: &str) -> Result<ChipModel, ParseError> {
    match parse_string(value) {
        "ft800" | "FT800" => Ok(ChipModel::Ft800),
        "ft810" | "FT810" => Ok(ChipModel::Ft810),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_effect(value: &str) -> Result<Effect, ParseError> {
    Effect::from_name(parse_string(value)).ok_or(ParseError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
# Touchscreen on the front panel
[display]
chip = "ft810"
refresh_ms = 500   # faster clock updates
background = "#102030"

[touch]
repeats_per_second = 8
sound = false

[sound]
volume = 128
press = "click"
unpress = "notch"

[fifo]
wait_limit = 0

[layout]
width = 800
height = 480
cols = 6
"##;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.chip, ChipModel::Ft810);
        assert_eq!(config.refresh_ms, 500);
        assert_eq!(config.tracking_refresh_ms, 50);
        assert_eq!(config.background, 0x102030);
        assert_eq!(config.touch.repeats_per_second, 8);
        assert_eq!(config.touch.debounce_ms, 100);
        assert!(!config.touch.sound);
        assert_eq!(config.sound.volume, 128);
        assert_eq!(config.sound.press, Effect::Click);
        assert_eq!(config.sound.repeat, Effect::Chack);
        assert_eq!(config.sound.unpress, Effect::Notch);
        assert_eq!(config.fifo.wait_limit, None);
        assert_eq!(config.layout.width, 800);
        assert_eq!(config.layout.cols, 6);
        assert_eq!(config.layout.rows, 4);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), UiConfig::default());
        assert_eq!(parse_config("# nothing\n\n").unwrap(), UiConfig::default());
    }

    #[test]
    fn test_wait_limit() {
        let config = parse_config("[fifo]\nwait_limit = 300").unwrap();
        assert_eq!(config.fifo.wait_limit, Some(300));
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(parse_config("[network]"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[touch"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_config("[touch]\nrepeat = 3"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_config("volume = 3"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[sound]\nvolume = 300"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[sound]\npress = \"kazoo\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[touch]\nsound = yes"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[display]\nchip = \"ft900\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[layout]\ncols = 0"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_colors() {
        let config = parse_config("[display]\nbackground = 0xFF8800").unwrap();
        assert_eq!(config.background, 0xFF8800);
        assert_eq!(
            parse_config("[display]\nbackground = 0x1000000"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[display]\nbackground = 12"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_comment_after_quoted_hash() {
        let config = parse_config("[display]\nbackground = \"#112233\" # dark\n").unwrap();
        assert_eq!(config.background, 0x112233);
        let config = parse_config("[sound]\npress = \"click\"# short\n").unwrap();
        assert_eq!(config.sound.press, Effect::Click);
    }

    #[test]
    fn test_malformed_line() {
        assert_eq!(parse_config("[touch]\nsound"), Err(ParseError::InvalidLine));
    }
}
