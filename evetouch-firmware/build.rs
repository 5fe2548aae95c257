//! Build script for evetouch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates ui.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const SECTIONS: &[(&str, &[&str])] = &[
    ("display", &["chip", "refresh_ms", "tracking_refresh_ms", "background"]),
    ("touch", &["repeats_per_second", "debounce_ms", "sound"]),
    ("sound", &["volume", "press", "repeat", "unpress"]),
    ("fifo", &["wait_limit"]),
    ("layout", &["width", "height", "cols", "rows", "margin"]),
];

const EFFECTS: &[&str] = &[
    "silence", "square", "sine", "sawtooth", "triangle", "beeping", "alarm", "warble",
    "carousel", "pips", "harp", "xylophone", "tuba", "glockenspiel", "organ", "trumpet",
    "piano", "chimes", "music_box", "bell", "click", "switch", "cowbell", "notch", "hihat",
    "kickdrum", "pop", "clack", "chack", "mute", "unmute",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate ui.toml at compile time
///
/// The firmware falls back to defaults on a bad config at runtime.
fn validate_config() {
    println!("cargo:rerun-if-changed=ui.toml");

    let config_path = Path::new("ui.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: ui.toml not found!                                       ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds ui.toml; create one in the                  ║\n\
            ║  evetouch-firmware directory (it may be empty).                  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("failed to read ui.toml: {}", e),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in ui.toml                           ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_keys(&config, &mut errors);
    validate_values(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings in ui.toml                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=ui.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only known sections and keys, no top-level keys
fn validate_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, section) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(s, _)| *s == name.as_str()) else {
            errors.push(format!("unknown section or key '{}'", name));
            continue;
        };
        let Some(table) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

fn validate_values(config: &toml::Value, errors: &mut Vec<String>) {
    let get = |section: &str, key: &str| config.get(section).and_then(|s| s.get(key));

    if let Some(chip) = get("display", "chip") {
        if !matches!(chip.as_str(), Some("ft800" | "FT800" | "ft810" | "FT810")) {
            errors.push("[display] chip must be 'ft800' or 'ft810'".to_string());
        }
    }

    if let Some(color) = get("display", "background") {
        let ok = match color {
            toml::Value::Integer(rgb) => (0..=0xFF_FF_FF).contains(rgb),
            toml::Value::String(s) => s
                .strip_prefix('#')
                .or_else(|| s.strip_prefix("0x"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .is_some_and(|rgb| rgb <= 0xFF_FF_FF),
            _ => false,
        };
        if !ok {
            errors.push("[display] background must be 0xRRGGBB or \"#RRGGBB\"".to_string());
        }
    }

    for key in ["press", "repeat", "unpress"] {
        if let Some(effect) = get("sound", key) {
            if !effect.as_str().is_some_and(|e| EFFECTS.contains(&e)) {
                errors.push(format!("[sound] {} is not a known effect", key));
            }
        }
    }

    check_range(get("sound", "volume"), "[sound] volume", 0, 255, errors);
    check_range(get("touch", "repeats_per_second"), "[touch] repeats_per_second", 1, 255, errors);
    check_range(get("touch", "debounce_ms"), "[touch] debounce_ms", 0, 65535, errors);
    check_range(get("display", "refresh_ms"), "[display] refresh_ms", 0, 16256, errors);
    check_range(
        get("display", "tracking_refresh_ms"),
        "[display] tracking_refresh_ms",
        0,
        16256,
        errors,
    );
    check_range(get("fifo", "wait_limit"), "[fifo] wait_limit", 0, u32::MAX as i64, errors);
    check_range(get("layout", "width"), "[layout] width", 1, 2048, errors);
    check_range(get("layout", "height"), "[layout] height", 1, 2048, errors);
    check_range(get("layout", "cols"), "[layout] cols", 1, 255, errors);
    check_range(get("layout", "rows"), "[layout] rows", 1, 255, errors);
    check_range(get("layout", "margin"), "[layout] margin", 0, 255, errors);

    if let Some(sound) = get("touch", "sound") {
        if !sound.is_bool() {
            errors.push("[touch] sound must be true or false".to_string());
        }
    }
}

fn check_range(
    value: Option<&toml::Value>,
    name: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match value {
        None => {}
        Some(toml::Value::Integer(n)) if (min..=max).contains(n) => {}
        Some(_) => errors.push(format!("{} must be {}-{}", name, min, max)),
    }
}
