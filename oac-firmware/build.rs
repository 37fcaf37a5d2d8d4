//! Build script for oac-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml and bakes it into the firmware as postcard

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use oac_core::config::{ConfigError, DeviceConfig};

/// Keys accepted in device.toml
const KNOWN_KEYS: &[&str] = &[
    "startup_timeout_ms",
    "shutdown_request_timeout_ms",
    "shutdown_timeout_ms",
    "shutdown_confirm_ms",
    "status_interval_ms",
    "watchdog_default_s",
    "watchdog_min_s",
    "watchdog_max_s",
    "low_battery_uv",
    "over_voltage_uv",
];

fn main() {
    setup_linker();
    let config = validate_config();
    write_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml at compile time
fn validate_config() -> DeviceConfig {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    // A missing file means defaults
    if !config_path.exists() {
        println!("cargo:warning=device.toml not found, using default configuration");
        return DeviceConfig::default();
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let table: toml::Table = match toml::from_str(&config_content) {
        Ok(table) => table,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_keys(&table);

    let config: DeviceConfig = match toml::Value::Table(table).try_into() {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid value in device.toml                             ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Inconsistent device.toml                                 ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(describe(e))
        );
    }

    println!("cargo:warning=device.toml validated successfully");
    config
}

/// Reject keys the firmware does not know, usually typos
fn validate_keys(table: &toml::Table) {
    let unknown: Vec<String> = table
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|key| format!("Unknown key '{}'", key))
        .collect();

    if !unknown.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Unknown keys in device.toml                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&unknown.join("\n"))
        );
    }
}

fn describe(error: ConfigError) -> &'static str {
    match error {
        ConfigError::ZeroDuration => "Timeouts and intervals must be non-zero",
        ConfigError::ConfirmWindowTooLong => {
            "shutdown_confirm_ms must be shorter than shutdown_timeout_ms"
        }
        ConfigError::WatchdogRange => {
            "Watchdog needs 1 <= watchdog_min_s <= watchdog_default_s <= watchdog_max_s"
        }
        ConfigError::BatteryThresholds => "low_battery_uv must be below over_voltage_uv",
        ConfigError::Deserialize => "Configuration could not be decoded",
    }
}

/// Encode the validated config for `include_bytes!`
fn write_config(config: &DeviceConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let bytes = postcard::to_stdvec(config).unwrap();
    fs::write(out_dir.join("device_config.bin"), bytes).unwrap();
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
