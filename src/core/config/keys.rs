use crate::core::config::data::{Appearance, Config};
use std::path::PathBuf;

/// Keys accepted by `codemint set` and `codemint unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "data-dir",
    "syntax",
    "appearance",
    "request-timeout",
];

impl Config {
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            "endpoint" => self.endpoint = Some(value.to_string()),
            "data-dir" => self.data_dir = Some(PathBuf::from(value)),
            "syntax" => {
                self.syntax = Some(match value.to_ascii_lowercase().as_str() {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    _ => return Err(format!("Expected on or off for syntax, got '{value}'")),
                })
            }
            "appearance" => {
                self.appearance = Some(Appearance::parse(value).ok_or_else(|| {
                    format!("Expected dark or light for appearance, got '{value}'")
                })?)
            }
            "request-timeout" => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        format!("Expected a positive number of seconds, got '{value}'")
                    })?;
                self.request_timeout_secs = Some(secs);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "endpoint" => self.endpoint = None,
            "data-dir" => self.data_dir = None,
            "syntax" => self.syntax = None,
            "appearance" => self.appearance = None,
            "request-timeout" => self.request_timeout_secs = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key} (expected one of {})",
        CONFIG_KEYS.join(", ")
    )
}
