//! Parsing of the server's `INFO memory` section.

use serde::Serialize;

/// Memory usage reported by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryInfo {
    /// `used_memory`, in bytes.
    pub used_memory_bytes: u64,
    /// `used_memory_human`, e.g. `1.05M`.
    pub used_memory_human: String,
}

impl MemoryInfo {
    /// Extract the memory fields from the text of `INFO memory`.
    ///
    /// Unknown lines are ignored; missing fields keep their defaults.
    pub fn parse(info: &str) -> Self {
        let mut parsed = MemoryInfo::default();
        for line in info.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match name.trim() {
                "used_memory" => parsed.used_memory_bytes = value.parse().unwrap_or(0),
                "used_memory_human" => parsed.used_memory_human = value.to_string(),
                _ => {}
            }
        }
        parsed
    }
}
