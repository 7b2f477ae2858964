//! Transform modes and the ordered mode configuration.
//!
//! A `ModeConfig` is the set of active `(Mode, parameter)` pairs. Insertion
//! order is preserved and decides the order stages run in the pipeline.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The five supported transform kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Compress,
    Decompress,
    Encrypt,
    Decrypt,
    CompressAndEncrypt,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Compress,
        Mode::Decompress,
        Mode::Encrypt,
        Mode::Decrypt,
        Mode::CompressAndEncrypt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Compress => "compress",
            Mode::Decompress => "decompress",
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
            Mode::CompressAndEncrypt => "compress-and-encrypt",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown mode '{s}' (expected one of: compress, decompress, encrypt, decrypt, compress-and-encrypt)"
                )
            })
    }
}

/// One `mode=parameter` pair, as written on the command line or in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModeEntry {
    pub mode: Mode,
    pub param: String,
}

impl ModeEntry {
    pub fn new(mode: Mode, param: impl Into<String>) -> Self {
        Self {
            mode,
            param: param.into(),
        }
    }
}

impl TryFrom<String> for ModeEntry {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModeEntry> for String {
    fn from(entry: ModeEntry) -> Self {
        format!("{}={}", entry.mode, entry.param)
    }
}

impl FromStr for ModeEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, param) = s
            .split_once('=')
            .ok_or_else(|| format!("expected <mode>=<parameter>, got '{s}'"))?;
        Ok(Self {
            mode: mode.parse()?,
            param: param.trim().to_string(),
        })
    }
}

/// Active modes with their parameters, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeConfig(IndexMap<Mode, String>);

impl ModeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mode. A replaced mode keeps its original position.
    pub fn insert(&mut self, mode: Mode, param: impl Into<String>) {
        self.0.insert(mode, param.into());
    }

    pub fn with(mut self, mode: Mode, param: impl Into<String>) -> Self {
        self.insert(mode, param);
        self
    }

    pub fn get(&self, mode: Mode) -> Option<&str> {
        self.0.get(&mode).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mode, &str)> {
        self.0.iter().map(|(mode, param)| (*mode, param.as_str()))
    }

    pub fn modes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ModeEntry> for ModeConfig {
    fn from_iter<I: IntoIterator<Item = ModeEntry>>(iter: I) -> Self {
        let mut config = ModeConfig::new();
        for entry in iter {
            config.insert(entry.mode, entry.param);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_accepts_kebab_and_snake_case() {
        assert_eq!("compress".parse::<Mode>().unwrap(), Mode::Compress);
        assert_eq!(
            "compress-and-encrypt".parse::<Mode>().unwrap(),
            Mode::CompressAndEncrypt
        );
        assert_eq!(
            "Compress_And_Encrypt".parse::<Mode>().unwrap(),
            Mode::CompressAndEncrypt
        );
        assert!("shred".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_entry_parse() {
        let entry: ModeEntry = "encrypt=key1".parse().unwrap();
        assert_eq!(entry.mode, Mode::Encrypt);
        assert_eq!(entry.param, "key1");

        assert!("encrypt".parse::<ModeEntry>().is_err());
        assert!("unknown=x".parse::<ModeEntry>().is_err());
    }

    #[test]
    fn test_mode_config_keeps_insertion_order() {
        let config = ModeConfig::new()
            .with(Mode::Encrypt, "key1")
            .with(Mode::Compress, "archive");

        let order: Vec<Mode> = config.modes().collect();
        assert_eq!(order, vec![Mode::Encrypt, Mode::Compress]);
    }

    #[test]
    fn test_mode_config_duplicate_keeps_first_position() {
        let config: ModeConfig = ["compress=a", "encrypt=k", "compress=b"]
            .into_iter()
            .map(|s| s.parse::<ModeEntry>().unwrap())
            .collect();

        assert_eq!(config.len(), 2);
        assert_eq!(config.get(Mode::Compress), Some("b"));
        let order: Vec<Mode> = config.modes().collect();
        assert_eq!(order, vec![Mode::Compress, Mode::Encrypt]);
    }

    #[test]
    fn test_mode_entries_deserialize_from_strings_in_order() {
        #[derive(Deserialize)]
        struct Doc {
            modes: Vec<ModeEntry>,
        }

        let doc: Doc = toml::from_str(r#"modes = ["decrypt=plain", "compress=archive"]"#).unwrap();
        let config: ModeConfig = doc.modes.into_iter().collect();

        let order: Vec<Mode> = config.modes().collect();
        assert_eq!(order, vec![Mode::Decrypt, Mode::Compress]);
        assert_eq!(String::from(ModeEntry::new(Mode::Decrypt, "plain")), "decrypt=plain");
    }
}
