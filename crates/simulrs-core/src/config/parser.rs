// Simulrs Config Parser - TOML with Serde
// Chord group configuration, CLI overrides and validation

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::chord::{ChordError, KeyTable};
use crate::Key;

/// Default simultaneity window, same as Karabiner-Elements
pub const DEFAULT_THRESHOLD_MS: u64 = 50;
/// Default pause after a flushed or timer-fired press
pub const DEFAULT_SETTLE_US: u64 = 20;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Exactly one target key is supported, got {0}")]
    TargetCount(usize),

    #[error("Threshold must be greater than zero")]
    InvalidThreshold,

    #[error(transparent)]
    InvalidChord(#[from] ChordError),
}

/// Root TOML table
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub chord: Option<ChordToml>,
}

/// `[chord]` table. Every field is optional and falls back to the defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ChordToml {
    pub sources: Option<Vec<KeySpec>>,
    pub target: Option<KeySpec>,
    /// Accepted for symmetry with `sources`; must hold exactly one key
    pub targets: Option<Vec<KeySpec>>,
    pub threshold_ms: Option<u64>,
    pub settle_us: Option<u64>,
}

/// A key written either by name (`"J"`) or by code (`36`)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeySpec {
    Code(u16),
    Name(String),
}

impl KeySpec {
    pub fn to_key(&self) -> Result<Key, ConfigError> {
        match self {
            KeySpec::Code(code) => Ok(Key(*code)),
            KeySpec::Name(name) => name.parse().map_err(ConfigError::InvalidKey),
        }
    }
}

/// Values supplied on the command line; they win over the config file
#[derive(Debug, Clone, Default)]
pub struct ChordOverrides {
    pub sources: Vec<String>,
    pub targets: Vec<String>,
    pub threshold_ms: Option<u64>,
    pub settle_us: Option<u64>,
}

/// Static inputs of the chord engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordConfig {
    pub sources: Vec<Key>,
    pub target: Key,
    pub threshold: Duration,
    pub settle_delay: Duration,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            sources: vec![Key(36), Key(37)], // J, K
            target: Key(1),                  // ESC
            threshold: Duration::from_millis(DEFAULT_THRESHOLD_MS),
            settle_delay: Duration::from_micros(DEFAULT_SETTLE_US),
        }
    }
}

fn parse_keys<'a, I>(specs: I) -> Result<Vec<Key>, ConfigError>
where
    I: IntoIterator<Item = &'a KeySpec>,
{
    specs.into_iter().map(KeySpec::to_key).collect()
}

fn single_target(targets: Vec<Key>) -> Result<Key, ConfigError> {
    match targets.as_slice() {
        [target] => Ok(*target),
        _ => Err(ConfigError::TargetCount(targets.len())),
    }
}

impl ChordConfig {
    /// Parse a config file's contents on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        let mut config = Self::default();
        let Some(chord) = parsed.chord else {
            return Ok(config);
        };

        if let Some(sources) = &chord.sources {
            config.sources = parse_keys(sources)?;
        }

        let mut targets = Vec::new();
        if let Some(target) = &chord.target {
            targets.push(target.to_key()?);
        }
        if let Some(list) = &chord.targets {
            targets.extend(parse_keys(list)?);
        }
        if chord.target.is_some() || chord.targets.is_some() {
            config.target = single_target(targets)?;
        }

        if let Some(ms) = chord.threshold_ms {
            config.threshold = Duration::from_millis(ms);
        }
        if let Some(us) = chord.settle_us {
            config.settle_delay = Duration::from_micros(us);
        }

        Ok(config)
    }

    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// `~/.config/simulrs/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("simulrs").join("config.toml"))
    }

    /// Load the default config file, or the built-in defaults if there is none
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_toml_path(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ChordOverrides) -> Result<(), ConfigError> {
        if !overrides.sources.is_empty() {
            self.sources = overrides
                .sources
                .iter()
                .map(|s| s.parse().map_err(ConfigError::InvalidKey))
                .collect::<Result<Vec<Key>, _>>()?;
        }
        if !overrides.targets.is_empty() {
            let targets = overrides
                .targets
                .iter()
                .map(|s| s.parse().map_err(ConfigError::InvalidKey))
                .collect::<Result<Vec<Key>, _>>()?;
            self.target = single_target(targets)?;
        }
        if let Some(ms) = overrides.threshold_ms {
            self.threshold = Duration::from_millis(ms);
        }
        if let Some(us) = overrides.settle_us {
            self.settle_delay = Duration::from_micros(us);
        }
        Ok(())
    }

    /// Check every constraint and build the key table the engine runs on
    pub fn validate(&self) -> Result<KeyTable, ConfigError> {
        if self.threshold.is_zero() {
            return Err(ConfigError::InvalidThreshold);
        }
        Ok(KeyTable::new(&self.sources, self.target)?)
    }
}
