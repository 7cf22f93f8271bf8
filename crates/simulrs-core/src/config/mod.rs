// Simulrs Config
// Chord group configuration loaded from TOML and the command line

pub mod parser;

pub use parser::{
    ChordConfig, ChordOverrides, ConfigError, ConfigToml, KeySpec, DEFAULT_SETTLE_US,
    DEFAULT_THRESHOLD_MS,
};
