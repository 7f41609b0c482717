//! Configuration error types.

/// Errors that can occur when loading, saving, parsing, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read `config.ron`.
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write `config.ron`.
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    /// The file is not valid RON for [`crate::Config`].
    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// Serializing the config to RON failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),

    /// A value parsed fine but is out of its allowed range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field, e.g. `terrain.height_divisor`.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}
