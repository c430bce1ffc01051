//! Error type shared by the aligner, heading filter and configuration loader

/// Errors reported by this crate.
///
/// None of these are fatal: callers log them and keep processing samples.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reset service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("reset service call failed: {0}")]
    ServiceCall(String),

    #[error("magnetic field vector has near-zero magnitude")]
    DegenerateMagneticField,

    #[error("orientation quaternion has near-zero norm")]
    DegenerateQuaternion,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
