use thiserror::Error;

/// Errors raised while compiling or executing plugin source.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to parse {identifier}: {reason}")]
    Parse { identifier: String, reason: String },

    #[error("{identifier} raised an error while loading: {reason}")]
    Runtime { identifier: String, reason: String },

    #[error("{identifier} does not export a valid plugin: {reason}")]
    InvalidExport { identifier: String, reason: String },
}

impl SandboxError {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Parse { identifier, .. }
            | Self::Runtime { identifier, .. }
            | Self::InvalidExport { identifier, .. } => identifier,
        }
    }
}
