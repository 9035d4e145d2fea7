pub type FramemarkResult<T> = Result<T, FramemarkError>;

#[derive(thiserror::Error, Debug)]
pub enum FramemarkError {
    /// Unknown model selection name. No processing has happened yet.
    #[error("invalid model selection: '{0}'")]
    InvalidSelection(String),

    /// Processing was requested with no uploads.
    #[error("no uploads to process")]
    MissingUpload,

    /// The Custom model requires both auxiliary uploads at construction.
    #[error("missing auxiliary file: {0}")]
    MissingAuxiliaryFile(&'static str),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramemarkError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
