pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid object reference `{value}` (expected `<type>:<id>`)")]
    InvalidObjectRef { value: String },

    #[error("unknown object status code {code:#04x}")]
    UnknownStatusCode { code: u32 },

    #[error("unknown overlay mode: {value}")]
    UnknownOverlayMode { value: String },

    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
