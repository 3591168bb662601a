use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlmersalError {
    #[error("Message catalogue error: {0}")]
    Catalogue(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Amount is too large to price")]
    AmountTooLarge,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum QrError {
    #[error("Failed to encode QR payload: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Failed to render QR image: {0}")]
    Image(#[from] image::ImageError),
}
