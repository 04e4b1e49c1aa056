use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unrecognized response shape: {0}")]
    UnrecognizedShape(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("image data is empty")]
    EmptyInput,

    #[error("column count must be greater than zero")]
    ZeroColumns,

    #[error("could not determine image format: {0}")]
    UnknownFormat(String),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("decoded image has zero width or height")]
    ZeroDimensions,
}
