use thiserror::Error;

use crate::modules::chat::{ChatError, LLMError};
use crate::modules::config::ConfigError;
use crate::modules::contact::{ContactError, SubmitError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Model error: {0}")]
    Model(#[from] LLMError),

    #[error("Contact form error: {0}")]
    Contact(#[from] ContactError),

    #[error("Form endpoint error: {0}")]
    FormEndpoint(#[from] SubmitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
