use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::etapi::EtapiError;

#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Etapi(#[from] EtapiError),

    #[error("I/O error: {0}")]
    #[diagnostic(code(trilium_mcp::io))]
    Io(#[from] std::io::Error),

    #[error("MCP transport error: {message}")]
    #[diagnostic(code(trilium_mcp::transport))]
    Transport { message: String },
}

pub type AppResult<T> = Result<T, AppError>;
