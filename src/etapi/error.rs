use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum EtapiError {
    #[error("Failed to connect to Trilium: {source}")]
    #[diagnostic(
        code(trilium_mcp::etapi::connection_failed),
        help("Is Trilium running? Check that TRILIUM_ETAPI_URL points at the /etapi endpoint.")
    )]
    ConnectionFailed {
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from Trilium: {message}")]
    #[diagnostic(code(trilium_mcp::etapi::invalid_response))]
    InvalidResponse { message: String },

    #[error("Trilium API error ({status}): {message}")]
    #[diagnostic(code(trilium_mcp::etapi::api_error))]
    ApiError { status: u16, message: String },

    #[error("ETAPI token is not a valid header value")]
    #[diagnostic(
        code(trilium_mcp::etapi::invalid_token),
        help("The token must not contain control characters or line breaks.")
    )]
    InvalidToken,

    #[error("Invalid identifier '{id}'")]
    #[diagnostic(code(trilium_mcp::etapi::invalid_identifier))]
    InvalidIdentifier { id: String },

    #[error("Failed to build HTTP client: {message}")]
    #[diagnostic(code(trilium_mcp::etapi::client_build))]
    ClientBuild { message: String },
}

impl From<reqwest::Error> for EtapiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            EtapiError::ConnectionFailed { source: e }
        } else {
            EtapiError::InvalidResponse {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for EtapiError {
    fn from(e: serde_json::Error) -> Self {
        EtapiError::InvalidResponse {
            message: e.to_string(),
        }
    }
}

/// Error body ETAPI sends with non-2xx replies.
#[derive(Debug, Deserialize)]
struct EtapiErrorBody {
    code: Option<String>,
    message: String,
}

impl EtapiError {
    /// Build an [`EtapiError::ApiError`] from a failed reply's status and body.
    ///
    /// Uses the service's own message when the body is ETAPI's JSON error
    /// shape, otherwise the raw body text.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<EtapiErrorBody>(body) {
            Ok(EtapiErrorBody {
                code: Some(code),
                message,
            }) => format!("{} ({})", message, code),
            Ok(EtapiErrorBody { code: None, message }) => message,
            Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
            Err(_) => body.trim().to_string(),
        };
        EtapiError::ApiError { status, message }
    }
}

pub type EtapiResult<T> = Result<T, EtapiError>;
