/// HTTP service bindings for the onion-routing simulation
///
/// Three axum services share this module:
/// - the registry (node directory)
/// - relay nodes (peel-and-forward)
/// - user services (send/receive introspection)

pub mod registry;
pub mod relay;
pub mod responses;
pub mod user;

pub use registry::RegistryService;
pub use relay::RelayService;
pub use user::UserService;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use onionet_common::OnionetError;
use onionet_core::{CircuitError, CryptoError, OnionError};
use responses::ErrorResponse;
use std::net::SocketAddr;
use tracing::{error, info};

/// Liveness probe shared by all services
pub async fn status() -> &'static str {
    "live"
}

/// Bind and run a router until the process exits
pub async fn serve(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Service listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

/// Application error type mapped onto HTTP responses
pub struct AppError {
    message: String,
    status_code: StatusCode,
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("API Error: {}", self.message);

        let body = Json(ErrorResponse::new(self.message, self.status_code.as_u16()));

        (self.status_code, body).into_response()
    }
}

impl From<OnionetError> for AppError {
    fn from(err: OnionetError) -> Self {
        match err {
            OnionetError::Transport(_) | OnionetError::Registry(_) => {
                AppError::unavailable(err.to_string())
            }
            _ => AppError::internal(err.to_string()),
        }
    }
}

impl From<CircuitError> for AppError {
    fn from(err: CircuitError) -> Self {
        // Not enough relays registered yet; the caller may retry later.
        AppError::unavailable(err.to_string())
    }
}

impl From<OnionError> for AppError {
    fn from(err: OnionError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<CryptoError> for AppError {
    fn from(err: CryptoError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}
