/// A relay node service: peel one onion layer, forward the remainder.
///
/// Peel or forward failures drop the message; the sender gets no
/// delivery signal (accepted non-goal of the simulation).

use super::responses::{LastDestinationResponse, LastMessageResponse, MessageRequest};
use super::{status, AppError};
use crate::client::NetClient;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use onionet_common::{NetworkConfig, NodeId};
use onionet_core::{export_private_key, export_public_key, peel, RsaKeyPair};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// What this relay last saw, for test introspection
#[derive(Debug, Default)]
pub struct RelayLog {
    pub received_encrypted: Option<String>,
    pub received_decrypted: Option<String>,
    pub destination: Option<u16>,
}

/// Shared relay state
#[derive(Clone)]
pub struct RelayState {
    node_id: NodeId,
    keys: Arc<RsaKeyPair>,
    client: NetClient,
    log: Arc<RwLock<RelayLog>>,
}

impl RelayState {
    pub fn new(node_id: NodeId, keys: RsaKeyPair, client: NetClient) -> Self {
        Self {
            node_id,
            keys: Arc::new(keys),
            client,
            log: Arc::new(RwLock::new(RelayLog::default())),
        }
    }
}

/// Build the relay router
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/message", post(handle_message))
        .route(
            "/getLastReceivedEncryptedMessage",
            get(get_last_received_encrypted),
        )
        .route(
            "/getLastReceivedDecryptedMessage",
            get(get_last_received_decrypted),
        )
        .route("/getLastMessageDestination", get(get_last_destination))
        .route("/getPrivateKey", get(get_private_key))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for POST /message: peel and forward
async fn handle_message(
    State(state): State<RelayState>,
    Json(request): Json<MessageRequest>,
) -> &'static str {
    state.log.write().await.received_encrypted = Some(request.message.clone());

    let layer = match peel(&request.message, state.keys.private_key()) {
        Ok(layer) => layer,
        Err(e) => {
            warn!("Relay {} dropping message: {}", state.node_id, e);
            return "success";
        }
    };

    {
        let mut log = state.log.write().await;
        log.received_decrypted = Some(layer.inner.clone());
        log.destination = Some(layer.next_port);
    }

    if let Err(e) = state.client.post_message(layer.next_port, &layer.inner).await {
        warn!(
            "Relay {} dropping message: forward to {} failed: {}",
            state.node_id, layer.next_port, e
        );
    }

    "success"
}

async fn get_last_received_encrypted(
    State(state): State<RelayState>,
) -> Json<LastMessageResponse> {
    Json(LastMessageResponse {
        result: state.log.read().await.received_encrypted.clone(),
    })
}

async fn get_last_received_decrypted(
    State(state): State<RelayState>,
) -> Json<LastMessageResponse> {
    Json(LastMessageResponse {
        result: state.log.read().await.received_decrypted.clone(),
    })
}

async fn get_last_destination(State(state): State<RelayState>) -> Json<LastDestinationResponse> {
    Json(LastDestinationResponse {
        result: state.log.read().await.destination,
    })
}

/// Handler for GET /getPrivateKey (simulation-only introspection so
/// tests can open this relay's layers)
async fn get_private_key(
    State(state): State<RelayState>,
) -> Result<Json<LastMessageResponse>, AppError> {
    let exported = export_private_key(state.keys.private_key())?;
    Ok(Json(LastMessageResponse {
        result: Some(exported),
    }))
}

/// A relay node service bound to `base_relay_port + node_id`
pub struct RelayService {
    node_id: NodeId,
    config: NetworkConfig,
}

impl RelayService {
    pub fn new(node_id: NodeId, config: NetworkConfig) -> Self {
        Self { node_id, config }
    }

    /// Generate keys, register with the registry, then serve
    pub async fn start(self) -> anyhow::Result<()> {
        let keys = RsaKeyPair::generate()?;
        let client = NetClient::new(self.config.clone());

        client
            .register_node(self.node_id, export_public_key(keys.public_key())?)
            .await?;
        info!("Relay {} registered with the registry", self.node_id);

        let addr = SocketAddr::from(([127, 0, 0, 1], self.config.relay_port(self.node_id)));
        info!("Relay {} starting on {}", self.node_id, addr);

        super::serve(addr, router(RelayState::new(self.node_id, keys, client))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn introspection_starts_empty() {
        let keys = RsaKeyPair::generate().unwrap();
        let state = RelayState::new(NodeId(0), keys, NetClient::new(Default::default()));
        let app = router(state);

        let response = app
            .oneshot(
                Request::get("/getLastMessageDestination")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["result"].is_null());
    }
}
