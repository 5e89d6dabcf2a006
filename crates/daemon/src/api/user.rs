/// A user service: sends messages through fresh circuits and records
/// the last message sent/received for introspection.

use super::responses::{
    LastCircuitResponse, LastMessageResponse, MessageRequest, SendMessageRequest,
};
use super::{status, AppError};
use crate::client::NetClient;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use onionet_common::{NetworkConfig, NodeId, UserId};
use onionet_core::{build_circuit, wrap};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

/// What this user last sent and received
#[derive(Debug, Default)]
pub struct UserLog {
    pub received: Option<String>,
    pub sent: Option<String>,
    pub circuit: Vec<NodeId>,
}

/// Shared user state
#[derive(Clone)]
pub struct UserState {
    user_id: UserId,
    config: NetworkConfig,
    client: NetClient,
    log: Arc<RwLock<UserLog>>,
}

impl UserState {
    pub fn new(user_id: UserId, config: NetworkConfig) -> Self {
        let client = NetClient::new(config.clone());
        Self {
            user_id,
            config,
            client,
            log: Arc::new(RwLock::new(UserLog::default())),
        }
    }
}

/// Build the user router
pub fn router(state: UserState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/message", post(receive_message))
        .route("/sendMessage", post(send_message))
        .route("/getLastReceivedMessage", get(get_last_received))
        .route("/getLastSentMessage", get(get_last_sent))
        .route("/getLastCircuit", get(get_last_circuit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for POST /message: the end of the onion route
async fn receive_message(
    State(state): State<UserState>,
    Json(request): Json<MessageRequest>,
) -> &'static str {
    info!("User {} received a message", state.user_id);
    state.log.write().await.received = Some(request.message);
    "success"
}

/// Handler for POST /sendMessage: circuit build, wrap, transmit.
///
/// The last-sent fields are updated only after the payload reached the
/// entry node; any earlier failure aborts with no state change.
async fn send_message(
    State(state): State<UserState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<&'static str, AppError> {
    let nodes = state.client.fetch_node_registry().await?;
    let circuit = build_circuit(&nodes, state.config.circuit_length)?;

    let destination_port = state.config.user_port(request.destination_user_id);
    let wrapped = wrap(
        circuit,
        destination_port,
        &request.message,
        state.config.base_relay_port,
    )?;

    let entry_port = state.config.relay_port(wrapped.entry_node().node_id);
    state.client.post_message(entry_port, &wrapped.payload).await?;

    info!(
        "User {} sent a message to user {} via entry node {}",
        state.user_id,
        request.destination_user_id,
        wrapped.entry_node().node_id
    );

    let mut log = state.log.write().await;
    log.sent = Some(request.message);
    log.circuit = wrapped.hops.iter().map(|n| n.node_id).collect();

    Ok("success")
}

async fn get_last_received(State(state): State<UserState>) -> Json<LastMessageResponse> {
    Json(LastMessageResponse {
        result: state.log.read().await.received.clone(),
    })
}

async fn get_last_sent(State(state): State<UserState>) -> Json<LastMessageResponse> {
    Json(LastMessageResponse {
        result: state.log.read().await.sent.clone(),
    })
}

async fn get_last_circuit(State(state): State<UserState>) -> Json<LastCircuitResponse> {
    Json(LastCircuitResponse {
        result: state.log.read().await.circuit.clone(),
    })
}

/// A user service bound to `base_user_port + user_id`
pub struct UserService {
    user_id: UserId,
    config: NetworkConfig,
}

impl UserService {
    pub fn new(user_id: UserId, config: NetworkConfig) -> Self {
        Self { user_id, config }
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.config.user_port(self.user_id)));
        info!("User {} starting on {}", self.user_id, addr);

        super::serve(addr, router(UserState::new(self.user_id, self.config))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn received_message_is_stored() {
        let app = router(UserState::new(UserId(0), Default::default()));

        let deliver = Request::post("/message")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message": "hello"}"#))
            .unwrap();
        let response = app.clone().oneshot(deliver).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let query = Request::get("/getLastReceivedMessage")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(query).await.unwrap();
        assert_eq!(body_json(response).await["result"], "hello");
    }

    #[tokio::test]
    async fn send_without_registry_leaves_state_untouched() {
        // Port 1 is unreachable, so the registry fetch fails before any
        // state mutation.
        let config = NetworkConfig::default().with_registry_port(1);
        let app = router(UserState::new(UserId(0), config));

        let send = Request::post("/sendMessage")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message": "m", "destinationUserId": 1}"#))
            .unwrap();
        let response = app.clone().oneshot(send).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let query = Request::get("/getLastSentMessage")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(query).await.unwrap();
        assert!(body_json(response).await["result"].is_null());
    }
}
