/// The node registry service: append-only directory of relays

use super::responses::{NodeRegistryResponse, RegisterNodeRequest, RegisterNodeResponse};
use super::status;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use onionet_common::NetworkConfig;
use onionet_core::NodeDirectory;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared registry state
#[derive(Clone, Default)]
pub struct RegistryState {
    directory: Arc<RwLock<NodeDirectory>>,
}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the registry router
pub fn router(state: RegistryState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/registerNode", post(register_node))
        .route("/getNodeRegistry", get(get_node_registry))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for POST /registerNode
async fn register_node(
    State(state): State<RegistryState>,
    Json(request): Json<RegisterNodeRequest>,
) -> Json<RegisterNodeResponse> {
    state
        .directory
        .write()
        .await
        .register(request.node_id, request.pub_key);

    Json(RegisterNodeResponse::success())
}

/// Handler for GET /getNodeRegistry
async fn get_node_registry(State(state): State<RegistryState>) -> Json<NodeRegistryResponse> {
    let nodes = state.directory.read().await.snapshot();
    Json(NodeRegistryResponse { nodes })
}

/// The registry service, bound to the configured registry port
pub struct RegistryService {
    config: NetworkConfig,
}

impl RegistryService {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.config.registry_port));
        info!("Registry starting on {}", addr);

        super::serve(addr, router(RegistryState::new())).await
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
    async fn status_reports_live() {
        let app = router(RegistryState::new());

        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_then_list() {
        let app = router(RegistryState::new());

        let register = Request::post("/registerNode")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"nodeId": 3, "pubKey": "abc"}"#))
            .unwrap();
        let response = app.clone().oneshot(register).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"], "success");

        let list = Request::get("/getNodeRegistry").body(Body::empty()).unwrap();
        let response = app.oneshot(list).await.unwrap();
        let body = body_json(response).await;

        assert_eq!(body["nodes"][0]["nodeId"], 3);
        assert_eq!(body["nodes"][0]["pubKey"], "abc");
    }
}
