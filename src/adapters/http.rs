//! HTTP adapter - chat page plus a JSON endpoint, served with axum.
//!
//! - `GET /` - chat page
//! - `GET /health` - liveness probe
//! - `POST /chat` - `{"message": "..."}` in, `{"reply": "..."}` out

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::Channel;
use crate::agent::{AgentLoop, Context, LlmClient};
use crate::error::Error;
use crate::templates;
use crate::Result;

/// Body returned for every failure that is not the caller's fault.
pub const SERVER_ERROR_MESSAGE: &str = "The assistant could not answer right now.";

/// Shared state handed to every request.
pub struct AppState<C: LlmClient> {
    pub agent: AgentLoop<C>,
    pub context: Context,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

/// Build the router for the given state.
pub fn router<C: LlmClient + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/chat", post(chat::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(templates::INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat<C: LlmClient + 'static>(
    State(state): State<Arc<AppState<C>>>,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let message = req.message.unwrap_or_default();
    if message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Please type a message.");
    }

    match state.agent.run(&message, &state.context).await {
        Ok(response) => Json(ChatReply {
            reply: response.content,
        })
        .into_response(),
        Err(e) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            error!("Exchange failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
        }
    }
}

/// HTTP channel serving the router until Ctrl+C or [`Channel::stop`].
pub struct HttpChannel<C: LlmClient + 'static> {
    state: Arc<AppState<C>>,
    addr: String,
    shutdown: Arc<Notify>,
}

impl<C: LlmClient + 'static> HttpChannel<C> {
    pub fn new(agent: AgentLoop<C>, context: Context, addr: impl Into<String>) -> Self {
        Self {
            state: Arc::new(AppState { agent, context }),
            addr: addr.into(),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl<C: LlmClient + 'static> Channel for HttpChannel<C> {
    fn name(&self) -> &str {
        "http"
    }

    fn start(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        let app = router(self.state.clone());
        let addr = self.addr.clone();
        let shutdown = self.shutdown.clone();

        async move {
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| Error::Http(format!("Failed to bind {addr}: {e}")))?;
            info!("Listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = shutdown.notified() => {}
                    }
                    info!("Shutting down HTTP server");
                })
                .await
                .map_err(|e| Error::Http(e.to_string()))
        }
    }

    fn stop(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        let shutdown = self.shutdown.clone();
        async move {
            shutdown.notify_one();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    use crate::agent::llm::FakeLlmClient;
    use crate::agent::{LlmResponse, ToolCallRequest};

    fn state(client: FakeLlmClient) -> Arc<AppState<FakeLlmClient>> {
        Arc::new(AppState {
            agent: AgentLoop::new(client),
            context: Context::test(),
        })
    }

    async fn post_chat(state: Arc<AppState<FakeLlmClient>>, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req: ChatRequest = serde_json::from_value(body).unwrap();
        let response = chat(State(state), Ok(Json(req))).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_reply() {
        let state = state(FakeLlmClient::new(vec!["Salam, wach rak?"]));
        let (status, body) = post_chat(state.clone(), json!({"message": "salam"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"reply": "Salam, wach rak?"}));
        assert_eq!(state.agent.client().call_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_with_stock_tool() {
        let state = state(FakeLlmClient::with_tool_call(
            "get_product_stock",
            json!({"product_name": "AirPods"}),
            "25 AirPods Pro",
        ));
        let (status, body) = post_chat(state, json!({"message": "AirPods?"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "25 AirPods Pro");
    }

    #[tokio::test]
    async fn test_missing_or_blank_message_is_bad_request() {
        let state = state(FakeLlmClient::new(vec![]));

        let (status, body) = post_chat(state.clone(), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = post_chat(state.clone(), json!({"message": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(state.agent.client().call_count(), 0);
    }

    #[tokio::test]
    async fn test_core_failure_is_opaque_server_error() {
        let state = state(FakeLlmClient::scripted(vec![LlmResponse::tool_calls(vec![
            ToolCallRequest {
                id: "c1".to_string(),
                name: "delete_everything".to_string(),
                arguments: json!({}),
            },
        ])]));
        let (status, body) = post_chat(state, json!({"message": "do it"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": SERVER_ERROR_MESSAGE}));
    }

    #[tokio::test]
    async fn test_unreadable_body_is_json_bad_request() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state(FakeLlmClient::new(vec![])));
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let http = reqwest::Client::new();
        let url = format!("http://{addr}/chat");

        let no_content_type = http.post(&url).body("{\"message\": \"hi\"}").send().await.unwrap();
        let wrong_type = http.post(&url).json(&json!({"message": 5})).send().await.unwrap();
        let not_json = http
            .post(&url)
            .header("content-type", "application/json")
            .body("not json")
            .send()
            .await
            .unwrap();

        for response in [no_content_type, wrong_type, not_json] {
            assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
            let body: serde_json::Value = response.json().await.unwrap();
            assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_serve_and_stop() {
        let channel = HttpChannel::new(
            AgentLoop::new(FakeLlmClient::new(vec!["pong"])),
            Context::test(),
            "127.0.0.1:0",
        );
        assert_eq!(channel.name(), "http");
        assert_eq!(channel.addr(), "127.0.0.1:0");

        channel.stop().await.unwrap();
        let served = tokio::time::timeout(std::time::Duration::from_secs(5), channel.start()).await;
        assert!(matches!(served, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_index_serves_chat_page() {
        let Html(page) = index().await;
        assert!(page.contains("/chat"));
    }
}
