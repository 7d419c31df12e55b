use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::*,
    Json, Router,
};
use serde_json::{json, Value};
use telemetry_rs::TelemetrySnapshot;
use tokio::net;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{app_state::AppState, auth_middleware::AuthenticatedRequest, device_report::DeviceReport};
use crate::domain::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    pub async fn new(config: HttpServerConfig<'_>, state: AppState) -> anyhow::Result<Self> {
        let addr = SocketAddr::from((
            [0, 0, 0, 0, 0, 0, 0, 0],
            config.port.parse::<u16>().unwrap_or(3000),
        ));

        let listener = net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to listen on port {}", config.port))?;

        Ok(Self {
            router: router(state),
            listener,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        });

    Router::new()
        .route("/health", get(health_route))
        .nest("/api", api_routes())
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/snapshot", get(snapshot_route))
        .route("/refresh", post(refresh_route))
        .route("/send", post(send_route))
        .route("/report", post(report_route))
}

async fn health_route() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

async fn snapshot_route(State(state): State<AppState>) -> Json<TelemetrySnapshot> {
    Json(state.telemetry_service.current().await)
}

async fn refresh_route(
    _auth: AuthenticatedRequest,
    State(state): State<AppState>,
) -> Json<TelemetrySnapshot> {
    Json(state.telemetry_service.refresh().await)
}

async fn send_route(
    _auth: AuthenticatedRequest,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let payload = state.telemetry_service.send_current().await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "payload": payload }))))
}

async fn report_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(report): Json<DeviceReport>,
) -> Result<Json<Value>, AppError> {
    let (snapshot, payload) = state
        .telemetry_service
        .collect_reported(report, &headers)
        .await?;
    Ok(Json(json!({ "snapshot": snapshot, "payload": payload })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_config::AppConfig, application::services::telemetry_service::TelemetryService,
        config::Config,
    };
    use std::sync::Arc;

    // Nothing listens on the discard port, so every lookup fails fast.
    fn offline_settings() -> AppConfig {
        AppConfig {
            ipv4_endpoint: "http://127.0.0.1:9/v4".into(),
            ipv6_endpoint: "http://127.0.0.1:9/v6".into(),
            geo_endpoint: "http://127.0.0.1:9/geo".into(),
            lookup_timeout_secs: 2,
            ..Default::default()
        }
    }

    async fn spawn_app() -> String {
        let service = TelemetryService::start(offline_settings(), None).await.unwrap();
        let state = AppState {
            config: Config {
                server_port: "0".into(),
                server_access_token: "secret".into(),
                telegram: None,
            },
            telemetry_service: Arc::new(service),
        };
        let listener = net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn health_is_ok() {
        let base = spawn_app().await;
        let res = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(res.text().await.unwrap(), "OK");
    }

    #[tokio::test]
    async fn snapshot_is_ready_with_fallbacks() {
        let base = spawn_app().await;
        let body: Value = reqwest::get(format!("{base}/api/snapshot"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["state"], "ready");
        let fields = body["fields"].as_array().unwrap();
        let ipv4 = fields.iter().find(|f| f["name"] == "ipv4").unwrap();
        assert_eq!(ipv4["value"], "Unavailable");
        assert_eq!(ipv4["source"], "network");
    }

    #[tokio::test]
    async fn refresh_requires_token() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let res = client.post(format!("{base}/api/refresh")).send().await.unwrap();
        assert_eq!(res.status().as_u16(), 401);

        let res = client
            .post(format!("{base}/api/refresh"))
            .bearer_auth("wrong")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 401);

        let res = client
            .post(format!("{base}/api/refresh"))
            .bearer_auth("secret")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn send_without_bridge_is_unavailable() {
        let base = spawn_app().await;
        let res = reqwest::Client::new()
            .post(format!("{base}/api/send"))
            .bearer_auth("secret")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 503);
    }

    #[tokio::test]
    async fn report_uses_client_device() {
        let base = spawn_app().await;
        let body: Value = reqwest::Client::new()
            .post(format!("{base}/api/report"))
            .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .json(&json!({
                "screen_width": 390,
                "screen_height": 844,
                "mini_app": { "username": "alice", "color_scheme": "dark" }
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let value_of = |name: &str| {
            body["snapshot"]["fields"]
                .as_array()
                .unwrap()
                .iter()
                .find(|f| f["name"] == name)
                .map(|f| f["value"].clone())
        };
        assert_eq!(value_of("os"), Some(json!("Windows")));
        assert_eq!(value_of("screen"), Some(json!("390 × 844")));
        assert_eq!(value_of("username"), Some(json!("alice")));
        assert_eq!(value_of("ipv6"), Some(json!("Not supported")));
        assert_eq!(body["payload"], Value::Null);
    }
}
