use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use telemetry_rs::{
    fields::MISSING,
    lookups::RemoteLookup,
    snapshot::SnapshotState,
    types::Config,
    DeviceInfo, FieldName, HostContext, MessagingBridge, MiniAppContext, Schema, SummaryLayout,
    TelemetryCollector,
};

#[derive(Default)]
struct RecordingBridge {
    sent: Mutex<Vec<String>>,
}

impl MessagingBridge for RecordingBridge {
    fn send_data(&self, payload: String) {
        self.sent.lock().unwrap().push(payload);
    }
}

#[derive(Default)]
struct TestHost {
    device: DeviceInfo,
    mini_app: Option<MiniAppContext>,
    bridge: RecordingBridge,
}

impl HostContext for TestHost {
    fn device(&self) -> DeviceInfo {
        self.device.clone()
    }

    fn mini_app(&self) -> Option<MiniAppContext> {
        self.mini_app.clone()
    }

    fn bridge(&self) -> Option<&dyn MessagingBridge> {
        Some(&self.bridge)
    }
}

async fn spawn_endpoints(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn geo_record() -> Value {
    json!({
        "ip": "203.0.113.7",
        "org": "Example ISP",
        "asn": "AS64500",
        "region": "Berlin",
        "country_name": "Germany",
        "country_code": "DE",
        "latitude": 52.52,
        "longitude": 13.405,
        "timezone": "Europe/Berlin"
    })
}

fn config_for(addr: SocketAddr) -> Config {
    Config {
        ipv4_endpoint: format!("http://{addr}/v4"),
        ipv6_endpoint: format!("http://{addr}/v6"),
        geo_endpoint: format!("http://{addr}/geo"),
        timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

fn windows_host() -> TestHost {
    TestHost {
        device: DeviceInfo {
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()),
            platform: Some("Win32".into()),
            screen_width: Some(1920),
            screen_height: Some(1080),
            pixel_ratio: Some(1.25),
            locale: Some("en-US".into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn collects_every_declared_field() {
    let router = Router::new()
        .route("/v4", get(|| async { Json(json!({ "ip": "203.0.113.7" })) }))
        .route("/v6", get(|| async { StatusCode::BAD_GATEWAY }))
        .route("/geo", get(|| async { Json(geo_record()) }));
    let addr = spawn_endpoints(router).await;

    let collector = TelemetryCollector::new(windows_host(), Some(config_for(addr))).unwrap();
    let snapshot = collector.collect().await;

    assert_eq!(snapshot.state(), SnapshotState::Ready);
    assert!(snapshot.pending().is_empty());
    assert_eq!(snapshot.get(FieldName::Ipv4), Some("203.0.113.7"));
    assert_eq!(snapshot.get(FieldName::Ipv6), Some("Not supported"));
    assert_eq!(snapshot.get(FieldName::City), Some(MISSING));
    assert_eq!(snapshot.get(FieldName::Isp), Some("Example ISP"));
    assert_eq!(snapshot.get(FieldName::Country), Some("Germany (DE)"));
    assert_eq!(snapshot.get(FieldName::Longitude), Some("13.405"));
    assert_eq!(snapshot.get(FieldName::Os), Some("Windows"));
    assert_eq!(snapshot.get(FieldName::Screen), Some("1920 × 1080"));
    assert_eq!(snapshot.get(FieldName::PixelRatio), Some("1.25"));
    for field in snapshot.fields() {
        assert!(!field.value.is_empty(), "{} is empty", field.name);
    }
}

#[tokio::test]
async fn unreachable_ipv6_endpoint_reads_not_supported() {
    let router = Router::new().route("/v4", get(|| async { Json(json!({ "ip": "203.0.113.7" })) }));
    let addr = spawn_endpoints(router).await;

    let collector = TelemetryCollector::new(TestHost::default(), Some(config_for(addr))).unwrap();
    // Nothing listens on port 9 of the loopback interface.
    let partial = collector
        .collect_remote(&RemoteLookup::ipv6("http://127.0.0.1:9/"))
        .await;
    assert_eq!(partial.get(FieldName::Ipv6), Some("Not supported"));

    let partial = collector
        .collect_remote(&RemoteLookup::ipv4(format!("http://{addr}/v4")))
        .await;
    assert_eq!(partial.get(FieldName::Ipv4), Some("203.0.113.7"));
}

#[tokio::test]
async fn malformed_geo_body_falls_back_atomically() {
    let router = Router::new()
        .route("/v4", get(|| async { Json(json!({ "ip": "198.51.100.4" })) }))
        .route("/v6", get(|| async { Json(json!({ "ip": "2001:db8::1" })) }))
        .route("/geo", get(|| async { "<html>rate limited</html>" }));
    let addr = spawn_endpoints(router).await;

    let collector = TelemetryCollector::new(TestHost::default(), Some(config_for(addr))).unwrap();
    let snapshot = collector.collect().await;

    for field in [
        FieldName::Isp,
        FieldName::Asn,
        FieldName::City,
        FieldName::Region,
        FieldName::Country,
        FieldName::Latitude,
        FieldName::Longitude,
        FieldName::Timezone,
    ] {
        assert_eq!(snapshot.get(field), Some(field.fallback()));
    }
    assert_eq!(snapshot.get(FieldName::Ipv4), Some("198.51.100.4"));
    assert_eq!(snapshot.get(FieldName::Ipv6), Some("2001:db8::1"));
}

#[tokio::test]
async fn rejected_lookup_uses_fallbacks() {
    let router = Router::new().route(
        "/geo",
        get(|| async { Json(json!({ "error": true, "reason": "RateLimited", "city": "Paris" })) }),
    );
    let addr = spawn_endpoints(router).await;

    let collector = TelemetryCollector::new(TestHost::default(), Some(config_for(addr))).unwrap();
    let partial = collector
        .collect_remote(&RemoteLookup::geo(format!("http://{addr}/geo")))
        .await;
    assert_eq!(partial.get(FieldName::City), Some(MISSING));
    assert_eq!(partial.len(), 8);
}

#[tokio::test]
async fn collect_and_send_delivers_ready_summary() {
    let router = Router::new()
        .route("/v4", get(|| async { Json(json!({ "ip": "203.0.113.7" })) }))
        .route("/v6", get(|| async { StatusCode::NOT_FOUND }))
        .route("/geo", get(|| async { Json(geo_record()) }));
    let addr = spawn_endpoints(router).await;

    let collector = TelemetryCollector::new(windows_host(), Some(config_for(addr))).unwrap();
    let layout = SummaryLayout::parse(["ip=ipv4", "isp", "os"]).unwrap();
    let snapshot = collector.collect_and_send(&layout).await.unwrap();
    assert!(snapshot.is_ready());

    let sent = collector.host().bridge.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![r#"{"ip":"203.0.113.7","isp":"Example ISP","os":"Windows"}"#.to_string()]
    );
}

#[tokio::test]
async fn mini_app_schema_carries_profile_fields() {
    let router = Router::new()
        .route("/v4", get(|| async { Json(json!({ "ip": "203.0.113.7" })) }))
        .route("/v6", get(|| async { Json(json!({ "ip": "2001:db8::7" })) }))
        .route("/geo", get(|| async { Json(geo_record()) }));
    let addr = spawn_endpoints(router).await;

    let host = TestHost {
        mini_app: Some(MiniAppContext {
            username: Some("alice".into()),
            language_code: Some("de".into()),
            is_premium: false,
            color_scheme: Some("light".into()),
            platform: Some("android".into()),
        }),
        ..windows_host()
    };
    let collector = TelemetryCollector::new(host, Some(config_for(addr)))
        .unwrap()
        .with_schema(Schema::mini_app());
    let snapshot = collector.collect().await;

    assert!(snapshot.is_ready());
    assert_eq!(snapshot.get(FieldName::Username), Some("alice"));
    assert_eq!(snapshot.get(FieldName::Premium), Some("No"));
    assert_eq!(snapshot.get(FieldName::AppPlatform), Some("android"));

    let layout = SummaryLayout::of(&[FieldName::Username, FieldName::Ipv6]);
    assert_eq!(
        snapshot.serialize(&layout).unwrap(),
        r#"{"username":"alice","ipv6":"2001:db8::7"}"#
    );
}
