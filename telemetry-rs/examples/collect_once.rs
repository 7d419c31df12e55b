use telemetry_rs::{DeviceInfo, HostContext, MessagingBridge, SummaryLayout, TelemetryCollector};

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::FmtSubscriber;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

struct PrintBridge;

impl MessagingBridge for PrintBridge {
    fn send_data(&self, payload: String) {
        println!("bridge <- {payload}");
    }
}

struct ThisMachine {
    bridge: PrintBridge,
}

impl HostContext for ThisMachine {
    fn device(&self) -> DeviceInfo {
        DeviceInfo {
            user_agent: Some(format!(
                "telemetry_rs-example ({}; {})",
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            platform: Some(std::env::consts::OS.to_string()),
            architecture: Some(std::env::consts::ARCH.to_string()),
            locale: std::env::var("LANG").ok(),
            ..Default::default()
        }
    }

    fn bridge(&self) -> Option<&dyn MessagingBridge> {
        Some(&self.bridge)
    }
}

#[tokio::main]
async fn main() {
    #[cfg(feature = "tracing")]
    init_tracing();

    let collector = TelemetryCollector::new(
        ThisMachine {
            bridge: PrintBridge,
        },
        None,
    )
    .expect("failed to build collector");

    let snapshot = collector.collect().await;
    for field in snapshot.fields() {
        println!("{:<14} {}", field.name.as_str(), field.value);
    }

    let _ = collector.send(&snapshot, &SummaryLayout::default());
}
