pub mod collector;
pub mod errors;
pub mod fields;
pub mod host;
pub mod local;
pub mod lookups;
pub mod snapshot;
pub mod types;
pub mod utils;

pub use collector::TelemetryCollector;
pub use fields::{FieldName, Schema};
pub use host::{DeviceInfo, HostContext, MessagingBridge, MiniAppContext};
pub use snapshot::{SummaryLayout, TelemetrySnapshot};
