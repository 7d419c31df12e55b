pub mod telemetry_service;
