pub mod telegram_bridge;
