pub mod logger;
pub mod fetch_data;
pub mod retry;
pub mod format;
pub mod health_check;

// Re-export commonly used items
pub use logger::{init_tracing, Logger};
pub use fetch_data::{fetch_text, HttpFetch, ReqwestFetcher};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use format::{format_btc, render_batches, to_csv_bytes, write_csv};
pub use health_check::{log_health_check, perform_health_check};
