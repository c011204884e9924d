pub mod config;
pub mod element_finder;
pub mod housekeeping;
pub mod models;
pub mod monitor;
pub mod plugins;
pub mod retry;
pub mod scheduler;
pub mod scraper;
pub mod stock_state;
pub mod utils;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::housekeeping::LogJanitor;
pub use crate::models::{StockNotification, StockState, TrackedProduct};
pub use crate::monitor::{ProductCheckResult, StockMonitor, TickReport};
pub use crate::plugins::{DiscordNotifier, Notifier};
pub use crate::retry::RetryPolicy;
pub use crate::scheduler::{SchedulerHandle, SchedulerStats, StockScheduler};
pub use crate::scraper::{HttpFetcher, PageFetcher};
pub use crate::stock_state::{StockStateStore, Transition};
pub use crate::utils::error::{AppError, FetchError, NotifyError};

pub type Result<T> = std::result::Result<T, AppError>;
