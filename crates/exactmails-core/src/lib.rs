// Core client logic lives here - the brain of the operation
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod session;
pub mod session_store;
pub mod validate;

pub use config::Config;
pub use dashboard::{
    calculate_metrics, discovery_trend, recent_activity, ActivityEntry, DashboardMetrics,
    DiscoveryTrend, TrendPoint,
};
pub use error::Error;
pub use export::{ExportFormat, Exporter};
pub use history::HistoryList;
pub use models::{
    record_from_wire, records_from_wire, EmailFinding, EmailStatus, SearchKind, SearchOutcome,
    SearchRecord,
};
pub use session::{ApiBackend, Session, SessionApi, SessionState, GOOGLE_EXCHANGE_DEBOUNCE};
pub use session_store::SessionStore;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
