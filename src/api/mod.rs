//! API layer - HTTP endpoint handlers organized by concern.

mod health;
mod metrics;
mod models;
mod reports;
mod routes;
mod status;

pub use health::{health, stats, ChannelHealth, HealthResponse, StatsResponse};
pub use metrics::prometheus_metrics;
pub use models::{
    bounded_text, ReportAcceptedResponse, ReportFoundRequest, ReportLostRequest,
    StatusChangeRequest, StatusChangeResponse, ThirdPartyReport,
};
pub use reports::{report_found, report_lost};
pub use routes::api_routes;
pub use status::change_status;
