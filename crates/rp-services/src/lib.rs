//! repute/crates/rp-services/src/lib.rs
//!
//! Business logic for repute: mention classification, response drafting and
//! dashboard insights. Everything external is reached through the `rp-core` ports.

pub mod alerts;
pub mod cache;
pub mod checklist;
pub mod dashboard;
pub mod inflight;
pub mod insights;
pub mod llm;
pub mod mentions;
pub mod prompt;
pub mod response;
pub mod sentiment;

pub use alerts::AlertService;
pub use cache::{compute_key, InsightCache};
pub use dashboard::DashboardService;
pub use insights::{InsightOptions, InsightService};
pub use mentions::MentionService;
pub use response::{ResponseOptions, ResponseService};
pub use sentiment::classify;
