#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod events;
pub mod state;

pub use controller::DashboardController;
pub use events::{DashboardEvents, LogEvents, INSIGHT_CHANGED, READINGS_CHANGED};
pub use state::{DashboardSnapshot, InsightState};
