//! In-memory stores

mod dashboard_store;

pub use dashboard_store::DashboardStore;
