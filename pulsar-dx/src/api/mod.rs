//! HTTP API handlers

pub mod health;
pub mod history;
pub mod predict;

pub use health::health_routes;
pub use history::history_routes;
pub use predict::predict_routes;
