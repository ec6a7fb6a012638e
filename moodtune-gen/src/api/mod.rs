//! HTTP API handlers for moodtune-gen

pub mod download;
pub mod generate;
pub mod health;
pub mod ui;

pub use download::download_routes;
pub use generate::generate_routes;
pub use health::health_routes;
pub use ui::ui_routes;
