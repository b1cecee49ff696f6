//! # HTTP Server Module
//!
//! Axum-based API server for the scene editor.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/scenes` - List and create scenes
//! - `/api/scenes/:id` - Scene metadata and document set
//! - `/api/scenes/:id/save` - Structural save (bumps version)
//! - `/api/scenes/:id/versions` - Saved version numbers
//! - `/api/scenes/:id/publish` - Static publication

mod scene_routes;
mod server;

pub use scene_routes::{scene_routes, AppState};
pub use server::HttpServer;
