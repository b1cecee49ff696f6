//! scenebase - A self-hostable backend for a web 3D scene editor
//!
//! Scenes are versioned document sets held in a small checksummed document
//! store; the publication pipeline freezes any version into a relocatable
//! static bundle.

pub mod cli;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod publish;
pub mod scene;
pub mod store;
