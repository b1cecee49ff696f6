//! Observability for scenebase
//!
//! Structured JSON logging only. Logging is synchronous, read-only with
//! respect to application state, and deterministic: the same event with the
//! same fields always produces the same line.
//!
//! Pipeline events: `SCENE_SAVED`, `PUBLISH_START`, `PUBLISH_COMPLETE`,
//! `ASSET_COPY_FAILED`, `SERVER_START`.

mod logger;

pub use logger::{Logger, Severity};
