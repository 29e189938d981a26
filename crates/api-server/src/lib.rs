#![warn(clippy::unwrap_used)]

pub mod alerts_rest;
pub mod brief_rest;
pub mod rest;
pub mod server;
pub mod swagger;

pub use rest::AppState;
pub use server::{router, ApiServer};
pub use swagger::ApiDoc;
