pub mod config;
pub mod error;
pub mod models;
pub mod prompt;
pub mod report;
pub mod service;
pub mod upstream;

pub use config::DeepSeekConfig;
pub use error::{PolishError, Result};
pub use service::{AppState, build_router, create_app};
pub use upstream::{CompletionApi, DeepSeekClient};
pub use models::*;
