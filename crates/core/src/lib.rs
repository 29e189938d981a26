pub mod config;
pub mod error;
pub mod types;
pub mod window;

pub use config::AppConfig;
pub use error::{CopilotError, CopilotResult};
pub use types::{DailySegmentRecord, RollingWindowRecord};
pub use window::DateWindow;
