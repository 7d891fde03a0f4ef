pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, EnvSecrets, Secrets};
pub use error::CheckError;
pub use types::{Credentials, Outcome, ProbeResult, ReportContext};
