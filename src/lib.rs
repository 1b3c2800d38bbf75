pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod studio;
pub mod traits;

pub use config::{BatchConfig, ExportConfig, GeminiConfig, StudioConfig};
pub use error::{Result, StudioError};
pub use gemini::{EnvCredentials, GeminiImageClient};
pub use models::*;
pub use pipeline::{ExportOptions, ExportedFile, GenerationToken, MemberFailure};
pub use studio::{GenerationOutcome, Studio};
pub use traits::{Clock, CredentialProvider, ImageBackend, SavePicker, SeedSource};
