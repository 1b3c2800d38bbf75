pub mod credentials;
pub mod image_client;

pub use credentials::EnvCredentials;
pub use image_client::GeminiImageClient;
