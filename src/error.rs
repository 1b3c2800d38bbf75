use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Image generation blocked by safety filters.")]
    SafetyBlocked,

    #[error("{0}")]
    AccessDenied(String),

    #[error("All image generations failed. Please check your prompt or try again.")]
    BatchExhausted { attempts: usize },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("No image data found.")]
    NoImageData,

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl StudioError {
    /// True when the provider rejected the credential rather than the request.
    pub fn is_authorization_failure(&self) -> bool {
        match self {
            StudioError::AccessDenied(_) => true,
            StudioError::ApiError { status, .. } if *status == 403 || *status == 404 => true,
            other => {
                let text = other.to_string().to_lowercase();
                text.contains("403") || text.contains("permission") || text.contains("not found")
            }
        }
    }

    pub fn is_safety_block(&self) -> bool {
        matches!(self, StudioError::SafetyBlocked)
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_signatures() {
        let forbidden = StudioError::ApiError {
            status: 403,
            message: "denied".into(),
        };
        assert!(forbidden.is_authorization_failure());

        let missing_model = StudioError::RequestError("models/foo is not found".into());
        assert!(missing_model.is_authorization_failure());

        let perms = StudioError::ResponseError("The caller does not have PERMISSION".into());
        assert!(perms.is_authorization_failure());

        let busy = StudioError::ApiError {
            status: 503,
            message: "overloaded".into(),
        };
        assert!(!busy.is_authorization_failure());
        assert!(!StudioError::SafetyBlocked.is_authorization_failure());
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            StudioError::BatchExhausted { attempts: 3 }.to_string(),
            "All image generations failed. Please check your prompt or try again."
        );
        assert_eq!(
            StudioError::SafetyBlocked.to_string(),
            "Image generation blocked by safety filters."
        );
    }
}
