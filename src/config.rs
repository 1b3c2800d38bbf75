use crate::models::{OutputFormat, MAX_PROMPT_WORDS};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub stagger_ms: u64,
    pub max_words: usize,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub format: OutputFormat,
    pub target_mb: Option<f64>,
    pub ask_location: bool,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct StudioConfig {
    pub gemini: GeminiConfig,
    pub batch: BatchConfig,
    pub export: ExportConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 120,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let api_base = env::var("GEMINI_API_BASE")
            .ok()
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        GeminiConfig {
            api_key,
            api_base,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            stagger_ms: 400,
            max_words: MAX_PROMPT_WORDS,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stagger_ms(mut self, stagger_ms: u64) -> Self {
        self.stagger_ms = stagger_ms;
        self
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            format: OutputFormat::Png,
            target_mb: None,
            ask_location: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let format = env::var("STUDIO_OUTPUT_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let target_mb = env::var("STUDIO_TARGET_MB")
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|mb| *mb > 0.0);
        let ask_location = env::var("STUDIO_ASK_LOCATION")
            .ok()
            .map_or(false, |val| val == "true");
        let output_dir = env::var("STUDIO_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        ExportConfig {
            format,
            target_mb,
            ask_location,
            output_dir,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Non-positive targets mean "no target".
    pub fn with_target_mb(mut self, target_mb: f64) -> Self {
        self.target_mb = Some(target_mb).filter(|mb| *mb > 0.0);
        self
    }

    pub fn with_ask_location(mut self, ask_location: bool) -> Self {
        self.ask_location = ask_location;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn target_bytes(&self) -> u64 {
        self.target_mb
            .map(|mb| (mb * 1024.0 * 1024.0) as u64)
            .unwrap_or(0)
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let stagger_ms = env::var("STUDIO_STAGGER_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(400);

        StudioConfig {
            gemini: GeminiConfig::from_env(),
            batch: BatchConfig::new().with_stagger_ms(stagger_ms),
            export: ExportConfig::from_env(),
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_batch(mut self, config: BatchConfig) -> Self {
        self.batch = config;
        self
    }

    pub fn with_export(mut self, config: ExportConfig) -> Self {
        self.export = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::new();
        assert_eq!(config.batch.stagger_ms, 400);
        assert_eq!(config.batch.max_words, 700);
        assert_eq!(config.gemini.api_base, DEFAULT_API_BASE);
        assert_eq!(config.export.target_bytes(), 0);
    }

    #[test]
    fn test_target_bytes() {
        let export = ExportConfig::new()
            .with_format(OutputFormat::Jpeg)
            .with_target_mb(1.5);
        assert_eq!(export.target_bytes(), 1_572_864);

        let export = ExportConfig::new().with_target_mb(-2.0);
        assert_eq!(export.target_mb, None);
        assert_eq!(export.target_bytes(), 0);
    }
}
