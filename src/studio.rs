use crate::{
    config::StudioConfig,
    error::{Result, StudioError},
    gemini::{EnvCredentials, GeminiImageClient},
    models::{GeneratedImage, GenerationOverride, GenerationRequest},
    pipeline::{
        quality, BatchOrchestrator, ExportOptions, ExportedFile, Exporter, GenerationToken,
        MemberFailure, QualityEncoder, RasterEncoder, SessionState,
    },
    traits::{Clock, CredentialProvider, ImageBackend, RandomSeeds, SavePicker, SeedSource, SystemClock},
};
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub token: GenerationToken,
    pub images: Vec<GeneratedImage>,
    pub failures: Vec<(usize, MemberFailure)>,
    /// False when a newer generation started before this one finished.
    pub applied: bool,
}

#[derive(Clone)]
pub struct Studio {
    config: StudioConfig,
    backend: Arc<dyn ImageBackend>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    seeds: Arc<dyn SeedSource>,
    clock: Arc<dyn Clock>,
    encoder: Arc<dyn QualityEncoder>,
    picker: Option<Arc<dyn SavePicker>>,
    session: Arc<SessionState>,
}

impl Studio {
    /// Wires the Gemini client with environment credentials.
    pub fn new(config: StudioConfig) -> Result<Self> {
        let credentials: Arc<dyn CredentialProvider> = Arc::new(EnvCredentials::new(&config.gemini));
        let backend = Arc::new(GeminiImageClient::new(&config.gemini, Arc::clone(&credentials))?);
        Ok(Self::with_backend(config, backend, Some(credentials)))
    }

    pub fn with_backend(
        config: StudioConfig,
        backend: Arc<dyn ImageBackend>,
        credentials: Option<Arc<dyn CredentialProvider>>,
    ) -> Self {
        Self {
            config,
            backend,
            credentials,
            seeds: Arc::new(RandomSeeds::new()),
            clock: Arc::new(SystemClock),
            encoder: Arc::new(RasterEncoder),
            picker: None,
            session: Arc::new(SessionState::new()),
        }
    }

    pub fn with_seeds(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn QualityEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_picker(mut self, picker: Arc<dyn SavePicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn current_images(&self) -> Vec<GeneratedImage> {
        self.session.current_images()
    }

    fn orchestrator(&self) -> BatchOrchestrator {
        BatchOrchestrator::new(
            Arc::clone(&self.backend),
            self.credentials.clone(),
            Arc::clone(&self.seeds),
            self.config.batch.stagger_ms,
        )
    }

    fn exporter(&self) -> Exporter {
        let exporter = Exporter::new(Arc::clone(&self.encoder), Arc::clone(&self.clock));
        match &self.picker {
            Some(picker) => exporter.with_picker(Arc::clone(picker)),
            None => exporter,
        }
    }

    /// Merges a JSON-mode override into `base` and validates the result.
    pub fn resolve_request(
        &self,
        base: GenerationRequest,
        json_override: Option<&str>,
    ) -> Result<GenerationRequest> {
        let request = match json_override {
            Some(input) => GenerationOverride::parse(input)?.apply_to(base),
            None => base,
        };
        request.validate(self.config.batch.max_words)?;
        Ok(request)
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        request.validate(self.config.batch.max_words)?;

        let token = self.session.begin();
        let _timer = crate::logger::timer("generation");
        log::info!("🚀 Generation {} started", token.value());

        let batch = self.orchestrator().generate_batch(&request).await?;

        log::info!("Running automatic quality review...");
        let audits = join_all(batch.images.iter().map(|payload| quality::audit(payload))).await;

        let images: Vec<GeneratedImage> = batch
            .images
            .into_iter()
            .zip(audits)
            .map(|(url, metadata)| GeneratedImage {
                id: Uuid::new_v4().to_string(),
                url,
                prompt: request.prompt.clone(),
                timestamp: self.clock.now_millis(),
                metadata: Some(metadata),
            })
            .collect();

        let passed = images
            .iter()
            .filter(|image| {
                image
                    .metadata
                    .as_ref()
                    .map_or(false, |m| m.passed_quality_check)
            })
            .count();
        log::info!(
            "📊 {} image(s), {} passed quality review",
            images.len(),
            passed
        );

        let applied = self.session.publish(token, images.clone());
        Ok(GenerationOutcome {
            token,
            images,
            failures: batch.failures,
            applied,
        })
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::from(&self.config.export)
    }

    pub async fn export(
        &self,
        image: &GeneratedImage,
        options: &ExportOptions,
    ) -> Result<Option<ExportedFile>> {
        self.exporter().export(image, options).await
    }

    /// Exports one of the currently displayed images by id.
    pub async fn export_by_id(
        &self,
        id: &str,
        options: &ExportOptions,
    ) -> Result<Option<ExportedFile>> {
        let image = self
            .session
            .find(id)
            .ok_or_else(|| StudioError::ExportError(format!("no displayed image with id {}", id)))?;
        self.export(&image, options).await
    }
}
