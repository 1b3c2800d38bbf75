use crate::{
    error::{Result, StudioError},
    models::{GenerationRequest, ImageCall, ImagePayload, ModelTier},
    pipeline::prompt,
    traits::{CredentialProvider, ImageBackend, SeedSource, SEED_CEILING},
};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Fresh draws per batch member before stepping past a repeated seed.
const MAX_SEED_DRAWS: usize = 16;

pub const ACCESS_DENIED_MESSAGE: &str = "Access denied. Please select a valid API Key.";

/// Why a single batch member produced no image. Both kinds are absorbed
/// without retry; the distinction is kept for callers and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberFailure {
    SafetyBlocked,
    Unauthorized(String),
    Failed(String),
}

impl MemberFailure {
    fn classify(error: &StudioError) -> Self {
        if error.is_safety_block() {
            MemberFailure::SafetyBlocked
        } else if error.is_authorization_failure() {
            MemberFailure::Unauthorized(error.to_string())
        } else {
            MemberFailure::Failed(error.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Successful payloads in request index order.
    pub images: Vec<ImagePayload>,
    pub failures: Vec<(usize, MemberFailure)>,
    pub attempts: usize,
}

#[derive(Clone)]
pub struct BatchOrchestrator {
    backend: Arc<dyn ImageBackend>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    seeds: Arc<dyn SeedSource>,
    stagger: Duration,
}

impl BatchOrchestrator {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        credentials: Option<Arc<dyn CredentialProvider>>,
        seeds: Arc<dyn SeedSource>,
        stagger_ms: u64,
    ) -> Self {
        Self {
            backend,
            credentials,
            seeds,
            stagger: Duration::from_millis(stagger_ms),
        }
    }

    /// N seeds drawn independently. A collision inside the batch is redrawn
    /// up to `MAX_SEED_DRAWS` times, then stepped to the next unused value.
    fn draw_seeds(&self, count: usize) -> Vec<u32> {
        let mut seen = HashSet::with_capacity(count);
        let mut seeds = Vec::with_capacity(count);
        while seeds.len() < count {
            let mut seed = self.seeds.next_seed();
            let mut draws = 1;
            while seen.contains(&seed) && draws < MAX_SEED_DRAWS {
                seed = self.seeds.next_seed();
                draws += 1;
            }
            while seen.contains(&seed) {
                seed = (seed % SEED_CEILING + 1) % SEED_CEILING;
            }
            seen.insert(seed);
            seeds.push(seed);
        }
        seeds
    }

    pub fn plan(&self, request: &GenerationRequest) -> Vec<ImageCall> {
        let count = request.clamped_count() as usize;
        self.draw_seeds(count)
            .into_iter()
            .enumerate()
            .map(|(index, seed)| ImageCall {
                tier: request.tier,
                prompt: prompt::compile(&request.prompt, &request.style, request.tier, index, count),
                aspect_ratio: request.aspect_ratio,
                seed,
                index,
            })
            .collect()
    }

    async fn ensure_credentials(&self, tier: ModelTier) -> Result<()> {
        if tier != ModelTier::HighQuality {
            return Ok(());
        }
        if let Some(credentials) = &self.credentials {
            if !credentials.has_credential().await {
                log::info!("🔑 High quality tier needs a selected key, opening selection");
                credentials.request_credential_selection().await?;
            }
        }
        Ok(())
    }

    pub async fn generate_batch(&self, request: &GenerationRequest) -> Result<BatchResult> {
        self.ensure_credentials(request.tier).await?;

        let calls = self.plan(request);
        let total = calls.len();
        log::info!(
            "🎨 Dispatching batch of {} ({} / {})",
            total,
            request.tier.model_id(),
            request.aspect_ratio
        );

        let pending = calls.into_iter().map(|call| {
            let backend = Arc::clone(&self.backend);
            let delay = self.stagger * call.index as u32;
            async move {
                tokio::time::sleep(delay).await;
                backend.generate_image(&call).await
            }
        });
        let settled = join_all(pending).await;

        let mut images = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (index, outcome) in settled.into_iter().enumerate() {
            match outcome {
                Ok(payload) => images.push(payload),
                Err(e) => {
                    log::warn!("Image generation {}/{} failed: {}", index + 1, total, e);
                    failures.push((index, MemberFailure::classify(&e)));
                }
            }
        }

        if images.is_empty() {
            return Err(self.exhausted(total, &failures).await);
        }

        log::info!("✅ Batch finished: {}/{} images", images.len(), total);
        Ok(BatchResult {
            images,
            failures,
            attempts: total,
        })
    }

    async fn exhausted(&self, attempts: usize, failures: &[(usize, MemberFailure)]) -> StudioError {
        let unauthorized = failures
            .iter()
            .any(|(_, failure)| matches!(failure, MemberFailure::Unauthorized(_)));

        if unauthorized {
            if let Some(credentials) = &self.credentials {
                log::error!("❌ Generation service rejected the credential");
                if let Err(e) = credentials.request_credential_selection().await {
                    log::error!("Credential selection failed: {}", e);
                }
                return StudioError::AccessDenied(ACCESS_DENIED_MESSAGE.to_string());
            }
        }

        log::error!("❌ All {} image generations failed", attempts);
        StudioError::BatchExhausted { attempts }
    }
}
