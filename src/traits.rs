use crate::{
    error::Result,
    models::{ImageCall, ImagePayload},
};
use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Mutex;

/// Upper bound (exclusive) for generation seeds: the full positive i32 range.
pub const SEED_CEILING: u32 = i32::MAX as u32;

/// Remote image generation capability.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate_image(&self, call: &ImageCall) -> Result<ImagePayload>;
}

/// Credential capability. Some hosting contexts have none at all, so callers
/// hold it as an `Option`.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn api_key(&self) -> Option<String>;
    async fn has_credential(&self) -> bool;
    async fn request_credential_selection(&self) -> Result<()>;
}

/// Native "save as" dialog. `Ok(None)` means the user dismissed it.
#[async_trait]
pub trait SavePicker: Send + Sync {
    async fn pick(
        &self,
        suggested_name: &str,
        mime_type: &str,
        extension: &str,
    ) -> Result<Option<PathBuf>>;
}

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> u32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Uniform seeds over `[0, SEED_CEILING)`.
pub struct RandomSeeds {
    rng: Mutex<StdRng>,
}

impl RandomSeeds {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSeeds {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedSource for RandomSeeds {
    fn next_seed(&self) -> u32 {
        match self.rng.lock() {
            Ok(mut rng) => rng.random_range(0..SEED_CEILING),
            Err(poisoned) => poisoned.into_inner().random_range(0..SEED_CEILING),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = RandomSeeds::seeded(7);
        let b = RandomSeeds::seeded(7);
        let first: Vec<u32> = (0..4).map(|_| a.next_seed()).collect();
        let second: Vec<u32> = (0..4).map(|_| b.next_seed()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|seed| *seed < SEED_CEILING));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let before = clock.now_millis();
        assert!(clock.now_millis() >= before);
        assert!(before > 1_600_000_000_000);
    }
}
