use crate::models::GeneratedImage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Identifies one generate action. Only the newest token may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Results currently on display. Starting a generation invalidates every
/// older one still in flight without cancelling it; their results are
/// dropped on publish.
#[derive(Debug, Default)]
pub struct SessionState {
    generation: AtomicU64,
    images: RwLock<Vec<GeneratedImage>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> GenerationToken {
        let mut images = self
            .images
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let token = GenerationToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        images.clear();
        token
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    pub fn publish(&self, token: GenerationToken, images: Vec<GeneratedImage>) -> bool {
        let mut current = self
            .images
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // begin() bumps the counter under the same lock.
        if !self.is_current(token) {
            log::info!(
                "Discarding results of generation {} (current is {})",
                token.0,
                self.generation.load(Ordering::SeqCst)
            );
            return false;
        }
        *current = images;
        true
    }

    pub fn current_images(&self) -> Vec<GeneratedImage> {
        self.images
            .read()
            .map(|images| images.clone())
            .unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<GeneratedImage> {
        self.images
            .read()
            .ok()
            .and_then(|images| images.iter().find(|image| image.id == id).cloned())
    }
}
