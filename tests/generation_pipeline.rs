use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use rgenai_studio::{
    traits::RandomSeeds, BatchConfig, ExportConfig, GenerationRequest, ImageBackend, ImageCall,
    ImagePayload, MemberFailure, OutputFormat, Result, Studio, StudioConfig, StudioError,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serves a PNG of the scripted size per batch index; `None` is a safety block.
struct CannedBackend {
    sizes: Vec<Option<(u32, u32)>>,
    calls: AtomicUsize,
}

impl CannedBackend {
    fn new(sizes: Vec<Option<(u32, u32)>>) -> Arc<Self> {
        Arc::new(Self {
            sizes,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn png(width: u32, height: u32) -> ImagePayload {
    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    ImagePayload::from_bytes("image/png", &bytes)
}

#[async_trait]
impl ImageBackend for CannedBackend {
    async fn generate_image(&self, call: &ImageCall) -> Result<ImagePayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if call.prompt.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        match self.sizes.get(call.index).copied().flatten() {
            Some((width, height)) => Ok(png(width, height)),
            None => Err(StudioError::SafetyBlocked),
        }
    }
}

fn studio(backend: Arc<CannedBackend>) -> Studio {
    let config = StudioConfig::new().with_batch(BatchConfig::new().with_stagger_ms(0));
    Studio::with_backend(config, backend, None).with_seeds(Arc::new(RandomSeeds::seeded(11)))
}

#[tokio::test]
async fn partial_batch_is_audited_and_displayed() {
    let backend = CannedBackend::new(vec![Some((1000, 1000)), None, Some((600, 600))]);
    let studio = studio(backend.clone());

    let outcome = studio
        .generate(GenerationRequest::new("a lighthouse at dusk").with_count(3))
        .await
        .unwrap();

    assert_eq!(backend.calls(), 3);
    assert!(outcome.applied);
    assert_eq!(outcome.images.len(), 2);
    assert_eq!(outcome.failures, vec![(1, MemberFailure::SafetyBlocked)]);

    let first = outcome.images[0].metadata.as_ref().unwrap();
    assert_eq!((first.width, first.height), (1000, 1000));
    assert!(first.passed_quality_check);

    let second = outcome.images[1].metadata.as_ref().unwrap();
    assert!(!second.passed_quality_check);
    assert_eq!(second.check_reason, "Low Resolution (600x600)");

    assert!(outcome
        .images
        .iter()
        .all(|image| image.prompt == "a lighthouse at dusk"));
    assert_ne!(outcome.images[0].id, outcome.images[1].id);
    assert_eq!(studio.current_images().len(), 2);
}

#[tokio::test]
async fn exhausted_batch_produces_no_records() {
    let backend = CannedBackend::new(vec![None, None, None]);
    let studio = studio(backend.clone());

    let err = studio
        .generate(GenerationRequest::new("anything").with_count(3))
        .await
        .unwrap_err();

    assert!(matches!(err, StudioError::BatchExhausted { attempts: 3 }));
    assert_eq!(backend.calls(), 3);
    assert!(studio.current_images().is_empty());
}

#[tokio::test]
async fn over_long_prompt_never_reaches_the_service() {
    let backend = CannedBackend::new(vec![Some((1024, 1024))]);
    let studio = studio(backend.clone());

    let err = studio
        .generate(GenerationRequest::new(vec!["word"; 701].join(" ")))
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::ValidationError(_)));
    assert_eq!(backend.calls(), 0);

    let ok = studio
        .generate(GenerationRequest::new(vec!["word"; 700].join(" ")))
        .await;
    assert!(ok.is_ok());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn json_override_is_validated_like_the_form() {
    let studio = studio(CannedBackend::new(vec![]));
    let base = GenerationRequest::new("from the form");

    let merged = studio
        .resolve_request(base.clone(), Some(r#"{"prompt": "from json", "count": 7}"#))
        .unwrap();
    assert_eq!(merged.prompt, "from json");
    assert_eq!(merged.count, 4);

    let err = studio
        .resolve_request(base.clone(), Some("{not json"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid JSON format. Please check your syntax.");

    let long = format!(r#"{{"prompt": "{}"}}"#, vec!["w"; 701].join(" "));
    assert!(matches!(
        studio.resolve_request(base, Some(&long)),
        Err(StudioError::ValidationError(_))
    ));
}

#[tokio::test]
async fn newer_generation_wins_over_slower_older_one() {
    let backend = CannedBackend::new(vec![Some((64, 64))]);
    let studio = studio(backend);

    let (older, newer) = tokio::join!(
        studio.generate(GenerationRequest::new("slow first request")),
        studio.generate(GenerationRequest::new("quick second request")),
    );
    let older = older.unwrap();
    let newer = newer.unwrap();

    assert!(newer.token > older.token);
    assert!(!older.applied);
    assert!(newer.applied);

    let shown = studio.current_images();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].id, newer.images[0].id);
}

#[tokio::test]
async fn displayed_image_exports_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let backend = CannedBackend::new(vec![Some((32, 32))]);
    let config = StudioConfig::new()
        .with_batch(BatchConfig::new().with_stagger_ms(0))
        .with_export(
            ExportConfig::new()
                .with_format(OutputFormat::Jpeg)
                .with_output_dir(dir.path()),
        );
    let studio = Studio::with_backend(config, backend, None);

    let outcome = studio
        .generate(GenerationRequest::new("a small tile"))
        .await
        .unwrap();
    let saved = studio
        .export_by_id(&outcome.images[0].id, &studio.export_options())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(saved.mime_type, "image/jpeg");
    assert!(saved.path.starts_with(dir.path()));
    assert!(saved.path.extension().is_some_and(|ext| ext == "jpg"));

    let missing = studio
        .export_by_id("no-such-id", &studio.export_options())
        .await;
    assert!(matches!(missing, Err(StudioError::ExportError(_))));
}
