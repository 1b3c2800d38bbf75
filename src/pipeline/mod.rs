pub mod batch;
pub mod encoder;
pub mod export;
pub mod prompt;
pub mod quality;
pub mod session;

pub use batch::{BatchOrchestrator, BatchResult, MemberFailure};
pub use encoder::{encode_to_target, EncodedImage, QualityEncoder, RasterEncoder};
pub use export::{ExportOptions, ExportedFile, Exporter};
pub use session::{GenerationToken, SessionState};
