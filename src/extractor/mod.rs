pub mod archive_extractor;

pub use archive_extractor::{ArchiveExtractor, ExtractionSummary};
