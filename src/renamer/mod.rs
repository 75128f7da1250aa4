pub mod document_renamer;
pub mod name_extractor;

pub use document_renamer::{sanitize_filename, sibling_html_path, DocumentRenamer, RenameSummary};
pub use name_extractor::{NameExtractor, NameWindow};
