pub mod document_converter;
pub mod renderer;

pub use document_converter::{pdf_output_path, ConversionSummary, DocumentConverter};
pub use renderer::{PdfRenderer, WkhtmltopdfRenderer};
