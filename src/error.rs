use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Zip2PdfError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error in {archive}: {message}")]
    Archive { archive: String, message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("PDF renderer is not configured")]
    RendererNotConfigured,

    #[error("PDF renderer not found: {}", binary.display())]
    RendererNotFound { binary: PathBuf },

    #[error("Renderer failed on {file} ({status}){}", detail_suffix(detail))]
    RendererFailed {
        file: String,
        status: String,
        detail: Option<String>,
    },

    #[error("Renderer timed out on {file} after {seconds:.1} seconds")]
    RendererTimeout { file: String, seconds: f64 },

    #[error("Table '{table_id}' not found in {path}")]
    TableNotFound { table_id: String, path: String },

    #[error("No row with two or more cells in table '{table_id}' of {path}")]
    NoPartyRecord { table_id: String, path: String },

    #[error("Party record has {found} of {required} name tokens in its window: {record:?}")]
    MalformedPartyRecord {
        record: String,
        found: usize,
        required: usize,
    },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Zip2PdfError {
    fn user_message(&self) -> String {
        match self {
            Zip2PdfError::Archive { archive, message } => {
                format!("Could not read archive {}: {}", archive, message)
            }
            Zip2PdfError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            Zip2PdfError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            Zip2PdfError::RendererNotConfigured => {
                "No PDF renderer binary has been configured".to_string()
            }
            Zip2PdfError::RendererNotFound { binary } => {
                format!("PDF renderer binary does not exist: {}", binary.display())
            }
            Zip2PdfError::TableNotFound { table_id, path } => {
                format!("No table with id '{}' in {}", table_id, path)
            }
            Zip2PdfError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Zip2PdfError::InvalidPath { .. } => Some(
                "Check that the source directory exists and that the working directories can be created.".to_string()
            ),
            Zip2PdfError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            Zip2PdfError::RendererNotConfigured => Some(
                "Pass --renderer /path/to/wkhtmltopdf, set ZIP2PDF_RENDERER, or set renderer.binary in the configuration file.".to_string()
            ),
            Zip2PdfError::RendererNotFound { .. } => Some(
                "Install wkhtmltopdf or point --renderer at the installed binary.".to_string()
            ),
            Zip2PdfError::RendererTimeout { .. } => Some(
                "Increase the renderer deadline with --timeout, or use 0 to wait indefinitely.".to_string()
            ),
            Zip2PdfError::MalformedPartyRecord { .. } => Some(
                "Adjust naming.window_offset and naming.window_length to match the party record layout.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Zip2PdfError {
    fn from(error: toml::de::Error) -> Self {
        Zip2PdfError::Config {
            message: error.to_string(),
        }
    }
}

impl Zip2PdfError {
    /// Wrap a zip failure with the name of the archive it came from.
    pub fn archive<S: Into<String>>(archive: S, error: zip::result::ZipError) -> Self {
        let message = match error {
            zip::result::ZipError::Io(io) => io.to_string(),
            other => other.to_string(),
        };

        Zip2PdfError::Archive {
            archive: archive.into(),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, Zip2PdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = Zip2PdfError::RendererNotConfigured;
        assert!(error.user_message().contains("renderer"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_renderer_failed_display() {
        let error = Zip2PdfError::RendererFailed {
            file: "cust1.html".to_string(),
            status: "exit status: 1".to_string(),
            detail: Some("Exit with code 1 due to network error".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Renderer failed on cust1.html (exit status: 1): Exit with code 1 due to network error"
        );

        let bare = Zip2PdfError::RendererFailed {
            file: "cust1.html".to_string(),
            status: "exit status: 1".to_string(),
            detail: None,
        };
        assert_eq!(bare.to_string(), "Renderer failed on cust1.html (exit status: 1)");
    }

    #[test]
    fn test_zip_error_conversion() {
        let error = Zip2PdfError::archive(
            "broken.zip",
            zip::result::ZipError::InvalidArchive("Could not find central directory end".into()),
        );
        assert!(matches!(error, Zip2PdfError::Archive { .. }));
        assert!(error.to_string().contains("broken.zip"));
    }
}
