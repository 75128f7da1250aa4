use crate::error::{Result, Zip2PdfError};
use crate::renamer::NameWindow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub directories: DirectoryConfig,
    pub extraction: ExtractionConfig,
    pub renderer: RendererConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub source: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub member_suffix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RendererConfig {
    pub binary: Option<PathBuf>,
    pub extra_args: Vec<String>,
    /// Seconds allowed per document, 0 waits forever.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingConfig {
    pub table_id: String,
    pub window_offset: usize,
    pub window_length: usize,
    pub token_count: usize,
    pub sample_record: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            member_suffix: ".html".to_string(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            binary: None, // Must be supplied by the user
            extra_args: vec!["--quiet".to_string()],
            timeout_secs: 0,
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            table_id: "customerPartyTable".to_string(),
            window_offset: 5,
            window_length: 55,
            token_count: 2,
            sample_record: None,
        }
    }
}

impl NamingConfig {
    pub fn window(&self) -> NameWindow {
        NameWindow::new(self.window_offset, self.window_length, self.token_count)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Zip2PdfError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Zip2PdfError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Zip2PdfError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["zip2pdf.toml", ".zip2pdf.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref source) = cli_args.source_dir {
            self.directories.source = Some(source.clone());
        }

        if let Some(ref html) = cli_args.html_dir {
            self.directories.html = Some(html.clone());
        }

        if let Some(ref pdf) = cli_args.pdf_dir {
            self.directories.pdf = Some(pdf.clone());
        }

        if let Some(ref binary) = cli_args.renderer {
            self.renderer.binary = Some(binary.clone());
        }

        if let Some(timeout) = cli_args.timeout {
            self.renderer.timeout_secs = timeout;
        }

        if let Some(ref table_id) = cli_args.table_id {
            self.naming.table_id = table_id.clone();
        }

        if let Some(ref sample) = cli_args.sample_record {
            self.naming.sample_record = Some(sample.clone());
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| Zip2PdfError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| Zip2PdfError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.member_suffix.is_empty() {
            return Err(Zip2PdfError::Config {
                message: "extraction.member_suffix must not be empty".to_string(),
            });
        }

        if self.naming.table_id.trim().is_empty() {
            return Err(Zip2PdfError::Config {
                message: "naming.table_id must not be empty".to_string(),
            });
        }

        if self.naming.window_length == 0 {
            return Err(Zip2PdfError::Config {
                message: "naming.window_length must be greater than 0".to_string(),
            });
        }

        if self.naming.token_count == 0 {
            return Err(Zip2PdfError::Config {
                message: "naming.token_count must be greater than 0".to_string(),
            });
        }

        // A sample record pins the window to a known upstream layout
        if let Some(ref sample) = self.naming.sample_record {
            self.naming
                .window()
                .validate_sample(sample)
                .map_err(|e| Zip2PdfError::Config {
                    message: format!("Sample record does not fit the name window: {}", e),
                })?;
        }

        Ok(())
    }

    /// Per-document renderer deadline, `None` when unbounded.
    pub fn renderer_timeout(&self) -> Option<Duration> {
        match self.renderer.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.directories = DirectoryConfig {
            source: Some(PathBuf::from("zips")),
            html: Some(PathBuf::from("html")),
            pdf: Some(PathBuf::from("pdf")),
        };
        sample_config.renderer.binary = Some(PathBuf::from("/usr/local/bin/wkhtmltopdf"));
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub source_dir: Option<PathBuf>,
    pub html_dir: Option<PathBuf>,
    pub pdf_dir: Option<PathBuf>,
    pub renderer: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub table_id: Option<String>,
    pub sample_record: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directories(
        mut self,
        source: Option<PathBuf>,
        html: Option<PathBuf>,
        pdf: Option<PathBuf>,
    ) -> Self {
        self.source_dir = source;
        self.html_dir = html;
        self.pdf_dir = pdf;
        self
    }

    pub fn with_renderer(mut self, renderer: Option<PathBuf>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_table_id(mut self, table_id: Option<String>) -> Self {
        self.table_id = table_id;
        self
    }

    pub fn with_sample_record(mut self, sample: Option<String>) -> Self {
        self.sample_record = sample;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.member_suffix, ".html");
        assert_eq!(config.naming.table_id, "customerPartyTable");
        assert_eq!(config.naming.window_offset, 5);
        assert_eq!(config.naming.window_length, 55);
        assert_eq!(config.naming.token_count, 2);
        assert!(config.renderer.binary.is_none());
        assert!(config.renderer_timeout().is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.naming.token_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_record_validation() {
        let mut config = Config::default();
        config.naming.sample_record = Some("ID123Jack Sparrow, Tortuga".to_string());
        assert!(config.validate().is_ok());

        config.naming.sample_record = Some("ID123Jack".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Zip2PdfError::Config { .. }));
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.renderer.timeout_secs = 45;
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.renderer.timeout_secs, 45);
        assert_eq!(loaded_config.renderer_timeout(), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[renderer]\nbinary = \"/opt/wkhtmltopdf\"\n").unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.renderer.binary, Some(PathBuf::from("/opt/wkhtmltopdf")));
        assert_eq!(loaded.renderer.extra_args, vec!["--quiet"]);
        assert_eq!(loaded.naming.table_id, "customerPartyTable");
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here/zip2pdf.toml");
        assert!(matches!(result, Err(Zip2PdfError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_directories(
                Some(PathBuf::from("in")),
                Some(PathBuf::from("html")),
                Some(PathBuf::from("pdf")),
            )
            .with_timeout(Some(60))
            .with_table_id(Some("partyTable".to_string()));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.directories.source, Some(PathBuf::from("in")));
        assert_eq!(config.directories.pdf, Some(PathBuf::from("pdf")));
        assert_eq!(config.renderer.timeout_secs, 60);
        assert_eq!(config.naming.table_id, "partyTable");
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[directories]"));
        assert!(sample.contains("[renderer]"));
        assert!(sample.contains("[naming]"));
    }
}
