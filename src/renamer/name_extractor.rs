use crate::config::NamingConfig;
use crate::error::{Result, Zip2PdfError};
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;

/// Character window of the party record that holds the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameWindow {
    pub offset: usize,
    pub length: usize,
    pub token_count: usize,
}

impl NameWindow {
    pub fn new(offset: usize, length: usize, token_count: usize) -> Self {
        Self {
            offset,
            length,
            token_count,
        }
    }

    /// Takes characters `[offset, offset + length)`, splits them on whitespace
    /// and joins the first `token_count` tokens with a single space.
    pub fn apply(&self, record: &str) -> Result<String> {
        let window: String = record.chars().skip(self.offset).take(self.length).collect();
        let tokens: Vec<&str> = window.split_whitespace().take(self.token_count).collect();

        if tokens.len() < self.token_count {
            return Err(Zip2PdfError::MalformedPartyRecord {
                record: record.to_string(),
                found: tokens.len(),
                required: self.token_count,
            });
        }

        Ok(tokens.join(" "))
    }

    /// Checks that a known-good record still yields a name under this window.
    pub fn validate_sample(&self, record: &str) -> Result<String> {
        let name = self.apply(record)?;
        tracing::debug!(sample = record, name = %name, "sample record fits name window");
        Ok(name)
    }
}

impl Default for NameWindow {
    fn default() -> Self {
        Self::new(5, 55, 2)
    }
}

/// Derives a display name from the party table of an HTML document.
#[derive(Debug, Clone)]
pub struct NameExtractor {
    table_id: String,
    window: NameWindow,
}

impl NameExtractor {
    pub fn new<S: Into<String>>(table_id: S, window: NameWindow) -> Self {
        Self {
            table_id: table_id.into(),
            window,
        }
    }

    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(config.table_id.clone(), config.window())
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn extract_display_name(&self, html_path: &Path) -> Result<String> {
        let content = fs::read_to_string(html_path)?;
        let record = self.party_record(&content, &html_path.display().to_string())?;
        self.display_name_from_record(&record)
    }

    pub fn display_name_from_record(&self, record: &str) -> Result<String> {
        self.window.apply(record)
    }

    /// First-cell text of the last row with two or more cells.
    pub fn party_record(&self, html: &str, source: &str) -> Result<String> {
        let document = Html::parse_document(html);
        let table_selector = selector("table")?;
        let row_selector = selector("tr")?;
        let cell_selector = selector("td")?;

        let table = document
            .select(&table_selector)
            .find(|table| table.value().id() == Some(self.table_id.as_str()))
            .ok_or_else(|| Zip2PdfError::TableNotFound {
                table_id: self.table_id.clone(),
                path: source.to_string(),
            })?;

        let mut record = None;
        for row in table.select(&row_selector) {
            let cells: Vec<ElementRef> = row.select(&cell_selector).take(2).collect();
            if cells.len() < 2 {
                continue;
            }
            // Later rows override earlier ones
            record = Some(cells[0].text().collect::<String>().trim().to_string());
        }

        record.ok_or_else(|| Zip2PdfError::NoPartyRecord {
            table_id: self.table_id.clone(),
            path: source.to_string(),
        })
    }
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self::new("customerPartyTable", NameWindow::default())
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Zip2PdfError::Config {
        message: format!("Failed to parse selector '{}': {:?}", css, e),
    })
}
