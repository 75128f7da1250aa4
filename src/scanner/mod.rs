pub mod directory_scanner;

pub use directory_scanner::{DirectoryListing, DirectoryScanner, ScannedEntry};
