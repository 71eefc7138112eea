//! Export pipeline: catalogs, link resolution, download, tagging

pub mod catalog;
pub mod downloader;
pub mod engine;
pub mod resolver;
pub mod tagger;

#[cfg(test)]
mod testing;

pub use catalog::CatalogFetcher;
pub use engine::{BatchOutcome, ExportEngine, ExportOptions};
pub use resolver::LinkResolver;
