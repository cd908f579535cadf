//! Integration tests for the configuration engine.

mod build_pipeline;
mod facade;
mod file_loading;

use cascade::{Config, Separator, TreeBuilder};

/// Build a config from inline documents with the default pipeline.
pub fn build(documents: &[&str]) -> Config {
    try_build(documents).unwrap()
}

pub fn try_build(documents: &[&str]) -> Result<Config, cascade::ConfigError> {
    let documents: Vec<String> = documents.iter().map(|d| d.to_string()).collect();
    TreeBuilder::new(Separator::default()).build(&documents)
}
