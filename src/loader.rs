//! File loader collaborator: paths in, raw document strings out.

use crate::builder::TreeBuilder;
use crate::config::Config;
use crate::error::ConfigError;
use crate::separator::Separator;
use std::path::PathBuf;
use tracing::debug;

/// Reads a list of files into raw document strings.
///
/// Missing or unreadable files produce no entry and no error; the loader
/// performs no transformation beyond the read.
pub struct FileLoader {
    files: Vec<PathBuf>,
    separator: Separator,
}

impl FileLoader {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            separator: Separator::default(),
        }
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    /// File contents in caller order, skipping unreadable entries.
    pub fn load(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|path| match std::fs::read_to_string(path) {
                Ok(contents) => Some(contents),
                Err(error) => {
                    debug!(path = %path.display(), %error, "Skipping unreadable file");
                    None
                }
            })
            .collect()
    }

    /// Load the files and run the default build pipeline.
    pub fn create(&self) -> Result<Config, ConfigError> {
        let contents = self.load();
        TreeBuilder::new(self.separator).build(&contents)
    }
}
