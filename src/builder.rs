//! Tree builder: parse, merge, expand.
//!
//! Consumes raw document strings in caller order, parses each into a node
//! tree, folds them left-to-right into one root (later documents win), then
//! runs the parameter pass and the graft pass before handing the frozen root
//! to the read facade.

use crate::config::Config;
use crate::error::ConfigError;
use crate::expand::{GraftExpander, ParamExpander};
use crate::node::ConfigNode;
use crate::parser::{DocumentParser, JsonParser};
use crate::separator::Separator;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Builds a [`Config`] from raw document strings.
pub struct TreeBuilder {
    separator: Separator,
    parser: Box<dyn DocumentParser>,
    graft_prefix: String,
    graft_level: Option<char>,
}

impl TreeBuilder {
    pub fn new(separator: Separator) -> Self {
        Self {
            separator,
            parser: Box::new(JsonParser),
            graft_prefix: "node".to_string(),
            graft_level: None,
        }
    }

    /// Replace the surface-syntax parser.
    pub fn with_parser(mut self, parser: Box<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Word used after `%` in graft tokens; the separator is appended
    /// automatically.
    pub fn with_graft_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.graft_prefix = prefix.into();
        self
    }

    /// Level character enabling explicit current/up markers in graft tokens.
    pub fn with_graft_level(mut self, level: char) -> Self {
        self.graft_level = Some(level);
        self
    }

    /// Parse, merge, and expand `documents` into a read facade.
    #[instrument(skip_all, fields(document_count = documents.len()))]
    pub fn build(&self, documents: &[String]) -> Result<Config, ConfigError> {
        let start = Instant::now();
        info!("Starting configuration build");

        let mut roots = documents
            .iter()
            .map(|document| self.parser.parse(document))
            .collect::<Result<Vec<ConfigNode>, ConfigError>>()?;
        debug!(parsed = roots.len(), "Parsed documents");

        let root = if roots.is_empty() {
            ConfigNode::new()
        } else {
            let accumulator = roots.remove(0);
            for next in roots {
                accumulator.overwrite(next);
            }
            accumulator
        };

        ParamExpander::new(self.separator).expand(&root)?;

        let mut graft = GraftExpander::new(self.separator).with_prefix(self.graft_prefix.clone());
        if let Some(level) = self.graft_level {
            graft = graft.with_level(level);
        }
        graft.expand(&root)?;

        info!(
            duration_ms = start.elapsed().as_millis(),
            "Configuration build completed"
        );
        Ok(Config::new(root, self.separator))
    }
}
