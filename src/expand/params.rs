//! Scalar-level parameter substitution.

use crate::error::ConfigError;
use crate::node::{ConfigNode, NodeVisitor};
use crate::separator::Separator;
use regex::{Captures, Regex};

/// Rewrites every `%config.<path>%` token inside scalar values with the
/// first scalar found at `<path>`, resolved from the root.
///
/// Unresolved tokens become the empty string; substituted text is not
/// re-scanned. Runs before graft expansion, so it only ever sees the merged
/// tree.
pub struct ParamExpander {
    separator: Separator,
    token: Regex,
}

impl ParamExpander {
    pub fn new(separator: Separator) -> Self {
        // The token prefix is literal; only <path> is split on the separator.
        let token = Regex::new(r"%config\.([^%]+)%").expect("parameter token pattern is valid");
        Self { separator, token }
    }

    pub fn expand(&self, root: &ConfigNode) -> Result<(), ConfigError> {
        let mut visitor = ParamVisitor {
            root: root.clone(),
            separator: self.separator,
            token: &self.token,
        };
        root.accept(&mut visitor)
    }
}

struct ParamVisitor<'a> {
    root: ConfigNode,
    separator: Separator,
    token: &'a Regex,
}

impl NodeVisitor for ParamVisitor<'_> {
    fn visit_scalar(
        &mut self,
        parent: &ConfigNode,
        key: &str,
        index: usize,
        value: &str,
    ) -> Result<(), ConfigError> {
        if !value.contains('%') {
            return Ok(());
        }
        let replaced = self.token.replace_all(value, |captures: &Captures<'_>| {
            self.root
                .get_scalars(&captures[1], self.separator)
                .into_iter()
                .next()
                .unwrap_or_default()
        });
        if replaced != value {
            parent.set_scalar(key, replaced.into_owned(), Some(index));
        }
        Ok(())
    }
}
