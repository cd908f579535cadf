//! Node-level subtree grafting.
//!
//! A scalar whose entire value is a node-reference token is removed and the
//! referenced subtree is installed under the same key. References resolve
//! against the root, the scalar's parent node, or an ancestor N levels up.

use crate::error::ConfigError;
use crate::node::{ConfigNode, NodeVisitor};
use crate::separator::Separator;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// Whole-scalar token grammar: `%<prefix><sep>[<cur>...][<up>...]<path>%`,
/// optionally framed by ASCII blanks and line breaks.
///
/// With a level character `c` configured, `<cur>` is `c<sep>` and `<up>` is
/// `cc<sep>`, both repeatable. Without one, `<cur>` is disabled and `<up>`
/// is the separator alone.
pub struct GraftExpander {
    separator: Separator,
    prefix: String,
    level: Option<char>,
}

impl GraftExpander {
    pub fn new(separator: Separator) -> Self {
        Self {
            separator,
            prefix: "node".to_string(),
            level: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_level(mut self, level: char) -> Self {
        self.level = Some(level);
        self
    }

    pub fn expand(&self, root: &ConfigNode) -> Result<(), ConfigError> {
        let token = TokenPattern::compile(self.separator, &self.prefix, self.level);
        let mut visitor = GraftVisitor {
            root: root.clone(),
            separator: self.separator,
            token,
            pending: HashMap::new(),
        };
        root.accept(&mut visitor)?;

        for (_, (parent, mut grafts)) in visitor.pending {
            // Descending index order keeps the remaining indices valid
            // while erasing.
            grafts.sort_by(|a, b| b.index.cmp(&a.index));
            for graft in &grafts {
                parent.erase_scalar(&graft.key, graft.index);
            }
            for graft in grafts {
                parent.set_subnode(&graft.key, graft.node, None);
            }
        }
        Ok(())
    }
}

struct TokenPattern {
    regex: Regex,
    has_current_group: bool,
    up_marker_len: usize,
}

struct NodeRef<'a> {
    current: bool,
    up_count: usize,
    path: &'a str,
}

impl TokenPattern {
    fn compile(separator: Separator, prefix: &str, level: Option<char>) -> TokenPattern {
        let sep = regex::escape(&separator.as_char().to_string());
        let prefix = regex::escape(prefix);
        let blank = r"[ \t\r\n]*";
        match level {
            None => {
                let pattern = format!("^{blank}%{prefix}{sep}((?:{sep})*)([^%]+)%{blank}$");
                TokenPattern {
                    regex: Regex::new(&pattern).expect("graft token pattern is valid"),
                    has_current_group: false,
                    up_marker_len: 1,
                }
            }
            Some(level) => {
                let lvl = regex::escape(&level.to_string());
                let pattern = format!(
                    "^{blank}%{prefix}{sep}((?:{lvl}{sep})*)((?:{lvl}{lvl}{sep})*)([^%]+)%{blank}$"
                );
                TokenPattern {
                    regex: Regex::new(&pattern).expect("graft token pattern is valid"),
                    has_current_group: true,
                    up_marker_len: level.len_utf8() * 2 + 1,
                }
            }
        }
    }

    fn parse<'a>(&self, value: &'a str) -> Option<NodeRef<'a>> {
        let captures = self.regex.captures(value)?;
        let (current, up, path) = if self.has_current_group {
            (
                !captures[1].is_empty(),
                captures.get(2).map_or("", |m| m.as_str()),
                captures.get(3).map_or("", |m| m.as_str()),
            )
        } else {
            (
                false,
                captures.get(1).map_or("", |m| m.as_str()),
                captures.get(2).map_or("", |m| m.as_str()),
            )
        };
        Some(NodeRef {
            current,
            up_count: up.len() / self.up_marker_len,
            path,
        })
    }
}

struct PendingGraft {
    key: String,
    node: ConfigNode,
    index: usize,
}

struct GraftVisitor {
    root: ConfigNode,
    separator: Separator,
    token: TokenPattern,
    /// Replacements accumulated per owning parent, keyed by handle identity.
    pending: HashMap<usize, (ConfigNode, Vec<PendingGraft>)>,
}

impl NodeVisitor for GraftVisitor {
    fn visit_scalar(
        &mut self,
        parent: &ConfigNode,
        key: &str,
        index: usize,
        value: &str,
    ) -> Result<(), ConfigError> {
        let Some(reference) = self.token.parse(value) else {
            return Ok(());
        };

        let mut scope = self.root.clone();
        if reference.current {
            scope = parent.clone();
        }
        if reference.up_count > 0 {
            scope = parent.clone();
            for _ in 0..reference.up_count {
                scope = scope.parent().ok_or_else(|| ConfigError::UnresolvedReference {
                    token: value.to_string(),
                    key: key.to_string(),
                    index,
                })?;
            }
        }

        if self.try_queue(&scope, parent, key, index, reference.path) {
            return Ok(());
        }
        // Root-scope misses retry once from the scalar's parent.
        if scope.ptr_eq(&self.root) && self.try_queue(parent, parent, key, index, reference.path)
        {
            return Ok(());
        }

        Err(ConfigError::UnresolvedReference {
            token: value.to_string(),
            key: key.to_string(),
            index,
        })
    }
}

impl GraftVisitor {
    fn try_queue(
        &mut self,
        scope: &ConfigNode,
        parent: &ConfigNode,
        key: &str,
        index: usize,
        path: &str,
    ) -> bool {
        if let Some(target) = scope.get_subnodes(path, self.separator).into_iter().next() {
            self.queue(parent, key, index, target);
            return true;
        }

        // Base-node fallback: the referenced path may itself be a pending
        // scalar already queued for replacement; reuse its target.
        if let Some((base_parent, base_key)) = self.base_slot(scope, path) {
            let reused = self
                .pending
                .get(&base_parent.handle_id())
                .and_then(|(_, grafts)| {
                    grafts
                        .iter()
                        .find(|graft| graft.key == base_key)
                        .map(|graft| graft.node.clone())
                });
            if let Some(target) = reused {
                warn!(path, key, "reusing pending graft target for base-node reference");
                self.queue(parent, key, index, target);
                return true;
            }
        }

        false
    }

    fn queue(&mut self, parent: &ConfigNode, key: &str, index: usize, node: ConfigNode) {
        self.pending
            .entry(parent.handle_id())
            .or_insert_with(|| (parent.clone(), Vec::new()))
            .1
            .push(PendingGraft {
                key: key.to_string(),
                node,
                index,
            });
    }

    /// Split `path` at its last separator and resolve the prefix to the
    /// subnode owning the final segment, provided a scalar still exists at
    /// the full path.
    fn base_slot(&self, scope: &ConfigNode, path: &str) -> Option<(ConfigNode, String)> {
        if scope.get_scalars(path, self.separator).is_empty() {
            return None;
        }
        let pos = path.rfind(self.separator.as_char())?;
        let (prefix, last) = (&path[..pos], &path[pos + 1..]);
        scope
            .get_subnodes(prefix, self.separator)
            .into_iter()
            .next()
            .map(|node| (node, last.to_string()))
    }
}
