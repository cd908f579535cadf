//! Read-facing configuration facade.
//!
//! A [`Config`] combines shared ownership of a built tree's root with a
//! cursor node and a separator. Reads are path-addressed relative to the
//! cursor; `scope`/`scopes` derive sub-views that keep the root alive.

use crate::error::ConfigError;
use crate::loader::FileLoader;
use crate::node::ConfigNode;
use crate::separator::Separator;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Read-only view over a built configuration tree.
#[derive(Clone)]
pub struct Config {
    root: ConfigNode,
    cursor: Option<ConfigNode>,
    separator: Separator,
}

impl Config {
    pub(crate) fn new(root: ConfigNode, separator: Separator) -> Self {
        Self {
            cursor: Some(root.clone()),
            root,
            separator,
        }
    }

    /// Load, merge, and expand the given files with the default pipeline.
    ///
    /// Missing or unreadable files are skipped; see [`FileLoader`].
    pub fn from_files(
        files: impl IntoIterator<Item = impl Into<PathBuf>>,
        separator: Separator,
    ) -> Result<Config, ConfigError> {
        FileLoader::new(files.into_iter().map(Into::into).collect())
            .with_separator(separator)
            .create()
    }

    /// Fetch the first scalar at `path` and parse it into `T`.
    ///
    /// A missing path or empty sequence is `Ok(None)`; a failed parse is
    /// [`ConfigError::Conversion`].
    pub fn get<T>(&self, path: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(cursor) = &self.cursor else {
            return Ok(None);
        };
        match cursor.get_scalars(path, self.separator).into_iter().next() {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::Conversion {
                    path: path.to_string(),
                    value: raw,
                    target: std::any::type_name::<T>(),
                    message: e.to_string(),
                }),
        }
    }

    /// Parse every scalar in the sequence at `path` into `T`.
    pub fn get_all<T>(&self, path: &str) -> Result<Vec<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(cursor) = &self.cursor else {
            return Ok(Vec::new());
        };
        cursor
            .get_scalars(path, self.separator)
            .into_iter()
            .map(|raw| {
                raw.parse::<T>().map_err(|e| ConfigError::Conversion {
                    path: path.to_string(),
                    value: raw.clone(),
                    target: std::any::type_name::<T>(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// The raw scalar sequence at `path`, without conversion.
    pub fn get_raw(&self, path: &str) -> Vec<String> {
        match &self.cursor {
            Some(cursor) => cursor.get_scalars(path, self.separator),
            None => Vec::new(),
        }
    }

    /// A facade cursored on the first subnode at `path`.
    ///
    /// A miss yields a null-cursor facade that still holds the root and
    /// answers none/empty to every read.
    pub fn scope(&self, path: &str) -> Config {
        let cursor = self
            .cursor
            .as_ref()
            .and_then(|cursor| cursor.get_subnodes(path, self.separator).into_iter().next());
        Config {
            root: self.root.clone(),
            cursor,
            separator: self.separator,
        }
    }

    /// One facade per subnode at `path`.
    pub fn scopes(&self, path: &str) -> Vec<Config> {
        match &self.cursor {
            Some(cursor) => cursor
                .get_subnodes(path, self.separator)
                .into_iter()
                .map(|node| Config {
                    root: self.root.clone(),
                    cursor: Some(node),
                    separator: self.separator,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether this facade points at a node.
    pub fn is_valid(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("separator", &self.separator)
            .field("valid", &self.is_valid())
            .finish()
    }
}
