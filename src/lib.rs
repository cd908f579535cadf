//! Cascade: Layered Configuration Trees
//!
//! Loads serialized configuration documents, merges them into a single
//! logical tree, resolves parameter and subtree cross-references, and exposes
//! a typed, path-addressed read API with scoped sub-views.

pub mod builder;
pub mod config;
pub mod error;
pub mod expand;
pub mod loader;
pub mod logging;
pub mod node;
pub mod parser;
pub mod separator;

pub use builder::TreeBuilder;
pub use config::Config;
pub use error::ConfigError;
pub use expand::{GraftExpander, ParamExpander};
pub use loader::FileLoader;
pub use node::{ConfigNode, NodeVisitor};
pub use parser::{DocumentParser, JsonParser};
pub use separator::Separator;
