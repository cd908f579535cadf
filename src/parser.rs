//! Surface-syntax parsing seam and its default JSON implementation.
//!
//! The tree engine consumes already-parsed [`ConfigNode`] trees; a parser's
//! only contract is to mirror a document's nested objects and leaf values
//! with insertion order preserved and arrays becoming multi-element
//! sequences under a single key.

use crate::error::ConfigError;
use crate::node::ConfigNode;
use serde_json::Value;

/// Turns one raw document string into a node tree.
pub trait DocumentParser {
    fn parse(&self, text: &str) -> Result<ConfigNode, ConfigError>;
}

/// Order-preserving JSON parser.
///
/// Objects become subnodes, strings/numbers/booleans become scalars
/// (non-strings stringified, null becomes the empty string), and arrays
/// become multi-element sequences under their key.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl DocumentParser for JsonParser {
    fn parse(&self, text: &str) -> Result<ConfigNode, ConfigError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ConfigError::Parse(
                "document root must be an object".to_string(),
            ));
        };
        let root = ConfigNode::new();
        populate(&root, map)?;
        Ok(root)
    }
}

fn populate(node: &ConfigNode, map: serde_json::Map<String, Value>) -> Result<(), ConfigError> {
    for (key, value) in map {
        append_value(node, &key, value)?;
    }
    Ok(())
}

fn append_value(node: &ConfigNode, key: &str, value: Value) -> Result<(), ConfigError> {
    match value {
        Value::Object(map) => {
            let child = ConfigNode::new();
            populate(&child, map)?;
            node.set_subnode(key, child, None);
        }
        Value::Array(items) => {
            for item in items {
                if matches!(item, Value::Array(_)) {
                    return Err(ConfigError::Parse(format!(
                        "nested arrays are not supported at key {key:?}"
                    )));
                }
                append_value(node, key, item)?;
            }
        }
        Value::String(text) => node.set_scalar(key, text, None),
        Value::Bool(flag) => node.set_scalar(key, flag.to_string(), None),
        Value::Number(number) => node.set_scalar(key, number.to_string(), None),
        Value::Null => node.set_scalar(key, String::new(), None),
    }
    Ok(())
}
