//! Configuration tree cells.
//!
//! A [`ConfigNode`] holds insertion-ordered, multi-valued scalar children and
//! subnode children plus a weak back-link to its parent. Handles are cheap to
//! clone and shareable; subtrees installed by graft expansion may appear under
//! more than one parent.

use crate::error::ConfigError;
use crate::separator::Separator;
use indexmap::map::Entry;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

#[derive(Default)]
struct NodeInner {
    scalars: IndexMap<String, Vec<String>>,
    subnodes: IndexMap<String, Vec<ConfigNode>>,
    parent: Weak<RwLock<NodeInner>>,
}

/// A cell of the configuration tree.
///
/// Cloning a `ConfigNode` clones the handle, not the tree; use
/// [`ConfigNode::deep_clone`] for a structural copy. All mutating operations
/// are construction-phase only; after the build completes the tree is treated
/// as read-only.
#[derive(Clone, Default)]
pub struct ConfigNode {
    inner: Arc<RwLock<NodeInner>>,
}

impl ConfigNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read();
        inner.scalars.is_empty() && inner.subnodes.is_empty()
    }

    /// Upward navigation. Returns `None` for the root.
    pub fn parent(&self) -> Option<ConfigNode> {
        self.inner.read().parent.upgrade().map(|inner| ConfigNode { inner })
    }

    /// Handle identity (not structural equality).
    pub fn ptr_eq(&self, other: &ConfigNode) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn handle_id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn set_parent(&self, parent: &ConfigNode) {
        self.inner.write().parent = Arc::downgrade(&parent.inner);
    }

    /// Set or append a scalar under `key`.
    ///
    /// If `key` is absent a new one-element entry is appended. With an
    /// existing key, `index` overwrites that element (it must exist);
    /// without one the value is appended to the sequence.
    pub fn set_scalar(&self, key: &str, value: impl Into<String>, index: Option<usize>) {
        let value = value.into();
        let mut inner = self.inner.write();
        match inner.scalars.entry(key.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(vec![value]);
            }
            Entry::Occupied(mut entry) => match index {
                None => entry.get_mut().push(value),
                Some(i) => {
                    debug_assert!(i < entry.get().len(), "scalar index out of range");
                    entry.get_mut()[i] = value;
                }
            },
        }
    }

    /// Set or append a subnode under `key`, re-parenting it to self.
    pub fn set_subnode(&self, key: &str, node: ConfigNode, index: Option<usize>) {
        node.set_parent(self);
        let mut inner = self.inner.write();
        match inner.subnodes.entry(key.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(vec![node]);
            }
            Entry::Occupied(mut entry) => match index {
                None => entry.get_mut().push(node),
                Some(i) => {
                    debug_assert!(i < entry.get().len(), "subnode index out of range");
                    entry.get_mut()[i] = node;
                }
            },
        }
    }

    /// Resolve the scalar sequence at `path`, walking subnodes by each
    /// intermediate segment (first element of any multi-valued step).
    ///
    /// An empty path, a path equal to the separator alone, or any failed
    /// step yields an empty sequence.
    pub fn get_scalars(&self, path: &str, separator: Separator) -> Vec<String> {
        match self.resolve(path, separator) {
            Some((node, key)) => {
                let inner = node.inner.read();
                inner.scalars.get(&key).cloned().unwrap_or_default()
            }
            None => Vec::new(),
        }
    }

    /// Resolve the subnode sequence at `path`; same walk as
    /// [`ConfigNode::get_scalars`] with the terminal lookup in subnodes.
    pub fn get_subnodes(&self, path: &str, separator: Separator) -> Vec<ConfigNode> {
        match self.resolve(path, separator) {
            Some((node, key)) => {
                let inner = node.inner.read();
                inner.subnodes.get(&key).cloned().unwrap_or_default()
            }
            None => Vec::new(),
        }
    }

    /// Walk intermediate segments, returning the node owning the terminal
    /// segment together with that segment.
    fn resolve(&self, path: &str, separator: Separator) -> Option<(ConfigNode, String)> {
        let path = normalize_path(path, separator);
        if path.is_empty() {
            return None;
        }
        let mut node = self.clone();
        let mut rest = path;
        while let Some(pos) = rest.find(separator.as_char()) {
            let head = &rest[..pos];
            node = node.first_subnode(head)?;
            rest = &rest[pos + 1..];
        }
        Some((node, rest.to_string()))
    }

    fn first_subnode(&self, key: &str) -> Option<ConfigNode> {
        self.inner
            .read()
            .subnodes
            .get(key)
            .and_then(|sequence| sequence.first().cloned())
    }

    /// Remove `key` from both containers.
    pub fn erase(&self, key: &str) {
        let mut inner = self.inner.write();
        inner.scalars.shift_remove(key);
        inner.subnodes.shift_remove(key);
    }

    /// Remove the `index`-th scalar at `key`; an emptied entry is dropped.
    pub fn erase_scalar(&self, key: &str, index: usize) {
        let mut inner = self.inner.write();
        let emptied = match inner.scalars.get_mut(key) {
            Some(sequence) if index < sequence.len() => {
                sequence.remove(index);
                sequence.is_empty()
            }
            _ => false,
        };
        if emptied {
            inner.scalars.shift_remove(key);
        }
    }

    /// Remove the `index`-th subnode at `key`; an emptied entry is dropped.
    pub fn erase_subnode(&self, key: &str, index: usize) {
        let mut inner = self.inner.write();
        let emptied = match inner.subnodes.get_mut(key) {
            Some(sequence) if index < sequence.len() => {
                sequence.remove(index);
                sequence.is_empty()
            }
            _ => false,
        };
        if emptied {
            inner.subnodes.shift_remove(key);
        }
    }

    /// Destructive merge of `other` into self; the later (incoming) document
    /// wins.
    ///
    /// Subnode sequences merge element-by-element on matching indices with
    /// extra incoming elements appended and extra existing elements retained.
    /// Scalar entries are replaced wholesale. A key whose kind differs
    /// between the two sides takes the incoming kind.
    pub fn overwrite(&self, other: ConfigNode) {
        let (other_scalars, other_subnodes) = {
            let mut inner = other.inner.write();
            (
                std::mem::take(&mut inner.scalars),
                std::mem::take(&mut inner.subnodes),
            )
        };
        let incoming_subnode_keys: HashSet<String> =
            other_subnodes.keys().cloned().collect();

        for (key, incoming) in other_subnodes {
            if !other_scalars.contains_key(&key) {
                self.inner.write().scalars.shift_remove(&key);
            }
            let existing = self.inner.read().subnodes.get(&key).cloned();
            match existing {
                None => {
                    for child in &incoming {
                        child.set_parent(self);
                    }
                    self.inner.write().subnodes.insert(key, incoming);
                }
                Some(mut merged) => {
                    for (i, child) in incoming.into_iter().enumerate() {
                        if i < merged.len() {
                            merged[i].overwrite(child);
                        } else {
                            child.set_parent(self);
                            merged.push(child);
                        }
                    }
                    if let Some(slot) = self.inner.write().subnodes.get_mut(&key) {
                        *slot = merged;
                    }
                }
            }
        }

        for (key, sequence) in other_scalars {
            let mut inner = self.inner.write();
            if !incoming_subnode_keys.contains(&key) {
                inner.subnodes.shift_remove(&key);
            }
            match inner.scalars.entry(key) {
                Entry::Occupied(mut entry) => {
                    *entry.get_mut() = sequence;
                }
                Entry::Vacant(entry) => {
                    entry.insert(sequence);
                }
            }
        }
    }

    /// Exchange both containers with `other`, then refresh the immediate
    /// children's parent pointers on both sides (non-recursive).
    pub fn swap(&self, other: &ConfigNode) {
        if self.ptr_eq(other) {
            return;
        }
        {
            let mut a = self.inner.write();
            let mut b = other.inner.write();
            std::mem::swap(&mut a.scalars, &mut b.scalars);
            std::mem::swap(&mut a.subnodes, &mut b.subnodes);
        }
        self.reparent_children();
        other.reparent_children();
    }

    fn reparent_children(&self) {
        let children: Vec<ConfigNode> = {
            let inner = self.inner.read();
            inner
                .subnodes
                .values()
                .flat_map(|sequence| sequence.iter().cloned())
                .collect()
        };
        for child in children {
            child.set_parent(self);
        }
    }

    /// Deep structural copy. Every parent link in the clone points inside
    /// the clone; subtrees shared in the original are duplicated.
    pub fn deep_clone(&self) -> ConfigNode {
        let (scalars, subnodes) = {
            let inner = self.inner.read();
            (inner.scalars.clone(), inner.subnodes.clone())
        };
        let clone = ConfigNode::new();
        clone.inner.write().scalars = scalars;
        for (key, sequence) in subnodes {
            for child in sequence {
                clone.set_subnode(&key, child.deep_clone(), None);
            }
        }
        clone
    }

    /// Snapshot of the scalar entries in insertion order.
    pub fn scalar_entries(&self) -> Vec<(String, Vec<String>)> {
        self.inner
            .read()
            .scalars
            .iter()
            .map(|(key, sequence)| (key.clone(), sequence.clone()))
            .collect()
    }

    /// Snapshot of the subnode entries in insertion order.
    pub fn subnode_entries(&self) -> Vec<(String, Vec<ConfigNode>)> {
        self.inner
            .read()
            .subnodes
            .iter()
            .map(|(key, sequence)| (key.clone(), sequence.clone()))
            .collect()
    }

    /// Visit every subnode element, then every scalar element, each in
    /// insertion order with per-key sequences in index order. The default
    /// subnode visit recurses, so a visitor sees the whole subtree.
    pub fn accept<V: NodeVisitor>(&self, visitor: &mut V) -> Result<(), ConfigError> {
        for (key, sequence) in self.subnode_entries() {
            for (index, node) in sequence.iter().enumerate() {
                visitor.visit_subnode(self, &key, index, node)?;
            }
        }
        for (key, sequence) in self.scalar_entries() {
            for (index, value) in sequence.iter().enumerate() {
                visitor.visit_scalar(self, &key, index, value)?;
            }
        }
        Ok(())
    }

    fn print(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        for (key, sequence) in self.subnode_entries() {
            for node in &sequence {
                writeln!(f, "{indent}{key}")?;
                let deeper = format!("{indent}    ");
                node.print(f, &deeper)?;
            }
        }
        for (key, sequence) in self.scalar_entries() {
            writeln!(f, "{indent}{key} = [{}]", sequence.join(", "))?;
        }
        Ok(())
    }
}

/// Traversal callbacks used by the expansion passes.
pub trait NodeVisitor {
    fn visit_scalar(
        &mut self,
        parent: &ConfigNode,
        key: &str,
        index: usize,
        value: &str,
    ) -> Result<(), ConfigError>;

    fn visit_subnode(
        &mut self,
        parent: &ConfigNode,
        key: &str,
        index: usize,
        node: &ConfigNode,
    ) -> Result<(), ConfigError>
    where
        Self: Sized,
    {
        let _ = (parent, key, index);
        node.accept(self)
    }
}

/// Structural equality under insertion-order comparison; parent links are
/// not compared.
impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.scalar_entries() == other.scalar_entries()
            && self.subnode_entries() == other.subnode_entries()
    }
}

impl Eq for ConfigNode {}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print(f, "")
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ConfigNode")
            .field("scalar_keys", &inner.scalars.keys().collect::<Vec<_>>())
            .field("subnode_keys", &inner.subnodes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A path of exactly one separator character is the empty path.
fn normalize_path(path: &str, separator: Separator) -> &str {
    if path.len() == 1 && path.as_bytes()[0] == separator.as_byte() {
        ""
    } else {
        path
    }
}
