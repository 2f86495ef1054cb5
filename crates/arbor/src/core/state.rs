//! Hierarchy state save and restore.
//!
//! Nodes that carry a stable state id and a [`Stateful`] capability
//! contribute an opaque blob to a [`StateContainer`]. Restore is
//! tolerant by design: blobs with no matching node and nodes with no
//! matching blob are skipped silently, so a container captured from an
//! older tree shape still applies cleanly.
//!
//! [`Stateful`]: crate::core::caps::Stateful

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{id::NodeId, node::NodeFlags, tree::Tree};

/// Storage for per-node state blobs, keyed by stable state id.
pub trait StateContainer {
    /// Store a blob, replacing any previous blob for the id.
    fn put(&mut self, state_id: u64, blob: Value);

    /// Look up the blob for an id.
    fn get(&self, state_id: u64) -> Option<&Value>;
}

/// In-memory [`StateContainer`], serializable for persistence.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStateContainer {
    blobs: HashMap<u64, Value>,
}

impl MemoryStateContainer {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Is the container empty?
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl StateContainer for MemoryStateContainer {
    fn put(&mut self, state_id: u64, blob: Value) {
        self.blobs.insert(state_id, blob);
    }

    fn get(&self, state_id: u64) -> Option<&Value> {
        self.blobs.get(&state_id)
    }
}

impl Tree {
    /// Nodes eligible for state traversal, preorder, pruning subtrees
    /// with saving disabled.
    fn state_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(n) = self.nodes.get(id) else {
                continue;
            };
            if n.flags.contains(NodeFlags::SAVE_DISABLED) {
                continue;
            }
            out.push(id);
            for child in n.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Collect state blobs from every attached node carrying a state
    /// id, skipping subtrees with saving disabled.
    pub fn save_hierarchy(&mut self, into: &mut dyn StateContainer) {
        for id in self.state_nodes() {
            let Some(state_id) = self.nodes[id].state_id else {
                continue;
            };
            let Some(mut cap) = self.nodes[id].caps.state.take() else {
                continue;
            };
            if let Some(blob) = cap.save(id) {
                into.put(state_id, blob);
            }
            if let Some(n) = self.nodes.get_mut(id) {
                n.caps.state = Some(cap);
            }
        }
    }

    /// Apply stored blobs to matching nodes. Ids present in the
    /// container but absent from the tree, and vice versa, are ignored.
    pub fn restore_hierarchy(&mut self, from: &dyn StateContainer) {
        for id in self.state_nodes() {
            let Some(state_id) = self.nodes[id].state_id else {
                continue;
            };
            let Some(blob) = from.get(state_id).cloned() else {
                continue;
            };
            let Some(mut cap) = self.nodes[id].caps.state.take() else {
                continue;
            };
            cap.restore(id, &blob);
            if let Some(n) = self.nodes.get_mut(id) {
                n.caps.state = Some(cap);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::core::caps::Stateful;

    struct Counter {
        value: Arc<Mutex<i64>>,
    }

    impl Stateful for Counter {
        fn save(&mut self, _: NodeId) -> Option<Value> {
            Some(json!({ "value": *self.value.lock().unwrap() }))
        }
        fn restore(&mut self, _: NodeId, blob: &Value) {
            if let Some(v) = blob.get("value").and_then(Value::as_i64) {
                *self.value.lock().unwrap() = v;
            }
        }
    }

    fn stateful(t: &mut Tree, parent: NodeId, state_id: u64) -> (NodeId, Arc<Mutex<i64>>) {
        let value = Arc::new(Mutex::new(0));
        let id = t.add_child(parent).unwrap();
        t.set_state_id(id, Some(state_id));
        t.caps_mut(id).unwrap().set_stateful(Counter {
            value: value.clone(),
        });
        (id, value)
    }

    #[test]
    fn roundtrip_by_state_id() {
        let mut t = Tree::new();
        let root = t.root();
        let (_, v1) = stateful(&mut t, root, 7);
        *v1.lock().unwrap() = 42;

        let mut store = MemoryStateContainer::new();
        t.save_hierarchy(&mut store);
        assert_eq!(store.len(), 1);

        // A freshly built tree with the same state id picks the blob up.
        let mut t2 = Tree::new();
        let root2 = t2.root();
        let (_, v2) = stateful(&mut t2, root2, 7);
        t2.restore_hierarchy(&store);
        assert_eq!(*v2.lock().unwrap(), 42);
    }

    #[test]
    fn drifted_shapes_are_tolerated() {
        let mut t = Tree::new();
        let root = t.root();
        let (_, v1) = stateful(&mut t, root, 1);
        *v1.lock().unwrap() = 5;
        let mut store = MemoryStateContainer::new();
        t.save_hierarchy(&mut store);

        // The restored tree has a different id set; nothing matches and
        // nothing fails.
        let mut t2 = Tree::new();
        let root2 = t2.root();
        let (_, v2) = stateful(&mut t2, root2, 99);
        t2.restore_hierarchy(&store);
        assert_eq!(*v2.lock().unwrap(), 0);
    }

    #[test]
    fn save_disabled_prunes_subtree() {
        let mut t = Tree::new();
        let gate = t.add_child(t.root()).unwrap();
        let (_, v) = stateful(&mut t, gate, 3);
        *v.lock().unwrap() = 9;
        t.modify_flags(gate, NodeFlags::SAVE_DISABLED, NodeFlags::empty());

        let mut store = MemoryStateContainer::new();
        t.save_hierarchy(&mut store);
        assert!(store.is_empty());
    }

    #[test]
    fn nodes_without_ids_are_skipped() {
        let mut t = Tree::new();
        let id = t.add_child(t.root()).unwrap();
        t.caps_mut(id).unwrap().set_stateful(Counter {
            value: Arc::default(),
        });
        let mut store = MemoryStateContainer::new();
        t.save_hierarchy(&mut store);
        assert!(store.is_empty());
    }
}
