use std::sync::{Arc, Mutex};

use arbor::{
    MemoryStateContainer, NodeFlags, NodeId, StateContainer, Stateful, Tree,
    geom::Point,
};
use serde_json::{Value, json};

/// Persists a scroll offset, the way a list would across teardown.
struct ScrollMemory {
    offset: Arc<Mutex<Point>>,
}

impl Stateful for ScrollMemory {
    fn save(&mut self, _: NodeId) -> Option<Value> {
        let p = *self.offset.lock().unwrap();
        Some(json!({ "x": p.x, "y": p.y }))
    }

    fn restore(&mut self, _: NodeId, blob: &Value) {
        let x = blob.get("x").and_then(Value::as_i64);
        let y = blob.get("y").and_then(Value::as_i64);
        if let (Some(x), Some(y)) = (x, y) {
            *self.offset.lock().unwrap() = Point::new(x as i32, y as i32);
        }
    }
}

fn list_node(t: &mut Tree, state_id: u64) -> (NodeId, Arc<Mutex<Point>>) {
    let offset = Arc::new(Mutex::new(Point::zero()));
    let id = t.add_child(t.root()).unwrap();
    t.set_state_id(id, Some(state_id));
    t.caps_mut(id).unwrap().set_stateful(ScrollMemory {
        offset: offset.clone(),
    });
    (id, offset)
}

#[test]
fn state_survives_a_tree_rebuild() {
    let mut t = Tree::new();
    let (_, offset) = list_node(&mut t, 11);
    *offset.lock().unwrap() = Point::new(0, 480);

    let mut store = MemoryStateContainer::new();
    t.save_hierarchy(&mut store);

    // Rebuild from scratch, as after a configuration change.
    let mut t = Tree::new();
    let (_, offset) = list_node(&mut t, 11);
    t.restore_hierarchy(&store);
    assert_eq!(*offset.lock().unwrap(), Point::new(0, 480));
}

#[test]
fn container_roundtrips_through_json() {
    let mut t = Tree::new();
    let (_, offset) = list_node(&mut t, 5);
    *offset.lock().unwrap() = Point::new(3, 7);

    let mut store = MemoryStateContainer::new();
    t.save_hierarchy(&mut store);
    let persisted = serde_json::to_string(&store).unwrap();
    let store: MemoryStateContainer = serde_json::from_str(&persisted).unwrap();

    let mut t = Tree::new();
    let (_, offset) = list_node(&mut t, 5);
    t.restore_hierarchy(&store);
    assert_eq!(*offset.lock().unwrap(), Point::new(3, 7));
}

#[test]
fn unmatched_blobs_and_nodes_are_ignored() {
    let mut t = Tree::new();
    let (_, a) = list_node(&mut t, 1);
    let (_, b) = list_node(&mut t, 2);
    *a.lock().unwrap() = Point::new(0, 10);
    *b.lock().unwrap() = Point::new(0, 20);

    let mut store = MemoryStateContainer::new();
    t.save_hierarchy(&mut store);

    // The rebuilt tree kept id 2, dropped id 1, and added id 3.
    let mut t = Tree::new();
    let (_, b2) = list_node(&mut t, 2);
    let (_, c) = list_node(&mut t, 3);
    t.restore_hierarchy(&store);
    assert_eq!(*b2.lock().unwrap(), Point::new(0, 20));
    assert_eq!(*c.lock().unwrap(), Point::zero());
}

#[test]
fn malformed_blobs_leave_state_untouched() {
    let mut store = MemoryStateContainer::new();
    let mut t = Tree::new();
    let (_, offset) = list_node(&mut t, 9);
    t.save_hierarchy(&mut store);

    // Hand the node a blob of the wrong shape.
    let mut bad = MemoryStateContainer::new();
    bad.put(9, json!("not an offset"));
    t.restore_hierarchy(&bad);
    assert_eq!(*offset.lock().unwrap(), Point::zero());
}

#[test]
fn save_disabled_excludes_a_subtree() {
    let mut t = Tree::new();
    let private = t.add_child(t.root()).unwrap();
    t.modify_flags(private, NodeFlags::SAVE_DISABLED, NodeFlags::empty());

    let offset = Arc::new(Mutex::new(Point::new(1, 1)));
    let inner = t.add_child(private).unwrap();
    t.set_state_id(inner, Some(77));
    t.caps_mut(inner).unwrap().set_stateful(ScrollMemory {
        offset: offset.clone(),
    });

    let (_, public_offset) = list_node(&mut t, 78);
    *public_offset.lock().unwrap() = Point::new(2, 2);

    let mut store = MemoryStateContainer::new();
    t.save_hierarchy(&mut store);
    assert_eq!(store.len(), 1);
    assert!(store.get(77).is_none());
}
