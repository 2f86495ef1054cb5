use arbor::{
    FocusDirection, KeyCode, KeyEvent, Mods, NodeFlags, NodeId, PointerAction, PointerEvent, Tree,
    geom::{Rect, Size},
};

fn tree() -> Tree {
    let mut t = Tree::new();
    t.set_root_size(Size::new(300, 300));
    t.perform_layout();
    t
}

fn button(t: &mut Tree, parent: NodeId, bounds: Rect) -> NodeId {
    let id = t.add_child(parent).unwrap();
    t.modify_flags(id, NodeFlags::FOCUSABLE, NodeFlags::empty());
    t.set_animated_bounds(id, bounds);
    id
}

fn grid(t: &mut Tree) -> [[NodeId; 2]; 2] {
    let root = t.root();
    let cell = |row: i32, col: i32| {
        Rect::new(col * 100, row * 100, col * 100 + 80, row * 100 + 80)
    };
    [
        [button(t, root, cell(0, 0)), button(t, root, cell(0, 1))],
        [button(t, root, cell(1, 0)), button(t, root, cell(1, 1))],
    ]
}

#[test]
fn arrows_walk_the_grid_spatially() {
    let mut t = tree();
    let g = grid(&mut t);
    t.request_focus(g[0][0]);

    assert!(t.dispatch_key(KeyEvent::down(KeyCode::ArrowRight)));
    assert_eq!(t.focused(), Some(g[0][1]));
    assert!(t.dispatch_key(KeyEvent::down(KeyCode::ArrowDown)));
    assert_eq!(t.focused(), Some(g[1][1]));
    assert!(t.dispatch_key(KeyEvent::down(KeyCode::ArrowLeft)));
    assert_eq!(t.focused(), Some(g[1][0]));
    assert!(t.dispatch_key(KeyEvent::down(KeyCode::ArrowUp)));
    assert_eq!(t.focused(), Some(g[0][0]));

    // No candidate above the top row.
    assert!(!t.dispatch_key(KeyEvent::down(KeyCode::ArrowUp)));
    assert_eq!(t.focused(), Some(g[0][0]));
}

#[test]
fn tab_cycles_in_preorder() {
    let mut t = tree();
    let g = grid(&mut t);
    t.request_focus(g[0][0]);

    let flat = [g[0][0], g[0][1], g[1][0], g[1][1]];
    for expected in flat.iter().skip(1).chain([&flat[0]]) {
        assert!(t.dispatch_key(KeyEvent::down(KeyCode::Tab)));
        assert_eq!(t.focused(), Some(*expected));
    }

    let shift_tab = KeyEvent {
        code: KeyCode::Tab,
        mods: Mods {
            shift: true,
            ..Mods::default()
        },
        down: true,
    };
    assert!(t.dispatch_key(shift_tab));
    assert_eq!(t.focused(), Some(g[1][1]));
}

#[test]
fn touch_exits_keys_reenter() {
    let mut t = tree();
    let g = grid(&mut t);
    t.request_focus(g[0][0]);

    // A touch enters touch mode; plain-focusable nodes cannot hold
    // focus there, so it drops.
    t.dispatch_pointer(PointerEvent::new(PointerAction::Down, (290, 290)));
    t.dispatch_pointer(PointerEvent::new(PointerAction::Up, (290, 290)));
    assert!(t.touch_mode());
    assert_eq!(t.focused(), None);

    // The first directional key leaves touch mode and seeds focus.
    assert!(t.dispatch_key(KeyEvent::down(KeyCode::ArrowDown)));
    assert!(!t.touch_mode());
    assert_eq!(t.focused(), Some(g[0][0]));
}

#[test]
fn clusters_scope_navigation() {
    let mut t = tree();
    let root = t.root();
    let toolbar = t.add_child(root).unwrap();
    t.modify_flags(toolbar, NodeFlags::FOCUS_CLUSTER, NodeFlags::empty());
    t.set_animated_bounds(toolbar, Rect::new(0, 0, 300, 50));
    let tool_a = button(&mut t, toolbar, Rect::new(0, 0, 40, 40));
    let tool_b = button(&mut t, toolbar, Rect::new(50, 0, 90, 40));
    let content = button(&mut t, root, Rect::new(0, 100, 300, 200));

    t.request_focus(tool_a);
    assert_eq!(t.focus_search(Some(tool_a), FocusDirection::Right), Some(tool_b));
    // Down would land on content, which is outside the cluster.
    assert_eq!(t.focus_search(Some(tool_a), FocusDirection::Down), None);
    // Sequential navigation is scoped the same way and wraps inside.
    assert_eq!(t.focus_search(Some(tool_b), FocusDirection::Forward), Some(tool_a));
    let _ = content;
}

#[test]
fn disabled_nodes_are_skipped() {
    let mut t = tree();
    let root = t.root();
    let a = button(&mut t, root, Rect::new(0, 0, 40, 40));
    let b = button(&mut t, root, Rect::new(0, 50, 40, 90));
    let c = button(&mut t, root, Rect::new(0, 100, 40, 140));
    t.modify_flags(b, NodeFlags::empty(), NodeFlags::ENABLED);

    t.request_focus(a);
    assert_eq!(t.focus_search(Some(a), FocusDirection::Down), Some(c));
}

#[test]
fn removal_of_the_holder_lands_on_a_neighbor() {
    let mut t = tree();
    let g = grid(&mut t);
    t.request_focus(g[1][0]);
    t.remove(g[1][0]).unwrap();
    assert_eq!(t.focused(), Some(g[1][1]));

    // Removing everything clears focus entirely.
    for id in [g[0][0], g[0][1], g[1][1]] {
        t.remove(id).unwrap();
    }
    assert_eq!(t.focused(), None);
}
