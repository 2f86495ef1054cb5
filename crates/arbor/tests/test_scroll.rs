use std::sync::{Arc, Mutex};

use arbor::{NestedScrollParent, NodeId, ScrollAxes, Tree};

/// A pull-to-refresh wrapper: while armed it absorbs downward pulls
/// before the list scrolls, up to a budget.
struct Refresher {
    budget: Arc<Mutex<i32>>,
}

impl NestedScrollParent for Refresher {
    fn on_start(&mut self, _: NodeId, _: NodeId, axes: ScrollAxes) -> bool {
        axes.contains(ScrollAxes::VERTICAL)
    }

    fn on_pre_scroll(&mut self, _: NodeId, _dx: i32, dy: i32) -> (i32, i32) {
        let mut budget = self.budget.lock().unwrap();
        if dy > 0 && *budget > 0 {
            let take = dy.min(*budget);
            *budget -= take;
            (0, take)
        } else {
            (0, 0)
        }
    }
}

/// An outer pager that absorbs whatever the list could not use.
struct Pager {
    absorbed: Arc<Mutex<(i32, i32)>>,
}

impl NestedScrollParent for Pager {
    fn on_start(&mut self, _: NodeId, _: NodeId, _: ScrollAxes) -> bool {
        true
    }

    fn on_scroll(&mut self, _: NodeId, _consumed: (i32, i32), unconsumed: (i32, i32)) -> (i32, i32) {
        let mut a = self.absorbed.lock().unwrap();
        a.0 += unconsumed.0;
        a.1 += unconsumed.1;
        unconsumed
    }

    fn on_pre_fling(&mut self, _: NodeId, vx: f32, _vy: f32) -> bool {
        vx.abs() > 1000.0
    }
}

#[test]
fn pull_to_refresh_over_a_pager() {
    let budget = Arc::new(Mutex::new(10));
    let absorbed = Arc::new(Mutex::new((0, 0)));

    let mut t = Tree::new();
    let pager = t.add_child(t.root()).unwrap();
    let refresher = t.add_child(pager).unwrap();
    let list = t.add_child(refresher).unwrap();
    t.caps_mut(pager).unwrap().set_scroll_parent(Pager {
        absorbed: absorbed.clone(),
    });
    t.caps_mut(refresher).unwrap().set_scroll_parent(Refresher {
        budget: budget.clone(),
    });

    assert!(t.start_nested_scroll(list, ScrollAxes::VERTICAL));

    // First pull: the refresher eats its whole budget before the list
    // sees anything.
    let pre = t.dispatch_nested_pre_scroll(list, 0, 8);
    assert_eq!(pre, (0, 8));
    assert_eq!(*budget.lock().unwrap(), 2);

    // Second pull: only 2 left in the budget; the list gets the rest.
    let pre = t.dispatch_nested_pre_scroll(list, 0, 8);
    assert_eq!(pre, (0, 2));
    let to_list = 8 - pre.1;

    // The list hits its end after consuming 4 of the 6; the pager
    // takes the leftover.
    let taken = t.dispatch_nested_scroll(list, (0, pre.1 + 4), (0, to_list - 4));
    assert_eq!(taken, (0, 2));
    assert_eq!(*absorbed.lock().unwrap(), (0, 2));

    t.stop_nested_scroll(list);
    assert!(!t.has_nested_scroll(list));
}

#[test]
fn slow_flings_stay_with_the_child() {
    let absorbed = Arc::new(Mutex::new((0, 0)));
    let mut t = Tree::new();
    let pager = t.add_child(t.root()).unwrap();
    let list = t.add_child(pager).unwrap();
    t.caps_mut(pager).unwrap().set_scroll_parent(Pager {
        absorbed: absorbed.clone(),
    });

    assert!(t.start_nested_scroll(list, ScrollAxes::VERTICAL));
    assert!(!t.dispatch_nested_pre_fling(list, 200.0, 0.0));
    assert!(t.dispatch_nested_pre_fling(list, 4000.0, 0.0));
}

#[test]
fn detaching_the_child_closes_the_gesture() {
    let absorbed = Arc::new(Mutex::new((0, 0)));
    let mut t = Tree::new();
    let pager = t.add_child(t.root()).unwrap();
    let list = t.add_child(pager).unwrap();
    t.caps_mut(pager).unwrap().set_scroll_parent(Pager {
        absorbed: absorbed.clone(),
    });

    assert!(t.start_nested_scroll(list, ScrollAxes::VERTICAL));
    t.detach(list).unwrap();
    assert!(!t.has_nested_scroll(list));
    assert_eq!(t.dispatch_nested_pre_scroll(list, 0, 5), (0, 0));
}
