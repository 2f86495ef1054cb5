use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use arbor::{
    DrawSurface, FrameScheduler, Transform, Tree,
    geom::{Rect, Size},
};

struct CountingScheduler(Arc<AtomicUsize>);

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct NullSurface;

impl DrawSurface for NullSurface {
    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn translate(&mut self, _: i32, _: i32) {}
    fn clip(&mut self, _: Rect) {}
    fn apply_transform(&mut self, _: &Transform) {}
    fn fill_rect(&mut self, _: Rect, _: u32) {}
    fn text(&mut self, _: Rect, _: &str) {}
}

fn settled_tree(frames: &Arc<AtomicUsize>) -> Tree {
    let mut t = Tree::new();
    t.set_scheduler(CountingScheduler(frames.clone()));
    t.set_root_size(Size::new(100, 100));
    t.on_frame();
    t.draw(&mut NullSurface);
    frames.store(0, Ordering::SeqCst);
    t
}

#[test]
fn a_burst_of_work_costs_one_frame_request() {
    let frames = Arc::new(AtomicUsize::new(0));
    let mut t = settled_tree(&frames);
    let a = t.add_child(t.root()).unwrap();
    let b = t.add_child(t.root()).unwrap();

    t.invalidate(a);
    t.set_preferred(b, Size::new(10, 10));
    t.invalidate(b);
    t.invalidate(a);
    assert_eq!(frames.load(Ordering::SeqCst), 1);

    t.on_frame();
    t.draw(&mut NullSurface);
    assert!(!t.is_dirty(a));
    assert!(!t.is_layout_requested(t.root()));

    // The next mutation opens a new frame.
    t.invalidate(a);
    assert_eq!(frames.load(Ordering::SeqCst), 2);
}

#[test]
fn posted_mutations_apply_before_layout() {
    let frames = Arc::new(AtomicUsize::new(0));
    let mut t = settled_tree(&frames);
    let a = t.add_child(t.root()).unwrap();
    t.on_frame();

    let poster = t.poster();
    let handle = std::thread::spawn(move || {
        poster.post(move |tree| tree.set_preferred(a, Size::new(33, 44)));
    });
    handle.join().unwrap();

    // The same frame that drains the post also runs the layout pass it
    // triggered.
    t.on_frame();
    assert_eq!(t.node(a).unwrap().measured().unwrap().size(), Size::new(33, 44));
    assert!(!t.is_layout_requested(a));
}

#[test]
fn quiescent_frames_request_nothing() {
    let frames = Arc::new(AtomicUsize::new(0));
    let mut t = settled_tree(&frames);
    t.on_frame();
    t.on_frame();
    assert_eq!(frames.load(Ordering::SeqCst), 0);
}
