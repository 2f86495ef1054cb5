//! Damage tracking, frame scheduling, and the cross-thread post queue.
//!
//! Any number of invalidations between frames coalesce into at most one
//! [`FrameScheduler::request_frame`] call. Other threads never touch
//! the tree directly; they hand closures to a [`Poster`], and the
//! owning thread runs them at the top of its next frame.

use std::{
    cmp::Ordering,
    time::{Duration, Instant},
};

use arbor_geom::Rect;

use crate::core::{id::NodeId, tree::Tree};

/// Host callback used to schedule a frame on the owning thread.
pub trait FrameScheduler: Send {
    /// Called at most once per pending frame. The host must arrange for
    /// [`Tree::on_frame`] to run on the owning thread.
    fn request_frame(&mut self);
}

type PostTask = Box<dyn FnOnce(&mut Tree) + Send>;

/// A unit of work handed to the owning thread.
pub(crate) enum Posted {
    /// Run a closure against the tree.
    Task(PostTask),
    /// Run a closure no earlier than the given time.
    Delayed(Instant, PostTask),
    /// Mark a node damaged.
    Invalidate(NodeId),
}

/// A delayed task waiting in the timer heap.
pub(crate) struct DelayedPost {
    pub(crate) at: Instant,
    pub(crate) task: PostTask,
}

// BinaryHeap is a max-heap; reverse the ordering so the earliest
// deadline surfaces first.
impl Ord for DelayedPost {
    fn cmp(&self, other: &Self) -> Ordering {
        other.at.cmp(&self.at)
    }
}

impl PartialOrd for DelayedPost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DelayedPost {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl Eq for DelayedPost {}

/// Cloneable cross-thread handle to a [`Tree`].
///
/// Posted work is queued in FIFO order and executed on the owning
/// thread; nothing runs on the posting thread.
#[derive(Clone)]
pub struct Poster {
    tx: std::sync::mpsc::Sender<Posted>,
}

impl Poster {
    /// Queue a closure to run against the tree on the owning thread.
    pub fn post(&self, f: impl FnOnce(&mut Tree) + Send + 'static) {
        let _ = self.tx.send(Posted::Task(Box::new(f)));
    }

    /// Queue a closure to run no earlier than `delay` from now.
    pub fn post_delayed(&self, delay: Duration, f: impl FnOnce(&mut Tree) + Send + 'static) {
        let at = Instant::now() + delay;
        let _ = self.tx.send(Posted::Delayed(at, Box::new(f)));
    }

    /// Mark a node damaged from another thread.
    pub fn post_invalidate(&self, id: NodeId) {
        let _ = self.tx.send(Posted::Invalidate(id));
    }
}

impl Tree {
    /// Install the host frame scheduler.
    pub fn set_scheduler(&mut self, scheduler: impl FrameScheduler + 'static) {
        self.scheduler = Some(Box::new(scheduler));
    }

    /// A cloneable handle other threads use to reach this tree.
    pub fn poster(&self) -> Poster {
        Poster {
            tx: self.post_tx.clone(),
        }
    }

    /// Mark a node's content damaged and schedule a frame.
    ///
    /// Idempotent between frames: repeated calls after the first are
    /// cheap flag checks and schedule nothing further.
    pub fn invalidate(&mut self, id: NodeId) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        if !n.damaged {
            n.damaged = true;
        }
        if n.attached {
            self.request_frame();
        }
    }

    /// Mark part of a node damaged. Damage is tracked per node, so the
    /// rect currently coalesces to the whole node.
    pub fn invalidate_rect(&mut self, id: NodeId, _rect: Rect) {
        self.invalidate(id);
    }

    /// Has this node damage pending redraw?
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.damaged)
    }

    /// Schedule a frame with the host, at most once per pending frame.
    pub(crate) fn request_frame(&mut self) {
        if self.frame_requested {
            return;
        }
        self.frame_requested = true;
        tracing::trace!("requesting frame");
        if let Some(s) = self.scheduler.as_mut() {
            s.request_frame();
        }
    }

    /// The deadline of the earliest pending delayed post, for hosts
    /// that drive their own timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.delayed.peek().map(|d| d.at)
    }

    /// Run posted work: everything queued by [`Poster`] handles, in
    /// FIFO order, plus delayed posts whose deadline has passed.
    pub fn drain_posted(&mut self) {
        while let Ok(posted) = self.post_rx.try_recv() {
            match posted {
                Posted::Task(task) => task(self),
                Posted::Delayed(at, task) => self.delayed.push(DelayedPost { at, task }),
                Posted::Invalidate(id) => self.invalidate(id),
            }
        }
        let now = Instant::now();
        while self.delayed.peek().is_some_and(|d| d.at <= now) {
            if let Some(d) = self.delayed.pop() {
                (d.task)(self);
            }
        }
    }

    /// One frame on the owning thread: run posted work, then any
    /// scheduled layout pass. The host draws afterwards via
    /// [`Tree::draw`].
    pub fn on_frame(&mut self) {
        self.frame_requested = false;
        self.drain_posted();
        if self.layout_scheduled {
            self.perform_layout();
        }
    }
}
