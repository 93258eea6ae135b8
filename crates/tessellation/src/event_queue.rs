//! Priority queue of sweep events.
//!
//! An indexed binary min-heap of vertices, ordered by their `(s, t)` projection.
//! Vertices can be removed from the middle of the queue when they get merged
//! with another vertex during the sweep.

use crate::math_utils::{vert_leq, St};
use crate::mesh::VertexId;

const NOT_QUEUED: u32 = u32::MAX;

#[derive(Copy, Clone, Debug)]
struct Entry {
    key: St,
    vertex: VertexId,
}

#[derive(Default)]
pub(crate) struct EventQueue {
    heap: Vec<Entry>,
    // Position of each vertex in the heap, indexed by vertex id.
    positions: Vec<u32>,
}

impl EventQueue {
    pub fn with_capacity(cap: usize) -> Self {
        EventQueue {
            heap: Vec::with_capacity(cap),
            positions: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.positions
            .get(vertex.index())
            .map_or(false, |&pos| pos != NOT_QUEUED)
    }

    pub fn insert(&mut self, vertex: VertexId, key: St) {
        debug_assert!(!self.contains(vertex));
        if self.positions.len() <= vertex.index() {
            self.positions.resize(vertex.index() + 1, NOT_QUEUED);
        }

        let pos = self.heap.len();
        self.heap.push(Entry { key, vertex });
        self.positions[vertex.index()] = pos as u32;
        self.sift_up(pos);
    }

    /// The vertex that comes first in sweep order, without removing it.
    pub fn minimum(&self) -> Option<VertexId> {
        self.heap.first().map(|entry| entry.vertex)
    }

    pub fn extract_min(&mut self) -> Option<VertexId> {
        let min = self.minimum()?;
        self.remove_at(0);
        Some(min)
    }

    /// Removes a vertex from the queue. Does nothing if it is not queued.
    pub fn delete(&mut self, vertex: VertexId) {
        if let Some(&pos) = self.positions.get(vertex.index()) {
            if pos != NOT_QUEUED {
                self.remove_at(pos as usize);
            }
        }
    }

    fn remove_at(&mut self, pos: usize) {
        let last = self.heap.len() - 1;
        self.swap(pos, last);
        if let Some(removed) = self.heap.pop() {
            self.positions[removed.vertex.index()] = NOT_QUEUED;
        }

        if pos < self.heap.len() {
            self.sift_down(pos);
            self.sift_up(pos);
        }
    }

    fn less(&self, a: usize, b: usize) -> bool {
        vert_leq(self.heap[a].key, self.heap[b].key)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a].vertex.index()] = a as u32;
        self.positions[self.heap[b].vertex.index()] = b as u32;
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.less(parent, pos) {
                break;
            }
            self.swap(parent, pos);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && !self.less(left, right) {
                right
            } else {
                left
            };
            if self.less(pos, child) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }
}

#[test]
fn sweep_order() {
    let mut queue = EventQueue::with_capacity(8);
    let keys = [(3.0, 1.0), (1.0, 5.0), (1.0, -2.0), (7.0, 0.0), (0.0, 9.0), (3.0, 0.0)];
    for (i, &key) in keys.iter().enumerate() {
        queue.insert(VertexId(i as u32 + 1), key);
    }
    assert_eq!(queue.len(), 6);

    queue.delete(VertexId(4));
    assert!(!queue.contains(VertexId(4)));

    let mut order = Vec::new();
    while let Some(v) = queue.extract_min() {
        order.push(v.0);
    }
    assert_eq!(order, vec![5, 3, 2, 6, 1]);
    assert!(queue.is_empty());
}
