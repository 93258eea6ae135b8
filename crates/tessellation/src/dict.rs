//! The sweep line dictionary: a sorted doubly-linked list of active regions.

use crate::mesh::RegionId;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(pub u32);

pub(crate) const DICT_HEAD: NodeId = NodeId(0);

#[derive(Clone, Debug)]
struct Node {
    key: Option<RegionId>,
    next: NodeId,
    prev: NodeId,
}

/// The ordering is supplied by the caller at insertion and search time, since
/// comparing two regions depends on the current sweep event.
pub(crate) struct Dict {
    nodes: Vec<Node>,
}

impl Dict {
    pub fn new() -> Self {
        Dict {
            nodes: vec![Node {
                key: None,
                next: DICT_HEAD,
                prev: DICT_HEAD,
            }],
        }
    }

    #[inline]
    pub fn key(&self, node: NodeId) -> Option<RegionId> {
        self.nodes[node.0 as usize].key
    }

    #[inline]
    pub fn succ(&self, node: NodeId) -> NodeId {
        self.nodes[node.0 as usize].next
    }

    #[inline]
    pub fn pred(&self, node: NodeId) -> NodeId {
        self.nodes[node.0 as usize].prev
    }

    pub fn min(&self) -> NodeId {
        self.succ(DICT_HEAD)
    }

    /// Inserts `key` right below `node`, walking down while `leq(node_key, key)`
    /// does not hold.
    pub fn insert_before(
        &mut self,
        mut node: NodeId,
        key: RegionId,
        mut leq: impl FnMut(RegionId, RegionId) -> bool,
    ) -> NodeId {
        loop {
            node = self.pred(node);
            match self.key(node) {
                Some(k) if !leq(k, key) => {}
                _ => break,
            }
        }

        let new_node = NodeId(self.nodes.len() as u32);
        let next = self.succ(node);
        self.nodes.push(Node {
            key: Some(key),
            next,
            prev: node,
        });
        self.nodes[next.0 as usize].prev = new_node;
        self.nodes[node.0 as usize].next = new_node;

        new_node
    }

    pub fn insert(&mut self, key: RegionId, leq: impl FnMut(RegionId, RegionId) -> bool) -> NodeId {
        self.insert_before(DICT_HEAD, key, leq)
    }

    /// Returns the first node whose key is not below the searched key,
    /// or the head node if there is none.
    pub fn search(&self, mut is_below: impl FnMut(RegionId) -> bool) -> NodeId {
        let mut node = DICT_HEAD;
        loop {
            node = self.succ(node);
            match self.key(node) {
                Some(k) if is_below(k) => {}
                _ => return node,
            }
        }
    }

    pub fn delete(&mut self, node: NodeId) {
        let next = self.succ(node);
        let prev = self.pred(node);
        self.nodes[next.0 as usize].prev = prev;
        self.nodes[prev.0 as usize].next = next;
        self.nodes[node.0 as usize].key = None;
    }
}

#[test]
fn sorted_insertion() {
    let mut dict = Dict::new();
    let values = [5u32, 1, 4, 2, 3];
    for &v in &values {
        dict.insert(RegionId(v), |a, b| a.0 <= b.0);
    }

    let mut node = dict.min();
    let mut sorted = Vec::new();
    while let Some(key) = dict.key(node) {
        sorted.push(key.0);
        node = dict.succ(node);
    }
    assert_eq!(sorted, vec![1, 2, 3, 4, 5]);

    let found = dict.search(|k| k.0 < 3);
    assert_eq!(dict.key(found), Some(RegionId(3)));
    dict.delete(found);
    let found = dict.search(|k| k.0 < 3);
    assert_eq!(dict.key(found), Some(RegionId(4)));
    assert_eq!(dict.key(dict.search(|_| true)), None);
}
