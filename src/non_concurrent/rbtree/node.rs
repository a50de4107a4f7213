use std::collections::TryReserveError;

use super::Color;

/// Index of a slot in the node arena.
///
/// Slot 0 is always the sentinel, so `NIL` doubles as "no child" and "no parent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) struct NodeId(pub(super) usize);

pub(super) const NIL: NodeId = NodeId(0);

impl NodeId {
    pub(super) fn is_nil(self) -> bool {
        self == NIL
    }
}

/// One slot of the arena.
///
/// NOTE: free slots keep their (stale) key and links, only `allocated`,
///       `generation` and `next_free` are meaningful for them.
#[derive(Debug, Clone)]
pub(super) struct Node<K> {
    pub(super) key: K,
    pub(super) color: Color,
    pub(super) parent: NodeId,
    pub(super) left: NodeId,
    pub(super) right: NodeId,
    /// bumped every time the slot is freed, so old `NodeRef`s stop matching
    pub(super) generation: u32,
    pub(super) allocated: bool,
    pub(super) next_free: Option<NodeId>,
}

impl<K> Node<K> {
    /// The sentinel: black, linked to itself, key is never read.
    pub(super) fn sentinel(key: K) -> Self {
        Self {
            key,
            color: Color::Black,
            parent: NIL,
            left: NIL,
            right: NIL,
            generation: 0,
            allocated: true,
            next_free: None,
        }
    }

    pub(super) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    pub(super) fn is_black(&self) -> bool {
        self.color == Color::Black
    }
}

/// The backing storage for a tree's nodes, including the sentinel.
///
/// Freed slots are threaded into an intrusive free list (through `next_free`)
/// and handed out again before the arena grows, so freeing never allocates.
#[derive(Debug, Clone)]
pub(super) struct Arena<K> {
    slots: Vec<Node<K>>,
    free_head: Option<NodeId>,
    live: usize,
}

impl<K: Copy> Arena<K> {
    pub(super) fn new(sentinel_key: K) -> Self {
        Self {
            slots: vec![Node::sentinel(sentinel_key)],
            free_head: None,
            live: 0,
        }
    }

    pub(super) fn try_new(sentinel_key: K) -> Result<Self, TryReserveError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(1)?;
        slots.push(Node::sentinel(sentinel_key));

        Ok(Self { slots, free_head: None, live: 0 })
    }

    /// Number of allocated slots, not counting the sentinel.
    pub(super) fn live(&self) -> usize {
        self.live
    }

    /// Total number of slots, including the sentinel and free slots.
    pub(super) fn capacity_used(&self) -> usize {
        self.slots.len()
    }

    /// Hands out a red, unlinked node holding `key`.
    ///
    /// On failure the arena is left exactly as it was.
    pub(super) fn allocate(&mut self, key: K) -> Result<NodeId, TryReserveError> {
        if let Some(id) = self.free_head {
            let slot = &mut self.slots[id.0];
            debug_assert!(!slot.allocated, "slot {id:?} on the free list is still allocated");

            self.free_head = slot.next_free.take();
            slot.key = key;
            slot.color = Color::Red;
            slot.parent = NIL;
            slot.left = NIL;
            slot.right = NIL;
            slot.allocated = true;
            self.live += 1;
            return Ok(id)
        }

        self.slots.try_reserve(1)?;
        let id = NodeId(self.slots.len());
        self.slots.push(Node {
            key,
            color: Color::Red,
            parent: NIL,
            left: NIL,
            right: NIL,
            generation: 0,
            allocated: true,
            next_free: None,
        });
        self.live += 1;
        Ok(id)
    }

    /// Returns a slot to the free list and invalidates every handle to it.
    pub(super) fn free(&mut self, id: NodeId) {
        debug_assert!(!id.is_nil(), "the sentinel is never freed");

        let slot = &mut self.slots[id.0];
        debug_assert!(slot.allocated, "double free of slot {id:?}");

        slot.allocated = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.free_head;
        self.free_head = Some(id);
        self.live -= 1;
    }

    /// Whether `(id, generation)` names a live, non-sentinel node.
    pub(super) fn is_live(&self, id: NodeId, generation: u32) -> bool {
        match self.slots.get(id.0) {
            Some(slot) => !id.is_nil() && slot.allocated && slot.generation == generation,
            None => false,
        }
    }
}

impl<K> std::ops::Index<NodeId> for Arena<K> {
    type Output = Node<K>;

    fn index(&self, id: NodeId) -> &Node<K> {
        &self.slots[id.0]
    }
}

impl<K> std::ops::IndexMut<NodeId> for Arena<K> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.slots[id.0]
    }
}
