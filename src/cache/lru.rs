//! LRU Store Module
//!
//! Fixed-capacity least-recently-used store with per-entry deadlines.
//!
//! Entries live in an arena of slots linked by `prev`/`next` indices,
//! with a key-to-slot map on top, so promotion and removal are O(1).
//! Expiry is lazy: an expired entry is only dropped when it is read,
//! evicted by capacity pressure, or removed explicitly. An entry that is
//! never read again after expiring keeps its slot until then.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::cache::entry::deadline_after;
use crate::cache::{ByteView, CacheEntry};

/// Callback invoked with the key and value of every removed entry.
pub type OnEvict = Box<dyn FnMut(&str, &ByteView) + Send>;

#[derive(Debug)]
struct Node {
    entry: CacheEntry,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// LRU eviction store keyed by string.
///
/// - `head` = most recently used
/// - `tail` = least recently used
///
/// `on_evict` fires once for every entry that leaves the store through
/// capacity overflow, [`LruCache::remove`], or a read that finds the entry
/// expired (expired reads go through the same removal path).
pub struct LruCache {
    capacity: usize,
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    default_ttl: Duration,
    on_evict: Option<OnEvict>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` entries.
    ///
    /// No storage is allocated until the first insert.
    pub fn new(capacity: usize) -> Self {
        Self::with_default_ttl(capacity, Duration::ZERO)
    }

    /// Creates an empty store whose entries expire after `default_ttl`
    /// unless an explicit TTL is given. A zero duration means no default.
    pub fn with_default_ttl(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            capacity,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            default_ttl,
            on_evict: None,
        }
    }

    /// Installs the removal callback.
    pub fn with_on_evict<F>(mut self, on_evict: F) -> Self
    where
        F: FnMut(&str, &ByteView) + Send + 'static,
    {
        self.on_evict = Some(Box::new(on_evict));
        self
    }

    // == Get ==
    /// Looks up `key`, promoting it to most recently used.
    ///
    /// An entry whose deadline has passed is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        let node = self.node(idx)?;

        if node.entry.is_expired() {
            self.remove_slot(idx);
            return None;
        }

        let value = node.entry.value.clone();
        self.move_to_front(idx);
        Some(value)
    }

    // == Add ==
    /// Inserts or replaces `key` using the store's default TTL.
    ///
    /// Returns true if the insert pushed out the least recently used entry.
    pub fn add(&mut self, key: impl Into<String>, value: ByteView) -> bool {
        self.add_with_expire(key, value, Duration::ZERO)
    }

    // == Add With Expire ==
    /// Inserts or replaces `key`, expiring it after `ttl`.
    ///
    /// A zero `ttl` falls back to the default TTL; if that is zero too the
    /// entry only leaves through eviction or removal. Replacing an existing
    /// key updates value and deadline in place, promotes it, and never
    /// counts as an eviction.
    pub fn add_with_expire(
        &mut self,
        key: impl Into<String>,
        value: ByteView,
        ttl: Duration,
    ) -> bool {
        let key = key.into();
        let ttl = self.effective_ttl(ttl);

        if let Some(&idx) = self.index.get(&key) {
            if let Some(node) = self.node_mut(idx) {
                node.entry.value = value;
                node.entry.deadline = deadline_after(ttl);
            }
            self.move_to_front(idx);
            return false;
        }

        let idx = self.alloc(Node {
            entry: CacheEntry::new(key.clone(), value, ttl),
            prev: None,
            next: None,
        });
        self.attach_front(idx);
        self.index.insert(key, idx);

        let evict = self.index.len() > self.capacity;
        if evict {
            self.remove_oldest();
        }
        evict
    }

    // == Remove ==
    /// Removes `key` if present. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => self.remove_slot(idx).is_some(),
            None => false,
        }
    }

    // == Default TTL ==
    /// Changes the TTL applied by future inserts without an explicit TTL.
    /// Existing entries keep their deadlines.
    pub fn set_default_ttl(&mut self, ttl: Duration) {
        self.default_ttl = ttl;
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        (!self.default_ttl.is_zero()).then_some(self.default_ttl)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks membership without touching recency or expiry.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(node) = self.node(idx) else { break };
            keys.push(node.entry.key.clone());
            cursor = node.next;
        }
        keys
    }

    fn effective_ttl(&self, ttl: Duration) -> Option<Duration> {
        if !ttl.is_zero() {
            Some(ttl)
        } else {
            self.default_ttl()
        }
    }

    // == Arena Plumbing ==
    fn node(&self, idx: usize) -> Option<&Node> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn detach(&mut self, idx: usize) {
        let Some((prev, next)) = self.node(idx).map(|n| (n.prev, n.next)) else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.node_mut(p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = self.node_mut(n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(head_node) = self.node_mut(h) {
                    head_node.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn remove_oldest(&mut self) {
        if let Some(idx) = self.tail {
            self.remove_slot(idx);
        }
    }

    fn remove_slot(&mut self, idx: usize) -> Option<CacheEntry> {
        self.detach(idx);
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.index.remove(&node.entry.key);

        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(&node.entry.key, &node.entry.value);
        }
        Some(node.entry)
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("default_ttl", &self.default_ttl)
            .field("has_on_evict", &self.on_evict.is_some())
            .finish()
    }
}
