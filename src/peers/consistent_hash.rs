//! Consistent Hash Ring
//!
//! Maps keys to owning peers. Every peer contributes `replicas` virtual
//! points, `hash(i.to_string() + peer)` for `i in 0..replicas`; a key is
//! owned by the peer of the first point at or after `hash(key)`, wrapping
//! around to the smallest point.

use std::collections::HashMap;

/// Hash function used for both virtual points and keys.
pub type HashFn = fn(&[u8]) -> u32;

// == Hash Ring ==
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted ascending; may hold duplicates when two points collide
    points: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring with `replicas` virtual points per peer.
    ///
    /// Uses CRC-32 (IEEE) when no hash function is given. A replica count
    /// of zero is treated as one.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas: replicas.max(1),
            points: Vec::new(),
            owners: HashMap::new(),
        }
    }

    fn point(&self, replica: usize, peer: &str) -> u32 {
        (self.hash)(format!("{}{}", replica, peer).as_bytes())
    }

    // == Add ==
    /// Adds every virtual point of each peer, then re-sorts the ring.
    ///
    /// Colliding points are not deduplicated: the last peer written owns
    /// the point and the ring keeps both copies.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let point = self.point(i, peer);
                self.points.push(point);
                self.owners.insert(point, peer.to_string());
            }
        }
        self.points.sort_unstable();
    }

    // == Delete ==
    /// Removes the virtual points of each peer.
    ///
    /// For a given peer, the first replica whose point is no longer mapped
    /// stops the walk over that peer's remaining replicas.
    pub fn delete<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let point = self.point(i, peer);
                if self.owners.remove(&point).is_none() {
                    break;
                }
                if let Ok(pos) = self.points.binary_search(&point) {
                    self.points.remove(pos);
                }
            }
        }
    }

    // == Get ==
    /// Returns the peer owning `key`, or None when the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.points.partition_point(|&point| point < hash);
        let point = self.points[idx % self.points.len()];

        self.owners.get(&point).map(String::as_str)
    }

    /// Number of virtual points on the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
