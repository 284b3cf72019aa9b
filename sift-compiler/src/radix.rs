//! Nibble-radix trees over wide value hashes.
//!
//! `hashmember`, `hashlookup`, and `aggbucket` immediates name one of these
//! trees by index. The tree maps a 128-bit hash to an optional payload
//! reference into a per-tree byte table: membership sets store no payload,
//! lookup tables store the encoded replacement value, bucket dispatch stores
//! the group ordinal.

/// Index of a tree in a program's tree table.
pub type TreeId = u32;

const EMPTY: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Leaf {
    hash: u128,
    payload: Option<(u32, u32)>,
}

/// An immutable-after-build radix tree keyed on 128-bit hashes.
///
/// Internal nodes fan out on successive high-to-low nibbles of the key.
/// Slot values: `0` empty, `> 0` child node `v - 1`, `< 0` leaf `!v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashTree {
    nodes: Vec<[i32; 16]>,
    leaves: Vec<Leaf>,
    payload: Vec<u8>,
}

impl HashTree {
    /// An empty tree.
    pub fn new() -> Self {
        HashTree {
            nodes: vec![[EMPTY; 16]],
            leaves: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Number of keys in the tree.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The shared payload byte table.
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload
    }

    fn nibble(hash: u128, depth: usize) -> usize {
        ((hash >> (124 - 4 * depth)) & 0xf) as usize
    }

    /// Insert `hash`, optionally attaching `payload` bytes.
    ///
    /// Returns the payload reference stored for the key. Re-inserting an
    /// existing key keeps the first payload.
    pub fn insert(&mut self, hash: u128, payload: Option<&[u8]>) -> Option<(u32, u32)> {
        let mut node = 0usize;
        let mut depth = 0usize;
        loop {
            let slot = Self::nibble(hash, depth);
            match self.nodes[node][slot] {
                EMPTY => {
                    let stored = payload.map(|p| {
                        let off = self.payload.len() as u32;
                        self.payload.extend_from_slice(p);
                        (off, p.len() as u32)
                    });
                    let leaf = self.leaves.len();
                    self.leaves.push(Leaf {
                        hash,
                        payload: stored,
                    });
                    self.nodes[node][slot] = !(leaf as i32);
                    return stored;
                }
                v if v > 0 => {
                    node = (v - 1) as usize;
                    depth += 1;
                }
                v => {
                    let leaf = (!v) as usize;
                    if self.leaves[leaf].hash == hash {
                        return self.leaves[leaf].payload;
                    }
                    // push the existing leaf one level down and retry
                    let child = self.nodes.len();
                    self.nodes.push([EMPTY; 16]);
                    let moved = Self::nibble(self.leaves[leaf].hash, depth + 1);
                    self.nodes[child][moved] = v;
                    self.nodes[node][slot] = (child + 1) as i32;
                    node = child;
                    depth += 1;
                }
            }
        }
    }

    /// Whether `hash` is a member.
    pub fn contains(&self, hash: u128) -> bool {
        self.find(hash).is_some()
    }

    /// The payload reference stored under `hash`, if the key is present.
    pub fn get(&self, hash: u128) -> Option<Option<(u32, u32)>> {
        self.find(hash).map(|leaf| self.leaves[leaf].payload)
    }

    fn find(&self, hash: u128) -> Option<usize> {
        let mut node = 0usize;
        let mut depth = 0usize;
        loop {
            let slot = Self::nibble(hash, depth);
            match self.nodes[node][slot] {
                EMPTY => return None,
                v if v > 0 => {
                    node = (v - 1) as usize;
                    depth += 1;
                }
                v => {
                    let leaf = (!v) as usize;
                    return (self.leaves[leaf].hash == hash).then_some(leaf);
                }
            }
        }
    }

    /// Iterate `(hash, payload)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u128, Option<(u32, u32)>)> + '_ {
        self.leaves.iter().map(|l| (l.hash, l.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_after_colliding_prefixes() {
        let mut t = HashTree::new();
        // identical top nibbles force splits several levels deep
        let a = 0xabc0_0000_0000_0000_0000_0000_0000_0001u128;
        let b = 0xabc0_0000_0000_0000_0000_0000_0000_0002u128;
        let c = 0x0123_4567_89ab_cdef_0123_4567_89ab_cdefu128;
        t.insert(a, None);
        t.insert(b, None);
        t.insert(c, None);
        assert!(t.contains(a) && t.contains(b) && t.contains(c));
        assert!(!t.contains(0xabc0_0000_0000_0000_0000_0000_0000_0003));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn payloads_are_stable_across_reinserts() {
        let mut t = HashTree::new();
        let first = t.insert(7, Some(b"foo"));
        let again = t.insert(7, Some(b"bar"));
        assert_eq!(first, again);
        assert_eq!(t.get(7), Some(first));
        let (off, len) = first.unwrap();
        assert_eq!(&t.payload_bytes()[off as usize..(off + len) as usize], b"foo");
    }
}
