//! Value hashing, hash-set membership, and hash-mapped lookup.

use sha3::{Digest, Sha3_256};

use crate::program::Program;
use crate::radix::HashTree;
use crate::ssa::{Imm, Op, ValueId};

/// How a tree in the program's table is (re)built. Kept alongside the tree
/// so symbolization can rebuild it under a new symbol table.
#[derive(Debug, Clone)]
pub(crate) enum TreeSource {
    /// A membership set of literal scalars.
    Member(Vec<Imm>),
    /// A literal-to-literal mapping.
    Lookup(Vec<(Imm, Imm)>),
    /// Group-by dispatch; populated at runtime by the workers.
    Buckets,
}

/// The wide hash the kernels compute over encoded values: the first 16
/// bytes of SHA3-256, big-endian.
pub fn wide_hash(bytes: &[u8]) -> u128 {
    let digest = Sha3_256::digest(bytes);
    let mut head = [0u8; 16];
    head.copy_from_slice(&digest[..16]);
    u128::from_be_bytes(head)
}

/// Canonical encoding of a literal for hashing and tree payloads: a type
/// tag byte followed by the big-endian payload.
pub(crate) fn encode_scalar(imm: &Imm) -> Vec<u8> {
    match imm {
        Imm::Bool(b) => vec![0x10 | *b as u8],
        Imm::Int(i) => {
            let mut out = vec![0x20];
            out.extend_from_slice(&i.to_be_bytes());
            out
        }
        Imm::Float(f) => {
            let mut out = vec![0x40];
            out.extend_from_slice(&f.to_bits().to_be_bytes());
            out
        }
        Imm::Ts(t) => {
            let mut out = vec![0x60];
            out.extend_from_slice(&t.to_be_bytes());
            out
        }
        Imm::Str(s) => {
            let mut out = vec![0x80];
            out.extend_from_slice(s.as_bytes());
            out
        }
        Imm::Bytes(b) => {
            let mut out = vec![0xe0];
            out.extend_from_slice(b);
            out
        }
        _ => vec![0x0f],
    }
}

impl Program {
    /// The wide hash of a boxed value.
    pub fn hash_value(&mut self, v: ValueId) -> ValueId {
        let boxed = self.box_value(v);
        let mask = self.validity(boxed);
        self.ssa(Op::HashValue, &[boxed, mask], None)
    }

    /// Mix a further value into an existing hash, for compound keys.
    pub fn hash_value_plus(&mut self, h: ValueId, v: ValueId) -> ValueId {
        let boxed = self.box_value(v);
        let vh = self.validity(h);
        let vb = self.validity(boxed);
        let mask = self.and(vh, vb);
        self.ssa(Op::HashValuePlus, &[h, boxed, mask], None)
    }

    /// Lanes whose hash is a member of the literal set `items`.
    pub fn hash_member(&mut self, h: ValueId, items: &[Imm]) -> ValueId {
        let mut tree = HashTree::new();
        for item in items {
            tree.insert(wide_hash(&encode_scalar(item)), None);
        }
        let handle = self.add_tree(tree, TreeSource::Member(items.to_vec()));
        let mask = self.validity(h);
        self.ssa(Op::HashMember, &[h, mask], Some(Imm::Tree(handle)))
    }

    /// Tree-mapped replacement values for the hash lanes; the mask narrows
    /// to mapped lanes.
    pub fn hash_lookup(&mut self, h: ValueId, pairs: &[(Imm, Imm)]) -> ValueId {
        let mut tree = HashTree::new();
        for (key, value) in pairs {
            let payload = encode_scalar(value);
            tree.insert(wide_hash(&encode_scalar(key)), Some(&payload));
        }
        let handle = self.add_tree(tree, TreeSource::Lookup(pairs.to_vec()));
        let mask = self.validity(h);
        self.ssa(Op::HashLookup, &[h, mask], Some(Imm::Tree(handle)))
    }

    pub(crate) fn add_tree(&mut self, tree: HashTree, source: TreeSource) -> u32 {
        let handle = self.trees.len() as u32;
        self.trees.push(tree);
        self.tree_sources.push(source);
        handle
    }

    /// Rebuild every tree from its source, as symbolization requires.
    pub(crate) fn rebuild_trees(&mut self) {
        for (tree, source) in self.trees.iter_mut().zip(&self.tree_sources) {
            match source {
                TreeSource::Member(items) => {
                    let mut t = HashTree::new();
                    for item in items {
                        t.insert(wide_hash(&encode_scalar(item)), None);
                    }
                    *tree = t;
                }
                TreeSource::Lookup(pairs) => {
                    let mut t = HashTree::new();
                    for (key, value) in pairs {
                        let payload = encode_scalar(value);
                        t.insert(wide_hash(&encode_scalar(key)), Some(&payload));
                    }
                    *tree = t;
                }
                TreeSource::Buckets => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_trees_hold_the_literal_hashes() {
        let mut p = Program::begin();
        let f = p.path("x");
        let h = p.hash_value(f);
        let items = [
            Imm::Str("foo".into()),
            Imm::Str("bar".into()),
            Imm::Str("baz".into()),
        ];
        let m = p.hash_member(h, &items);
        assert_eq!(p.value(m).op, Op::HashMember);
        let Some(&Imm::Tree(t)) = p.value(m).imm.as_ref() else {
            panic!("tree immediate expected")
        };
        let tree = &p.trees[t as usize];
        assert_eq!(tree.len(), 3);
        assert!(tree.contains(wide_hash(&encode_scalar(&items[0]))));
        assert!(!tree.contains(wide_hash(&encode_scalar(&Imm::Str("qux".into())))));
    }

    #[test]
    fn lookup_payloads_decode_from_the_tree() {
        let mut p = Program::begin();
        let f = p.path("x");
        let h = p.hash_value(f);
        let pairs = [(Imm::Int(1), Imm::Str("one".into()))];
        let l = p.hash_lookup(h, &pairs);
        let Some(&Imm::Tree(t)) = p.value(l).imm.as_ref() else {
            panic!("tree immediate expected")
        };
        let tree = &p.trees[t as usize];
        let (off, len) = tree
            .get(wide_hash(&encode_scalar(&Imm::Int(1))))
            .unwrap()
            .unwrap();
        let payload = &tree.payload_bytes()[off as usize..(off + len) as usize];
        assert_eq!(payload, encode_scalar(&Imm::Str("one".into())).as_slice());
    }
}
