//! HyperLogLog accuracy and merge laws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sift_compiler::{wide_hash, HllState};

#[test]
fn ten_thousand_distinct_strings_estimate_within_two_percent() {
    let mut s = HllState::new(12).unwrap();
    for i in 0..10_000 {
        s.update(wide_hash(format!("customer-{i}").as_bytes()));
    }
    let e = s.estimate();
    assert!((9_800.0..=10_200.0).contains(&e), "estimate {e}");
}

#[test]
fn duplicate_inputs_do_not_inflate_the_estimate() {
    let mut s = HllState::new(12).unwrap();
    for i in 0..1_000 {
        let h = wide_hash(format!("key-{}", i % 100).as_bytes());
        s.update(h);
    }
    let e = s.estimate();
    assert!((80.0..=120.0).contains(&e), "estimate {e}");
}

#[test]
fn random_streams_stay_within_bounds_at_precision_12() {
    let mut rng = StdRng::seed_from_u64(0x5117);
    let mut s = HllState::new(12).unwrap();
    for _ in 0..50_000 {
        s.update(rng.gen::<u128>());
    }
    let e = s.estimate();
    // 2% relative error bound at p=12
    assert!((49_000.0..=51_000.0).contains(&e), "estimate {e}");
}

#[test]
fn merge_is_commutative_and_associative() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut parts = Vec::new();
    for _ in 0..3 {
        let mut s = HllState::new(8).unwrap();
        for _ in 0..2_000 {
            s.update(rng.gen::<u128>());
        }
        parts.push(s);
    }
    let (a, b, c) = (&parts[0], &parts[1], &parts[2]);

    // merge(merge(a, b), c)
    let mut left = a.clone();
    left.merge(b).unwrap();
    left.merge(c).unwrap();
    // merge(a, merge(c, b))
    let mut cb = c.clone();
    cb.merge(b).unwrap();
    let mut right = a.clone();
    right.merge(&cb).unwrap();

    assert_eq!(left.as_bytes(), right.as_bytes());

    // merging a sketch with itself is a no-op
    let mut twice = a.clone();
    twice.merge(a).unwrap();
    assert_eq!(twice.as_bytes(), a.as_bytes());
}

#[quickcheck_macros::quickcheck]
fn merge_commutes_on_arbitrary_streams(xs: Vec<u64>, ys: Vec<u64>) -> bool {
    let sketch = |vals: &[u64]| {
        let mut s = HllState::new(4).unwrap();
        for v in vals {
            s.update(wide_hash(&v.to_le_bytes()));
        }
        s
    };
    let (a, b) = (sketch(&xs), sketch(&ys));
    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();
    ab.as_bytes() == ba.as_bytes()
}

#[test]
fn merged_halves_estimate_the_union() {
    let mut rng = StdRng::seed_from_u64(99);
    let all: Vec<u128> = (0..8_000).map(|_| rng.gen()).collect();
    let mut whole = HllState::new(12).unwrap();
    let mut lo = HllState::new(12).unwrap();
    let mut hi = HllState::new(12).unwrap();
    for (i, h) in all.iter().enumerate() {
        whole.update(*h);
        if i % 2 == 0 {
            lo.update(*h);
        } else {
            hi.update(*h);
        }
    }
    lo.merge(&hi).unwrap();
    assert_eq!(lo.as_bytes(), whole.as_bytes());
}
