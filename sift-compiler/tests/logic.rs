//! Three-valued logic truth tables, checked through the reference
//! evaluator: the result mask plus the not-missing predicate must
//! reproduce SQL's TRUE/FALSE/MISSING semantics for every connective.

mod common;

use common::Tv;
use serde_json::json;
use sift_compiler::Program;

/// Records providing a TRUE, FALSE, and MISSING operand for fields `a`
/// and `b`.
fn record(a: Tv, b: Tv) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    if a != Tv::Missing {
        obj.insert("a".into(), json!(a == Tv::True));
    }
    if b != Tv::Missing {
        obj.insert("b".into(), json!(b == Tv::True));
    }
    serde_json::Value::Object(obj)
}

const ALL: [Tv; 3] = [Tv::True, Tv::False, Tv::Missing];

fn check(
    op: impl Fn(&mut Program, u32, u32) -> u32,
    table: impl Fn(Tv, Tv) -> Tv,
    name: &str,
) {
    for a in ALL {
        for b in ALL {
            let mut p = Program::begin();
            let fa = p.path("a");
            let fb = p.path("b");
            let pa = p.is_true(fa);
            let pb = p.is_true(fb);
            let combined = op(&mut p, pa, pb);
            p.ret_mask(combined);
            let got = common::tv(&mut p, combined, &record(a, b));
            assert_eq!(got, table(a, b), "{name}({a:?}, {b:?})");
        }
    }
}

#[test]
fn and_matches_sql() {
    check(
        |p, a, b| p.and(a, b),
        |a, b| match (a, b) {
            (Tv::False, _) | (_, Tv::False) => Tv::False,
            (Tv::Missing, _) | (_, Tv::Missing) => Tv::Missing,
            _ => Tv::True,
        },
        "and",
    );
}

#[test]
fn or_matches_sql() {
    check(
        |p, a, b| p.or(a, b),
        |a, b| match (a, b) {
            (Tv::True, _) | (_, Tv::True) => Tv::True,
            (Tv::Missing, _) | (_, Tv::Missing) => Tv::Missing,
            _ => Tv::False,
        },
        "or",
    );
}

#[test]
fn xor_needs_both_sides() {
    check(
        |p, a, b| p.logical_xor(a, b),
        |a, b| match (a, b) {
            (Tv::Missing, _) | (_, Tv::Missing) => Tv::Missing,
            _ => {
                if (a == Tv::True) ^ (b == Tv::True) {
                    Tv::True
                } else {
                    Tv::False
                }
            }
        },
        "xor",
    );
}

#[test]
fn xnor_needs_both_sides() {
    check(
        |p, a, b| p.logical_xnor(a, b),
        |a, b| match (a, b) {
            (Tv::Missing, _) | (_, Tv::Missing) => Tv::Missing,
            _ => {
                if (a == Tv::True) == (b == Tv::True) {
                    Tv::True
                } else {
                    Tv::False
                }
            }
        },
        "xnor",
    );
}

/// `MISSING = MISSING` is MISSING, not TRUE: predicate equality follows
/// the equivalence table.
#[test]
fn predicate_equality_is_three_valued() {
    check(
        |p, a, b| p.equals(a, b),
        |a, b| match (a, b) {
            (Tv::Missing, _) | (_, Tv::Missing) => Tv::Missing,
            _ => {
                if a == b {
                    Tv::True
                } else {
                    Tv::False
                }
            }
        },
        "eq",
    );
}

#[test]
fn not_preserves_missing() {
    for a in ALL {
        let mut p = Program::begin();
        let fa = p.path("a");
        let pa = p.is_true(fa);
        let neg = p.logical_not(pa);
        p.ret_mask(neg);
        let got = common::tv(&mut p, neg, &record(a, Tv::Missing));
        let want = match a {
            Tv::True => Tv::False,
            Tv::False => Tv::True,
            Tv::Missing => Tv::Missing,
        };
        assert_eq!(got, want, "not({a:?})");
    }
}
