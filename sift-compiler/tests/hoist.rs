//! Mask hoisting must not change which rows a program selects.

mod common;

use common::Cell;
use serde_json::json;
use sift_compiler::Program;

fn build() -> Program {
    let mut p = Program::begin();
    let flag = p.path("flag");
    let cheap = p.is_true(flag);
    let deep = p.path("payload");
    let lit = p.lit_str("PA");
    let expensive = p.equals(deep, lit);
    let cond = p.and(expensive, cheap);
    p.ret_mask(cond);
    p
}

fn selected(p: &Program, records: &[serde_json::Value]) -> Vec<bool> {
    let mask = p.value(p.ret().unwrap()).args[0];
    records
        .iter()
        .map(|r| matches!(common::eval(p, r).get(&mask), Some(Cell::Mask(true))))
        .collect()
}

#[test]
fn rotation_preserves_selection_on_a_fixture_corpus() {
    // every combination of flag in {true, false, absent} and payload in
    // {"PA", "XX", absent}
    let mut corpus = Vec::new();
    for flag in [Some(true), Some(false), None] {
        for payload in [Some("PA"), Some("XX"), None] {
            let mut obj = serde_json::Map::new();
            if let Some(f) = flag {
                obj.insert("flag".into(), json!(f));
            }
            if let Some(s) = payload {
                obj.insert("payload".into(), json!(s));
            }
            corpus.push(serde_json::Value::Object(obj));
        }
    }

    let before = build();
    let mut after = build();
    after.optimize();

    assert_eq!(selected(&before, &corpus), selected(&after, &corpus));
    // exactly one row survives: flag=true with payload="PA"
    assert_eq!(
        selected(&after, &corpus).iter().filter(|&&b| b).count(),
        1
    );
}
