//! End-to-end pipeline tests: build, optimize, symbolize, compile.

mod common;

use common::Cell;
use serde_json::json;
use sift_asm::{disassemble, Opcode, Operands};
use sift_compiler::ssa::Imm;
use sift_compiler::Program;
use sift_types::SymbolTable;

fn fixture() -> Vec<serde_json::Value> {
    // 60 records: 22 PA, 18 BK, and 20 with no BodyStyle at all
    (0..60)
        .map(|i| {
            if i < 22 {
                json!({"Make": "HOND", "BodyStyle": "PA"})
            } else if i < 40 {
                json!({"Make": "TOYT", "BodyStyle": "BK"})
            } else {
                json!({"Make": "FORD"})
            }
        })
        .collect()
}

fn style_filter() -> Program {
    let mut p = Program::begin();
    let style = p.path("BodyStyle");
    let lit = p.lit_str("PA");
    let eq = p.equals(style, lit);
    p.ret_mask(eq);
    p
}

fn selected(p: &Program, records: &[serde_json::Value]) -> usize {
    let ret = p.ret().unwrap();
    let mask = p.value(ret).args[0];
    records
        .iter()
        .filter(|r| matches!(common::eval(p, r).get(&mask), Some(Cell::Mask(true))))
        .count()
}

#[test]
fn filters_count_the_expected_rows() {
    let records = fixture();
    let mut p = style_filter();
    assert_eq!(selected(&p, &records), 22);
    // optimization must not change what the filter selects
    p.optimize();
    assert_eq!(selected(&p, &records), 22);
}

#[test]
fn compiles_to_a_decodable_stream() {
    let mut table = SymbolTable::new();
    table.intern("Make").unwrap();
    table.intern("BodyStyle").unwrap();
    let mut p = style_filter();
    p.optimize();
    let s = p.symbolize(&table).unwrap();
    let compiled = s.compile().unwrap();

    let prog = disassemble(&compiled.compiled).unwrap();
    assert_eq!(prog.first().map(|i| i.op), Some(Opcode::INIT));
    assert_eq!(prog.last().map(|i| i.op), Some(Opcode::RET));
    let find = prog
        .iter()
        .find(|i| i.op == Opcode::FINDSYM)
        .expect("a findsym for BodyStyle");
    assert_eq!(
        find.operands,
        Operands::Sym(table.lookup("BodyStyle").unwrap().id())
    );
    // the comparison literal travels through the dictionary
    assert!(compiled.dict.iter().any(|s| &**s == "PA"));
    assert_eq!(compiled.scratch.len(), sift_compiler::PAGE_SIZE);
}

#[test]
fn unsymbolized_programs_refuse_to_compile() {
    let mut p = style_filter();
    p.optimize();
    assert!(matches!(
        p.compile(),
        Err(sift_compiler::CompileError::NotSymbolized)
    ));
}

/// A membership probe over a field the table cannot name collapses the
/// whole program to constant false.
#[test]
fn membership_over_a_missing_field_propagates_false() {
    let mut p = Program::begin();
    let x = p.path("x");
    let h = p.hash_value(x);
    let items = [
        Imm::Str("foo".into()),
        Imm::Str("bar".into()),
        Imm::Str("baz".into()),
    ];
    let member = p.hash_member(h, &items);
    p.ret_mask(member);
    p.optimize();

    let table = SymbolTable::new(); // lacks "x"
    let s = p.symbolize(&table).unwrap();
    let ret = s.ret().unwrap();
    assert_eq!(s.value(ret).args[0], Program::FALSE);
}

/// Recompiling under a table whose ids shifted yields a stream differing
/// only in symbol immediates.
#[test]
fn id_shifts_only_move_symbol_immediates() {
    let mut t1 = SymbolTable::new();
    t1.intern("BodyStyle").unwrap();
    let mut t2 = SymbolTable::new();
    t2.intern("Color").unwrap();
    t2.intern("Make").unwrap();
    t2.intern("BodyStyle").unwrap();

    let mut p = style_filter();
    p.optimize();
    let s1 = p.symbolize(&t1).unwrap();
    let c1 = s1.compile().unwrap();
    assert!(s1.is_stale(&t2));
    let s2 = p.symbolize(&t2).unwrap();
    let c2 = s2.compile().unwrap();
    assert!(!s2.is_stale(&t2));

    let d1 = disassemble(&c1.compiled).unwrap();
    let d2 = disassemble(&c2.compiled).unwrap();
    assert_eq!(d1.len(), d2.len());
    let mut sym_diffs = 0;
    for (a, b) in d1.iter().zip(&d2) {
        assert_eq!(a.op, b.op);
        if a.operands != b.operands {
            assert!(
                matches!((&a.operands, &b.operands), (Operands::Sym(_), Operands::Sym(_))),
                "only symbol immediates may differ: {a} vs {b}"
            );
            sym_diffs += 1;
        }
    }
    assert!(sym_diffs > 0);
}
