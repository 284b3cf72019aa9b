//! A scalar reference evaluator over the SSA graph.
//!
//! Drives one JSON record at a time through a program, the way the vector
//! kernels drive sixteen. Tests use it to pin down three-valued semantics
//! and to check that optimizer rewrites preserve observable behavior.

// each test binary compiles its own copy and uses a different subset
#![allow(dead_code)]

use std::collections::HashMap;

use serde_json::Value as Json;

use sift_compiler::ssa::{Imm, Op, TypeSet, ValueId};
use sift_compiler::Program;

/// One lane's evaluation result.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Absent field or failed conversion.
    Missing,
    /// A predicate bit.
    Mask(bool),
    /// A record cursor.
    Row(Json),
    /// A boxed record value.
    Val(Json),
    /// Unboxed lanes.
    Int(i64),
    Float(f64),
    Str(String),
}

/// Three-valued outcome of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tv {
    True,
    False,
    Missing,
}

fn truthy(c: &Cell) -> bool {
    match c {
        Cell::Missing => false,
        Cell::Mask(b) => *b,
        _ => true,
    }
}

/// Evaluate every live value of `prog` against one record.
pub fn eval(prog: &Program, record: &Json) -> HashMap<ValueId, Cell> {
    let mut cells: HashMap<ValueId, Cell> = HashMap::new();
    let order = exec_order(prog);
    for v in order {
        let cell = eval_value(prog, v, record, &cells);
        cells.insert(v, cell);
    }
    cells
}

/// The three-valued outcome of predicate `v` on `record`.
///
/// TRUE when the result bit is set, FALSE when the not-missing predicate
/// still holds, MISSING otherwise — exactly how the engine distinguishes
/// the two zero-mask states.
pub fn tv(prog: &mut Program, v: ValueId, record: &Json) -> Tv {
    let nm = prog.not_missing(v);
    let cells = eval(prog, record);
    if truthy(&cells[&v]) {
        Tv::True
    } else if truthy(&cells[&nm]) {
        Tv::False
    } else {
        Tv::Missing
    }
}

/// Dependency-ordered list of the whole pool. Construction orders values
/// by id, but optimizer rewrites (mask hoisting in particular) can point an
/// early value at a later one, so a worklist re-derives a valid order.
fn exec_order(prog: &Program) -> Vec<ValueId> {
    let n = prog.values().len();
    let mut done = vec![false; n];
    let mut out = Vec::with_capacity(n);
    loop {
        let mut progressed = false;
        for v in 0..n {
            if done[v] {
                continue;
            }
            let ready = prog.value(v as ValueId).args.iter().all(|&a| done[a as usize]);
            if ready {
                done[v] = true;
                out.push(v as ValueId);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    out
}

fn eval_value(
    prog: &Program,
    v: ValueId,
    record: &Json,
    cells: &HashMap<ValueId, Cell>,
) -> Cell {
    let val = prog.value(v);
    let arg = |i: usize| &cells[&val.args[i]];
    let mask_bit = val
        .mask_arg()
        .map(|m| truthy(&cells[&m]))
        .unwrap_or(true);
    match val.op {
        Op::Init => Cell::Row(record.clone()),
        Op::KFalse => Cell::Mask(false),
        Op::Undef | Op::Invalid | Op::InitMem | Op::MergeMem => Cell::Missing,
        Op::LitInt => match &val.imm {
            Some(Imm::Int(i)) => Cell::Int(*i),
            _ => Cell::Missing,
        },
        Op::LitFloat => match &val.imm {
            Some(Imm::Float(f)) => Cell::Float(*f),
            _ => Cell::Missing,
        },
        Op::LitStr => match &val.imm {
            Some(Imm::Str(s)) => Cell::Str(s.to_string()),
            _ => Cell::Missing,
        },
        Op::And => Cell::Mask(truthy(arg(0)) && truthy(arg(1))),
        Op::Or => Cell::Mask(truthy(arg(0)) || truthy(arg(1))),
        Op::Xor => Cell::Mask(truthy(arg(0)) ^ truthy(arg(1))),
        Op::Xnor => Cell::Mask(!(truthy(arg(0)) ^ truthy(arg(1)))),
        Op::Not => Cell::Mask(!truthy(arg(0))),
        Op::AndNot => Cell::Mask(!truthy(arg(0)) && truthy(arg(1))),
        Op::Dot | Op::Dot2 => {
            if !mask_bit {
                return Cell::Missing;
            }
            let obj = match arg(0) {
                Cell::Row(j) | Cell::Val(j) => j,
                _ => return Cell::Missing,
            };
            let name = match &val.imm {
                Some(Imm::Str(s)) => s.to_string(),
                _ => return Cell::Missing,
            };
            match obj.get(name.as_str()) {
                Some(field) => Cell::Val(field.clone()),
                None => Cell::Missing,
            }
        }
        Op::Tuples => {
            if !mask_bit {
                return Cell::Missing;
            }
            match arg(0) {
                Cell::Val(j) if j.is_object() => Cell::Row(j.clone()),
                _ => Cell::Missing,
            }
        }
        Op::IsTrue => gate(mask_bit, || {
            Cell::Mask(matches!(arg(0), Cell::Val(Json::Bool(true))))
        }),
        Op::IsFalse => gate(mask_bit, || {
            Cell::Mask(matches!(arg(0), Cell::Val(Json::Bool(false))))
        }),
        Op::IsNull => gate(mask_bit, || {
            Cell::Mask(matches!(arg(0), Cell::Val(Json::Null)))
        }),
        Op::IsNotNull => gate(mask_bit, || {
            Cell::Mask(matches!(arg(0), Cell::Val(j) if !j.is_null()))
        }),
        Op::ToStr => gate_cell(mask_bit, || match arg(0) {
            Cell::Val(Json::String(s)) => Cell::Str(s.clone()),
            Cell::Str(s) => Cell::Str(s.clone()),
            _ => Cell::Missing,
        }),
        Op::ToInt => gate_cell(mask_bit, || match arg(0) {
            Cell::Val(Json::Number(n)) if n.is_i64() => Cell::Int(n.as_i64().unwrap()),
            Cell::Int(i) => Cell::Int(*i),
            _ => Cell::Missing,
        }),
        Op::ToFloat => gate_cell(mask_bit, || match arg(0) {
            Cell::Val(Json::Number(n)) => match n.as_f64() {
                Some(f) => Cell::Float(f),
                None => Cell::Missing,
            },
            Cell::Float(f) => Cell::Float(*f),
            Cell::Int(i) => Cell::Float(*i as f64),
            _ => Cell::Missing,
        }),
        Op::CvtI2F => gate_cell(mask_bit, || match arg(0) {
            Cell::Int(i) => Cell::Float(*i as f64),
            _ => Cell::Missing,
        }),
        Op::CmpEqImmStr => gate(mask_bit, || match (arg(0), &val.imm) {
            (Cell::Str(s), Some(Imm::Str(lit))) => Cell::Mask(s.as_str() == &**lit),
            _ => Cell::Mask(false),
        }),
        Op::CmpEqImmI => cmp_imm_int(mask_bit, arg(0), &val.imm, |a, b| a == b),
        Op::CmpLtImmI => cmp_imm_int(mask_bit, arg(0), &val.imm, |a, b| a < b),
        Op::CmpGtImmI => cmp_imm_int(mask_bit, arg(0), &val.imm, |a, b| a > b),
        Op::CmpEqImmF => cmp_imm_float(mask_bit, arg(0), &val.imm, |a, b| a == b),
        Op::CmpLtImmF => cmp_imm_float(mask_bit, arg(0), &val.imm, |a, b| a < b),
        Op::CmpLeImmF => cmp_imm_float(mask_bit, arg(0), &val.imm, |a, b| a <= b),
        Op::CmpGtImmF => cmp_imm_float(mask_bit, arg(0), &val.imm, |a, b| a > b),
        Op::CmpGeImmF => cmp_imm_float(mask_bit, arg(0), &val.imm, |a, b| a >= b),
        Op::CmpEqF => gate(mask_bit, || match (arg(0), arg(1)) {
            (Cell::Float(a), Cell::Float(b)) => Cell::Mask(a == b),
            _ => Cell::Mask(false),
        }),
        Op::CmpEqStr => gate(mask_bit, || match (arg(0), arg(1)) {
            (Cell::Str(a), Cell::Str(b)) => Cell::Mask(a == b),
            _ => Cell::Mask(false),
        }),
        Op::RetK | Op::RetV | Op::RetB | Op::RetM => arg(val.args.len() - 1).clone(),
        other => {
            // predicates degrade to false, scalars to missing; extend as
            // tests grow
            if other.ret_type() == TypeSet::BOOL {
                Cell::Mask(false)
            } else {
                Cell::Missing
            }
        }
    }
}

fn gate(mask_bit: bool, f: impl FnOnce() -> Cell) -> Cell {
    if mask_bit {
        f()
    } else {
        Cell::Mask(false)
    }
}

fn gate_cell(mask_bit: bool, f: impl FnOnce() -> Cell) -> Cell {
    if mask_bit {
        f()
    } else {
        Cell::Missing
    }
}

fn cmp_imm_int(
    mask_bit: bool,
    a: &Cell,
    imm: &Option<Imm>,
    f: impl FnOnce(i64, i64) -> bool,
) -> Cell {
    gate(mask_bit, || match (a, imm) {
        (Cell::Int(x), Some(Imm::Int(lit))) => Cell::Mask(f(*x, *lit)),
        _ => Cell::Mask(false),
    })
}

fn cmp_imm_float(
    mask_bit: bool,
    a: &Cell,
    imm: &Option<Imm>,
    f: impl FnOnce(f64, f64) -> bool,
) -> Cell {
    gate(mask_bit, || match (a, imm) {
        (Cell::Float(x), Some(Imm::Float(lit))) => Cell::Mask(f(*x, *lit)),
        _ => Cell::Mask(false),
    })
}
