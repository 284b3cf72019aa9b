//! Symbolization and staleness.
//!
//! A program is built against field *names*; the record format speaks
//! numeric symbol ids that differ per symbol table. `symbolize` deep-clones
//! the optimized program and rewrites every symbol-dependent immediate
//! under a concrete table, logging each resolution so `is_stale` can tell
//! when a new table invalidates the clone. Unresolvable fields become the
//! false constant, which the optimizer then propagates — a query over a
//! field the data does not have degenerates to a constant-false program.

use sift_types::{SymbolTable, MAX_SYMBOL};

use crate::error::CompileError;
use crate::program::construct::{decode_field_names, encode_field_ids};
use crate::program::Program;
use crate::ssa::{Imm, Op, ValueId};

impl Program {
    /// Clone this (optimized) program and resolve it against `table`.
    pub fn symbolize(&self, table: &SymbolTable) -> Result<Program, CompileError> {
        let mut dst = self.clone();
        dst.resolved.clear();
        dst.symbolized = true;
        for v in 0..dst.values().len() as ValueId {
            match dst.value(v).op {
                Op::Dot => dst.symbolize_dot(v, table)?,
                Op::MakeStruct => dst.symbolize_struct(v, table)?,
                _ => {}
            }
        }
        dst.rebuild_trees();
        dst.optimize();
        dst.renumber();
        tracing::debug!(
            resolved = dst.resolved.len(),
            values = dst.values().len(),
            "symbolized program"
        );
        Ok(dst)
    }

    fn symbolize_dot(&mut self, v: ValueId, table: &SymbolTable) -> Result<(), CompileError> {
        let Some(Imm::Str(name)) = self.value(v).imm.clone() else {
            return Ok(());
        };
        match table.lookup(&name) {
            Some(id) if id.id() <= MAX_SYMBOL => {
                self.resolved.push((name, Some(id)));
                self.value_mut(v).imm = Some(Imm::Sym(id));
                Ok(())
            }
            Some(id) => Err(CompileError::SymbolTooLarge(id.id())),
            None => {
                // the record format cannot contain this field at all
                self.resolved.push((name, None));
                let val = self.value_mut(v);
                val.op = Op::KFalse;
                val.args.clear();
                val.imm = None;
                Ok(())
            }
        }
    }

    fn symbolize_struct(&mut self, v: ValueId, table: &SymbolTable) -> Result<(), CompileError> {
        let Some(Imm::Bytes(bytes)) = self.value(v).imm.clone() else {
            return Ok(());
        };
        let Some(names) = decode_field_names(&bytes) else {
            return Ok(());
        };
        let mut ids = Vec::with_capacity(names.len());
        let mut keep = Vec::with_capacity(names.len());
        for name in &names {
            match table.lookup(name) {
                Some(id) if id.id() <= MAX_SYMBOL => {
                    self.resolved.push((name.as_str().into(), Some(id)));
                    ids.push(id.id());
                    keep.push(true);
                }
                Some(id) => return Err(CompileError::SymbolTooLarge(id.id())),
                None => {
                    self.resolved.push((name.as_str().into(), None));
                    keep.push(false);
                }
            }
        }
        // drop fields the table cannot name, pairs and ids in lockstep
        let old_args = self.value(v).args.clone();
        let mut new_args = vec![old_args[0]];
        for (i, pair) in old_args[1..].chunks(2).enumerate() {
            if keep[i] {
                new_args.extend_from_slice(pair);
            }
        }
        let val = self.value_mut(v);
        val.args = new_args;
        val.imm = Some(Imm::Bytes(encode_field_ids(&ids)));
        Ok(())
    }

    /// Whether `table` invalidates this program's symbolization.
    ///
    /// True when the program was never symbolized, when it stored complex
    /// literals (their encodings embed ids, so every invocation must
    /// re-symbolize), or when any recorded resolution now disagrees —
    /// including a previously missing field that the table now names.
    pub fn is_stale(&self, table: &SymbolTable) -> bool {
        if !self.symbolized || self.literals {
            return true;
        }
        self.resolved
            .iter()
            .any(|(name, id)| table.lookup(name) != *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_filter() -> Program {
        let mut p = Program::begin();
        let style = p.path("BodyStyle");
        let lit = p.lit_str("PA");
        let eq = p.equals(style, lit);
        p.ret_mask(eq);
        p.optimize();
        p
    }

    #[test]
    fn resolution_rewrites_names_to_ids() {
        let mut table = SymbolTable::new();
        table.intern("Make").unwrap();
        table.intern("BodyStyle").unwrap();
        let p = build_filter();
        let s = p.symbolize(&table).unwrap();
        let dot = s.values().iter().find(|v| v.op == Op::Dot).unwrap();
        assert_eq!(dot.imm, Some(Imm::Sym(table.lookup("BodyStyle").unwrap())));
        assert!(!s.is_stale(&table));
        // the source program is untouched and still unsymbolized
        assert!(p.is_stale(&table));
    }

    #[test]
    fn missing_fields_collapse_the_program_to_false() {
        let table = SymbolTable::new();
        let p = build_filter();
        let s = p.symbolize(&table).unwrap();
        let ret = s.ret().unwrap();
        assert_eq!(s.value(ret).args[0], Program::FALSE);
    }

    #[test]
    fn id_shifts_are_detected_as_stale() {
        let mut table = SymbolTable::new();
        table.intern("BodyStyle").unwrap();
        let p = build_filter();
        let s = p.symbolize(&table).unwrap();
        assert!(!s.is_stale(&table));
        // a table where the field landed on a different id
        let mut shifted = SymbolTable::new();
        shifted.intern("Color").unwrap();
        shifted.intern("BodyStyle").unwrap();
        assert!(s.is_stale(&shifted));
        // resymbolization against the new table heals it
        let s2 = p.symbolize(&shifted).unwrap();
        assert!(!s2.is_stale(&shifted));
    }

    #[test]
    fn newly_appearing_fields_are_stale_too() {
        let table = SymbolTable::new();
        let p = build_filter();
        let s = p.symbolize(&table).unwrap();
        assert!(!s.is_stale(&table));
        let mut grown = SymbolTable::new();
        grown.intern("BodyStyle").unwrap();
        assert!(s.is_stale(&grown));
    }
}
