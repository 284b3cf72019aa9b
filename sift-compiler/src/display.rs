//! Human-readable SSA dumps, used by trace logging and test diagnostics.

use core::fmt;

use crate::program::Program;
use crate::ssa::{Imm, Value};

fn write_value(f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
    write!(f, "%{} = {}", v.id, v.op.name())?;
    for a in &v.args {
        write!(f, " %{a}")?;
    }
    match &v.imm {
        None => {}
        Some(Imm::Int(i)) => write!(f, " {i}")?,
        Some(Imm::Float(x)) => write!(f, " {x}")?,
        Some(Imm::Bool(b)) => write!(f, " {b}")?,
        Some(Imm::Str(s)) => write!(f, " {s:?}")?,
        Some(Imm::Bytes(b)) => write!(f, " <{} bytes>", b.len())?,
        Some(Imm::Ts(t)) => write!(f, " @{t}us")?,
        Some(Imm::Sym(s)) => write!(f, " {s}")?,
        Some(Imm::Tree(t)) => write!(f, " tree({t})")?,
        Some(Imm::Agg(a)) => write!(f, " agg({a})")?,
        Some(Imm::AggPrec(a, p)) => write!(f, " agg({a}) p={p}")?,
        Some(Imm::Slot(s)) => write!(f, " [{s}]")?,
        Some(Imm::Error(e)) => write!(f, " !{e:?}")?,
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in self.values() {
            write_value(f, v)?;
            writeln!(f)?;
        }
        if let Some(ret) = self.ret() {
            writeln!(f, "ret %{ret}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_are_line_per_value() {
        let mut p = Program::begin();
        let v = p.path("a");
        let lit = p.lit_str("x");
        let eq = p.equals(v, lit);
        p.ret_mask(eq);
        let text = p.to_string();
        assert!(text.contains("dot"));
        assert!(text.contains("\"a\""));
        assert!(text.lines().count() > 4);
        assert!(text.trim_end().ends_with(&format!("ret %{}", p.ret().unwrap())));
    }
}
