use std::fmt::{self, Write as _};

use docalc::{format_value, Recalculation, Unit, Var};

/// Writes a recalculation pass as a single JSON object with the evaluated
/// units and the final variable bindings.
pub fn write_recalculation(
    f: &mut impl fmt::Write,
    units: &[Unit],
    recalc: &Recalculation,
    precision: usize,
) -> fmt::Result {
    write!(f, "{{\"units\":[")?;
    if let Some((first, others)) = units.split_first() {
        write_unit(f, first, recalc)?;
        for u in others {
            f.write_char(',')?;
            write_unit(f, u, recalc)?;
        }
    }
    write!(f, "],\"vars\":[")?;
    let mut vars = recalc.vars.iter();
    if let Some(first) = vars.next() {
        write_var(f, first, precision)?;
        for v in vars {
            f.write_char(',')?;
            write_var(f, v, precision)?;
        }
    }
    write!(f, "]}}")
}

fn write_unit(f: &mut impl fmt::Write, u: &Unit, recalc: &Recalculation) -> fmt::Result {
    write!(f, "{{\"line\":{},\"kind\":\"{}\",\"source\":", u.start_line, u.kind)?;
    write_str(f, &u.source)?;
    write!(f, ",\"result\":")?;
    match recalc.line_results.get(&u.start_line) {
        Some(result) => write_str(f, result)?,
        None => f.write_str("null")?,
    }
    write!(f, ",\"error\":{}}}", recalc.errors.contains(&u.start_line))
}

fn write_var(f: &mut impl fmt::Write, v: &Var, precision: usize) -> fmt::Result {
    write!(f, "{{\"name\":")?;
    write_str(f, &v.name)?;
    write!(f, ",\"value\":")?;
    write_str(f, &format_value(&v.value, precision))?;
    write!(f, "}}")
}

fn write_str(f: &mut impl fmt::Write, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}
