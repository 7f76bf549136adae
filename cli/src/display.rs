use std::fmt::{self, Display};

use docalc::{format_value, Recalculation, VarStore};
use unicode_width::UnicodeWidthStr;

use crate::style::{Color, DGreen, LRed, ANSI_ESC};

/// The document with result annotations appended to their lines, aligned
/// past the widest annotated line. Failed lines are colored by the pass's
/// error list, not by the annotation text.
pub struct Annotated<'a> {
    input: &'a str,
    recalc: &'a Recalculation,
}

pub fn annotated<'a>(input: &'a str, recalc: &'a Recalculation) -> Annotated<'a> {
    Annotated { input, recalc }
}

impl Display for Annotated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = &self.recalc.line_results;
        let width = self
            .input
            .lines()
            .enumerate()
            .filter(|(nr, _)| results.contains_key(nr))
            .map(|(_, l)| l.width())
            .max()
            .unwrap_or(0);

        for (nr, line) in self.input.lines().enumerate() {
            match results.get(&nr) {
                Some(result) => {
                    let pad = width - line.width();
                    let col = if self.recalc.errors.contains(&nr) {
                        LRed::NORMAL
                    } else {
                        DGreen::NORMAL
                    };
                    writeln!(f, "{line}{:pad$}  {col}# {result}{ANSI_ESC}", "")?;
                }
                None => writeln!(f, "{line}")?,
            }
        }
        Ok(())
    }
}

/// The variable inspector: one `name = value` line per binding, values
/// aligned past the longest name.
pub struct Vars<'a> {
    vars: &'a VarStore,
    precision: usize,
}

pub fn vars(vars: &VarStore, precision: usize) -> Vars<'_> {
    Vars { vars, precision }
}

impl Display for Vars<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.vars.iter().map(|v| v.name.width()).max().unwrap_or(0);
        for var in self.vars {
            let pad = width - var.name.width();
            let value = format_value(&var.value, self.precision);
            writeln!(f, "{}{:pad$} = {value}", var.name, "")?;
        }
        Ok(())
    }
}
