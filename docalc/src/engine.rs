use std::collections::BTreeMap;

use crate::eval::Evaluator;
use crate::namespace::{Bindings, Namespace, VarStore};
use crate::parse::{self, LineStmt};
use crate::segment::{segment, Unit, UnitKind};
use crate::{fmt, lex, Result, Value};

/// Document line number → annotation text.
pub type LineResults = BTreeMap<usize, String>;

/// One successfully evaluated unit, as recorded in the history panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Calculation {
    pub source: String,
    pub result: String,
}

/// Receives per-unit notifications during a recalculation pass.
pub trait EngineSink {
    fn calculation(&mut self, _source: &str, _result: &str) {}
    fn variables(&mut self, _vars: &VarStore) {}
}

/// The outcome of a full document pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recalculation {
    pub line_results: LineResults,
    pub vars: VarStore,
    /// Start lines of the units that failed, in document order. Frontends
    /// should consult this instead of inspecting annotation text.
    pub errors: Vec<usize>,
}

/// How a single unit evaluated.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// blank line or comment
    NoResult,
    Assigned(String, Value),
    Evaluated(Value),
    /// a block ran; the value is its trailing expression, if any
    Executed(Option<Value>),
    Failed(String),
}

/// Evaluates one unit against the working namespace, recording document
/// level bindings in `vars`. Never fails, errors become [`Outcome::Failed`].
pub fn eval_unit(unit: &Unit, working: &mut Bindings, vars: &mut VarStore) -> Outcome {
    match try_eval_unit(unit, working, vars) {
        Ok(outcome) => outcome,
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

fn try_eval_unit(unit: &Unit, working: &mut Bindings, vars: &mut VarStore) -> Result<Outcome> {
    let stripped = unit.source.trim();
    if stripped.is_empty() || stripped.starts_with('#') {
        return Ok(Outcome::NoResult);
    }

    match unit.kind {
        UnitKind::SingleLine => {
            let tokens = lex::lex(stripped)?;
            if tokens.is_empty() {
                return Ok(Outcome::NoResult);
            }
            // a lone statement keyword (`import os`, a stray `break`) gets
            // the statement parser's diagnostics instead of an expression
            // parse error
            if let Some(lex::TokenT::Kw(kw)) = tokens.first().map(|t| &t.typ) {
                if kw.starts_statement() {
                    return exec_block_unit(stripped, working, vars);
                }
            }
            match parse::parse_line(&tokens)? {
                LineStmt::Assign { name, value } => {
                    let value = Evaluator::new(working).eval_expr(&value)?;
                    working.insert(name.clone(), value.clone());
                    vars.set(&name, value.clone());
                    Ok(Outcome::Assigned(name, value))
                }
                LineStmt::Expr(expr) => {
                    let value = Evaluator::new(working).eval_expr(&expr)?;
                    Ok(Outcome::Evaluated(value))
                }
            }
        }
        UnitKind::Block => exec_block_unit(&unit.source, working, vars),
    }
}

fn exec_block_unit(source: &str, working: &mut Bindings, vars: &mut VarStore) -> Result<Outcome> {
    let block = parse::parse_block(source)?;
    let assigned = {
        let mut evaluator = Evaluator::new(working);
        evaluator.exec_block(&block)?;
        evaluator.into_assigned()
    };
    for name in assigned {
        if let Some(value) = working.get(&name) {
            vars.set(&name, value.clone());
        }
    }
    Ok(Outcome::Executed(trailing_expr_value(source, working)))
}

/// Statement openers that disqualify a block's last line from being
/// re-evaluated as its result expression.
const STMT_PREFIXES: [&str; 15] = [
    "def ", "class ", "if ", "for ", "while ", "try:", "except", "finally:", "with ", "elif ",
    "else:", "return ", "yield ", "import ", "from ",
];

/// Re-evaluates the last non-empty line of a block when it looks like a bare
/// expression, so a `def` followed by a call reports the call's value. Any
/// failure here leaves the block as statement-only; its work is kept.
fn trailing_expr_value(source: &str, working: &mut Bindings) -> Option<Value> {
    let last = source.lines().rev().map(str::trim).find(|l| !l.is_empty())?;
    if STMT_PREFIXES.iter().any(|kw| last.starts_with(kw)) {
        return None;
    }
    let tokens = lex::lex(last).ok()?;
    if tokens.is_empty() {
        return None;
    }
    let LineStmt::Expr(expr) = parse::parse_line(&tokens).ok()? else {
        return None;
    };
    match Evaluator::new(working).eval_expr(&expr) {
        Ok(Value::None) => None,
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

/// The document recalculation controller.
///
/// Holds the immutable builtin table, the inspector's manual variable
/// overrides, and the calculation history. Every call to [`recalculate`]
/// re-evaluates the whole document top to bottom against a fresh working
/// namespace.
///
/// [`recalculate`]: Calculator::recalculate
pub struct Calculator {
    base: Namespace,
    overrides: Vec<(String, Value)>,
    pub precision: usize,
    pub history: Vec<Calculation>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_precision(fmt::DEFAULT_PRECISION)
    }

    pub fn with_precision(precision: usize) -> Self {
        Self {
            base: Namespace::new(),
            overrides: Vec::new(),
            precision,
            history: Vec::new(),
        }
    }

    pub fn recalculate(&mut self, input: &str) -> Recalculation {
        struct Silent;
        impl EngineSink for Silent {}
        self.recalculate_with(input, &mut Silent)
    }

    pub fn recalculate_with(&mut self, input: &str, sink: &mut dyn EngineSink) -> Recalculation {
        let mut working = self.base.working();
        let mut vars = VarStore::default();
        for (name, value) in &self.overrides {
            working.insert(name.clone(), value.clone());
            vars.set(name, value.clone());
        }

        let mut line_results = LineResults::new();
        let mut errors = Vec::new();
        for unit in segment(input) {
            match eval_unit(&unit, &mut working, &mut vars) {
                Outcome::NoResult => (),
                Outcome::Assigned(name, value) => {
                    let result = fmt::format_value(&value, self.precision);
                    line_results.insert(unit.start_line, format!("{name} = {result}"));
                    self.record(&unit.source, result, sink);
                }
                Outcome::Evaluated(Value::None) | Outcome::Executed(Some(Value::None)) => (),
                Outcome::Evaluated(value) | Outcome::Executed(Some(value)) => {
                    let result = fmt::format_value(&value, self.precision);
                    line_results.insert(unit.start_line, result.clone());
                    self.record(&unit.source, result, sink);
                }
                Outcome::Executed(None) => {
                    line_results.insert(unit.start_line, "executed".to_string());
                }
                Outcome::Failed(msg) => {
                    line_results.insert(unit.start_line, format!("Error: {msg}"));
                    errors.push(unit.start_line);
                }
            }
        }
        sink.variables(&vars);
        Recalculation {
            line_results,
            vars,
            errors,
        }
    }

    fn record(&mut self, source: &str, result: String, sink: &mut dyn EngineSink) {
        sink.calculation(source, &result);
        self.history.push(Calculation {
            source: source.to_string(),
            result,
        });
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Drops all inspector overrides.
    pub fn clear_variables(&mut self) {
        self.overrides.clear();
    }

    /// Removes an inspector override and re-evaluates the document. Bindings
    /// the document itself defines simply come back on the pass.
    pub fn delete_variable(&mut self, name: &str, input: &str) -> Recalculation {
        self.overrides.retain(|(n, _)| n != name);
        self.recalculate(input)
    }

    /// Sets an inspector override to the value of `source`, evaluated
    /// against the builtin table alone, then re-evaluates the document.
    pub fn edit_variable(&mut self, name: &str, source: &str, input: &str) -> Result<Recalculation> {
        let value = self.eval_base_expr(source)?;
        match self.overrides.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.overrides.push((name.to_string(), value)),
        }
        Ok(self.recalculate(input))
    }

    /// Evaluates a single expression against the builtin table.
    pub fn eval_base_expr(&self, source: &str) -> Result<Value> {
        let tokens = lex::lex(source.trim())?;
        let expr = parse::parse_expr(&tokens)?;
        let mut working = self.base.working();
        Evaluator::new(&mut working).eval_expr(&expr)
    }
}
