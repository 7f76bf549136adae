use std::collections::HashMap;
use std::f64::consts;

use crate::{Builtin, Module, Value};

pub type Bindings = HashMap<String, Value>;

const BUILTINS: &[(&str, Builtin)] = &[
    ("abs", Builtin::Abs),
    ("round", Builtin::Round),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("pow", Builtin::Pow),
    ("sum", Builtin::Sum),
    ("len", Builtin::Len),
    ("range", Builtin::Range),
    ("int", Builtin::Int),
    ("float", Builtin::Float),
    ("complex", Builtin::Complex),
    ("bool", Builtin::Bool),
    ("str", Builtin::Str),
    ("list", Builtin::List),
];

const MATH_FUNS: &[(&str, Builtin)] = &[
    ("sin", Builtin::Sin),
    ("cos", Builtin::Cos),
    ("tan", Builtin::Tan),
    ("asin", Builtin::Asin),
    ("acos", Builtin::Acos),
    ("atan", Builtin::Atan),
    ("sinh", Builtin::Sinh),
    ("cosh", Builtin::Cosh),
    ("tanh", Builtin::Tanh),
    ("sqrt", Builtin::Sqrt),
    ("exp", Builtin::Exp),
    ("log", Builtin::Log),
    ("log10", Builtin::Log10),
    ("log2", Builtin::Log2),
    ("floor", Builtin::Floor),
    ("ceil", Builtin::Ceil),
    ("trunc", Builtin::Trunc),
    ("degrees", Builtin::Degrees),
    ("radians", Builtin::Radians),
    ("factorial", Builtin::Factorial),
    ("gcd", Builtin::Gcd),
];

const CMATH_FUNS: &[(&str, Builtin)] = &[
    ("sqrt", Builtin::CSqrt),
    ("exp", Builtin::CExp),
    ("log", Builtin::CLog),
    ("sin", Builtin::CSin),
    ("cos", Builtin::CCos),
    ("tan", Builtin::CTan),
    ("phase", Builtin::Phase),
];

const STATISTICS_FUNS: &[(&str, Builtin)] = &[
    ("mean", Builtin::Mean),
    ("median", Builtin::Median),
    ("stdev", Builtin::Stdev),
    ("variance", Builtin::Variance),
];

#[cfg(feature = "random")]
const RANDOM_FUNS: &[(&str, Builtin)] = &[
    ("random", Builtin::Random),
    ("randint", Builtin::Randint),
    ("uniform", Builtin::Uniform),
    ("choice", Builtin::Choice),
];

/// The read-only builtin table documents are evaluated against.
///
/// Module members live under flat dotted keys (`math.sin`), which the
/// attribute access of a [`Module`] value resolves against.
pub struct Namespace {
    base: Bindings,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace {
    pub fn new() -> Self {
        let mut base = Bindings::new();
        for (name, builtin) in BUILTINS {
            base.insert((*name).to_string(), Value::Builtin(*builtin));
        }

        base.insert("math".to_string(), Value::Module(Module::Math));
        for (name, builtin) in MATH_FUNS {
            base.insert(format!("math.{name}"), Value::Builtin(*builtin));
        }
        base.insert("math.pi".to_string(), Value::Float(consts::PI));
        base.insert("math.e".to_string(), Value::Float(consts::E));
        base.insert("math.tau".to_string(), Value::Float(consts::TAU));
        base.insert("math.inf".to_string(), Value::Float(f64::INFINITY));
        base.insert("math.nan".to_string(), Value::Float(f64::NAN));

        base.insert("cmath".to_string(), Value::Module(Module::Cmath));
        for (name, builtin) in CMATH_FUNS {
            base.insert(format!("cmath.{name}"), Value::Builtin(*builtin));
        }
        base.insert("cmath.pi".to_string(), Value::Float(consts::PI));
        base.insert("cmath.e".to_string(), Value::Float(consts::E));
        base.insert("cmath.tau".to_string(), Value::Float(consts::TAU));

        base.insert(
            "statistics".to_string(),
            Value::Module(Module::Statistics),
        );
        for (name, builtin) in STATISTICS_FUNS {
            base.insert(format!("statistics.{name}"), Value::Builtin(*builtin));
        }

        #[cfg(feature = "random")]
        {
            base.insert("random".to_string(), Value::Module(Module::Random));
            for (name, builtin) in RANDOM_FUNS {
                base.insert(format!("random.{name}"), Value::Builtin(*builtin));
            }
        }

        Self { base }
    }

    /// A fresh mutable copy for one recalculation pass.
    pub fn working(&self) -> Bindings {
        self.base.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.base.contains_key(name)
    }
}

/// A user defined binding shown by the variable inspector.
#[derive(Clone, Debug, PartialEq)]
pub struct Var {
    pub name: String,
    pub value: Value,
}

/// User defined bindings in definition order, rebuilt on every pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VarStore {
    vars: Vec<Var>,
}

impl VarStore {
    pub fn set(&mut self, name: &str, value: Value) {
        match self.vars.iter_mut().find(|v| v.name == name) {
            Some(var) => var.value = value,
            None => self.vars.push(Var {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.iter().find(|v| v.name == name).map(|v| &v.value)
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.retain(|v| v.name != name);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Var> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

impl<'a> IntoIterator for &'a VarStore {
    type Item = &'a Var;
    type IntoIter = std::slice::Iter<'a, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
