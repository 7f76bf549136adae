use std::fmt;
use std::rc::Rc;

use num_complex::Complex64;

use crate::parse::Block;
use crate::Builtin;

#[derive(Clone, Debug)]
pub enum Value {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Complex(Complex64),
    Str(String),
    List(Vec<Value>),
    Func(Rc<Func>),
    Builtin(Builtin),
    Module(Module),
}

/// A user defined function.
#[derive(Debug)]
pub struct Func {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    Math,
    Cmath,
    Statistics,
    #[cfg(feature = "random")]
    Random,
}

impl Module {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::Cmath => "cmath",
            Self::Statistics => "statistics",
            #[cfg(feature = "random")]
            Self::Random => "random",
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Func(_) => "function",
            Self::Builtin(_) => "builtin_function_or_method",
            Self::Module(_) => "module",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Func(_) | Self::Builtin(_) | Self::Module(_) => true,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Self::Bool(b) => Some(*b as i128),
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(*b as u8 as f64),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Self::Complex(c) => Some(*c),
            v => v.as_float().map(|f| Complex64::new(f, 0.0)),
        }
    }

    /// The `repr()` style rendering used for sequence elements.
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => format!("'{s}'"),
            v => v.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Func(a), Self::Func(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Module(a), Self::Module(b)) => a == b,
            (a, b) => match (a.as_complex(), b.as_complex()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{}", float_repr(*v)),
            Self::Complex(c) => write!(f, "{}", complex_repr(*c)),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
            Self::Func(func) => write!(f, "<function {}>", func.name),
            Self::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
            Self::Module(m) => write!(f, "<module '{}'>", m.name()),
        }
    }
}

pub(crate) fn float_repr(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f == f.trunc() && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn complex_repr(c: Complex64) -> String {
    if c.re == 0.0 && !c.re.is_sign_negative() {
        format!("{}j", complex_part(c.im))
    } else if c.im.is_sign_negative() {
        format!("({}-{}j)", complex_part(c.re), complex_part(-c.im))
    } else {
        format!("({}+{}j)", complex_part(c.re), complex_part(c.im))
    }
}

/// Integral parts lose the trailing `.0`, like the original's `repr`.
fn complex_part(f: f64) -> String {
    if f == f.trunc() && f.is_finite() && f.abs() < 1e16 {
        format!("{}", f as i128)
    } else {
        float_repr(f)
    }
}
