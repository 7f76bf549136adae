use std::fmt;

use crate::Span;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    // lexing
    InvalidChar(char, Span),
    InvalidNumber(String, Span),
    MissingClosingQuote(Span),

    // parsing
    UnexpectedToken(String, Span),
    ExpectedExpr(Span),
    ExpectedIdent(Span),
    ExpectedToken(&'static str, Span),
    MissingClosingPar(Span),
    /// Line numbers are 1-based within the unit.
    ExpectedColon(usize),
    ExpectedIndent(usize),
    UnexpectedIndent(usize),
    UnsupportedStatement(&'static str, usize),
    InvalidAssignTarget,

    // evaluation
    UndefinedName(String),
    NoAttr(&'static str, String),
    NoModuleAttr(&'static str, String),
    NotCallable(&'static str),
    NotIterable(&'static str),
    NotIndexable(&'static str),
    InvalidIndex(&'static str, &'static str),
    IndexOutOfRange,
    NoLen(&'static str),
    ArgCount {
        name: String,
        expected: usize,
        found: usize,
    },
    UnsupportedBinOp {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    UnsupportedUnOp {
        op: &'static str,
        operand: &'static str,
    },
    NotComparable(&'static str, &'static str),
    MustBeReal(&'static str, &'static str),
    MustBeNumber(&'static str, &'static str),
    DivideByZero,
    DomainError,
    IntOverflow,
    ValueError(&'static str),
    RecursionLimit,
    ReturnOutsideFunction,
    BreakOutsideLoop,
    ContinueOutsideLoop,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar(c, _) => write!(f, "invalid character '{c}'"),
            Self::InvalidNumber(n, _) => write!(f, "invalid number literal '{n}'"),
            Self::MissingClosingQuote(_) => write!(f, "unterminated string literal"),
            Self::UnexpectedToken(t, _) => write!(f, "unexpected token '{t}'"),
            Self::ExpectedExpr(_) => write!(f, "expected an expression"),
            Self::ExpectedIdent(_) => write!(f, "expected an identifier"),
            Self::ExpectedToken(t, _) => write!(f, "expected '{t}'"),
            Self::MissingClosingPar(_) => write!(f, "missing closing parenthesis"),
            Self::ExpectedColon(l) => write!(f, "expected ':' at the end of line {l}"),
            Self::ExpectedIndent(l) => write!(f, "expected an indented block on line {l}"),
            Self::UnexpectedIndent(l) => write!(f, "unexpected indent on line {l}"),
            Self::UnsupportedStatement(kw, l) => {
                write!(f, "'{kw}' statements are not supported (line {l})")
            }
            Self::InvalidAssignTarget => write!(f, "cannot assign to this expression"),
            Self::UndefinedName(n) => write!(f, "name '{n}' is not defined"),
            Self::NoAttr(t, a) => write!(f, "'{t}' object has no attribute '{a}'"),
            Self::NoModuleAttr(m, a) => write!(f, "module '{m}' has no attribute '{a}'"),
            Self::NotCallable(t) => write!(f, "'{t}' object is not callable"),
            Self::NotIterable(t) => write!(f, "'{t}' object is not iterable"),
            Self::NotIndexable(t) => write!(f, "'{t}' object is not subscriptable"),
            Self::InvalidIndex(c, t) => {
                write!(f, "{c} indices must be integers, not '{t}'")
            }
            Self::IndexOutOfRange => write!(f, "index out of range"),
            Self::NoLen(t) => write!(f, "object of type '{t}' has no len()"),
            Self::ArgCount {
                name,
                expected,
                found,
            } => write!(f, "{name}() takes {expected} arguments but {found} were given"),
            Self::UnsupportedBinOp { op, lhs, rhs } => {
                write!(f, "unsupported operand type(s) for {op}: '{lhs}' and '{rhs}'")
            }
            Self::UnsupportedUnOp { op, operand } => {
                write!(f, "bad operand type for unary {op}: '{operand}'")
            }
            Self::NotComparable(a, b) => {
                write!(f, "comparison not supported between '{a}' and '{b}'")
            }
            Self::MustBeReal(name, t) => {
                write!(f, "{name}() argument must be a real number, not '{t}'")
            }
            Self::MustBeNumber(name, t) => {
                write!(f, "{name}() argument must be a number, not '{t}'")
            }
            Self::DivideByZero => write!(f, "division by zero"),
            Self::DomainError => write!(f, "math domain error"),
            Self::IntOverflow => write!(f, "integer overflow"),
            Self::ValueError(msg) => write!(f, "{msg}"),
            Self::RecursionLimit => write!(f, "maximum recursion depth exceeded"),
            Self::ReturnOutsideFunction => write!(f, "'return' outside function"),
            Self::BreakOutsideLoop => write!(f, "'break' outside loop"),
            Self::ContinueOutsideLoop => write!(f, "'continue' outside loop"),
        }
    }
}
