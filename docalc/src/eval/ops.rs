use std::cmp::Ordering;

use num_complex::Complex64;

use crate::{BinOp, Error, Result, UnOp, Value};

#[derive(Clone, Copy)]
enum Num {
    Int(i128),
    Float(f64),
    Complex(Complex64),
}

enum NumPair {
    Int(i128, i128),
    Float(f64, f64),
    Complex(Complex64, Complex64),
}

fn num(value: &Value) -> Option<Num> {
    match value {
        Value::Bool(b) => Some(Num::Int(*b as i128)),
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        Value::Complex(c) => Some(Num::Complex(*c)),
        _ => None,
    }
}

/// Promotes both operands to the wider of the two numeric types.
fn num_pair(lhs: &Value, rhs: &Value) -> Option<NumPair> {
    let (a, b) = (num(lhs)?, num(rhs)?);
    Some(match (a, b) {
        (Num::Int(a), Num::Int(b)) => NumPair::Int(a, b),
        (Num::Complex(_), _) | (_, Num::Complex(_)) => NumPair::Complex(complex(a), complex(b)),
        _ => NumPair::Float(float(a), float(b)),
    })
}

fn float(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
        Num::Complex(c) => c.re,
    }
}

fn complex(n: Num) -> Complex64 {
    match n {
        Num::Int(i) => Complex64::new(i as f64, 0.0),
        Num::Float(f) => Complex64::new(f, 0.0),
        Num::Complex(c) => c,
    }
}

pub(crate) fn bin_op(op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
    match op {
        BinOp::Add => add(lhs, rhs),
        BinOp::Sub => sub(lhs, rhs),
        BinOp::Mul => mul(lhs, rhs),
        BinOp::Div => div(lhs, rhs),
        BinOp::IntDiv => int_div(lhs, rhs),
        BinOp::Rem => rem(lhs, rhs),
        BinOp::Pow => pow(lhs, rhs),
        BinOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinOp::Lt => Ok(Value::Bool(cmp(&lhs, &rhs)?.map_or(false, Ordering::is_lt))),
        BinOp::Le => Ok(Value::Bool(cmp(&lhs, &rhs)?.map_or(false, Ordering::is_le))),
        BinOp::Gt => Ok(Value::Bool(cmp(&lhs, &rhs)?.map_or(false, Ordering::is_gt))),
        BinOp::Ge => Ok(Value::Bool(cmp(&lhs, &rhs)?.map_or(false, Ordering::is_ge))),
    }
}

pub(crate) fn un_op(op: UnOp, operand: Value) -> Result<Value> {
    match op {
        UnOp::Not => Ok(Value::Bool(!operand.truthy())),
        UnOp::Neg => match num(&operand) {
            Some(Num::Int(i)) => i.checked_neg().map(Value::Int).ok_or(Error::IntOverflow),
            Some(Num::Float(f)) => Ok(Value::Float(-f)),
            Some(Num::Complex(c)) => Ok(Value::Complex(-c)),
            None => Err(Error::UnsupportedUnOp {
                op: "-",
                operand: operand.type_name(),
            }),
        },
        UnOp::Pos => match num(&operand) {
            Some(Num::Int(i)) => Ok(Value::Int(i)),
            Some(Num::Float(f)) => Ok(Value::Float(f)),
            Some(Num::Complex(c)) => Ok(Value::Complex(c)),
            None => Err(Error::UnsupportedUnOp {
                op: "+",
                operand: operand.type_name(),
            }),
        },
    }
}

fn bin_err(op: &'static str, lhs: &Value, rhs: &Value) -> Error {
    Error::UnsupportedBinOp {
        op,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value> {
    if let (Value::Str(a), Value::Str(b)) = (&lhs, &rhs) {
        return Ok(Value::Str(format!("{a}{b}")));
    }
    if let (Value::List(a), Value::List(b)) = (&lhs, &rhs) {
        let mut items = a.clone();
        items.extend(b.iter().cloned());
        return Ok(Value::List(items));
    }
    match num_pair(&lhs, &rhs) {
        Some(NumPair::Int(a, b)) => a.checked_add(b).map(Value::Int).ok_or(Error::IntOverflow),
        Some(NumPair::Float(a, b)) => Ok(Value::Float(a + b)),
        Some(NumPair::Complex(a, b)) => Ok(Value::Complex(a + b)),
        None => Err(bin_err("+", &lhs, &rhs)),
    }
}

fn sub(lhs: Value, rhs: Value) -> Result<Value> {
    match num_pair(&lhs, &rhs) {
        Some(NumPair::Int(a, b)) => a.checked_sub(b).map(Value::Int).ok_or(Error::IntOverflow),
        Some(NumPair::Float(a, b)) => Ok(Value::Float(a - b)),
        Some(NumPair::Complex(a, b)) => Ok(Value::Complex(a - b)),
        None => Err(bin_err("-", &lhs, &rhs)),
    }
}

fn mul(lhs: Value, rhs: Value) -> Result<Value> {
    match num_pair(&lhs, &rhs) {
        Some(NumPair::Int(a, b)) => a.checked_mul(b).map(Value::Int).ok_or(Error::IntOverflow),
        Some(NumPair::Float(a, b)) => Ok(Value::Float(a * b)),
        Some(NumPair::Complex(a, b)) => Ok(Value::Complex(a * b)),
        None => Err(bin_err("*", &lhs, &rhs)),
    }
}

/// True division, always yielding a float for real operands.
fn div(lhs: Value, rhs: Value) -> Result<Value> {
    match num_pair(&lhs, &rhs) {
        Some(NumPair::Int(a, b)) => {
            if b == 0 {
                Err(Error::DivideByZero)
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        Some(NumPair::Float(a, b)) => {
            if b == 0.0 {
                Err(Error::DivideByZero)
            } else {
                Ok(Value::Float(a / b))
            }
        }
        Some(NumPair::Complex(a, b)) => {
            if b.norm_sqr() == 0.0 {
                Err(Error::DivideByZero)
            } else {
                Ok(Value::Complex(a / b))
            }
        }
        None => Err(bin_err("/", &lhs, &rhs)),
    }
}

/// Floor division, rounding towards negative infinity.
fn int_div(lhs: Value, rhs: Value) -> Result<Value> {
    match num_pair(&lhs, &rhs) {
        Some(NumPair::Int(a, b)) => {
            if b == 0 {
                return Err(Error::DivideByZero);
            }
            let q = a.checked_div(b).ok_or(Error::IntOverflow)?;
            let r = a % b;
            if r != 0 && (r < 0) != (b < 0) {
                q.checked_sub(1).map(Value::Int).ok_or(Error::IntOverflow)
            } else {
                Ok(Value::Int(q))
            }
        }
        Some(NumPair::Float(a, b)) => {
            if b == 0.0 {
                Err(Error::DivideByZero)
            } else {
                Ok(Value::Float((a / b).floor()))
            }
        }
        Some(NumPair::Complex(..)) | None => Err(bin_err("//", &lhs, &rhs)),
    }
}

/// Remainder following the sign of the divisor.
fn rem(lhs: Value, rhs: Value) -> Result<Value> {
    match num_pair(&lhs, &rhs) {
        Some(NumPair::Int(a, b)) => {
            if b == 0 {
                return Err(Error::DivideByZero);
            }
            let r = a.checked_rem(b).ok_or(Error::IntOverflow)?;
            if r != 0 && (r < 0) != (b < 0) {
                Ok(Value::Int(r + b))
            } else {
                Ok(Value::Int(r))
            }
        }
        Some(NumPair::Float(a, b)) => {
            if b == 0.0 {
                return Err(Error::DivideByZero);
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                Ok(Value::Float(r + b))
            } else {
                Ok(Value::Float(r))
            }
        }
        Some(NumPair::Complex(..)) | None => Err(bin_err("%", &lhs, &rhs)),
    }
}

fn pow(lhs: Value, rhs: Value) -> Result<Value> {
    match num_pair(&lhs, &rhs) {
        Some(NumPair::Int(a, b)) => {
            if b >= 0 {
                let exp = u32::try_from(b).map_err(|_| Error::IntOverflow)?;
                a.checked_pow(exp).map(Value::Int).ok_or(Error::IntOverflow)
            } else if a == 0 {
                Err(Error::DivideByZero)
            } else {
                Ok(Value::Float((a as f64).powf(b as f64)))
            }
        }
        Some(NumPair::Float(a, b)) => {
            if a == 0.0 && b < 0.0 {
                Err(Error::DivideByZero)
            } else if a < 0.0 && b.fract() != 0.0 {
                // negative base with a fractional exponent goes complex
                let z = Complex64::new(a, 0.0).powc(Complex64::new(b, 0.0));
                Ok(Value::Complex(z))
            } else {
                Ok(Value::Float(a.powf(b)))
            }
        }
        Some(NumPair::Complex(a, b)) => {
            if a.norm_sqr() == 0.0 && b.re < 0.0 {
                Err(Error::DivideByZero)
            } else {
                Ok(Value::Complex(a.powc(b)))
            }
        }
        None => Err(bin_err("**", &lhs, &rhs)),
    }
}

/// Ordering of two values; `None` for unordered float comparisons involving
/// nan, which compare false like in Python.
pub(crate) fn cmp(lhs: &Value, rhs: &Value) -> Result<Option<Ordering>> {
    if let (Value::Str(a), Value::Str(b)) = (lhs, rhs) {
        return Ok(a.partial_cmp(b));
    }
    match num_pair(lhs, rhs) {
        Some(NumPair::Int(a, b)) => Ok(a.partial_cmp(&b)),
        Some(NumPair::Float(a, b)) => Ok(a.partial_cmp(&b)),
        Some(NumPair::Complex(..)) | None => {
            Err(Error::NotComparable(lhs.type_name(), rhs.type_name()))
        }
    }
}

pub(crate) fn index(value: Value, index: Value) -> Result<Value> {
    match value {
        Value::List(items) => {
            let at = resolve_index(int_index("list", &index)?, items.len())?;
            items.get(at).cloned().ok_or(Error::IndexOutOfRange)
        }
        Value::Str(s) => {
            let at = resolve_index(int_index("string", &index)?, s.chars().count())?;
            s.chars()
                .nth(at)
                .map(|c| Value::Str(c.to_string()))
                .ok_or(Error::IndexOutOfRange)
        }
        v => Err(Error::NotIndexable(v.type_name())),
    }
}

fn int_index(container: &'static str, index: &Value) -> Result<i128> {
    index
        .as_int()
        .ok_or(Error::InvalidIndex(container, index.type_name()))
}

fn resolve_index(i: i128, len: usize) -> Result<usize> {
    let at = if i < 0 { i + len as i128 } else { i };
    if at < 0 || at >= len as i128 {
        Err(Error::IndexOutOfRange)
    } else {
        Ok(at as usize)
    }
}
