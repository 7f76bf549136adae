use num_complex::Complex64;

#[cfg(feature = "random")]
use rand::Rng;

use super::ops;
use crate::{BinOp, Error, Result, Value};

const MAX_RANGE_LEN: i128 = 10_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    // bare builtins
    Abs,
    Round,
    Min,
    Max,
    Pow,
    Sum,
    Len,
    Range,
    Int,
    Float,
    Complex,
    Bool,
    Str,
    List,
    // math
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Exp,
    Log,
    Log10,
    Log2,
    Floor,
    Ceil,
    Trunc,
    Degrees,
    Radians,
    Factorial,
    Gcd,
    // cmath
    CSqrt,
    CExp,
    CLog,
    CSin,
    CCos,
    CTan,
    Phase,
    // statistics
    Mean,
    Median,
    Stdev,
    Variance,
    // random
    #[cfg(feature = "random")]
    Random,
    #[cfg(feature = "random")]
    Randint,
    #[cfg(feature = "random")]
    Uniform,
    #[cfg(feature = "random")]
    Choice,
}

impl Builtin {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Round => "round",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pow => "pow",
            Self::Sum => "sum",
            Self::Len => "len",
            Self::Range => "range",
            Self::Int => "int",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::List => "list",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Sqrt | Self::CSqrt => "sqrt",
            Self::Exp | Self::CExp => "exp",
            Self::Log | Self::CLog => "log",
            Self::Log10 => "log10",
            Self::Log2 => "log2",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Trunc => "trunc",
            Self::Degrees => "degrees",
            Self::Radians => "radians",
            Self::Factorial => "factorial",
            Self::Gcd => "gcd",
            Self::CSin => "sin",
            Self::CCos => "cos",
            Self::CTan => "tan",
            Self::Phase => "phase",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Stdev => "stdev",
            Self::Variance => "variance",
            #[cfg(feature = "random")]
            Self::Random => "random",
            #[cfg(feature = "random")]
            Self::Randint => "randint",
            #[cfg(feature = "random")]
            Self::Uniform => "uniform",
            #[cfg(feature = "random")]
            Self::Choice => "choice",
        }
    }
}

pub(crate) fn call(builtin: Builtin, args: Vec<Value>) -> Result<Value> {
    match builtin {
        Builtin::Abs => abs(args),
        Builtin::Round => round(args),
        Builtin::Min => min_max(args, "min", true),
        Builtin::Max => min_max(args, "max", false),
        Builtin::Pow => {
            let [base, exp] = exactly("pow", args)?;
            ops::bin_op(BinOp::Pow, base, exp)
        }
        Builtin::Sum => sum(args),
        Builtin::Len => len(args),
        Builtin::Range => range(args),
        Builtin::Int => to_int(args),
        Builtin::Float => to_float(args),
        Builtin::Complex => to_complex(args),
        Builtin::Bool => {
            let [arg] = exactly("bool", args)?;
            Ok(Value::Bool(arg.truthy()))
        }
        Builtin::Str => {
            let [arg] = exactly("str", args)?;
            Ok(Value::Str(arg.to_string()))
        }
        Builtin::List => to_list(args),

        Builtin::Sin => real_fn("sin", args, f64::sin),
        Builtin::Cos => real_fn("cos", args, f64::cos),
        Builtin::Tan => real_fn("tan", args, f64::tan),
        Builtin::Asin => domain_fn("asin", args, |x| (-1.0..=1.0).contains(&x), f64::asin),
        Builtin::Acos => domain_fn("acos", args, |x| (-1.0..=1.0).contains(&x), f64::acos),
        Builtin::Atan => real_fn("atan", args, f64::atan),
        Builtin::Sinh => real_fn("sinh", args, f64::sinh),
        Builtin::Cosh => real_fn("cosh", args, f64::cosh),
        Builtin::Tanh => real_fn("tanh", args, f64::tanh),
        Builtin::Sqrt => domain_fn("sqrt", args, |x| x >= 0.0, f64::sqrt),
        Builtin::Exp => real_fn("exp", args, f64::exp),
        Builtin::Log => log(args),
        Builtin::Log10 => domain_fn("log10", args, |x| x > 0.0, f64::log10),
        Builtin::Log2 => domain_fn("log2", args, |x| x > 0.0, f64::log2),
        Builtin::Floor => int_result_fn("floor", args, f64::floor),
        Builtin::Ceil => int_result_fn("ceil", args, f64::ceil),
        Builtin::Trunc => int_result_fn("trunc", args, f64::trunc),
        Builtin::Degrees => real_fn("degrees", args, f64::to_degrees),
        Builtin::Radians => real_fn("radians", args, f64::to_radians),
        Builtin::Factorial => factorial(args),
        Builtin::Gcd => gcd(args),

        Builtin::CSqrt => complex_fn("sqrt", args, Complex64::sqrt),
        Builtin::CExp => complex_fn("exp", args, Complex64::exp),
        Builtin::CLog => complex_fn("log", args, Complex64::ln),
        Builtin::CSin => complex_fn("sin", args, Complex64::sin),
        Builtin::CCos => complex_fn("cos", args, Complex64::cos),
        Builtin::CTan => complex_fn("tan", args, Complex64::tan),
        Builtin::Phase => {
            let [arg] = exactly("phase", args)?;
            let z = complex_arg("phase", &arg)?;
            Ok(Value::Float(z.arg()))
        }

        Builtin::Mean => mean(args),
        Builtin::Median => median(args),
        Builtin::Stdev => {
            let samples = spread("stdev", args)?;
            Ok(Value::Float(sample_variance(&samples).sqrt()))
        }
        Builtin::Variance => {
            let samples = spread("variance", args)?;
            Ok(Value::Float(sample_variance(&samples)))
        }

        #[cfg(feature = "random")]
        Builtin::Random => {
            let [] = exactly("random", args)?;
            Ok(Value::Float(rand::random::<f64>()))
        }
        #[cfg(feature = "random")]
        Builtin::Randint => randint(args),
        #[cfg(feature = "random")]
        Builtin::Uniform => {
            let [a, b] = exactly("uniform", args)?;
            let a = real("uniform", &a)?;
            let b = real("uniform", &b)?;
            Ok(Value::Float(a + (b - a) * rand::random::<f64>()))
        }
        #[cfg(feature = "random")]
        Builtin::Choice => choice(args),
    }
}

fn exactly<const N: usize>(name: &'static str, args: Vec<Value>) -> Result<[Value; N]> {
    let found = args.len();
    args.try_into().map_err(|_| Error::ArgCount {
        name: name.to_string(),
        expected: N,
        found,
    })
}

fn real(name: &'static str, arg: &Value) -> Result<f64> {
    arg.as_float()
        .ok_or(Error::MustBeReal(name, arg.type_name()))
}

fn complex_arg(name: &'static str, arg: &Value) -> Result<Complex64> {
    arg.as_complex()
        .ok_or(Error::MustBeNumber(name, arg.type_name()))
}

fn real_fn(name: &'static str, args: Vec<Value>, f: fn(f64) -> f64) -> Result<Value> {
    let [arg] = exactly(name, args)?;
    Ok(Value::Float(f(real(name, &arg)?)))
}

fn domain_fn(
    name: &'static str,
    args: Vec<Value>,
    in_domain: fn(f64) -> bool,
    f: fn(f64) -> f64,
) -> Result<Value> {
    let [arg] = exactly(name, args)?;
    let x = real(name, &arg)?;
    if !in_domain(x) {
        return Err(Error::DomainError);
    }
    Ok(Value::Float(f(x)))
}

fn int_result_fn(name: &'static str, args: Vec<Value>, f: fn(f64) -> f64) -> Result<Value> {
    let [arg] = exactly(name, args)?;
    float_to_int(f(real(name, &arg)?))
}

fn float_to_int(f: f64) -> Result<Value> {
    if f.is_finite() && f.abs() < i128::MAX as f64 {
        Ok(Value::Int(f as i128))
    } else {
        Err(Error::IntOverflow)
    }
}

fn abs(args: Vec<Value>) -> Result<Value> {
    let [arg] = exactly("abs", args)?;
    match arg {
        Value::Bool(b) => Ok(Value::Int(b as i128)),
        Value::Int(i) => i.checked_abs().map(Value::Int).ok_or(Error::IntOverflow),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::Complex(c) => Ok(Value::Float(c.norm())),
        _ => Err(Error::ValueError("bad operand type for abs()")),
    }
}

fn round(args: Vec<Value>) -> Result<Value> {
    match args.len() {
        1 => match &args[0] {
            Value::Bool(b) => Ok(Value::Int(*b as i128)),
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Float(f) => float_to_int(f.round_ties_even()),
            Value::Complex(_) => Err(Error::ValueError("type complex doesn't define round()")),
            _ => Err(Error::ValueError("bad operand type for round()")),
        },
        2 => {
            let digits = args[1]
                .as_int()
                .ok_or(Error::ValueError("round() ndigits must be an integer"))?;
            if let Some(i) = args[0].as_int() {
                if digits >= 0 {
                    return Ok(Value::Int(i));
                }
            }
            let x = real("round", &args[0])?;
            let digits = i32::try_from(digits).map_err(|_| Error::IntOverflow)?;
            if digits >= 0 {
                // round the decimal rendering, not a scaled binary value:
                // 2.675 stores as 2.67499…, so round(2.675, 2) must be 2.67
                let digits = digits.min(325) as usize;
                Ok(Value::Float(format!("{x:.digits$}").parse().unwrap_or(x)))
            } else {
                let scale = 10f64.powi(-digits);
                Ok(Value::Float((x / scale).round_ties_even() * scale))
            }
        }
        found => Err(Error::ArgCount {
            name: "round".to_string(),
            expected: 2,
            found,
        }),
    }
}

fn min_max(args: Vec<Value>, name: &'static str, want_min: bool) -> Result<Value> {
    let items = match args.len() {
        0 => {
            return Err(Error::ArgCount {
                name: name.to_string(),
                expected: 1,
                found: 0,
            })
        }
        1 => match args.into_iter().next() {
            Some(Value::List(items)) => items,
            Some(value) => return Err(Error::NotIterable(value.type_name())),
            None => Vec::new(),
        },
        _ => args,
    };

    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(Error::ValueError("arg is an empty sequence"));
    };
    for item in iter {
        let better = match ops::cmp(&item, &best)? {
            Some(ord) => {
                if want_min {
                    ord.is_lt()
                } else {
                    ord.is_gt()
                }
            }
            None => false,
        };
        if better {
            best = item;
        }
    }
    Ok(best)
}

fn sum(args: Vec<Value>) -> Result<Value> {
    let [arg] = exactly("sum", args)?;
    let Value::List(items) = arg else {
        return Err(Error::NotIterable(arg.type_name()));
    };
    let mut acc = Value::Int(0);
    for item in items {
        acc = ops::bin_op(BinOp::Add, acc, item)?;
    }
    Ok(acc)
}

fn len(args: Vec<Value>) -> Result<Value> {
    let [arg] = exactly("len", args)?;
    match arg {
        Value::List(items) => Ok(Value::Int(items.len() as i128)),
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i128)),
        value => Err(Error::NoLen(value.type_name())),
    }
}

fn range(args: Vec<Value>) -> Result<Value> {
    fn int_arg(arg: &Value) -> Result<i128> {
        arg.as_int()
            .ok_or(Error::ValueError("range() arguments must be integers"))
    }

    let (start, stop, step) = match args.len() {
        1 => (0, int_arg(&args[0])?, 1),
        2 => (int_arg(&args[0])?, int_arg(&args[1])?, 1),
        3 => (int_arg(&args[0])?, int_arg(&args[1])?, int_arg(&args[2])?),
        found => {
            return Err(Error::ArgCount {
                name: "range".to_string(),
                expected: 3,
                found,
            })
        }
    };
    if step == 0 {
        return Err(Error::ValueError("range() step argument must not be zero"));
    }

    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if items.len() as i128 >= MAX_RANGE_LEN {
            return Err(Error::ValueError("range() result is too large"));
        }
        items.push(Value::Int(i));
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::List(items))
}

fn to_int(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Ok(Value::Int(0));
    }
    let [arg] = exactly("int", args)?;
    match arg {
        Value::Bool(b) => Ok(Value::Int(b as i128)),
        Value::Int(i) => Ok(Value::Int(i)),
        Value::Float(f) => float_to_int(f.trunc()),
        Value::Str(s) => s
            .trim()
            .parse::<i128>()
            .map(Value::Int)
            .map_err(|_| Error::ValueError("invalid literal for int()")),
        Value::Complex(_) => Err(Error::ValueError("can't convert complex to int")),
        _ => Err(Error::ValueError(
            "int() argument must be a string or a number",
        )),
    }
}

fn to_float(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Ok(Value::Float(0.0));
    }
    let [arg] = exactly("float", args)?;
    match &arg {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| Error::ValueError("could not convert string to float")),
        Value::Complex(_) => Err(Error::ValueError("can't convert complex to float")),
        _ => Ok(Value::Float(real("float", &arg)?)),
    }
}

fn to_complex(args: Vec<Value>) -> Result<Value> {
    match args.len() {
        0 => Ok(Value::Complex(Complex64::new(0.0, 0.0))),
        1 => Ok(Value::Complex(complex_arg("complex", &args[0])?)),
        2 => {
            let re = complex_arg("complex", &args[0])?;
            let im = complex_arg("complex", &args[1])?;
            Ok(Value::Complex(re + im * Complex64::i()))
        }
        found => Err(Error::ArgCount {
            name: "complex".to_string(),
            expected: 2,
            found,
        }),
    }
}

fn to_list(args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Ok(Value::List(Vec::new()));
    }
    let [arg] = exactly("list", args)?;
    match arg {
        Value::List(items) => Ok(Value::List(items)),
        Value::Str(s) => Ok(Value::List(
            s.chars().map(|c| Value::Str(c.to_string())).collect(),
        )),
        value => Err(Error::NotIterable(value.type_name())),
    }
}

fn log(args: Vec<Value>) -> Result<Value> {
    match args.len() {
        1 => domain_fn("log", args, |x| x > 0.0, f64::ln),
        2 => {
            let x = real("log", &args[0])?;
            let base = real("log", &args[1])?;
            if x <= 0.0 || base <= 0.0 || base == 1.0 {
                return Err(Error::DomainError);
            }
            Ok(Value::Float(x.ln() / base.ln()))
        }
        found => Err(Error::ArgCount {
            name: "log".to_string(),
            expected: 2,
            found,
        }),
    }
}

fn factorial(args: Vec<Value>) -> Result<Value> {
    let [arg] = exactly("factorial", args)?;
    let n = arg
        .as_int()
        .ok_or(Error::ValueError("factorial() only accepts integral values"))?;
    if n < 0 {
        return Err(Error::ValueError(
            "factorial() not defined for negative values",
        ));
    }
    let mut result: i128 = 1;
    for i in 2..=n {
        result = result.checked_mul(i).ok_or(Error::IntOverflow)?;
    }
    Ok(Value::Int(result))
}

fn gcd(args: Vec<Value>) -> Result<Value> {
    let [a, b] = exactly("gcd", args)?;
    let to_int = |v: &Value| {
        v.as_int()
            .ok_or(Error::ValueError("gcd() requires integer arguments"))
    };
    let mut a = to_int(&a)?.checked_abs().ok_or(Error::IntOverflow)?;
    let mut b = to_int(&b)?.checked_abs().ok_or(Error::IntOverflow)?;
    while b != 0 {
        (a, b) = (b, a % b);
    }
    Ok(Value::Int(a))
}

fn complex_fn(
    name: &'static str,
    args: Vec<Value>,
    f: fn(Complex64) -> Complex64,
) -> Result<Value> {
    let [arg] = exactly(name, args)?;
    Ok(Value::Complex(f(complex_arg(name, &arg)?)))
}

fn data_points(name: &'static str, args: Vec<Value>) -> Result<Vec<f64>> {
    let [arg] = exactly(name, args)?;
    let Value::List(items) = arg else {
        return Err(Error::NotIterable(arg.type_name()));
    };
    if items.is_empty() {
        return Err(Error::ValueError("requires at least one data point"));
    }
    items
        .iter()
        .map(|v| v.as_float().ok_or(Error::MustBeNumber(name, v.type_name())))
        .collect()
}

fn mean(args: Vec<Value>) -> Result<Value> {
    let data = data_points("mean", args)?;
    Ok(Value::Float(data.iter().sum::<f64>() / data.len() as f64))
}

fn median(args: Vec<Value>) -> Result<Value> {
    let mut data = data_points("median", args)?;
    data.sort_by(f64::total_cmp);
    let n = data.len();
    let mid = n / 2;
    if n % 2 == 1 {
        Ok(Value::Float(data[mid]))
    } else {
        Ok(Value::Float((data[mid - 1] + data[mid]) / 2.0))
    }
}

fn spread(name: &'static str, args: Vec<Value>) -> Result<Vec<f64>> {
    let data = data_points(name, args)?;
    if data.len() < 2 {
        return Err(Error::ValueError("requires at least two data points"));
    }
    Ok(data)
}

fn sample_variance(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0)
}

#[cfg(feature = "random")]
fn randint(args: Vec<Value>) -> Result<Value> {
    let [a, b] = exactly("randint", args)?;
    let to_int = |v: &Value| {
        v.as_int()
            .ok_or(Error::ValueError("randint() requires integer arguments"))
    };
    let (a, b) = (to_int(&a)?, to_int(&b)?);
    if a > b {
        return Err(Error::ValueError("empty range for randint()"));
    }
    Ok(Value::Int(rand::thread_rng().gen_range(a..=b)))
}

#[cfg(feature = "random")]
fn choice(args: Vec<Value>) -> Result<Value> {
    let [arg] = exactly("choice", args)?;
    let Value::List(items) = arg else {
        return Err(Error::NotIterable(arg.type_name()));
    };
    if items.is_empty() {
        return Err(Error::ValueError("cannot choose from an empty sequence"));
    }
    let at = rand::thread_rng().gen_range(0..items.len());
    match items.get(at) {
        Some(value) => Ok(value.clone()),
        None => Err(Error::IndexOutOfRange),
    }
}
