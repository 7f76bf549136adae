use crate::namespace::Namespace;
use crate::{lex, parse, Error, Evaluator, Value};

fn eval(input: &str) -> Result<Value, Error> {
    let mut working = Namespace::new().working();
    let tokens = lex::lex(input)?;
    let expr = parse::parse_expr(&tokens)?;
    Evaluator::new(&mut working).eval_expr(&expr)
}

fn assert_val(expected: Value, input: &str) {
    match eval(input) {
        Ok(val) => assert_eq!(expected, val, "for input {input:?}"),
        Err(e) => panic!("{input:?} failed: {e:?}"),
    }
}

fn assert_err(expected: Error, input: &str) {
    match eval(input) {
        Ok(val) => panic!("expected error for {input:?}, found {val:?}"),
        Err(e) => assert_eq!(expected, e),
    }
}

#[test]
fn arithmetic() {
    assert_val(Value::Int(7), "1 + 2 * 3");
    assert_val(Value::Int(9), "(1 + 2) * 3");
    assert_val(Value::Float(3.5), "7 / 2");
    assert_val(Value::Int(3), "7 // 2");
    assert_val(Value::Int(8), "2 ** 3");
}

#[test]
fn true_division_of_ints_is_float() {
    assert_val(Value::Float(2.0), "4 / 2");
}

#[test]
fn floor_division_rounds_down() {
    assert_val(Value::Int(-4), "-7 // 2");
    assert_val(Value::Float(-4.0), "-7.0 // 2");
}

#[test]
fn modulo_follows_divisor_sign() {
    assert_val(Value::Int(1), "-8 % 3");
    assert_val(Value::Int(-2), "8 % -5");
    assert_val(Value::Float(1.5), "-8.5 % 2.5");
}

#[test]
fn divide_by_zero() {
    assert_err(Error::DivideByZero, "1 / 0");
    assert_err(Error::DivideByZero, "1 // 0");
    assert_err(Error::DivideByZero, "1 % 0");
    assert_err(Error::DivideByZero, "1.0 / 0.0");
}

#[test]
fn int_overflow_is_reported() {
    assert_err(Error::IntOverflow, "2 ** 127");
}

#[test]
fn negative_exponent_goes_float() {
    assert_val(Value::Float(0.125), "2 ** -3");
}

#[test]
fn negative_base_fractional_exponent_goes_complex() {
    match eval("(-8) ** 0.5") {
        Ok(Value::Complex(z)) => {
            assert!(z.re.abs() < 1e-9);
            assert!((z.im - 8f64.sqrt()).abs() < 1e-9);
        }
        other => panic!("expected complex, found {other:?}"),
    }
}

#[test]
fn complex_arithmetic() {
    assert_val(
        Value::Complex(num_complex::Complex64::new(3.0, 4.0)),
        "3 + 4j",
    );
    assert_val(
        Value::Complex(num_complex::Complex64::new(0.0, 10.0)),
        "2j * 5",
    );
}

#[test]
fn comparisons() {
    assert_val(Value::Bool(true), "1 < 2");
    assert_val(Value::Bool(true), "2.0 == 2");
    assert_val(Value::Bool(true), "'abc' < 'abd'");
    assert_val(Value::Bool(false), "1 > 2");
}

#[test]
fn complex_is_not_ordered() {
    assert_err(Error::NotComparable("complex", "int"), "2j < 3");
}

#[test]
fn logic_returns_operand() {
    assert_val(Value::Int(2), "0 or 2");
    assert_val(Value::Int(0), "0 and 2");
    assert_val(Value::Bool(false), "not 1");
}

#[test]
fn string_ops() {
    assert_val(Value::Str("ab".into()), "'a' + 'b'");
    assert_val(Value::Str("b".into()), "'abc'[1]");
    assert_val(Value::Str("c".into()), "'abc'[-1]");
}

#[test]
fn list_ops() {
    assert_val(Value::Int(2), "[1, 2, 3][1]");
    assert_val(Value::Int(3), "len([1, 2, 3])");
    assert_val(Value::Int(6), "sum([1, 2, 3])");
    assert_err(Error::IndexOutOfRange, "[1, 2][5]");
}

#[test]
fn undefined_name() {
    assert_err(Error::UndefinedName("nope".into()), "nope + 1");
}

#[test]
fn module_attrs() {
    assert_val(Value::Float(2.0), "math.sqrt(4)");
    assert_val(Value::Int(120), "math.factorial(5)");
    assert_val(Value::Int(3), "math.gcd(6, 9)");
    assert_err(
        Error::NoModuleAttr("math", "nope".into()),
        "math.nope(1)",
    );
}

#[test]
fn math_domain_errors() {
    assert_err(Error::DomainError, "math.sqrt(-1)");
    assert_err(Error::DomainError, "math.log(0)");
    assert_err(Error::DomainError, "math.asin(2)");
}

#[test]
fn cmath_handles_negatives() {
    match eval("cmath.sqrt(-1)") {
        Ok(Value::Complex(z)) => {
            assert_eq!(z.re, 0.0);
            assert_eq!(z.im, 1.0);
        }
        other => panic!("expected complex, found {other:?}"),
    }
}

#[test]
fn statistics() {
    assert_val(Value::Float(2.0), "statistics.mean([1, 2, 3])");
    assert_val(Value::Float(2.5), "statistics.median([1, 2, 3, 4])");
    assert_val(Value::Float(1.0), "statistics.stdev([1, 2, 3])");
}

#[test]
fn conversions() {
    assert_val(Value::Int(3), "int(3.9)");
    assert_val(Value::Int(-3), "int(-3.9)");
    assert_val(Value::Int(42), "int('42')");
    assert_val(Value::Float(2.5), "float('2.5')");
    assert_val(Value::Str("3.5".into()), "str(3.5)");
    assert_val(Value::Bool(true), "bool(7)");
}

#[test]
fn builtin_arg_count() {
    assert_err(
        Error::ArgCount {
            name: "len".into(),
            expected: 1,
            found: 2,
        },
        "len([1], [2])",
    );
}

#[test]
fn not_callable() {
    assert_err(Error::NotCallable("int"), "3(4)");
}

#[test]
fn range_builds_lists() {
    assert_val(
        Value::List(vec![Value::Int(0), Value::Int(1), Value::Int(2)]),
        "range(3)",
    );
    assert_val(
        Value::List(vec![Value::Int(4), Value::Int(2)]),
        "range(4, 0, -2)",
    );
}

#[test]
fn rounding_is_half_even() {
    assert_val(Value::Int(0), "round(0.5)");
    assert_val(Value::Int(2), "round(1.5)");
    // 2.675 is really 2.67499..., same as in cpython
    assert_val(Value::Float(2.67), "round(2.675, 2)");
    assert_val(Value::Float(0.12), "round(0.125, 2)");
}

#[test]
fn rounding_to_negative_digits() {
    assert_val(Value::Float(1200.0), "round(1234.5, -2)");
    assert_val(Value::Float(0.0), "round(47.0, -3)");
}

fn exec(input: &str) -> Result<crate::Bindings, Error> {
    let mut working = Namespace::new().working();
    let block = parse::parse_block(input)?;
    Evaluator::new(&mut working).exec_block(&block)?;
    Ok(working)
}

fn assert_binding(input: &str, name: &str, expected: Value) {
    match exec(input) {
        Ok(working) => assert_eq!(working.get(name), Some(&expected), "for input {input:?}"),
        Err(e) => panic!("{input:?} failed: {e:?}"),
    }
}

#[test]
fn if_branches() {
    assert_binding("x = -5\nif x < 0:\n    y = 1\nelse:\n    y = 2", "y", Value::Int(1));
    assert_binding(
        "x = 0\nif x < 0:\n    y = 1\nelif x == 0:\n    y = 2\nelse:\n    y = 3",
        "y",
        Value::Int(2),
    );
}

#[test]
fn while_loop() {
    assert_binding(
        "total = 0\ni = 0\nwhile i < 5:\n    total = total + i\n    i = i + 1",
        "total",
        Value::Int(10),
    );
}

#[test]
fn for_loop_with_break_and_continue() {
    assert_binding(
        "total = 0\nfor i in range(10):\n    if i == 3:\n        continue\n    if i == 6:\n        break\n    total = total + i",
        "total",
        Value::Int(0 + 1 + 2 + 4 + 5),
    );
}

#[test]
fn function_call_and_return() {
    assert_binding(
        "def double(x):\n    return x * 2\ny = double(21)",
        "y",
        Value::Int(42),
    );
}

#[test]
fn function_without_return_yields_none() {
    assert_binding("def f(x):\n    y = x\nr = f(1)", "r", Value::None);
}

#[test]
fn function_locals_stay_local() {
    let working = exec("def f():\n    local = 1\n    return local\nx = f()").unwrap();
    assert!(!working.contains_key("local"));
    assert_eq!(working.get("x"), Some(&Value::Int(1)));
}

#[test]
fn recursion() {
    assert_binding(
        "def fac(n):\n    if n <= 1:\n        return 1\n    return n * fac(n - 1)\nx = fac(10)",
        "x",
        Value::Int(3628800),
    );
}

#[test]
fn deep_but_bounded_recursion_succeeds() {
    assert_binding(
        "def count(n):\n    if n <= 0:\n        return 0\n    return 1 + count(n - 1)\nx = count(50)",
        "x",
        Value::Int(50),
    );
}

#[test]
fn runaway_recursion_is_an_error() {
    assert_eq!(
        exec("def f():\n    return f()\nf()").unwrap_err(),
        Error::RecursionLimit,
    );
}

#[test]
fn wrong_arity_of_user_function() {
    assert_eq!(
        exec("def f(a, b):\n    return a\nf(1)").unwrap_err(),
        Error::ArgCount {
            name: "f".into(),
            expected: 2,
            found: 1,
        },
    );
}

#[test]
fn return_at_document_level_is_an_error() {
    assert_eq!(
        exec("if True:\n    return 1").unwrap_err(),
        Error::ReturnOutsideFunction,
    );
}
