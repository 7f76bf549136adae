use num_complex::Complex64;

use crate::Value;

pub const DEFAULT_PRECISION: usize = 6;
const MAX_DISPLAY_LEN: usize = 200;
const LIST_PREVIEW_LEN: usize = 3;
const LIST_PREVIEW_THRESHOLD: usize = 10;

/// Renders a value for a line annotation or the variable inspector.
///
/// `precision` is the number of significant digits used for floats.
pub fn format_value(value: &Value, precision: usize) -> String {
    match value {
        // bool before the numeric branches, a bool is also numeric
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f, precision),
        Value::Complex(c) => format_complex(*c, precision),
        Value::List(items) => format_list(items, precision),
        value => truncated(value.to_string()),
    }
}

/// Elements are rendered recursively so they honor the configured precision.
fn format_list(items: &[Value], precision: usize) -> String {
    if items.len() > LIST_PREVIEW_THRESHOLD {
        let preview: Vec<String> = items
            .iter()
            .take(LIST_PREVIEW_LEN)
            .map(|v| format_value(v, precision))
            .collect();
        format!("[{}, ... ({} items)]", preview.join(", "), items.len())
    } else {
        let rendered: Vec<String> = items
            .iter()
            .map(|v| format_value(v, precision))
            .collect();
        truncated(format!("[{}]", rendered.join(", ")))
    }
}

/// Floats far outside [1e-4, 1e10] switch to scientific notation.
pub fn format_float(f: f64, precision: usize) -> String {
    if f != 0.0 && (f.abs() > 1e10 || f.abs() < 1e-4) {
        scientific(f, precision)
    } else {
        general(f, precision)
    }
}

/// `%e` style with a signed, at least two digit exponent.
fn scientific(f: f64, precision: usize) -> String {
    if !f.is_finite() {
        return nonfinite(f);
    }
    let s = format!("{f:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => format!("{mantissa}e{exp:+03}"),
            Err(_) => s,
        },
        None => s,
    }
}

/// `%g` style: `precision` significant digits, trailing zeros stripped,
/// scientific notation for very large or very small magnitudes.
fn general(f: f64, precision: usize) -> String {
    if !f.is_finite() {
        return nonfinite(f);
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let precision = precision.max(1);
    let digits = precision - 1;
    let probe = format!("{f:.digits$e}");
    let exp = probe
        .split_once('e')
        .and_then(|(_, e)| e.parse::<i32>().ok())
        .unwrap_or(0);
    if exp < -4 || exp >= precision as i32 {
        let mantissa = probe.split_once('e').map_or(probe.as_str(), |(m, _)| m);
        format!("{}e{exp:+03}", trim_zeros(mantissa))
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{f:.decimals$}")).to_string()
    }
}

fn format_complex(c: Complex64, precision: usize) -> String {
    if c.im == 0.0 {
        format_float(c.re, precision)
    } else if c.re == 0.0 {
        format!("{}j", general(c.im, precision))
    } else if c.im.is_sign_negative() {
        format!(
            "({}-{}j)",
            general(c.re, precision),
            general(-c.im, precision),
        )
    } else {
        format!(
            "({}+{}j)",
            general(c.re, precision),
            general(c.im, precision),
        )
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn nonfinite(f: f64) -> String {
    if f.is_nan() {
        "nan"
    } else if f > 0.0 {
        "inf"
    } else {
        "-inf"
    }
    .to_string()
}

fn truncated(s: String) -> String {
    if s.chars().count() > MAX_DISPLAY_LEN {
        let mut out: String = s.chars().take(MAX_DISPLAY_LEN).collect();
        out.push_str("...");
        out
    } else {
        s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ints_are_exact() {
        assert_eq!(format_value(&Value::Int(12345678901234567890), 6), "12345678901234567890");
    }

    #[test]
    fn bools_are_not_numbers() {
        assert_eq!(format_value(&Value::Bool(true), 6), "True");
        assert_eq!(format_value(&Value::Bool(false), 6), "False");
    }

    #[test]
    fn float_general() {
        assert_eq!(format_float(1.0 / 3.0, 6), "0.333333");
        assert_eq!(format_float(0.5, 6), "0.5");
        assert_eq!(format_float(1234.5, 6), "1234.5");
        assert_eq!(format_float(2.0, 6), "2");
    }

    #[test]
    fn float_precision() {
        assert_eq!(format_float(1.0 / 3.0, 3), "0.333");
        assert_eq!(format_float(1.0 / 3.0, 12), "0.333333333333");
    }

    #[test]
    fn float_scientific_large() {
        assert_eq!(format_float(1e12, 6), "1.000000e+12");
        assert_eq!(format_float(-2.5e11, 6), "-2.500000e+11");
    }

    #[test]
    fn float_scientific_small() {
        assert_eq!(format_float(1e-5, 6), "1.000000e-05");
        assert_eq!(format_float(0.0001, 6), "0.0001");
    }

    #[test]
    fn float_boundary_stays_general() {
        // exactly 1e10 is not "> 1e10"
        assert_eq!(format_float(1e10, 6), "1e+10");
    }

    #[test]
    fn zero_and_nonfinite() {
        assert_eq!(format_float(0.0, 6), "0");
        assert_eq!(format_float(f64::INFINITY, 6), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY, 6), "-inf");
        assert_eq!(format_float(f64::NAN, 6), "nan");
    }

    #[test]
    fn complex_values() {
        assert_eq!(
            format_value(&Value::Complex(Complex64::new(3.0, 4.0)), 6),
            "(3+4j)",
        );
        assert_eq!(
            format_value(&Value::Complex(Complex64::new(0.0, 5.0)), 6),
            "5j",
        );
        assert_eq!(
            format_value(&Value::Complex(Complex64::new(5.0, 0.0)), 6),
            "5",
        );
        assert_eq!(
            format_value(&Value::Complex(Complex64::new(1.5, -2.5)), 6),
            "(1.5-2.5j)",
        );
    }

    #[test]
    fn short_list() {
        let list = Value::List(vec![Value::Int(1), Value::Float(2.5), Value::Str("a".into())]);
        assert_eq!(format_value(&list, 6), "[1, 2.5, a]");
    }

    #[test]
    fn list_elements_honor_precision() {
        let list = Value::List(vec![Value::Float(1.0 / 3.0), Value::Int(2)]);
        assert_eq!(format_value(&list, 6), "[0.333333, 2]");
        assert_eq!(format_value(&list, 3), "[0.333, 2]");
    }

    #[test]
    fn long_list_preview() {
        let list = Value::List((0..12).map(Value::Int).collect());
        assert_eq!(format_value(&list, 6), "[0, 1, 2, ... (12 items)]");

        let floats = Value::List((0..12).map(|_| Value::Float(1.0 / 3.0)).collect());
        assert_eq!(
            format_value(&floats, 6),
            "[0.333333, 0.333333, 0.333333, ... (12 items)]",
        );
    }

    #[test]
    fn long_string_truncated() {
        let s = Value::Str("x".repeat(250));
        let formatted = format_value(&s, 6);
        assert_eq!(formatted.chars().count(), 203);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn none_formats() {
        assert_eq!(format_value(&Value::None, 6), "None");
    }
}
