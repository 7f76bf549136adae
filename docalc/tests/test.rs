use docalc::{Calculator, EngineSink, Value, VarStore};

fn results(input: &str) -> Vec<(usize, String)> {
    docalc::recalculate(input)
        .line_results
        .into_iter()
        .collect()
}

#[test]
fn assignments_accumulate() {
    let input = "x = 2\ny = x + 3\ny";
    assert_eq!(
        results(input),
        [
            (0, "x = 2".to_string()),
            (1, "y = 5".to_string()),
            (2, "5".to_string()),
        ],
    );
}

#[test]
fn expressions_annotate_their_line() {
    assert_eq!(results("1 + 1"), [(0, "2".to_string())]);
    assert_eq!(results("\n\n1 + 1"), [(2, "2".to_string())]);
}

#[test]
fn floats_use_significant_digits() {
    assert_eq!(results("1.0 / 3.0"), [(0, "0.333333".to_string())]);
    assert_eq!(results("1e12"), [(0, "1.000000e+12".to_string())]);
}

#[test]
fn precision_is_configurable() {
    let recalc = Calculator::with_precision(3).recalculate("1.0 / 3.0");
    assert_eq!(
        recalc.line_results.into_iter().collect::<Vec<_>>(),
        [(0, "0.333".to_string())],
    );
}

#[test]
fn complex_results() {
    assert_eq!(results("(3 + 4j) * 1"), [(0, "(3+4j)".to_string())]);
    assert_eq!(results("5j"), [(0, "5j".to_string())]);
    assert_eq!(results("(2 + 3j) - 3j + 3"), [(0, "5".to_string())]);
}

#[test]
fn comments_and_blank_lines_produce_nothing() {
    assert_eq!(results("# just a note"), []);
    assert_eq!(results("   \n\n# note\n"), []);
}

#[test]
fn def_block_reports_trailing_call() {
    let input = "def double(x):\n    return x * 2\ndouble(3)";
    assert_eq!(results(input), [(0, "6".to_string())]);
}

#[test]
fn block_without_trailing_expression_is_executed() {
    let input = "if True:\n    x = 1";
    assert_eq!(results(input), [(0, "executed".to_string())]);
}

#[test]
fn comments_inside_a_block_do_not_split_it() {
    let input = "def double(x):\n    # doubles:\n    return x * 2\ndouble(3)\n1 + 1";
    assert_eq!(
        results(input),
        [(0, "6".to_string()), (4, "2".to_string())],
    );
}

#[test]
fn inline_suite_does_not_swallow_the_next_line() {
    let recalc = docalc::recalculate("if True: y = 1\nz = 2");
    assert_eq!(recalc.line_results.get(&1), Some(&"z = 2".to_string()));
}

#[test]
fn block_bindings_survive_into_later_lines() {
    let input = "total = 0\nfor i in range(5):\n    total = total + i\ntotal * 10";
    let recalc = docalc::recalculate(input);
    assert_eq!(recalc.line_results.get(&0), Some(&"total = 0".to_string()));
    // the for block swallows `total * 10` as its result expression
    assert_eq!(recalc.line_results.get(&1), Some(&"100".to_string()));
    assert_eq!(recalc.vars.get("total"), Some(&Value::Int(10)));
}

#[test]
fn errors_annotate_the_line() {
    assert_eq!(
        results("x + 1"),
        [(0, "Error: name 'x' is not defined".to_string())],
    );
    assert_eq!(
        results("1 / 0"),
        [(0, "Error: division by zero".to_string())],
    );
}

#[test]
fn error_does_not_stop_later_lines() {
    let input = "broken +\nx = 1";
    let recalc = docalc::recalculate(input);
    assert!(recalc.line_results[&0].starts_with("Error: "));
    assert_eq!(recalc.line_results.get(&1), Some(&"x = 1".to_string()));
}

#[test]
fn unsupported_statements_are_rejected() {
    let recalc = docalc::recalculate("import os");
    assert_eq!(
        recalc.line_results.get(&0),
        Some(&"Error: 'import' statements are not supported (line 1)".to_string()),
    );
}

#[test]
fn failed_lines_are_listed_structurally() {
    let recalc = docalc::recalculate("x = 'Error: nope'\nx\n1/0");
    assert_eq!(recalc.errors, [2]);
    // a string result that merely looks like an error annotation is not one
    assert_eq!(recalc.line_results.get(&1), Some(&"Error: nope".to_string()));
}

#[test]
fn none_results_are_silent() {
    assert_eq!(results("None"), []);
}

#[test]
fn vars_keep_definition_order() {
    let recalc = docalc::recalculate("b = 1\na = 2\nb = 3");
    let names: Vec<&str> = recalc.vars.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(recalc.vars.get("b"), Some(&Value::Int(3)));
}

#[test]
fn builtins_are_not_inspector_variables() {
    let recalc = docalc::recalculate("x = abs(-2)");
    let names: Vec<&str> = recalc.vars.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["x"]);
}

#[test]
fn recalculation_passes_are_independent() {
    let mut calculator = Calculator::new();
    calculator.recalculate("x = 1");
    let recalc = calculator.recalculate("x + 1");
    assert_eq!(
        recalc.line_results.get(&0),
        Some(&"Error: name 'x' is not defined".to_string()),
    );
}

#[test]
fn edited_variable_overrides_the_builtin_table() {
    let mut calculator = Calculator::new();
    let recalc = calculator
        .edit_variable("x", "2 + 3", "y = x * 2")
        .unwrap();
    assert_eq!(recalc.line_results.get(&0), Some(&"y = 10".to_string()));
    assert_eq!(recalc.vars.get("x"), Some(&Value::Int(5)));
}

#[test]
fn document_assignment_wins_over_override() {
    let mut calculator = Calculator::new();
    let recalc = calculator.edit_variable("x", "100", "x = 1\nx").unwrap();
    assert_eq!(recalc.line_results.get(&1), Some(&"1".to_string()));
}

#[test]
fn deleted_variable_leaves_dependents_undefined() {
    let mut calculator = Calculator::new();
    calculator.edit_variable("x", "5", "y = x + 1").unwrap();
    let recalc = calculator.delete_variable("x", "y = x + 1");
    assert_eq!(
        recalc.line_results.get(&0),
        Some(&"Error: name 'x' is not defined".to_string()),
    );
    assert_eq!(recalc.vars.get("x"), None);
}

#[test]
fn clear_variables_drops_all_overrides() {
    let mut calculator = Calculator::new();
    calculator.edit_variable("a", "1", "").unwrap();
    calculator.edit_variable("b", "2", "").unwrap();
    calculator.clear_variables();
    let recalc = calculator.recalculate("a");
    assert_eq!(
        recalc.line_results.get(&0),
        Some(&"Error: name 'a' is not defined".to_string()),
    );
}

#[test]
fn invalid_override_expression_is_an_error() {
    let mut calculator = Calculator::new();
    assert!(calculator.edit_variable("x", "1 +", "").is_err());
}

#[test]
fn history_records_successful_calculations() {
    let mut calculator = Calculator::new();
    calculator.recalculate("x = 2\nbroken +\nx * 3");
    let entries: Vec<(&str, &str)> = calculator
        .history
        .iter()
        .map(|c| (c.source.as_str(), c.result.as_str()))
        .collect();
    assert_eq!(entries, [("x = 2", "2"), ("x * 3", "6")]);

    calculator.clear_history();
    assert!(calculator.history.is_empty());
}

#[derive(Default)]
struct Recorder {
    calculations: Vec<(String, String)>,
    var_count: Option<usize>,
}

impl EngineSink for Recorder {
    fn calculation(&mut self, source: &str, result: &str) {
        self.calculations.push((source.to_string(), result.to_string()));
    }

    fn variables(&mut self, vars: &VarStore) {
        self.var_count = Some(vars.len());
    }
}

#[test]
fn sink_sees_every_calculation_and_the_final_vars() {
    let mut calculator = Calculator::new();
    let mut sink = Recorder::default();
    calculator.recalculate_with("x = 2\ny = x + 3\ny", &mut sink);
    assert_eq!(
        sink.calculations,
        [
            ("x = 2".to_string(), "2".to_string()),
            ("y = x + 3".to_string(), "5".to_string()),
            ("y".to_string(), "5".to_string()),
        ],
    );
    assert_eq!(sink.var_count, Some(2));
}

#[cfg(not(feature = "random"))]
#[test]
fn absent_random_module_is_an_undefined_name() {
    assert_eq!(
        results("random.random()"),
        [(0, "Error: name 'random' is not defined".to_string())],
    );
}

#[test]
fn shadowing_a_builtin_is_allowed_for_one_pass() {
    let recalc = docalc::recalculate("abs = 3\nabs + 1");
    assert_eq!(recalc.line_results.get(&1), Some(&"4".to_string()));
    // but it never leaks into the inspector-provided base of the next pass
    let next = docalc::recalculate("abs(-2)");
    assert_eq!(next.line_results.get(&0), Some(&"2".to_string()));
}
