use assert_cmd::Command;

fn docalc() -> Command {
    Command::cargo_bin("docalc").unwrap()
}

#[test]
fn annotated_document() {
    let output = "\
x = 2      \x1b[32m# x = 2\x1b[0m
y = x + 3  \x1b[32m# y = 5\x1b[0m
y          \x1b[32m# 5\x1b[0m
";

    docalc()
        .args(["--", "x = 2", "y = x + 3", "y"])
        .assert()
        .success()
        .stdout(output);
}

#[test]
fn error_annotation_fails() {
    let output = "1 / 0  \x1b[91m# Error: division by zero\x1b[0m\n";

    docalc()
        .args(["--", "1 / 0"])
        .assert()
        .failure()
        .stdout(output);
}

#[test]
fn def_block_annotates_its_first_line() {
    let output = "\
def double(x):  \x1b[32m# 6\x1b[0m
    return x * 2
double(3)
";

    docalc()
        .args(["--", "def double(x):", "    return x * 2", "double(3)"])
        .assert()
        .success()
        .stdout(output);
}

#[test]
fn string_result_spelling_error_is_not_a_failure() {
    // only units that actually failed flip the exit code and turn red
    let output = "'Error: ' + 'x'  \x1b[32m# Error: x\x1b[0m\n";

    docalc()
        .args(["--", "'Error: ' + 'x'"])
        .assert()
        .success()
        .stdout(output);
}

#[test]
fn precision_option() {
    let output = "1.0 / 3.0  \x1b[32m# 0.333\x1b[0m\n";

    docalc()
        .args(["-p", "3", "--", "1.0 / 3.0"])
        .assert()
        .success()
        .stdout(output);
}

#[test]
fn json_format() {
    let output = concat!(
        "{\"units\":[",
        "{\"line\":0,\"kind\":\"single_line\",\"source\":\"x = 1\",\"result\":\"x = 1\",\"error\":false}",
        "],\"vars\":[",
        "{\"name\":\"x\",\"value\":\"1\"}",
        "]}\n",
    );

    docalc()
        .args(["-f", "json", "--", "x = 1"])
        .assert()
        .success()
        .stdout(output);
}

#[test]
fn invalid_argument() {
    docalc().arg("--frobnicate").assert().failure();
}
