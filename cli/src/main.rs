use std::env::args;
use std::io::{self, Write as _};
use std::process::ExitCode;
use std::time::{Duration, SystemTime};

use docalc::{Calculator, Debouncer, Recalculation};
use docalc_derive::EnumFromStr;

use display::*;
pub use style::*;

mod display;
mod json;
mod style;

#[derive(Clone, Copy, Default, PartialEq, Eq, EnumFromStr)]
#[docalc(rename_all = "snake_case")]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Default)]
struct Args {
    format: OutputFormat,
    precision: Option<usize>,
}

enum Action {
    Run(String),
    Watch(String),
    Interactive,
    Help,
    Version,
}

macro_rules! error {
    ($pat:expr $(,$args:expr),*) => {{
        bprintln!(LRed, $pat $(,$args)*);
        println!();
        help();
        return ExitCode::FAILURE;
    }}
}

fn main() -> ExitCode {
    let mut action = None;
    let mut user_args = Args::default();

    let mut args = args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "i" | "interactive" => action = Some(Action::Interactive),
            "r" | "run" => {
                let Some(path) = args.next() else {
                    error!("Path not specified");
                };
                action = Some(Action::Run(path));
            }
            "w" | "watch" => {
                let Some(path) = args.next() else {
                    error!("Path not specified");
                };
                action = Some(Action::Watch(path));
            }
            "-h" | "--help" => action = Some(Action::Help),
            "-v" | "--version" => action = Some(Action::Version),
            "-f" | "--format" => match args.next() {
                Some(f) => match f.parse::<OutputFormat>() {
                    Ok(f) => user_args.format = f,
                    Err(_) => {
                        error!("Invalid --format: `{f}`, possible values are [pretty, json]");
                    }
                },
                None => {
                    error!("Missing --format, possible values are [pretty, json]");
                }
            },
            "-p" | "--precision" => match args.next().map(|p| p.parse::<usize>()) {
                Some(Ok(p)) if p > 0 => user_args.precision = Some(p),
                Some(_) => {
                    error!("Invalid --precision, expected a positive integer");
                }
                None => {
                    error!("Missing --precision, expected a positive integer");
                }
            },
            "--" => {
                let items = args.collect::<Vec<_>>();
                return eval_args(&user_args, &items);
            }
            a => {
                error!("Invalid argument: `{a}`");
            }
        }
    }

    match action {
        Some(Action::Run(path)) => eval_path(&user_args, &path),
        Some(Action::Watch(path)) => watch_path(&user_args, &path),
        Some(Action::Interactive) => repl(&user_args),
        Some(Action::Help) => {
            help();
            ExitCode::SUCCESS
        }
        Some(Action::Version) => {
            version();
            ExitCode::SUCCESS
        }
        None => {
            bprintln!(LRed, "Missing arguments\n");
            help();
            ExitCode::FAILURE
        }
    }
}

fn new_calculator(args: &Args) -> Calculator {
    match args.precision {
        Some(p) => Calculator::with_precision(p),
        None => Calculator::new(),
    }
}

fn eval_path(args: &Args, path: &str) -> ExitCode {
    match std::fs::read_to_string(path) {
        Ok(input) => {
            let mut calculator = new_calculator(args);
            let recalc = calculator.recalculate(&input);
            print_recalc(args, &input, &recalc, calculator.precision);
            if has_errors(&recalc) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(_) => {
            bprintln!(LRed, "Error reading file: {path}");
            ExitCode::FAILURE
        }
    }
}

/// Re-evaluates the file whenever it changes, after the edit debounce
/// window has passed.
fn watch_path(args: &Args, path: &str) -> ExitCode {
    let mut calculator = new_calculator(args);
    let mut debouncer = Debouncer::default();
    let mut last_modified = modified_at(path);

    match std::fs::read_to_string(path) {
        Ok(input) => {
            let recalc = calculator.recalculate(&input);
            print_recalc(args, &input, &recalc, calculator.precision);
        }
        Err(_) => {
            bprintln!(LRed, "Error reading file: {path}");
            return ExitCode::FAILURE;
        }
    }

    loop {
        std::thread::sleep(Duration::from_millis(50));

        let modified = modified_at(path);
        if modified != last_modified {
            last_modified = modified;
            debouncer.edit();
        }
        if !debouncer.poll() {
            continue;
        }

        let Ok(input) = std::fs::read_to_string(path) else {
            bprintln!(LRed, "Error reading file: {path}");
            continue;
        };
        print!("\x1b[1;1H\x1B[2J");
        let recalc = calculator.recalculate(&input);
        print_recalc(args, &input, &recalc, calculator.precision);
    }
}

fn modified_at(path: &str) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn eval_args(args: &Args, items: &[String]) -> ExitCode {
    // every trailing argument is one document line
    let input = items.join("\n");
    let mut calculator = new_calculator(args);
    let recalc = calculator.recalculate(&input);
    print_recalc(args, &input, &recalc, calculator.precision);
    if has_errors(&recalc) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn repl(args: &Args) -> ExitCode {
    bprintln!(LBlue, "Started interactive repl");

    let mut output = io::stdout();
    let input = io::stdin();
    let mut buf = String::new();
    let mut document: Vec<String> = Vec::new();
    let mut block = String::new();
    let mut calculator = new_calculator(args);
    let mut last = Recalculation::default();
    loop {
        buf.clear();

        if block.is_empty() {
            bprint!(LBlue, " >> ");
        } else {
            bprint!(LBlue, " .. ");
        }
        let _ = output.flush();
        if input.read_line(&mut buf).is_err() {
            bprintln!(LRed, "Error reading line");
            continue;
        }
        let line = buf.trim_end_matches(['\n', '\r']);

        if !block.is_empty() {
            // an empty line closes the buffered block
            if line.trim().is_empty() {
                document.push(std::mem::take(&mut block));
            } else {
                block.push('\n');
                block.push_str(line);
                continue;
            }
        } else {
            match line.trim() {
                "exit" => break,
                "clear" => {
                    print!("\x1b[1;1H\x1B[2J");
                    let _ = output.flush();
                    continue;
                }
                "reset" => {
                    document.clear();
                    calculator.clear_history();
                    calculator.clear_variables();
                    last = Recalculation::default();
                    print!("\x1b[1;1H\x1B[2J");
                    let _ = output.flush();
                    continue;
                }
                "vars" => {
                    print!("{}", vars(&last.vars, calculator.precision));
                    continue;
                }
                "" => continue,
                trimmed => {
                    if let Some(name) = trimmed.strip_prefix("del ") {
                        let source = document.join("\n");
                        last = calculator.delete_variable(name.trim(), &source);
                        continue;
                    }
                    if let Some(rest) = trimmed.strip_prefix("set ") {
                        set_command(&mut calculator, &document, &mut last, rest);
                        continue;
                    }
                    if trimmed.ends_with(':') {
                        block = line.to_string();
                        continue;
                    }
                    document.push(line.to_string());
                }
            }
        }

        let source = document.join("\n");
        last = calculator.recalculate(&source);
        if let Some((line, result)) = last.line_results.iter().next_back() {
            if last.errors.contains(line) {
                cprintln!(LRed, "{result}");
            } else {
                cprintln!(DGreen, "{result}");
            }
        }
    }

    ExitCode::SUCCESS
}

fn set_command(
    calculator: &mut Calculator,
    document: &[String],
    last: &mut Recalculation,
    rest: &str,
) {
    let Some((name, expr)) = rest.trim().split_once(' ') else {
        cprintln!(LRed, "Usage: set <name> <expression>");
        return;
    };
    let source = document.join("\n");
    match calculator.edit_variable(name, expr, &source) {
        Ok(recalc) => *last = recalc,
        Err(e) => cprintln!(LRed, "Error: {e}"),
    }
}

fn print_recalc(args: &Args, input: &str, recalc: &Recalculation, precision: usize) {
    match args.format {
        OutputFormat::Pretty => {
            print!("{}", annotated(input, recalc));
        }
        OutputFormat::Json => {
            let units = docalc::segment(input);
            let mut buf = String::new();
            let _ = json::write_recalculation(&mut buf, &units, recalc, precision);
            println!("{buf}");
        }
    }
}

fn has_errors(recalc: &Recalculation) -> bool {
    !recalc.errors.is_empty()
}

fn help() {
    println!(
        "\
{green}docalc{esc} {vers}
{authors}
{desc}

{yellow}USAGE:{esc}
    docalc [COMMAND][OPTIONS] [-- DOCUMENT]

{yellow}DOCUMENT:{esc}
    A document that will be evaluated

{yellow}COMMANDS:{esc}
    {green}r{esc}, {green}run   <file>{esc}            Evaluate a file
    {green}w{esc}, {green}watch <file>{esc}            Re-evaluate a file whenever it changes
    {green}i{esc}, {green}interactive{esc}             Start an interactive repl

{yellow}OPTIONS:{esc}
    {green}-h{esc}, {green}--help{esc}                 Show this help message
    {green}-v{esc}, {green}--version{esc}              Print the version
    {green}-f{esc}, {green}--format <format>{esc}      The output format [default: \"pretty\"] [possible values: \"pretty\", \"json\"]
    {green}-p{esc}, {green}--precision <digits>{esc}   Significant digits used for floats [default: 6]
",
        vers = env!("CARGO_PKG_VERSION"),
        authors = env!("CARGO_PKG_AUTHORS"),
        desc = env!("CARGO_PKG_DESCRIPTION"),
        green = DGreen::NORMAL,
        yellow = DYellow::NORMAL,
        esc = ANSI_ESC,
    );
}

fn version() {
    println!(env!("CARGO_PKG_VERSION"));
}
