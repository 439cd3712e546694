mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod postfix;
mod runner;
mod value;
mod visual;

use clap::{Arg, Command};
use std::io::{self, BufRead};
use terminal_size::terminal_size;

fn main() {
    let matches = Command::new("tcalc")
        .about("Calculate arithmetic expressions over numbers and times (43:21 or 65:43:21)")
        .arg(
            Arg::new("expression")
                .help("The expression to calculate")
                .value_name("EXPRESSION")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("visualize")
                .short('v')
                .long("visualize")
                .help("Step through the evaluation in postfix notation, one keypress at a time")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("full")
                .long("full")
                .help("Print the result with a label instead of the bare value")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let expression = matches
        .get_one::<String>("expression")
        .expect("expression is a required argument");

    let ok = if matches.get_flag("visualize") {
        let width = terminal_size().map(|(w, _)| w.0 as usize).unwrap_or(80);
        let stdin = io::stdin();
        runner::run_visual(expression, None, width, || {
            // Block until the user acknowledges the step
            let mut line = String::new();
            let _ = stdin.lock().read_line(&mut line);
        })
    } else {
        runner::run(expression, None, matches.get_flag("full"))
    };

    if !ok {
        std::process::exit(1);
    }
}
