use std::{env, process::ExitCode};

use tap::Interpreter;

/// The command-line surface: a single positional argument holding the Tap
/// source text itself (not a file path). Standard output is the printed
/// form of the final value, a newline, then the full error report.
fn main() -> ExitCode {
    let mut args = env::args();
    args.next(); // program name

    let Some(source) = args.next() else {
        eprintln!("usage: tap <source-text>");
        return ExitCode::from(1);
    };

    let mut interp = Interpreter::new();
    let (value, errors) = tap::run_with(&mut interp, &source);

    println!("{}", tap::format::printed_form(&value, &interp.types));
    print!("{errors}");

    if interp.is_resource_exhausted() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
