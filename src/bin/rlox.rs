use std::io;
use std::path::PathBuf;
use std::process;

use rlox_lexer::console_diagnostic_consumer;
use rlox_lexer::driver::{Driver, ExitStatus};

const HELP: &str = "\
    rlox - tokenize Lox source code

    USAGE:
        rlox [--quiet] [--no-color] [SCRIPT]

    OPTIONS:
        --quiet             Suppress the token listing, only report errors.
        --no-color          Don't highlight errors.

    ARGS:
        SCRIPT              The Lox file to tokenize. Without it, an interactive prompt reads
                            one line at a time until end of input.
";

const USAGE: &str = "Usage: rlox [--quiet] [--no-color] [SCRIPT]";

#[derive(Debug, Eq, PartialEq)]
struct RloxArgs {
    quiet: bool,
    color: bool,
    script: Option<PathBuf>,
}

fn main() {
    let args = match parse_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            eprintln!("{}", USAGE);
            process::exit(ExitStatus::Usage.code());
        }
    };

    let mut driver =
        Driver::new(io::stdout(), console_diagnostic_consumer(args.color)).quiet(args.quiet);

    let status = match &args.script {
        Some(path) => driver.run_file(path),
        None => driver
            .run_prompt(io::stdin().lock())
            .map(|()| ExitStatus::Success),
    };

    let status = status.unwrap_or_else(|e| {
        eprintln!("Error: {}.", e);
        ExitStatus::IoError
    });

    process::exit(status.code());
}

fn parse_args() -> Result<RloxArgs, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(ExitStatus::Success.code());
    }

    let args = RloxArgs {
        quiet: pargs.contains("--quiet"),
        color: !pargs.contains("--no-color"),
        script: pargs.opt_free_from_str()?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Error: unused arguments left: {:?}.", remaining);
        eprintln!("{}", USAGE);
        process::exit(ExitStatus::Usage.code());
    }

    Ok(args)
}
