mod command;
mod error;

use btm_compute::{env::CatalogKind, Environment};
use clap::Parser;
use command::Command;
use env_logger::Env;
use log::debug;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{
    fs::File,
    io::{self, BufReader, IsTerminal, Read},
    path::{Path, PathBuf},
};

/// Parses and runs one line of input, printing the result or the error.
fn run_line(input: &str, env: &mut Environment) {
    let input = input.trim();
    if input.is_empty() || input.starts_with('#') {
        return;
    }

    match Command::parse(input).and_then(|command| command.run(env)) {
        Ok(output) => println!("{}", output),
        Err(err) => err.report_to_stderr(),
    }
}

/// Runs every line of a script.
fn run_script(input: &str, env: &mut Environment) {
    for line in input.lines() {
        run_line(line, env);
    }
}

/// Interactive shell for the BTM algebra engine.
///
/// Runs a script file if one is given, the lines piped to stdin if it is not a terminal, and an
/// interactive session otherwise.
#[derive(Debug, Parser)]
#[command(name = "btm", version)]
struct Cli {
    /// Seed for the random generator of the environment. Decimal seeds are used as they are;
    /// other text is hashed
    #[arg(long)]
    seed: Option<String>,

    /// Script file to execute
    script: Option<PathBuf>,
}

fn read_file(filename: &Path) -> io::Result<String> {
    let mut file = BufReader::new(File::open(filename)?);
    let mut input = String::new();
    file.read_to_string(&mut input)?;
    Ok(input)
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    let mut env = match &args.seed {
        Some(seed) => Environment::with_seed_str(seed),
        None => Environment::new(),
    };
    debug!("environment ready with {} reduction rules", env.catalog(CatalogKind::Reductions).len());

    if let Some(filename) = args.script {
        // run script file
        match read_file(&filename) {
            Ok(input) => run_script(&input, &mut env),
            Err(err) => {
                eprintln!("{}: {}", filename.display(), err);
                std::process::exit(1);
            },
        }
    } else if !io::stdin().is_terminal() {
        // read script from stdin
        let mut input = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut input) {
            eprintln!("{}", err);
            std::process::exit(1);
        }
        run_script(&input, &mut env);
    } else {
        // run the repl / interactive mode
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(err) => {
                eprintln!("{}", err);
                std::process::exit(1);
            },
        };

        fn process_line(rl: &mut DefaultEditor, env: &mut Environment) -> Result<(), ReadlineError> {
            let input = rl.readline("> ")?;
            if input.trim().is_empty() {
                return Ok(());
            }

            rl.add_history_entry(&input)?;

            run_line(&input, env);
            Ok(())
        }

        loop {
            if let Err(err) = process_line(&mut rl, &mut env) {
                match err {
                    ReadlineError::Eof | ReadlineError::Interrupted => (),
                    _ => eprintln!("{}", err),
                }
                break;
            }
        }
    }
}
