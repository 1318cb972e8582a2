use clap::{CommandFactory, Parser};
use gebaut_cli::cli::Cli;
use gebaut_cli::session::Session;
use gebaut_core::config::{Config, load_config_with_fallback};
use gebaut_core::error::AppError;
use gebaut_core::logging::init_logging_from_env;
use log::{info, warn};
use std::io::{self, BufRead};

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            // `""` is a real (empty) argument, used to clear optional fields.
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
            }
            quoted = false;
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(session: &mut Session, cli: Cli) -> Result<(), AppError> {
    session.apply_overrides(&cli.config_override)?;
    let output = session.execute(cli.command, cli.json)?;
    println!("{output}");
    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let expanded = session.config().expand_alias(line);
        let line = expanded.as_deref().unwrap_or(line);

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("gebaut".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(session, cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    info!(
        "event=session_end tasks_discarded={}",
        session.store().len()
    );
    Ok(())
}

fn load_config() -> Config {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!("event=config_fallback error={}", err);
    }
    loaded.config
}

fn main() {
    if let Err(err) = init_logging_from_env() {
        eprintln!("WARN: {err}");
    }

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        let mut session = Session::new(load_config());
        if let Err(err) = run_interactive(&mut session) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if !err.use_stderr() {
                // --help and --version
                let _ = err.print();
                return;
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let mut session = Session::new(load_config());
    if let Err(err) = run_command(&mut session, cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
