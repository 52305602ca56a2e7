//! Purpose: `varstore` CLI entry point.
//! Role: Binary crate root; parses args, applies command batches, emits JSON lines on stdout.
//! Invariants: Each batch command yields exactly one JSON object on stdout.
//! Invariants: Fatal errors (usage, unreadable input) are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;
use varstore::api::{Error, ErrorKind, Store, to_exit_code};

mod batch;

use batch::{BatchOutcome, apply_line};

const LOG_ENV: &str = "VARSTORE_LOG";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "varstore",
    version,
    about = "Apply batches of commands to an in-memory variable store",
    long_about = r#"Apply batches of commands to an in-memory variable store.

Each input line is one command; the outcome of every command is printed
as one JSON object on stdout.

Commands:
  make <name> <const|dynamic> <type> [literal]
  mod <name> <type> [literal]
  remove <name>
  type <name>
  get <name>
  list

Types: number, boolean, string, array, object, null.
Blank lines and lines starting with `#` are ignored."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Tracing filter for stderr diagnostics (default: $VARSTORE_LOG, else warn)"
    )]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Apply a batch of store commands from a file or stdin")]
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct ApplyArgs {
    #[arg(help = "Command file to read (default: stdin; `-` also means stdin)")]
    file: Option<PathBuf>,
    #[arg(long, help = "Stop at the first command that fails")]
    stop_on_error: bool,
}

fn main() {
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run<I>(args: I) -> Result<RunOutcome, Error>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `varstore --help`."));
            }
        },
    };

    init_tracing(cli.log.as_deref())?;

    match cli.command {
        Command::Apply(args) => apply(args),
    }
}

fn apply(args: ApplyArgs) -> Result<RunOutcome, Error> {
    let input = read_input(args.file.as_ref())?;
    let mut store = Store::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut last_failure = None;

    for (index, line) in input.lines().enumerate() {
        let Some(outcome) = apply_line(&mut store, index + 1, line) else {
            continue;
        };
        write_outcome(&mut out, &outcome)?;
        if let Some(kind) = outcome.error_kind() {
            last_failure = Some(kind);
            if args.stop_on_error {
                break;
            }
        }
    }

    tracing::debug!(variables = store.len(), "batch applied");
    Ok(match last_failure {
        Some(kind) => RunOutcome::with_code(to_exit_code(kind)),
        None => RunOutcome::ok(),
    })
}

fn read_input(file: Option<&PathBuf>) -> Result<String, Error> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(input)
        }
    }
}

fn write_outcome(out: &mut impl Write, outcome: &BatchOutcome) -> Result<(), Error> {
    let line = serde_json::to_string(outcome).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode outcome")
            .with_source(err)
    })?;
    writeln!(out, "{line}").map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write stdout")
            .with_source(err)
    })
}

fn init_tracing(filter: Option<&str>) -> Result<(), Error> {
    let env_filter = match filter {
        Some(filter) => EnvFilter::try_new(filter).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid --log filter `{filter}`"))
                .with_source(err)
        })?,
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

fn emit_error(err: &Error) {
    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(err.kind().as_str()));
    inner.insert(
        "message".to_string(),
        json!(err.message().unwrap_or(err.kind().as_str())),
    );
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
