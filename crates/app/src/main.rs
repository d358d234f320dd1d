mod render;
mod shell;

use std::fmt;
use std::io::Write as _;
use std::time::Duration;

use services::{Clock, StudyOptions, StudyServices};
use study_core::builtin;
use study_core::model::Catalog;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::shell::Shell;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidAutosave { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidAutosave { raw } => {
                write!(f, "invalid --autosave-ms value: {raw} (expected milliseconds > 0)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- study   [--db <sqlite_url>] [--catalog <json>] [--autosave-ms <ms>]");
    eprintln!("  cargo run -p app -- outline [--catalog <json>]");
    eprintln!();
    eprintln!("Defaults for study:");
    eprintln!("  --db sqlite://study.sqlite3");
    eprintln!("  --catalog <bundled HAREC catalog>");
    eprintln!("  --autosave-ms <stored accessibility preference>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_CATALOG, STUDY_AUTOSAVE_MS, STUDY_REDUCE_MOTION");
    eprintln!("  STUDY_AI_API_KEY, STUDY_AI_BASE_URL, STUDY_AI_MODEL");
    eprintln!("  RUST_LOG (default: warn)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Study,
    Outline,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "study" => Some(Self::Study),
            "outline" => Some(Self::Outline),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    catalog_path: Option<String>,
    autosave: Option<Duration>,
    prefers_reduced_motion: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("STUDY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://study.sqlite3".into(), normalize_sqlite_url);
        let mut catalog_path = std::env::var("STUDY_CATALOG")
            .ok()
            .filter(|path| !path.trim().is_empty());
        let mut autosave = match std::env::var("STUDY_AUTOSAVE_MS") {
            Ok(raw) => Some(parse_autosave(raw)?),
            Err(_) => None,
        };
        let prefers_reduced_motion = std::env::var("STUDY_REDUCE_MOTION")
            .is_ok_and(|value| matches!(value.trim(), "1" | "true" | "yes" | "on"));

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => {
                    catalog_path = Some(require_value(args, "--catalog")?);
                }
                "--autosave-ms" => {
                    let value = require_value(args, "--autosave-ms")?;
                    autosave = Some(parse_autosave(value)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            catalog_path,
            autosave,
            prefers_reduced_motion,
        })
    }

    fn load_catalog(&self) -> Result<Catalog, Box<dyn std::error::Error>> {
        match &self.catalog_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(Catalog::from_json(&raw)?)
            }
            None => Ok(builtin::catalog()?),
        }
    }
}

fn parse_autosave(raw: String) -> Result<Duration, ArgsError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ArgsError::InvalidAutosave { raw }),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:"
        || trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn print_outline(catalog: &Catalog) {
    for module in catalog.modules() {
        println!("{} ({})", module.title(), module.key());
        for id in module.topic_ids() {
            let Some(topic) = catalog.resolve(&id) else {
                continue;
            };
            let quiz = if topic.has_quiz() {
                format!("  [{} questions]", topic.questions().len())
            } else {
                String::new()
            };
            println!("  {id}  {}{quiz}", topic.title());
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means `study`.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Study,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Study,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let catalog = parsed.load_catalog()?;

    match cmd {
        Command::Outline => {
            print_outline(&catalog);
            Ok(())
        }
        Command::Study => {
            ensure_db_dir(&parsed.db_url)?;
            let options = StudyOptions {
                autosave_delay: parsed.autosave,
                prefers_reduced_motion: parsed.prefers_reduced_motion,
            };
            let services =
                StudyServices::new_sqlite(&parsed.db_url, Clock::system(), catalog, options)
                    .await?;
            let guide = match builtin::licensing_guide() {
                Ok(guide) => Some(guide),
                Err(err) => {
                    log::warn!("licensing guide unavailable: {err}");
                    None
                }
            };
            log::info!("study session started (db={})", parsed.db_url);
            repl(Shell::new(services, guide)).await
        }
    }
}

async fn repl(mut shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}\n\nType `help` for commands.", shell.execute("home").await.text);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let reply = shell.execute(&line).await;
        if !reply.text.is_empty() {
            println!("{}", reply.text);
        }
        if reply.quit {
            break;
        }
    }
    Ok(())
}

/// The pool creates the database file itself; only its directory has to
/// exist beforehand.
fn ensure_db_dir(db_url: &str) -> std::io::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = std::path::Path::new(path.split('?').next().unwrap_or(path));
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
