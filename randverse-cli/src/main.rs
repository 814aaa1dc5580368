use std::fs;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use rand::rngs::StdRng;
use rand::SeedableRng;
use randverse_core::{VerseError, VersePicker};
use randverse_corpus::DirCorpus;
use randverse_tty::{write_categories, write_invalid_category, VersePrinter, VerseSpan};
use randverse_web::AppState;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "randverse",
    version,
    about = "Print or serve a random verse from a compressed corpus"
)]
struct Args {
    /// Category to narrow the selection to (e.g. ot, nt, gospels)
    #[arg(short = 'n', long = "narrow")]
    narrow: Option<String>,

    /// Highlight line and verse numbers
    #[arg(short = 'c', long = "color")]
    color: bool,

    /// Keep printing until the end of the selected book
    #[arg(short = 'r', long = "remaining")]
    remaining: bool,

    /// Seed for a reproducible selection
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Directory holding index.txt and the compressed books
    #[arg(long = "corpus", global = true)]
    corpus: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve random verses as HTML pages
    Serve {
        /// Port to listen on
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// List the accepted category keys and the books they cover
    Categories,
    /// Build a corpus directory from a TOML manifest of plain-text books
    Pack {
        manifest: PathBuf,
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let project_dirs = ProjectDirs::from("net", "randverse", "randverse");

    let default_level = match args.command {
        Some(Commands::Serve { .. }) => "info",
        _ => "warn",
    };
    let _log_guard = init_logging(project_dirs.as_ref(), default_level)?;
    let config = Config::load(args.config.as_deref(), project_dirs.as_ref())?;

    match args.command {
        Some(Commands::Pack {
            ref manifest,
            ref out_dir,
        }) => {
            let report = randverse_corpus::pack(manifest, out_dir)
                .with_context(|| format!("failed to pack {:?}", manifest))?;
            println!(
                "packed {} books ({} lines) into {}",
                report.books.len(),
                report.total_lines(),
                report.out_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Serve { port }) => {
            let picker = open_picker(&args, &config, project_dirs.as_ref())?;
            let state = match args.seed {
                Some(seed) => AppState::with_rng(picker, StdRng::seed_from_u64(seed)),
                None => AppState::new(picker),
            };
            let addr = SocketAddr::from(([0, 0, 0, 0], config.port(port)));
            randverse_web::serve(addr, Arc::new(state))
                .await
                .with_context(|| format!("server on {addr} failed"))?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Categories) => {
            let picker = open_picker(&args, &config, project_dirs.as_ref())?;
            write_categories(&mut io::stdout().lock(), &picker.list_categories())?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let picker = open_picker(&args, &config, project_dirs.as_ref())?;
            print_random(&args, &config, &picker)
        }
    }
}

fn open_picker(args: &Args, config: &Config, dirs: Option<&ProjectDirs>) -> Result<VersePicker> {
    let root = config.corpus_dir(args.corpus.clone(), dirs)?;
    let corpus = Arc::new(DirCorpus::new(&root));
    let picker = VersePicker::open(corpus, config.categories())
        .with_context(|| format!("failed to load corpus from {:?}", root))?;
    info!(
        root = ?root,
        books = picker.catalog().books().len(),
        "corpus loaded"
    );
    Ok(picker)
}

fn print_random(args: &Args, config: &Config, picker: &VersePicker) -> Result<ExitCode> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let messages = picker.messages();
    let span = if args.remaining || config.remaining {
        VerseSpan::Remaining
    } else {
        VerseSpan::Single
    };

    let result = picker
        .select_verse(args.narrow.as_deref(), &mut rng)
        .map_err(anyhow::Error::from)
        .and_then(|mut pick| {
            let mut printer = VersePrinter::new(io::stdout().lock(), args.color || config.color);
            printer.print_pick(&mut pick, span)
        });

    let err = match result {
        Ok(_) => return Ok(ExitCode::SUCCESS),
        Err(err) => err,
    };
    let Some(verse_err) = err.downcast_ref::<VerseError>() else {
        return Err(err);
    };

    info!(error = %verse_err, "verse selection failed");
    let mut stderr = io::stderr().lock();
    match verse_err {
        VerseError::InvalidCategory { key } => {
            write_invalid_category(&mut stderr, messages, key, &picker.list_categories())?;
        }
        other => writeln!(stderr, "{}", messages.for_kind(other.kind()))?,
    }
    Ok(ExitCode::FAILURE)
}

fn init_logging(
    project_dirs: Option<&ProjectDirs>,
    default_level: &str,
) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    let log_dir = project_dirs
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .filter(|dir| fs::create_dir_all(dir).is_ok());
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::never(dir, "randverse.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
