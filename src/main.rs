//! rulecheck - Assert stylesheet declarations from the command line

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rulecheck::harness::{Runner, SnapshotSurface, Suite};
use rulecheck::{Context, DeclarationQuery, StylesheetSource};

#[derive(Parser)]
#[command(name = "rulecheck")]
#[command(version, about = "Assert stylesheet declarations per selector and media context", long_about = None)]
#[command(after_help = "EXAMPLES:
    rulecheck assert -s style.css .hero height --accept 70vh --conditional
    rulecheck run suite.json
    rulecheck run suite.json --snapshot pages.json")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a single declaration
    Assert {
        /// Stylesheet to query
        #[arg(short, long, value_name = "CSS")]
        stylesheet: PathBuf,

        /// Selector as written in the stylesheet
        selector: String,

        /// Property name
        property: String,

        /// Accepted value (repeatable)
        #[arg(short, long = "accept", value_name = "VALUE", required = true)]
        accepted: Vec<String>,

        /// Only look inside @media blocks
        #[arg(short, long)]
        conditional: bool,
    },

    /// Run a check suite
    Run {
        /// Suite file (JSON)
        #[arg(value_name = "SUITE")]
        suite: PathBuf,

        /// Stylesheet to use instead of the suite's
        #[arg(short, long, value_name = "CSS")]
        stylesheet: Option<PathBuf>,

        /// Page snapshots for computed and attribute checks
        #[arg(long, value_name = "JSON")]
        snapshot: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Assert {
            stylesheet,
            selector,
            property,
            accepted,
            conditional,
        } => {
            let query = DeclarationQuery::new(selector, property)
                .accepting(accepted)
                .in_context(Context::from_required(conditional));
            assert_one(&stylesheet, &query)
        }
        Command::Run {
            suite,
            stylesheet,
            snapshot,
        } => run_suite(&suite, stylesheet, snapshot.as_deref()),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn assert_one(path: &Path, query: &DeclarationQuery) -> Result<bool, String> {
    let source = StylesheetSource::file(path);
    match source.assert(query) {
        Ok(decl) => {
            println!(
                "PASS  {} {{ {}: {} }} at {}:{}",
                query.selector,
                decl.property,
                decl.value,
                path.display(),
                decl.location
            );
            Ok(true)
        }
        Err(e) => {
            println!("FAIL  [{}] {e}", e.kind());
            Ok(false)
        }
    }
}

fn run_suite(
    path: &Path,
    stylesheet: Option<PathBuf>,
    snapshot: Option<&Path>,
) -> Result<bool, String> {
    let suite = Suite::load(path).map_err(|e| e.to_string())?;
    let surface = snapshot
        .map(SnapshotSurface::load)
        .transpose()
        .map_err(|e| e.to_string())?;

    let mut runner = Runner::new(&suite);
    if let Some(css) = stylesheet {
        runner = runner.with_stylesheet(StylesheetSource::file(css));
    }
    if let Some(surface) = &surface {
        runner = runner.with_surface(surface);
    } else if suite.needs_surface() {
        log::warn!("no snapshot given; computed and attribute checks will be skipped");
    }

    let report = runner.run();
    println!("{report}");
    Ok(report.is_success())
}
