//! pg-query-reduce CLI
//!
//! Entry point for the command-line tool.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

use pg_query_reduce::{Config, PgOracle, Progress, RuleTable, check_connection, run_reduce};

#[derive(Parser, Debug)]
#[command(name = "pg-query-reduce")]
#[command(version)]
#[command(
    about = "Minimizes error-reproducing SQL queries against a PostgreSQL server",
    long_about = None
)]
struct Args {
    /// SQL file to reduce; reads stdin when absent or "-"
    file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "pg-query-reduce.toml")]
    config: PathBuf,

    /// Connection string of the database to probe (key=value or URL form).
    /// Use a sacrificial server; candidates are executed as-is.
    #[arg(short, long, env = "PGQR_DATABASE")]
    database: Option<String>,

    /// Per-statement timeout for probe queries, e.g. 500ms
    #[arg(long)]
    timeout: Option<String>,

    /// Compare SQLSTATE codes instead of first error-message lines
    #[arg(long)]
    sqlstate: bool,

    /// Print each candidate query with its verdict
    #[arg(short, long)]
    verbose: bool,

    /// Additionally print paths, replacement values, and the parse tree
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::from_file(&args.config).context("Failed to load configuration")?
    } else {
        Config::default()
    };

    // Command-line flags override file values
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    config.use_sqlstate |= args.sqlstate;
    config.verbose |= args.verbose;
    config.debug |= args.debug;
    config.validate().context("Invalid configuration")?;

    let query = read_query(args.file.as_deref())?;
    if query.trim().is_empty() {
        anyhow::bail!("empty input: nothing to reduce");
    }

    // Surface syntax errors before requiring a reachable database.
    pg_query::parse(&query).context("Failed to parse input query")?;

    let rules = RuleTable::builtin().context("Built-in rule table failed validation")?;

    check_connection(&config.database)
        .context("Startup health check failed; is the database reachable?")?;

    let mut oracle = PgOracle::new(&config.database, &config.timeout, config.use_sqlstate)?;
    let progress = Progress::new(config.verbose, config.debug);

    let report = run_reduce(&query, &mut oracle, &rules, &progress)?;

    println!("{}", report.query);
    eprintln!(
        "{} probes, {} duplicates skipped, {} reductions",
        report.probes, report.duplicates, report.accepted
    );

    Ok(())
}

fn read_query(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut query = String::new();
            std::io::stdin()
                .read_to_string(&mut query)
                .context("Failed to read stdin")?;
            Ok(query)
        }
    }
}
