//! The query oracle: executes candidate queries and classifies the result.
//!
//! Every probe uses a fresh connection with a server-side statement timeout,
//! so a runaway candidate costs one timeout, not the run. Connect failures
//! are treated as transient and retried forever; reachability at startup is
//! the caller's job via [`check_connection`].

use postgres::NoTls;
use std::fmt;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("invalid connection string: {0}")]
    ConnString(postgres::Error),

    #[error("database is unreachable: {0}")]
    Unreachable(postgres::Error),
}

/// The observable result of executing a query: either it ran, or it failed
/// with a deterministic tag. Two executions count as "the same" exactly
/// when their outcomes are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    NoError,
    Error(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoError => f.write_str("no error"),
            Outcome::Error(tag) => f.write_str(tag),
        }
    }
}

/// The seam the reduction engine probes through. Production code uses
/// [`PgOracle`]; tests substitute deterministic fakes.
pub trait Oracle {
    fn probe(&mut self, query: &str) -> Outcome;
}

/// Build the error tag for a database error: the SQLSTATE code, or the
/// first line of the error message, depending on configuration.
pub fn error_tag(code: &str, message: &str, use_sqlstate: bool) -> String {
    if use_sqlstate {
        code.to_string()
    } else {
        message.lines().next().unwrap_or_default().to_string()
    }
}

/// Oracle backed by a live PostgreSQL server.
pub struct PgOracle {
    config: postgres::Config,
    timeout: String,
    use_sqlstate: bool,
}

impl PgOracle {
    pub fn new(
        database: &str,
        timeout: &str,
        use_sqlstate: bool,
    ) -> Result<PgOracle, OracleError> {
        Ok(PgOracle {
            config: pg_config(database)?,
            timeout: timeout.to_string(),
            use_sqlstate,
        })
    }

    /// Connect and apply the statement timeout, retrying on failure.
    /// Connection establishment problems are transient by definition here;
    /// a permanently missing server is caught by [`check_connection`]
    /// before any reduction starts.
    fn connect(&self) -> postgres::Client {
        loop {
            match self.config.connect(NoTls) {
                Ok(mut client) => {
                    let set_timeout =
                        format!("SET statement_timeout = '{}'", self.timeout);
                    match client.batch_execute(&set_timeout) {
                        Ok(()) => return client,
                        Err(err) => {
                            eprintln!("waiting for connection startup: {err}");
                        }
                    }
                }
                Err(err) => {
                    eprintln!("waiting for connection startup: {err}");
                }
            }
            thread::sleep(Duration::from_secs(1));
        }
    }
}

impl Oracle for PgOracle {
    fn probe(&mut self, query: &str) -> Outcome {
        let mut client = self.connect();

        // batch_execute uses the simple query protocol, so multi-statement
        // scripts run as-is. Timeouts surface as SQLSTATE 57014 and compare
        // like any other deterministic error.
        let outcome = match client.batch_execute(query) {
            Ok(()) => Outcome::NoError,
            Err(err) => match err.as_db_error() {
                Some(db) => Outcome::Error(error_tag(
                    db.code().code(),
                    db.message(),
                    self.use_sqlstate,
                )),
                None => {
                    eprintln!("oracle: non-database error: {err}");
                    Outcome::Error(err.to_string())
                }
            },
        };

        // The connection is closed on drop, best effort.
        outcome
    }
}

/// Startup health check: connect once and run an empty SELECT. Unlike probe
/// connections, a failure here is fatal.
pub fn check_connection(database: &str) -> Result<(), OracleError> {
    let config = pg_config(database)?;
    let mut client = config.connect(NoTls).map_err(OracleError::Unreachable)?;
    client
        .batch_execute("SELECT")
        .map_err(OracleError::Unreachable)?;
    Ok(())
}

fn pg_config(database: &str) -> Result<postgres::Config, OracleError> {
    let mut config: postgres::Config =
        database.parse().map_err(OracleError::ConnString)?;
    config.application_name("pg-query-reduce");
    Ok(config)
}
