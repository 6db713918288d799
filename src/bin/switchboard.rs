//! Serves the bundled capabilities over standard input and output.
//!
//! Usage:
//!
//! ```text
//! switchboard [config-path]
//! ```
//!
//! Requests and responses are newline-delimited JSON-RPC frames on stdout.
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use camino::Utf8PathBuf;
use std::env;
use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;
use switchboard::capabilities;
use switchboard::capability::adapters::JsonRpcDispatcher;
use switchboard::capability::ports::Dispatcher;
use switchboard::capability::services::Registry;
use switchboard::config::ServerConfig;
use thiserror::Error;
use tokio::io::{BufReader, stdin, stdout};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
enum UsageError {
    #[error("argument is not valid UTF-8")]
    NonUtf8,
    #[error("unexpected extra argument: {0}")]
    Extra(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(error = %failure, "switchboard stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BoxError> {
    let config_path = parse_args(env::args_os().skip(1).map(OsString::into_string))?;
    let config = ServerConfig::load(config_path.as_deref())?;
    info!(
        name = %config.server_name,
        version = %config.server_version,
        prefix = config.prefix.as_deref().unwrap_or(""),
        "starting switchboard"
    );

    let registry = Registry::new(config.registry_config());
    capabilities::bootstrap(&registry)?;

    let dispatcher = Arc::new(JsonRpcDispatcher::new(&config));
    registry.bind_dispatcher(Arc::clone(&dispatcher) as Arc<dyn Dispatcher>)?;

    dispatcher.serve(BufReader::new(stdin()), stdout()).await?;
    Ok(())
}

fn parse_args<I>(mut args: I) -> Result<Option<Utf8PathBuf>, UsageError>
where
    I: Iterator<Item = Result<String, OsString>>,
{
    let path = args
        .next()
        .transpose()
        .map_err(|_| UsageError::NonUtf8)?
        .map(Utf8PathBuf::from);
    if let Some(extra) = args.next() {
        let shown = extra.unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
        return Err(UsageError::Extra(shown));
    }
    Ok(path)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
