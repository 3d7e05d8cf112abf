//! CLI command implementations
//!
//! `run` serves one request per stdin line against a single database for
//! the lifetime of the process. Request failures are reported as error
//! responses and do not stop the loop; only I/O failures do.
//!
//! stdout carries responses only. Log lines go to stderr.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::document::DynamicDocument;
use crate::observability::{log_event, Event, LogSink, Logger};
use crate::orm::{connect_with_logger, Orm, OrmConfig, OrmError, OrmResult};
use crate::store::{CallContext, DocumentStore, ReadOptions};

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_lines, write_error, write_response};

/// Error code for request lines that are not valid requests
const BAD_REQUEST_CODE: &str = "CORM_CLI_BAD_REQUEST";

/// One operation request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Save {
        #[serde(rename = "type")]
        type_name: String,
        doc: Value,
    },
    Read {
        id: String,
        #[serde(default)]
        options: ReadOptions,
    },
    Update {
        #[serde(rename = "type")]
        type_name: String,
        doc: Value,
    },
    Delete {
        id: String,
        #[serde(default)]
        rev: Option<String>,
    },
    Metrics,
}

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Run { config } => {
            let (config, logger) = load_config(&config)?;
            let ctx = CallContext::background();
            let orm = connect_with_logger(&ctx, &config, logger)?;

            let stdin = io::stdin();
            let mut stdout = io::stdout();
            serve(&orm, &ctx, stdin.lock(), &mut stdout)?;
            Ok(())
        }
        Command::Config { config } => {
            let (config, _) = load_config(&config)?;
            print_config(&config, &mut io::stdout())
        }
    }
}

/// Load the config and build the stderr logger it asks for
fn load_config(path: &Path) -> CliResult<(OrmConfig, Logger)> {
    let config = OrmConfig::load(path)?;
    let logger = Logger::new(config.log_level).with_sink(LogSink::Stderr);
    log_event(
        &logger,
        Event::ConfigLoaded,
        &[("path", path.display().to_string().as_str())],
    );
    Ok((config, logger))
}

/// Write the effective configuration as a JSON response
pub fn print_config<W: Write>(config: &OrmConfig, output: &mut W) -> CliResult<()> {
    write_response(output, serde_json::to_value(config)?)
}

/// Execute every request line from `input`, returning the number handled
pub fn serve<S, R, W>(orm: &Orm<S>, ctx: &CallContext, input: R, output: &mut W) -> CliResult<usize>
where
    S: DocumentStore,
    R: BufRead,
    W: Write,
{
    let mut handled = 0;
    for line in read_lines(input) {
        let line = line?;
        handled += 1;

        let request: Request = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                write_error(output, BAD_REQUEST_CODE, &e.to_string())?;
                continue;
            }
        };

        match execute(orm, ctx, request) {
            Ok(data) => write_response(output, data)?,
            Err(e) => write_error(output, e.code(), &e.to_string())?,
        }
    }
    Ok(handled)
}

/// Execute a single request
pub fn execute<S: DocumentStore>(
    orm: &Orm<S>,
    ctx: &CallContext,
    request: Request,
) -> OrmResult<Value> {
    match request {
        Request::Save { type_name, doc } => {
            let mut record = DynamicDocument::from_value(type_name, doc)?.with_reserved_defaults();
            let saved = orm.save(ctx, &mut record)?;
            to_json(&saved)
        }
        Request::Read { id, options } => {
            let (doc, _row): (Value, _) = orm.read(ctx, &id, &options)?;
            Ok(doc)
        }
        Request::Update { type_name, doc } => {
            let mut record = DynamicDocument::from_value(type_name, doc)?.with_reserved_defaults();
            let updated = orm.update(ctx, &mut record)?;
            to_json(&updated)
        }
        Request::Delete { id, rev } => {
            let tombstone = orm.delete(ctx, &id, rev.as_deref())?;
            Ok(json!({ "id": id, "rev": tombstone }))
        }
        Request::Metrics => to_json(&orm.metrics()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> OrmResult<Value> {
    serde_json::to_value(value).map_err(OrmError::Encode)
}
