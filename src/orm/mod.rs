//! Object-document mapping
//!
//! `Orm` reconciles caller records with store documents:
//! - `save`: create, with an explicit or store-generated id
//! - `read` / `read_into`: fetch and decode
//! - `update`: write a new revision
//! - `delete`: tombstone, optionally discovering the current revision
//!
//! `connect` builds an `Orm` from an `OrmConfig`; `connect_with_logger`
//! also picks where its events are written.

mod config;
mod errors;
mod reconciler;

pub use config::{ConfigError, ConfigResult, OrmConfig, UpdatePolicy};
pub use errors::{OrmError, OrmResult};
pub use reconciler::{DocumentRef, Orm};

use crate::observability::{log_event, Event, Logger};
use crate::store::{CallContext, Client, MemoryStore};

/// Open the configured database and wrap it in an `Orm` logging to the console
pub fn connect(ctx: &CallContext, config: &OrmConfig) -> OrmResult<Orm<MemoryStore>> {
    connect_with_logger(ctx, config, Logger::new(config.log_level))
}

/// Like `connect`, with bootstrap and lifecycle events going to `logger`
pub fn connect_with_logger(
    ctx: &CallContext,
    config: &OrmConfig,
    logger: Logger,
) -> OrmResult<Orm<MemoryStore>> {
    config.validate()?;

    let client = Client::new(ctx, &config.client_config())?;
    let database = client.database(ctx, &config.db_name)?;

    log_event(
        &logger,
        Event::DatabaseOpened,
        &[
            ("db_name", config.db_name.as_str()),
            ("driver", config.driver.as_str()),
            ("host", client.host()),
        ],
    );

    Ok(Orm::with_config(database, config).with_logger(logger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DynamicDocument;
    use crate::observability::{capture_logger, Severity};
    use crate::store::StoreError;

    fn quiet(db_name: &str) -> OrmConfig {
        OrmConfig::new(db_name).with_log_level(Severity::Error)
    }

    #[test]
    fn test_connect_memory() {
        let orm = connect(&CallContext::background(), &quiet("honeyglass")).unwrap();
        assert!(orm.store().is_empty().unwrap());
    }

    #[test]
    fn test_connect_unsupported_driver() {
        let mut config = quiet("honeyglass");
        config.driver = "couch".to_string();
        let err = connect(&CallContext::background(), &config).unwrap_err();
        assert!(matches!(
            err,
            OrmError::Store(StoreError::UnsupportedDriver(ref name)) if name == "couch"
        ));
    }

    #[test]
    fn test_connect_rejects_invalid_config() {
        let err = connect(&CallContext::background(), &quiet("")).unwrap_err();
        assert!(matches!(err, OrmError::Config(ConfigError::Invalid(_))));
        assert_eq!(err.code(), "CORM_CONFIG_INVALID");
    }

    #[test]
    fn test_connect_logs_to_given_logger() {
        let (logger, read) = capture_logger(Severity::Trace);
        let orm = connect_with_logger(&CallContext::background(), &quiet("shop"), logger).unwrap();
        let mut record = DynamicDocument::new("Product").with_reserved_defaults();
        orm.save(&CallContext::background(), &mut record).unwrap();

        let output = read();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("DATABASE_OPENED"));
        assert!(lines[1].contains("DOCUMENT_CREATED"));
    }

    #[test]
    fn test_connect_applies_policies() {
        let config = quiet("shop").with_update_policy(UpdatePolicy::RequireIdAndRev);
        let orm = connect(&CallContext::background(), &config).unwrap();
        assert_eq!(orm.update_policy(), UpdatePolicy::RequireIdAndRev);
    }
}
