//! Statement-level events and OTel-shaped attributes, delivered through an
//! explicit [`Observer`] handed to a connection at construction rather than
//! a process-wide/ambient tracer.

use crate::mysql::arguments::MySqlArguments;

/// Attributes describing one database interaction, following the shape of
/// OpenTelemetry's database semantic conventions. This is a plain struct,
/// not a dependency on the `opentelemetry` crate.
#[derive(Debug, Clone)]
pub struct DbAttributes {
    pub system_name: &'static str,
    pub namespace: Option<Box<str>>,
    pub collection_name: Option<Box<str>>,
    pub operation_name: Option<Box<str>>,
    pub query_text: Option<Box<str>>,
    pub query_summary: Option<Box<str>>,
    pub server_address: Box<str>,
    pub server_port: u16,
    pub mysql_version: Option<Box<str>>,
    pub mysql_thread_id: Option<u32>,
    pub mysql_auth_plugin: Option<Box<str>>,
    /// Only meaningful for batched execution, and only set when the batch
    /// has two or more statements.
    pub batch_size: Option<usize>,
    pub stored_procedure_name: Option<Box<str>>,
}

impl DbAttributes {
    pub(crate) fn new(server_address: &str, server_port: u16) -> Self {
        Self {
            system_name: "mysql",
            namespace: None,
            collection_name: None,
            operation_name: None,
            query_text: None,
            query_summary: None,
            server_address: server_address.into(),
            server_port,
            mysql_version: None,
            mysql_thread_id: None,
            mysql_auth_plugin: None,
            batch_size: None,
            stored_procedure_name: None,
        }
    }
}

/// One statement-level event, reported to an [`Observer`] after a command
/// completes (successfully or not).
pub enum QueryEvent<'a> {
    /// The command ran and its reply was fully consumed.
    Success { sql: &'a str, args: &'a MySqlArguments },

    /// The server returned an `ERR` packet, or the command round-trip failed
    /// at the transport/protocol level.
    ExecFailure { sql: &'a str, args: &'a MySqlArguments, cause: &'a crate::Error },

    /// The command succeeded but decoding its result failed.
    ProcessingFailure { sql: &'a str, args: &'a MySqlArguments, cause: &'a crate::Error },
}

/// Receives statement-level events for a connection or pool. Implementations
/// must be cheap and non-blocking; this is called on the connection's hot
/// path.
pub trait Observer: Send + Sync {
    fn on_query(&self, event: QueryEvent<'_>) {
        let _ = event;
    }

    /// The static attribute bag for this connection, merged with per-query
    /// attributes by callers that want to emit a full OTel-style span.
    fn attributes(&self) -> Option<DbAttributes> {
        None
    }
}

/// The default [`Observer`]: routes events through the `log` crate at
/// `debug` (success) or `warn` (failure), and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl Observer for LoggingObserver {
    fn on_query(&self, event: QueryEvent<'_>) {
        match event {
            QueryEvent::Success { sql, .. } => log::debug!("query succeeded: {}", sql),

            QueryEvent::ExecFailure { sql, cause, .. } => {
                log::warn!("query execution failed: {} ({})", sql, cause)
            }

            QueryEvent::ProcessingFailure { sql, cause, .. } => {
                log::warn!("failed to process the result of {}: {}", sql, cause)
            }
        }
    }
}
