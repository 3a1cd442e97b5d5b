use std::collections::HashMap;
use std::convert::TryInto;
use std::sync::Arc;

use byteorder::LittleEndian;
use futures_core::future::BoxFuture;
use futures_core::stream::BoxStream;
use sha1::Sha1;

use crate::connection::{Connect, Connection};
use crate::database::Database;
use crate::executor::Executor;
use crate::io::Buf;
use crate::mysql::arguments::MySqlArguments;
use crate::mysql::database::{MySql, MySqlQueryResult};
use crate::mysql::observability::QueryEvent;
use crate::mysql::options::MySqlConnectOptions;
use crate::mysql::protocol::column::ColumnDefinition;
use crate::mysql::protocol::command::{
    ComInitDb, ComPing, ComQuery, ComQuit, ComResetConnection, ComStmtExecute, ComStmtPrepare,
};
use crate::mysql::protocol::{AuthPlugin, AuthSwitch, Capabilities, Handshake, HandshakeResponse, OkPacket};
use crate::mysql::row::MySqlRow;
use crate::mysql::statement::MySqlStatement;
use crate::mysql::stream::MySqlStream;
use crate::mysql::util::xor_eq;
use crate::mysql::{rsa, tls};
use crate::url::Url;

pub(super) const MAX_PACKET_SIZE: u32 = 1024;
pub(super) const COLLATE_UTF8MB4_UNICODE_CI: u8 = 224;

/// An asynchronous connection to a MySQL (or MariaDB-compatible) server.
///
/// Opened from a `mysql://` connection string (see [`crate::url::Url`]) via
/// [`Connect::connect`], or from a [`MySqlConnectOptions`] via
/// [`MySqlConnection::establish`]. One command is in flight at a time; there
/// is no client-side pipelining.
pub struct MySqlConnection {
    pub(super) stream: MySqlStream,
    options: MySqlConnectOptions,
    is_ready: bool,
    cache_statement: HashMap<Box<str>, MySqlStatement>,
    in_transaction: bool,
}

fn to_asciz(s: &str) -> Vec<u8> {
    let mut z = Vec::with_capacity(s.len() + 1);
    z.extend_from_slice(s.as_bytes());
    z.push(0);
    z
}

/// Sends a standalone public-key-request packet. Only valid mid-session,
/// after the client's one mandatory `HandshakeResponse41` has already gone
/// out (`caching_sha2_password`'s full-auth follow-up); the initial
/// `sha256_password` key request instead rides inside `HandshakeResponse41`
/// itself, via [`initial_auth_response`]'s sentinel byte.
async fn request_public_key(stream: &mut MySqlStream, public_key_request_id: u8) -> crate::Result<()> {
    stream.send(&[public_key_request_id][..], false).await
}

/// Encrypts `password` against the RSA public key carried in `packet` (an
/// `AuthMoreData` packet; `packet[0]` is the packet-type marker, the key
/// follows).
fn encrypt_password_with_key_packet(packet: &[u8], password: &str, nonce: &[u8]) -> crate::Result<Vec<u8>> {
    let rsa_pub_key = &packet[1..];

    let mut pass = to_asciz(password);
    xor_eq(&mut pass, nonce);

    rsa::encrypt::<Sha1>(rsa_pub_key, &pass)
}

/// Computes the client's `auth_response` without touching the network.
///
/// For `mysql_native_password`/`caching_sha2_password` this is the real
/// scrambled password. For `sha256_password` over TLS it's the plaintext
/// password. For `sha256_password` without TLS the real response can't be
/// computed yet — the server's RSA public key hasn't been requested — so
/// this embeds the single-byte sentinel `0x01`, which tells the server
/// "send me your public key next":
/// <https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_authentication_methods_sha256_password_authentication.html>
fn initial_auth_response(stream: &MySqlStream, plugin: &AuthPlugin, password: &str, nonce: &[u8]) -> Vec<u8> {
    match plugin {
        AuthPlugin::CachingSha2Password | AuthPlugin::MySqlNativePassword => plugin.scramble(password, nonce),

        AuthPlugin::Sha256Password => {
            if stream.is_tls() {
                to_asciz(password)
            } else {
                vec![0x01]
            }
        }
    }
}

async fn establish(options: &MySqlConnectOptions) -> crate::Result<MySqlStream> {
    // https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase.html
    let mut stream = MySqlStream::new(&options.host, options.port).await?;

    let handshake = Handshake::read(&stream.receive().await?)?;
    let mut auth_plugin = handshake.auth_plugin;
    let mut auth_plugin_data = handshake.auth_plugin_data;

    stream.capabilities &= handshake.server_capabilities;
    stream.capabilities |= Capabilities::PROTOCOL_41;

    log::trace!("negotiated capability flags: {:?}", stream.capabilities);

    stream = tls::upgrade_if_needed(stream, options).await?;

    let password = options.password.as_deref().unwrap_or_default();
    let auth_response = initial_auth_response(&stream, &auth_plugin, password, &auth_plugin_data);

    stream
        .send(
            HandshakeResponse {
                client_collation: COLLATE_UTF8MB4_UNICODE_CI,
                max_packet_size: MAX_PACKET_SIZE,
                username: &options.username,
                database: options.database.as_deref(),
                auth_plugin,
                auth_response: &auth_response,
            },
            false,
        )
        .await?;

    loop {
        let packet = stream.receive().await?;

        match packet[0] {
            0x00 => break,

            0xFF => return stream.handle_err(&packet),

            0xFE => {
                let auth = AuthSwitch::read(&packet)?;
                auth_plugin = auth.auth_plugin;
                auth_plugin_data = auth.auth_plugin_data;

                // same sentinel-byte convention as the initial handshake
                // response; a `sha256_password` switch without TLS gets its
                // own `AuthMoreData` round trip below, one loop iteration
                // later, rather than a nested request here.
                let auth_response = initial_auth_response(&stream, &auth_plugin, password, &auth_plugin_data);

                stream.send(auth_response, false).await?;
            }

            // the server answering our `HandshakeResponse41`'s sentinel byte
            // (or an `AuthSwitchResponse`'s) with its RSA public key.
            0x01 if auth_plugin == AuthPlugin::Sha256Password => {
                let enc = encrypt_password_with_key_packet(&packet, password, &auth_plugin_data)?;
                stream.send(enc, false).await?;
            }

            0x01 if auth_plugin == AuthPlugin::CachingSha2Password => match packet[1] {
                0x03 => {}

                0x04 => {
                    request_public_key(&mut stream, 0x02).await?;
                    let key_packet = stream.receive().await?;
                    let enc = encrypt_password_with_key_packet(&key_packet, password, &auth_plugin_data)?;

                    stream.send(enc, false).await?;
                }

                unk => {
                    return Err(protocol_err!(
                        "unexpected result from 'fast' authentication 0x{:x}, expected OK (0x03) or CONTINUE (0x04)",
                        unk
                    )
                    .into());
                }
            },

            _ => return stream.handle_unexpected(&packet),
        }
    }

    Ok(stream)
}

async fn close(mut stream: MySqlStream) -> crate::Result<()> {
    // COM_QUIT has no response; the server just closes the socket.
    let _ = stream.send(ComQuit, true).await;
    stream.flush().await.ok();
    stream.shutdown()
}

async fn ping(stream: &mut MySqlStream) -> crate::Result<()> {
    stream.send(ComPing, true).await?;

    let packet = stream.receive().await?;
    match packet[0] {
        0x00 | 0xFE => Ok(()),
        0xFF => stream.handle_err(&packet),
        _ => stream.handle_unexpected(&packet),
    }
}

/// Reads the response to `COM_QUERY`/`COM_STMT_EXECUTE`: either an `OK`
/// packet (no result set) or a column count followed by that many
/// `ColumnDefinition41` packets.
///
/// Assumes `CLIENT_DEPRECATE_EOF` was negotiated (it always is; see
/// [`Capabilities::default`]), so no `EOF_Packet` separates the column
/// definitions from the row data.
enum ResultSetHeader {
    NoResultSet(OkPacket),
    Columns(Vec<ColumnDefinition>),
}

async fn read_result_set_header(stream: &mut MySqlStream) -> crate::Result<ResultSetHeader> {
    let packet = stream.receive().await?;

    match packet[0] {
        0x00 => Ok(ResultSetHeader::NoResultSet(OkPacket::read(&packet, stream.capabilities)?)),
        0xFF => stream.handle_err(&packet),
        0xFB => Err(protocol_err!("server requested LOCAL INFILE; this is not supported").into()),

        _ => {
            let mut buf: &[u8] = &packet;
            let column_count = buf
                .get_uint_lenenc::<LittleEndian>()?
                .ok_or_else(|| protocol_err!("expected a column count, found NULL"))? as usize;

            let mut columns = Vec::with_capacity(column_count);
            for _ in 0..column_count {
                columns.push(ColumnDefinition::read(&stream.receive().await?)?);
            }

            Ok(ResultSetHeader::Columns(columns))
        }
    }
}

/// `true` if `packet` is the terminal packet of a (deprecated-EOF) result
/// set rather than a row: an `OK_Packet`, recognizable by header `0x00`, or
/// the legacy `0xFE` EOF marker on a short packet (kept for servers that
/// still send it despite negotiating `DEPRECATE_EOF`).
fn is_result_set_terminator(packet: &[u8]) -> bool {
    packet[0] == 0x00 || (packet[0] == 0xFE && packet.len() < 9)
}

impl MySqlConnection {
    pub async fn establish(options: MySqlConnectOptions) -> crate::Result<Self> {
        let stream = establish(&options).await?;

        let mut conn = Self {
            stream,
            options,
            is_ready: true,
            cache_statement: HashMap::new(),
            in_transaction: false,
        };

        // PIPES_AS_CONCAT/NO_ENGINE_SUBSTITUTION/NO_ZERO_DATE/NO_ZERO_IN_DATE:
        // https://mariadb.com/kb/en/sql-mode/
        // time_zone pinned to UTC so TIMESTAMP columns decode unambiguously.
        conn.simple_query(
            "SET sql_mode=(SELECT CONCAT(@@sql_mode, \
             ',PIPES_AS_CONCAT,NO_ENGINE_SUBSTITUTION,NO_ZERO_DATE,NO_ZERO_IN_DATE')), \
             time_zone='+00:00', \
             NAMES utf8mb4 COLLATE utf8mb4_unicode_ci",
        )
        .await?;

        Ok(conn)
    }

    async fn new(url: crate::Result<Url>) -> crate::Result<Self> {
        Self::establish(MySqlConnectOptions::from(url?)).await
    }

    /// Runs `sql` as a single `COM_QUERY` with no parameters, discarding any
    /// rows. Used for session setup and `SET`/transaction-control statements.
    async fn simple_query(&mut self, sql: &str) -> crate::Result<()> {
        self.stream.send(ComQuery { sql }, true).await?;

        match read_result_set_header(&mut self.stream).await? {
            ResultSetHeader::NoResultSet(_) => Ok(()),

            ResultSetHeader::Columns(_) => {
                // drain any rows the statement produced
                loop {
                    let packet = self.stream.receive().await?;
                    if is_result_set_terminator(&packet) {
                        break;
                    }
                }
                Ok(())
            }
        }
    }

    async fn prepare(&mut self, sql: &str) -> crate::Result<MySqlStatement> {
        if let Some(stmt) = self.cache_statement.get(sql) {
            return Ok(stmt.clone());
        }

        self.stream.send(ComStmtPrepare { sql }, true).await?;

        let packet = self.stream.receive().await?;
        if packet[0] == 0xFF {
            return self.stream.handle_err(&packet);
        }

        let mut buf: &[u8] = &packet[1..];
        let id = buf.get_u32::<LittleEndian>()?;
        let num_columns = buf.get_u16::<LittleEndian>()?;
        let num_params = buf.get_u16::<LittleEndian>()?;

        // parameter definitions carry no information we use (MySQL always
        // reports them as opaque VAR_STRING placeholders), so they're read
        // and discarded rather than stored
        for _ in 0..num_params {
            ColumnDefinition::read(&self.stream.receive().await?)?;
        }

        let mut columns = Vec::with_capacity(num_columns as usize);
        for _ in 0..num_columns {
            columns.push(ColumnDefinition::read(&self.stream.receive().await?)?);
        }

        let stmt = MySqlStatement { id, params: num_params, columns: Arc::new(columns) };

        if self.options.statement_cache_capacity > 0 {
            if self.cache_statement.len() >= self.options.statement_cache_capacity {
                // evict arbitrarily; a real LRU is more than this cache needs
                if let Some(key) = self.cache_statement.keys().next().cloned() {
                    self.cache_statement.remove(&key);
                }
            }

            self.cache_statement.insert(sql.into(), stmt.clone());
        }

        Ok(stmt)
    }

    async fn run(&mut self, query: &str, args: &MySqlArguments) -> crate::Result<ResultSetStream<'_>> {
        if args.params.is_empty() {
            self.stream.send(ComQuery { sql: query }, true).await?;
        } else {
            let stmt = self.prepare(query).await?;

            self.stream
                .send(ComStmtExecute { statement_id: stmt.id, params: &args.params }, true)
                .await?;
        }

        match read_result_set_header(&mut self.stream).await? {
            ResultSetHeader::NoResultSet(ok) => Ok(ResultSetStream {
                stream: &mut self.stream,
                columns: None,
                result: MySqlQueryResult {
                    rows_affected: ok.affected_rows,
                    last_insert_id: ok.last_insert_id,
                    warnings: ok.warnings,
                },
                done: true,
            }),

            ResultSetHeader::Columns(columns) => {
                let is_binary = !args.params.is_empty();
                Ok(ResultSetStream {
                    stream: &mut self.stream,
                    columns: Some((Arc::new(columns), is_binary)),
                    result: MySqlQueryResult::default(),
                    done: false,
                })
            }
        }
    }

    pub fn cached_statement_count(&self) -> usize {
        self.cache_statement.len()
    }

    pub fn options(&self) -> &MySqlConnectOptions {
        &self.options
    }

    /// Begins a transaction by issuing `BEGIN` (or, when nested, a
    /// `SAVEPOINT`); see [`crate::transaction::Transaction`].
    pub async fn begin(&mut self) -> crate::Result<crate::transaction::Transaction<'_, Self>> {
        crate::transaction::Transaction::begin(self, 0).await
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    pub(super) fn set_in_transaction(&mut self, value: bool) {
        self.in_transaction = value;
    }

    /// `SET autocommit = {0,1}`.
    pub async fn set_auto_commit(&mut self, auto_commit: bool) -> crate::Result<()> {
        self.simple_query(if auto_commit { "SET autocommit=1" } else { "SET autocommit=0" }).await
    }

    /// Changes the connection's default schema via `COM_INIT_DB`, which is
    /// cheaper than `USE <db>` since it skips the query parser.
    pub async fn set_schema(&mut self, schema: &str) -> crate::Result<()> {
        self.stream.send(ComInitDb { schema }, true).await?;

        let packet = self.stream.receive().await?;
        match packet[0] {
            0x00 => Ok(()),
            0xFF => self.stream.handle_err(&packet),
            _ => self.stream.handle_unexpected(&packet),
        }
    }

    /// `SET SESSION TRANSACTION ISOLATION LEVEL ...`.
    pub async fn set_transaction_isolation(&mut self, level: &str) -> crate::Result<()> {
        self.simple_query(&format!("SET SESSION TRANSACTION ISOLATION LEVEL {}", level)).await
    }

    /// Always issues `SET SESSION TRANSACTION READ {ONLY,WRITE}` to the
    /// server rather than tracking read-only as purely client-side state
    pub async fn set_read_only(&mut self, read_only: bool) -> crate::Result<()> {
        self.simple_query(if read_only {
            "SET SESSION TRANSACTION READ ONLY"
        } else {
            "SET SESSION TRANSACTION READ WRITE"
        })
        .await
    }

    /// Resets session state (temp tables, user vars, prepared statements,
    /// transaction state) while keeping the TCP/TLS connection open, via
    /// `COM_RESET_CONNECTION`. Used by the pool to scrub a connection before
    /// handing it back out, much cheaper than a full reconnect.
    pub async fn reset(&mut self) -> crate::Result<()> {
        self.stream.send(ComResetConnection, true).await?;

        let packet = self.stream.receive().await?;
        match packet[0] {
            0x00 => {
                self.cache_statement.clear();
                self.in_transaction = false;
                Ok(())
            }
            0xFF => self.stream.handle_err(&packet),
            _ => self.stream.handle_unexpected(&packet),
        }
    }
}

/// Streams the rows of one in-flight result set, reading lazily from the
/// wire as the caller polls. Borrows the connection's stream for its
/// lifetime, which is why only one query can be in flight on a connection at
/// a time.
struct ResultSetStream<'c> {
    stream: &'c mut MySqlStream,
    columns: Option<(Arc<Vec<ColumnDefinition>>, bool)>,
    result: MySqlQueryResult,
    done: bool,
}

impl<'c> ResultSetStream<'c> {
    async fn next_row(&mut self) -> Option<crate::Result<MySqlRow>> {
        if self.done {
            return None;
        }

        let (columns, is_binary) = self.columns.as_ref()?;

        let packet = match self.stream.receive().await {
            Ok(packet) => packet,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        if is_result_set_terminator(&packet) {
            self.done = true;
            return None;
        }

        if packet[0] == 0xFF {
            self.done = true;
            return Some(self.stream.handle_err(&packet));
        }

        let row = if *is_binary {
            MySqlRow::from_binary(packet, columns.clone())
        } else {
            MySqlRow::from_text(packet, columns.clone())
        };

        Some(row)
    }
}

impl Connect for MySqlConnection {
    fn connect<T>(url: T) -> BoxFuture<'static, crate::Result<MySqlConnection>>
    where
        T: TryInto<Url> + Send,
        crate::Error: From<T::Error>,
    {
        Box::pin(MySqlConnection::new(url.try_into().map_err(crate::Error::from)))
    }
}

impl Connection for MySqlConnection {
    type Database = MySql;

    fn close(self) -> BoxFuture<'static, crate::Result<()>> {
        Box::pin(close(self.stream))
    }

    fn ping(&mut self) -> BoxFuture<'_, crate::Result<()>> {
        Box::pin(ping(&mut self.stream))
    }

    fn is_valid(&self) -> bool {
        self.is_ready
    }

    fn is_valid_within(&mut self, timeout: std::time::Duration) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            match crate::runtime::timeout(timeout, ping(&mut self.stream)).await {
                Some(Ok(())) => true,
                Some(Err(_)) => {
                    self.is_ready = false;
                    false
                }
                None => false,
            }
        })
    }
}

impl Executor for MySqlConnection {
    type Database = MySql;

    fn execute<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<MySqlQueryResult>> {
        Box::pin(async move {
            let observer = self.options.observer.clone();

            let mut result_set = match self.run(query, &args).await {
                Ok(rs) => rs,
                Err(err) => {
                    self.is_ready = false;
                    observer.on_query(QueryEvent::ExecFailure { sql: query, args: &args, cause: &err });
                    return Err(err);
                }
            };

            while let Some(row) = result_set.next_row().await {
                if let Err(err) = row {
                    observer.on_query(QueryEvent::ProcessingFailure { sql: query, args: &args, cause: &err });
                    return Err(err);
                }
            }

            observer.on_query(QueryEvent::Success { sql: query, args: &args });
            Ok(result_set.result)
        })
    }

    fn fetch<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxStream<'e, crate::Result<<Self::Database as Database>::Row>> {
        Box::pin(async_stream::try_stream! {
            let observer = self.options.observer.clone();

            let mut result_set = match self.run(query, &args).await {
                Ok(rs) => rs,
                Err(err) => {
                    self.is_ready = false;
                    observer.on_query(QueryEvent::ExecFailure { sql: query, args: &args, cause: &err });
                    Err(err)?
                }
            };

            while let Some(row) = result_set.next_row().await {
                match row {
                    Ok(row) => yield row,
                    Err(err) => {
                        observer.on_query(QueryEvent::ProcessingFailure { sql: query, args: &args, cause: &err });
                        Err(err)?
                    }
                }
            }

            observer.on_query(QueryEvent::Success { sql: query, args: &args });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_treats_short_0xfe_packets_as_terminators() {
        assert!(is_result_set_terminator(&[0xFE, 0, 0, 2, 0]));
        assert!(!is_result_set_terminator(&[0xFE; 10]));
        assert!(is_result_set_terminator(&[0x00]));
    }
}
