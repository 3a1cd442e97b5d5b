use crate::mysql::options::MySqlConnectOptions;
use crate::mysql::protocol::capabilities::Capabilities;
use crate::mysql::stream::MySqlStream;
use crate::url::SslMode;

pub(crate) async fn upgrade_if_needed(
    stream: MySqlStream,
    options: &MySqlConnectOptions,
) -> crate::Result<MySqlStream> {
    match options.ssl_mode {
        SslMode::Disabled => Ok(stream),

        mode => upgrade(stream, options, mode).await,
    }
}

#[cfg(not(feature = "tls"))]
async fn upgrade(stream: MySqlStream, _options: &MySqlConnectOptions, mode: SslMode) -> crate::Result<MySqlStream> {
    match mode {
        SslMode::Preferred => Ok(stream),

        _ => Err(tls_err!(
            "ssl-mode={:?} was requested but this build of ldbc was compiled without the `tls` feature",
            mode
        )
        .into()),
    }
}

#[cfg(feature = "tls")]
async fn upgrade(mut stream: MySqlStream, options: &MySqlConnectOptions, mode: SslMode) -> crate::Result<MySqlStream> {
    use crate::mysql::net::Socket;

    if !stream.capabilities.contains(Capabilities::SSL) {
        return match mode {
            SslMode::Preferred => {
                log::warn!("server does not support TLS; continuing unencrypted");
                Ok(stream)
            }

            _ => Err(tls_err!("ssl-mode={:?} was requested but the server does not support TLS", mode).into()),
        };
    }

    send_ssl_request(&mut stream).await?;

    let mut connector = async_native_tls::TlsConnector::new();

    match mode {
        SslMode::Required => {
            connector = connector.danger_accept_invalid_certs(true).danger_accept_invalid_hostnames(true);
        }

        SslMode::VerifyCa => {
            connector = connector.danger_accept_invalid_hostnames(true);
            connector = add_root_cert(connector, options)?;
        }

        SslMode::VerifyIdentity => {
            connector = add_root_cert(connector, options)?;
        }

        SslMode::Preferred | SslMode::Disabled => unreachable!(),
    }

    let (socket, capabilities, sequence_id) = stream.into_parts();

    let plain = match socket {
        Socket::Plain(s) => s,
        Socket::Tls(_) => return Err(tls_err!("connection is already TLS-encrypted").into()),
    };

    let tls = connector
        .connect(options.host.as_str(), plain)
        .await
        .map_err(crate::Error::from)?;

    Ok(MySqlStream::from_parts(Socket::Tls(Box::new(tls)), capabilities, sequence_id))
}

#[cfg(feature = "tls")]
fn add_root_cert(
    connector: async_native_tls::TlsConnector,
    options: &MySqlConnectOptions,
) -> crate::Result<async_native_tls::TlsConnector> {
    let path = options
        .ssl_ca
        .as_deref()
        .ok_or_else(|| tls_err!("ssl-mode=VERIFY_CA and VERIFY_IDENTITY require ssl-ca to be set"))?;

    let pem = std::fs::read(path).map_err(|err| tls_err!("could not read ssl-ca file {:?}: {}", path, err))?;

    let cert = async_native_tls::Certificate::from_pem(&pem)
        .map_err(|err| tls_err!("ssl-ca file {:?} is not a valid certificate: {}", path, err))?;

    Ok(connector.add_root_certificate(cert))
}

#[cfg(feature = "tls")]
async fn send_ssl_request(stream: &mut MySqlStream) -> crate::Result<()> {
    use crate::io::BufMut;
    use byteorder::LittleEndian;

    struct SslRequest {
        capabilities: Capabilities,
    }

    impl crate::mysql::stream::Encode for SslRequest {
        fn encode(&self, buf: &mut Vec<u8>) {
            buf.put_u32::<LittleEndian>(self.capabilities.bits() as u32);
            buf.put_u32::<LittleEndian>(1024 * 1024 * 16);
            buf.put_u8(45); // utf8mb4_unicode_ci
            buf.put_bytes(&[0u8; 23]);
        }
    }

    let capabilities = stream.capabilities | Capabilities::SSL;

    stream.send(SslRequest { capabilities }, false).await
}
