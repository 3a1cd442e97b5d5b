//! Runtime-agnostic TCP connect, selected by the `runtime-async-std` /
//! `runtime-tokio` feature flags.
//!
//! `async-std`'s `TcpStream` already implements `futures_io::AsyncRead` /
//! `AsyncWrite` directly. Tokio 0.2's traits have the same `poll_read`/
//! `poll_write` shape but are a distinct set of traits, so under
//! `runtime-tokio` we wrap the socket in [`TokioCompat`] to present the
//! `futures_io` traits the rest of the crate (and `async-native-tls`) is
//! written against.

use std::future::Future;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::io::{AsyncRead, AsyncWrite};

#[cfg(feature = "runtime-async-std")]
pub type TcpStream = async_std::net::TcpStream;

#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub type TcpStream = TokioCompat<tokio::net::TcpStream>;

#[cfg(feature = "runtime-async-std")]
pub async fn connect_tcp(host: &str, port: u16) -> crate::Result<TcpStream> {
    Ok(async_std::net::TcpStream::connect((host, port)).await?)
}

#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub async fn connect_tcp(host: &str, port: u16) -> crate::Result<TcpStream> {
    let addr = resolve(host, port)?;
    let stream = tokio::net::TcpStream::connect(addr).await?;
    Ok(TokioCompat(stream))
}

#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
fn resolve(host: &str, port: u16) -> crate::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| crate::Error::config(format!("could not resolve host {:?}", host)))
}

/// Suspends the current task for `duration`, used by the pool's background
/// maintenance loop and its idle/lifetime timeout checks.
#[cfg(feature = "runtime-async-std")]
pub async fn sleep(duration: Duration) {
    async_std::task::sleep(duration).await
}

#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub async fn sleep(duration: Duration) {
    tokio::time::delay_for(duration).await
}

/// Races `fut` against `duration`, returning `None` on timeout.
#[cfg(feature = "runtime-async-std")]
pub async fn timeout<F, T>(duration: Duration, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    async_std::future::timeout(duration, fut).await.ok()
}

#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub async fn timeout<F, T>(duration: Duration, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut).await.ok()
}

/// Spawns `fut` to run independently of the caller, used for the pool's
/// background maintenance task.
#[cfg(feature = "runtime-async-std")]
pub fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    async_std::task::spawn(fut);
}

#[cfg(all(feature = "runtime-tokio", not(feature = "runtime-async-std")))]
pub fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(fut);
}

/// Wraps a tokio 0.2 socket so it implements `futures_io::AsyncRead`/`AsyncWrite`.
#[cfg(feature = "runtime-tokio")]
pub struct TokioCompat<S>(pub S);

#[cfg(feature = "runtime-tokio")]
impl<S> AsyncRead for TokioCompat<S>
where
    S: tokio::io::AsyncRead + Unpin,
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.0).poll_read(cx, buf)
    }
}

#[cfg(feature = "runtime-tokio")]
impl<S> AsyncWrite for TokioCompat<S>
where
    S: tokio::io::AsyncWrite + Unpin,
{
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.0).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_flush(cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_shutdown(cx)
    }
}
