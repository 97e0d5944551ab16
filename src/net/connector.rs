//! Backend connector that records how far each exchange got.
//!
//! # Responsibilities
//! - Wrap every backend connection in `TrackedIo`
//! - Expose the connection's `ExchangeProgress` through hyper's connection
//!   metadata, where the forwarder can read it after a failed call
//!
//! # Design Decisions
//! - Progress is per connection, not per request: a write marks the start
//!   of a new exchange and clears the flag, the first response byte sets it
//! - The wrapper sits outside TLS, so it only ever sees HTTP bytes

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Uri;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::{Connected, Connection, HttpConnector};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tower::Service;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Connector stack used by the forwarder.
pub type BackendConnector = TrackingConnector<HttpsConnector<HttpConnector>>;

/// Whether the backend has sent any bytes since the gateway last wrote to it.
#[derive(Debug, Clone, Default)]
pub struct ExchangeProgress(Arc<AtomicBool>);

impl ExchangeProgress {
    /// True once part of a response has been read on this connection.
    pub fn response_started(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn mark_read(&self) {
        self.0.store(true, Ordering::Release);
    }

    fn mark_written(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// IO adapter that updates an `ExchangeProgress` as bytes move.
#[derive(Debug)]
pub struct TrackedIo<T> {
    inner: T,
    progress: ExchangeProgress,
}

impl<T> TrackedIo<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            progress: ExchangeProgress::default(),
        }
    }

    pub fn progress(&self) -> &ExchangeProgress {
        &self.progress
    }
}

impl<T: AsyncRead + Unpin> AsyncRead for TrackedIo<T> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let result = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = result {
            if buf.filled().len() > before {
                self.progress.mark_read();
            }
        }
        result
    }
}

impl<T: AsyncWrite + Unpin> AsyncWrite for TrackedIo<T> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let result = Pin::new(&mut self.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = result {
            if n > 0 {
                self.progress.mark_written();
            }
        }
        result
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let result = Pin::new(&mut self.inner).poll_write_vectored(cx, bufs);
        if let Poll::Ready(Ok(n)) = result {
            if n > 0 {
                self.progress.mark_written();
            }
        }
        result
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

impl<T: Connection> Connection for TrackedIo<T> {
    fn connected(&self) -> Connected {
        self.inner.connected().extra(self.progress.clone())
    }
}

/// Connector wrapper that hands out `TrackedIo` connections.
#[derive(Debug, Clone)]
pub struct TrackingConnector<C> {
    inner: C,
}

impl<C> TrackingConnector<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C> Service<Uri> for TrackingConnector<C>
where
    C: Service<Uri>,
    C::Response: hyper::rt::Read + hyper::rt::Write + Connection + Unpin + Send + 'static,
    C::Future: Send + 'static,
    C::Error: Into<BoxError>,
{
    type Response = TokioIo<TrackedIo<TokioIo<C::Response>>>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let connecting = self.inner.call(uri);
        Box::pin(async move {
            let io = connecting.await.map_err(Into::into)?;
            Ok(TokioIo::new(TrackedIo::new(TokioIo::new(io))))
        })
    }
}
