//! Timeout enforcement.
//!
//! # Responsibilities
//! - Carry one per-request deadline through every backend I/O step
//! - Bound connect + send + response headers with the same deadline
//! - Keep bounding the response body while it streams to the client
//!
//! # Design Decisions
//! - A single deadline, not separate connect/read budgets
//! - Uses Tokio's timer facilities; dropping the future cancels the I/O
//! - Timeout errors are distinct from other errors (504 Gateway Timeout)

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::BoxError;
use bytes::Bytes;
use hyper::body::{Body as HttpBody, Frame, SizeHint};
use thiserror::Error;
use tokio::time::{Instant, Sleep};

/// The body deadline passed while a response was still streaming.
#[derive(Debug, Error)]
#[error("deadline of {0:?} exceeded while streaming body")]
pub struct DeadlineExceeded(pub Duration);

/// Absolute point in time by which a forwarded request must complete.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// The total budget this deadline was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Run `fut` until it completes or the deadline passes.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, tokio::time::error::Elapsed> {
        tokio::time::timeout_at(self.at, fut).await
    }

    /// Bound a streaming body by the same deadline.
    pub fn bound_body(&self, body: Body) -> DeadlineBody {
        DeadlineBody {
            inner: body,
            sleep: Box::pin(tokio::time::sleep_until(self.at)),
            budget: self.budget,
        }
    }
}

/// Body that fails with `DeadlineExceeded` if it is still waiting for
/// data when the deadline passes.
pub struct DeadlineBody {
    inner: Body,
    sleep: Pin<Box<Sleep>>,
    budget: Duration,
}

impl HttpBody for DeadlineBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(frame) => Poll::Ready(frame.map(|r| r.map_err(BoxError::from))),
            Poll::Pending => {
                if this.sleep.as_mut().poll(cx).is_ready() {
                    Poll::Ready(Some(Err(Box::new(DeadlineExceeded(this.budget)))))
                } else {
                    Poll::Pending
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_deadline_run() {
        let deadline = Deadline::after(Duration::from_millis(50));
        assert!(deadline.run(async { 7 }).await.is_ok());

        let deadline = Deadline::after(Duration::from_millis(50));
        let started = std::time::Instant::now();
        let result = deadline
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_body_within_deadline() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let body = deadline.bound_body(Body::from("payload"));
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"payload");
    }

    /// Yields one frame, then never produces another.
    struct Stalled {
        sent: bool,
    }

    impl HttpBody for Stalled {
        type Data = Bytes;
        type Error = BoxError;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
            if self.sent {
                return Poll::Pending;
            }
            self.sent = true;
            Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(b"first")))))
        }
    }

    #[tokio::test]
    async fn test_stalled_body_hits_deadline() {
        let deadline = Deadline::after(Duration::from_millis(100));
        let mut body = deadline.bound_body(Body::new(Stalled { sent: false }));

        let first = body.frame().await.unwrap().unwrap();
        assert_eq!(first.into_data().unwrap(), Bytes::from_static(b"first"));

        let started = std::time::Instant::now();
        let err = body.frame().await.unwrap().unwrap_err();
        assert!(err.is::<DeadlineExceeded>());
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
