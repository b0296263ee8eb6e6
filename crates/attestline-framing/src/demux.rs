//! The response demultiplexer.
//!
//! [`ResponseDemux`] adapts a stream of transport [`Chunk`]s into a stream of
//! body bytes, firing the head callback before the first payload and the
//! trailer callback before the end of the body.
//!
//! # State machine
//!
//! ```text
//! AwaitingFirst ──pull──► DispatchingHead ──► Streaming ◄─┐
//!      │                                         │  pull  │ payload
//!      └──(no head)─────────────────────────────►├────────┘
//!                                                │ complete
//!                                                ▼
//!                                       DispatchingTrailers ──► Completed
//! ```
//!
//! Exactly one of two things can be in flight: a pull on the transport, or
//! a callback future. A chunk's payload is held while its callback runs and
//! released only after the callback resolves, so the head is always observed
//! before the first byte and the trailers before the last byte (or the end
//! of the stream when the terminal chunk is empty).
//!
//! Once `Completed` the transport is never polled again, including after an
//! error.

use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::stream::FusedStream;
use futures_core::Stream;
use tracing::{debug, trace, warn};

use crate::chunk::{Body, Chunk};
use crate::config::{DemuxConfig, LateHeadPolicy, TruncationPolicy};
use crate::dispatch::{CallbackFuture, HeadDispatcher, OnHead, OnTrailers, TrailerDispatcher};
use crate::error::{FramingError, StreamResult};
use crate::header::{ResponseHead, Trailers};

enum Phase<T, E> {
    AwaitingFirst,
    DispatchingHead {
        callback: CallbackFuture<E>,
        body: Body<T>,
    },
    Streaming,
    DispatchingTrailers {
        callback: CallbackFuture<E>,
        payload: Option<Bytes>,
    },
    Completed,
}

/// Splits a chunked transport stream into body bytes and head/trailer
/// notifications.
///
/// One instance serves one response. It is not restartable; build a new one
/// against a fresh transport stream.
pub struct ResponseDemux<S, H = ResponseHead, T = Trailers, E = crate::Error> {
    source: Pin<Box<S>>,
    head: HeadDispatcher<H, E>,
    trailers: TrailerDispatcher<T, E>,
    config: DemuxConfig,
    phase: Phase<T, E>,
    chunks_seen: u64,
}

// Fields are never pinned in place; the transport is boxed and callback
// futures are boxed.
impl<S, H, T, E> Unpin for ResponseDemux<S, H, T, E> {}

impl<S, H, T, E> ResponseDemux<S, H, T, E>
where
    S: Stream<Item = Result<Chunk<H, T>, E>>,
{
    pub fn new<Hf, Tf>(source: S, on_head: Hf, on_trailers: Tf) -> Self
    where
        Hf: OnHead<H, E> + 'static,
        Tf: OnTrailers<T, E> + 'static,
    {
        Self {
            source: Box::pin(source),
            head: HeadDispatcher::new(Box::new(on_head)),
            trailers: TrailerDispatcher::new(Box::new(on_trailers)),
            config: DemuxConfig::default(),
            phase: Phase::AwaitingFirst,
            chunks_seen: 0,
        }
    }

    pub fn with_config(mut self, config: DemuxConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// Number of transport chunks pulled so far.
    pub fn chunks_seen(&self) -> u64 {
        self.chunks_seen
    }

    /// Drain the body into a single buffer.
    ///
    /// Callbacks fire as usual while draining. Stops at the first error.
    pub async fn collect_body(mut self) -> StreamResult<Bytes, E>
    where
        E: From<FramingError>,
    {
        let mut collected = Vec::new();
        while let Some(item) = std::future::poll_fn(|cx| Pin::new(&mut self).poll_next(cx)).await {
            collected.extend_from_slice(&item?);
        }
        Ok(Bytes::from(collected))
    }

    /// Route a chunk's body facet: either start the trailer callback or hand
    /// back the payload (if any) for yielding.
    fn advance(&mut self, body: Body<T>) -> Option<Bytes> {
        match body.completion {
            Some(completion) => {
                match self.trailers.dispatch(completion.trailers) {
                    Some(callback) => {
                        self.phase = Phase::DispatchingTrailers {
                            callback,
                            payload: body.payload,
                        };
                        None
                    }
                    // Already spent: a terminal chunk was seen before.
                    None => {
                        self.terminate();
                        body.payload
                    }
                }
            }
            None => {
                self.phase = Phase::Streaming;
                if let Some(payload) = &body.payload {
                    trace!(len = payload.len(), "yielding payload");
                }
                body.payload
            }
        }
    }

    /// Enter `Completed`, releasing both callbacks.
    fn terminate(&mut self) {
        self.phase = Phase::Completed;
        self.head.release();
        self.trailers.release();
    }
}

impl<S, H, T, E> Stream for ResponseDemux<S, H, T, E>
where
    S: Stream<Item = Result<Chunk<H, T>, E>>,
    E: From<FramingError>,
{
    type Item = StreamResult<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match mem::replace(&mut this.phase, Phase::Completed) {
                Phase::Completed => return Poll::Ready(None),

                phase @ (Phase::AwaitingFirst | Phase::Streaming) => {
                    let first = matches!(phase, Phase::AwaitingFirst);
                    let chunk = match this.source.as_mut().poll_next(cx) {
                        Poll::Pending => {
                            this.phase = phase;
                            return Poll::Pending;
                        }
                        Poll::Ready(Some(Ok(chunk))) => chunk,
                        Poll::Ready(Some(Err(e))) => {
                            debug!(chunks = this.chunks_seen, "transport error");
                            this.terminate();
                            return Poll::Ready(Some(Err(e)));
                        }
                        Poll::Ready(None) => {
                            let chunks = this.chunks_seen;
                            this.terminate();
                            return match this.config.truncation {
                                TruncationPolicy::Lenient => {
                                    if chunks > 0 {
                                        warn!(chunks, "transport ended without a terminal chunk");
                                    } else {
                                        debug!("transport ended before the first chunk");
                                    }
                                    Poll::Ready(None)
                                }
                                TruncationPolicy::Strict => {
                                    warn!(chunks, "rejecting truncated response");
                                    Poll::Ready(Some(Err(FramingError::Truncated { chunks }.into())))
                                }
                            };
                        }
                    };

                    this.chunks_seen += 1;
                    let index = this.chunks_seen;
                    trace!(index, shape = %chunk.shape(), "pulled chunk");
                    let (head, body) = chunk.into_facets();

                    if first {
                        if let Some(callback) = this.head.dispatch(head) {
                            this.phase = Phase::DispatchingHead { callback, body };
                            continue;
                        }
                    } else if head.is_some() {
                        match this.config.late_head {
                            LateHeadPolicy::Ignore => {
                                warn!(index, "ignoring response head on a non-first chunk");
                            }
                            LateHeadPolicy::Reject => {
                                this.terminate();
                                return Poll::Ready(Some(Err(
                                    FramingError::UnexpectedHead { index }.into()
                                )));
                            }
                        }
                    }

                    if body.is_metadata_only() {
                        debug!(index, "skipping metadata-only chunk");
                    }
                    if let Some(payload) = this.advance(body) {
                        return Poll::Ready(Some(Ok(payload)));
                    }
                }

                Phase::DispatchingHead { mut callback, body } => {
                    match callback.as_mut().poll(cx) {
                        Poll::Pending => {
                            this.phase = Phase::DispatchingHead { callback, body };
                            return Poll::Pending;
                        }
                        Poll::Ready(Err(e)) => {
                            debug!("head callback failed");
                            this.terminate();
                            return Poll::Ready(Some(Err(e)));
                        }
                        Poll::Ready(Ok(())) => {
                            if let Some(payload) = this.advance(body) {
                                return Poll::Ready(Some(Ok(payload)));
                            }
                        }
                    }
                }

                Phase::DispatchingTrailers {
                    mut callback,
                    payload,
                } => match callback.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.phase = Phase::DispatchingTrailers { callback, payload };
                        return Poll::Pending;
                    }
                    Poll::Ready(Err(e)) => {
                        debug!("trailer callback failed");
                        this.terminate();
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Ready(Ok(())) => {
                        debug!(chunks = this.chunks_seen, "response complete");
                        this.terminate();
                        return Poll::Ready(payload.map(Ok));
                    }
                },
            }
        }
    }
}

impl<S, H, T, E> FusedStream for ResponseDemux<S, H, T, E>
where
    S: Stream<Item = Result<Chunk<H, T>, E>>,
    E: From<FramingError>,
{
    fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Completed)
    }
}
