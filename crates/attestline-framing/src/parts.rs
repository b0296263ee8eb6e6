//! Channel-backed access to a response's head, body, and trailers.
//!
//! For consumers that would rather await the head and trailers than
//! supply callbacks. The receivers only make progress while the body is
//! being polled.

use futures_core::Stream;
use tokio::sync::oneshot;

use crate::chunk::Chunk;
use crate::config::DemuxConfig;
use crate::demux::ResponseDemux;
use crate::header::{ResponseHead, Trailers};

/// A response split into its three parts.
///
/// `head` resolves once the first chunk has been processed and carried a
/// head; it fails with `RecvError` if the first chunk had none or the body
/// ended before any chunk arrived. `trailers` resolves once the terminal
/// chunk has been processed; it fails if the body ended without one.
pub struct ResponseParts<S, H = ResponseHead, T = Trailers, E = crate::Error> {
    pub head: oneshot::Receiver<H>,
    pub body: ResponseDemux<S, H, T, E>,
    pub trailers: oneshot::Receiver<Option<T>>,
}

impl<S, H, T, E> ResponseParts<S, H, T, E>
where
    S: Stream<Item = Result<Chunk<H, T>, E>>,
    H: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(source: S, config: DemuxConfig) -> Self {
        let (head_tx, head_rx) = oneshot::channel();
        let (trailers_tx, trailers_rx) = oneshot::channel();

        // A dropped receiver only means nobody is listening.
        let body = ResponseDemux::new(
            source,
            move |head: H| {
                let _ = head_tx.send(head);
                async { Ok::<(), E>(()) }
            },
            move |trailers: Option<T>| {
                let _ = trailers_tx.send(trailers);
                async { Ok::<(), E>(()) }
            },
        )
        .with_config(config);

        Self {
            head: head_rx,
            body,
            trailers: trailers_rx,
        }
    }
}
