//! attestline response framing.
//!
//! The transport layer delivers a response as a sequence of [`Chunk`]s. Each
//! chunk may carry any combination of a response head, a payload, and the
//! completion marker with trailers. [`ResponseDemux`] turns that sequence
//! into a plain stream of body bytes and reports the head and trailers
//! through callbacks supplied at construction.
//!
//! # Ordering
//!
//! - The head callback fires at most once, only for a head on the first
//!   chunk, and completes before the first payload is yielded.
//! - The trailer callback fires at most once, only for the terminal chunk,
//!   and completes before the final payload is yielded and before the
//!   stream reports its end.
//! - Payloads are yielded in transport order, one chunk at a time. Empty
//!   and metadata-only chunks yield nothing.
//!
//! # Errors
//!
//! The body stream's error type is the transport's error type. Transport
//! errors and callback errors are passed through unchanged and end the
//! stream. Framing violations (see [`DemuxConfig`]) are converted with
//! `From<FramingError>`.
//!
//! # Memory Guarantee
//!
//! The demultiplexer is pull-based (via `futures_core::Stream`) and never
//! polls the transport ahead of the consumer. At most one chunk is held at a
//! time, and only while a callback for that chunk is running.

mod chunk;
mod config;
mod demux;
mod dispatch;
mod error;
mod header;
mod parts;

pub use chunk::{Body, Chunk, Completion, Shape};
pub use config::{DemuxConfig, LateHeadPolicy, TruncationPolicy};
pub use demux::ResponseDemux;
pub use dispatch::{CallbackFuture, OnHead, OnTrailers};
pub use error::{Error, FramingError, StreamResult};
pub use header::{Header, HeaderMap, ResponseHead, Trailers};
pub use parts::ResponseParts;
