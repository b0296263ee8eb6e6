//! Transport chunks and their classification.
//!
//! A [`Chunk`] is a record of independent optional facets, not a tagged
//! kind: the same chunk may carry a head and a payload, or a payload and
//! the completion marker with trailers. [`Chunk::into_facets`] splits a
//! chunk into the part the head dispatcher needs and the part the
//! iteration driver needs.

use std::fmt;

use bytes::Bytes;

use crate::header::{ResponseHead, Trailers};

/// One unit delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<H = ResponseHead, T = Trailers> {
    head: Option<H>,
    payload: Option<Bytes>,
    complete: bool,
    trailers: Option<T>,
}

impl<H, T> Chunk<H, T> {
    /// A chunk with no facets set. Useful as a builder seed.
    pub fn empty() -> Self {
        Self {
            head: None,
            payload: None,
            complete: false,
            trailers: None,
        }
    }

    /// A head-only chunk.
    pub fn head(head: H) -> Self {
        Self::empty().with_head(head)
    }

    /// A payload-only chunk.
    pub fn data(payload: impl Into<Bytes>) -> Self {
        Self::empty().with_payload(payload)
    }

    /// A terminal chunk with no payload.
    pub fn end(trailers: Option<T>) -> Self {
        Self::empty().completing(trailers)
    }

    pub fn with_head(mut self, head: H) -> Self {
        self.head = Some(head);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Mark this chunk as the terminal one.
    pub fn completing(mut self, trailers: Option<T>) -> Self {
        self.complete = true;
        self.trailers = trailers;
        self
    }

    pub fn has_head(&self) -> bool {
        self.head.is_some()
    }

    /// The payload, if present and non-empty.
    ///
    /// An empty payload is indistinguishable from an absent one.
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref().filter(|b| !b.is_empty())
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Trailers carried by a terminal chunk. Always `None` on a
    /// non-terminal chunk, whatever the transport put there.
    pub fn trailers(&self) -> Option<&T> {
        if self.complete {
            self.trailers.as_ref()
        } else {
            None
        }
    }

    pub fn shape(&self) -> Shape {
        Shape {
            head: self.has_head(),
            payload: self.payload().is_some(),
            complete: self.complete,
            trailers: self.trailers().is_some(),
        }
    }

    /// Split into the head facet and the body facet.
    pub fn into_facets(self) -> (Option<H>, Body<T>) {
        let payload = self.payload.filter(|b| !b.is_empty());
        let completion = self.complete.then_some(Completion {
            trailers: self.trailers,
        });
        (self.head, Body { payload, completion })
    }
}

/// The part of a chunk the iteration driver acts on.
#[derive(Debug)]
pub struct Body<T> {
    pub payload: Option<Bytes>,
    pub completion: Option<Completion<T>>,
}

impl<T> Body<T> {
    /// Neither payload nor completion: the chunk only carried metadata.
    pub fn is_metadata_only(&self) -> bool {
        self.payload.is_none() && self.completion.is_none()
    }
}

/// Completion marker with whatever trailers the terminal chunk carried.
#[derive(Debug)]
pub struct Completion<T> {
    pub trailers: Option<T>,
}

/// Which facets a chunk carries, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub head: bool,
    pub payload: bool,
    pub complete: bool,
    pub trailers: bool,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [
            (self.head, "head"),
            (self.payload, "payload"),
            (self.complete, "complete"),
            (self.trailers, "trailers"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();

        if parts.is_empty() {
            f.write_str("empty")
        } else {
            f.write_str(&parts.join("+"))
        }
    }
}
