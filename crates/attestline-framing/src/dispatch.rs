//! Head and trailer dispatch.
//!
//! Each callback is `FnOnce` and is held in an `Option` that is taken the
//! first time the dispatcher is consulted, so a second invocation is not
//! representable. Taking the callback also drops it, which is what lets a
//! channel-backed callback signal "never fired" to its receiver.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

/// A boxed callback future, held across polls by the demultiplexer.
pub type CallbackFuture<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send>>;

/// Receives the response head. Implemented for any
/// `FnOnce(H) -> impl Future<Output = Result<(), E>>`.
pub trait OnHead<H, E>: Send {
    fn call(self: Box<Self>, head: H) -> CallbackFuture<E>;
}

impl<H, E, F, Fut> OnHead<H, E> for F
where
    F: FnOnce(H) -> Fut + Send,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    fn call(self: Box<Self>, head: H) -> CallbackFuture<E> {
        Box::pin((*self)(head))
    }
}

/// Receives the trailers of the terminal chunk, if it carried any.
/// Implemented for any `FnOnce(Option<T>) -> impl Future<Output = Result<(), E>>`.
pub trait OnTrailers<T, E>: Send {
    fn call(self: Box<Self>, trailers: Option<T>) -> CallbackFuture<E>;
}

impl<T, E, F, Fut> OnTrailers<T, E> for F
where
    F: FnOnce(Option<T>) -> Fut + Send,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    fn call(self: Box<Self>, trailers: Option<T>) -> CallbackFuture<E> {
        Box::pin((*self)(trailers))
    }
}

/// Fires the head callback for the first chunk only.
pub(crate) struct HeadDispatcher<H, E> {
    callback: Option<Box<dyn OnHead<H, E>>>,
}

impl<H, E> HeadDispatcher<H, E> {
    pub fn new(callback: Box<dyn OnHead<H, E>>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Consult the dispatcher with the head facet of the first chunk.
    ///
    /// Returns the callback future if the chunk carried a head. The
    /// callback is released either way; later calls return `None`.
    pub fn dispatch(&mut self, head: Option<H>) -> Option<CallbackFuture<E>> {
        let callback = self.callback.take()?;
        match head {
            Some(head) => {
                debug!("dispatching response head");
                Some(callback.call(head))
            }
            None => {
                debug!("first chunk carried no response head");
                None
            }
        }
    }

    #[cfg(test)]
    pub fn is_spent(&self) -> bool {
        self.callback.is_none()
    }

    pub fn release(&mut self) {
        self.callback = None;
    }
}

/// Fires the trailer callback for the terminal chunk.
pub(crate) struct TrailerDispatcher<T, E> {
    callback: Option<Box<dyn OnTrailers<T, E>>>,
}

impl<T, E> TrailerDispatcher<T, E> {
    pub fn new(callback: Box<dyn OnTrailers<T, E>>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Returns `None` if the callback was already invoked or released.
    pub fn dispatch(&mut self, trailers: Option<T>) -> Option<CallbackFuture<E>> {
        let callback = self.callback.take()?;
        debug!(has_trailers = trailers.is_some(), "dispatching trailers");
        Some(callback.call(trailers))
    }

    #[cfg(test)]
    pub fn is_spent(&self) -> bool {
        self.callback.is_none()
    }

    pub fn release(&mut self) {
        self.callback = None;
    }
}
