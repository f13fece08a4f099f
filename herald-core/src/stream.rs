//! Stream pipeline behaviors.
//!
//! Stream requests are wrapped the same way as regular requests, but each
//! stage transforms a stream instead of awaiting a single value. Stages are
//! synchronous constructors: they receive the request and a [`StreamNext`]
//! and return the stream the caller will poll.

use crate::{
    behavior::{RequestInfo, ResponseTypeMismatch},
    error::BoxError,
    message::StreamRequest,
};
use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use std::{any::Any, marker::PhantomData, sync::Arc};
use tokio_util::sync::CancellationToken;

/// A boxed stream of fallible items.
pub type ItemStream<T> = BoxStream<'static, Result<T, BoxError>>;

/// An item with its type erased.
pub type ErasedItem = Box<dyn Any + Send>;

/// The continuation handed to a [`StreamPipelineBehavior`].
pub struct StreamNext<R: StreamRequest> {
    run: Box<dyn FnOnce() -> ItemStream<R::Item> + Send>,
}

impl<R: StreamRequest> StreamNext<R> {
    /// Wraps the construction of the following stage's stream.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() -> ItemStream<R::Item> + Send + 'static,
    {
        Self { run: Box::new(run) }
    }

    /// Builds the rest of the chain.
    pub fn run(self) -> ItemStream<R::Item> {
        (self.run)()
    }
}

/// Middleware for one stream request type.
pub trait StreamPipelineBehavior<R: StreamRequest>: Send + Sync + 'static {
    /// Wraps the stream produced by `next`, or replaces it.
    fn handle(
        &self,
        request: Arc<R>,
        next: StreamNext<R>,
        cancel: CancellationToken,
    ) -> ItemStream<R::Item>;
}

/// The continuation handed to an [`OpenStreamBehavior`].
pub struct OpenStreamNext {
    run: Box<dyn FnOnce() -> ItemStream<ErasedItem> + Send>,
}

impl OpenStreamNext {
    /// Wraps the construction of the following stage's stream.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() -> ItemStream<ErasedItem> + Send + 'static,
    {
        Self { run: Box::new(run) }
    }

    /// Builds the rest of the chain.
    pub fn run(self) -> ItemStream<ErasedItem> {
        (self.run)()
    }
}

/// Stream middleware applied to every stream request type.
pub trait OpenStreamBehavior: Send + Sync + 'static {
    /// Wraps the erased stream produced by `next`.
    fn handle(
        &self,
        info: RequestInfo,
        request: Arc<dyn Any + Send + Sync>,
        next: OpenStreamNext,
        cancel: CancellationToken,
    ) -> ItemStream<ErasedItem>;
}

/// Runs an [`OpenStreamBehavior`] as the typed stream behavior of `R`.
pub struct OpenStreamBehaviorAdapter<R> {
    inner: Arc<dyn OpenStreamBehavior>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> OpenStreamBehaviorAdapter<R> {
    /// Adapts the given open stream behavior.
    pub fn new(inner: Arc<dyn OpenStreamBehavior>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<R: StreamRequest> StreamPipelineBehavior<R> for OpenStreamBehaviorAdapter<R> {
    fn handle(
        &self,
        request: Arc<R>,
        next: StreamNext<R>,
        cancel: CancellationToken,
    ) -> ItemStream<R::Item> {
        let open_next = OpenStreamNext::new(move || {
            next.run()
                .map_ok(|item| Box::new(item) as ErasedItem)
                .boxed()
        });

        self.inner
            .handle(
                RequestInfo::of::<R>(),
                request as Arc<dyn Any + Send + Sync>,
                open_next,
                cancel,
            )
            .map(|item| {
                item.and_then(|erased| {
                    erased.downcast::<R::Item>().map(|item| *item).map_err(|_| {
                        Box::new(ResponseTypeMismatch {
                            expected: std::any::type_name::<R::Item>(),
                        }) as BoxError
                    })
                })
            })
            .boxed()
    }
}
