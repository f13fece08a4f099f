//! The default mediator.
//!
//! [`Dispatcher`] resolves everything it needs per call from its resolver,
//! composes the pipeline and runs it. Built-in stages wrap a request in this
//! order, outermost first:
//!
//! 1. post-processors
//! 2. pre-processors
//! 3. exception interception
//! 4. behaviors configured on the mediator, in configuration order
//! 5. behaviors registered for the request type, in registration order
//!
//! followed by the request handler.

mod pipeline;

use crate::{
    behaviors::{ExceptionBehavior, PostProcessorBehavior, PreProcessorBehavior},
    publishers::SequentialPublisher,
};
use futures::{StreamExt, TryStreamExt};
use herald_core::{
    DynExceptionAction, DynExceptionHandler, DynNotificationHandler, DynNotificationPublisher,
    DynOpenBehavior, DynPipelineBehavior, DynRequestHandler, DynRequestPostProcessor,
    DynRequestPreProcessor, HandlerExecutor, MediatorError, Notification, OpenBehaviorAdapter,
    OpenStreamBehavior, OpenStreamBehaviorAdapter, Publisher, Request, Resolver, ResolverExt,
    ResponseStream, Sender, StreamPipelineBehavior, StreamRequest, StreamRequestHandler,
    StreamSender,
};
use std::{any::Any, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// The default [`Mediator`](herald_core::Mediator) implementation.
///
/// Cheap to clone: every part is shared.
#[derive(Clone)]
pub struct Dispatcher {
    resolver: Arc<dyn Resolver>,
    publisher: Arc<dyn DynNotificationPublisher>,
    behaviors: Arc<[Arc<dyn DynOpenBehavior>]>,
    stream_behaviors: Arc<[Arc<dyn OpenStreamBehavior>]>,
}

impl Dispatcher {
    /// Creates a dispatcher with sequential publishing and no open behaviors.
    ///
    /// Use [`MediatorConfig`](crate::config::MediatorConfig) for anything
    /// else.
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self::from_parts(
            resolver,
            Arc::new(SequentialPublisher),
            Arc::from(Vec::new()),
            Arc::from(Vec::new()),
        )
    }

    pub(crate) fn from_parts(
        resolver: Arc<dyn Resolver>,
        publisher: Arc<dyn DynNotificationPublisher>,
        behaviors: Arc<[Arc<dyn DynOpenBehavior>]>,
        stream_behaviors: Arc<[Arc<dyn OpenStreamBehavior>]>,
    ) -> Self {
        Self {
            resolver,
            publisher,
            behaviors,
            stream_behaviors,
        }
    }

    /// The same mediator over another resolver, typically a new scope of the
    /// registry.
    pub fn with_resolver(&self, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            ..self.clone()
        }
    }

    /// The resolver this dispatcher pulls handlers from.
    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    fn pipeline_for<R: Request>(&self) -> Result<Vec<Arc<dyn DynPipelineBehavior<R>>>, MediatorError> {
        let post = self.resolver.resolve_many::<dyn DynRequestPostProcessor<R>>()?;
        let pre = self.resolver.resolve_many::<dyn DynRequestPreProcessor<R>>()?;
        let handlers = self.resolver.resolve_many::<dyn DynExceptionHandler<R>>()?;
        let actions = self.resolver.resolve_many::<dyn DynExceptionAction<R>>()?;
        let typed = self.resolver.resolve_many::<dyn DynPipelineBehavior<R>>()?;

        let mut chain: Vec<Arc<dyn DynPipelineBehavior<R>>> =
            Vec::with_capacity(3 + self.behaviors.len() + typed.len());
        if !post.is_empty() {
            chain.push(Arc::new(PostProcessorBehavior::new(post)));
        }
        if !pre.is_empty() {
            chain.push(Arc::new(PreProcessorBehavior::new(pre)));
        }
        if !handlers.is_empty() || !actions.is_empty() {
            chain.push(Arc::new(ExceptionBehavior::new(handlers, actions)));
        }
        chain.extend(self.behaviors.iter().map(|behavior| {
            Arc::new(OpenBehaviorAdapter::<R>::new(Arc::clone(behavior)))
                as Arc<dyn DynPipelineBehavior<R>>
        }));
        chain.extend(typed);
        Ok(chain)
    }
}

impl Sender for Dispatcher {
    async fn send<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        let name = std::any::type_name::<R>();
        tracing::debug!(request = name, "dispatching request");

        let handler = self.resolver.resolve::<dyn DynRequestHandler<R>>()?;
        let chain = self.pipeline_for::<R>()?;

        match pipeline::run_chain(&chain, handler.as_ref(), &request, cancel).await {
            Ok(response) => {
                tracing::debug!(request = name, handler = handler.name(), "request handled");
                Ok(response)
            }
            Err(error) => {
                let error = MediatorError::from_domain(error);
                tracing::debug!(request = name, %error, "request failed");
                Err(error)
            }
        }
    }
}

impl Publisher for Dispatcher {
    async fn publish<N: Notification>(
        &self,
        notification: N,
        cancel: &CancellationToken,
    ) -> Result<(), MediatorError> {
        let span = tracing::debug_span!("publish", notification = std::any::type_name::<N>());

        async move {
            let handlers = self.resolver.resolve_many::<dyn DynNotificationHandler<N>>()?;
            if handlers.is_empty() {
                tracing::debug!("no notification handlers bound");
                return Ok(());
            }

            let notification = &notification;
            let executors = handlers
                .iter()
                .map(|handler| {
                    let handler = handler.as_ref();
                    HandlerExecutor::new(handler.name(), move || {
                        handler.handle_dyn(notification, cancel)
                    })
                })
                .collect();

            self.publisher
                .publish_dyn(executors, notification as &(dyn Any + Send + Sync), cancel)
                .await
                .map_err(MediatorError::from_domain)
        }
        .instrument(span)
        .await
    }
}

impl StreamSender for Dispatcher {
    fn create_stream<R: StreamRequest>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<ResponseStream<R::Item>, MediatorError> {
        tracing::debug!(request = std::any::type_name::<R>(), "creating stream");

        let handler = self.resolver.resolve::<dyn StreamRequestHandler<R>>()?;
        let mut behaviors: Vec<Arc<dyn StreamPipelineBehavior<R>>> = self
            .stream_behaviors
            .iter()
            .map(|behavior| {
                Arc::new(OpenStreamBehaviorAdapter::<R>::new(Arc::clone(behavior)))
                    as Arc<dyn StreamPipelineBehavior<R>>
            })
            .collect();
        behaviors.extend(self.resolver.resolve_many::<dyn StreamPipelineBehavior<R>>()?);

        let token = cancel.clone();
        let stream = pipeline::run_stream_chain(
            behaviors.into(),
            0,
            handler,
            Arc::new(request),
            cancel.clone(),
        )
        .map_err(MediatorError::from_domain)
        .take_until(async move { token.cancelled().await })
        .boxed();

        Ok(stream)
    }
}
