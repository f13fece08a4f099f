//! Exception interception.

use herald_core::{
    BoxError, Cancelled, DynExceptionAction, DynExceptionHandler, ExceptionState, MediatorError,
    Next, PipelineBehavior, Request,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Offers failures of the inner chain to the exception handlers and actions
/// of `R`.
///
/// - Matching handlers run most specific first, registration order breaking
///   ties. All of them run, even after one marked the failure handled.
/// - Matching actions then run in registration order, handled or not. Their
///   failures are logged and otherwise ignored.
/// - A handled failure yields the substitute response; anything else is
///   returned unchanged.
///
/// Cancellation and configuration errors are never intercepted. A failing
/// exception handler ends interception: lower ranked handlers are skipped and
/// the actions matching the handler's own error run before it is returned.
pub struct ExceptionBehavior<R: Request> {
    handlers: Vec<Arc<dyn DynExceptionHandler<R>>>,
    actions: Vec<Arc<dyn DynExceptionAction<R>>>,
}

impl<R: Request> ExceptionBehavior<R> {
    /// Create an interceptor over the given handlers and actions.
    pub fn new(
        handlers: Vec<Arc<dyn DynExceptionHandler<R>>>,
        actions: Vec<Arc<dyn DynExceptionAction<R>>>,
    ) -> Self {
        Self { handlers, actions }
    }
}

fn bypasses_interception(error: &BoxError) -> bool {
    error.is::<Cancelled>()
        || error
            .downcast_ref::<MediatorError>()
            .is_some_and(|nested| !matches!(nested, MediatorError::Handler(_)))
}

/// Strips the `MediatorError::Handler` layers a nested `send` adds, so that
/// handlers see the same domain error the caller would.
fn unwrap_nested(mut error: BoxError) -> BoxError {
    loop {
        error = match error.downcast::<MediatorError>() {
            Ok(nested) => match *nested {
                MediatorError::Handler(inner) => inner,
                other => return Box::new(other),
            },
            Err(error) => return error,
        };
    }
}

impl<R: Request> ExceptionBehavior<R> {
    async fn run_actions(&self, request: &R, error: &BoxError, cancel: &CancellationToken) {
        for action in &self.actions {
            if action.depth(error.as_ref()).is_none() {
                continue;
            }
            if let Err(action_error) = action.execute_dyn(request, error.as_ref(), cancel).await {
                tracing::warn!(action = action.name(), error = %action_error, "exception action failed");
            }
        }
    }
}

impl<R: Request> PipelineBehavior<R> for ExceptionBehavior<R> {
    async fn handle(
        &self,
        request: &R,
        next: Next<'_, R>,
        cancel: &CancellationToken,
    ) -> Result<R::Response, BoxError> {
        let error = match next.run().await {
            Ok(response) => return Ok(response),
            Err(error) => unwrap_nested(error),
        };
        if bypasses_interception(&error) {
            return Err(error);
        }

        let mut matching: Vec<(usize, &Arc<dyn DynExceptionHandler<R>>)> = self
            .handlers
            .iter()
            .filter_map(|handler| handler.depth(error.as_ref()).map(|depth| (depth, handler)))
            .collect();
        // Stable: equal depths keep registration order.
        matching.sort_by_key(|(depth, _)| *depth);

        let mut state = ExceptionState::new();
        for (_, handler) in matching {
            tracing::debug!(handler = handler.name(), %error, "invoking exception handler");
            let outcome = handler
                .handle_dyn(request, error.as_ref(), &mut state, cancel)
                .await;
            if let Err(handler_error) = outcome {
                let handler_error = unwrap_nested(handler_error);
                tracing::warn!(handler = handler.name(), error = %handler_error, "exception handler failed");
                if !bypasses_interception(&handler_error) {
                    self.run_actions(request, &handler_error, cancel).await;
                }
                return Err(handler_error);
            }
        }

        self.run_actions(request, &error, cancel).await;

        match state.into_response() {
            Some(response) => {
                tracing::warn!(
                    request = std::any::type_name::<R>(),
                    %error,
                    "failure handled, returning substitute response"
                );
                Ok(response)
            }
            None => Err(error),
        }
    }
}
