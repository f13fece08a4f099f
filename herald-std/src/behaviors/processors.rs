//! Pre- and post-processor runners.

use herald_core::{
    BoxError, DynRequestPostProcessor, DynRequestPreProcessor, Next, PipelineBehavior, Request,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs every pre-processor of `R`, in order, then the rest of the chain.
pub struct PreProcessorBehavior<R: Request> {
    processors: Vec<Arc<dyn DynRequestPreProcessor<R>>>,
}

impl<R: Request> PreProcessorBehavior<R> {
    /// Create a runner over the given processors.
    pub fn new(processors: Vec<Arc<dyn DynRequestPreProcessor<R>>>) -> Self {
        Self { processors }
    }
}

impl<R: Request> PipelineBehavior<R> for PreProcessorBehavior<R> {
    async fn handle(
        &self,
        request: &R,
        next: Next<'_, R>,
        cancel: &CancellationToken,
    ) -> Result<R::Response, BoxError> {
        for processor in &self.processors {
            processor.process_dyn(request, cancel).await?;
        }
        next.run().await
    }
}

/// Runs the rest of the chain, then every post-processor of `R` with the
/// response.
pub struct PostProcessorBehavior<R: Request> {
    processors: Vec<Arc<dyn DynRequestPostProcessor<R>>>,
}

impl<R: Request> PostProcessorBehavior<R> {
    /// Create a runner over the given processors.
    pub fn new(processors: Vec<Arc<dyn DynRequestPostProcessor<R>>>) -> Self {
        Self { processors }
    }
}

impl<R: Request> PipelineBehavior<R> for PostProcessorBehavior<R> {
    async fn handle(
        &self,
        request: &R,
        next: Next<'_, R>,
        cancel: &CancellationToken,
    ) -> Result<R::Response, BoxError> {
        let response = next.run().await?;
        for processor in &self.processors {
            processor.process_dyn(request, &response, cancel).await?;
        }
        Ok(response)
    }
}
