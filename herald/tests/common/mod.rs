#![allow(dead_code)]

use herald::{
    BoxError, CancellationToken, Dispatcher, MediatorConfig, Next, PipelineBehavior, RegistryBuilder,
    Request, RequestHandler,
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Request Types
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Ping {
    pub message: String,
}

impl Ping {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Request for Ping {
    type Response = Pong;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pong {
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct VoidCommand;

impl Request for VoidCommand {
    type Response = ();
}

// ============================================================================
// Test Errors
// ============================================================================

#[derive(thiserror::Error, Debug)]
#[error("ping failed: {0}")]
pub struct PingError(pub String);

// ============================================================================
// Test Handlers and Behaviors
// ============================================================================

pub struct PingHandler;

impl RequestHandler<Ping> for PingHandler {
    async fn handle(&self, request: &Ping, _cancel: &CancellationToken) -> Result<Pong, BoxError> {
        Ok(Pong {
            message: format!("{} Pong", request.message),
        })
    }
}

/// Records `"<label>:before"` and `"<label>:after"` around the rest of the
/// pipeline.
pub struct TracingBehavior {
    pub label: &'static str,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl<R: Request> PipelineBehavior<R> for TracingBehavior {
    async fn handle(
        &self,
        _request: &R,
        next: Next<'_, R>,
        _cancel: &CancellationToken,
    ) -> Result<R::Response, BoxError> {
        self.log.lock().unwrap().push(format!("{}:before", self.label));
        let result = next.run().await;
        self.log.lock().unwrap().push(format!("{}:after", self.label));
        result
    }
}

pub fn new_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A dispatcher over `registry` with the default configuration.
pub fn mediator(registry: RegistryBuilder) -> Dispatcher {
    MediatorConfig::default().build(registry)
}
