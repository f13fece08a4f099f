//! Message markers for requests, notifications and stream requests.

/// A marker trait for values that travel through the mediator.
///
/// Messages must be `Send + Sync + 'static` so they can be borrowed across
/// every await point of a pipeline. Every such type is a message.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Everything dispatched through Herald must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}

/// A value expecting exactly one handler and producing a response.
///
/// Void-like requests use `()` as their response; `send` then resolves to
/// `()` and the caller never has to invent a value.
///
/// # Example
///
/// ```rust,ignore
/// struct Ping(String);
///
/// impl Request for Ping {
///     type Response = String;
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Request",
    label = "missing `Request` implementation",
    note = "Implement `Request` (or `#[derive(Request)]`) and name its `Response` type."
)]
pub trait Request: Message {
    /// The value produced by the request's handler.
    type Response: Send + Sync + 'static;
}

/// A value broadcast to zero or more handlers. Produces no response.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Notification",
    label = "missing `Notification` implementation",
    note = "Implement `Notification` (or `#[derive(Notification)]`)."
)]
pub trait Notification: Message {}

/// A request whose single handler produces an asynchronous sequence of items.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a StreamRequest",
    label = "missing `StreamRequest` implementation",
    note = "Implement `StreamRequest` (or `#[derive(StreamRequest)]`) and name its `Item` type."
)]
pub trait StreamRequest: Message {
    /// The type of each element yielded by the stream.
    type Item: Send + 'static;
}
