//! Derive and attribute macros for Herald.
//!
//! Generated code refers to the `herald` facade crate by absolute path.

use proc_macro::TokenStream;

mod handler;
mod message;
mod signature;
mod subscribe;

/// Derive macro for implementing the `Request` trait.
///
/// The response type is given with `#[request(response = T)]` and defaults to
/// `()`.
///
/// ```rust,ignore
/// #[derive(Request)]
/// #[request(response = Customer)]
/// struct LoadCustomer {
///     id: u64,
/// }
/// ```
#[proc_macro_derive(Request, attributes(request))]
pub fn derive_request(input: TokenStream) -> TokenStream {
    message::derive_request_impl(input)
}

/// Derive macro for implementing the `Notification` trait.
#[proc_macro_derive(Notification)]
pub fn derive_notification(input: TokenStream) -> TokenStream {
    message::derive_notification_impl(input)
}

/// Derive macro for implementing the `StreamRequest` trait.
///
/// The item type is required: `#[stream(item = T)]`.
#[proc_macro_derive(StreamRequest, attributes(stream))]
pub fn derive_stream_request(input: TokenStream) -> TokenStream {
    message::derive_stream_request_impl(input)
}

/// Turns an async function into a `RequestHandler`.
///
/// The function takes the request by reference, optionally followed by a
/// `&CancellationToken`, and returns `Result<Response, E>` with
/// `E: Into<BoxError>`. A unit struct named after the function implements the
/// handler.
///
/// Arguments:
/// - `name = "..."` renames the generated struct
/// - `auto_bind` submits the handler for [`RegistryBuilder::auto_bind`]
///   (requires the `inventory` feature)
///
/// ```rust,ignore
/// #[handler]
/// async fn load_customer(request: &LoadCustomer) -> Result<Customer, BoxError> {
///     Ok(Customer::new(request.id))
/// }
///
/// let registry = Registry::builder().request_handler::<LoadCustomer, _>(load_customer);
/// ```
#[proc_macro_attribute]
pub fn handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    handler::handler_impl(attr, item)
}

/// Turns an async function into a `NotificationHandler`.
///
/// Same arguments and signature rules as [`macro@handler`]; the function may
/// return nothing.
#[proc_macro_attribute]
pub fn subscribe(attr: TokenStream, item: TokenStream) -> TokenStream {
    subscribe::subscribe_impl(attr, item)
}
