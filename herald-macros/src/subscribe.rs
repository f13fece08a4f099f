//! Subscribe-related macros.
//!
//! This module contains:
//! - `#[subscribe]` - Attribute macro turning an async function into a `NotificationHandler`

use crate::signature::{HandlerArgs, HandlerFn};
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Implementation of the `#[subscribe]` macro.
///
/// The function may return nothing or a `Result<(), E>` where
/// `E: Into<BoxError>`.
pub fn subscribe_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as HandlerArgs);
    let input = parse_macro_input!(item as ItemFn);

    let handler = match HandlerFn::parse(&input, &args, "Subscriber") {
        Ok(handler) => handler,
        Err(err) => return err.to_compile_error().into(),
    };

    let struct_name = &handler.struct_name;
    let notification_type = &handler.message_type;
    let struct_decl = handler.struct_decl("subscribe");
    let inner_fn = handler.inner_fn();
    let inner_call = handler.inner_call();

    let call_body = match input.sig.output {
        syn::ReturnType::Default => quote! {
            #inner_call;
            ::core::result::Result::Ok(())
        },
        syn::ReturnType::Type(..) => quote! {
            ::core::result::Result::map_err(#inner_call, ::core::convert::Into::into)
        },
    };

    let auto_bind = args.auto_bind.then(|| {
        handler.auto_bind(
            quote! { ::herald::HandlerCategories::NOTIFICATION_HANDLERS },
            quote! { builder.notification_handler::<#notification_type, #struct_name>(#struct_name) },
        )
    });

    let expanded = quote! {
        #struct_decl

        impl ::herald::NotificationHandler<#notification_type> for #struct_name {
            async fn handle(
                &self,
                __message: &#notification_type,
                __cancel: &::herald::CancellationToken,
            ) -> ::core::result::Result<(), ::herald::BoxError> {
                #inner_fn
                #call_body
            }
        }

        #auto_bind
    };

    TokenStream::from(expanded)
}
