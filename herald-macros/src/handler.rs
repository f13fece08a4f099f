//! Handler-related macros.
//!
//! This module contains:
//! - `#[handler]` - Attribute macro turning an async function into a `RequestHandler`

use crate::signature::{HandlerArgs, HandlerFn};
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Implementation of the `#[handler]` macro.
pub fn handler_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as HandlerArgs);
    let input = parse_macro_input!(item as ItemFn);

    let handler = match HandlerFn::parse(&input, &args, "Handler") {
        Ok(handler) => handler,
        Err(err) => return err.to_compile_error().into(),
    };

    if let syn::ReturnType::Default = input.sig.output {
        return syn::Error::new_spanned(
            &input.sig,
            "Handler function must return Result<Response, E> where E: Into<BoxError>",
        )
        .to_compile_error()
        .into();
    }

    let struct_name = &handler.struct_name;
    let request_type = &handler.message_type;
    let struct_decl = handler.struct_decl("handler");
    let inner_fn = handler.inner_fn();
    let inner_call = handler.inner_call();

    let category = if returns_unit(&input.sig.output) {
        quote! { ::herald::HandlerCategories::VOID_REQUEST_HANDLERS }
    } else {
        quote! { ::herald::HandlerCategories::REQUEST_HANDLERS }
    };
    let auto_bind = args.auto_bind.then(|| {
        handler.auto_bind(
            category,
            quote! { builder.request_handler::<#request_type, #struct_name>(#struct_name) },
        )
    });

    let expanded = quote! {
        #struct_decl

        impl ::herald::RequestHandler<#request_type> for #struct_name {
            async fn handle(
                &self,
                __message: &#request_type,
                __cancel: &::herald::CancellationToken,
            ) -> ::core::result::Result<
                <#request_type as ::herald::Request>::Response,
                ::herald::BoxError,
            > {
                #inner_fn
                ::core::result::Result::map_err(#inner_call, ::core::convert::Into::into)
            }
        }

        #auto_bind
    };

    TokenStream::from(expanded)
}

/// Whether the function returns `Result<(), _>`.
fn returns_unit(output: &syn::ReturnType) -> bool {
    let syn::ReturnType::Type(_, ty) = output else {
        return false;
    };
    let syn::Type::Path(path) = &**ty else {
        return false;
    };
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(syn::GenericArgument::Type(syn::Type::Tuple(tuple))) if tuple.elems.is_empty()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_response_is_detected() {
        let unit: syn::ReturnType = syn::parse_quote!(-> Result<(), std::io::Error>);
        let value: syn::ReturnType = syn::parse_quote!(-> Result<u32, BoxError>);
        assert!(returns_unit(&unit));
        assert!(!returns_unit(&value));
    }
}
