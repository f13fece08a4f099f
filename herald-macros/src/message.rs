//! Message derives.
//!
//! This module contains:
//! - `#[derive(Request)]` with `#[request(response = T)]`
//! - `#[derive(Notification)]`
//! - `#[derive(StreamRequest)]` with `#[stream(item = T)]`

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Type, parse_macro_input};

/// Reads `#[<attr>(<key> = Type)]` from the derive input.
fn type_argument(input: &DeriveInput, attr: &str, key: &str) -> syn::Result<Option<Type>> {
    let mut found = None;
    for attribute in input.attrs.iter().filter(|a| a.path().is_ident(attr)) {
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                found = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error(format!("unknown `{attr}` argument, expected `{key}`")))
            }
        })?;
    }
    Ok(found)
}

/// Implementation of `#[derive(Request)]`.
pub fn derive_request_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let response = match type_argument(&input, "request", "response") {
        Ok(Some(ty)) => quote! { #ty },
        Ok(None) => quote! { () },
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        impl #impl_generics ::herald::Request for #name #ty_generics #where_clause {
            type Response = #response;
        }
    };

    TokenStream::from(expanded)
}

/// Implementation of `#[derive(Notification)]`.
pub fn derive_notification_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::herald::Notification for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// Implementation of `#[derive(StreamRequest)]`.
pub fn derive_stream_request_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let item = match type_argument(&input, "stream", "item") {
        Ok(Some(ty)) => ty,
        Ok(None) => {
            return syn::Error::new_spanned(
                name,
                "StreamRequest needs its item type: #[stream(item = T)]",
            )
            .to_compile_error()
            .into();
        }
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        impl #impl_generics ::herald::StreamRequest for #name #ty_generics #where_clause {
            type Item = #item;
        }
    };

    TokenStream::from(expanded)
}
