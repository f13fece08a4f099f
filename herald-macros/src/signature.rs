//! Shared parsing for function-based handlers.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    FnArg, Ident, ItemFn, LitStr, Token, Type,
    parse::{Parse, ParseStream},
};

/// Arguments accepted by `#[handler]` and `#[subscribe]`.
pub(crate) struct HandlerArgs {
    /// Custom name for the generated struct.
    pub name: Option<String>,
    /// Submit the handler for auto-binding.
    pub auto_bind: bool,
}

impl Parse for HandlerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut auto_bind = false;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                "auto_bind" => auto_bind = true,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(HandlerArgs { name, auto_bind })
    }
}

/// An `async fn(message: &M[, cancel: &CancellationToken]) -> ...`.
pub(crate) struct HandlerFn<'a> {
    pub function: &'a ItemFn,
    pub struct_name: Ident,
    pub message_type: Type,
    pub takes_cancel: bool,
}

impl<'a> HandlerFn<'a> {
    /// Validates the function shape.
    pub fn parse(function: &'a ItemFn, args: &HandlerArgs, what: &str) -> syn::Result<Self> {
        let sig = &function.sig;

        if sig.asyncness.is_none() {
            return Err(syn::Error::new_spanned(
                sig.fn_token,
                format!("{what} function must be async"),
            ));
        }
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                format!("{what} function cannot be generic"),
            ));
        }

        let message_type = match sig.inputs.first() {
            Some(FnArg::Typed(pat_type)) => match &*pat_type.ty {
                Type::Reference(reference) if reference.mutability.is_none() => {
                    (*reference.elem).clone()
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        format!("{what} message argument must be a shared reference (&Message)"),
                    ));
                }
            },
            Some(FnArg::Receiver(receiver)) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    format!("{what} function cannot take self"),
                ));
            }
            None => {
                return Err(syn::Error::new_spanned(
                    &sig.inputs,
                    format!("{what} function must take the message: fn(message: &Message)"),
                ));
            }
        };

        let takes_cancel = match sig.inputs.len() {
            1 => false,
            2 => true,
            _ => {
                return Err(syn::Error::new_spanned(
                    &sig.inputs,
                    format!(
                        "{what} function takes the message and optionally a &CancellationToken"
                    ),
                ));
            }
        };

        let struct_name = match &args.name {
            Some(custom) => Ident::new(custom, sig.ident.span()),
            None => sig.ident.clone(),
        };

        Ok(Self {
            function,
            struct_name,
            message_type,
            takes_cancel,
        })
    }

    /// The user function, renamed to `__inner` and private.
    pub fn inner_fn(&self) -> TokenStream2 {
        let mut inner = self.function.clone();
        inner.sig.ident = format_ident!("__inner");
        inner.vis = syn::Visibility::Inherited;
        inner.attrs.retain(|attr| !attr.path().is_ident("doc"));
        quote! { #inner }
    }

    /// Call of `__inner` with the trait method's parameters.
    pub fn inner_call(&self) -> TokenStream2 {
        if self.takes_cancel {
            quote! { __inner(__message, __cancel).await }
        } else {
            quote! { __inner(__message).await }
        }
    }

    /// The unit struct standing for the handler.
    pub fn struct_decl(&self, macro_name: &str) -> TokenStream2 {
        let struct_name = &self.struct_name;
        let fn_name = &self.function.sig.ident;
        let fn_vis = &self.function.vis;
        let doc = format!("Auto-generated handler from `#[herald::{macro_name}]` on `{fn_name}`");

        quote! {
            #[allow(non_camel_case_types)]
            #[derive(Clone, Copy, Debug, Default)]
            #[doc = #doc]
            #fn_vis struct #struct_name;
        }
    }

    /// `inventory` submission adding the handler to a registry builder.
    pub fn auto_bind(&self, category: TokenStream2, register: TokenStream2) -> TokenStream2 {
        let struct_name = &self.struct_name;
        let register_fn = format_ident!("__herald_register_{}", struct_name);

        quote! {
            #[doc(hidden)]
            #[allow(non_snake_case)]
            fn #register_fn(builder: ::herald::RegistryBuilder) -> ::herald::RegistryBuilder {
                #register
            }

            ::herald::inventory::submit! {
                ::herald::AutoBinding::new(
                    #category,
                    concat!(module_path!(), "::", stringify!(#struct_name)),
                    #register_fn,
                )
            }
        }
    }
}
