//! `#[derive(Error)]` for the error types used throughout the workspace.
//!
//! Every enum variant (or the struct itself) carries a `#[msg = "..."]` attribute
//! that becomes its [Display](std::fmt::Display) output. A message may refer to the
//! wrapped value as `{0}`.
//!
//! ```ignore
//! #[derive(Debug, Error)]
//! enum Error {
//!     #[msg = "label is too long"]
//!     TooLong,
//!
//!     #[msg = "io failure: {0}"]
//!     Io(std::io::Error),
//! }
//! ```
//!
//! Enum variants that wrap a single value also get a `From` impl and report
//! the wrapped value as their [source](std::error::Error::source).

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

#[proc_macro_derive(Error, attributes(msg))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    let item: syn::DeriveInput = syn::parse(input).expect("Could not parse input as enum or struct");

    let expanded = match &item.data {
        syn::Data::Enum(data) => derive_for_enum(&item, data),
        syn::Data::Struct(data) => derive_for_struct(&item, data),
        syn::Data::Union(_) => panic!("unions are not supported"),
    };

    expanded.into()
}

fn message_attribute(attrs: &[syn::Attribute]) -> Option<&syn::Expr> {
    attrs
        .iter()
        .flat_map(|attr| match &attr.meta {
            syn::Meta::NameValue(name_value) => Some(name_value),
            _ => None,
        })
        .flat_map(|attr| {
            let ident = attr.path.get_ident()?.to_string();

            Some((ident, &attr.value))
        })
        .find(|(name, _)| name == "msg")
        .map(|(_, value)| value)
}

/// Whether the message is a string literal that mentions the wrapped value
fn interpolates_field(message: &syn::Expr) -> bool {
    match message {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(literal),
            ..
        }) => literal.value().contains("{0"),
        _ => false,
    }
}

fn display_arm(message: &syn::Expr, binding: TokenStream2) -> TokenStream2 {
    if interpolates_field(message) {
        quote!(::std::write!(f, #message, #binding))
    } else {
        quote!(::std::fmt::Display::fmt(&(#message), f))
    }
}

fn derive_for_enum(item: &syn::DeriveInput, data: &syn::DataEnum) -> TokenStream2 {
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    let mut variant_displays = vec![];
    let mut from_impls = vec![];
    let mut variant_sources = vec![];

    for variant in &data.variants {
        let ident = &variant.ident;

        let Some(message) = message_attribute(&variant.attrs) else {
            panic!("variant {ident} needs a #[msg = \"...\"] attribute");
        };

        match &variant.fields {
            syn::Fields::Unit => {
                let display = display_arm(message, quote!(""));
                variant_displays.push(quote!(Self::#ident => #display));
            },
            syn::Fields::Unnamed(unnamed_fields) => {
                if unnamed_fields.unnamed.len() != 1 {
                    panic!("variant {ident} must wrap exactly one value");
                }

                let ty = &unnamed_fields.unnamed[0].ty;

                from_impls.push(quote!(
                    #[automatically_derived]
                    impl #impl_generics From<#ty> for #name #ty_generics #where_clause {
                        fn from(value: #ty) -> Self {
                            Self::#ident(value)
                        }
                    }
                ));

                let display = display_arm(message, quote!(value));
                let binding = if interpolates_field(message) {
                    quote!(value)
                } else {
                    quote!(_)
                };
                variant_displays.push(quote!(Self::#ident(#binding) => #display));
                variant_sources.push(quote!(Self::#ident(value) => Some(value)));
            },
            syn::Fields::Named(_) => panic!("named fields are not allowed"),
        }
    }

    quote!(
        #[automatically_derived]
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(
                        #variant_displays,
                    )*
                }
            }
        }

        #(
            #from_impls
        )*

        #[automatically_derived]
        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {
            #[allow(unreachable_patterns)]
            fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
                match self {
                    #(
                        #variant_sources,
                    )*
                    _ => None,
                }
            }
        }
    )
}

fn derive_for_struct(item: &syn::DeriveInput, data: &syn::DataStruct) -> TokenStream2 {
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    let Some(message) = message_attribute(&item.attrs) else {
        panic!("{name} needs a #[msg = \"...\"] attribute");
    };

    let display = match &data.fields {
        syn::Fields::Unit => display_arm(message, quote!("")),
        syn::Fields::Unnamed(unnamed_fields) if unnamed_fields.unnamed.len() == 1 => {
            display_arm(message, quote!(self.0))
        },
        _ => panic!("{name} must be a unit struct or wrap exactly one value"),
    };

    quote!(
        #[automatically_derived]
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #display
            }
        }

        #[automatically_derived]
        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    )
}
