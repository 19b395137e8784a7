//! `#[derive(Bind)]` and `#[derive(ParamEnum)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{bind_fields, enum_cases, reject_generics, Accept, BindAttrs};

/// Expands `#[derive(Bind)]` into a `Bindable` impl backed by a static contract.
pub fn expand_bind(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    reject_generics(&input, "Bind")?;

    let attrs = BindAttrs::from_attrs(&input.attrs)?;
    let fields = bind_fields(&input)?;
    let ident = &input.ident;
    let type_name = ident.to_string();

    let factory = attrs.factory.as_ref().map_or_else(
        || quote! { <#ident as ::core::default::Default>::default },
        |path| quote! { #path },
    );

    let accept = (!attrs.accept.is_empty()).then(|| {
        let formats = attrs.accept.iter().map(|format| match format {
            Accept::Json => quote! { ::reqbind::MediaType::Json },
            Accept::Form => quote! { ::reqbind::MediaType::FormUrlEncoded },
        });
        quote! { .accept(&[#(#formats),*]) }
    });

    let field_calls = fields.iter().map(|field| {
        let member = &field.ident;
        let ty = &field.ty;
        let name = &field.name;
        let required = field.required;
        let default_value = &field.default_value;
        let message = &field.message;
        quote! {
            .field(
                ::reqbind::FieldSpec::new(#name)
                    .required(#required)
                    .default_value(#default_value)
                    .message(#message),
                |target: &mut #ident, value: #ty| target.#member = value,
            )
        }
    });

    Ok(quote! {
        impl ::reqbind::Bindable for #ident {
            fn contract() -> &'static ::reqbind::Contract<Self> {
                static CONTRACT: ::std::sync::OnceLock<::reqbind::Contract<#ident>> =
                    ::std::sync::OnceLock::new();
                CONTRACT.get_or_init(|| {
                    ::reqbind::Contract::builder(#factory)
                        .type_name(#type_name)
                        #accept
                        #(#field_calls)*
                        .build()
                })
            }
        }
    })
}

/// Expands `#[derive(ParamEnum)]` into `ParamEnum` and `FieldValue` impls.
pub fn expand_param_enum(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    reject_generics(&input, "ParamEnum")?;

    let cases = enum_cases(&input)?;
    let ident = &input.ident;
    let type_name = ident.to_string();

    let names: Vec<_> = cases.iter().map(|c| c.case.as_str()).collect();
    let variants: Vec<_> = cases.iter().map(|c| &c.ident).collect();

    Ok(quote! {
        impl ::reqbind::ParamEnum for #ident {
            const NAME: &'static str = #type_name;
            const CASES: &'static [&'static str] = &[#(#names),*];

            fn from_case(case: &str) -> ::core::option::Option<Self> {
                match case {
                    #(#names => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn as_case(&self) -> &'static str {
                match self {
                    #(Self::#variants => #names,)*
                }
            }
        }

        impl ::reqbind::FieldValue for #ident {
            fn descriptor() -> ::reqbind::TypeDescriptor {
                <Self as ::reqbind::ParamEnum>::enum_descriptor()
            }

            fn from_param(
                value: ::reqbind::ParamValue,
            ) -> ::core::result::Result<Self, ::std::string::String> {
                <Self as ::reqbind::ParamEnum>::from_enum_value(value)
            }
        }
    })
}
