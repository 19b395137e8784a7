//! Derive macros for reqbind.
//!
//! `#[derive(Bind)]` declares a struct's binding contract from `#[param]`
//! field attributes; the contract is built once on first use and shared.
//! `#[derive(ParamEnum)]` makes a fieldless enum bindable from its case names.
//!
//! Names are checked at compile time: an empty or repeated parameter name,
//! an unknown attribute key or a `default` on a required field is a compile
//! error rather than a runtime surprise.
//!
//! # Example
//!
//! ```rust,ignore
//! use reqbind::{Bind, ParamEnum};
//!
//! #[derive(Debug, Clone, Copy, Default, ParamEnum)]
//! enum Sort {
//!     #[default]
//!     Newest,
//!     #[param(rename = "TOP")]
//!     MostVoted,
//! }
//!
//! #[derive(Debug, Default, Bind)]
//! #[bind(accept = "json")]
//! struct Listing {
//!     #[param(name = "tags", required, message = "Pick at least one tag")]
//!     tags: Vec<String>,
//!     #[param(name = "sort", default = "NEWEST")]
//!     sort: Sort,
//!     #[param(name = "pageSize", default = "20")]
//!     page_size: i32,
//! }
//! ```

mod bind;
mod parse;

use proc_macro::TokenStream;

/// Derives `reqbind::Bindable` for a struct with named fields.
///
/// # Field attributes
///
/// Only fields carrying `#[param]` are bound; other fields keep the value the
/// factory gave them.
///
/// - `name = "..."`: external parameter name (defaults to the field name)
/// - `required` or `required = bool`: absence is a violation
/// - `default = "..."`: raw value bound when the parameter is absent
/// - `message = "..."`: missing-parameter message (defaults to the name)
///
/// # Container attributes
///
/// - `#[bind(factory = path)]`: zero-argument constructor (defaults to
///   `Default::default`)
/// - `#[bind(accept = "json")]`, `"form"` or `"json, form"`: body formats
///   the body binder accepts (defaults to both)
#[proc_macro_derive(Bind, attributes(param, bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    bind::expand_bind(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `reqbind::ParamEnum` and `reqbind::FieldValue` for a fieldless enum.
///
/// Case names default to the SCREAMING_SNAKE_CASE form of each variant name;
/// `#[param(rename = "...")]` overrides one.
#[proc_macro_derive(ParamEnum, attributes(param))]
pub fn derive_param_enum(input: TokenStream) -> TokenStream {
    bind::expand_param_enum(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
