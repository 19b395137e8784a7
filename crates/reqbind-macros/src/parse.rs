//! Parsing utilities for the derive macros.
//!
//! This module parses `#[param(...)]` and `#[bind(...)]` attributes into plain
//! data the expanders work from.

use proc_macro2::Span;
use syn::{
    punctuated::Punctuated, spanned::Spanned, Attribute, Data, DeriveInput, Expr, ExprLit,
    ExprPath, Fields, Ident, Lit, Meta, Path, Token, Type,
};

/// Supported body formats, as written in `#[bind(accept = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Json,
    Form,
}

/// Parsed `#[bind(...)]` container attributes.
#[derive(Debug, Default)]
pub struct BindAttrs {
    /// Factory function path; `Default::default` when absent.
    pub factory: Option<Path>,
    /// Accepted body formats; every format when empty.
    pub accept: Vec<Accept>,
}

/// Parsed `#[param(...)]` field attributes.
#[derive(Debug)]
pub struct ParamAttrs {
    pub name: Option<(String, Span)>,
    pub required: bool,
    pub default_value: Option<String>,
    pub message: Option<String>,
    pub rename: Option<(String, Span)>,
}

/// A struct field carrying `#[param]`.
#[derive(Debug)]
pub struct BindField {
    pub ident: Ident,
    pub ty: Type,
    pub name: String,
    pub required: bool,
    pub default_value: String,
    pub message: String,
}

/// Returns the string value of `name = "value"`.
fn str_value(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        _ => Err(syn::Error::new(expr.span(), "expected string literal")),
    }
}

fn bool_value(expr: &Expr) -> syn::Result<bool> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Bool(b), ..
        }) => Ok(b.value),
        _ => Err(syn::Error::new(expr.span(), "expected `true` or `false`")),
    }
}

fn meta_ident(path: &Path) -> syn::Result<String> {
    path.get_ident()
        .map(ToString::to_string)
        .ok_or_else(|| syn::Error::new(path.span(), "expected identifier"))
}

fn nested_metas(attr: &Attribute) -> syn::Result<Punctuated<Meta, Token![,]>> {
    attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
}

impl ParamAttrs {
    fn only_rename(&self) -> bool {
        self.name.is_none() && !self.required && self.default_value.is_none() && self.message.is_none()
    }

    /// Parses every `#[param(...)]` attribute in `attrs`.
    ///
    /// Returns `None` when no `#[param]` attribute is present.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Option<Self>> {
        let mut parsed: Option<Self> = None;

        for attr in attrs.iter().filter(|a| a.path().is_ident("param")) {
            let out = parsed.get_or_insert(Self {
                name: None,
                required: false,
                default_value: None,
                message: None,
                rename: None,
            });

            // A bare `#[param]` marks the field with all defaults.
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            for meta in nested_metas(attr)? {
                match meta {
                    Meta::Path(path) => match meta_ident(&path)?.as_str() {
                        "required" => out.required = true,
                        other => {
                            return Err(syn::Error::new(
                                path.span(),
                                format!("unknown param attribute: {other}"),
                            ))
                        }
                    },
                    Meta::NameValue(nv) => {
                        let ident = meta_ident(&nv.path)?;
                        match ident.as_str() {
                            "name" => out.name = Some((str_value(&nv.value)?, nv.value.span())),
                            "required" => out.required = bool_value(&nv.value)?,
                            "default" => out.default_value = Some(str_value(&nv.value)?),
                            "message" => out.message = Some(str_value(&nv.value)?),
                            "rename" => out.rename = Some((str_value(&nv.value)?, nv.value.span())),
                            _ => {
                                return Err(syn::Error::new(
                                    nv.path.span(),
                                    format!("unknown param attribute: {ident}"),
                                ))
                            }
                        }
                    }
                    Meta::List(list) => {
                        return Err(syn::Error::new(list.span(), "expected `name = value`"))
                    }
                }
            }
        }

        Ok(parsed)
    }
}

impl BindAttrs {
    /// Parses every `#[bind(...)]` attribute in `attrs`.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("bind")) {
            for meta in nested_metas(attr)? {
                let nv = match meta {
                    Meta::NameValue(nv) => nv,
                    other => return Err(syn::Error::new(other.span(), "expected `name = value`")),
                };
                let ident = meta_ident(&nv.path)?;
                match ident.as_str() {
                    "factory" => out.factory = Some(factory_path(&nv.value)?),
                    "accept" => out.accept = parse_accept(&nv.value)?,
                    _ => {
                        return Err(syn::Error::new(
                            nv.path.span(),
                            format!("unknown bind attribute: {ident}"),
                        ))
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Accepts `factory = path::to::fn` or `factory = "path::to::fn"`.
fn factory_path(expr: &Expr) -> syn::Result<Path> {
    match expr {
        Expr::Path(ExprPath { path, .. }) => Ok(path.clone()),
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => s.parse(),
        _ => Err(syn::Error::new(expr.span(), "expected a function path")),
    }
}

fn parse_accept(expr: &Expr) -> syn::Result<Vec<Accept>> {
    let list = str_value(expr)?;
    let mut accept = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let format = match item {
            "json" => Accept::Json,
            "form" => Accept::Form,
            other => {
                return Err(syn::Error::new(
                    expr.span(),
                    format!("unknown body format `{other}`, expected `json` or `form`"),
                ))
            }
        };
        if !accept.contains(&format) {
            accept.push(format);
        }
    }
    if accept.is_empty() {
        return Err(syn::Error::new(expr.span(), "accept must list at least one format"));
    }
    Ok(accept)
}

/// Collects the `#[param]` fields of a named struct, checking names.
pub fn bind_fields(input: &DeriveInput) -> syn::Result<Vec<BindField>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Bind can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new(
            data.fields.span(),
            "Bind requires a struct with named fields",
        ));
    };

    let mut fields: Vec<BindField> = Vec::new();
    for field in &named.named {
        let Some(attrs) = ParamAttrs::from_attrs(&field.attrs)? else {
            continue;
        };
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "expected named field"))?;

        if let Some((_, span)) = attrs.rename {
            return Err(syn::Error::new(span, "`rename` applies to enum variants; use `name`"));
        }

        let (name, name_span) = attrs
            .name
            .unwrap_or_else(|| (unraw(&ident), ident.span()));
        if name.is_empty() {
            return Err(syn::Error::new(name_span, "parameter name must not be empty"));
        }
        if fields.iter().any(|f| f.name == name) {
            return Err(syn::Error::new(
                name_span,
                format!("duplicate parameter name `{name}`"),
            ));
        }

        let default_value = attrs.default_value.unwrap_or_default();
        if attrs.required && !default_value.is_empty() {
            return Err(syn::Error::new(
                field.span(),
                "`default` has no effect on a required parameter",
            ));
        }

        fields.push(BindField {
            ident,
            ty: field.ty.clone(),
            name,
            required: attrs.required,
            default_value,
            message: attrs.message.unwrap_or_default(),
        });
    }
    Ok(fields)
}

/// A fieldless enum variant with its case name.
#[derive(Debug)]
pub struct EnumCase {
    pub ident: Ident,
    pub case: String,
}

/// Collects the variants of a fieldless enum.
pub fn enum_cases(input: &DeriveInput) -> syn::Result<Vec<EnumCase>> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "ParamEnum can only be derived for enums",
        ));
    };

    if data.variants.is_empty() {
        return Err(syn::Error::new(
            input.ident.span(),
            "ParamEnum requires at least one variant",
        ));
    }

    let mut cases: Vec<EnumCase> = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.fields.span(),
                "ParamEnum variants must not carry data",
            ));
        }
        let attrs = ParamAttrs::from_attrs(&variant.attrs)?;
        let renamed = match attrs {
            Some(attrs) if attrs.only_rename() => attrs.rename,
            Some(_) => {
                return Err(syn::Error::new(
                    variant.span(),
                    "only `rename` is supported on enum variants",
                ))
            }
            None => None,
        };
        let (case, span) = renamed.unwrap_or_else(|| {
            (screaming_snake_case(&unraw(&variant.ident)), variant.ident.span())
        });
        if case.is_empty() {
            return Err(syn::Error::new(span, "case name must not be empty"));
        }
        if cases.iter().any(|c| c.case == case) {
            return Err(syn::Error::new(span, format!("duplicate case name `{case}`")));
        }
        cases.push(EnumCase {
            ident: variant.ident.clone(),
            case,
        });
    }
    Ok(cases)
}

/// Rejects generic types; contracts are stored in a per-type static.
pub fn reject_generics(input: &DeriveInput, derive: &str) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new(
            input.generics.span(),
            format!("{derive} cannot be derived for generic types"),
        ))
    }
}

fn unraw(ident: &Ident) -> String {
    ident.to_string().trim_start_matches("r#").to_string()
}

/// Converts `InProgress` to `IN_PROGRESS`.
pub fn screaming_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_uppercase() {
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => chars.peek().is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
        prev = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(screaming_snake_case("New"), "NEW");
        assert_eq!(screaming_snake_case("InProgress"), "IN_PROGRESS");
        assert_eq!(screaming_snake_case("HTTPServer"), "HTTP_SERVER");
        assert_eq!(screaming_snake_case("Level2"), "LEVEL2");
        assert_eq!(screaming_snake_case("already_snake"), "ALREADY_SNAKE");
    }

    #[test]
    fn test_parse_param_attrs() {
        let field: syn::Field = parse_quote! {
            #[param(name = "favoriteNumbers", default = "1,3,3", message = "numbers")]
            favorite_numbers: Vec<i32>
        };
        let attrs = ParamAttrs::from_attrs(&field.attrs).unwrap().unwrap();
        assert_eq!(attrs.name.unwrap().0, "favoriteNumbers");
        assert_eq!(attrs.default_value.as_deref(), Some("1,3,3"));
        assert_eq!(attrs.message.as_deref(), Some("numbers"));
        assert!(!attrs.required);
    }

    #[test]
    fn test_required_flag_forms() {
        let field: syn::Field = parse_quote! { #[param(required)] age: i32 };
        assert!(ParamAttrs::from_attrs(&field.attrs).unwrap().unwrap().required);

        let field: syn::Field = parse_quote! { #[param(required = false)] age: i32 };
        assert!(!ParamAttrs::from_attrs(&field.attrs).unwrap().unwrap().required);
    }

    #[test]
    fn test_field_without_param_is_skipped() {
        let field: syn::Field = parse_quote! { #[serde(skip)] cache: String };
        assert!(ParamAttrs::from_attrs(&field.attrs).unwrap().is_none());
    }

    #[test]
    fn test_unknown_param_attribute() {
        let field: syn::Field = parse_quote! { #[param(min = "1")] age: i32 };
        assert!(ParamAttrs::from_attrs(&field.attrs).is_err());
    }

    #[test]
    fn test_bind_fields_defaults_name_to_ident() {
        let input: DeriveInput = parse_quote! {
            struct Query {
                #[param(required)]
                r#type: String,
                #[param]
                page: i32,
                skipped: bool,
            }
        };
        let fields = bind_fields(&input).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["type", "page"]);
        assert!(fields[0].required);
    }

    #[test]
    fn test_bind_fields_rejects_duplicates_and_empty_names() {
        let input: DeriveInput = parse_quote! {
            struct Query {
                #[param(name = "a")]
                x: i32,
                #[param(name = "a")]
                y: i32,
            }
        };
        assert!(bind_fields(&input).is_err());

        let input: DeriveInput = parse_quote! {
            struct Query {
                #[param(name = "")]
                x: i32,
            }
        };
        assert!(bind_fields(&input).is_err());
    }

    #[test]
    fn test_bind_fields_rejects_default_on_required() {
        let input: DeriveInput = parse_quote! {
            struct Query {
                #[param(required, default = "1")]
                x: i32,
            }
        };
        assert!(bind_fields(&input).is_err());
    }

    #[test]
    fn test_bind_attrs() {
        let input: DeriveInput = parse_quote! {
            #[bind(factory = Query::empty, accept = "json")]
            struct Query {}
        };
        let attrs = BindAttrs::from_attrs(&input.attrs).unwrap();
        assert!(attrs.factory.is_some());
        assert_eq!(attrs.accept, vec![Accept::Json]);

        let input: DeriveInput = parse_quote! {
            #[bind(accept = "json, xml")]
            struct Query {}
        };
        assert!(BindAttrs::from_attrs(&input.attrs).is_err());
    }

    #[test]
    fn test_enum_cases() {
        let input: DeriveInput = parse_quote! {
            enum Status {
                New,
                InProgress,
                #[param(rename = "DONE")]
                Completed,
            }
        };
        let cases: Vec<_> = enum_cases(&input)
            .unwrap()
            .into_iter()
            .map(|c| c.case)
            .collect();
        assert_eq!(cases, vec!["NEW", "IN_PROGRESS", "DONE"]);
    }

    #[test]
    fn test_enum_cases_reject_data_variants() {
        let input: DeriveInput = parse_quote! {
            enum Status {
                New(u8),
            }
        };
        assert!(enum_cases(&input).is_err());
    }
}
