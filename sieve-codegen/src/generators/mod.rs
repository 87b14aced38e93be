//! Code generators for query and criteria types.

mod criteria;
mod query;

pub use criteria::criteria_impl;
pub use query::derive_query_impl;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, LitStr, Path};

/// The path generated code uses to reach the runtime, `::sieve` by default.
pub fn crate_path(path: Option<Path>) -> TokenStream {
    match path {
        Some(path) => quote! { #path },
        None => quote! { ::sieve },
    }
}

/// Read `crate = "path"` from container-level `#[<attr>(...)]` attributes.
pub fn parse_crate_attr(attrs: &[Attribute], attr_name: &str) -> Result<Option<Path>, syn::Error> {
    let mut path = None;

    for attr in attrs {
        if !attr.path().is_ident(attr_name) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let value: LitStr = meta.value()?.parse()?;
                path = Some(value.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported container attribute; expected `crate = \"..\"`"))
            }
        })?;
    }

    Ok(path)
}
