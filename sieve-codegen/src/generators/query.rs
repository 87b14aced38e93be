//! Implementation of the `#[derive(Query)]` macro.

use proc_macro2::TokenStream;
use quote::quote;
use sieve_core::ComparisonKind;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, LitStr};

use super::{crate_path, parse_crate_attr};

/// Parse and generate code for the `#[derive(Query)]` macro.
pub fn derive_query_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return empty_query(input),
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Query derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Query derive only supports structs",
            ));
        }
    };

    let krate = crate_path(parse_crate_attr(&input.attrs, "sieve")?);
    let field_infos: Vec<FieldInfo> = fields.iter().map(parse_field).collect::<Result<_, _>>()?;

    let declared = field_infos
        .iter()
        .filter(|f| f.role == FieldRole::Declared)
        .map(|f| {
            let field_name = &f.name;
            let marker = f.marker.as_ref().map(|m| m.marker_tokens(&krate));
            quote! {
                .field(#krate::FieldDescriptor::new(#field_name) #marker)
            }
        });

    let properties = field_infos.iter().filter_map(|f| {
        let ident = &f.ident;
        let field_name = &f.name;
        match f.role {
            FieldRole::Declared => Some(quote! {
                properties.push(#krate::Property::new(
                    #field_name,
                    #krate::IntoProperty::to_property(&self.#ident),
                ));
            }),
            FieldRole::Base => Some(quote! {
                properties.extend(
                    #krate::QueryType::properties(&self.#ident)
                        .into_iter()
                        .filter(|property| !DECLARED.contains(&property.name.as_str())),
                );
            }),
            FieldRole::Skipped => None,
        }
    });

    // A base property redeclared here is read from this type only.
    let declared_names: Vec<&str> = field_infos
        .iter()
        .filter(|f| f.role == FieldRole::Declared)
        .map(|f| f.name.as_str())
        .collect();
    let capacity = declared_names.len();
    let declared_const = field_infos
        .iter()
        .any(|f| f.role == FieldRole::Base)
        .then(|| quote! { const DECLARED: &[&str] = &[#(#declared_names),*]; });

    Ok(quote! {
        impl #impl_generics #krate::QueryType for #name #ty_generics #where_clause {
            fn descriptor() -> #krate::QueryDescriptor {
                #krate::QueryDescriptor::new::<Self>()
                    #(#declared)*
            }

            fn properties(&self) -> ::std::vec::Vec<#krate::Property> {
                #declared_const
                let mut properties = ::std::vec::Vec::with_capacity(#capacity);
                #(#properties)*
                properties
            }
        }
    })
}

fn empty_query(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let krate = crate_path(parse_crate_attr(&input.attrs, "sieve")?);
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::QueryType for #name #ty_generics #where_clause {
            fn descriptor() -> #krate::QueryDescriptor {
                #krate::QueryDescriptor::new::<Self>()
            }

            fn properties(&self) -> ::std::vec::Vec<#krate::Property> {
                ::std::vec::Vec::new()
            }
        }
    })
}

/// How a struct field takes part in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
    /// A declared filter field.
    Declared,
    /// An embedded base query; its properties are enumerated, not declared.
    Base,
    /// `#[sieve(skip)]`: neither declared nor enumerated.
    Skipped,
}

/// A parsed `#[sieve(<kind>)]` or `#[sieve(<kind> = "name")]`.
#[derive(Debug)]
struct MarkerInfo {
    kind: ComparisonKind,
    name: Option<String>,
}

impl MarkerInfo {
    fn marker_tokens(&self, krate: &TokenStream) -> TokenStream {
        let kind = Ident::new(self.kind.name(), proc_macro2::Span::call_site());
        match &self.name {
            Some(name) => quote! {
                .marker(#krate::Marker::named(#krate::ComparisonKind::#kind, #name))
            },
            None => quote! {
                .marker(#krate::Marker::new(#krate::ComparisonKind::#kind))
            },
        }
    }
}

/// Information about a field.
#[derive(Debug)]
struct FieldInfo {
    ident: Ident,
    name: String,
    role: FieldRole,
    marker: Option<MarkerInfo>,
}

/// Parse a field and its `#[sieve(...)]` attributes.
fn parse_field(field: &syn::Field) -> Result<FieldInfo, syn::Error> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "Fields must be named"))?;

    let name = ident.unraw().to_string();
    let mut role = FieldRole::Declared;
    let mut marker: Option<MarkerInfo> = None;
    let mut override_name: Option<String> = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("sieve") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(|ident| ident.unraw().to_string())
                .ok_or_else(|| meta.error("expected a comparison kind"))?;

            match key.as_str() {
                "base" => {
                    role = FieldRole::Base;
                    return Ok(());
                }
                "skip" => {
                    role = FieldRole::Skipped;
                    return Ok(());
                }
                "name" => {
                    let value: LitStr = meta.value()?.parse()?;
                    override_name = Some(value.value());
                    return Ok(());
                }
                _ => {}
            }

            let kind: ComparisonKind = key.parse().map_err(|_| {
                meta.error(format!(
                    "unknown sieve attribute `{}`; expected a comparison kind, `name`, `base` or `skip`",
                    key
                ))
            })?;

            if let Some(existing) = &marker {
                return Err(meta.error(format!(
                    "field `{}` already has the `{}` marker; at most one comparison kind is allowed",
                    name,
                    existing.kind.keyword()
                )));
            }

            let name = if meta.input.peek(syn::Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                Some(value.value())
            } else {
                None
            };
            marker = Some(MarkerInfo { kind, name });
            Ok(())
        })?;
    }

    if let Some(name) = override_name {
        match marker.as_mut() {
            Some(marker) if marker.name.is_none() => marker.name = Some(name),
            Some(_) => {
                return Err(syn::Error::new_spanned(
                    field,
                    "the target name is given twice; use either `kind = \"..\"` or `name = \"..\"`",
                ));
            }
            None => {
                marker = Some(MarkerInfo {
                    kind: ComparisonKind::EqualTo,
                    name: Some(name),
                });
            }
        }
    }

    if role != FieldRole::Declared && marker.is_some() {
        return Err(syn::Error::new_spanned(
            &ident,
            "`base` and `skip` fields cannot carry a comparison marker",
        ));
    }

    Ok(FieldInfo {
        ident,
        name,
        role,
        marker,
    })
}
