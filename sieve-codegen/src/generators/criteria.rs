//! Implementation of the `#[criteria]` attribute macro.
//!
//! Every inherent method named `and_*` that takes `&mut self` and exactly one
//! argument is registered as a criteria method. Everything else in the impl
//! block is passed through untouched.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::Parser;
use syn::{FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Path, ReturnType, Type};

use super::crate_path;

/// Prefix of the methods the macro registers.
const METHOD_PREFIX: &str = "and_";

/// Options given as `#[criteria(...)]` arguments.
#[derive(Debug, Default)]
struct CriteriaOptions {
    krate: Option<Path>,
    constructor: Option<Ident>,
    try_constructor: Option<Ident>,
}

impl CriteriaOptions {
    fn parse(args: TokenStream) -> Result<Self, syn::Error> {
        let mut options = Self::default();

        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("crate") {
                let value: LitStr = meta.value()?.parse()?;
                options.krate = Some(value.parse()?);
            } else if meta.path.is_ident("constructor") {
                let value: LitStr = meta.value()?.parse()?;
                options.constructor = Some(value.parse()?);
            } else if meta.path.is_ident("try_constructor") {
                let value: LitStr = meta.value()?.parse()?;
                options.try_constructor = Some(value.parse()?);
            } else {
                return Err(meta.error(
                    "unsupported criteria option; expected `crate`, `constructor` or `try_constructor`",
                ));
            }
            Ok(())
        });
        parser.parse2(args)?;

        if let (Some(_), Some(ctor)) = (&options.constructor, &options.try_constructor) {
            return Err(syn::Error::new_spanned(
                ctor,
                "`constructor` and `try_constructor` are mutually exclusive",
            ));
        }

        Ok(options)
    }
}

/// Per-method `#[criteria(...)]` attributes.
#[derive(Debug, Default)]
struct MethodOptions {
    skip: bool,
    rename: Option<LitStr>,
}

/// Expand `#[criteria]` on an impl block.
pub fn criteria_impl(args: TokenStream, mut item: ItemImpl) -> Result<TokenStream, syn::Error> {
    let options = CriteriaOptions::parse(args)?;
    let krate = crate_path(options.krate.clone());

    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[criteria] must be placed on an inherent impl block",
        ));
    }

    let mut registrations = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let method_options = take_method_options(method)?;
        if method_options.skip {
            continue;
        }

        if let Some(registration) = register_method(method, method_options.rename, &krate)? {
            registrations.push(registration);
        }
    }

    let instantiate = match (&options.constructor, &options.try_constructor) {
        (Some(ctor), _) => quote! {
            ::std::result::Result::Ok(Self::#ctor())
        },
        (None, Some(ctor)) => quote! {
            Self::#ctor().map_err(#krate::InvokeError::method)
        },
        (None, None) => quote! {
            ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
        },
    };

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    let criteria_type = quote! {
        impl #impl_generics #krate::CriteriaType for #self_ty #where_clause {
            fn methods() -> ::std::vec::Vec<#krate::MethodDescriptor<Self>> {
                ::std::vec![
                    #(#registrations),*
                ]
            }

            fn instantiate() -> ::std::result::Result<Self, #krate::InvokeError> {
                #instantiate
            }
        }
    };

    Ok(quote! {
        #item
        #criteria_type
    })
}

/// Remove `#[criteria(...)]` helper attributes from a method and parse them.
fn take_method_options(method: &mut ImplItemFn) -> Result<MethodOptions, syn::Error> {
    let mut options = MethodOptions::default();
    let mut kept = Vec::with_capacity(method.attrs.len());

    for attr in method.attrs.drain(..) {
        if !attr.path().is_ident("criteria") {
            kept.push(attr);
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unsupported method option; expected `skip` or `rename`"));
            }
            Ok(())
        })?;
    }

    method.attrs = kept;
    Ok(options)
}

/// Build the `MethodDescriptor` for one method, or `None` if it is not a
/// criteria method.
fn register_method(
    method: &ImplItemFn,
    rename: Option<LitStr>,
    krate: &TokenStream,
) -> Result<Option<TokenStream>, syn::Error> {
    let sig = &method.sig;
    let name = sig.ident.unraw().to_string();
    let explicit = rename.is_some();

    if !explicit && !name.starts_with(METHOD_PREFIX) {
        return Ok(None);
    }

    let Some(arg_ty) = single_argument(method) else {
        if explicit {
            return Err(syn::Error::new_spanned(
                sig,
                "renamed criteria methods must take `&mut self` and exactly one argument",
            ));
        }
        return Ok(None);
    };

    if sig.generics.type_params().next().is_some() || sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig,
            "criteria methods cannot be generic or async; add #[criteria(skip)] to leave it unregistered",
        ));
    }

    let ident = &sig.ident;
    let (decoded, pass) = match arg_ty {
        Type::Reference(reference) if reference.mutability.is_some() => {
            return Err(syn::Error::new_spanned(
                arg_ty,
                "criteria method arguments must be owned values or shared references",
            ));
        }
        Type::Reference(reference) => {
            let elem = &reference.elem;
            (
                quote! { <#elem as ::std::borrow::ToOwned>::Owned },
                quote! { &arg },
            )
        }
        other => (quote! { #other }, quote! { arg }),
    };

    let call = if returns_result(&sig.output) {
        quote! { criteria.#ident(#pass).map_err(#krate::InvokeError::method)?; }
    } else {
        quote! { let _ = criteria.#ident(#pass); }
    };

    let invoker = quote! {
        |criteria: &mut Self, value: #krate::FilterValue| -> ::std::result::Result<(), #krate::InvokeError> {
            let arg = <#decoded as #krate::FromFilterValue>::from_filter_value(value)?;
            #call
            ::std::result::Result::Ok(())
        }
    };

    Ok(Some(match &rename {
        Some(key) => quote! { #krate::MethodDescriptor::<Self>::new(#key, #invoker) },
        None => quote! { #krate::MethodDescriptor::<Self>::from_ident(#name, #invoker) },
    }))
}

/// The argument type of a `&mut self` method with exactly one other input.
fn single_argument(method: &ImplItemFn) -> Option<&Type> {
    let mut inputs = method.sig.inputs.iter();

    match inputs.next()? {
        FnArg::Receiver(receiver) if receiver.reference.is_some() && receiver.mutability.is_some() => {}
        _ => return None,
    }

    let arg = match inputs.next()? {
        FnArg::Typed(arg) => arg,
        FnArg::Receiver(_) => return None,
    };

    if inputs.next().is_some() {
        return None;
    }

    Some(&arg.ty)
}

/// Whether a return type is spelled `Result<..>` (any path ending in `Result`).
fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    if let Type::Path(type_path) = ty.as_ref() {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Result";
        }
    }
    false
}
