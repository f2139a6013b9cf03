//! Signature discovery macros for autowire
//!
//! Both macros generate an `autowire::Component` impl, so the constructor
//! signature is read from code that already exists instead of written twice:
//!
//! - `#[derive(Component)]` - the struct's fields are the parameters
//! - `#[component]` - the parameters of one associated constructor are
//!
//! Every parameter must be an `Arc<T>`; anything else fails the build.
//!
//! # Derive Example
//!
//! ```rust,ignore
//! use autowire::Component;
//! use std::sync::Arc;
//!
//! #[derive(Component)]
//! struct UserService {
//!     db: Arc<Database>,
//!     cache: Arc<dyn Cache>,
//! }
//!
//! // Generates:
//! // impl Component for UserService {
//! //     type Dependencies = (Arc<Database>, Arc<dyn Cache>,);
//! //     fn construct((db, cache,): Self::Dependencies) -> Self {
//! //         UserService { db, cache }
//! //     }
//! // }
//! ```
//!
//! # Constructor Example
//!
//! ```rust,ignore
//! use autowire::component;
//! use std::sync::Arc;
//!
//! struct Handler {
//!     prefix: String,
//!     repo: Arc<Repository>,
//! }
//!
//! #[component]
//! impl Handler {
//!     #[inject]
//!     fn with_repo(repo: Arc<Repository>) -> Self {
//!         Handler { prefix: "/api".into(), repo }
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Fields, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Type,
    parse_macro_input,
};

// =============================================================================
// Component Derive Macro
// =============================================================================

/// Derive `autowire::Component` from a struct's fields.
///
/// Works on named, tuple and unit structs. Fields become constructor
/// parameters in declaration order; every field must be `Arc<T>`.
#[proc_macro_derive(Component)]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_derive(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_derive(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Component can only be derived for structs",
            ));
        }
    };

    let mut dep_types = Vec::new();
    let mut dep_names = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let label = match &field.ident {
            Some(ident) => ident.to_string(),
            None => index.to_string(),
        };
        if extract_arc_inner_type(&field.ty).is_none() {
            return Err(not_arc(&field.ty, format!("`{name}` field `{label}`")));
        }
        dep_types.push(&field.ty);
        dep_names.push(dep_ident(index, field.span()));
    }

    let body = match fields {
        Fields::Named(named) => {
            let idents = named.named.iter().map(|f| &f.ident);
            quote! { Self { #(#idents: #dep_names),* } }
        }
        Fields::Unnamed(_) => quote! { Self(#(#dep_names),*) },
        Fields::Unit => quote! { Self },
    };

    Ok(component_impl(
        quote! { #impl_generics },
        quote! { #name #ty_generics },
        quote! { #where_clause },
        &dep_types,
        &dep_names,
        body,
    ))
}

// =============================================================================
// Component Attribute Macro
// =============================================================================

/// Implement `autowire::Component` from a constructor in an inherent `impl` block.
///
/// The constructor is the associated fn marked `#[inject]`; with no marker,
/// the fn named `new`. It must take no receiver and only `Arc<T>` parameters.
///
/// ```rust,ignore
/// #[component]
/// impl Service {
///     fn new(logger: Arc<dyn Logger>) -> Self {
///         Service { logger }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "#[component] takes no arguments")
            .into_compile_error()
            .into();
    }

    let item = parse_macro_input!(item as ItemImpl);
    expand_component(item).into()
}

/// The impl block, `#[inject]` markers removed, followed by the generated
/// impl or the error. The block is kept on error so its methods still resolve.
fn expand_component(mut item: ItemImpl) -> TokenStream2 {
    let generated = component_for(&mut item).unwrap_or_else(syn::Error::into_compile_error);
    quote! {
        #item
        #generated
    }
}

fn component_for(item: &mut ItemImpl) -> syn::Result<TokenStream2> {
    let marked = strip_inject_markers(item);

    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[component] must be placed on an inherent impl block",
        ));
    }

    let ctor = select_constructor(item, marked)?;
    let ctor_name = &ctor.sig.ident;

    if let Some(receiver) = ctor.sig.receiver() {
        return Err(syn::Error::new_spanned(
            receiver,
            format!("constructor `{ctor_name}` must not take `self`"),
        ));
    }

    let mut dep_types = Vec::new();
    let mut dep_names = Vec::new();

    for (index, input) in ctor.sig.inputs.iter().enumerate() {
        if let FnArg::Typed(arg) = input {
            if extract_arc_inner_type(&arg.ty).is_none() {
                let pat = &arg.pat;
                let label = quote!(#pat).to_string();
                return Err(not_arc(
                    &arg.ty,
                    format!("constructor `{ctor_name}` parameter `{label}`"),
                ));
            }
            dep_types.push(arg.ty.as_ref().clone());
            dep_names.push(dep_ident(index, arg.span()));
        }
    }

    let body = quote! { Self::#ctor_name(#(#dep_names),*) };
    let dep_types: Vec<&Type> = dep_types.iter().collect();

    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let self_ty = &item.self_ty;
    Ok(component_impl(
        quote! { #impl_generics },
        quote! { #self_ty },
        quote! { #where_clause },
        &dep_types,
        &dep_names,
        body,
    ))
}

/// Strip every `#[inject]` marker, returning the marked fns in order.
fn strip_inject_markers(item: &mut ItemImpl) -> Vec<ImplItemFn> {
    let mut marked = Vec::new();
    for impl_item in item.items.iter_mut() {
        if let ImplItem::Fn(func) = impl_item {
            if take_inject_attr(&mut func.attrs) {
                marked.push(func.clone());
            }
        }
    }
    marked
}

/// The single `#[inject]` fn, else `new`.
fn select_constructor(item: &ItemImpl, marked: Vec<ImplItemFn>) -> syn::Result<ImplItemFn> {
    let mut marked = marked.into_iter();
    if let Some(func) = marked.next() {
        if let Some(extra) = marked.next() {
            return Err(syn::Error::new_spanned(
                &extra.sig.ident,
                "only one constructor may be marked #[inject]",
            ));
        }
        return Ok(func);
    }

    item.items
        .iter()
        .find_map(|impl_item| match impl_item {
            ImplItem::Fn(func) if func.sig.ident == "new" => Some(func.clone()),
            _ => None,
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &item.self_ty,
                "no constructor found: add `fn new` or mark one fn with #[inject]",
            )
        })
}

/// Remove every `#[inject]` attribute; true if there was one.
fn take_inject_attr(attrs: &mut Vec<Attribute>) -> bool {
    let before = attrs.len();
    attrs.retain(|attr| !attr.path().is_ident("inject"));
    attrs.len() != before
}

// =============================================================================
// Shared Helpers
// =============================================================================

fn component_impl(
    impl_generics: TokenStream2,
    self_ty: TokenStream2,
    where_clause: TokenStream2,
    dep_types: &[&Type],
    dep_names: &[Ident],
    body: TokenStream2,
) -> TokenStream2 {
    quote! {
        impl #impl_generics ::autowire::Component for #self_ty #where_clause {
            type Dependencies = (#(#dep_types,)*);

            fn construct((#(#dep_names,)*): Self::Dependencies) -> Self {
                #body
            }
        }
    }
}

fn dep_ident(index: usize, span: Span) -> Ident {
    let mut ident = format_ident!("__dep_{}", index);
    ident.set_span(span);
    ident
}

fn not_arc(ty: &Type, what: String) -> syn::Error {
    let ty_str = quote!(#ty).to_string();
    syn::Error::new_spanned(
        ty,
        format!("{what} has type `{ty_str}`; component parameters must be `Arc<T>`"),
    )
}

fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Arc" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}
