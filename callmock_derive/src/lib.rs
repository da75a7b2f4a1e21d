// vim: tw=80
//! Proc Macros for use with callmock
//!
//! You probably don't want to use this crate directly.  Instead, you use use
//! its reexports via the [`callmock`](../callmock/index.html) crate.

extern crate proc_macro;

use proc_macro2::{Span, TokenStream, TokenTree};
use quote::{ToTokens, format_ident, quote};
use syn::{
    *,
    ext::IdentExt,
    punctuated::Punctuated,
    spanned::Spanned
};

mod automock;
mod mock_function;

use crate::automock::do_automock;

/// Generate a mock identifier from the regular one: eg "Foo" => "MockFoo"
fn gen_mock_ident(ident: &Ident) -> Ident {
    format_ident!("Mock{}", ident)
}

/// Generate an identifier for a mock method's private module: eg "MockFoo",
/// "foo" => "__mock_MockFoo_foo"
fn gen_mod_ident(struct_: &Ident, method: &Ident) -> Ident {
    format_ident!("__mock_{}_{}", struct_, method.unraw())
}

/// Does this attribute invoke `#[async_trait]`?
fn is_async_trait(attr: &Attribute) -> bool {
    attr.path().segments.last()
        .map(|seg| seg.ident == "async_trait")
        .unwrap_or(false)
}

/// Find the first token that can't appear in a mocked argument's referent or
/// in a mocked return type.
fn unsupported_token(tokens: TokenStream) -> Option<(Span, &'static str)> {
    let mut iter = tokens.into_iter().peekable();
    while let Some(tt) = iter.next() {
        match tt {
            TokenTree::Group(g) => {
                if let Some(e) = unsupported_token(g.stream()) {
                    return Some(e);
                }
            },
            TokenTree::Punct(p) if p.as_char() == '&' => {
                return Some((p.span(),
                    "callmock only supports references at the top level of an argument type"));
            },
            TokenTree::Punct(p) if p.as_char() == '\'' => {
                let is_static = matches!(iter.peek(),
                    Some(TokenTree::Ident(i)) if i == "static");
                if !is_static {
                    return Some((p.span(),
                        "callmock does not support non-'static lifetimes"));
                }
            },
            TokenTree::Ident(i) if i == "Self" => {
                return Some((i.span(),
                    "callmock does not support `Self` in mocked signatures"));
            },
            TokenTree::Ident(i) if i == "impl" => {
                return Some((i.span(),
                    "callmock does not support `impl Trait` in mocked signatures"));
            },
            _ => ()
        }
    }
    None
}

/// Check that a mocked method's argument type is an owned type or a
/// top-level reference to one.
fn check_arg_type(ty: &Type) -> Result<()> {
    let inner = if let Type::Reference(tr) = ty {
        if let Some(lt) = &tr.lifetime {
            if lt.ident != "static" {
                return Err(Error::new(lt.span(),
                    "callmock does not support non-'static lifetimes"));
            }
        }
        tr.elem.as_ref()
    } else {
        ty
    };
    match unsupported_token(inner.to_token_stream()) {
        Some((span, msg)) => Err(Error::new(span, msg)),
        None => Ok(())
    }
}

/// Check that a mocked method's return type is owned.
fn check_return_type(output: &ReturnType) -> Result<()> {
    if let ReturnType::Type(_, ty) = output {
        if let Type::Reference(tr) = ty.as_ref() {
            return Err(Error::new(tr.and_token.span,
                "callmock does not support methods that return references"));
        }
        if let Some((span, msg)) = unsupported_token(ty.to_token_stream()) {
            return Err(Error::new(span, msg));
        }
    }
    Ok(())
}

/// Adjust a type so it can be named from one module deeper: `super::X`
/// becomes `super::super::X` and `self::X` becomes `super::X`.
fn supersuperfy(original: &Type) -> Type {
    let mut output = original.clone();
    supersuperfy_type(&mut output);
    output
}

fn supersuperfy_path(path: &mut Path) {
    if path.leading_colon.is_none() {
        if let Some(first) = path.segments.first_mut() {
            if first.ident == "self" {
                first.ident = Ident::new("super", first.ident.span());
            } else if first.ident == "super" {
                let span = first.ident.span();
                path.segments.insert(0,
                    PathSegment::from(Ident::new("super", span)));
            }
        }
    }
    for seg in path.segments.iter_mut() {
        if let PathArguments::AngleBracketed(abga) = &mut seg.arguments {
            for arg in abga.args.iter_mut() {
                if let GenericArgument::Type(ty) = arg {
                    supersuperfy_type(ty);
                }
            }
        }
    }
}

fn supersuperfy_type(ty: &mut Type) {
    match ty {
        Type::Array(a) => supersuperfy_type(a.elem.as_mut()),
        Type::Group(g) => supersuperfy_type(g.elem.as_mut()),
        Type::Paren(p) => supersuperfy_type(p.elem.as_mut()),
        Type::Path(tp) => {
            if let Some(qself) = &mut tp.qself {
                supersuperfy_type(qself.ty.as_mut());
            }
            supersuperfy_path(&mut tp.path);
        },
        Type::Ptr(p) => supersuperfy_type(p.elem.as_mut()),
        Type::Reference(r) => supersuperfy_type(r.elem.as_mut()),
        Type::Slice(s) => supersuperfy_type(s.elem.as_mut()),
        Type::Tuple(t) => {
            for elem in t.elems.iter_mut() {
                supersuperfy_type(elem);
            }
        },
        _ => ()
    }
}

/// Automatically generate a mock type for a trait.
///
/// The mock struct is named after the trait with "Mock" prepended.  For each
/// trait method it gets an `expect_<method>` method that adds an expectation
/// and a `<method>_calls` method that returns the calls recorded so far.  It
/// also gets `checkpoint`, `assert_all_satisfied` and a `Drop` impl that fails
/// the test if any expectation was called too few or too many times.
///
/// # Examples
///
/// The simplest use case is mocking a no-frills trait
/// ```ignore
/// use callmock::automock;
/// #[automock]
/// pub trait Foo {
///     fn foo(&self, key: i16);
/// }
/// ```
///
/// Async methods are supported, both native and through `#[async_trait]`.
/// `#[automock]` must come first:
/// ```ignore
/// use async_trait::async_trait;
/// use callmock::automock;
/// #[automock]
/// #[async_trait]
/// pub trait Fetch: Send + Sync {
///     async fn fetch(&self, key: &str) -> Vec<u8>;
/// }
/// ```
///
/// Generic traits and methods, associated items, static methods and methods
/// that return references are rejected with a compile error.
#[proc_macro_attribute]
pub fn automock(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    let input: proc_macro2::TokenStream = input.into();
    let mut output = input.clone();
    output.extend(do_automock(attrs.into(), input));
    output.into()
}
