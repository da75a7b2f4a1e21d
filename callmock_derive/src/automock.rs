// vim: tw=80
use super::*;

use crate::mock_function::{self, MockFunction};

/// A trait being mocked, with one MockFunction per method
struct MockTrait {
    /// `#[async_trait]` attributes to copy onto the generated impl
    async_attrs: Vec<Attribute>,
    methods: Vec<MockFunction>,
    name: Ident,
    struct_: Ident,
    unsafety: Option<Token![unsafe]>,
    vis: Visibility,
}

impl MockTrait {
    fn new(item: &ItemTrait) -> Result<MockTrait> {
        if !item.generics.params.is_empty() {
            return Err(Error::new(item.generics.span(),
                "callmock does not support generic traits"));
        }
        if let Some(wc) = &item.generics.where_clause {
            return Err(Error::new(wc.span(),
                "callmock does not support where clauses"));
        }
        let struct_ = gen_mock_ident(&item.ident);
        let mut methods = Vec::new();
        for ti in item.items.iter() {
            match ti {
                TraitItem::Fn(tif) => {
                    let mod_ident = gen_mod_ident(&struct_, &tif.sig.ident);
                    let mf = mock_function::Builder::new(&tif.sig, &item.vis)
                        .struct_(&struct_)
                        .parent(&mod_ident)
                        .levels(1)
                        .build()?;
                    methods.push(mf);
                },
                TraitItem::Const(tic) => {
                    return Err(Error::new(tic.span(),
                        "callmock does not support associated constants"));
                },
                TraitItem::Type(tit) => {
                    return Err(Error::new(tit.span(),
                        "callmock does not support associated types"));
                },
                other => {
                    return Err(Error::new(other.span(),
                        "callmock does not support this trait item"));
                }
            }
        }
        let async_attrs = item.attrs.iter()
            .filter(|attr| is_async_trait(attr))
            .cloned()
            .collect::<Vec<_>>();
        Ok(MockTrait {
            async_attrs,
            methods,
            name: item.ident.clone(),
            struct_,
            unsafety: item.unsafety,
            vis: item.vis.clone(),
        })
    }
}

impl ToTokens for MockTrait {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let async_attrs = &self.async_attrs;
        let calls = self.methods.iter().map(MockFunction::call);
        let calls_fns = self.methods.iter().map(MockFunction::calls_fn);
        let checkpoints = self.methods.iter().map(MockFunction::checkpoint);
        let expects = self.methods.iter().map(MockFunction::expect);
        let fields = self.methods.iter().map(MockFunction::field);
        let field_defaults = self.methods.iter()
            .map(MockFunction::field_default);
        let mock_str = self.struct_.to_string();
        let name = &self.name;
        let priv_mods = self.methods.iter().map(MockFunction::priv_module);
        let struct_ = &self.struct_;
        let struct_docstr = format!("Mock implementation of the `{}` trait",
                                    name);
        let unsafety = &self.unsafety;
        let unsatisfieds = self.methods.iter().map(MockFunction::unsatisfied);
        let vis = &self.vis;
        quote!(
            #(#priv_mods)*
            #[doc = #struct_docstr]
            #[allow(dead_code, non_snake_case)]
            #vis struct #struct_ {
                callmock_strictness: ::callmock::Strictness,
                #(#fields,)*
            }
            impl ::std::default::Default for #struct_ {
                fn default() -> Self {
                    Self {
                        callmock_strictness: ::callmock::Strictness::default(),
                        #(#field_defaults,)*
                    }
                }
            }
            #[allow(dead_code)]
            impl #struct_ {
                /// Create a mock with no expectations, in strict mode.
                pub fn new() -> Self {
                    Self::default()
                }

                /// Create a mock with no expectations and the given
                /// strictness.
                pub fn with_strictness(strictness: ::callmock::Strictness)
                    -> Self
                {
                    let mut __callmock_m = Self::default();
                    __callmock_m.callmock_strictness = strictness;
                    __callmock_m
                }

                /// Change what the mock does when a matched expectation has no
                /// return value.
                pub fn set_strictness(&mut self,
                                      strictness: ::callmock::Strictness)
                {
                    self.callmock_strictness = strictness;
                }

                pub fn strictness(&self) -> ::callmock::Strictness {
                    self.callmock_strictness
                }

                #(#expects)*

                #(#calls_fns)*

                /// Validate that all current expectations for all methods have
                /// been satisfied, and discard them.  Recorded calls are kept.
                pub fn checkpoint(&mut self) {
                    #[allow(unused_mut)]
                    let mut __callmock_u: Vec<::callmock::Unsatisfied> =
                        Vec::new();
                    #(#checkpoints)*
                    ::callmock::assert_satisfied(#mock_str, &__callmock_u);
                }

                /// Panic unless every expectation of every method was called
                /// within its bounds.
                pub fn assert_all_satisfied(&self) {
                    #[allow(unused_mut)]
                    let mut __callmock_u: Vec<::callmock::Unsatisfied> =
                        Vec::new();
                    #(#unsatisfieds)*
                    ::callmock::assert_satisfied(#mock_str, &__callmock_u);
                }
            }
            #(#async_attrs)*
            #unsafety impl #name for #struct_ {
                #(#calls)*
            }
            impl ::std::ops::Drop for #struct_ {
                fn drop(&mut self) {
                    if !::std::thread::panicking() {
                        self.assert_all_satisfied();
                    }
                }
            }
            impl ::std::fmt::Debug for #struct_ {
                fn fmt(&self, __callmock_fmt: &mut ::std::fmt::Formatter<'_>)
                    -> ::std::fmt::Result
                {
                    __callmock_fmt.debug_struct(#mock_str)
                        .field("strictness", &self.callmock_strictness)
                        .finish_non_exhaustive()
                }
            }
        ).to_tokens(tokens);
    }
}

fn mock_trait(attrs: TokenStream, input: TokenStream) -> Result<TokenStream> {
    if !attrs.is_empty() {
        return Err(Error::new(attrs.span(), "automock takes no arguments"));
    }
    let item: Item = parse2(input)?;
    match item {
        Item::Trait(item_trait) => {
            Ok(MockTrait::new(&item_trait)?.into_token_stream())
        },
        other => Err(Error::new(other.span(),
            "#[automock] only supports traits"))
    }
}

pub(crate) fn do_automock(attrs: TokenStream, input: TokenStream)
    -> TokenStream
{
    mock_trait(attrs, input).unwrap_or_else(Error::into_compile_error)
}
