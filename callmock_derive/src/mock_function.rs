// vim: tw=80
use super::*;

/// Build a MockFunction.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Builder<'a> {
    levels: i32,
    parent: Option<&'a Ident>,
    sig: &'a Signature,
    struct_: Option<&'a Ident>,
    vis: &'a Visibility
}

impl<'a> Builder<'a> {
    pub fn build(self) -> Result<MockFunction> {
        let struct_ = self.struct_
            .ok_or_else(|| Error::new(self.sig.span(), "mock method without a mock struct"))?
            .clone();
        let mod_ident = self.parent.cloned()
            .unwrap_or_else(|| gen_mod_ident(&struct_, &self.sig.ident));
        if !self.sig.generics.params.is_empty() {
            return Err(Error::new(self.sig.generics.span(),
                "callmock does not support generic methods"));
        }
        if let Some(wc) = &self.sig.generics.where_clause {
            return Err(Error::new(wc.span(),
                "callmock does not support where clauses"));
        }
        if let Some(v) = &self.sig.variadic {
            return Err(Error::new(v.span(),
                "callmock does not support variadic methods"));
        }
        match self.sig.inputs.first() {
            Some(FnArg::Receiver(r))
                if r.reference.is_some() && r.colon_token.is_none() =>
            {
                if let Some((_, Some(lt))) = &r.reference {
                    return Err(Error::new(lt.span(),
                        "callmock does not support non-'static lifetimes"));
                }
            },
            Some(FnArg::Receiver(r)) => {
                return Err(Error::new(r.span(),
                    "callmock only supports methods that take &self or &mut self"));
            },
            _ => {
                return Err(Error::new(self.sig.ident.span(),
                    "callmock does not support static methods"));
            }
        }
        check_return_type(&self.sig.output)?;

        let mut argnames = Vec::new();
        let mut argty = Vec::new();
        let mut callty = Vec::new();
        let mut predexprs = Vec::new();
        let mut predty = Vec::new();
        let mut recordexprs = Vec::new();
        let mut sig = self.sig.clone();
        for (i, fa) in sig.inputs.iter_mut().enumerate() {
            let FnArg::Typed(pt) = fa else {
                continue;    // Strip out the "&self" argument
            };
            check_arg_type(&pt.ty)?;
            let argname = match pt.pat.as_ref() {
                Pat::Ident(pi) if pi.by_ref.is_none() && pi.subpat.is_none()
                    => pi.ident.clone(),
                _ => format_ident!("arg{}", i - 1)
            };
            // The mock method only forwards its arguments
            *pt.pat = Pat::Ident(PatIdent {
                attrs: Vec::new(),
                by_ref: None,
                mutability: None,
                ident: argname.clone(),
                subpat: None
            });
            let aty = supersuperfy(&pt.ty, self.levels);
            if let Type::Reference(ref tr) = aty {
                let elem = tr.elem.as_ref();
                predexprs.push(quote!(&*#argname));
                predty.push(elem.clone());
                callty.push(quote!(<#elem as ::std::borrow::ToOwned>::Owned));
                recordexprs.push(
                    quote!(<#elem as ::std::borrow::ToOwned>::to_owned(&*#argname))
                );
            } else {
                predexprs.push(quote!(&#argname));
                predty.push(aty.clone());
                callty.push(quote!(#aty));
                recordexprs.push(
                    quote!(<#aty as ::std::clone::Clone>::clone(&#argname))
                );
            }
            argnames.push(argname);
            argty.push(aty);
        }
        let output = supersuperfy(&match &self.sig.output {
            ReturnType::Default => Type::Tuple(TypeTuple{
                paren_token: token::Paren::default(),
                elems: Punctuated::new()
            }),
            ReturnType::Type(_, ty) => (**ty).clone()
        }, self.levels);
        Ok(MockFunction {
            argnames,
            argty,
            callty,
            mod_ident,
            output,
            predexprs,
            predty,
            privmod_vis: self.vis.clone(),
            recordexprs,
            sig,
            struct_,
        })
    }

    /// How many levels of modules beneath the mocked trait this method's
    /// private module is nested.
    pub fn levels(&mut self, levels: i32) -> &mut Self {
        self.levels = levels;
        self
    }

    /// # Arguments
    ///
    /// * sig:      The signature of the mockable method
    /// * v:        The visibility of the mock struct
    pub fn new(sig: &'a Signature, vis: &'a Visibility) -> Self {
        Builder {
            levels: 0,
            parent: None,
            sig,
            struct_: None,
            vis
        }
    }

    /// Supply the name of the private module
    pub fn parent(&mut self, ident: &'a Ident) -> &mut Self {
        self.parent = Some(ident);
        self
    }

    /// Supply the name of the mock struct
    pub fn struct_(&mut self, ident: &'a Ident) -> &mut Self {
        self.struct_= Some(ident);
        self
    }
}

fn supersuperfy(ty: &Type, levels: i32) -> Type {
    let mut output = ty.clone();
    for _ in 0..levels {
        output = crate::supersuperfy(&output);
    }
    output
}

pub(crate) struct MockFunction {
    /// Names of the method arguments
    argnames: Vec<Ident>,
    /// Types of the method arguments, supersuperfied
    argty: Vec<Type>,
    /// Owned types used to record each argument
    callty: Vec<TokenStream>,
    /// Name of the method's private module
    mod_ident: Ident,
    /// Output type of the Method, supersuperfied.
    output: Type,
    /// Expressions that create the predicate arguments from the call arguments
    predexprs: Vec<TokenStream>,
    /// Types used for Predicates.  Will be almost the same as args, but every
    /// type will be a non-reference type.
    predty: Vec<Type>,
    /// Visibility of the private module.  Its contents are always `pub`.
    privmod_vis: Visibility,
    /// Expressions that create the recorded arguments from the call arguments
    recordexprs: Vec<TokenStream>,
    /// Signature of the mock method, with plain argument bindings
    sig: Signature,
    /// Name of the mock struct
    struct_: Ident,
}

impl MockFunction {
    /// Return the trait method implementation
    pub fn call(&self) -> impl ToTokens {
        let argnames = &self.argnames;
        let name = self.name();
        let sig = &self.sig;
        quote!(
            #sig {
                self.#name.call(self.callmock_strictness, #(#argnames),*)
            }
        )
    }

    /// Return the method that lists this method's recorded calls
    pub fn calls_fn(&self) -> impl ToTokens {
        let calls_ident = format_ident!("{}_calls", self.name());
        let docstr = format!("Copies of the calls received by `{}` that matched an expectation, oldest first.",
                             self.ident_str());
        let mod_ident = &self.mod_ident;
        let name = self.name();
        quote!(
            #[doc = #docstr]
            pub fn #calls_ident(&self) -> Vec<#mod_ident::Call>
            {
                self.#name.calls()
            }
        )
    }

    /// Return this method's contribution to its parent's checkpoint method
    pub fn checkpoint(&self) -> impl ToTokens {
        let name = self.name();
        quote!(__callmock_u.extend(self.#name.checkpoint());)
    }

    /// Generate code for the expect_ method
    pub fn expect(&self) -> impl ToTokens {
        let name = self.name();
        let expect_ident = format_ident!("expect_{}", name);
        let docstr = format!("Create an `Expectation` for mocking the `{}` method",
                             name.unraw());
        let mod_ident = &self.mod_ident;
        quote!(
            #[doc = #docstr]
            pub fn #expect_ident(&mut self) -> &mut #mod_ident::Expectation
            {
                self.#name.expect()
            }
        )
    }

    /// The mock struct's field holding this method's expectations
    pub fn field(&self) -> impl ToTokens {
        let mod_ident = &self.mod_ident;
        let name = self.name();
        quote!(#name: #mod_ident::Expectations)
    }

    pub fn field_default(&self) -> impl ToTokens {
        let mod_ident = &self.mod_ident;
        let name = self.name();
        quote!(#name: #mod_ident::Expectations::default())
    }

    fn ident_str(&self) -> String {
        format!("{}::{}", self.struct_, self.name().unraw())
    }

    pub fn name(&self) -> &Ident {
        &self.sig.ident
    }

    /// Generate code for this method's private module
    pub fn priv_module(&self) -> impl ToTokens {
        let call = &Call{f: self};
        let common = &Common{f: self};
        let expectation = &Expectation{f: self};
        let expectations = &Expectations{f: self};
        let matcher = &Matcher{f: self};
        let mod_ident = &self.mod_ident;
        let rfunc = &Rfunc{f: self};
        let vis = &self.privmod_vis;
        quote!(
            #[allow(non_snake_case, dead_code, missing_docs, unused_mut,
                    unused_variables)]
            #[doc(hidden)]
            #vis mod #mod_ident {
                use super::*;
                #[allow(unused_imports)]
                use ::callmock::{CaseTreeExt as _, Predicate as _};
                #rfunc
                #matcher
                #common
                #expectation
                #call
                #expectations
            }
        )
    }

    /// Return this method's contribution to its parent's
    /// assert_all_satisfied method
    pub fn unsatisfied(&self) -> impl ToTokens {
        let name = self.name();
        quote!(__callmock_u.extend(self.#name.unsatisfied());)
    }
}

/// The owned record of one call
struct Call<'a> {
    f: &'a MockFunction
}

impl<'a> ToTokens for Call<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let argnames = &self.f.argnames;
        let argstrs = argnames.iter()
            .map(|a| a.unraw().to_string())
            .collect::<Vec<_>>();
        let callty = &self.f.callty;
        let docstr = format!("Arguments of one call to `{}`.",
                             self.f.ident_str());
        quote!(
            #[doc = #docstr]
            #[derive(Clone)]
            pub struct Call {
                #(pub #argnames: #callty,)*
            }

            impl ::std::fmt::Debug for Call {
                fn fmt(&self, __callmock_fmt: &mut ::std::fmt::Formatter<'_>)
                    -> ::std::fmt::Result
                {
                    #[allow(unused_imports)]
                    use ::callmock::{ViaDebug as _, ViaNothing as _};
                    #(
                        let #argnames = (&::callmock::ArgPrinter(&self.#argnames))
                            .debug_string();
                    )*
                    __callmock_fmt.debug_struct("Call")
                        #(.field(#argstrs, &::std::format_args!("{}", #argnames)))*
                        .finish()
                }
            }
        ).to_tokens(tokens);
    }
}

/// Holds parts of the expectation that are common for all output types
struct Common<'a> {
    f: &'a MockFunction
}

impl<'a> ToTokens for Common<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let argnames = &self.f.argnames;
        let predty = &self.f.predty;
        let ident_str = self.f.ident_str();
        let with_generics_idents = (0..predty.len())
            .map(|i| format_ident!("CallmockMatcher{}", i))
            .collect::<Vec<_>>();
        let with_generics = with_generics_idents.iter().zip(predty.iter())
            .map(|(id, mt)|
                quote!(#id: ::callmock::Predicate<#mt> + Send + 'static)
            );
        let with_args = argnames.iter().zip(with_generics_idents.iter())
            .map(|(argname, id)| quote!(#argname: #id));
        let boxed_withargs = argnames.iter()
            .map(|aa| quote!(Box::new(#aa),));
        quote!(
            /// Holds the stuff that is independent of the output type
            pub struct Common {
                matcher: ::std::sync::Mutex<Matcher>,
                seq_handle: Option<::callmock::SeqHandle>,
                times: ::callmock::Times
            }

            impl ::std::default::Default for Common {
                fn default() -> Self {
                    Common {
                        matcher: ::std::sync::Mutex::new(Matcher::default()),
                        seq_handle: None,
                        times: ::callmock::Times::default()
                    }
                }
            }

            impl Common {
                pub fn call(&self) {
                    self.times.call()
                        .unwrap_or_else(|__callmock_m| {
                            let __callmock_desc = self.desc();
                            ::callmock::tracing::debug!(target: "callmock",
                                method = #ident_str,
                                matcher = %__callmock_desc,
                                "expectation called too many times");
                            ::std::panic!("{}: Expectation({}) {}", #ident_str,
                                __callmock_desc, __callmock_m);
                        });
                    self.verify_sequence();
                    if self.times.is_satisfied() {
                        self.satisfy_sequence()
                    }
                }

                pub fn desc(&self) -> String {
                    self.matcher()
                        .to_string()
                }

                pub fn explain(&self, #( #argnames: &#predty, )*) -> String {
                    self.matcher().explain(#(#argnames, )*)
                }

                pub fn in_sequence(&mut self,
                                   __callmock_seq: &mut ::callmock::Sequence)
                {
                    assert!(self.times.is_exact(),
                        "Only Expectations with an exact call count have sequences");
                    self.seq_handle = Some(__callmock_seq.next_handle());
                }

                pub fn is_done(&self) -> bool {
                    self.times.is_done()
                }

                fn matcher(&self) -> ::std::sync::MutexGuard<'_, Matcher> {
                    self.matcher.lock()
                        .unwrap_or_else(::std::sync::PoisonError::into_inner)
                }

                pub fn matches(&self, #( #argnames: &#predty, )*) -> bool {
                    self.matcher().matches(#(#argnames, )*)
                }

                /// Forbid this expectation from ever being called.
                pub fn never(&mut self) {
                    self.times.never();
                }

                fn satisfy_sequence(&self) {
                    if let Some(__callmock_handle) = &self.seq_handle {
                        __callmock_handle.satisfy()
                    }
                }

                /// Expect this expectation to be called any number of times
                /// contained with the given range.
                pub fn times<CallmockR>(&mut self, __callmock_r: CallmockR)
                    where CallmockR: Into<::callmock::TimesRange>
                {
                    self.times.times(__callmock_r)
                }

                pub fn unsatisfied(&self) -> Option<::callmock::Unsatisfied> {
                    ::callmock::Unsatisfied::check(#ident_str, &*self.matcher(),
                                                   &self.times)
                }

                pub fn with<#(#with_generics, )*>(&mut self, #(#with_args, )*)
                {
                    *self.matcher() = Matcher::Pred(Box::new((#(#boxed_withargs)*)));
                }

                pub fn withf<CallmockF>(&mut self, __callmock_f: CallmockF)
                    where CallmockF: Fn(#( &#predty, )*) -> bool + Send + 'static
                {
                    *self.matcher() = Matcher::Func(Box::new(__callmock_f));
                }

                pub fn withf_st<CallmockF>(&mut self, __callmock_f: CallmockF)
                    where CallmockF: Fn(#( &#predty, )*) -> bool + 'static
                {
                    *self.matcher() = Matcher::FuncST(
                        ::callmock::Fragile::new(Box::new(__callmock_f))
                    );
                }

                fn verify_sequence(&self) {
                    if let Some(__callmock_handle) = &self.seq_handle {
                        __callmock_handle.verify(#ident_str)
                    }
                }
            }
        ).to_tokens(tokens);
    }
}

/// The per-method Expectation and its builder methods
struct Expectation<'a> {
    f: &'a MockFunction
}

impl<'a> ToTokens for Expectation<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let argnames = &self.f.argnames;
        let argty = &self.f.argty;
        let ident_str = self.f.ident_str();
        let output = &self.f.output;
        let predty = &self.f.predty;
        let with_generics_idents = (0..predty.len())
            .map(|i| format_ident!("CallmockMatcher{}", i))
            .collect::<Vec<_>>();
        let with_generics = with_generics_idents.iter().zip(predty.iter())
            .map(|(id, mt)|
                quote!(#id: ::callmock::Predicate<#mt> + Send + 'static)
            );
        let with_args = argnames.iter().zip(with_generics_idents.iter())
            .map(|(argname, id)| quote!(#argname: #id));
        quote!(
            /// Expectation type for one mocked method.  This is the type
            /// returned by the `expect_*` methods.
            pub struct Expectation {
                common: Common,
                rfunc: ::std::sync::Mutex<Rfunc>,
            }

            impl Expectation {
                /// Call this [`Expectation`] as if it were the real method.
                #[doc(hidden)]
                pub fn call(&self, __callmock_strictness: ::callmock::Strictness,
                            #(#argnames: #argty, )*) -> #output
                {
                    self.common.call();
                    let __callmock_err = match self.rfunc()
                        .call_mut(#(#argnames, )*)
                    {
                        Ok(__callmock_o) => return __callmock_o,
                        Err(__callmock_e) => __callmock_e
                    };
                    if __callmock_err == ::callmock::ReturnError::Unspecified &&
                        __callmock_strictness == ::callmock::Strictness::ZeroValue
                    {
                        if let Some(__callmock_o) = zero_value() {
                            return __callmock_o;
                        }
                    }
                    ::std::panic!("{}: Expectation({}) {}", #ident_str,
                                  self.common.desc(), __callmock_err);
                }

                pub fn explain(&self, #( #argnames: &#predty, )*) -> String {
                    self.common.explain(#(#argnames, )*)
                }

                /// Add this expectation to a [`Sequence`](::callmock::Sequence).
                pub fn in_sequence(&mut self,
                                   __callmock_seq: &mut ::callmock::Sequence)
                    -> &mut Self
                {
                    self.common.in_sequence(__callmock_seq);
                    self
                }

                pub fn is_done(&self) -> bool {
                    self.common.is_done()
                }

                /// Validate this expectation's matcher.
                pub fn matches(&self, #(#argnames: &#predty, )*) -> bool {
                    self.common.matches(#(#argnames, )*)
                }

                /// Forbid this expectation from ever being called.
                pub fn never(&mut self) -> &mut Self {
                    self.common.never();
                    self
                }

                /// Create a new, default, [`Expectation`]
                pub fn new() -> Self {
                    Self::default()
                }

                /// Expect this expectation to be called exactly once.  Shortcut
                /// for [`times(1)`](#method.times).
                pub fn once(&mut self) -> &mut Self {
                    self.times(1)
                }

                /// Return a constant value from the `Expectation`
                ///
                /// The output type must be `Clone`.  The compiler can't always
                /// infer the proper type to use with this method; you will
                /// usually need to specify it explicitly.  i.e.
                /// `return_const(42i32)` instead of `return_const(42)`.
                pub fn return_const<CallmockOutput>(&mut self,
                                                    __callmock_c: CallmockOutput)
                    -> &mut Self
                    where CallmockOutput: Clone + Into<#output> + Send + 'static
                {
                    self.returning(move |#(#argnames, )*| __callmock_c.clone().into())
                }

                /// Supply an `FnOnce` closure that will provide the return
                /// value for this Expectation.  This is useful for return types
                /// that aren't `Clone`.  It will be an error to call this
                /// method multiple times.
                pub fn return_once<CallmockF>(&mut self, __callmock_f: CallmockF)
                    -> &mut Self
                    where CallmockF: FnOnce(#(#argty, )*) -> #output + Send + 'static
                {
                    *self.rfunc() = Rfunc::Once(Box::new(__callmock_f));
                    self
                }

                /// Single-threaded version of
                /// [`return_once`](#method.return_once).  This is useful for
                /// return types that are neither `Send` nor `Clone`.
                ///
                /// It is a runtime error to call the mock method from a
                /// different thread than the one that originally called this
                /// method.  It is also a runtime error to call the method more
                /// than once.
                pub fn return_once_st<CallmockF>(&mut self, __callmock_f: CallmockF)
                    -> &mut Self
                    where CallmockF: FnOnce(#(#argty, )*) -> #output + 'static
                {
                    *self.rfunc() = Rfunc::OnceST(
                        ::callmock::Fragile::new(Box::new(__callmock_f)));
                    self
                }

                /// Supply a closure that will provide the return value for this
                /// `Expectation`.  The method's arguments are passed to the
                /// closure by value.
                pub fn returning<CallmockF>(&mut self, __callmock_f: CallmockF)
                    -> &mut Self
                    where CallmockF: FnMut(#(#argty, )*) -> #output + Send + 'static
                {
                    *self.rfunc() = Rfunc::Mut(Box::new(__callmock_f));
                    self
                }

                /// Single-threaded version of [`returning`](#method.returning).
                /// Can be used when the argument or return type isn't `Send`.
                ///
                /// It is a runtime error to call the mock method from a
                /// different thread than the one that originally called this
                /// method.
                pub fn returning_st<CallmockF>(&mut self, __callmock_f: CallmockF)
                    -> &mut Self
                    where CallmockF: FnMut(#(#argty, )*) -> #output + 'static
                {
                    *self.rfunc() = Rfunc::MutST(
                        ::callmock::Fragile::new(Box::new(__callmock_f)));
                    self
                }

                fn rfunc(&self) -> ::std::sync::MutexGuard<'_, Rfunc> {
                    self.rfunc.lock()
                        .unwrap_or_else(::std::sync::PoisonError::into_inner)
                }

                /// Restrict the number of times that that this method may be
                /// called.
                ///
                /// The argument may be:
                /// * A fixed number: `.times(4)`
                /// * Various types of range:
                ///   - `.times(5..10)`
                ///   - `.times(..10)`
                ///   - `.times(5..)`
                ///   - `.times(5..=10)`
                ///   - `.times(..=10)`
                /// * The wildcard: `.times(..)`
                pub fn times<CallmockR>(&mut self, __callmock_r: CallmockR)
                    -> &mut Self
                    where CallmockR: Into<::callmock::TimesRange>
                {
                    self.common.times(__callmock_r);
                    self
                }

                pub fn unsatisfied(&self) -> Option<::callmock::Unsatisfied> {
                    self.common.unsatisfied()
                }

                /// Set matching criteria for this Expectation.
                ///
                /// The matching predicate can be anything implementing the
                /// [`Predicate`](::callmock::Predicate) trait.  Only one matcher
                /// can be set per `Expectation` at a time.
                pub fn with<#(#with_generics, )*>(&mut self, #(#with_args, )*)
                    -> &mut Self
                {
                    self.common.with(#(#argnames, )*);
                    self
                }

                /// Set a matching function for this Expectation.
                ///
                /// This is equivalent to calling [`with`](#method.with) with a
                /// function argument, like `with(predicate::function(f))`.
                pub fn withf<CallmockF>(&mut self, __callmock_f: CallmockF)
                    -> &mut Self
                    where CallmockF: Fn(#(&#predty, )*) -> bool + Send + 'static
                {
                    self.common.withf(__callmock_f);
                    self
                }

                /// Single-threaded version of [`withf`](#method.withf).
                /// Can be used when the argument type isn't `Send`.
                pub fn withf_st<CallmockF>(&mut self, __callmock_f: CallmockF)
                    -> &mut Self
                    where CallmockF: Fn(#(&#predty, )*) -> bool + 'static
                {
                    self.common.withf_st(__callmock_f);
                    self
                }
            }

            impl ::std::default::Default for Expectation {
                fn default() -> Self {
                    Expectation {
                        common: Common::default(),
                        rfunc: ::std::sync::Mutex::new(Rfunc::default())
                    }
                }
            }

            fn zero_value() -> Option<#output> {
                #[allow(unused_imports)]
                use ::callmock::{NoZeroValue as _, ReturnZero as _};
                (&::callmock::ZeroReturner::<#output>::new()).return_zero()
            }
        ).to_tokens(tokens);
    }
}

/// The collection of one method's expectations, plus its call log
struct Expectations<'a> {
    f: &'a MockFunction
}

impl<'a> ToTokens for Expectations<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let argnames = &self.f.argnames;
        let argty = &self.f.argty;
        let ident_str = self.f.ident_str();
        let output = &self.f.output;
        let predexprs = &self.f.predexprs;
        let recordexprs = &self.f.recordexprs;
        quote!(
            /// A collection of [`Expectation`] objects.  Users will rarely if
            /// ever use this struct directly.
            #[doc(hidden)]
            pub struct Expectations {
                calls: ::callmock::CallLog<Call>,
                expectations: Vec<Expectation>,
            }

            impl Expectations {
                /// Simulate calling the real method.  Every current expectation
                /// will be checked in FIFO order and the first one with
                /// matching arguments and calls to spare will be used.
                pub fn call(&self, __callmock_strictness: ::callmock::Strictness,
                            #(#argnames: #argty, )*) -> #output
                {
                    let __callmock_e = self.expectations.iter()
                        .find(|__callmock_e|
                            __callmock_e.matches(#(#predexprs, )*) &&
                            !__callmock_e.is_done())
                        .or_else(|| self.expectations.iter().rev()
                            .find(|__callmock_e|
                                __callmock_e.matches(#(#predexprs, )*)));
                    let Some(__callmock_e) = __callmock_e else {
                        #[allow(unused_imports)]
                        use ::callmock::{ViaDebug as _, ViaNothing as _};
                        let __callmock_args: Vec<String> = vec![#(
                            (&::callmock::ArgPrinter(#predexprs)).debug_string()
                        ),*];
                        let __callmock_args = __callmock_args.join(", ");
                        let __callmock_reasons = self.expectations.iter()
                            .map(|__callmock_e| __callmock_e.explain(#(#predexprs, )*))
                            .collect::<String>();
                        ::callmock::tracing::debug!(target: "callmock",
                            method = #ident_str,
                            args = %__callmock_args,
                            "no matching expectation");
                        ::std::panic!("{}: No matching expectation found for ({}){}",
                            #ident_str, __callmock_args, __callmock_reasons);
                    };
                    ::callmock::tracing::trace!(target: "callmock",
                        method = #ident_str, "matched call");
                    self.calls.record(Call {
                        #(#argnames: #recordexprs, )*
                    });
                    __callmock_e.call(__callmock_strictness, #(#argnames, )*)
                }

                pub fn calls(&self) -> Vec<Call> {
                    self.calls.calls()
                }

                /// Report the unsatisfied expectations, then clear them all.
                /// The call log is kept.
                pub fn checkpoint(&mut self) -> Vec<::callmock::Unsatisfied> {
                    let __callmock_u = self.unsatisfied();
                    self.expectations.clear();
                    __callmock_u
                }

                /// Create a new expectation for this method.
                pub fn expect(&mut self) -> &mut Expectation {
                    self.expectations.push(Expectation::default());
                    let __callmock_l = self.expectations.len();
                    &mut self.expectations[__callmock_l - 1]
                }

                pub fn new() -> Self {
                    Self::default()
                }

                pub fn unsatisfied(&self) -> Vec<::callmock::Unsatisfied> {
                    self.expectations.iter()
                        .filter_map(Expectation::unsatisfied)
                        .collect()
                }
            }

            impl ::std::default::Default for Expectations {
                fn default() -> Self {
                    Expectations {
                        calls: ::callmock::CallLog::new(),
                        expectations: Vec::new()
                    }
                }
            }
        ).to_tokens(tokens);
    }
}

/// Matches a method's arguments
struct Matcher<'a> {
    f: &'a MockFunction
}

impl<'a> ToTokens for Matcher<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let argnames = &self.f.argnames;
        let braces = argnames.iter()
            .map(|_| "{}")
            .collect::<Vec<_>>()
            .join(", ");
        let indices = (0..argnames.len())
            .map(syn::Index::from)
            .collect::<Vec<_>>();
        let preds = self.f.predty.iter()
            .map(|t| quote!(Box<dyn ::callmock::Predicate<#t> + Send>,));
        let predty = &self.f.predty;
        quote!(
            pub enum Matcher {
                Always,
                Func(Box<dyn Fn(#( &#predty, )*) -> bool + Send>),
                // Version of Matcher::Func for closures that aren't Send
                FuncST(::callmock::Fragile<Box<dyn Fn(#( &#predty, )*) -> bool>>),
                Pred(Box<(#(#preds)*)>),
            }

            impl Matcher {
                /// Describe why each predicate rejected the arguments.
                pub fn explain(&self, #( #argnames: &#predty, )*) -> String {
                    let mut __callmock_out = String::new();
                    if let Matcher::Pred(__callmock_pred) = self {
                        #(
                            if let Some(__callmock_case) =
                                __callmock_pred.#indices.find_case(false, #argnames)
                            {
                                __callmock_out.push_str(&::std::format!("\n{}",
                                    __callmock_case.tree()));
                            }
                        )*
                    }
                    __callmock_out
                }

                pub fn matches(&self, #( #argnames: &#predty, )*) -> bool {
                    match self {
                        Matcher::Always => true,
                        Matcher::Func(__callmock_f) =>
                            __callmock_f(#(#argnames, )*),
                        Matcher::FuncST(__callmock_f) =>
                            (__callmock_f.get())(#(#argnames, )*),
                        Matcher::Pred(__callmock_pred) =>
                            true #(&& __callmock_pred.#indices.eval(#argnames))*,
                    }
                }
            }

            impl ::std::default::Default for Matcher {
                fn default() -> Self {
                    Matcher::Always
                }
            }

            impl ::std::fmt::Display for Matcher {
                fn fmt(&self, __callmock_fmt: &mut ::std::fmt::Formatter<'_>)
                    -> ::std::fmt::Result
                {
                    match self {
                        Matcher::Always => write!(__callmock_fmt, "<anything>"),
                        Matcher::Func(_) => write!(__callmock_fmt, "<function>"),
                        Matcher::FuncST(_) =>
                            write!(__callmock_fmt, "<single threaded function>"),
                        Matcher::Pred(__callmock_pred) => {
                            write!(__callmock_fmt, #braces,
                                #(__callmock_pred.#indices,)*)
                        }
                    }
                }
            }
        ).to_tokens(tokens);
    }
}

/// Produces a method's return value
struct Rfunc<'a> {
    f: &'a MockFunction
}

impl<'a> ToTokens for Rfunc<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let argnames = &self.f.argnames;
        let argty = &self.f.argty;
        let output = &self.f.output;
        quote!(
            pub enum Rfunc {
                Default,
                // Indicates that a `return_once` expectation has already
                // returned
                Expired,
                Mut(Box<dyn FnMut(#(#argty, )*) -> #output + Send>),
                // Version of Rfunc::Mut for closures that aren't Send
                MutST(::callmock::Fragile<
                    Box<dyn FnMut(#(#argty, )*) -> #output >>
                ),
                Once(Box<dyn FnOnce(#(#argty, )*) -> #output + Send>),
                // Version of Rfunc::Once for closure that aren't Send
                OnceST(::callmock::Fragile<
                    Box<dyn FnOnce(#(#argty, )*) -> #output>>
                ),
            }

            impl Rfunc {
                pub fn call_mut(&mut self, #( #argnames: #argty, )* )
                    -> ::std::result::Result<#output, ::callmock::ReturnError>
                {
                    match self {
                        Rfunc::Default => {
                            Err(::callmock::ReturnError::Unspecified)
                        },
                        Rfunc::Expired => {
                            Err(::callmock::ReturnError::Expired)
                        },
                        Rfunc::Mut(__callmock_f) => {
                            Ok(__callmock_f( #(#argnames, )* ))
                        },
                        Rfunc::MutST(__callmock_f) => {
                            Ok((__callmock_f.get_mut())(#(#argnames,)*))
                        },
                        Rfunc::Once(_) => {
                            if let Rfunc::Once(__callmock_f) =
                                ::std::mem::replace(self, Rfunc::Expired) {
                                Ok(__callmock_f( #(#argnames, )* ))
                            } else {
                                unreachable!()
                            }
                        },
                        Rfunc::OnceST(_) => {
                            if let Rfunc::OnceST(__callmock_f) =
                                ::std::mem::replace(self, Rfunc::Expired) {
                                Ok((__callmock_f.into_inner())(#(#argnames,)*))
                            } else {
                                unreachable!()
                            }
                        },
                    }
                }
            }

            impl ::std::default::Default for Rfunc {
                fn default() -> Self {
                    Rfunc::Default
                }
            }
        ).to_tokens(tokens);
    }
}
