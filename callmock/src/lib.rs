// vim: tw=80
//! A call-expectation recorder for Rust traits.
//!
//! `callmock` turns a trait into a test double.  Annotate the trait with
//! [`#[automock]`](attr.automock.html) and a `Mock<Trait>` struct is generated
//! next to it.  The mock implements the trait, records every call it receives,
//! and answers each call from the expectations the test configured.
//!
//! # Getting Started
//! ```
//! use callmock::*;
//!
//! #[automock]
//! trait Oracle {
//!     fn price(&self, block: u64) -> u128;
//! }
//!
//! fn double_price(oracle: &dyn Oracle, block: u64) -> u128 {
//!     oracle.price(block) * 2
//! }
//!
//! # fn main() {
//! let mut mock = MockOracle::new();
//! mock.expect_price()
//!     .with(predicate::eq(7))
//!     .times(1)
//!     .returning(|block| u128::from(block) + 1);
//! assert_eq!(16, double_price(&mock, 7));
//! assert_eq!(7, mock.price_calls()[0].block);
//! # }
//! ```
//!
//! # Expectations
//!
//! Each call to `expect_<method>` appends an `Expectation` for that method.
//! When the mock method is called, its expectations are tried in the order
//! they were created.  The first one whose matcher accepts the arguments and
//! whose call-count bound is not yet exhausted answers the call.  Once an
//! expectation is exhausted, later calls fall through to the next matching
//! one:
//! ```
//! # use callmock::*;
//! #[automock]
//! trait Oracle {
//!     fn price(&self, block: u64) -> u128;
//! }
//!
//! # fn main() {
//! let mut mock = MockOracle::new();
//! mock.expect_price().times(1).return_const(100u128);
//! mock.expect_price().return_const(200u128);
//! assert_eq!(100, mock.price(1));
//! assert_eq!(200, mock.price(1));
//! assert_eq!(200, mock.price(1));
//! # }
//! ```
//!
//! A call that no expectation accepts is a test setup error: the mock panics
//! immediately, naming the method and the arguments.
//!
//! ## Matching arguments
//!
//! [`with`] takes one [`Predicate`] per argument.  For a reference argument
//! `&T` the predicate is over `T`.  [`withf`] takes a single closure over
//! references to all arguments.
//! ```
//! # use callmock::*;
//! #[automock]
//! trait Store {
//!     fn put(&self, key: &str, value: u32) -> bool;
//! }
//!
//! # fn main() {
//! let mut mock = MockStore::new();
//! mock.expect_put()
//!     .with(predicate::str::starts_with("gas"), predicate::always())
//!     .return_const(true);
//! mock.expect_put()
//!     .withf(|key, value| key.is_empty() && *value == 0)
//!     .return_const(false);
//! assert!(mock.put("gas_price", 5));
//! assert!(!mock.put("", 0));
//! # }
//! ```
//!
//! ## Call counts
//!
//! By default an expectation may be called any number of times.  [`times`]
//! accepts an exact count or any kind of range; [`once`] and [`never`] are
//! shortcuts.  Calling an expectation more often than allowed panics at call
//! time.  Calling it less often than required is reported when the mock is
//! dropped, or earlier by `checkpoint` or `assert_all_satisfied`:
//! ```should_panic
//! # use callmock::*;
//! #[automock]
//! trait Oracle {
//!     fn price(&self, block: u64) -> u128;
//! }
//!
//! # fn main() {
//! let mut mock = MockOracle::new();
//! mock.expect_price().once().return_const(100u128);
//! // mock drops here without ever being called
//! # }
//! ```
//!
//! ## Return values
//!
//! `return_const` returns a clone of a fixed value.  `returning` computes the
//! result from the actual arguments, which is how argument dependent behavior
//! is expressed.  `return_once` accepts an `FnOnce` for results that are not
//! `Clone`, and the `_st` variants accept closures that are not `Send`.
//!
//! An expectation with no return value panics when called, unless the mock
//! was created with [`Strictness::ZeroValue`], in which case it returns the
//! [`ZeroValue`] of the method's output type.
//!
//! ## Sequences
//!
//! Expectations may be bound to a [`Sequence`], which requires them to be
//! consumed in the order they were added to it, even across methods.
//!
//! ## Recorded calls
//!
//! Every matched call is appended to the method's call log.  The generated
//! `<method>_calls()` accessor returns a copy of the log as a `Vec` of `Call`
//! structs, one field per argument.  Reference arguments are recorded through
//! `ToOwned`, other arguments through `Clone`.
//!
//! ## Threads
//!
//! Mock methods take `&self` and all expectation state is synchronized, so a
//! mock may be shared with worker threads through an `Arc`.  Calls made from
//! other threads are counted and recorded like any other.
//!
//! [`with`]: #matching-arguments
//! [`withf`]: #matching-arguments
//! [`times`]: #call-counts
//! [`once`]: #call-counts
//! [`never`]: #call-counts

extern crate self as callmock;

use std::{
    fmt::{self, Debug},
    ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering}
    }
};

mod call_log;
mod report;
mod zero_value;

pub use callmock_derive::automock;
pub use predicates::prelude::{
    Predicate, PredicateBooleanExt, PredicateBoxExt, PredicateStrExt, predicate
};
pub use crate::call_log::CallLog;
pub use crate::report::{Unsatisfied, assert_satisfied};
pub use crate::zero_value::ZeroValue;
#[doc(hidden)]
pub use crate::zero_value::{NoZeroValue, ReturnZero, ZeroReturner};

#[doc(hidden)]
pub use fragile::Fragile;
#[doc(hidden)]
pub use predicates_tree::CaseTreeExt;
#[doc(hidden)]
pub use tracing;

/// What a mock does when a matched expectation has no return value.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Strictness {
    /// Panic with "no return value specified".
    #[default]
    Strict,
    /// Return the [`ZeroValue`] of the method's output type.  Output types
    /// without a zero value still panic.
    ZeroValue,
}

/// Why an expectation could not produce a return value.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReturnError {
    /// Neither a constant nor a closure was configured.
    Unspecified,
    /// A `return_once` closure was already consumed.
    Expired,
}

impl fmt::Display for ReturnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnError::Unspecified => f.write_str("no return value specified"),
            ReturnError::Expired =>
                f.write_str("called twice, but it returns by move"),
        }
    }
}

/// Formats mock arguments with `Debug` when their type implements it.
///
/// Generated code calls `(&ArgPrinter(&arg)).debug_string()` with both
/// [`ViaDebug`] and [`ViaNothing`] in scope; method resolution picks
/// `ViaDebug` whenever the argument is `Debug`.
#[doc(hidden)]
pub struct ArgPrinter<'a, T: ?Sized>(pub &'a T);

#[doc(hidden)]
pub trait ViaDebug {
    fn debug_string(&self) -> String;
}

impl<'a, T: Debug + ?Sized> ViaDebug for ArgPrinter<'a, T> {
    fn debug_string(&self) -> String {
        format!("{:?}", self.0)
    }
}

#[doc(hidden)]
pub trait ViaNothing {
    fn debug_string(&self) -> String;
}

impl<'a, T: ?Sized> ViaNothing for &ArgPrinter<'a, T> {
    fn debug_string(&self) -> String {
        "?".to_owned()
    }
}

/// The range of call counts an expectation accepts.
///
/// Built from a number or from any kind of `usize` range:
/// * A fixed number: `.times(4)`
/// * A range: `.times(5..10)`, `.times(..10)`, `.times(5..)`,
///   `.times(5..=10)`, `.times(..=10)`
/// * The wildcard: `.times(..)`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimesRange(Range<usize>);

impl Default for TimesRange {
    fn default() -> TimesRange {
        // By default, allow any number of calls
        TimesRange(0..usize::MAX)
    }
}

impl From<usize> for TimesRange {
    fn from(n: usize) -> TimesRange {
        TimesRange(n..n.saturating_add(1))
    }
}

impl From<Range<usize>> for TimesRange {
    fn from(r: Range<usize>) -> TimesRange {
        assert!(r.end > r.start, "Backwards range");
        TimesRange(r)
    }
}

impl From<RangeFrom<usize>> for TimesRange {
    fn from(r: RangeFrom<usize>) -> TimesRange {
        TimesRange(r.start..usize::MAX)
    }
}

impl From<RangeFull> for TimesRange {
    fn from(_: RangeFull) -> TimesRange {
        TimesRange::default()
    }
}

impl From<RangeInclusive<usize>> for TimesRange {
    fn from(r: RangeInclusive<usize>) -> TimesRange {
        assert!(r.end() >= r.start(), "Backwards range");
        TimesRange(*r.start()..r.end().saturating_add(1))
    }
}

impl From<RangeTo<usize>> for TimesRange {
    fn from(r: RangeTo<usize>) -> TimesRange {
        assert!(r.end > 0, "Empty range");
        TimesRange(0..r.end)
    }
}

impl From<RangeToInclusive<usize>> for TimesRange {
    fn from(r: RangeToInclusive<usize>) -> TimesRange {
        TimesRange(0..r.end.saturating_add(1))
    }
}

/// Call-count bound of a single expectation.
#[derive(Debug, Default)]
#[doc(hidden)]
pub struct Times {
    /// How many times has the expectation already been called?
    count: AtomicUsize,
    range: TimesRange
}

impl Times {
    /// Count one more call.  Fails if that exceeds the upper bound.
    pub fn call(&self) -> Result<(), String> {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        if count >= self.range.0.end {
            Err(format!("called {} time(s) which is more than expected {}",
                        count, self.maximum()))
        } else {
            Ok(())
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Has this expectation already been called the maximum allowed number of
    /// times?
    pub fn is_done(&self) -> bool {
        self.count() >= self.maximum()
    }

    /// Is it required that this expectation be called an exact number of times,
    /// or may it be satisfied by a range of call counts?
    pub fn is_exact(&self) -> bool {
        (self.range.0.end - self.range.0.start) == 1
    }

    /// Has this expectation been called more than its upper bound allows?
    pub fn is_exceeded(&self) -> bool {
        self.count() >= self.range.0.end
    }

    /// Has this expectation already been called the minimum required number of
    /// times?
    pub fn is_satisfied(&self) -> bool {
        self.count() >= self.range.0.start
    }

    /// The largest number of calls this expectation accepts.
    pub fn maximum(&self) -> usize {
        self.range.0.end - 1
    }

    /// The smallest number of calls this expectation requires.
    pub fn minimum(&self) -> usize {
        self.range.0.start
    }

    /// How many more calls are required before this expectation is satisfied.
    pub fn remaining(&self) -> usize {
        self.minimum().saturating_sub(self.count())
    }

    pub fn never(&mut self) {
        self.range = TimesRange(0..1);
    }

    pub fn times<T: Into<TimesRange>>(&mut self, t: T) {
        self.range = t.into();
    }
}

#[doc(hidden)]
pub struct SeqHandle {
    inner: Arc<SeqInner>,
    seq: usize
}

impl SeqHandle {
    /// Tell the Sequence that this expectation has been fully satisfied
    pub fn satisfy(&self) {
        self.inner.satisfy(self.seq);
    }

    /// Verify that this handle was called in the correct order
    pub fn verify(&self, desc: &str) {
        self.inner.verify(self.seq, desc);
    }
}

#[derive(Default)]
struct SeqInner {
    satisfaction_level: AtomicUsize,
}

impl SeqInner {
    /// Record the call identified by `seq` as fully satisfied.
    fn satisfy(&self, seq: usize) {
        let old_sl = self.satisfaction_level.fetch_add(1, Ordering::Relaxed);
        assert_eq!(old_sl, seq, "Method sequence violation.  Was an already-satisfied method called another time?");
    }

    /// Verify that the call identified by `seq` was called in the correct order
    fn verify(&self, seq: usize, desc: &str) {
        assert_eq!(seq, self.satisfaction_level.load(Ordering::Relaxed),
            "{}: Method sequence violation", desc)
    }
}

/// Used to enforce that mock calls must happen in the sequence specified.
///
/// Each expectation must expect to be called a fixed number of times.  Once
/// satisfied, the next expectation in the sequence will expect to be called.
///
/// # Examples
/// ```
/// # use callmock::*;
/// #[automock]
/// trait Client {
///     fn connect(&self);
///     fn query(&self, id: u32) -> u32;
/// }
///
/// # fn main() {
/// let mut seq = Sequence::new();
/// let mut mock = MockClient::new();
/// mock.expect_connect()
///     .times(1)
///     .in_sequence(&mut seq)
///     .return_const(());
/// mock.expect_query()
///     .times(1)
///     .in_sequence(&mut seq)
///     .returning(|id| id + 1);
/// mock.connect();
/// assert_eq!(3, mock.query(2));
/// # }
/// ```
///
/// It is an error to add an expectation to a `Sequence` if its call count is
/// unspecified.
#[derive(Default)]
pub struct Sequence {
    inner: Arc<SeqInner>,
    next_seq: usize,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Not for public consumption, but it must be public so the generated
    /// code can call it.
    #[doc(hidden)]
    pub fn next_handle(&mut self) -> SeqHandle {
        let handle = SeqHandle{inner: self.inner.clone(), seq: self.next_seq};
        self.next_seq += 1;
        handle
    }
}

#[cfg(test)]
mod t {
    use super::*;

    mod times {
        use super::*;

        #[test]
        fn default_allows_anything() {
            let times = Times::default();
            for _ in 0..100 {
                times.call().unwrap();
            }
            assert!(times.is_satisfied());
            assert!(!times.is_done());
            assert!(!times.is_exact());
        }

        #[test]
        fn exact() {
            let mut times = Times::default();
            times.times(2);
            assert!(times.is_exact());
            assert_eq!(2, times.remaining());
            times.call().unwrap();
            assert!(!times.is_satisfied());
            assert!(!times.is_done());
            times.call().unwrap();
            assert!(times.is_satisfied());
            assert!(times.is_done());
            assert_eq!(0, times.remaining());
            assert_eq!(
                Err("called 3 time(s) which is more than expected 2".to_owned()),
                times.call()
            );
            assert!(times.is_exceeded());
        }

        #[test]
        fn never() {
            let mut times = Times::default();
            times.never();
            assert!(times.is_done());
            assert!(times.is_satisfied());
            assert_eq!(
                Err("called 1 time(s) which is more than expected 0".to_owned()),
                times.call()
            );
        }

        #[test]
        fn ranges() {
            assert_eq!(TimesRange(2..5), TimesRange::from(2..5));
            assert_eq!(TimesRange(2..6), TimesRange::from(2..=5));
            assert_eq!(TimesRange(2..usize::MAX), TimesRange::from(2..));
            assert_eq!(TimesRange(0..5), TimesRange::from(..5));
            assert_eq!(TimesRange(0..6), TimesRange::from(..=5));
            assert_eq!(TimesRange::default(), TimesRange::from(..));
            assert_eq!(TimesRange(3..4), TimesRange::from(3));
        }

        #[test]
        #[should_panic(expected = "Backwards range")]
        fn backwards_range() {
            #[allow(clippy::reversed_empty_ranges)]
            let _ = TimesRange::from(5..2);
        }
    }

    mod sequence {
        use super::*;

        #[test]
        fn in_order() {
            let mut seq = Sequence::new();
            let first = seq.next_handle();
            let second = seq.next_handle();
            first.verify("first");
            first.satisfy();
            second.verify("second");
            second.satisfy();
        }

        #[test]
        #[should_panic(expected = "second: Method sequence violation")]
        fn out_of_order() {
            let mut seq = Sequence::new();
            let _first = seq.next_handle();
            let second = seq.next_handle();
            second.verify("second");
        }
    }

    mod arg_printer {
        use super::*;

        struct Opaque;

        #[test]
        fn debug_arguments_are_formatted() {
            let x = vec![1u8, 2, 3];
            assert_eq!("[1, 2, 3]", (&ArgPrinter(&x)).debug_string());
        }

        #[test]
        fn other_arguments_are_elided() {
            assert_eq!("?", (&ArgPrinter(&Opaque)).debug_string());
        }
    }

    #[test]
    fn return_error_display() {
        assert_eq!("no return value specified",
                   ReturnError::Unspecified.to_string());
        assert_eq!("called twice, but it returns by move",
                   ReturnError::Expired.to_string());
    }
}
