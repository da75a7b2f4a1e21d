// vim: tw=80
//! Teardown verification of expectations.

use std::fmt;

use crate::Times;

/// An expectation whose call count ended up outside its bounds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unsatisfied {
    /// `Mock::method` that owns the expectation
    pub method: String,
    /// Description of the expectation's argument matcher
    pub matcher: String,
    /// How many times the expectation was called
    pub calls: usize,
    /// Fewest calls the expectation required
    pub minimum: usize,
    /// Most calls the expectation allowed
    pub maximum: usize,
}

impl Unsatisfied {
    /// Compare an expectation's call count with its bounds.
    #[doc(hidden)]
    pub fn check(method: &str, matcher: &dyn fmt::Display, times: &Times)
        -> Option<Unsatisfied>
    {
        if times.is_satisfied() && !times.is_exceeded() {
            return None;
        }
        Some(Unsatisfied {
            method: method.to_owned(),
            matcher: matcher.to_string(),
            calls: times.count(),
            minimum: times.minimum(),
            maximum: times.maximum(),
        })
    }

    /// Was the expectation called more often than it allowed?
    pub fn is_exceeded(&self) -> bool {
        self.calls > self.maximum
    }

    /// How many more calls the expectation needed.
    pub fn remaining(&self) -> usize {
        self.minimum.saturating_sub(self.calls)
    }
}

impl fmt::Display for Unsatisfied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exceeded() {
            write!(f, "{}: Expectation({}) called {} time(s) which is more than expected {}",
                   self.method, self.matcher, self.calls, self.maximum)
        } else {
            write!(f, "{}: Expectation({}) called {} time(s) which is fewer than expected {} ({} remaining)",
                   self.method, self.matcher, self.calls, self.minimum,
                   self.remaining())
        }
    }
}

/// Panic listing every unsatisfied expectation of `mock`, if there are any.
///
/// Generated mocks call this from `checkpoint`, `assert_all_satisfied` and
/// `Drop`.
pub fn assert_satisfied(mock: &str, unsatisfied: &[Unsatisfied]) {
    if unsatisfied.is_empty() {
        tracing::trace!(target: "callmock", mock, "all expectations satisfied");
        return;
    }
    let mut msg = format!("{}: {} unsatisfied expectation(s)", mock,
                          unsatisfied.len());
    for u in unsatisfied {
        tracing::debug!(target: "callmock", method = %u.method,
                        calls = u.calls, remaining = u.remaining(),
                        "unsatisfied expectation");
        msg.push_str("\n    ");
        msg.push_str(&u.to_string());
    }
    panic!("{}", msg);
}
