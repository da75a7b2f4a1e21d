// vim: tw=80
//! What a matched expectation without a return value does
#![deny(warnings)]

use std::collections::HashMap;

use callmock::*;

pub struct NoZero;

#[automock]
trait Foo {
    fn count(&self) -> u64;
    fn fetch(&self, key: u32) -> Result<Vec<u8>, String>;
    fn lookup(&self) -> (Option<String>, HashMap<u32, u32>, [bool; 2]);
    fn opaque(&self) -> NoZero;
}

#[test]
fn strict_is_the_default() {
    assert_eq!(Strictness::Strict, MockFoo::new().strictness());
    assert_eq!(Strictness::Strict, MockFoo::default().strictness());
}

#[test]
#[should_panic(expected = "MockFoo::count: Expectation(<anything>) no return value specified")]
fn strict_panics() {
    let mut mock = MockFoo::new();
    mock.expect_count();
    mock.count();
}

#[test]
fn zero_value_returns_zero() {
    let mut mock = MockFoo::with_strictness(Strictness::ZeroValue);
    mock.expect_count();
    mock.expect_fetch();
    mock.expect_lookup();
    assert_eq!(0, mock.count());
    assert_eq!(Ok(Vec::new()), mock.fetch(1));
    let (s, m, a) = mock.lookup();
    assert_eq!(None, s);
    assert!(m.is_empty());
    assert_eq!([false, false], a);
}

#[test]
fn configured_values_win_over_zero() {
    let mut mock = MockFoo::with_strictness(Strictness::ZeroValue);
    mock.expect_fetch()
        .returning(|key| Err(format!("missing {key}")));
    assert_eq!(Err("missing 3".to_owned()), mock.fetch(3));
}

#[test]
fn set_strictness() {
    let mut mock = MockFoo::new();
    mock.set_strictness(Strictness::ZeroValue);
    assert_eq!(Strictness::ZeroValue, mock.strictness());
    mock.expect_count();
    assert_eq!(0, mock.count());
}

#[test]
#[should_panic(expected = "MockFoo::count: No matching expectation found for ()")]
fn zero_value_still_requires_an_expectation() {
    let mock = MockFoo::with_strictness(Strictness::ZeroValue);
    mock.count();
}

#[test]
#[should_panic(expected = "MockFoo::opaque: Expectation(<anything>) no return value specified")]
fn types_without_a_zero_value_panic() {
    let mut mock = MockFoo::with_strictness(Strictness::ZeroValue);
    mock.expect_opaque();
    mock.opaque();
}
