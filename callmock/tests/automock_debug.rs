// vim: tw=80
//! Mock objects implement Debug
#![deny(warnings)]

use callmock::*;

#[automock]
pub trait Foo {
    fn foo(&self);
}

#[test]
fn debug() {
    let mock = MockFoo::new();
    assert_eq!("MockFoo { strictness: Strict, .. }", format!("{mock:?}"));
}

#[test]
fn debug_zero_value() {
    let mock = MockFoo::with_strictness(Strictness::ZeroValue);
    assert_eq!("MockFoo { strictness: ZeroValue, .. }", format!("{mock:?}"));
}
