// vim: tw=80
//! Call-count bounds on expectations
#![deny(warnings)]

use callmock::*;

#[automock]
trait Foo {
    fn foo(&self, x: u32);
}

#[test]
fn exact_ok() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .times(2)
        .return_const(());
    mock.foo(1);
    mock.foo(2);
}

#[test]
#[should_panic(expected = "MockFoo: 1 unsatisfied expectation(s)\n    MockFoo::foo: Expectation(<anything>) called 1 time(s) which is fewer than expected 2 (1 remaining)")]
fn exact_too_few() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .times(2)
        .return_const(());
    mock.foo(1);
}

#[test]
#[should_panic(expected = "MockFoo::foo: Expectation(<anything>) called 3 time(s) which is more than expected 2")]
fn exact_too_many() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .times(2)
        .return_const(());
    mock.foo(1);
    mock.foo(2);
    mock.foo(3);
}

#[test]
fn once() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .once()
        .return_const(());
    mock.foo(1);
}

#[test]
fn range_ok() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .times(1..4)
        .return_const(());
    mock.foo(1);
    mock.foo(2);
    mock.foo(3);
}

#[test]
#[should_panic(expected = "called 4 time(s) which is more than expected 3")]
fn range_too_many() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .times(1..4)
        .return_const(());
    for i in 0..4 {
        mock.foo(i);
    }
}

#[test]
fn range_inclusive_and_from() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .with(predicate::eq(1))
        .times(2..=3)
        .return_const(());
    mock.expect_foo()
        .with(predicate::eq(2))
        .times(1..)
        .return_const(());
    mock.foo(1);
    mock.foo(1);
    for _ in 0..10 {
        mock.foo(2);
    }
}

#[test]
fn range_to_allows_zero() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .times(..2)
        .return_const(());
    mock.expect_foo()
        .times(..=2)
        .return_const(());
}

#[test]
fn never_uncalled() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .never();
}

#[test]
#[should_panic(expected = "MockFoo::foo: Expectation(<anything>) called 1 time(s) which is more than expected 0")]
fn never_called() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .never();
    mock.foo(0);
}

#[test]
fn assert_all_satisfied_does_not_clear() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .times(1)
        .return_const(());
    mock.foo(0);
    mock.assert_all_satisfied();
    mock.assert_all_satisfied();
}
