// vim: tw=80
//! A simple trait with return values set by constants and by closures
#![deny(warnings)]

use callmock::*;

#[automock]
pub trait Oracle {
    fn price(&self, block: u64) -> u128;
    fn reset(&self);
}

#[test]
fn return_const() {
    let mut mock = MockOracle::new();
    mock.expect_price()
        .return_const(42u128);
    assert_eq!(42, mock.price(1));
}

#[test]
fn returning() {
    let mut mock = MockOracle::new();
    mock.expect_price()
        .returning(|block| u128::from(block) * 10);
    assert_eq!(50, mock.price(5));
    assert_eq!(70, mock.price(7));
}

#[test]
fn returning_unit() {
    let mut mock = MockOracle::new();
    mock.expect_reset()
        .times(1)
        .return_const(());
    mock.reset();
}

#[test]
fn with() {
    let mut mock = MockOracle::new();
    mock.expect_price()
        .with(predicate::eq(4))
        .return_const(1u128);
    mock.expect_price()
        .with(predicate::gt(4))
        .return_const(2u128);
    assert_eq!(1, mock.price(4));
    assert_eq!(2, mock.price(5));
}

#[test]
fn withf() {
    let mut mock = MockOracle::new();
    mock.expect_price()
        .withf(|block| block % 2 == 0)
        .return_const(0u128);
    mock.expect_price()
        .return_const(1u128);
    assert_eq!(0, mock.price(2));
    assert_eq!(1, mock.price(3));
}

#[test]
fn trait_object() {
    let mut mock = MockOracle::new();
    mock.expect_price()
        .return_const(9u128);
    let oracle: Box<dyn Oracle> = Box::new(mock);
    assert_eq!(9, oracle.price(0));
}
