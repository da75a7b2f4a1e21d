// vim: tw=80
//! A trait with native async methods
#![deny(warnings)]

use futures::executor::block_on;
use callmock::*;

#[automock]
trait Foo {
    async fn foo(&self, x: u32) -> u32;
}

#[test]
fn returning() {
    let mut mock = MockFoo::new();
    mock.expect_foo()
        .with(predicate::eq(4))
        .times(1)
        .returning(|x| x + 1);
    assert_eq!(5, block_on(mock.foo(4)));
    assert_eq!(4, mock.foo_calls()[0].x);
}
