// vim: tw=80
//! An async trait, for use with Futures
#![deny(warnings)]

use async_trait::async_trait;
use futures::executor::block_on;
use callmock::*;

#[automock]
#[async_trait]
pub trait Client: Send + Sync {
    async fn call(&self, method: &str, block: Option<u64>) -> Result<Vec<u8>, String>;
    async fn batch(&self, requests: &mut [String]) -> Result<(), String>;
}

#[test]
fn return_const() {
    let mut mock = MockClient::new();
    mock.expect_call()
        .return_const(Ok::<Vec<u8>, String>(vec![1, 2]));
    assert_eq!(Ok(vec![1, 2]), block_on(mock.call("eth_call", None)));
}

#[test]
fn returning_sees_the_arguments() {
    let mut mock = MockClient::new();
    mock.expect_batch()
        .returning(|requests| {
            if requests.len() > 2 {
                return Err("too large".to_owned());
            }
            for r in requests.iter_mut() {
                r.push_str(":done");
            }
            Ok(())
        });
    let mut small = vec!["a".to_owned(), "b".to_owned()];
    let mut large = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
    assert_eq!(Ok(()), block_on(mock.batch(&mut small)));
    assert_eq!(vec!["a:done", "b:done"], small);
    assert_eq!(Err("too large".to_owned()), block_on(mock.batch(&mut large)));
    assert_eq!(2, mock.batch_calls()[0].requests.len());
}

#[test]
fn zero_value() {
    let mut mock = MockClient::with_strictness(Strictness::ZeroValue);
    mock.expect_call()
        .with(predicate::eq("eth_call"), predicate::always());
    assert_eq!(Ok(Vec::new()), block_on(mock.call("eth_call", Some(1))));
}

#[test]
fn boxed_trait_object() {
    let mut mock = MockClient::new();
    mock.expect_call()
        .returning(|method, _| Ok(method.as_bytes().to_vec()));
    let client: Box<dyn Client> = Box::new(mock);
    assert_eq!(Ok(b"x".to_vec()), block_on(client.call("x", None)));
}
