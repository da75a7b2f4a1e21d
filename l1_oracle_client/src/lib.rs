pub mod errors;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(any(feature = "testing", test))]
use callmock::automock;
use errors::RpcError;
use types::{BatchElem, CallMsg, Context, L1BlockNumber};

pub type SharedL1OracleClient = Arc<dyn L1OracleClient>;
pub type RpcResult<T> = Result<T, RpcError>;

/// The L1 RPC calls the gas price oracle depends on. Requires `Send + Sync` to allow sharing the
/// client across tasks.
#[cfg_attr(any(feature = "testing", test), automock)]
#[async_trait]
pub trait L1OracleClient: Send + Sync {
    /// Sends every request of `batch` in a single round trip, writing each element's result or
    /// error back into it.
    async fn batch_call_context(&self, ctx: &Context, batch: &mut [BatchElem]) -> RpcResult<()>;

    /// Executes a read-only contract call at `block_number`, or at the latest block if `None`.
    async fn call_contract(
        &self,
        ctx: &Context,
        msg: &CallMsg,
        block_number: Option<L1BlockNumber>,
    ) -> RpcResult<Vec<u8>>;
}
