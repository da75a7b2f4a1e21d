use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::RpcError;
use crate::RpcResult;

/// L1 block height. `None` wherever a block is optional means the latest block.
pub type L1BlockNumber = u64;

/// Per-request settings that travel with every RPC call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    pub timeout: Option<Duration>,
}

impl Context {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A read-only contract call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMsg {
    pub from: Address,
    pub to: Option<Address>,
    pub gas: u64,
    pub gas_price: Option<u128>,
    pub gas_fee_cap: Option<u128>,
    pub gas_tip_cap: Option<u128>,
    pub value: Option<u128>,
    pub data: Vec<u8>,
}

impl CallMsg {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self { to: Some(to), data, ..Default::default() }
    }
}

/// One request of a batch. The client fills in `result` or `error` for each element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchElem {
    pub method: String,
    pub args: Vec<Value>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl BatchElem {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self { method: method.into(), args, result: None, error: None }
    }

    /// Decodes the element's result, or returns the error the client reported for it.
    pub fn decode_result<T: DeserializeOwned>(&self) -> RpcResult<T> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let value = self.result.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}
