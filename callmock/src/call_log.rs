// vim: tw=80
//! Append-only record of the calls a mock method received.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError}
};

/// The calls one mock method has received, oldest first.
///
/// Each generated mock method owns a `CallLog` of its own `Call` struct.  Calls
/// are appended only after they matched an expectation.
pub struct CallLog<C> {
    calls: Mutex<Vec<C>>,
}

impl<C> CallLog<C> {
    pub fn new() -> Self {
        CallLog { calls: Mutex::new(Vec::new()) }
    }

    /// A copy of every call recorded so far.  The log is not locked once this
    /// returns, so the mock may be called again while the copy is alive.
    pub fn calls(&self) -> Vec<C> where C: Clone {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn record(&self, call: C) {
        self.lock().push(call);
    }

    // Poisoned logs stay readable
    fn lock(&self) -> MutexGuard<'_, Vec<C>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Default for CallLog<C> {
    fn default() -> Self {
        CallLog::new()
    }
}

impl<C: fmt::Debug> fmt::Debug for CallLog<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lock().iter()).finish()
    }
}

#[cfg(test)]
mod t {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Call {
        block: u64,
    }

    #[test]
    fn records_in_order() {
        let log = CallLog::new();
        assert!(log.is_empty());
        log.record(Call { block: 1 });
        log.record(Call { block: 2 });
        assert_eq!(2, log.len());
        assert_eq!(vec![Call { block: 1 }, Call { block: 2 }], log.calls());
    }

    #[test]
    fn debug() {
        let log = CallLog::new();
        log.record(Call { block: 7 });
        assert_eq!("[Call { block: 7 }]", format!("{:?}", log));
        assert_eq!("[Call { block: 7 }]", format!("{:?}", log.calls()));
    }

    #[test]
    fn snapshot_does_not_hold_the_lock() {
        let log = CallLog::new();
        log.record(Call { block: 1 });
        let calls = log.calls();
        log.record(Call { block: 2 });
        assert_eq!(vec![Call { block: 1 }], calls);
        assert_eq!(2, log.len());
    }

    #[test]
    fn survives_poisoning() {
        let log = std::sync::Arc::new(CallLog::new());
        log.record(Call { block: 1 });
        let log2 = log.clone();
        let _ = std::thread::spawn(move || {
            let _guard = log2.lock();
            panic!("producer failed");
        }).join();
        log.record(Call { block: 2 });
        assert_eq!(2, log.len());
    }
}
