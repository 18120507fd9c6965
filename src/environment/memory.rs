//! In-process doppelganger.

use super::{Environment, EnvironmentFuture};
use crate::errors::CallError;
use crate::signature::AddressKey;
use futures::future::{self, FutureExt as _};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Execution environment that keeps expectations in memory and serves them
/// the same way a deployed doppelganger contract does.
///
/// Clones share state, so a test can keep one clone for invoking the mock
/// while the engine installs expectations through another.
#[derive(Clone, Default)]
pub struct MemoryEnvironment {
    /// Mutable state.
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    /// Responses by raw address key.
    slots: HashMap<Vec<u8>, Slot>,

    /// Revert reason for plain value transfers.
    transfer_reject: Option<String>,

    /// Number of primitives performed, for diagnostics.
    installs: usize,
}

#[derive(Default)]
struct Slot {
    current: Option<Response>,
    queue: VecDeque<Response>,
}

impl Slot {
    fn is_initialized(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }
}

#[derive(Clone, Debug)]
enum Response {
    Return(Vec<u8>),
    Revert(String),
}

impl MemoryEnvironment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes the mocked contract with `calldata`.
    ///
    /// The exact call data is looked up first, then its selector. The
    /// current response of the matching slot is served and the slot then
    /// advances to the oldest queued response, if any. The last response
    /// keeps being served once the queue is drained.
    ///
    /// Empty call data is a plain value transfer.
    pub fn call(&self, calldata: &[u8]) -> Result<Vec<u8>, CallError> {
        let mut state = self.state.lock().unwrap();

        if calldata.is_empty() {
            return match &state.transfer_reject {
                Some(reason) => Err(CallError::Revert(reason.clone())),
                None => Ok(Vec::new()),
            };
        }

        let key = if state
            .slots
            .get(calldata)
            .map_or(false, Slot::is_initialized)
        {
            calldata
        } else {
            &calldata[..calldata.len().min(4)]
        };
        let slot = state
            .slots
            .get_mut(key)
            .filter(|slot| slot.is_initialized())
            .ok_or(CallError::NotInitialized)?;

        if slot.current.is_none() {
            slot.current = slot.queue.pop_front();
        }
        let response = slot.current.clone().ok_or(CallError::NotInitialized)?;
        if let Some(next) = slot.queue.pop_front() {
            slot.current = Some(next);
        }

        match response {
            Response::Return(payload) => Ok(payload),
            Response::Revert(reason) => Err(CallError::Revert(reason)),
        }
    }

    /// Number of storage primitives performed so far.
    pub fn installs(&self) -> usize {
        self.state.lock().unwrap().installs
    }

    /// Removes every stored response.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        *state = State::default();
    }

    fn update(&self, f: impl FnOnce(&mut State)) -> EnvironmentFuture<'_> {
        let mut state = self.state.lock().unwrap();
        state.installs += 1;
        f(&mut state);
        future::ready(Ok(())).boxed()
    }

    fn set_default(&self, key: AddressKey, response: Response) -> EnvironmentFuture<'_> {
        self.update(move |state| {
            state.slots.entry(key.as_bytes().to_vec()).or_default().current = Some(response);
        })
    }

    fn enqueue(&self, key: AddressKey, response: Response) -> EnvironmentFuture<'_> {
        self.update(move |state| {
            state
                .slots
                .entry(key.as_bytes().to_vec())
                .or_default()
                .queue
                .push_back(response);
        })
    }
}

impl Environment for MemoryEnvironment {
    fn set_default_return(&self, key: AddressKey, payload: Vec<u8>) -> EnvironmentFuture<'_> {
        self.set_default(key, Response::Return(payload))
    }

    fn queue_return(&self, key: AddressKey, payload: Vec<u8>) -> EnvironmentFuture<'_> {
        self.enqueue(key, Response::Return(payload))
    }

    fn set_default_revert(&self, key: AddressKey, reason: String) -> EnvironmentFuture<'_> {
        self.set_default(key, Response::Revert(reason))
    }

    fn queue_revert(&self, key: AddressKey, reason: String) -> EnvironmentFuture<'_> {
        self.enqueue(key, Response::Revert(reason))
    }

    fn set_transfer_reject(&self, reason: String) -> EnvironmentFuture<'_> {
        self.update(move |state| state.transfer_reject = Some(reason))
    }
}

impl std::fmt::Debug for MemoryEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MemoryEnvironment")
    }
}
