//! Randomness source whose fulfilment is driven by the test

use parking_lot::Mutex;
use tally_core::effects::{RandomnessEffects, RequestId};
use tally_core::{Address, Result, TallyError};

#[derive(Debug)]
struct CoordinatorState {
    next_request_id: RequestId,
    requests: Vec<(RequestId, Address, u32)>,
    unavailable: bool,
}

/// Hands out sequential request ids starting at 1 and records each request.
/// Tests deliver words by calling the consumer's fulfilment callback.
#[derive(Debug)]
pub struct MockRandomnessCoordinator {
    state: Mutex<CoordinatorState>,
}

impl Default for MockRandomnessCoordinator {
    fn default() -> Self {
        Self {
            state: Mutex::new(CoordinatorState {
                next_request_id: 1,
                requests: Vec::new(),
                unavailable: false,
            }),
        }
    }
}

impl MockRandomnessCoordinator {
    /// Fresh coordinator
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next request will receive
    pub fn next_request_id(&self) -> RequestId {
        self.state.lock().next_request_id
    }

    /// Make every request fail (or stop failing)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    /// Every `(id, requester, word count)` seen so far
    pub fn requests(&self) -> Vec<(RequestId, Address, u32)> {
        self.state.lock().requests.clone()
    }
}

impl RandomnessEffects for MockRandomnessCoordinator {
    fn request_random_words(&self, requester: Address, count: u32) -> Result<RequestId> {
        let mut state = self.state.lock();
        if state.unavailable {
            return Err(TallyError::internal("randomness coordinator unavailable"));
        }
        let id = state.next_request_id;
        state.next_request_id += 1;
        state.requests.push((id, requester, count));
        Ok(id)
    }
}
