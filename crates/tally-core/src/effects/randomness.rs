use crate::errors::Result;
use crate::identifiers::Address;
use std::sync::Arc;

/// Identifier the randomness source assigns to a request
pub type RequestId = u64;

/// Opaque source of random words.
///
/// A request returns immediately with an id; the words arrive later through
/// the consumer's fulfilment callback carrying the same id.
pub trait RandomnessEffects: Send + Sync {
    /// Request `count` random words on behalf of `requester`
    fn request_random_words(&self, requester: Address, count: u32) -> Result<RequestId>;
}

impl<T: RandomnessEffects + ?Sized> RandomnessEffects for Arc<T> {
    fn request_random_words(&self, requester: Address, count: u32) -> Result<RequestId> {
        (**self).request_random_words(requester, count)
    }
}
