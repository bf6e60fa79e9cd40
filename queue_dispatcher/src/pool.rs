use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::rpc::ConsumerRpc;

/// Fixed-size ordered array of connected consumers with a round-robin
/// cursor. The index only advances on a successful dispatch; a failed or
/// timed-out attempt retries the same consumer next iteration.
pub struct ConsumerPool {
    clients: Vec<Arc<dyn ConsumerRpc>>,
    index: AtomicUsize,
}

impl ConsumerPool {
    pub fn new(clients: Vec<Arc<dyn ConsumerRpc>>) -> Self {
        Self { clients, index: AtomicUsize::new(0) }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// The consumer the dispatcher should try next; does not itself mutate state.
    pub fn current(&self) -> Arc<dyn ConsumerRpc> {
        self.clients[self.index.load(Ordering::SeqCst) % self.clients.len()].clone()
    }

    /// Advances the round-robin index; only called after a terminal success.
    pub fn advance(&self) {
        let len = self.clients.len();
        self.index.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| Some((i + 1) % len)).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_distribution_is_balanced_within_one() {
        let index = AtomicUsize::new(0);
        let len = 3usize;
        let mut counts = [0usize; 3];
        for _ in 0..10 {
            let i = index.load(Ordering::SeqCst) % len;
            counts[i] += 1;
            index.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| Some((v + 1) % len)).ok();
        }
        // 10 dispatches over 3 consumers: each gets floor(10/3) or ceil(10/3).
        for c in counts {
            assert!(c == 3 || c == 4);
        }
    }
}
