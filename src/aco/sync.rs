//! Counting barrier with graceful departure.

use std::sync::{Condvar, Mutex};

struct BarrierState {
    registered: usize,
    arrived: usize,
    generation: u64,
}

/// A reusable rendezvous barrier whose participant count can shrink.
///
/// [`std::sync::Barrier`] fixes its count at construction, which deadlocks
/// a rendezvous the moment one participant finishes early. Replicas that
/// reach their time budget call [`leave`](DynamicBarrier::leave) instead of
/// waiting, and the remaining participants rendezvous among themselves.
///
/// Generation counting makes the barrier reusable across rounds: a waiter
/// sleeps until the generation it arrived in has been released.
pub struct DynamicBarrier {
    state: Mutex<BarrierState>,
    condvar: Condvar,
}

impl DynamicBarrier {
    /// Creates a barrier expecting `participants` arrivals per round.
    pub fn new(participants: usize) -> Self {
        Self {
            state: Mutex::new(BarrierState {
                registered: participants,
                arrived: 0,
                generation: 0,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Blocks until every currently registered participant has arrived.
    pub fn wait(&self) {
        let mut state = self.state.lock().expect("barrier lock poisoned");

        state.arrived += 1;
        if state.arrived >= state.registered {
            state.arrived = 0;
            state.generation += 1;
            self.condvar.notify_all();
            return;
        }

        let generation = state.generation;
        while state.generation == generation {
            state = self.condvar.wait(state).expect("barrier lock poisoned");
        }
    }

    /// Permanently deregisters one participant.
    ///
    /// If the departure satisfies a round that others are already waiting
    /// on, they are released immediately.
    pub fn leave(&self) {
        let mut state = self.state.lock().expect("barrier lock poisoned");

        state.registered -= 1;
        if state.registered > 0 && state.arrived >= state.registered {
            state.arrived = 0;
            state.generation += 1;
            self.condvar.notify_all();
        }
    }
}
