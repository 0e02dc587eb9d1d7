//! MAX-MIN Ant System search engine.
//!
//! One iteration of the colony: a batch of ants each constructs a
//! candidate assignment biased by the shared [`PheromoneTable`]
//! ([`construct`]), refines it with best-improvement 2-opt
//! ([`local_search`]), and the iteration's best (or periodically the
//! global best) is deposited back onto the table under MAX-MIN bounds.
//!
//! [`AcoRunner`] repeats this loop under a wall-clock budget in one of four
//! topologies selected by [`AcoConfig`]: sequential, replicated,
//! synchronous (parallel ants over one shared table), and cooperative
//! (independent colonies exchanging bests over a ring at barrier
//! rendezvous).
//!
//! # References
//!
//! - Stützle & Hoos (2000), "MAX-MIN Ant System"
//! - Stützle (1998), "Parallelization Strategies for Ant Colony
//!   Optimization"

mod config;
mod construct;
mod local_search;
mod pheromone;
mod runner;
mod sync;
mod types;

pub use config::{AcoConfig, Strategy};
pub use construct::construct;
pub use local_search::local_search;
pub use pheromone::PheromoneTable;
pub use runner::AcoRunner;
pub use sync::DynamicBarrier;
pub use types::AcoResult;
