//! Picking the one item to post from the candidates.
//!
//! | `order` | Strategy | Pick |
//! |---|---|---|
//! | `random` | [`RandomOrder`] | uniformly random candidate |
//! | `sequential` (or `seq`) | [`SequentialOrder`] | first candidate in walk order |
//!
//! An empty candidate list yields `None` from either strategy; that means
//! everything has been posted, which is a normal outcome.

use crate::catalog::Item;
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

pub trait SelectionStrategy {
    fn select<'a>(&mut self, candidates: &'a [Item]) -> Option<&'a Item>;
}

pub struct RandomOrder<R> {
    rng: R,
}

impl RandomOrder<ThreadRng> {
    pub fn from_entropy() -> Self {
        Self { rng: rand::rng() }
    }
}

impl<R: Rng> RandomOrder<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> SelectionStrategy for RandomOrder<R> {
    fn select<'a>(&mut self, candidates: &'a [Item]) -> Option<&'a Item> {
        candidates.choose(&mut self.rng)
    }
}

pub struct SequentialOrder;

impl SelectionStrategy for SequentialOrder {
    fn select<'a>(&mut self, candidates: &'a [Item]) -> Option<&'a Item> {
        candidates.first()
    }
}

/// Selection order as written in `config.toml`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Random,
    #[serde(alias = "seq")]
    Sequential,
}

impl Order {
    pub fn strategy(self) -> Box<dyn SelectionStrategy> {
        match self {
            Order::Random => Box::new(RandomOrder::from_entropy()),
            Order::Sequential => Box::new(SequentialOrder),
        }
    }
}
