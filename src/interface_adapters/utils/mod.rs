// Small shared helpers for the adapter layer.

pub mod rng;
