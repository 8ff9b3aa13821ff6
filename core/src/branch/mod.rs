// carepath-flow/src/branch/mod.rs

//! Branching steps: a step whose `on` phase picks one sub-flow out of several
//! by evaluating conditions against the shared context.

mod arm;
pub mod builder;

pub use builder::{BranchBuilder, NoMatch};
