// carepath/src/pipelines/mod.rs

//! Flows built on `carepath_flow`.

pub mod checkout_pipeline;
pub mod contexts;
