// carepath/src/services/mod.rs

pub mod backend;
pub mod cart_details;
pub mod dependants;
pub mod events;
pub mod mirror;
pub mod payment_gateway;
pub mod pharmacy;
