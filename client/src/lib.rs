// carepath/src/lib.rs

//! Client-side orchestration for the Carepath care and pharmacy backend.
//!
//! - [`services::cart_details`] fetches appointment carts and normalizes them
//!   into [`models::CartItemDetails`].
//! - [`checkout::CheckoutSession`] drives checkout: free confirmation or
//!   gateway payment, per-line booking confirmation, local cart cleanup.
//! - [`services::pharmacy`] wraps the pharmacy catalog, cart and order API
//!   and keeps a local mirror of the server cart.
//! - [`services::dependants`] manages an employee's family members.
//!
//! The backend, the payment widget and local storage sit behind the
//! [`Backend`], [`PaymentGateway`] and [`KeyValueStore`] traits.

pub mod checkout;
pub mod config;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod pipelines;
pub mod services;
pub mod state;

pub use crate::checkout::{CheckoutEntry, CheckoutSession, CheckoutState};
pub use crate::config::ClientConfig;
pub use crate::errors::{ClientError, Result};
pub use crate::services::backend::{Backend, HttpBackend, MultipartForm};
pub use crate::services::events::{CartEvent, CartEvents};
pub use crate::services::mirror::{CartMirror, FileStore, KeyValueStore, MemoryStore};
pub use crate::services::payment_gateway::{GatewayStatus, PaymentGateway, PaymentOutcome, PaymentRequest, Prefill};
pub use crate::state::CareClient;
