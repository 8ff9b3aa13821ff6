// carepath/src/models/mod.rs

//! View models built from raw backend payloads.

pub mod cart_item;
pub mod dependant;
pub mod location;
pub mod pharmacy;
pub mod receipt;

pub use cart_item::{CartItemDetails, CartStatusResponse};
pub use dependant::{normalize_date, Dependant, DependantRequest, RelationshipTable, RELATIONSHIPS};
pub use location::City;
pub use pharmacy::{
  Attachment, CartItem, CartSummary, CheckoutOverview, Coupon, DeliveryEstimate, MedicineFilter, NewCoupon,
  OrderAttempt, OrderConfirmation, OrderRequest, PharmacyAddress, PharmacyCategory, PharmacyMedicine,
  PrescriptionUpload,
};
pub use receipt::{ConfirmationReport, ItemConfirmation, ItemFailure, Navigation, Receipt, SettlementMode};
