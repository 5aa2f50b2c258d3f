//! Core types and rules for the FastTrack booking system.
//!
//! This crate provides the foundational types used by the store, engine and service crates:
//!
//! - **Identifiers**: `CustomerId`, `DriverId`, `TripId`, `PaymentId`, `AdminId`
//! - **Parties**: `Customer`, `Driver`, `Admin`
//! - **Trips**: `Trip`, `TripStatus`, `TripListing`
//! - **Payments**: `Payment`, `PaymentMethod`
//! - **Lifecycle**: the pure transition planner (`plan_assign`, `plan_complete`, ...)
//! - **Validation**: field checks applied before any request reaches the store
//!
//! # Trip states
//!
//! ```text
//! requested ──assign──▶ assigned ──complete──▶ completed
//!     │                    │
//!     └──────cancel────────┴──────────────────▶ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod party;
pub mod payment;
pub mod trip;
pub mod validation;

pub use error::{FastTrackError, Result};
pub use ids::{AdminId, CustomerId, DriverId, PaymentId, TripId};
pub use lifecycle::{
    plan_assign, plan_cancel, plan_complete, plan_edit, AvailabilityChange, DropoffChange,
    Operation, Transition,
};
pub use party::{Admin, Customer, Driver, DriverUpdate, NewCustomer, NewDriver};
pub use payment::{NewPayment, Payment, PaymentMethod, UnknownMethod, PAYMENT_STATUS_PAID};
pub use trip::{
    BookingRequest, NewTrip, Trip, TripDetails, TripListing, TripStatus, TripUpdate,
    UnknownStatus, DATE_FORMAT, TIME_FORMAT,
};
