//! `SQLite` storage layer for FastTrack.
//!
//! This crate persists customers, drivers, trips, payments and operator accounts in a
//! single `SQLite` file (`taxibooking.db` by default) through a `sqlx` pool.
//!
//! # Tables
//!
//! - `admin`: operator accounts, seeded with one account on first start
//! - `customer`: registered customers, unique by email
//! - `driver`: drivers and their `available` flag, unique by email
//! - `trip`: bookings and their lifecycle status
//! - `payment`: one row per fare payment, linked to its trip
//!
//! # Consistency
//!
//! Lifecycle writes arrive as [`fasttrack_core::Transition`]s and are applied as
//! guarded updates inside one transaction: the trip and driver rows are only written
//! while they still match the snapshot the transition was planned against. A booking
//! inserts its trip and payment in one transaction as well.
//!
//! # Example
//!
//! ```no_run
//! use fasttrack_store::{Database, SqliteStore, Store};
//!
//! # async fn run() -> fasttrack_store::Result<()> {
//! let db = Database::connect("sqlite://taxibooking.db?mode=rwc", 5).await?;
//! db.initialize().await?;
//!
//! let store = SqliteStore::new(db);
//! let pending = store.list_pending_trips().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod db;
pub mod error;
pub mod rows;
pub mod schema;
pub mod sqlite;

pub use db::Database;
pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use fasttrack_core::{
    Admin, Customer, CustomerId, Driver, DriverId, DriverUpdate, NewCustomer, NewDriver,
    NewPayment, NewTrip, Payment, Transition, Trip, TripId, TripListing,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer so the engine can be driven against any
/// backend that honors the same guarded-write semantics.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Customer Operations
    // =========================================================================

    /// Insert a validated customer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the email is already registered.
    async fn insert_customer(&self, customer: &NewCustomer) -> Result<Customer>;

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    // =========================================================================
    // Driver Operations
    // =========================================================================

    /// Insert a validated driver. New drivers are available.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the email is already in use.
    async fn insert_driver(&self, driver: &NewDriver) -> Result<Driver>;

    /// Replace a driver's profile fields. The password is kept when the update has none.
    /// Never touches `available`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the driver doesn't exist.
    /// - `StoreError::Duplicate` if the new email belongs to another driver.
    async fn update_driver(&self, id: DriverId, update: &DriverUpdate) -> Result<Driver>;

    /// Get a driver by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_driver(&self, id: DriverId) -> Result<Option<Driver>>;

    /// List every driver, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_drivers(&self) -> Result<Vec<Driver>>;

    /// List drivers with `available = 1`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_available_drivers(&self) -> Result<Vec<Driver>>;

    /// Delete a driver. Trips that referenced the driver keep their row with a null
    /// driver reference.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the driver doesn't exist.
    /// - `StoreError::Conflict` if the driver currently holds an assigned trip.
    async fn delete_driver(&self, id: DriverId) -> Result<()>;

    /// Set a driver back to available if it is unavailable yet holds no assigned
    /// trip. The check and the write are one statement.
    ///
    /// Returns `true` if the flag changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn release_idle_driver(&self, id: DriverId) -> Result<bool>;

    // =========================================================================
    // Trip Operations
    // =========================================================================

    /// Get a trip by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the stored row is malformed.
    async fn get_trip(&self, id: TripId) -> Result<Option<Trip>>;

    /// List every trip with party names, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_trips(&self) -> Result<Vec<TripListing>>;

    /// List a customer's trips with party names, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_trips_by_customer(&self, customer_id: CustomerId) -> Result<Vec<TripListing>>;

    /// List requested trips without a driver, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_pending_trips(&self) -> Result<Vec<TripListing>>;

    /// List a driver's non-terminal trips, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_active_trips_by_driver(&self, driver_id: DriverId) -> Result<Vec<TripListing>>;

    /// Apply a planned lifecycle transition atomically.
    ///
    /// Releasing a driver never sets the flag while the driver still holds another
    /// assigned trip.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the trip doesn't exist.
    /// - `StoreError::Conflict` if the trip or driver row no longer matches the
    ///   snapshot the transition was planned against. Nothing is written in that case.
    async fn apply_transition(&self, transition: &Transition) -> Result<Trip>;

    // =========================================================================
    // Payment Operations
    // =========================================================================

    /// Insert a requested trip and the payment funding it atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; neither row is kept in that case.
    async fn insert_booking(&self, trip: &NewTrip, payment: &NewPayment)
        -> Result<(Trip, Payment)>;

    /// Record an additional payment for an existing trip.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the trip doesn't exist.
    async fn insert_payment(&self, trip_id: TripId, payment: &NewPayment) -> Result<Payment>;

    /// List payments linked to a trip, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_payments_by_trip(&self, trip_id: TripId) -> Result<Vec<Payment>>;

    /// List every payment, including orphans, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_payments(&self) -> Result<Vec<Payment>>;

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Find an operator account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_admin(&self, username: &str) -> Result<Option<Admin>>;
}
