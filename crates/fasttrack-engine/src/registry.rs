//! Customer and driver administration, and the trip listings.

use std::sync::Arc;

use fasttrack_core::{
    Customer, CustomerId, Driver, DriverId, DriverUpdate, FastTrackError, NewCustomer,
    NewDriver, Result, TripListing,
};
use fasttrack_store::Store;

/// Manages customers and drivers. Never writes a trip or a driver's availability.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn Store>,
}

impl Registry {
    /// Create a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Register a customer.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::Validation` if a field is malformed.
    /// - `FastTrackError::Duplicate` if the email is already registered.
    pub async fn register_customer(&self, input: &NewCustomer) -> Result<Customer> {
        let input = input.validate()?;
        let customer = self.store.insert_customer(&input).await?;
        tracing::info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::NotFound` if the customer doesn't exist.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer> {
        self.store
            .get_customer(id)
            .await?
            .ok_or_else(|| FastTrackError::customer_not_found(id))
    }

    /// A customer's trips with the driver's name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::NotFound` if the customer doesn't exist.
    pub async fn customer_trips(&self, id: CustomerId) -> Result<Vec<TripListing>> {
        self.get_customer(id).await?;
        Ok(self.store.list_trips_by_customer(id).await?)
    }

    // =========================================================================
    // Drivers
    // =========================================================================

    /// Add a driver. New drivers start available.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::Validation` if a field is malformed.
    /// - `FastTrackError::Duplicate` if the email is already in use.
    pub async fn add_driver(&self, input: &NewDriver) -> Result<Driver> {
        let input = input.validate()?;
        let driver = self.store.insert_driver(&input).await?;
        tracing::info!(driver_id = %driver.id, "Driver added");
        Ok(driver)
    }

    /// Update a driver's profile. The password is kept when the update carries none.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::Validation` if a field is malformed.
    /// - `FastTrackError::NotFound` if the driver doesn't exist.
    /// - `FastTrackError::Duplicate` if the email belongs to another driver.
    pub async fn update_driver(&self, id: DriverId, update: &DriverUpdate) -> Result<Driver> {
        let update = update.validate()?;
        let driver = self.store.update_driver(id, &update).await?;
        tracing::info!(driver_id = %id, "Driver updated");
        Ok(driver)
    }

    /// Get a driver by ID.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::NotFound` if the driver doesn't exist.
    pub async fn get_driver(&self, id: DriverId) -> Result<Driver> {
        self.store
            .get_driver(id)
            .await?
            .ok_or_else(|| FastTrackError::driver_not_found(id))
    }

    /// Every driver, by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn list_drivers(&self) -> Result<Vec<Driver>> {
        Ok(self.store.list_drivers().await?)
    }

    /// Delete a driver. Their past trips keep a null driver reference.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::NotFound` if the driver doesn't exist.
    /// - `FastTrackError::Conflict` while the driver holds an assigned trip.
    pub async fn delete_driver(&self, id: DriverId) -> Result<()> {
        self.store.delete_driver(id).await.map_err(|err| {
            tracing::warn!(driver_id = %id, error = %err, "Driver deletion refused");
            FastTrackError::from(err)
        })?;
        tracing::info!(driver_id = %id, "Driver deleted");
        Ok(())
    }

    // =========================================================================
    // Trips
    // =========================================================================

    /// Every trip with customer and driver names, by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn all_trips(&self) -> Result<Vec<TripListing>> {
        Ok(self.store.list_trips().await?)
    }
}
