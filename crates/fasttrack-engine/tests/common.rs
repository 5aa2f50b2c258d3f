//! Common test utilities for engine integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use fasttrack_core::{
    BookingRequest, Customer, Driver, DriverId, NewCustomer, NewDriver, PaymentMethod, Trip,
    TripDetails, TripId,
};
use fasttrack_engine::Engine;
use fasttrack_store::{Database, SqliteStore, Store};

/// An engine over a fresh in-memory database.
pub struct TestHarness {
    /// The services under test.
    pub engine: Engine,
    /// Direct store access for assertions and for rows written outside the engine.
    pub store: Arc<SqliteStore>,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub async fn new() -> Self {
        let db = Database::in_memory().await.expect("Failed to open database");
        db.initialize().await.expect("Failed to initialize schema");

        let store = Arc::new(SqliteStore::new(db));
        let engine = Engine::new(store.clone());

        Self { engine, store }
    }

    /// Register a customer with the given email.
    pub async fn customer(&self, email: &str) -> Customer {
        self.engine
            .registry
            .register_customer(&NewCustomer {
                name: "Hari Prasad".into(),
                email: email.into(),
                telephone: "9800000003".into(),
                password: "secret1".into(),
            })
            .await
            .expect("Failed to register customer")
    }

    /// Add an available driver.
    pub async fn driver(&self, name: &str, email: &str) -> Driver {
        self.engine
            .registry
            .add_driver(&NewDriver {
                name: name.into(),
                email: email.into(),
                phone: "9800000001".into(),
                license_number: "BA-1234".into(),
                password: "secret1".into(),
            })
            .await
            .expect("Failed to add driver")
    }

    /// Book a trip from `pickup` to the airport for 500.
    pub async fn book(&self, customer: &Customer, pickup: &str) -> Trip {
        self.engine
            .booking
            .book(customer.id, &booking_request(pickup))
            .await
            .expect("Failed to book trip")
            .trip
    }

    /// A customer, a driver and an assigned trip between them.
    pub async fn assigned_trip(&self) -> (Trip, Driver) {
        let customer = self.customer("hari@example.com").await;
        let driver = self.driver("Ram Bahadur", "ram@example.com").await;
        let trip = self.book(&customer, "Thamel").await;
        let trip = self
            .engine
            .lifecycle
            .assign(trip.id, driver.id)
            .await
            .expect("Failed to assign trip");
        (trip, driver)
    }

    /// Re-read a trip.
    pub async fn trip(&self, id: TripId) -> Trip {
        self.store
            .get_trip(id)
            .await
            .expect("Failed to read trip")
            .expect("Trip missing")
    }

    /// Re-read a driver's availability flag.
    pub async fn is_available(&self, id: DriverId) -> bool {
        self.store
            .get_driver(id)
            .await
            .expect("Failed to read driver")
            .expect("Driver missing")
            .available
    }

    /// Run a raw statement, bypassing the engine.
    pub async fn raw(&self, sql: &str) {
        sqlx::query(sql)
            .execute(self.store.pool())
            .await
            .expect("Raw statement failed");
    }
}

/// Booking input with valid fields.
pub fn booking_request(pickup: &str) -> BookingRequest {
    BookingRequest {
        details: trip_details(pickup),
        method: Some(PaymentMethod::Esewa),
    }
}

/// Valid trip fields.
pub fn trip_details(pickup: &str) -> TripDetails {
    TripDetails {
        pickup: pickup.into(),
        dropoff: "Airport".into(),
        pickup_date: "2024-01-01".into(),
        pickup_time: "10:00:00".into(),
        dropoff_date: None,
        dropoff_time: None,
        fare: 500.0,
    }
}
