//! Database schema definitions.
//!
//! The table layout is shared with existing `taxibooking.db` files, so column names,
//! types and defaults must not drift.

/// Table names.
pub mod table {
    /// Operator accounts.
    pub const ADMIN: &str = "admin";

    /// Registered customers.
    pub const CUSTOMER: &str = "customer";

    /// Drivers and their availability flag.
    pub const DRIVER: &str = "driver";

    /// Trips and their lifecycle status.
    pub const TRIP: &str = "trip";

    /// Payments, each funding one trip.
    pub const PAYMENT: &str = "payment";
}

/// Username of the operator account seeded into an empty database.
pub const SEED_ADMIN_USERNAME: &str = "admin";

/// Password of the operator account seeded into an empty database.
pub const SEED_ADMIN_PASSWORD: &str = "admin123";

/// DDL for every table. Safe to run against an existing database.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS admin (
    id INTEGER PRIMARY KEY,
    username TEXT UNIQUE,
    password TEXT
);

CREATE TABLE IF NOT EXISTS customer (
    id INTEGER PRIMARY KEY,
    name TEXT,
    email TEXT UNIQUE,
    telephone TEXT,
    password TEXT
);

CREATE TABLE IF NOT EXISTS driver (
    id INTEGER PRIMARY KEY,
    name TEXT,
    email TEXT UNIQUE,
    phone TEXT,
    license_number TEXT,
    password TEXT,
    available INTEGER DEFAULT 1
);

CREATE TABLE IF NOT EXISTS trip (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER,
    driver_id INTEGER,
    pickup TEXT,
    dropoff TEXT,
    pickup_date TEXT,
    pickup_time TEXT,
    dropoff_date TEXT NULL,
    dropoff_time TEXT NULL,
    fare REAL,
    status TEXT DEFAULT 'requested',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (customer_id) REFERENCES customer(id) ON DELETE SET NULL,
    FOREIGN KEY (driver_id) REFERENCES driver(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS payment (
    id INTEGER PRIMARY KEY,
    trip_id INTEGER,
    amount REAL,
    method TEXT,
    status TEXT,
    paid_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (trip_id) REFERENCES trip(id) ON DELETE SET NULL
);
";

/// Returns all table names in creation order.
#[must_use]
pub fn all_tables() -> Vec<&'static str> {
    vec![
        table::ADMIN,
        table::CUSTOMER,
        table::DRIVER,
        table::TRIP,
        table::PAYMENT,
    ]
}
