//! `SQLite` storage implementation.
//!
//! This module provides the `SqliteStore` implementation of the `Store` trait.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use fasttrack_core::{
    Admin, Customer, CustomerId, DriverId, Driver, DriverUpdate, DropoffChange, NewCustomer,
    NewDriver, NewPayment, NewTrip, Payment, Transition, Trip, TripId, TripListing, TripStatus,
    PAYMENT_STATUS_PAID,
};

use crate::db::Database;
use crate::error::{Result, StoreError};
use crate::rows::{
    convert_all, date_text, time_text, AdminRow, CustomerRow, DriverRow, PaymentRow,
    TripListingRow, TripRow, LISTING_FROM, TRIP_COLUMNS,
};
use crate::schema::table;
use crate::Store;

const DRIVER_COLUMNS: &str = "id, name, email, phone, license_number, password, available";
const PAYMENT_COLUMNS: &str = "id, trip_id, amount, method, status, paid_at";

/// A trip's status as it reads. A null status is requested.
const STATUS: &str = "COALESCE(status, 'requested')";

/// A trip is active until it reaches a terminal status.
const ACTIVE_TRIP: &str = "COALESCE(t.status, 'requested') NOT IN ('completed', 'cancelled')";

/// The trip holds its driver.
const ASSIGNED_TRIP: &str = "COALESCE(t.status, 'requested') = 'assigned'";

/// Stored status text outside the lifecycle.
const UNRECOGNIZED_STATUS: &str =
    "COALESCE(status, 'requested') NOT IN ('requested', 'assigned', 'completed', 'cancelled')";

/// SQLite-backed storage implementation.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an initialized database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { pool: db.pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn listings(&self, sql: &str, bind: Option<i64>) -> Result<Vec<TripListing>> {
        let mut query = sqlx::query_as::<_, TripListingRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        convert_all(query.fetch_all(&self.pool).await?)
    }
}

fn listing_sql(clause: &str) -> String {
    format!("SELECT {TRIP_COLUMNS}, {LISTING_FROM} {clause}")
}

async fn fetch_trip(conn: &mut SqliteConnection, id: TripId) -> Result<Option<Trip>> {
    let sql = format!("SELECT {TRIP_COLUMNS} FROM trip t WHERE t.id = ?");
    let row: Option<TripRow> = sqlx::query_as(&sql)
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?;
    row.map(Trip::try_from).transpose()
}

async fn fetch_payment(conn: &mut SqliteConnection, id: i64) -> Result<Payment> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment WHERE id = ?");
    let row: PaymentRow = sqlx::query_as(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    row.try_into()
}

async fn insert_payment_row(
    conn: &mut SqliteConnection,
    trip_id: TripId,
    payment: &NewPayment,
) -> Result<Payment> {
    let id = sqlx::query("INSERT INTO payment (trip_id, amount, method, status) VALUES (?, ?, ?, ?)")
        .bind(trip_id.get())
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(PAYMENT_STATUS_PAID)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    fetch_payment(conn, id).await
}

/// The guarded trip update for a transition.
fn trip_update(transition: &Transition) -> QueryBuilder<'static, Sqlite> {
    let mut q = QueryBuilder::new("UPDATE trip SET status = ");
    q.push_bind(transition.status.as_str());

    if let Some(driver_id) = transition.attach_driver {
        q.push(", driver_id = ").push_bind(driver_id.get());
    }

    match transition.dropoff {
        DropoffChange::Keep => {}
        DropoffChange::Set { date, time } => {
            q.push(", dropoff_date = ")
                .push_bind(date_text(date))
                .push(", dropoff_time = ")
                .push_bind(time_text(time));
        }
        DropoffChange::Clear => {
            q.push(", dropoff_date = NULL, dropoff_time = NULL");
        }
    }

    if let Some(fields) = &transition.fields {
        q.push(", pickup = ")
            .push_bind(fields.pickup.clone())
            .push(", dropoff = ")
            .push_bind(fields.dropoff.clone())
            .push(", pickup_date = ")
            .push_bind(date_text(fields.pickup_date))
            .push(", pickup_time = ")
            .push_bind(time_text(fields.pickup_time))
            .push(", dropoff_date = ")
            .push_bind(fields.dropoff_date.map(date_text))
            .push(", dropoff_time = ")
            .push_bind(fields.dropoff_time.map(time_text))
            .push(", fare = ")
            .push_bind(fields.fare);
    }

    q.push(" WHERE id = ").push_bind(transition.trip_id.get());
    if transition.expected_status == TripStatus::Unrecognized {
        q.push(" AND ").push(UNRECOGNIZED_STATUS);
    } else {
        q.push(" AND ")
            .push(STATUS)
            .push(" = ")
            .push_bind(transition.expected_status.as_str());
    }
    match transition.expected_driver {
        Some(driver_id) => {
            q.push(" AND driver_id = ").push_bind(driver_id.get());
        }
        None => {
            q.push(" AND driver_id IS NULL");
        }
    }
    q
}

#[async_trait]
impl Store for SqliteStore {
    // =========================================================================
    // Customer Operations
    // =========================================================================

    async fn insert_customer(&self, customer: &NewCustomer) -> Result<Customer> {
        let id = sqlx::query(
            "INSERT INTO customer (name, email, telephone, password) VALUES (?, ?, ?, ?)",
        )
        .bind(customer.name.as_str())
        .bind(customer.email.as_str())
        .bind(customer.telephone.as_str())
        .bind(customer.password.as_str())
        .execute(&self.pool)
        .await
        .map_err(StoreError::on_unique(table::CUSTOMER, "email"))?
        .last_insert_rowid();

        tracing::debug!(customer_id = id, "Customer inserted");
        Ok(Customer {
            id: id.into(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            telephone: customer.telephone.clone(),
            password: customer.password.clone(),
        })
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT id, name, email, telephone, password FROM customer WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Customer::from))
    }

    // =========================================================================
    // Driver Operations
    // =========================================================================

    async fn insert_driver(&self, driver: &NewDriver) -> Result<Driver> {
        let id = sqlx::query(
            "INSERT INTO driver (name, email, phone, license_number, password, available) \
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(driver.name.as_str())
        .bind(driver.email.as_str())
        .bind(driver.phone.as_str())
        .bind(driver.license_number.as_str())
        .bind(driver.password.as_str())
        .execute(&self.pool)
        .await
        .map_err(StoreError::on_unique(table::DRIVER, "email"))?
        .last_insert_rowid();

        tracing::debug!(driver_id = id, "Driver inserted");
        Ok(Driver {
            id: id.into(),
            name: driver.name.clone(),
            email: driver.email.clone(),
            phone: driver.phone.clone(),
            license_number: driver.license_number.clone(),
            password: driver.password.clone(),
            available: true,
        })
    }

    async fn update_driver(&self, id: DriverId, update: &DriverUpdate) -> Result<Driver> {
        let mut q = QueryBuilder::<Sqlite>::new("UPDATE driver SET name = ");
        q.push_bind(update.name.clone())
            .push(", email = ")
            .push_bind(update.email.clone())
            .push(", phone = ")
            .push_bind(update.phone.clone())
            .push(", license_number = ")
            .push_bind(update.license_number.clone());
        if let Some(password) = &update.password {
            q.push(", password = ").push_bind(password.clone());
        }
        q.push(" WHERE id = ").push_bind(id.get());

        let updated = q
            .build()
            .execute(&self.pool)
            .await
            .map_err(StoreError::on_unique(table::DRIVER, "email"))?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: table::DRIVER,
                id: id.get(),
            });
        }

        self.get_driver(id).await?.ok_or(StoreError::NotFound {
            entity: table::DRIVER,
            id: id.get(),
        })
    }

    async fn get_driver(&self, id: DriverId) -> Result<Option<Driver>> {
        let sql = format!("SELECT {DRIVER_COLUMNS} FROM driver WHERE id = ?");
        let row: Option<DriverRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Driver::from))
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>> {
        let sql = format!("SELECT {DRIVER_COLUMNS} FROM driver ORDER BY id");
        let rows: Vec<DriverRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Driver::from).collect())
    }

    async fn list_available_drivers(&self) -> Result<Vec<Driver>> {
        let sql =
            format!("SELECT {DRIVER_COLUMNS} FROM driver WHERE available = 1 ORDER BY name, id");
        let rows: Vec<DriverRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Driver::from).collect())
    }

    async fn delete_driver(&self, id: DriverId) -> Result<()> {
        let sql = format!(
            "DELETE FROM driver WHERE id = ? \
             AND NOT EXISTS (SELECT 1 FROM trip t WHERE t.driver_id = driver.id AND {ASSIGNED_TRIP})"
        );
        let deleted = sqlx::query(&sql)
            .bind(id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted > 0 {
            tracing::debug!(driver_id = %id, "Driver deleted");
            return Ok(());
        }

        let sql = format!(
            "SELECT COUNT(t.id) FROM driver d \
             LEFT JOIN trip t ON t.driver_id = d.id AND {ASSIGNED_TRIP} \
             WHERE d.id = ? GROUP BY d.id"
        );
        let held: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Err(match held {
            None => StoreError::NotFound {
                entity: table::DRIVER,
                id: id.get(),
            },
            Some(held) => StoreError::Conflict(format!(
                "driver {id} holds {held} assigned trip(s)"
            )),
        })
    }

    async fn release_idle_driver(&self, id: DriverId) -> Result<bool> {
        let sql = format!(
            "UPDATE driver SET available = 1 \
             WHERE id = ? AND available = 0 \
             AND NOT EXISTS (SELECT 1 FROM trip t WHERE t.driver_id = driver.id AND {ASSIGNED_TRIP})"
        );
        let released = sqlx::query(&sql)
            .bind(id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(released > 0)
    }

    // =========================================================================
    // Trip Operations
    // =========================================================================

    async fn get_trip(&self, id: TripId) -> Result<Option<Trip>> {
        let mut conn = self.pool.acquire().await?;
        fetch_trip(&mut conn, id).await
    }

    async fn list_trips(&self) -> Result<Vec<TripListing>> {
        self.listings(&listing_sql("ORDER BY t.id"), None).await
    }

    async fn list_trips_by_customer(&self, customer_id: CustomerId) -> Result<Vec<TripListing>> {
        let sql = listing_sql("WHERE t.customer_id = ? ORDER BY t.created_at DESC, t.id DESC");
        self.listings(&sql, Some(customer_id.get())).await
    }

    async fn list_pending_trips(&self) -> Result<Vec<TripListing>> {
        let sql = listing_sql(
            "WHERE COALESCE(t.status, 'requested') = 'requested' AND t.driver_id IS NULL \
             ORDER BY t.created_at ASC, t.id ASC",
        );
        self.listings(&sql, None).await
    }

    async fn list_active_trips_by_driver(&self, driver_id: DriverId) -> Result<Vec<TripListing>> {
        let sql = listing_sql(&format!(
            "WHERE t.driver_id = ? AND {ACTIVE_TRIP} ORDER BY t.created_at DESC, t.id DESC"
        ));
        self.listings(&sql, Some(driver_id.get())).await
    }

    async fn apply_transition(&self, transition: &Transition) -> Result<Trip> {
        let trip_id = transition.trip_id;
        let mut tx = self.pool.begin().await?;

        let mut update = trip_update(transition);
        let written = update.build().execute(&mut *tx).await?.rows_affected();
        if written == 0 {
            let current: Option<Option<String>> =
                sqlx::query_scalar("SELECT status FROM trip WHERE id = ?")
                    .bind(trip_id.get())
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;
            return Err(match current {
                None => StoreError::NotFound {
                    entity: table::TRIP,
                    id: trip_id.get(),
                },
                Some(status) => StoreError::Conflict(format!(
                    "cannot {} trip {trip_id}: it changed since it was read (now {})",
                    transition.operation,
                    status.as_deref().unwrap_or("requested"),
                )),
            });
        }

        if let Some(change) = transition.availability {
            let mut q = QueryBuilder::<Sqlite>::new("UPDATE driver SET available = ");
            q.push_bind(i64::from(change.available))
                .push(" WHERE id = ")
                .push_bind(change.driver_id.get());
            if let Some(expected) = change.expected {
                q.push(" AND available = ").push_bind(i64::from(expected));
            }
            if change.available {
                q.push(" AND NOT EXISTS (SELECT 1 FROM trip t WHERE t.driver_id = driver.id AND ")
                    .push(ASSIGNED_TRIP)
                    .push(")");
            }

            let flagged = q.build().execute(&mut *tx).await?.rows_affected();
            if flagged == 0 && change.expected.is_some() {
                tx.rollback().await?;
                return Err(StoreError::Conflict(format!(
                    "cannot {} trip {trip_id}: driver {} changed since it was read",
                    transition.operation, change.driver_id,
                )));
            }
        }

        let trip = fetch_trip(&mut tx, trip_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: table::TRIP,
                id: trip_id.get(),
            })?;
        tx.commit().await?;

        tracing::debug!(
            trip_id = %trip_id,
            operation = %transition.operation,
            status = %trip.status,
            "Transition applied"
        );
        Ok(trip)
    }

    // =========================================================================
    // Payment Operations
    // =========================================================================

    async fn insert_booking(
        &self,
        trip: &NewTrip,
        payment: &NewPayment,
    ) -> Result<(Trip, Payment)> {
        let fields = &trip.fields;
        let mut tx = self.pool.begin().await?;

        let trip_id: TripId = sqlx::query(
            "INSERT INTO trip (customer_id, driver_id, pickup, dropoff, pickup_date, pickup_time, \
             dropoff_date, dropoff_time, fare, status) \
             VALUES (?, NULL, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(trip.customer_id.get())
        .bind(fields.pickup.as_str())
        .bind(fields.dropoff.as_str())
        .bind(date_text(fields.pickup_date))
        .bind(time_text(fields.pickup_time))
        .bind(fields.dropoff_date.map(date_text))
        .bind(fields.dropoff_time.map(time_text))
        .bind(fields.fare)
        .bind(TripStatus::Requested.as_str())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid()
        .into();

        let payment = insert_payment_row(&mut tx, trip_id, payment).await?;
        let stored = fetch_trip(&mut tx, trip_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: table::TRIP,
                id: trip_id.get(),
            })?;
        tx.commit().await?;

        tracing::debug!(trip_id = %trip_id, payment_id = %payment.id, "Booking inserted");
        Ok((stored, payment))
    }

    async fn insert_payment(&self, trip_id: TripId, payment: &NewPayment) -> Result<Payment> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM trip WHERE id = ?")
            .bind(trip_id.get())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Err(StoreError::NotFound {
                entity: table::TRIP,
                id: trip_id.get(),
            });
        }

        let payment = insert_payment_row(&mut tx, trip_id, payment).await?;
        tx.commit().await?;
        Ok(payment)
    }

    async fn list_payments_by_trip(&self, trip_id: TripId) -> Result<Vec<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment WHERE trip_id = ? ORDER BY id");
        let rows: Vec<PaymentRow> = sqlx::query_as(&sql)
            .bind(trip_id.get())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment ORDER BY id");
        let rows: Vec<PaymentRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    async fn find_admin(&self, username: &str) -> Result<Option<Admin>> {
        let row: Option<AdminRow> =
            sqlx::query_as("SELECT id, username, password FROM admin WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Admin::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{all_tables, SEED_ADMIN_PASSWORD, SEED_ADMIN_USERNAME};
    use chrono::{NaiveDate, NaiveTime};
    use fasttrack_core::{plan_assign, plan_cancel, plan_complete, plan_edit, PaymentMethod, TripUpdate};
    use tempfile::TempDir;

    async fn create_test_store() -> SqliteStore {
        let db = Database::in_memory().await.unwrap();
        db.initialize().await.unwrap();
        SqliteStore::new(db)
    }

    fn customer_input(email: &str) -> NewCustomer {
        NewCustomer {
            name: "Hari Prasad".into(),
            email: email.into(),
            telephone: "9800000003".into(),
            password: "secret1".into(),
        }
    }

    fn driver_input(name: &str, email: &str) -> NewDriver {
        NewDriver {
            name: name.into(),
            email: email.into(),
            phone: "9800000001".into(),
            license_number: "BA-1234".into(),
            password: "secret1".into(),
        }
    }

    fn fields(pickup: &str) -> TripUpdate {
        TripUpdate {
            pickup: pickup.into(),
            dropoff: "Airport".into(),
            pickup_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            pickup_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            dropoff_date: None,
            dropoff_time: None,
            fare: 500.0,
        }
    }

    async fn book(store: &SqliteStore, customer_id: CustomerId, pickup: &str) -> Trip {
        let trip = NewTrip {
            customer_id,
            fields: fields(pickup),
        };
        let payment = NewPayment {
            amount: 500.0,
            method: PaymentMethod::Esewa,
        };
        store.insert_booking(&trip, &payment).await.unwrap().0
    }

    #[tokio::test]
    async fn initialize_is_idempotent_and_seeds_once() {
        let db = Database::in_memory().await.unwrap();
        db.initialize().await.unwrap();
        db.initialize().await.unwrap();

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(admins, 1);

        for name in all_tables() {
            let found: Option<String> =
                sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                    .bind(name)
                    .fetch_optional(&db.pool)
                    .await
                    .unwrap();
            assert_eq!(found.as_deref(), Some(name));
        }

        let store = SqliteStore::new(db);
        let admin = store.find_admin(SEED_ADMIN_USERNAME).await.unwrap().unwrap();
        assert_eq!(admin.password, SEED_ADMIN_PASSWORD);
        assert!(store.find_admin("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn booking_links_trip_and_payment() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();

        let trip = NewTrip {
            customer_id: customer.id,
            fields: fields("Thamel"),
        };
        let payment = NewPayment {
            amount: 500.0,
            method: PaymentMethod::Cash,
        };
        let (trip, payment) = store.insert_booking(&trip, &payment).await.unwrap();

        assert_eq!(trip.status, TripStatus::Requested);
        assert_eq!(trip.driver_id, None);
        assert!(trip.created_at.is_some());
        assert_eq!(payment.trip_id, Some(trip.id));
        assert_eq!(payment.status, PAYMENT_STATUS_PAID);
        assert_eq!(payment.method, PaymentMethod::Cash);

        let payments = store.list_payments_by_trip(trip.id).await.unwrap();
        assert_eq!(payments, vec![payment]);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = create_test_store().await;
        store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let err = store
            .insert_customer(&customer_input("hari@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: "customer", field: "email" }));
    }

    #[tokio::test]
    async fn assign_claims_driver_and_stale_replay_conflicts() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();
        let trip = book(&store, customer.id, "Thamel").await;

        let transition = plan_assign(&trip, &driver).unwrap();
        let assigned = store.apply_transition(&transition).await.unwrap();
        assert_eq!(assigned.status, TripStatus::Assigned);
        assert_eq!(assigned.driver_id, Some(driver.id));
        assert!(!store.get_driver(driver.id).await.unwrap().unwrap().available);

        let err = store.apply_transition(&transition).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.get_trip(trip.id).await.unwrap().unwrap(), assigned);
    }

    #[tokio::test]
    async fn one_driver_cannot_take_two_trips_from_one_snapshot() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();
        let first = book(&store, customer.id, "Thamel").await;
        let second = book(&store, customer.id, "Patan").await;

        let plan_first = plan_assign(&first, &driver).unwrap();
        let plan_second = plan_assign(&second, &driver).unwrap();
        store.apply_transition(&plan_first).await.unwrap();

        let err = store.apply_transition(&plan_second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let untouched = store.get_trip(second.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, TripStatus::Requested);
        assert_eq!(untouched.driver_id, None);
    }

    #[tokio::test]
    async fn complete_and_cancel_release_the_driver() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();

        let trip = book(&store, customer.id, "Thamel").await;
        let assigned = store
            .apply_transition(&plan_assign(&trip, &driver).unwrap())
            .await
            .unwrap();
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(11, 30, 0)
            .unwrap();
        let completed = store
            .apply_transition(&plan_complete(&assigned, at).unwrap())
            .await
            .unwrap();
        assert_eq!(completed.status, TripStatus::Completed);
        assert_eq!(completed.driver_id, Some(driver.id));
        assert_eq!(completed.dropoff_date, Some(at.date()));
        assert_eq!(completed.dropoff_time, Some(at.time()));
        let driver = store.get_driver(driver.id).await.unwrap().unwrap();
        assert!(driver.available);

        let trip = book(&store, customer.id, "Patan").await;
        let assigned = store
            .apply_transition(&plan_assign(&trip, &driver).unwrap())
            .await
            .unwrap();
        let cancelled = store
            .apply_transition(&plan_cancel(&assigned).unwrap())
            .await
            .unwrap();
        assert_eq!(cancelled.status, TripStatus::Cancelled);
        assert_eq!(cancelled.dropoff_date, None);
        assert!(store.get_driver(driver.id).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn edit_replaces_booked_fields() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let trip = book(&store, customer.id, "Thamel").await;

        let mut update = fields("Boudha");
        update.fare = 750.0;
        let edited = store
            .apply_transition(&plan_edit(&trip, update).unwrap())
            .await
            .unwrap();
        assert_eq!(edited.pickup, "Boudha");
        assert!((edited.fare - 750.0).abs() < f64::EPSILON);
        assert_eq!(edited.status, TripStatus::Requested);
    }

    #[tokio::test]
    async fn transition_on_missing_trip_is_not_found() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let trip = book(&store, customer.id, "Thamel").await;

        let mut transition = plan_cancel(&trip).unwrap();
        transition.trip_id = TripId::new(999);
        let err = store.apply_transition(&transition).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "trip", id: 999 }));
    }

    #[tokio::test]
    async fn delete_driver_guards_assigned_trips_and_nulls_history() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();
        let trip = book(&store, customer.id, "Thamel").await;
        let assigned = store
            .apply_transition(&plan_assign(&trip, &driver).unwrap())
            .await
            .unwrap();

        let err = store.delete_driver(driver.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("holds 1 assigned")));
        assert!(store.get_driver(driver.id).await.unwrap().is_some());

        store
            .apply_transition(&plan_cancel(&assigned).unwrap())
            .await
            .unwrap();
        store.delete_driver(driver.id).await.unwrap();

        let orphaned = store.get_trip(trip.id).await.unwrap().unwrap();
        assert_eq!(orphaned.driver_id, None);
        assert_eq!(orphaned.status, TripStatus::Cancelled);

        let err = store.delete_driver(driver.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "driver", .. }));
    }

    #[tokio::test]
    async fn update_driver_keeps_password_and_flag() {
        let store = create_test_store().await;
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();

        let update = DriverUpdate {
            name: "Ram Thapa".into(),
            email: "ram.thapa@example.com".into(),
            phone: "9800000009".into(),
            license_number: "BA-9999".into(),
            password: None,
        };
        let updated = store.update_driver(driver.id, &update).await.unwrap();
        assert_eq!(updated.name, "Ram Thapa");
        assert_eq!(updated.password, "secret1");
        assert!(updated.available);

        let err = store.update_driver(DriverId::new(42), &update).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn pending_trips_oldest_first_and_available_drivers_by_name() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let zed = store
            .insert_driver(&driver_input("Zed Karki", "zed@example.com"))
            .await
            .unwrap();
        let anil = store
            .insert_driver(&driver_input("Anil Rai", "anil@example.com"))
            .await
            .unwrap();

        let first = book(&store, customer.id, "Thamel").await;
        let second = book(&store, customer.id, "Patan").await;
        let third = book(&store, customer.id, "Boudha").await;
        store
            .apply_transition(&plan_assign(&second, &zed).unwrap())
            .await
            .unwrap();

        let pending: Vec<TripId> = store
            .list_pending_trips()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.trip.id)
            .collect();
        assert_eq!(pending, vec![first.id, third.id]);

        let available: Vec<DriverId> = store
            .list_available_drivers()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(available, vec![anil.id]);

        let listing = store.list_trips().await.unwrap();
        assert_eq!(listing[1].driver_name.as_deref(), Some("Zed Karki"));
        assert_eq!(listing[0].customer_name.as_deref(), Some("Hari Prasad"));
    }

    #[tokio::test]
    async fn release_idle_driver_only_when_no_assigned_trip() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();
        let trip = book(&store, customer.id, "Thamel").await;
        store
            .apply_transition(&plan_assign(&trip, &driver).unwrap())
            .await
            .unwrap();

        assert!(!store.release_idle_driver(driver.id).await.unwrap());

        sqlx::query("UPDATE trip SET status = 'completed' WHERE id = ?")
            .bind(trip.id.get())
            .execute(store.pool())
            .await
            .unwrap();
        assert!(store.release_idle_driver(driver.id).await.unwrap());
        assert!(!store.release_idle_driver(driver.id).await.unwrap());
    }

    async fn set_status(store: &SqliteStore, trip: TripId, status: Option<&str>) {
        sqlx::query("UPDATE trip SET status = ? WHERE id = ?")
            .bind(status)
            .bind(trip.get())
            .execute(store.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn legacy_paid_trip_reads_lists_and_cancels() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();
        let trip = book(&store, customer.id, "Thamel").await;
        store
            .apply_transition(&plan_assign(&trip, &driver).unwrap())
            .await
            .unwrap();
        set_status(&store, trip.id, Some("paid")).await;

        let legacy = store.get_trip(trip.id).await.unwrap().unwrap();
        assert_eq!(legacy.status, TripStatus::Unrecognized);
        assert_eq!(legacy.status_text.as_deref(), Some("paid"));
        assert_eq!(store.list_trips().await.unwrap().len(), 1);
        assert_eq!(
            store.list_active_trips_by_driver(driver.id).await.unwrap().len(),
            1
        );

        let cancelled = store
            .apply_transition(&plan_cancel(&legacy).unwrap())
            .await
            .unwrap();
        assert_eq!(cancelled.status, TripStatus::Cancelled);
        assert_eq!(cancelled.status_text, None);
        assert_eq!(cancelled.driver_id, Some(driver.id));
        assert!(store.get_driver(driver.id).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn legacy_trip_guard_fails_once_status_is_known() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let trip = book(&store, customer.id, "Thamel").await;
        set_status(&store, trip.id, Some("paid")).await;

        let legacy = store.get_trip(trip.id).await.unwrap().unwrap();
        let transition = plan_cancel(&legacy).unwrap();
        set_status(&store, trip.id, Some("completed")).await;

        let err = store.apply_transition(&transition).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(
            store.get_trip(trip.id).await.unwrap().unwrap().status,
            TripStatus::Completed
        );
    }

    #[tokio::test]
    async fn null_status_trip_is_pending_and_writable() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();
        let first = book(&store, customer.id, "Thamel").await;
        let second = book(&store, customer.id, "Patan").await;
        set_status(&store, first.id, None).await;
        set_status(&store, second.id, None).await;

        let pending: Vec<TripId> = store
            .list_pending_trips()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.trip.id)
            .collect();
        assert_eq!(pending, vec![first.id, second.id]);

        let first = store.get_trip(first.id).await.unwrap().unwrap();
        assert_eq!(first.status, TripStatus::Requested);
        let assigned = store
            .apply_transition(&plan_assign(&first, &driver).unwrap())
            .await
            .unwrap();
        assert_eq!(assigned.status, TripStatus::Assigned);

        let second = store.get_trip(second.id).await.unwrap().unwrap();
        let cancelled = store
            .apply_transition(&plan_cancel(&second).unwrap())
            .await
            .unwrap();
        assert_eq!(cancelled.status, TripStatus::Cancelled);
    }

    #[tokio::test]
    async fn release_waits_while_driver_holds_another_assigned_trip() {
        let store = create_test_store().await;
        let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
        let driver = store
            .insert_driver(&driver_input("Ram Bahadur", "ram@example.com"))
            .await
            .unwrap();
        let old = book(&store, customer.id, "Thamel").await;
        let new = book(&store, customer.id, "Patan").await;
        store
            .apply_transition(&plan_assign(&old, &driver).unwrap())
            .await
            .unwrap();
        set_status(&store, old.id, Some("paid")).await;

        assert!(store.release_idle_driver(driver.id).await.unwrap());
        let driver = store.get_driver(driver.id).await.unwrap().unwrap();
        store
            .apply_transition(&plan_assign(&new, &driver).unwrap())
            .await
            .unwrap();

        let legacy = store.get_trip(old.id).await.unwrap().unwrap();
        store
            .apply_transition(&plan_cancel(&legacy).unwrap())
            .await
            .unwrap();
        assert!(!store.get_driver(driver.id).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn orphan_payments_are_listed() {
        let store = create_test_store().await;
        sqlx::query("INSERT INTO payment (trip_id, amount, method, status) VALUES (NULL, 300, 'Cash', 'paid')")
            .execute(store.pool())
            .await
            .unwrap();

        let payments = store.list_payments().await.unwrap();
        assert_eq!(payments.len(), 1);
        assert!(payments[0].is_orphan());

        let err = store
            .insert_payment(
                TripId::new(5),
                &NewPayment {
                    amount: 100.0,
                    method: PaymentMethod::Fonepay,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "trip", .. }));
    }

    #[tokio::test]
    async fn file_database_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("taxibooking.db").display());

        let customer_id = {
            let db = Database::connect(&url, 2).await.unwrap();
            db.initialize().await.unwrap();
            let store = SqliteStore::new(db);
            let customer = store.insert_customer(&customer_input("hari@example.com")).await.unwrap();
            store.pool().close().await;
            customer.id
        };

        let db = Database::connect(&url, 2).await.unwrap();
        db.initialize().await.unwrap();
        let store = SqliteStore::new(db);
        let customer = store.get_customer(customer_id).await.unwrap().unwrap();
        assert_eq!(customer.email, "hari@example.com");

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(admins, 1);
    }
}
