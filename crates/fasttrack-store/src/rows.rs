//! Row encoding and decoding.
//!
//! Rows are read with loose, nullable column types and converted into the stricter
//! domain types here, so a malformed legacy row surfaces as `StoreError::Serialization`
//! instead of a decode panic somewhere else. Status text outside the lifecycle is not
//! malformed: it reads as `TripStatus::Unrecognized`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use fasttrack_core::{
    Admin, Customer, Driver, Payment, PaymentMethod, Trip, TripListing, TripStatus, DATE_FORMAT,
    TIME_FORMAT,
};

use crate::error::{Result, StoreError};

/// Column list for a trip aliased as `t`.
pub(crate) const TRIP_COLUMNS: &str = "t.id AS id, t.customer_id AS customer_id, \
     t.driver_id AS driver_id, t.pickup AS pickup, t.dropoff AS dropoff, \
     t.pickup_date AS pickup_date, t.pickup_time AS pickup_time, \
     t.dropoff_date AS dropoff_date, t.dropoff_time AS dropoff_time, \
     t.fare AS fare, t.status AS status, t.created_at AS created_at";

/// Trip columns plus party names, joined from `customer c` and `driver d`.
pub(crate) const LISTING_FROM: &str = "c.name AS customer_name, d.name AS driver_name \
     FROM trip t \
     LEFT JOIN customer c ON t.customer_id = c.id \
     LEFT JOIN driver d ON t.driver_id = d.id";

/// Encode a date the way `trip.pickup_date` stores it.
#[must_use]
pub fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Encode a time the way `trip.pickup_time` stores it.
#[must_use]
pub fn time_text(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn corrupt(entity: &str, id: i64, what: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(format!("{entity} {id}: {what}"))
}

fn parse_date(id: i64, column: &str, text: Option<&str>) -> Result<Option<NaiveDate>> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            NaiveDate::parse_from_str(t, DATE_FORMAT)
                .map_err(|e| corrupt("trip", id, format!("bad {column} {t:?}: {e}")))
        })
        .transpose()
}

fn parse_time(id: i64, column: &str, text: Option<&str>) -> Result<Option<NaiveTime>> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            NaiveTime::parse_from_str(t, TIME_FORMAT)
                .map_err(|e| corrupt("trip", id, format!("bad {column} {t:?}: {e}")))
        })
        .transpose()
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TripRow {
    id: i64,
    customer_id: Option<i64>,
    driver_id: Option<i64>,
    pickup: Option<String>,
    dropoff: Option<String>,
    pickup_date: Option<String>,
    pickup_time: Option<String>,
    dropoff_date: Option<String>,
    dropoff_time: Option<String>,
    fare: Option<f64>,
    status: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl TryFrom<TripRow> for Trip {
    type Error = StoreError;

    fn try_from(row: TripRow) -> Result<Self> {
        let id = row.id;
        let status = TripStatus::from_stored(row.status.as_deref());
        let status_text = if status == TripStatus::Unrecognized {
            tracing::debug!(trip_id = id, status = ?row.status, "Trip has a non-lifecycle status");
            row.status
        } else {
            None
        };
        let pickup_date = parse_date(id, "pickup_date", row.pickup_date.as_deref())?
            .ok_or_else(|| corrupt("trip", id, "missing pickup_date"))?;
        let pickup_time = parse_time(id, "pickup_time", row.pickup_time.as_deref())?
            .ok_or_else(|| corrupt("trip", id, "missing pickup_time"))?;

        Ok(Self {
            id: id.into(),
            customer_id: row.customer_id.map(Into::into),
            driver_id: row.driver_id.map(Into::into),
            pickup: row.pickup.unwrap_or_default(),
            dropoff: row.dropoff.unwrap_or_default(),
            pickup_date,
            pickup_time,
            dropoff_date: parse_date(id, "dropoff_date", row.dropoff_date.as_deref())?,
            dropoff_time: parse_time(id, "dropoff_time", row.dropoff_time.as_deref())?,
            fare: row.fare.unwrap_or_default(),
            status,
            status_text,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TripListingRow {
    #[sqlx(flatten)]
    trip: TripRow,
    customer_name: Option<String>,
    driver_name: Option<String>,
}

impl TryFrom<TripListingRow> for TripListing {
    type Error = StoreError;

    fn try_from(row: TripListingRow) -> Result<Self> {
        Ok(Self {
            trip: row.trip.try_into()?,
            customer_name: row.customer_name,
            driver_name: row.driver_name,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DriverRow {
    id: i64,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    license_number: Option<String>,
    password: Option<String>,
    available: Option<i64>,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            license_number: row.license_number.unwrap_or_default(),
            password: row.password.unwrap_or_default(),
            available: row.available.unwrap_or(1) != 0,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    id: i64,
    name: Option<String>,
    email: Option<String>,
    telephone: Option<String>,
    password: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            telephone: row.telephone.unwrap_or_default(),
            password: row.password.unwrap_or_default(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AdminRow {
    id: i64,
    username: Option<String>,
    password: Option<String>,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id.into(),
            username: row.username.unwrap_or_default(),
            password: row.password.unwrap_or_default(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PaymentRow {
    id: i64,
    trip_id: Option<i64>,
    amount: Option<f64>,
    method: Option<String>,
    status: Option<String>,
    paid_at: Option<NaiveDateTime>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self> {
        let method = match row.method.as_deref() {
            None => PaymentMethod::default(),
            Some(text) => text
                .parse::<PaymentMethod>()
                .map_err(|e| corrupt("payment", row.id, e))?,
        };

        Ok(Self {
            id: row.id.into(),
            trip_id: row.trip_id.map(Into::into),
            amount: row.amount.unwrap_or_default(),
            method,
            status: row.status.unwrap_or_default(),
            paid_at: row.paid_at,
        })
    }
}

/// Convert every row, failing on the first one that does not decode.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: Option<&str>, pickup_date: Option<&str>) -> TripRow {
        TripRow {
            id: 5,
            customer_id: Some(1),
            driver_id: None,
            pickup: Some("A".into()),
            dropoff: Some("B".into()),
            pickup_date: pickup_date.map(Into::into),
            pickup_time: Some("10:00:00".into()),
            dropoff_date: Some(String::new()),
            dropoff_time: None,
            fare: Some(500.0),
            status: status.map(Into::into),
            created_at: None,
        }
    }

    #[test]
    fn trip_row_decodes() {
        let trip = Trip::try_from(row(Some("requested"), Some("2024-01-01"))).unwrap();
        assert_eq!(trip.status, TripStatus::Requested);
        assert_eq!(trip.dropoff_date, None);
        assert_eq!(date_text(trip.pickup_date), "2024-01-01");
        assert_eq!(time_text(trip.pickup_time), "10:00:00");
    }

    #[test]
    fn paid_status_reads_as_unrecognized() {
        let trip = Trip::try_from(row(Some("paid"), Some("2024-01-01"))).unwrap();
        assert_eq!(trip.status, TripStatus::Unrecognized);
        assert_eq!(trip.status_text.as_deref(), Some("paid"));
    }

    #[test]
    fn null_status_reads_as_requested() {
        let trip = Trip::try_from(row(None, Some("2024-01-01"))).unwrap();
        assert_eq!(trip.status, TripStatus::Requested);
        assert_eq!(trip.status_text, None);
    }

    #[test]
    fn missing_pickup_date_is_a_corrupt_row() {
        assert!(Trip::try_from(row(Some("assigned"), None)).is_err());
    }

    #[test]
    fn null_availability_defaults_to_available() {
        let driver = Driver::from(DriverRow {
            id: 1,
            name: Some("Ram Bahadur".into()),
            email: None,
            phone: None,
            license_number: None,
            password: None,
            available: None,
        });
        assert!(driver.available);
    }
}
