//! Booking and payment linkage.

use std::sync::Arc;

use serde::Serialize;

use fasttrack_core::{
    BookingRequest, CustomerId, FastTrackError, NewPayment, NewTrip, Payment, PaymentMethod,
    Result, Trip, TripId,
};
use fasttrack_store::Store;

/// A stored booking: the requested trip and the payment funding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    /// The new trip, `requested` with no driver.
    pub trip: Trip,
    /// The payment, linked to `trip`.
    pub payment: Payment,
}

/// Creates bookings and records payments.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn Store>,
}

impl BookingService {
    /// Create a booking service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Book a trip for `customer_id` and record its fare as paid.
    ///
    /// The trip and payment rows are written together; if either insert fails neither
    /// exists afterwards.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::Validation` if the request is malformed.
    /// - `FastTrackError::NotFound` if the customer doesn't exist.
    pub async fn book(&self, customer_id: CustomerId, request: &BookingRequest) -> Result<Booking> {
        let fields = request.details.validate()?;
        let method = request.method.unwrap_or_default();

        self.store
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| FastTrackError::customer_not_found(customer_id))?;

        let payment = NewPayment {
            amount: fields.fare,
            method,
        };
        let trip = NewTrip {
            customer_id,
            fields,
        };

        let (trip, payment) = self
            .store
            .insert_booking(&trip, &payment)
            .await
            .map_err(|err| {
                tracing::error!(customer_id = %customer_id, error = %err, "Booking failed");
                FastTrackError::from(err)
            })?;

        tracing::info!(
            trip_id = %trip.id,
            payment_id = %payment.id,
            customer_id = %customer_id,
            method = %method,
            "Trip booked"
        );
        Ok(Booking { trip, payment })
    }

    /// Record a further payment against an existing trip. The trip's status is not
    /// touched.
    ///
    /// # Errors
    ///
    /// - `FastTrackError::Validation` unless `amount` is a positive number.
    /// - `FastTrackError::NotFound` if the trip doesn't exist.
    pub async fn record_payment(
        &self,
        trip_id: TripId,
        amount: f64,
        method: PaymentMethod,
    ) -> Result<Payment> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FastTrackError::Validation(
                "amount must be a positive number".into(),
            ));
        }

        let payment = self
            .store
            .insert_payment(trip_id, &NewPayment { amount, method })
            .await?;

        tracing::info!(
            trip_id = %trip_id,
            payment_id = %payment.id,
            method = %method,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Payments linked to a trip, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::NotFound` if the trip doesn't exist.
    pub async fn payments_for_trip(&self, trip_id: TripId) -> Result<Vec<Payment>> {
        self.store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| FastTrackError::trip_not_found(trip_id))?;
        Ok(self.store.list_payments_by_trip(trip_id).await?)
    }

    /// Every payment, including any that never got linked to a trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn all_payments(&self) -> Result<Vec<Payment>> {
        let payments = self.store.list_payments().await?;
        let orphans = payments.iter().filter(|p| p.is_orphan()).count();
        if orphans > 0 {
            tracing::warn!(orphans, "Payments without a trip are present");
        }
        Ok(payments)
    }
}
