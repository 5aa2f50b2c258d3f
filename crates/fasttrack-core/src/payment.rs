//! Payment types for FastTrack.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{PaymentId, TripId};

/// Status text written for every recorded payment.
pub const PAYMENT_STATUS_PAID: &str = "paid";

/// How a fare was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// eSewa wallet.
    #[default]
    #[serde(rename = "eSewa", alias = "esewa")]
    Esewa,
    /// Fonepay QR.
    #[serde(alias = "fonepay")]
    Fonepay,
    /// Cash to the driver.
    #[serde(alias = "cash")]
    Cash,
}

impl PaymentMethod {
    /// The text stored in `payment.method`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Esewa => "eSewa",
            Self::Fonepay => "Fonepay",
            Self::Cash => "Cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for payment method text outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method: {0:?}")]
pub struct UnknownMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "esewa" => Ok(Self::Esewa),
            "fonepay" => Ok(Self::Fonepay),
            "cash" => Ok(Self::Cash),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// A persisted payment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// The trip this payment funds. `None` for legacy orphans or after the trip row
    /// was removed.
    pub trip_id: Option<TripId>,
    /// Amount paid.
    pub amount: f64,
    /// Payment method.
    pub method: PaymentMethod,
    /// Payment status text (`paid`).
    pub status: String,
    /// When the payment was stored.
    pub paid_at: Option<NaiveDateTime>,
}

impl Payment {
    /// Whether the payment never got linked to a trip.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.trip_id.is_none()
    }
}

/// A payment about to be inserted, always with status `paid`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewPayment {
    /// Amount paid.
    pub amount: f64,
    /// Payment method.
    pub method: PaymentMethod,
}
