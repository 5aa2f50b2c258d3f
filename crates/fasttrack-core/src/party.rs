//! Customers, drivers and operators.
//!
//! These rows are created outside the trip lifecycle. The only column the lifecycle
//! ever writes is `driver.available`.

use serde::{Deserialize, Serialize};

use crate::validation;
use crate::{AdminId, CustomerId, DriverId, Result};

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Full name.
    pub name: String,
    /// Unique email.
    pub email: String,
    /// Telephone number.
    pub telephone: String,
    /// Credential material, as supplied at registration. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// A driver managed by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Driver ID.
    pub id: DriverId,
    /// Full name.
    pub name: String,
    /// Unique email.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Driving license number.
    pub license_number: String,
    /// Credential material. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Eligible for a new assignment. `false` exactly while the driver holds an
    /// assigned trip.
    pub available: bool,
}

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    /// Admin ID.
    pub id: AdminId,
    /// Unique username.
    pub username: String,
    /// Credential material. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// Registration input for a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCustomer {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Ten digit telephone number.
    pub telephone: String,
    /// Password.
    pub password: String,
}

impl NewCustomer {
    /// Check every field and return a trimmed copy.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            name: validation::person_name(&self.name)?,
            email: validation::email(&self.email)?,
            telephone: validation::phone("telephone", &self.telephone)?,
            password: validation::password(&self.password)?,
        })
    }
}

/// Input for adding a driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDriver {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Ten digit phone number.
    pub phone: String,
    /// Driving license number.
    pub license_number: String,
    /// Password.
    pub password: String,
}

impl NewDriver {
    /// Check every field and return a trimmed copy.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            name: validation::person_name(&self.name)?,
            email: validation::email(&self.email)?,
            phone: validation::phone("phone", &self.phone)?,
            license_number: validation::license(&self.license_number)?,
            password: validation::password(&self.password)?,
        })
    }
}

/// Operator edit of a driver's profile. Availability is not editable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverUpdate {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Ten digit phone number.
    pub phone: String,
    /// Driving license number.
    pub license_number: String,
    /// New password; the stored one is kept when absent or blank.
    #[serde(default)]
    pub password: Option<String>,
}

impl DriverUpdate {
    /// Check every field and return a trimmed copy.
    ///
    /// # Errors
    ///
    /// Returns `FastTrackError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            name: validation::person_name(&self.name)?,
            email: validation::email(&self.email)?,
            phone: validation::phone("phone", &self.phone)?,
            license_number: validation::license(&self.license_number)?,
            password: validation::optional(self.password.as_deref())
                .map(validation::password)
                .transpose()?,
        })
    }
}
