//! Car inventory model.
//!
//! A car is created in [`CarStatus::Transit`] by staff, moved between
//! `available`, `transit` and `sold` by staff, and moved to
//! [`CarStatus::Reserved`] only by the reservation core.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Validation errors raised when building car values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CarValidationError {
    #[error("car id must be a valid UUID")]
    InvalidId,
    #[error("vin must not be empty")]
    EmptyVin,
    #[error("model must not be empty")]
    EmptyModel,
    #[error("price must be positive")]
    InvalidPrice,
    #[error("unknown car status `{0}`")]
    UnknownStatus(String),
}

/// Stable car identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(Uuid);

impl CarId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CarId {
    type Err = CarValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CarValidationError::InvalidId)
    }
}

/// Lifecycle status of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarStatus {
    Available,
    Transit,
    Reserved,
    Sold,
}

impl CarStatus {
    /// Persisted and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Transit => "transit",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
        }
    }

    /// Whether the reservation core may reserve a car in this status.
    ///
    /// ```
    /// use dealership::domain::CarStatus;
    ///
    /// assert!(CarStatus::Transit.is_reservable());
    /// assert!(!CarStatus::Sold.is_reservable());
    /// ```
    pub const fn is_reservable(self) -> bool {
        matches!(self, Self::Available | Self::Transit)
    }

    /// Whether the pricing worker recomputes the local price for this status.
    ///
    /// Reserved and sold cars keep the price they had when they left the
    /// market.
    pub const fn is_repriceable(self) -> bool {
        matches!(self, Self::Available | Self::Transit)
    }

    /// Statuses shown in the public catalog.
    pub const fn is_listed(self) -> bool {
        matches!(self, Self::Available | Self::Transit)
    }

    /// Statuses staff may assign directly. `reserved` is owned by the
    /// reservation core.
    pub const fn is_staff_assignable(self) -> bool {
        !matches!(self, Self::Reserved)
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarStatus {
    type Err = CarValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "transit" => Ok(Self::Transit),
            "reserved" => Ok(Self::Reserved),
            "sold" => Ok(Self::Sold),
            other => Err(CarValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Vehicle identification number. Unique and immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    /// Validate and construct a VIN. Surrounding whitespace is removed.
    pub fn new(raw: impl Into<String>) -> Result<Self, CarValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CarValidationError::EmptyVin);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Vin {
    type Error = CarValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Vin> for String {
    fn from(value: Vin) -> Self {
        value.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full car record as seen by staff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Car {
    pub id: CarId,
    pub vin: Vin,
    pub make: String,
    pub model: String,
    pub price_usd: f64,
    pub price_kzt: f64,
    pub status: CarStatus,
    pub image_url: Option<String>,
    pub reserved_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Car {
    /// Customer-facing projection without VIN, local price or reservation
    /// owner.
    pub fn to_public(&self) -> PublicCar {
        PublicCar {
            id: self.id,
            make: self.make.clone(),
            model: self.model.clone(),
            price_usd: self.price_usd,
            status: self.status,
            image_url: self.image_url.clone(),
        }
    }

    /// Customer-facing detail view, including the current KZT price.
    pub fn to_details(&self) -> CarDetails {
        CarDetails {
            id: self.id,
            make: self.make.clone(),
            model: self.model.clone(),
            price_usd: self.price_usd,
            price_kzt: self.price_kzt,
            status: self.status,
            image_url: self.image_url.clone(),
        }
    }
}

/// Catalog entry returned to customers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicCar {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub price_usd: f64,
    pub status: CarStatus,
    pub image_url: Option<String>,
}

/// Single-car view returned to customers. Unlike [`PublicCar`] it carries
/// the local price; VIN and reservation owner stay private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarDetails {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub price_usd: f64,
    pub price_kzt: f64,
    pub status: CarStatus,
    pub image_url: Option<String>,
}

/// Validated input for creating a car.
///
/// ## Invariants
/// - `model` is non-empty once trimmed.
/// - `price_usd` is finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    vin: Vin,
    make: String,
    model: String,
    price_usd: f64,
    image_url: Option<String>,
}

impl NewCar {
    /// Validate raw car input.
    ///
    /// ```
    /// use dealership::domain::{CarValidationError, NewCar};
    ///
    /// let car = NewCar::try_new("VIN1", "Toyota", "Camry", 20_000.0, None).unwrap();
    /// assert_eq!(car.model(), "Camry");
    /// assert_eq!(
    ///     NewCar::try_new("VIN1", "Toyota", "Camry", 0.0, None),
    ///     Err(CarValidationError::InvalidPrice)
    /// );
    /// ```
    pub fn try_new(
        vin: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        price_usd: f64,
        image_url: Option<String>,
    ) -> Result<Self, CarValidationError> {
        let vin = Vin::new(vin)?;
        let model = model.into().trim().to_owned();
        if model.is_empty() {
            return Err(CarValidationError::EmptyModel);
        }
        if !price_usd.is_finite() || price_usd <= 0.0 {
            return Err(CarValidationError::InvalidPrice);
        }
        let image_url = image_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());
        Ok(Self {
            vin,
            make: make.into().trim().to_owned(),
            model,
            price_usd,
            image_url,
        })
    }

    /// Vehicle identification number.
    pub fn vin(&self) -> &Vin {
        &self.vin
    }

    /// Manufacturer; may be empty.
    pub fn make(&self) -> &str {
        &self.make
    }

    /// Trimmed model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Base price in US dollars.
    pub fn price_usd(&self) -> f64 {
        self.price_usd
    }

    /// Optional picture URL.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}
