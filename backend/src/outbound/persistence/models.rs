//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types re-run the
//! domain validation, so a corrupt row surfaces as a query error instead of
//! an invalid value.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Car, CarId, CarStatus, Lead, Role, User, UserId, Username, Vin};

use super::schema::{cars, leads, users};

/// Row struct for reading from the cars table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarRow {
    pub id: Uuid,
    pub vin: String,
    pub make: String,
    pub model: String,
    pub price_usd: f64,
    pub price_kzt: f64,
    pub status: String,
    pub image_url: Option<String>,
    pub reserved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CarRow> for Car {
    type Error = String;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        let status: CarStatus = row
            .status
            .parse()
            .map_err(|err| format!("car {}: {err}", row.id))?;
        let vin = Vin::new(row.vin).map_err(|err| format!("car {}: {err}", row.id))?;
        Ok(Self {
            id: CarId::from_uuid(row.id),
            vin,
            make: row.make,
            model: row.model,
            price_usd: row.price_usd,
            price_kzt: row.price_kzt,
            status,
            image_url: row.image_url,
            reserved_by: row.reserved_by.map(UserId::from_uuid),
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for creating cars.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cars)]
pub(crate) struct NewCarRow<'a> {
    pub id: Uuid,
    pub vin: &'a str,
    pub make: &'a str,
    pub model: &'a str,
    pub price_usd: f64,
    pub price_kzt: f64,
    pub status: &'a str,
    pub image_url: Option<&'a str>,
}

/// Status change applied by staff; always clears the reservation owner.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cars)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CarStatusUpdate<'a> {
    pub status: &'a str,
    pub reserved_by: Option<Uuid>,
}

/// Columns read by the pricing worker.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RepricingRow {
    pub id: Uuid,
    pub price_usd: f64,
    pub price_kzt: f64,
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username).map_err(|err| format!("user {}: {err}", row.id))?;
        let role: Role = row
            .role
            .parse()
            .map_err(|err| format!("user {}: {err}", row.id))?;
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Changeset applied by the credential reset tool.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserCredentialsUpdate<'a> {
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the leads table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LeadRow {
    pub id: Uuid,
    pub car_model: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub inquiry_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            car_model: row.car_model,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            inquiry_type: row.inquiry_type,
            status: row.status,
            created_at: row.created_at,
        }
    }
}
