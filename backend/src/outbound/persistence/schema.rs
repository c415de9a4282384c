//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! it with `diesel print-schema`).

diesel::table! {
    /// Dealership inventory.
    cars (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Vehicle identification number; unique and never updated.
        vin -> Varchar,
        make -> Varchar,
        model -> Varchar,
        /// List price in US dollars.
        price_usd -> Float8,
        /// Local price in tenge, rewritten by the pricing worker.
        price_kzt -> Float8,
        /// One of `available`, `transit`, `reserved`, `sold`.
        status -> Varchar,
        image_url -> Nullable<Varchar>,
        /// User holding the reservation, set only by the booking transaction.
        reserved_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Accounts able to log in.
    users (id) {
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// bcrypt hash of the password.
        password_hash -> Varchar,
        /// One of `admin`, `manager`, `user`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Customer enquiries. Rows are never updated.
    leads (id) {
        id -> Uuid,
        car_model -> Varchar,
        customer_name -> Varchar,
        customer_phone -> Varchar,
        inquiry_type -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(cars -> users (reserved_by));

diesel::allow_tables_to_appear_in_same_query!(cars, users, leads);
