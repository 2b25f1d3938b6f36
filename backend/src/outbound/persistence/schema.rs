//! Diesel table definitions for the user store.
//!
//! Kept in sync with `backend/migrations` by hand.

diesel::table! {
    /// User records.
    ///
    /// Timestamps are written with millisecond precision by the service.
    users (id) {
        /// Primary key: UUID v4 generated by the service.
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        nickname -> Varchar,
        /// Opaque password string.
        password -> Varchar,
        email -> Varchar,
        country -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
