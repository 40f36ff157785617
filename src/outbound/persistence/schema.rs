//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! Diesel uses them for compile-time query validation.

diesel::table! {
    /// Danger zone catalog with soft deletion.
    incidents (id) {
        id -> Int4,
        name -> Varchar,
        descr -> Text,
        latitude -> Float8,
        longitude -> Float8,
        radius_m -> Float8,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only log of user location checks.
    checks (id) {
        id -> Int4,
        user_id -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        has_alert -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Webhook delivery outbox.
    webhooks (id) {
        id -> Int4,
        check_id -> Int4,
        state -> Varchar,
        retry_cnt -> Int4,
        payload -> Bytea,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        scheduled_at -> Timestamptz,
    }
}

diesel::joinable!(webhooks -> checks (check_id));

diesel::allow_tables_to_appear_in_same_query!(checks, incidents, webhooks);
