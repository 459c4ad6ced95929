//! Diesel table definitions.
//!
//! Keep in step with `backend/migrations`.

diesel::table! {
    /// Informational content of every kind, keyed by `kind` slug.
    content_entries (id) {
        id -> Uuid,
        kind -> Text,
        attributes -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student applications. `owner_id` references an identity provider user.
    applications (id) {
        id -> Uuid,
        owner_id -> Uuid,
        university_name -> Text,
        program_name -> Text,
        program_level -> Nullable<Text>,
        intake -> Nullable<Text>,
        notes -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        submitted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Uploaded document metadata; bytes live in object storage.
    documents (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Text,
        content_type -> Text,
        storage_path -> Text,
        size_bytes -> Int8,
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    contact_messages (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        subject -> Nullable<Text>,
        message -> Text,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    content_entries,
    applications,
    documents,
    contact_messages,
);
