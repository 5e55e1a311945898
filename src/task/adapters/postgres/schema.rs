//! Diesel schema for task persistence.

diesel::table! {
    /// Owner-scoped board task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user identity.
        #[max_length = 255]
        owner_id -> Varchar,
        /// Task title.
        title -> Text,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Board status.
        #[max_length = 20]
        status -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
