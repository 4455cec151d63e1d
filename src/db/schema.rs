// Hand-maintained to match the migration artifacts in migrations/.
// The artifacts are the source of truth for schema; keep this file and the
// validator's declared shapes in sync with them.

diesel::table! {
    users (id) {
        id -> Uuid,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 100]
        username -> Varchar,
        #[max_length = 255]
        password_hash -> Varchar,
        #[max_length = 20]
        role -> Varchar,
        is_active -> Bool,
        email_verified -> Bool,
        #[max_length = 255]
        google_id -> Nullable<Varchar>,
        #[max_length = 255]
        git_hub_id -> Nullable<Varchar>,
        #[max_length = 255]
        facebook_id -> Nullable<Varchar>,
        #[max_length = 100]
        first_name -> Nullable<Varchar>,
        #[max_length = 100]
        last_name -> Nullable<Varchar>,
        #[max_length = 20]
        phone_number -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        #[max_length = 500]
        avatar_url -> Nullable<Varchar>,
        date_of_birth -> Nullable<Date>,
        #[max_length = 10]
        gender -> Nullable<Varchar>,
        #[max_length = 100]
        country -> Nullable<Varchar>,
        #[max_length = 100]
        city -> Nullable<Varchar>,
        #[max_length = 50]
        timezone -> Nullable<Varchar>,
        #[max_length = 10]
        language -> Varchar,
        #[max_length = 500]
        website -> Nullable<Varchar>,
        #[max_length = 500]
        linkedin -> Nullable<Varchar>,
        #[max_length = 500]
        twitter -> Nullable<Varchar>,
        #[max_length = 500]
        github -> Nullable<Varchar>,
        last_login_at -> Nullable<Timestamptz>,
        last_login_ip -> Nullable<Inet>,
        failed_login_attempts -> Int4,
        locked_until -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    sessions (id) {
        id -> Uuid,
        user_id -> Uuid,
        // Stores the SHA-256 fingerprint of the refresh token, never the secret.
        #[max_length = 512]
        refresh_token -> Varchar,
        #[max_length = 255]
        access_token_hash -> Nullable<Varchar>,
        ip_address -> Nullable<Inet>,
        user_agent -> Nullable<Text>,
        device_info -> Nullable<Jsonb>,
        is_active -> Bool,
        is_revoked -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        expires_at -> Timestamptz,
        last_used_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    login_attempts (id) {
        id -> Uuid,
        user_id -> Nullable<Uuid>,
        #[max_length = 255]
        email -> Nullable<Varchar>,
        #[max_length = 100]
        username -> Nullable<Varchar>,
        success -> Bool,
        #[max_length = 255]
        failure_reason -> Nullable<Varchar>,
        ip_address -> Inet,
        user_agent -> Nullable<Text>,
        attempted_at -> Timestamptz,
    }
}

diesel::table! {
    user_preferences (id) {
        id -> Uuid,
        user_id -> Uuid,
        email_notifications -> Bool,
        push_notifications -> Bool,
        marketing_emails -> Bool,
        two_factor_enabled -> Bool,
        #[max_length = 20]
        theme -> Varchar,
        #[max_length = 10]
        language -> Varchar,
        #[max_length = 20]
        privacy_level -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    user_activities (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 100]
        action -> Varchar,
        description -> Nullable<Text>,
        ip_address -> Nullable<Inet>,
        user_agent -> Nullable<Text>,
        metadata -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    user_notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[sql_name = "type"]
        #[max_length = 50]
        kind -> Varchar,
        #[max_length = 200]
        title -> Varchar,
        message -> Nullable<Text>,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
        #[max_length = 500]
        action_url -> Nullable<Varchar>,
        #[max_length = 100]
        action_text -> Nullable<Varchar>,
        expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    password_resets (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 64]
        token_hash -> Varchar,
        expires_at -> Timestamptz,
        used_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    schema_migrations (id) {
        id -> Int4,
        #[max_length = 50]
        version -> Varchar,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 64]
        checksum -> Varchar,
        applied_at -> Timestamptz,
        #[max_length = 100]
        applied_by -> Nullable<Varchar>,
        #[max_length = 50]
        environment -> Varchar,
        execution_time_ms -> Int4,
    }
}

diesel::joinable!(sessions -> users (user_id));
diesel::joinable!(login_attempts -> users (user_id));
diesel::joinable!(user_preferences -> users (user_id));
diesel::joinable!(user_activities -> users (user_id));
diesel::joinable!(user_notifications -> users (user_id));
diesel::joinable!(password_resets -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    sessions,
    login_attempts,
    user_preferences,
    user_activities,
    user_notifications,
    password_resets,
);
