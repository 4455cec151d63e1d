use super::MigrationError;
use crate::db::connection::get_connection;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable, Text};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Columns a declared varchar may legitimately live in as `text` once its
/// declared size crosses this threshold.
const VARCHAR_TEXT_THRESHOLD: i32 = 255;

/// Declared shape of one table. These specs mirror the migration artifacts
/// (the source of truth); the validator compares them against the live
/// catalogue and reports drift.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
    pub indexes: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKeySpec],
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub data_type: &'static str,
    pub max_length: Option<i32>,
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKeySpec {
    pub constraint: &'static str,
    pub definition: &'static str,
}

#[derive(Debug, Clone)]
pub struct TypeMismatch {
    pub column: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ConstraintIssue {
    pub constraint: String,
    pub issue: String,
    pub severity: Severity,
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub table_name: String,
    pub is_valid: bool,
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
    pub type_mismatches: Vec<TypeMismatch>,
    pub missing_indexes: Vec<String>,
    pub constraint_issues: Vec<ConstraintIssue>,
    pub recommended_actions: Vec<String>,
}

impl ValidationResult {
    fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            is_valid: true,
            missing_columns: Vec::new(),
            extra_columns: Vec::new(),
            type_mismatches: Vec::new(),
            missing_indexes: Vec::new(),
            constraint_issues: Vec::new(),
            recommended_actions: Vec::new(),
        }
    }
}

#[derive(QueryableByName)]
struct CatalogueColumn {
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    data_type: String,
    #[diesel(sql_type = Nullable<diesel::sql_types::Integer>)]
    character_maximum_length: Option<i32>,
}

#[derive(QueryableByName)]
struct CatalogueIndex {
    #[diesel(sql_type = Text)]
    indexname: String,
}

#[derive(QueryableByName)]
struct CatalogueForeignKey {
    #[diesel(sql_type = Text)]
    constraint_name: String,
    #[diesel(sql_type = Text)]
    constraint_def: String,
}

#[derive(QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = Bool)]
    present: bool,
}

/// Read-only drift detector: declared entity shapes vs the live catalogue.
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validates every declared table. Catalogue read failures for a single
    /// table degrade to an invalid result with a manual-investigation hint
    /// instead of aborting the sweep.
    pub fn validate_all() -> Result<Vec<ValidationResult>, MigrationError> {
        let mut results = Vec::new();
        for spec in expected_tables() {
            let result = match Self::validate_table(spec) {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("❌ Failed to validate table {}: {e}", spec.name);
                    let mut result = ValidationResult::new(spec.name);
                    result.is_valid = false;
                    result
                        .recommended_actions
                        .push(format!("Manual investigation required: {e}"));
                    result
                }
            };
            results.push(result);
        }
        Ok(results)
    }

    pub fn validate_table(spec: &TableSpec) -> Result<ValidationResult, MigrationError> {
        let mut result = ValidationResult::new(spec.name);

        if !Self::table_exists(spec.name)? {
            result.is_valid = false;
            result
                .recommended_actions
                .push(format!("Create table '{}' using a migration", spec.name));
            return Ok(result);
        }

        let db_columns = Self::catalogue_columns(spec.name)?;
        compare_columns(&mut result, spec, &db_columns);

        let db_indexes = Self::catalogue_indexes(spec.name)?;
        for index in spec.indexes {
            if !db_indexes.contains(&(*index).to_string()) {
                // Missing indexes degrade performance, not correctness.
                result.missing_indexes.push((*index).to_string());
            }
        }

        let db_fks = Self::catalogue_foreign_keys(spec.name)?;
        compare_foreign_keys(&mut result, spec, &db_fks);

        generate_recommendations(&mut result);

        Ok(result)
    }

    fn table_exists(table: &str) -> Result<bool, MigrationError> {
        let mut conn = get_connection()?;

        let row: ExistsRow = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name = $1) AS present",
        )
        .bind::<Text, _>(table)
        .get_result(&mut conn)
        .map_err(crate::db::error::RepositoryError::from)?;

        Ok(row.present)
    }

    fn catalogue_columns(
        table: &str,
    ) -> Result<HashMap<String, (String, Option<i32>)>, MigrationError> {
        let mut conn = get_connection()?;

        let rows: Vec<CatalogueColumn> = diesel::sql_query(
            "SELECT column_name::text, data_type::text, character_maximum_length::int4 \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind::<Text, _>(table)
        .load(&mut conn)
        .map_err(crate::db::error::RepositoryError::from)?;

        Ok(rows
            .into_iter()
            .map(|r| (r.column_name, (r.data_type, r.character_maximum_length)))
            .collect())
    }

    fn catalogue_indexes(table: &str) -> Result<Vec<String>, MigrationError> {
        let mut conn = get_connection()?;

        let rows: Vec<CatalogueIndex> = diesel::sql_query(
            "SELECT indexname::text FROM pg_indexes \
             WHERE schemaname = 'public' AND tablename = $1",
        )
        .bind::<Text, _>(table)
        .load(&mut conn)
        .map_err(crate::db::error::RepositoryError::from)?;

        Ok(rows.into_iter().map(|r| r.indexname).collect())
    }

    fn catalogue_foreign_keys(table: &str) -> Result<HashMap<String, String>, MigrationError> {
        let mut conn = get_connection()?;

        let rows: Vec<CatalogueForeignKey> = diesel::sql_query(
            "SELECT tc.constraint_name::text, \
                    (kcu.column_name || ' -> ' || ccu.table_name || '(' || ccu.column_name || ')')::text \
                        AS constraint_def \
             FROM information_schema.table_constraints AS tc \
             JOIN information_schema.key_column_usage AS kcu \
               ON tc.constraint_name = kcu.constraint_name \
             JOIN information_schema.constraint_column_usage AS ccu \
               ON ccu.constraint_name = tc.constraint_name \
             WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_name = $1",
        )
        .bind::<Text, _>(table)
        .load(&mut conn)
        .map_err(crate::db::error::RepositoryError::from)?;

        Ok(rows
            .into_iter()
            .map(|r| (r.constraint_name, r.constraint_def))
            .collect())
    }

    /// Renders validation results into a human-readable report.
    pub fn render_report(results: &[ValidationResult]) -> String {
        let valid = results.iter().filter(|r| r.is_valid).count();

        let mut report = String::new();
        let _ = writeln!(report, "# Database Schema Validation Report\n");
        let _ = writeln!(report, "## Summary");
        let _ = writeln!(report, "- Total tables: {}", results.len());
        let _ = writeln!(report, "- Valid tables: {valid}");
        let _ = writeln!(report, "- Invalid tables: {}\n", results.len() - valid);

        for result in results {
            let status = if result.is_valid { "VALID" } else { "INVALID" };
            let _ = writeln!(report, "## Table: {} [{status}]\n", result.table_name);

            if !result.missing_columns.is_empty() {
                let _ = writeln!(report, "**Missing columns:**");
                for col in &result.missing_columns {
                    let _ = writeln!(report, "- {col}");
                }
                let _ = writeln!(report);
            }

            if !result.extra_columns.is_empty() {
                let _ = writeln!(report, "**Extra columns:**");
                for col in &result.extra_columns {
                    let _ = writeln!(report, "- {col}");
                }
                let _ = writeln!(report);
            }

            if !result.type_mismatches.is_empty() {
                let _ = writeln!(report, "**Type mismatches:**");
                for m in &result.type_mismatches {
                    let _ = writeln!(
                        report,
                        "- {}: expected {}, got {}",
                        m.column, m.expected, m.actual
                    );
                }
                let _ = writeln!(report);
            }

            if !result.missing_indexes.is_empty() {
                let _ = writeln!(report, "**Missing indexes (warning):**");
                for idx in &result.missing_indexes {
                    let _ = writeln!(report, "- {idx}");
                }
                let _ = writeln!(report);
            }

            if !result.constraint_issues.is_empty() {
                let _ = writeln!(report, "**Constraint issues:**");
                for issue in &result.constraint_issues {
                    let severity = match issue.severity {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                    };
                    let _ = writeln!(
                        report,
                        "- [{severity}] {}: {}",
                        issue.constraint, issue.issue
                    );
                }
                let _ = writeln!(report);
            }

            if !result.recommended_actions.is_empty() {
                let _ = writeln!(report, "**Recommended actions:**");
                for action in &result.recommended_actions {
                    let _ = writeln!(report, "- {action}");
                }
                let _ = writeln!(report);
            }
        }

        report
    }
}

fn compare_columns(
    result: &mut ValidationResult,
    spec: &TableSpec,
    db_columns: &HashMap<String, (String, Option<i32>)>,
) {
    for col in spec.columns {
        match db_columns.get(col.name) {
            None => {
                result.missing_columns.push(col.name.to_string());
                result.is_valid = false;
            }
            Some((actual_type, _)) => {
                if !types_match(col.data_type, col.max_length, actual_type) {
                    result.type_mismatches.push(TypeMismatch {
                        column: col.name.to_string(),
                        expected: col.data_type.to_string(),
                        actual: actual_type.clone(),
                    });
                    result.is_valid = false;
                }
            }
        }
    }

    let declared: std::collections::HashSet<&str> =
        spec.columns.iter().map(|c| c.name).collect();
    for name in db_columns.keys() {
        if !declared.contains(name.as_str()) && !is_system_column(name) {
            result.extra_columns.push(name.clone());
        }
    }
    result.extra_columns.sort();
}

fn compare_foreign_keys(
    result: &mut ValidationResult,
    spec: &TableSpec,
    db_fks: &HashMap<String, String>,
) {
    for fk in spec.foreign_keys {
        match db_fks.get(fk.constraint) {
            None => {
                result.constraint_issues.push(ConstraintIssue {
                    constraint: fk.constraint.to_string(),
                    issue: "Missing foreign key constraint".to_string(),
                    severity: Severity::Error,
                });
                result.is_valid = false;
            }
            Some(actual) if actual != fk.definition => {
                result.constraint_issues.push(ConstraintIssue {
                    constraint: fk.constraint.to_string(),
                    issue: format!(
                        "FK constraint mismatch: expected {}, got {actual}",
                        fk.definition
                    ),
                    severity: Severity::Warning,
                });
            }
            Some(_) => {}
        }
    }
}

/// Lenient type compatibility across dialect aliases. An unknown declared
/// type simply fails to match; it never panics.
pub fn types_match(expected: &str, expected_len: Option<i32>, actual: &str) -> bool {
    let expected = expected.trim().to_lowercase();
    let actual = actual.trim().to_lowercase();

    if expected == actual {
        return true;
    }

    if expected.contains("character varying") {
        if actual.contains("varchar") || actual.contains("character varying") {
            return true;
        }
        // Large varchars may legitimately live in text columns.
        return actual == "text" && expected_len.is_some_and(|n| n > VARCHAR_TEXT_THRESHOLD);
    }

    let aliases: [(&str, &[&str]); 6] = [
        ("timestamp without time zone", &["timestamp", "datetime"]),
        ("timestamp with time zone", &["timestamptz"]),
        ("boolean", &["bool"]),
        ("integer", &["int", "int4"]),
        ("bigint", &["int8"]),
        ("uuid", &["char(36)"]),
    ];

    for (base, names) in aliases {
        if expected.contains(base) && names.iter().any(|alias| actual.contains(alias)) {
            return true;
        }
        // The aliases run both ways: a declared `timestamptz` matches a
        // catalogue `timestamp with time zone`.
        if actual.contains(base) && names.iter().any(|alias| expected.contains(alias)) {
            return true;
        }
    }

    false
}

fn is_system_column(name: &str) -> bool {
    matches!(
        name,
        "oid" | "tableoid" | "xmin" | "cmin" | "xmax" | "cmax" | "ctid"
    )
}

fn generate_recommendations(result: &mut ValidationResult) {
    if !result.missing_columns.is_empty() {
        result.recommended_actions.push(format!(
            "Run a migration to add missing columns: {}",
            result.missing_columns.join(", ")
        ));
    }
    if !result.extra_columns.is_empty() {
        result.recommended_actions.push(format!(
            "Consider removing unused columns: {}",
            result.extra_columns.join(", ")
        ));
    }
    if !result.type_mismatches.is_empty() {
        result
            .recommended_actions
            .push("Review and fix column type mismatches".to_string());
    }
    if !result.missing_indexes.is_empty() {
        result
            .recommended_actions
            .push("Create missing indexes for better performance".to_string());
    }
    let errors = result
        .constraint_issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    if errors > 0 {
        result
            .recommended_actions
            .push(format!("Fix {errors} critical constraint issues"));
    }
}

/// Declared shapes for every table the service owns, kept in lockstep with
/// the migration artifacts.
pub fn expected_tables() -> &'static [TableSpec] {
    const fn col(name: &'static str, data_type: &'static str) -> ColumnSpec {
        ColumnSpec {
            name,
            data_type,
            max_length: None,
        }
    }
    const fn varchar(name: &'static str, len: i32) -> ColumnSpec {
        ColumnSpec {
            name,
            data_type: "character varying",
            max_length: Some(len),
        }
    }

    const USERS: &[ColumnSpec] = &[
        col("id", "uuid"),
        varchar("email", 255),
        varchar("username", 100),
        varchar("password_hash", 255),
        varchar("role", 20),
        col("is_active", "boolean"),
        col("email_verified", "boolean"),
        varchar("google_id", 255),
        varchar("git_hub_id", 255),
        varchar("facebook_id", 255),
        varchar("first_name", 100),
        varchar("last_name", 100),
        varchar("phone_number", 20),
        col("bio", "text"),
        varchar("avatar_url", 500),
        col("date_of_birth", "date"),
        varchar("gender", 10),
        varchar("country", 100),
        varchar("city", 100),
        varchar("timezone", 50),
        varchar("language", 10),
        varchar("website", 500),
        varchar("linkedin", 500),
        varchar("twitter", 500),
        varchar("github", 500),
        col("last_login_at", "timestamp with time zone"),
        col("last_login_ip", "inet"),
        col("failed_login_attempts", "integer"),
        col("locked_until", "timestamp with time zone"),
        col("created_at", "timestamp with time zone"),
        col("updated_at", "timestamp with time zone"),
        col("deleted_at", "timestamp with time zone"),
    ];

    const SESSIONS: &[ColumnSpec] = &[
        col("id", "uuid"),
        col("user_id", "uuid"),
        varchar("refresh_token", 512),
        varchar("access_token_hash", 255),
        col("ip_address", "inet"),
        col("user_agent", "text"),
        col("device_info", "jsonb"),
        col("is_active", "boolean"),
        col("is_revoked", "boolean"),
        col("created_at", "timestamp with time zone"),
        col("updated_at", "timestamp with time zone"),
        col("expires_at", "timestamp with time zone"),
        col("last_used_at", "timestamp with time zone"),
    ];

    const LOGIN_ATTEMPTS: &[ColumnSpec] = &[
        col("id", "uuid"),
        col("user_id", "uuid"),
        varchar("email", 255),
        varchar("username", 100),
        col("success", "boolean"),
        varchar("failure_reason", 255),
        col("ip_address", "inet"),
        col("user_agent", "text"),
        col("attempted_at", "timestamp with time zone"),
    ];

    const USER_PREFERENCES: &[ColumnSpec] = &[
        col("id", "uuid"),
        col("user_id", "uuid"),
        col("email_notifications", "boolean"),
        col("push_notifications", "boolean"),
        col("marketing_emails", "boolean"),
        col("two_factor_enabled", "boolean"),
        varchar("theme", 20),
        varchar("language", 10),
        varchar("privacy_level", 20),
        col("created_at", "timestamp with time zone"),
        col("updated_at", "timestamp with time zone"),
    ];

    const USER_ACTIVITIES: &[ColumnSpec] = &[
        col("id", "uuid"),
        col("user_id", "uuid"),
        varchar("action", 100),
        col("description", "text"),
        col("ip_address", "inet"),
        col("user_agent", "text"),
        col("metadata", "jsonb"),
        col("created_at", "timestamp with time zone"),
    ];

    const USER_NOTIFICATIONS: &[ColumnSpec] = &[
        col("id", "uuid"),
        col("user_id", "uuid"),
        varchar("type", 50),
        varchar("title", 200),
        col("message", "text"),
        col("is_read", "boolean"),
        col("read_at", "timestamp with time zone"),
        varchar("action_url", 500),
        varchar("action_text", 100),
        col("expires_at", "timestamp with time zone"),
        col("created_at", "timestamp with time zone"),
    ];

    const PASSWORD_RESETS: &[ColumnSpec] = &[
        col("id", "uuid"),
        col("user_id", "uuid"),
        varchar("token_hash", 64),
        col("expires_at", "timestamp with time zone"),
        col("used_at", "timestamp with time zone"),
        col("created_at", "timestamp with time zone"),
    ];

    const TABLES: &[TableSpec] = &[
        TableSpec {
            name: "users",
            columns: USERS,
            indexes: &[
                "idx_users_email",
                "idx_users_username",
                "idx_users_deleted_at",
            ],
            foreign_keys: &[],
        },
        TableSpec {
            name: "sessions",
            columns: SESSIONS,
            indexes: &["idx_sessions_user_id", "idx_sessions_expires_at"],
            foreign_keys: &[ForeignKeySpec {
                constraint: "sessions_user_id_fkey",
                definition: "user_id -> users(id)",
            }],
        },
        TableSpec {
            name: "login_attempts",
            columns: LOGIN_ATTEMPTS,
            indexes: &["idx_login_attempts_user_id", "idx_login_attempts_email"],
            foreign_keys: &[ForeignKeySpec {
                constraint: "login_attempts_user_id_fkey",
                definition: "user_id -> users(id)",
            }],
        },
        TableSpec {
            name: "user_preferences",
            columns: USER_PREFERENCES,
            indexes: &["idx_user_preferences_user_id"],
            foreign_keys: &[ForeignKeySpec {
                constraint: "user_preferences_user_id_fkey",
                definition: "user_id -> users(id)",
            }],
        },
        TableSpec {
            name: "user_activities",
            columns: USER_ACTIVITIES,
            indexes: &["idx_user_activities_user_id", "idx_user_activities_created_at"],
            foreign_keys: &[ForeignKeySpec {
                constraint: "user_activities_user_id_fkey",
                definition: "user_id -> users(id)",
            }],
        },
        TableSpec {
            name: "user_notifications",
            columns: USER_NOTIFICATIONS,
            indexes: &["idx_user_notifications_user_id"],
            foreign_keys: &[ForeignKeySpec {
                constraint: "user_notifications_user_id_fkey",
                definition: "user_id -> users(id)",
            }],
        },
        TableSpec {
            name: "password_resets",
            columns: PASSWORD_RESETS,
            indexes: &["idx_password_resets_token_hash", "idx_password_resets_user_id"],
            foreign_keys: &[ForeignKeySpec {
                constraint: "password_resets_user_id_fkey",
                definition: "user_id -> users(id)",
            }],
        },
    ];

    TABLES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_alias_types_match() {
        assert!(types_match("uuid", None, "uuid"));
        assert!(types_match("boolean", None, "bool"));
        assert!(types_match("integer", None, "int4"));
        assert!(types_match("bigint", None, "int8"));
        assert!(types_match("uuid", None, "char(36)"));
        assert!(types_match(
            "timestamp without time zone",
            None,
            "timestamp"
        ));
        assert!(types_match(
            "timestamp with time zone",
            None,
            "timestamp with time zone"
        ));
        assert!(types_match("timestamptz", None, "timestamp with time zone"));
    }

    #[test]
    fn varchar_matches_text_only_past_threshold() {
        assert!(types_match("character varying", Some(100), "varchar"));
        assert!(types_match(
            "character varying",
            Some(512),
            "character varying"
        ));
        assert!(types_match("character varying", Some(500), "text"));
        assert!(!types_match("character varying", Some(100), "text"));
        assert!(!types_match("character varying", None, "text"));
    }

    #[test]
    fn unknown_declared_type_is_a_mismatch_not_a_crash() {
        assert!(!types_match("hstore", None, "text"));
        assert!(!types_match("", None, "uuid"));
    }

    #[test]
    fn system_columns_are_ignored() {
        assert!(is_system_column("xmin"));
        assert!(is_system_column("ctid"));
        assert!(!is_system_column("email"));
    }

    #[test]
    fn missing_column_invalidates_missing_index_does_not() {
        let spec = &expected_tables()[0];

        let mut with_missing_col = ValidationResult::new(spec.name);
        let empty = HashMap::new();
        compare_columns(&mut with_missing_col, spec, &empty);
        assert!(!with_missing_col.is_valid);
        assert_eq!(with_missing_col.missing_columns.len(), spec.columns.len());

        let mut with_missing_index = ValidationResult::new(spec.name);
        with_missing_index.missing_indexes.push("idx_users_email".to_string());
        generate_recommendations(&mut with_missing_index);
        assert!(with_missing_index.is_valid, "missing index is only a warning");
        assert!(!with_missing_index.recommended_actions.is_empty());
    }

    #[test]
    fn missing_fk_is_an_error_mismatched_fk_is_a_warning() {
        let spec = &expected_tables()[1]; // sessions
        assert_eq!(spec.name, "sessions");

        let mut missing = ValidationResult::new(spec.name);
        compare_foreign_keys(&mut missing, spec, &HashMap::new());
        assert!(!missing.is_valid);
        assert!(missing
            .constraint_issues
            .iter()
            .any(|i| i.severity == Severity::Error));

        let mut mismatched = ValidationResult::new(spec.name);
        let mut db_fks = HashMap::new();
        db_fks.insert(
            "sessions_user_id_fkey".to_string(),
            "user_id -> accounts(id)".to_string(),
        );
        compare_foreign_keys(&mut mismatched, spec, &db_fks);
        assert!(mismatched.is_valid, "definition drift is only a warning");
        assert!(mismatched
            .constraint_issues
            .iter()
            .all(|i| i.severity == Severity::Warning));
    }

    #[test]
    fn report_renders_summary_and_sections() {
        let mut bad = ValidationResult::new("sessions");
        bad.is_valid = false;
        bad.missing_columns.push("device_info".to_string());
        bad.type_mismatches.push(TypeMismatch {
            column: "expires_at".to_string(),
            expected: "timestamp with time zone".to_string(),
            actual: "text".to_string(),
        });
        generate_recommendations(&mut bad);

        let good = ValidationResult::new("users");

        let report = SchemaValidator::render_report(&[good, bad]);
        assert!(report.contains("Total tables: 2"));
        assert!(report.contains("Valid tables: 1"));
        assert!(report.contains("## Table: users [VALID]"));
        assert!(report.contains("## Table: sessions [INVALID]"));
        assert!(report.contains("device_info"));
        assert!(report.contains("expected timestamp with time zone, got text"));
    }

    #[test]
    fn declared_shapes_cover_every_required_service_table() {
        let names: Vec<&str> = expected_tables().iter().map(|t| t.name).collect();
        for required in crate::migrate::runner::REQUIRED_TABLES {
            if required == "schema_migrations" {
                continue; // owned by the runner's bootstrap, not declared here
            }
            assert!(names.contains(&required), "missing spec for {required}");
        }
    }

    mod db {
        use super::*;
        use crate::db::connection::init_test_pool;

        #[test]
        fn live_schema_matches_declared_shapes() {
            init_test_pool();

            let results = SchemaValidator::validate_all().expect("validation sweep");
            assert_eq!(results.len(), expected_tables().len());

            for result in &results {
                assert!(
                    result.is_valid,
                    "table {} drifted: {:?} / {:?} / {:?}",
                    result.table_name,
                    result.missing_columns,
                    result.type_mismatches,
                    result.constraint_issues
                );
            }
        }
    }
}
