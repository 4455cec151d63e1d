use super::MigrationError;
use crate::db::connection::get_connection;
use crate::db::schema::schema_migrations;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DOWN_MARKERS: [&str; 2] = ["-- DOWN MIGRATION", "-- ROLLBACK"];
const APPLIED_BY: &str = "migration_runner";

/// One on-disk migration artifact, content-addressed by the SHA-256 of its
/// full file bytes.
#[derive(Debug, Clone)]
pub struct MigrationArtifact {
    pub version: String,
    pub name: String,
    pub path: PathBuf,
    pub checksum: String,
    pub up_sql: String,
    pub down_sql: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema_migrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MigrationRecord {
    pub id: i32,
    pub version: String,
    pub name: String,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
    pub applied_by: Option<String>,
    pub environment: String,
    pub execution_time_ms: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema_migrations)]
struct NewMigrationRecord<'a> {
    version: &'a str,
    name: &'a str,
    checksum: &'a str,
    applied_by: &'a str,
    environment: &'a str,
    execution_time_ms: i32,
}

#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
    pub pending: Vec<(String, String)>,
    pub last_applied_at: Option<DateTime<Utc>>,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub version: String,
    pub name: String,
    pub execution_time_ms: i32,
}

#[derive(Debug, Clone)]
pub struct FailedMigration {
    pub version: String,
    pub name: String,
    pub error: String,
}

/// Result of an `apply` run: everything that landed before the run stopped,
/// plus the artifact that stopped it, if any.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    pub applied: Vec<MigrationOutcome>,
    pub failed: Option<FailedMigration>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ChecksumMismatch {
    pub version: String,
    pub recorded: String,
    /// `None` when the artifact has disappeared from disk entirely.
    pub on_disk: Option<String>,
}

/// Applies ordered SQL artifacts to the database, one transaction per
/// artifact, tracked per environment in `schema_migrations`.
pub struct MigrationRunner {
    migrations_dir: PathBuf,
    environment: String,
}

impl MigrationRunner {
    pub fn new(migrations_dir: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            environment: environment.into(),
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Idempotent bootstrap of the tracking table.
    pub fn ensure_migrations_table(&self) -> Result<(), MigrationError> {
        let mut conn = get_connection()?;

        conn.batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                id SERIAL PRIMARY KEY,
                version VARCHAR(50) NOT NULL,
                name VARCHAR(255) NOT NULL,
                checksum VARCHAR(64) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                applied_by VARCHAR(100),
                environment VARCHAR(50) NOT NULL,
                execution_time_ms INTEGER NOT NULL,
                CONSTRAINT schema_migrations_version_env_key UNIQUE (version, environment)
            );

            CREATE INDEX IF NOT EXISTS idx_schema_migrations_version ON schema_migrations(version);
            CREATE INDEX IF NOT EXISTS idx_schema_migrations_environment ON schema_migrations(environment);
            CREATE INDEX IF NOT EXISTS idx_schema_migrations_applied_at ON schema_migrations(applied_at);
            "#,
        )
        .map_err(crate::db::error::RepositoryError::from)?;

        Ok(())
    }

    /// Loads and parses every artifact from disk, sorted by version string.
    /// Files that don't follow `<version>_<name>.sql` are skipped with a
    /// warning rather than failing the run.
    pub fn load_artifacts(&self) -> Result<Vec<MigrationArtifact>, MigrationError> {
        if !self.migrations_dir.is_dir() {
            return Err(MigrationError::MissingDirectory(
                self.migrations_dir.display().to_string(),
            ));
        }

        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.migrations_dir)? {
            let path = entry?.path();
            if path.is_dir() || path.extension().is_none_or(|ext| ext != "sql") {
                continue;
            }

            match parse_artifact(&path) {
                Ok(artifact) => artifacts.push(artifact),
                Err(MigrationError::InvalidArtifact(msg)) => {
                    tracing::warn!("Skipping invalid migration file: {msg}");
                }
                Err(e) => return Err(e),
            }
        }

        // Version strings sort lexicographically; zero-padded numeric and
        // timestamp prefixes both order correctly this way.
        artifacts.sort_by(|a, b| a.version.cmp(&b.version));

        Ok(artifacts)
    }

    pub fn applied_records(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        let mut conn = get_connection()?;

        let records = schema_migrations::table
            .filter(schema_migrations::environment.eq(&self.environment))
            .order_by(schema_migrations::version.asc())
            .load::<MigrationRecord>(&mut conn)
            .map_err(crate::db::error::RepositoryError::from)?;

        Ok(records)
    }

    pub fn pending(&self) -> Result<Vec<MigrationArtifact>, MigrationError> {
        let artifacts = self.load_artifacts()?;
        let applied: std::collections::HashSet<String> = self
            .applied_records()?
            .into_iter()
            .map(|r| r.version)
            .collect();

        Ok(artifacts
            .into_iter()
            .filter(|a| !applied.contains(&a.version))
            .collect())
    }

    pub fn status(&self) -> Result<MigrationStatus, MigrationError> {
        self.ensure_migrations_table()?;

        let artifacts = self.load_artifacts()?;
        let records = self.applied_records()?;
        let applied: std::collections::HashSet<&str> =
            records.iter().map(|r| r.version.as_str()).collect();

        let pending: Vec<(String, String)> = artifacts
            .iter()
            .filter(|a| !applied.contains(a.version.as_str()))
            .map(|a| (a.version.clone(), a.name.clone()))
            .collect();

        Ok(MigrationStatus {
            total: artifacts.len(),
            applied: artifacts.len() - pending.len(),
            pending,
            last_applied_at: records.iter().map(|r| r.applied_at).max(),
            environment: self.environment.clone(),
        })
    }

    /// Applies every pending artifact in version order. Each artifact runs
    /// in its own transaction together with its tracking row; the first
    /// failure rolls that artifact back and stops the run. Running twice on
    /// a settled environment is a no-op.
    pub fn apply(&self) -> Result<ApplyReport, MigrationError> {
        self.ensure_migrations_table()?;

        let pending = self.pending()?;
        if pending.is_empty() {
            tracing::info!("✅ No pending migrations for {}", self.environment);
            return Ok(ApplyReport::default());
        }

        tracing::info!(
            "🚀 Applying {} pending migrations to {}",
            pending.len(),
            self.environment
        );

        let mut report = ApplyReport::default();
        for artifact in pending {
            match self.apply_one(&artifact) {
                Ok(outcome) => {
                    tracing::info!(
                        "✅ Applied migration {}: {} ({}ms)",
                        outcome.version,
                        outcome.name,
                        outcome.execution_time_ms
                    );
                    report.applied.push(outcome);
                }
                Err(e) => {
                    tracing::error!("❌ Migration {} failed: {e}", artifact.version);
                    report.failed = Some(FailedMigration {
                        version: artifact.version,
                        name: artifact.name,
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        Ok(report)
    }

    fn apply_one(&self, artifact: &MigrationArtifact) -> Result<MigrationOutcome, MigrationError> {
        let mut conn = get_connection()?;
        // The artifact convention wraps UP in BEGIN/COMMIT; those markers
        // are stripped so the statements join this transaction and commit
        // (or roll back) together with the tracking row.
        let up_sql = strip_transaction_markers(&artifact.up_sql);
        let started = Instant::now();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            conn.batch_execute(&up_sql)?;

            let record = NewMigrationRecord {
                version: &artifact.version,
                name: &artifact.name,
                checksum: &artifact.checksum,
                applied_by: APPLIED_BY,
                environment: &self.environment,
                execution_time_ms: started.elapsed().as_millis() as i32,
            };
            diesel::insert_into(schema_migrations::table)
                .values(&record)
                .execute(conn)?;

            Ok(())
        })
        .map_err(crate::db::error::RepositoryError::from)?;

        Ok(MigrationOutcome {
            version: artifact.version.clone(),
            name: artifact.name.clone(),
            execution_time_ms: started.elapsed().as_millis() as i32,
        })
    }

    /// Compares recorded checksums against the artifacts on disk. A drifted
    /// or missing file is a validation failure; it never triggers
    /// reapplication.
    pub fn verify_checksums(&self) -> Result<Vec<ChecksumMismatch>, MigrationError> {
        let artifacts = self.load_artifacts()?;
        let records = self.applied_records()?;

        let mut mismatches = Vec::new();
        for record in records {
            let on_disk = artifacts
                .iter()
                .find(|a| a.version == record.version)
                .map(|a| a.checksum.clone());

            match &on_disk {
                Some(actual) if *actual == record.checksum => {}
                _ => mismatches.push(ChecksumMismatch {
                    version: record.version,
                    recorded: record.checksum,
                    on_disk,
                }),
            }
        }

        Ok(mismatches)
    }

    /// Checks that every table the service depends on exists. Column-level
    /// drift is the schema validator's job.
    pub fn validate_required_tables(&self) -> Result<Vec<String>, MigrationError> {
        use diesel::sql_types::Text;

        #[derive(QueryableByName)]
        struct TableRow {
            #[diesel(sql_type = Text)]
            table_name: String,
        }

        let mut conn = get_connection()?;
        let rows: Vec<TableRow> = diesel::sql_query(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE'",
        )
        .load(&mut conn)
        .map_err(crate::db::error::RepositoryError::from)?;

        let existing: std::collections::HashSet<String> =
            rows.into_iter().map(|r| r.table_name).collect();

        let missing = REQUIRED_TABLES
            .iter()
            .filter(|t| !existing.contains(**t))
            .map(|t| (*t).to_string())
            .collect();

        Ok(missing)
    }

    /// Renders a fresh artifact from the template and writes it to the
    /// migrations directory. The version is a UTC `YYYYMMDDHHMMSS` stamp.
    pub fn create(&self, name: &str) -> Result<(PathBuf, String), MigrationError> {
        let (filename, content) = self.render_new_artifact(name)?;

        fs::create_dir_all(&self.migrations_dir)?;
        let path = self.migrations_dir.join(filename);
        fs::write(&path, &content)?;

        Ok((path, content))
    }

    /// Template rendering without the filesystem write; backs `--dry-run`.
    pub fn render_new_artifact(&self, name: &str) -> Result<(String, String), MigrationError> {
        let name = sanitize_name(name)?;
        let version = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let filename = format!("{version}_{name}.sql");
        let content = artifact_template(&version, &name);

        Ok((filename, content))
    }
}

pub const REQUIRED_TABLES: [&str; 8] = [
    "users",
    "sessions",
    "login_attempts",
    "user_preferences",
    "user_activities",
    "user_notifications",
    "password_resets",
    "schema_migrations",
];

pub fn checksum(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

fn parse_artifact(path: &Path) -> Result<MigrationArtifact, MigrationError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MigrationError::InvalidArtifact(path.display().to_string()))?;

    let stem = file_name.trim_end_matches(".sql");
    let (version, name) = stem.split_once('_').ok_or_else(|| {
        MigrationError::InvalidArtifact(format!("{file_name}: expected <version>_<name>.sql"))
    })?;

    if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit()) {
        return Err(MigrationError::InvalidArtifact(format!(
            "{file_name}: version prefix must be numeric"
        )));
    }
    if name.is_empty() {
        return Err(MigrationError::InvalidArtifact(format!(
            "{file_name}: missing migration name"
        )));
    }

    let bytes = fs::read(path)?;
    let content = String::from_utf8(bytes.clone())
        .map_err(|_| MigrationError::InvalidArtifact(format!("{file_name}: not valid UTF-8")))?;
    let (up_sql, down_sql) = split_regions(&content);

    Ok(MigrationArtifact {
        version: version.to_string(),
        name: name.to_string(),
        path: path.to_path_buf(),
        checksum: checksum(&bytes),
        up_sql,
        down_sql,
    })
}

/// Splits artifact content into UP and DOWN regions. The DOWN region opens
/// at the first line starting with one of the rollback markers.
fn split_regions(content: &str) -> (String, String) {
    let mut up_lines = Vec::new();
    let mut down_lines = Vec::new();
    let mut in_down = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if !in_down && DOWN_MARKERS.iter().any(|m| trimmed.starts_with(m)) {
            in_down = true;
            continue;
        }
        if in_down {
            down_lines.push(line);
        } else {
            up_lines.push(line);
        }
    }

    (
        up_lines.join("\n").trim().to_string(),
        down_lines.join("\n").trim().to_string(),
    )
}

/// Drops the conventional outer `BEGIN;`/`COMMIT;` pair so the region can
/// run inside the runner's own transaction. Inner statements are untouched.
fn strip_transaction_markers(up_sql: &str) -> String {
    let lines: Vec<&str> = up_sql.lines().collect();

    let first = lines
        .iter()
        .position(|l| !l.trim().is_empty() && !l.trim_start().starts_with("--"));
    let last = lines
        .iter()
        .rposition(|l| !l.trim().is_empty() && !l.trim_start().starts_with("--"));

    let (Some(first), Some(last)) = (first, last) else {
        return up_sql.to_string();
    };

    let mut start = 0;
    let mut end = lines.len();
    if lines[first].trim().eq_ignore_ascii_case("BEGIN;") {
        start = first + 1;
    }
    if last >= start && lines[last].trim().eq_ignore_ascii_case("COMMIT;") {
        end = last;
    }

    lines[start..end].join("\n").trim().to_string()
}

fn sanitize_name(name: &str) -> Result<String, MigrationError> {
    let name = name.trim().to_lowercase().replace([' ', '-'], "_");
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(MigrationError::InvalidArtifact(format!(
            "Migration name must be snake_case alphanumeric, got '{name}'"
        )));
    }
    Ok(name)
}

fn artifact_template(version: &str, name: &str) -> String {
    format!(
        r#"-- ==========================================
-- Migration: {version}_{name}.sql
-- ==========================================

BEGIN;

-- Add your schema changes here
-- Example:
-- ALTER TABLE users ADD COLUMN new_field VARCHAR(255);
-- CREATE INDEX idx_users_new_field ON users(new_field);

COMMIT;

-- ==========================================
-- DOWN MIGRATION
-- ==========================================
-- To roll this migration back, run the statements below manually and
-- delete the tracking row from schema_migrations.
--
-- BEGIN;
-- -- Reverse the changes above
-- COMMIT;
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_64_hex_and_content_addressed() {
        let a = checksum(b"CREATE TABLE t (id INT);");
        let b = checksum(b"CREATE TABLE t (id INT);");
        let c = checksum(b"CREATE TABLE t (id BIGINT);");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn split_regions_honors_both_markers() {
        let content = "CREATE TABLE a (id INT);\n-- DOWN MIGRATION\nDROP TABLE a;";
        let (up, down) = split_regions(content);
        assert_eq!(up, "CREATE TABLE a (id INT);");
        assert_eq!(down, "DROP TABLE a;");

        let content = "CREATE TABLE b (id INT);\n-- ROLLBACK\nDROP TABLE b;";
        let (up, down) = split_regions(content);
        assert_eq!(up, "CREATE TABLE b (id INT);");
        assert_eq!(down, "DROP TABLE b;");
    }

    #[test]
    fn split_regions_without_down_leaves_it_empty() {
        let (up, down) = split_regions("CREATE TABLE c (id INT);\n");
        assert_eq!(up, "CREATE TABLE c (id INT);");
        assert!(down.is_empty());
    }

    #[test]
    fn strip_markers_removes_only_the_outer_pair() {
        let sql = "-- header\nBEGIN;\nCREATE TABLE t (id INT);\nCOMMIT;";
        assert_eq!(strip_transaction_markers(sql), "CREATE TABLE t (id INT);");

        // No markers: content is untouched.
        let bare = "CREATE TABLE t (id INT);";
        assert_eq!(strip_transaction_markers(bare), bare);

        // Lowercase convention works too.
        let lower = "begin;\nSELECT 1;\ncommit;";
        assert_eq!(strip_transaction_markers(lower), "SELECT 1;");
    }

    #[test]
    fn artifacts_sort_by_version_string() {
        let dir = std::env::temp_dir().join(format!("authd_mig_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("002_second.sql"), "SELECT 2;").unwrap();
        fs::write(dir.join("001_first.sql"), "SELECT 1;").unwrap();
        fs::write(dir.join("20240101120000_stamped.sql"), "SELECT 3;").unwrap();
        fs::write(dir.join("README.md"), "not a migration").unwrap();
        fs::write(dir.join("nounderscore.sql"), "SELECT 4;").unwrap();

        let runner = MigrationRunner::new(&dir, "test");
        let artifacts = runner.load_artifacts().unwrap();

        let versions: Vec<&str> = artifacts.iter().map(|a| a.version.as_str()).collect();
        assert_eq!(versions, vec!["001", "002", "20240101120000"]);
        assert_eq!(artifacts[0].name, "first");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_fatal() {
        let runner = MigrationRunner::new("/nonexistent/authd/migrations", "test");
        assert!(matches!(
            runner.load_artifacts(),
            Err(MigrationError::MissingDirectory(_))
        ));
    }

    #[test]
    fn rendered_artifact_has_up_and_down_regions() {
        let runner = MigrationRunner::new("migrations", "development");
        let (filename, content) = runner
            .render_new_artifact("add user avatar field")
            .unwrap();

        assert!(filename.ends_with("_add_user_avatar_field.sql"));
        let version = filename.split('_').next().unwrap();
        assert_eq!(version.len(), 14, "timestamp version expected");

        let (up, down) = split_regions(&content);
        assert!(up.contains("BEGIN;"));
        assert!(up.contains("COMMIT;"));
        assert!(down.contains("BEGIN;"), "down region documents rollback");
    }

    #[test]
    fn create_rejects_hostile_names() {
        let runner = MigrationRunner::new("migrations", "development");
        assert!(runner.render_new_artifact("drop table; --").is_err());
        assert!(runner.render_new_artifact("").is_err());
        assert!(runner.render_new_artifact("Add Index").is_ok());
    }

    mod db {
        use super::*;
        use crate::db::connection::{get_connection, init_test_pool};

        fn unique_env() -> String {
            format!("test_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
        }

        fn temp_migrations(artifacts: &[(&str, &str)]) -> PathBuf {
            let dir = std::env::temp_dir().join(format!("authd_apply_{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&dir).unwrap();
            for (file, content) in artifacts {
                fs::write(dir.join(file), content).unwrap();
            }
            dir
        }

        fn cleanup(runner: &MigrationRunner, dir: &Path, tables: &[&str]) {
            let mut conn = get_connection().unwrap();
            for table in tables {
                let _ = conn.batch_execute(&format!("DROP TABLE IF EXISTS {table}"));
            }
            let _ = diesel::delete(
                schema_migrations::table
                    .filter(schema_migrations::environment.eq(runner.environment())),
            )
            .execute(&mut conn);
            let _ = fs::remove_dir_all(dir);
        }

        #[test]
        fn apply_is_idempotent_and_tracked_per_environment() {
            init_test_pool();

            let table = format!("authd_rt_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
            let dir = temp_migrations(&[
                (
                    "001_create.sql",
                    &format!("BEGIN;\nCREATE TABLE {table} (id SERIAL PRIMARY KEY);\nCOMMIT;\n-- DOWN MIGRATION\n-- DROP TABLE {table};"),
                ),
                (
                    "002_extend.sql",
                    &format!("BEGIN;\nALTER TABLE {table} ADD COLUMN label VARCHAR(50);\nCOMMIT;"),
                ),
            ]);
            let runner = MigrationRunner::new(&dir, unique_env());

            let status = runner.status().expect("status");
            assert_eq!(status.pending.len(), 2);

            let report = runner.apply().expect("apply");
            assert!(report.is_success());
            assert_eq!(report.applied.len(), 2);

            let records = runner.applied_records().expect("records");
            assert_eq!(records.len(), 2);
            assert_ne!(records[0].checksum, records[1].checksum);

            // Second run is a no-op.
            let rerun = runner.apply().expect("re-apply");
            assert!(rerun.is_success());
            assert!(rerun.applied.is_empty());

            let status = runner.status().expect("status after");
            assert_eq!(status.applied, 2);
            assert!(status.pending.is_empty());
            assert!(status.last_applied_at.is_some());

            cleanup(&runner, &dir, &[&table]);
        }

        #[test]
        fn failed_artifact_rolls_back_and_leaves_no_record() {
            init_test_pool();

            let table = format!("authd_fa_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
            let dir = temp_migrations(&[
                (
                    "001_create.sql",
                    &format!("BEGIN;\nCREATE TABLE {table} (id SERIAL PRIMARY KEY);\nCOMMIT;"),
                ),
                (
                    "002_bad.sql",
                    &format!(
                        "BEGIN;\nALTER TABLE {table} ADD COLUMN ok VARCHAR(10);\nALTER TABLE {table}_missing ADD COLUMN broken INT;\nCOMMIT;"
                    ),
                ),
            ]);
            let runner = MigrationRunner::new(&dir, unique_env());

            let report = runner.apply().expect("apply runs");
            assert_eq!(report.applied.len(), 1);
            let failed = report.failed.expect("002 must fail");
            assert_eq!(failed.version, "002");

            // Only 001 is recorded; 002 left nothing behind, including the
            // column added before the failing statement.
            let records = runner.applied_records().expect("records");
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].version, "001");

            // Fixing the file makes the next run pick it up with its new
            // checksum.
            fs::write(
                dir.join("002_bad.sql"),
                format!("BEGIN;\nALTER TABLE {table} ADD COLUMN ok VARCHAR(10);\nCOMMIT;"),
            )
            .unwrap();
            let retry = runner.apply().expect("retry");
            assert!(retry.is_success());
            assert_eq!(retry.applied.len(), 1);
            assert_eq!(retry.applied[0].version, "002");

            cleanup(&runner, &dir, &[&table]);
        }

        #[test]
        fn checksum_drift_is_reported_not_reapplied() {
            init_test_pool();

            let table = format!("authd_ck_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
            let dir = temp_migrations(&[(
                "001_create.sql",
                &format!("BEGIN;\nCREATE TABLE {table} (id SERIAL PRIMARY KEY);\nCOMMIT;"),
            )]);
            let runner = MigrationRunner::new(&dir, unique_env());

            runner.apply().expect("apply");
            assert!(runner.verify_checksums().expect("verify").is_empty());

            // Edit the applied artifact on disk.
            fs::write(
                dir.join("001_create.sql"),
                format!("BEGIN;\nCREATE TABLE {table} (id BIGSERIAL PRIMARY KEY);\nCOMMIT;"),
            )
            .unwrap();

            let mismatches = runner.verify_checksums().expect("verify");
            assert_eq!(mismatches.len(), 1);
            assert_eq!(mismatches[0].version, "001");
            assert!(mismatches[0].on_disk.is_some());

            // Drift never re-queues the artifact.
            let rerun = runner.apply().expect("apply after drift");
            assert!(rerun.applied.is_empty());

            cleanup(&runner, &dir, &[&table]);
        }
    }
}
