//! Operator CLI for the migration-first schema manager.
//!
//! ```text
//! migrate status
//! migrate migrate --dry-run
//! migrate validate --verbose
//! migrate create add_user_avatar_field
//! migrate status --env production
//! ```

use authd::config::{Config, Environment};
use authd::db::connection::init_pool_with_url;
use authd::migrate::runner::MigrationRunner;
use authd::migrate::validator::SchemaValidator;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "migrate",
    about = "Migration-first schema management for authd",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Environment (development, test, production)
    #[arg(long, global = true, default_value = "development")]
    env: String,

    /// Migrations directory
    #[arg(long, global = true, default_value = "migrations")]
    dir: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show applied and pending migrations
    Status,
    /// Apply pending migrations
    Migrate {
        /// Show what would run without executing
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate schema consistency (checksums, tables, columns, constraints)
    Validate,
    /// Create a new migration artifact from the template
    Create {
        /// Migration name (snake_case)
        name: String,
        /// Render the template without writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Roll back the last migration (reserved)
    Rollback {
        /// Force the operation (use with caution)
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let environment: Environment = match cli.env.parse() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    let runner = MigrationRunner::new(&cli.dir, environment.as_str());

    // `create --dry-run` is the only path that never touches the database.
    if let Command::Create {
        name,
        dry_run: true,
    } = &cli.command
    {
        return handle_create_dry_run(&runner, name);
    }

    let database_url = match Config::database_url_from_env(environment) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_pool_with_url(&database_url) {
        eprintln!("❌ Failed to connect to database: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Status => handle_status(&runner),
        Command::Migrate { dry_run } => handle_migrate(&runner, dry_run),
        Command::Validate => handle_validate(&runner, cli.verbose),
        Command::Create { name, .. } => handle_create(&runner, &name),
        Command::Rollback { force } => handle_rollback(force),
    }
}

fn handle_status(runner: &MigrationRunner) -> ExitCode {
    let status = match runner.status() {
        Ok(status) => status,
        Err(e) => {
            eprintln!("❌ Failed to read migration status: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "📊 Migration status for {} environment:",
        status.environment
    );
    println!("   Total migrations: {}", status.total);
    println!("   Applied: {}", status.applied);
    println!("   Pending: {}", status.pending.len());
    if let Some(last) = status.last_applied_at {
        println!("   Last applied at: {last}");
    }

    if status.pending.is_empty() {
        println!("\n✅ Database is up to date");
    } else {
        println!("\nPending migrations:");
        for (version, name) in &status.pending {
            println!("   - {version}: {name}");
        }
        println!("\nRun 'migrate migrate' to apply them");
    }

    ExitCode::SUCCESS
}

fn handle_migrate(runner: &MigrationRunner, dry_run: bool) -> ExitCode {
    if dry_run {
        println!("🔍 DRY RUN: showing what would be migrated...");
        if let Err(e) = runner.ensure_migrations_table() {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
        let pending = match runner.pending() {
            Ok(pending) => pending,
            Err(e) => {
                eprintln!("❌ Failed to list pending migrations: {e}");
                return ExitCode::FAILURE;
            }
        };

        if pending.is_empty() {
            println!("✅ No pending migrations");
        } else {
            println!("Would apply {} migrations:", pending.len());
            for artifact in pending {
                println!("   - {}: {}", artifact.version, artifact.name);
            }
            println!("\nRun without --dry-run to apply them");
        }
        return ExitCode::SUCCESS;
    }

    println!("🚀 Applying pending migrations...");
    let report = match runner.apply() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Migration run failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    for outcome in &report.applied {
        println!(
            "   ✅ {}: {} ({}ms)",
            outcome.version, outcome.name, outcome.execution_time_ms
        );
    }

    match report.failed {
        None => {
            if report.applied.is_empty() {
                println!("✅ No pending migrations to apply");
            } else {
                println!("\n🎉 Successfully applied {} migrations", report.applied.len());
            }
            ExitCode::SUCCESS
        }
        Some(failed) => {
            eprintln!(
                "\n❌ Migration {} ({}) failed and was rolled back: {}",
                failed.version, failed.name, failed.error
            );
            ExitCode::FAILURE
        }
    }
}

fn handle_validate(runner: &MigrationRunner, verbose: bool) -> ExitCode {
    println!("🔍 Validating database schema...");
    let mut failed = false;

    match runner.verify_checksums() {
        Ok(mismatches) if mismatches.is_empty() => {}
        Ok(mismatches) => {
            failed = true;
            println!("\n❌ Checksum mismatches (applied artifacts changed on disk):");
            for m in mismatches {
                match m.on_disk {
                    Some(actual) => println!(
                        "   - {}: recorded {}, on disk {}",
                        m.version, m.recorded, actual
                    ),
                    None => println!("   - {}: artifact missing from disk", m.version),
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Checksum verification failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    match runner.validate_required_tables() {
        Ok(missing) if missing.is_empty() => {}
        Ok(missing) => {
            failed = true;
            println!("\n❌ Missing required tables: {}", missing.join(", "));
        }
        Err(e) => {
            eprintln!("❌ Table inventory failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    let results = match SchemaValidator::validate_all() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("❌ Schema validation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("\n📋 Schema validation results:");
    for result in &results {
        let status = if result.is_valid { "✅" } else { "❌" };
        println!("{status} {}", result.table_name);
        if !result.is_valid {
            failed = true;
        }
    }

    if verbose {
        println!("\n{}", SchemaValidator::render_report(&results));
    }

    if failed {
        println!("\n⚠️  Schema issues found; use --verbose for details");
        ExitCode::FAILURE
    } else {
        println!("\n✅ All tables have valid schemas");
        ExitCode::SUCCESS
    }
}

fn handle_create(runner: &MigrationRunner, name: &str) -> ExitCode {
    match runner.create(name) {
        Ok((path, _)) => {
            println!("✅ Created migration file: {}", path.display());
            println!("\nNext steps:");
            println!("1. Edit the migration file to add your schema changes");
            println!("2. Preview with 'migrate migrate --dry-run'");
            println!("3. Apply with 'migrate migrate'");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Failed to create migration: {e}");
            ExitCode::FAILURE
        }
    }
}

fn handle_create_dry_run(runner: &MigrationRunner, name: &str) -> ExitCode {
    match runner.render_new_artifact(name) {
        Ok((filename, content)) => {
            println!("🔍 DRY RUN: would create migration file: {filename}");
            println!("\nTemplate content:\n{content}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn handle_rollback(force: bool) -> ExitCode {
    println!("🔄 Rollback is reserved and not implemented yet");

    if !force {
        println!("\nManual rollback procedure:");
        println!("1. Review the DOWN region of the migration artifact");
        println!("2. Execute the rollback SQL manually");
        println!("3. Delete the tracking row from schema_migrations");
        return ExitCode::SUCCESS;
    }

    eprintln!("❌ Rollback not implemented; nothing was executed");
    ExitCode::FAILURE
}
