//! Single-file migration format
//!
//! All migrations live in one script which is embedded into the binary and fed to the sqlx migrator.
//!
//! Every migration starts with a line comment like this:
//! ```text
//! --##1 initial schema
//! ```
//! The comment specifies the version (1) and description (initial schema).
//! Versions must be strictly increasing.
use std::{borrow::Cow, future::Future, pin::Pin};

use sqlx::{
    error::BoxDynError,
    migrate::{Migration, MigrationSource, MigrationType},
};

const HEADER_PREFIX: &str = "--##";

#[derive(Debug)]
pub struct MigrationScript<'s> {
    data: &'s str,
}

struct PendingMigration {
    version: i64,
    description: String,
    sql: String,
}

fn parse_migrations(data: &str) -> Result<Vec<PendingMigration>, String> {
    let mut result: Vec<PendingMigration> = Vec::new();

    for line in data.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix(HEADER_PREFIX) {
            let (version_str, description) = header.split_once(' ').unwrap_or((header, ""));
            let version: i64 = version_str.parse().map_err(|e| {
                format!(
                    "cannot parse version of migration as int, got string '{}', error: {}",
                    version_str, e
                )
            })?;

            if let Some(previous) = result.last() {
                if previous.version >= version {
                    return Err(format!(
                        "migration versions must increase, got {} after {}",
                        version, previous.version
                    ));
                }
            }

            result.push(PendingMigration {
                version,
                description: description.trim().to_owned(),
                sql: String::new(),
            });
            continue;
        }

        match result.last_mut() {
            Some(migration) => {
                migration.sql.push_str(line);
                migration.sql.push('\n');
            }
            // comments before the first header
            None if line.starts_with("--") => continue,
            None => {
                return Err(format!(
                    "migration script does not start with migration header, got: {}",
                    line
                ))
            }
        }
    }

    Ok(result)
}

impl<'s> MigrationSource<'s> for MigrationScript<'s> {
    fn resolve(
        self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Migration>, BoxDynError>> + Send + 's>> {
        Box::pin(async move {
            let migrations = parse_migrations(self.data)?
                .into_iter()
                .map(|m| {
                    Migration::new(
                        m.version,
                        Cow::Owned(m.description),
                        MigrationType::Simple,
                        Cow::Owned(m.sql),
                    )
                })
                .collect();
            Ok(migrations)
        })
    }
}

pub fn postgresql_migrations() -> MigrationScript<'static> {
    MigrationScript {
        data: include_str!("./sql/migrations.pg.sql"),
    }
}
