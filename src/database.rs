use log::info;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::migrate::Migrator;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, Pool, Postgres, Transaction};

use crate::env;
use crate::error::ServiceResult;
use crate::models::{
    Account, Appointment, Attachment, Department, MedicalRoom, Position, Role, ShiftWorking, Staff,
    User,
};

mod bootstrap;
pub mod delegate;
pub mod filter;
mod migration;
pub mod relations;
pub mod schema;
mod sessions;

#[cfg(test)]
mod tests;

pub use delegate::{Delegate, Model};

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

impl AppState {
    pub async fn connect(url: &str) -> ServiceResult<AppState> {
        let pool = PgPoolOptions::new()
            .max_connections(*env::DATABASE_MAX_CONNECTIONS)
            .connect(url)
            .await?;

        AppState::from_pool(pool).await
    }

    pub async fn from_pool(pool: Pool<Postgres>) -> ServiceResult<AppState> {
        let migrator = Migrator::new(migration::postgresql_migrations()).await?;
        migrator.run(&pool).await?;
        info!("Database migrations are up to date");

        Ok(AppState { pool })
    }

    pub async fn connection(&self) -> ServiceResult<DatabaseConnection> {
        let connection = self.pool.acquire().await?;
        Ok(DatabaseConnection { connection })
    }
}

/// Isolation level of an explicit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum TransactionIsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl TransactionIsolationLevel {
    fn set_statement(self) -> &'static str {
        match self {
            TransactionIsolationLevel::ReadUncommitted => {
                "SET TRANSACTION ISOLATION LEVEL READ UNCOMMITTED"
            }
            TransactionIsolationLevel::ReadCommitted => {
                "SET TRANSACTION ISOLATION LEVEL READ COMMITTED"
            }
            TransactionIsolationLevel::RepeatableRead => {
                "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ"
            }
            TransactionIsolationLevel::Serializable => {
                "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"
            }
        }
    }
}

/// Opens a transaction on `connection` with the given isolation level.
pub async fn begin_transaction(
    connection: &mut PgConnection,
    level: TransactionIsolationLevel,
) -> ServiceResult<Transaction<'_, Postgres>> {
    let mut tx = connection.begin().await?;
    sqlx::query(level.set_statement()).execute(&mut *tx).await?;
    Ok(tx)
}

/// Delegate for model `M` on an arbitrary connection, eg. an open transaction.
pub fn delegate<M: Model>(connection: &mut PgConnection) -> Delegate<'_, M> {
    Delegate::new(connection)
}

pub struct DatabaseConnection {
    pub connection: PoolConnection<Postgres>,
}

impl DatabaseConnection {
    pub async fn begin(
        &mut self,
        level: TransactionIsolationLevel,
    ) -> ServiceResult<Transaction<'_, Postgres>> {
        begin_transaction(&mut self.connection, level).await
    }

    pub fn attachments(&mut self) -> Delegate<'_, Attachment> {
        Delegate::new(&mut self.connection)
    }

    pub fn roles(&mut self) -> Delegate<'_, Role> {
        Delegate::new(&mut self.connection)
    }

    pub fn accounts(&mut self) -> Delegate<'_, Account> {
        Delegate::new(&mut self.connection)
    }

    pub fn positions(&mut self) -> Delegate<'_, Position> {
        Delegate::new(&mut self.connection)
    }

    pub fn departments(&mut self) -> Delegate<'_, Department> {
        Delegate::new(&mut self.connection)
    }

    pub fn medical_rooms(&mut self) -> Delegate<'_, MedicalRoom> {
        Delegate::new(&mut self.connection)
    }

    pub fn staff(&mut self) -> Delegate<'_, Staff> {
        Delegate::new(&mut self.connection)
    }

    pub fn users(&mut self) -> Delegate<'_, User> {
        Delegate::new(&mut self.connection)
    }

    pub fn shift_workings(&mut self) -> Delegate<'_, ShiftWorking> {
        Delegate::new(&mut self.connection)
    }

    pub fn appointments(&mut self) -> Delegate<'_, Appointment> {
        Delegate::new(&mut self.connection)
    }

    /// Delegate for any model, used by the generic api routes.
    pub fn model<M: Model>(&mut self) -> Delegate<'_, M> {
        Delegate::new(&mut self.connection)
    }
}

#[cfg(test)]
mod isolation_tests {
    use super::*;

    #[test]
    fn test_default_isolation_level() {
        assert_eq!(
            TransactionIsolationLevel::default(),
            TransactionIsolationLevel::ReadCommitted
        );
        assert_eq!(
            TransactionIsolationLevel::Serializable.set_statement(),
            "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"
        );
    }
}
