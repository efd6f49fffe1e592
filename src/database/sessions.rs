use base64::engine::general_purpose;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::Row;

use crate::error::{ServiceError, ServiceResult};
use crate::models::Session;

use super::filter::{id_from_db, id_to_db};
use super::DatabaseConnection;

const SESSION_TOKEN_BYTES: usize = 48;

pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes[..]);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl DatabaseConnection {
    pub async fn create_session_token(
        &mut self,
        account_id: u64,
        valid_until: DateTime<Utc>,
    ) -> ServiceResult<String> {
        let token = generate_session_token();

        sqlx::query("INSERT INTO sessions (token, account_id, valid_until) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(id_to_db(account_id))
            .bind(valid_until)
            .execute(&mut *self.connection)
            .await?;

        Ok(token)
    }

    /// Resolves a token to its session, expired sessions are treated as missing.
    pub async fn get_session_by_session_token(
        &mut self,
        token: String,
    ) -> ServiceResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT account_id, valid_until FROM sessions WHERE token = $1 AND valid_until > now()",
        )
        .bind(&token)
        .fetch_optional(&mut *self.connection)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let account_id = id_from_db(row.try_get("account_id")?);
        let valid_until: DateTime<Utc> = row.try_get("valid_until")?;

        let Some(account) = self.accounts().find_unique(account_id).await? else {
            return Ok(None);
        };
        let role = self
            .roles()
            .find_unique(account.role_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalServerError(format!(
                    "Account {} references missing role {}",
                    account.id, account.role_id
                ))
            })?;

        Ok(Some(Session {
            account,
            role,
            token,
            valid_until,
        }))
    }

    pub async fn delete_session_token(&mut self, token: String) -> ServiceResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&mut *self.connection)
            .await?;
        Ok(())
    }

    pub async fn delete_sessions_of_account(&mut self, account_id: u64) -> ServiceResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE account_id = $1")
            .bind(id_to_db(account_id))
            .execute(&mut *self.connection)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_expired_sessions(&mut self) -> ServiceResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE valid_until <= now()")
            .execute(&mut *self.connection)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tokens_are_unique_and_url_safe() {
        let a = generate_session_token();
        let b = generate_session_token();

        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
