use aide::OperationInput;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization, Cookie};

use crate::{
    database::{AppState, DatabaseConnection},
    error::{ServiceError, ServiceResult},
    models::{Session, ROLE_STAFF},
    SESSION_COOKIE_NAME,
};

/// Minimal role a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any logged in account.
    Session,
    /// Staff members and admins.
    Staff,
    Admin,
}

impl Access {
    pub fn grants(self, session: &Session) -> bool {
        match self {
            Access::Session => true,
            Access::Staff => session.is_admin() || session.role.name == ROLE_STAFF,
            Access::Admin => session.is_admin(),
        }
    }
}

/// Per request database connection and the session of the caller, if any.
pub struct RequestState {
    pub db: DatabaseConnection,
    pub session: Option<Session>,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestState
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let mut db = state.connection().await?;

        let session_token = if let Ok(TypedHeader(Authorization(bearer))) =
            parts.extract::<TypedHeader<Authorization<Bearer>>>().await
        {
            Some(bearer.token().to_owned())
        } else if let Ok(TypedHeader(cookie)) = parts.extract::<TypedHeader<Cookie>>().await {
            cookie.get(SESSION_COOKIE_NAME).map(|token| token.to_owned())
        } else {
            None
        };

        let session = match session_token {
            Some(token) => db.get_session_by_session_token(token).await?,
            None => None,
        };

        Ok(Self { db, session })
    }
}

impl OperationInput for RequestState {}

impl RequestState {
    pub fn session_require(&self) -> ServiceResult<Session> {
        self.session
            .clone()
            .ok_or(ServiceError::Unauthorized("Missing login!"))
    }

    pub fn session_require_access(&self, access: Access) -> ServiceResult<Session> {
        let session = self.session_require()?;
        if access.grants(&session) {
            Ok(session)
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    pub fn session_require_admin(&self) -> ServiceResult<Session> {
        self.session_require_access(Access::Admin)
    }

    /// Allows admins and the owner of `account_id`.
    pub fn session_require_admin_or_self(&self, account_id: u64) -> ServiceResult<Session> {
        let session = self.session_require()?;
        if session.is_admin() || session.account.id == account_id {
            Ok(session)
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Account, Role, ROLE_ADMIN, ROLE_USER};

    fn session(role: &str) -> Session {
        Session {
            account: Account {
                id: 7,
                username: "jdoe".to_owned(),
                email: "jdoe@example.org".to_owned(),
                password: String::new(),
                role_id: 1,
                avatar_id: None,
            },
            role: Role {
                id: 1,
                name: role.to_owned(),
                description: String::new(),
            },
            token: "token".to_owned(),
            valid_until: Utc::now(),
        }
    }

    #[test]
    fn test_access_levels() {
        let admin = session(ROLE_ADMIN);
        let staff = session(ROLE_STAFF);
        let user = session(ROLE_USER);

        assert!(Access::Admin.grants(&admin));
        assert!(Access::Staff.grants(&admin));
        assert!(Access::Staff.grants(&staff));
        assert!(!Access::Admin.grants(&staff));
        assert!(!Access::Staff.grants(&user));
        assert!(Access::Session.grants(&user));
    }
}
