use log::{info, warn};

use crate::error::ServiceResult;
use crate::models::{Role, ROLE_ADMIN, ROLE_STAFF, ROLE_USER};

use super::filter::Where;
use super::schema::{AccountCreate, RoleCreate};
use super::DatabaseConnection;

const DEFAULT_ROLES: [(&str, &str); 3] = [
    (ROLE_ADMIN, "Full access to all administrative data"),
    (ROLE_STAFF, "Hospital staff, eg. doctors and nurses"),
    (ROLE_USER, "Registered patient"),
];

const ADMIN_USERNAME: &str = "admin";

impl DatabaseConnection {
    async fn ensure_role(&mut self, name: &str, description: &str) -> ServiceResult<Role> {
        if let Some(role) = self.roles().find_by_name(name).await? {
            return Ok(role);
        }

        info!("Create missing role '{}'", name);
        self.roles()
            .create(RoleCreate {
                name: name.to_owned(),
                description: description.to_owned(),
            })
            .await
    }

    /// Creates the default roles and, on an empty database, the initial admin account.
    ///
    /// `admin_password` is the already hashed password of the admin account.
    pub async fn bootstrap(
        &mut self,
        admin_password: Option<String>,
        admin_email: &str,
    ) -> ServiceResult<()> {
        let mut admin_role = None;
        for (name, description) in DEFAULT_ROLES {
            let role = self.ensure_role(name, description).await?;
            if name == ROLE_ADMIN {
                admin_role = Some(role);
            }
        }

        let accounts = self.accounts().count(&Where::new(Default::default())).await?;
        if accounts > 0 {
            return Ok(());
        }

        let (Some(password), Some(role)) = (admin_password, admin_role) else {
            warn!("Database contains no account, set ADMIN_PASSWORD to create an admin account");
            return Ok(());
        };

        self.accounts()
            .create(AccountCreate {
                username: ADMIN_USERNAME.to_owned(),
                email: admin_email.to_owned(),
                password,
                role_id: role.id,
                avatar_id: None,
            })
            .await?;
        info!("Admin account '{}' was successfully created!", ADMIN_USERNAME);

        Ok(())
    }
}
