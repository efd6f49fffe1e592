//! Relation loading and many-to-many link maintenance.
use sqlx::{PgConnection, Row};

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Account, Appointment, Attachment, Department, MedicalRoom, Position, Role, ShiftWorking, Staff,
    User,
};

use super::delegate::FindManyArgs;
use super::filter::{id_from_db, id_to_db, IdFilter, Where};
use super::schema::{
    AccountCreate, AppointmentFilter, DepartmentFilter, MedicalRoomFilter, PositionFilter,
    ShiftWorkingFilter, StaffCreate, StaffFilter, UserCreate,
};
use super::{begin_transaction, delegate, DatabaseConnection, TransactionIsolationLevel};

#[derive(Debug, PartialEq, Clone)]
pub struct AccountDetails {
    pub account: Account,
    pub role: Role,
    pub avatar: Option<Attachment>,
    pub staff: Option<Staff>,
    pub user: Option<User>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct StaffDetails {
    pub staff: Staff,
    pub account: Account,
    pub positions: Vec<Position>,
    pub departments: Vec<Department>,
    pub shifts: Vec<ShiftWorking>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct UserDetails {
    pub user: User,
    pub account: Account,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DepartmentDetails {
    pub department: Department,
    pub rooms: Vec<MedicalRoom>,
    pub staff: Vec<Staff>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MedicalRoomDetails {
    pub room: MedicalRoom,
    pub department: Department,
    pub shifts: Vec<ShiftWorking>,
    pub appointments: Vec<Appointment>,
}

fn id_in(ids: Vec<u64>) -> Option<IdFilter> {
    Some(IdFilter {
        in_list: Some(ids),
        ..Default::default()
    })
}

fn id_equals(id: u64) -> Option<IdFilter> {
    Some(IdFilter::equals(id))
}

fn missing_relation(model: &str, id: u64, relation: &str, relation_id: u64) -> ServiceError {
    ServiceError::InternalServerError(format!(
        "{} {} references missing {} {}",
        model, id, relation, relation_id
    ))
}

async fn linked_ids(
    connection: &mut PgConnection,
    sql: &'static str,
    id: u64,
) -> ServiceResult<Vec<u64>> {
    let rows = sqlx::query(sql)
        .bind(id_to_db(id))
        .fetch_all(&mut *connection)
        .await?;

    rows.iter()
        .map(|row| row.try_get::<i64, _>(0).map(id_from_db))
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
}

async fn replace_links(
    connection: &mut PgConnection,
    table: &'static str,
    column: &'static str,
    staff_id: u64,
    ids: &[u64],
) -> ServiceResult<()> {
    let mut tx = begin_transaction(connection, TransactionIsolationLevel::ReadCommitted).await?;

    if delegate::<Staff>(&mut tx).find_unique(staff_id).await?.is_none() {
        return Err(ServiceError::NotFound);
    }

    sqlx::query(&format!("DELETE FROM {} WHERE staff_id = $1", table))
        .bind(id_to_db(staff_id))
        .execute(&mut *tx)
        .await?;

    let ids: Vec<i64> = ids.iter().copied().map(id_to_db).collect();
    sqlx::query(&format!(
        "INSERT INTO {} (staff_id, {}) SELECT $1, unnest($2::BIGINT[]) ON CONFLICT DO NOTHING",
        table, column
    ))
    .bind(id_to_db(staff_id))
    .bind(ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

impl DatabaseConnection {
    pub async fn get_staff_positions(&mut self, staff_id: u64) -> ServiceResult<Vec<Position>> {
        let ids = linked_ids(
            &mut self.connection,
            "SELECT position_id FROM staff_positions WHERE staff_id = $1",
            staff_id,
        )
        .await?;

        self.positions()
            .find_many(FindManyArgs::filtered(Where::new(PositionFilter {
                id: id_in(ids),
                ..Default::default()
            })))
            .await
    }

    pub async fn get_staff_departments(&mut self, staff_id: u64) -> ServiceResult<Vec<Department>> {
        let ids = linked_ids(
            &mut self.connection,
            "SELECT department_id FROM staff_departments WHERE staff_id = $1",
            staff_id,
        )
        .await?;

        self.departments()
            .find_many(FindManyArgs::filtered(Where::new(DepartmentFilter {
                id: id_in(ids),
                ..Default::default()
            })))
            .await
    }

    pub async fn get_department_staff(&mut self, department_id: u64) -> ServiceResult<Vec<Staff>> {
        let ids = linked_ids(
            &mut self.connection,
            "SELECT staff_id FROM staff_departments WHERE department_id = $1",
            department_id,
        )
        .await?;

        self.staff()
            .find_many(FindManyArgs::filtered(Where::new(StaffFilter {
                id: id_in(ids),
                ..Default::default()
            })))
            .await
    }

    pub async fn get_position_staff(&mut self, position_id: u64) -> ServiceResult<Vec<Staff>> {
        let ids = linked_ids(
            &mut self.connection,
            "SELECT staff_id FROM staff_positions WHERE position_id = $1",
            position_id,
        )
        .await?;

        self.staff()
            .find_many(FindManyArgs::filtered(Where::new(StaffFilter {
                id: id_in(ids),
                ..Default::default()
            })))
            .await
    }

    /// Replaces all positions of a staff member.
    pub async fn set_staff_positions(
        &mut self,
        staff_id: u64,
        position_ids: &[u64],
    ) -> ServiceResult<Vec<Position>> {
        replace_links(
            &mut self.connection,
            "staff_positions",
            "position_id",
            staff_id,
            position_ids,
        )
        .await?;
        self.get_staff_positions(staff_id).await
    }

    /// Replaces all departments of a staff member.
    pub async fn set_staff_departments(
        &mut self,
        staff_id: u64,
        department_ids: &[u64],
    ) -> ServiceResult<Vec<Department>> {
        replace_links(
            &mut self.connection,
            "staff_departments",
            "department_id",
            staff_id,
            department_ids,
        )
        .await?;
        self.get_staff_departments(staff_id).await
    }

    /// Creates the staff profile of an account that is not a user yet.
    pub async fn create_staff(&mut self, data: StaffCreate) -> ServiceResult<Staff> {
        let mut tx =
            begin_transaction(&mut self.connection, TransactionIsolationLevel::ReadCommitted)
                .await?;
        lock_account(&mut tx, data.account_id).await?;

        if delegate::<User>(&mut tx)
            .find_by_account(data.account_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Account {} is already registered as user",
                data.account_id
            )));
        }

        let staff = delegate::<Staff>(&mut tx).create(data).await?;
        tx.commit().await?;
        Ok(staff)
    }

    /// Creates the user profile of an account that is not a staff member yet.
    pub async fn create_user(&mut self, data: UserCreate) -> ServiceResult<User> {
        let mut tx =
            begin_transaction(&mut self.connection, TransactionIsolationLevel::ReadCommitted)
                .await?;
        lock_account(&mut tx, data.account_id).await?;

        if delegate::<Staff>(&mut tx)
            .find_by_account(data.account_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Account {} is already registered as staff",
                data.account_id
            )));
        }

        let user = delegate::<User>(&mut tx).create(data).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Creates an account together with its user profile.
    pub async fn register_user(
        &mut self,
        account: AccountCreate,
        firstname: String,
        lastname: String,
        phone_number: String,
    ) -> ServiceResult<(Account, User)> {
        let mut tx =
            begin_transaction(&mut self.connection, TransactionIsolationLevel::ReadCommitted)
                .await?;

        let account = delegate::<Account>(&mut tx).create(account).await?;
        let user = delegate::<User>(&mut tx)
            .create(UserCreate {
                firstname,
                lastname,
                phone_number,
                account_id: account.id,
            })
            .await?;

        tx.commit().await?;
        Ok((account, user))
    }

    pub async fn get_account_details(&mut self, id: u64) -> ServiceResult<Option<AccountDetails>> {
        let Some(account) = self.accounts().find_unique(id).await? else {
            return Ok(None);
        };

        let role = self
            .roles()
            .find_unique(account.role_id)
            .await?
            .ok_or_else(|| missing_relation("Account", id, "role", account.role_id))?;
        let avatar = match account.avatar_id {
            Some(avatar_id) => self.attachments().find_unique(avatar_id).await?,
            None => None,
        };
        let staff = self.staff().find_by_account(id).await?;
        let user = self.users().find_by_account(id).await?;

        Ok(Some(AccountDetails {
            account,
            role,
            avatar,
            staff,
            user,
        }))
    }

    pub async fn get_staff_details(&mut self, id: u64) -> ServiceResult<Option<StaffDetails>> {
        let Some(staff) = self.staff().find_unique(id).await? else {
            return Ok(None);
        };

        let account = self
            .accounts()
            .find_unique(staff.account_id)
            .await?
            .ok_or_else(|| missing_relation("Staff", id, "account", staff.account_id))?;
        let positions = self.get_staff_positions(id).await?;
        let departments = self.get_staff_departments(id).await?;
        let shifts = self
            .shift_workings()
            .find_many(FindManyArgs::filtered(Where::new(ShiftWorkingFilter {
                doctor_id: id_equals(id),
                ..Default::default()
            })))
            .await?;

        Ok(Some(StaffDetails {
            staff,
            account,
            positions,
            departments,
            shifts,
        }))
    }

    pub async fn get_user_details(&mut self, id: u64) -> ServiceResult<Option<UserDetails>> {
        let Some(user) = self.users().find_unique(id).await? else {
            return Ok(None);
        };

        let account = self
            .accounts()
            .find_unique(user.account_id)
            .await?
            .ok_or_else(|| missing_relation("User", id, "account", user.account_id))?;
        let appointments = self
            .appointments()
            .find_many(FindManyArgs::filtered(Where::new(AppointmentFilter {
                user_id: id_equals(id),
                ..Default::default()
            })))
            .await?;

        Ok(Some(UserDetails {
            user,
            account,
            appointments,
        }))
    }

    pub async fn get_department_details(
        &mut self,
        id: u64,
    ) -> ServiceResult<Option<DepartmentDetails>> {
        let Some(department) = self.departments().find_unique(id).await? else {
            return Ok(None);
        };

        let rooms = self
            .medical_rooms()
            .find_many(FindManyArgs::filtered(Where::new(MedicalRoomFilter {
                department_id: id_equals(id),
                ..Default::default()
            })))
            .await?;
        let staff = self.get_department_staff(id).await?;

        Ok(Some(DepartmentDetails {
            department,
            rooms,
            staff,
        }))
    }

    pub async fn get_medical_room_details(
        &mut self,
        id: u64,
    ) -> ServiceResult<Option<MedicalRoomDetails>> {
        let Some(room) = self.medical_rooms().find_unique(id).await? else {
            return Ok(None);
        };

        let department = self
            .departments()
            .find_unique(room.department_id)
            .await?
            .ok_or_else(|| missing_relation("MedicalRoom", id, "department", room.department_id))?;
        let shifts = self
            .shift_workings()
            .find_many(FindManyArgs::filtered(Where::new(ShiftWorkingFilter {
                room_id: id_equals(id),
                ..Default::default()
            })))
            .await?;
        let appointments = self
            .appointments()
            .find_many(FindManyArgs::filtered(Where::new(AppointmentFilter {
                room_id: id_equals(id),
                ..Default::default()
            })))
            .await?;

        Ok(Some(MedicalRoomDetails {
            room,
            department,
            shifts,
            appointments,
        }))
    }
}

/// Serializes concurrent specialisations of the same account.
async fn lock_account(connection: &mut PgConnection, account_id: u64) -> ServiceResult<()> {
    sqlx::query("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
        .bind(id_to_db(account_id))
        .fetch_optional(&mut *connection)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(())
}
