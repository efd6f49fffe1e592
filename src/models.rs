use chrono::{DateTime, Utc};

/// Names of the roles that are created on startup.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_USER: &str = "user";

#[derive(Debug, PartialEq, Clone)]
pub struct Attachment {
    pub id: u64,
    pub file_name: String,
    pub directory: String,
    pub length: i64,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// Location of the stored file relative to the working directory.
    pub fn path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.directory).join(&self.file_name)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Role {
    pub id: u64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Account {
    pub id: u64,
    pub username: String,
    pub email: String,
    /// Argon2 hash in the form `<salt>$<base64 hash>`, never the clear text password.
    pub password: String,
    pub role_id: u64,
    pub avatar_id: Option<u64>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Position {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Department {
    pub id: u64,
    pub symbol: String,
    pub floor: i32,
    pub name: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MedicalRoom {
    pub id: u64,
    pub floor: i32,
    pub name: String,
    pub department_id: u64,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Staff {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
    pub education_level: String,
    pub account_id: u64,
}

/// Patient facing account holder.
#[derive(Debug, PartialEq, Clone)]
pub struct User {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub account_id: u64,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ShiftWorking {
    pub id: u64,
    pub doctor_id: Option<u64>,
    pub room_id: u64,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Appointment {
    pub id: u64,
    pub patient_id: String,
    pub room_id: u64,
    pub user_id: u64,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Session {
    pub account: Account,
    pub role: Role,
    pub token: String,
    pub valid_until: DateTime<Utc>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.name == ROLE_ADMIN
    }
}
