use std::ops::Add;

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::error::ServiceError;
use crate::models::{self, Account, Department, Role};

use super::delegate::{Aggregate, FindMany, FindManyArgs, GroupBy};
use super::filter::{IdFilter, IntFilter, NumberUpdate, StringFilter, Where};
use super::schema::{
    AccountCreate, AppointmentCreate, DepartmentCreate, DepartmentFilter, DepartmentUpdate,
    MedicalRoomCreate, PositionCreate, RoleCreate, RoleUpdate, ShiftWorkingCreate,
    ShiftWorkingUpdate, StaffCreate, UserCreate,
};
use super::{AppState, DatabaseConnection};

async fn connect(pool: PgPool) -> DatabaseConnection {
    let _ = env_logger::builder().is_test(true).try_init();
    let app_state = AppState::from_pool(pool).await.unwrap();
    DatabaseConnection {
        connection: app_state.pool.acquire().await.unwrap(),
    }
}

async fn create_role(db: &mut DatabaseConnection, name: &str) -> Role {
    db.roles()
        .create(RoleCreate {
            name: name.to_owned(),
            description: format!("{} role", name),
        })
        .await
        .unwrap()
}

async fn create_account(db: &mut DatabaseConnection, username: &str, role: &Role) -> Account {
    db.accounts()
        .create(AccountCreate {
            username: username.to_owned(),
            email: format!("{}@example.org", username),
            password: "salt$hash".to_owned(),
            role_id: role.id,
            avatar_id: None,
        })
        .await
        .unwrap()
}

async fn create_department(db: &mut DatabaseConnection, symbol: &str, floor: i32) -> Department {
    db.departments()
        .create(DepartmentCreate {
            symbol: symbol.to_owned(),
            floor,
            name: format!("Department {}", symbol),
        })
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_role_crud(pool: PgPool) {
    let mut db = connect(pool).await;

    let role = create_role(&mut db, "nurse").await;
    assert!(role.id != 0);
    assert_eq!(db.roles().find_unique(role.id).await.unwrap(), Some(role.clone()));
    assert_eq!(
        db.roles().find_by_name("nurse").await.unwrap(),
        Some(role.clone())
    );

    let updated = db
        .roles()
        .update(
            role.id,
            RoleUpdate {
                description: Some("Ward nurse".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("role exists");
    assert_eq!(updated.name, "nurse");
    assert_eq!(updated.description, "Ward nurse");

    let deleted = db.roles().delete(role.id).await.unwrap();
    assert_eq!(deleted, Some(updated));
    assert_eq!(db.roles().find_unique(role.id).await.unwrap(), None);
    assert_eq!(db.roles().delete(role.id).await.unwrap(), None);
    assert_eq!(
        db.roles().update(role.id, RoleUpdate::default()).await.unwrap(),
        None
    );
}

#[sqlx::test]
async fn test_constraint_violations_are_conflicts(pool: PgPool) {
    let mut db = connect(pool).await;

    let role = create_role(&mut db, "doctor").await;
    let result = db
        .roles()
        .create(RoleCreate {
            name: "doctor".to_owned(),
            description: String::new(),
        })
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    create_account(&mut db, "house", &role).await;
    // accounts still reference the role
    assert!(matches!(
        db.roles().delete(role.id).await,
        Err(ServiceError::Conflict(_))
    ));

    let result = db
        .medical_rooms()
        .create(MedicalRoomCreate {
            floor: 1,
            name: "Orphan".to_owned(),
            department_id: 4711,
        })
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[sqlx::test]
async fn test_find_many_filters(pool: PgPool) {
    let mut db = connect(pool).await;

    let cardiology = create_department(&mut db, "CAR", 2).await;
    let neurology = create_department(&mut db, "NEU", 3).await;
    let radiology = create_department(&mut db, "RAD", 0).await;

    let all = db.departments().find_many(FindManyArgs::default()).await.unwrap();
    assert_eq!(all, vec![cardiology.clone(), neurology.clone(), radiology.clone()]);

    let upper: FindMany<Department> = serde_json::from_value(json!({
        "where": { "floor": { "gte": 1 } },
        "order_by": [{ "field": "floor", "order": "desc" }]
    }))
    .unwrap();
    assert_eq!(
        db.departments().find_many(upper).await.unwrap(),
        vec![neurology.clone(), cardiology.clone()]
    );

    let insensitive: FindMany<Department> = serde_json::from_value(json!({
        "where": {
            "OR": [
                { "symbol": { "equals": "car", "mode": "insensitive" } },
                { "name": { "ends_with": "RAD" } }
            ]
        }
    }))
    .unwrap();
    assert_eq!(
        db.departments().find_many(insensitive).await.unwrap(),
        vec![cardiology.clone(), radiology.clone()]
    );

    let page = FindManyArgs {
        skip: Some(1),
        take: Some(1),
        ..Default::default()
    };
    assert_eq!(
        db.departments().find_many(page).await.unwrap(),
        vec![neurology.clone()]
    );

    let first = db
        .departments()
        .find_first(FindManyArgs::filtered(Where::new(DepartmentFilter {
            floor: Some(IntFilter {
                lt: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        })))
        .await
        .unwrap();
    assert_eq!(first, Some(radiology.clone()));

    let none = db
        .departments()
        .find_many(FindManyArgs::filtered(Where::new(DepartmentFilter {
            id: Some(IdFilter {
                in_list: Some(vec![]),
                ..Default::default()
            }),
            ..Default::default()
        })))
        .await
        .unwrap();
    assert!(none.is_empty());

    assert_eq!(
        db.departments().find_by_symbol("NEU").await.unwrap(),
        Some(neurology)
    );
}

#[sqlx::test]
async fn test_count_aggregate_and_group_by(pool: PgPool) {
    let mut db = connect(pool).await;

    create_department(&mut db, "CAR", 2).await;
    create_department(&mut db, "NEU", 2).await;
    create_department(&mut db, "RAD", 0).await;

    let everything = Where::new(DepartmentFilter::default());
    assert_eq!(db.departments().count(&everything).await.unwrap(), 3);

    let second_floor = Where::new(DepartmentFilter {
        floor: Some(IntFilter::equals(2)),
        ..Default::default()
    });
    assert_eq!(db.departments().count(&second_floor).await.unwrap(), 2);

    let aggregate: Aggregate<Department> = serde_json::from_value(json!({
        "_count": true,
        "_sum": ["floor"],
        "_min": ["symbol"],
        "_max": ["floor"]
    }))
    .unwrap();
    let result = db.departments().aggregate(&aggregate).await.unwrap();
    assert_eq!(result.count, Some(3));
    assert_eq!(result.sum["floor"], json!(4));
    assert_eq!(result.min["symbol"], json!("CAR"));
    assert_eq!(result.max["floor"], json!(2));

    let empty: Aggregate<Department> = serde_json::from_value(json!({
        "where": { "floor": { "gt": 10 } },
        "_avg": ["floor"]
    }))
    .unwrap();
    let result = db.departments().aggregate(&empty).await.unwrap();
    assert_eq!(result.count, None);
    assert_eq!(result.avg["floor"], serde_json::Value::Null);

    let group_by: GroupBy<Department> = serde_json::from_value(json!({
        "by": ["floor"],
        "_count": true,
        "order_by": [{ "field": "floor", "order": "desc" }]
    }))
    .unwrap();
    let groups = db.departments().group_by(&group_by).await.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].keys["floor"], json!(2));
    assert_eq!(groups[0].aggregates.count, Some(2));
    assert_eq!(groups[1].keys["floor"], json!(0));
    assert_eq!(groups[1].aggregates.count, Some(1));
}

#[sqlx::test]
async fn test_bulk_operations(pool: PgPool) {
    let mut db = connect(pool).await;

    let inserted = db
        .positions()
        .create_many(
            vec![
                PositionCreate {
                    name: "Surgeon".to_owned(),
                },
                PositionCreate {
                    name: "Anesthetist".to_owned(),
                },
            ],
            false,
        )
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let duplicate = db
        .positions()
        .create_many(
            vec![PositionCreate {
                name: "Surgeon".to_owned(),
            }],
            false,
        )
        .await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    let inserted = db
        .positions()
        .create_many(
            vec![
                PositionCreate {
                    name: "Surgeon".to_owned(),
                },
                PositionCreate {
                    name: "Pharmacist".to_owned(),
                },
            ],
            true,
        )
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(db.positions().create_many(vec![], false).await.unwrap(), 0);

    create_department(&mut db, "CAR", 2).await;
    create_department(&mut db, "NEU", 3).await;
    let everything = Where::new(DepartmentFilter::default());
    let updated = db
        .departments()
        .update_many(
            &everything,
            DepartmentUpdate {
                floor: Some(NumberUpdate::Increment(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated, 2);
    let floors: Vec<i32> = db
        .departments()
        .find_many(FindManyArgs::default())
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.floor)
        .collect();
    assert_eq!(floors, vec![12, 13]);

    let deleted = db
        .departments()
        .delete_many(&Where::new(DepartmentFilter {
            symbol: Some(StringFilter::equals("CAR")),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(db.departments().count(&everything).await.unwrap(), 1);
}

#[sqlx::test]
async fn test_upsert(pool: PgPool) {
    let mut db = connect(pool).await;

    let created = db
        .roles()
        .upsert(
            4711,
            RoleCreate {
                name: "auditor".to_owned(),
                description: String::new(),
            },
            RoleUpdate::default(),
        )
        .await
        .unwrap();
    assert_eq!(created.name, "auditor");

    let updated = db
        .roles()
        .upsert(
            created.id,
            RoleCreate {
                name: "unused".to_owned(),
                description: String::new(),
            },
            RoleUpdate {
                description: Some("Reads everything".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.description, "Reads everything");
    assert_eq!(db.roles().find_by_name("unused").await.unwrap(), None);
}

#[sqlx::test]
async fn test_time_ranges_are_enforced(pool: PgPool) {
    let mut db = connect(pool).await;

    let department = create_department(&mut db, "CAR", 2).await;
    let room = db
        .medical_rooms()
        .create(MedicalRoomCreate {
            floor: 2,
            name: "C-201".to_owned(),
            department_id: department.id,
        })
        .await
        .unwrap();

    let now = Utc::now();
    let shift = db
        .shift_workings()
        .create(ShiftWorkingCreate {
            doctor_id: None,
            room_id: room.id,
            from_time: now,
            to_time: now.add(Duration::hours(8)),
        })
        .await
        .unwrap();

    let result = db
        .shift_workings()
        .update(
            shift.id,
            ShiftWorkingUpdate {
                to_time: Some(now.add(Duration::hours(-1))),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::BadRequest("Invalid input", _))
    ));

    let every_shift = Where::new(Default::default());
    let result = db
        .shift_workings()
        .update_many(
            &every_shift,
            ShiftWorkingUpdate {
                from_time: Some(now.add(Duration::hours(9))),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::BadRequest(_, _))));
    assert_eq!(
        db.shift_workings().find_unique(shift.id).await.unwrap(),
        Some(shift)
    );
}

#[sqlx::test]
async fn test_misspelled_filters_touch_nothing(pool: PgPool) {
    let mut db = connect(pool).await;

    create_department(&mut db, "CAR", 2).await;
    create_department(&mut db, "NEU", 3).await;

    let typo: Where<DepartmentFilter> =
        serde_json::from_value(json!({ "symbl": { "equals": "CAR" } })).unwrap();
    assert!(matches!(
        db.departments().delete_many(&typo).await,
        Err(ServiceError::BadRequest("Invalid filter", _))
    ));
    let result = db
        .departments()
        .update_many(
            &typo,
            DepartmentUpdate {
                floor: Some(NumberUpdate::Set(0)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::BadRequest(_, _))));

    let operator: Where<DepartmentFilter> =
        serde_json::from_value(json!({ "symbol": { "equal": "CAR" } })).unwrap();
    assert!(db.departments().delete_many(&operator).await.is_err());

    let everything = Where::new(DepartmentFilter::default());
    assert_eq!(db.departments().count(&everything).await.unwrap(), 2);
    let second_floor = Where::new(DepartmentFilter {
        floor: Some(IntFilter::equals(2)),
        ..Default::default()
    });
    assert_eq!(db.departments().count(&second_floor).await.unwrap(), 1);
}

#[sqlx::test]
async fn test_empty_or_matches_nothing(pool: PgPool) {
    let mut db = connect(pool).await;

    create_department(&mut db, "CAR", 2).await;
    create_department(&mut db, "NEU", 3).await;

    let nothing: Where<DepartmentFilter> = serde_json::from_value(json!({ "OR": [] })).unwrap();
    assert_eq!(db.departments().count(&nothing).await.unwrap(), 0);
    assert_eq!(db.departments().delete_many(&nothing).await.unwrap(), 0);
    assert!(db
        .departments()
        .find_many(FindManyArgs::filtered(nothing))
        .await
        .unwrap()
        .is_empty());

    let either: Where<DepartmentFilter> = serde_json::from_value(json!({
        "OR": [{ "symbol": { "equals": "CAR" } }, { "floor": { "gte": 3 } }]
    }))
    .unwrap();
    assert_eq!(db.departments().count(&either).await.unwrap(), 2);
}

#[sqlx::test]
async fn test_session_crud(pool: PgPool) {
    let mut db = connect(pool).await;

    let role = create_role(&mut db, models::ROLE_ADMIN).await;
    let account = create_account(&mut db, "admin", &role).await;

    let token = db
        .create_session_token(account.id, Utc::now().add(Duration::minutes(30)))
        .await
        .unwrap();
    let session = db
        .get_session_by_session_token(token.clone())
        .await
        .unwrap()
        .expect("there is a session for the token");
    assert_eq!(session.account, account);
    assert_eq!(session.role, role);
    assert_eq!(session.token, token);
    assert!(session.is_admin());

    db.delete_session_token(token.clone()).await.unwrap();
    assert_eq!(db.get_session_by_session_token(token).await.unwrap(), None);

    let expired = db
        .create_session_token(account.id, Utc::now().add(Duration::minutes(-1)))
        .await
        .unwrap();
    assert_eq!(
        db.get_session_by_session_token(expired).await.unwrap(),
        None
    );
    assert_eq!(db.delete_expired_sessions().await.unwrap(), 1);

    let token = db
        .create_session_token(account.id, Utc::now().add(Duration::minutes(30)))
        .await
        .unwrap();
    db.accounts().delete(account.id).await.unwrap();
    assert_eq!(db.get_session_by_session_token(token).await.unwrap(), None);
}

#[sqlx::test]
async fn test_staff_and_user_are_exclusive(pool: PgPool) {
    let mut db = connect(pool).await;

    let role = create_role(&mut db, models::ROLE_STAFF).await;
    let account = create_account(&mut db, "grey", &role).await;

    let staff = db
        .create_staff(StaffCreate {
            firstname: "Meredith".to_owned(),
            lastname: "Grey".to_owned(),
            education_level: "MD".to_owned(),
            account_id: account.id,
        })
        .await
        .unwrap();
    assert_eq!(
        db.staff().find_by_account(account.id).await.unwrap(),
        Some(staff)
    );

    let result = db
        .create_user(UserCreate {
            firstname: "Meredith".to_owned(),
            lastname: "Grey".to_owned(),
            phone_number: String::new(),
            account_id: account.id,
        })
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let result = db
        .create_staff(StaffCreate {
            firstname: "Nobody".to_owned(),
            lastname: "Known".to_owned(),
            education_level: String::new(),
            account_id: 4711,
        })
        .await;
    assert_eq!(result, Err(ServiceError::NotFound));
}

#[sqlx::test]
async fn test_staff_links_and_details(pool: PgPool) {
    let mut db = connect(pool).await;

    let role = create_role(&mut db, models::ROLE_STAFF).await;
    let account = create_account(&mut db, "shepherd", &role).await;
    let staff = db
        .create_staff(StaffCreate {
            firstname: "Derek".to_owned(),
            lastname: "Shepherd".to_owned(),
            education_level: "MD".to_owned(),
            account_id: account.id,
        })
        .await
        .unwrap();

    let surgeon = db
        .positions()
        .create(PositionCreate {
            name: "Surgeon".to_owned(),
        })
        .await
        .unwrap();
    let chief = db
        .positions()
        .create(PositionCreate {
            name: "Chief".to_owned(),
        })
        .await
        .unwrap();
    let neurology = create_department(&mut db, "NEU", 3).await;
    let room = db
        .medical_rooms()
        .create(MedicalRoomCreate {
            floor: 3,
            name: "N-301".to_owned(),
            department_id: neurology.id,
        })
        .await
        .unwrap();

    let positions = db
        .set_staff_positions(staff.id, &[surgeon.id, chief.id, chief.id])
        .await
        .unwrap();
    assert_eq!(positions, vec![surgeon.clone(), chief.clone()]);
    let positions = db.set_staff_positions(staff.id, &[chief.id]).await.unwrap();
    assert_eq!(positions, vec![chief.clone()]);
    assert_eq!(db.get_position_staff(chief.id).await.unwrap(), vec![staff.clone()]);
    assert!(db.get_position_staff(surgeon.id).await.unwrap().is_empty());

    let result = db.set_staff_positions(staff.id, &[4711]).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    // the failed replacement must not lose the previous links
    assert_eq!(db.get_staff_positions(staff.id).await.unwrap(), vec![chief.clone()]);
    assert_eq!(
        db.set_staff_positions(4711, &[chief.id]).await,
        Err(ServiceError::NotFound)
    );

    db.set_staff_departments(staff.id, &[neurology.id])
        .await
        .unwrap();

    let now = Utc::now();
    let shift = db
        .shift_workings()
        .create(ShiftWorkingCreate {
            doctor_id: Some(staff.id),
            room_id: room.id,
            from_time: now,
            to_time: now.add(Duration::hours(12)),
        })
        .await
        .unwrap();

    let details = db
        .get_staff_details(staff.id)
        .await
        .unwrap()
        .expect("staff exists");
    assert_eq!(details.account, account);
    assert_eq!(details.positions, vec![chief]);
    assert_eq!(details.departments, vec![neurology.clone()]);
    assert_eq!(details.shifts, vec![shift.clone()]);

    let department = db
        .get_department_details(neurology.id)
        .await
        .unwrap()
        .expect("department exists");
    assert_eq!(department.rooms, vec![room.clone()]);
    assert_eq!(department.staff, vec![staff.clone()]);

    let room_details = db
        .get_medical_room_details(room.id)
        .await
        .unwrap()
        .expect("room exists");
    assert_eq!(room_details.department, neurology);
    assert_eq!(room_details.shifts, vec![shift]);
    assert!(room_details.appointments.is_empty());

    let account_details = db
        .get_account_details(account.id)
        .await
        .unwrap()
        .expect("account exists");
    assert_eq!(account_details.role, role);
    assert_eq!(account_details.staff, Some(staff));
    assert_eq!(account_details.user, None);
    assert_eq!(account_details.avatar, None);

    assert_eq!(db.get_staff_details(4711).await.unwrap(), None);
}

#[sqlx::test]
async fn test_register_user_and_appointments(pool: PgPool) {
    let mut db = connect(pool).await;

    let role = create_role(&mut db, models::ROLE_USER).await;
    let (account, user) = db
        .register_user(
            AccountCreate {
                username: "patient".to_owned(),
                email: "patient@example.org".to_owned(),
                password: "salt$hash".to_owned(),
                role_id: role.id,
                avatar_id: None,
            },
            "Jane".to_owned(),
            "Doe".to_owned(),
            "+49 351 123456".to_owned(),
        )
        .await
        .unwrap();
    assert_eq!(user.account_id, account.id);

    // a taken username rolls back the whole registration
    let result = db
        .register_user(
            AccountCreate {
                username: "patient".to_owned(),
                email: "other@example.org".to_owned(),
                password: "salt$hash".to_owned(),
                role_id: role.id,
                avatar_id: None,
            },
            "John".to_owned(),
            "Doe".to_owned(),
            String::new(),
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    assert_eq!(
        db.accounts().find_by_email("other@example.org").await.unwrap(),
        None
    );

    let department = create_department(&mut db, "CAR", 2).await;
    let room = db
        .medical_rooms()
        .create(MedicalRoomCreate {
            floor: 2,
            name: "C-201".to_owned(),
            department_id: department.id,
        })
        .await
        .unwrap();
    let appointment = db
        .appointments()
        .create(AppointmentCreate {
            patient_id: "P-0001".to_owned(),
            room_id: room.id,
            user_id: user.id,
            from_time: None,
            to_time: None,
        })
        .await
        .unwrap();

    let details = db
        .get_user_details(user.id)
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(details.account, account);
    assert_eq!(details.appointments, vec![appointment]);
}

#[sqlx::test]
async fn test_bootstrap(pool: PgPool) {
    let mut db = connect(pool).await;

    db.bootstrap(Some("salt$hash".to_owned()), "admin@example.org")
        .await
        .unwrap();
    for name in [models::ROLE_ADMIN, models::ROLE_STAFF, models::ROLE_USER] {
        assert!(db.roles().find_by_name(name).await.unwrap().is_some());
    }
    let admin = db
        .accounts()
        .find_by_username("admin")
        .await
        .unwrap()
        .expect("admin was created");
    assert_eq!(admin.email, "admin@example.org");

    // a second run changes nothing
    db.bootstrap(Some("other$hash".to_owned()), "admin@example.org")
        .await
        .unwrap();
    let everything = Where::new(Default::default());
    assert_eq!(db.accounts().count(&everything).await.unwrap(), 1);
    assert_eq!(db.roles().count(&Where::new(Default::default())).await.unwrap(), 3);
}
