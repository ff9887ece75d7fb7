use tracing::{info, instrument};

use std::sync::Arc;

use super::{
    Assignment, Connection, Database, SqlValue, Statement, StatementExecutor, StorageError,
};
use crate::auth::{hash_password, CredentialStore};

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS user_categories (
        category_id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS admins (
        admin_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL,
        category_id INTEGER,
        emergency_contact TEXT,
        fee_status TEXT,
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS routes (
        route_id INTEGER PRIMARY KEY AUTOINCREMENT,
        route_name TEXT NOT NULL,
        start_point TEXT NOT NULL,
        end_point TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS route_stops (
        stop_id INTEGER PRIMARY KEY AUTOINCREMENT,
        route_id INTEGER,
        stop_name TEXT NOT NULL,
        stop_number INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS vehicles (
        vehicle_id INTEGER PRIMARY KEY AUTOINCREMENT,
        vehicle_number TEXT NOT NULL,
        driver_name TEXT NOT NULL,
        capacity INTEGER NOT NULL,
        route_id INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS cards (
        card_id INTEGER PRIMARY KEY AUTOINCREMENT,
        card_uid TEXT NOT NULL,
        user_id INTEGER,
        status TEXT DEFAULT 'active'
    )",
    "CREATE TABLE IF NOT EXISTS access_logs (
        log_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER,
        card_id INTEGER,
        action_type TEXT NOT NULL,
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS access_permissions (
        permission_id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_id INTEGER,
        allowed_area TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS gps_locations (
        location_id INTEGER PRIMARY KEY AUTOINCREMENT,
        vehicle_id INTEGER,
        latitude TEXT NOT NULL,
        longitude TEXT NOT NULL,
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
];

pub const DEFAULT_CATEGORIES: &[&str] = &["Student", "Teacher", "Staff", "Visitor"];

pub const DEFAULT_ADMIN_NAME: &str = "Super Admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@smartgps.com";
// Bootstrap credential; change it after the first login
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const SAMPLE_ROUTES: &[(&str, &str, &str)] = &[
    ("Route A", "Campus Gate 1", "North Block"),
    ("Route B", "South Gate", "Main Library"),
];

const SAMPLE_STOPS: &[(i64, &str, i64)] = &[
    (1, "Gate 1", 1),
    (1, "Science Dept", 2),
    (1, "North Block", 3),
    (2, "South Gate", 1),
    (2, "Cafeteria", 2),
    (2, "Library", 3),
];

const SAMPLE_VEHICLES: &[(&str, &str, i64, i64)] = &[
    ("BUS-101", "Aslam Driver", 40, 1),
    ("BUS-202", "Akhtar Driver", 50, 2),
];

/// Creates every table if missing and seeds reference data. Safe to run on
/// every startup: nothing is inserted twice.
#[instrument(skip_all)]
pub async fn initialize(
    database: &Database,
    credentials: &Arc<dyn CredentialStore>,
) -> Result<(), StorageError> {
    let mut conn = database.acquire().await?;

    for ddl in TABLES {
        conn.execute(&Statement::new(*ddl, vec![])).await?;
    }

    seed_categories(&mut conn).await?;

    if count(&mut conn, "admins").await? == 0 {
        info!("No admin found, seeding default admin and sample data");
        seed_admin(&mut conn, credentials).await?;
        seed_samples(&mut conn).await?;
    }

    info!("Database schema ready");
    Ok(())
}

async fn count(conn: &mut Connection, table: &str) -> Result<i64, StorageError> {
    let statement = Statement::new(format!("SELECT COUNT(1) FROM {}", table), vec![]);
    conn.fetch_scalar(&statement).await
}

async fn seed_categories(conn: &mut Connection) -> Result<(), StorageError> {
    for name in DEFAULT_CATEGORIES {
        conn.execute(&Statement::new(
            "INSERT INTO user_categories (category_name) \
             SELECT ? WHERE NOT EXISTS (SELECT 1 FROM user_categories WHERE category_name = ?)",
            vec![SqlValue::from(*name), SqlValue::from(*name)],
        ))
        .await?;
    }
    Ok(())
}

async fn seed_admin(
    conn: &mut Connection,
    credentials: &Arc<dyn CredentialStore>,
) -> Result<(), StorageError> {
    let password_hash = hash_password(credentials, DEFAULT_ADMIN_PASSWORD.to_string()).await?;
    conn.execute(&Statement::new(
        "INSERT OR IGNORE INTO admins (name, email, password_hash) VALUES (?, ?, ?)",
        vec![
            SqlValue::from(DEFAULT_ADMIN_NAME),
            SqlValue::from(DEFAULT_ADMIN_EMAIL),
            SqlValue::from(password_hash),
        ],
    ))
    .await?;
    Ok(())
}

async fn seed_samples(conn: &mut Connection) -> Result<(), StorageError> {
    if count(conn, "routes").await? == 0 {
        for (name, start, end) in SAMPLE_ROUTES {
            conn.execute(&Statement::insert(
                "routes",
                vec![
                    Assignment::new("route_name", *name),
                    Assignment::new("start_point", *start),
                    Assignment::new("end_point", *end),
                ],
            ))
            .await?;
        }
    }

    if count(conn, "route_stops").await? == 0 {
        for (route_id, name, number) in SAMPLE_STOPS {
            conn.execute(&Statement::insert(
                "route_stops",
                vec![
                    Assignment::new("route_id", *route_id),
                    Assignment::new("stop_name", *name),
                    Assignment::new("stop_number", *number),
                ],
            ))
            .await?;
        }
    }

    if count(conn, "vehicles").await? == 0 {
        for (number, driver, capacity, route_id) in SAMPLE_VEHICLES {
            conn.execute(&Statement::insert(
                "vehicles",
                vec![
                    Assignment::new("vehicle_number", *number),
                    Assignment::new("driver_name", *driver),
                    Assignment::new("capacity", *capacity),
                    Assignment::new("route_id", *route_id),
                ],
            ))
            .await?;
        }
    }

    Ok(())
}
