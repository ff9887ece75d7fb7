use sqlx::FromRow;

/// Admin row as read for login
#[derive(Debug, Clone, FromRow)]
pub struct AdminAccount {
    pub admin_id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
