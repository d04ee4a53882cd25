pub struct AuditLog {
    #[db = "primary_key"]
    pub id: i64,
    #[db = "foreign_key:users.id"]
    pub user_id: Option<i64>,
    pub action: String,
}
