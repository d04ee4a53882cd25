pub struct Account {
    #[db = "column:account_name"]
    pub name: String,
}

#[db = "table:members"]
pub struct Member {
    #[db = "primary_key"]
    pub id: i64,
    #[rel = "belongs_to:Team"]
    pub team: Option<Team>,
}

#[db = "table:members"]
pub struct Person {
    #[db = "primary_key"]
    pub id: i64,
}
