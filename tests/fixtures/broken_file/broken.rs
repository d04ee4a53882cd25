pub struct Gadget {
    #[db = "primary_key"]
    pub id: i64
    pub label String,
}
