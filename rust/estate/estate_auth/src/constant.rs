/// The name of the cookie that carries the admin token
pub static ADMIN_TOKEN_COOKIE: &str = "estate-admin-token";
/// The only role currently issued
pub static ADMIN_ROLE: &str = "admin";
