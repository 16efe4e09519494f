//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;
pub const TOP_CUSTOMERS_LIMIT: i64 = 10;
pub const UPCOMING_BIRTHDAY_WINDOW_DAYS: i64 = 30;
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 43200;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_PROVIDED: &str = "Not provided";
pub const LOGIN_ATTEMPTS_PER_MINUTE: u32 = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
