// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";

// Token configuration
pub const TOKEN_ISSUER: &str = "BudgetingApp";
pub const TOKEN_EXPIRY_DAYS: i64 = 1;
pub const MIN_TOKEN_SECRET_LENGTH: usize = 32;

// Validation limits
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

// Category types
pub const TYPE_INCOME: &str = "income";
pub const TYPE_EXPENSE: &str = "expense";

// Error messages
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const ERR_AUTH_HEADER_MISSING: &str = "Authorization header is missing";
pub const ERR_BEARER_TOKEN_MISSING: &str = "Bearer token is missing";
pub const ERR_TOKEN_INVALID: &str = "Invalid token";
pub const ERR_TOKEN_EXPIRED: &str = "Token has expired";
