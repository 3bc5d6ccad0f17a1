// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3030;

// Token lifetime
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

// Secret limits for password hashing
pub const MAX_SECRET_LEN: usize = 128;

// Object storage
pub const DEFAULT_IMAGE_BUCKET: &str = "images";
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

// Identity table columns
pub const EMAIL_COLUMN: &str = "correo";
pub const PASSWORD_COLUMN: &str = "contraseña";

// Request body limits
pub const JSON_BODY_LIMIT: u64 = 64 * 1024;
