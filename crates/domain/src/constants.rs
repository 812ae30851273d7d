//! Application constants
//!
//! Defaults for client construction and the human-readable messages the
//! error classifier attaches to each failure class. Raw transport text never
//! reaches these messages; it is kept for logs and error details.

// Client defaults
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 10_000;
pub const DEFAULT_CACHE_SWEEP_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;
pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_LOADING_CHANNEL_CAPACITY: usize = 64;

// Envelope messages
pub const MESSAGE_SERVED_FROM_CACHE: &str = "Data loaded from cache";

// Classification messages
pub const MESSAGE_NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const MESSAGE_TIMEOUT: &str = "Request timed out. Please try again.";
pub const MESSAGE_SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const MESSAGE_FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const MESSAGE_NOT_FOUND: &str = "The requested resource was not found.";
pub const MESSAGE_RATE_LIMITED: &str = "Too many requests. Please slow down and try again.";
pub const MESSAGE_SERVER_ERROR: &str = "Server error. Please try again later.";
pub const MESSAGE_UNKNOWN_ERROR: &str = "An unexpected error occurred.";
pub const MESSAGE_CANCELLED: &str = "Request was cancelled.";
