//! Domain-level constants.
//!
//! These constants define business rules and user-facing messages.

// =============================================================================
// Roles
// =============================================================================

/// Stored name of the default role
pub const ROLE_NAME_USER: &str = "USER";

/// Stored name of the administrator role
pub const ROLE_NAME_ADMIN: &str = "ADMIN";

/// Authority token granted by the default role
pub const AUTHORITY_USER: &str = "ROLE_USER";

/// Authority token granted by the administrator role
pub const AUTHORITY_ADMIN: &str = "ROLE_ADMIN";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 1;

/// Maximum length of a facility title
pub const MAX_TITLE_LENGTH: usize = 255;

pub const MSG_START_BEFORE_END: &str = "Start time must be before end time.";

pub const MSG_DUPLICATE_EMAIL: &str = "An account with this email already exists.";

pub const MSG_SLOT_TAKEN: &str = "The selected time slot is already booked.";

pub const MSG_TITLE_REQUIRED: &str = "Facility title is required.";

// =============================================================================
// Booking window
// =============================================================================

/// First bookable hour of the day
pub const DEFAULT_DAY_START_HOUR: u32 = 8;

/// Hour at which the booking window closes (exclusive)
pub const DEFAULT_DAY_END_HOUR: u32 = 20;

/// Length of one slot in minutes
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Slot label format (zero-padded `HH:MM`)
pub const SLOT_LABEL_FORMAT: &str = "%H:%M";

// =============================================================================
// Authentication
// =============================================================================

/// Default session lifetime in hours
pub const DEFAULT_SESSION_EXPIRATION_HOURS: i64 = 24;

/// Longest accepted session lifetime in hours (one year)
pub const MAX_SESSION_EXPIRATION_HOURS: i64 = 24 * 366;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;
