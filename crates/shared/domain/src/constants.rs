//! Domain-level constants.
//!
//! Table names, column names and validation limits shared by every crate
//! that talks to the backend.

// =============================================================================
// Tables
// =============================================================================

/// Service catalog table
pub const TABLE_SERVICES: &str = "services";

/// Customer bookings table
pub const TABLE_BOOKINGS: &str = "bookings";

/// User profile table (one row per auth identity)
pub const TABLE_USERS: &str = "users";

/// Service reviews table
pub const TABLE_REVIEWS: &str = "reviews";

/// Subscription plans table
pub const TABLE_SUBSCRIPTIONS: &str = "subscriptions";

// =============================================================================
// Columns
// =============================================================================

/// Primary key column used by every table
pub const COLUMN_ID: &str = "id";

/// Server-stamped creation time
pub const COLUMN_CREATED_AT: &str = "created_at";

/// Foreign key from bookings/reviews to users
pub const COLUMN_USER_ID: &str = "user_id";

/// Foreign key from bookings/reviews to services
pub const COLUMN_SERVICE_ID: &str = "service_id";

/// Columns matched by a catalog search
pub const SEARCH_COLUMNS: &[&str] = &["title", "description", "category"];

// =============================================================================
// Profiles
// =============================================================================

/// Display name given to a synthesized profile
pub const DEFAULT_PROFILE_NAME: &str = "User";

// =============================================================================
// Validation
// =============================================================================

/// Lowest review rating
pub const MIN_RATING: u8 = 1;

/// Highest review rating
pub const MAX_RATING: u8 = 5;

// =============================================================================
// Authentication
// =============================================================================

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";
