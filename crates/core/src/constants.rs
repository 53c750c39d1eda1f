/// Name of the cache region holding Broker records
pub const BROKER_CACHE_NAME: &str = "broker";

/// Placeholder for string fields whose upstream data is unavailable
pub const UNKNOWN_STRING: &str = "Unknown";

/// Placeholder for float fields whose upstream data is unavailable
pub const UNKNOWN_DOUBLE: f64 = -1.0;

/// Placeholder for integer fields whose upstream data is unavailable
pub const UNKNOWN_INT: i32 = -1;

/// Decimal places used when rendering currency values for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
