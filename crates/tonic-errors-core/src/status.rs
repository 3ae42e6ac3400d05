//! Well-known transport-neutral status values.
//!
//! The status space reuses HTTP status semantics. Two values are not standard
//! HTTP statuses and are named here.

/// Client closed the request before a response was produced (non-standard).
pub const CLIENT_CLOSED_REQUEST: u16 = 444;

/// Status assigned to a decoded body whose `statusHTTP` does not fit the
/// status space. Never present in a mapping table.
pub const UNCLASSIFIED: u16 = 0;

/// `200 OK`.
pub const OK: u16 = 200;

/// `400 Bad Request`.
pub const BAD_REQUEST: u16 = 400;

/// `404 Not Found`.
pub const NOT_FOUND: u16 = 404;

/// `500 Internal Server Error`.
pub const INTERNAL_SERVER_ERROR: u16 = 500;
