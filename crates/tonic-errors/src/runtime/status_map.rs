//! Transport-neutral status → gRPC status code mapping.

use std::collections::BTreeMap;

use tonic::Code;
use tonic_errors_core::status::CLIENT_CLOSED_REQUEST;

/// Rows of the standard table. Clients depend on these exact values.
const STANDARD_ENTRIES: &[(u16, Code)] = &[
    (CLIENT_CLOSED_REQUEST, Code::Cancelled),
    (200, Code::Ok),
    (400, Code::InvalidArgument),
    (408, Code::DeadlineExceeded),
    (404, Code::NotFound),
    (409, Code::AlreadyExists),
    (403, Code::PermissionDenied),
    (507, Code::ResourceExhausted),
    (412, Code::FailedPrecondition),
    (504, Code::Aborted),
    (416, Code::OutOfRange),
    (501, Code::Unimplemented),
    (500, Code::Internal),
    (503, Code::Unavailable),
    (401, Code::Unauthenticated),
];

/// Immutable mapping from transport-neutral status to [`tonic::Code`].
///
/// Build it once at startup and share it (`Arc<StatusTable>`) between
/// codecs. Any status without a row maps to [`Code::Unknown`].
///
/// # Examples
///
/// ```
/// use tonic_errors::StatusTable;
///
/// let table = StatusTable::standard();
/// assert_eq!(table.lookup(404), tonic::Code::NotFound);
/// assert_eq!(table.lookup(418), tonic::Code::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    entries: BTreeMap<u16, Code>,
}

impl StatusTable {
    /// The standard table.
    ///
    /// | status | code |
    /// |---|---|
    /// | 444 | `Cancelled` |
    /// | 200 | `Ok` |
    /// | 400 | `InvalidArgument` |
    /// | 408 | `DeadlineExceeded` |
    /// | 404 | `NotFound` |
    /// | 409 | `AlreadyExists` |
    /// | 403 | `PermissionDenied` |
    /// | 507 | `ResourceExhausted` |
    /// | 412 | `FailedPrecondition` |
    /// | 504 | `Aborted` |
    /// | 416 | `OutOfRange` |
    /// | 501 | `Unimplemented` |
    /// | 500 | `Internal` |
    /// | 503 | `Unavailable` |
    /// | 401 | `Unauthenticated` |
    #[must_use]
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_ENTRIES.iter().copied())
    }

    /// Build a table from explicit rows. Later rows win on duplicate statuses.
    pub fn from_entries(entries: impl IntoIterator<Item = (u16, Code)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// gRPC code for `status`, or [`Code::Unknown`] when unmapped.
    #[must_use]
    pub fn lookup(&self, status: u16) -> Code {
        self.entries.get(&status).copied().unwrap_or(Code::Unknown)
    }

    /// Rows in ascending status order.
    pub fn entries(&self) -> impl Iterator<Item = (u16, Code)> + '_ {
        self.entries.iter().map(|(&status, &code)| (status, code))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows (every status maps to `Unknown`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Code names printed next to each table row, indexed by the numeric code.
const CODE_NAMES: [&str; 17] = [
    "OK",
    "CANCELLED",
    "UNKNOWN",
    "INVALID_ARGUMENT",
    "DEADLINE_EXCEEDED",
    "NOT_FOUND",
    "ALREADY_EXISTS",
    "PERMISSION_DENIED",
    "RESOURCE_EXHAUSTED",
    "FAILED_PRECONDITION",
    "ABORTED",
    "OUT_OF_RANGE",
    "UNIMPLEMENTED",
    "INTERNAL",
    "UNAVAILABLE",
    "DATA_LOSS",
    "UNAUTHENTICATED",
];

/// Wire name of a gRPC code, as shown when the table is listed
/// (`444 -> CANCELLED`).
///
/// ```
/// use tonic_errors::grpc_code_name;
///
/// assert_eq!(grpc_code_name(tonic::Code::Cancelled), "CANCELLED");
/// ```
#[must_use]
pub fn grpc_code_name(code: Code) -> &'static str {
    usize::try_from(i32::from(code))
        .ok()
        .and_then(|index| CODE_NAMES.get(index))
        .copied()
        .unwrap_or("UNKNOWN")
}
