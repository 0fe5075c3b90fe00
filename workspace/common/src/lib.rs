//! Common transport-layer types shared by the server and the ranking computer.
//! Every endpoint answers with the same [`ApiResponse`] envelope; warnings and
//! structured errors are carried as lists of [`Issue`]s.

mod ranking;

pub use ranking::{CourseRanking, LecturerRanking, StudentRanking};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Numeric codes attached to structured issues.
pub mod codes {
    /// A course id in a registration request does not exist.
    pub const COURSE_NOT_FOUND: i32 = 11745;
    /// The student is already registered for the course.
    pub const ALREADY_REGISTERED: i32 = 17405;
    /// A batch student entry is missing a required field.
    pub const INVALID_STUDENT_ENTRY: i32 = 14226;
    /// A batch student entry collides with an existing email or matric number.
    pub const STUDENT_ALREADY_EXIST: i32 = 17406;
    /// The lecturer is not assigned to the course of the lecture.
    pub const LECTURER_COURSE_MISMATCH: i32 = 19941;
    /// The student is not registered for the course of the lecture.
    pub const STUDENT_NOT_REGISTERED: i32 = 19042;
}

/// A single warning or error entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Issue {
    /// HTTP-like status describing the issue
    pub status: u16,
    /// Stable numeric code, see [`codes`]
    pub code: i32,
    /// Short title
    pub title: String,
    /// Human readable detail
    pub detail: String,
}

impl Issue {
    pub fn new(status: u16, code: i32, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status,
            code,
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Non-fatal issues collected while processing a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WarningResult {
    pub warnings: Vec<Issue>,
}

/// Structured errors explaining a failed request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ErrorResult {
    pub errors: Vec<Issue>,
}

/// Response envelope returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Response payload, absent on failure
    pub result: Option<T>,
    /// Non-fatal warnings
    pub warning_result: Option<WarningResult>,
    /// Structured errors
    pub error_result: Option<ErrorResult>,
    /// Error message, absent on success
    pub error_message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `result`.
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            warning_result: None,
            error_result: None,
            error_message: None,
        }
    }

    /// Successful response that also reports warnings.
    /// An empty warning list is omitted from the envelope.
    pub fn with_warnings(result: T, warnings: Vec<Issue>) -> Self {
        Self {
            result: Some(result),
            warning_result: (!warnings.is_empty()).then_some(WarningResult { warnings }),
            error_result: None,
            error_message: None,
        }
    }

    /// Failed response with a message and optional structured errors.
    pub fn failure(message: impl Into<String>, errors: Vec<Issue>) -> Self {
        Self {
            result: None,
            warning_result: None,
            error_result: (!errors.is_empty()).then_some(ErrorResult { errors }),
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }
}
