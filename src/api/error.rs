//! Upstream errno values.
//!
//! Only codes with a documented meaning in the public netdisk API error tables
//! are named; everything else maps to [`ApiErrno::Unknown`] and keeps its raw
//! value in [`Rejection::Api`](crate::Rejection::Api).

/// Known errno values returned in the `{errno, ...}` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrno {
    /// Success
    Ok,
    /// Identity check failed (-6)
    AuthFailed,
    /// Wrong share password, or the target does not exist (-9)
    WrongPassword,
    /// File does not exist (31066)
    FileNotFound,
    /// Any other errno
    Unknown,
}

impl From<i64> for ApiErrno {
    fn from(code: i64) -> Self {
        match code {
            0 => ApiErrno::Ok,
            -6 => ApiErrno::AuthFailed,
            -9 => ApiErrno::WrongPassword,
            31066 => ApiErrno::FileNotFound,
            _ => ApiErrno::Unknown,
        }
    }
}

impl ApiErrno {
    /// Get human-readable description of the errno.
    pub fn description(&self) -> &'static str {
        match self {
            ApiErrno::Ok => "Success",
            ApiErrno::AuthFailed => "Identity check failed",
            ApiErrno::WrongPassword => "Wrong share password",
            ApiErrno::FileNotFound => "File does not exist",
            ApiErrno::Unknown => "Unknown error",
        }
    }
}
