//! Error codes shared by every error type in the crate.
//!
//! Each error enum renders a human message through `Display` and a stable
//! `E_*` code through [`ErrorCode`]. The code is what ends up in logs; the
//! message is what ends up in the transcript.

/// Grepable error code and retryable flag for structured log lines.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
