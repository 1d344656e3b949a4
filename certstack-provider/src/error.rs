use serde::{Deserialize, Serialize};

/// Unified error type for all provisioning-engine operations.
///
/// Each variant includes an `engine` field identifying which engine backend
/// produced the error, plus variant-specific context. All variants are
/// serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError) — network connectivity issues
/// - [`Timeout`](Self::Timeout) — request timed out
/// - [`RateLimited`](Self::RateLimited) — API rate limit exceeded
///
/// Whether and how to retry is the engine implementation's decision; callers
/// can use [`is_retryable()`](Self::is_retryable) for their own policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum EngineError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Engine that produced the error.
        engine: String,
        /// Error details.
        detail: String,
    },

    /// The request timed out inside the engine.
    Timeout {
        /// Engine that produced the error.
        engine: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429 or equivalent).
    RateLimited {
        /// Engine that produced the error.
        engine: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A resource with the same logical name already exists and conflicts with the request.
    ///
    /// Logical names are the engine's identity key; re-submitting an identical
    /// request is deduplicated, a *different* request under the same name conflicts.
    ResourceConflict {
        /// Engine that produced the error.
        engine: String,
        /// Logical name of the conflicting resource.
        resource: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter is invalid (e.g., bad TTL value, malformed record value).
    InvalidParameter {
        /// Engine that produced the error.
        engine: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The authenticated principal lacks permission for the requested operation.
    PermissionDenied {
        /// Engine that produced the error.
        engine: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The certificate issuer rejected or revoked the validation request.
    ///
    /// This is terminal for the submitted validation: the issuer observed the
    /// DNS record (or gave up looking for it) and refused to confirm.
    ValidationFailed {
        /// Engine that produced the error.
        engine: String,
        /// ARN of the certificate whose validation failed.
        certificate_arn: String,
        /// Original error message from the issuer, if available.
        raw_message: Option<String>,
    },

    /// An unrecognized error from the provider API.
    ///
    /// This is a catch-all for error codes not yet mapped to a specific variant.
    Unknown {
        /// Engine that produced the error.
        engine: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl EngineError {
    /// 是否为预期行为（用户输入、资源冲突等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::ResourceConflict { .. }
                | Self::InvalidParameter { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Whether the error is transient and the same request may succeed on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { engine, detail } => {
                write!(f, "[{engine}] Network error: {detail}")
            }
            Self::Timeout { engine, detail } => {
                write!(f, "[{engine}] Request timeout: {detail}")
            }
            Self::RateLimited {
                engine,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{engine}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{engine}] Rate limited")
                }
            }
            Self::ResourceConflict {
                engine, resource, ..
            } => {
                write!(f, "[{engine}] Resource '{resource}' already exists")
            }
            Self::InvalidParameter {
                engine,
                param,
                detail,
            } => {
                write!(f, "[{engine}] Invalid parameter '{param}': {detail}")
            }
            Self::PermissionDenied {
                engine,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{engine}] Permission denied: {msg}")
                } else {
                    write!(f, "[{engine}] Permission denied")
                }
            }
            Self::ValidationFailed {
                engine,
                certificate_arn,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{engine}] Validation failed for '{certificate_arn}': {msg}")
                } else {
                    write!(f, "[{engine}] Validation failed for '{certificate_arn}'")
                }
            }
            Self::Unknown {
                engine,
                raw_message,
                ..
            } => {
                write!(f, "[{engine}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Convenience type alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
