//! Process configuration.
//!
//! The configuration surface is an explicit [`Settings`] struct handed to
//! [`ServiceContext::new`](crate::services::ServiceContext::new); nothing in
//! this crate reads ambient global state after startup. [`Settings::from_env`]
//! is the one place environment variables are consulted, intended to run once
//! at process start; per-call adjustments go through [`SettingsOverride`].

use std::time::Duration;

use certstack_provider::Region;

use crate::error::{CoreError, CoreResult};

/// Environment key holding a JSON array of asset path patterns
/// (e.g. `["/static/*", "/assets/*"]`).
pub const ENV_ASSETS_PATHS: &str = "WEBSITE_ASSETS_PATHS";
/// Environment key holding the ARN of the edge function that rewrites
/// caching headers for asset paths.
pub const ENV_ASSETS_CACHING_LAMBDA_ARN: &str = "WEBSITE_ASSETS_CACHING_LAMBDA_ARN";
/// Environment key holding the ARN of the edge function that injects
/// security response headers.
pub const ENV_SECURITY_HEADERS_LAMBDA_ARN: &str = "WEBSITE_SECURITY_HEADERS_LAMBDA_ARN";

/// Default wait budget for certificate validation confirmation.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(45 * 60);

/// Process-wide defaults for the provisioning services.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Region certificates are requested and confirmed in.
    pub issuance_region: Region,
    /// How long to wait for the issuer to confirm a validation record
    /// before surfacing a timeout.
    pub validation_timeout: Duration,
    /// Path patterns treated as long-lived static assets by sibling
    /// distribution components.
    pub assets_paths: Vec<String>,
    /// Edge function applied to asset responses, if any.
    pub assets_caching_lambda_arn: Option<String>,
    /// Edge function injecting security headers, if any.
    pub security_headers_lambda_arn: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            issuance_region: Region::certificate_issuance(),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            assets_paths: Vec::new(),
            assets_caching_lambda_arn: None,
            security_headers_lambda_arn: None,
        }
    }
}

impl Settings {
    /// Read settings from the environment, falling back to defaults for
    /// unset keys. Call once at process start.
    ///
    /// # Errors
    ///
    /// [`CoreError::Config`] when [`ENV_ASSETS_PATHS`] is set but is not a
    /// JSON array of strings.
    pub fn from_env() -> CoreResult<Self> {
        let mut settings = Self::default();

        if let Ok(raw) = std::env::var(ENV_ASSETS_PATHS) {
            settings.assets_paths = serde_json::from_str(&raw).map_err(|e| {
                CoreError::Config(format!("{ENV_ASSETS_PATHS} is not a JSON string array: {e}"))
            })?;
        }
        settings.assets_caching_lambda_arn = non_empty_var(ENV_ASSETS_CACHING_LAMBDA_ARN);
        settings.security_headers_lambda_arn = non_empty_var(ENV_SECURITY_HEADERS_LAMBDA_ARN);

        Ok(settings)
    }

    /// Fold per-call overrides on top of the process-wide defaults.
    #[must_use]
    pub fn merged(&self, overrides: &SettingsOverride) -> Self {
        Self {
            issuance_region: overrides
                .issuance_region
                .clone()
                .unwrap_or_else(|| self.issuance_region.clone()),
            validation_timeout: overrides
                .validation_timeout
                .unwrap_or(self.validation_timeout),
            assets_paths: overrides
                .assets_paths
                .clone()
                .unwrap_or_else(|| self.assets_paths.clone()),
            assets_caching_lambda_arn: overrides
                .assets_caching_lambda_arn
                .clone()
                .or_else(|| self.assets_caching_lambda_arn.clone()),
            security_headers_lambda_arn: overrides
                .security_headers_lambda_arn
                .clone()
                .or_else(|| self.security_headers_lambda_arn.clone()),
        }
    }
}

/// Per-call settings overrides; `None` fields keep the process-wide value.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverride {
    /// Override the issuance region.
    pub issuance_region: Option<Region>,
    /// Override the validation wait budget.
    pub validation_timeout: Option<Duration>,
    /// Replace the asset path patterns.
    pub assets_paths: Option<Vec<String>>,
    /// Replace the asset-caching edge function.
    pub assets_caching_lambda_arn: Option<String>,
    /// Replace the security-headers edge function.
    pub security_headers_lambda_arn: Option<String>,
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
