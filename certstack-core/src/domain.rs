//! Domain name splitting.
//!
//! DNS zone names are dot-terminated (`"example.com."`); provider APIs that
//! take a bare name get it through the `*_bare` accessors. The split is pure
//! string arithmetic, no lookups against the public suffix list.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A fully-qualified domain split into its subdomain, parent-domain and
/// root-domain components.
///
/// - `subdomain`: every label except the last two, joined by dots (empty for
///   an apex domain such as `"example.com"`).
/// - `parent_domain`: every label except the first, dot-terminated. Equals
///   `root_domain` for two-label inputs.
/// - `root_domain`: exactly the last two labels, dot-terminated. This is the
///   registrable domain a hosted zone is named after.
///
/// ```
/// use certstack_core::domain::DomainParts;
///
/// let parts = DomainParts::parse("www.example.com").unwrap();
/// assert_eq!(parts.subdomain, "www");
/// assert_eq!(parts.parent_domain, "example.com.");
/// assert_eq!(parts.root_domain, "example.com.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainParts {
    /// Leading labels, possibly empty.
    pub subdomain: String,
    /// All labels except the first, dot-terminated.
    pub parent_domain: String,
    /// The last two labels, dot-terminated.
    pub root_domain: String,
}

impl DomainParts {
    /// Split a domain name with at least two labels.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidDomain`] when the input has fewer than two
    /// dot-separated labels.
    pub fn parse(domain: &str) -> CoreResult<Self> {
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 {
            return Err(CoreError::InvalidDomain(domain.to_string()));
        }
        if labels.len() == 2 {
            return Ok(Self {
                subdomain: String::new(),
                parent_domain: format!("{domain}."),
                root_domain: format!("{domain}."),
            });
        }

        let subdomain = labels[..labels.len() - 2].join(".");
        let parent_domain = format!("{}.", labels[1..].join("."));
        let root_domain = format!("{}.", labels[labels.len() - 2..].join("."));
        Ok(Self {
            subdomain,
            parent_domain,
            root_domain,
        })
    }

    /// Parent domain without the trailing dot.
    #[must_use]
    pub fn parent_domain_bare(&self) -> &str {
        self.parent_domain.trim_end_matches('.')
    }

    /// Root domain without the trailing dot.
    #[must_use]
    pub fn root_domain_bare(&self) -> &str {
        self.root_domain.trim_end_matches('.')
    }
}
