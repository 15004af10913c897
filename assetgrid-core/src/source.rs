use std::fmt;

/// Connection details for one asset-management service tenant.
///
/// The fields are opaque to this crate: they are embedded in each request
/// envelope exactly as configured.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Source {
    /// Endpoint receiving SOAP requests.
    pub url: String,
    /// Service user name.
    pub user: String,
    /// Service password, sent in cleartext inside the request body.
    pub password: String,
    /// Database identifier selecting the tenant.
    pub tenant: String,
}

impl Source {
    /// Construct a source descriptor.
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        tenant: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
            tenant: tenant.into(),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("tenant", &self.tenant)
            .finish()
    }
}
