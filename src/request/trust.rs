//! TLS trust material applied to secure connections.

use std::fmt;
use std::str::FromStr;

use reqwest::blocking::ClientBuilder;

use super::RequestError;

/// Minimum TLS protocol version accepted for a secure connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    /// TLS 1.2
    Tls12,
    /// TLS 1.3
    Tls13,
}

impl FromStr for TlsVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1.2" | "tls1.2" | "tlsv1.2" => Ok(Self::Tls12),
            "1.3" | "tls1.3" | "tlsv1.3" => Ok(Self::Tls13),
            _ => Err(s.to_string()),
        }
    }
}

impl From<TlsVersion> for reqwest::tls::Version {
    fn from(version: TlsVersion) -> Self {
        match version {
            TlsVersion::Tls12 => Self::TLS_1_2,
            TlsVersion::Tls13 => Self::TLS_1_3,
        }
    }
}

/// Rules governing certificate and hostname verification for one connection.
///
/// A policy is applied only when the target URL is `https`, and only to the
/// client built for that single send. It never touches process-wide TLS
/// state, so requests on different threads may use different policies.
///
/// # Defaults
///
/// The default policy trusts every certificate and every hostname. This is
/// meant for internal hosts and test environments with self-signed
/// certificates; use [`TrustPolicy::strict`] for anything public.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustPolicy {
    verify_certificates: bool,
    verify_hostnames: bool,
    root_certificates: Vec<Vec<u8>>,
    identity: Option<Vec<u8>>,
    min_version: Option<TlsVersion>,
}

impl TrustPolicy {
    /// Accepts any certificate chain for any hostname.
    #[must_use]
    pub const fn trust_all() -> Self {
        Self {
            verify_certificates: false,
            verify_hostnames: false,
            root_certificates: Vec::new(),
            identity: None,
            min_version: None,
        }
    }

    /// Verifies certificate chains against the bundled roots and checks hostnames.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            verify_certificates: true,
            verify_hostnames: true,
            root_certificates: Vec::new(),
            identity: None,
            min_version: None,
        }
    }

    /// Enables or disables certificate chain validation.
    #[must_use]
    pub const fn with_verify_certificates(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    /// Enables or disables hostname verification.
    #[must_use]
    pub const fn with_verify_hostnames(mut self, verify: bool) -> Self {
        self.verify_hostnames = verify;
        self
    }

    /// Adds a PEM-encoded root certificate to trust in addition to the bundled roots.
    #[must_use]
    pub fn with_root_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.root_certificates.push(pem.into());
        self
    }

    /// Sets the client identity: a PEM bundle holding a private key and certificate chain.
    #[must_use]
    pub fn with_identity(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.identity = Some(pem.into());
        self
    }

    /// Sets the minimum protocol version.
    #[must_use]
    pub const fn with_min_version(mut self, version: TlsVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    /// Returns true if certificate chains are validated.
    #[must_use]
    pub const fn verifies_certificates(&self) -> bool {
        self.verify_certificates
    }

    /// Returns true if hostnames are checked against the certificate.
    #[must_use]
    pub const fn verifies_hostnames(&self) -> bool {
        self.verify_hostnames
    }

    /// Returns the configured minimum protocol version.
    #[must_use]
    pub const fn min_version(&self) -> Option<TlsVersion> {
        self.min_version
    }

    /// Applies this policy to a client builder for one secure connection.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Tls`] if a root certificate or the identity
    /// cannot be parsed.
    pub(crate) fn apply(&self, builder: ClientBuilder) -> Result<ClientBuilder, RequestError> {
        let mut builder = builder
            .danger_accept_invalid_certs(!self.verify_certificates)
            .danger_accept_invalid_hostnames(!self.verify_hostnames);

        for pem in &self.root_certificates {
            let certificate = reqwest::Certificate::from_pem(pem)
                .map_err(|e| RequestError::Tls(format!("invalid root certificate: {e}")))?;
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(pem) = &self.identity {
            let identity = reqwest::Identity::from_pem(pem)
                .map_err(|e| RequestError::Tls(format!("invalid client identity: {e}")))?;
            builder = builder.identity(identity);
        }

        if let Some(version) = self.min_version {
            builder = builder.min_tls_version(version.into());
        }

        Ok(builder)
    }
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self::trust_all()
    }
}

// Key material stays out of logs.
impl fmt::Debug for TrustPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustPolicy")
            .field("verify_certificates", &self.verify_certificates)
            .field("verify_hostnames", &self.verify_hostnames)
            .field("root_certificates", &self.root_certificates.len())
            .field("identity", &self.identity.is_some())
            .field("min_version", &self.min_version)
            .finish()
    }
}
