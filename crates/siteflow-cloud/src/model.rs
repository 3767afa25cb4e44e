//! Typed request and response values exchanged with a [`ResourceClient`](crate::ResourceClient)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Access key pair used to authenticate against the vendor APIs.
///
/// Never persisted; the secret is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .finish()
    }
}

// ========== Bucket ==========

/// Who a grant applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GranteeType {
    CanonicalUser,
    Group,
    Other(String),
}

impl GranteeType {
    pub fn parse(value: &str) -> Self {
        match value {
            "CanonicalUser" => Self::CanonicalUser,
            "Group" => Self::Group,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    FullControl,
    Read,
    Write,
    ReadAcp,
    WriteAcp,
    Other(String),
}

impl Permission {
    pub fn parse(value: &str) -> Self {
        match value {
            "FULL_CONTROL" => Self::FullControl,
            "READ" => Self::Read,
            "WRITE" => Self::Write,
            "READ_ACP" => Self::ReadAcp,
            "WRITE_ACP" => Self::WriteAcp,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A single (grantee, permission) entry of a bucket ACL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub grantee: GranteeType,
    pub permission: Permission,
}

impl AccessGrant {
    pub fn new(grantee: GranteeType, permission: Permission) -> Self {
        Self {
            grantee,
            permission,
        }
    }

    pub fn owner_full_control() -> Self {
        Self::new(GranteeType::CanonicalUser, Permission::FullControl)
    }
}

/// Bucket access control list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAcl {
    /// Canonical id of the bucket owner
    pub owner: String,
    pub grants: Vec<AccessGrant>,
}

impl BucketAcl {
    /// Private means exactly one grant: the owner with full control.
    pub fn is_private(&self) -> bool {
        matches!(self.grants.as_slice(), [grant] if *grant == AccessGrant::owner_full_control())
    }
}

/// Predefined ACLs a bucket can be reset to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    Private,
    PublicRead,
}

impl CannedAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static website hosting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteConfig {
    /// Suffix appended to directory requests (e.g. `index.html`)
    pub index_document: String,
    /// Object returned for 4xx errors (e.g. `error.html`)
    pub error_document: String,
}

// ========== Certificates ==========

/// Entry of the account's certificate listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub expire_time: Option<String>,
}

/// Certificate looked up by name. `id` is `None` when no certificate matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRef {
    pub name: String,
    pub id: Option<String>,
}

impl CertificateRef {
    pub fn found(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.as_deref().is_none_or(str::is_empty)
    }
}

/// Request to push a certificate to another cloud service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePush {
    pub certificate_id: String,
    pub target_service: String,
    pub target_project: String,
}

// ========== CDN ==========

/// Origin a CDN domain pulls content from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnOrigin {
    /// Hostname of the origin (the bucket website endpoint)
    pub host: String,
    pub origin_type: String,
    pub active_standby: u8,
    pub enable_web_hosting: bool,
}

impl CdnOrigin {
    /// Primary origin backed by a bucket with static web hosting enabled
    pub fn bucket_website(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            origin_type: "obs_bucket".to_string(),
            active_standby: 1,
            enable_web_hosting: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnDomainSpec {
    pub domain_name: String,
    pub business_type: String,
    pub origin: CdnOrigin,
    pub service_area: String,
}

/// Result of a domain creation call; `id` is validated by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDomain {
    pub id: Option<String>,
    pub domain_name: Option<String>,
    pub cname: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpsStatus {
    Disabled,
    /// HTTPS between client and CDN node only
    Enabled,
    /// HTTPS on the origin leg as well
    FullLink,
}

impl HttpsStatus {
    pub fn code(&self) -> u8 {
        match self {
            HttpsStatus::Disabled => 0,
            HttpsStatus::Enabled => 2,
            HttpsStatus::FullLink => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateType {
    /// Certificate uploaded by the account owner
    Own,
    /// Certificate managed by the certificate service
    Managed,
}

impl CertificateType {
    pub fn code(&self) -> u8 {
        match self {
            CertificateType::Own => 1,
            CertificateType::Managed => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpsBinding {
    pub certificate_name: String,
    pub status: HttpsStatus,
    pub certificate_type: CertificateType,
}

impl HttpsBinding {
    pub fn enabled(certificate_name: impl Into<String>) -> Self {
        Self {
            certificate_name: certificate_name.into(),
            status: HttpsStatus::Enabled,
            certificate_type: CertificateType::Own,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Wildcard,
    Full,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Wildcard => "wildcard",
            MatchType::Full => "full",
        }
    }
}

/// Back-to-origin URL rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRewriteRule {
    pub priority: u32,
    pub match_type: MatchType,
    pub source_url: String,
    pub target_url: String,
}

impl UrlRewriteRule {
    /// Forward every path to `/{prefix}/$1` on the origin
    pub fn path_prefix(prefix: &str) -> Self {
        Self {
            priority: 1,
            match_type: MatchType::Wildcard,
            source_url: "/*".to_string(),
            target_url: format!("/{}/$1", prefix.trim_matches('/')),
        }
    }
}

/// Partial domain configuration pushed in a single update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub origin_request_url_rewrite: Vec<UrlRewriteRule>,
}

/// Response headers forced on every CDN response, keyed by header name
pub type ResponseHeaders = BTreeMap<String, String>;
