//! Step and result types for provisioning runs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Provisioning step, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CheckBucket,
    CreateBucket,
    PrivateAcl,
    BucketPolicy,
    WebsiteHosting,
    UploadAssets,
    PushCertificate,
    CreateDomain,
    BindHttps,
    PathRewrite,
    ResponseHeaders,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::CheckBucket => write!(f, "check-bucket"),
            Step::CreateBucket => write!(f, "create-bucket"),
            Step::PrivateAcl => write!(f, "private-acl"),
            Step::BucketPolicy => write!(f, "bucket-policy"),
            Step::WebsiteHosting => write!(f, "website-hosting"),
            Step::UploadAssets => write!(f, "upload-assets"),
            Step::PushCertificate => write!(f, "push-certificate"),
            Step::CreateDomain => write!(f, "create-domain"),
            Step::BindHttps => write!(f, "bind-https"),
            Step::PathRewrite => write!(f, "path-rewrite"),
            Step::ResponseHeaders => write!(f, "response-headers"),
        }
    }
}

/// Local file paired with the object key it is uploaded under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTask {
    pub local_path: PathBuf,
    pub object_key: String,
}

/// A file that could not be uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub path: PathBuf,

    /// Object key, when one could be derived
    pub object_key: Option<String>,

    /// HTTP status if the service answered
    pub status: Option<u16>,

    pub error: String,
}

/// Result of mirroring a directory into a bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReport {
    pub bucket: String,

    pub uploaded: Vec<UploadTask>,

    pub failed: Vec<UploadFailure>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl UploadReport {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    pub fn add_success(&mut self, task: UploadTask) {
        self.uploaded.push(task);
    }

    pub fn add_failure(&mut self, failure: UploadFailure) {
        self.failed.push(failure);
    }
}

/// What `ensure_private_acl` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclChange {
    Unchanged,
    MadePrivate,
}

/// Result of a successful bucket provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketOutcome {
    pub bucket: String,
    pub acl: AclChange,
    /// Policy document as submitted
    pub policy: String,
}

/// A best-effort CDN configuration step that did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepWarning {
    pub step: Step,
    pub error: String,
}

/// Result of a successful CDN provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnOutcome {
    pub domain_name: String,
    pub domain_id: String,
    pub certificate_id: String,
    pub cname: Option<String>,
    /// Failures of the best-effort steps (HTTPS, rewrite, headers)
    pub warnings: Vec<StepWarning>,
}

impl CdnOutcome {
    pub fn is_fully_configured(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Result of a full bucket → upload → CDN run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub bucket: Option<BucketOutcome>,
    pub upload: Option<UploadReport>,
    pub cdn: Option<CdnOutcome>,
    /// Total execution time in milliseconds
    pub duration_ms: u64,
}
