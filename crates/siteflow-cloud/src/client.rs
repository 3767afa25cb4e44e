//! Resource client trait definition

use crate::error::{CloudError, Result};
use crate::model::{
    BucketAcl, CannedAcl, CdnDomainSpec, Certificate, CertificatePush, CreatedDomain,
    DomainConfig, HttpsBinding, ResponseHeaders, WebsiteConfig,
};
use async_trait::async_trait;
use std::path::Path;

/// Status codes at or above this value are failures
pub const SUCCESS_THRESHOLD: u16 = 300;

/// Typed response of a remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// HTTP status code reported by the service
    pub status: u16,

    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, body: T) -> Self {
        Self { status, body }
    }

    pub fn ok(body: T) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        self.status < SUCCESS_THRESHOLD
    }

    /// Classify the response, turning `status >= 300` into [`CloudError::Service`]
    pub fn into_result(self) -> Result<T> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(CloudError::service(
                self.status,
                format!("HTTP{}", self.status),
                "request was not accepted",
            ))
        }
    }
}

impl ApiResponse<()> {
    pub fn empty(status: u16) -> Self {
        Self::new(status, ())
    }
}

/// Cloud capability set needed to host a static website
///
/// Implementations wrap one vendor's APIs. The provisioning workflow only
/// uses this trait and never branches on which vendor sits behind it.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Returns the vendor name (e.g., "huawei-cloud")
    fn name(&self) -> &str;

    /// Hostname serving `bucket` as a static website in `region`
    fn website_endpoint(&self, bucket: &str, region: &str) -> String;

    // ========== Object storage ==========

    /// Probe a bucket. A missing bucket is reported as [`CloudError::NotFound`].
    async fn head_bucket(&self, bucket: &str) -> Result<ApiResponse<()>>;

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<ApiResponse<()>>;

    async fn get_bucket_acl(&self, bucket: &str) -> Result<ApiResponse<BucketAcl>>;

    async fn set_bucket_acl(&self, bucket: &str, acl: CannedAcl) -> Result<ApiResponse<()>>;

    /// Attach a JSON bucket policy
    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<ApiResponse<()>>;

    async fn set_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<ApiResponse<()>>;

    /// Upload the file at `path` as object `key`
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<ApiResponse<()>>;

    // ========== Certificates ==========

    /// List every certificate owned by the account
    async fn list_certificates(&self) -> Result<ApiResponse<Vec<Certificate>>>;

    /// Push a certificate to another service. A certificate that is already
    /// pushed there is reported as [`CloudError::AlreadyAssociated`].
    async fn push_certificate(&self, push: &CertificatePush) -> Result<ApiResponse<()>>;

    // ========== CDN ==========

    async fn create_cdn_domain(&self, spec: &CdnDomainSpec) -> Result<ApiResponse<CreatedDomain>>;

    async fn update_https_info(
        &self,
        domain_id: &str,
        https: &HttpsBinding,
    ) -> Result<ApiResponse<()>>;

    async fn update_domain_config(
        &self,
        domain_name: &str,
        config: &DomainConfig,
    ) -> Result<ApiResponse<()>>;

    async fn update_response_headers(
        &self,
        domain_id: &str,
        headers: &ResponseHeaders,
    ) -> Result<ApiResponse<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_threshold() {
        assert!(ApiResponse::empty(200).is_success());
        assert!(ApiResponse::empty(204).is_success());
        assert!(ApiResponse::empty(299).is_success());
        assert!(!ApiResponse::empty(300).is_success());
        assert!(!ApiResponse::empty(404).is_success());
    }

    #[test]
    fn test_into_result_keeps_status() {
        let err = ApiResponse::new(503, "body").into_result().unwrap_err();
        assert_eq!(err.status(), Some(503));

        let body = ApiResponse::new(201, "body").into_result().unwrap();
        assert_eq!(body, "body");
    }
}
