//! [`ResourceClient`] implementation for Huawei Cloud

use crate::apig::ApigClient;
use crate::cdn::{CdnApi, DEFAULT_CDN_ENDPOINT};
use crate::error::{HuaweiError, Result};
use crate::obs::{self, ObsApi};
use crate::scm::{DEFAULT_SCM_ENDPOINT, ScmApi};
use async_trait::async_trait;
use siteflow_cloud::{
    ApiResponse, BucketAcl, CannedAcl, CdnDomainSpec, Certificate, CertificatePush,
    CreatedDomain, Credentials, DomainConfig, HttpsBinding, ResourceClient, ResponseHeaders,
    WebsiteConfig,
};
use std::path::Path;
use std::time::Duration;

pub const PROVIDER_NAME: &str = "huawei-cloud";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`HuaweiCloud`]
#[derive(Debug, Clone)]
pub struct HuaweiConfig {
    pub credentials: Credentials,
    /// Defaults to `https://obs.{region}.myhuaweicloud.com`
    pub obs_endpoint: Option<String>,
    pub cdn_endpoint: String,
    pub scm_endpoint: String,
    /// Account (domain) id sent as `X-Domain-Id` to global services
    pub domain_id: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl HuaweiConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            obs_endpoint: None,
            cdn_endpoint: DEFAULT_CDN_ENDPOINT.to_string(),
            scm_endpoint: DEFAULT_SCM_ENDPOINT.to_string(),
            domain_id: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_obs_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.obs_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_cdn_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.cdn_endpoint = endpoint.into();
        self
    }

    pub fn with_scm_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.scm_endpoint = endpoint.into();
        self
    }

    pub fn with_domain_id(mut self, domain_id: impl Into<String>) -> Self {
        self.domain_id = Some(domain_id.into());
        self
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    /// OBS endpoint actually used
    pub fn obs_endpoint(&self) -> String {
        self.obs_endpoint
            .clone()
            .unwrap_or_else(|| obs::default_endpoint(&self.credentials.region))
    }
}

/// Huawei Cloud client: OBS for storage, CDN for domains, SCM for certificates
pub struct HuaweiCloud {
    obs: ObsApi,
    cdn: CdnApi,
    scm: ScmApi,
}

impl HuaweiCloud {
    pub fn new(config: HuaweiConfig) -> Result<Self> {
        if config.credentials.access_key_id.is_empty()
            || config.credentials.secret_access_key.is_empty()
        {
            return Err(HuaweiError::InvalidConfig(
                "access key and secret key are required".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let obs = ObsApi::new(
            http.clone(),
            config.credentials.clone(),
            &config.obs_endpoint(),
        )?;
        let cdn = CdnApi::new(ApigClient::new(
            http.clone(),
            config.credentials.clone(),
            &config.cdn_endpoint,
            config.domain_id.clone(),
        )?);
        let scm = ScmApi::new(ApigClient::new(
            http,
            config.credentials,
            &config.scm_endpoint,
            config.domain_id,
        )?);

        Ok(Self { obs, cdn, scm })
    }
}

#[async_trait]
impl ResourceClient for HuaweiCloud {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn website_endpoint(&self, bucket: &str, region: &str) -> String {
        obs::website_endpoint(bucket, region)
    }

    async fn head_bucket(&self, bucket: &str) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.obs.head_bucket(bucket).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        region: &str,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.obs.create_bucket(bucket, region).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn get_bucket_acl(&self, bucket: &str) -> siteflow_cloud::Result<ApiResponse<BucketAcl>> {
        let (status, acl) = self.obs.get_bucket_acl(bucket).await?;
        Ok(ApiResponse::new(status, acl))
    }

    async fn set_bucket_acl(
        &self,
        bucket: &str,
        acl: CannedAcl,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.obs.set_bucket_acl(bucket, acl).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn set_bucket_policy(
        &self,
        bucket: &str,
        policy: &str,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.obs.set_bucket_policy(bucket, policy).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn set_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.obs.set_bucket_website(bucket, website).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.obs.put_object(bucket, key, path).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn list_certificates(&self) -> siteflow_cloud::Result<ApiResponse<Vec<Certificate>>> {
        let (status, certificates) = self.scm.list_certificates().await?;
        Ok(ApiResponse::new(status, certificates))
    }

    async fn push_certificate(
        &self,
        push: &CertificatePush,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.scm.push_certificate(push).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn create_cdn_domain(
        &self,
        spec: &CdnDomainSpec,
    ) -> siteflow_cloud::Result<ApiResponse<CreatedDomain>> {
        let (status, created) = self.cdn.create_domain(spec).await?;
        Ok(ApiResponse::new(status, created))
    }

    async fn update_https_info(
        &self,
        domain_id: &str,
        https: &HttpsBinding,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.cdn.update_https_info(domain_id, https).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn update_domain_config(
        &self,
        domain_name: &str,
        config: &DomainConfig,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.cdn.update_domain_config(domain_name, config).await?;
        Ok(ApiResponse::empty(status))
    }

    async fn update_response_headers(
        &self,
        domain_id: &str,
        headers: &ResponseHeaders,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        let status = self.cdn.update_response_headers(domain_id, headers).await?;
        Ok(ApiResponse::empty(status))
    }
}
