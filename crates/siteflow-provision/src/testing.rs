//! In-memory `ResourceClient` used by the workflow tests

use async_trait::async_trait;
use siteflow_cloud::{
    AccessGrant, ApiResponse, BucketAcl, CannedAcl, CdnDomainSpec, Certificate, CertificatePush,
    CloudError, CreatedDomain, DomainConfig, GranteeType, HttpsBinding, Permission,
    ResourceClient, ResponseHeaders, WebsiteConfig,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// How a mocked call should answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    /// Respond, but with this (failing) status code
    Status(u16),
    /// Fail with a structured service error
    Error,
    /// Fail because the resource already exists
    Taken,
}

impl Reply {
    fn answer(self, call: &str) -> siteflow_cloud::Result<ApiResponse<()>> {
        match self {
            Reply::Ok => Ok(ApiResponse::empty(200)),
            Reply::Status(status) => Ok(ApiResponse::empty(status)),
            Reply::Error => Err(CloudError::service(400, "Mock.Error", format!("{} failed", call))),
            Reply::Taken => Err(CloudError::AlreadyExists(call.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushReply {
    Ok,
    AlreadyAssociated,
    Error,
}

pub struct MockState {
    pub buckets: HashSet<String>,
    /// Fail the existence probe with a non-404 error
    pub head_error: bool,
    /// Answer the existence probe with this reply instead
    pub head: Option<Reply>,
    pub create: Reply,
    /// `None` makes `get_bucket_acl` report a malformed response
    pub acl: Option<BucketAcl>,
    pub acl_fetch: Reply,
    pub set_acl: Reply,
    pub policy: Reply,
    pub website: Reply,
    /// Object keys whose upload fails with a 403
    pub failing_keys: HashSet<String>,
    pub certificates: Vec<Certificate>,
    pub list_certificates_error: bool,
    pub push: PushReply,
    pub domain_id: Option<String>,
    pub create_domain: Reply,
    pub https: Reply,
    pub domain_config: Reply,
    pub headers: Reply,

    // recorded calls
    pub calls: Vec<String>,
    pub policies: Vec<String>,
    pub websites: Vec<WebsiteConfig>,
    pub uploads: HashMap<String, PathBuf>,
    pub pushes: Vec<CertificatePush>,
    pub domains: Vec<CdnDomainSpec>,
    pub https_bindings: Vec<(String, HttpsBinding)>,
    pub domain_configs: Vec<(String, DomainConfig)>,
    pub response_headers: Vec<(String, ResponseHeaders)>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            buckets: HashSet::new(),
            head_error: false,
            head: None,
            create: Reply::Ok,
            acl: Some(private_acl()),
            acl_fetch: Reply::Ok,
            set_acl: Reply::Ok,
            policy: Reply::Ok,
            website: Reply::Ok,
            failing_keys: HashSet::new(),
            certificates: Vec::new(),
            list_certificates_error: false,
            push: PushReply::Ok,
            domain_id: Some("domain-1".to_string()),
            create_domain: Reply::Ok,
            https: Reply::Ok,
            domain_config: Reply::Ok,
            headers: Reply::Ok,
            calls: Vec::new(),
            policies: Vec::new(),
            websites: Vec::new(),
            uploads: HashMap::new(),
            pushes: Vec::new(),
            domains: Vec::new(),
            https_bindings: Vec::new(),
            domain_configs: Vec::new(),
            response_headers: Vec::new(),
        }
    }
}

pub fn private_acl() -> BucketAcl {
    BucketAcl {
        owner: "owner-id".to_string(),
        grants: vec![AccessGrant::owner_full_control()],
    }
}

pub fn public_read_acl() -> BucketAcl {
    BucketAcl {
        owner: "owner-id".to_string(),
        grants: vec![
            AccessGrant::owner_full_control(),
            AccessGrant::new(GranteeType::Group, Permission::Read),
        ],
    }
}

pub fn certificate(id: &str, name: &str) -> Certificate {
    Certificate {
        id: id.to_string(),
        name: name.to_string(),
        domain: None,
        expire_time: None,
    }
}

#[derive(Default)]
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(configure: impl FnOnce(&mut MockState)) -> Self {
        let client = Self::new();
        configure(&mut client.state());
        client
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: &str) {
        self.state().calls.push(call.to_string());
    }
}

#[async_trait]
impl ResourceClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn website_endpoint(&self, bucket: &str, region: &str) -> String {
        format!("{}.website.{}.example.test", bucket, region)
    }

    async fn head_bucket(&self, bucket: &str) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("head_bucket");
        let state = self.state();
        if state.head_error {
            return Err(CloudError::service(403, "AccessDenied", "probe denied"));
        }
        if let Some(reply) = state.head {
            return reply.answer("head_bucket");
        }
        if state.buckets.contains(bucket) {
            Ok(ApiResponse::empty(200))
        } else {
            Err(CloudError::NotFound(bucket.to_string()))
        }
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        _region: &str,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("create_bucket");
        let reply = self.state().create;
        let response = reply.answer("create_bucket")?;
        if response.is_success() {
            self.state().buckets.insert(bucket.to_string());
        }
        Ok(response)
    }

    async fn get_bucket_acl(&self, bucket: &str) -> siteflow_cloud::Result<ApiResponse<BucketAcl>> {
        self.record("get_bucket_acl");
        let state = self.state();
        let status = state.acl_fetch.answer("get_bucket_acl")?.status;
        match &state.acl {
            Some(acl) => Ok(ApiResponse::new(status, acl.clone())),
            None => Err(CloudError::MalformedResponse(format!(
                "ACL of {} has no owner",
                bucket
            ))),
        }
    }

    async fn set_bucket_acl(
        &self,
        _bucket: &str,
        acl: CannedAcl,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("set_bucket_acl");
        let mut state = self.state();
        let response = state.set_acl.answer("set_bucket_acl")?;
        if response.is_success() && acl == CannedAcl::Private {
            state.acl = Some(private_acl());
        }
        Ok(response)
    }

    async fn set_bucket_policy(
        &self,
        _bucket: &str,
        policy: &str,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("set_bucket_policy");
        let mut state = self.state();
        state.policies.push(policy.to_string());
        state.policy.answer("set_bucket_policy")
    }

    async fn set_bucket_website(
        &self,
        _bucket: &str,
        website: &WebsiteConfig,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("set_bucket_website");
        let mut state = self.state();
        state.websites.push(website.clone());
        state.website.answer("set_bucket_website")
    }

    async fn put_file(
        &self,
        _bucket: &str,
        key: &str,
        path: &Path,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("put_file");
        let mut state = self.state();
        if state.failing_keys.contains(key) {
            return Err(CloudError::service(403, "AccessDenied", "upload denied"));
        }
        state.uploads.insert(key.to_string(), path.to_path_buf());
        Ok(ApiResponse::empty(200))
    }

    async fn list_certificates(&self) -> siteflow_cloud::Result<ApiResponse<Vec<Certificate>>> {
        self.record("list_certificates");
        let state = self.state();
        if state.list_certificates_error {
            return Err(CloudError::Transport("connection reset".to_string()));
        }
        Ok(ApiResponse::ok(state.certificates.clone()))
    }

    async fn push_certificate(
        &self,
        push: &CertificatePush,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("push_certificate");
        let mut state = self.state();
        state.pushes.push(push.clone());
        match state.push {
            PushReply::Ok => Ok(ApiResponse::empty(200)),
            PushReply::AlreadyAssociated => Err(CloudError::AlreadyAssociated(
                push.certificate_id.clone(),
            )),
            PushReply::Error => Err(CloudError::service(400, "SCM.0002", "push rejected")),
        }
    }

    async fn create_cdn_domain(
        &self,
        spec: &CdnDomainSpec,
    ) -> siteflow_cloud::Result<ApiResponse<CreatedDomain>> {
        self.record("create_cdn_domain");
        let mut state = self.state();
        state.domains.push(spec.clone());
        let status = state.create_domain.answer("create_cdn_domain")?.status;
        Ok(ApiResponse::new(
            status,
            CreatedDomain {
                id: state.domain_id.clone(),
                domain_name: Some(spec.domain_name.clone()),
                cname: Some(format!("{}.cdn.example.test", spec.domain_name)),
            },
        ))
    }

    async fn update_https_info(
        &self,
        domain_id: &str,
        https: &HttpsBinding,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("update_https_info");
        let mut state = self.state();
        state
            .https_bindings
            .push((domain_id.to_string(), https.clone()));
        state.https.answer("update_https_info")
    }

    async fn update_domain_config(
        &self,
        domain_name: &str,
        config: &DomainConfig,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("update_domain_config");
        let mut state = self.state();
        state
            .domain_configs
            .push((domain_name.to_string(), config.clone()));
        state.domain_config.answer("update_domain_config")
    }

    async fn update_response_headers(
        &self,
        domain_id: &str,
        headers: &ResponseHeaders,
    ) -> siteflow_cloud::Result<ApiResponse<()>> {
        self.record("update_response_headers");
        let mut state = self.state();
        state
            .response_headers
            .push((domain_id.to_string(), headers.clone()));
        state.headers.answer("update_response_headers")
    }
}
