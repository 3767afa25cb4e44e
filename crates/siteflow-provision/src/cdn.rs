//! CDN provisioning
//!
//! Linear stages, each gating the next:
//!
//! 1. resolve the certificate by name
//! 2. push it to the CDN service (an "already associated" answer is fine)
//! 3. create the domain with the bucket website endpoint as origin
//! 4. bind HTTPS with the certificate
//! 5. install the origin path rewrite
//! 6. force response headers
//!
//! Stages 4-6 are best effort unless [`CdnOptions::strict`] is set: their
//! failures end up in [`CdnOutcome::warnings`] instead of aborting.

use crate::accepted;
use crate::error::{ProvisionError, Result};
use crate::report::{CdnOutcome, Step, StepWarning};
use serde::{Deserialize, Serialize};
use siteflow_cloud::{
    CdnDomainSpec, CdnOrigin, CertificatePush, CertificateRef, CloudError, DomainConfig,
    HttpsBinding, ResourceClient, ResponseHeaders, UrlRewriteRule,
};

pub const TARGET_SERVICE_CDN: &str = "CDN";
pub const DEFAULT_SERVICE_AREA: &str = "outside_mainland_china";
pub const DEFAULT_BUSINESS_TYPE: &str = "web";

pub fn default_response_headers() -> ResponseHeaders {
    ResponseHeaders::from([("Content-Disposition".to_string(), "inline".to_string())])
}

/// Desired CDN domain in front of a hosted bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnRequest {
    pub domain_name: String,
    /// Origin path prefix every request is rewritten under
    pub subdomain: String,
    pub bucket: String,
    pub region: String,
    pub certificate_name: String,
    pub service_area: String,
    pub response_headers: ResponseHeaders,
}

impl CdnRequest {
    pub fn new(
        domain_name: impl Into<String>,
        subdomain: impl Into<String>,
        bucket: impl Into<String>,
        region: impl Into<String>,
        certificate_name: impl Into<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            subdomain: subdomain.into(),
            bucket: bucket.into(),
            region: region.into(),
            certificate_name: certificate_name.into(),
            service_area: DEFAULT_SERVICE_AREA.to_string(),
            response_headers: default_response_headers(),
        }
    }

    pub fn with_service_area(mut self, service_area: impl Into<String>) -> Self {
        self.service_area = service_area.into();
        self
    }

    pub fn with_response_headers(mut self, headers: ResponseHeaders) -> Self {
        self.response_headers = headers;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CdnOptions {
    /// Abort on HTTPS / rewrite / header failures instead of warning
    pub strict: bool,
}

pub struct CdnProvisioner<'a> {
    client: &'a dyn ResourceClient,
    options: CdnOptions,
}

impl<'a> CdnProvisioner<'a> {
    pub fn new(client: &'a dyn ResourceClient) -> Self {
        Self {
            client,
            options: CdnOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CdnOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every stage for `request`
    pub async fn provision(&self, request: &CdnRequest) -> Result<CdnOutcome> {
        let certificate = self.resolve_certificate(&request.certificate_name).await;
        let certificate_id = self
            .push_certificate(&certificate, TARGET_SERVICE_CDN, &request.region)
            .await?;

        let spec = self.domain_spec(request);
        let (domain_id, cname) = self.create_domain(&spec).await?;

        let mut warnings = Vec::new();
        let https = self.bind_https(&request.domain_name, &domain_id, &request.certificate_name);
        self.best_effort(https.await, &mut warnings)?;

        let rewrite = self.apply_path_rewrite(&request.domain_name, &request.subdomain);
        self.best_effort(rewrite.await, &mut warnings)?;

        let headers = self.set_response_headers(
            &request.domain_name,
            &domain_id,
            &request.response_headers,
        );
        self.best_effort(headers.await, &mut warnings)?;

        Ok(CdnOutcome {
            domain_name: request.domain_name.clone(),
            domain_id,
            certificate_id,
            cname,
            warnings,
        })
    }

    /// Linear scan of the certificate listing. No match, or a listing that
    /// cannot be fetched, yields an empty reference.
    pub async fn resolve_certificate(&self, name: &str) -> CertificateRef {
        match accepted(self.client.list_certificates().await) {
            Ok(certificates) => match certificates.into_iter().find(|c| c.name == name) {
                Some(certificate) => {
                    tracing::info!("Found certificate {} ({})", name, certificate.id);
                    CertificateRef::found(name, certificate.id)
                }
                None => {
                    tracing::warn!("No certificate named {}", name);
                    CertificateRef::missing(name)
                }
            },
            Err(e) => {
                tracing::error!("Failed to list certificates while looking for {}: {}", name, e);
                CertificateRef::missing(name)
            }
        }
    }

    /// Push the certificate to `target_service`. Returns the certificate id.
    ///
    /// An empty reference fails with [`ProvisionError::CertificateNotFound`]
    /// before anything is sent.
    pub async fn push_certificate(
        &self,
        certificate: &CertificateRef,
        target_service: &str,
        target_project: &str,
    ) -> Result<String> {
        let certificate_id = match certificate.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(ProvisionError::CertificateNotFound(certificate.name.clone())),
        };

        let push = CertificatePush {
            certificate_id: certificate_id.clone(),
            target_service: target_service.to_string(),
            target_project: target_project.to_string(),
        };

        match accepted(self.client.push_certificate(&push).await) {
            Ok(()) => {
                tracing::info!(
                    "Certificate {} pushed to {} ({})",
                    certificate.name,
                    target_service,
                    target_project
                );
                Ok(certificate_id)
            }
            Err(CloudError::AlreadyAssociated(_)) => {
                tracing::info!(
                    "Certificate {} is already pushed to {}",
                    certificate.name,
                    target_service
                );
                Ok(certificate_id)
            }
            Err(source) => Err(ProvisionError::CertificatePush {
                certificate: certificate.name.clone(),
                source,
            }),
        }
    }

    /// Domain definition with the bucket website endpoint as origin
    pub fn domain_spec(&self, request: &CdnRequest) -> CdnDomainSpec {
        let host = self
            .client
            .website_endpoint(&request.bucket, &request.region);
        CdnDomainSpec {
            domain_name: request.domain_name.clone(),
            business_type: DEFAULT_BUSINESS_TYPE.to_string(),
            origin: CdnOrigin::bucket_website(host),
            service_area: request.service_area.clone(),
        }
    }

    /// Create the domain. Returns its id and CNAME.
    pub async fn create_domain(&self, spec: &CdnDomainSpec) -> Result<(String, Option<String>)> {
        let domain_error = |source| ProvisionError::DomainCreation {
            domain: spec.domain_name.clone(),
            source,
        };

        let created = accepted(self.client.create_cdn_domain(spec).await).map_err(domain_error)?;
        match created.id {
            Some(id) if !id.is_empty() => {
                tracing::info!("CDN domain {} created with id {}", spec.domain_name, id);
                Ok((id, created.cname))
            }
            _ => Err(domain_error(CloudError::MalformedResponse(format!(
                "creating {} returned no domain id",
                spec.domain_name
            )))),
        }
    }

    pub async fn bind_https(
        &self,
        domain_name: &str,
        domain_id: &str,
        certificate_name: &str,
    ) -> Result<()> {
        let https = HttpsBinding::enabled(certificate_name);
        accepted(self.client.update_https_info(domain_id, &https).await)
            .map_err(|source| config_error(domain_name, Step::BindHttps, source))?;
        tracing::info!("HTTPS enabled on {} with {}", domain_name, certificate_name);
        Ok(())
    }

    /// Rewrite every path to `/{subdomain}/$1` on the origin
    pub async fn apply_path_rewrite(&self, domain_name: &str, subdomain: &str) -> Result<()> {
        let config = DomainConfig {
            origin_request_url_rewrite: vec![UrlRewriteRule::path_prefix(subdomain)],
        };
        accepted(self.client.update_domain_config(domain_name, &config).await)
            .map_err(|source| config_error(domain_name, Step::PathRewrite, source))?;
        tracing::info!("Origin rewrite /* -> /{}/$1 installed on {}", subdomain, domain_name);
        Ok(())
    }

    pub async fn set_response_headers(
        &self,
        domain_name: &str,
        domain_id: &str,
        headers: &ResponseHeaders,
    ) -> Result<()> {
        accepted(self.client.update_response_headers(domain_id, headers).await)
            .map_err(|source| config_error(domain_name, Step::ResponseHeaders, source))?;
        tracing::info!("{} response header(s) set on {}", headers.len(), domain_name);
        Ok(())
    }

    fn best_effort(&self, result: Result<()>, warnings: &mut Vec<StepWarning>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if self.options.strict => Err(e),
            Err(e) => {
                tracing::warn!("{}", e);
                warnings.push(StepWarning {
                    step: e.step(),
                    error: e.to_string(),
                });
                Ok(())
            }
        }
    }
}

fn config_error(domain_name: &str, step: Step, source: CloudError) -> ProvisionError {
    ProvisionError::DomainConfig {
        domain: domain_name.to_string(),
        step,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockClient, PushReply, Reply, certificate};
    use siteflow_cloud::MatchType;

    fn request() -> CdnRequest {
        CdnRequest::new(
            "www.example.com",
            "site-1",
            "site-1",
            "ap-southeast-1",
            "cert-A",
        )
    }

    fn client_with_certificate() -> MockClient {
        MockClient::with(|s| {
            s.certificates = vec![
                certificate("scs-0", "other"),
                certificate("scs-1", "cert-A"),
            ]
        })
    }

    #[tokio::test]
    async fn test_provision_domain() {
        let client = client_with_certificate();
        let provisioner = CdnProvisioner::new(&client);

        let outcome = provisioner.provision(&request()).await.unwrap();

        assert_eq!(outcome.domain_id, "domain-1");
        assert_eq!(outcome.certificate_id, "scs-1");
        assert!(outcome.is_fully_configured());

        let state = client.state();
        assert_eq!(
            state.pushes,
            vec![CertificatePush {
                certificate_id: "scs-1".to_string(),
                target_service: "CDN".to_string(),
                target_project: "ap-southeast-1".to_string(),
            }]
        );

        let domain = &state.domains[0];
        assert_eq!(domain.domain_name, "www.example.com");
        assert_eq!(domain.business_type, "web");
        assert_eq!(domain.service_area, "outside_mainland_china");
        assert_eq!(domain.origin.host, "site-1.website.ap-southeast-1.example.test");
        assert_eq!(domain.origin.origin_type, "obs_bucket");

        let (domain_id, https) = &state.https_bindings[0];
        assert_eq!(domain_id, "domain-1");
        assert_eq!(https, &HttpsBinding::enabled("cert-A"));

        let (domain_name, config) = &state.domain_configs[0];
        assert_eq!(domain_name, "www.example.com");
        assert_eq!(config.origin_request_url_rewrite.len(), 1);
        let rule = &config.origin_request_url_rewrite[0];
        assert_eq!(rule.match_type, MatchType::Wildcard);
        assert_eq!(rule.source_url, "/*");
        assert_eq!(rule.target_url, "/site-1/$1");

        let (_, headers) = &state.response_headers[0];
        assert_eq!(headers["Content-Disposition"], "inline");
    }

    #[tokio::test]
    async fn test_resolve_missing_certificate_is_empty() {
        let client = client_with_certificate();
        let provisioner = CdnProvisioner::new(&client);

        let certificate = provisioner.resolve_certificate("X").await;

        assert!(certificate.is_empty());
        assert_eq!(certificate.name, "X");
    }

    #[tokio::test]
    async fn test_resolve_with_failing_listing_is_empty() {
        let client = MockClient::with(|s| s.list_certificates_error = true);
        let provisioner = CdnProvisioner::new(&client);

        assert!(provisioner.resolve_certificate("cert-A").await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_certificate_fails_before_domain_creation() {
        let client = MockClient::new();
        let provisioner = CdnProvisioner::new(&client);

        let err = provisioner.provision(&request()).await.unwrap_err();

        assert!(matches!(err, ProvisionError::CertificateNotFound(ref name) if name == "cert-A"));
        assert_eq!(err.step(), Step::PushCertificate);
        assert_eq!(client.count("push_certificate"), 0);
        assert_eq!(client.count("create_cdn_domain"), 0);
    }

    #[tokio::test]
    async fn test_already_pushed_certificate_is_tolerated() {
        let client = client_with_certificate();
        client.state().push = PushReply::AlreadyAssociated;
        let provisioner = CdnProvisioner::new(&client);

        let outcome = provisioner.provision(&request()).await.unwrap();

        assert_eq!(outcome.domain_id, "domain-1");
        assert_eq!(client.count("create_cdn_domain"), 1);
    }

    #[tokio::test]
    async fn test_other_push_failures_abort() {
        let client = client_with_certificate();
        client.state().push = PushReply::Error;
        let provisioner = CdnProvisioner::new(&client);

        let err = provisioner.provision(&request()).await.unwrap_err();

        assert!(matches!(err, ProvisionError::CertificatePush { .. }));
        assert_eq!(client.count("create_cdn_domain"), 0);
    }

    #[tokio::test]
    async fn test_domain_without_id_fails() {
        let client = client_with_certificate();
        client.state().domain_id = None;
        let provisioner = CdnProvisioner::new(&client);

        let err = provisioner.provision(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::DomainCreation {
                source: CloudError::MalformedResponse(_),
                ..
            }
        ));
        assert_eq!(client.count("update_https_info"), 0);
    }

    #[tokio::test]
    async fn test_domain_creation_status_failure() {
        let client = client_with_certificate();
        client.state().create_domain = Reply::Status(400);
        let provisioner = CdnProvisioner::new(&client);

        let err = provisioner.provision(&request()).await.unwrap_err();

        assert_eq!(err.step(), Step::CreateDomain);
    }

    #[tokio::test]
    async fn test_configuration_failures_are_warnings_by_default() {
        let client = client_with_certificate();
        {
            let mut state = client.state();
            state.https = Reply::Error;
            state.headers = Reply::Status(500);
        }
        let provisioner = CdnProvisioner::new(&client);

        let outcome = provisioner.provision(&request()).await.unwrap();

        let steps: Vec<Step> = outcome.warnings.iter().map(|w| w.step).collect();
        assert_eq!(steps, vec![Step::BindHttps, Step::ResponseHeaders]);
        // Later stages still ran
        assert_eq!(client.count("update_domain_config"), 1);
        assert_eq!(client.count("update_response_headers"), 1);
    }

    #[tokio::test]
    async fn test_strict_mode_aborts_on_configuration_failure() {
        let client = client_with_certificate();
        client.state().https = Reply::Error;
        let provisioner =
            CdnProvisioner::new(&client).with_options(CdnOptions { strict: true });

        let err = provisioner.provision(&request()).await.unwrap_err();

        assert_eq!(err.step(), Step::BindHttps);
        assert_eq!(client.count("update_domain_config"), 0);
    }

    #[test]
    fn test_request_defaults() {
        let request = request()
            .with_service_area("global")
            .with_response_headers(ResponseHeaders::new());
        assert_eq!(request.service_area, "global");
        assert!(request.response_headers.is_empty());
        assert_eq!(
            default_response_headers().get("Content-Disposition").map(String::as_str),
            Some("inline")
        );
    }
}
