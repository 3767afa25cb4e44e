//! CDN domain management API

use crate::apig::{ApigClient, check_status};
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use siteflow_cloud::{CdnDomainSpec, CreatedDomain, DomainConfig, HttpsBinding, ResponseHeaders};

pub const DEFAULT_CDN_ENDPOINT: &str = "https://cdn.myhuaweicloud.com";

pub struct CdnApi {
    apig: ApigClient,
}

impl CdnApi {
    pub(crate) fn new(apig: ApigClient) -> Self {
        Self { apig }
    }

    /// Create an acceleration domain backed by the given origin
    pub async fn create_domain(&self, spec: &CdnDomainSpec) -> Result<(u16, CreatedDomain)> {
        let url = self.apig.url(&["v1.0", "cdn", "domains"], &[])?;
        let body = CreateDomainRequest::from(spec);

        let (status, text) = self.apig.call(Method::POST, &url, Some(&body)).await?;
        check_status(status, &text, &spec.domain_name)?;

        let response: CreateDomainResponse = serde_json::from_str(&text)?;
        let created = response
            .domain
            .map(|d| CreatedDomain {
                id: d.id,
                domain_name: d.domain_name,
                cname: d.cname,
            })
            .unwrap_or_default();
        Ok((status, created))
    }

    pub async fn update_https_info(&self, domain_id: &str, binding: &HttpsBinding) -> Result<u16> {
        let url = self
            .apig
            .url(&["v1.0", "cdn", "domains", domain_id, "https-info"], &[])?;
        let body = HttpsInfoRequest {
            https: HttpsInfo {
                cert_name: &binding.certificate_name,
                https_status: binding.status.code(),
                certificate_type: binding.certificate_type.code(),
            },
        };

        let (status, text) = self.apig.call(Method::PUT, &url, Some(&body)).await?;
        check_status(status, &text, domain_id)?;
        Ok(status)
    }

    pub async fn update_domain_config(
        &self,
        domain_name: &str,
        config: &DomainConfig,
    ) -> Result<u16> {
        let url = self.apig.url(
            &["v1.1", "cdn", "configuration", "domains", domain_name, "configs"],
            &[],
        )?;
        let body = DomainConfigRequest::from(config);

        let (status, text) = self.apig.call(Method::PUT, &url, Some(&body)).await?;
        check_status(status, &text, domain_name)?;
        Ok(status)
    }

    pub async fn update_response_headers(
        &self,
        domain_id: &str,
        headers: &ResponseHeaders,
    ) -> Result<u16> {
        let url = self
            .apig
            .url(&["v1.0", "cdn", "domains", domain_id, "response-header"], &[])?;
        let body = ResponseHeaderRequest { headers };

        let (status, text) = self.apig.call(Method::PUT, &url, Some(&body)).await?;
        check_status(status, &text, domain_id)?;
        Ok(status)
    }
}

// ========== Wire types ==========

#[derive(Debug, Serialize)]
struct CreateDomainRequest<'a> {
    domain: DomainBody<'a>,
}

#[derive(Debug, Serialize)]
struct DomainBody<'a> {
    domain_name: &'a str,
    business_type: &'a str,
    service_area: &'a str,
    sources: Vec<SourceBody<'a>>,
}

#[derive(Debug, Serialize)]
struct SourceBody<'a> {
    ip_or_domain: &'a str,
    origin_type: &'a str,
    active_standby: u8,
    enable_obs_web_hosting: u8,
}

impl<'a> From<&'a CdnDomainSpec> for CreateDomainRequest<'a> {
    fn from(spec: &'a CdnDomainSpec) -> Self {
        Self {
            domain: DomainBody {
                domain_name: &spec.domain_name,
                business_type: &spec.business_type,
                service_area: &spec.service_area,
                sources: vec![SourceBody {
                    ip_or_domain: &spec.origin.host,
                    origin_type: &spec.origin.origin_type,
                    active_standby: spec.origin.active_standby,
                    enable_obs_web_hosting: u8::from(spec.origin.enable_web_hosting),
                }],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateDomainResponse {
    #[serde(default)]
    domain: Option<CreatedDomainBody>,
}

#[derive(Debug, Deserialize)]
struct CreatedDomainBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    domain_name: Option<String>,
    #[serde(default)]
    cname: Option<String>,
}

#[derive(Debug, Serialize)]
struct HttpsInfoRequest<'a> {
    https: HttpsInfo<'a>,
}

#[derive(Debug, Serialize)]
struct HttpsInfo<'a> {
    cert_name: &'a str,
    https_status: u8,
    certificate_type: u8,
}

#[derive(Debug, Serialize)]
struct DomainConfigRequest<'a> {
    configs: Configs<'a>,
}

#[derive(Debug, Serialize)]
struct Configs<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    origin_request_url_rewrite: Vec<RewriteRule<'a>>,
}

#[derive(Debug, Serialize)]
struct RewriteRule<'a> {
    priority: u32,
    match_type: &'static str,
    source_url: &'a str,
    target_url: &'a str,
}

impl<'a> From<&'a DomainConfig> for DomainConfigRequest<'a> {
    fn from(config: &'a DomainConfig) -> Self {
        Self {
            configs: Configs {
                origin_request_url_rewrite: config
                    .origin_request_url_rewrite
                    .iter()
                    .map(|rule| RewriteRule {
                        priority: rule.priority,
                        match_type: rule.match_type.as_str(),
                        source_url: &rule.source_url,
                        target_url: &rule.target_url,
                    })
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseHeaderRequest<'a> {
    headers: &'a ResponseHeaders,
}
