//! SCM (SSL Certificate Manager) API

use crate::apig::{ApigClient, check_status, parse_error};
use crate::error::{HuaweiError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use siteflow_cloud::{Certificate, CertificatePush};

pub const DEFAULT_SCM_ENDPOINT: &str = "https://scm.ap-southeast-1.myhuaweicloud.com";

/// Returned when the certificate already sits in the target service
pub const ALREADY_PUSHED_CODE: &str = "SCM.0211";

const PAGE_SIZE: usize = 50;

pub struct ScmApi {
    apig: ApigClient,
}

impl ScmApi {
    pub(crate) fn new(apig: ApigClient) -> Self {
        Self { apig }
    }

    /// Every certificate of the account, following pagination
    pub async fn list_certificates(&self) -> Result<(u16, Vec<Certificate>)> {
        let mut certificates = Vec::new();
        let mut status = 200;

        loop {
            let url = self.apig.url(
                &["v3", "scm", "certificates"],
                &[
                    ("limit", PAGE_SIZE.to_string()),
                    ("offset", certificates.len().to_string()),
                ],
            )?;
            let (page_status, text) = self.apig.call::<()>(Method::GET, &url, None).await?;
            check_status(page_status, &text, "certificates")?;
            status = page_status;

            let page: CertificatePage = serde_json::from_str(&text)?;
            let fetched = page.certificates.len();
            certificates.extend(page.certificates.into_iter().map(Certificate::from));

            let total = page.total_count.unwrap_or(certificates.len());
            if fetched == 0 || fetched < PAGE_SIZE || certificates.len() >= total {
                break;
            }
        }

        tracing::debug!("Listed {} certificate(s)", certificates.len());
        Ok((status, certificates))
    }

    /// Push a certificate to another service.
    /// `SCM.0211` comes back as [`HuaweiError::AlreadyPushed`].
    pub async fn push_certificate(&self, push: &CertificatePush) -> Result<u16> {
        let url = self.apig.url(
            &["v3", "scm", "certificates", &push.certificate_id, "push"],
            &[],
        )?;
        let body = PushRequest {
            target_project: &push.target_project,
            target_service: &push.target_service,
        };

        let (status, text) = self.apig.call(Method::POST, &url, Some(&body)).await?;
        if !(200..300).contains(&status)
            && parse_error(&text).is_some_and(|(code, _)| code == ALREADY_PUSHED_CODE)
        {
            return Err(HuaweiError::AlreadyPushed(push.certificate_id.clone()));
        }
        check_status(status, &text, &push.certificate_id)?;
        Ok(status)
    }
}

#[derive(Debug, Deserialize)]
struct CertificatePage {
    #[serde(default)]
    certificates: Vec<CertificateBody>,
    #[serde(default)]
    total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CertificateBody {
    id: String,
    name: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    expire_time: Option<String>,
}

impl From<CertificateBody> for Certificate {
    fn from(body: CertificateBody) -> Self {
        Certificate {
            id: body.id,
            name: body.name,
            domain: body.domain,
            expire_time: body.expire_time,
        }
    }
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    target_project: &'a str,
    target_service: &'a str,
}
