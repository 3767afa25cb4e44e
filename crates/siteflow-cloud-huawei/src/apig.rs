//! Shared transport for services behind the API gateway (CDN, SCM)

use crate::error::{HuaweiError, Result};
use crate::signer::{self, Headers};
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use siteflow_cloud::Credentials;
use url::Url;

const DOMAIN_ID_HEADER: &str = "x-domain-id";

pub(crate) struct ApigClient {
    http: reqwest::Client,
    credentials: Credentials,
    base: Url,
    domain_id: Option<String>,
}

impl ApigClient {
    pub fn new(
        http: reqwest::Client,
        credentials: Credentials,
        endpoint: &str,
        domain_id: Option<String>,
    ) -> Result<Self> {
        let base = Url::parse(endpoint)
            .map_err(|e| HuaweiError::InvalidConfig(format!("endpoint {}: {}", endpoint, e)))?;
        Ok(Self {
            http,
            credentials,
            base,
            domain_id,
        })
    }

    /// Build `{endpoint}/{segments...}?{query}`, percent-encoding every segment
    pub fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let path = segments
            .iter()
            .map(|s| signer::uri_encode(s, true))
            .collect::<Vec<_>>()
            .join("/");
        let mut url = self
            .base
            .join(&format!("/{}", path))
            .map_err(|e| HuaweiError::InvalidConfig(e.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send a signed JSON request and return the raw status and body
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<(u16, String)> {
        let payload = match body {
            Some(body) => serde_json::to_vec(body)?,
            None => Vec::new(),
        };

        let mut headers: Headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(domain_id) = &self.domain_id {
            headers.push((DOMAIN_ID_HEADER.to_string(), domain_id.clone()));
        }
        signer::sign_apig(
            &self.credentials,
            method.as_str(),
            url,
            &mut headers,
            &payload,
            Utc::now(),
        )?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url.clone());
        for (name, value) in headers.iter().filter(|(name, _)| name != "host") {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.body(payload).send().await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Turn a non-2xx answer into [`HuaweiError::Api`] (404 into `NotFound`)
pub(crate) fn check_status(status: u16, body: &str, resource: &str) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let (code, message) = parse_error(body).unwrap_or_else(|| {
        (format!("HTTP{}", status), body.trim().to_string())
    });
    if status == 404 {
        return Err(HuaweiError::NotFound(format!("{} ({})", resource, code)));
    }
    Err(HuaweiError::Api {
        status,
        code,
        message,
    })
}

/// Read `error_code` / `error_msg`, either top level (SCM, gateway) or
/// nested under `error` (CDN)
pub(crate) fn parse_error(body: &str) -> Option<(String, String)> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = match parsed.error {
        Some(nested) => nested,
        None => ErrorDetail {
            error_code: parsed.error_code,
            error_msg: parsed.error_msg,
        },
    };
    let code = detail.error_code?;
    Some((code, detail.error_msg.unwrap_or_default()))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApigClient {
        ApigClient::new(
            reqwest::Client::new(),
            Credentials::new("AK", "SK", "ap-southeast-1"),
            "https://cdn.myhuaweicloud.com",
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_url_encodes_segments() {
        let url = client()
            .url(&["v1.1", "cdn", "configuration", "domains", "www.example.com", "configs"], &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://cdn.myhuaweicloud.com/v1.1/cdn/configuration/domains/www.example.com/configs"
        );

        let url = client()
            .url(&["v3", "scm", "certificates"], &[("limit", "50".to_string())])
            .unwrap();
        assert_eq!(url.query(), Some("limit=50"));
    }

    #[test]
    fn test_parse_both_error_shapes() {
        assert_eq!(
            parse_error(r#"{"error_code":"SCM.0211","error_msg":"pushed"}"#),
            Some(("SCM.0211".to_string(), "pushed".to_string()))
        );
        assert_eq!(
            parse_error(r#"{"error":{"error_code":"CDN.0001","error_msg":"bad"}}"#),
            Some(("CDN.0001".to_string(), "bad".to_string()))
        );
        assert_eq!(parse_error("<html>"), None);
        assert_eq!(parse_error("{}"), None);
    }

    #[test]
    fn test_check_status_falls_back_to_http_code() {
        match check_status(502, "Bad Gateway", "cdn").unwrap_err() {
            HuaweiError::Api { code, message, .. } => {
                assert_eq!(code, "HTTP502");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            check_status(404, "{}", "cdn").unwrap_err(),
            HuaweiError::NotFound(_)
        ));
    }
}
