//! OBS (Object Storage Service) API client
//!
//! Talks to the S3 compatible OBS interface with virtual-host style URLs
//! (`https://{bucket}.obs.{region}.myhuaweicloud.com/{key}`) and SigV4.

use crate::error::{HuaweiError, Result};
use crate::signer::{self, Headers};
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use siteflow_cloud::{
    AccessGrant, BucketAcl, CannedAcl, Credentials, GranteeType, Permission, WebsiteConfig,
};
use std::path::Path;
use url::Url;

const CONTENT_TYPE: &str = "content-type";
const ACL_HEADER: &str = "x-amz-acl";
/// Error codes OBS answers when a bucket name is already taken
const BUCKET_TAKEN_CODES: [&str; 2] = ["BucketAlreadyExists", "BucketAlreadyOwnedByYou"];

/// Default OBS endpoint of a region
pub fn default_endpoint(region: &str) -> String {
    format!("https://obs.{}.myhuaweicloud.com", region)
}

/// Static website endpoint of a bucket, used as the CDN origin
pub fn website_endpoint(bucket: &str, region: &str) -> String {
    format!("{}.obs-website.{}.myhuaweicloud.com", bucket, region)
}

pub struct ObsApi {
    http: reqwest::Client,
    credentials: Credentials,
    endpoint: Url,
}

impl ObsApi {
    pub fn new(http: reqwest::Client, credentials: Credentials, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| HuaweiError::InvalidConfig(format!("OBS endpoint {}: {}", endpoint, e)))?;
        if endpoint.host_str().is_none() {
            return Err(HuaweiError::InvalidConfig(format!(
                "OBS endpoint has no host: {}",
                endpoint
            )));
        }

        Ok(Self {
            http,
            credentials,
            endpoint,
        })
    }

    /// Virtual-host style URL for a bucket, an optional object key and an
    /// optional sub-resource (`acl`, `policy`, `website`)
    pub fn bucket_url(
        &self,
        bucket: &str,
        key: Option<&str>,
        subresource: Option<&str>,
    ) -> Result<Url> {
        let host = self.endpoint.host_str().unwrap_or_default();
        let mut raw = format!("{}://{}.{}", self.endpoint.scheme(), bucket, host);
        if let Some(port) = self.endpoint.port() {
            raw.push_str(&format!(":{}", port));
        }
        raw.push('/');
        if let Some(key) = key {
            raw.push_str(&signer::uri_encode(key.trim_start_matches('/'), false));
        }
        if let Some(subresource) = subresource {
            raw.push('?');
            raw.push_str(subresource);
        }

        Url::parse(&raw).map_err(|e| HuaweiError::InvalidConfig(format!("{}: {}", raw, e)))
    }

    /// HEAD the bucket. A 404 is reported as [`HuaweiError::NotFound`].
    pub async fn head_bucket(&self, bucket: &str) -> Result<u16> {
        let url = self.bucket_url(bucket, None, None)?;
        let (status, body) = self.send(Method::HEAD, &url, Headers::new(), Vec::new()).await?;
        check_status(status, &body, bucket)?;
        Ok(status)
    }

    pub async fn create_bucket(&self, bucket: &str, region: &str) -> Result<u16> {
        let url = self.bucket_url(bucket, None, None)?;
        let body = to_xml(&CreateBucketConfigurationXml {
            location_constraint: region,
        })?;
        let headers = vec![(CONTENT_TYPE.to_string(), "application/xml".to_string())];

        let (status, body) = self.send(Method::PUT, &url, headers, body.into_bytes()).await?;
        check_status(status, &body, bucket)?;
        Ok(status)
    }

    pub async fn get_bucket_acl(&self, bucket: &str) -> Result<(u16, BucketAcl)> {
        let url = self.bucket_url(bucket, None, Some("acl"))?;
        let (status, body) = self.send(Method::GET, &url, Headers::new(), Vec::new()).await?;
        check_status(status, &body, bucket)?;
        Ok((status, parse_acl(&body)?))
    }

    pub async fn set_bucket_acl(&self, bucket: &str, acl: CannedAcl) -> Result<u16> {
        let url = self.bucket_url(bucket, None, Some("acl"))?;
        let headers = vec![(ACL_HEADER.to_string(), acl.as_str().to_string())];

        let (status, body) = self.send(Method::PUT, &url, headers, Vec::new()).await?;
        check_status(status, &body, bucket)?;
        Ok(status)
    }

    pub async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<u16> {
        let url = self.bucket_url(bucket, None, Some("policy"))?;
        let headers = vec![(CONTENT_TYPE.to_string(), "application/json".to_string())];

        let (status, body) = self
            .send(Method::PUT, &url, headers, policy.as_bytes().to_vec())
            .await?;
        check_status(status, &body, bucket)?;
        Ok(status)
    }

    pub async fn set_bucket_website(&self, bucket: &str, config: &WebsiteConfig) -> Result<u16> {
        let url = self.bucket_url(bucket, None, Some("website"))?;
        let body = to_xml(&WebsiteConfigurationXml {
            index_document: SuffixXml {
                suffix: &config.index_document,
            },
            error_document: KeyXml {
                key: &config.error_document,
            },
        })?;
        let headers = vec![(CONTENT_TYPE.to_string(), "application/xml".to_string())];

        let (status, body) = self.send(Method::PUT, &url, headers, body.into_bytes()).await?;
        check_status(status, &body, bucket)?;
        Ok(status)
    }

    /// Upload a local file as `key`
    pub async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<u16> {
        let url = self.bucket_url(bucket, Some(key), None)?;
        let content = tokio::fs::read(path).await?;
        let headers = vec![(CONTENT_TYPE.to_string(), content_type_for(path).to_string())];

        let (status, body) = self.send(Method::PUT, &url, headers, content).await?;
        check_status(status, &body, &format!("{}/{}", bucket, key))?;
        Ok(status)
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        mut headers: Headers,
        body: Vec<u8>,
    ) -> Result<(u16, String)> {
        signer::sign_obs(
            &self.credentials,
            method.as_str(),
            url,
            &mut headers,
            &body,
            Utc::now(),
        )?;
        tracing::debug!("OBS {} {}", method, url);

        let mut request = self.http.request(method, url.clone());
        for (name, value) in headers.iter().filter(|(name, _)| name != "host") {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.body(body).send().await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Map a non-2xx OBS answer to an error, reading the `<Error>` document
/// when there is one
fn check_status(status: u16, body: &str, resource: &str) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let (code, message) = match quick_xml::de::from_str::<ErrorXml>(body) {
        Ok(error) if !error.code.is_empty() => (error.code, error.message),
        _ => (format!("HTTP{}", status), body.trim().to_string()),
    };

    if status == 404 {
        return Err(HuaweiError::NotFound(format!("{} ({})", resource, code)));
    }
    if status == 409 && BUCKET_TAKEN_CODES.contains(&code.as_str()) {
        return Err(HuaweiError::AlreadyExists(format!("{} ({})", resource, code)));
    }
    Err(HuaweiError::Api {
        status,
        code,
        message,
    })
}

/// Parse an `AccessControlPolicy` document
pub fn parse_acl(xml: &str) -> Result<BucketAcl> {
    let policy: AccessControlPolicyXml =
        quick_xml::de::from_str(xml).map_err(|e| HuaweiError::Xml(e.to_string()))?;

    let grants = policy
        .access_control_list
        .grants
        .into_iter()
        .map(|grant| {
            let grantee = match grant.grantee.kind {
                Some(kind) => GranteeType::parse(&kind),
                None if grant.grantee.id.is_some() => GranteeType::CanonicalUser,
                None if grant.grantee.uri.is_some() || grant.grantee.canned.is_some() => {
                    GranteeType::Group
                }
                None => GranteeType::Other("unknown".to_string()),
            };
            AccessGrant::new(grantee, Permission::parse(grant.permission.trim()))
        })
        .collect();

    Ok(BucketAcl {
        owner: policy.owner.id,
        grants,
    })
}

fn to_xml<T: Serialize>(value: &T) -> Result<String> {
    quick_xml::se::to_string(value).map_err(|e| HuaweiError::Xml(e.to_string()))
}

/// `Content-Type` for an uploaded file, by extension
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

// ========== XML documents ==========

#[derive(Debug, Serialize)]
#[serde(rename = "CreateBucketConfiguration")]
struct CreateBucketConfigurationXml<'a> {
    #[serde(rename = "LocationConstraint")]
    location_constraint: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename = "WebsiteConfiguration")]
struct WebsiteConfigurationXml<'a> {
    #[serde(rename = "IndexDocument")]
    index_document: SuffixXml<'a>,
    #[serde(rename = "ErrorDocument")]
    error_document: KeyXml<'a>,
}

#[derive(Debug, Serialize)]
struct SuffixXml<'a> {
    #[serde(rename = "Suffix")]
    suffix: &'a str,
}

#[derive(Debug, Serialize)]
struct KeyXml<'a> {
    #[serde(rename = "Key")]
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorXml {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccessControlPolicyXml {
    #[serde(rename = "Owner")]
    owner: OwnerXml,
    #[serde(rename = "AccessControlList", default)]
    access_control_list: AccessControlListXml,
}

#[derive(Debug, Deserialize)]
struct OwnerXml {
    #[serde(rename = "ID", default)]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct AccessControlListXml {
    #[serde(rename = "Grant", default)]
    grants: Vec<GrantXml>,
}

#[derive(Debug, Deserialize)]
struct GrantXml {
    #[serde(rename = "Grantee")]
    grantee: GranteeXml,
    #[serde(rename = "Permission")]
    permission: String,
}

#[derive(Debug, Deserialize)]
struct GranteeXml {
    #[serde(rename = "@xsi:type", alias = "@type", default)]
    kind: Option<String>,
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "URI", default)]
    uri: Option<String>,
    #[serde(rename = "Canned", default)]
    canned: Option<String>,
}
