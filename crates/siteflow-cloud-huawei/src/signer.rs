//! Request signing
//!
//! OBS accepts AWS Signature Version 4 (`AWS4-HMAC-SHA256`, service `s3`).
//! The API gateway in front of CDN and SCM uses its own `SDK-HMAC-SHA256`
//! scheme: same canonical request shape, but the string to sign is keyed with
//! the raw secret and the canonical URI always ends with `/`.

use crate::error::{HuaweiError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use siteflow_cloud::Credentials;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

pub const OBS_ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const APIG_ALGORITHM: &str = "SDK-HMAC-SHA256";
pub const OBS_SERVICE: &str = "s3";
const KEY_TYPE_IDENTIFIER: &str = "aws4_request";
const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

pub const AMZ_DATE_HEADER: &str = "x-amz-date";
pub const AMZ_CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";
pub const SDK_DATE_HEADER: &str = "x-sdk-date";
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Header list of an outgoing request, names in lowercase
pub type Headers = Vec<(String, String)>;

/// Sign an OBS request with SigV4.
///
/// Adds `host`, `x-amz-date`, `x-amz-content-sha256` and `authorization` to
/// `headers`. Every header already present is signed.
pub fn sign_obs(
    credentials: &Credentials,
    method: &str,
    url: &Url,
    headers: &mut Headers,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<()> {
    let timestamp = now.format(DATE_FORMAT).to_string();
    let payload_hash = sha256_hex(payload);

    set_header(headers, "host", host_header(url)?);
    set_header(headers, AMZ_DATE_HEADER, timestamp.clone());
    set_header(headers, AMZ_CONTENT_SHA256_HEADER, payload_hash.clone());

    let (canonical_headers, signed_headers) = canonical_headers(headers);
    let canonical = canonical_request(
        method,
        url.path(),
        &canonical_query(url),
        &canonical_headers,
        &signed_headers,
        &payload_hash,
    );

    let scope = format!(
        "{}/{}/{}/{}",
        &timestamp[..8],
        credentials.region,
        OBS_SERVICE,
        KEY_TYPE_IDENTIFIER
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        OBS_ALGORITHM,
        timestamp,
        scope,
        sha256_hex(canonical.as_bytes())
    );

    let signing_key = derive_signing_key(
        &credentials.secret_access_key,
        &timestamp[..8],
        &credentials.region,
        OBS_SERVICE,
    )?;
    let signature = hex_encode(&hmac_sign(&signing_key, string_to_sign.as_bytes())?);

    set_header(
        headers,
        AUTHORIZATION_HEADER,
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            OBS_ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
        ),
    );
    Ok(())
}

/// Sign an API gateway (CDN / SCM) request with `SDK-HMAC-SHA256`.
///
/// Adds `host`, `x-sdk-date` and `authorization` to `headers`.
pub fn sign_apig(
    credentials: &Credentials,
    method: &str,
    url: &Url,
    headers: &mut Headers,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<()> {
    let timestamp = now.format(DATE_FORMAT).to_string();

    set_header(headers, "host", host_header(url)?);
    set_header(headers, SDK_DATE_HEADER, timestamp.clone());

    let mut path = url.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }

    let (canonical_headers, signed_headers) = canonical_headers(headers);
    let canonical = canonical_request(
        method,
        &path,
        &canonical_query(url),
        &canonical_headers,
        &signed_headers,
        &sha256_hex(payload),
    );
    let string_to_sign = format!(
        "{}\n{}\n{}",
        APIG_ALGORITHM,
        timestamp,
        sha256_hex(canonical.as_bytes())
    );
    let signature = hex_encode(&hmac_sign(
        credentials.secret_access_key.as_bytes(),
        string_to_sign.as_bytes(),
    )?);

    set_header(
        headers,
        AUTHORIZATION_HEADER,
        format!(
            "{} Access={}, SignedHeaders={}, Signature={}",
            APIG_ALGORITHM, credentials.access_key_id, signed_headers, signature
        ),
    );
    Ok(())
}

fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, path, query, canonical_headers, signed_headers, payload_hash
    )
}

/// `name:value\n` lines sorted by name, plus the `;` joined name list
fn canonical_headers(headers: &Headers) -> (String, String) {
    let mut sorted: Vec<(String, &str)> = headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.trim()))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut canonical = String::new();
    for (name, value) in &sorted {
        canonical.push_str(name);
        canonical.push(':');
        canonical.push_str(value);
        canonical.push('\n');
    }
    let signed = sorted
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    (canonical, signed)
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k, true), uri_encode(&v, true)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| HuaweiError::Signing(format!("URL has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Replace or append a header, matching names case-insensitively
pub fn set_header(headers: &mut Headers, name: &str, value: String) {
    match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value,
        None => headers.push((name.to_string(), value)),
    }
}

fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sign(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sign(&k_date, region.as_bytes())?;
    let k_service = hmac_sign(&k_region, service.as_bytes())?;
    hmac_sign(&k_service, KEY_TYPE_IDENTIFIER.as_bytes())
}

fn hmac_sign(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| HuaweiError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}

pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

/// RFC 3986 encoding. Unreserved characters pass through; `/` is kept
/// unless `encode_slash` is set.
pub fn uri_encode(value: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
