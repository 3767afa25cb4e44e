//! Huawei Cloud provider for siteflow
//!
//! Implements [`siteflow_cloud::ResourceClient`] on top of three services:
//!
//! - **OBS** for buckets and objects (S3 compatible API, SigV4)
//! - **SCM** for certificate lookup and push
//! - **CDN** for acceleration domains
//!
//! SCM and CDN sit behind the API gateway and are signed with
//! `SDK-HMAC-SHA256`.

mod apig;
pub mod cdn;
pub mod client;
pub mod error;
pub mod obs;
pub mod scm;
pub mod signer;

pub use client::{HuaweiCloud, HuaweiConfig, PROVIDER_NAME};
pub use error::{HuaweiError, Result};
