//! siteflow Cloud Abstraction
//!
//! This crate defines the capability set siteflow needs from a cloud vendor
//! to host a static website: object storage buckets, bucket ACL / policy /
//! website configuration, object upload, managed certificates and CDN domains.
//!
//! Vendor crates (e.g. `siteflow-cloud-huawei`) implement [`ResourceClient`];
//! the provisioning workflow in `siteflow-provision` only ever talks to the
//! trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  siteflow CLI                    │
//! │          (bucket / upload / cdn / deploy)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               siteflow-provision                 │
//! │   BucketProvisioner  AssetUploader  CdnProv.     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               siteflow-cloud                     │
//! │  trait ResourceClient { ... }                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │ huawei-cloud  │
//!           │  OBS/CDN/SCM  │
//!           └───────────────┘
//! ```

pub mod client;
pub mod error;
pub mod model;

// Re-exports
pub use client::{ApiResponse, ResourceClient};
pub use error::{CloudError, Result};
pub use model::{
    AccessGrant, BucketAcl, CannedAcl, CdnDomainSpec, CdnOrigin, Certificate, CertificatePush,
    CertificateRef, CertificateType, CreatedDomain, Credentials, DomainConfig, GranteeType,
    HttpsBinding, HttpsStatus, MatchType, Permission, ResponseHeaders, UrlRewriteRule,
    WebsiteConfig,
};
