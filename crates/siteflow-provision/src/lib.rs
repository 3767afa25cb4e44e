//! siteflow provisioning workflow
//!
//! Static website hosting is set up in three fixed stages, each consuming
//! the result of the previous one:
//!
//! 1. [`BucketProvisioner`] creates the bucket, makes it private, attaches
//!    the policy and enables static web hosting
//! 2. [`AssetUploader`] mirrors a local folder into the bucket
//! 3. [`CdnProvisioner`] puts a CDN domain with TLS in front of the bucket
//!
//! All stages take a `&dyn ResourceClient`; the caller builds one client and
//! passes it to every stage. [`Deployment`] runs the three in order.
//!
//! # Example
//!
//! ```ignore
//! use siteflow_provision::{BucketProvisioner, BucketSpec};
//!
//! let spec = BucketSpec::new("site-1", "ap-southeast-1", template);
//! let outcome = BucketProvisioner::new(&client).create(&spec).await?;
//! ```

pub mod bucket;
pub mod cdn;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod upload;

#[cfg(test)]
mod testing;

pub use bucket::{BucketProvisioner, BucketSpec, POLICY_PLACEHOLDER, render_policy};
pub use cdn::{CdnOptions, CdnProvisioner, CdnRequest};
pub use error::{ProvisionError, Result};
pub use pipeline::Deployment;
pub use report::{
    AclChange, BucketOutcome, CdnOutcome, DeploymentReport, Step, StepWarning, UploadFailure,
    UploadReport, UploadTask,
};
pub use upload::{AssetUploader, KeyError, object_key, upload_tasks};

use siteflow_cloud::ApiResponse;

/// Unwrap a remote call, classifying `status >= 300` as a failure
pub(crate) fn accepted<T>(
    result: siteflow_cloud::Result<ApiResponse<T>>,
) -> siteflow_cloud::Result<T> {
    result.and_then(ApiResponse::into_result)
}
