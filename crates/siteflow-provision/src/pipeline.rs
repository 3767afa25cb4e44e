//! Full deployment: bucket, then assets, then CDN

use crate::bucket::{BucketProvisioner, BucketSpec};
use crate::cdn::{CdnOptions, CdnProvisioner, CdnRequest};
use crate::error::Result;
use crate::report::DeploymentReport;
use crate::upload::AssetUploader;
use siteflow_cloud::ResourceClient;
use std::path::PathBuf;
use std::time::Instant;

/// What a deployment run should set up
#[derive(Debug, Clone)]
pub struct Deployment {
    pub bucket: BucketSpec,

    /// Folder to upload after the bucket is ready
    pub assets: Option<PathBuf>,

    /// CDN domain to create once assets are in place
    pub cdn: Option<CdnRequest>,

    pub upload_concurrency: usize,

    pub cdn_options: CdnOptions,
}

impl Deployment {
    pub fn new(bucket: BucketSpec) -> Self {
        Self {
            bucket,
            assets: None,
            cdn: None,
            upload_concurrency: 1,
            cdn_options: CdnOptions::default(),
        }
    }

    pub fn with_assets(mut self, folder: impl Into<PathBuf>) -> Self {
        self.assets = Some(folder.into());
        self
    }

    pub fn with_cdn(mut self, request: CdnRequest) -> Self {
        self.cdn = Some(request);
        self
    }

    pub fn with_upload_concurrency(mut self, concurrency: usize) -> Self {
        self.upload_concurrency = concurrency;
        self
    }

    pub fn with_cdn_options(mut self, options: CdnOptions) -> Self {
        self.cdn_options = options;
        self
    }

    /// Run the stages in order, stopping at the first failure.
    /// Already applied stages are left in place.
    pub async fn run(&self, client: &dyn ResourceClient) -> Result<DeploymentReport> {
        let start = Instant::now();
        let mut report = DeploymentReport::default();

        tracing::info!("Deploying site into bucket {}", self.bucket.name);
        report.bucket = Some(BucketProvisioner::new(client).create(&self.bucket).await?);

        if let Some(folder) = &self.assets {
            let uploader = AssetUploader::new(client).with_concurrency(self.upload_concurrency);
            report.upload = Some(uploader.upload(folder, &self.bucket.name).await?);
        }

        if let Some(request) = &self.cdn {
            let provisioner = CdnProvisioner::new(client).with_options(self.cdn_options.clone());
            report.cdn = Some(provisioner.provision(request).await?);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!("Deployment finished in {}ms", report.duration_ms);
        Ok(report)
    }
}
