use crate::report::{Step, UploadReport};
use siteflow_cloud::CloudError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("バケット '{0}' は既に存在します")]
    AlreadyExists(String),

    #[error("バケット '{bucket}' の存在確認に失敗しました: {source}")]
    BucketProbe {
        bucket: String,
        #[source]
        source: CloudError,
    },

    #[error("バケット '{bucket}' の作成に失敗しました: {source}")]
    BucketCreation {
        bucket: String,
        #[source]
        source: CloudError,
    },

    #[error("バケット '{bucket}' の ACL を private にできませんでした: {source}")]
    Acl {
        bucket: String,
        #[source]
        source: CloudError,
    },

    #[error("バケット '{bucket}' にポリシーを適用できませんでした: {source}")]
    Policy {
        bucket: String,
        #[source]
        source: CloudError,
    },

    #[error("バケット '{bucket}' の静的ウェブホスティング設定に失敗しました: {source}")]
    Hosting {
        bucket: String,
        #[source]
        source: CloudError,
    },

    #[error("アセットフォルダを読み込めません: {path}\n理由: {message}")]
    AssetRoot { path: PathBuf, message: String },

    #[error("{}", partial_upload_message(.0))]
    PartialUpload(UploadReport),

    #[error("SSL 証明書 '{0}' が見つかりません")]
    CertificateNotFound(String),

    #[error("SSL 証明書 '{certificate}' のプッシュに失敗しました: {source}")]
    CertificatePush {
        certificate: String,
        #[source]
        source: CloudError,
    },

    #[error("CDN ドメイン '{domain}' の作成に失敗しました: {source}")]
    DomainCreation {
        domain: String,
        #[source]
        source: CloudError,
    },

    #[error("CDN ドメイン '{domain}' の設定に失敗しました ({step}): {source}")]
    DomainConfig {
        domain: String,
        step: Step,
        #[source]
        source: CloudError,
    },
}

impl ProvisionError {
    /// Step the failure happened in
    pub fn step(&self) -> Step {
        match self {
            ProvisionError::AlreadyExists(_) | ProvisionError::BucketProbe { .. } => {
                Step::CheckBucket
            }
            ProvisionError::BucketCreation { .. } => Step::CreateBucket,
            ProvisionError::Acl { .. } => Step::PrivateAcl,
            ProvisionError::Policy { .. } => Step::BucketPolicy,
            ProvisionError::Hosting { .. } => Step::WebsiteHosting,
            ProvisionError::AssetRoot { .. } | ProvisionError::PartialUpload(_) => {
                Step::UploadAssets
            }
            ProvisionError::CertificateNotFound(_) | ProvisionError::CertificatePush { .. } => {
                Step::PushCertificate
            }
            ProvisionError::DomainCreation { .. } => Step::CreateDomain,
            ProvisionError::DomainConfig { step, .. } => *step,
        }
    }
}

fn partial_upload_message(report: &UploadReport) -> String {
    let mut message = format!(
        "{} 個中 {} 個のファイルのアップロードに失敗しました",
        report.total(),
        report.failed.len()
    );
    for failure in &report.failed {
        message.push_str(&format!("\n  - {}: {}", failure.path.display(), failure.error));
    }
    message
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
