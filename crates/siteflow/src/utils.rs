use colored::Colorize;
use siteflow_cloud::Credentials;
use siteflow_cloud_huawei::{HuaweiCloud, HuaweiConfig};
use siteflow_config::Settings;
use siteflow_provision::{
    AclChange, BucketOutcome, BucketSpec, CdnOutcome, CdnRequest, UploadReport,
};
use std::path::Path;

/// コマンドライン引数で渡された接続先
pub struct Target {
    pub credentials: Credentials,
}

impl Target {
    pub fn new(access_key_id: String, secret_access_key: String, region: String) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key, region),
        }
    }

    pub fn region(&self) -> &str {
        &self.credentials.region
    }
}

pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = siteflow_config::load_settings(path)?;
    tracing::debug!("Settings: {:?}", settings);
    Ok(settings)
}

/// コマンドライン指定を優先して同時アップロード数を決定
pub fn concurrency(settings: &Settings, requested: Option<u64>) -> usize {
    requested
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .unwrap_or(settings.upload_concurrency)
}

/// 設定とコマンドライン引数から Huawei Cloud クライアントを作成
pub fn build_client(settings: &Settings, target: &Target) -> anyhow::Result<HuaweiCloud> {
    let mut config = HuaweiConfig::new(target.credentials.clone())
        .with_timeouts(settings.timeout(), settings.connect_timeout())
        .with_scm_endpoint(
            settings
                .endpoints
                .scm_or_default(&settings.cdn.certificate_region),
        );
    if let Some(endpoint) = &settings.endpoints.obs {
        config = config.with_obs_endpoint(endpoint);
    }
    if let Some(endpoint) = &settings.endpoints.cdn {
        config = config.with_cdn_endpoint(endpoint);
    }
    if let Some(domain_id) = &settings.domain_id {
        config = config.with_domain_id(domain_id);
    }

    Ok(HuaweiCloud::new(config)?)
}

pub fn bucket_spec(
    settings: &Settings,
    target: &Target,
    bucket_name: &str,
    policy_template: String,
) -> BucketSpec {
    BucketSpec::new(bucket_name, target.region(), policy_template)
        .with_documents(&settings.index_document, &settings.error_document)
}

pub fn cdn_request(
    settings: &Settings,
    target: &Target,
    domain_name: &str,
    subdomain: &str,
    bucket_name: &str,
    certificate_name: &str,
) -> CdnRequest {
    CdnRequest::new(
        domain_name,
        subdomain,
        bucket_name,
        target.region(),
        certificate_name,
    )
    .with_service_area(&settings.cdn.service_area)
    .with_response_headers(settings.cdn.response_headers.clone())
}

pub fn print_bucket_outcome(outcome: &BucketOutcome, website_endpoint: &str) {
    println!("{} バケット {} を作成しました", "✓".green(), outcome.bucket.cyan());
    match outcome.acl {
        AclChange::Unchanged => println!("  ACL: private"),
        AclChange::MadePrivate => println!("  ACL: private (変更しました)"),
    }
    println!("  ポリシー: 適用済み");
    println!("  Webサイト: {}", website_endpoint.cyan());
}

pub fn print_upload_report(report: &UploadReport) {
    if report.is_success() {
        println!(
            "{} {} 件のファイルを {} にアップロードしました ({}ms)",
            "✓".green(),
            report.uploaded.len(),
            report.bucket.cyan(),
            report.duration_ms
        );
        return;
    }

    println!(
        "{} {} / {} 件のアップロードに失敗しました",
        "✗".red(),
        report.failed.len(),
        report.total()
    );
    for failure in &report.failed {
        println!(
            "  • {}: {}",
            failure.path.display().to_string().red(),
            failure.error
        );
    }
}

pub fn print_cdn_outcome(outcome: &CdnOutcome) {
    println!(
        "{} CDNドメイン {} を作成しました (ID: {})",
        "✓".green(),
        outcome.domain_name.cyan(),
        outcome.domain_id
    );
    if let Some(cname) = &outcome.cname {
        println!("  CNAME: {}", cname.cyan());
    }
    for warning in &outcome.warnings {
        println!(
            "  {} {}: {}",
            "⚠".yellow(),
            warning.step.to_string().yellow(),
            warning.error
        );
    }
}
