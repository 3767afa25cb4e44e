use crate::utils::{self, Target};
use colored::Colorize;
use siteflow_cloud::ResourceClient;
use siteflow_config::Settings;
use siteflow_provision::{CdnOptions, CdnRequest, Deployment, ProvisionError};
use std::path::{Path, PathBuf};

pub struct DeployOptions {
    pub policy: Option<PathBuf>,
    pub concurrency: usize,
    pub strict: bool,
}

pub async fn handle(
    settings: &Settings,
    target: &Target,
    bucket_name: &str,
    folder: &Path,
    request: CdnRequest,
    options: DeployOptions,
) -> anyhow::Result<()> {
    println!("{}", "デプロイを開始します...".blue().bold());
    println!("バケット: {} ({})", bucket_name.cyan(), target.region());
    println!("フォルダ: {}", folder.display());
    println!("ドメイン: {}", request.domain_name.cyan());

    let policy_path = settings.policy_path(options.policy.as_deref());
    let template = siteflow_config::load_policy_template(&policy_path)?;
    if !folder.is_dir() {
        anyhow::bail!("フォルダが見つかりません: {}", folder.display());
    }

    let client = utils::build_client(settings, target)?;
    let deployment = Deployment::new(utils::bucket_spec(settings, target, bucket_name, template))
        .with_assets(folder)
        .with_cdn(request)
        .with_upload_concurrency(options.concurrency)
        .with_cdn_options(CdnOptions {
            strict: options.strict || settings.cdn.strict,
        });

    let report = match deployment.run(&client).await {
        Ok(report) => report,
        Err(ProvisionError::PartialUpload(report)) => {
            println!();
            utils::print_upload_report(&report);
            anyhow::bail!(
                "{} 件のファイルをアップロードできませんでした。CDN の作成は行っていません",
                report.failed.len()
            )
        }
        Err(e) => return Err(e.into()),
    };

    println!();
    if let Some(bucket) = &report.bucket {
        utils::print_bucket_outcome(
            bucket,
            &client.website_endpoint(bucket_name, target.region()),
        );
    }
    if let Some(upload) = &report.upload {
        utils::print_upload_report(upload);
    }
    if let Some(cdn) = &report.cdn {
        utils::print_cdn_outcome(cdn);
    }
    println!();
    println!(
        "{} デプロイが完了しました ({}ms)",
        "✓".green().bold(),
        report.duration_ms
    );
    Ok(())
}
