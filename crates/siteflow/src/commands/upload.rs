use crate::utils::{self, Target};
use colored::Colorize;
use siteflow_config::Settings;
use siteflow_provision::{AssetUploader, ProvisionError};
use std::path::Path;

pub async fn handle(
    settings: &Settings,
    target: &Target,
    bucket_name: &str,
    folder: &Path,
    concurrency: usize,
) -> anyhow::Result<()> {
    println!("{}", "アップロードを開始します...".blue().bold());
    println!(
        "{} → {} (同時 {} 件)",
        folder.display().to_string().cyan(),
        bucket_name.cyan(),
        concurrency
    );

    let client = utils::build_client(settings, target)?;
    let uploader = AssetUploader::new(&client).with_concurrency(concurrency);

    match uploader.upload(folder, bucket_name).await {
        Ok(report) => {
            println!();
            utils::print_upload_report(&report);
            Ok(())
        }
        Err(ProvisionError::PartialUpload(report)) => {
            println!();
            utils::print_upload_report(&report);
            anyhow::bail!(
                "{} 件のファイルをアップロードできませんでした",
                report.failed.len()
            )
        }
        Err(e) => Err(e.into()),
    }
}
