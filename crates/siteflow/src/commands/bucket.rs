use crate::utils::{self, Target};
use colored::Colorize;
use siteflow_cloud::ResourceClient;
use siteflow_config::Settings;
use siteflow_provision::BucketProvisioner;
use std::path::Path;

pub async fn handle(
    settings: &Settings,
    target: &Target,
    bucket_name: &str,
    policy: Option<&Path>,
) -> anyhow::Result<()> {
    println!("{}", "バケットを作成します...".blue().bold());
    println!("バケット: {} ({})", bucket_name.cyan(), target.region());

    // ポリシーファイルは通信前に読み込む
    let policy_path = settings.policy_path(policy);
    let template = siteflow_config::load_policy_template(&policy_path)?;
    println!("ポリシー: {}", policy_path.display());

    let client = utils::build_client(settings, target)?;
    let spec = utils::bucket_spec(settings, target, bucket_name, template);
    let outcome = BucketProvisioner::new(&client).create(&spec).await?;

    println!();
    utils::print_bucket_outcome(
        &outcome,
        &client.website_endpoint(bucket_name, target.region()),
    );
    Ok(())
}
