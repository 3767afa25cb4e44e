use crate::utils::{self, Target};
use colored::Colorize;
use siteflow_config::Settings;
use siteflow_provision::{CdnOptions, CdnProvisioner, CdnRequest};

pub async fn handle(
    settings: &Settings,
    target: &Target,
    request: &CdnRequest,
    strict: bool,
) -> anyhow::Result<()> {
    println!("{}", "CDNドメインを作成します...".blue().bold());
    println!(
        "ドメイン: {} → {}/{}",
        request.domain_name.cyan(),
        request.bucket,
        request.subdomain
    );
    println!("証明書: {}", request.certificate_name);

    let client = utils::build_client(settings, target)?;
    let options = CdnOptions {
        strict: strict || settings.cdn.strict,
    };
    let outcome = CdnProvisioner::new(&client)
        .with_options(options)
        .provision(request)
        .await?;

    println!();
    utils::print_cdn_outcome(&outcome);
    if !outcome.is_fully_configured() {
        println!(
            "{}",
            "一部の設定に失敗しました。コンソールで確認してください。".yellow()
        );
    }
    Ok(())
}
