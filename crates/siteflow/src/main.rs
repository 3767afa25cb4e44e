mod commands;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Ctrl-C で中断されたときの終了コード
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "siteflow")]
#[command(about = "バケット作成からCDN配信まで、静的サイトを一気通貫で。", long_about = None)]
struct Cli {
    /// 設定ファイルのパス
    #[arg(long, global = true, env = "SITEFLOW_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// バケットを作成し、静的Webホスティングを有効化
    Bucket {
        bucket_name: String,
        access_key_id: String,
        secret_access_key: String,
        region: String,
        /// バケットポリシーテンプレート（デフォルト: bucket_policy.json）
        #[arg(long)]
        policy: Option<PathBuf>,
    },
    /// フォルダの中身をバケットへアップロード
    Upload {
        bucket_name: String,
        access_key_id: String,
        secret_access_key: String,
        region: String,
        /// アップロードするフォルダ
        folder: PathBuf,
        /// 同時アップロード数
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        concurrency: Option<u64>,
    },
    /// CDNドメインを作成し、HTTPSとパスリライトを設定
    Cdn {
        domain_name: String,
        subdomain: String,
        access_key_id: String,
        secret_access_key: String,
        region: String,
        bucket_name: String,
        ssl_certificate_name: String,
        /// HTTPS / リライト / ヘッダー設定の失敗をエラーにする
        #[arg(long)]
        strict: bool,
    },
    /// バケット作成 → アップロード → CDN をまとめて実行
    Deploy {
        bucket_name: String,
        access_key_id: String,
        secret_access_key: String,
        region: String,
        folder: PathBuf,
        domain_name: String,
        subdomain: String,
        ssl_certificate_name: String,
        #[arg(long)]
        policy: Option<PathBuf>,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        concurrency: Option<u64>,
        #[arg(long)]
        strict: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 引数エラーは clap が終了コード 2 で終了させる
    let cli = Cli::parse();

    // ログは stderr、結果 (True / False) は stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("siteflow {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let result = tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("{}", "中断されました。適用済みのステップはそのまま残ります。".yellow());
            println!("False");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    match result {
        Ok(()) => {
            println!("True");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            println!("False");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = utils::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Bucket {
            bucket_name,
            access_key_id,
            secret_access_key,
            region,
            policy,
        } => {
            let target = utils::Target::new(access_key_id, secret_access_key, region);
            commands::bucket::handle(&settings, &target, &bucket_name, policy.as_deref()).await
        }
        Commands::Upload {
            bucket_name,
            access_key_id,
            secret_access_key,
            region,
            folder,
            concurrency,
        } => {
            let target = utils::Target::new(access_key_id, secret_access_key, region);
            let concurrency = utils::concurrency(&settings, concurrency);
            commands::upload::handle(&settings, &target, &bucket_name, &folder, concurrency).await
        }
        Commands::Cdn {
            domain_name,
            subdomain,
            access_key_id,
            secret_access_key,
            region,
            bucket_name,
            ssl_certificate_name,
            strict,
        } => {
            let target = utils::Target::new(access_key_id, secret_access_key, region);
            let request = utils::cdn_request(
                &settings,
                &target,
                &domain_name,
                &subdomain,
                &bucket_name,
                &ssl_certificate_name,
            );
            commands::cdn::handle(&settings, &target, &request, strict).await
        }
        Commands::Deploy {
            bucket_name,
            access_key_id,
            secret_access_key,
            region,
            folder,
            domain_name,
            subdomain,
            ssl_certificate_name,
            policy,
            concurrency,
            strict,
        } => {
            let target = utils::Target::new(access_key_id, secret_access_key, region);
            let request = utils::cdn_request(
                &settings,
                &target,
                &domain_name,
                &subdomain,
                &bucket_name,
                &ssl_certificate_name,
            );
            let options = commands::deploy::DeployOptions {
                policy,
                concurrency: utils::concurrency(&settings, concurrency),
                strict,
            };
            commands::deploy::handle(&settings, &target, &bucket_name, &folder, request, options)
                .await
        }
        Commands::Version => unreachable!("Version is handled before settings loading"),
    }
}
