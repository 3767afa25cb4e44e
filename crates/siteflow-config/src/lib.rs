pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{CdnSettings, DEFAULT_POLICY_FILE, Endpoints, Settings};

use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "SITEFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 3] = ["siteflow.local.yaml", "siteflow.yaml", ".siteflow.yaml"];

/// siteflow のグローバル設定ディレクトリ (~/.config/siteflow)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("siteflow"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 SITEFLOW_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: siteflow.local.yaml, siteflow.yaml, .siteflow.yaml
/// 3. ~/.config/siteflow/config.yaml (グローバル設定)
///
/// どこにもなければ `None`（デフォルト設定で動作）
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::SettingsFileNotFound(path));
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 設定を読み込む
///
/// `path` が指定されていればそのファイルを読み、なければ
/// [`find_config_file`] で探す。見つからなければデフォルト値
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) if !path.exists() => {
            return Err(ConfigError::SettingsFileNotFound(path.to_path_buf()));
        }
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    let settings = match path {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            parse_settings_file(&path)?
        }
        None => {
            tracing::debug!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.validate()?;
    Ok(settings)
}

fn parse_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// バケットポリシーテンプレートを読み込む
pub fn load_policy_template(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(ConfigError::PolicyFileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}
