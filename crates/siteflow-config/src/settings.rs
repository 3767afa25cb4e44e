//! Settings file contents

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_POLICY_FILE: &str = "bucket_policy.json";

/// siteflow の設定
///
/// 全フィールドにデフォルト値があり、設定ファイルは省略可能
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 静的 Web ホスティングのインデックスドキュメント
    pub index_document: String,
    /// 静的 Web ホスティングのエラードキュメント
    pub error_document: String,
    /// バケットポリシーテンプレートのパス
    pub policy_file: PathBuf,
    /// HTTP リクエスト全体のタイムアウト（秒）
    pub timeout_secs: u64,
    /// 接続タイムアウト（秒）
    pub connect_timeout_secs: u64,
    /// 同時アップロード数（1 = 逐次）
    pub upload_concurrency: usize,
    pub cdn: CdnSettings,
    pub endpoints: Endpoints,
    /// グローバルサービス用のアカウント ID (X-Domain-Id)
    pub domain_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
            policy_file: PathBuf::from(DEFAULT_POLICY_FILE),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            upload_concurrency: 1,
            cdn: CdnSettings::default(),
            endpoints: Endpoints::default(),
            domain_id: None,
        }
    }
}

impl Settings {
    /// 値の整合性をチェック
    pub fn validate(&self) -> Result<()> {
        if self.index_document.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "index_document が空です".to_string(),
            ));
        }
        if self.error_document.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "error_document が空です".to_string(),
            ));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "タイムアウトは 1 秒以上を指定してください".to_string(),
            ));
        }
        if self.upload_concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "upload_concurrency は 1 以上を指定してください".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// コマンドラインで指定されたパスを優先してポリシーファイルを決定
    pub fn policy_path(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.policy_file.clone())
    }
}

/// CDN 関連の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnSettings {
    pub service_area: String,
    /// HTTPS / リライト / ヘッダー設定の失敗をエラーとして扱う
    pub strict: bool,
    /// 全レスポンスに付与するヘッダー
    pub response_headers: BTreeMap<String, String>,
    /// 証明書 (SCM) を管理しているリージョン
    pub certificate_region: String,
}

impl Default for CdnSettings {
    fn default() -> Self {
        Self {
            service_area: "outside_mainland_china".to_string(),
            strict: false,
            response_headers: BTreeMap::from([(
                "Content-Disposition".to_string(),
                "inline".to_string(),
            )]),
            certificate_region: "ap-southeast-1".to_string(),
        }
    }
}

/// エンドポイントの上書き（テストや別パーティション向け）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub obs: Option<String>,
    pub cdn: Option<String>,
    pub scm: Option<String>,
}

impl Endpoints {
    /// SCM エンドポイント（未指定なら証明書リージョンから導出）
    pub fn scm_or_default(&self, certificate_region: &str) -> String {
        self.scm
            .clone()
            .unwrap_or_else(|| format!("https://scm.{}.myhuaweicloud.com", certificate_region))
    }
}
