use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error("設定ファイルが見つかりません: {0}")]
    SettingsFileNotFound(PathBuf),

    #[error("設定ファイルの解析に失敗しました: {path}\n{source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(
        "バケットポリシーファイルが見つかりません: {0}\n\
        --policy オプションまたは設定ファイルの policy_file で指定できます"
    )]
    PolicyFileNotFound(PathBuf),

    #[error("設定値が不正です: {0}")]
    InvalidValue(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
