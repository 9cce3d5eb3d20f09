// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::Config;
use crate::core::error::ConfigError;
use std::path::Path;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込む
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        Self::from_yaml(&content, path)
    }

    /// YAML文字列から設定を読み込む
    ///
    /// `path` はエラーメッセージにのみ使用します。
    pub fn from_yaml(content: &str, path: &Path) -> Result<Config, ConfigError> {
        serde_saphyr::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            cause: e.to_string(),
        })
    }
}
