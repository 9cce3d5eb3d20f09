// 設定ファイル管理
//
// 変換対象のデータベース、目標の文字セット/照合順序、接続情報を保持し、
// 必須オプションの検証を行います。ファイルI/Oは services::config_loader に集約します。

use crate::core::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// SQLに直接埋め込む識別子として許可するパターン
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_$]+$").expect("identifier pattern is valid"));

/// 外部キー再作成時の参照アクション方針
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeignKeyActionPolicy {
    /// すべての外部キーを ON DELETE CASCADE で再作成する
    #[default]
    Cascade,
    /// 変換前に取得した ON DELETE / ON UPDATE をそのまま再現する
    Preserve,
}

impl std::fmt::Display for ForeignKeyActionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForeignKeyActionPolicy::Cascade => write!(f, "cascade"),
            ForeignKeyActionPolicy::Preserve => write!(f, "preserve"),
        }
    }
}

/// 設定ファイルの内容
///
/// 必須オプションも `Option` で受け取り、未指定を [`Config::validate`] で
/// `ConfigError::MissingOption` として報告します。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// 変換対象のデータベース名
    #[serde(default)]
    pub database_name: Option<String>,

    /// 目標の文字セット
    #[serde(default)]
    pub new_charset: Option<String>,

    /// 目標の照合順序
    #[serde(default)]
    pub new_collation: Option<String>,

    /// ホスト名
    #[serde(default)]
    pub host: Option<String>,

    /// ポート番号
    #[serde(default)]
    pub port: Option<u16>,

    /// ユーザー名
    #[serde(default)]
    pub username: Option<String>,

    /// パスワード
    #[serde(default)]
    pub password: Option<String>,

    /// 記録ファイルの出力先ディレクトリ
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 接続タイムアウト（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,

    /// 外部キーの参照アクション方針
    #[serde(default)]
    pub foreign_key_actions: ForeignKeyActionPolicy,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// データベース接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// ユーザー名
    pub user: String,
    /// パスワード
    pub password: String,
    /// 接続タイムアウト（秒）
    pub timeout: Option<u64>,
}

/// 変換の目標
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTarget {
    /// 変換対象のデータベース名
    pub database: String,
    /// 目標の文字セット
    pub charset: String,
    /// 目標の照合順序
    pub collation: String,
}

/// 検証済みの実行設定
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub connection: DatabaseConfig,
    pub target: ConversionTarget,
    pub output_dir: PathBuf,
    pub foreign_key_actions: ForeignKeyActionPolicy,
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 設定の妥当性を検証し、実行設定に変換
    ///
    /// 必須オプションは databaseName, newCharset, newCollation, host, port,
    /// username, password の順に確認し、最初に見つかった欠落を返します。
    pub fn validate(&self) -> Result<MigrationSettings, ConfigError> {
        let database = require_identifier("databaseName", &self.database_name)?;
        let charset = require_identifier("newCharset", &self.new_charset)?;
        let collation = require_identifier("newCollation", &self.new_collation)?;
        let host = require_non_empty("host", &self.host)?;

        let port = match self.port {
            None => return Err(ConfigError::MissingOption { name: "port" }),
            Some(0) => {
                return Err(ConfigError::InvalidPort {
                    value: "0".to_string(),
                })
            }
            Some(port) => port,
        };

        let user = require_non_empty("username", &self.username)?;
        // 空のパスワードは許可する（未指定のみエラー）
        let password = self
            .password
            .clone()
            .ok_or(ConfigError::MissingOption { name: "password" })?;

        Ok(MigrationSettings {
            connection: DatabaseConfig {
                host,
                port,
                user,
                password,
                timeout: self.connect_timeout,
            },
            target: ConversionTarget {
                database,
                charset,
                collation,
            },
            output_dir: self.output_dir.clone(),
            foreign_key_actions: self.foreign_key_actions,
        })
    }
}

fn require_non_empty(name: &'static str, value: &Option<String>) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingOption { name }),
    }
}

fn require_identifier(name: &'static str, value: &Option<String>) -> Result<String, ConfigError> {
    let value = require_non_empty(name, value)?;
    if !IDENTIFIER_REGEX.is_match(&value) {
        return Err(ConfigError::InvalidIdentifier { name, value });
    }
    Ok(value)
}
