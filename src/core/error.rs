// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ConfigError と MigrationError を定義します。

use std::fmt;
use thiserror::Error;

/// 設定エラー
///
/// 設定ファイルの読み込み・検証時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須オプション未指定
    #[error("Required option '{name}' is not specified")]
    MissingOption {
        /// オプション名
        name: &'static str,
    },

    /// ポート番号が不正
    #[error("Invalid port '{value}': expected a number between 1 and 65535")]
    InvalidPort {
        /// 指定された値
        value: String,
    },

    /// SQLに直接埋め込めない識別子
    #[error("Invalid value '{value}' for option '{name}': only letters, digits, '_' and '$' are allowed")]
    InvalidIdentifier {
        /// オプション名
        name: &'static str,
        /// 指定された値
        value: String,
    },

    /// 設定ファイルが見つからない
    #[error("Config file not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// 設定ファイルの解析に失敗
    #[error("Failed to parse config file {path}: {cause}")]
    Parse {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl ConfigError {
    /// 必須オプション未指定エラーかどうか
    pub fn is_missing_option(&self) -> bool {
        matches!(self, ConfigError::MissingOption { .. })
    }
}

/// 検証対象のスコープ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationScope {
    Database,
    Columns,
    Tables,
}

impl fmt::Display for VerificationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationScope::Database => write!(f, "database"),
            VerificationScope::Columns => write!(f, "column(s)"),
            VerificationScope::Tables => write!(f, "table(s)"),
        }
    }
}

/// マイグレーションエラー
///
/// 変換処理のどの段階で失敗したかを種別として保持します。
/// いずれも致命的で、呼び出し側は処理を中断します。
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connectivity {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Catalog query error
    #[error("Catalog query error: {message}")]
    Catalog {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },

    /// DDL execution error
    #[error("Statement execution error: {message} (statement: {sql})")]
    Ddl {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: String,
    },

    /// Residual unconverted objects after a conversion phase
    #[error("Verification failed: {remaining} {scope} not converted to collation '{collation}'")]
    Verification {
        /// 検証対象
        scope: VerificationScope,
        /// 未変換の件数
        remaining: u64,
        /// 目標の照合順序
        collation: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    Io {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl MigrationError {
    /// カタログ読み取りエラーを作成
    pub fn catalog(message: impl Into<String>, sql: Option<String>) -> Self {
        MigrationError::Catalog {
            message: message.into(),
            sql,
        }
    }

    /// DDL実行エラーを作成
    pub fn ddl(message: impl Into<String>, sql: impl Into<String>) -> Self {
        MigrationError::Ddl {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// 設定エラーかどうか
    pub fn is_config(&self) -> bool {
        matches!(self, MigrationError::Config(_))
    }

    /// 接続エラーかどうか
    pub fn is_connectivity(&self) -> bool {
        matches!(self, MigrationError::Connectivity { .. })
    }

    /// カタログ読み取りエラーかどうか
    pub fn is_catalog(&self) -> bool {
        matches!(self, MigrationError::Catalog { .. })
    }

    /// DDL実行エラーかどうか
    pub fn is_ddl(&self) -> bool {
        matches!(self, MigrationError::Ddl { .. })
    }

    /// 検証エラーかどうか
    pub fn is_verification(&self) -> bool {
        matches!(self, MigrationError::Verification { .. })
    }

    /// ファイル書き込みエラーかどうか
    pub fn is_io(&self) -> bool {
        matches!(self, MigrationError::Io { .. })
    }
}
