// データベース接続アダプター
//
// SQLxを使用した MySQL 接続の確立と切断を行います。
// 変換中はセッション変数（foreign_key_checks）を保持する必要があるため、
// プールではなく単一の接続を扱います。

use crate::adapters::connection_string;
use crate::core::config::DatabaseConfig;
use crate::core::error::MigrationError;
use sqlx::{Connection, MySqlConnection};
use std::time::Duration;
use tracing::{info, warn};

/// 接続タイムアウトのデフォルト値（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// データベース接続サービス
#[derive(Debug, Clone)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// データベース接続文字列を構築
    ///
    /// # Arguments
    ///
    /// * `config` - データベース設定
    /// * `database` - 接続先スキーマ名
    pub fn build_connection_string(&self, config: &DatabaseConfig, database: &str) -> String {
        connection_string::build_connection_string(config, database)
    }

    /// 接続タイムアウトを取得
    pub fn connect_timeout(&self, config: &DatabaseConfig) -> Duration {
        Duration::from_secs(config.timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    /// 指定スキーマへの接続を確立
    ///
    /// # Arguments
    ///
    /// * `config` - データベース設定
    /// * `database` - 接続先スキーマ名
    ///
    /// # Returns
    ///
    /// 接続またはエラー
    pub async fn connect(
        &self,
        config: &DatabaseConfig,
        database: &str,
    ) -> Result<MySqlConnection, MigrationError> {
        let connection_string = self.build_connection_string(config, database);
        let target = connection_string::redacted_target(config, database);
        let timeout = self.connect_timeout(config);

        let connection = tokio::time::timeout(timeout, MySqlConnection::connect(&connection_string))
            .await
            .map_err(|_| MigrationError::Connectivity {
                message: format!("Failed to connect to {}", target),
                cause: format!("timed out after {} seconds", timeout.as_secs()),
            })?
            .map_err(|e| MigrationError::Connectivity {
                message: format!("Failed to connect to {}", target),
                cause: e.to_string(),
            })?;

        info!(database = %database, "Connection to database is successful");
        Ok(connection)
    }

    /// 接続を閉じる
    ///
    /// 切断時のエラーは変換結果に影響しないため、警告として記録するのみとします。
    pub async fn close(&self, connection: MySqlConnection, label: &str) {
        match connection.close().await {
            Ok(()) => info!(connection = %label, "Connection closed"),
            Err(e) => warn!(connection = %label, error = %e, "Failed to close connection cleanly"),
        }
    }
}

impl Default for DatabaseConnectionService {
    fn default() -> Self {
        Self::new()
    }
}
