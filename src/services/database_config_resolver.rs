// データベース設定の解決サービス
//
// 環境変数による上書きをCLI/サービス層で扱い、coreは純粋な構造体に保つ。

use crate::core::config::Config;
use crate::core::error::ConfigError;

/// データベース設定の解決ユーティリティ
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfigResolver;

impl DatabaseConfigResolver {
    /// 環境変数による上書きを適用
    ///
    /// DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_DATABASE を参照します。
    pub fn apply_env_overrides(base: &Config) -> Result<Config, ConfigError> {
        Self::apply_overrides(base, |key| std::env::var(key).ok())
    }

    /// 任意の参照関数で上書きを適用
    pub fn apply_overrides<F>(base: &Config, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = base.clone();

        if let Some(host) = lookup("DB_HOST") {
            config.host = Some(host);
        }
        if let Some(port) = lookup("DB_PORT") {
            let port_num = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort {
                    value: port.clone(),
                })?;
            config.port = Some(port_num);
        }
        if let Some(database) = lookup("DB_DATABASE") {
            config.database_name = Some(database);
        }
        if let Some(user) = lookup("DB_USER") {
            config.username = Some(user);
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            config.password = Some(password);
        }

        Ok(config)
    }
}
