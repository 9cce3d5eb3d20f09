// コマンド共通コンテキスト
//
// 設定ファイル読み込み、環境変数による上書き、検証、接続の確立をCLI層で集約する。

use crate::adapters::catalog_reader::MySqlCatalogReader;
use crate::adapters::connection_string::INFORMATION_SCHEMA;
use crate::adapters::database::DatabaseConnectionService;
use crate::adapters::schema_executor::MySqlSchemaExecutor;
use crate::core::config::{Config, MigrationSettings};
use crate::services::config_loader::ConfigLoader;
use crate::services::database_config_resolver::DatabaseConfigResolver;
use crate::services::migration_context::MigrationContext;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub settings: MigrationSettings,
}

/// 変換に使う2本の接続
pub struct Connections {
    pub catalog: MySqlCatalogReader,
    pub executor: MySqlSchemaExecutor,
}

impl CommandContext {
    /// プロジェクトルートから設定を読み込んでコンテキストを作成
    pub fn load(project_path: PathBuf) -> Result<Self> {
        Self::load_with_config(project_path, None)
    }

    /// カスタム設定ファイルパスを指定してコンテキストを作成
    pub fn load_with_config(
        project_path: PathBuf,
        custom_config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = custom_config_path
            .unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));

        let config =
            ConfigLoader::from_file(&config_path).with_context(|| "Failed to read config file")?;
        let config = DatabaseConfigResolver::apply_env_overrides(&config)
            .with_context(|| "Invalid environment override")?;
        let mut settings = config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", config_path))?;

        if settings.output_dir.is_relative() {
            settings.output_dir = project_path.join(&settings.output_dir);
        }
        debug!(config = ?config_path, database = %settings.target.database, "Configuration loaded");

        Ok(Self {
            project_path,
            config_path,
            settings,
        })
    }

    /// 設定から新しいマイグレーションコンテキストを作成
    pub fn migration_context(&self, dry_run: bool) -> MigrationContext {
        MigrationContext::new(
            self.settings.target.clone(),
            self.settings.foreign_key_actions,
        )
        .with_dry_run(dry_run)
    }

    /// INFORMATION_SCHEMA と対象スキーマへの接続を確立
    pub async fn connect(&self) -> Result<Connections> {
        let service = DatabaseConnectionService::new();
        let connection = &self.settings.connection;

        let catalog = service
            .connect(connection, INFORMATION_SCHEMA)
            .await
            .with_context(|| "Failed to connect to INFORMATION_SCHEMA")?;

        let target = match service
            .connect(connection, &self.settings.target.database)
            .await
        {
            Ok(target) => target,
            Err(e) => {
                service.close(catalog, INFORMATION_SCHEMA).await;
                return Err(e).with_context(|| {
                    format!(
                        "Failed to connect to database '{}'",
                        self.settings.target.database
                    )
                });
            }
        };

        Ok(Connections {
            catalog: MySqlCatalogReader::new(catalog),
            executor: MySqlSchemaExecutor::new(target),
        })
    }
}

impl Connections {
    /// 両方の接続を閉じる
    pub async fn close(self) {
        let service = DatabaseConnectionService::new();
        service
            .close(self.catalog.into_inner(), INFORMATION_SCHEMA)
            .await;
        service.close(self.executor.into_inner(), "target").await;
    }
}
