// スキーマエグゼキューター
//
// 対象スキーマに接続した接続上で変更系ステートメントを実行します。
// Dry run 時は実行せずに記録のみ行う実装に差し替えます。

use crate::core::error::MigrationError;
use async_trait::async_trait;
use sqlx::MySqlConnection;
use tracing::debug;

/// 変更系ステートメントの実行インターフェース
#[async_trait]
pub trait SchemaExecutor: Send {
    /// ステートメントを実行し、影響を受けた行数を返す
    async fn execute(&mut self, sql: &str) -> Result<u64, MigrationError>;

    /// 実際にはステートメントを実行しないか
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// MySQL用スキーマエグゼキューター
///
/// セッション変数（foreign_key_checks）を保持するため、単一の接続で全ステートメントを実行します。
pub struct MySqlSchemaExecutor {
    connection: MySqlConnection,
}

impl MySqlSchemaExecutor {
    /// 対象スキーマに接続済みの接続から作成
    pub fn new(connection: MySqlConnection) -> Self {
        Self { connection }
    }

    /// 接続を取り出す（切断用）
    pub fn into_inner(self) -> MySqlConnection {
        self.connection
    }
}

#[async_trait]
impl SchemaExecutor for MySqlSchemaExecutor {
    async fn execute(&mut self, sql: &str) -> Result<u64, MigrationError> {
        // DDL はプリペアドステートメントで受け付けられないものがあるためテキストプロトコルで送る
        let connection: &mut MySqlConnection = &mut self.connection;
        let result = sqlx::Executor::execute(connection, sqlx::raw_sql(sql))
            .await
            .map_err(|e| MigrationError::ddl(e.to_string(), sql))?;

        debug!(rows_affected = result.rows_affected(), "Statement executed");
        Ok(result.rows_affected())
    }
}

/// Dry run 用エグゼキューター
///
/// ステートメントを保持するだけで、データベースには何も送りません。
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    statements: Vec<String>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

#[async_trait]
impl SchemaExecutor for DryRunExecutor {
    async fn execute(&mut self, sql: &str) -> Result<u64, MigrationError> {
        self.statements.push(sql.to_string());
        Ok(0)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
