// 文字セット変換サービス
//
// データベース → カラム → テーブル の順に文字セット/照合順序を変換し、
// 各段階の後でカタログを再集計して未変換が残っていないことを確認します。

use crate::adapters::catalog_queries;
use crate::adapters::catalog_reader::CatalogReader;
use crate::adapters::schema_executor::SchemaExecutor;
use crate::core::error::{MigrationError, VerificationScope};
use crate::services::migration_context::MigrationContext;
use tracing::{info, warn};

/// 文字セット変換サービス
#[derive(Debug, Clone, Default)]
pub struct CharsetConversionService {}

impl CharsetConversionService {
    /// 新しいCharsetConversionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スキーマの既定文字セット/照合順序を変換
    ///
    /// # Returns
    ///
    /// ALTER DATABASE を発行した場合は true、既に目標と一致していた場合は false
    pub async fn convert_database(
        &self,
        catalog: &mut dyn CatalogReader,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<bool, MigrationError> {
        let schema = ctx.database().to_string();
        let charset = ctx.target.charset.clone();
        let collation = ctx.target.collation.clone();

        ctx.record_read(&catalog_queries::schema_defaults(&schema));
        let current = catalog.schema_defaults(&schema).await?;

        if current.charset.eq_ignore_ascii_case(&charset)
            && current.collation.eq_ignore_ascii_case(&collation)
        {
            info!(
                database = %schema,
                charset = %current.charset,
                collation = %current.collation,
                "Database already uses the target charset and collation"
            );
            return Ok(false);
        }

        let sql = ctx.generator.alter_database(&charset, &collation);
        let rows = ctx.apply(executor, sql).await?;
        if !ctx.dry_run && rows < 1 {
            return Err(MigrationError::Verification {
                scope: VerificationScope::Database,
                remaining: 1,
                collation,
            });
        }

        ctx.record_read(&catalog_queries::schema_defaults(&schema));
        let updated = catalog.schema_defaults(&schema).await?;
        info!(
            database = %schema,
            charset = %updated.charset,
            collation = %updated.collation,
            "Database charset and collation changed"
        );

        Ok(true)
    }

    /// 全ベーステーブルのカラムを変換
    ///
    /// # Returns
    ///
    /// 変換したカラム数
    pub async fn convert_columns(
        &self,
        catalog: &mut dyn CatalogReader,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<usize, MigrationError> {
        let schema = ctx.database().to_string();
        let charset = ctx.target.charset.clone();
        let collation = ctx.target.collation.clone();

        ctx.record_read(&catalog_queries::base_tables(&schema));
        let tables = catalog.base_tables(&schema).await?;

        let mut converted = 0;
        for table in &tables {
            ctx.record_read(&catalog_queries::columns_needing_conversion(
                &schema, table, &collation,
            ));
            let columns = catalog
                .columns_needing_conversion(&schema, table, &collation)
                .await?;

            for column in &columns {
                info!(table = %table, column = %column.column_name, "Converting column");
                let sql = ctx
                    .generator
                    .change_column(table, column, &charset, &collation);
                ctx.apply(executor, sql).await?;
                converted += 1;
            }
        }

        if ctx.dry_run {
            info!(columns = converted, "Column verification skipped (dry run)");
            return Ok(converted);
        }

        ctx.record_read(&catalog_queries::count_unconverted_columns(
            &schema, &collation,
        ));
        let remaining = catalog.count_unconverted_columns(&schema, &collation).await?;
        if remaining > 0 {
            warn!(remaining = remaining, "Columns left unconverted");
            report_unconverted_columns(catalog, ctx, &schema, &collation).await;
            return Err(MigrationError::Verification {
                scope: VerificationScope::Columns,
                remaining,
                collation,
            });
        }

        info!(columns = converted, "All columns have been converted");
        Ok(converted)
    }

    /// ベーステーブルの既存データと既定値を変換
    ///
    /// # Returns
    ///
    /// 変換したテーブル数
    pub async fn convert_tables(
        &self,
        catalog: &mut dyn CatalogReader,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<usize, MigrationError> {
        let schema = ctx.database().to_string();
        let charset = ctx.target.charset.clone();
        let collation = ctx.target.collation.clone();

        ctx.record_read(&catalog_queries::tables_needing_conversion(
            &schema, &collation,
        ));
        let tables = catalog
            .tables_needing_conversion(&schema, &collation)
            .await?;

        for table in &tables {
            info!(table = %table, "Converting table");
            let sql = ctx.generator.convert_table(table, &charset, &collation);
            ctx.apply(executor, sql).await?;
            let sql = ctx
                .generator
                .alter_table_default(table, &charset, &collation);
            ctx.apply(executor, sql).await?;
        }

        if ctx.dry_run {
            info!(tables = tables.len(), "Table verification skipped (dry run)");
            return Ok(tables.len());
        }

        ctx.record_read(&catalog_queries::count_unconverted_tables(
            &schema, &collation,
        ));
        let remaining = catalog.count_unconverted_tables(&schema, &collation).await?;
        if remaining > 0 {
            warn!(remaining = remaining, "Tables left unconverted");
            return Err(MigrationError::Verification {
                scope: VerificationScope::Tables,
                remaining,
                collation,
            });
        }

        info!(tables = tables.len(), "All tables have been converted");
        Ok(tables.len())
    }
}

/// 未変換カラムをテーブル・カラム単位でログに出力
///
/// 一覧の取得に失敗した場合も警告を記録するだけで、呼び出し側は検証エラーを返します。
async fn report_unconverted_columns(
    catalog: &mut dyn CatalogReader,
    ctx: &mut MigrationContext,
    schema: &str,
    collation: &str,
) {
    ctx.record_read(&catalog_queries::unconverted_columns(schema, collation));
    match catalog.unconverted_columns(schema, collation).await {
        Ok(columns) => {
            for column in &columns {
                warn!(
                    table = %column.table_name,
                    column = %column.column_name,
                    collation = %column.collation,
                    view = column.in_view,
                    "Column still has a non-target collation"
                );
            }
        }
        Err(e) => warn!(error = %e, "Failed to list unconverted columns"),
    }
}
