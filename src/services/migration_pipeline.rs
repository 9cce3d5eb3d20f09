// マイグレーションパイプラインサービス
//
// インデックスを保ったまま文字セット/照合順序を変換する一連のフェーズを順に実行する。
// 各フェーズは MigrationContext を受け取り、失敗した時点で処理を中断する。

use crate::adapters::catalog_queries;
use crate::adapters::catalog_reader::CatalogReader;
use crate::adapters::schema_executor::SchemaExecutor;
use crate::core::config::ForeignKeyActionPolicy;
use crate::core::error::MigrationError;
use crate::core::index::{IndexCategory, IndexCounts, IndexEntry};
use crate::services::charset_conversion::CharsetConversionService;
use crate::services::index_collector::{log_counts, IndexCollectorService};
use crate::services::index_demolition::{DemolitionSummary, IndexDemolitionService};
use crate::services::index_reconstruction::{IndexReconstructionService, ReconstructionSummary};
use crate::services::migration_context::MigrationContext;
use serde::Serialize;
use tracing::{info, warn};

/// 変換結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub database: String,
    pub charset: String,
    pub collation: String,
    pub dry_run: bool,
    pub before: IndexCounts,
    pub after: IndexCounts,
    pub database_altered: bool,
    pub columns_converted: usize,
    pub tables_converted: usize,
    pub indexes_dropped: usize,
    pub keys_rebuilt: usize,
}

impl MigrationReport {
    /// 再作成対象のインデックス数が変換前後で一致するか
    pub fn counts_match(&self) -> bool {
        self.before.same_rebuildable_counts(&self.after)
    }
}

/// インデックス構成の調査結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexTopology {
    pub database: String,
    pub counts: IndexCounts,
    pub primary_keys: Vec<IndexEntry>,
    pub unique_keys: Vec<IndexEntry>,
    pub foreign_keys: Vec<IndexEntry>,
    pub other_indexes: Vec<IndexEntry>,
}

/// マイグレーションパイプライン
///
/// パイプラインは以下のフェーズで構成される:
/// 1. foreign_key_checks を無効化
/// 2. インデックス収集と事前検証
/// 3. インデックス削除（外部キー → ユニークキー → その他）
/// 4. データベース → カラム → テーブル の変換
/// 5. インデックス再作成（ユニークキー → その他 → 外部キー）
/// 6. 再収集による件数確認
/// 7. foreign_key_checks を有効化
pub struct MigrationPipeline<'a> {
    catalog: &'a mut dyn CatalogReader,
    executor: &'a mut dyn SchemaExecutor,
    collector: IndexCollectorService,
    demolition: IndexDemolitionService,
    conversion: CharsetConversionService,
    reconstruction: IndexReconstructionService,
}

impl<'a> MigrationPipeline<'a> {
    /// 新しいパイプラインを作成
    ///
    /// # Arguments
    ///
    /// * `catalog` - INFORMATION_SCHEMA のリーダー
    /// * `executor` - 対象スキーマへのエグゼキューター
    pub fn new(catalog: &'a mut dyn CatalogReader, executor: &'a mut dyn SchemaExecutor) -> Self {
        Self {
            catalog,
            executor,
            collector: IndexCollectorService::new(),
            demolition: IndexDemolitionService::new(),
            conversion: CharsetConversionService::new(),
            reconstruction: IndexReconstructionService::new(),
        }
    }

    /// 変換を実行
    ///
    /// 失敗した場合もそれまでに記録したステートメントは `ctx.ledger` に残る。
    pub async fn run(&mut self, ctx: &mut MigrationContext) -> Result<MigrationReport, MigrationError> {
        ctx.dry_run = ctx.dry_run || self.executor.is_dry_run();
        info!(
            database = %ctx.target.database,
            charset = %ctx.target.charset,
            collation = %ctx.target.collation,
            dry_run = ctx.dry_run,
            "Starting charset migration"
        );

        let sql = ctx.generator.foreign_key_checks(false);
        ctx.apply(self.executor, sql).await?;

        let before = self.collector.collect(self.catalog, ctx).await?;
        ctx.buckets.validate_key_groups()?;
        log_counts("before", &before);

        if ctx.foreign_key_actions == ForeignKeyActionPolicy::Preserve {
            self.load_foreign_key_rules(ctx).await?;
        }

        let demolished: DemolitionSummary = self
            .demolition
            .demolish(self.catalog, self.executor, ctx)
            .await?;

        let database_altered = self
            .conversion
            .convert_database(self.catalog, self.executor, ctx)
            .await?;
        let columns_converted = self
            .conversion
            .convert_columns(self.catalog, self.executor, ctx)
            .await?;
        let tables_converted = self
            .conversion
            .convert_tables(self.catalog, self.executor, ctx)
            .await?;

        let rebuilt: ReconstructionSummary =
            self.reconstruction.rebuild(self.executor, ctx).await?;

        ctx.buckets.clear();
        let after = self.collector.collect(self.catalog, ctx).await?;
        log_counts("after", &after);
        if !before.same_rebuildable_counts(&after) {
            warn!(
                before_unique = before.unique,
                after_unique = after.unique,
                before_foreign = before.foreign,
                after_foreign = after.foreign,
                before_other = before.other,
                after_other = after.other,
                "Index counts differ after reconstruction"
            );
        }

        let sql = ctx.generator.foreign_key_checks(true);
        ctx.apply(self.executor, sql).await?;
        info!(database = %ctx.target.database, "Charset migration completed");

        Ok(MigrationReport {
            database: ctx.target.database.clone(),
            charset: ctx.target.charset.clone(),
            collation: ctx.target.collation.clone(),
            dry_run: ctx.dry_run,
            before,
            after,
            database_altered,
            columns_converted,
            tables_converted,
            indexes_dropped: demolished.total(),
            keys_rebuilt: rebuilt.total(),
        })
    }

    /// インデックス構成を収集のみ行う（変更なし）
    pub async fn inspect(&mut self, ctx: &mut MigrationContext) -> Result<IndexTopology, MigrationError> {
        ctx.buckets.clear();
        let counts = self.collector.collect(self.catalog, ctx).await?;
        log_counts("inspect", &counts);

        Ok(IndexTopology {
            database: ctx.target.database.clone(),
            counts,
            primary_keys: ctx.buckets.entries(IndexCategory::PrimaryKey).to_vec(),
            unique_keys: ctx.buckets.entries(IndexCategory::UniqueKey).to_vec(),
            foreign_keys: ctx.buckets.entries(IndexCategory::ForeignKey).to_vec(),
            other_indexes: ctx.buckets.entries(IndexCategory::Other).to_vec(),
        })
    }

    async fn load_foreign_key_rules(&mut self, ctx: &mut MigrationContext) -> Result<(), MigrationError> {
        let schema = ctx.database().to_string();
        ctx.record_read(&catalog_queries::foreign_key_rules(&schema));
        let rules = self.catalog.foreign_key_rules(&schema).await?;
        info!(rules = rules.len(), "Loaded foreign key referential actions");
        ctx.set_foreign_key_rules(rules);
        Ok(())
    }
}
