// インデックス削除サービス
//
// 外部キー → 主キー（何もしない） → ユニークキー → その他 の順にインデックスを削除します。
// どの削除も事前に存在を確認するため、途中で失敗した実行の再実行でも失敗しません。

use crate::adapters::catalog_queries;
use crate::adapters::catalog_reader::CatalogReader;
use crate::adapters::schema_executor::SchemaExecutor;
use crate::core::error::MigrationError;
use crate::core::index::{IndexCategory, IndexEntry};
use crate::services::migration_context::MigrationContext;
use std::collections::HashSet;
use tracing::{debug, info};

/// 削除結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemolitionSummary {
    pub foreign_keys: usize,
    pub foreign_key_indexes: usize,
    pub unique_keys: usize,
    pub other_indexes: usize,
}

impl DemolitionSummary {
    pub fn total(&self) -> usize {
        self.foreign_keys + self.foreign_key_indexes + self.unique_keys + self.other_indexes
    }
}

/// インデックス削除サービス
#[derive(Debug, Clone, Default)]
pub struct IndexDemolitionService {}

impl IndexDemolitionService {
    /// 新しいIndexDemolitionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 全分類のインデックスを削除
    ///
    /// バケットの内容は再作成に使うため変更しません。
    pub async fn demolish(
        &self,
        catalog: &mut dyn CatalogReader,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<DemolitionSummary, MigrationError> {
        let mut summary = DemolitionSummary::default();

        self.drop_foreign_keys(catalog, executor, ctx, &mut summary)
            .await?;
        // 主キーは削除しない
        self.drop_unique_keys(catalog, executor, ctx, &mut summary)
            .await?;
        self.drop_other_indexes(catalog, executor, ctx, &mut summary)
            .await?;

        info!(
            foreign_keys = summary.foreign_keys,
            foreign_key_indexes = summary.foreign_key_indexes,
            unique_keys = summary.unique_keys,
            other_indexes = summary.other_indexes,
            "Index demolition completed"
        );
        Ok(summary)
    }

    async fn drop_foreign_keys(
        &self,
        catalog: &mut dyn CatalogReader,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
        summary: &mut DemolitionSummary,
    ) -> Result<(), MigrationError> {
        let entries = snapshot(ctx, IndexCategory::ForeignKey);
        if !entries.is_empty() {
            info!(count = entries.len(), "Dropping foreign keys");
        }

        let schema = ctx.database().to_string();
        let mut dropped_constraints = HashSet::new();
        let mut dropped_indexes = HashSet::new();

        for entry in &entries {
            let key = (entry.table_name.clone(), entry.constraint_name.clone());

            ctx.record_read(&catalog_queries::constraint_exists(
                &schema,
                &entry.table_name,
                &entry.constraint_name,
            ));
            let exists = catalog
                .constraint_exists(&schema, &entry.table_name, &entry.constraint_name)
                .await?;
            if exists && !dropped_constraints.contains(&key) {
                let sql = ctx
                    .generator
                    .drop_foreign_key(&entry.table_name, &entry.constraint_name);
                ctx.apply(executor, sql).await?;
                info!(constraint = %entry.constraint_name, table = %entry.table_name, "Dropped foreign key");
                dropped_constraints.insert(key.clone());
                summary.foreign_keys += 1;
            }

            ctx.record_read(&catalog_queries::index_names_by_key(
                &schema,
                &entry.table_name,
                &entry.constraint_name,
                &entry.column_name,
            ));
            let backing = catalog
                .index_names_by_key(
                    &schema,
                    &entry.table_name,
                    &entry.constraint_name,
                    &entry.column_name,
                )
                .await?;
            if !backing.is_empty() && !dropped_indexes.contains(&key) {
                let sql = ctx
                    .generator
                    .drop_index_on(&entry.table_name, &entry.constraint_name);
                ctx.apply(executor, sql).await?;
                info!(index = %entry.constraint_name, table = %entry.table_name, "Dropped foreign key index");
                dropped_indexes.insert(key);
                summary.foreign_key_indexes += 1;
            }
        }

        Ok(())
    }

    async fn drop_unique_keys(
        &self,
        catalog: &mut dyn CatalogReader,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
        summary: &mut DemolitionSummary,
    ) -> Result<(), MigrationError> {
        let entries = snapshot(ctx, IndexCategory::UniqueKey);
        if !entries.is_empty() {
            info!(count = entries.len(), "Dropping unique keys");
        }

        let schema = ctx.database().to_string();
        let mut dropped = HashSet::new();

        for entry in &entries {
            ctx.record_read(&catalog_queries::constraint_exists(
                &schema,
                &entry.table_name,
                &entry.constraint_name,
            ));
            let exists = catalog
                .constraint_exists(&schema, &entry.table_name, &entry.constraint_name)
                .await?;

            let key = (entry.table_name.clone(), entry.constraint_name.clone());
            if !exists || dropped.contains(&key) {
                debug!(key = %entry.constraint_name, table = %entry.table_name, "Unique key already dropped");
                continue;
            }

            let sql = ctx
                .generator
                .drop_index(&entry.table_name, &entry.constraint_name);
            ctx.apply(executor, sql).await?;
            info!(key = %entry.constraint_name, table = %entry.table_name, "Dropped unique key");
            dropped.insert(key);
            summary.unique_keys += 1;
        }

        Ok(())
    }

    async fn drop_other_indexes(
        &self,
        catalog: &mut dyn CatalogReader,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
        summary: &mut DemolitionSummary,
    ) -> Result<(), MigrationError> {
        let entries = snapshot(ctx, IndexCategory::Other);
        if !entries.is_empty() {
            info!(count = entries.len(), "Dropping other indexes");
        }

        let schema = ctx.database().to_string();
        let mut dropped = HashSet::new();

        for entry in &entries {
            ctx.record_read(&catalog_queries::index_exists(
                &schema,
                &entry.table_name,
                &entry.constraint_name,
            ));
            let exists = catalog
                .index_exists(&schema, &entry.table_name, &entry.constraint_name)
                .await?;

            let key = (entry.table_name.clone(), entry.constraint_name.clone());
            if !exists || dropped.contains(&key) {
                debug!(index = %entry.constraint_name, table = %entry.table_name, "Index already dropped");
                continue;
            }

            let sql = ctx
                .generator
                .drop_index(&entry.table_name, &entry.constraint_name);
            ctx.apply(executor, sql).await?;
            info!(index = %entry.constraint_name, table = %entry.table_name, "Dropped other index");
            dropped.insert(key);
            summary.other_indexes += 1;
        }

        Ok(())
    }
}

fn snapshot(ctx: &MigrationContext, category: IndexCategory) -> Vec<IndexEntry> {
    ctx.buckets.entries(category).to_vec()
}
