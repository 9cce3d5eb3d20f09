// インデックス再作成サービス
//
// 主キー（何もしない） → ユニークキー → その他 → 外部キー の順にインデックスを再作成します。
// 複合キーは (テーブル, 制約名) でまとめ、ordinal_position 順にカラムを並べます。

use crate::adapters::schema_executor::SchemaExecutor;
use crate::core::error::MigrationError;
use crate::core::index::{group_keys_with, IndexCategory, IndexEntry};
use crate::services::migration_context::MigrationContext;
use tracing::info;

/// 再作成結果（作成したキーの数）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconstructionSummary {
    pub unique_keys: usize,
    pub other_indexes: usize,
    pub foreign_keys: usize,
}

impl ReconstructionSummary {
    pub fn total(&self) -> usize {
        self.unique_keys + self.other_indexes + self.foreign_keys
    }
}

/// インデックス再作成サービス
#[derive(Debug, Clone, Default)]
pub struct IndexReconstructionService {}

impl IndexReconstructionService {
    /// 新しいIndexReconstructionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 全分類のインデックスを再作成
    pub async fn rebuild(
        &self,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<ReconstructionSummary, MigrationError> {
        // 主キーは削除していないので再作成しない
        let unique_keys = self.rebuild_unique_keys(executor, ctx).await?;
        let other_indexes = self.rebuild_other_indexes(executor, ctx).await?;
        let foreign_keys = self.rebuild_foreign_keys(executor, ctx).await?;

        let summary = ReconstructionSummary {
            unique_keys,
            other_indexes,
            foreign_keys,
        };
        info!(
            unique_keys = summary.unique_keys,
            other_indexes = summary.other_indexes,
            foreign_keys = summary.foreign_keys,
            "Index reconstruction completed"
        );
        Ok(summary)
    }

    /// ユニークキーを再作成
    pub async fn rebuild_unique_keys(
        &self,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<usize, MigrationError> {
        let statements: Vec<(String, String)> = ctx
            .buckets
            .rebuild_groups(IndexCategory::UniqueKey)?
            .iter()
            .map(|key| (key.constraint_name.to_string(), ctx.generator.add_unique(key)))
            .collect();

        if !statements.is_empty() {
            info!(count = statements.len(), "Creating unique keys");
        }
        for (name, sql) in &statements {
            ctx.apply(executor, sql.clone()).await?;
            info!(key = %name, "Created unique key");
        }

        Ok(statements.len())
    }

    /// その他のインデックスを再作成
    pub async fn rebuild_other_indexes(
        &self,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<usize, MigrationError> {
        let statements: Vec<(String, String)> = ctx
            .buckets
            .rebuild_groups(IndexCategory::Other)?
            .iter()
            .map(|key| (key.constraint_name.to_string(), ctx.generator.add_key(key)))
            .collect();

        if !statements.is_empty() {
            info!(count = statements.len(), "Creating other indexes");
        }
        for (name, sql) in &statements {
            ctx.apply(executor, sql.clone()).await?;
            info!(index = %name, "Created other index");
        }

        Ok(statements.len())
    }

    /// 外部キーを再作成
    ///
    /// 作成したエントリはバケットから取り除きます。失敗した場合は未作成のエントリを戻します。
    pub async fn rebuild_foreign_keys(
        &self,
        executor: &mut dyn SchemaExecutor,
        ctx: &mut MigrationContext,
    ) -> Result<usize, MigrationError> {
        let entries = ctx.buckets.take_foreign();

        let planned = match plan_foreign_keys(ctx, &entries) {
            Ok(planned) => planned,
            Err(e) => {
                ctx.buckets.restore_foreign(entries);
                return Err(e);
            }
        };

        if !planned.is_empty() {
            info!(count = planned.len(), "Creating foreign keys");
        }

        let mut pending = planned.into_iter();
        let mut created = 0;
        while let Some(key) = pending.next() {
            if let Err(e) = ctx.apply(executor, key.sql.clone()).await {
                let mut remaining = key.members;
                for rest in pending {
                    remaining.extend(rest.members);
                }
                ctx.buckets.restore_foreign(remaining);
                return Err(e);
            }
            info!(constraint = %key.name, "Created foreign key");
            created += 1;
        }

        Ok(created)
    }
}

struct PlannedForeignKey {
    name: String,
    sql: String,
    members: Vec<IndexEntry>,
}

fn plan_foreign_keys(
    ctx: &MigrationContext,
    entries: &[IndexEntry],
) -> Result<Vec<PlannedForeignKey>, MigrationError> {
    group_keys_with(entries, ctx.buckets.entries(IndexCategory::PrimaryKey))?
        .iter()
        .map(|key| {
            let actions = ctx.referential_actions(key.table_name, key.constraint_name);
            // PrimaryKey から補ったカラムはバケットに戻さない
            let members = entries
                .iter()
                .filter(|entry| {
                    entry.table_name == key.table_name
                        && entry.constraint_name == key.constraint_name
                })
                .cloned()
                .collect();
            Ok(PlannedForeignKey {
                name: key.constraint_name.to_string(),
                sql: ctx.generator.add_foreign_key(key, &actions)?,
                members,
            })
        })
        .collect()
}
