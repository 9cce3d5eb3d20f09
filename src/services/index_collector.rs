// インデックス収集サービス
//
// スキーマ内の全カラムについてインデックス名とキー使用情報を読み取り、
// IndexClassifier で4分類のバケットに振り分けます。

use crate::adapters::catalog_queries;
use crate::adapters::catalog_reader::CatalogReader;
use crate::core::error::MigrationError;
use crate::core::index::{IndexCategory, IndexCounts};
use crate::services::index_classifier::{Classification, IndexClassifier};
use crate::services::migration_context::MigrationContext;
use tracing::{debug, info};

/// インデックス収集サービス
#[derive(Debug, Clone, Default)]
pub struct IndexCollectorService {
    classifier: IndexClassifier,
}

impl IndexCollectorService {
    /// 新しいIndexCollectorServiceを作成
    pub fn new() -> Self {
        Self {
            classifier: IndexClassifier::new(),
        }
    }

    /// カタログからインデックス参加を収集してバケットに追加
    ///
    /// 既存のバケットの内容は保持されるため、再収集の前には呼び出し側で clear します。
    ///
    /// # Returns
    ///
    /// 収集後の分類ごとの件数
    pub async fn collect(
        &self,
        catalog: &mut dyn CatalogReader,
        ctx: &mut MigrationContext,
    ) -> Result<IndexCounts, MigrationError> {
        let schema = ctx.database().to_string();

        ctx.record_read(&catalog_queries::column_keys(&schema));
        let columns = catalog.column_keys(&schema).await?;
        debug!(columns = columns.len(), "Collecting indexes");

        for column in &columns {
            ctx.record_read(&catalog_queries::index_names(
                &schema,
                &column.table_name,
                &column.column_name,
            ));
            let indexes = catalog
                .index_names(&schema, &column.table_name, &column.column_name)
                .await?;
            for index in &indexes {
                let entry = self.classifier.seed_entry(column, index);
                ctx.buckets.push(IndexCategory::Other, entry);
            }

            ctx.record_read(&catalog_queries::key_usage(
                &schema,
                &column.table_name,
                &column.column_name,
            ));
            let usages = catalog
                .key_usage(&schema, &column.table_name, &column.column_name)
                .await?;

            for usage in &usages {
                let category = match self.classifier.classify(column.role, usage) {
                    Classification::Assign(category) => Some(category),
                    Classification::NeedsIndexLookup => {
                        ctx.record_read(&catalog_queries::index_names_by_key(
                            &schema,
                            &column.table_name,
                            &usage.constraint_name,
                            &column.column_name,
                        ));
                        let matches = catalog
                            .index_names_by_key(
                                &schema,
                                &column.table_name,
                                &usage.constraint_name,
                                &column.column_name,
                            )
                            .await?;
                        self.classifier.resolve_lookup(&matches)
                    }
                };

                if let Some(category) = category {
                    self.classifier
                        .assign(&mut ctx.buckets, column, usage, category);
                }
            }
        }

        Ok(ctx.buckets.counts())
    }
}

/// 分類ごとの件数をログに出力
pub fn log_counts(label: &str, counts: &IndexCounts) {
    info!(
        stage = %label,
        primary = counts.primary,
        unique = counts.unique,
        foreign = counts.foreign,
        other = counts.other,
        total = counts.total(),
        "Index counts"
    );
}
