// マイグレーションコンテキスト
//
// 変換の目標、インデックスのバケット、ステートメント台帳を1つにまとめ、
// 各フェーズに明示的に受け渡します。

use crate::adapters::catalog_queries::CatalogQuery;
use crate::adapters::schema_executor::SchemaExecutor;
use crate::adapters::sql_generator::{MysqlDdlGenerator, ReferentialActions};
use crate::core::catalog::ForeignKeyRule;
use crate::core::config::{ConversionTarget, ForeignKeyActionPolicy};
use crate::core::error::MigrationError;
use crate::core::index::IndexBuckets;
use crate::core::ledger::StatementLedger;
use std::collections::HashMap;
use tracing::{info, warn};

/// 変換1回分の作業状態
#[derive(Debug)]
pub struct MigrationContext {
    pub target: ConversionTarget,
    pub generator: MysqlDdlGenerator,
    pub buckets: IndexBuckets,
    pub ledger: StatementLedger,
    pub foreign_key_actions: ForeignKeyActionPolicy,
    /// (テーブル, 制約名) → 参照アクション
    pub foreign_key_rules: HashMap<(String, String), ForeignKeyRule>,
    pub dry_run: bool,
}

impl MigrationContext {
    pub fn new(target: ConversionTarget, foreign_key_actions: ForeignKeyActionPolicy) -> Self {
        let generator = MysqlDdlGenerator::new(target.database.clone());
        Self {
            target,
            generator,
            buckets: IndexBuckets::new(),
            ledger: StatementLedger::new(),
            foreign_key_actions,
            foreign_key_rules: HashMap::new(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn database(&self) -> &str {
        &self.target.database
    }

    /// カタログ読み取りを台帳に記録
    pub fn record_read(&mut self, query: &CatalogQuery) {
        self.ledger.record_read(query.render());
    }

    /// 変更系ステートメントを記録してから実行
    pub async fn apply(
        &mut self,
        executor: &mut dyn SchemaExecutor,
        sql: String,
    ) -> Result<u64, MigrationError> {
        info!(sql = %sql, dry_run = self.dry_run, "Executing statement");
        self.ledger.record_mutation(sql.clone());
        executor.execute(&sql).await
    }

    /// 取得済みの参照アクションを登録
    pub fn set_foreign_key_rules(&mut self, rules: Vec<ForeignKeyRule>) {
        self.foreign_key_rules = rules
            .into_iter()
            .map(|rule| ((rule.table_name.clone(), rule.constraint_name.clone()), rule))
            .collect();
    }

    /// 外部キー再作成時の参照アクション
    pub fn referential_actions(&self, table: &str, constraint: &str) -> ReferentialActions {
        match self.foreign_key_actions {
            ForeignKeyActionPolicy::Cascade => ReferentialActions::cascade(),
            ForeignKeyActionPolicy::Preserve => {
                match self
                    .foreign_key_rules
                    .get(&(table.to_string(), constraint.to_string()))
                {
                    Some(rule) => ReferentialActions::from_rule(rule),
                    None => {
                        warn!(
                            table = %table,
                            constraint = %constraint,
                            "No referential actions recorded for foreign key, recreating with defaults"
                        );
                        ReferentialActions::default()
                    }
                }
            }
        }
    }
}
