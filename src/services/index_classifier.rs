// インデックス分類サービス
//
// カラムの COLUMN_KEY フラグとキー使用情報の1行から、インデックス参加を
// PrimaryKey / UniqueKey / ForeignKey / Other の4分類に振り分けます。
// カタログへの問い合わせは行わず、追加の照会が必要な場合はその旨を返します。

use crate::core::catalog::{ColumnKeyInfo, IndexNameRow, KeyRole, KeyUsageRow};
use crate::core::index::{IndexBuckets, IndexCategory, IndexEntry};

/// 分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 分類が確定
    Assign(IndexCategory),
    /// (制約名, カラム) でインデックスを照会してから判断する
    NeedsIndexLookup,
}

/// インデックス分類サービス
#[derive(Debug, Clone, Default)]
pub struct IndexClassifier {}

impl IndexClassifier {
    /// 新しいIndexClassifierを作成
    pub fn new() -> Self {
        Self {}
    }

    /// キー使用情報の1行を分類
    ///
    /// # Arguments
    ///
    /// * `role` - カラムの COLUMN_KEY フラグ
    /// * `usage` - KEY_COLUMN_USAGE の1行
    pub fn classify(&self, role: KeyRole, usage: &KeyUsageRow) -> Classification {
        match role {
            KeyRole::Primary => Classification::Assign(IndexCategory::PrimaryKey),
            KeyRole::Unique | KeyRole::Multiple => {
                if usage.referenced_table.is_some() {
                    Classification::Assign(IndexCategory::ForeignKey)
                } else {
                    Classification::Assign(IndexCategory::UniqueKey)
                }
            }
            // 複合外部キーの2列目以降はフラグを持たないため、参照先で判別する
            KeyRole::None if usage.referenced_table.is_some() => {
                Classification::Assign(IndexCategory::ForeignKey)
            }
            KeyRole::None => Classification::NeedsIndexLookup,
        }
    }

    /// (制約名, カラム) によるインデックス照会の結果から分類を決定
    ///
    /// 一致するインデックスがあれば UniqueKey、なければ分類しません。
    pub fn resolve_lookup(&self, matches: &[IndexNameRow]) -> Option<IndexCategory> {
        if matches.is_empty() {
            None
        } else {
            Some(IndexCategory::UniqueKey)
        }
    }

    /// STATISTICS の1行から Other の初期エントリを作成
    pub fn seed_entry(&self, column: &ColumnKeyInfo, index: &IndexNameRow) -> IndexEntry {
        base_entry(column, &index.key_name, index.seq_in_index)
    }

    /// 分類済みのエントリをバケットに追加し、対応する Other のエントリを除去
    pub fn assign(
        &self,
        buckets: &mut IndexBuckets,
        column: &ColumnKeyInfo,
        usage: &KeyUsageRow,
        category: IndexCategory,
    ) {
        let seeded = base_entry(column, &usage.constraint_name, usage.ordinal_position);
        let entry = IndexEntry {
            referenced_table: usage.referenced_table.clone(),
            referenced_column: usage.referenced_column.clone(),
            ..seeded.clone()
        };

        buckets.push(category, entry);
        buckets.remove_other(&seeded);
    }
}

fn base_entry(column: &ColumnKeyInfo, key_name: &str, position: u32) -> IndexEntry {
    IndexEntry {
        table_name: column.table_name.clone(),
        column_name: column.column_name.clone(),
        constraint_name: key_name.to_string(),
        referenced_table: None,
        referenced_column: None,
        ordinal_position: position,
        character_max_length: column.character_max_length,
        has_collation: column.has_collation(),
    }
}
