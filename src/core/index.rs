// インデックス参加モデル
//
// 1つの (テーブル, カラム) がインデックス/制約に参加していることを表す IndexEntry と、
// それを4分類で保持する IndexBuckets を提供します。

use crate::core::error::MigrationError;
use serde::Serialize;
use std::fmt;

/// インデックス参加エントリ
///
/// 等価性は全フィールドの一致で判定します（Other からの除去はこの完全一致で行う）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub table_name: String,
    pub column_name: String,
    /// インデックス名または制約名
    pub constraint_name: String,
    /// 外部キーの参照先テーブル（外部キー以外は None）
    pub referenced_table: Option<String>,
    /// 外部キーの参照先カラム（外部キー以外は None）
    pub referenced_column: Option<String>,
    /// 複合キー内の位置（1始まり）
    pub ordinal_position: u32,
    pub character_max_length: Option<u64>,
    pub has_collation: bool,
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table: {}, column: {}, key: {}, position: {}",
            self.table_name, self.column_name, self.constraint_name, self.ordinal_position
        )?;
        if let (Some(table), Some(column)) = (&self.referenced_table, &self.referenced_column) {
            write!(f, ", references: {}({})", table, column)?;
        }
        Ok(())
    }
}

/// インデックスの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexCategory {
    PrimaryKey,
    UniqueKey,
    ForeignKey,
    Other,
}

impl IndexCategory {
    pub const ALL: [IndexCategory; 4] = [
        IndexCategory::PrimaryKey,
        IndexCategory::UniqueKey,
        IndexCategory::ForeignKey,
        IndexCategory::Other,
    ];
}

impl fmt::Display for IndexCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexCategory::PrimaryKey => write!(f, "primary key"),
            IndexCategory::UniqueKey => write!(f, "unique key"),
            IndexCategory::ForeignKey => write!(f, "foreign key"),
            IndexCategory::Other => write!(f, "other"),
        }
    }
}

/// 分類ごとのエントリ数
///
/// 複合キーはカラム数分カウントされます。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexCounts {
    pub primary: usize,
    pub unique: usize,
    pub foreign: usize,
    pub other: usize,
}

impl IndexCounts {
    pub fn total(&self) -> usize {
        self.primary + self.unique + self.foreign + self.other
    }

    /// 主キー以外（再作成の対象）の件数が一致するか
    pub fn same_rebuildable_counts(&self, other: &IndexCounts) -> bool {
        self.unique == other.unique && self.foreign == other.foreign && self.other == other.other
    }
}

/// 4分類のバケット
///
/// 発見順を保持します。各バケットは互いに素で、和集合がカタログ上の全参加集合になります。
#[derive(Debug, Clone, Default)]
pub struct IndexBuckets {
    primary: Vec<IndexEntry>,
    unique: Vec<IndexEntry>,
    foreign: Vec<IndexEntry>,
    other: Vec<IndexEntry>,
}

impl IndexBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分類のエントリ一覧
    pub fn entries(&self, category: IndexCategory) -> &[IndexEntry] {
        match category {
            IndexCategory::PrimaryKey => &self.primary,
            IndexCategory::UniqueKey => &self.unique,
            IndexCategory::ForeignKey => &self.foreign,
            IndexCategory::Other => &self.other,
        }
    }

    fn bucket_mut(&mut self, category: IndexCategory) -> &mut Vec<IndexEntry> {
        match category {
            IndexCategory::PrimaryKey => &mut self.primary,
            IndexCategory::UniqueKey => &mut self.unique,
            IndexCategory::ForeignKey => &mut self.foreign,
            IndexCategory::Other => &mut self.other,
        }
    }

    /// エントリを追加
    pub fn push(&mut self, category: IndexCategory, entry: IndexEntry) {
        self.bucket_mut(category).push(entry);
    }

    /// Other から完全一致するエントリを1件除去
    pub fn remove_other(&mut self, entry: &IndexEntry) -> bool {
        match self.other.iter().position(|candidate| candidate == entry) {
            Some(index) => {
                self.other.remove(index);
                true
            }
            None => false,
        }
    }

    /// 外部キーを取り出す（再作成時の消費用）
    pub fn take_foreign(&mut self) -> Vec<IndexEntry> {
        std::mem::take(&mut self.foreign)
    }

    /// 再作成できなかった外部キーを戻す
    pub fn restore_foreign(&mut self, entries: Vec<IndexEntry>) {
        self.foreign.extend(entries);
    }

    /// 全バケットを空にする
    pub fn clear(&mut self) {
        for category in IndexCategory::ALL {
            self.bucket_mut(category).clear();
        }
    }

    pub fn counts(&self) -> IndexCounts {
        IndexCounts {
            primary: self.primary.len(),
            unique: self.unique.len(),
            foreign: self.foreign.len(),
            other: self.other.len(),
        }
    }

    /// 再作成用に分類のエントリをキーごとにまとめる
    ///
    /// 主キーにも含まれるカラムの行は PrimaryKey に分類されるため、
    /// 同じ (テーブル, 制約名) の PrimaryKey エントリで欠けた位置を補います。
    pub fn rebuild_groups(
        &self,
        category: IndexCategory,
    ) -> Result<Vec<KeyGroup<'_>>, MigrationError> {
        group_keys_with(self.entries(category), &self.primary)
    }

    /// 再作成対象（主キー以外）の複合キー構成を検証
    ///
    /// 変更を加える前に実行し、位置情報が欠けたキーを検出します。
    pub fn validate_key_groups(&self) -> Result<(), MigrationError> {
        for category in [
            IndexCategory::UniqueKey,
            IndexCategory::ForeignKey,
            IndexCategory::Other,
        ] {
            self.rebuild_groups(category)?;
        }
        Ok(())
    }
}

/// 同一 (テーブル, 制約名) に属するエントリのまとまり
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGroup<'a> {
    pub table_name: &'a str,
    pub constraint_name: &'a str,
    /// ordinal_position 昇順
    pub members: Vec<&'a IndexEntry>,
}

/// エントリを (テーブル, 制約名) ごとにまとめる
///
/// グループは最初に現れた順に並び、各グループのメンバーは ordinal_position 昇順です。
/// 位置が 1..=N の連番になっていない場合はカタログ不整合としてエラーを返します。
pub fn group_keys(entries: &[IndexEntry]) -> Result<Vec<KeyGroup<'_>>, MigrationError> {
    group_keys_with(entries, &[])
}

/// `shared` のエントリで欠けた位置を補いながらまとめる
///
/// `shared` だけに現れる (テーブル, 制約名) はグループになりません。
pub fn group_keys_with<'a>(
    entries: &'a [IndexEntry],
    shared: &'a [IndexEntry],
) -> Result<Vec<KeyGroup<'a>>, MigrationError> {
    let mut groups: Vec<KeyGroup<'a>> = Vec::new();

    for entry in entries {
        match groups.iter_mut().find(|group| {
            group.table_name == entry.table_name && group.constraint_name == entry.constraint_name
        }) {
            Some(group) => group.members.push(entry),
            None => groups.push(KeyGroup {
                table_name: &entry.table_name,
                constraint_name: &entry.constraint_name,
                members: vec![entry],
            }),
        }
    }

    for group in &mut groups {
        for entry in shared {
            let missing = entry.table_name == group.table_name
                && entry.constraint_name == group.constraint_name
                && group
                    .members
                    .iter()
                    .all(|member| member.ordinal_position != entry.ordinal_position);
            if missing {
                group.members.push(entry);
            }
        }
        group.members.sort_by_key(|entry| entry.ordinal_position);

        let contiguous = group
            .members
            .iter()
            .enumerate()
            .all(|(index, entry)| entry.ordinal_position as usize == index + 1);
        if !contiguous {
            let positions: Vec<u32> = group.members.iter().map(|e| e.ordinal_position).collect();
            return Err(MigrationError::catalog(
                format!(
                    "Key '{}' on table '{}' has non-contiguous column positions {:?}",
                    group.constraint_name, group.table_name, positions
                ),
                None,
            ));
        }
    }

    Ok(groups)
}
