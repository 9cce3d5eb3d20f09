// MySQL用DDLジェネレーター
//
// 変換・インデックス削除・インデックス再作成で発行するDDL文を生成します。
// テーブル参照はすべて `<database>.<table>` で修飾します。

use crate::core::catalog::{ColumnDefinition, ForeignKeyRule};
use crate::core::error::MigrationError;
use crate::core::index::{IndexEntry, KeyGroup};

/// utf8mb4 でインデックス可能なカラムのプレフィックス長
pub const INDEX_PREFIX_LENGTH: u64 = 191;

/// 外部キーの参照アクション
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferentialActions {
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ReferentialActions {
    /// ON DELETE CASCADE のみ
    pub fn cascade() -> Self {
        Self {
            on_delete: Some("CASCADE".to_string()),
            on_update: None,
        }
    }

    /// 取得済みの参照アクションを再現
    ///
    /// RESTRICT / NO ACTION は MySQL の既定動作なので出力しません。
    pub fn from_rule(rule: &ForeignKeyRule) -> Self {
        Self {
            on_delete: explicit_action(&rule.delete_rule),
            on_update: explicit_action(&rule.update_rule),
        }
    }

    fn render(&self) -> String {
        let mut clause = String::new();
        if let Some(action) = &self.on_delete {
            clause.push_str(&format!(" ON DELETE {}", action));
        }
        if let Some(action) = &self.on_update {
            clause.push_str(&format!(" ON UPDATE {}", action));
        }
        clause
    }
}

fn explicit_action(rule: &str) -> Option<String> {
    let rule = rule.trim().to_ascii_uppercase();
    match rule.as_str() {
        "" | "RESTRICT" | "NO ACTION" => None,
        _ => Some(rule),
    }
}

/// インデックス定義内のカラム表記
///
/// 照合順序を持ち最大長が191以上のカラムは `col(191)` とします。
pub fn index_column(entry: &IndexEntry) -> String {
    match entry.character_max_length {
        Some(length) if entry.has_collation && length >= INDEX_PREFIX_LENGTH => {
            format!("{}({})", entry.column_name, INDEX_PREFIX_LENGTH)
        }
        _ => entry.column_name.clone(),
    }
}

/// MySQL用DDLジェネレーター
#[derive(Debug, Clone)]
pub struct MysqlDdlGenerator {
    database: String,
}

impl MysqlDdlGenerator {
    /// 新しいMysqlDdlGeneratorを作成
    ///
    /// # Arguments
    ///
    /// * `database` - テーブル参照の修飾に使うスキーマ名
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// スキーマ修飾したテーブル名
    pub fn qualified_table(&self, table: &str) -> String {
        format!("{}.{}", self.database, table)
    }

    /// 外部キー制約チェックの切り替え
    pub fn foreign_key_checks(&self, enabled: bool) -> String {
        format!("SET foreign_key_checks = {};", if enabled { 1 } else { 0 })
    }

    /// スキーマの既定文字セット/照合順序を変更
    pub fn alter_database(&self, charset: &str, collation: &str) -> String {
        format!(
            "ALTER DATABASE {} CHARACTER SET = {} COLLATE = {};",
            self.database, charset, collation
        )
    }

    /// カラムの文字セット/照合順序を変更
    ///
    /// 型・NULL可否・デフォルト値はカタログの値をそのまま再指定します。
    pub fn change_column(
        &self,
        table: &str,
        column: &ColumnDefinition,
        charset: &str,
        collation: &str,
    ) -> String {
        let mut sql = format!(
            "ALTER TABLE {} CHANGE {} {} {} CHARACTER SET {} COLLATE {}",
            self.qualified_table(table),
            column.column_name,
            column.column_name,
            column.column_type,
            charset,
            collation
        );

        if !column.is_nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default_value) = &column.default_value {
            sql.push_str(&format!(" DEFAULT '{}'", default_value.replace('\'', "''")));
        }

        sql.push(';');
        sql
    }

    /// テーブル内の既存データを変換
    pub fn convert_table(&self, table: &str, charset: &str, collation: &str) -> String {
        format!(
            "ALTER TABLE {} CONVERT TO CHARACTER SET {} COLLATE {};",
            self.qualified_table(table),
            charset,
            collation
        )
    }

    /// テーブルの既定文字セット/照合順序を変更
    pub fn alter_table_default(&self, table: &str, charset: &str, collation: &str) -> String {
        format!(
            "ALTER TABLE {} CHARACTER SET {} COLLATE {};",
            self.qualified_table(table),
            charset,
            collation
        )
    }

    pub fn drop_foreign_key(&self, table: &str, constraint: &str) -> String {
        format!(
            "ALTER TABLE {} DROP FOREIGN KEY {};",
            self.qualified_table(table),
            constraint
        )
    }

    /// 外部キーの裏付けインデックスを削除
    pub fn drop_index_on(&self, table: &str, index: &str) -> String {
        format!("DROP INDEX {} ON {};", index, self.qualified_table(table))
    }

    pub fn drop_index(&self, table: &str, index: &str) -> String {
        format!(
            "ALTER TABLE {} DROP INDEX {};",
            self.qualified_table(table),
            index
        )
    }

    pub fn add_unique(&self, key: &KeyGroup<'_>) -> String {
        format!(
            "ALTER TABLE {} ADD UNIQUE {}({});",
            self.qualified_table(key.table_name),
            key.constraint_name,
            index_columns(key)
        )
    }

    pub fn add_key(&self, key: &KeyGroup<'_>) -> String {
        format!(
            "ALTER TABLE {} ADD KEY {}({});",
            self.qualified_table(key.table_name),
            key.constraint_name,
            index_columns(key)
        )
    }

    /// 外部キー制約を追加
    ///
    /// 外部キーのカラムにはプレフィックスを付けません（MySQL が受け付けないため）。
    pub fn add_foreign_key(
        &self,
        key: &KeyGroup<'_>,
        actions: &ReferentialActions,
    ) -> Result<String, MigrationError> {
        let mut referenced_table: Option<&str> = None;
        let mut columns = Vec::with_capacity(key.members.len());
        let mut referenced_columns = Vec::with_capacity(key.members.len());

        for member in &key.members {
            let (table, column) = match (&member.referenced_table, &member.referenced_column) {
                (Some(table), Some(column)) => (table.as_str(), column.as_str()),
                _ => {
                    return Err(MigrationError::catalog(
                        format!(
                            "Foreign key '{}' on table '{}' has no referenced column for '{}'",
                            key.constraint_name, key.table_name, member.column_name
                        ),
                        None,
                    ))
                }
            };

            match referenced_table {
                None => referenced_table = Some(table),
                Some(existing) if existing != table => {
                    return Err(MigrationError::catalog(
                        format!(
                            "Foreign key '{}' on table '{}' references more than one table",
                            key.constraint_name, key.table_name
                        ),
                        None,
                    ))
                }
                Some(_) => {}
            }

            columns.push(member.column_name.as_str());
            referenced_columns.push(column);
        }

        let referenced_table = referenced_table.ok_or_else(|| {
            MigrationError::catalog(
                format!(
                    "Foreign key '{}' on table '{}' has no columns",
                    key.constraint_name, key.table_name
                ),
                None,
            )
        })?;

        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({}){};",
            self.qualified_table(key.table_name),
            key.constraint_name,
            columns.join(","),
            referenced_table,
            referenced_columns.join(","),
            actions.render()
        ))
    }
}

fn index_columns(key: &KeyGroup<'_>) -> String {
    key.members
        .iter()
        .map(|entry| index_column(entry))
        .collect::<Vec<_>>()
        .join(",")
}
