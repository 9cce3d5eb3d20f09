// カタログクエリ定義
//
// INFORMATION_SCHEMA に対する読み取りクエリを一箇所に集約します。
// 実行時は `?` にパラメータをバインドし、台帳にはリテラルを埋め込んだ形で記録します。

/// パラメータ付きカタログクエリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub sql: &'static str,
    pub params: Vec<String>,
}

impl CatalogQuery {
    fn new(sql: &'static str, params: &[&str]) -> Self {
        Self {
            sql,
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// パラメータを文字列リテラルとして埋め込んだSQLを生成
    pub fn render(&self) -> String {
        let mut rendered = String::with_capacity(self.sql.len() + 32);
        let mut params = self.params.iter();

        for c in self.sql.chars() {
            if c == '?' {
                match params.next() {
                    Some(value) => {
                        rendered.push('\'');
                        rendered.push_str(&value.replace('\'', "''"));
                        rendered.push('\'');
                    }
                    None => rendered.push(c),
                }
            } else {
                rendered.push(c);
            }
        }

        rendered
    }
}

/// ベーステーブル一覧
pub fn base_tables(schema: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE';",
        &[schema],
    )
}

/// スキーマの既定文字セット/照合順序
pub fn schema_defaults(schema: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT DEFAULT_CHARACTER_SET_NAME, DEFAULT_COLLATION_NAME FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = ?;",
        &[schema],
    )
}

/// 照合順序が未設定または目標と異なるベーステーブル
pub fn tables_needing_conversion(schema: &str, collation: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' AND (TABLE_COLLATION IS NULL OR TABLE_COLLATION != ?);",
        &[schema, collation],
    )
}

/// 未変換のベーステーブル数
pub fn count_unconverted_tables(schema: &str, collation: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' AND TABLE_COLLATION IS NOT NULL AND TABLE_COLLATION != ?;",
        &[schema, collation],
    )
}

/// テーブル内で目標と異なる照合順序を持つカラム
pub fn columns_needing_conversion(schema: &str, table: &str, collation: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT COLUMN_NAME, DATA_TYPE, COLUMN_TYPE, IS_NULLABLE, COLUMN_DEFAULT, COLLATION_NAME FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLLATION_NAME IS NOT NULL AND COLLATION_NAME != ? ORDER BY ORDINAL_POSITION;",
        &[schema, table, collation],
    )
}

/// スキーマ全体（ビューを含む）の未変換カラム数
pub fn count_unconverted_columns(schema: &str, collation: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT COUNT(COLUMN_NAME) FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_SCHEMA = ? AND COLLATION_NAME IS NOT NULL AND COLLATION_NAME != ?;",
        &[schema, collation],
    )
}

/// 未変換カラムの一覧（ビューを含む）
pub fn unconverted_columns(schema: &str, collation: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT c.TABLE_NAME, c.COLUMN_NAME, c.COLLATION_NAME, t.TABLE_TYPE FROM INFORMATION_SCHEMA.COLUMNS c JOIN INFORMATION_SCHEMA.TABLES t ON t.TABLE_SCHEMA = c.TABLE_SCHEMA AND t.TABLE_NAME = c.TABLE_NAME WHERE c.TABLE_SCHEMA = ? AND c.COLLATION_NAME IS NOT NULL AND c.COLLATION_NAME != ? ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION;",
        &[schema, collation],
    )
}

/// インデックス収集用のカラム一覧
pub fn column_keys(schema: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT TABLE_NAME, COLUMN_NAME, COLUMN_KEY, COLLATION_NAME, CAST(CHARACTER_MAXIMUM_LENGTH AS UNSIGNED) FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_SCHEMA = ? ORDER BY TABLE_NAME, ORDINAL_POSITION;",
        &[schema],
    )
}

/// カラムを含むインデックス
pub fn index_names(schema: &str, table: &str, column: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT INDEX_NAME, CAST(SEQ_IN_INDEX AS UNSIGNED) FROM INFORMATION_SCHEMA.STATISTICS WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_NAME = ?;",
        &[schema, table, column],
    )
}

/// 名前とカラムを指定したインデックス
pub fn index_names_by_key(schema: &str, table: &str, key_name: &str, column: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT INDEX_NAME, CAST(SEQ_IN_INDEX AS UNSIGNED) FROM INFORMATION_SCHEMA.STATISTICS WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND INDEX_NAME = ? AND COLUMN_NAME = ?;",
        &[schema, table, key_name, column],
    )
}

/// カラムのキー使用情報
pub fn key_usage(schema: &str, table: &str, column: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT CONSTRAINT_NAME, REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME, CAST(ORDINAL_POSITION AS UNSIGNED) FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_NAME = ?;",
        &[schema, table, column],
    )
}

/// 制約の存在確認
pub fn constraint_exists(schema: &str, table: &str, constraint: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT CONSTRAINT_NAME FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = ?;",
        &[schema, table, constraint],
    )
}

/// インデックスの存在確認
pub fn index_exists(schema: &str, table: &str, index: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT INDEX_NAME FROM INFORMATION_SCHEMA.STATISTICS WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND INDEX_NAME = ?;",
        &[schema, table, index],
    )
}

/// 外部キーの参照アクション
pub fn foreign_key_rules(schema: &str) -> CatalogQuery {
    CatalogQuery::new(
        "SELECT TABLE_NAME, CONSTRAINT_NAME, DELETE_RULE, UPDATE_RULE FROM INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS WHERE CONSTRAINT_SCHEMA = ?;",
        &[schema],
    )
}
