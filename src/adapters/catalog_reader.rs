// カタログリーダー
//
// INFORMATION_SCHEMA からテーブル・カラム・インデックス・キー使用情報を取得するための
// 抽象化レイヤー。MySQL 実装は INFORMATION_SCHEMA に接続した専用の接続を使用します。

use crate::adapters::catalog_queries::{self, CatalogQuery};
use crate::core::catalog::{
    ColumnDefinition, ColumnKeyInfo, ForeignKeyRule, IndexNameRow, KeyRole, KeyUsageRow,
    SchemaDefaults, UnconvertedColumn,
};
use crate::core::error::MigrationError;
use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, MySqlConnection, Row};
use tracing::debug;

/// カタログ読み取りインターフェース
///
/// 変換中にカタログの状態は変化するため、結果はキャッシュせず毎回問い合わせます。
#[async_trait]
pub trait CatalogReader: Send {
    /// ベーステーブル名一覧
    async fn base_tables(&mut self, schema: &str) -> Result<Vec<String>, MigrationError>;

    /// スキーマの既定文字セット/照合順序
    async fn schema_defaults(&mut self, schema: &str) -> Result<SchemaDefaults, MigrationError>;

    /// 照合順序が未設定または目標と異なるベーステーブル
    async fn tables_needing_conversion(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<Vec<String>, MigrationError>;

    /// 照合順序が目標と異なるベーステーブル数
    async fn count_unconverted_tables(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<u64, MigrationError>;

    /// テーブル内で照合順序が目標と異なるカラム
    async fn columns_needing_conversion(
        &mut self,
        schema: &str,
        table: &str,
        collation: &str,
    ) -> Result<Vec<ColumnDefinition>, MigrationError>;

    /// スキーマ全体で照合順序が目標と異なるカラム数（ビューを含む）
    async fn count_unconverted_columns(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<u64, MigrationError>;

    /// 照合順序が目標と異なるカラムの一覧（ビューを含む）
    async fn unconverted_columns(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<Vec<UnconvertedColumn>, MigrationError>;

    /// 全カラムのキー情報
    async fn column_keys(&mut self, schema: &str) -> Result<Vec<ColumnKeyInfo>, MigrationError>;

    /// カラムを含むインデックス
    async fn index_names(
        &mut self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<Vec<IndexNameRow>, MigrationError>;

    /// 名前とカラムが一致するインデックス
    async fn index_names_by_key(
        &mut self,
        schema: &str,
        table: &str,
        key_name: &str,
        column: &str,
    ) -> Result<Vec<IndexNameRow>, MigrationError>;

    /// カラムのキー使用情報
    async fn key_usage(
        &mut self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<Vec<KeyUsageRow>, MigrationError>;

    /// 制約がキー使用情報に残っているか
    async fn constraint_exists(
        &mut self,
        schema: &str,
        table: &str,
        constraint: &str,
    ) -> Result<bool, MigrationError>;

    /// インデックスが残っているか
    async fn index_exists(
        &mut self,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<bool, MigrationError>;

    /// 外部キーの参照アクション
    async fn foreign_key_rules(&mut self, schema: &str)
        -> Result<Vec<ForeignKeyRule>, MigrationError>;
}

/// MySQL用カタログリーダー
pub struct MySqlCatalogReader {
    connection: MySqlConnection,
}

impl MySqlCatalogReader {
    /// INFORMATION_SCHEMA に接続済みの接続から作成
    pub fn new(connection: MySqlConnection) -> Self {
        Self { connection }
    }

    /// 接続を取り出す（切断用）
    pub fn into_inner(self) -> MySqlConnection {
        self.connection
    }

    async fn fetch_all(&mut self, query: &CatalogQuery) -> Result<Vec<MySqlRow>, MigrationError> {
        debug!(sql = %query.sql, params = ?query.params, "Catalog query");

        bind(query)
            .fetch_all(&mut self.connection)
            .await
            .map_err(|e| {
                MigrationError::catalog(format!("Catalog query failed: {}", e), Some(query.render()))
            })
    }

    async fn fetch_count(&mut self, query: &CatalogQuery) -> Result<u64, MigrationError> {
        let rows = self.fetch_all(query).await?;
        match rows.first() {
            Some(row) => {
                let count: i64 = get(row, 0, query)?;
                Ok(count.max(0) as u64)
            }
            None => Ok(0),
        }
    }
}

fn bind(query: &CatalogQuery) -> Query<'_, MySql, MySqlArguments> {
    let mut prepared = sqlx::query(query.sql);
    for param in &query.params {
        prepared = prepared.bind(param.as_str());
    }
    prepared
}

fn get<'r, T>(row: &'r MySqlRow, index: usize, query: &CatalogQuery) -> Result<T, MigrationError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(index).map_err(|e| {
        MigrationError::catalog(
            format!("Failed to decode column {} of catalog row: {}", index, e),
            Some(query.render()),
        )
    })
}

fn to_u32(value: u64, what: &str, query: &CatalogQuery) -> Result<u32, MigrationError> {
    u32::try_from(value).map_err(|_| {
        MigrationError::catalog(
            format!("{} out of range: {}", what, value),
            Some(query.render()),
        )
    })
}

fn index_name_rows(rows: &[MySqlRow], query: &CatalogQuery) -> Result<Vec<IndexNameRow>, MigrationError> {
    rows.iter()
        .map(|row| {
            let seq: u64 = get(row, 1, query)?;
            Ok(IndexNameRow {
                key_name: get(row, 0, query)?,
                seq_in_index: to_u32(seq, "SEQ_IN_INDEX", query)?,
            })
        })
        .collect()
}

#[async_trait]
impl CatalogReader for MySqlCatalogReader {
    async fn base_tables(&mut self, schema: &str) -> Result<Vec<String>, MigrationError> {
        let query = catalog_queries::base_tables(schema);
        let rows = self.fetch_all(&query).await?;
        rows.iter().map(|row| get(row, 0, &query)).collect()
    }

    async fn schema_defaults(&mut self, schema: &str) -> Result<SchemaDefaults, MigrationError> {
        let query = catalog_queries::schema_defaults(schema);
        let rows = self.fetch_all(&query).await?;
        let row = rows.first().ok_or_else(|| {
            MigrationError::catalog(
                format!("Schema '{}' does not exist", schema),
                Some(query.render()),
            )
        })?;

        Ok(SchemaDefaults {
            charset: get(row, 0, &query)?,
            collation: get(row, 1, &query)?,
        })
    }

    async fn tables_needing_conversion(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<Vec<String>, MigrationError> {
        let query = catalog_queries::tables_needing_conversion(schema, collation);
        let rows = self.fetch_all(&query).await?;
        rows.iter().map(|row| get(row, 0, &query)).collect()
    }

    async fn count_unconverted_tables(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<u64, MigrationError> {
        let query = catalog_queries::count_unconverted_tables(schema, collation);
        self.fetch_count(&query).await
    }

    async fn columns_needing_conversion(
        &mut self,
        schema: &str,
        table: &str,
        collation: &str,
    ) -> Result<Vec<ColumnDefinition>, MigrationError> {
        let query = catalog_queries::columns_needing_conversion(schema, table, collation);
        let rows = self.fetch_all(&query).await?;

        rows.iter()
            .map(|row| {
                let is_nullable: String = get(row, 3, &query)?;
                Ok(ColumnDefinition {
                    column_name: get(row, 0, &query)?,
                    data_type: get(row, 1, &query)?,
                    column_type: get(row, 2, &query)?,
                    is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
                    default_value: get(row, 4, &query)?,
                    collation: get(row, 5, &query)?,
                })
            })
            .collect()
    }

    async fn count_unconverted_columns(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<u64, MigrationError> {
        let query = catalog_queries::count_unconverted_columns(schema, collation);
        self.fetch_count(&query).await
    }

    async fn unconverted_columns(
        &mut self,
        schema: &str,
        collation: &str,
    ) -> Result<Vec<UnconvertedColumn>, MigrationError> {
        let query = catalog_queries::unconverted_columns(schema, collation);
        let rows = self.fetch_all(&query).await?;

        rows.iter()
            .map(|row| {
                let table_type: String = get(row, 3, &query)?;
                Ok(UnconvertedColumn {
                    table_name: get(row, 0, &query)?,
                    column_name: get(row, 1, &query)?,
                    collation: get(row, 2, &query)?,
                    in_view: table_type.eq_ignore_ascii_case("VIEW"),
                })
            })
            .collect()
    }

    async fn column_keys(&mut self, schema: &str) -> Result<Vec<ColumnKeyInfo>, MigrationError> {
        let query = catalog_queries::column_keys(schema);
        let rows = self.fetch_all(&query).await?;

        rows.iter()
            .map(|row| {
                let column_key: String = get(row, 2, &query)?;
                Ok(ColumnKeyInfo {
                    table_name: get(row, 0, &query)?,
                    column_name: get(row, 1, &query)?,
                    role: KeyRole::from_column_key(&column_key),
                    collation: get(row, 3, &query)?,
                    character_max_length: get(row, 4, &query)?,
                })
            })
            .collect()
    }

    async fn index_names(
        &mut self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<Vec<IndexNameRow>, MigrationError> {
        let query = catalog_queries::index_names(schema, table, column);
        let rows = self.fetch_all(&query).await?;
        index_name_rows(&rows, &query)
    }

    async fn index_names_by_key(
        &mut self,
        schema: &str,
        table: &str,
        key_name: &str,
        column: &str,
    ) -> Result<Vec<IndexNameRow>, MigrationError> {
        let query = catalog_queries::index_names_by_key(schema, table, key_name, column);
        let rows = self.fetch_all(&query).await?;
        index_name_rows(&rows, &query)
    }

    async fn key_usage(
        &mut self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<Vec<KeyUsageRow>, MigrationError> {
        let query = catalog_queries::key_usage(schema, table, column);
        let rows = self.fetch_all(&query).await?;

        rows.iter()
            .map(|row| {
                let position: u64 = get(row, 3, &query)?;
                Ok(KeyUsageRow {
                    constraint_name: get(row, 0, &query)?,
                    referenced_table: get(row, 1, &query)?,
                    referenced_column: get(row, 2, &query)?,
                    ordinal_position: to_u32(position, "ORDINAL_POSITION", &query)?,
                })
            })
            .collect()
    }

    async fn constraint_exists(
        &mut self,
        schema: &str,
        table: &str,
        constraint: &str,
    ) -> Result<bool, MigrationError> {
        let query = catalog_queries::constraint_exists(schema, table, constraint);
        Ok(!self.fetch_all(&query).await?.is_empty())
    }

    async fn index_exists(
        &mut self,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<bool, MigrationError> {
        let query = catalog_queries::index_exists(schema, table, index);
        Ok(!self.fetch_all(&query).await?.is_empty())
    }

    async fn foreign_key_rules(
        &mut self,
        schema: &str,
    ) -> Result<Vec<ForeignKeyRule>, MigrationError> {
        let query = catalog_queries::foreign_key_rules(schema);
        let rows = self.fetch_all(&query).await?;

        rows.iter()
            .map(|row| {
                Ok(ForeignKeyRule {
                    table_name: get(row, 0, &query)?,
                    constraint_name: get(row, 1, &query)?,
                    delete_rule: get(row, 2, &query)?,
                    update_rule: get(row, 3, &query)?,
                })
            })
            .collect()
    }
}
