/// テスト用のインメモリMySQL
///
/// CatalogReader と SchemaExecutor の両方を同じ状態の上に実装し、
/// 発行されたDDLを正規表現で解釈してスキーマを更新します。
///
/// 再現するMySQLの挙動:
/// - COLUMN_KEY（PRI / UNI / MUL）の導出
/// - インデックスのキー長制限（1カラムあたり767バイト）
/// - 外部キーが必要とするインデックスは削除できない
/// - 外部キー追加時に先頭カラムが一致するインデックスがなければ自動作成
/// - foreign_key_checks = 1 の間は外部キーに含まれるカラムを変更できない
#[allow(dead_code)]
pub mod fake_mysql {
    use async_trait::async_trait;
    use recollate::adapters::catalog_reader::CatalogReader;
    use recollate::adapters::schema_executor::SchemaExecutor;
    use recollate::core::catalog::{
        ColumnDefinition, ColumnKeyInfo, ForeignKeyRule, IndexNameRow, KeyRole, KeyUsageRow,
        SchemaDefaults, UnconvertedColumn,
    };
    use recollate::core::config::{ConversionTarget, ForeignKeyActionPolicy};
    use recollate::core::error::MigrationError;
    use recollate::services::migration_context::MigrationContext;
    use recollate::services::migration_pipeline::{MigrationPipeline, MigrationReport};
    use regex::Regex;
    use std::sync::{Arc, Mutex, MutexGuard};

    pub const DATABASE: &str = "shop";
    pub const TARGET_CHARSET: &str = "utf8mb4";
    pub const TARGET_COLLATION: &str = "utf8mb4_unicode_ci";
    pub const SOURCE_COLLATION: &str = "latin1_swedish_ci";
    const MAX_KEY_BYTES: u64 = 767;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeColumn {
        pub name: String,
        pub column_type: String,
        pub nullable: bool,
        pub default_value: Option<String>,
        pub collation: Option<String>,
        pub max_length: Option<u64>,
    }

    impl FakeColumn {
        pub fn int(name: &str) -> Self {
            Self {
                name: name.to_string(),
                column_type: "int".to_string(),
                nullable: false,
                default_value: None,
                collation: None,
                max_length: None,
            }
        }

        pub fn varchar(name: &str, length: u64, collation: &str) -> Self {
            Self {
                name: name.to_string(),
                column_type: format!("varchar({})", length),
                nullable: true,
                default_value: None,
                collation: Some(collation.to_string()),
                max_length: Some(length),
            }
        }

        pub fn not_null(mut self) -> Self {
            self.nullable = false;
            self
        }

        pub fn default_value(mut self, value: &str) -> Self {
            self.default_value = Some(value.to_string());
            self
        }

        fn data_type(&self) -> String {
            self.column_type
                .split('(')
                .next()
                .unwrap_or_default()
                .to_string()
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum IndexKind {
        Primary,
        Unique,
        Plain,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeIndex {
        pub name: String,
        pub kind: IndexKind,
        /// (カラム名, プレフィックス長)
        pub parts: Vec<(String, Option<u64>)>,
    }

    impl FakeIndex {
        fn leads_with(&self, columns: &[String]) -> bool {
            self.parts.len() >= columns.len()
                && self
                    .parts
                    .iter()
                    .zip(columns)
                    .all(|((part, _), column)| part == column)
        }

        fn position_of(&self, column: &str) -> Option<u32> {
            self.parts
                .iter()
                .position(|(part, _)| part == column)
                .map(|p| p as u32 + 1)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeForeignKey {
        pub name: String,
        pub columns: Vec<String>,
        pub referenced_table: String,
        pub referenced_columns: Vec<String>,
        pub delete_rule: String,
        pub update_rule: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeTable {
        pub name: String,
        pub collation: Option<String>,
        pub columns: Vec<FakeColumn>,
        pub indexes: Vec<FakeIndex>,
        pub foreign_keys: Vec<FakeForeignKey>,
    }

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    impl FakeTable {
        pub fn new(name: &str, collation: &str) -> Self {
            Self {
                name: name.to_string(),
                collation: Some(collation.to_string()),
                columns: vec![],
                indexes: vec![],
                foreign_keys: vec![],
            }
        }

        pub fn column(mut self, column: FakeColumn) -> Self {
            self.columns.push(column);
            self
        }

        fn index(mut self, name: &str, kind: IndexKind, columns: &[&str]) -> Self {
            self.indexes.push(FakeIndex {
                name: name.to_string(),
                kind,
                parts: columns.iter().map(|c| (c.to_string(), None)).collect(),
            });
            self
        }

        pub fn primary_key(self, columns: &[&str]) -> Self {
            self.index("PRIMARY", IndexKind::Primary, columns)
        }

        pub fn unique(self, name: &str, columns: &[&str]) -> Self {
            self.index(name, IndexKind::Unique, columns)
        }

        pub fn key(self, name: &str, columns: &[&str]) -> Self {
            self.index(name, IndexKind::Plain, columns)
        }

        pub fn foreign_key(
            mut self,
            name: &str,
            columns: &[&str],
            referenced_table: &str,
            referenced_columns: &[&str],
            delete_rule: &str,
            update_rule: &str,
        ) -> Self {
            let columns = names(columns);
            if !self.indexes.iter().any(|i| i.leads_with(&columns)) {
                self.indexes.push(FakeIndex {
                    name: name.to_string(),
                    kind: IndexKind::Plain,
                    parts: columns.iter().map(|c| (c.clone(), None)).collect(),
                });
            }
            self.foreign_keys.push(FakeForeignKey {
                name: name.to_string(),
                columns,
                referenced_table: referenced_table.to_string(),
                referenced_columns: names(referenced_columns),
                delete_rule: delete_rule.to_string(),
                update_rule: update_rule.to_string(),
            });
            self
        }

        pub fn find_index(&self, name: &str) -> Option<&FakeIndex> {
            self.indexes.iter().find(|i| i.name == name)
        }

        pub fn find_column(&self, name: &str) -> Option<&FakeColumn> {
            self.columns.iter().find(|c| c.name == name)
        }

        pub fn find_foreign_key(&self, name: &str) -> Option<&FakeForeignKey> {
            self.foreign_keys.iter().find(|f| f.name == name)
        }

        fn column_key(&self, column: &str) -> &'static str {
            let in_primary = self
                .indexes
                .iter()
                .any(|i| i.kind == IndexKind::Primary && i.position_of(column).is_some());
            let single_unique = self.indexes.iter().any(|i| {
                i.kind == IndexKind::Unique && i.parts.len() == 1 && i.parts[0].0 == column
            });
            let leading = self
                .indexes
                .iter()
                .any(|i| i.parts.first().is_some_and(|(part, _)| part == column));

            if in_primary {
                "PRI"
            } else if single_unique {
                "UNI"
            } else if leading {
                "MUL"
            } else {
                ""
            }
        }

        fn key_usage(&self, column: &str) -> Vec<KeyUsageRow> {
            let mut rows = Vec::new();
            for index in &self.indexes {
                if index.kind == IndexKind::Plain {
                    continue;
                }
                if let Some(position) = index.position_of(column) {
                    rows.push(KeyUsageRow {
                        constraint_name: index.name.clone(),
                        referenced_table: None,
                        referenced_column: None,
                        ordinal_position: position,
                    });
                }
            }
            for fk in &self.foreign_keys {
                if let Some(p) = fk.columns.iter().position(|c| c == column) {
                    rows.push(KeyUsageRow {
                        constraint_name: fk.name.clone(),
                        referenced_table: Some(fk.referenced_table.clone()),
                        referenced_column: Some(fk.referenced_columns[p].clone()),
                        ordinal_position: p as u32 + 1,
                    });
                }
            }
            rows
        }

        fn has_constraint(&self, name: &str) -> bool {
            self.indexes
                .iter()
                .any(|i| i.name == name && i.kind != IndexKind::Plain)
                || self.foreign_keys.iter().any(|f| f.name == name)
        }

        fn check_key_lengths(&self, sql: &str) -> Result<(), MigrationError> {
            for index in &self.indexes {
                check_index_length(self, index, sql)?;
            }
            Ok(())
        }
    }

    fn bytes_per_char(collation: &str) -> u64 {
        match collation.split('_').next().unwrap_or_default() {
            "latin1" | "ascii" | "binary" => 1,
            "ucs2" => 2,
            "utf8" | "utf8mb3" => 3,
            _ => 4,
        }
    }

    fn check_index_length(
        table: &FakeTable,
        index: &FakeIndex,
        sql: &str,
    ) -> Result<(), MigrationError> {
        for (column, prefix) in &index.parts {
            let column = table.find_column(column).ok_or_else(|| {
                MigrationError::ddl(
                    format!("Key column '{}' doesn't exist in table", column),
                    sql,
                )
            })?;
            if let (Some(collation), Some(max)) = (&column.collation, column.max_length) {
                let chars = prefix.unwrap_or(max).min(max);
                if chars * bytes_per_char(collation) > MAX_KEY_BYTES {
                    return Err(MigrationError::ddl(
                        format!(
                            "Specified key was too long; max key length is {} bytes",
                            MAX_KEY_BYTES
                        ),
                        sql,
                    ));
                }
            }
        }
        Ok(())
    }

    /// スキーマ全体の状態
    #[derive(Debug, Clone)]
    pub struct FakeSchema {
        pub name: String,
        pub charset: String,
        pub collation: String,
        pub tables: Vec<FakeTable>,
        pub foreign_key_checks: bool,
        /// 実行されたステートメント（成功したもののみ）
        pub executed: Vec<String>,
        /// この文字列を含むステートメントを失敗させる
        pub fail_on: Option<String>,
        /// ALTER DATABASE が返す影響行数
        pub database_rows_affected: u64,
        /// CHANGE を無視するカラム (テーブル, カラム)
        pub frozen_columns: Vec<(String, String)>,
        /// ビュー（変換の対象外で、カラムの再集計にのみ現れる）
        pub views: Vec<FakeTable>,
    }

    impl FakeSchema {
        pub fn new(name: &str, charset: &str, collation: &str) -> Self {
            Self {
                name: name.to_string(),
                charset: charset.to_string(),
                collation: collation.to_string(),
                tables: vec![],
                foreign_key_checks: true,
                executed: vec![],
                fail_on: None,
                database_rows_affected: 1,
                frozen_columns: vec![],
                views: vec![],
            }
        }

        pub fn table(mut self, table: FakeTable) -> Self {
            self.tables.push(table);
            self
        }

        pub fn find_table(&self, name: &str) -> Option<&FakeTable> {
            self.tables.iter().find(|t| t.name == name)
        }

        fn table_mut(
            &mut self,
            schema: &str,
            table: &str,
            sql: &str,
        ) -> Result<&mut FakeTable, MigrationError> {
            if schema != self.name {
                return Err(MigrationError::ddl(
                    format!("Unknown database '{}'", schema),
                    sql,
                ));
            }
            self.tables
                .iter_mut()
                .find(|t| t.name == table)
                .ok_or_else(|| {
                    MigrationError::ddl(format!("Table '{}.{}' doesn't exist", schema, table), sql)
                })
        }

        fn sorted_tables(&self) -> Vec<&FakeTable> {
            let mut tables: Vec<&FakeTable> = self.tables.iter().collect();
            tables.sort_by(|a, b| a.name.cmp(&b.name));
            tables
        }

        fn is_referenced_column(&self, table: &str, column: &str) -> bool {
            self.tables.iter().any(|t| {
                t.foreign_keys.iter().any(|fk| {
                    (t.name == table && fk.columns.iter().any(|c| c == column))
                        || (fk.referenced_table == table
                            && fk.referenced_columns.iter().any(|c| c == column))
                })
            })
        }
    }

    /// 共有状態へのハンドル
    #[derive(Debug, Clone)]
    pub struct FakeMySql {
        state: Arc<Mutex<FakeSchema>>,
    }

    impl FakeMySql {
        pub fn new(schema: FakeSchema) -> Self {
            Self {
                state: Arc::new(Mutex::new(schema)),
            }
        }

        pub fn state(&self) -> MutexGuard<'_, FakeSchema> {
            self.state.lock().unwrap()
        }

        pub fn snapshot(&self) -> FakeSchema {
            self.state().clone()
        }
    }

    #[async_trait]
    impl CatalogReader for FakeMySql {
        async fn base_tables(&mut self, _schema: &str) -> Result<Vec<String>, MigrationError> {
            Ok(self.state().tables.iter().map(|t| t.name.clone()).collect())
        }

        async fn schema_defaults(
            &mut self,
            _schema: &str,
        ) -> Result<SchemaDefaults, MigrationError> {
            let state = self.state();
            Ok(SchemaDefaults {
                charset: state.charset.clone(),
                collation: state.collation.clone(),
            })
        }

        async fn tables_needing_conversion(
            &mut self,
            _schema: &str,
            collation: &str,
        ) -> Result<Vec<String>, MigrationError> {
            Ok(self
                .state()
                .tables
                .iter()
                .filter(|t| t.collation.as_deref() != Some(collation))
                .map(|t| t.name.clone())
                .collect())
        }

        async fn count_unconverted_tables(
            &mut self,
            _schema: &str,
            collation: &str,
        ) -> Result<u64, MigrationError> {
            Ok(self
                .state()
                .tables
                .iter()
                .filter(|t| t.collation.as_deref().is_some_and(|c| c != collation))
                .count() as u64)
        }

        async fn columns_needing_conversion(
            &mut self,
            _schema: &str,
            table: &str,
            collation: &str,
        ) -> Result<Vec<ColumnDefinition>, MigrationError> {
            let state = self.state();
            let Some(table) = state.find_table(table) else {
                return Ok(vec![]);
            };
            Ok(table
                .columns
                .iter()
                .filter(|c| c.collation.as_deref().is_some_and(|co| co != collation))
                .map(|c| ColumnDefinition {
                    column_name: c.name.clone(),
                    data_type: c.data_type(),
                    column_type: c.column_type.clone(),
                    is_nullable: c.nullable,
                    default_value: c.default_value.clone(),
                    collation: c.collation.clone(),
                })
                .collect())
        }

        async fn count_unconverted_columns(
            &mut self,
            _schema: &str,
            collation: &str,
        ) -> Result<u64, MigrationError> {
            let state = self.state();
            Ok(state
                .tables
                .iter()
                .chain(state.views.iter())
                .flat_map(|t| t.columns.iter())
                .filter(|c| c.collation.as_deref().is_some_and(|co| co != collation))
                .count() as u64)
        }

        async fn unconverted_columns(
            &mut self,
            _schema: &str,
            collation: &str,
        ) -> Result<Vec<UnconvertedColumn>, MigrationError> {
            let state = self.state();
            let tables = state.tables.iter().map(|t| (t, false));
            let views = state.views.iter().map(|v| (v, true));
            Ok(tables
                .chain(views)
                .flat_map(|(table, in_view)| {
                    table.columns.iter().filter_map(move |c| {
                        c.collation
                            .as_deref()
                            .filter(|co| *co != collation)
                            .map(|co| UnconvertedColumn {
                                table_name: table.name.clone(),
                                column_name: c.name.clone(),
                                collation: co.to_string(),
                                in_view,
                            })
                    })
                })
                .collect())
        }

        async fn column_keys(&mut self, _schema: &str) -> Result<Vec<ColumnKeyInfo>, MigrationError> {
            let state = self.state();
            let mut rows = Vec::new();
            for table in state.sorted_tables() {
                for column in &table.columns {
                    rows.push(ColumnKeyInfo {
                        table_name: table.name.clone(),
                        column_name: column.name.clone(),
                        role: KeyRole::from_column_key(table.column_key(&column.name)),
                        collation: column.collation.clone(),
                        character_max_length: column.max_length,
                    });
                }
            }
            Ok(rows)
        }

        async fn index_names(
            &mut self,
            _schema: &str,
            table: &str,
            column: &str,
        ) -> Result<Vec<IndexNameRow>, MigrationError> {
            let state = self.state();
            let Some(table) = state.find_table(table) else {
                return Ok(vec![]);
            };
            Ok(table
                .indexes
                .iter()
                .filter_map(|i| {
                    i.position_of(column).map(|seq| IndexNameRow {
                        key_name: i.name.clone(),
                        seq_in_index: seq,
                    })
                })
                .collect())
        }

        async fn index_names_by_key(
            &mut self,
            schema: &str,
            table: &str,
            key_name: &str,
            column: &str,
        ) -> Result<Vec<IndexNameRow>, MigrationError> {
            let rows = self.index_names(schema, table, column).await?;
            Ok(rows.into_iter().filter(|r| r.key_name == key_name).collect())
        }

        async fn key_usage(
            &mut self,
            _schema: &str,
            table: &str,
            column: &str,
        ) -> Result<Vec<KeyUsageRow>, MigrationError> {
            Ok(self
                .state()
                .find_table(table)
                .map(|t| t.key_usage(column))
                .unwrap_or_default())
        }

        async fn constraint_exists(
            &mut self,
            _schema: &str,
            table: &str,
            constraint: &str,
        ) -> Result<bool, MigrationError> {
            Ok(self
                .state()
                .find_table(table)
                .is_some_and(|t| t.has_constraint(constraint)))
        }

        async fn index_exists(
            &mut self,
            _schema: &str,
            table: &str,
            index: &str,
        ) -> Result<bool, MigrationError> {
            Ok(self
                .state()
                .find_table(table)
                .is_some_and(|t| t.find_index(index).is_some()))
        }

        async fn foreign_key_rules(
            &mut self,
            _schema: &str,
        ) -> Result<Vec<ForeignKeyRule>, MigrationError> {
            let state = self.state();
            Ok(state
                .tables
                .iter()
                .flat_map(|t| {
                    t.foreign_keys.iter().map(move |fk| ForeignKeyRule {
                        table_name: t.name.clone(),
                        constraint_name: fk.name.clone(),
                        delete_rule: fk.delete_rule.clone(),
                        update_rule: fk.update_rule.clone(),
                    })
                })
                .collect())
        }
    }

    #[async_trait]
    impl SchemaExecutor for FakeMySql {
        async fn execute(&mut self, sql: &str) -> Result<u64, MigrationError> {
            let mut state = self.state();
            if let Some(pattern) = &state.fail_on {
                if sql.contains(pattern.as_str()) {
                    return Err(MigrationError::ddl("Injected failure", sql));
                }
            }
            let rows = apply_statement(&mut state, sql)?;
            state.executed.push(sql.to_string());
            Ok(rows)
        }
    }

    fn regex(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    fn parse_parts(list: &str) -> Vec<(String, Option<u64>)> {
        let part = regex(r"^(\w+)(?:\((\d+)\))?$");
        list.split(',')
            .map(|item| {
                let caps = part.captures(item.trim()).unwrap();
                (
                    caps[1].to_string(),
                    caps.get(2).map(|m| m.as_str().parse().unwrap()),
                )
            })
            .collect()
    }

    fn split_names(list: &str) -> Vec<String> {
        list.split(',').map(|s| s.trim().to_string()).collect()
    }

    fn apply_statement(state: &mut FakeSchema, sql: &str) -> Result<u64, MigrationError> {
        if let Some(c) = regex(r"^SET foreign_key_checks = ([01]);$").captures(sql) {
            state.foreign_key_checks = &c[1] == "1";
            return Ok(0);
        }

        if let Some(c) =
            regex(r"^ALTER DATABASE (\w+) CHARACTER SET = (\w+) COLLATE = (\w+);$").captures(sql)
        {
            if c[1] != state.name {
                return Err(MigrationError::ddl("Unknown database", sql));
            }
            state.charset = c[2].to_string();
            state.collation = c[3].to_string();
            return Ok(state.database_rows_affected);
        }

        if let Some(c) = regex(
            r"^ALTER TABLE (\w+)\.(\w+) CHANGE (\w+) (\w+) (\S+) CHARACTER SET (\w+) COLLATE (\w+)( NOT NULL)?(?: DEFAULT '((?:[^']|'')*)')?;$",
        )
        .captures(sql)
        {
            let (table_name, column_name) = (c[2].to_string(), c[3].to_string());
            if state.foreign_key_checks && state.is_referenced_column(&table_name, &column_name) {
                return Err(MigrationError::ddl(
                    "Cannot change column used in a foreign key constraint",
                    sql,
                ));
            }
            let frozen = state
                .frozen_columns
                .contains(&(table_name.clone(), column_name.clone()));
            let table = state.table_mut(&c[1], &table_name, sql)?;
            if frozen {
                return Ok(0);
            }

            let backup = table.clone();
            let column = table
                .columns
                .iter_mut()
                .find(|col| col.name == column_name)
                .ok_or_else(|| MigrationError::ddl("Unknown column", sql))?;
            column.name = c[4].to_string();
            column.column_type = c[5].to_string();
            column.collation = Some(c[7].to_string());
            column.nullable = c.get(8).is_none();
            column.default_value = c.get(9).map(|m| m.as_str().replace("''", "'"));

            if let Err(e) = table.check_key_lengths(sql) {
                *table = backup;
                return Err(e);
            }
            return Ok(0);
        }

        if let Some(c) =
            regex(r"^ALTER TABLE (\w+)\.(\w+) CONVERT TO CHARACTER SET (\w+) COLLATE (\w+);$")
                .captures(sql)
        {
            let table = state.table_mut(&c[1], &c[2], sql)?;
            let backup = table.clone();
            for column in table.columns.iter_mut().filter(|col| col.collation.is_some()) {
                column.collation = Some(c[4].to_string());
            }
            table.collation = Some(c[4].to_string());
            if let Err(e) = table.check_key_lengths(sql) {
                *table = backup;
                return Err(e);
            }
            return Ok(0);
        }

        if let Some(c) =
            regex(r"^ALTER TABLE (\w+)\.(\w+) CHARACTER SET (\w+) COLLATE (\w+);$").captures(sql)
        {
            let table = state.table_mut(&c[1], &c[2], sql)?;
            table.collation = Some(c[4].to_string());
            return Ok(0);
        }

        if let Some(c) = regex(r"^ALTER TABLE (\w+)\.(\w+) DROP FOREIGN KEY (\w+);$").captures(sql)
        {
            let table = state.table_mut(&c[1], &c[2], sql)?;
            let before = table.foreign_keys.len();
            table.foreign_keys.retain(|fk| fk.name != c[3]);
            if table.foreign_keys.len() == before {
                return Err(MigrationError::ddl(
                    format!("Can't DROP FOREIGN KEY '{}'; check that it exists", &c[3]),
                    sql,
                ));
            }
            return Ok(0);
        }

        let drop_index = regex(r"^DROP INDEX (\w+) ON (\w+)\.(\w+);$")
            .captures(sql)
            .map(|c| (c[2].to_string(), c[3].to_string(), c[1].to_string()))
            .or_else(|| {
                regex(r"^ALTER TABLE (\w+)\.(\w+) DROP INDEX (\w+);$")
                    .captures(sql)
                    .map(|c| (c[1].to_string(), c[2].to_string(), c[3].to_string()))
            });
        if let Some((schema, table_name, index_name)) = drop_index {
            let table = state.table_mut(&schema, &table_name, sql)?;
            if table.find_index(&index_name).is_none() {
                return Err(MigrationError::ddl(
                    format!("Can't DROP '{}'; check that column/key exists", index_name),
                    sql,
                ));
            }
            for fk in &table.foreign_keys {
                let covering: Vec<&FakeIndex> = table
                    .indexes
                    .iter()
                    .filter(|i| i.leads_with(&fk.columns))
                    .collect();
                if covering.len() == 1 && covering[0].name == index_name {
                    return Err(MigrationError::ddl(
                        format!(
                            "Cannot drop index '{}': needed in a foreign key constraint",
                            index_name
                        ),
                        sql,
                    ));
                }
            }
            table.indexes.retain(|i| i.name != index_name);
            return Ok(0);
        }

        if let Some(c) =
            regex(r"^ALTER TABLE (\w+)\.(\w+) ADD (UNIQUE|KEY) (\w+)\((.*)\);$").captures(sql)
        {
            let table = state.table_mut(&c[1], &c[2], sql)?;
            if table.find_index(&c[4]).is_some() {
                return Err(MigrationError::ddl(
                    format!("Duplicate key name '{}'", &c[4]),
                    sql,
                ));
            }
            let index = FakeIndex {
                name: c[4].to_string(),
                kind: if &c[3] == "UNIQUE" {
                    IndexKind::Unique
                } else {
                    IndexKind::Plain
                },
                parts: parse_parts(&c[5]),
            };
            check_index_length(table, &index, sql)?;
            table.indexes.push(index);
            return Ok(0);
        }

        if let Some(c) = regex(
            r"^ALTER TABLE (\w+)\.(\w+) ADD CONSTRAINT (\w+) FOREIGN KEY \(([^)]*)\) REFERENCES (\w+)\(([^)]*)\)(?: ON DELETE (SET NULL|SET DEFAULT|CASCADE))?(?: ON UPDATE (SET NULL|SET DEFAULT|CASCADE))?;$",
        )
        .captures(sql)
        {
            let table = state.table_mut(&c[1], &c[2], sql)?;
            if table.find_foreign_key(&c[3]).is_some() {
                return Err(MigrationError::ddl(
                    format!("Duplicate foreign key constraint name '{}'", &c[3]),
                    sql,
                ));
            }
            let columns = split_names(&c[4]);
            if !table.indexes.iter().any(|i| i.leads_with(&columns)) {
                table.indexes.push(FakeIndex {
                    name: c[3].to_string(),
                    kind: IndexKind::Plain,
                    parts: columns.iter().map(|col| (col.clone(), None)).collect(),
                });
            }
            table.foreign_keys.push(FakeForeignKey {
                name: c[3].to_string(),
                columns,
                referenced_table: c[5].to_string(),
                referenced_columns: split_names(&c[6]),
                delete_rule: c.get(7).map_or("RESTRICT", |m| m.as_str()).to_string(),
                update_rule: c.get(8).map_or("RESTRICT", |m| m.as_str()).to_string(),
            });
            return Ok(0);
        }

        Err(MigrationError::ddl("You have an error in your SQL syntax", sql))
    }

    /// 変換前のショップスキーマ
    ///
    /// - customers: 主キー、単一カラムのユニークキー、通常インデックス
    /// - orders: 外部キー（ON DELETE CASCADE）と NOT NULL + DEFAULT のカラム
    /// - accounts: 文字列カラムを含む複合ユニークキー
    pub fn shop_schema() -> FakeSchema {
        FakeSchema::new(DATABASE, "latin1", SOURCE_COLLATION)
            .table(
                FakeTable::new("customers", SOURCE_COLLATION)
                    .column(FakeColumn::int("id"))
                    .column(FakeColumn::varchar("email", 255, SOURCE_COLLATION))
                    .column(FakeColumn::varchar("name", 100, SOURCE_COLLATION))
                    .primary_key(&["id"])
                    .unique("uq_email", &["email"])
                    .key("idx_name", &["name"]),
            )
            .table(
                FakeTable::new("orders", SOURCE_COLLATION)
                    .column(FakeColumn::int("id"))
                    .column(FakeColumn::int("customer_id"))
                    .column(
                        FakeColumn::varchar("note", 100, SOURCE_COLLATION)
                            .not_null()
                            .default_value("n/a"),
                    )
                    .column(FakeColumn::varchar("status", 20, SOURCE_COLLATION))
                    .primary_key(&["id"])
                    .foreign_key(
                        "fk_cust",
                        &["customer_id"],
                        "customers",
                        &["id"],
                        "CASCADE",
                        "RESTRICT",
                    ),
            )
            .table(
                FakeTable::new("accounts", SOURCE_COLLATION)
                    .column(FakeColumn::int("id"))
                    .column(FakeColumn::int("owner_id"))
                    .column(FakeColumn::varchar("type", 255, SOURCE_COLLATION))
                    .primary_key(&["id"])
                    .unique("uq_owner_type", &["owner_id", "type"]),
            )
    }

    /// 複合主キーを参照する複合外部キーを持つスキーマ
    pub fn composite_schema() -> FakeSchema {
        FakeSchema::new(DATABASE, "latin1", SOURCE_COLLATION)
            .table(
                FakeTable::new("products", SOURCE_COLLATION)
                    .column(FakeColumn::int("vendor_id"))
                    .column(FakeColumn::varchar("code", 64, SOURCE_COLLATION))
                    .primary_key(&["vendor_id", "code"]),
            )
            .table(
                FakeTable::new("order_lines", SOURCE_COLLATION)
                    .column(FakeColumn::int("id"))
                    .column(FakeColumn::int("vendor_id"))
                    .column(FakeColumn::varchar("code", 64, SOURCE_COLLATION))
                    .primary_key(&["id"])
                    .foreign_key(
                        "fk_line_product",
                        &["vendor_id", "code"],
                        "products",
                        &["vendor_id", "code"],
                        "RESTRICT",
                        "CASCADE",
                    ),
            )
    }

    /// テナント単位の複合主キーを持つスキーマ
    ///
    /// - users: 主キー (tenant_id, id) を先頭・末尾に含む複合ユニークキー
    /// - sessions: 主キーのカラムから始まる複合外部キー
    pub fn tenant_schema() -> FakeSchema {
        FakeSchema::new(DATABASE, "latin1", SOURCE_COLLATION)
            .table(
                FakeTable::new("users", SOURCE_COLLATION)
                    .column(FakeColumn::int("tenant_id"))
                    .column(FakeColumn::int("id"))
                    .column(FakeColumn::varchar("email", 255, SOURCE_COLLATION))
                    .primary_key(&["tenant_id", "id"])
                    .unique("uq_tenant_email", &["tenant_id", "email"])
                    .unique("uq_email_tenant", &["email", "tenant_id"]),
            )
            .table(
                FakeTable::new("sessions", SOURCE_COLLATION)
                    .column(FakeColumn::int("tenant_id"))
                    .column(FakeColumn::int("id"))
                    .column(FakeColumn::int("user_id"))
                    .primary_key(&["tenant_id", "id"])
                    .foreign_key(
                        "fk_session_user",
                        &["tenant_id", "user_id"],
                        "users",
                        &["tenant_id", "id"],
                        "CASCADE",
                        "RESTRICT",
                    ),
            )
    }

    /// 主キーだけを持つ1テーブルのスキーマ
    pub fn simple_schema() -> FakeSchema {
        FakeSchema::new(DATABASE, "latin1", SOURCE_COLLATION).table(
            FakeTable::new("orders", SOURCE_COLLATION)
                .column(FakeColumn::int("id"))
                .column(FakeColumn::varchar("note", 100, SOURCE_COLLATION))
                .primary_key(&["id"]),
        )
    }

    /// STATISTICS と KEY_COLUMN_USAGE に現れる (テーブル, カラム, キー名) の集合（ソート済み）
    pub fn participations(schema: &FakeSchema) -> Vec<(String, String, String)> {
        let mut rows = Vec::new();
        for table in &schema.tables {
            for index in &table.indexes {
                for (column, _) in &index.parts {
                    rows.push((table.name.clone(), column.clone(), index.name.clone()));
                }
            }
            for fk in &table.foreign_keys {
                for column in &fk.columns {
                    rows.push((table.name.clone(), column.clone(), fk.name.clone()));
                }
            }
        }
        rows.sort();
        rows.dedup();
        rows
    }

    pub fn target() -> ConversionTarget {
        ConversionTarget {
            database: DATABASE.to_string(),
            charset: TARGET_CHARSET.to_string(),
            collation: TARGET_COLLATION.to_string(),
        }
    }

    pub fn context(policy: ForeignKeyActionPolicy) -> MigrationContext {
        MigrationContext::new(target(), policy)
    }

    /// 同じ状態をカタログとエグゼキューターの両方に使ってパイプラインを実行
    pub async fn run_pipeline(
        fake: &FakeMySql,
        ctx: &mut MigrationContext,
    ) -> Result<MigrationReport, MigrationError> {
        let mut catalog = fake.clone();
        let mut executor = fake.clone();
        MigrationPipeline::new(&mut catalog, &mut executor)
            .run(ctx)
            .await
    }

    /// ステートメントの位置（見つからなければパニック）
    pub fn position(statements: &[String], needle: &str) -> usize {
        statements
            .iter()
            .position(|s| s == needle)
            .unwrap_or_else(|| panic!("statement not found: {}\n{:#?}", needle, statements))
    }
}
