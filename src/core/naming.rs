// 命名ポリシー
//
// アプリケーション名と関連ファイル名の単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "recollate";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".recollate.yaml";

/// 全クエリ記録ファイルの接尾辞
pub const ALL_QUERIES_SUFFIX: &str = "-all-queries.sql";

/// 必須クエリ記録ファイルの接尾辞
pub const REQUIRED_QUERIES_SUFFIX: &str = "-required-queries.sql";

/// Dry run 時の記録ファイル接頭辞
pub const DRY_RUN_PREFIX: &str = "dry-run-";

/// 全クエリ記録ファイル名（`<database>-all-queries.sql`）
pub fn all_queries_file_name(database: &str, dry_run: bool) -> String {
    ledger_file_name(database, ALL_QUERIES_SUFFIX, dry_run)
}

/// 必須クエリ記録ファイル名（`<database>-required-queries.sql`）
pub fn required_queries_file_name(database: &str, dry_run: bool) -> String {
    ledger_file_name(database, REQUIRED_QUERIES_SUFFIX, dry_run)
}

fn ledger_file_name(database: &str, suffix: &str, dry_run: bool) -> String {
    let prefix = if dry_run { DRY_RUN_PREFIX } else { "" };
    format!("{}{}{}", prefix, database, suffix)
}
