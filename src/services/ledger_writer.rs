// ステートメント台帳の書き出し
//
// `<database>-all-queries.sql` と `<database>-required-queries.sql` を出力先ディレクトリに書き込みます。

use crate::core::error::MigrationError;
use crate::core::ledger::StatementLedger;
use crate::core::naming;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 書き出したファイルのパス
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerFiles {
    pub all_queries: PathBuf,
    pub required_queries: PathBuf,
}

/// 台帳ライター
#[derive(Debug, Clone, Default)]
pub struct LedgerWriter {}

impl LedgerWriter {
    /// 新しいLedgerWriterを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 台帳を2つのファイルに書き出す
    ///
    /// # Arguments
    ///
    /// * `ledger` - ステートメント台帳
    /// * `output_dir` - 出力先ディレクトリ（存在しなければ作成）
    /// * `database` - ファイル名に使うデータベース名
    /// * `dry_run` - Dry run の場合はファイル名に接頭辞を付ける
    pub fn write(
        &self,
        ledger: &StatementLedger,
        output_dir: &Path,
        database: &str,
        dry_run: bool,
    ) -> Result<LedgerFiles, MigrationError> {
        fs::create_dir_all(output_dir).map_err(|e| MigrationError::Io {
            path: output_dir.display().to_string(),
            cause: e.to_string(),
        })?;

        let files = LedgerFiles {
            all_queries: output_dir.join(naming::all_queries_file_name(database, dry_run)),
            required_queries: output_dir
                .join(naming::required_queries_file_name(database, dry_run)),
        };

        write_file(&files.all_queries, &ledger.all_text())?;
        info!(path = %files.all_queries.display(), statements = ledger.all_statements().len(), "Stored all queries");

        write_file(&files.required_queries, &ledger.required_text())?;
        info!(path = %files.required_queries.display(), statements = ledger.required_statements().len(), "Stored required queries");

        Ok(files)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), MigrationError> {
    fs::write(path, content).map_err(|e| MigrationError::Io {
        path: path.display().to_string(),
        cause: e.to_string(),
    })
}
