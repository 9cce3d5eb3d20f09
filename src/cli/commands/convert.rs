// convertコマンドハンドラー
//
// 文字セット/照合順序の変換を実行します。
// - INFORMATION_SCHEMA と対象スキーマへの接続
// - パイプラインの実行（Dry run 時は実行せず記録のみ）
// - 成否にかかわらずステートメント台帳を書き出す

use crate::adapters::catalog_reader::CatalogReader;
use crate::adapters::schema_executor::{DryRunExecutor, SchemaExecutor};
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::error::MigrationError;
use crate::core::index::IndexCounts;
use crate::services::ledger_writer::{LedgerFiles, LedgerWriter};
use crate::services::migration_context::MigrationContext;
use crate::services::migration_pipeline::{MigrationPipeline, MigrationReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, warn};

/// convertコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOutput {
    pub report: MigrationReport,
    pub files: LedgerFiles,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

impl CommandOutput for ConvertOutput {
    fn to_text(&self) -> String {
        format_report(&self.report, &self.files, self.elapsed_ms)
    }
}

/// convertコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ConvertCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// Dry runモード
    pub dry_run: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// convertコマンドハンドラー
#[derive(Debug, Default)]
pub struct ConvertCommandHandler {}

impl ConvertCommandHandler {
    /// 新しいConvertCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// convertコマンドを実行
    ///
    /// # Returns
    ///
    /// 成功時は変換結果のサマリー、失敗時はエラーメッセージ
    pub async fn execute(&self, command: &ConvertCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let started_at = Utc::now();
        let mut ctx = context.migration_context(command.dry_run);
        let mut connections = context.connect().await?;

        let result = if command.dry_run {
            let mut executor = DryRunExecutor::new();
            run_pipeline(&mut connections.catalog, &mut executor, &mut ctx).await
        } else {
            run_pipeline(&mut connections.catalog, &mut connections.executor, &mut ctx).await
        };
        connections.close().await;

        let files = LedgerWriter::new()
            .write(
                &ctx.ledger,
                &context.settings.output_dir,
                ctx.database(),
                ctx.dry_run,
            )
            .with_context(|| "Failed to store the statement ledger")?;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                error!(
                    all_queries = %files.all_queries.display(),
                    "Migration aborted; statements issued so far were stored"
                );
                return Err(e).with_context(|| {
                    format!("Charset migration of '{}' failed", ctx.database())
                });
            }
        };

        if !report.counts_match() {
            warn!("Index counts before and after the migration differ");
        }

        let output = ConvertOutput {
            report,
            files,
            started_at,
            elapsed_ms: (Utc::now() - started_at).num_milliseconds(),
        };
        render_output(&output, &command.format)
    }
}

async fn run_pipeline(
    catalog: &mut dyn CatalogReader,
    executor: &mut dyn SchemaExecutor,
    ctx: &mut MigrationContext,
) -> Result<MigrationReport, MigrationError> {
    MigrationPipeline::new(catalog, executor).run(ctx).await
}

/// 変換結果をテキスト形式に整形
pub fn format_report(report: &MigrationReport, files: &LedgerFiles, elapsed_ms: i64) -> String {
    let mut output = String::new();

    let title = if report.dry_run {
        "=== Dry Run: Charset Migration ===".yellow().bold()
    } else {
        "=== Charset Migration ===".cyan().bold()
    };
    output.push_str(&format!("{}\n\n", title));
    output.push_str(&format!(
        "Database:  {}\nCharset:   {}\nCollation: {}\n\n",
        report.database, report.charset, report.collation
    ));

    output.push_str(&format_counts_table(&report.before, &report.after));
    output.push('\n');

    output.push_str(&format!(
        "Indexes dropped:   {}\nKeys rebuilt:      {}\nColumns converted: {}\nTables converted:  {}\nDatabase altered:  {}\n\n",
        report.indexes_dropped,
        report.keys_rebuilt,
        report.columns_converted,
        report.tables_converted,
        if report.database_altered { "yes" } else { "no" },
    ));

    output.push_str(&format!(
        "All queries:      {}\nRequired queries: {}\n\n",
        files.all_queries.display(),
        files.required_queries.display()
    ));

    let status = if report.dry_run {
        format!("Dry run completed in {} ms. No changes were made.", elapsed_ms).yellow()
    } else if report.counts_match() {
        format!("✓ Migration completed in {} ms.", elapsed_ms).green()
    } else {
        format!(
            "⚠ Migration completed in {} ms, but index counts differ.",
            elapsed_ms
        )
        .red()
    };
    output.push_str(&format!("{}\n", status));

    output
}

fn format_counts_table(before: &IndexCounts, after: &IndexCounts) -> String {
    let rows = [
        ("primary", before.primary, after.primary),
        ("unique", before.unique, after.unique),
        ("foreign", before.foreign, after.foreign),
        ("other", before.other, after.other),
    ];

    let mut table = format!("{:<10} {:>8} {:>8}\n", "Index", "Before", "After");
    for (label, b, a) in rows {
        let line = format!("{:<10} {:>8} {:>8}", label, b, a);
        if b == a {
            table.push_str(&format!("{}\n", line));
        } else {
            table.push_str(&format!("{}\n", line.red()));
        }
    }
    table
}
