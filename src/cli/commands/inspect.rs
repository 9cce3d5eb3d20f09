// inspectコマンドハンドラー
//
// スキーマのインデックス構成を分類して表示します。カタログの参照のみで変更は行いません。

use crate::adapters::schema_executor::DryRunExecutor;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::index::IndexEntry;
use crate::services::migration_pipeline::{IndexTopology, MigrationPipeline};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// inspectコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct InspectOutput {
    #[serde(flatten)]
    pub topology: IndexTopology,
}

impl CommandOutput for InspectOutput {
    fn to_text(&self) -> String {
        format_topology(&self.topology)
    }
}

/// inspectコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct InspectCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// inspectコマンドハンドラー
#[derive(Debug, Default)]
pub struct InspectCommandHandler {}

impl InspectCommandHandler {
    /// 新しいInspectCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// inspectコマンドを実行
    pub async fn execute(&self, command: &InspectCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let mut ctx = context.migration_context(true);
        let mut connections = context.connect().await?;

        // 収集のみなので変更系のエグゼキューターは使わない
        let mut executor = DryRunExecutor::new();
        let result = MigrationPipeline::new(&mut connections.catalog, &mut executor)
            .inspect(&mut ctx)
            .await;
        connections.close().await;

        let topology = result
            .with_context(|| format!("Failed to inspect indexes of '{}'", ctx.database()))?;
        render_output(&InspectOutput { topology }, &command.format)
    }
}

/// インデックス構成をテキスト形式に整形
pub fn format_topology(topology: &IndexTopology) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{}\n\n",
        format!("=== Index Topology: {} ===", topology.database)
            .cyan()
            .bold()
    ));

    let sections: [(&str, &[IndexEntry]); 4] = [
        ("Primary keys", &topology.primary_keys),
        ("Unique keys", &topology.unique_keys),
        ("Foreign keys", &topology.foreign_keys),
        ("Other indexes", &topology.other_indexes),
    ];

    for (title, entries) in sections {
        output.push_str(&format!("{} ({})\n", title.bold(), entries.len()));
        if entries.is_empty() {
            output.push_str("  (none)\n");
        }
        for entry in entries {
            output.push_str(&format!("  {}\n", format_entry(entry)));
        }
        output.push('\n');
    }

    output.push_str(&format!("Total: {} entries\n", topology.counts.total()));
    output
}

fn format_entry(entry: &IndexEntry) -> String {
    let mut line = format!(
        "{}.{} [{}]",
        entry.table_name, entry.column_name, entry.constraint_name
    );
    if let (Some(table), Some(column)) = (&entry.referenced_table, &entry.referenced_column) {
        line.push_str(&format!(" -> {}.{}", table, column));
    }
    if let Some(length) = entry.character_max_length {
        line.push_str(&format!(" ({})", length));
    }
    line
}
