// ステートメント台帳
//
// 実行したすべてのSQL（all）と、再実行に必要な変更系SQLのみ（required）を
// 発行順に追記専用で保持します。

/// ステートメント台帳
#[derive(Debug, Clone, Default)]
pub struct StatementLedger {
    all: Vec<String>,
    required: Vec<String>,
}

impl StatementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み取り専用のクエリ（カタログ参照・存在確認）を記録
    pub fn record_read(&mut self, sql: impl Into<String>) {
        self.all.push(sql.into());
    }

    /// 変更系のステートメントを記録（all と required の両方）
    pub fn record_mutation(&mut self, sql: impl Into<String>) {
        let sql = sql.into();
        self.required.push(sql.clone());
        self.all.push(sql);
    }

    pub fn all_statements(&self) -> &[String] {
        &self.all
    }

    pub fn required_statements(&self) -> &[String] {
        &self.required
    }

    /// 全ステートメントを改行区切りのテキストに変換
    pub fn all_text(&self) -> String {
        join_lines(&self.all)
    }

    /// 必須ステートメントを改行区切りのテキストに変換
    pub fn required_text(&self) -> String {
        join_lines(&self.required)
    }
}

fn join_lines(statements: &[String]) -> String {
    statements.iter().map(|s| format!("{}\n", s)).collect()
}
