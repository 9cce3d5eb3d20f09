// カタログ行モデル
//
// INFORMATION_SCHEMA から読み取った行を、DB非依存の構造体として表現します。

use std::fmt;

/// カラムの COLUMN_KEY フラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// `PRI`
    Primary,
    /// `UNI`
    Unique,
    /// `MUL`
    Multiple,
    /// 空文字列（インデックスの先頭カラムではない）
    None,
}

impl KeyRole {
    /// COLUMN_KEY の値から変換（未知の値は None 扱い）
    pub fn from_column_key(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            "MUL" => KeyRole::Multiple,
            _ => KeyRole::None,
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Primary => write!(f, "PRI"),
            KeyRole::Unique => write!(f, "UNI"),
            KeyRole::Multiple => write!(f, "MUL"),
            KeyRole::None => write!(f, ""),
        }
    }
}

/// スキーマの既定文字セット/照合順序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefaults {
    pub charset: String,
    pub collation: String,
}

/// インデックス収集用のカラム情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnKeyInfo {
    pub table_name: String,
    pub column_name: String,
    pub role: KeyRole,
    pub collation: Option<String>,
    pub character_max_length: Option<u64>,
}

impl ColumnKeyInfo {
    /// 照合順序を持つ（文字列系の型である）かどうか
    pub fn has_collation(&self) -> bool {
        self.collation.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// カラムを含むインデックス名（STATISTICS の1行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNameRow {
    pub key_name: String,
    pub seq_in_index: u32,
}

/// KEY_COLUMN_USAGE の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsageRow {
    pub constraint_name: String,
    pub referenced_table: Option<String>,
    pub referenced_column: Option<String>,
    pub ordinal_position: u32,
}

/// 変換対象カラムの定義
///
/// CHANGE 句で再指定するため、型・NULL可否・デフォルト値はカタログの値をそのまま保持します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub column_name: String,
    pub data_type: String,
    /// サイズ付きの型（例: `varchar(100)`）
    pub column_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub collation: Option<String>,
}

/// 目標と異なる照合順序が残っているカラム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconvertedColumn {
    pub table_name: String,
    pub column_name: String,
    pub collation: String,
    /// ビューのカラムかどうか
    pub in_view: bool,
}

/// 外部キーの参照アクション（REFERENTIAL_CONSTRAINTS の1行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRule {
    pub table_name: String,
    pub constraint_name: String,
    pub delete_rule: String,
    pub update_rule: String,
}
