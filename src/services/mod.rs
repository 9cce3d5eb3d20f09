// Services Layer
// インデックス分類・削除・再作成、文字セット変換、設定読み込みを実行するサービス層

pub mod charset_conversion;
pub mod config_loader;
pub mod database_config_resolver;
pub mod index_classifier;
pub mod index_collector;
pub mod index_demolition;
pub mod index_reconstruction;
pub mod ledger_writer;
pub mod migration_context;
pub mod migration_pipeline;
