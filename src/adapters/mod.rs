// Adapters
// MySQL への接続、カタログ読み取り、DDL実行とDDL文の生成を抽象化

pub mod catalog_queries;
pub mod catalog_reader;
pub mod connection_string;
pub mod database;
pub mod schema_executor;
pub mod sql_generator;
