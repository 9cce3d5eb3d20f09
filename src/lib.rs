// Recollateライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインロジック（設定、インデックス分類モデル、ステートメント台帳）
// - adapters: INFORMATION_SCHEMA の参照、DDL生成、対象スキーマへの実行を抽象化
// - services: 収集・削除・変換・再作成の各フェーズとパイプライン

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
