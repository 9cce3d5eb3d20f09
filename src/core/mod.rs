// Core Domain
// インデックス分類、ステートメント台帳、設定、エラーの純粋なドメインモデル

pub mod catalog;
pub mod config;
pub mod error;
pub mod index;
pub mod ledger;
pub mod naming;
