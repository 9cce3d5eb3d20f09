// 接続文字列ビルダー
//
// DatabaseConfig と接続先スキーマ名から MySQL の接続文字列を生成する。

use crate::core::config::DatabaseConfig;
use urlencoding::encode;

/// カタログ読み取り用の接続先スキーマ
pub const INFORMATION_SCHEMA: &str = "INFORMATION_SCHEMA";

/// 接続文字列を生成
///
/// ユーザー名とパスワードはパーセントエンコードされます。
/// これにより、`@`, `:`, `/`, `#`, `?` などの特殊文字を含むパスワードでも
/// 正しく接続文字列が構築されます。
pub fn build_connection_string(config: &DatabaseConfig, database: &str) -> String {
    let encoded_user = encode(&config.user);
    let auth = if config.password.is_empty() {
        encoded_user.to_string()
    } else {
        format!("{}:{}", encoded_user, encode(&config.password))
    };
    format!(
        "mysql://{}@{}:{}/{}",
        auth, config.host, config.port, database
    )
}

/// ログ出力用にパスワードを伏せた接続先表記
pub fn redacted_target(config: &DatabaseConfig, database: &str) -> String {
    format!(
        "mysql://{}@{}:{}/{}",
        config.user, config.host, config.port, database
    )
}
