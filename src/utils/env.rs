/// Environment loading helpers.
///
/// Loads environment variables from `.env` if present, or from the file
/// specified by the `VOICE_CHAT_ENV_PATH` environment variable. Any errors
/// during loading are ignored.
pub fn load_env() {
    // 環境変数ファイルを読み込む（EnvConfigの初期化前に実行される）
    if let Ok(path) = std::env::var(ENV_PATH_VAR) {
        dotenvy::from_path(path).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub const ENV_PATH_VAR: &str = "VOICE_CHAT_ENV_PATH";

/// "1" / "true" / "yes" / "on" を真とみなす
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "YES", " on "] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["0", "false", "", "enabled"] {
            assert!(!is_truthy(v), "{v}");
        }
    }
}
