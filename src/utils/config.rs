//! グローバル環境変数設定
//!
//! アプリケーション全体で使用する環境変数を一元管理。
//! プロセス起動時に一度だけ初期化し、以降はどこからでもアクセス可能。

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::infrastructure::config::Mode;
use crate::utils::env::ENV_PATH_VAR;

/// グローバル環境変数設定
static ENV_CONFIG: OnceCell<Arc<EnvConfig>> = OnceCell::new();

/// 環境変数設定
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// `VOICE_CHAT_MODE`（development / production）
    pub mode: Option<Mode>,
    /// `VOICE_CHAT_BASE_URL`
    pub base_url: Option<String>,
    /// `INPUT_DEVICE_PRIORITY`（カンマ区切り）
    pub input_device_priority: Option<String>,
    /// XDG Data Home ディレクトリ
    pub xdg_data_home: Option<String>,
    /// 環境変数ファイルのパス
    pub env_path: Option<String>,
}

impl EnvConfig {
    /// 現在のプロセス環境から読み取る（グローバルには登録しない）
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        EnvConfig {
            mode: var("VOICE_CHAT_MODE").and_then(|m| Mode::parse(&m)),
            base_url: var("VOICE_CHAT_BASE_URL"),
            input_device_priority: var("INPUT_DEVICE_PRIORITY"),
            xdg_data_home: var("XDG_DATA_HOME"),
            env_path: var(ENV_PATH_VAR),
        }
    }

    /// 環境変数から設定を初期化
    ///
    /// アプリケーション起動時に呼び出す。
    /// 既に初期化済みの場合は何もしない（冪等）。
    pub fn init() {
        // 並列実行時の競合を考慮：既に他のスレッドが初期化していても成功とする
        let _ = ENV_CONFIG.set(Arc::new(Self::from_env()));
    }

    /// 設定を取得。未初期化の場合はその場で環境から読み取って登録する。
    pub fn get() -> Arc<EnvConfig> {
        ENV_CONFIG
            .get_or_init(|| Arc::new(Self::from_env()))
            .clone()
    }
}
