use crate::error::{ChatError, Result};
use crate::infrastructure::audio::AudioFormat;
use crate::infrastructure::audio::format::DEFAULT_PREFERENCES;
use crate::utils::config::EnvConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, io, path::Path, path::PathBuf};

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:8000";
pub const PRODUCTION_BASE_URL: &str = "https://selcom-bot-neurotech-1.onrender.com";

/// 接続先を切り替える実行モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Mode::Development),
            "production" | "prod" => Some(Mode::Production),
            _ => None,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Mode::Development => DEVELOPMENT_BASE_URL,
            Mode::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Development => "development",
            Mode::Production => "production",
        })
    }
}

/// 永続化される設定（`config.json`）
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// 録音フォーマットの優先順（例: `["webm", "wav"]`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_formats: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

/// CLI から渡される上書き値
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub development: bool,
}

fn data_dir() -> Result<PathBuf> {
    let config = EnvConfig::get();
    let dir = if let Some(xdg_data_home) = &config.xdg_data_home {
        PathBuf::from(xdg_data_home).join("voice_chat")
    } else {
        ProjectDirs::from("com", "selcom", "voice_chat")
            .ok_or_else(|| ChatError::Config("cannot resolve platform dirs".into()))?
            .data_local_dir()
            .to_path_buf()
    };
    Ok(dir)
}

/// 既定の設定ファイルパス
pub fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("config.json"))
}

impl AppConfig {
    /// 既定パスから読み込む。無い・壊れている場合は既定値。
    pub fn load() -> Self {
        match config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => AppConfig::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(f) = fs::File::open(path) {
            match serde_json::from_reader(f) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        AppConfig::default()
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        self.save_to(&path)
            .map_err(|e| ChatError::Config(format!("{}: {e}", path.display())))
    }

    /// 一時ファイルに書いてから置き換える
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        {
            let f = fs::File::create(&tmp)?;
            serde_json::to_writer_pretty(&f, self)?;
        }
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// モード: `--dev` > `VOICE_CHAT_MODE` > 設定ファイル > production
    pub fn resolve_mode(&self, env: &EnvConfig, overrides: &Overrides) -> Mode {
        if overrides.development {
            return Mode::Development;
        }
        env.mode.or(self.mode).unwrap_or_default()
    }

    /// 接続先: `--base-url` > `VOICE_CHAT_BASE_URL` > 設定ファイル > モード既定
    /// `--dev` 指定時は設定ファイルの `base_url` を使わない。
    pub fn resolve_base_url(&self, env: &EnvConfig, overrides: &Overrides) -> String {
        let file_url = if overrides.development {
            None
        } else {
            self.base_url.clone()
        };
        let explicit = overrides
            .base_url
            .clone()
            .or_else(|| env.base_url.clone())
            .or(file_url);
        match explicit {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.resolve_mode(env, overrides).default_base_url().to_string(),
        }
    }

    /// 録音フォーマットの優先順。未知の名前は読み飛ばす。
    pub fn capture_preferences(&self) -> Vec<AudioFormat> {
        match &self.capture_formats {
            Some(names) => {
                let parsed: Vec<AudioFormat> = names
                    .iter()
                    .filter_map(|n| {
                        let f = AudioFormat::from_name(n);
                        if f.is_none() {
                            tracing::warn!(format = %n, "unknown capture format in config");
                        }
                        f
                    })
                    .collect();
                if parsed.is_empty() {
                    DEFAULT_PREFERENCES.to_vec()
                } else {
                    parsed
                }
            }
            None => DEFAULT_PREFERENCES.to_vec(),
        }
    }
}
