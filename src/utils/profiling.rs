//! リクエスト所要時間の計測
//!
//! `VOICE_CHAT_PROFILE` が真のときだけ `voice_chat::profile` ターゲットへ
//! 出力する。判定はプロセス内で一度だけ行う。

use once_cell::sync::OnceCell;
use std::time::{Duration, Instant};

use crate::utils::env::is_truthy;

pub const PROFILE_ENV: &str = "VOICE_CHAT_PROFILE";

static FROM_ENV: OnceCell<bool> = OnceCell::new();

#[cfg(test)]
thread_local! {
    static FORCED: std::cell::Cell<Option<bool>> = const { std::cell::Cell::new(None) };
    static EMITTED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// 計測ログを出すか
pub fn enabled() -> bool {
    #[cfg(test)]
    {
        if let Some(forced) = FORCED.with(|f| f.get()) {
            return forced;
        }
    }
    *FROM_ENV.get_or_init(|| {
        std::env::var(PROFILE_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false)
    })
}

/// 区間計測。`log` か `log_with` で消費する。
#[must_use = "call log() to emit the measurement"]
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn log(self) {
        emit(self.label, self.elapsed(), None);
    }

    /// 付加情報（`key=value` 形式など）を添えて出力
    pub fn log_with(self, extra: &str) {
        emit(self.label, self.elapsed(), Some(extra));
    }
}

fn emit(label: &str, elapsed: Duration, extra: Option<&str>) {
    if !enabled() {
        return;
    }
    #[cfg(test)]
    {
        EMITTED.with(|n| n.set(n.get() + 1));
    }

    let ms = elapsed.as_millis() as u64;
    match extra {
        Some(extra) => tracing::info!(target: "voice_chat::profile", label, ms, extra, "PROFILE"),
        None => tracing::info!(target: "voice_chat::profile", label, ms, "PROFILE"),
    }
}
