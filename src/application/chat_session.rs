//! 会話セッション（状態機械）
//!
//! # 責任
//! - 会話ログの所有と追加
//! - 送信中フラグ（同時に 1 リクエストまで）とエラー表示状態の管理
//! - チャット／文字起こしクライアントの呼び出しと結果の反映
//!
//! セッションは単一スレッドで動作する前提で、状態は `RefCell` に持つ。
//! 借用は `.await` をまたいで保持しないため、応答待ちの間に届いた操作は
//! `Busy` を観測して無視される。

use std::cell::RefCell;

use scopeguard::guard;
use tracing::{debug, info, warn};

use crate::application::traits::{ChatClient, TranscriptionClient};
use crate::domain::{ConversationLog, HistoryEntry, Message, Recorder};
use crate::error::ChatError;
use crate::infrastructure::audio::AudioBackend;
use crate::utils::profiling;

/// 送信中リクエストの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Chat,
    Voice,
}

/// セッション全体の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 待機中
    Idle,
    /// 録音中
    Recording,
    /// リクエスト送信中
    Busy(RequestKind),
}

/// 操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 現在の状態では受け付けない操作だった（何も変化しない）
    Ignored,
    /// 録音を開始した
    Started,
    /// 応答をログに追加した
    Completed,
    /// 録音を破棄した
    Cancelled,
    /// 失敗した。エラー文字列は `last_error` で参照できる
    Failed,
}

#[derive(Debug)]
struct SessionState {
    log: ConversationLog,
    phase: Phase,
    error: Option<String>,
}

/// 会話セッション
pub struct ChatSession<B: AudioBackend> {
    state: RefCell<SessionState>,
    chat: Box<dyn ChatClient>,
    transcriber: Box<dyn TranscriptionClient>,
    recorder: Recorder<B>,
}

impl<B: AudioBackend> ChatSession<B> {
    /// 既定の挨拶から始まるセッションを作成
    pub fn new(
        chat: Box<dyn ChatClient>,
        transcriber: Box<dyn TranscriptionClient>,
        recorder: Recorder<B>,
    ) -> Self {
        Self::with_log(ConversationLog::default(), chat, transcriber, recorder)
    }

    /// 既存のログ（挨拶の差し替えなど）からセッションを作成
    pub fn with_log(
        log: ConversationLog,
        chat: Box<dyn ChatClient>,
        transcriber: Box<dyn TranscriptionClient>,
        recorder: Recorder<B>,
    ) -> Self {
        Self {
            state: RefCell::new(SessionState {
                log,
                phase: Phase::Idle,
                error: None,
            }),
            chat,
            transcriber,
            recorder,
        }
    }

    // ========================================
    // 参照系
    // ========================================

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    /// 入力を無効化すべき状態か
    pub fn is_busy(&self) -> bool {
        matches!(self.phase(), Phase::Busy(_))
    }

    pub fn is_recording(&self) -> bool {
        self.phase() == Phase::Recording
    }

    /// 表示中のエラー文字列
    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.borrow_mut().error = None;
    }

    /// ログのコピー
    pub fn messages(&self) -> Vec<Message> {
        self.state.borrow().log.messages().to_vec()
    }

    pub fn message_count(&self) -> usize {
        self.state.borrow().log.len()
    }

    /// 次のリクエストで送られる履歴
    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.state.borrow().log.snapshot()
    }

    // ========================================
    // テキスト送信
    // ========================================

    /// テキストを送信する。
    ///
    /// ユーザーメッセージは送信前に追加され、失敗しても取り消さない。
    /// 空文字（空白のみ）や `Idle` 以外での呼び出しは無視する。
    pub async fn submit(&self, text: &str) -> Outcome {
        let history = {
            let mut st = self.state.borrow_mut();
            if text.trim().is_empty() {
                debug!("empty submission ignored");
                return Outcome::Ignored;
            }
            if st.phase != Phase::Idle {
                debug!(phase = ?st.phase, "submission ignored while not idle");
                return Outcome::Ignored;
            }
            st.error = None;
            st.log.push(Message::user(text));
            st.phase = Phase::Busy(RequestKind::Chat);
            st.log.snapshot()
        };
        info!(history_len = history.len(), "chat request started");

        // 応答待ちの future が破棄されても Idle に戻す
        let _reset = guard(&self.state, |state| state.borrow_mut().phase = Phase::Idle);

        let timer = profiling::Timer::start("session.chat");
        let result = self.chat.send_message(text, &history).await;
        timer.log();

        let mut st = self.state.borrow_mut();
        st.phase = Phase::Idle;
        match result {
            Ok(reply) => {
                info!(links = reply.video_links.len(), "chat reply appended");
                st.log
                    .push(Message::assistant(reply.response, reply.video_links));
                Outcome::Completed
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                st.error = Some(e.user_message(RequestKind::Chat));
                Outcome::Failed
            }
        }
    }

    // ========================================
    // 音声入力
    // ========================================

    /// 録音を開始する。`Idle` 以外では無視する。
    pub fn start_recording(&self) -> Outcome {
        let mut st = self.state.borrow_mut();
        if st.phase != Phase::Idle {
            debug!(phase = ?st.phase, "start recording ignored");
            return Outcome::Ignored;
        }
        st.error = None;
        match self.recorder.start() {
            Ok(format) => {
                info!(%format, "recording");
                st.phase = Phase::Recording;
                Outcome::Started
            }
            Err(e) => {
                let e = ChatError::from(e);
                warn!(error = %e, "failed to start recording");
                st.error = Some(e.user_message(RequestKind::Voice));
                Outcome::Failed
            }
        }
    }

    /// 録音を停止して送信する。`Recording` 以外では無視する。
    ///
    /// 成功時は文字起こし（user）と返信（assistant）の 2 件をまとめて追加し、
    /// 失敗時はどちらも追加しない。
    pub async fn stop_recording(&self) -> Outcome {
        let history = {
            let mut st = self.state.borrow_mut();
            if st.phase != Phase::Recording {
                debug!(phase = ?st.phase, "stop recording ignored");
                return Outcome::Ignored;
            }
            st.phase = Phase::Busy(RequestKind::Voice);
            st.error = None;
            st.log.snapshot()
        };

        let _reset = guard(&self.state, |state| state.borrow_mut().phase = Phase::Idle);

        let result = match self.recorder.stop() {
            Ok(audio) if audio.is_empty() => Err(ChatError::EmptyCapture),
            Ok(audio) => {
                info!(
                    bytes = audio.bytes.len(),
                    mime = %audio.mime_type,
                    "voice note request started"
                );
                let timer = profiling::Timer::start("session.voice");
                let result = self.transcriber.transcribe(audio, &history).await;
                timer.log();
                result
            }
            Err(e) => Err(ChatError::from(e)),
        };

        let mut st = self.state.borrow_mut();
        st.phase = Phase::Idle;
        match result {
            Ok(t) => {
                info!("voice turn appended");
                st.log.push_turn(
                    Message::user(t.query),
                    Message::assistant(t.response, t.video_links),
                );
                Outcome::Completed
            }
            Err(e) => {
                warn!(error = %e, "voice note failed");
                st.error = Some(e.user_message(RequestKind::Voice));
                Outcome::Failed
            }
        }
    }

    /// 録音を破棄する。デバイスは解放し、何も送信しない。
    pub fn cancel_recording(&self) -> Outcome {
        let mut st = self.state.borrow_mut();
        if st.phase != Phase::Recording {
            return Outcome::Ignored;
        }
        if let Err(e) = self.recorder.stop() {
            debug!(error = %e, "discarding recording after stop error");
        }
        st.phase = Phase::Idle;
        info!("recording cancelled");
        Outcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatReply, Transcription};
    use crate::error::Result;
    use crate::infrastructure::audio::{AudioBackendError, AudioData, AudioFormat};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    /// 解放されるまで応答を返さないチャットクライアント
    struct GatedChatClient {
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChatClient for GatedChatClient {
        async fn send_message(&self, message: &str, _h: &[HistoryEntry]) -> Result<ChatReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(ChatReply::text(format!("echo: {message}")))
        }
    }

    struct UnusedTranscriber;

    #[async_trait]
    impl TranscriptionClient for UnusedTranscriber {
        async fn transcribe(&self, _a: AudioData, _h: &[HistoryEntry]) -> Result<Transcription> {
            Err(ChatError::InvalidResponse("not expected in this test".into()))
        }
    }

    struct RecordingFlagBackend {
        recording: AtomicBool,
        released: Arc<Mutex<usize>>,
    }

    impl AudioBackend for RecordingFlagBackend {
        fn supported_formats(&self) -> &[AudioFormat] {
            &[AudioFormat::Wav]
        }

        fn start_recording(&self, _f: AudioFormat) -> std::result::Result<(), AudioBackendError> {
            self.recording.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop_recording(&self) -> std::result::Result<AudioData, AudioBackendError> {
            self.recording.store(false, Ordering::SeqCst);
            *self.released.lock().unwrap() += 1;
            Ok(AudioData::new(vec![7; 32], "audio/wav"))
        }

        fn is_recording(&self) -> bool {
            self.recording.load(Ordering::SeqCst)
        }
    }

    fn session(
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    ) -> (ChatSession<RecordingFlagBackend>, Arc<Mutex<usize>>) {
        let released = Arc::new(Mutex::new(0));
        let backend = RecordingFlagBackend {
            recording: AtomicBool::new(false),
            released: released.clone(),
        };
        let session = ChatSession::new(
            Box::new(GatedChatClient { gate, calls }),
            Box::new(UnusedTranscriber),
            Recorder::new(backend, vec![AudioFormat::Wav]),
        );
        (session, released)
    }

    /// 送信中の 2 回目の送信は無視される
    #[tokio::test]
    async fn second_submit_while_busy_is_ignored() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (session, _) = session(gate.clone(), calls.clone());

        let first = session.submit("Hello");
        let second = async {
            tokio::task::yield_now().await;
            assert_eq!(session.phase(), Phase::Busy(RequestKind::Chat));
            let len_before = session.message_count();
            let outcome = session.submit("Hello again").await;
            assert_eq!(session.message_count(), len_before);
            gate.notify_one();
            outcome
        };
        let (a, b) = tokio::join!(first, second);

        assert_eq!(a, Outcome::Completed);
        assert_eq!(b, Outcome::Ignored);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.message_count(), 3);
        assert_eq!(session.phase(), Phase::Idle);
    }

    /// 応答待ちの future を破棄しても Idle に戻る
    #[tokio::test]
    async fn dropped_request_returns_to_idle() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (session, _) = session(gate, calls);

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), session.submit("Hi")).await;
        assert!(timed_out.is_err());
        assert_eq!(session.phase(), Phase::Idle);
        // ユーザー発話は残る
        assert_eq!(session.message_count(), 2);
    }

    /// 録音中はテキスト送信も録音開始も受け付けない
    #[tokio::test]
    async fn recording_blocks_other_actions() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (session, released) = session(gate, calls.clone());

        assert_eq!(session.start_recording(), Outcome::Started);
        assert_eq!(session.start_recording(), Outcome::Ignored);
        assert_eq!(session.submit("typed while recording").await, Outcome::Ignored);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(session.cancel_recording(), Outcome::Cancelled);
        assert_eq!(*released.lock().unwrap(), 1);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn stop_without_recording_is_ignored() {
        let (session, released) = session(Arc::new(Notify::new()), Arc::new(AtomicUsize::new(0)));
        assert_eq!(session.stop_recording().await, Outcome::Ignored);
        assert_eq!(session.cancel_recording(), Outcome::Ignored);
        assert_eq!(*released.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn whitespace_only_submission_is_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (session, _) = session(Arc::new(Notify::new()), calls.clone());
        assert_eq!(session.submit("   \n").await, Outcome::Ignored);
        assert_eq!(session.message_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
