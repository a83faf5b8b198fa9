use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat client for the assistant backend (text + voice notes)")]
pub struct Cli {
    /// ローカル開発サーバー（http://localhost:8000）に接続
    #[arg(long, global = true)]
    pub dev: bool,

    /// 接続先ベース URL を直接指定
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// 利用可能な入力デバイスを一覧表示して終了
    #[arg(long)]
    pub list_devices: bool,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Cmd {
    /// 対話セッション（既定）
    Chat,
    /// 1 メッセージだけ送信して返信を表示
    Send { message: String },
    /// 各種設定操作
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCmd {
    /// 現在の設定と解決結果を表示
    Show,
    /// 設定値を保存
    Set {
        #[command(subcommand)]
        field: ConfigField,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigField {
    /// 接続先ベース URL
    #[command(name = "base-url")]
    BaseUrl { url: String },
    /// development / production
    Mode { mode: String },
    /// 録音フォーマットの優先順（例: flac wav）
    #[command(name = "capture-formats")]
    CaptureFormats {
        #[arg(required = true)]
        formats: Vec<String>,
    },
    /// 起動時の挨拶文
    Greeting { text: String },
}

/// 対話セッション中の 1 行入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Text(String),
    Record,
    Stop,
    Cancel,
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }
        if !trimmed.starts_with('/') {
            return ReplCommand::Text(line.trim_end_matches(['\r', '\n']).to_string());
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "/rec" | "/record" => ReplCommand::Record,
            "/stop" => ReplCommand::Stop,
            "/cancel" => ReplCommand::Cancel,
            "/history" => ReplCommand::History,
            "/help" | "/?" => ReplCommand::Help,
            "/quit" | "/exit" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        }
    }
}

pub const REPL_HELP: &str = "\
Type a message and press Enter to send it.
  /rec      start recording a voice note
  /stop     stop recording and send the voice note
  /cancel   discard the current recording
  /history  print the conversation so far
  /quit     exit";
