//! voice_chat CLI: アシスタントのバックエンドとテキスト／ボイスノートで会話する端末クライアント。
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use voice_chat::application::{ChatSession, Outcome, Phase, ServiceContainer, SessionSettings};
use voice_chat::cli::{Cli, Cmd, ConfigCmd, ConfigField, REPL_HELP, ReplCommand};
use voice_chat::infrastructure::audio::{AudioBackend, AudioFormat, list_input_devices};
use voice_chat::infrastructure::config::{self, AppConfig, Mode, Overrides};
use voice_chat::infrastructure::ui::terminal::{THINKING, TRANSCRIBING, render_message};
use voice_chat::utils::{EnvConfig, load_env};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env();
    EnvConfig::init();
    init_tracing();

    let cli = Cli::parse();

    if cli.list_devices {
        for name in list_input_devices()? {
            println!("{name}");
        }
        return Ok(());
    }

    let overrides = Overrides {
        base_url: cli.base_url.clone(),
        development: cli.dev,
    };
    let file_config = AppConfig::load();
    let settings = SessionSettings::resolve(&file_config, &EnvConfig::get(), &overrides);

    match cli.cmd.unwrap_or(Cmd::Chat) {
        Cmd::Chat => {
            let container = ServiceContainer::new(settings);
            eprintln!("Connected to {}", container.settings.base_url);
            run_repl(&container.session).await?;
        }
        Cmd::Send { message } => {
            let container = ServiceContainer::new(settings);
            let session = &container.session;
            match session.submit(&message).await {
                Outcome::Completed => {
                    if let Some(reply) = session.messages().last() {
                        println!("{}", render_message(reply));
                    }
                }
                _ => {
                    let err = session
                        .last_error()
                        .unwrap_or_else(|| "Nothing to send.".to_string());
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Cmd::Config { action } => handle_config(action, file_config, settings)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_repl<B: AudioBackend>(
    session: &ChatSession<B>,
) -> Result<(), Box<dyn std::error::Error>> {
    for message in session.messages() {
        println!("{}", render_message(&message));
    }
    eprintln!("(/help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let before = session.message_count();
        let mut echoed = false;
        let outcome = match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                println!("{REPL_HELP}");
                continue;
            }
            ReplCommand::History => {
                for message in session.messages() {
                    println!("{}", render_message(&message));
                }
                continue;
            }
            ReplCommand::Unknown(cmd) => {
                eprintln!("Unknown command {cmd}. Type /help.");
                continue;
            }
            ReplCommand::Text(text) => {
                if session.phase() == Phase::Recording {
                    eprintln!("Recording in progress. /stop or /cancel first.");
                    continue;
                }
                echoed = true;
                println!("{THINKING}");
                session.submit(&text).await
            }
            ReplCommand::Record => {
                let outcome = session.start_recording();
                if outcome == Outcome::Started {
                    println!("● Recording... (/stop to send, /cancel to discard)");
                }
                outcome
            }
            ReplCommand::Stop => {
                if session.phase() == Phase::Recording {
                    println!("{TRANSCRIBING}");
                }
                session.stop_recording().await
            }
            ReplCommand::Cancel => {
                let outcome = session.cancel_recording();
                if outcome == Outcome::Cancelled {
                    println!("Recording discarded.");
                }
                outcome
            }
        };

        // 入力したテキストは既に端末に見えているので再表示しない
        let skip = before + usize::from(echoed);
        for message in session.messages().iter().skip(skip) {
            println!("{}", render_message(message));
        }
        match outcome {
            Outcome::Failed => {
                if let Some(err) = session.last_error() {
                    eprintln!("⚠ {err}");
                }
                // 表示済みのエラーは次の入力まで残さない
                session.clear_error();
            }
            Outcome::Ignored => eprintln!("(ignored: session is {:?})", session.phase()),
            _ => {}
        }
    }

    // 録音中に終了した場合もデバイスを解放する
    session.cancel_recording();
    Ok(())
}

fn handle_config(
    action: ConfigCmd,
    mut file_config: AppConfig,
    settings: SessionSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigCmd::Show => {
            println!("config file: {}", config::config_path()?.display());
            let env = EnvConfig::get();
            println!("env file: {}", env.env_path.as_deref().unwrap_or(".env"));
            println!("{}", serde_json::to_string_pretty(&file_config)?);
            println!("resolved mode: {}", settings.mode);
            println!("resolved base url: {}", settings.base_url);
            let formats: Vec<&str> = settings
                .capture_preferences
                .iter()
                .map(|f| f.extension())
                .collect();
            println!("capture preferences: {}", formats.join(", "));
        }
        ConfigCmd::Set { field } => {
            match field {
                ConfigField::BaseUrl { url } => file_config.base_url = Some(url),
                ConfigField::Mode { mode } => {
                    let parsed = Mode::parse(&mode)
                        .ok_or_else(|| format!("unknown mode {mode:?} (development|production)"))?;
                    file_config.mode = Some(parsed);
                }
                ConfigField::CaptureFormats { formats } => {
                    if let Some(bad) = formats.iter().find(|f| AudioFormat::from_name(f).is_none()) {
                        return Err(format!("unknown capture format {bad:?}").into());
                    }
                    file_config.capture_formats = Some(formats);
                }
                ConfigField::Greeting { text } => file_config.greeting = Some(text),
            }
            file_config.save()?;
            println!("saved {}", config::config_path()?.display());
        }
    }
    Ok(())
}
