//! ターミナル向けのメッセージ描画
//!
//! ボットの本文は信頼できない入力として扱い、表示前にエスケープシーケンスと
//! 制御文字を取り除く。

use crate::domain::{Message, Role};

/// ANSI エスケープ（CSI / OSC / 2 文字シーケンス）と、改行・タブ以外の制御文字を除去する。
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => match chars.peek().copied() {
                // CSI: ESC [ ... 終端は 0x40..=0x7E
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... BEL または ESC \
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\u{7}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            },
            '\n' | '\t' => out.push(c),
            '\r' => {}
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn avatar(role: Role) -> &'static str {
    match role {
        Role::User => "U",
        Role::Assistant => "AI",
    }
}

/// 1 メッセージ分の表示文字列
pub fn render_message(message: &Message) -> String {
    let mut out = format!("[{}] ", avatar(message.role()));
    let body = sanitize(message.content());
    out.push_str(&body.replace('\n', "\n     "));

    for link in message.video_links() {
        out.push_str(&format!(
            "\n     📹 {} <{}>",
            sanitize(link.label()),
            sanitize(&link.url)
        ));
    }
    out.push_str(&format!(
        "\n     {}",
        message.timestamp().format("%H:%M:%S")
    ));
    out
}

/// 送信中の表示
pub const THINKING: &str = "[AI] Thinking...";
pub const TRANSCRIBING: &str = "Transcribing...";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VideoLink;

    #[test]
    fn strips_escape_sequences_and_controls() {
        let hostile = "ok\u{1b}[31mred\u{1b}[0m\u{1b}]0;title\u{7}\u{8}\r\nnext\tcol";
        assert_eq!(sanitize(hostile), "okred\nnext\tcol");
    }

    #[test]
    fn osc_terminated_by_string_terminator() {
        assert_eq!(sanitize("a\u{1b}]8;;http://x\u{1b}\\b"), "ab");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(sanitize("Habari! 📹 **bold**"), "Habari! 📹 **bold**");
    }

    #[test]
    fn renders_avatar_links_and_sanitized_body() {
        let msg = Message::assistant(
            "Here\u{1b}[2J you go",
            vec![
                VideoLink {
                    url: "https://v.example/1".into(),
                    title: Some("Paying bills".into()),
                },
                VideoLink {
                    url: "https://v.example/2".into(),
                    title: None,
                },
            ],
        );
        let rendered = render_message(&msg);
        assert!(rendered.starts_with("[AI] Here you go"));
        assert!(rendered.contains("📹 Paying bills <https://v.example/1>"));
        assert!(rendered.contains("📹 https://v.example/2 <https://v.example/2>"));
        assert!(!rendered.contains('\u{1b}'));
    }

    #[test]
    fn user_messages_use_user_avatar() {
        assert!(render_message(&Message::user("Hello")).starts_with("[U] Hello"));
    }
}
