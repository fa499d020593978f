use crate::article::Article;
use crate::message::{ChatMessage, MessageKind};
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(icon: &str, text: &str) {
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Two-line article entry: title, then source, date and link
pub fn article_line(article: &Article) {
    println!("{} {}", Icons::NEWS, article.title.bold());
    println!(
        "   {} · {} · {} {}",
        article.source.style(theme().info.clone()),
        muted(&article.published_at),
        Icons::LINK,
        dim(&article.url)
    );
    if let Some(description) = &article.description {
        println!("   {}", description);
    }
}

pub fn message_line(message: &ChatMessage) {
    let time = chrono::DateTime::from_timestamp_millis(message.timestamp)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_default();

    let (icon, style) = if message.from_user {
        (Icons::OUTGOING, theme().outgoing.clone())
    } else {
        (Icons::INCOMING, theme().incoming.clone())
    };

    let media = match message.kind {
        MessageKind::Text => String::new(),
        MessageKind::Image => format!(
            " {} {}",
            Icons::IMAGE,
            message.image_uri.as_deref().unwrap_or_default()
        ),
        MessageKind::Audio => format!(
            " {} {}",
            Icons::AUDIO,
            message.audio_uri.as_deref().unwrap_or_default()
        ),
    };

    println!("{} {} {}{}", icon, muted(&time), message.content.style(style), media);
}
