use crate::{App, Cli, OutputMode, emit_success};
use owo_colors::OwoColorize;
use pulse::article::Article;
use pulse::chat::ChatService;
use pulse::config::{self, PulseConfig};
use pulse::geo::NominatimGeocoder;
use pulse::message::{ChatMessage, MessageKind};
use pulse::profile::{ProfileService, UserProfile};
use pulse::remote::newsapi::NewsApiClient;
use pulse::server::{self, AppState};
use pulse::state::{HomeFeed, MessagesBoard, ProfilePanel};
use pulse::sync::NewsRepository;
use pulse::ui::{self, Icons, Spinner};
use std::sync::Arc;
use std::time::Duration;

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        ui::header(Icons::NEWS, "Pulse");
        ui::info("Version", &env!("CARGO_PKG_VERSION").bold().to_string());
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}

pub async fn run_init(
    cli: &Cli,
    output_mode: OutputMode,
    force: bool,
    name: Option<&str>,
    country: Option<&str>,
) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let settings = PulseConfig {
        database: cli.database.as_ref().map(|p| p.display().to_string()),
        api_key: cli.api_key.clone(),
        user_name: name.map(str::to_string),
        country: country.map(str::to_string),
        base_url: None,
    };
    config::write_config(&config_path, &settings, force)?;

    let app = App::open(cli, output_mode)?;
    let profile = match name {
        Some(name) => Some(ProfileService::new(app.store.clone()).update_name(name).await?),
        None => None,
    };

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", config_path.display()));
        ui::info("Database", &app.database.display().to_string());
        if let Some(profile) = &profile {
            ui::info("Profile", &profile.name);
        }
        if app.api_key.is_none() {
            ui::warn(&format!(
                "No NewsAPI key yet. Pass --api-key, set {} or run `pulse config set-key`",
                config::API_KEY_ENV
            ));
        }
    } else {
        let data = serde_json::json!({
            "config": config_path,
            "database": app.database,
            "profile": profile,
            "has_api_key": app.api_key.is_some(),
        });
        emit_success(output_mode, "init", data)?;
    }
    Ok(())
}

fn news(app: &App) -> anyhow::Result<NewsRepository> {
    let Some(api_key) = app.api_key.clone() else {
        anyhow::bail!(
            "No NewsAPI key configured. Pass --api-key, set {} or run `pulse config set-key` (`pulse cached` works offline)",
            config::API_KEY_ENV
        );
    };

    let mut client = NewsApiClient::new(api_key);
    if let Some(country) = &app.config.country {
        client = client.with_country(country);
    }
    if let Some(base_url) = &app.config.base_url {
        client = client.with_base_url(base_url);
    }
    Ok(NewsRepository::new(Arc::new(client), app.store.clone()))
}

fn spinner(app: &App, message: &str) -> Option<Spinner> {
    app.output.is_human().then(|| Spinner::new(message))
}

fn show_articles(
    app: &App,
    command: &str,
    icon: &str,
    title: &str,
    articles: Vec<Article>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let total = articles.len();
    let shown: Vec<Article> = articles.into_iter().take(limit.unwrap_or(usize::MAX)).collect();

    if app.output.is_human() {
        ui::header(icon, title);
        if shown.is_empty() {
            println!("{} No articles.", Icons::EMPTY);
            return Ok(());
        }
        for article in &shown {
            println!();
            ui::article_line(article);
        }
        println!();
        ui::summary_row("Showing", &format!("{} of {}", shown.len(), total));
    } else {
        let data = serde_json::json!({
            "total": total,
            "articles": shown,
        });
        emit_success(app.output, command, data)?;
    }
    Ok(())
}

pub async fn run_headlines(app: &App, limit: Option<usize>) -> anyhow::Result<()> {
    let repo = news(app)?;
    let progress = spinner(app, "Fetching top headlines...");
    let articles = repo.top_headlines().await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    show_articles(app, "headlines", Icons::NEWS, "Top headlines", articles?, limit)
}

pub async fn run_search(app: &App, query: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let repo = news(app)?;
    let progress = spinner(app, &format!("Searching for '{}'...", query));
    let articles = repo.search(query).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    show_articles(app, "search", Icons::SEARCH, &format!("Results for '{}'", query), articles?, limit)
}

pub async fn run_cached(app: &App, query: Option<&str>) -> anyhow::Result<()> {
    let store = app.store.lock().await;
    let articles = match query {
        Some(q) if !q.trim().is_empty() => store.search_articles(q.trim())?,
        _ => store.all_articles()?,
    };
    drop(store);

    if app.output.is_human() {
        ui::header(Icons::DATABASE, "Cached articles");
        if articles.is_empty() {
            println!("{} Cache is empty.", Icons::EMPTY);
        } else {
            println!("{}", ui::article_table(&articles));
        }
        Ok(())
    } else {
        emit_success(app.output, "cached", serde_json::json!({ "articles": articles }))
    }
}

fn show_message(app: &App, command: &str, message: &ChatMessage) -> anyhow::Result<()> {
    if app.output.is_human() {
        ui::message_line(message);
        Ok(())
    } else {
        emit_success(app.output, command, serde_json::to_value(message)?)
    }
}

pub async fn run_chat_send(
    app: &App,
    text: &str,
    kind: MessageKind,
    image: Option<&str>,
    audio: Option<&str>,
) -> anyhow::Result<()> {
    let kind = match (kind, image, audio) {
        (MessageKind::Text, Some(_), _) => MessageKind::Image,
        (MessageKind::Text, None, Some(_)) => MessageKind::Audio,
        (kind, _, _) => kind,
    };

    let chat = ChatService::new(app.store.clone());
    match chat.send(text, kind, image, audio).await? {
        Some(message) => show_message(app, "chat.send", &message),
        None if app.output.is_human() => {
            ui::warn("Nothing to send: message is empty");
            Ok(())
        }
        None => emit_success(app.output, "chat.send", serde_json::Value::Null),
    }
}

pub async fn run_chat_reply(app: &App, text: Option<&str>) -> anyhow::Result<()> {
    let chat = ChatService::new(app.store.clone());
    let message = match text {
        Some(text) => chat.simulate_received(text).await?,
        None => chat.simulate_reply().await?,
    };
    show_message(app, "chat.reply", &message)
}

pub async fn run_chat_list(app: &App, table: bool) -> anyhow::Result<()> {
    let messages = ChatService::new(app.store.clone()).messages().await?;

    if !app.output.is_human() {
        return emit_success(app.output, "chat.list", serde_json::json!({ "messages": messages }));
    }

    ui::header(Icons::CHAT, "Conversation");
    if messages.is_empty() {
        println!("{} No messages yet.", Icons::EMPTY);
    } else if table {
        println!("{}", ui::message_table(&messages));
    } else {
        for message in &messages {
            ui::message_line(message);
        }
    }
    Ok(())
}

pub async fn run_chat_clear(app: &App) -> anyhow::Result<()> {
    let chat = ChatService::new(app.store.clone());
    let removed = chat.count().await?;
    chat.clear().await?;

    if app.output.is_human() {
        ui::success(&format!("{} Removed {} messages", Icons::TRASH, removed));
        Ok(())
    } else {
        emit_success(app.output, "chat.clear", serde_json::json!({ "removed": removed }))
    }
}

fn show_profile(app: &App, command: &str, profile: Option<&UserProfile>) -> anyhow::Result<()> {
    if !app.output.is_human() {
        let data = serde_json::json!({
            "profile": profile,
            "default_name": app.config.display_name(),
        });
        return emit_success(app.output, command, data);
    }

    let Some(profile) = profile else {
        println!("{} No profile stored yet.", Icons::EMPTY);
        ui::summary_row("Default name:", app.config.display_name());
        return Ok(());
    };

    ui::header(Icons::PERSON, &profile.name);
    ui::summary_row("Image:   ", profile.image_uri.as_deref().unwrap_or("-"));
    ui::summary_row("Location:", profile.location.as_deref().unwrap_or("-"));
    if let Some((lat, lng)) = profile.coordinates() {
        ui::summary_row("Coords:  ", &format!("{} {:.4}, {:.4}", Icons::PIN, lat, lng));
    }
    Ok(())
}

pub async fn run_profile_show(app: &App) -> anyhow::Result<()> {
    let profile = ProfileService::new(app.store.clone()).profile().await?;
    show_profile(app, "profile.show", profile.as_ref())
}

pub async fn run_profile_name(app: &App, name: &str) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Name must not be blank");
    }
    let profile = ProfileService::new(app.store.clone()).update_name(name).await?;
    show_profile(app, "profile.name", Some(&profile))
}

pub async fn run_profile_image(app: &App, uri: &str) -> anyhow::Result<()> {
    let profile = ProfileService::new(app.store.clone()).update_image(uri).await?;
    show_profile(app, "profile.image", Some(&profile))
}

pub async fn run_profile_location(
    app: &App,
    label: &str,
    lat: Option<f64>,
    lng: Option<f64>,
) -> anyhow::Result<()> {
    let profile = ProfileService::new(app.store.clone())
        .update_location(label, lat, lng)
        .await?;
    show_profile(app, "profile.location", Some(&profile))
}

pub async fn run_profile_locate(app: &App, lat: f64, lng: f64) -> anyhow::Result<()> {
    let geocoder = NominatimGeocoder::new()?;
    let progress = spinner(app, "Resolving location...");
    let result = ProfileService::new(app.store.clone())
        .locate(lat, lng, &geocoder)
        .await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    show_profile(app, "profile.locate", Some(&result?))
}

pub fn run_config_show(app: &App) -> anyhow::Result<()> {
    let mut shown = app.config.clone();
    shown.api_key = shown.api_key.as_deref().map(mask_key);

    if app.output.is_human() {
        ui::header(Icons::INFO, &app.config_path.display().to_string());
        print!("{}", toml::to_string_pretty(&shown)?);
        ui::summary_row("Database:", &app.database.display().to_string());
        ui::summary_row("Name:    ", app.config.display_name());
        ui::summary_row(
            "API key: ",
            if app.api_key.is_some() { "available" } else { "missing" },
        );
        Ok(())
    } else {
        emit_success(app.output, "config.show", serde_json::to_value(&shown)?)
    }
}

pub fn run_config_set<F>(app: &App, change: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut PulseConfig),
{
    config::update_config(&app.config_path, change)?;
    if app.output.is_human() {
        ui::success(&format!("Updated {}", app.config_path.display()));
        Ok(())
    } else {
        emit_success(app.output, "config.set", serde_json::json!({ "path": app.config_path }))
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}…", visible)
}

pub async fn run_stats(app: &App) -> anyhow::Result<()> {
    let stats = app.store.lock().await.stats()?;

    if app.output.is_human() {
        ui::header(Icons::STATS, &format!("Pulse statistics ({})", app.database.display()));
        let articles = stats.articles.to_string();
        let messages = stats.messages.to_string();
        println!(
            "{}",
            ui::stats_table(&[
                ("Articles", articles.as_str()),
                ("Messages", messages.as_str()),
                ("Profile", if stats.has_profile { "yes" } else { "no" }),
            ])
        );
        Ok(())
    } else {
        emit_success(app.output, "stats", serde_json::to_value(&stats)?)
    }
}

pub async fn run_reset(app: &App, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("Refusing to delete {} without --yes", app.database.display());
    }

    let store = app.store.lock().await;
    let before = store.stats()?;
    store.clear_all()?;
    drop(store);
    tracing::info!("Database reset");

    if app.output.is_human() {
        ui::success(&format!(
            "Removed {} articles, {} messages{}",
            before.articles,
            before.messages,
            if before.has_profile { " and the profile" } else { "" }
        ));
        Ok(())
    } else {
        emit_success(app.output, "reset", serde_json::to_value(&before)?)
    }
}

pub async fn run_sync(app: &App, every: Option<u64>) -> anyhow::Result<()> {
    let repo = news(app)?;

    let Some(seconds) = every else {
        let progress = spinner(app, "Refreshing headlines...");
        let articles = repo.top_headlines().await;
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }
        let count = articles?.len();
        return if app.output.is_human() {
            ui::success(&format!("{} {} headlines available", Icons::SYNC, count));
            Ok(())
        } else {
            emit_success(app.output, "sync", serde_json::json!({ "articles": count }))
        };
    };

    if seconds == 0 {
        anyhow::bail!("--every must be at least 1 second");
    }
    if app.output.is_human() {
        ui::info("Sync", &format!("every {}s, Ctrl-C to stop", seconds));
    }
    let handle = repo.spawn_periodic(Duration::from_secs(seconds));
    tokio::signal::ctrl_c().await?;
    handle.abort();
    tracing::info!("Sync stopped");
    Ok(())
}

pub async fn run_serve(app: &App, port: u16, sync_every: Option<u64>) -> anyhow::Result<()> {
    let repo = news(app)?;
    let geocoder = Arc::new(NominatimGeocoder::new()?);

    let state = AppState {
        home: HomeFeed::new(repo.clone()),
        messages: MessagesBoard::new(ChatService::new(app.store.clone())),
        profile: ProfilePanel::new(ProfileService::new(app.store.clone()), geocoder),
        store: app.store.clone(),
    };

    let sync = match sync_every {
        Some(0) => anyhow::bail!("--sync-every must be at least 1 second"),
        Some(seconds) => Some(repo.spawn_periodic(Duration::from_secs(seconds))),
        None => None,
    };

    if app.output.is_human() {
        ui::info("Listening", &format!("{} http://127.0.0.1:{}", Icons::GLOBE, port));
    }
    let result = server::start_server(port, Arc::new(state)).await;

    if let Some(handle) = sync {
        handle.abort();
    }
    result
}
