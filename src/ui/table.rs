use tabled::{settings::Style, Table, Tabled};
use crate::article::Article;
use crate::message::ChatMessage;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct ArticleRow {
    #[tabled(rename = "Published")]
    published: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Title")]
    title: String,
}

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "From")]
    from: &'static str,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Content")]
    content: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

pub fn article_table(articles: &[Article]) -> String {
    let rows: Vec<ArticleRow> = articles
        .iter()
        .map(|a| ArticleRow {
            published: a.published_at.clone(),
            source: truncate(&a.source, 20),
            title: truncate(&a.title, 72),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn message_table(messages: &[ChatMessage]) -> String {
    let rows: Vec<MessageRow> = messages
        .iter()
        .map(|m| MessageRow {
            from: if m.from_user { "me" } else { "peer" },
            kind: m.kind.to_string(),
            content: truncate(&m.content, 72),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
