pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    article_line, dim, error, header, info, message_line, muted, success, summary_row,
    warn,
};
pub use progress::Spinner;
pub use table::{TableBuilder, article_table, message_table, stats_table};
pub use theme::{theme, Theme};
