pub struct Icons;

impl Icons {
    pub const NEWS: &str = "📰";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const LINK: &str = "🔗";
    pub const CHAT: &str = "💬";
    pub const OUTGOING: &str = "➡️";
    pub const INCOMING: &str = "⬅️";
    pub const IMAGE: &str = "🖼️";
    pub const AUDIO: &str = "🎙️";
    pub const PERSON: &str = "👤";
    pub const PIN: &str = "📍";
    pub const DATABASE: &str = "🗄️";
    pub const GLOBE: &str = "🌍";
    pub const SYNC: &str = "🔄";
    pub const TRASH: &str = "🗑️";
    pub const EMPTY: &str = "∅";
}
