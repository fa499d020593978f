use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `PULSE_QUIET=1` suppresses banners and spinners
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("PULSE_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
