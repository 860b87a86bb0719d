//! Static assets embedded at compile time from the `templates/` directory.

/// Chat page served at `GET /`
pub const INDEX_HTML: &str = include_str!("../templates/index.html");
