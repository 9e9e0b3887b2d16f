//! Subsystem registration: one entry per plugin that exposes commands.
//!
//! Adding a new subsystem: append one entry to `SUBSYSTEMS`.

use crate::core::schemas;
use crate::plugins::{import, review, words};

pub(crate) struct Subsystem {
    pub name: &'static str,
    pub schema: fn() -> serde_json::Value,
}

pub(crate) const SUBSYSTEMS: &[Subsystem] = &[
    Subsystem { name: "words", schema: words::schema },
    Subsystem { name: "import", schema: import::schema },
    Subsystem { name: "review", schema: review::schema },
];

/// Combined schema document printed by `wordvault schema`.
pub(crate) fn schema_document() -> serde_json::Value {
    let subsystems: serde_json::Map<String, serde_json::Value> = SUBSYSTEMS
        .iter()
        .map(|s| (s.name.to_string(), (s.schema)()))
        .collect();
    serde_json::json!({
        "name": "wordvault",
        "version": env!("CARGO_PKG_VERSION"),
        "schema_version": schemas::SCHEMA_VERSION,
        "subsystems": subsystems,
    })
}
