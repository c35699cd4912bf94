//! `messages.json` input and output: an ordered array of
//! `{id?, ts, author, text}` records.

use std::path::Path;

use tracing::info;

use bandsite_shared::{BandsiteError, RawMessage, Result};

/// Parse a JSON message array. Missing or mistyped fields are
/// [`BandsiteError::MalformedExport`].
pub fn parse_messages_json(raw: &str) -> Result<Vec<RawMessage>> {
    serde_json::from_str(raw)
        .map_err(|e| BandsiteError::malformed_export(format!("invalid message JSON: {e}")))
}

/// Load a JSON message array from disk.
pub fn load_messages_json(path: &Path) -> Result<Vec<RawMessage>> {
    let raw = std::fs::read_to_string(path).map_err(|e| BandsiteError::io(path, e))?;
    parse_messages_json(&raw).map_err(|e| match e {
        BandsiteError::MalformedExport { message } => {
            BandsiteError::malformed_export(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Write messages as pretty-printed JSON (non-ASCII kept verbatim).
pub fn write_messages_json(path: &Path, messages: &[RawMessage]) -> Result<()> {
    let json = serde_json::to_string_pretty(messages)
        .map_err(|e| BandsiteError::Serialization(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| BandsiteError::io(path, e))?;
    info!(path = %path.display(), count = messages.len(), "wrote messages JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_with_optional_ids() {
        let raw = r#"[
            {"ts": "2024-01-01T12:00:00", "author": "Ada", "text": "Book studio?"},
            {"id": 7, "ts": "2024-01-02T09:00:00", "author": "Lin", "text": "Gig at Town Hall"}
        ]"#;
        let messages = parse_messages_json(raw).expect("parse");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, None);
        assert_eq!(messages[1].id, Some(7));
    }

    #[test]
    fn missing_text_is_malformed_export() {
        let raw = r#"[{"ts": "2024-01-01T12:00:00", "author": "Ada"}]"#;
        let err = parse_messages_json(raw).unwrap_err();
        assert!(matches!(err, BandsiteError::MalformedExport { .. }));
        assert!(err.to_string().contains("text"));
    }

    #[test]
    fn unparseable_ts_is_malformed_export() {
        let raw = r#"[{"ts": "soon", "author": "Ada", "text": "hi"}]"#;
        assert!(matches!(
            parse_messages_json(raw),
            Err(BandsiteError::MalformedExport { .. })
        ));
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("messages.json");
        let messages = parse_messages_json(
            r#"[{"ts": "2024-01-01T12:00:00", "author": "Zoë", "text": "¡hola!"}]"#,
        )
        .expect("parse");

        write_messages_json(&path, &messages).expect("write");
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.contains("Zoë"));
        assert_eq!(load_messages_json(&path).expect("load"), messages);
    }
}
