//! Message ID assignment.

use bandsite_shared::{Message, RawMessage};

/// Give every message its 1-based position as `id`, keeping any id the
/// record already carries.
///
/// Consumes the input and returns new records, so re-running on messages
/// that came back from JSON with ids leaves those ids untouched.
pub fn assign_ids(messages: Vec<RawMessage>) -> Vec<Message> {
    messages
        .into_iter()
        .zip(1u64..)
        .map(|(raw, position)| Message {
            id: raw.id.unwrap_or(position),
            ts: raw.ts,
            author: raw.author,
            text: raw.text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(id: Option<u64>, text: &str) -> RawMessage {
        RawMessage {
            id,
            ts: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            author: "Ada".into(),
            text: text.into(),
        }
    }

    #[test]
    fn ids_are_one_to_n_in_order() {
        let input: Vec<_> = (0..25).map(|i| raw(None, &format!("m{i}"))).collect();
        let messages = assign_ids(input);

        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<_>>());
        assert_eq!(messages[24].text, "m24");
    }

    #[test]
    fn existing_ids_are_preserved() {
        let messages = assign_ids(vec![raw(Some(10), "a"), raw(None, "b"), raw(Some(30), "c")]);
        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 2, 30]);
    }

    #[test]
    fn reassigning_is_idempotent() {
        let first = assign_ids(vec![raw(None, "a"), raw(None, "b")]);
        let again = assign_ids(
            first
                .iter()
                .map(|m| RawMessage {
                    id: Some(m.id),
                    ts: m.ts,
                    author: m.author.clone(),
                    text: m.text.clone(),
                })
                .collect(),
        );
        assert_eq!(first, again);
    }

    #[test]
    fn empty_input() {
        assert!(assign_ids(Vec::new()).is_empty());
    }
}
