//! Partitioning of a conversation into extraction-sized chunks.
//!
//! One forward pass: a chunk closes when the conversation goes quiet for
//! `min_gap_minutes` or when the next rendered line would overflow
//! `max_chars`. A single message is never split, so a chunk can exceed the
//! budget only when it holds exactly one oversized message.

use tracing::{debug, instrument};

use bandsite_shared::timestamp::format_iso;
use bandsite_shared::{DEFAULT_MAX_CHARS, Message, Variant};

use crate::sanitize::Sanitizer;

/// Size and silence thresholds for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    /// Budget in characters of rendered transcript lines.
    pub max_chars: usize,
    /// A silence of at least this many minutes always starts a new chunk.
    pub min_gap_minutes: i64,
}

impl ChunkOptions {
    /// Tuning used by a site variant.
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            min_gap_minutes: variant.min_gap_minutes(),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// A contiguous run of messages sent as one extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the chunk sequence.
    pub index: usize,
    pub messages: Vec<Message>,
    /// Sanitized rendered lines, each terminated by `\n`.
    pub transcript: String,
    /// Length of `transcript` in characters.
    pub char_len: usize,
}

impl Chunk {
    pub fn first_id(&self) -> Option<u64> {
        self.messages.first().map(|m| m.id)
    }

    pub fn last_id(&self) -> Option<u64> {
        self.messages.last().map(|m| m.id)
    }
}

/// Render one message as it appears in an extraction transcript.
pub fn render_line(message: &Message, sanitizer: Sanitizer) -> String {
    format!(
        "[{}] {} {}: {}\n",
        message.id,
        format_iso(&message.ts),
        message.author,
        sanitizer.apply(&message.text)
    )
}

struct ChunkBuilder {
    chunks: Vec<Chunk>,
    messages: Vec<Message>,
    transcript: String,
    char_len: usize,
}

impl ChunkBuilder {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            messages: Vec::new(),
            transcript: String::new(),
            char_len: 0,
        }
    }

    /// Append one rendered line, closing the current chunk first when the
    /// line would push it past `max_chars`. An empty chunk takes any line.
    fn push(&mut self, message: &Message, line: &str, max_chars: usize) {
        let line_len = line.chars().count();
        if !self.messages.is_empty() && self.char_len + line_len > max_chars {
            self.flush();
        }
        self.messages.push(message.clone());
        self.transcript.push_str(line);
        self.char_len += line_len;
    }

    fn flush(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let index = self.chunks.len();
        debug!(
            index,
            messages = self.messages.len(),
            chars = self.char_len,
            "chunk closed"
        );
        self.chunks.push(Chunk {
            index,
            messages: std::mem::take(&mut self.messages),
            transcript: std::mem::take(&mut self.transcript),
            char_len: self.char_len,
        });
        self.char_len = 0;
    }
}

/// Split `messages` into chunks, preserving order and membership.
///
/// Sanitization runs before measuring, so placeholders count toward the
/// budget. Timestamps that go backwards never split a chunk.
#[instrument(skip_all, fields(messages = messages.len(), max_chars = opts.max_chars, min_gap = opts.min_gap_minutes))]
pub fn chunk_messages(messages: &[Message], opts: &ChunkOptions, sanitizer: Sanitizer) -> Vec<Chunk> {
    let mut builder = ChunkBuilder::new();

    for message in messages {
        let gap = builder
            .messages
            .last()
            .map(|previous| (message.ts - previous.ts).num_minutes());
        if gap.is_some_and(|minutes| minutes >= opts.min_gap_minutes) {
            builder.flush();
        }

        let line = render_line(message, sanitizer);
        builder.push(message, &line, opts.max_chars);
    }
    builder.flush();

    builder.chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn msg(id: u64, minutes: i64, author: &str, text: &str) -> Message {
        Message {
            id,
            ts: base() + Duration::minutes(minutes),
            author: author.into(),
            text: text.into(),
        }
    }

    fn opts(max_chars: usize, min_gap_minutes: i64) -> ChunkOptions {
        ChunkOptions {
            max_chars,
            min_gap_minutes,
        }
    }

    fn ids(chunks: &[Chunk]) -> Vec<Vec<u64>> {
        chunks
            .iter()
            .map(|c| c.messages.iter().map(|m| m.id).collect())
            .collect()
    }

    #[test]
    fn rendered_line_shape() {
        let line = render_line(&msg(3, 0, "Ada", "mail a@b.com"), Sanitizer::Contacts);
        assert_eq!(line, "[3] 2024-01-01T12:00:00 Ada: [REDACTED_EMAIL]\n");
    }

    #[test]
    fn gap_of_179_minutes_stays_together() {
        let messages = [msg(1, 0, "A", "x"), msg(2, 179, "B", "y")];
        let chunks = chunk_messages(&messages, &opts(12_000, 180), Sanitizer::Contacts);
        assert_eq!(ids(&chunks), vec![vec![1, 2]]);
    }

    #[test]
    fn gap_of_180_minutes_splits() {
        let messages = [msg(1, 0, "A", "x"), msg(2, 180, "B", "y")];
        let chunks = chunk_messages(&messages, &opts(12_000, 180), Sanitizer::Contacts);
        assert_eq!(ids(&chunks), vec![vec![1], vec![2]]);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn size_guard_flushes_before_overflow() {
        // 95 held, a 10-char line would make 105 > 100.
        let mut builder = ChunkBuilder::new();
        builder.push(&msg(1, 0, "A", "x"), &"a".repeat(95), 100);
        builder.push(&msg(2, 1, "B", "y"), &"b".repeat(10), 100);
        builder.flush();

        assert_eq!(ids(&builder.chunks), vec![vec![1], vec![2]]);
        assert_eq!(builder.chunks[0].char_len, 95);
        assert_eq!(builder.chunks[1].char_len, 10);
    }

    #[test]
    fn size_guard_allows_filling_to_the_budget() {
        let mut builder = ChunkBuilder::new();
        builder.push(&msg(1, 0, "A", "x"), &"a".repeat(95), 100);
        builder.push(&msg(2, 1, "B", "y"), &"b".repeat(5), 100);
        builder.flush();

        assert_eq!(ids(&builder.chunks), vec![vec![1, 2]]);
        assert_eq!(builder.chunks[0].char_len, 100);
    }

    #[test]
    fn rendered_line_one_past_budget_flushes() {
        let first = msg(1, 0, "A", &"x".repeat(60));
        let second = msg(2, 1, "B", "y");
        let budget = render_line(&first, Sanitizer::Contacts).chars().count()
            + render_line(&second, Sanitizer::Contacts).chars().count()
            - 1;

        let chunks = chunk_messages(&[first, second], &opts(budget, 180), Sanitizer::Contacts);
        assert_eq!(ids(&chunks), vec![vec![1], vec![2]]);
    }

    #[test]
    fn exact_fit_does_not_flush() {
        let first = msg(1, 0, "A", "hello");
        let second = msg(2, 1, "B", "world");
        let budget = render_line(&first, Sanitizer::Contacts).chars().count()
            + render_line(&second, Sanitizer::Contacts).chars().count();

        let chunks = chunk_messages(&[first, second], &opts(budget, 180), Sanitizer::Contacts);
        assert_eq!(ids(&chunks), vec![vec![1, 2]]);
    }

    #[test]
    fn oversized_single_message_is_kept_whole() {
        let big = msg(1, 0, "A", &"z".repeat(250));
        let after = msg(2, 1, "B", "short");
        let chunks = chunk_messages(&[big, after], &opts(100, 180), Sanitizer::Contacts);

        assert_eq!(ids(&chunks), vec![vec![1], vec![2]]);
        assert!(chunks[0].char_len > 100);
        assert!(chunks[0].transcript.contains(&"z".repeat(250)));
    }

    #[test]
    fn redaction_placeholder_counts_toward_budget() {
        let messages = [
            msg(1, 0, "A", "let's talk about money"),
            msg(2, 1, "B", "ok"),
        ];
        let chunks = chunk_messages(&messages, &opts(12_000, 360), Sanitizer::Public);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].transcript.contains("[REDACTED_PRIVATE_CONTEXT]"));
        assert!(!chunks[0].transcript.contains("money"));
        assert_eq!(chunks[0].char_len, chunks[0].transcript.chars().count());
    }

    #[test]
    fn multibyte_text_is_measured_in_chars() {
        let m = msg(1, 0, "Zoë", "ñandú");
        let chunks = chunk_messages(&[m], &opts(12_000, 180), Sanitizer::Contacts);
        assert_eq!(chunks[0].char_len, chunks[0].transcript.chars().count());
        assert!(chunks[0].char_len < chunks[0].transcript.len());
    }

    #[test]
    fn backwards_timestamps_never_split() {
        let messages = [msg(1, 600, "A", "x"), msg(2, 0, "B", "y")];
        let chunks = chunk_messages(&messages, &opts(12_000, 180), Sanitizer::Contacts);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn partition_reproduces_input() {
        let messages: Vec<Message> = (0..200)
            .map(|i| {
                let minutes = i * 37 + if i % 17 == 0 { 500 } else { 0 };
                msg(i as u64 + 1, minutes, "Ada", &"w".repeat((i as usize * 13) % 90))
            })
            .collect();

        let chunks = chunk_messages(&messages, &opts(600, 180), Sanitizer::Contacts);
        assert!(chunks.len() > 1);

        let flattened: Vec<Message> = chunks
            .iter()
            .flat_map(|c| c.messages.iter().cloned())
            .collect();
        assert_eq!(flattened, messages);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(!chunk.messages.is_empty());
            assert!(chunk.char_len <= 600 || chunk.messages.len() == 1);
        }
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_messages(&[], &opts(100, 180), Sanitizer::Contacts).is_empty());
    }

    #[test]
    fn variant_options() {
        let public = ChunkOptions::for_variant(Variant::Public);
        assert_eq!(public.max_chars, 12_000);
        assert_eq!(public.min_gap_minutes, 360);
        assert_eq!(public.with_max_chars(500).max_chars, 500);
    }
}
