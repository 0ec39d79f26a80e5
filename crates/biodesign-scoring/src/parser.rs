//! Best-effort extraction of structure from model replies.
//!
//! Model output is treated as untrusted input. Nothing in this module
//! returns an error: malformed pieces are dropped and counted, and the
//! caller decides whether the salvage rate is worth logging.
//!
//! Two reply shapes are handled:
//!
//! - **Vote payloads**: a JSON array of `{concept_title, scores, revisions}`
//!   records, usually wrapped in prose or code fences. See
//!   [`parse_vote_payload`].
//! - **Bulleted text**: free-form concept proposals and critique lines. See
//!   [`parse_bullets`] and [`parse_lines`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::criteria::Criterion;
use crate::store::ScoreEntry;

/// Maximum characters kept for a bulleted item's body.
pub const DESCRIPTION_LIMIT: usize = 600;

/// Upper bound of the score scale.
pub const MAX_SCORE: f64 = 5.0;

/// How far the vote payload parse got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseStatus {
    /// A JSON array was located and decoded.
    Parsed,
    /// No `[` ... `]` span was found.
    NoArray,
    /// A span was found but did not decode as a JSON array.
    Malformed,
}

/// Scores one voter gave to one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Concept title as written by the voter.
    pub concept_title: String,
    /// Entries that survived coercion.
    pub scores: Vec<ScoreEntry>,
    /// Revision suggestions, if the voter gave any.
    pub revisions: Vec<String>,
}

/// Result of salvaging a vote payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteParse {
    /// Records that carried a usable concept title.
    pub records: Vec<VoteRecord>,
    /// How far parsing got.
    pub status: ParseStatus,
    /// Records dropped for a missing title or a non-object shape.
    pub dropped_records: usize,
    /// Individual score entries dropped during coercion.
    pub dropped_entries: usize,
}

impl VoteParse {
    fn failed(status: ParseStatus) -> Self {
        Self {
            records: Vec::new(),
            status,
            dropped_records: 0,
            dropped_entries: 0,
        }
    }

    /// Number of score entries across all records.
    pub fn entry_count(&self) -> usize {
        self.records.iter().map(|r| r.scores.len()).sum()
    }

    /// Returns true if nothing usable was recovered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Extracts vote records from a model reply.
///
/// Takes the span from the first `[` to the last `]` and decodes it as a
/// JSON array. Any failure yields an empty result, never an error.
///
/// Within a decoded array:
/// - records that are not objects, or lack a non-empty `concept_title`,
///   are dropped
/// - each score entry is coerced on its own; an unknown criterion, a
///   non-numeric or out-of-range score, or a non-string rationale drops
///   only that entry
/// - `score` may be a JSON number or a numeric string
///
/// # Example
///
/// ```rust
/// use biodesign_scoring::{parse_vote_payload, ParseStatus};
///
/// let parsed = parse_vote_payload("no structured data here");
/// assert!(parsed.records.is_empty());
/// assert_eq!(parsed.status, ParseStatus::NoArray);
/// ```
pub fn parse_vote_payload(text: &str) -> VoteParse {
    let (start, end) = match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return VoteParse::failed(ParseStatus::NoArray),
    };

    let items = match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(items)) => items,
        _ => return VoteParse::failed(ParseStatus::Malformed),
    };

    let mut parse = VoteParse::failed(ParseStatus::Parsed);
    for item in &items {
        let Some(object) = item.as_object() else {
            parse.dropped_records += 1;
            continue;
        };

        let title = object
            .get("concept_title")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if title.is_empty() {
            parse.dropped_records += 1;
            continue;
        }

        let raw_scores = object
            .get("scores")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut scores = Vec::with_capacity(raw_scores.len());
        for raw in raw_scores {
            match coerce_entry(raw) {
                Some(entry) => scores.push(entry),
                None => parse.dropped_entries += 1,
            }
        }

        let revisions = object
            .get("revisions")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        parse.records.push(VoteRecord {
            concept_title: title.to_string(),
            scores,
            revisions,
        });
    }
    parse
}

fn coerce_entry(raw: &Value) -> Option<ScoreEntry> {
    let object = raw.as_object()?;

    let criterion: Criterion = object.get("criterion")?.as_str()?.parse().ok()?;

    let score = match object.get("score")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) {
        return None;
    }

    let rationale = match object.get("rationale") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return None,
    };

    Some(ScoreEntry::new(criterion, score, rationale))
}

/// One item of a bulleted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletItem {
    /// First line of the item, bullet glyphs stripped.
    pub title: String,
    /// Remaining lines joined with spaces, truncated to
    /// [`DESCRIPTION_LIMIT`] characters.
    pub body: String,
}

/// Items split out of bulleted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletList {
    /// Extracted items, in text order.
    pub items: Vec<BulletItem>,
    /// False when no list markers were found and the whole text was taken
    /// as a single item.
    pub structured: bool,
}

fn item_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^(?:[-*•]|\d{1,2}[.)])\s+").expect("item marker pattern is valid")
    })
}

fn strip_glyphs(line: &str) -> &str {
    line.trim_matches(|c: char| c == '-' || c == '•' || c == '*' || c.is_whitespace())
}

/// Truncates `text` to at most `limit` characters (not bytes).
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Splits free-form bulleted text into items.
///
/// A new item starts at every unindented line beginning with `-`, `*`,
/// `•` or a number followed by `.` or `)`. Indented lines and plain lines
/// continue the current item. The first line of an item becomes its title,
/// the rest its body. Text before the first marker is discarded when
/// markers exist; when none exist the whole text becomes one item.
///
/// There is no failure path: any input yields some output, which may be
/// empty.
pub fn parse_bullets(text: &str) -> BulletList {
    let marker = item_marker();
    let structured = text.lines().any(|line| marker.is_match(line));

    let mut blocks: Vec<Vec<&str>> = Vec::new();
    if structured {
        for line in text.lines() {
            if let Some(found) = marker.find(line) {
                blocks.push(vec![&line[found.end()..]]);
            } else if let Some(current) = blocks.last_mut() {
                current.push(line);
            }
        }
    } else {
        blocks.push(text.lines().collect());
    }

    let items = blocks
        .into_iter()
        .filter_map(|lines| {
            let mut lines = lines.into_iter().map(str::trim).filter(|l| !l.is_empty());
            let title = strip_glyphs(lines.next()?).to_string();
            if title.is_empty() {
                return None;
            }
            let body = lines.map(strip_glyphs).collect::<Vec<_>>().join(" ");
            Some(BulletItem {
                title,
                body: truncate_chars(&body, DESCRIPTION_LIMIT).to_string(),
            })
        })
        .collect();

    BulletList { items, structured }
}

/// Splits text into non-empty lines with list glyphs and numbering removed.
pub fn parse_lines(text: &str) -> Vec<String> {
    let marker = item_marker();
    text.lines()
        .map(|line| {
            let line = line.trim();
            let line = match marker.find(line) {
                Some(found) => &line[found.end()..],
                None => line,
            };
            strip_glyphs(line).to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}
