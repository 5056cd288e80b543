//! Clause segmentation.
//!
//! A clause is a piece of one line, cut at sentence terminators (`.`, `!`, `?`
//! followed by whitespace or end of line) and before the coordinating
//! conjunctions "and", "or", "but". `join_clauses` puts a kept subset back
//! together so that splitting the result yields exactly that subset.

use std::sync::LazyLock;

use regex::Regex;

static CONJUNCTION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:and|or|but)\b").ok());

pub const TERMINATORS: [char; 3] = ['.', '!', '?'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Zero-based line the clause came from.
    pub line: usize,
    /// Trimmed clause text.
    pub text: String,
}

pub fn split_clauses(text: &str) -> Vec<Clause> {
    let mut clauses = Vec::new();
    for (line, content) in text.lines().enumerate() {
        for sentence in sentences(content) {
            for piece in conjunction_pieces(sentence) {
                clauses.push(Clause {
                    line,
                    text: piece.to_string(),
                });
            }
        }
    }
    clauses
}

/// Rejoin clauses: a space where the boundary survives re-splitting, a newline
/// where it would not.
pub fn join_clauses<'a>(clauses: impl IntoIterator<Item = &'a Clause>) -> String {
    let mut out = String::new();
    let mut previous: Option<&Clause> = None;
    for clause in clauses {
        if let Some(prev) = previous {
            let boundary_survives = prev.line == clause.line
                && (ends_sentence(&prev.text) || starts_with_conjunction(&clause.text));
            out.push(if boundary_survives { ' ' } else { '\n' });
        }
        out.push_str(&clause.text);
        previous = Some(clause);
    }
    out
}

pub fn ends_sentence(text: &str) -> bool {
    text.ends_with(TERMINATORS)
}

pub fn starts_with_conjunction(text: &str) -> bool {
    CONJUNCTION
        .as_ref()
        .and_then(|re| re.find(text))
        .is_some_and(|m| m.start() == 0)
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}

fn sentences(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !TERMINATORS.contains(&c) {
            continue;
        }
        let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
        if at_boundary {
            let end = i + c.len_utf8();
            push_trimmed(&mut out, &line[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut out, &line[start..]);
    out
}

fn conjunction_pieces(sentence: &str) -> Vec<&str> {
    let Some(re) = CONJUNCTION.as_ref() else {
        return vec![sentence];
    };
    let mut pieces = Vec::new();
    let mut start = 0;
    for m in re.find_iter(sentence) {
        if !sentence[start..m.start()].trim().is_empty() {
            push_trimmed(&mut pieces, &sentence[start..m.start()]);
            start = m.start();
        }
    }
    push_trimmed(&mut pieces, &sentence[start..]);
    pieces
}
