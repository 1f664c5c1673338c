//! Paragraph segmentation for the page reader
//!
//! Turns the raw text of one PDF page into display-sized paragraphs. The
//! lengths below are soft targets for readability; a sentence with no
//! terminator can still exceed them.

/// Paragraphs longer than this (in characters) are re-chunked by sentence.
pub const LONG_PARAGRAPH_THRESHOLD: usize = 500;

/// Sentences are packed into chunks of at most this many characters.
pub const CHUNK_PACK_LIMIT: usize = 400;

/// Split one page of text into ordered paragraphs.
///
/// 1. Blank-line boundaries (`"\n\n"`) are tried first.
/// 2. If that gives fewer than two paragraphs and the text has line breaks,
///    consecutive non-blank lines are joined with a space instead.
/// 3. A lone paragraph, or any paragraph over [`LONG_PARAGRAPH_THRESHOLD`],
///    is re-chunked on `.`/`!`/`?` into chunks of up to [`CHUNK_PACK_LIMIT`].
///    Every fragment but the last gets a `.` back; `!` and `?` are not restored.
/// 4. If nothing survived, the trimmed input is returned as one paragraph.
///
/// The result is never empty and never reorders content.
pub fn split_into_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if paragraphs.len() <= 1 && text.contains('\n') {
        paragraphs = group_lines(text);
    }

    if paragraphs.len() == 1 || has_long_paragraphs(&paragraphs) {
        paragraphs = break_down_long_paragraphs(paragraphs);
    }

    if paragraphs.is_empty() {
        paragraphs.push(text.trim().to_string());
    }

    paragraphs
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Join consecutive non-blank lines; blank lines end a paragraph.
fn group_lines(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

fn has_long_paragraphs(paragraphs: &[String]) -> bool {
    paragraphs
        .iter()
        .any(|p| char_len(p) > LONG_PARAGRAPH_THRESHOLD)
}

fn break_down_long_paragraphs(paragraphs: Vec<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(paragraphs.len());

    for paragraph in paragraphs {
        if char_len(&paragraph) <= LONG_PARAGRAPH_THRESHOLD {
            result.push(paragraph);
            continue;
        }

        let fragments: Vec<&str> = paragraph
            .split(|c: char| matches!(c, '.' | '!' | '?'))
            .filter(|f| !f.is_empty())
            .collect();
        let last = fragments.len().saturating_sub(1);

        let mut chunk = String::new();
        let mut chunk_len = 0;

        for (i, fragment) in fragments.iter().enumerate() {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }

            let mut sentence = fragment.to_string();
            if i < last {
                sentence.push('.');
            }
            let sentence_len = char_len(&sentence);

            if chunk_len > 0 && chunk_len + sentence_len + 1 > CHUNK_PACK_LIMIT {
                result.push(std::mem::replace(&mut chunk, sentence));
                chunk_len = sentence_len;
            } else {
                if !chunk.is_empty() {
                    chunk.push(' ');
                    chunk_len += 1;
                }
                chunk.push_str(&sentence);
                chunk_len += sentence_len;
            }
        }

        if !chunk.is_empty() {
            result.push(chunk);
        }
    }

    result
}
