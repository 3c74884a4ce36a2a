//! Reply formatting and chunking.
//!
//! Long outputs are split into ordered bodies of at most `max_chunk_chars`
//! characters. Splits prefer paragraph breaks, then sentence breaks, then
//! raw character boundaries. Concatenating the bodies always yields the
//! original text.

const PARAGRAPH_BREAK: &str = "\n\n";
const SENTENCE_BREAK: &str = ". ";

/// Messages for one reply, labelled with `label` and chunk positions.
///
/// An empty `label` produces unlabelled single replies.
pub fn format(result_text: &str, label: &str, max_chunk_chars: usize) -> Vec<String> {
    let bodies = split_into_chunks(result_text, max_chunk_chars);
    let total = bodies.len();

    bodies
        .into_iter()
        .enumerate()
        .map(|(index, body)| match chunk_header(label, index, total) {
            Some(header) => format!("{}\n\n{}", header, body),
            None => body,
        })
        .collect()
}

fn chunk_header(label: &str, index: usize, total: usize) -> Option<String> {
    match (total, index, label.is_empty()) {
        (1, _, true) => None,
        (1, _, false) => Some(label.to_string()),
        (_, 0, false) => Some(format!("{} ({}/{})", label, 1, total)),
        (_, i, _) => Some(format!("({}/{})", i + 1, total)),
    }
}

/// Split `text` into bodies of at most `max_chunk_chars` characters.
///
/// Always returns at least one body; an empty input yields one empty body.
pub fn split_into_chunks(text: &str, max_chunk_chars: usize) -> Vec<String> {
    let max = max_chunk_chars.max(1);

    if char_len(text) <= max {
        return vec![text.to_string()];
    }

    let mut units: Vec<&str> = Vec::new();
    for paragraph in text.split_inclusive(PARAGRAPH_BREAK) {
        if char_len(paragraph) <= max {
            units.push(paragraph);
            continue;
        }

        for sentence in paragraph.split_inclusive(SENTENCE_BREAK) {
            if char_len(sentence) <= max {
                units.push(sentence);
            } else {
                units.extend(hard_split(sentence, max));
            }
        }
    }

    pack(units, max)
}

/// Greedily join consecutive units while they fit.
fn pack(units: Vec<&str>, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in units {
        let unit_len = char_len(unit);

        if current_len > 0 && current_len + unit_len > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current.push_str(unit);
        current_len += unit_len;
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Cut on character boundaries into pieces of `max` characters.
fn hard_split(text: &str, max: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let end = text[start..]
            .char_indices()
            .nth(max)
            .map(|(offset, _)| start + offset)
            .unwrap_or(text.len());
        pieces.push(&text[start..end]);
        start = end;
    }

    pieces
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(text: &str, max: usize) {
        let chunks = split_into_chunks(text, max);
        assert_eq!(chunks.concat(), text, "max = {}", max);
        for chunk in &chunks {
            assert!(char_len(chunk) <= max.max(1), "chunk too long for max {}: {:?}", max, chunk);
        }
    }

    #[test]
    fn test_short_text_is_single_labelled_chunk() {
        assert_eq!(format("مرحبا", "🇫🇷 → 🇩🇿", 100), vec!["🇫🇷 → 🇩🇿\n\nمرحبا"]);
    }

    #[test]
    fn test_unlabelled_single_chunk_is_bare() {
        assert_eq!(format("answer", "", 100), vec!["answer"]);
    }

    #[test]
    fn test_paragraphs_are_packed_greedily() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let chunks = split_into_chunks(text, 12);
        assert_eq!(chunks, vec!["aaaa\n\nbbbb\n\n", "cccc"]);
    }

    #[test]
    fn test_long_paragraph_splits_on_sentences() {
        let text = "One two. Three four. Five six.";
        let chunks = split_into_chunks(text, 12);
        assert_eq!(chunks, vec!["One two. ", "Three four. ", "Five six."]);
    }

    #[test]
    fn test_unbroken_text_is_hard_split() {
        let chunks = split_into_chunks("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_multi_chunk_labels() {
        let messages = format("aaaa\n\nbbbb\n\ncccc", "🇩🇿 → 🇫🇷", 6);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], "🇩🇿 → 🇫🇷 (1/3)\n\naaaa\n\n");
        assert_eq!(messages[1], "(2/3)\n\nbbbb\n\n");
        assert_eq!(messages[2], "(3/3)\n\ncccc");
    }

    #[test]
    fn test_multi_chunk_without_label_is_numbered() {
        let messages = format("abcdef", "", 3);
        assert_eq!(messages, vec!["(1/2)\n\nabc", "(2/2)\n\ndef"]);
    }

    #[test]
    fn test_round_trip_for_many_sizes() {
        let samples = [
            "",
            "x",
            "Bonjour. Comment ça va? Très bien. Merci.\n\nDeuxième paragraphe ici.",
            "مرحبا بكم. هذا نص طويل.\n\n\n\nفقرة أخرى. وجملة ثالثة. 🇩🇿🇫🇷",
            "no breaks at all just one very long run of words without periods",
            ". . . .\n\n\n",
        ];

        for text in samples {
            for max in [1, 2, 3, 5, 7, 10, 16, 50, 1000] {
                assert_round_trip(text, max);
            }
        }
    }

    #[test]
    fn test_zero_max_is_treated_as_one() {
        assert_eq!(split_into_chunks("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_text_yields_one_chunk() {
        assert_eq!(split_into_chunks("", 10), vec![""]);
        assert_eq!(format("", "L", 10), vec!["L\n\n"]);
    }
}
