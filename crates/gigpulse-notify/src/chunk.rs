//! Message chunking
//!
//! Splits text for a channel with a hard per-message character limit:
//! - Prefer cutting at the last newline inside the window
//! - Hard-cut at the limit when the window has no usable newline
//! - Drop one newline at every cut, remembering that it was dropped
//!
//! Limits count `char`s, not bytes.

/// One piece of a split message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// A newline directly after this chunk was dropped at the cut
    pub stripped_newline: bool,
}

/// Split `text` into chunks of at most `limit` characters
///
/// Empty text yields no chunks. Concatenating every chunk followed by its
/// dropped newline reproduces `text` exactly.
#[must_use]
pub fn split_message_parts(text: &str, limit: usize) -> Vec<Chunk> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some((end, _)) = rest.char_indices().nth(limit) else {
            chunks.push(Chunk {
                text: rest.to_string(),
                stripped_newline: false,
            });
            break;
        };

        let cut = match rest[..end].rfind('\n') {
            Some(pos) if pos > 0 => pos,
            _ => end,
        };
        let (head, tail) = rest.split_at(cut);
        let stripped_newline = tail.starts_with('\n');
        chunks.push(Chunk {
            text: head.to_string(),
            stripped_newline,
        });
        rest = if stripped_newline { &tail[1..] } else { tail };
    }
    chunks
}

/// Split `text` into chunk texts of at most `limit` characters
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    split_message_parts(text, limit)
        .into_iter()
        .map(|c| c.text)
        .collect()
}

/// Inverse of [`split_message_parts`]
#[must_use]
pub fn rejoin(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(&chunk.text);
        if chunk.stripped_newline {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello", 4096), vec!["hello".to_string()]);
    }

    #[test]
    fn empty_text_is_no_chunks() {
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn cuts_at_last_newline_in_window() {
        let chunks = split_message("aaa\nbbb\ncccc", 9);
        assert_eq!(chunks, vec!["aaa\nbbb", "cccc"]);
    }

    #[test]
    fn hard_cut_without_newline() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn newline_at_window_start_is_not_a_cut_point() {
        let parts = split_message_parts("\nabcdef", 3);
        assert_eq!(parts[0].text, "\nab");
        assert_eq!(rejoin(&parts), "\nabcdef");
    }

    #[test]
    fn trailing_newline_survives_rejoin() {
        let parts = split_message_parts("abc\n", 3);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].stripped_newline);
        assert_eq!(rejoin(&parts), "abc\n");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "ééééé";
        let chunks = split_message(text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    proptest! {
        #[test]
        fn chunks_fit_and_rejoin(text in "[a-c\\n é]{0,200}", limit in 1usize..40) {
            let parts = split_message_parts(&text, limit);
            for part in &parts {
                prop_assert!(!part.text.is_empty());
                prop_assert!(part.text.chars().count() <= limit);
            }
            prop_assert_eq!(rejoin(&parts), text);
        }
    }
}
