//! Keystroke transforms for the plain-text editor.
//!
//! Everything here works on byte offsets into `&str`; the DOM layer converts
//! from UTF-16 selection offsets before calling in.

pub(crate) const INDENT: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditKey {
    Tab,
    ShiftTab,
    Enter,
}

impl EditKey {
    pub fn from_key(key: &str, shift: bool) -> Option<Self> {
        match (key, shift) {
            ("Tab", false) => Some(Self::Tab),
            ("Tab", true) => Some(Self::ShiftTab),
            ("Enter", false) => Some(Self::Enter),
            _ => None,
        }
    }
}

/// Result of a handled key: the full new text plus the new selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TextEdit {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl TextEdit {
    fn caret(text: String, pos: usize) -> Self {
        Self {
            text,
            selection_start: pos,
            selection_end: pos,
        }
    }
}

/// A recognised list prefix at the start of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListMarker<'a> {
    Checkbox { indent: &'a str, bullet: char },
    Bullet { indent: &'a str, bullet: char },
    Numbered { indent: &'a str, number: u64, delimiter: char },
}

impl<'a> ListMarker<'a> {
    pub fn indent(&self) -> &'a str {
        match self {
            Self::Checkbox { indent, .. }
            | Self::Bullet { indent, .. }
            | Self::Numbered { indent, .. } => *indent,
        }
    }

    /// Prefix seeded on the line after this one.
    pub fn continuation(&self) -> String {
        match self {
            Self::Checkbox { indent, bullet } => format!("{indent}{bullet} [ ] "),
            Self::Bullet { indent, bullet } => format!("{indent}{bullet} "),
            Self::Numbered {
                indent,
                number,
                delimiter,
            } => format!("{indent}{}{delimiter} ", number.saturating_add(1)),
        }
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_bullet(c: char) -> bool {
    matches!(c, '-' | '*' | '+')
}

fn leading_whitespace(line: &str) -> &str {
    let body = line.trim_start_matches(is_blank);
    &line[..line.len() - body.len()]
}

/// Recognises a list marker at the start of `line`.
///
/// Returns the marker and the byte length of the full prefix, trailing blank
/// included. Checkboxes win over bullets, bullets over numbers.
pub(crate) fn parse_marker(line: &str) -> Option<(ListMarker<'_>, usize)> {
    let indent = leading_whitespace(line);
    let rest = &line[indent.len()..];
    let chars: Vec<char> = rest.chars().take(6).collect();

    if let [b, s1, '[', mark, ']', s2, ..] = chars.as_slice() {
        if is_bullet(*b) && is_blank(*s1) && matches!(*mark, ' ' | 'x' | 'X') && is_blank(*s2) {
            return Some((ListMarker::Checkbox { indent, bullet: *b }, indent.len() + 6));
        }
    }

    if let [b, s, ..] = chars.as_slice() {
        if is_bullet(*b) && is_blank(*s) {
            return Some((ListMarker::Bullet { indent, bullet: *b }, indent.len() + 2));
        }
    }

    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let mut tail = rest[digits..].chars();
    let delimiter = tail.next().filter(|c| matches!(*c, '.' | ')'))?;
    tail.next().filter(|c| is_blank(*c))?;
    let number = rest[..digits].parse::<u64>().ok()?;

    Some((
        ListMarker::Numbered {
            indent,
            number,
            delimiter,
        },
        indent.len() + digits + 2,
    ))
}

fn clamp_to_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Start offsets of every line touched by `[start, end)`.
///
/// A selection ending right after a newline does not touch the following line.
fn touched_line_starts(text: &str, start: usize, end: usize) -> Vec<usize> {
    let mut starts = vec![line_start(text, start)];
    for (i, _) in text[start..end].match_indices('\n') {
        let next = start + i + 1;
        if next < end {
            starts.push(next);
        }
    }
    starts
}

/// Applies `key` to `text` with the given selection.
///
/// Returns `None` when the key should fall through to the browser.
/// `continue_lists` controls whether Enter continues list markers.
pub(crate) fn apply_key(
    text: &str,
    selection_start: usize,
    selection_end: usize,
    key: EditKey,
    continue_lists: bool,
) -> Option<TextEdit> {
    let start = clamp_to_boundary(text, selection_start.min(selection_end));
    let end = clamp_to_boundary(text, selection_start.max(selection_end));

    match key {
        EditKey::Tab if start == end => Some(insert_at_caret(text, start, end, INDENT)),
        EditKey::Tab => Some(indent_lines(text, start, end)),
        EditKey::ShiftTab => Some(outdent_lines(text, start, end)),
        EditKey::Enter if continue_lists => Some(continue_list(text, start, end)),
        EditKey::Enter => None,
    }
}

fn insert_at_caret(text: &str, start: usize, end: usize, insert: &str) -> TextEdit {
    let mut next = String::with_capacity(text.len() + insert.len());
    next.push_str(&text[..start]);
    next.push_str(insert);
    next.push_str(&text[end..]);
    TextEdit::caret(next, start + insert.len())
}

fn indent_lines(text: &str, start: usize, end: usize) -> TextEdit {
    let starts = touched_line_starts(text, start, end);

    let mut next = text.to_string();
    for pos in starts.iter().rev() {
        next.insert_str(*pos, INDENT);
    }

    let first = starts[0];
    TextEdit {
        text: next,
        selection_start: if start == first { start } else { start + INDENT.len() },
        selection_end: end + INDENT.len() * starts.len(),
    }
}

fn outdent_lines(text: &str, start: usize, end: usize) -> TextEdit {
    let starts = if start == end {
        vec![line_start(text, start)]
    } else {
        touched_line_starts(text, start, end)
    };

    // (line start, bytes removed) in ascending order.
    let removals: Vec<(usize, usize)> = starts
        .iter()
        .map(|&pos| {
            let n = text[pos..]
                .bytes()
                .take(INDENT.len())
                .take_while(|b| *b == b' ')
                .count();
            (pos, n)
        })
        .filter(|(_, n)| *n > 0)
        .collect();

    let mut next = text.to_string();
    for (pos, n) in removals.iter().rev() {
        next.replace_range(*pos..*pos + *n, "");
    }

    let shift = |p: usize| -> usize {
        let removed: usize = removals
            .iter()
            .filter(|(pos, _)| *pos < p)
            .map(|(pos, n)| (*n).min(p - *pos))
            .sum();
        p - removed
    };

    TextEdit {
        text: next,
        selection_start: shift(start),
        selection_end: shift(end),
    }
}

fn continue_list(text: &str, start: usize, end: usize) -> TextEdit {
    let current_line = &text[line_start(text, start)..start];

    let mut insert = String::from("\n");
    match parse_marker(current_line) {
        // An empty item ends the list: the new line keeps only the indentation.
        Some((marker, prefix_len)) if current_line[prefix_len..].trim().is_empty() => {
            insert.push_str(marker.indent());
        }
        Some((marker, _)) => insert.push_str(&marker.continuation()),
        None => insert.push_str(leading_whitespace(current_line)),
    }

    insert_at_caret(text, start, end, &insert)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter_at_end(text: &str) -> TextEdit {
        apply_key(text, text.len(), text.len(), EditKey::Enter, true)
            .expect("enter should be handled")
    }

    #[test]
    fn test_edit_key_from_key() {
        assert_eq!(EditKey::from_key("Tab", false), Some(EditKey::Tab));
        assert_eq!(EditKey::from_key("Tab", true), Some(EditKey::ShiftTab));
        assert_eq!(EditKey::from_key("Enter", false), Some(EditKey::Enter));
        assert_eq!(EditKey::from_key("Enter", true), None);
        assert_eq!(EditKey::from_key("a", false), None);
    }

    #[test]
    fn test_parse_marker_priority() {
        let (m, len) = parse_marker("- [ ] task").expect("checkbox");
        assert_eq!(m, ListMarker::Checkbox { indent: "", bullet: '-' });
        assert_eq!(len, 6);

        let (m, len) = parse_marker("  * item").expect("bullet");
        assert_eq!(m, ListMarker::Bullet { indent: "  ", bullet: '*' });
        assert_eq!(len, 4);

        let (m, len) = parse_marker("12) step").expect("numbered");
        assert_eq!(
            m,
            ListMarker::Numbered {
                indent: "",
                number: 12,
                delimiter: ')'
            }
        );
        assert_eq!(len, 4);
    }

    #[test]
    fn test_parse_marker_rejects_non_markers() {
        assert!(parse_marker("plain text").is_none());
        assert!(parse_marker("-no space").is_none());
        assert!(parse_marker("3.no space").is_none());
        assert!(parse_marker("3 items").is_none());
        assert!(parse_marker("").is_none());
        assert!(parse_marker("-").is_none());
    }

    #[test]
    fn test_parse_marker_bullet_wins_over_malformed_checkbox() {
        let (m, _) = parse_marker("- [y] maybe").expect("bullet");
        assert_eq!(m, ListMarker::Bullet { indent: "", bullet: '-' });
    }

    #[test]
    fn test_enter_continues_bullet() {
        let edit = enter_at_end("- item");
        assert_eq!(edit.text, "- item\n- ");
        assert_eq!(edit.selection_start, edit.text.len());
        assert_eq!(edit.selection_end, edit.text.len());
    }

    #[test]
    fn test_enter_on_empty_bullet_exits_list() {
        let edit = enter_at_end("- a\n- ");
        assert_eq!(edit.text, "- a\n- \n");
        let last_line = edit.text.rsplit('\n').next().unwrap_or_default();
        assert!(parse_marker(last_line).is_none());
        assert_eq!(edit.selection_start, edit.text.len());
    }

    #[test]
    fn test_enter_increments_number() {
        let edit = enter_at_end("3. foo");
        assert_eq!(edit.text, "3. foo\n4. ");

        let edit = enter_at_end("9) bar");
        assert_eq!(edit.text, "9) bar\n10) ");
    }

    #[test]
    fn test_enter_on_empty_number_exits_keeping_indent() {
        let edit = enter_at_end("  4. ");
        assert_eq!(edit.text, "  4. \n  ");
    }

    #[test]
    fn test_enter_continues_checkbox_unchecked() {
        let edit = enter_at_end("- [x] done");
        assert_eq!(edit.text, "- [x] done\n- [ ] ");

        let edit = enter_at_end("  + [ ] todo");
        assert_eq!(edit.text, "  + [ ] todo\n  + [ ] ");
    }

    #[test]
    fn test_enter_on_empty_checkbox_exits() {
        let edit = enter_at_end("- [ ] ");
        assert_eq!(edit.text, "- [ ] \n");
    }

    #[test]
    fn test_enter_preserves_indent_of_nested_bullet() {
        let edit = enter_at_end("- a\n    - nested");
        assert!(edit.text.ends_with("\n    - nested\n    - "));
    }

    #[test]
    fn test_enter_plain_line_carries_indentation() {
        let edit = enter_at_end("    code");
        assert_eq!(edit.text, "    code\n    ");

        let edit = enter_at_end("text");
        assert_eq!(edit.text, "text\n");
    }

    #[test]
    fn test_enter_mid_line_splits_and_seeds_marker() {
        let text = "- abcdef";
        let edit = apply_key(text, 5, 5, EditKey::Enter, true).expect("handled");
        assert_eq!(edit.text, "- abc\n- def");
        assert_eq!(edit.selection_start, 8);
    }

    #[test]
    fn test_enter_replaces_selection() {
        let text = "1. keep drop";
        let edit = apply_key(text, 7, 12, EditKey::Enter, true).expect("handled");
        assert_eq!(edit.text, "1. keep\n2. ");
    }

    #[test]
    fn test_enter_in_second_line_only_looks_at_that_line() {
        let text = "- bullet\nplain";
        let edit = enter_at_end(text);
        assert_eq!(edit.text, "- bullet\nplain\n");
    }

    #[test]
    fn test_enter_passes_through_when_lists_disabled() {
        assert!(apply_key("- item", 6, 6, EditKey::Enter, false).is_none());
    }

    #[test]
    fn test_tab_without_selection_inserts_indent() {
        let edit = apply_key("ab", 1, 1, EditKey::Tab, true).expect("handled");
        assert_eq!(edit.text, "a  b");
        assert_eq!((edit.selection_start, edit.selection_end), (3, 3));
    }

    #[test]
    fn test_tab_with_multiline_selection_indents_only_selected_lines() {
        let text = "before\none\ntwo\nthree\nafter";
        let start = text.find("one").unwrap_or_default();
        let end = text.find("three").unwrap_or_default() + "three".len();

        let edit = apply_key(text, start, end, EditKey::Tab, true).expect("handled");
        assert_eq!(edit.text, "before\n  one\n  two\n  three\nafter");
        assert_eq!(edit.selection_start, start);
        assert_eq!(edit.selection_end, end + 3 * INDENT.len());
    }

    #[test]
    fn test_tab_selection_ending_after_newline_leaves_next_line() {
        let text = "one\ntwo\nthree";
        let end = "one\ntwo\n".len();
        let edit = apply_key(text, 0, end, EditKey::Tab, true).expect("handled");
        assert_eq!(edit.text, "  one\n  two\nthree");
        assert_eq!(edit.selection_end, end + 2 * INDENT.len());
    }

    #[test]
    fn test_tab_selection_starting_mid_line_indents_whole_line() {
        let text = "abc\ndef";
        let edit = apply_key(text, 1, 6, EditKey::Tab, true).expect("handled");
        assert_eq!(edit.text, "  abc\n  def");
        assert_eq!(edit.selection_start, 3);
        assert_eq!(edit.selection_end, 10);
    }

    #[test]
    fn test_tab_in_code_mode_still_indents() {
        let edit = apply_key("", 0, 0, EditKey::Tab, false).expect("handled");
        assert_eq!(edit.text, "  ");
    }

    #[test]
    fn test_shift_tab_outdents_current_line() {
        let text = "x\n    - item";
        let edit = apply_key(text, text.len(), text.len(), EditKey::ShiftTab, true)
            .expect("handled");
        assert_eq!(edit.text, "x\n  - item");
        assert_eq!(edit.selection_start, edit.text.len());
    }

    #[test]
    fn test_shift_tab_outdents_selection_partially() {
        let text = "  a\n b\nc";
        let edit = apply_key(text, 0, text.len(), EditKey::ShiftTab, true).expect("handled");
        assert_eq!(edit.text, "a\nb\nc");
        assert_eq!(edit.selection_start, 0);
        assert_eq!(edit.selection_end, edit.text.len());
    }

    #[test]
    fn test_shift_tab_caret_inside_removed_indent() {
        let text = "  abc";
        let edit = apply_key(text, 1, 1, EditKey::ShiftTab, true).expect("handled");
        assert_eq!(edit.text, "abc");
        assert_eq!(edit.selection_start, 0);
    }

    #[test]
    fn test_shift_tab_without_indent_is_noop() {
        let edit = apply_key("abc", 2, 2, EditKey::ShiftTab, true).expect("handled");
        assert_eq!(edit.text, "abc");
        assert_eq!(edit.selection_start, 2);
    }

    #[test]
    fn test_positions_are_clamped_to_char_boundaries() {
        let text = "- é";
        // 3 is inside the two-byte 'é'; the caret snaps back to 2.
        let edit = apply_key(text, 3, 3, EditKey::Enter, true).expect("handled");
        assert_eq!(edit.text, "- \né");

        let edit = apply_key(text, 99, 99, EditKey::Enter, true).expect("handled");
        assert_eq!(edit.text, "- é\n- ");
    }

    #[test]
    fn test_reversed_selection_is_normalized() {
        let text = "a\nb";
        let edit = apply_key(text, 3, 0, EditKey::Tab, true).expect("handled");
        assert_eq!(edit.text, "  a\n  b");
    }
}
