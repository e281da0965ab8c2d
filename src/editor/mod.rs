mod lists;

pub(crate) use lists::{apply_key, EditKey, TextEdit};

use crate::models::NoteMode;
use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;

fn utf16_to_byte_idx(s: &str, pos_utf16: u32) -> usize {
    if pos_utf16 == 0 {
        return 0;
    }
    let mut acc: u32 = 0;
    for (i, ch) in s.char_indices() {
        let w = ch.len_utf16() as u32;
        if acc + w > pos_utf16 {
            return i;
        }
        acc += w;
        if acc == pos_utf16 {
            return i + ch.len_utf8();
        }
    }
    s.len()
}

fn byte_idx_to_utf16(s: &str, byte_idx: usize) -> u32 {
    s[..byte_idx.min(s.len())].encode_utf16().count() as u32
}

/// What the textarea should do with a key press.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    /// Let the browser handle the key.
    Native,
    /// Consume the key; the value does not change (e.g. outdenting an
    /// unindented line).
    Swallow,
    /// Replace the value and selection (UTF-16 offsets).
    Edit {
        text: String,
        selection_start: u32,
        selection_end: u32,
    },
}

/// Runs a key through the list rules using DOM (UTF-16) selection offsets.
pub(crate) fn handle_key(
    value: &str,
    selection_start_utf16: u32,
    selection_end_utf16: u32,
    key: EditKey,
    continue_lists: bool,
) -> KeyOutcome {
    let start = utf16_to_byte_idx(value, selection_start_utf16);
    let end = utf16_to_byte_idx(value, selection_end_utf16);

    let Some(TextEdit {
        text,
        selection_start,
        selection_end,
    }) = apply_key(value, start, end, key, continue_lists)
    else {
        return KeyOutcome::Native;
    };
    if text == value {
        return KeyOutcome::Swallow;
    }

    KeyOutcome::Edit {
        selection_start: byte_idx_to_utf16(&text, selection_start),
        selection_end: byte_idx_to_utf16(&text, selection_end),
        text,
    }
}

/// The note textarea.
///
/// Tab / Shift+Tab indent and outdent. In text mode Enter continues
/// checkbox, bullet and numbered lists. Every value change, typed or produced
/// by a key rule, is reported through `on_change`.
#[component]
pub fn NoteEditor(
    #[prop(into)] value: RwSignal<String>,
    #[prop(into)] mode: Signal<NoteMode>,
    #[prop(into)] on_change: Callback<String>,
    #[prop(into, optional)] class: String,
    #[prop(optional)] disabled: bool,
) -> impl IntoView {
    let textarea_ref: NodeRef<html::Textarea> = NodeRef::new();

    let on_input = move |ev: web_sys::Event| {
        let next = event_target_value(&ev);
        value.set(next.clone());
        on_change.run(next);
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.is_composing() || ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
            return;
        }
        let Some(key) = EditKey::from_key(&ev.key(), ev.shift_key()) else {
            return;
        };
        let Some(el) = textarea_ref.get_untracked() else {
            return;
        };

        let current = el.value();
        let start = el.selection_start().ok().flatten().unwrap_or(0);
        let end = el.selection_end().ok().flatten().unwrap_or(start);
        let continue_lists = mode.get_untracked() == NoteMode::Text;

        let (next, sel_start, sel_end) = match handle_key(&current, start, end, key, continue_lists) {
            KeyOutcome::Native => return,
            KeyOutcome::Swallow => {
                ev.prevent_default();
                return;
            }
            KeyOutcome::Edit {
                text,
                selection_start,
                selection_end,
            } => (text, selection_start, selection_end),
        };

        ev.prevent_default();
        el.set_value(&next);
        let _ = el.set_selection_range(sel_start, sel_end);
        value.set(next.clone());
        on_change.run(next);
    };

    let textarea_class = move || {
        let font = match mode.get() {
            NoteMode::Code => "font-mono text-[13px] leading-5 whitespace-pre overflow-x-auto",
            NoteMode::Text => "text-sm leading-6",
        };
        tw_merge!(
            "placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground w-full min-h-[60vh] resize-none rounded-md border border-input bg-transparent px-4 py-3 shadow-xs outline-none",
            "focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-2",
            "disabled:cursor-not-allowed disabled:opacity-50",
            font,
            class.clone()
        )
    };

    view! {
        <textarea
            data-name="NoteEditor"
            class=textarea_class
            placeholder="Start typing..."
            spellcheck=move || (mode.get() == NoteMode::Text).to_string()
            wrap=move || if mode.get() == NoteMode::Code { "off" } else { "soft" }
            autofocus=true
            disabled=disabled
            prop:value=move || value.get()
            on:input=on_input
            on:keydown=on_keydown
            node_ref=textarea_ref
        ></textarea>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_to_byte_idx_ascii() {
        assert_eq!(utf16_to_byte_idx("hello", 0), 0);
        assert_eq!(utf16_to_byte_idx("hello", 3), 3);
        assert_eq!(utf16_to_byte_idx("hello", 99), 5);
    }

    #[test]
    fn test_utf16_to_byte_idx_multibyte() {
        // 'é' is 2 bytes / 1 unit, '😀' is 4 bytes / 2 units.
        let s = "é😀x";
        assert_eq!(utf16_to_byte_idx(s, 1), 2);
        assert_eq!(utf16_to_byte_idx(s, 3), 6);
        assert_eq!(utf16_to_byte_idx(s, 4), 7);
        // Inside a surrogate pair snaps back to the char start.
        assert_eq!(utf16_to_byte_idx(s, 2), 2);
    }

    #[test]
    fn test_byte_idx_to_utf16() {
        let s = "é😀x";
        assert_eq!(byte_idx_to_utf16(s, 0), 0);
        assert_eq!(byte_idx_to_utf16(s, 2), 1);
        assert_eq!(byte_idx_to_utf16(s, 6), 3);
        assert_eq!(byte_idx_to_utf16(s, 100), 4);
    }

    #[test]
    fn test_handle_key_continues_bullet_after_emoji() {
        let value = "- 😀 party";
        let caret = value.encode_utf16().count() as u32;

        let KeyOutcome::Edit {
            text,
            selection_start,
            selection_end,
        } = handle_key(value, caret, caret, EditKey::Enter, true)
        else {
            panic!("enter on a list line should edit");
        };
        assert_eq!(text, "- 😀 party\n- ");
        assert_eq!(selection_start, text.encode_utf16().count() as u32);
        assert_eq!(selection_start, selection_end);
    }

    #[test]
    fn test_handle_key_enter_in_code_mode_is_native() {
        assert_eq!(handle_key("- item", 6, 6, EditKey::Enter, false), KeyOutcome::Native);
    }

    #[test]
    fn test_handle_key_tab_in_code_mode_still_indents() {
        assert_eq!(
            handle_key("fn main()", 0, 0, EditKey::Tab, false),
            KeyOutcome::Edit {
                text: "  fn main()".to_string(),
                selection_start: 2,
                selection_end: 2,
            }
        );
    }

    #[test]
    fn test_handle_key_checkbox_after_accented_text() {
        let value = "- [x] café";
        let caret = value.encode_utf16().count() as u32;
        let KeyOutcome::Edit { text, .. } = handle_key(value, caret, caret, EditKey::Enter, true)
        else {
            panic!("enter on a checkbox line should edit");
        };
        assert_eq!(text, "- [x] café\n- [ ] ");
    }

    #[test]
    fn test_outdent_without_indent_changes_nothing() {
        assert_eq!(handle_key("abc", 1, 1, EditKey::ShiftTab, true), KeyOutcome::Swallow);
        assert_eq!(handle_key("x\ny", 0, 3, EditKey::ShiftTab, false), KeyOutcome::Swallow);
    }
}
