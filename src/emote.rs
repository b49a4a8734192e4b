//! Emote-tag normalization for chat message content.
//!
//! Kick encodes graphical emotes inline as `[emote:<id>:<name>]` markers,
//! e.g. `[emote:37226:KEKW]`. When plain-text output is enabled the client
//! rewrites every marker to just `<name>` before delivering the message.
//!
//! The replacer is an explicit scanner over the fixed tag grammar
//! (`[emote:` digits `:` word characters `]`) rather than a regex; anything
//! that does not match the grammar exactly is left untouched.

const TAG_PREFIX: &str = "[emote:";

/// Replace every well-formed `[emote:<id>:<name>]` marker in `content` with
/// plain `<name>`. Pure and total: malformed markers and all other text are
/// copied through unchanged.
pub fn replace_emote_tags(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find(TAG_PREFIX) {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);

        match match_emote_tag(tail) {
            Some((name, tag_len)) => {
                out.push_str(name);
                rest = tail.get(tag_len..).unwrap_or("");
            }
            None => {
                // Not a valid tag — emit the prefix literally and rescan
                // right after it, so overlapping candidates are still found.
                out.push_str(TAG_PREFIX);
                rest = tail.get(TAG_PREFIX.len()..).unwrap_or("");
            }
        }
    }

    out.push_str(rest);
    out
}

/// Match a complete emote tag at the start of `s`.
///
/// Returns the emote name and the byte length of the full tag, or `None`
/// when the text after `[emote:` does not satisfy the grammar.
fn match_emote_tag(s: &str) -> Option<(&str, usize)> {
    let body = s.strip_prefix(TAG_PREFIX)?;
    let (id, after_id) = body.split_once(':')?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (name, _) = after_id.split_once(']')?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    let tag_len = TAG_PREFIX.len() + id.len() + 1 + name.len() + 1;
    Some((name, tag_len))
}
