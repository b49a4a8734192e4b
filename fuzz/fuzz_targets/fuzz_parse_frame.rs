#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // parse_frame must return None (never panic) for arbitrary input,
    // including deeply nested or double-encoded payloads.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = kick_chat_client::parse_frame(s);
        let _ = kick_chat_client::replace_emote_tags(s);
    }
});
