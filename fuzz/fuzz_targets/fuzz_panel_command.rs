#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<arena_scoring_client::protocol::PanelCommand>(data);

    if let Ok(s) = std::str::from_utf8(data) {
        let _ = serde_json::from_str::<arena_scoring_client::protocol::PanelCommand>(s);
    }
});
