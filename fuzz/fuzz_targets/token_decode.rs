#![no_main]

use libfuzzer_sys::fuzz_target;
use pwseal_core::KeyMaterial;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(key) = KeyMaterial::from_bytes(&[0x42; 32]) else {
        return;
    };
    let _ = pwseal_core::decode_token(token, &key);
    let _ = pwseal_core::decode_token_with_ttl(token, &key, 60, 1_700_000_000);
});
