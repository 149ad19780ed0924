#![no_main]

use libfuzzer_sys::fuzz_target;
use modkit_odata_uri::percent_decode_lenient;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let decoded = percent_decode_lenient(s);
        // Decoding only ever shrinks the text
        assert!(decoded.len() <= s.len());
    }
});
