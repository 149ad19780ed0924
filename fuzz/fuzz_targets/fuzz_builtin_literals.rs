#![no_main]

use libfuzzer_sys::fuzz_target;
use modkit_odata_uri::{BuiltinLiteralParser, EdmPrimitiveKind, LiteralParser, TypeRef};

fuzz_target!(|data: &[u8]| {
    if data.len() > 256 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        for &kind in EdmPrimitiveKind::ALL {
            // Every primitive target gives a definite answer, never "not applicable"
            let result = BuiltinLiteralParser.parse(s, &TypeRef::primitive(kind, true));
            assert!(!matches!(result, Ok(None)));
        }
    }
});
