#![no_main]

use libfuzzer_sys::fuzz_target;
use modkit_odata_uri::PathSegmenter;

const BASE: &str = "http://host/svc/";

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid OOM on pathological inputs
    if data.len() > 1024 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let segmenter = PathSegmenter::default();
        let limit = segmenter.config().max_segments;
        match segmenter.segment(&format!("{BASE}{s}"), BASE) {
            Ok(segments) => {
                assert!(segments.len() <= limit);
                assert!(segments.iter().all(|segment| !segment.is_empty()));
            }
            Err(err) => assert!(err.is_uri_syntax(), "{err}"),
        }
        // Arbitrary request against arbitrary base must not panic either
        let _ = segmenter.segment(s, s);
    }
});
