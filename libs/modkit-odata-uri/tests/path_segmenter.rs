use modkit_odata_uri::{segment_path, Error, PathSegmenter, PathSegmenterConfig};

const BASE: &str = "http://host/";

fn segment(path: &str) -> Vec<String> {
    PathSegmenter::default()
        .segment(&format!("{BASE}{path}"), BASE)
        .unwrap()
}

#[test]
fn test_plain_segments() {
    assert_eq!(segment("One/Two/Three"), ["One", "Two", "Three"]);
}

#[test]
fn test_empty_segments_are_dropped() {
    assert_eq!(segment("One////Three"), ["One", "Three"]);
}

#[test]
fn test_slash_inside_key_literal() {
    assert_eq!(segment("EntitySet('string/key')"), ["EntitySet('string/key')"]);
    assert_eq!(
        segment("Categories('Smartphone/Tablet')"),
        ["Categories('Smartphone/Tablet')"]
    );
}

#[test]
fn test_item_by_path_escape() {
    assert_eq!(segment("root:/abc:/property"), ["root:", "abc:", "property"]);
}

#[test]
fn test_encoded_slashes_are_decoded_after_splitting() {
    assert_eq!(
        segment("root:/photos%2f2018%2fFebruary/Others"),
        ["root:", "photos/2018/February", "Others"]
    );
}

#[test]
fn test_raw_and_encoded_quotes_agree() {
    assert_eq!(segment("People('O''Neil')"), ["People('O''Neil')"]);
    assert_eq!(segment("People(%27O%27%27Neil%27)"), ["People('O''Neil')"]);
}

#[test]
fn test_mixed_quote_spellings_decode_alike() {
    assert_eq!(segment("People('O%27%27Neil')"), ["People('O''Neil')"]);
    assert_eq!(segment("People(%27O''Neil%27)"), ["People('O''Neil')"]);
}

#[test]
fn test_encoded_parentheses_decode_to_literal_ones() {
    assert_eq!(segment("People%28'a/b'%29/X"), ["People('a/b')", "X"]);
    assert_eq!(segment("People%28%27a/b%27%29"), ["People('a/b')"]);
}

#[test]
fn test_apostrophe_in_a_word_stays_in_its_segment() {
    assert_eq!(
        segment("Products/Bob's/Stuff('x')"),
        ["Products", "Bob's", "Stuff('x')"]
    );
}

#[test]
fn test_segment_limit() {
    let err = segment_path("http://host/A/B/C", BASE, 2).unwrap_err();
    assert_eq!(err, Error::TooManySegments { count: 3, max: 2 });
    assert!(err.is_uri_syntax());

    assert_eq!(segment_path("http://host/A/B", BASE, 2).unwrap(), ["A", "B"]);
}

#[test]
fn test_query_and_fragment_are_ignored() {
    assert_eq!(
        segment("People?$filter=Name eq 'a/b'&$top=1#frag"),
        ["People"]
    );
}

#[test]
fn test_base_path_is_stripped() {
    let segments = PathSegmenter::default()
        .segment("http://host/odata/v4/People(1)/Friends", "http://host/odata/v4/")
        .unwrap();
    assert_eq!(segments, ["People(1)", "Friends"]);

    // Base path match ignores case
    let segments = PathSegmenter::default()
        .segment("http://HOST/OData/People", "http://host/odata")
        .unwrap();
    assert_eq!(segments, ["People"]);
}

#[test]
fn test_base_path_spellings_are_normalized() {
    let segmenter = PathSegmenter::default();
    for (request, base) in [
        ("http://host/s\tvc/A", "http://host/svc/"),
        ("http://host/svc/A", "http://host/s\nvc/"),
        ("http://host/my%20svc/A", "http://host/my svc/"),
        ("http://host/my svc/A", "http://host/my%20svc/"),
        ("http://host/%73vc/A", "http://host/svc"),
        ("http://host\\svc\\A", "http://host/svc/"),
        ("http://host/svc/A", "http:\\\\host\\svc"),
    ] {
        assert_eq!(
            segmenter.segment(request, base).unwrap(),
            ["A"],
            "{request:?} vs {base:?}"
        );
    }
}

#[test]
fn test_encoded_slash_in_base_path_is_not_a_separator() {
    let err = PathSegmenter::default()
        .segment("http://host/a/b/C", "http://host/a%2Fb/")
        .unwrap_err();
    assert!(matches!(err, Error::BaseUriMismatch { .. }));
}

#[test]
fn test_kept_control_characters_must_match_the_base() {
    let keep = PathSegmenter::new(PathSegmenterConfig::new().with_drop_raw_control_chars(false)).unwrap();
    let err = keep.segment("http://host/s\u{7}vc/A", "http://host/svc/").unwrap_err();
    assert!(matches!(err, Error::BaseUriMismatch { .. }));
}

#[test]
fn test_service_root_alone_has_no_segments() {
    assert!(PathSegmenter::default()
        .segment("http://host/svc/", "http://host/svc/")
        .unwrap()
        .is_empty());
}

#[test]
fn test_base_mismatch() {
    let segmenter = PathSegmenter::default();
    for (request, base) in [
        ("https://host/svc/People", "http://host/svc/"),
        ("http://other/svc/People", "http://host/svc/"),
        ("http://host:8080/svc/People", "http://host/svc/"),
        ("http://host/other/People", "http://host/svc/"),
        ("http://host/svcx/People", "http://host/svc/"),
    ] {
        let err = segmenter.segment(request, base).unwrap_err();
        assert!(
            matches!(err, Error::BaseUriMismatch { .. }),
            "{request} vs {base}: {err:?}"
        );
    }
}

#[test]
fn test_default_port_matches_implicit_port() {
    let segments = PathSegmenter::default()
        .segment("http://host:80/svc/People", "http://host/svc/")
        .unwrap();
    assert_eq!(segments, ["People"]);
}

#[test]
fn test_relative_request_and_base() {
    let segmenter = PathSegmenter::default();
    assert_eq!(
        segmenter.segment("/svc/People(1)/Name", "/svc/").unwrap(),
        ["People(1)", "Name"]
    );
    assert_eq!(segmenter.segment("People/$count", "/").unwrap(), ["People", "$count"]);
}

#[test]
fn test_relative_request_against_absolute_base_mismatches() {
    let err = PathSegmenter::default()
        .segment("/svc/People", "http://host/svc/")
        .unwrap_err();
    assert!(matches!(err, Error::BaseUriMismatch { .. }));
}

#[test]
fn test_malformed_uri() {
    let err = PathSegmenter::default()
        .segment("http://[::1/People", BASE)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedUri { .. }), "{err:?}");
}

#[test]
fn test_lenient_decoding_never_fails() {
    assert_eq!(segment("A%zzB/%E2%82%AC/%FF"), ["A%zzB", "\u{20ac}", "%FF"]);
}

#[test]
fn test_raw_control_characters() {
    let uri = "http://host/On\u{7}e/Two";
    assert_eq!(PathSegmenter::default().segment(uri, BASE).unwrap(), ["One", "Two"]);

    let keep = PathSegmenter::new(PathSegmenterConfig::new().with_drop_raw_control_chars(false)).unwrap();
    assert_eq!(keep.segment(uri, BASE).unwrap(), ["On\u{7}e", "Two"]);

    // Encoded control characters are data, not noise.
    assert_eq!(segment("On%07e"), ["On\u{7}e"]);
}

#[test]
fn test_segmenter_is_reentrant() {
    let segmenter = PathSegmenter::default();
    std::thread::scope(|s| {
        for i in 0..8 {
            let segmenter = &segmenter;
            s.spawn(move || {
                let uri = format!("http://host/Items({i})/Name");
                assert_eq!(
                    segmenter.segment(&uri, BASE).unwrap(),
                    [format!("Items({i})"), "Name".to_owned()]
                );
            });
        }
    });
}
