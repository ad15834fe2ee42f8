//! Property tests for path normalization.

use proptest::prelude::*;

use kiln::domain::value_objects::path::{convert_to_relative_path, normalize_path, normalized_absolute_path};

fn relative_path() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        3 => proptest::string::string_regex("[A-Za-z0-9_-]{1,8}").unwrap(),
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
    ];
    proptest::collection::vec(segment, 1..=6).prop_map(|segments| segments.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: normalization never panics on arbitrary input.
    #[test]
    fn property_normalize_never_panics(s in "(?s).{0,128}") {
        let _ = normalize_path(&s);
    }

    /// PROPERTY: normalizing is idempotent.
    #[test]
    fn property_normalize_idempotent(path in relative_path()) {
        let once = normalize_path(&path);
        prop_assert_eq!(normalize_path(&once), once);
    }

    /// PROPERTY: absolute results stay under the root and never keep `.` or `..`.
    #[test]
    fn property_absolute_has_no_dot_segments(path in relative_path()) {
        let absolute = normalized_absolute_path(&path, "/work/project");
        prop_assert!(absolute.starts_with('/'));
        prop_assert!(absolute.split('/').all(|part| part != "." && part != ".."));
    }

    /// PROPERTY: a relative name resolves back to the same absolute path.
    #[test]
    fn property_relative_round_trips(path in relative_path()) {
        let absolute = normalized_absolute_path(&path, "/work/project");
        let relative = convert_to_relative_path(&absolute, "/work/project", |f| f.to_string());
        prop_assert_eq!(normalized_absolute_path(&relative, "/work/project"), absolute);
    }
}
