//! Property tests for message templates.

use proptest::prelude::*;

use kiln::domain::value_objects::messages;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: formatting never panics, whatever the arguments contain.
    #[test]
    fn property_format_never_panics(a in "(?s).{0,32}", b in "(?s).{0,32}") {
        let _ = messages::COULD_NOT_WRITE_FILE.format(&[&a, &b]);
        let _ = messages::TOKEN_EXPECTED.format(&[]);
    }

    /// PROPERTY: arguments are inserted verbatim, braces included.
    #[test]
    fn property_arguments_inserted_verbatim(name in "[{}a-z/.]{0,16}", reason in "[{}0-9 ]{0,16}") {
        let text = messages::COULD_NOT_WRITE_FILE.format(&[&name, &reason]);
        prop_assert_eq!(text, format!("Could not write file '{name}': {reason}."));
    }
}
