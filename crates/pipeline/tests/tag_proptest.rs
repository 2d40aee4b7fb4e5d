//! Property tests for artifact tags.

use proptest::prelude::*;
use qovery_pipeline::{ArtifactTag, RandomTag, TagGenerator};

proptest! {
    #[test]
    fn valid_tags_parse_and_name_their_preview(tag in "[a-z0-9]{7}") {
        let parsed = ArtifactTag::parse(tag.clone()).unwrap();
        prop_assert_eq!(parsed.as_str(), tag.as_str());
        prop_assert_eq!(parsed.preview_environment(), format!("preview-{tag}"));
    }

    #[test]
    fn wrong_length_is_rejected(tag in "[a-z0-9]{0,6}|[a-z0-9]{8,12}") {
        prop_assert!(ArtifactTag::parse(tag).is_err());
    }

    #[test]
    fn foreign_characters_are_rejected(
        prefix in "[a-z0-9]{0,6}",
        bad in "[A-Z_./:-]",
    ) {
        let mut tag = prefix;
        tag.push_str(&bad);
        while tag.len() < 7 {
            tag.push('a');
        }
        prop_assert!(ArtifactTag::parse(tag).is_err());
    }

    #[test]
    fn generated_tags_always_parse(_round in 0u8..64) {
        let tag = RandomTag.generate().unwrap();
        prop_assert!(ArtifactTag::parse(tag.as_str()).is_ok());
    }
}
