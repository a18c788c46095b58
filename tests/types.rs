// ABOUTME: Integration tests for type-safe identifiers and validated types.
// ABOUTME: Tests parsing, validation, ordering, and URI normalization.

use ecs_runtime::descriptor::{
    BasicContainerDescriptor, DescriptorError, Identifiable, LoadDescriptor, Located, Stateful,
    Versioned,
};
use ecs_runtime::remote::names::fix_id;
use ecs_runtime::state::ContainerState;
use ecs_runtime::types::*;
use proptest::prelude::*;

mod version_tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parse_dotted_with_qualifier() {
        let version = v("1.2.3-SNAPSHOT");
        assert_eq!(version.segments(), &[1, 2, 3]);
        assert_eq!(version.qualifier(), Some("SNAPSHOT"));
        assert_eq!(version.to_string(), "1.2.3-SNAPSHOT");
    }

    #[test]
    fn reject_malformed() {
        assert_eq!(Version::parse(""), Err(ParseVersionError::Empty));
        assert_eq!(Version::parse("1.0-"), Err(ParseVersionError::EmptyQualifier));
        assert!(matches!(
            Version::parse("1.x"),
            Err(ParseVersionError::InvalidSegment(s)) if s == "x"
        ));
        assert!(Version::parse("1..2").is_err());
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("2") > v("1.99.99"));
        assert_eq!(v("1.0"), v("1.0.0"));
        assert!(v("1.0.0-rc1") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));
    }

    #[test]
    fn yaml_whole_numbers_and_strings_are_accepted() {
        let version: Version = serde_yaml::from_str("3").unwrap();
        assert_eq!(version, v("3"));
        let version: Version = serde_yaml::from_str("\"1.10\"").unwrap();
        assert_eq!(version.to_string(), "1.10");
        let version: Version = serde_yaml::from_str("\"2.0.1\"").unwrap();
        assert_eq!(version, v("2.0.1"));
        assert!(serde_yaml::from_str::<Version>("[1, 2]").is_err());
    }

    #[test]
    fn unquoted_yaml_floats_are_rejected() {
        for input in ["1.10", "1.5", "1.0"] {
            let err = serde_yaml::from_str::<Version>(input).unwrap_err();
            assert!(err.to_string().contains("quote"), "{input}: {err}");
        }
    }
}

mod uri_tests {
    use super::*;

    #[test]
    fn equivalent_spellings_compare_equal() {
        let a = ContainerUri::parse("FILE:///tmp/./a.zip").unwrap();
        let b = ContainerUri::parse("file:///tmp/a.zip").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "file:///tmp/a.zip");

        let c = ContainerUri::parse("HTTP://Example.COM/x/../a.zip").unwrap();
        assert_eq!(c.as_str(), "http://example.com/a.zip");
    }

    #[test]
    fn reject_empty_and_relative() {
        assert_eq!(ContainerUri::parse("  "), Err(ParseUriError::Empty));
        assert!(matches!(
            ContainerUri::parse("a.zip"),
            Err(ParseUriError::Invalid { .. })
        ));
    }

    #[test]
    fn file_paths_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.yml");
        let uri = ContainerUri::from_file_path(&path).unwrap();
        assert_eq!(uri.scheme(), "file");
        assert_eq!(uri.to_file_path().unwrap(), path);

        let http = ContainerUri::parse("http://example.com/demo.yml").unwrap();
        assert!(http.to_file_path().is_none());
    }
}

mod id_tests {
    use super::*;

    #[test]
    fn reject_blank() {
        assert!(ContainerId::new("").is_err());
        assert!(ResourceId::new("   ").is_err());
        assert_eq!(ContainerId::new("c1").unwrap().as_str(), "c1");
    }

    #[test]
    fn serde_validates() {
        let id: ResourceId = serde_yaml::from_str("edge-1").unwrap();
        assert_eq!(id.to_string(), "edge-1");
        assert!(serde_yaml::from_str::<ResourceId>("\"\"").is_err());
    }
}

mod descriptor_tests {
    use super::*;

    fn location() -> ContainerUri {
        ContainerUri::parse("file:///tmp/demo.yml").unwrap()
    }

    #[test]
    fn load_takes_uri_from_location() {
        let yaml = "id: c1\nname: demo\nversion: 1.0.0\nuri: http://elsewhere/x\nstate: DEPLOYED\n";
        let d = BasicContainerDescriptor::from_yaml(yaml, &location()).unwrap();
        assert_eq!(d.id().as_str(), "c1");
        assert_eq!(d.version().to_string(), "1.0.0");
        assert_eq!(d.uri(), &location());
        assert_eq!(d.state(), ContainerState::Available);
    }

    #[test]
    fn load_validates_identity() {
        let err = BasicContainerDescriptor::from_yaml("id: \"\"\nname: demo\nversion: 1\n", &location())
            .unwrap_err();
        assert!(matches!(err, DescriptorError::EmptyId));

        let err = BasicContainerDescriptor::from_yaml("id: c1\nversion: 1\n", &location())
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }));
    }

    #[test]
    fn load_rejects_float_version() {
        let err = BasicContainerDescriptor::from_yaml("id: c1\nname: demo\nversion: 1.10\n", &location())
            .unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }), "{err}");
        assert!(err.to_string().contains("quote"), "{err}");
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let d = BasicContainerDescriptor::new(
            "c1",
            "demo",
            Version::parse("1.0").unwrap(),
            "file:///tmp/demo.zip",
        )
        .unwrap();
        let yaml = serde_yaml::to_string(&d).unwrap();
        let back: BasicContainerDescriptor = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, d);

        let tampered = yaml.replace("name: demo", "name: ''");
        assert!(serde_yaml::from_str::<BasicContainerDescriptor>(&tampered).is_err());
    }

    #[test]
    fn set_uri_rejects_empty() {
        let mut d = BasicContainerDescriptor::new(
            "c1",
            "demo",
            Version::parse("1.0").unwrap(),
            "file:///a.zip",
        )
        .unwrap();
        assert!(matches!(
            d.set_uri(""),
            Err(DescriptorError::InvalidArgument(_))
        ));
        d.set_uri("FILE:///b.zip").unwrap();
        assert_eq!(d.uri().as_str(), "file:///b.zip");
    }
}

proptest! {
    #[test]
    fn fix_id_yields_identifier(id in "\\PC{1,24}") {
        let fixed = fix_id(&id);
        let mut chars = fixed.chars();
        prop_assert!(chars.next().is_some_and(char::is_alphabetic));
        prop_assert!(fixed.chars().all(|c| c.is_alphanumeric() || c == '_'));
    }

    #[test]
    fn fix_id_is_idempotent(id in "[a-zA-Z0-9_.:/-]{1,24}") {
        let once = fix_id(&id);
        prop_assert_eq!(fix_id(&once), once.clone());
    }

    #[test]
    fn version_display_parses_back(
        segments in proptest::collection::vec(0u64..10_000, 1..5),
        qualifier in proptest::option::of("[A-Za-z0-9]{1,8}"),
    ) {
        let mut text = segments.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
        if let Some(q) = &qualifier {
            text.push('-');
            text.push_str(q);
        }
        let version = Version::parse(&text).unwrap();
        prop_assert_eq!(version.to_string(), text);
        prop_assert_eq!(version.segments(), segments.as_slice());
    }
}
