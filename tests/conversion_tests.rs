//! Conversion and Diff Tests
//!
//! Reads stored documents of every layout and checks the normalized views,
//! the canonical encoding and the diffs between them.

use entity_schema::differ::DiffOp;
use entity_schema::{
    EntitySchemaDiffer, EntitySchemaEncoder, EntitySchemaId, EntitySchemaPatcher, FullArraySchemaData, NameBadge,
    SchemaConverter, SchemaError, SerializationVersion,
};

const V1: &str = include_str!("fixtures/v1.json");
const V2: &str = include_str!("fixtures/v2.json");
const V3: &str = include_str!("fixtures/v3.json");
const MALFORMED: &str = include_str!("fixtures/malformed.json");
const V1_UNTIDY: &str = include_str!("fixtures/v1_untidy.json");

const SCHEMA_TEXT: &str = "<human> { wdt:P31 [ wd:Q5 ] }";

fn e42() -> EntitySchemaId {
    EntitySchemaId::new("E42").unwrap()
}

// =============================================================================
// Layout Conversion Tests
// =============================================================================

#[test]
fn test_all_layouts_read_the_same() {
    let converter = SchemaConverter::new();
    let v1 = converter.get_full_array_schema_data(V1).unwrap();
    let v2 = converter.get_full_array_schema_data(V2).unwrap();
    let v3 = converter.get_full_array_schema_data(V3).unwrap();

    assert_eq!(v1, v3);
    assert_eq!(v2, v3);
    assert_eq!(v3.labels["de"], "Mensch");
    assert_eq!(v3.aliases["en"], vec!["person", "people"]);
}

#[test]
fn test_legacy_schema_key() {
    let converter = SchemaConverter::new();
    assert_eq!(converter.get_schema_text(V1).unwrap(), SCHEMA_TEXT);
    assert_eq!(converter.get_schema_text(V2).unwrap(), SCHEMA_TEXT);
}

#[test]
fn test_persistence_data_versions() {
    let converter = SchemaConverter::new();
    let expected = [
        (V1, SerializationVersion::V1),
        (V2, SerializationVersion::V2),
        (V3, SerializationVersion::V3),
    ];
    for (raw, version) in expected {
        let persisted = converter.get_persistence_schema_data(raw).unwrap();
        assert_eq!(persisted.version, version);
        assert_eq!(persisted.id.as_deref(), Some("E42"));
    }
}

#[test]
fn test_untagged_document_is_read_leniently() {
    let raw = r#"{"id":"E1","labels":{"en":"flat label"},"schemaText":"text"}"#;
    let data = SchemaConverter::new().get_full_array_schema_data(raw).unwrap();
    assert_eq!(data.labels["en"], "flat label");
    assert_eq!(data.schema_text, "text");
}

#[test]
fn test_malformed_document_is_an_error() {
    let result = SchemaConverter::new().get_full_array_schema_data(MALFORMED);
    assert!(matches!(result, Err(SchemaError::UnreadableSchemaData(_))));
}

#[test]
fn test_monolingual_view_of_missing_language() {
    let mono = SchemaConverter::new().get_monolingual_schema_data(V3, "ja").unwrap();
    assert_eq!(mono.name_badge, NameBadge::default());
    assert_eq!(mono.schema_text, SCHEMA_TEXT);
}

#[test]
fn test_full_view_adds_preferred_languages() {
    let view = SchemaConverter::new()
        .get_full_view_schema_data(V3, &["fr"])
        .unwrap();
    let languages: Vec<&str> = view.name_badges.keys().map(String::as_str).collect();
    assert_eq!(languages, vec!["de", "en", "fr"]);
    assert!(view.name_badges["fr"].is_empty());
    assert_eq!(view.name_badges["de"].description, "");
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_upgrade_produces_latest_layout() {
    let upgraded_v1 = EntitySchemaEncoder::upgrade(V1).unwrap();
    let upgraded_v3 = EntitySchemaEncoder::upgrade(V3).unwrap();
    assert_eq!(upgraded_v1, upgraded_v3);

    let value: serde_json::Value = serde_json::from_str(&upgraded_v1).unwrap();
    assert_eq!(value["serializationVersion"], "3.0");
    assert_eq!(value["schemaText"], SCHEMA_TEXT);
    assert!(value.get("schema").is_none());
}

#[test]
fn test_convert_write_convert_is_idempotent() {
    let converter = SchemaConverter::new();
    let original = converter.get_full_array_schema_data(V1).unwrap();

    let mut written = EntitySchemaEncoder::replace_schema_text(V1, &e42(), &original.schema_text).unwrap();
    for language in original.languages() {
        written =
            EntitySchemaEncoder::replace_name_badge(&written, &e42(), language, original.name_badge(language)).unwrap();
    }

    assert_eq!(converter.get_full_array_schema_data(&written).unwrap(), original);
}

#[test]
fn test_untidy_legacy_document_survives_upgrade() {
    let converter = SchemaConverter::new();
    let original = converter.get_full_array_schema_data(V1_UNTIDY).unwrap();
    assert_eq!(original.aliases["en"], vec!["person", "person", " people"]);

    let upgraded = EntitySchemaEncoder::upgrade(V1_UNTIDY).unwrap();
    assert_eq!(converter.get_full_array_schema_data(&upgraded).unwrap(), original);

    let retexted = EntitySchemaEncoder::replace_schema_text(V1_UNTIDY, &e42(), &original.schema_text).unwrap();
    assert_eq!(converter.get_full_array_schema_data(&retexted).unwrap(), original);
}

#[test]
fn test_badge_write_leaves_other_untidy_languages_alone() {
    let converter = SchemaConverter::new();
    let original = converter.get_full_array_schema_data(V1_UNTIDY).unwrap();

    let written =
        EntitySchemaEncoder::replace_name_badge(V1_UNTIDY, &e42(), "fr", NameBadge::new("humain", "", vec![])).unwrap();
    let mut expected = original.clone();
    expected.labels.insert("fr".to_string(), "humain".to_string());
    assert_eq!(converter.get_full_array_schema_data(&written).unwrap(), expected);

    // a stored language that would not pass as new input can still be edited
    let written =
        EntitySchemaEncoder::replace_name_badge(V1_UNTIDY, &e42(), "de-CH", original.name_badge("de-CH"))
            .unwrap();
    assert_eq!(converter.get_full_array_schema_data(&written).unwrap(), original);
}

#[test]
fn test_empty_label_reads_back_as_undefined() {
    let written = EntitySchemaEncoder::replace_name_badge(
        V3,
        &e42(),
        "de",
        NameBadge::new("", "", vec![]),
    )
    .unwrap();

    let data = SchemaConverter::new().get_full_array_schema_data(&written).unwrap();
    assert!(!data.labels.contains_key("de"));
    assert_eq!(data.labels["en"], "human");
}

// =============================================================================
// Diff Tests
// =============================================================================

#[test]
fn test_diff_with_itself_is_empty() {
    let differ = EntitySchemaDiffer::new();
    for raw in [V1, V2, V3] {
        assert!(differ.diff_operations(raw, raw).unwrap().is_empty());
    }
    // same data, different layouts
    assert!(differ.diff_contents(V1, V3).unwrap().is_empty());
}

#[test]
fn test_label_and_alias_diff() {
    let old = r#"{"serializationVersion":"3.0","labels":{"en":"A"},"aliases":{"en":["x"]},"schemaText":"foo"}"#;
    let new = r#"{"serializationVersion":"3.0","labels":{"en":"B"},"aliases":{"en":["x","y"]},"schemaText":"foo"}"#;
    let diff = EntitySchemaDiffer::new().diff_contents(old, new).unwrap();

    assert_eq!(
        diff.labels["en"],
        DiffOp::Change {
            old: "A".to_string(),
            new: "B".to_string()
        }
    );
    assert_eq!(
        diff.aliases["en"],
        DiffOp::Change {
            old: vec!["x".to_string()],
            new: vec!["x".to_string(), "y".to_string()]
        }
    );
    assert!(diff.schema_text.is_none());
    assert!(diff.descriptions.is_empty());
}

#[test]
fn test_reverse_diff_restores_old_data() {
    let converter = SchemaConverter::new();
    let old = converter.get_full_array_schema_data(V3).unwrap();
    let mut new = old.clone();
    new.set_name_badge("en", NameBadge::new("person", "", vec!["human".to_string()]));
    new.schema_text = String::new();

    let diff = EntitySchemaDiffer::new().diff_schemas(&old, &new);
    let restored: FullArraySchemaData = EntitySchemaPatcher::new().patch_schema(&new, &diff.reverse()).unwrap();
    assert_eq!(restored, old);
}
