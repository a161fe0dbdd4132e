use std::fs;
use std::sync::OnceLock;

use approx::assert_relative_eq;
use dossier_dedupe::{compare, compare_scores, xref, BlockingIndex, CompareWeights, NAME_PENALTY};
use dossier_model::{EntityProxy, Model, DEFAULT_SCHEMA_YAML};

fn model() -> &'static Model {
    static MODEL: OnceLock<Model> = OnceLock::new();
    MODEL.get_or_init(|| Model::from_yaml_str(DEFAULT_SCHEMA_YAML).expect("bundled schema builds"))
}

fn entity(schema: &str, id: &str, props: &[(&str, &str)]) -> EntityProxy<'static> {
    let mut proxy = model().make_entity(schema).unwrap();
    proxy.set_id(Some(id.to_string()));
    for (prop, value) in props {
        proxy.add(*prop, [*value]).unwrap();
    }
    proxy
}

fn jane() -> EntityProxy<'static> {
    entity(
        "Person",
        "jane",
        &[
            ("name", "Jane Doe"),
            ("nationality", "de"),
            ("email", "jane@example.com"),
            ("birthDate", "1980-05-01"),
        ],
    )
}

#[test]
fn an_entity_matches_itself_better_than_a_stranger() {
    let weights = CompareWeights::default();
    let a = jane();
    let stranger = entity(
        "Person",
        "max",
        &[("name", "Maximilian Mustermann"), ("nationality", "fr")],
    );
    let same = compare(model(), &a, &a, &weights);
    let other = compare(model(), &a, &stranger, &weights);
    assert!(same > 0.99, "self score {same}");
    assert!(same > other);
    assert!(other < 0.5, "stranger score {other}");
}

#[test]
fn unrelated_schemata_score_zero() {
    let vessel = entity("Vessel", "v1", &[("name", "Jane Doe")]);
    assert!(compare_scores(model(), &jane(), &vessel).is_empty());
    assert_eq!(compare(model(), &jane(), &vessel, &CompareWeights::default()), 0.0);
}

#[test]
fn compatible_schemata_are_scored() {
    let company = entity("Company", "c1", &[("name", "Jane Doe"), ("jurisdiction", "de")]);
    let scores = compare_scores(model(), &jane(), &company);
    assert_relative_eq!(scores["names"], (-NAME_PENALTY * 3.0).exp());
    assert_relative_eq!(scores["countries"], 1.0);
}

#[test]
fn one_sided_groups_contribute_nothing() {
    let bare = entity("Person", "j2", &[("name", "Jane Doe")]);
    let scores = compare_scores(model(), &jane(), &bare);
    assert!(scores.contains_key("names"));
    assert!(!scores.contains_key("emails"));
    assert!(!scores.contains_key("dates"));
    assert!(!scores.contains_key("countries"));

    let weights = CompareWeights::default();
    let total = weights.names * scores["names"] + weights.bias;
    let expected = 1.0 / (1.0 + (-total).exp());
    assert_relative_eq!(compare(model(), &jane(), &bare, &weights), expected, epsilon = 1e-9);
}

#[test]
fn country_overlap_is_jaccard() {
    let left = entity("Person", "l", &[("nationality", "de"), ("citizenship", "fr")]);
    let right = entity("Person", "r", &[("nationality", "de")]);
    let scores = compare_scores(model(), &left, &right);
    assert_relative_eq!(scores["countries"], 0.5);
}

#[test]
fn weights_load_from_yaml_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = dir.path().join("weights.yaml");
    fs::write(&yaml, "names: 10.0\nbias: -3.0\n").unwrap();
    let weights = CompareWeights::from_path(&yaml).unwrap();
    assert_relative_eq!(weights.names, 10.0);
    assert_relative_eq!(weights.bias, -3.0);
    assert_relative_eq!(weights.emails, CompareWeights::default().emails);

    let json = dir.path().join("weights.json");
    fs::write(&json, r#"{"phones": 0.5}"#).unwrap();
    let weights = CompareWeights::from_path(&json).unwrap();
    assert_relative_eq!(weights.phones, 0.5);
    assert_relative_eq!(weights.names, 6.0);
}

#[test]
fn weight_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = CompareWeights::from_path(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{names").unwrap();
    let err = CompareWeights::from_path(&broken).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn blocking_pairs_entities_sharing_tokens() {
    let entities = vec![
        entity("Person", "a", &[("name", "Jane Doe")]),
        entity("Person", "b", &[("name", "Doe, Jane")]),
        entity("Person", "c", &[("name", "Max Power")]),
    ];
    let index = BlockingIndex::build(&entities);
    assert_eq!(index.bucket("names:jane").map(|b| b.len()), Some(2));
    let pairs = index.pairs();
    assert_eq!(pairs.len(), 1);
    assert_eq!((pairs[0].0, pairs[0].1), (0, 1));
}

#[test]
fn oversized_blocks_are_skipped() {
    let entities: Vec<EntityProxy<'static>> = (0..5)
        .map(|i| entity("Person", &format!("p{i}"), &[("name", "Common Name")]))
        .collect();
    let mut index = BlockingIndex::new(3);
    for (i, e) in entities.iter().enumerate() {
        index.index(i, e);
    }
    assert!(index.pairs().is_empty());
}

#[test]
fn xref_ranks_the_duplicate_first() {
    let entities = vec![
        jane(),
        entity("Person", "jane-2", &[("name", "Jane Doe"), ("nationality", "de")]),
        entity("Person", "joan", &[("name", "Joan Doe"), ("nationality", "us")]),
        entity("Vessel", "ship", &[("name", "Jane Doe")]),
    ];
    let matches = xref(model(), &entities, &CompareWeights::default(), 10);
    assert!(!matches.is_empty());
    assert_eq!(matches[0].key(), ("jane", "jane-2"));
    assert!(matches.iter().all(|m| m.left != "ship" && m.right != "ship"));
    assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));

    let top = xref(model(), &entities, &CompareWeights::default(), 1);
    assert_eq!(top.len(), 1);
}
