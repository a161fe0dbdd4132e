use dossier_model::helpers::{inline_names, remove_checksums, simplify_dates};
use dossier_model::{
    AddOptions, DataError, EntityData, EntityView, Model, Namespace, DEFAULT_SCHEMA_YAML,
};
use dossier_types::DEFAULT_MAX_SIZE;
use proptest::prelude::*;
use std::sync::OnceLock;

fn model() -> &'static Model {
    static MODEL: OnceLock<Model> = OnceLock::new();
    MODEL.get_or_init(|| Model::from_yaml_str(DEFAULT_SCHEMA_YAML).expect("bundled schema builds"))
}

#[test]
fn end_to_end_person() {
    let mut person = model().make_entity("Person").unwrap();
    person.make_id(["ralph", "tester"]);
    person
        .add("name", ["Ralph Tester", "Ralph Tester", "Ralf Tester"])
        .unwrap();
    person.add("phone", ["+12025557612", "+12025557612"]).unwrap();
    assert_eq!(person.get("name").unwrap(), ["Ralf Tester", "Ralph Tester"]);
    assert_eq!(person.get("phone").unwrap(), ["+12025557612"]);
    assert_eq!(person.len(), 3);
}

#[test]
fn duplicate_names_are_stored_once() {
    let mut company = model().make_entity("Company").unwrap();
    company.add("name", ["ACME, Inc.", "ACME, Inc."]).unwrap();
    assert_eq!(company.get("name").unwrap(), ["ACME, Inc."]);
}

#[test]
fn phone_numbers_need_a_country_context() {
    let mut person = model().make_entity("Person").unwrap();
    person.add("phone", ["+1 (202) 555-7612"]).unwrap();
    assert_eq!(person.get("phone").unwrap(), ["+12025557612"]);

    let mut local = model().make_entity("Person").unwrap();
    local.add("phone", ["(202) 555-7612"]).unwrap();
    assert!(local.get("phone").unwrap().is_empty());

    local.add("nationality", ["United States"]).unwrap();
    local.add("phone", ["(202) 555-7612"]).unwrap();
    assert_eq!(local.get("phone").unwrap(), ["+12025557612"]);
}

#[test]
fn invalid_values_are_dropped_silently() {
    let mut person = model().make_entity("Person").unwrap();
    person.add("birthDate", ["yesterday", "", "1980-4-2"]).unwrap();
    assert_eq!(person.get("birthDate").unwrap(), ["1980-04-02"]);
    person.add("email", ["not-an-email"]).unwrap();
    assert!(!person.has("email"));
}

#[test]
fn writes_are_checked() {
    let mut person = model().make_entity("Person").unwrap();
    person.set_id(Some("p-1".to_string()));
    assert!(matches!(
        person.add("wingspan", ["12m"]),
        Err(DataError::UnknownProperty { .. })
    ));
    assert!(matches!(
        person.add("ownershipOwner", ["own-1"]),
        Err(DataError::StubProperty(_))
    ));
    assert!(matches!(
        person.add("parent", ["p-1"]),
        Err(DataError::SelfReference { .. })
    ));
    person.add("parent", ["p-2"]).unwrap();
    assert_eq!(person.first("parent"), Some("p-2"));
}

#[test]
fn unsafe_add_skips_the_checks() {
    let model = model();
    let mut person = model.make_entity("Person").unwrap();
    let stub = model.get("Person").unwrap().get("ownershipOwner").unwrap();
    assert!(person.unsafe_add(stub, "own-1", AddOptions::cleaned()));
    assert_eq!(person.get("ownershipOwner").unwrap(), ["own-1"]);
}

#[test]
fn values_beyond_the_size_ceiling_are_dropped() {
    let mut thing = model().make_entity("Person").unwrap();
    let values: Vec<String> = (0..1100).map(|i| format!("{i:04}{}", "x".repeat(996))).collect();
    thing.add("keywords", &values).unwrap();
    let stored = thing.get("keywords").unwrap().len();
    assert!(stored < values.len());
    assert!(stored >= 1000);
    assert!(thing.size() <= DEFAULT_MAX_SIZE);
}

#[test]
fn values_are_truncated_to_max_length() {
    let mut person = model().make_entity("Person").unwrap();
    person.add("name", ["n".repeat(1000)]).unwrap();
    assert_eq!(person.first("name").unwrap().chars().count(), 384);
}

#[test]
fn set_pop_and_remove() {
    let mut person = model().make_entity("Person").unwrap();
    person.add("alias", ["A", "B"]).unwrap();
    person.set("alias", ["C"]).unwrap();
    assert_eq!(person.get("alias").unwrap(), ["C"]);
    person.add("alias", ["D"]).unwrap();
    person.remove("alias", "C").unwrap();
    assert_eq!(person.pop("alias").unwrap(), vec!["D".to_string()]);
    assert!(!person.has("alias"));
    assert_eq!(person.size(), 0);
}

#[test]
fn merge_narrows_to_the_more_specific_schema() {
    let mut person = model().make_entity("Person").unwrap();
    person.add("name", ["Jane Doe"]).unwrap();
    person.add("nationality", ["de"]).unwrap();
    let mut legal = model().make_entity("LegalEntity").unwrap();
    legal.set_id(Some("le-1".to_string()));
    legal.add("email", ["jane@example.com"]).unwrap();

    person.merge(&legal).unwrap();
    assert_eq!(person.schema().name(), "Person");
    assert_eq!(person.id(), Some("le-1"));
    assert_eq!(person.get("email").unwrap(), ["jane@example.com"]);
    assert_eq!(person.get("nationality").unwrap(), ["de"]);
}

#[test]
fn merge_keeps_own_id_and_drops_values_outside_the_common_schema() {
    let mut person = model().make_entity("Person").unwrap();
    person.set_id(Some("p-1".to_string()));
    person.add("name", ["Jane Doe"]).unwrap();
    person.add("nationality", ["de"]).unwrap();
    let mut company = model().make_entity("Company").unwrap();
    company.set_id(Some("c-1".to_string()));
    company.add("name", ["Doe Holdings"]).unwrap();
    company.add("ticker", ["DOE"]).unwrap();

    person.merge(&company).unwrap();
    assert_eq!(person.schema().name(), "LegalEntity");
    assert_eq!(person.id(), Some("p-1"));
    assert_eq!(person.get("name").unwrap(), ["Doe Holdings", "Jane Doe"]);
    assert!(person.get("nationality").is_err());
    assert!(person.get("ticker").is_err());
}

#[test]
fn merge_never_stores_a_self_reference() {
    let mut a = model().make_entity("Person").unwrap();
    a.set_id(Some("p1".to_string()));
    assert!(a.add("sameAs", ["p1"]).is_err());

    let mut b = model().make_entity("Person").unwrap();
    b.set_id(Some("p2".to_string()));
    b.add("sameAs", ["p1", "p9"]).unwrap();

    a.merge(&b).unwrap();
    assert_eq!(a.get("sameAs").unwrap(), ["p9"]);
}

#[test]
fn merge_adopting_an_id_drops_values_pointing_at_it() {
    let mut anonymous = model().make_entity("Person").unwrap();
    anonymous.add("sameAs", ["p2", "p3"]).unwrap();
    let mut named = model().make_entity("Person").unwrap();
    named.set_id(Some("p2".to_string()));
    named.add("name", ["Jane Doe"]).unwrap();

    anonymous.merge(&named).unwrap();
    assert_eq!(anonymous.id(), Some("p2"));
    assert_eq!(anonymous.get("sameAs").unwrap(), ["p3"]);
}

#[test]
fn merge_with_unrelated_schema_names_both_entities() {
    let mut person = model().make_entity("Person").unwrap();
    person.set_id(Some("p-1".to_string()));
    let mut vessel = model().make_entity("Vessel").unwrap();
    vessel.set_id(Some("v-1".to_string()));
    let err = person.merge(&vessel).unwrap_err();
    assert!(matches!(err, DataError::NoCommonSchema { .. }));
    let message = err.to_string();
    assert!(message.contains("p-1") && message.contains("v-1"), "{message}");
}

#[test]
fn serialization_round_trips_with_extra_keys() {
    let json = serde_json::json!({
        "id": "c-1",
        "schema": "Company",
        "properties": {
            "name": ["ACME Ltd"],
            "country": ["gb"],
            "wingspan": ["12m"]
        },
        "datasets": ["uk_coh"]
    });
    let data: EntityData = serde_json::from_value(json).unwrap();
    let company = model().get_proxy(data, false).unwrap();
    assert_eq!(company.get("name").unwrap(), ["ACME Ltd"]);
    assert_eq!(company.extra()["datasets"], serde_json::json!(["uk_coh"]));

    let out = serde_json::to_value(&company).unwrap();
    assert_eq!(out["id"], "c-1");
    assert_eq!(out["schema"], "Company");
    assert_eq!(out["datasets"], serde_json::json!(["uk_coh"]));
    assert!(out["properties"].get("wingspan").is_none());

    let again: EntityData = serde_json::from_value(out).unwrap();
    assert_eq!(model().get_proxy(again, true).unwrap(), company);
}

#[test]
fn unknown_schema_is_an_error() {
    let data = EntityData {
        schema: "Dragon".to_string(),
        ..EntityData::default()
    };
    assert!(matches!(
        model().get_proxy(data, false),
        Err(DataError::UnknownSchema(_))
    ));
}

#[test]
fn views_group_values_by_type() {
    let mut person = model().make_entity("Person").unwrap();
    person.add("name", ["Jane Doe"]).unwrap();
    person.add("alias", ["J. Doe"]).unwrap();
    person.add("email", ["jane@example.com"]).unwrap();
    person.add("firstName", ["Jane"]).unwrap();
    let inverted = person.get_type_inverted(true);
    assert_eq!(inverted["names"], ["J. Doe", "Jane Doe"]);
    assert_eq!(inverted["emails"], ["jane@example.com"]);
    assert_eq!(person.names(), ["J. Doe", "Jane", "Jane Doe"]);
    assert_eq!(person.caption(), "Jane Doe");
}

#[test]
fn country_hints_fall_back_to_other_values() {
    let mut person = model().make_entity("Person").unwrap();
    person.add("phone", ["+44 20 7946 0958"]).unwrap();
    assert!(person.countries().is_empty());
    assert_eq!(person.country_hints(), ["gb"]);
    person.add("nationality", ["fr"]).unwrap();
    assert_eq!(person.country_hints(), ["fr"]);
}

#[test]
fn edges_and_temporal_extent() {
    let mut ownership = model().make_entity("Ownership").unwrap();
    ownership.add("owner", ["p-1"]).unwrap();
    ownership.add("asset", ["c-1", "c-2"]).unwrap();
    ownership.add("startDate", ["2019-01", "2018"]).unwrap();
    assert_eq!(ownership.edgepairs(), [("p-1", "c-1"), ("p-1", "c-2")]);
    assert_eq!(ownership.temporal_start(), Some("2018"));
    assert_eq!(ownership.temporal_end(), None);
}

#[test]
fn make_id_requires_some_input() {
    let mut person = model().make_entity("Person").unwrap();
    assert_eq!(person.make_id(["", ""]), None);
    let id = person.make_id(["jane", "doe"]).unwrap().to_string();
    assert_eq!(id.len(), 64);
    assert_eq!(dossier_model::make_id(None, ["jane", "doe"]).as_deref(), Some(id.as_str()));
}

#[test]
fn helpers_tidy_entities() {
    let mut doc = model().make_entity("Document").unwrap();
    doc.add("date", ["2020", "2020-03-01", "2021"]).unwrap();
    doc.add("contentHash", ["da39a3ee5e6b4b0d3255bfef95601890afd80709"]).unwrap();
    simplify_dates(&mut doc).unwrap();
    assert_eq!(doc.get("date").unwrap(), ["2020-03-01", "2021"]);
    remove_checksums(&mut doc).unwrap();
    assert!(!doc.has("contentHash"));

    let mut payer = model().make_entity("Person").unwrap();
    payer.add("name", ["Jane Doe"]).unwrap();
    let mut payment = model().make_entity("Payment").unwrap();
    inline_names(&mut payment, &payer).unwrap();
    assert_eq!(payment.get("namesMentioned").unwrap(), ["Jane Doe"]);
}

#[test]
fn namespace_signs_ids_and_references() {
    let mut ownership = model().make_entity("Ownership").unwrap();
    ownership.set_id(Some("own-1".to_string()));
    ownership.add("owner", ["p-1"]).unwrap();
    let ns = Namespace::new("dataset-a");

    let shallow = ns.apply(&ownership, true);
    assert!(ns.verify(shallow.id().unwrap()));
    assert_eq!(shallow.get("owner").unwrap(), ["p-1"]);

    let deep = ns.apply(&ownership, false);
    let owner = deep.first("owner").unwrap();
    assert!(ns.verify(owner));
    assert_eq!(Namespace::strip(owner), "p-1");
}

proptest! {
    #[test]
    fn adding_values_twice_changes_nothing(names in prop::collection::vec("[A-Za-z]{1,12}( [A-Za-z]{1,12})?", 1..6)) {
        let mut once = model().make_entity("Person").unwrap();
        once.add("name", &names).unwrap();
        let mut twice = once.clone();
        twice.add("name", &names).unwrap();
        prop_assert_eq!(once.to_data(), twice.to_data());
        prop_assert_eq!(once.size(), twice.size());
    }
}
