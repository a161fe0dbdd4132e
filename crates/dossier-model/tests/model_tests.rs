use dossier_model::{DataError, EntityView, Model, ModelError, PropertyRef};
use dossier_types::registry;

fn model() -> Model {
    Model::builtin().expect("bundled schema builds")
}

// ============================================================================
// Build
// ============================================================================

#[test]
fn builtin_model_has_core_schemata() {
    let model = model();
    for name in ["Thing", "LegalEntity", "Person", "Company", "Vessel", "Ownership", "Document"] {
        assert!(model.get(name).is_some(), "missing {name}");
    }
    let person = model.get("Person").unwrap();
    assert_eq!(person.names(), ["LegalEntity", "Person", "Thing"]);
    assert!(person.get("name").is_some());
    assert!(person.get("phone").is_some());
    assert!(person.get("nationality").is_some());
}

#[test]
fn reserved_property_names_are_rejected() {
    let err = Model::from_yaml_str("Thing:\n  properties:\n    id:\n      type: string\n").unwrap_err();
    assert!(matches!(err, ModelError::ReservedProperty { ref property, .. } if property == "id"));
}

#[test]
fn missing_parent_fails_the_build() {
    let err = Model::from_yaml_str("Person:\n  extends: [LegalEntity]\n").unwrap_err();
    assert!(matches!(err, ModelError::MissingParent { ref parent, .. } if parent == "LegalEntity"));
}

#[test]
fn inheritance_cycles_fail_the_build() {
    let err = Model::from_yaml_str("A:\n  extends: [B]\nB:\n  extends: [A]\nC: {}\n").unwrap_err();
    assert!(matches!(err, ModelError::Cycle { .. }));
}

#[test]
fn unknown_types_and_ranges_fail_the_build() {
    let err = Model::from_yaml_str("A:\n  properties:\n    x:\n      type: colour\n").unwrap_err();
    assert!(matches!(err, ModelError::UnknownType { ref type_name, .. } if type_name == "colour"));

    let err = Model::from_yaml_str("A:\n  properties:\n    x:\n      type: entity\n      range: B\n")
        .unwrap_err();
    assert!(matches!(err, ModelError::MissingRange { .. }));
}

#[test]
fn reverse_declarations_need_a_name_and_a_range() {
    let err = Model::from_yaml_str(
        "A:\n  properties:\n    x:\n      type: entity\n      reverse:\n        name: y\n",
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::MissingReverseRange { .. }));

    let err = Model::from_yaml_str(
        "A:\n  properties:\n    x:\n      type: entity\n      range: A\n      reverse:\n        label: Y\n",
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::UnnamedReverse { .. }));
}

#[test]
fn reverse_stub_is_installed_once_and_inherited() {
    let yaml = r#"
Thing:
  properties:
    name:
      type: name
Holder:
  extends: [Thing]
Child:
  extends: [Holder]
Link:
  properties:
    holder:
      type: entity
      range: Holder
      reverse:
        name: links
    backup:
      type: entity
      range: Holder
      reverse:
        name: links
"#;
    let model = Model::from_yaml_str(yaml).unwrap();
    let stubs: Vec<_> = model.properties().filter(|p| p.stub()).collect();
    assert_eq!(stubs.len(), 1);
    assert_eq!(stubs[0].qname(), "Holder:links");

    let child = model.get("Child").unwrap();
    let links = child.get("links").expect("stub visible on descendants");
    assert!(links.stub());
    assert_eq!(links.range_name(), Some("Link"));

    let holder = model.get_qname("Link:holder").unwrap();
    let backup = model.get_qname("Link:backup").unwrap();
    assert_eq!(holder.reverse(), Some(links.id()));
    assert_eq!(backup.reverse(), Some(links.id()));
    // the first forward property in name order claims the stub
    assert_eq!(links.reverse(), Some(backup.id()));
}

#[test]
fn reverse_onto_a_value_property_is_a_conflict() {
    let yaml = r#"
A:
  properties:
    notes:
      type: text
B:
  properties:
    a:
      type: entity
      range: A
      reverse:
        name: notes
"#;
    assert!(matches!(
        Model::from_yaml_str(yaml).unwrap_err(),
        ModelError::ReverseConflict { .. }
    ));
}

#[test]
fn own_properties_win_over_inherited_ones() {
    let model = model();
    let sanction = model.get("Sanction").unwrap();
    assert_eq!(sanction.get("country").unwrap().qname(), "Sanction:country");
    let person = model.get("Person").unwrap();
    assert_eq!(person.get("country").unwrap().qname(), "Thing:country");
}

#[test]
fn builtin_reverse_stubs_resolve() {
    let model = model();
    let company = model.get("Company").unwrap();
    let owner_of = company.get("ownershipOwner").expect("reverse of Ownership:owner");
    assert!(owner_of.stub());
    assert_eq!(owner_of.range_name(), Some("Ownership"));
    let vessel = model.get("Vessel").unwrap();
    assert!(vessel.get("ownershipAsset").is_some());
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn common_schema_picks_the_narrowest_shared_schema() {
    let model = model();
    assert_eq!(model.common_schema("Person", "Company").unwrap().name(), "LegalEntity");
    assert_eq!(model.common_schema("Person", "Person").unwrap().name(), "Person");
    assert_eq!(model.common_schema("LegalEntity", "Person").unwrap().name(), "Person");
    assert_eq!(model.common_schema("Company", "Vessel").unwrap().name(), "Asset");
}

#[test]
fn common_schema_fails_for_unrelated_or_unknown() {
    let model = model();
    assert!(matches!(
        model.common_schema("Person", "Vessel"),
        Err(DataError::NoCommonSchema { .. })
    ));
    assert!(matches!(
        model.common_schema("Person", "Dragon"),
        Err(DataError::UnknownSchema(_))
    ));
}

#[test]
fn is_a_and_can_match() {
    let model = model();
    let person = model.get("Person").unwrap();
    let legal = model.get("LegalEntity").unwrap();
    let company = model.get("Company").unwrap();
    let vessel = model.get("Vessel").unwrap();
    assert!(person.is_a(legal));
    assert!(!legal.is_a(person));
    assert!(person.can_match(legal));
    assert!(legal.can_match(company));
    assert!(!person.can_match(company));
    assert!(!person.can_match(vessel));
    assert!(model.descendants(legal).any(|s| s.name() == "PublicBody"));
}

#[test]
fn resolve_accepts_names_qnames_and_ids() {
    let model = model();
    let person = model.get("Person").unwrap();
    let by_name = model.resolve(person, &"name".into()).unwrap();
    assert_eq!(by_name.qname(), "Thing:name");
    let by_qname = model.resolve(person, &"Thing:name".into()).unwrap();
    assert_eq!(by_qname.id(), by_name.id());
    let by_id = model.resolve(person, &PropertyRef::Resolved(by_name.id())).unwrap();
    assert_eq!(by_id.id(), by_name.id());

    assert!(matches!(
        model.resolve(person, &"Vessel:imoNumber".into()),
        Err(DataError::UnknownProperty { .. })
    ));
}

#[test]
fn schema_metadata_is_inherited() {
    let model = model();
    let company = model.get("Company").unwrap();
    assert_eq!(company.caption()[0], "name");
    assert!(company.required().iter().any(|r| r == "name"));
    let (start, end) = model.get("Ownership").unwrap().temporal_extent();
    assert_eq!(start, ["startDate", "date"]);
    assert_eq!(end, ["endDate"]);
    let edge = model.get("Ownership").unwrap().edge().unwrap();
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("owner", "asset"));
}

#[test]
fn schema_validate_checks_required_and_values() {
    let model = model();
    let person = model.get("Person").unwrap();
    let mut values = std::collections::BTreeMap::new();
    assert!(matches!(person.validate(&values), Err(DataError::MissingRequired { .. })));
    values.insert("name".to_string(), vec!["Jane Doe".to_string()]);
    values.insert("birthDate".to_string(), vec!["not a date".to_string()]);
    assert!(matches!(person.validate(&values), Err(DataError::InvalidValue { .. })));
    values.insert("birthDate".to_string(), vec!["1970-01-01".to_string()]);
    assert!(person.validate(&values).is_ok());
}

#[test]
fn type_schemata_lists_holders_of_a_type() {
    let model = model();
    let iban = registry().get("iban").unwrap();
    let names: Vec<&str> = model.get_type_schemata(iban).into_iter().map(|s| s.name()).collect();
    assert_eq!(names, ["BankAccount"]);
}

#[test]
fn descriptor_serializes_own_properties() {
    let model = model();
    let descriptor = model.to_descriptor();
    let person = &descriptor.schemata["Person"];
    assert!(person.properties.contains_key("nationality"));
    assert!(!person.properties.contains_key("name"));
    assert_eq!(person.extends, ["LegalEntity"]);
    assert!(descriptor.types["name"].matchable);
    let json = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(json["schemata"]["Thing"]["abstract"], true);
}

#[test]
fn model_loads_from_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("base.yaml"),
        "Thing:\n  abstract: true\n  properties:\n    name:\n      type: name\n",
    )
    .unwrap();
    std::fs::create_dir(dir.path().join("more")).unwrap();
    std::fs::write(dir.path().join("more/person.yml"), "Person:\n  extends: [Thing]\n").unwrap();
    std::fs::write(dir.path().join("README.txt"), "not yaml").unwrap();

    let model = Model::from_dir(dir.path()).unwrap();
    assert_eq!(model.schemata().count(), 2);
    let person = model.make_entity("Person").unwrap();
    assert_eq!(person.caption(), "Person");
}

#[test]
fn directory_errors_carry_context() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.yaml"), "Thing: [unclosed").unwrap();
    let err = Model::from_dir(dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("bad.yaml"));
}
