use std::io::Cursor;
use std::sync::OnceLock;

use chrono::{TimeZone, Utc};
use dossier_model::{Model, DEFAULT_SCHEMA_YAML};
use dossier_statement::formats::{CSV_COLUMNS, PACK_COLUMNS};
use dossier_statement::{
    read_csv, read_json, read_pack, read_statements, write_json, write_statements, CsvStatementWriter, Format,
    Statement, StatementEntity, StatementError,
};

fn model() -> &'static Model {
    static MODEL: OnceLock<Model> = OnceLock::new();
    MODEL.get_or_init(|| Model::from_yaml_str(DEFAULT_SCHEMA_YAML).expect("bundled schema builds"))
}

fn sample() -> Vec<Statement> {
    let seen = Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).single();
    let mut entity = StatementEntity::new(model(), model().get("Person").unwrap(), "ds1");
    entity.set_id(Some("p1".to_string()));
    entity.add("name", ["Jane Doe"]).unwrap();
    entity.add("phone", ["+1 (202) 555-7612"]).unwrap();
    let mut stmts = entity.statements();
    stmts.push(
        Statement::new("p1", "alias", "Person", "J, \"Doe\"", "ds2")
            .with_prop_type("name")
            .with_lang(Some("eng"))
            .seen(seen, seen),
    );
    stmts
}

#[test]
fn json_lines_round_trip() {
    let stmts = sample();
    let mut buf = Vec::new();
    assert_eq!(write_json(&mut buf, &stmts).unwrap(), stmts.len());
    let text = String::from_utf8(buf.clone()).unwrap();
    assert_eq!(text.lines().count(), stmts.len());

    let back: Vec<Statement> = read_json(Cursor::new(buf)).collect::<Result<_, _>>().unwrap();
    assert_eq!(back, stmts);
}

#[test]
fn json_skips_blank_lines_and_reports_bad_ones() {
    let line = serde_json::to_string(&sample()[0]).unwrap();
    let input = format!("{line}\n\n{{not json\n");
    let results: Vec<_> = read_json(Cursor::new(input)).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(StatementError::Json(_))));
}

#[test]
fn csv_round_trip_keeps_every_column() {
    let stmts = sample();
    let mut writer = CsvStatementWriter::new(Vec::new(), 100).unwrap();
    for stmt in &stmts {
        writer.write(stmt).unwrap();
    }
    assert_eq!(writer.written(), stmts.len());
    let buf = writer.finish().unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();
    assert_eq!(text.lines().next(), Some(CSV_COLUMNS.join(",").as_str()));

    let back: Vec<Statement> = read_csv(Cursor::new(buf)).collect::<Result<_, _>>().unwrap();
    assert_eq!(back, stmts);
}

#[test]
fn csv_writer_flushes_in_batches() {
    let stmts = sample();
    let mut writer = CsvStatementWriter::new(Vec::new(), 2).unwrap();
    writer.write(&stmts[0]).unwrap();
    assert!(writer.get_ref().is_empty());
    writer.write(&stmts[1]).unwrap();
    let flushed = String::from_utf8(writer.get_ref().clone()).unwrap();
    assert_eq!(flushed.lines().count(), 3);
    writer.write(&stmts[2]).unwrap();
    assert_eq!(writer.get_ref().len(), flushed.len());
    let buf = writer.finish().unwrap();
    assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 4);
}

#[test]
fn csv_rebuilds_missing_ids() {
    let input = "entity_id,prop,schema,value,dataset\np1,name,Person,Jane Doe,ds1\n";
    let back: Vec<Statement> = read_csv(Cursor::new(input)).collect::<Result<_, _>>().unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].canonical_id, "p1");
    assert_eq!(back[0].id, Statement::make_key("ds1", "p1", "name", "Jane Doe", false));
    assert!(!back[0].external);
    assert_eq!(back[0].first_seen, None);
}

#[test]
fn csv_rejects_bad_timestamps() {
    let input = "entity_id,prop,schema,value,dataset,first_seen\np1,name,Person,Jane,ds1,last tuesday\n";
    let results: Vec<_> = read_csv(Cursor::new(input)).collect();
    assert!(matches!(results[0], Err(StatementError::Timestamp(_))));
}

#[test]
fn pack_drops_and_rebuilds_derived_columns() {
    let stmts = sample();
    let mut writer = CsvStatementWriter::pack(Vec::new(), 100).unwrap();
    for stmt in &stmts {
        writer.write(stmt).unwrap();
    }
    let buf = writer.finish().unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();
    assert_eq!(text.lines().next(), Some(PACK_COLUMNS.join(",").as_str()));
    assert!(!text.contains(&stmts[0].id));

    let back: Vec<Statement> = read_pack(model(), Cursor::new(buf))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(back, stmts);
    assert_eq!(back[0].prop_type, stmts[0].prop_type);
}

#[test]
fn pack_skips_unknown_properties() {
    let input = "entity_id,prop,schema,value,dataset,lang,original_value,external,first_seen,last_seen\n\
                 p1,wingspan,Person,12m,ds1,,,f,,\n\
                 p1,name,Person,Jane,ds1,,,t,,\n";
    let back: Vec<Statement> = read_pack(model(), Cursor::new(input))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].prop_type, "name");
    assert!(back[0].external);
    assert_eq!(back[0].id, Statement::make_key("ds1", "p1", "name", "Jane", true));
}

#[test]
fn format_dispatch_round_trips() {
    let stmts = sample();
    for name in ["json", "csv", "pack"] {
        let format: Format = name.parse().unwrap();
        let mut buf = Vec::new();
        assert_eq!(write_statements(&mut buf, format, &stmts).unwrap(), stmts.len());
        let back: Vec<Statement> = read_statements(model(), Cursor::new(buf), format)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(back, stmts, "{format} round trip");
    }
}

#[test]
fn statements_rebuild_the_entity() {
    let stmts = sample();
    let entity = StatementEntity::from_statements(model(), "ds1", stmts).unwrap();
    assert_eq!(entity.id(), Some("p1"));
    assert_eq!(entity.get("phone").unwrap(), ["+12025557612"]);
    assert_eq!(entity.datasets().len(), 2);
}
