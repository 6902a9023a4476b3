use std::fs;

use label_ingest::{IngestOptions, read_table, read_table_from, write_table, write_table_to};

#[test]
fn reads_header_and_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("parts.csv");
    fs::write(
        &path,
        "digikey_pn,parametrics\nRC-1,\"{'Family': 'Crystals'}\"\n\n399-1,\" {} \"\n",
    )
    .expect("write csv");

    let table = read_table(&path).expect("read table");
    assert_eq!(table.header(), ["digikey_pn", "parametrics"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0][1], "{'Family': 'Crystals'}");
    assert_eq!(table.rows()[1][1], "{}");
}

#[test]
fn ragged_rows_fail() {
    let input = "a,b\n1,2\n3\n";
    let err = read_table_from(input.as_bytes(), IngestOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("record"));
}

#[test]
fn duplicate_header_fails() {
    let err = read_table_from("a,a\n1,2\n".as_bytes(), IngestOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("duplicate column"));
}

#[test]
fn written_file_reads_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("out.tsv");
    let table = read_table_from(
        "title,desc\n\"Capacitor, Ceramic, 10uF\",16V X7R\n".as_bytes(),
        IngestOptions::default(),
    )
    .expect("read");

    write_table(&path, &table).expect("write");
    let text = fs::read_to_string(&path).expect("read back");
    assert_eq!(text, "title\tdesc\nCapacitor, Ceramic, 10uF\t16V X7R\n");
    assert_eq!(read_table(&path).expect("reload"), table);
}

#[test]
fn writer_quotes_delimiters() {
    let table = read_table_from("a\n\"x,y\"\n".as_bytes(), IngestOptions::default()).unwrap();
    let mut out = Vec::new();
    write_table_to(&mut out, &table, b',').unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a\n\"x,y\"\n");
}
