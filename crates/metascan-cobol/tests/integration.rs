//! Integration tests covering the full copybook scan flow: declaration
//! reconstruction, classification, rule resolution, and both reader
//! scopes.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use metascan_cobol::{CopybookReader, CopybookScope};
use metascan_core::{CaseMode, DataObjectReader, ImportError, ImportParams, RuleStore, StatusLog};
use tempfile::TempDir;

/// The customer master fixture used by the COPYBOOK scope tests.
const CUSTOMER_COPYBOOK: &[&str] = &[
    "000010* CUSTOMER MASTER RECORD",
    "000020 01  CUSTOMER-RECORD.",
    "000030     05  CUST-ID          PIC 9(5) VALUE ZEROES.",
    "000040     05  CUST-NAME        PIC X(20).",
    "000050     05  CUST-INITIAL     PIC A(2).",
    "000060     05  CUST-RATING      PIC S9(3)V9(2) COMP-3.",
    "000070     05  CUST-BALANCE     PIC S9(7) COMP.",
    "000080     05  FILLER           PIC X(3).",
    "000090     05  CUST-RATE        COMP-1.",
    "000100     05  CUST-FACTOR      USAGE COMPUTATIONAL-2.",
    "000110     05  CUST-EDIT        PIC ---99.",
    "000120     05  CUST-IND         PIC X(1) VALUE 'N'.",
    "000130     88  IND-NO           VALUE 'N'.",
    "000140     88  IND-YES          VALUE 'Y'.",
    "000150     88  IND-INITIAL      VALUES ARE 'A', 'B', 'C'.",
];

/// (name, data type, common type, default value) expected per attribute.
const CUSTOMER_ATTRIBUTES: &[(&str, &str, &str, &str)] = &[
    ("CUST-ID", "UINT(5)", "INT(5)", "ZEROES"),
    ("CUST-NAME", "ALPHANUM(20)", "CHAR(20)", ""),
    ("CUST-INITIAL", "ALPHA(2)", "CHAR(2)", ""),
    ("CUST-RATING", "SNUM(3,2)", "DECIMAL(3,2)", ""),
    ("CUST-BALANCE", "SINT(7)", "INT(7)", ""),
    ("CUST-RATE", "COMP-1", "FLOAT4", ""),
    ("CUST-FACTOR", "COMPUTATIONAL-2", "FLOAT8", ""),
    ("CUST-EDIT", "---99", "", ""),
    ("CUST-IND", "ALPHANUM(1)", "CHAR(1)", "N"),
];

fn rule_store() -> Arc<RuleStore> {
    let mut store = RuleStore::new();
    for name in ["UINT", "SINT", "ALPHA", "ALPHANUM"] {
        store.add_rule("data-type", name, "%type%(%size%)");
    }
    for name in ["UNUM", "SNUM"] {
        store.add_rule("data-type", name, "%type%([!%size%-%scale%!],[!%scale%!])");
    }
    for name in ["UINT", "SINT"] {
        store.add_rule("common-type", name, "INT(%size%)");
    }
    for name in ["ALPHA", "ALPHANUM"] {
        store.add_rule("common-type", name, "CHAR(%size%)");
    }
    for name in ["UNUM", "SNUM"] {
        store.add_rule(
            "common-type",
            name,
            "DECIMAL([!%size%-%scale%!],[!%scale%!])",
        );
    }
    for name in ["FLOAT4", "FLOAT8"] {
        store.add_rule("common-type", name, "%type%");
    }
    Arc::new(store)
}

fn write_copybook(dir: &Path, name: &str, lines: &[&str]) -> String {
    let path = dir.join(name);
    let mut text = lines.join("\n");
    text.push('\n');
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

fn copybook_params(file: &str) -> ImportParams {
    ImportParams::new()
        .with("scope", "copybook")
        .with("copybookFile", file)
        .with("namespacePrefix", "TEMP_SPACE")
        .with("ruleGroup", "COBOL")
        .with_rule_store(rule_store())
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn copybook_scope_scans_one_data_object() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(dir.path(), "customer", CUSTOMER_COPYBOOK);

    let mut reader = CopybookReader::new();
    reader.init(&copybook_params(&file)).unwrap();
    assert_eq!(reader.scope(), Some(CopybookScope::Copybook));
    assert_eq!(reader.case_mode(), CaseMode::Mixed);
    assert_eq!(reader.namespace_prefix(), "TEMP_SPACE");
    assert_eq!(reader.rule_group(), Some("COBOL"));

    let object = reader.read().unwrap().expect("one data object");
    assert_eq!(object.name, "customer");
    // No namespace rule is registered, so the prefix stands alone.
    assert_eq!(object.namespace, "TEMP_SPACE");

    assert_eq!(object.attributes.len(), CUSTOMER_ATTRIBUTES.len());
    for (i, (name, data_type, common_type, default)) in CUSTOMER_ATTRIBUTES.iter().enumerate() {
        let attr = &object.attributes[i];
        assert_eq!(attr.name, *name);
        assert_eq!(attr.seq_no, i as u32 + 1, "{name}");
        assert_eq!(attr.data_type, *data_type, "{name}");
        assert_eq!(attr.common_type, *common_type, "{name}");
        assert_eq!(attr.default_value, *default, "{name}");
    }

    // Condition names rolled up onto the last attribute.
    let codes = &object.attributes.last().unwrap().codes;
    assert_eq!(codes.len(), 3);
    assert_eq!((codes[0].value.as_str(), codes[0].description.as_str()), ("N", "IND-NO"));
    assert_eq!((codes[1].value.as_str(), codes[1].description.as_str()), ("Y", "IND-YES"));
    assert_eq!(
        (codes[2].value.as_str(), codes[2].description.as_str()),
        ("'A', 'B', 'C'", "IND-INITIAL")
    );

    // Exactly one data object per copybook, then end of data.
    assert!(reader.read().unwrap().is_none());
    reader.close();
}

#[test]
fn namespace_rule_shapes_the_namespace() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(dir.path(), "customer", CUSTOMER_COPYBOOK);

    let mut store = RuleStore::new();
    store.add_rule("namespace", "name", "%prefix%.COPYBOOKS");
    let params = ImportParams::new()
        .with("scope", "copybook")
        .with("copybookFile", &file)
        .with("namespacePrefix", "TEMP_SPACE")
        .with_rule_store(Arc::new(store));

    let mut reader = CopybookReader::new();
    reader.init(&params).unwrap();
    let object = reader.read().unwrap().unwrap();
    assert_eq!(object.namespace, "TEMP_SPACE.COPYBOOKS");
    // With no data-type rules everything falls back to the declared type.
    let cust_id = &object.attributes[0];
    assert_eq!(cust_id.data_type, "9(5)");
    assert_eq!(cust_id.common_type, "");
}

#[test]
fn continued_declarations_reconstruct_before_scanning() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(
        dir.path(),
        "contin",
        &[
            "000010 01  FIELD-ONE           ",
            "000020     PIC X(10).          ",
        ],
    );

    let mut reader = CopybookReader::new();
    reader.init(&copybook_params(&file)).unwrap();
    let object = reader.read().unwrap().unwrap();
    assert_eq!(object.attributes.len(), 1);
    assert_eq!(object.attributes[0].name, "FIELD-ONE");
    assert_eq!(object.attributes[0].data_type, "ALPHANUM(10)");
}

#[test]
fn case_mode_folds_textual_output() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(dir.path(), "CUSTOMER", CUSTOMER_COPYBOOK);

    let mut params = copybook_params(&file);
    params.set("case", "lower");
    let mut reader = CopybookReader::new();
    reader.init(&params).unwrap();
    assert_eq!(reader.case_mode(), CaseMode::Lower);

    let object = reader.read().unwrap().unwrap();
    assert_eq!(object.namespace, "temp_space");
    assert_eq!(object.name, "customer");
    assert_eq!(object.attributes[0].name, "cust-id");
    assert_eq!(object.attributes[0].data_type, "uint(5)");
    assert_eq!(object.attributes[0].common_type, "int(5)");
    assert_eq!(object.attributes[0].default_value, "zeroes");
    // Codes are not case folded.
    assert_eq!(object.attributes.last().unwrap().codes[0].description, "IND-NO");
}

#[test]
fn pds_scope_yields_one_object_per_member_in_name_order() {
    let dir = TempDir::new().unwrap();
    let fields = &[
        "000010 01  REC.",
        "000020     05  F-ID    PIC 9(5).",
        "000030     05  F-NAME  PIC X(20).",
    ];
    // Written out of order; the reader sorts members by file name.
    write_copybook(dir.path(), "book3", fields);
    write_copybook(dir.path(), "book1", fields);
    write_copybook(dir.path(), "book2", fields);

    let params = ImportParams::new()
        .with("scope", "pds")
        .with("copybookDirectory", dir.path().to_string_lossy())
        .with("namespacePrefix", "TEMP_SPACE")
        .with_rule_store(rule_store());

    let mut reader = CopybookReader::new();
    reader.init(&params).unwrap();
    assert_eq!(reader.scope(), Some(CopybookScope::Pds));

    for expected in ["book1", "book2", "book3"] {
        let object = reader.read().unwrap().expect("a data object per member");
        assert_eq!(object.name, expected);
        assert_eq!(object.attributes.len(), 2);
    }
    assert!(reader.read().unwrap().is_none());
}

#[test]
fn type_mode_collects_raw_classification_data() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(
        dir.path(),
        "types",
        &[
            "000010 01  REC.",
            "000020     05  T-NUM   PIC S9(3)V9(2) COMPUTATIONAL-3.",
            "000030     05  T-TEXT  PIC X(8).",
            "000040     05  T-RATE  COMPUTATIONAL-1.",
        ],
    );

    let mut reader = CopybookReader::new();
    reader.enable_type_mode();
    reader.init(&copybook_params(&file)).unwrap();
    reader.read().unwrap().unwrap();

    let md = reader.type_metadata().unwrap();
    assert_eq!(
        md.properties(),
        ["attribute", "declaration", "type", "size", "scale", "usage"]
    );

    let entries = md.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["attribute"], "T-NUM");
    assert_eq!(entries[0]["declaration"], "S9(3)V9(2) COMPUTATIONAL-3");
    assert_eq!(entries[0]["type"], "SNUM");
    assert_eq!(entries[0]["size"], "5");
    assert_eq!(entries[0]["scale"], "2");
    assert_eq!(entries[0]["usage"], "COMP-3");

    assert_eq!(entries[1]["attribute"], "T-TEXT");
    assert_eq!(entries[1]["type"], "ALPHANUM");
    assert_eq!(entries[1]["size"], "8");

    assert_eq!(entries[2]["attribute"], "T-RATE");
    assert_eq!(entries[2]["declaration"], "COMPUTATIONAL-1");
    assert_eq!(entries[2]["type"], "FLOAT4");
    assert_eq!(entries[2]["size"], "0");
    assert_eq!(entries[2]["usage"], "COMP-1");
}

#[test]
fn type_mode_is_rejected_for_pds_scope() {
    let dir = TempDir::new().unwrap();
    write_copybook(dir.path(), "book1", &["000010 01  F PIC X."]);

    let params = ImportParams::new()
        .with("scope", "pds")
        .with("copybookDirectory", dir.path().to_string_lossy())
        .with("namespacePrefix", "TEMP_SPACE")
        .with_rule_store(rule_store());

    let mut reader = CopybookReader::new();
    reader.enable_type_mode();
    let err = reader.init(&params).unwrap_err();
    assert!(matches!(err, ImportError::TypeModeInvalid));
}

#[test]
fn type_metadata_requires_type_mode() {
    let reader = CopybookReader::new();
    assert!(matches!(
        reader.type_metadata().unwrap_err(),
        ImportError::TypeMetaDataUnsupported
    ));
}

#[test]
fn read_before_init_is_rejected() {
    let mut reader = CopybookReader::new();
    let err = reader.read().unwrap_err();
    assert!(matches!(err, ImportError::NotConfigured(_)));
}

#[test]
fn init_validates_parameters_before_touching_files() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(dir.path(), "customer", CUSTOMER_COPYBOOK);

    let cases: Vec<(ImportParams, &str)> = vec![
        (
            {
                let mut p = copybook_params(&file);
                p.remove("scope");
                p
            },
            "Initialization error: parameter [scope] missing",
        ),
        (
            {
                let mut p = copybook_params(&file);
                p.set("scope", "copy");
                p
            },
            "Initialization error: invalid value for parameter [scope]",
        ),
        (
            {
                let mut p = copybook_params(&file);
                p.remove("copybookFile");
                p
            },
            "Initialization error: parameter [copybookFile] missing",
        ),
        (
            {
                let mut p = copybook_params(&file);
                p.remove("namespacePrefix");
                p
            },
            "Initialization error: parameter [namespacePrefix] missing",
        ),
        (
            {
                let mut p = copybook_params(&file);
                p.set("namespacePrefix", "   ");
                p
            },
            "Initialization error: parameter [namespacePrefix] empty",
        ),
        (
            {
                let mut p = copybook_params(&file);
                p.set("case", "INVALID");
                p
            },
            "Initialization error: invalid value for parameter [case]",
        ),
    ];

    for (params, expected) in cases {
        let mut reader = CopybookReader::new();
        let err = reader.init(&params).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    // Missing rule store fails the same way.
    let params = ImportParams::new()
        .with("scope", "copybook")
        .with("copybookFile", &file)
        .with("namespacePrefix", "TEMP_SPACE");
    let mut reader = CopybookReader::new();
    assert_eq!(
        reader.init(&params).unwrap_err().to_string(),
        "Initialization error: parameter [ruleStore] missing"
    );
}

#[test]
fn init_validates_source_locations() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(dir.path(), "customer", CUSTOMER_COPYBOOK);

    // Nonexistent copybook.
    let mut reader = CopybookReader::new();
    let err = reader.init(&copybook_params("nocopybook")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Initialization error: copybook nocopybook does not exist"
    );

    // A directory where a file is required.
    let mut reader = CopybookReader::new();
    let err = reader
        .init(&copybook_params(&dir.path().to_string_lossy()))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "Initialization error: copybook {} does not denote a file",
            dir.path().display()
        )
    );

    // Nonexistent PDS directory.
    let params = ImportParams::new()
        .with("scope", "pds")
        .with("copybookDirectory", "nodirectory")
        .with("namespacePrefix", "TEMP_SPACE")
        .with_rule_store(rule_store());
    let mut reader = CopybookReader::new();
    assert_eq!(
        reader.init(&params).unwrap_err().to_string(),
        "Initialization error: directory nodirectory does not exist"
    );

    // A file where a directory is required.
    let params = ImportParams::new()
        .with("scope", "pds")
        .with("copybookDirectory", &file)
        .with("namespacePrefix", "TEMP_SPACE")
        .with_rule_store(rule_store());
    let mut reader = CopybookReader::new();
    assert_eq!(
        reader.init(&params).unwrap_err().to_string(),
        format!("Initialization error: directory {file} does not denote a directory")
    );
}

#[test]
fn orphan_condition_name_is_a_reported_failure() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(
        dir.path(),
        "orphan",
        &["000010 88  IND-X  VALUE 'X'."],
    );

    let mut reader = CopybookReader::new();
    reader.init(&copybook_params(&file)).unwrap();
    let err = reader.read().unwrap_err();
    match err {
        ImportError::OrphanConditionName(name) => assert_eq!(name, "IND-X"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_rule_fails_when_first_evaluated() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(
        dir.path(),
        "badrule",
        &["000010 01  F-ID  PIC 9(5)."],
    );

    let mut store = RuleStore::new();
    store.add_rule("data-type", "UINT", "%type%([!%size%");
    let params = ImportParams::new()
        .with("scope", "copybook")
        .with("copybookFile", &file)
        .with("namespacePrefix", "TEMP_SPACE")
        .with_rule_store(Arc::new(store));

    let mut reader = CopybookReader::new();
    reader.init(&params).unwrap();
    let err = reader.read().unwrap_err();
    assert_eq!(err.to_string(), "Invalid rule \"UINT([!5\"");
}

#[test]
fn malformed_level_number_fails_the_read() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(
        dir.path(),
        "badlevel",
        &["000010 LEVEL  F-ID  PIC 9(5)."],
    );

    let mut reader = CopybookReader::new();
    reader.init(&copybook_params(&file)).unwrap();
    assert!(matches!(
        reader.read().unwrap_err(),
        ImportError::MalformedDeclaration(_)
    ));
}

#[test]
fn status_log_records_the_import() {
    let dir = TempDir::new().unwrap();
    let file = write_copybook(dir.path(), "customer", CUSTOMER_COPYBOOK);

    let buf = SharedBuf::default();
    let mut reader = CopybookReader::new();
    reader.set_status_log(StatusLog::new(buf.clone()));
    reader.init(&copybook_params(&file)).unwrap();
    reader.read().unwrap().unwrap();

    let text = buf.text();
    assert!(text.contains("Importing customer ..."), "status was: {text}");
}

#[test]
fn status_log_names_the_failing_parameter() {
    let buf = SharedBuf::default();
    let mut reader = CopybookReader::new();
    reader.set_status_log(StatusLog::new(buf.clone()));
    let _ = reader.init(&ImportParams::new()).unwrap_err();
    assert!(buf
        .text()
        .contains("Initialization error: parameter [scope] missing"));
}
