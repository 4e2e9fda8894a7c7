use regmap_config::RegType;
use regmap_ir::{compile_document, compile_file, CompileError, CompileOptions, CompiledModel};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
}

fn compile_fixture(name: &str) -> CompiledModel {
    compile_file(&fixtures().join(name), &CompileOptions::default())
        .unwrap_or_else(|e| panic!("Failed to compile {}: {}", name, e))
}

fn compile_json(doc: Value) -> Result<CompiledModel, CompileError> {
    compile_document(&doc, &fixtures(), &CompileOptions::default())
}

fn addresses(model: &CompiledModel) -> Vec<u64> {
    model.registers.iter().map(|r| r.addr_offset).collect()
}

fn names(model: &CompiledModel) -> Vec<&str> {
    model.registers.iter().map(|r| r.name.as_str()).collect()
}

fn test_regs_plus(extra: Value) -> Value {
    let mut doc: Value =
        serde_json::from_str(&std::fs::read_to_string(fixtures().join("test_regs.json")).unwrap())
            .unwrap();
    doc.as_array_mut().unwrap().push(extra);
    doc
}

#[test]
fn test_flat_fixture_addresses() {
    let model = compile_fixture("test_regs.json");
    assert_eq!(addresses(&model), vec![0, 4, 64]);
    assert_eq!(
        names(&model),
        vec!["Test_Register", "Scratch_Register", "Register_with_Fields"]
    );
    assert_eq!(model.strobe_size(), 4);
}

#[test]
fn test_hierarchy_flattening() {
    let model = compile_fixture("test_heir_top.json");
    assert_eq!(model.registers.len(), 10);
    assert_eq!(
        addresses(&model),
        vec![0, 128, 132, 192, 196, 200, 260, 500, 504, 564]
    );
    assert_eq!(
        names(&model),
        vec![
            "Heir_Register_Top",
            "Heirarchy_One_Test_Register",
            "Heirarchy_One_Scratch_Register",
            "Heirarchy_One_Register_with_Fields",
            "Heirarchy_Two_Test_Register",
            "Heirarchy_Two_Scratch_Register",
            "Heirarchy_Two_Register_with_Fields",
            "Heirarchy_Three_Test_Register",
            "Heirarchy_Three_Scratch_Register",
            "Heirarchy_Three_Register_with_Fields",
        ]
    );
    let types: Vec<RegType> = model.registers.iter().map(|r| r.reg_type).collect();
    assert_eq!(types[0], RegType::Ro);
    for chunk in types[1..].chunks(3) {
        assert_eq!(chunk, [RegType::Ro, RegType::Rw, RegType::Custom]);
    }
}

#[test]
fn test_instance_separator_only_changes_names() {
    let default = compile_fixture("test_heir_top.json");
    let custom = compile_json(json!([
        {"config": {"data_size": 32, "instance_separator": "__"}},
        {"name": "Heir_Register_Top", "bits": 32},
        {"name": "Heirarchy_One", "file": "test_regs.json", "addr_offset": 128},
        {"name": "Heirarchy_Two", "file": "test_regs.json"},
        {"name": "Heirarchy_Three", "file": "test_regs.json", "addr_offset": 500}
    ]))
    .unwrap();

    assert_eq!(addresses(&custom), addresses(&default));
    for (a, b) in custom.registers.iter().zip(&default.registers) {
        assert_eq!(a.reg_type, b.reg_type);
        let expected = ["Heirarchy_One", "Heirarchy_Two", "Heirarchy_Three"]
            .iter()
            .find_map(|inst| {
                b.name
                    .strip_prefix(&format!("{}_", inst))
                    .map(|rest| format!("{}__{}", inst, rest))
            })
            .unwrap_or_else(|| b.name.clone());
        assert_eq!(a.name, expected);
    }
    assert_eq!(custom.registers[1].name, "Heirarchy_One__Test_Register");
}

#[test]
fn test_includes_resolve_relative_to_declaring_file() {
    let model = compile_fixture("test_nested_dirs.json");
    assert_eq!(model.config.entity_name, "nested_regs");
    assert_eq!(
        names(&model),
        vec![
            "Middle_Id",
            "Middle_Leaf_Status",
            "Middle_Leaf_Control",
            "Top_Scratch"
        ]
    );
    assert_eq!(addresses(&model), vec![256, 272, 274, 276]);
}

#[test]
fn test_duplicate_address() {
    let err = compile_json(test_regs_plus(json!({
        "name": "dup_addr", "addr_offset": 4, "bits": 8
    })))
    .unwrap_err();
    match err {
        CompileError::DuplicateAddress {
            addresses,
            collisions,
        } => {
            assert_eq!(addresses, vec![4]);
            assert_eq!(collisions[0].names, vec!["Scratch_Register", "dup_addr"]);
        }
        other => panic!("Expected duplicate address, got {:?}", other),
    }
}

#[test]
fn test_duplicate_address_message() {
    let err = compile_json(test_regs_plus(json!({
        "name": "dup_addr", "addr_offset": "0x40", "bits": 8
    })))
    .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Multiple registers have the same address (addresses: [64])"));
}

#[test]
fn test_duplicate_name() {
    let err =
        compile_json(test_regs_plus(json!({"name": "Scratch_Register", "bits": 8}))).unwrap_err();
    match err {
        CompileError::DuplicateName { names } => assert_eq!(names, vec!["Scratch_Register"]),
        other => panic!("Expected duplicate name, got {:?}", other),
    }
}

#[test]
fn test_register_too_wide_in_every_shape() {
    let shapes = [
        json!(33),
        json!({"num_bits": 33, "default_value": 0}),
        json!([
            {"field_name": "hi", "num_bits": 32},
            {"field_name": "lo", "num_bits": 1}
        ]),
    ];
    for (i, bits) in shapes.into_iter().enumerate() {
        let name = format!("too_long{}", i);
        let err = compile_json(test_regs_plus(json!({"name": &name, "bits": bits}))).unwrap_err();
        match err {
            CompileError::RegisterTooWide {
                name: got,
                bits,
                limit,
            } => {
                assert_eq!(got, name);
                assert_eq!(bits, 33);
                assert_eq!(limit, 32);
            }
            other => panic!("Expected too-wide error, got {:?}", other),
        }
    }
}

#[test]
fn test_missing_config() {
    let err = compile_json(json!([{"name": "a", "bits": 8}])).unwrap_err();
    assert!(matches!(err, CompileError::MissingConfig { .. }));
}

#[test]
fn test_missing_include_file() {
    let err = compile_json(json!([
        {"config": {"data_size": 32}},
        {"name": "Ghost", "file": "no_such_file.json"}
    ]))
    .unwrap_err();
    match err {
        CompileError::FileNotFound(path) => assert!(path.ends_with("no_such_file.json")),
        other => panic!("Expected missing file, got {:?}", other),
    }
}

#[test]
fn test_missing_top_level_file() {
    let err = compile_file(Path::new("nowhere/regs.json"), &CompileOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "File does not exist: nowhere/regs.json");
}

#[test]
fn test_nested_data_size_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("sub.json"),
        r#"[{"config": {"data_size": 16}}, {"name": "x", "bits": 8}]"#,
    )
    .unwrap();
    let top = dir.path().join("top.json");
    std::fs::write(
        &top,
        r#"[{"config": {"data_size": 32}}, {"name": "Sub", "file": "sub.json"}]"#,
    )
    .unwrap();

    let err = compile_file(&top, &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::ConfigMismatch {
            expected: 32,
            found: 16,
            ..
        }
    ));
}

#[test]
fn test_include_cycle_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let top = dir.path().join("top.json");
    std::fs::write(
        &top,
        r#"[{"config": {"data_size": 32}}, {"name": "A", "file": "a.json"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("a.json"),
        r#"[{"name": "r", "bits": 8}, {"name": "Back", "file": "top.json"}]"#,
    )
    .unwrap();

    let err = compile_file(&top, &CompileOptions::default()).unwrap_err();
    match err {
        CompileError::CyclicInclude { chain } => {
            assert_eq!(chain.len(), 3);
            assert!(chain[0].ends_with("top.json"));
            assert!(chain[1].ends_with("a.json"));
            assert!(chain[2].ends_with("top.json"));
        }
        other => panic!("Expected cyclic include, got {:?}", other),
    }
}

#[test]
fn test_malformed_include_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.json"), "[{").unwrap();
    let top = dir.path().join("top.json");
    std::fs::write(
        &top,
        r#"[{"config": {"data_size": 32}}, {"name": "Bad", "file": "bad.json"}]"#,
    )
    .unwrap();

    let err = compile_file(&top, &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
}

#[test]
fn test_round_trip_is_idempotent() {
    for fixture in ["test_regs.json", "test_heir_top.json", "test_nested_dirs.json"] {
        let model = compile_fixture(fixture);
        let json = model.to_json_value().unwrap();
        let again = compile_document(&json, Path::new(""), &CompileOptions::default()).unwrap();
        assert_eq!(again, model, "round trip changed {}", fixture);

        let text = model.to_json_string().unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, json);
    }
}
