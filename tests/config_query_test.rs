use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use tslist::core::query::DomainKind;
use tslist::utils::validation::Validate;
use tslist::{ErrorKind, FilterConfig, Query, TsError};

fn write_config(temp_dir: &TempDir, content: &str) -> Result<String> {
    let path = temp_dir.path().join("filter.toml");
    fs::write(&path, content)?;
    Ok(path.to_string_lossy().to_string())
}

fn run(config_path: &str, input: Value) -> tslist::Result<Value> {
    let config = FilterConfig::from_file(config_path)?;
    config.validate()?;
    config.query()?.apply(input)
}

#[test]
fn test_timestamp_window_over_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = write_config(
        &temp_dir,
        r#"
[filter]
domain = "timestamp"
start = "2024-12-24"
stop = 20241231
"#,
    )?;

    let input_path = temp_dir.path().join("dates.json");
    fs::write(
        &input_path,
        r#"["2024-12-23", "2024-12-24", "25.12.2024", 20241226, "2024-12-31"]"#,
    )?;
    let input: Value = serde_json::from_str(&fs::read_to_string(&input_path)?)?;

    let output = run(&config_path, input)?;
    assert_eq!(output, json!(["2024-12-24", "25.12.2024", 20241226]));
    Ok(())
}

#[test]
fn test_stride_over_numbers() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = write_config(
        &temp_dir,
        r#"
[filter]
start = 0
stop = 10
step = 3
"#,
    )?;

    let output = run(&config_path, json!([9, 0, 1, 12, 2, 3, 4, 5]))?;
    assert_eq!(output, json!([9, 2, 5]));
    Ok(())
}

#[test]
fn test_object_values_and_keys() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let by_value = write_config(&temp_dir, "[filter]\nstart = 1.5\nstop = 3.0\n")?;
    let output = run(&by_value, json!({"a": 1, "b": 2, "c": 3}))?;
    assert_eq!(output, json!({"b": 2}));

    let by_key = write_config(&temp_dir, "[filter]\nat = 2\nby_keys = true\n")?;
    let output = run(&by_key, json!({"1": "one", "2": "two", "2.0": "also two"}))?;
    assert_eq!(output, json!({"2": "two", "2.0": "also two"}));
    Ok(())
}

#[test]
fn test_failures_carry_their_kind() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let config_path = write_config(&temp_dir, "[filter]\nstart = 1\n")?;
    let err = run(&config_path, json!([1, "not a number"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);

    let config_path = write_config(&temp_dir, "[filter]\nstep = -2\n")?;
    let err = run(&config_path, json!([1])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    // without validation the stride is still refused when the filter runs
    let query = FilterConfig::from_file(&config_path)?.query()?;
    let err = query.apply(json!([1])).unwrap_err();
    assert!(matches!(err, TsError::InvalidStep { step: -2 }));
    assert_eq!(err.kind(), ErrorKind::Value);

    let missing = temp_dir.path().join("missing.toml");
    let err = FilterConfig::from_file(&missing).unwrap_err();
    assert!(matches!(err, TsError::Io(_)));
    assert_eq!(err.kind(), ErrorKind::Io);
    Ok(())
}

#[test]
fn test_object_members_keep_input_order() -> Result<()> {
    let input: Value = serde_json::from_str(r#"{"b": 2, "a": 1, "c": 3, "d": 9}"#)?;

    let everything = Query::build(DomainKind::Number, None, None, None, None, false)?;
    let output = everything.apply(input.clone())?;
    assert_eq!(serde_json::to_string(&output)?, r#"{"b":2,"a":1,"c":3,"d":9}"#);

    let temp_dir = TempDir::new()?;
    let config_path = write_config(&temp_dir, "[filter]\nstop = 5\n")?;
    let output = run(&config_path, input)?;
    assert_eq!(serde_json::to_string(&output)?, r#"{"b":2,"a":1,"c":3}"#);
    Ok(())
}
