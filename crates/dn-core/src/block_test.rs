use super::*;

#[test]
fn test_block_type_tags_round_trip() {
    for tag in [
        "code",
        "sql",
        "markdown",
        "input-text",
        "input-slider",
        "big-number",
        "separator",
    ] {
        assert_eq!(BlockType::from_tag(tag).as_str(), tag);
    }
    // Unknown tags are preserved, not rejected
    let other = BlockType::from_tag("waterfall-chart");
    assert_eq!(other, BlockType::Other("waterfall-chart".to_string()));
    assert_eq!(other.as_str(), "waterfall-chart");
}

#[test]
fn test_executable_classification() {
    assert!(BlockType::Code.is_executable());
    assert!(BlockType::Sql.is_executable());
    assert!(BlockType::InputSlider.is_executable());
    assert!(!BlockType::Markdown.is_executable());
    assert!(!BlockType::Separator.is_executable());
    assert!(!BlockType::Other("mystery".into()).is_executable());
}

#[test]
fn test_content_hash_ignores_execution_fields() {
    let mut block = Block::new("b1", "a0", BlockType::Code, "x = 1");
    let before = block.content_hash();

    block.execution_count = Some(3);
    block.outputs.push(serde_json::json!({"text": "1"}));
    assert_eq!(block.content_hash(), before);

    block.content = "x = 2".to_string();
    assert_ne!(block.content_hash(), before);
}

#[test]
fn test_content_hash_covers_metadata() {
    let mut block = Block::new("b1", "a0", BlockType::Sql, "select 1");
    let before = block.content_hash();
    block.metadata.deepnote_variable_name = Some("df".to_string());
    assert_ne!(block.content_hash(), before);
}

#[test]
fn test_serde_camel_case_shape() {
    let mut block = Block::new("b1", "a0", BlockType::InputText, "");
    block.metadata.deepnote_variable_name = Some("threshold".to_string());
    block.metadata
        .extra
        .insert("custom_key".to_string(), serde_json::json!(42));
    block.execution_count = Some(1);

    let value = serde_json::to_value(&block).unwrap();
    assert_eq!(value["sortingKey"], "a0");
    assert_eq!(value["type"], "input-text");
    assert_eq!(value["executionCount"], 1);
    assert_eq!(value["metadata"]["deepnote_variable_name"], "threshold");
    assert_eq!(value["metadata"]["custom_key"], 42);

    let back: Block = serde_json::from_value(value).unwrap();
    assert_eq!(back, block);
}

#[test]
fn test_clear_execution_fields() {
    let mut block = Block::new("b1", "a0", BlockType::Code, "x = 1");
    block.execution_count = Some(2);
    block.execution_started_at = Some(chrono::Utc::now());
    block.outputs.push(serde_json::json!("out"));

    block.clear_execution_fields();
    assert!(block.execution_count.is_none());
    assert!(block.execution_started_at.is_none());
    assert!(block.outputs.is_empty());
}
