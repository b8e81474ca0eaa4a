use super::*;
use dn_core::BlockType;

#[test]
fn test_code_block_dispatch() {
    let block = Block::new("b1", "a0", BlockType::Code, "x = y + 1");
    let info = extract_block(&block);
    assert!(info.defined_symbols.contains("x"));
    assert!(info.used_symbols.contains("y"));
}

#[test]
fn test_sql_block_defines_metadata_symbol() {
    let mut block = Block::new("b1", "a0", BlockType::Sql, "SELECT * FROM {{ src }}");
    block.metadata.deepnote_variable_name = Some("df_result".to_string());

    let info = extract_block(&block);
    assert!(info.defined_symbols.contains("df_result"));
    assert!(info.used_symbols.contains("src"));
}

#[test]
fn test_input_block_sanitizes_symbol_name() {
    let mut block = Block::new("b1", "a0", BlockType::InputText, "");
    block.metadata.deepnote_variable_name = Some("My Input!".to_string());

    let info = extract_block(&block);
    assert!(info.defined_symbols.contains("My_Input"));
    assert!(info.used_symbols.is_empty());
}

#[test]
fn test_button_block_defines_unsanitized_symbol() {
    let mut block = Block::new("b1", "a0", BlockType::Button, "");
    block.metadata.deepnote_variable_name = Some("clicked".to_string());

    let info = extract_block(&block);
    assert!(info.defined_symbols.contains("clicked"));
}

#[test]
fn test_big_number_uses_metadata_symbols() {
    let mut block = Block::new("b1", "a0", BlockType::BigNumber, "");
    block.metadata.deepnote_big_number_value = Some("revenue".to_string());
    block.metadata.deepnote_big_number_comparison_value = Some("revenue_last_year".to_string());

    let info = extract_block(&block);
    assert!(info.defined_symbols.is_empty());
    assert!(info.used_symbols.contains("revenue"));
    assert!(info.used_symbols.contains("revenue_last_year"));
}

#[test]
fn test_display_blocks_contribute_nothing() {
    for block_type in [BlockType::Markdown, BlockType::Text, BlockType::Separator] {
        let block = Block::new("b1", "a0", block_type, "anything = here");
        assert_eq!(extract_block(&block), SymbolInfo::default());
    }
}

#[test]
fn test_provided_spans_definitions_and_imports() {
    let block = Block::new("b1", "a0", BlockType::Code, "import numpy as np\nx = 1");
    let info = extract_block(&block);
    let provided: Vec<&String> = info.provided().collect();
    assert_eq!(provided.len(), 2);
}
