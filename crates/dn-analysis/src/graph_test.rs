use super::*;
use dn_core::{Block, BlockType};

fn code_block(id: &str, key: &str, content: &str) -> Block {
    Block::new(id, key, BlockType::Code, content)
}

fn notebook(blocks: Vec<Block>) -> Notebook {
    let mut nb = Notebook::new("nb-1", "main");
    nb.blocks = blocks;
    nb
}

#[test]
fn test_simple_edge() {
    let nb = notebook(vec![
        code_block("b1", "a0", "x = 1"),
        code_block("b2", "a1", "y = x + 1"),
    ]);
    let graph = build_graph(&nb);

    let edges = graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].0, "b1");
    assert_eq!(edges[0].1, "b2");
    assert_eq!(graph.symbol_owner()["x"], "b1");
    assert!(graph.unresolved().is_empty());
}

#[test]
fn test_last_definer_owns_symbol() {
    // Three definers of `x`: the greatest sorting key wins, regardless of
    // where consumers sit.
    let nb = notebook(vec![
        code_block("b1", "a0", "x = 1"),
        code_block("b2", "a1", "y = x"),
        code_block("b3", "a2", "x = 2"),
        code_block("b4", "a3", "x = 3"),
    ]);
    let graph = build_graph(&nb);

    assert_eq!(graph.symbol_owner()["x"], "b4");
    // b2's use of x resolves to the later definer
    let edges = graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].0, "b4");
    assert_eq!(edges[0].1, "b2");
}

#[test]
fn test_unsorted_input_is_processed_in_sorting_key_order() {
    let nb = notebook(vec![
        code_block("late", "z9", "x = 2"),
        code_block("early", "a0", "x = 1"),
    ]);
    let graph = build_graph(&nb);
    assert_eq!(graph.symbol_owner()["x"], "late");
}

#[test]
fn test_undefined_symbol_reported_not_edged() {
    let nb = notebook(vec![code_block("b1", "a0", "y = missing + 1")]);
    let graph = build_graph(&nb);

    assert!(graph.edges().is_empty());
    assert_eq!(graph.unresolved().len(), 1);
    assert_eq!(graph.unresolved()[0].0, "b1");
    assert_eq!(graph.unresolved()[0].1, "missing");
}

#[test]
fn test_self_reference_is_not_an_edge() {
    let nb = notebook(vec![code_block("b1", "a0", "x = 1\nx = x + 1")]);
    let graph = build_graph(&nb);
    assert!(graph.edges().is_empty());
    assert!(graph.unresolved().is_empty());
}

#[test]
fn test_imported_modules_are_owned() {
    let nb = notebook(vec![
        code_block("b1", "a0", "import pandas as pd"),
        code_block("b2", "a1", "df = pd.DataFrame()"),
    ]);
    let graph = build_graph(&nb);

    assert_eq!(graph.symbol_owner()["pd"], "b1");
    let edges = graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].1, "b2");
}

#[test]
fn test_sql_and_input_blocks_participate() {
    let mut input = Block::new("b1", "a0", BlockType::InputText, "");
    input.metadata.deepnote_variable_name = Some("region".to_string());

    let mut sql = Block::new("b2", "a1", BlockType::Sql, "SELECT * FROM t WHERE r = {{ region }}");
    sql.metadata.deepnote_variable_name = Some("df".to_string());

    let code = code_block("b3", "a2", "print(df)");

    let graph = build_graph(&notebook(vec![input, sql, code]));
    assert_eq!(graph.symbol_owner()["region"], "b1");
    assert_eq!(graph.symbol_owner()["df"], "b2");
    assert_eq!(graph.dependencies("b2").len(), 1);
    assert_eq!(graph.dependents("b2"), vec![&BlockId::new("b3")]);
    // `t` has no owner: reported, not edged
    assert!(graph.unresolved().iter().any(|(_, s)| s == "t"));
}

#[test]
fn test_upstream_closure_dependencies_first() {
    let nb = notebook(vec![
        code_block("b1", "a0", "x = 1"),
        code_block("b2", "a1", "y = x + 1"),
        code_block("b3", "a2", "z = y + x"),
    ]);
    let graph = build_graph(&nb);

    let closure = graph.upstream_closure("b3");
    let ids: Vec<&str> = closure.iter().map(|id| id.as_str()).collect();
    // b1 must precede b2 no matter the discovery order
    let p1 = ids.iter().position(|id| *id == "b1").unwrap();
    let p2 = ids.iter().position(|id| *id == "b2").unwrap();
    assert!(p1 < p2);
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_cycle_detected_but_graph_builds() {
    let nb = notebook(vec![
        code_block("b1", "a0", "a = b"),
        code_block("b2", "a1", "b = a"),
    ]);
    let graph = build_graph(&nb);

    assert_eq!(graph.edges().len(), 2);
    let cycle = graph.detect_cycle().unwrap();
    assert!(cycle.contains("->"));
}

#[test]
fn test_upstream_closure_tolerates_cycles() {
    let nb = notebook(vec![
        code_block("b1", "a0", "a = b"),
        code_block("b2", "a1", "b = a"),
    ]);
    let graph = build_graph(&nb);
    // Terminates, includes the other cycle member once
    assert_eq!(graph.upstream_closure("b1").len(), 1);
}

#[test]
fn test_parse_error_block_contributes_no_edges() {
    let nb = notebook(vec![
        code_block("b1", "a0", "x = \"unterminated"),
        code_block("b2", "a1", "y = x"),
    ]);
    let graph = build_graph(&nb);

    assert!(graph.edges().is_empty());
    assert!(graph.symbols()[0].1.parse_error.is_some());
    // b2's use of x is unresolved because b1 contributed nothing
    assert_eq!(graph.unresolved().len(), 1);
}
