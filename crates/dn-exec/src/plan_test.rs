use super::*;
use dn_core::BlockType;

fn code_block(id: &str, key: &str, content: &str) -> Block {
    Block::new(id, key, BlockType::Code, content)
}

fn project() -> Project {
    let mut project = Project::new("proj-1", "test");

    let mut nb1 = Notebook::new("nb-1", "prep");
    nb1.blocks.push(code_block("aaa-1", "k0", "x = 1"));
    nb1.blocks.push(code_block("aaa-2", "k1", "y = x + 1"));
    nb1.blocks
        .push(Block::new("aaa-3", "k2", BlockType::Markdown, "# notes"));

    let mut nb2 = Notebook::new("nb-2", "report");
    nb2.blocks.push(code_block("bbb-1", "k0", "z = 1"));

    project.notebooks.push(nb1);
    project.notebooks.push(nb2);
    project
}

#[test]
fn test_project_scope_follows_document_order() {
    let plan = plan_scope(&project(), &ExecutionScope::Project).unwrap();
    let ids: Vec<&str> = plan.block_ids().iter().map(|id| id.as_str()).collect();
    // Markdown is not executable and is excluded
    assert_eq!(ids, vec!["aaa-1", "aaa-2", "bbb-1"]);
}

#[test]
fn test_notebook_scope_by_name_and_id() {
    let project = project();
    for reference in ["report", "nb-2"] {
        let plan = plan_scope(&project, &ExecutionScope::Notebook(reference.to_string())).unwrap();
        assert_eq!(plan.block_ids(), vec![&dn_core::BlockId::new("bbb-1")]);
    }
}

#[test]
fn test_notebook_scope_not_found() {
    let result = plan_scope(&project(), &ExecutionScope::Notebook("missing".to_string()));
    assert!(matches!(
        result.unwrap_err(),
        ExecError::NotebookNotFound { .. }
    ));
}

#[test]
fn test_block_scope_includes_upstream() {
    let plan = plan_scope(&project(), &ExecutionScope::Block("aaa-2".to_string())).unwrap();
    let ids: Vec<&str> = plan.block_ids().iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["aaa-1", "aaa-2"]);
}

#[test]
fn test_block_scope_root_block_is_alone() {
    let plan = plan_scope(&project(), &ExecutionScope::Block("aaa-1".to_string())).unwrap();
    let ids: Vec<&str> = plan.block_ids().iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["aaa-1"]);
}

#[test]
fn test_block_prefix_resolution() {
    // "bbb" unambiguously prefixes bbb-1
    let plan = plan_scope(&project(), &ExecutionScope::Block("bbb".to_string())).unwrap();
    assert_eq!(plan.blocks[0].block_id, "bbb-1");

    // "aaa" matches three blocks
    let result = plan_scope(&project(), &ExecutionScope::Block("aaa".to_string()));
    match result.unwrap_err() {
        ExecError::AmbiguousBlock { candidates, .. } => {
            assert!(candidates.contains("aaa-1"));
            assert!(candidates.contains("aaa-2"));
        }
        other => panic!("expected AmbiguousBlock, got {:?}", other),
    }
}

#[test]
fn test_block_not_found() {
    let result = plan_scope(&project(), &ExecutionScope::Block("zzz".to_string()));
    assert!(matches!(result.unwrap_err(), ExecError::BlockNotFound { .. }));
}

#[test]
fn test_non_executable_target_is_an_error() {
    let result = plan_scope(&project(), &ExecutionScope::Block("aaa-3".to_string()));
    assert!(matches!(result.unwrap_err(), ExecError::NotExecutable { .. }));
}
