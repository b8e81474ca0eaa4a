use super::*;
use dn_core::Block;

fn code_block(id: &str, key: &str, content: &str) -> Block {
    Block::new(id, key, BlockType::Code, content)
}

fn project_with(blocks: Vec<Block>) -> Project {
    let mut project = Project::new("proj-1", "test");
    let mut nb = Notebook::new("nb-1", "main");
    nb.blocks = blocks;
    project.notebooks.push(nb);
    project
}

fn codes(findings: &[Finding]) -> Vec<FindingCode> {
    findings.iter().map(|f| f.code).collect()
}

#[test]
fn test_clean_notebook_has_no_findings() {
    let project = project_with(vec![
        code_block("b1", "a0", "x = 1"),
        code_block("b2", "a1", "y = x + 1"),
    ]);
    let findings = lint_project(&project, &MapEnv::default());
    // y is defined by the last block, so it is exempt from unused-variable
    assert!(findings.is_empty(), "unexpected: {:?}", findings);
}

#[test]
fn test_unused_variable() {
    let project = project_with(vec![
        code_block("b1", "a0", "unused_var = 42"),
        code_block("b2", "a1", "other = 1"),
    ]);
    let findings = lint_project(&project, &MapEnv::default());

    assert_eq!(codes(&findings), vec![FindingCode::UnusedVariable]);
    assert_eq!(findings[0].severity, Severity::Warning);
    assert_eq!(findings[0].block.as_ref().unwrap(), "b1");
    assert!(findings[0].message.contains("unused_var"));
}

#[test]
fn test_last_block_exempt_from_unused() {
    let project = project_with(vec![
        code_block("b1", "a0", "x = 1"),
        code_block("b2", "a1", "result = x * 2"),
    ]);
    assert!(lint_project(&project, &MapEnv::default()).is_empty());
}

#[test]
fn test_single_block_unused_variable_is_reported() {
    // A lone block is not exempt: nothing downstream could consume it
    let project = project_with(vec![code_block("b1", "a0", "unused_var = 42")]);
    let findings = lint_project(&project, &MapEnv::default());

    assert_eq!(codes(&findings), vec![FindingCode::UnusedVariable]);
    assert_eq!(findings[0].block.as_ref().unwrap(), "b1");
    assert!(findings[0].message.contains("unused_var"));
}

#[test]
fn test_module_notebook_exempt_from_unused() {
    let mut project = project_with(vec![
        code_block("b1", "a0", "helper_constant = 1"),
        code_block("b2", "a1", "pass"),
    ]);
    project.notebooks[0].is_module = true;
    assert!(lint_project(&project, &MapEnv::default()).is_empty());
}

#[test]
fn test_undefined_variable() {
    let project = project_with(vec![code_block("b1", "a0", "y = missing + 1")]);
    let findings = lint_project(&project, &MapEnv::default());

    let undefined: Vec<_> = findings
        .iter()
        .filter(|f| f.code == FindingCode::UndefinedVariable)
        .collect();
    assert_eq!(undefined.len(), 1);
    assert_eq!(undefined[0].severity, Severity::Error);
    assert!(undefined[0].message.contains("missing"));
}

#[test]
fn test_parse_error_is_warning() {
    let project = project_with(vec![
        code_block("b1", "a0", "x = \"unterminated"),
        code_block("b2", "a1", "y = 1"),
    ]);
    let findings = lint_project(&project, &MapEnv::default());

    let parse: Vec<_> = findings
        .iter()
        .filter(|f| f.code == FindingCode::ParseError)
        .collect();
    assert_eq!(parse.len(), 1);
    assert_eq!(parse[0].severity, Severity::Warning);
}

#[test]
fn test_missing_integration() {
    let mut sql = Block::new("b1", "a0", BlockType::Sql, "SELECT 1");
    sql.metadata.sql_integration_id = Some("my-database".to_string());
    sql.metadata.deepnote_variable_name = Some("df".to_string());
    let project = project_with(vec![sql, code_block("b2", "a1", "print(df)")]);

    let findings = lint_project(&project, &MapEnv::default());
    assert_eq!(codes(&findings), vec![FindingCode::MissingIntegration]);
    assert_eq!(findings[0].severity, Severity::Error);
    assert!(findings[0].message.contains("my-database"));
    assert!(findings[0].message.contains("SQL_MY_DATABASE"));

    // With the binding present, the finding disappears
    let env = MapEnv::with(&["SQL_MY_DATABASE"]);
    assert!(lint_project(&project, &env).is_empty());
}

#[test]
fn test_missing_input() {
    let mut input = Block::new("b1", "a0", BlockType::InputText, "");
    input.metadata.deepnote_variable_name = Some("threshold".to_string());
    let mut consumer = code_block("b2", "a1", "print(threshold)");
    consumer.sorting_key = "a1".to_string();
    let project = project_with(vec![input.clone(), consumer.clone()]);

    let findings = lint_project(&project, &MapEnv::default());
    assert_eq!(codes(&findings), vec![FindingCode::MissingInput]);

    // A default value makes the input usable
    input.metadata.deepnote_input_default_value = Some("10".to_string());
    let project = project_with(vec![input, consumer]);
    assert!(lint_project(&project, &MapEnv::default()).is_empty());
}

#[test]
fn test_circular_dependency_warning() {
    let project = project_with(vec![
        code_block("b1", "a0", "a = b"),
        code_block("b2", "a1", "b = a"),
    ]);
    let findings = lint_project(&project, &MapEnv::default());

    let cycles: Vec<_> = findings
        .iter()
        .filter(|f| f.code == FindingCode::CircularDependency)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].block.is_none());
}

#[test]
fn test_lint_is_idempotent() {
    let mut sql = Block::new("b3", "a2", BlockType::Sql, "SELECT * FROM nowhere");
    sql.metadata.sql_integration_id = Some("db".to_string());
    let project = project_with(vec![
        code_block("b1", "a0", "unused_one = 1"),
        code_block("b2", "a1", "y = missing"),
        sql,
    ]);

    let first = lint_project(&project, &MapEnv::default());
    let second = lint_project(&project, &MapEnv::default());
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_multiple_notebooks_all_analyzed() {
    let mut project = project_with(vec![code_block("b1", "a0", "x = undefined_a")]);
    let mut nb2 = Notebook::new("nb-2", "second");
    nb2.blocks.push(code_block("b2", "a0", "y = undefined_b"));
    project.notebooks.push(nb2);

    let findings = lint_project(&project, &MapEnv::default());
    let notebooks: Vec<&str> = findings
        .iter()
        .filter(|f| f.code == FindingCode::UndefinedVariable)
        .map(|f| f.notebook.as_str())
        .collect();
    assert_eq!(notebooks, vec!["main", "second"]);
}
