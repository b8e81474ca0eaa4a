use super::*;
use crate::block::BlockType;

fn sample_project() -> Project {
    let mut project = Project::new("proj-1", "Sales Analysis");
    let mut nb = Notebook::new("nb-1", "main");
    nb.blocks.push(Block::new("b1", "a0", BlockType::Code, "x = 1"));
    nb.blocks
        .push(Block::new("b2", "a1", BlockType::Code, "y = x + 1"));
    project.notebooks.push(nb);
    project
}

#[test]
fn test_yaml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.deepnote");

    let project = sample_project();
    project.save(&path).unwrap();
    let loaded = Project::load(&path).unwrap();
    assert_eq!(loaded, project);

    // The on-disk shape nests under a `project:` key with a version
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("version:"));
    assert!(raw.contains("project:"));
    assert!(raw.contains("sortingKey:"));
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.json");

    let project = sample_project();
    project.save(&path).unwrap();
    assert_eq!(Project::load(&path).unwrap(), project);
}

#[test]
fn test_load_missing_file() {
    let result = Project::load(Path::new("/nonexistent/p.deepnote"));
    assert!(matches!(
        result.unwrap_err(),
        CoreError::ProjectNotFound { .. }
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.toml");
    std::fs::write(&path, "x").unwrap();
    assert!(matches!(
        Project::load(&path).unwrap_err(),
        CoreError::UnsupportedExtension { .. }
    ));
}

#[test]
fn test_duplicate_block_id_rejected() {
    let mut project = sample_project();
    let mut nb = Notebook::new("nb-2", "other");
    nb.blocks.push(Block::new("b1", "a0", BlockType::Code, ""));
    project.notebooks.push(nb);

    assert!(matches!(
        project.validate().unwrap_err(),
        CoreError::DuplicateBlockId { ref id, .. } if id == "b1"
    ));
}

#[test]
fn test_get_notebook_by_id_then_name() {
    let project = sample_project();
    assert!(project.get_notebook("nb-1").is_some());
    assert!(project.get_notebook("main").is_some());
    assert!(project.get_notebook("missing").is_none());
}

#[test]
fn test_find_block_across_notebooks() {
    let project = sample_project();
    let (nb, block) = project.find_block("b2").unwrap();
    assert_eq!(nb.id, "nb-1");
    assert_eq!(block.content, "y = x + 1");
}

#[test]
fn test_integration_env_var_convention() {
    assert_eq!(integration_env_var("my-database"), "SQL_MY_DATABASE");
    assert_eq!(integration_env_var("prod.db 2"), "SQL_PROD_DB_2");
    assert_eq!(integration_env_var("snowflake"), "SQL_SNOWFLAKE");
}

#[test]
fn test_slug() {
    assert_eq!(sample_project().slug(), "sales-analysis");
    assert_eq!(Project::new("p", "  ").slug(), "project");
    assert_eq!(Project::new("p", "Q4 (final)").slug(), "q4-final");
}
