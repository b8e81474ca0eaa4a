//! Snapshot command implementation - split, merge, and list snapshots

use anyhow::{bail, Context, Result};
use dn_core::snapshot::{self, MergeOptions, ProjectSnapshot};
use std::path::{Path, PathBuf};

use crate::cli::{
    GlobalArgs, SnapshotArgs, SnapshotCommands, SnapshotLsArgs, SnapshotMergeArgs,
    SnapshotSplitArgs,
};
use crate::commands::common;

/// Execute the snapshot command
pub async fn execute(args: &SnapshotArgs, global: &GlobalArgs) -> Result<()> {
    match &args.command {
        SnapshotCommands::Split(args) => split(args, global),
        SnapshotCommands::Merge(args) => merge(args, global),
        SnapshotCommands::Ls(args) => ls(args, global),
    }
}

fn split(args: &SnapshotSplitArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let dir = Path::new(&args.out_dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let (source, snap) = snapshot::split(&project);

    let snapshot_path = dir.join(snap.file_name(args.latest, "yaml"));
    snap.save(&snapshot_path)?;

    let source_path = dir.join(format!("{}_{}.source.yaml", source.slug(), source.id));
    source.save(&source_path)?;

    println!("Snapshot written to {}", snapshot_path.display());
    println!("Source copy written to {}", source_path.display());
    Ok(())
}

fn merge(args: &SnapshotMergeArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;

    let snapshot_path = match &args.snapshot {
        Some(path) => PathBuf::from(path),
        None => {
            let refs = snapshot::find_snapshots(Path::new(&args.dir), &project.id)?;
            match refs.into_iter().next() {
                Some(snapshot_ref) => snapshot_ref.path,
                None => bail!(
                    "No snapshots for project '{}' found in {}",
                    project.id,
                    args.dir
                ),
            }
        }
    };

    let snap = ProjectSnapshot::load(&snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;
    if global.verbose {
        eprintln!(
            "[verbose] Merging {} block captures from {}",
            snap.blocks.len(),
            snapshot_path.display()
        );
    }

    let options = MergeOptions {
        skip_mismatched: !args.keep_mismatched,
    };
    let merged = snapshot::merge(&project, &snap, options);

    let out = args.out.as_deref().unwrap_or(&global.project);
    merged.save(Path::new(out))?;
    println!("Merged project written to {}", out);
    Ok(())
}

fn ls(args: &SnapshotLsArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let refs = snapshot::find_snapshots(Path::new(&args.dir), &project.id)?;

    if refs.is_empty() {
        println!("No snapshots for project '{}' in {}", project.id, args.dir);
        return Ok(());
    }

    for snapshot_ref in &refs {
        let stamp = match snapshot_ref.timestamp {
            Some(ts) => ts.to_rfc3339(),
            None => "latest".to_string(),
        };
        println!("{:<24}  {}", stamp, snapshot_ref.path.display());
    }
    println!();
    println!("{} snapshots found", refs.len());
    Ok(())
}
