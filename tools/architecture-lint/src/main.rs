//! `cargo run -p architecture-lint` from anywhere inside the workspace.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stderr = io::stderr().lock();
    let Some(root) = workspace_root() else {
        let _ = writeln!(stderr, "no workspace Cargo.toml above the current directory");
        return ExitCode::FAILURE;
    };
    if let Err(err) = architecture_lint::check_backend(&root.join("backend")) {
        let _ = write!(stderr, "{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// The nearest ancestor whose manifest declares `[workspace]`, searched from
/// the current directory and then from this crate's manifest directory.
fn workspace_root() -> Option<PathBuf> {
    let starts = [
        env::current_dir().ok(),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ];
    starts
        .into_iter()
        .flatten()
        .find_map(|start| start.ancestors().find(|dir| is_workspace(dir)).map(Path::to_path_buf))
}

fn is_workspace(dir: &Path) -> bool {
    fs::read_to_string(dir.join("Cargo.toml"))
        .is_ok_and(|manifest| manifest.lines().any(|line| line.trim() == "[workspace]"))
}
