//! Layer boundary lint for the `abroad` backend.
//!
//! Files under `backend/src/{domain,inbound,outbound}` are parsed with `syn`
//! and every path they mention, in `use` trees and inline, is resolved to a
//! layer or an external crate. Each layer has a boundary:
//!
//! | layer      | may not name          | may not use crates                                  |
//! |------------|-----------------------|-----------------------------------------------------|
//! | `domain`   | `inbound`, `outbound` | Actix stack, Diesel, reqwest, zip, argon2, utoipa   |
//! | `inbound`  | `outbound`            | Diesel, reqwest, zip, argon2                        |
//! | `outbound` | `inbound`             | Actix stack                                         |
//!
//! `server`, `middleware` and `main.rs` wire the layers together and are not
//! checked.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use syn::visit::Visit;
use walkdir::WalkDir;

/// Name the backend crate is imported under by its binaries and tests.
const CRATE_NAME: &str = "abroad";

/// External crates grouped by the concern they bring into a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrateGroup {
    ActixStack,
    Database,
    OutboundIo,
    ApiDocs,
}

impl CrateGroup {
    const ALL: [Self; 4] = [
        Self::ActixStack,
        Self::Database,
        Self::OutboundIo,
        Self::ApiDocs,
    ];

    pub const fn crates(self) -> &'static [&'static str] {
        match self {
            Self::ActixStack => &[
                "actix",
                "actix_multipart",
                "actix_service",
                "actix_session",
                "actix_web",
            ],
            Self::Database => &["diesel", "diesel_async", "diesel_migrations"],
            Self::OutboundIo => &["reqwest", "zip", "argon2"],
            Self::ApiDocs => &["utoipa"],
        }
    }

    fn containing(krate: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.crates().iter().any(|name| *name == krate))
    }
}

/// A top-level module of the backend that the lint polices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    pub const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    pub const fn module(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn named(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.module() == name)
    }

    /// Layer owning a path relative to `backend/src`.
    pub fn owning(file: &Path) -> Option<Self> {
        file.components()
            .next()
            .and_then(|first| first.as_os_str().to_str())
            .and_then(Self::named)
    }

    const fn may_name(self, other: Self) -> bool {
        match (self, other) {
            (Self::Domain, Self::Domain) => true,
            (Self::Domain, _) => false,
            (Self::Inbound, Self::Outbound) | (Self::Outbound, Self::Inbound) => false,
            _ => true,
        }
    }

    const fn may_use(self, group: CrateGroup) -> bool {
        match self {
            Self::Domain => false,
            Self::Inbound => matches!(group, CrateGroup::ActixStack | CrateGroup::ApiDocs),
            Self::Outbound => !matches!(group, CrateGroup::ActixStack),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module())
    }
}

/// What a file did wrong.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Breach {
    /// Named an item in a layer it must not depend on.
    Layer { from: Layer, to: Layer },
    /// Used an external crate its layer must not depend on.
    Crate { layer: Layer, krate: String },
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layer { from, to } => write!(f, "{from} module must not depend on crate::{to}"),
            Self::Crate { layer, krate } => {
                write!(f, "{layer} module must not depend on external crate `{krate}`")
            }
        }
    }
}

/// One breach, located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub breach: Breach,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.breach)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("reading backend sources: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("reading {}: {source}", .file.display())]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot lint {}: {message}", .file.display())]
    Unlintable { file: PathBuf, message: String },
    #[error("{} layer boundary violation(s):\n{}", .0.len(), render(.0))]
    Violations(Vec<Violation>),
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("  {violation}\n"))
        .collect()
}

/// A source file, with its path relative to `backend/src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Where a mentioned path resolves.
#[derive(Debug, PartialEq, Eq)]
enum Resolved<'a> {
    Layer(Layer),
    Crate(&'a str),
    Elsewhere,
}

fn resolve(path: &[String]) -> Resolved<'_> {
    let Some(head) = path.first().map(String::as_str) else {
        return Resolved::Elsewhere;
    };
    let internal = matches!(head, "crate" | "self" | "super") || head == CRATE_NAME;
    if !internal {
        return Layer::named(head).map_or(Resolved::Crate(head), Resolved::Layer);
    }
    path.iter()
        .skip(1)
        .map(String::as_str)
        .find(|segment| !matches!(*segment, "self" | "super"))
        .and_then(Layer::named)
        .map_or(Resolved::Elsewhere, Resolved::Layer)
}

fn breaches(layer: Layer, syntax: &syn::File) -> BTreeSet<Breach> {
    let mut mentioned = Mentions::default();
    mentioned.visit_file(syntax);
    mentioned
        .0
        .iter()
        .filter_map(|path| match resolve(path) {
            Resolved::Layer(to) if !layer.may_name(to) => Some(Breach::Layer { from: layer, to }),
            Resolved::Crate(krate) => CrateGroup::containing(krate)
                .filter(|group| !layer.may_use(*group))
                .map(|_| Breach::Crate {
                    layer,
                    krate: krate.to_owned(),
                }),
            _ => None,
        })
        .collect()
}

/// Check in-memory files. Every file must belong to a layer.
///
/// ```
/// use architecture_lint::{SourceFile, check_sources};
///
/// let ok = SourceFile::new("domain/error.rs", "pub struct Error;");
/// assert!(check_sources(&[ok]).is_ok());
/// ```
pub fn check_sources(files: &[SourceFile]) -> Result<(), LintError> {
    let mut violations = Vec::new();
    for file in files {
        let unlintable = |message: String| LintError::Unlintable {
            file: file.path.clone(),
            message,
        };
        let layer = Layer::owning(&file.path)
            .ok_or_else(|| unlintable("not under domain/, inbound/ or outbound/".to_owned()))?;
        let syntax = syn::parse_file(&file.text).map_err(|err| unlintable(err.to_string()))?;
        violations.extend(breaches(layer, &syntax).into_iter().map(|breach| Violation {
            file: file.path.clone(),
            breach,
        }));
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LintError::Violations(violations))
    }
}

/// Check every `.rs` file under the layer directories of `backend_dir/src`.
pub fn check_backend(backend_dir: &Path) -> Result<(), LintError> {
    let src = backend_dir.join("src");
    let mut files = Vec::new();
    for layer in Layer::ALL {
        let root = src.join(layer.module());
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            let text = std::fs::read_to_string(path).map_err(|source| LintError::Read {
                file: path.to_path_buf(),
                source,
            })?;
            let relative = path.strip_prefix(&src).unwrap_or(path);
            files.push(SourceFile::new(relative, text));
        }
    }
    check_sources(&files)
}

/// Every path a file mentions, as identifier segments. `use` trees are
/// flattened so grouped imports resolve per leaf.
#[derive(Default)]
struct Mentions(BTreeSet<Vec<String>>);

impl Mentions {
    fn flatten(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        let leaf = match tree {
            syn::UseTree::Path(step) => {
                prefix.push(step.ident.to_string());
                self.flatten(&step.tree, prefix);
                prefix.pop();
                return;
            }
            syn::UseTree::Group(group) => {
                group.items.iter().for_each(|item| self.flatten(item, prefix));
                return;
            }
            syn::UseTree::Name(name) => name.ident.to_string(),
            syn::UseTree::Rename(rename) => rename.ident.to_string(),
            syn::UseTree::Glob(_) => "*".to_owned(),
        };
        let mut path = prefix.clone();
        path.push(leaf);
        self.0.insert(path);
    }
}

impl<'ast> Visit<'ast> for Mentions {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.flatten(&node.tree, &mut Vec::new());
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        let path: Vec<String> = node.segments.iter().map(|seg| seg.ident.to_string()).collect();
        if !path.is_empty() {
            self.0.insert(path);
        }
        syn::visit::visit_path(self, node);
    }
}

#[cfg(test)]
mod tests;
