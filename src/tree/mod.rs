// Document tree construction
//
// Walks a module root and produces one `DocumentNode` per documented file or
// directory. Each node carries its introspected module and the output path it
// renders to.

use crate::config::FilterConfig;
use crate::error::{Error, Result};
use crate::introspect::Introspect;
use crate::parser::ModuleDescription;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension of documented source files
pub const SOURCE_EXT: &str = "py";
/// Extension of rendered pages
pub const OUTPUT_EXT: &str = "md";
/// Page rendered for a directory
pub const README: &str = "README.md";

/// One documented file or directory
#[derive(Debug, Clone)]
pub struct DocumentNode {
    /// Path segments relative to the scan root, empty for a directory root
    pub name: Vec<String>,
    pub is_file: bool,
    /// Name of the package the whole tree belongs to
    pub package: String,
    /// Output path, relative to the output directory
    pub target: PathBuf,
    /// Source file or directory
    pub path: PathBuf,
    pub module: ModuleDescription,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Dotted name for headings: the package name at the root
    pub fn dotted_name(&self) -> String {
        if self.name.is_empty() {
            self.package.clone()
        } else {
            self.name.join(".")
        }
    }

    /// Last name segment, used as link text
    pub fn short_name(&self) -> &str {
        self.name.last().map(String::as_str).unwrap_or(&self.package)
    }

    /// Number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(DocumentNode::count).sum::<usize>()
    }

    /// All nodes of this subtree, parents before children
    pub fn nodes(&self) -> Vec<&DocumentNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.nodes());
        }
        nodes
    }

    /// Child directories then child files, each sorted by name
    pub fn sorted_children(&self) -> (Vec<&DocumentNode>, Vec<&DocumentNode>) {
        let (mut files, mut folders): (Vec<&DocumentNode>, Vec<&DocumentNode>) =
            self.children.iter().partition(|c| c.is_file);
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));
        (folders, files)
    }
}

/// A built tree plus what the renderer needs to resolve links within it
#[derive(Debug, Clone)]
pub struct DocumentTree {
    pub root: DocumentNode,
    /// The module root the tree was built from
    pub scan_root: PathBuf,
    /// Source file -> output target, for every node with a source file
    pub pages: BTreeMap<PathBuf, PathBuf>,
}

impl DocumentTree {
    /// Check if a source path is part of this tree's project
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.scan_root)
    }

    /// Output target documenting a source file
    pub fn page_for(&self, source: &Path) -> Option<&Path> {
        self.pages.get(source).map(PathBuf::as_path)
    }

    pub fn node_count(&self) -> usize {
        self.root.count()
    }
}

/// Output target of a node
///
/// Depends only on the name path, the node kind, the package and whether
/// pages are namespaced under a root directory.
pub fn target_for(name: &[String], is_file: bool, package: &str, generate_root: bool) -> PathBuf {
    let mut target = PathBuf::new();
    if generate_root {
        target.push(package);
    }
    if is_file {
        let (dirs, last) = match name.split_last() {
            Some((last, dirs)) => (dirs, last.as_str()),
            None => (name, package),
        };
        for dir in dirs {
            target.push(dir);
        }
        target.push(format!("{}.{}", last, OUTPUT_EXT));
    } else {
        for segment in name {
            target.push(segment);
        }
        target.push(README);
    }
    target
}

/// Relative link from the page at `from` to the page at `to`
///
/// Both paths are relative to the output directory. Links always use `/`.
pub fn relative_link(from: &Path, to: &Path) -> String {
    let from_dir: Vec<Component> = from
        .parent()
        .map(|p| p.components().collect())
        .unwrap_or_default();
    let to_parts: Vec<Component> = to.components().collect();

    let common = from_dir
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from_dir.len() - common];
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Builds the document tree of one module root
pub struct TreeBuilder<'a, I: Introspect> {
    root: PathBuf,
    /// Directory modules are importable from
    base: PathBuf,
    package: String,
    /// Leading module name segments shared by every node
    prefix: Vec<String>,
    filter: &'a FilterConfig,
    ignore: Vec<glob::Pattern>,
    generate_root: bool,
    introspector: I,
}

impl<'a, I: Introspect> TreeBuilder<'a, I> {
    /// Create a builder for the module root at `root`
    pub fn new(
        root: &Path,
        filter: &'a FilterConfig,
        generate_root: bool,
        introspector: I,
    ) -> Result<Self> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|e| Error::io_at(root, e))?;
        let base = root.parent().unwrap_or(Path::new("/")).to_path_buf();

        let (package, prefix) = if root.is_file() {
            let stem = root
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            (stem, Vec::new())
        } else {
            let dir = root
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            (dir.clone(), vec![dir])
        };

        let ignore = filter
            .ignore_files
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            root,
            base,
            package,
            prefix,
            filter,
            ignore,
            generate_root,
            introspector,
        })
    }

    /// Build the tree; `None` means there is nothing to document
    pub fn build(mut self) -> Result<Option<DocumentTree>> {
        let root_path = self.root.clone();
        let node = if root_path.is_file() {
            let name = vec![self.package.clone()];
            self.build_file(&root_path, name)?
        } else {
            self.build_dir(&root_path, Vec::new())?
        };

        Ok(node.map(|root| {
            let pages = root
                .nodes()
                .into_iter()
                .filter_map(|n| Some((n.module.path.clone()?, n.target.clone())))
                .collect();
            DocumentTree {
                root,
                scan_root: root_path,
                pages,
            }
        }))
    }

    fn build_file(&mut self, path: &Path, name: Vec<String>) -> Result<Option<DocumentNode>> {
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXT) {
            return Ok(None);
        }
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !self.accepts(file_name) || self.is_ignored(path) {
            debug!("skipping {}", path.display());
            return Ok(None);
        }

        let module = self
            .introspector
            .introspect(&self.base, &self.module_name(&name))?;
        if self.filter.ignore_non_documented && module.docstring.is_none() {
            debug!("skipping undocumented {}", path.display());
            return Ok(None);
        }

        Ok(Some(self.node(name, true, path, module)))
    }

    fn build_dir(&mut self, path: &Path, name: Vec<String>) -> Result<Option<DocumentNode>> {
        if !name.is_empty() {
            let dir_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if (self.filter.ignore_dot_files && dir_name.starts_with('.')) || self.is_ignored(path) {
                debug!("skipping {}", path.display());
                return Ok(None);
            }
        }
        if !self.has_source_files(path)? {
            debug!("no sources under {}", path.display());
            return Ok(None);
        }

        let module = self
            .introspector
            .introspect(&self.base, &self.module_name(&name))?;
        let mut node = self.node(name, false, path, module);

        for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry?;
            let mut child_name = node.name.clone();
            let child = if entry.file_type().is_dir() {
                child_name.push(entry.file_name().to_string_lossy().into_owned());
                self.build_dir(entry.path(), child_name)?
            } else {
                let stem = entry
                    .path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                child_name.push(stem);
                self.build_file(entry.path(), child_name)?
            };
            if let Some(child) = child {
                node.children.push(child);
            }
        }

        Ok(Some(node))
    }

    fn node(&self, name: Vec<String>, is_file: bool, path: &Path, module: ModuleDescription) -> DocumentNode {
        DocumentNode {
            target: target_for(&name, is_file, &self.package, self.generate_root),
            name,
            is_file,
            package: self.package.clone(),
            path: path.to_path_buf(),
            module,
            children: Vec::new(),
        }
    }

    fn module_name(&self, name: &[String]) -> String {
        self.prefix
            .iter()
            .chain(name.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The name filter: dot and underscore prefixes
    fn accepts(&self, file_name: &str) -> bool {
        !((self.filter.ignore_dot_files && file_name.starts_with('.'))
            || (self.filter.ignore_underscore_files && file_name.starts_with('_')))
    }

    /// Check if a directory subtree holds any source file
    fn has_source_files(&self, dir: &Path) -> Result<bool> {
        let skip_hidden = self.filter.ignore_dot_files;
        let walker = WalkDir::new(dir).into_iter().filter_entry(|e| {
            e.depth() == 0 || !(skip_hidden && e.file_name().to_string_lossy().starts_with('.'))
        });
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.ignore.iter().any(|p| p.matches_path(relative))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::SourceIntrospector;
    use std::fs;
    use tempfile::TempDir;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_project() -> TempDir {
        let dir = TempDir::new().unwrap();

        // pkg/
        //   __init__.py
        //   a.py
        //   _private.py
        //   .hidden.py
        //   notes.txt
        //   sub/b.py
        //   empty/readme.txt
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(pkg.join("sub")).unwrap();
        fs::create_dir_all(pkg.join("empty")).unwrap();
        fs::write(pkg.join("__init__.py"), "\"\"\"The package.\"\"\"\n").unwrap();
        fs::write(pkg.join("a.py"), "\"\"\"A\"\"\"\ndef f(): pass\n").unwrap();
        fs::write(pkg.join("_private.py"), "X = 1\n").unwrap();
        fs::write(pkg.join(".hidden.py"), "Y = 1\n").unwrap();
        fs::write(pkg.join("notes.txt"), "notes").unwrap();
        fs::write(pkg.join("sub").join("b.py"), "\"\"\"B\"\"\"\n").unwrap();
        fs::write(pkg.join("empty").join("readme.txt"), "").unwrap();

        dir
    }

    fn build(root: &Path, filter: &FilterConfig, generate_root: bool) -> Option<DocumentTree> {
        let introspector = SourceIntrospector::new().unwrap();
        TreeBuilder::new(root, filter, generate_root, introspector)
            .unwrap()
            .build()
            .unwrap()
    }

    fn child<'a>(node: &'a DocumentNode, name: &str) -> Option<&'a DocumentNode> {
        node.children.iter().find(|c| c.short_name() == name)
    }

    #[test]
    fn test_target_for_file() {
        assert_eq!(
            target_for(&names(&["sub", "b"]), true, "pkg", true),
            PathBuf::from("pkg/sub/b.md")
        );
        assert_eq!(
            target_for(&names(&["sub", "b"]), true, "pkg", false),
            PathBuf::from("sub/b.md")
        );
    }

    #[test]
    fn test_target_for_directory() {
        assert_eq!(target_for(&[], false, "pkg", true), PathBuf::from("pkg/README.md"));
        assert_eq!(target_for(&[], false, "pkg", false), PathBuf::from("README.md"));
        assert_eq!(
            target_for(&names(&["sub"]), false, "pkg", true),
            PathBuf::from("pkg/sub/README.md")
        );
    }

    #[test]
    fn test_relative_link() {
        let link = |a: &str, b: &str| relative_link(Path::new(a), Path::new(b));
        assert_eq!(link("pkg/README.md", "pkg/a.md"), "a.md");
        assert_eq!(link("pkg/README.md", "pkg/sub/README.md"), "sub/README.md");
        assert_eq!(link("pkg/sub/b.md", "pkg/a.md"), "../a.md");
        assert_eq!(link("a.md", "sub/b.md"), "sub/b.md");
        assert_eq!(link("x/y/z.md", "w.md"), "../../w.md");
    }

    #[test]
    fn test_build_directory_tree() {
        let project = create_test_project();
        let tree = build(&project.path().join("pkg"), &FilterConfig::default(), true).unwrap();

        let root = &tree.root;
        assert!(root.name.is_empty());
        assert!(!root.is_file);
        assert_eq!(root.package, "pkg");
        assert_eq!(root.dotted_name(), "pkg");
        assert_eq!(root.target, PathBuf::from("pkg/README.md"));
        assert_eq!(root.module.docstring.as_deref(), Some("The package."));

        // a.py and sub/ only
        assert_eq!(root.children.len(), 2);
        let a = child(root, "a").unwrap();
        assert!(a.is_file);
        assert_eq!(a.module.name, "pkg.a");
        assert_eq!(a.target, PathBuf::from("pkg/a.md"));

        let sub = child(root, "sub").unwrap();
        assert!(!sub.is_file);
        assert_eq!(sub.target, PathBuf::from("pkg/sub/README.md"));
        let b = child(sub, "b").unwrap();
        assert_eq!(b.name, names(&["sub", "b"]));
        assert_eq!(b.dotted_name(), "sub.b");
        assert_eq!(b.module.name, "pkg.sub.b");
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_directory_node_describes_its_package() {
        let project = create_test_project();
        let pkg = project.path().join("pkg");
        fs::write(pkg.join("sub").join("__init__.py"), "\"\"\"PACKAGE DOC\"\"\"\n").unwrap();
        fs::write(pkg.join("sub.py"), "\"\"\"MODULE DOC\"\"\"\n\ndef only_in_module(): pass\n")
            .unwrap();
        let tree = build(&pkg, &FilterConfig::default(), true).unwrap();

        let sub = tree
            .root
            .children
            .iter()
            .find(|c| !c.is_file && c.short_name() == "sub")
            .unwrap();
        assert_eq!(sub.module.docstring.as_deref(), Some("PACKAGE DOC"));
        assert!(sub.module.functions.is_empty());
    }

    #[test]
    fn test_children_targets_nested_under_parent() {
        let project = create_test_project();
        let tree = build(&project.path().join("pkg"), &FilterConfig::default(), true).unwrap();
        for node in tree.root.nodes() {
            let dir = node.target.parent().unwrap();
            for child in &node.children {
                assert!(child.target.starts_with(dir));
            }
        }
    }

    #[test]
    fn test_pages_map_sources_to_targets() {
        let project = create_test_project();
        let tree = build(&project.path().join("pkg"), &FilterConfig::default(), false).unwrap();
        let a = tree.scan_root.join("a.py");
        assert_eq!(tree.page_for(&a), Some(Path::new("a.md")));
        assert_eq!(
            tree.page_for(&tree.scan_root.join("__init__.py")),
            Some(Path::new("README.md"))
        );
        assert!(tree.contains(&a));
    }

    #[test]
    fn test_filters_can_be_disabled() {
        let project = create_test_project();
        let filter = FilterConfig {
            ignore_dot_files: false,
            ignore_underscore_files: false,
            ..Default::default()
        };
        let tree = build(&project.path().join("pkg"), &filter, true).unwrap();
        assert!(child(&tree.root, "_private").is_some());
        assert!(child(&tree.root, ".hidden").is_some());
        assert!(child(&tree.root, "__init__").is_some());
    }

    #[test]
    fn test_ignore_files_patterns() {
        let project = create_test_project();
        let filter = FilterConfig {
            ignore_files: vec!["sub".to_string(), "a.py".to_string()],
            ..Default::default()
        };
        let tree = build(&project.path().join("pkg"), &filter, true).unwrap();
        assert!(tree.root.children.is_empty());
    }

    #[test]
    fn test_ignore_non_documented() {
        let project = create_test_project();
        fs::write(project.path().join("pkg").join("plain.py"), "Z = 1\n").unwrap();
        let filter = FilterConfig {
            ignore_non_documented: true,
            ..Default::default()
        };
        let tree = build(&project.path().join("pkg"), &filter, true).unwrap();
        assert!(child(&tree.root, "plain").is_none());
        assert!(child(&tree.root, "a").is_some());
    }

    #[test]
    fn test_single_file_root() {
        let project = create_test_project();
        let tree = build(&project.path().join("pkg").join("a.py"), &FilterConfig::default(), false)
            .unwrap();
        assert!(tree.root.is_file);
        assert_eq!(tree.root.package, "a");
        assert_eq!(tree.root.name, names(&["a"]));
        assert_eq!(tree.root.module.name, "a");
        assert_eq!(tree.root.target, PathBuf::from("a.md"));
    }

    #[test]
    fn test_filtered_single_file_root_yields_nothing() {
        let project = create_test_project();
        let root = project.path().join("pkg").join("_private.py");
        assert!(build(&root, &FilterConfig::default(), true).is_none());
    }

    #[test]
    fn test_directory_without_sources_yields_nothing() {
        let project = create_test_project();
        assert!(build(&project.path().join("pkg").join("empty"), &FilterConfig::default(), true)
            .is_none());
    }

    #[test]
    fn test_missing_root() {
        let introspector = SourceIntrospector::new().unwrap();
        let filter = FilterConfig::default();
        let result = TreeBuilder::new(Path::new("/nonexistent/pkg"), &filter, true, introspector);
        assert!(matches!(result, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_load_failure_propagates() {
        let project = create_test_project();
        fs::write(project.path().join("pkg").join("broken.py"), "def (:\n").unwrap();
        let introspector = SourceIntrospector::new().unwrap();
        let filter = FilterConfig::default();
        let result = TreeBuilder::new(&project.path().join("pkg"), &filter, true, introspector)
            .unwrap()
            .build();
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_sorted_children() {
        let project = create_test_project();
        fs::write(project.path().join("pkg").join("Z.py"), "").unwrap();
        let tree = build(&project.path().join("pkg"), &FilterConfig::default(), true).unwrap();
        let (folders, files) = tree.root.sorted_children();
        let folder_names: Vec<&str> = folders.iter().map(|n| n.short_name()).collect();
        let file_names: Vec<&str> = files.iter().map(|n| n.short_name()).collect();
        assert_eq!(folder_names, vec!["sub"]);
        assert_eq!(file_names, vec!["Z", "a"]);
    }
}
