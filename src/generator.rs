// Page generation and cleanup over a document tree

use crate::config::Config;
use crate::error::{Error, Result};
use crate::introspect::SourceIntrospector;
use crate::render::MdRenderer;
use crate::tree::{DocumentNode, DocumentTree, TreeBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Renders or removes the pages of one tree
pub struct Generator<'a> {
    tree: &'a DocumentTree,
    renderer: &'a MdRenderer,
    progress: Option<ProgressBar>,
}

impl<'a> Generator<'a> {
    pub fn new(tree: &'a DocumentTree, renderer: &'a MdRenderer) -> Self {
        Self {
            tree,
            renderer,
            progress: None,
        }
    }

    /// Show a progress bar over the tree's pages
    pub fn with_progress(mut self, verbose: bool) -> Result<Self> {
        if verbose {
            let pb = ProgressBar::new(self.tree.node_count() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .map_err(|e| Error::other(format!("Invalid progress template: {}", e)))?
                    .progress_chars("#>-"),
            );
            self.progress = Some(pb);
        }
        Ok(self)
    }

    /// Render every node, parents before children
    pub fn generate(&self) -> Result<usize> {
        let count = self.generate_node(&self.tree.root)?;
        if let Some(pb) = &self.progress {
            pb.finish_with_message("done");
        }
        Ok(count)
    }

    fn generate_node(&self, node: &DocumentNode) -> Result<usize> {
        if let Some(pb) = &self.progress {
            pb.set_message(node.dotted_name());
            pb.inc(1);
        }
        self.renderer.render(node, self.tree)?;

        let mut count = 1;
        for child in &node.children {
            count += self.generate_node(child)?;
        }
        Ok(count)
    }

    /// Delete every page the tree renders to, then prune emptied directories
    ///
    /// Missing pages are skipped. Directories that still hold other files are
    /// left in place. The output directory itself is never removed, even when
    /// the build created it, so cleaning an empty output changes nothing.
    pub fn remove(&self) -> Result<CleanReport> {
        let mut report = CleanReport::default();
        self.remove_node(&self.tree.root, true, &mut report)?;
        if let Some(pb) = &self.progress {
            pb.finish_with_message("done");
        }
        Ok(report)
    }

    fn remove_node(&self, node: &DocumentNode, is_root: bool, report: &mut CleanReport) -> Result<()> {
        if let Some(pb) = &self.progress {
            pb.set_message(node.dotted_name());
            pb.inc(1);
        }

        let path = self.renderer.output_dir().join(&node.target);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed {}", path.display());
                report.files_removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} already absent", path.display());
            }
            Err(e) => return Err(Error::io_at(&path, e)),
        }

        for child in &node.children {
            self.remove_node(child, false, report)?;
        }

        if !node.is_file || is_root {
            if let Some(dir) = path.parent() {
                self.prune(dir, report)?;
            }
        }
        Ok(())
    }

    /// Remove `dir` if it is empty and strictly inside the output directory
    fn prune(&self, dir: &Path, report: &mut CleanReport) -> Result<()> {
        let out = self.renderer.output_dir();
        if dir == out || !dir.starts_with(out) || !dir.is_dir() {
            return Ok(());
        }

        let mut entries = std::fs::read_dir(dir).map_err(|e| Error::io_at(dir, e))?;
        if entries.next().is_none() {
            std::fs::remove_dir(dir).map_err(|e| Error::io_at(dir, e))?;
            debug!("removed directory {}", dir.display());
            report.dirs_removed += 1;
        } else {
            warn!("leaving non-empty directory {}", dir.display());
            report.dirs_kept.push(dir.to_path_buf());
        }
        Ok(())
    }
}

/// Outcome of a build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Module roots that produced a tree
    pub roots: usize,
    /// Module roots with nothing to document
    pub skipped: usize,
    pub pages_generated: usize,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        format!(
            "Generated {} pages from {} module roots ({} skipped)",
            self.pages_generated, self.roots, self.skipped
        )
    }
}

/// Outcome of a clean
#[derive(Debug, Default)]
pub struct CleanReport {
    pub files_removed: usize,
    pub dirs_removed: usize,
    /// Directories left in place because they held other files
    pub dirs_kept: Vec<std::path::PathBuf>,
}

impl CleanReport {
    fn merge(&mut self, other: CleanReport) {
        self.files_removed += other.files_removed;
        self.dirs_removed += other.dirs_removed;
        self.dirs_kept.extend(other.dirs_kept);
    }

    pub fn summary(&self) -> String {
        format!(
            "Removed {} pages and {} directories, kept {} non-empty directories",
            self.files_removed,
            self.dirs_removed,
            self.dirs_kept.len()
        )
    }
}

fn build_tree(config: &Config, root: &Path) -> Result<Option<DocumentTree>> {
    TreeBuilder::new(
        root,
        &config.filter,
        config.build.generate_root_directories,
        SourceIntrospector::new()?,
    )?
    .build()
}

/// Fail when two nodes of one build would write the same page
fn check_unique_targets(trees: &[DocumentTree]) -> Result<()> {
    let mut seen: BTreeMap<&Path, &Path> = BTreeMap::new();
    for node in trees.iter().flat_map(|tree| tree.root.nodes()) {
        if let Some(previous) = seen.insert(node.target.as_path(), node.path.as_path()) {
            return Err(Error::config_validation(format!(
                "{} and {} both render to {}",
                previous.display(),
                node.path.display(),
                node.target.display()
            )));
        }
    }
    Ok(())
}

/// Render the full tree of every configured module root
///
/// Every tree is built and checked for clashing pages before anything is written.
pub fn build(config: &Config, verbose: bool) -> Result<BuildReport> {
    config.validate_for_build()?;
    let renderer = MdRenderer::new(config)?;
    let mut report = BuildReport::default();

    let mut trees = Vec::new();
    for root in &config.build.modules {
        match build_tree(config, root)? {
            Some(tree) => trees.push(tree),
            None => {
                info!("nothing to document in {}", root.display());
                report.skipped += 1;
            }
        }
    }
    check_unique_targets(&trees)?;

    for tree in &trees {
        let generator = Generator::new(tree, &renderer).with_progress(verbose)?;
        report.pages_generated += generator.generate()?;
        report.roots += 1;
    }

    Ok(report)
}

/// Delete everything `build` would produce for the same configuration
pub fn clean(config: &Config, verbose: bool) -> Result<CleanReport> {
    config.validate_for_build()?;
    let renderer = MdRenderer::new(config)?;
    let mut report = CleanReport::default();

    for root in &config.build.modules {
        let Some(tree) = build_tree(config, root)? else {
            info!("nothing to clean for {}", root.display());
            continue;
        };
        let generator = Generator::new(&tree, &renderer).with_progress(verbose)?;
        report.merge(generator.remove()?);
    }

    Ok(report)
}
