// Markdown rendering of document nodes

mod class;
mod function;
pub mod text;

pub use class::ClassRenderer;
pub use function::FunctionRenderer;

use crate::config::{Config, RenderConfig};
use crate::error::{Error, Result};
use crate::parser::ImportBinding;
use crate::tree::{relative_link, DocumentNode, DocumentTree};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use text::{format_doc, reindent};
use tracing::{debug, info};

/// Writes one Markdown page per document node
pub struct MdRenderer {
    config: RenderConfig,
    header: String,
    footer: String,
    build_version: bool,
    output_dir: PathBuf,
    function_renderer: FunctionRenderer,
    class_renderer: ClassRenderer,
}

impl MdRenderer {
    /// Create a renderer, reading the configured header and footer
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            config: config.render.clone(),
            header: read_optional(config.build.header_file.as_deref())?,
            footer: read_optional(config.build.footer_file.as_deref())?,
            build_version: config.build.build_version,
            output_dir: config.build.output_directory.clone(),
            function_renderer: FunctionRenderer::new(config.render.clone()),
            class_renderer: ClassRenderer::new(config.render.clone()),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the page of `node`, returning its path
    pub fn render(&self, node: &DocumentNode, tree: &DocumentTree) -> Result<PathBuf> {
        let path = self.output_dir.join(&node.target);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_at(parent, e))?;
        }

        info!("rendering {}", path.display());
        std::fs::write(&path, self.render_page(node, tree)).map_err(|e| Error::io_at(&path, e))?;
        Ok(path)
    }

    /// The page text of `node`
    pub fn render_page(&self, node: &DocumentNode, tree: &DocumentTree) -> String {
        let mut page = String::new();
        page.push_str(&self.header);

        if self.config.module_name_heading {
            page.push_str(&format!("# {}\n\n", node.dotted_name()));
        }

        if self.config.show_module_docstring {
            if let Some(doc) = &node.module.docstring {
                let doc = format_doc(doc, &self.config, 0);
                if !doc.trim().is_empty() {
                    page.push_str(&doc);
                    page.push_str("\n\n---\n\n");
                }
            }
        }

        page.push_str(&self.substructure(node));
        page.push_str(&self.module_elements(node, tree));
        page.push_str(&self.footer);

        if self.build_version {
            page.push_str(&format!(
                "\n<sub>Generated by docmark {}</sub>\n",
                env!("CARGO_PKG_VERSION")
            ));
        }

        page
    }

    /// Links to child folders, then child files
    fn substructure(&self, node: &DocumentNode) -> String {
        let (folders, files) = node.sorted_children();
        let mut s = String::new();

        for (title, children) in [("Folders", folders), ("Files", files)] {
            if children.is_empty() {
                continue;
            }
            s.push_str(&format!("### {}\n\n", title));
            for child in children {
                s.push_str(&format!(
                    "* [{}]({})\n",
                    child.short_name(),
                    relative_link(&node.target, &child.target)
                ));
            }
            s.push('\n');
        }

        s
    }

    fn module_elements(&self, node: &DocumentNode, tree: &DocumentTree) -> String {
        let module = &node.module;
        let mut s = String::new();

        if self.config.show_relative_imports {
            s.push_str(&self.dependencies(node, tree));
        }

        if self.config.show_module_variables && !module.globals.is_empty() {
            s.push_str("### Variables\n\n```python\n");
            for global in &module.globals {
                s.push_str(&reindent(&global.source, 0));
                s.push('\n');
            }
            s.push_str("```\n\n");
        }

        let functions = if self.config.show_module_functions {
            module.ordered_functions(self.config.keep_module_function_order)
        } else {
            Vec::new()
        };
        let classes = if self.config.show_module_classes {
            module.ordered_classes(self.config.keep_module_class_order)
        } else {
            Vec::new()
        };

        if !functions.is_empty() {
            s.push_str("### Functions\n\n");
            for func in &functions {
                s.push_str(&format!("* {}\n", self.function_renderer.link(func)));
            }
            s.push('\n');
        }

        if !classes.is_empty() {
            s.push_str("### Classes\n\n");
            for cls in &classes {
                s.push_str(&format!("* {}\n", self.class_renderer.link(cls)));
            }
            s.push('\n');
        }

        if functions.is_empty() && classes.is_empty() {
            return s;
        }

        s.push_str(self.br());
        for func in &functions {
            s.push_str(&self.function_renderer.render(func));
            s.push_str(self.br());
        }
        for cls in &classes {
            s.push_str(&self.class_renderer.render(cls));
            s.push_str(self.br());
        }

        s
    }

    /// Imports of files inside the scanned project, grouped by source module
    fn dependencies(&self, node: &DocumentNode, tree: &DocumentTree) -> String {
        let mut plain: Vec<String> = Vec::new();
        let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for (name, binding) in &node.module.imports {
            let Some(path) = binding.path.as_deref().filter(|p| tree.contains(p)) else {
                debug!("not listing external import {}", name);
                continue;
            };
            let text = self.import_text(name, binding, path, node, tree);
            if binding.is_plain() {
                plain.push(format!("* import {}\n", text));
            } else {
                grouped.entry(binding.source.as_str()).or_default().push(text);
            }
        }

        if plain.is_empty() && grouped.is_empty() {
            return String::new();
        }

        let mut s = String::from("### Dependencies\n\n");
        for line in plain {
            s.push_str(&line);
        }
        for (source, names) in grouped {
            s.push_str(&format!("* from {} import {}\n", source, names.join(", ")));
        }
        s.push('\n');
        s
    }

    fn import_text(
        &self,
        name: &str,
        binding: &ImportBinding,
        path: &Path,
        node: &DocumentNode,
        tree: &DocumentTree,
    ) -> String {
        let text = match &binding.alias {
            Some(alias) => format!("{} as {}", name, alias),
            None => name.to_string(),
        };
        if !self.config.link_relative_imports {
            return text;
        }
        match tree.page_for(path) {
            Some(target) => format!("[{}]({})", text, relative_link(&node.target, target)),
            None => text,
        }
    }

    fn br(&self) -> &'static str {
        if self.config.add_component_linebreaks {
            "---\n\n"
        } else {
            ""
        }
    }
}

/// Contents of an optional file, empty when unset or absent
fn read_optional(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.is_file() => {
            std::fs::read_to_string(path).map_err(|e| Error::io_at(path, e))
        }
        Some(path) => {
            debug!("{} not found, using empty text", path.display());
            Ok(String::new())
        }
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::SourceIntrospector;
    use crate::tree::TreeBuilder;
    use std::fs;
    use tempfile::TempDir;

    const MODULE_A: &str = r#""""Module A.

    Longer description.
"""
from .sub import b
from . import helpers
import os

LIMIT = 10
NAMES = [
        "x",
    ]


def zeta(x: int) -> int:
    """Last letter."""
    return x


def alpha():
    pass


class Zed(Base):
    """A zed."""


class Able:
    pass
"#;

    fn create_test_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(pkg.join("sub")).unwrap();
        fs::write(pkg.join("__init__.py"), "\"\"\"The package.\"\"\"\n").unwrap();
        fs::write(pkg.join("a.py"), MODULE_A).unwrap();
        fs::write(pkg.join("helpers.py"), "").unwrap();
        fs::write(pkg.join("sub").join("b.py"), "\"\"\"B\"\"\"\n").unwrap();
        dir
    }

    fn build_tree(root: &Path, config: &Config) -> DocumentTree {
        let introspector = SourceIntrospector::new().unwrap();
        TreeBuilder::new(
            root,
            &config.filter,
            config.build.generate_root_directories,
            introspector,
        )
        .unwrap()
        .build()
        .unwrap()
        .unwrap()
    }

    fn page(config: &Config, name: &str) -> String {
        let project = create_test_project();
        let tree = build_tree(&project.path().join("pkg"), config);
        let renderer = MdRenderer::new(config).unwrap();
        let node = tree
            .root
            .nodes()
            .into_iter()
            .find(|n| n.dotted_name() == name)
            .unwrap();
        renderer.render_page(node, &tree)
    }

    fn no_version() -> Config {
        let mut config = Config::default();
        config.build.build_version = false;
        config
    }

    #[test]
    fn test_root_page() {
        let page = page(&no_version(), "pkg");
        assert_eq!(
            page,
            "# pkg\n\nThe package.\n\n---\n\n\
             ### Folders\n\n* [sub](sub/README.md)\n\n\
             ### Files\n\n* [a](a.md)\n* [helpers](helpers.md)\n\n"
        );
    }

    #[test]
    fn test_module_page_layout() {
        let page = page(&no_version(), "a");

        assert!(page.starts_with("# a\n\nModule A.\n\nLonger description.\n\n---\n\n"));
        assert!(page.contains(
            "### Variables\n\n```python\nLIMIT = 10\nNAMES = [\n        \"x\",\n    ]\n```\n\n"
        ));
        assert!(page.contains("### Functions\n\n* [alpha `()`](#alpha)\n* [zeta `(x: int) -> int`](#zeta)\n\n"));
        assert!(page.contains("### Classes\n\n* [Able](#Able)\n* [Zed (Base)](#Zed)\n\n---\n\n"));
        assert!(page.contains("<a id=\"zeta\"></a>\n\n## zeta `(x: int) -> int`\n\nLast letter.\n\n---\n\n"));
        assert!(page.contains("<a id=\"Zed\"></a>\n\n## Zed (Base)\n\nA zed.\n\n---\n\n"));
    }

    #[test]
    fn test_dependencies_only_project_files() {
        let page = page(&no_version(), "a");
        assert!(page.contains("### Dependencies\n\n* from . import helpers\n* from .sub import b\n\n"));
        assert!(!page.contains("import os"));
    }

    #[test]
    fn test_linked_dependencies() {
        let mut config = no_version();
        config.render.link_relative_imports = true;
        let page = page(&config, "a");
        assert!(page.contains("* from .sub import [b](sub/b.md)\n"));
        assert!(page.contains("* from . import [helpers](helpers.md)\n"));
    }

    #[test]
    fn test_declaration_order() {
        let mut config = no_version();
        config.render.keep_module_function_order = true;
        config.render.keep_module_class_order = true;
        let page = page(&config, "a");
        assert!(page.find("## zeta").unwrap() < page.find("## alpha").unwrap());
        assert!(page.find("## Zed").unwrap() < page.find("## Able").unwrap());
    }

    #[test]
    fn test_alphabetical_order() {
        let page = page(&no_version(), "a");
        assert!(page.find("## alpha").unwrap() < page.find("## zeta").unwrap());
        assert!(page.find("## Able").unwrap() < page.find("## Zed").unwrap());
    }

    #[test]
    fn test_sections_can_be_hidden() {
        let mut config = no_version();
        config.render.module_name_heading = false;
        config.render.show_module_docstring = false;
        config.render.show_relative_imports = false;
        config.render.show_module_variables = false;
        config.render.show_module_functions = false;
        config.render.show_module_classes = false;
        assert_eq!(page(&config, "a"), "");
    }

    #[test]
    fn test_no_component_linebreaks() {
        let mut config = no_version();
        config.render.add_component_linebreaks = false;
        let page = page(&config, "a");
        assert!(!page.contains("\n---\n\n<a"));
        assert!(page.contains("### Classes\n\n* [Able](#Able)\n* [Zed (Base)](#Zed)\n\n<a id=\"alpha\">"));
    }

    #[test]
    fn test_header_footer_and_version() {
        let project = create_test_project();
        let header = project.path().join("header.md");
        fs::write(&header, "HEADER\n\n").unwrap();

        let mut config = Config::default();
        config.build.header_file = Some(header);
        config.build.footer_file = Some(project.path().join("missing.md"));

        let tree = build_tree(&project.path().join("pkg").join("sub"), &config);
        let renderer = MdRenderer::new(&config).unwrap();
        let page = renderer.render_page(&tree.root, &tree);

        assert!(page.starts_with("HEADER\n\n# sub\n\n"));
        assert!(page.ends_with(&format!(
            "\n<sub>Generated by docmark {}</sub>\n",
            env!("CARGO_PKG_VERSION")
        )));
    }

    #[test]
    fn test_render_writes_target() {
        let project = create_test_project();
        let out = project.path().join("out");
        let mut config = Config::default();
        config.build.output_directory = out.clone();

        let tree = build_tree(&project.path().join("pkg"), &config);
        let renderer = MdRenderer::new(&config).unwrap();
        let b = tree
            .root
            .nodes()
            .into_iter()
            .find(|n| n.dotted_name() == "sub.b")
            .unwrap();

        let path = renderer.render(b, &tree).unwrap();
        assert_eq!(path, out.join("pkg").join("sub").join("b.md"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# sub.b\n\nB\n\n---\n\n"));
    }
}
