// Module introspection
//
// The tree builder asks an `Introspect` implementation for the description
// of each dotted module name. `SourceIntrospector` answers from the Python
// sources on disk.

mod imports;

pub use imports::ImportResolver;

use crate::error::{Error, Result};
use crate::parser::{ModuleDescription, PythonParser};
use std::path::{Path, PathBuf};

/// Produces the description of a module importable from `base`
pub trait Introspect {
    fn introspect(&mut self, base: &Path, module: &str) -> Result<ModuleDescription>;
}

/// Introspection by parsing Python sources
pub struct SourceIntrospector {
    parser: PythonParser,
}

impl SourceIntrospector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: PythonParser::new()?,
        })
    }

    /// Describe a single file, resolving imports against its directory
    pub fn inspect_file(&mut self, path: &Path) -> Result<ModuleDescription> {
        if !path.is_file() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }
        let module = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let base = path.parent().unwrap_or(Path::new(""));
        self.describe(base, &module, path)
    }

    fn describe(&mut self, base: &Path, module: &str, file: &Path) -> Result<ModuleDescription> {
        let mut description = self.parser.parse_file(file, module)?;

        let resolver = ImportResolver::new(base.to_path_buf());
        for (name, binding) in description.imports.iter_mut() {
            binding.path = resolver.resolve(name, binding, file);
        }

        Ok(description)
    }
}

impl Introspect for SourceIntrospector {
    fn introspect(&mut self, base: &Path, module: &str) -> Result<ModuleDescription> {
        let candidate = base.join(module_path(module));

        // A regular package shadows a same-named module file
        let init = candidate.join("__init__.py");
        if init.is_file() {
            return self.describe(base, module, &init);
        }

        let file = candidate.with_extension("py");
        if file.is_file() {
            return self.describe(base, module, &file);
        }

        // Namespace package: importable, nothing to describe
        if candidate.is_dir() {
            return Ok(ModuleDescription::new(module, None));
        }

        Err(Error::load(
            module,
            format!("no source found under {}", base.display()),
        ))
    }
}

/// Relative path of a dotted module name
///
/// An empty segment marks a dot-prefixed name: `pkg..hidden` is `pkg/.hidden`.
fn module_path(module: &str) -> PathBuf {
    let mut path = PathBuf::new();
    let mut dotted = false;
    for segment in module.split('.') {
        if segment.is_empty() {
            dotted = true;
        } else if dotted {
            path.push(format!(".{}", segment));
            dotted = false;
        } else {
            path.push(segment);
        }
    }
    path
}
