use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "docmark.toml";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub filter: FilterConfig,
    pub render: RenderConfig,
}

/// What to document and where the pages go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Files or directories to document
    pub modules: Vec<PathBuf>,
    /// Output directory where markdown is generated
    pub output_directory: PathBuf,
    /// Namespace every page under a directory named after its module root
    pub generate_root_directories: bool,
    /// Prepended to every page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_file: Option<PathBuf>,
    /// Appended to every page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_file: Option<PathBuf>,
    /// Write the docmark version at the end of every page
    pub build_version: bool,
}

/// Which source units become pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Skip files starting with a dot
    pub ignore_dot_files: bool,
    /// Skip files starting with an underscore
    pub ignore_underscore_files: bool,
    /// Glob patterns, relative to the module root, for files and directories to skip
    pub ignore_files: Vec<String>,
    /// Skip files without a module docstring
    pub ignore_non_documented: bool,
}

/// What each page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub module_name_heading: bool,
    pub show_module_docstring: bool,
    pub show_relative_imports: bool,
    pub link_relative_imports: bool,
    pub show_module_variables: bool,
    pub show_module_functions: bool,
    pub show_module_classes: bool,
    pub show_class_variables: bool,
    pub show_class_methods: bool,
    pub show_classmethods: bool,
    pub show_staticmethods: bool,
    pub show_types: bool,
    pub keep_module_function_order: bool,
    pub keep_module_class_order: bool,
    pub keep_class_method_order: bool,
    pub reindent_docs: bool,
    pub trim_doc_blank_lines: bool,
    pub add_component_linebreaks: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            output_directory: PathBuf::from("./docs"),
            generate_root_directories: true,
            header_file: None,
            footer_file: None,
            build_version: true,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_dot_files: true,
            ignore_underscore_files: true,
            ignore_files: Vec::new(),
            ignore_non_documented: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            module_name_heading: true,
            show_module_docstring: true,
            show_relative_imports: true,
            link_relative_imports: false,
            show_module_variables: true,
            show_module_functions: true,
            show_module_classes: true,
            show_class_variables: true,
            show_class_methods: true,
            show_classmethods: true,
            show_staticmethods: true,
            show_types: true,
            keep_module_function_order: false,
            keep_module_class_order: false,
            keep_class_method_order: true,
            reindent_docs: true,
            trim_doc_blank_lines: true,
            add_component_linebreaks: true,
        }
    }
}

/// Command-line values layered over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub modules: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub no_root_directories: bool,
    pub include_dot_files: bool,
    pub include_underscore_files: bool,
    pub ignore: Vec<String>,
    pub keep_order: bool,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io_at(path, e))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write this config as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_at(parent, e))?;
        }
        std::fs::write(path, contents).map_err(|e| Error::io_at(path, e))?;
        Ok(())
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, overrides: Overrides) {
        if !overrides.modules.is_empty() {
            self.build.modules = overrides.modules;
        }

        if let Some(out) = overrides.output {
            self.build.output_directory = out;
        }

        if overrides.no_root_directories {
            self.build.generate_root_directories = false;
        }

        if overrides.include_dot_files {
            self.filter.ignore_dot_files = false;
        }

        if overrides.include_underscore_files {
            self.filter.ignore_underscore_files = false;
        }

        if !overrides.ignore.is_empty() {
            self.filter.ignore_files.extend(overrides.ignore);
        }

        if overrides.keep_order {
            self.render.keep_module_function_order = true;
            self.render.keep_module_class_order = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.build.output_directory.as_os_str().is_empty() {
            return Err(Error::config_validation("output_directory cannot be empty"));
        }

        for pattern in &self.filter.ignore_files {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }

    /// Validate and additionally require at least one module root
    pub fn validate_for_build(&self) -> Result<()> {
        self.validate()?;
        if self.build.modules.is_empty() {
            return Err(Error::config_validation("no modules configured"));
        }
        Ok(())
    }
}
