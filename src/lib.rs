//! Docmark - Generate Markdown documentation from Python sources
//!
//! Walks a source tree, describes each module from its source and writes
//! one linked Markdown page per file and directory.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod introspect;
pub mod parser;
pub mod render;
pub mod tree;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use generator::{build, clean, BuildReport, CleanReport, Generator};
pub use introspect::{Introspect, SourceIntrospector};
pub use parser::{ClassDescription, FunctionDescription, MemberKind, ModuleDescription};
pub use render::MdRenderer;
pub use tree::{DocumentNode, DocumentTree, TreeBuilder};
