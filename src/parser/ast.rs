// Description types for parsed Python modules
//
// A `ModuleDescription` is the per-file snapshot the tree builder attaches to
// every document node. Maps are keyed by name so retrieval is alphabetical;
// the separate order vectors keep the lexical declaration order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything documentable in one source unit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModuleDescription {
    /// Dotted module name
    pub name: String,
    /// Source file, absent for packages without an `__init__.py`
    pub path: Option<PathBuf>,
    /// Module-level docstring
    pub docstring: Option<String>,
    /// Imported name -> where it came from
    pub imports: BTreeMap<String, ImportBinding>,
    /// Functions defined directly in this module
    pub functions: BTreeMap<String, FunctionDescription>,
    /// Classes defined directly in this module
    pub classes: BTreeMap<String, ClassDescription>,
    /// Top-level assignments in source order
    pub globals: Vec<GlobalBinding>,
    /// Function names in declaration order
    pub function_order: Vec<String>,
    /// Class names in declaration order
    pub class_order: Vec<String>,
}

impl ModuleDescription {
    /// Create an empty description for a module
    pub fn new(name: &str, path: Option<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            path,
            ..Default::default()
        }
    }

    /// Check if the module has no functions, classes or globals
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty() && self.globals.is_empty()
    }

    /// Functions sorted by declaration order, or alphabetically
    pub fn ordered_functions(&self, declaration_order: bool) -> Vec<&FunctionDescription> {
        ordered(&self.functions, &self.function_order, declaration_order)
    }

    /// Classes sorted by declaration order, or alphabetically
    pub fn ordered_classes(&self, declaration_order: bool) -> Vec<&ClassDescription> {
        ordered(&self.classes, &self.class_order, declaration_order)
    }
}

/// Values of `items` either alphabetically (map order) or by their position in
/// `order`. Names missing from `order` sort last, alphabetically.
fn ordered<'a, T>(
    items: &'a BTreeMap<String, T>,
    order: &[String],
    declaration_order: bool,
) -> Vec<&'a T> {
    let mut entries: Vec<(&String, &T)> = items.iter().collect();
    if declaration_order {
        entries.sort_by_key(|(name, _)| {
            order
                .iter()
                .position(|o| o == *name)
                .unwrap_or(usize::MAX)
        });
    }
    entries.into_iter().map(|(_, item)| item).collect()
}

/// Where an imported name comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportBinding {
    /// Module after `from`; empty for a plain `import x`
    pub source: String,
    /// Alias from an `as` clause
    pub alias: Option<String>,
    /// File the import resolves to, if it is part of the project
    pub path: Option<PathBuf>,
}

impl ImportBinding {
    /// A plain `import x`
    pub fn plain(alias: Option<&str>) -> Self {
        Self {
            source: String::new(),
            alias: alias.map(str::to_string),
            path: None,
        }
    }

    /// A `from source import x`
    pub fn from_module(source: &str, alias: Option<&str>) -> Self {
        Self {
            source: source.to_string(),
            alias: alias.map(str::to_string),
            path: None,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.source.is_empty()
    }

    /// Number of leading dots in the source (0 for absolute imports)
    pub fn relative_level(&self) -> usize {
        self.source.chars().take_while(|c| *c == '.').count()
    }
}

/// How a function is bound
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// `__init__` / `__new__`
    Constructor,
    /// Module-level function or instance method
    Plain,
    /// `@property`
    Property,
    /// `@classmethod`
    ClassMethod,
    /// `@staticmethod`
    StaticMethod,
}

impl MemberKind {
    /// Classify a method from its name and decorators
    pub fn of_method(name: &str, decorators: &[String]) -> Self {
        if decorators.iter().any(|d| d == "staticmethod") {
            MemberKind::StaticMethod
        } else if decorators.iter().any(|d| d == "classmethod") {
            MemberKind::ClassMethod
        } else if decorators.iter().any(|d| {
            d == "property" || d.ends_with(".getter") || d.ends_with("cached_property")
        }) {
            MemberKind::Property
        } else if name == "__init__" || name == "__new__" {
            MemberKind::Constructor
        } else {
            MemberKind::Plain
        }
    }

    /// Heading used for this kind's section in a class entry
    pub fn section_title(&self) -> &'static str {
        match self {
            MemberKind::Constructor => "Constructor",
            MemberKind::Plain => "Methods",
            MemberKind::Property => "Properties",
            MemberKind::ClassMethod => "Class methods",
            MemberKind::StaticMethod => "Static methods",
        }
    }
}

/// A function or method definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDescription {
    pub name: String,
    pub kind: MemberKind,
    pub docstring: Option<String>,
    pub signature: Signature,
    /// Decorators as written, without `@` and arguments
    pub decorators: Vec<String>,
    pub is_async: bool,
}

impl FunctionDescription {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Plain,
            docstring: None,
            signature: Signature::default(),
            decorators: Vec::new(),
            is_async: false,
        }
    }
}

/// Parameter list plus return annotation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

impl Signature {
    /// Render as `(a: int, b=1) -> str`, optionally without annotations
    pub fn render(&self, show_types: bool) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut star_written = false;

        for (i, param) in self.parameters.iter().enumerate() {
            if param.kind == ParameterKind::KeywordOnly && !star_written {
                parts.push("*".to_string());
                star_written = true;
            }
            if param.kind == ParameterKind::Args {
                star_written = true;
            }
            parts.push(param.render(show_types));

            let next_positional = self
                .parameters
                .get(i + 1)
                .map(|p| p.kind == ParameterKind::PositionalOnly)
                .unwrap_or(false);
            if param.kind == ParameterKind::PositionalOnly && !next_positional {
                parts.push("/".to_string());
            }
        }

        let ret = match (&self.return_type, show_types) {
            (Some(r), true) => format!(" -> {}", r),
            _ => String::new(),
        };
        format!("({}){}", parts.join(", "), ret)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(true))
    }
}

/// A function parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_hint: Option<String>,
    /// Default value as written
    pub default: Option<String>,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_hint: None,
            default: None,
            kind: ParameterKind::Regular,
        }
    }

    pub fn with_type(name: &str, type_hint: &str) -> Self {
        Self {
            type_hint: Some(type_hint.to_string()),
            ..Self::new(name)
        }
    }

    pub fn with_default(name: &str, default: &str) -> Self {
        Self {
            default: Some(default.to_string()),
            ..Self::new(name)
        }
    }

    /// Render as it would appear in a `def` line
    pub fn render(&self, show_types: bool) -> String {
        let mut s = String::new();

        match self.kind {
            ParameterKind::Args => s.push('*'),
            ParameterKind::Kwargs => s.push_str("**"),
            _ => {}
        }

        s.push_str(&self.name);

        let typed = show_types && self.type_hint.is_some();
        if let (true, Some(t)) = (show_types, &self.type_hint) {
            s.push_str(": ");
            s.push_str(t);
        }

        if let Some(ref d) = self.default {
            s.push_str(if typed { " = " } else { "=" });
            s.push_str(d);
        }

        s
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(true))
    }
}

/// Kind of function parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParameterKind {
    /// Regular positional or keyword parameter
    Regular,
    /// *args
    Args,
    /// **kwargs
    Kwargs,
    /// Positional-only (before /)
    PositionalOnly,
    /// Keyword-only (after *)
    KeywordOnly,
}

/// A class definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDescription {
    pub name: String,
    pub docstring: Option<String>,
    /// First base class, absent when there is none or it is `object`
    pub base_name: Option<String>,
    /// Public class-body attributes, sorted by name
    pub static_members: Vec<StaticMember>,
    /// Methods grouped by kind, each list in declaration order
    pub methods_by_kind: BTreeMap<MemberKind, Vec<FunctionDescription>>,
    pub decorators: Vec<String>,
}

impl ClassDescription {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            docstring: None,
            base_name: None,
            static_members: Vec::new(),
            methods_by_kind: BTreeMap::new(),
            decorators: Vec::new(),
        }
    }

    /// Add a method under its kind, keeping declaration order
    pub fn add_method(&mut self, method: FunctionDescription) {
        let methods = self.methods_by_kind.entry(method.kind).or_default();
        // a later definition replaces an earlier one of the same name
        methods.retain(|m| m.name != method.name);
        methods.push(method);
    }

    pub fn method_count(&self) -> usize {
        self.methods_by_kind.values().map(Vec::len).sum()
    }
}

/// A non-callable class attribute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaticMember {
    pub name: String,
    /// Value as written
    pub value: String,
}

/// A top-level assignment statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalBinding {
    /// Assignment targets, e.g. `["a", "b"]` for `a = b = 1`
    pub names: Vec<String>,
    /// The full source lines of the statement, or only its own text when
    /// another statement shares the line
    pub source: String,
    /// Starting line number
    pub line: usize,
}
