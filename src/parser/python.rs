// Python parser using tree-sitter

use crate::error::{Error, Result};
use crate::parser::ast::*;
use std::collections::HashSet;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::Parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse a Python file into a description named `module_name`
    pub fn parse_file(&mut self, path: &Path, module_name: &str) -> Result<ModuleDescription> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io_at(path, e))?;
        self.parse_source(&source, path, module_name)
    }

    /// Parse Python source code
    ///
    /// Source with syntax errors is rejected: a unit that could not be
    /// imported must not be documented.
    pub fn parse_source(
        &mut self,
        source: &str,
        path: &Path,
        module_name: &str,
    ) -> Result<ModuleDescription> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parser("Failed to parse source"))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(&root)
                .map(|n| n.start_position().row + 1)
                .unwrap_or(1);
            return Err(Error::parse(path, format!("syntax error at line {}", line)));
        }

        let bytes = source.as_bytes();
        let lines: Vec<&str> = source.lines().collect();
        let mut module = ModuleDescription::new(module_name, Some(path.to_path_buf()));
        module.docstring = extract_docstring(&root, bytes);

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_statement" => {
                    module.imports.extend(parse_import(&child, bytes));
                }
                "import_from_statement" => {
                    module.imports.extend(parse_import_from(&child, bytes));
                }
                "class_definition" => {
                    if let Some(class) = parse_class(&child, bytes, Vec::new()) {
                        push_order(&mut module.class_order, &class.name);
                        module.classes.insert(class.name.clone(), class);
                    }
                }
                "function_definition" => {
                    if let Some(func) = parse_function(&child, bytes, Vec::new()) {
                        push_order(&mut module.function_order, &func.name);
                        module.functions.insert(func.name.clone(), func);
                    }
                }
                "decorated_definition" => {
                    let decorators = extract_decorators(&child, bytes);
                    let Some(definition) = child.child_by_field_name("definition") else {
                        continue;
                    };
                    match definition.kind() {
                        "class_definition" => {
                            if let Some(class) = parse_class(&definition, bytes, decorators) {
                                push_order(&mut module.class_order, &class.name);
                                module.classes.insert(class.name.clone(), class);
                            }
                        }
                        "function_definition" => {
                            if let Some(func) = parse_function(&definition, bytes, decorators) {
                                push_order(&mut module.function_order, &func.name);
                                module.functions.insert(func.name.clone(), func);
                            }
                        }
                        _ => {}
                    }
                }
                "expression_statement" => {
                    if let Some(global) = parse_global(&child, bytes, &lines) {
                        module.globals.push(global);
                    }
                }
                _ => {}
            }
        }

        // Names already documented as imports, functions or classes are not variables
        let classified: HashSet<&str> = module
            .imports
            .keys()
            .chain(module.functions.keys())
            .chain(module.classes.keys())
            .map(String::as_str)
            .collect();
        module
            .globals
            .retain(|g| !g.names.iter().all(|n| classified.contains(n.as_str())));

        Ok(module)
    }
}

fn push_order(order: &mut Vec<String>, name: &str) {
    if !order.iter().any(|n| n == name) {
        order.push(name.to_string());
    }
}

/// Find the first error or missing node in a tree
fn first_error<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children
        .iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(|c| first_error(c))
}

/// Docstring of a module, class body or function body: the first statement,
/// if it is a bare string
fn extract_docstring(body: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() == "string" {
        extract_string_content(&expr, source)
    } else {
        None
    }
}

/// Extract string content, dropping prefixes and quotes
fn extract_string_content(node: &Node, source: &[u8]) -> Option<String> {
    let text = node.utf8_text(source).ok()?;
    let text = text.trim_start_matches(|c: char| "rRbBuUfF".contains(c));

    let s = if text.starts_with("\"\"\"") || text.starts_with("'''") {
        &text[3..text.len().saturating_sub(3).max(3)]
    } else if text.starts_with('"') || text.starts_with('\'') {
        &text[1..text.len().saturating_sub(1).max(1)]
    } else {
        text
    };

    Some(s.to_string())
}

/// Parse an import statement: `import x` or `import x as y`
fn parse_import(node: &Node, source: &[u8]) -> Vec<(String, ImportBinding)> {
    let mut bindings = Vec::new();
    let mut cursor = node.walk();

    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "dotted_name" => {
                if let Ok(name) = child.utf8_text(source) {
                    bindings.push((name.to_string(), ImportBinding::plain(None)));
                }
            }
            "aliased_import" => {
                if let Some((name, alias)) = parse_aliased(&child, source) {
                    bindings.push((name, ImportBinding::plain(alias.as_deref())));
                }
            }
            _ => {}
        }
    }

    bindings
}

/// Parse an import-from statement: `from x import y`
fn parse_import_from(node: &Node, source: &[u8]) -> Vec<(String, ImportBinding)> {
    let mut bindings = Vec::new();
    let module = node
        .child_by_field_name("module_name")
        .and_then(|m| m.utf8_text(source).ok())
        .unwrap_or_default()
        .to_string();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "wildcard_import" {
            bindings.push(("*".to_string(), ImportBinding::from_module(&module, None)));
        }
    }

    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "dotted_name" => {
                if let Ok(name) = child.utf8_text(source) {
                    bindings.push((name.to_string(), ImportBinding::from_module(&module, None)));
                }
            }
            "aliased_import" => {
                if let Some((name, alias)) = parse_aliased(&child, source) {
                    bindings.push((name, ImportBinding::from_module(&module, alias.as_deref())));
                }
            }
            _ => {}
        }
    }

    bindings
}

fn parse_aliased(node: &Node, source: &[u8]) -> Option<(String, Option<String>)> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    let alias = node
        .child_by_field_name("alias")
        .and_then(|a| a.utf8_text(source).ok())
        .map(str::to_string);
    Some((name.to_string(), alias))
}

/// Parse a class definition
fn parse_class(node: &Node, source: &[u8], decorators: Vec<String>) -> Option<ClassDescription> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    let mut class = ClassDescription::new(name);
    class.decorators = decorators;

    if let Some(bases) = node.child_by_field_name("superclasses") {
        class.base_name = extract_base(&bases, source);
    }

    if let Some(body) = node.child_by_field_name("body") {
        class.docstring = extract_docstring(&body, source);
        parse_class_body(&body, source, &mut class);
    }

    Some(class)
}

/// First positional base class, unless it is `object`
fn extract_base(node: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let base = node
        .named_children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "keyword_argument" | "comment"))
        .find_map(|c| c.utf8_text(source).ok())?;

    if base == "object" {
        None
    } else {
        Some(base.to_string())
    }
}

/// Collect methods and static members from a class body
fn parse_class_body(node: &Node, source: &[u8], class: &mut ClassDescription) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "expression_statement" => {
                if let Some(member) = parse_class_attribute(&child, source) {
                    class.static_members.retain(|m| m.name != member.name);
                    class.static_members.push(member);
                }
            }
            "function_definition" => {
                if let Some(mut method) = parse_function(&child, source, Vec::new()) {
                    method.kind = MemberKind::of_method(&method.name, &method.decorators);
                    class.add_method(method);
                }
            }
            "decorated_definition" => {
                let decorators = extract_decorators(&child, source);
                if let Some(def) = child
                    .child_by_field_name("definition")
                    .filter(|d| d.kind() == "function_definition")
                {
                    if let Some(mut method) = parse_function(&def, source, decorators) {
                        method.kind = MemberKind::of_method(&method.name, &method.decorators);
                        class.add_method(method);
                    }
                }
            }
            _ => {}
        }
    }

    class.static_members.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Parse a public class attribute assignment with a value
fn parse_class_attribute(node: &Node, source: &[u8]) -> Option<StaticMember> {
    let assignment = node.named_child(0).filter(|c| c.kind() == "assignment")?;
    let left = assignment.child_by_field_name("left")?;
    let right = assignment.child_by_field_name("right")?;
    if left.kind() != "identifier" {
        return None;
    }

    let name = left.utf8_text(source).ok()?;
    if name.starts_with('_') {
        return None;
    }

    // `a = b = 1` stores the innermost value
    let mut value = right;
    while value.kind() == "assignment" {
        value = value.child_by_field_name("right")?;
    }

    Some(StaticMember {
        name: name.to_string(),
        value: value.utf8_text(source).ok()?.to_string(),
    })
}

/// Parse a function definition
fn parse_function(
    node: &Node,
    source: &[u8],
    decorators: Vec<String>,
) -> Option<FunctionDescription> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    let mut func = FunctionDescription::new(name);
    func.is_async = has_async_keyword(node);
    func.decorators = decorators;

    if let Some(params) = node.child_by_field_name("parameters") {
        func.signature.parameters = parse_parameters(&params, source);
    }
    func.signature.return_type = node
        .child_by_field_name("return_type")
        .and_then(|t| t.utf8_text(source).ok())
        .map(str::to_string);
    if let Some(body) = node.child_by_field_name("body") {
        func.docstring = extract_docstring(&body, source);
    }

    Some(func)
}

/// Check if a function_definition node has an async keyword
fn has_async_keyword(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "async");
    found
}

/// Extract decorators from a decorated definition
fn extract_decorators(node: &Node, source: &[u8]) -> Vec<String> {
    let mut decorators = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            if let Ok(text) = child.utf8_text(source) {
                // Remove @ prefix and any arguments
                let dec = text.trim_start_matches('@');
                let dec = match dec.find('(') {
                    Some(idx) => &dec[..idx],
                    None => dec,
                };
                decorators.push(dec.trim().to_string());
            }
        }
    }

    decorators
}

/// Parse function parameters
fn parse_parameters(node: &Node, source: &[u8]) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = Vec::new();
    let mut keyword_only = false;
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        let param = match child.kind() {
            "identifier" => child.utf8_text(source).ok().map(Parameter::new),
            "typed_parameter" => parse_typed_parameter(&child, source),
            "default_parameter" | "typed_default_parameter" => parse_default_parameter(&child, source),
            "list_splat_pattern" | "dictionary_splat_pattern" => parse_splat(&child, source),
            "keyword_separator" | "*" => {
                keyword_only = true;
                None
            }
            "positional_separator" | "/" => {
                for p in params.iter_mut().filter(|p| p.kind == ParameterKind::Regular) {
                    p.kind = ParameterKind::PositionalOnly;
                }
                None
            }
            _ => None,
        };

        if let Some(mut param) = param {
            match param.kind {
                ParameterKind::Args => keyword_only = true,
                ParameterKind::Regular if keyword_only => param.kind = ParameterKind::KeywordOnly,
                _ => {}
            }
            params.push(param);
        }
    }

    params
}

/// `*args` or `**kwargs`
fn parse_splat(node: &Node, source: &[u8]) -> Option<Parameter> {
    let mut cursor = node.walk();
    let ident = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier")?;
    let mut param = Parameter::new(ident.utf8_text(source).ok()?);
    param.kind = if node.kind() == "list_splat_pattern" {
        ParameterKind::Args
    } else {
        ParameterKind::Kwargs
    };
    Some(param)
}

fn parse_typed_parameter(node: &Node, source: &[u8]) -> Option<Parameter> {
    let mut cursor = node.walk();
    let target = node.named_children(&mut cursor).find(|c| {
        matches!(
            c.kind(),
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern"
        )
    })?;

    let mut param = if target.kind() == "identifier" {
        Parameter::new(target.utf8_text(source).ok()?)
    } else {
        parse_splat(&target, source)?
    };
    param.type_hint = node
        .child_by_field_name("type")
        .and_then(|t| t.utf8_text(source).ok())
        .map(str::to_string);
    Some(param)
}

fn parse_default_parameter(node: &Node, source: &[u8]) -> Option<Parameter> {
    let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;
    let mut param = Parameter::new(name);
    param.type_hint = node
        .child_by_field_name("type")
        .and_then(|t| t.utf8_text(source).ok())
        .map(str::to_string);
    param.default = node
        .child_by_field_name("value")
        .and_then(|v| v.utf8_text(source).ok())
        .map(str::to_string);
    Some(param)
}

/// Parse a top-level `name = value` statement
///
/// Annotated and augmented assignments are not variables bindings here,
/// nor are assignments to attributes or subscripts.
fn parse_global(node: &Node, source: &[u8], lines: &[&str]) -> Option<GlobalBinding> {
    let assignment = node.named_child(0).filter(|c| c.kind() == "assignment")?;
    if assignment.child_by_field_name("type").is_some() {
        return None;
    }

    let mut names = Vec::new();
    let mut current = assignment;
    loop {
        collect_target_names(&current.child_by_field_name("left")?, source, &mut names);
        match current.child_by_field_name("right") {
            Some(right) if right.kind() == "assignment" => current = right,
            _ => break,
        }
    }
    if names.is_empty() {
        return None;
    }

    Some(GlobalBinding {
        names,
        source: statement_text(node, source, lines)?,
        line: node.start_position().row + 1,
    })
}

/// Bound names of an assignment target, unpacking `a, b` and `[a, *rest]`
fn collect_target_names(target: &Node, source: &[u8], names: &mut Vec<String>) {
    match target.kind() {
        "identifier" => {
            if let Ok(name) = target.utf8_text(source) {
                names.push(name.to_string());
            }
        }
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" => {
            let mut cursor = target.walk();
            for child in target.named_children(&mut cursor) {
                collect_target_names(&child, source, names);
            }
        }
        _ => {}
    }
}

/// Full source lines of a statement, or just its own text when it shares a
/// line with another statement
fn statement_text(node: &Node, source: &[u8], lines: &[&str]) -> Option<String> {
    let start = node.start_position();
    let end = node.end_position();

    let before = lines
        .get(start.row)
        .and_then(|l| l.get(..start.column))
        .unwrap_or("");
    let after = lines
        .get(end.row)
        .and_then(|l| l.get(end.column..))
        .unwrap_or("")
        .trim_start();
    if !before.trim().is_empty() || !(after.is_empty() || after.starts_with('#')) {
        return node.utf8_text(source).ok().map(str::to_string);
    }

    let last = end.row.min(lines.len().saturating_sub(1));
    Some(lines.get(start.row..=last)?.join("\n"))
}
