// Class entries

use crate::config::RenderConfig;
use crate::parser::{ClassDescription, FunctionDescription, MemberKind};
use crate::render::text::{escape_markdown, format_doc};

/// Renders classes with their members grouped by kind
pub struct ClassRenderer {
    config: RenderConfig,
}

impl ClassRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn title(&self, cls: &ClassDescription) -> String {
        match &cls.base_name {
            Some(base) => format!("{} ({})", escape_markdown(&cls.name), base),
            None => escape_markdown(&cls.name),
        }
    }

    /// Preview link to the full entry
    ///
    /// The anchor is the bare class name.
    pub fn link(&self, cls: &ClassDescription) -> String {
        format!("[{}](#{})", self.title(cls), cls.name)
    }

    /// Full entry: anchor, heading, docstring, class variables and methods
    pub fn render(&self, cls: &ClassDescription) -> String {
        let mut s = String::new();
        s.push_str(&format!("<a id=\"{}\"></a>\n\n", cls.name));
        s.push_str(&format!("## {}\n\n", self.title(cls)));

        if let Some(doc) = &cls.docstring {
            let doc = format_doc(doc, &self.config, 0);
            if !doc.trim().is_empty() {
                s.push_str(&doc);
                s.push_str("\n\n");
            }
        }

        if self.config.show_class_variables && !cls.static_members.is_empty() {
            s.push_str("#### Class variables\n\n");
            for member in &cls.static_members {
                s.push_str(&format!("* `{} = {}`\n", member.name, member.value));
            }
            s.push('\n');
        }

        for (kind, methods) in &cls.methods_by_kind {
            if methods.is_empty() || !self.shows(*kind) {
                continue;
            }
            s.push_str(&format!("#### {}\n\n", kind.section_title()));
            for method in self.ordered(methods) {
                s.push_str(&self.render_method(method));
            }
        }

        s
    }

    fn shows(&self, kind: MemberKind) -> bool {
        if !self.config.show_class_methods {
            return false;
        }
        match kind {
            MemberKind::ClassMethod => self.config.show_classmethods,
            MemberKind::StaticMethod => self.config.show_staticmethods,
            _ => true,
        }
    }

    fn ordered<'a>(&self, methods: &'a [FunctionDescription]) -> Vec<&'a FunctionDescription> {
        let mut ordered: Vec<&FunctionDescription> = methods.iter().collect();
        if !self.config.keep_class_method_order {
            ordered.sort_by(|a, b| a.name.cmp(&b.name));
        }
        ordered
    }

    fn render_method(&self, method: &FunctionDescription) -> String {
        let mut signature = method.signature.render(self.config.show_types);
        if method.is_async {
            signature = format!("async {}", signature);
        }

        let mut s = format!("* **{}** `{}`\n", escape_markdown(&method.name), signature);
        if let Some(doc) = &method.docstring {
            let doc = format_doc(doc, &self.config, 4);
            if !doc.trim().is_empty() {
                s.push('\n');
                s.push_str(&doc);
                s.push('\n');
            }
        }
        s.push('\n');
        s
    }
}
