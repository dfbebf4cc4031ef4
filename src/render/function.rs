// Function entries

use crate::config::RenderConfig;
use crate::parser::FunctionDescription;
use crate::render::text::{escape_markdown, format_doc};

/// Renders module-level functions
pub struct FunctionRenderer {
    config: RenderConfig,
}

impl FunctionRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Signature as shown in code spans
    pub fn signature(&self, func: &FunctionDescription) -> String {
        let signature = func.signature.render(self.config.show_types);
        if func.is_async {
            format!("async {}", signature)
        } else {
            signature
        }
    }

    /// Preview link to the full entry
    pub fn link(&self, func: &FunctionDescription) -> String {
        format!(
            "[{} `{}`](#{})",
            escape_markdown(&func.name),
            self.signature(func),
            func.name
        )
    }

    /// Full entry: anchor, heading and docstring
    pub fn render(&self, func: &FunctionDescription) -> String {
        let mut s = String::new();
        s.push_str(&format!("<a id=\"{}\"></a>\n\n", func.name));
        s.push_str(&format!(
            "## {} `{}`\n\n",
            escape_markdown(&func.name),
            self.signature(func)
        ));
        if let Some(doc) = &func.docstring {
            let doc = format_doc(doc, &self.config, 0);
            if !doc.trim().is_empty() {
                s.push_str(&doc);
                s.push_str("\n\n");
            }
        }
        s
    }
}
