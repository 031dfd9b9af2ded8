//! HTML serialization for inspection and the CLI output.

use super::document::Document;
use super::node::NodeId;

impl Document {
    /// Serialize `id` and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of `id`
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text_of(id) {
            // Script bodies are raw text
            let raw = self
                .parent(id)
                .and_then(|parent| self.tag(parent))
                .is_some_and(|tag| tag == "script");
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
            return;
        }
        let Some(tag) = self.tag(id) else {
            return;
        };
        out.push('<');
        out.push_str(tag);
        for (name, value) in self.attributes(id) {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        out.push('>');
        for child in self.children(id) {
            self.write_node(*child, out);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_html() {
        let mut doc = Document::new();
        let p = doc.create_element_with("p", &[("id", "summary"), ("title", "a \"b\"")]);
        doc.set_text_content(p, "Total <all>: $1 & more").unwrap();
        doc.append_child(doc.body(), p).unwrap();

        assert_eq!(
            doc.outer_html(p),
            r#"<p id="summary" title="a &quot;b&quot;">Total &lt;all&gt;: $1 &amp; more</p>"#
        );
        assert_eq!(
            doc.inner_html(doc.root()),
            format!("<body>{}</body>", doc.outer_html(p))
        );
    }

    #[test]
    fn test_script_text_is_raw() {
        let mut doc = Document::new();
        let script = doc.create_element_with("script", &[("type", "application/json")]);
        doc.set_text_content(script, r#"{"a":"<b>"}"#).unwrap();
        assert_eq!(
            doc.outer_html(script),
            r#"<script type="application/json">{"a":"<b>"}</script>"#
        );
    }
}
