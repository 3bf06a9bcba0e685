//! Canonical markup serialization.
//!
//! Writes no whitespace between tags, attributes in key order, and
//! self-closing tags for sections without content. Text runs are written
//! verbatim, so parsing the output yields the same tree.

use super::{Attributes, Document, Node, Section};

impl Document {
    /// Serialize the tree back to POML markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        out.push_str("<poml");
        write_attributes(&mut out, &self.attributes);
        out.push('>');
        for section in &self.sections {
            write_section(&mut out, section);
        }
        out.push_str("</poml>");
        out
    }
}

impl Section {
    /// Serialize this section and its content.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        write_section(&mut out, self);
        out
    }
}

fn write_section(out: &mut String, section: &Section) {
    out.push('<');
    out.push_str(&section.tag);
    write_attributes(out, &section.attributes);

    if section.content.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for node in &section.content {
        match node {
            Node::Text(text) => out.push_str(&text.raw),
            Node::Section(child) => write_section(out, child),
        }
    }
    out.push_str("</");
    out.push_str(&section.tag);
    out.push('>');
}

fn write_attributes(out: &mut String, attributes: &Attributes) {
    for (key, value) in attributes {
        // Values are stored verbatim; pick the quote the value does not contain.
        let quote = if value.contains('"') { '\'' } else { '"' };
        out.push(' ');
        out.push_str(key);
        out.push('=');
        out.push(quote);
        out.push_str(value);
        out.push(quote);
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Document, Node, Position, Section, SectionKind, TextNode};

    #[test]
    fn empty_sections_self_close() {
        let doc = Document {
            attributes: Default::default(),
            sections: vec![Section {
                kind: SectionKind::DataSource,
                tag: "data".to_string(),
                attributes: [
                    ("src".to_string(), "h.csv".to_string()),
                    ("format".to_string(), "csv".to_string()),
                ]
                .into_iter()
                .collect(),
                content: vec![],
                position: Position::default(),
            }],
        };

        assert_eq!(
            doc.to_markup(),
            r#"<poml><data format="csv" src="h.csv"/></poml>"#
        );
    }

    #[test]
    fn values_with_double_quotes_use_single_quotes() {
        let section = Section {
            kind: SectionKind::Generic,
            tag: "note".to_string(),
            attributes: [("say".to_string(), r#"he said "hi""#.to_string())]
                .into_iter()
                .collect(),
            content: vec![Node::Text(TextNode::literal("x", Position::default()))],
            position: Position::default(),
        };

        assert_eq!(section.to_markup(), r#"<note say='he said "hi"'>x</note>"#);
    }
}
