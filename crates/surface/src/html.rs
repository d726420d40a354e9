//! Standalone HTML serialization, the non-PDF escape hatch for a document.

use crate::document::RenderableDocument;
use crate::node::{Node, NodeKind, Overflow, TextAlign};
use std::fmt::Write;

const STYLESHEET: &str = "\
body { margin: 0; font-family: Helvetica, Arial, sans-serif; background: #ffffff; }
.page { position: relative; margin: 0 auto; }
.node { position: absolute; box-sizing: border-box; }
img.node { object-fit: contain; }
@media print { body { -webkit-print-color-adjust: exact; } }
";

impl RenderableDocument {
    /// Serializes the current tree plus a minimal style sheet into a
    /// self-contained HTML page.
    pub fn to_html(&self, title: &str) -> String {
        let snapshot = self.snapshot();
        let mut out = String::with_capacity(4096);
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(
            out,
            "<title>{}</title>",
            html_escape::encode_text(title)
        );
        let _ = writeln!(out, "<style>\n{}</style>\n</head>\n<body>", STYLESHEET);
        let _ = writeln!(
            out,
            "<div class=\"page\" style=\"width:{}px;height:{}px\">",
            snapshot.size.width, snapshot.size.height
        );
        write_node(&mut out, &snapshot.root, 1);
        out.push_str("</div>\n</body>\n</html>\n");
        out
    }
}

fn node_style(node: &Node) -> String {
    let frame = node.placed_frame();
    let mut style = format!(
        "left:{}px;top:{}px;width:{}px;height:{}px;",
        frame.x, frame.y, frame.width, frame.height
    );
    if let Some(bg) = node.style.background {
        let _ = write!(style, "background:{};", bg.to_hex());
    }
    if let Some(border) = node.style.border {
        let _ = write!(style, "border:{}px solid {};", border.width, border.color.to_hex());
    }
    if node.style.overflow == Overflow::Hidden {
        style.push_str("overflow:hidden;");
    }
    style
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let style = node_style(node);
    match &node.kind {
        NodeKind::Block => {
            let _ = writeln!(out, "{}<div class=\"node\" style=\"{}\">", indent, style);
            for child in &node.children {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{}</div>", indent);
        }
        NodeKind::Text(run) => {
            let align = match run.align {
                TextAlign::Left => "left",
                TextAlign::Center => "center",
                TextAlign::Right => "right",
            };
            let _ = writeln!(
                out,
                "{}<div class=\"node\" style=\"{}font-size:{}px;font-weight:{};color:{};text-align:{}\">{}</div>",
                indent,
                style,
                run.font_size,
                if run.bold { "bold" } else { "normal" },
                run.color.to_hex(),
                align,
                html_escape::encode_text(&run.content)
            );
        }
        NodeKind::Image { source, .. } => {
            let _ = writeln!(
                out,
                "{}<img class=\"node\" style=\"{}\" src=\"{}\" alt=\"\">",
                indent,
                style,
                html_escape::encode_double_quoted_attribute(source.as_str())
            );
        }
        NodeKind::Rule { color, thickness } => {
            let _ = writeln!(
                out,
                "{}<hr class=\"node\" style=\"{}margin:0;border:0;border-top:{}px solid {}\">",
                indent,
                style,
                thickness,
                color.to_hex()
            );
        }
    }
}
