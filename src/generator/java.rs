//! Java skeleton generation for a single node.
//!
//! Entries that do not parse are kept as `// unparsed ...` comments so one bad
//! member never stops the rest of the file from being generated.

use log::warn;

use crate::model::{Diagram, Node, NodeKind, RelationKind, Visibility};

use super::members::{Operation, parse_attribute, parse_operation};

const INDENT: &str = "    ";

fn modifier(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public ",
        Visibility::Private => "private ",
        Visibility::Protected => "protected ",
        Visibility::Package => "",
    }
}

/// Supertype clause from the first inheritance relationship leaving `node`.
fn supertype_clause(diagram: &Diagram, node: &Node) -> Option<String> {
    let parent = diagram
        .relationships
        .iter()
        .find(|rel| rel.kind == RelationKind::Inheritance && rel.start == node.key)
        .and_then(|rel| diagram.node(&rel.end))?;
    let keyword = match (node.kind(), parent.kind()) {
        (NodeKind::Class, NodeKind::Interface) => "implements",
        _ => "extends",
    };
    Some(format!(" {} {}", keyword, parent.name.trim()))
}

/// Fields for every association, aggregation and composition leaving `node`.
fn relationship_fields(diagram: &Diagram, node: &Node) -> Vec<String> {
    diagram
        .relationships
        .iter()
        .filter(|rel| rel.start == node.key && rel.kind != RelationKind::Inheritance)
        .filter_map(|rel| diagram.node(&rel.end))
        .map(|target| {
            let ty = target.name.trim();
            format!("private {} {};", ty, ty.to_lowercase())
        })
        .collect()
}

fn write_method(out: &mut String, op: &Operation, in_interface: bool) {
    let params = op
        .params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let ret = op.return_type.as_deref().unwrap_or("void");
    if in_interface {
        out.push_str(&format!("{INDENT}{} {}({});\n", ret, op.name, params));
        return;
    }
    out.push_str(&format!(
        "{INDENT}{}{} {}({}) {{\n",
        modifier(op.visibility),
        ret,
        op.name,
        params
    ));
    if ret != "void" {
        out.push_str(INDENT);
        out.push_str(INDENT);
        out.push_str("throw new UnsupportedOperationException(\"Not implemented\");\n");
    }
    out.push_str(INDENT);
    out.push_str("}\n");
}

/// Generate the skeleton source of one node.
pub fn generate_node(diagram: &Diagram, node: &Node) -> String {
    let mut out = String::with_capacity(512);
    let keyword = match node.kind() {
        NodeKind::Class => "class",
        NodeKind::Interface => "interface",
    };
    let supertype = supertype_clause(diagram, node).unwrap_or_default();
    out.push_str(&format!("public {} {}{} {{\n", keyword, node.name.trim(), supertype));

    let fields = relationship_fields(diagram, node);
    for field in &fields {
        out.push_str(&format!("{INDENT}{}\n", field));
    }
    if !fields.is_empty() && !node.attributes.is_empty() {
        out.push('\n');
    }

    for entry in &node.attributes {
        match parse_attribute(entry) {
            Some(attr) => out.push_str(&format!(
                "{INDENT}{}{} {};\n",
                modifier(attr.visibility),
                attr.ty,
                attr.name
            )),
            None => {
                warn!(node = node.name.as_str(), entry = entry.as_str(); "Unparsed attribute");
                out.push_str(&format!("{INDENT}// unparsed attribute: {}\n", entry));
            }
        }
    }

    let in_interface = node.kind() == NodeKind::Interface;
    for entry in &node.operations {
        out.push('\n');
        match parse_operation(entry) {
            Some(op) => write_method(&mut out, &op, in_interface),
            None => {
                warn!(node = node.name.as_str(), entry = entry.as_str(); "Unparsed operation");
                out.push_str(&format!("{INDENT}// unparsed operation: {}\n", entry));
            }
        }
    }

    out.push_str("}\n");
    out
}
