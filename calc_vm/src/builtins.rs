//! Builtin functions.
//!
//! `write`, `aton`, `toa` and `error` are ordinary global function values;
//! their one-instruction bodies come from compiling builtin-shaped AST nodes
//! through the normal pipeline. A session evaluates these declarations at
//! startup, after which user programs call the builtins through the standard
//! calling convention and may shadow them or pass them around freely.

use calc_vm_parser::ast::Node;

fn declaration(name: &str, body: fn(Box<Node>) -> Node) -> Node {
    Node::Assign {
        target: Box::new(Node::Name(name.to_string())),
        value: Box::new(Node::Function {
            params: vec!["x".to_string()],
            body: Box::new(body(Box::new(Node::Name("x".to_string())))),
            local_cnt: 0,
        }),
    }
}

/// Assignment statements installing every builtin.
pub fn declarations() -> Vec<Node> {
    vec![
        declaration("write", Node::Write),
        declaration("aton", Node::Aton),
        declaration("toa", Node::Toa),
        declaration("error", Node::ErrorNode),
    ]
}
