//! Name resolution.
//!
//! Rewrites the parsed AST with a lexical scope stack: each function literal
//! opens a scope mapping names to frame slots. A reference to a name in the
//! current function becomes `Local(slot)`, a reference to a local of an
//! enclosing function becomes `Captured(slot)` (read from the closure
//! snapshot at run time), and anything else stays a global `Name`. The top
//! level is not a scope: top-level assignments write globals.
//!
//! An assignment's right-hand side is resolved before its target is bound,
//! so `f = (n) -> ... f(n - 1) ...` refers to the global `f` and recursion
//! works through the global table rather than through a snapshot taken
//! before `f` exists.

use std::collections::HashMap;

use calc_vm_parser::ast::Node;

#[derive(Debug, Default)]
struct Scope {
    slots: HashMap<String, usize>,
}

#[derive(Debug, Default)]
struct ScopeStack {
    scopes: Vec<Scope>,
}

/// Resolve one top-level statement.
pub fn resolve(node: Node) -> Node {
    ScopeStack::default().rewrite(node)
}

impl ScopeStack {
    fn rewrite(&mut self, node: Node) -> Node {
        match node {
            Node::Name(name) => self.reference(name),

            Node::Assign { target, value } => {
                let value = Box::new(self.rewrite(*value));
                let target = Box::new(match *target {
                    Node::Name(name) => self.bind(name),
                    other => other,
                });
                Node::Assign { target, value }
            }

            Node::Function { params, body, .. } => {
                let mut scope = Scope::default();
                for (slot, param) in params.iter().enumerate() {
                    scope.slots.insert(param.clone(), slot);
                }
                self.scopes.push(scope);
                let body = Box::new(self.rewrite(*body));
                let local_cnt = match self.scopes.pop() {
                    Some(scope) => scope.slots.len(),
                    None => params.len(),
                };
                Node::Function {
                    params,
                    body,
                    local_cnt,
                }
            }

            Node::Array(elems) => {
                Node::Array(elems.into_iter().map(|e| self.rewrite(e)).collect())
            }
            Node::BinOp { op, left, right } => Node::BinOp {
                op,
                left: Box::new(self.rewrite(*left)),
                right: Box::new(self.rewrite(*right)),
            },
            Node::UnOp { op, target } => Node::UnOp {
                op,
                target: Box::new(self.rewrite(*target)),
            },
            Node::IndexAt { target, at } => Node::IndexAt {
                target: Box::new(self.rewrite(*target)),
                at: Box::new(self.rewrite(*at)),
            },
            Node::IndexFromTo { target, from, to } => Node::IndexFromTo {
                target: Box::new(self.rewrite(*target)),
                from: Box::new(self.rewrite(*from)),
                to: Box::new(self.rewrite(*to)),
            },
            Node::If { cond, then } => Node::If {
                cond: Box::new(self.rewrite(*cond)),
                then: Box::new(self.rewrite(*then)),
            },
            Node::IfElse {
                cond,
                then,
                otherwise,
            } => Node::IfElse {
                cond: Box::new(self.rewrite(*cond)),
                then: Box::new(self.rewrite(*then)),
                otherwise: Box::new(self.rewrite(*otherwise)),
            },
            Node::While { cond, body } => Node::While {
                cond: Box::new(self.rewrite(*cond)),
                body: Box::new(self.rewrite(*body)),
            },
            Node::Block(stmts) => {
                Node::Block(stmts.into_iter().map(|s| self.rewrite(s)).collect())
            }
            Node::Call { callee, args } => Node::Call {
                callee: Box::new(self.rewrite(*callee)),
                args: args.into_iter().map(|a| self.rewrite(a)).collect(),
            },
            Node::Return(value) => Node::Return(Box::new(self.rewrite(*value))),
            Node::Write(value) => Node::Write(Box::new(self.rewrite(*value))),
            Node::Aton(value) => Node::Aton(Box::new(self.rewrite(*value))),
            Node::Toa(value) => Node::Toa(Box::new(self.rewrite(*value))),
            Node::ErrorNode(value) => Node::ErrorNode(Box::new(self.rewrite(*value))),

            leaf @ (Node::Int(_)
            | Node::Float(_)
            | Node::Str(_)
            | Node::Bool(_)
            | Node::Local(_)
            | Node::Captured(_)) => leaf,
        }
    }

    fn reference(&self, name: String) -> Node {
        if let Some(scope) = self.scopes.last() {
            if let Some(&slot) = scope.slots.get(&name) {
                return Node::Local(slot);
            }
        }
        for scope in self.scopes.iter().rev().skip(1) {
            if let Some(&slot) = scope.slots.get(&name) {
                return Node::Captured(slot);
            }
        }
        Node::Name(name)
    }

    fn bind(&mut self, name: String) -> Node {
        match self.scopes.last_mut() {
            Some(scope) => {
                let next = scope.slots.len();
                let slot = *scope.slots.entry(name).or_insert(next);
                Node::Local(slot)
            }
            None => Node::Name(name),
        }
    }
}
