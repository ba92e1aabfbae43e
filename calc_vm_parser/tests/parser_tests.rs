use calc_vm_parser::ast::{BinOp, Node, UnOp};
use calc_vm_parser::{parse, ParseError};
use pretty_assertions::assert_eq;

fn parse_one(src: &str) -> Node {
    let mut stmts = parse(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"));
    assert_eq!(stmts.len(), 1, "expected one statement in {src:?}");
    stmts.pop().expect("statement")
}

fn binop(op: BinOp, left: Node, right: Node) -> Node {
    Node::BinOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[test]
fn literals() {
    assert_eq!(parse_one("1"), Node::Int(1));
    assert_eq!(parse_one("3.14"), Node::Float(3.14));
    assert_eq!(parse_one("true"), Node::Bool(true));
    assert_eq!(parse_one("\"abc\""), Node::Str("abc".into()));
    assert_eq!(parse_one("[]"), Node::Array(vec![]));
    assert_eq!(
        parse_one("[1, false]"),
        Node::Array(vec![Node::Int(1), Node::Bool(false)])
    );
}

#[test]
fn addition_is_left_associative() {
    assert_eq!(
        parse_one("1-2+1"),
        binop(
            BinOp::Add,
            binop(BinOp::Sub, Node::Int(1), Node::Int(2)),
            Node::Int(1)
        )
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
        parse_one("1+2*3"),
        binop(
            BinOp::Add,
            Node::Int(1),
            binop(BinOp::Mul, Node::Int(2), Node::Int(3))
        )
    );
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(
        parse_one("1-(2+1)"),
        binop(
            BinOp::Sub,
            Node::Int(1),
            binop(BinOp::Add, Node::Int(2), Node::Int(1))
        )
    );
}

#[test]
fn relational_binds_looser_than_arithmetic() {
    assert_eq!(
        parse_one("a+1 < b*2"),
        binop(
            BinOp::Lt,
            binop(BinOp::Add, Node::Name("a".into()), Node::Int(1)),
            binop(BinOp::Mul, Node::Name("b".into()), Node::Int(2))
        )
    );
}

#[test]
fn logical_operators_bind_loosest() {
    assert_eq!(
        parse_one("a == 1 & b != 2"),
        binop(
            BinOp::And,
            binop(BinOp::Eq, Node::Name("a".into()), Node::Int(1)),
            binop(BinOp::Ne, Node::Name("b".into()), Node::Int(2))
        )
    );
}

#[test]
fn unary_operators() {
    assert_eq!(
        parse_one("!true"),
        Node::UnOp {
            op: UnOp::Not,
            target: Box::new(Node::Bool(true))
        }
    );
    assert_eq!(
        parse_one("#x"),
        Node::UnOp {
            op: UnOp::Len,
            target: Box::new(Node::Name("x".into()))
        }
    );
    assert_eq!(
        parse_one("-2"),
        Node::UnOp {
            op: UnOp::Neg,
            target: Box::new(Node::Int(2))
        }
    );
}

#[test]
fn unary_minus_inside_binary() {
    assert_eq!(
        parse_one("2 * -3"),
        binop(
            BinOp::Mul,
            Node::Int(2),
            Node::UnOp {
                op: UnOp::Neg,
                target: Box::new(Node::Int(3))
            }
        )
    );
}

#[test]
fn indexing_and_slicing() {
    assert_eq!(
        parse_one("\"apple\"[1]"),
        Node::IndexAt {
            target: Box::new(Node::Str("apple".into())),
            at: Box::new(Node::Int(1)),
        }
    );
    assert_eq!(
        parse_one("\"apple\" [ 1 : 1]"),
        Node::IndexFromTo {
            target: Box::new(Node::Str("apple".into())),
            from: Box::new(Node::Int(1)),
            to: Box::new(Node::Int(1)),
        }
    );
}

#[test]
fn chained_postfix() {
    assert_eq!(
        parse_one("f(1)[0]"),
        Node::IndexAt {
            target: Box::new(Node::Call {
                callee: Box::new(Node::Name("f".into())),
                args: vec![Node::Int(1)],
            }),
            at: Box::new(Node::Int(0)),
        }
    );
}

#[test]
fn assignment() {
    assert_eq!(
        parse_one("a = 1"),
        Node::Assign {
            target: Box::new(Node::Name("a".into())),
            value: Box::new(Node::Int(1)),
        }
    );
}

#[test]
fn assignment_to_keyword_is_rejected() {
    let err = parse("true = false").expect_err("should fail");
    assert!(matches!(err, ParseError::InvalidAssignTarget { .. }));
    assert!(err.to_string().starts_with("Parser: "));
}

#[test]
fn assignment_to_expression_is_rejected() {
    let err = parse("1 + 2 = 3").expect_err("should fail");
    assert!(matches!(err, ParseError::InvalidAssignTarget { .. }));
}

#[test]
fn conditionals() {
    assert_eq!(
        parse_one("if true 1"),
        Node::If {
            cond: Box::new(Node::Bool(true)),
            then: Box::new(Node::Int(1)),
        }
    );
    assert_eq!(
        parse_one("if false 1 else 2"),
        Node::IfElse {
            cond: Box::new(Node::Bool(false)),
            then: Box::new(Node::Int(1)),
            otherwise: Box::new(Node::Int(2)),
        }
    );
}

#[test]
fn conditional_with_block_branches() {
    assert_eq!(
        parse_one("if false {\n1\n} else {\n2\n}"),
        Node::IfElse {
            cond: Box::new(Node::Bool(false)),
            then: Box::new(Node::Block(vec![Node::Int(1)])),
            otherwise: Box::new(Node::Block(vec![Node::Int(2)])),
        }
    );
}

#[test]
fn while_loop() {
    assert_eq!(
        parse_one("while a < 10 a = a + 1"),
        Node::While {
            cond: Box::new(binop(BinOp::Lt, Node::Name("a".into()), Node::Int(10))),
            body: Box::new(Node::Assign {
                target: Box::new(Node::Name("a".into())),
                value: Box::new(binop(BinOp::Add, Node::Name("a".into()), Node::Int(1))),
            }),
        }
    );
}

#[test]
fn blocks_split_on_newlines_and_semicolons() {
    let expected = Node::Block(vec![Node::Int(1), Node::Int(2)]);
    assert_eq!(parse_one("{\n1\n2\n}"), expected);
    assert_eq!(parse_one("{ 1; 2 }"), expected);
}

#[test]
fn function_literals() {
    assert_eq!(
        parse_one("(n) -> 1"),
        Node::Function {
            params: vec!["n".into()],
            body: Box::new(Node::Int(1)),
            local_cnt: 0,
        }
    );
    assert_eq!(
        parse_one("() -> 1"),
        Node::Function {
            params: vec![],
            body: Box::new(Node::Int(1)),
            local_cnt: 0,
        }
    );
}

#[test]
fn curried_function_literal() {
    assert_eq!(
        parse_one("(a) -> (b) -> a + b"),
        Node::Function {
            params: vec!["a".into()],
            body: Box::new(Node::Function {
                params: vec!["b".into()],
                body: Box::new(binop(
                    BinOp::Add,
                    Node::Name("a".into()),
                    Node::Name("b".into())
                )),
                local_cnt: 0,
            }),
            local_cnt: 0,
        }
    );
}

#[test]
fn call_with_arguments() {
    assert_eq!(
        parse_one("f(1, x)"),
        Node::Call {
            callee: Box::new(Node::Name("f".into())),
            args: vec![Node::Int(1), Node::Name("x".into())],
        }
    );
}

#[test]
fn return_statement() {
    assert_eq!(parse_one("return 1"), Node::Return(Box::new(Node::Int(1))));
}

#[test]
fn parameters_must_be_names() {
    let err = parse("(1, b) -> 1").expect_err("should fail");
    assert!(matches!(err, ParseError::InvalidParameter { .. }));
}

#[test]
fn multiple_top_level_statements() {
    let stmts = parse("a = 1\na + 1").expect("parse failed");
    assert_eq!(stmts.len(), 2);
}

#[test]
fn unterminated_block_is_incomplete() {
    let err = parse("{\na = 1\n").expect_err("should fail");
    assert!(err.is_incomplete());
}

#[test]
fn unterminated_call_is_incomplete() {
    let err = parse("f(1,").expect_err("should fail");
    assert!(err.is_incomplete());
}

#[test]
fn lexer_error_surfaces_with_prefix() {
    let err = parse("1 @ 2").expect_err("should fail");
    assert!(err.to_string().starts_with("Lexer: "));
}

#[test]
fn multi_line_qsort_program_parses() {
    let src = r#"{
      filter = (pred, ary) -> {
        i = 0
        r = []
        while i < #ary {
          if pred(ary[i]) r = r + [ary[i]]
          i = i + 1
        }
        r
      }
      qsort = (ary) -> {
        if #ary <= 1 ary else {
          pivot = ary[0]
          tail = ary [1:#ary]
          qsort(filter((n) -> n <= pivot, tail)) + [pivot] + qsort(filter((n) -> n > pivot, tail))
        }
      }
      qsort([5, 2, 4, 3, 1, 8])
    }"#;
    let stmts = parse(src).expect("parse failed");
    assert_eq!(stmts.len(), 1);
    assert!(matches!(&stmts[0], Node::Block(body) if body.len() == 3));
}
