//! Return-path location
//!
//! Walks a function body and lists every point where control leaves it.
//!
//! Policy for implicit exits: the end of the body counts as an exit only
//! when the body contains no explicit `return` at all. A function that
//! returns on some branches and falls off the end on others therefore gets
//! no probe for the fall-through path.

use crate::domain::ExitPoint;
use crate::frontend::{Body, Statement, StatementKind};

/// Exit points of `body`, in document order.
///
/// Returns inside nested function definitions and returns attributed to
/// system headers (e.g. expanded from a header macro) are not counted.
#[must_use]
pub fn locate_exits(body: &Body) -> Vec<ExitPoint> {
    let mut exits = Vec::new();
    for statement in &body.statements {
        collect_returns(statement, &mut exits);
    }

    if exits.is_empty() {
        let close_brace = body.close_brace();
        exits.push(ExitPoint::Implicit { close_brace });
    } else {
        exits.sort_by_key(|exit| exit.offset());
    }
    exits
}

fn collect_returns(statement: &Statement, exits: &mut Vec<ExitPoint>) {
    if statement.origin.is_system() {
        return;
    }
    match statement.kind {
        StatementKind::Return => {
            exits.push(ExitPoint::Explicit {
                span: statement.span,
                standalone: statement.standalone,
            });
        }
        StatementKind::NestedFunction => {}
        StatementKind::Block | StatementKind::Other => {
            for child in &statement.children {
                collect_returns(child, exits);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Span;

    fn body(span: Span, statements: Vec<Statement>) -> Body {
        Body { span, statements }
    }

    fn ret(start: usize, end: usize) -> Statement {
        Statement::leaf(StatementKind::Return, Span::new(start, end))
    }

    #[test]
    fn test_no_return_yields_implicit_exit() {
        let other = Statement::leaf(StatementKind::Other, Span::new(12, 20));
        let body = body(Span::new(10, 40), vec![other]);
        assert_eq!(
            locate_exits(&body),
            vec![ExitPoint::Implicit { close_brace: 39 }]
        );
    }

    #[test]
    fn test_single_return() {
        let body = body(Span::new(0, 30), vec![ret(5, 14)]);
        let exits = locate_exits(&body);
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].offset(), 5);
    }

    #[test]
    fn test_nested_returns_in_document_order() {
        let inner = Statement::leaf(StatementKind::Block, Span::new(30, 60))
            .with_children(vec![ret(40, 50)]);
        let loop_stmt =
            Statement::leaf(StatementKind::Other, Span::new(20, 60)).with_children(vec![inner]);
        let if_stmt = Statement::leaf(StatementKind::Other, Span::new(2, 18))
            .with_children(vec![ret(8, 17).unbraced()]);
        let body = body(Span::new(0, 80), vec![if_stmt, loop_stmt, ret(65, 74)]);

        let exits = locate_exits(&body);
        let offsets: Vec<usize> = exits.iter().map(|e| e.offset()).collect();
        assert_eq!(offsets, vec![8, 40, 65]);
        assert_eq!(
            exits[0],
            ExitPoint::Explicit {
                span: Span::new(8, 17),
                standalone: false,
            }
        );
    }

    #[test]
    fn test_mixed_paths_get_no_implicit_exit() {
        let if_stmt = Statement::leaf(StatementKind::Other, Span::new(2, 18))
            .with_children(vec![ret(8, 17).unbraced()]);
        let body = body(Span::new(0, 40), vec![if_stmt]);

        let exits = locate_exits(&body);
        assert_eq!(exits.len(), 1);
        assert!(matches!(exits[0], ExitPoint::Explicit { .. }));
    }

    #[test]
    fn test_nested_function_and_system_returns_skipped() {
        let nested = Statement::leaf(StatementKind::NestedFunction, Span::new(2, 20))
            .with_children(vec![ret(10, 18)]);
        let from_header = ret(22, 30).from_system();
        let body = body(Span::new(0, 40), vec![nested, from_header]);

        assert_eq!(
            locate_exits(&body),
            vec![ExitPoint::Implicit { close_brace: 39 }]
        );
    }
}
