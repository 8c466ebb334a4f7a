//! Tree-sitter based C front-end
//!
//! Parses a translation unit with `tree-sitter-c` and lowers the concrete
//! syntax tree into the owned [`syntax`](super::syntax) model. Origins come
//! from the line markers of preprocessed input (see [`OriginMap`]).
//!
//! Any `ERROR` or `MISSING` node makes the whole unit unparseable: edits
//! computed from a recovered tree could land in the wrong place.

use log::debug;
use tree_sitter::{Node, Parser};

use super::line_markers::OriginMap;
use super::syntax::{Body, FunctionDecl, Statement, StatementKind, TranslationUnit};
use super::Frontend;
use crate::domain::{InstrumentError, Span};

/// Statement kinds whose direct child statement is not part of a statement list
const UNBRACED_BODY_PARENTS: &[&str] = &[
    "if_statement",
    "else_clause",
    "while_statement",
    "for_statement",
    "do_statement",
];

/// Declarator wrappers between a function definition and its name
const DECLARATOR_WRAPPERS: &[&str] = &[
    "function_declarator",
    "pointer_declarator",
    "parenthesized_declarator",
    "attributed_declarator",
    "array_declarator",
];

/// C front-end backed by tree-sitter
pub struct CFrontend {
    parser: Parser,
    system_prefixes: Vec<String>,
}

impl CFrontend {
    /// Create a front-end with the C grammar loaded.
    ///
    /// # Errors
    /// Returns an error if the bundled grammar is incompatible with the
    /// linked tree-sitter runtime.
    pub fn new() -> Result<Self, InstrumentError> {
        let mut parser = Parser::new();
        let language = tree_sitter_c::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| InstrumentError::LanguageUnavailable(e.to_string()))?;
        Ok(Self {
            parser,
            system_prefixes: Vec::new(),
        })
    }

    /// Treat headers under these directories as system code.
    #[must_use]
    pub fn with_system_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.system_prefixes = prefixes;
        self
    }
}

impl Frontend for CFrontend {
    fn parse(&mut self, source: &str) -> Result<TranslationUnit, InstrumentError> {
        let origins = OriginMap::scan(source, &self.system_prefixes);
        let text = origins.mask(source);

        let Some(tree) = self.parser.parse(&text, None) else {
            return Err(InstrumentError::Parse {
                line: 1,
                column: 1,
                message: "parser produced no tree".to_string(),
            });
        };

        let root = tree.root_node();
        if root.has_error() {
            return Err(first_error(root, &text));
        }

        let lowering = Lowering {
            source: &text,
            origins: &origins,
        };
        let mut unit = TranslationUnit::default();
        lowering.collect_functions(root, &mut unit.functions);
        debug!("parsed {} function declarations", unit.functions.len());
        Ok(unit)
    }
}

struct Lowering<'a> {
    source: &'a str,
    origins: &'a OriginMap,
}

impl Lowering<'_> {
    /// Find function definitions and prototypes outside of function bodies.
    fn collect_functions(&self, node: Node, out: &mut Vec<FunctionDecl>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "function_definition" => {
                    if let Some(decl) = self.lower_definition(child) {
                        out.push(decl);
                    }
                }
                "declaration" => self.lower_prototypes(child, out),
                // Bodies of definitions are handled by `lower_definition`
                "compound_statement" => {}
                _ => self.collect_functions(child, out),
            }
        }
    }

    fn lower_definition(&self, node: Node) -> Option<FunctionDecl> {
        let name = node
            .child_by_field_name("declarator")
            .and_then(|d| self.declarator_name(d))?;
        let body = node
            .child_by_field_name("body")
            .filter(|b| b.kind() == "compound_statement")
            .map(|b| self.lower_body(b));

        Some(FunctionDecl {
            name,
            span: span_of(node),
            origin: self.origins.origin_at(node.start_byte()),
            is_definition: true,
            body,
        })
    }

    fn lower_prototypes(&self, node: Node, out: &mut Vec<FunctionDecl>) {
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            if !declares_function(declarator) {
                continue;
            }
            if let Some(name) = self.declarator_name(declarator) {
                out.push(FunctionDecl {
                    name,
                    span: span_of(node),
                    origin: self.origins.origin_at(node.start_byte()),
                    is_definition: false,
                    body: None,
                });
            }
        }
    }

    /// Unwrap pointer/paren/attribute declarators down to the identifier.
    fn declarator_name(&self, mut node: Node) -> Option<String> {
        loop {
            match node.kind() {
                "identifier" | "field_identifier" | "type_identifier" => {
                    let text = node.utf8_text(self.source.as_bytes()).ok()?;
                    return Some(text.to_string());
                }
                kind if DECLARATOR_WRAPPERS.contains(&kind) => {
                    node = node
                        .child_by_field_name("declarator")
                        .or_else(|| node.named_child(0))?;
                }
                _ => return None,
            }
        }
    }

    fn lower_body(&self, node: Node) -> Body {
        Body {
            span: span_of(node),
            statements: self.lower_children(node),
        }
    }

    fn lower_children(&self, node: Node) -> Vec<Statement> {
        let parent_kind = node.kind();
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .map(|child| self.lower_statement(child, parent_kind))
            .collect()
    }

    fn lower_statement(&self, node: Node, parent_kind: &str) -> Statement {
        let kind = match node.kind() {
            "return_statement" => StatementKind::Return,
            "compound_statement" => StatementKind::Block,
            "function_definition" => StatementKind::NestedFunction,
            _ => StatementKind::Other,
        };
        let children = if kind == StatementKind::Return {
            Vec::new()
        } else {
            self.lower_children(node)
        };

        Statement {
            kind,
            span: span_of(node),
            origin: self.origins.origin_at(node.start_byte()),
            standalone: !UNBRACED_BODY_PARENTS.contains(&parent_kind),
            children,
        }
    }
}

/// True for `f(...)` and `*f(...)`, false for variables and initialized declarators
fn declares_function(mut node: Node) -> bool {
    while node.kind() == "pointer_declarator" {
        match node.child_by_field_name("declarator") {
            Some(inner) => node = inner,
            None => return false,
        }
    }
    node.kind() == "function_declarator"
}

fn span_of(node: Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Build a diagnostic for the first error or missing node in document order.
fn first_error(root: Node, source: &str) -> InstrumentError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                let text = node.utf8_text(source.as_bytes()).unwrap_or_default();
                let snippet: String = text.chars().take(32).collect();
                format!("unexpected `{}`", snippet.trim())
            };
            return InstrumentError::Parse {
                line: pos.row + 1,
                column: pos.column + 1,
                message,
            };
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    InstrumentError::Parse {
        line: 1,
        column: 1,
        message: "syntax error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Origin;

    fn parse(source: &str) -> TranslationUnit {
        CFrontend::new().unwrap().parse(source).unwrap()
    }

    #[test]
    fn test_definitions_and_prototypes() {
        let unit = parse("int add(int a, int b);\nint add(int a, int b) { return a + b; }\n");
        assert_eq!(unit.functions.len(), 2);
        assert!(!unit.functions[0].is_definition);
        assert!(unit.functions[0].body.is_none());
        assert!(unit.functions[1].is_definition);
        assert_eq!(unit.functions[1].name, "add");
    }

    #[test]
    fn test_pointer_returning_function_name() {
        let unit = parse("static char *dup(const char *s) { return 0; }\n");
        assert_eq!(unit.functions[0].name, "dup");
    }

    #[test]
    fn test_body_braces() {
        let source = "void f(void) { }\n";
        let unit = parse(source);
        let body = unit.functions[0].body.as_ref().unwrap();
        assert_eq!(&source[body.open_brace()..=body.open_brace()], "{");
        assert_eq!(&source[body.close_brace()..=body.close_brace()], "}");
    }

    #[test]
    fn test_unbraced_return_is_not_standalone() {
        let unit = parse("int f(int x) { if (x) return 1; return 0; }\n");
        let body = unit.functions[0].body.as_ref().unwrap();
        let if_stmt = &body.statements[0];
        let nested = if_stmt
            .children
            .iter()
            .find(|s| s.kind == StatementKind::Return)
            .unwrap();
        assert!(!nested.standalone);
        assert!(body.statements[1].standalone);
    }

    #[test]
    fn test_function_inside_ifdef() {
        let unit = parse("#ifdef DEBUG\nvoid trace(void) { }\n#endif\n");
        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.functions[0].name, "trace");
    }

    #[test]
    fn test_system_origin_from_markers() {
        let source = concat!(
            "# 1 \"/usr/include/x.h\" 1 3 4\n",
            "static int helper(void) { return 1; }\n",
            "# 3 \"app.c\" 2\n",
            "int app(void) { return 2; }\n",
        );
        let unit = parse(source);
        assert_eq!(unit.functions[0].origin, Origin::System);
        assert_eq!(unit.functions[1].origin, Origin::Project);
    }

    #[test]
    fn test_parse_error_position() {
        let err = CFrontend::new()
            .unwrap()
            .parse("int f(void) {\n  return 1 +;\n}\n")
            .unwrap_err();
        match err {
            InstrumentError::Parse { line, column, .. } => {
                assert!(line >= 1 && column >= 1);
            }
            other => panic!("expected parse error, got {other}"),
        }
    }
}
