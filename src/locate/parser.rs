use crate::locate::errors::LocateError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser wrapper for the expectation-bearing source dialect
/// (Python-syntax test files with triple-quoted block literals).
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    pub fn new() -> Result<Self, LocateError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = SupportLang::Python.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| LocateError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, LocateError> {
        self.parser
            .parse(source, None)
            .ok_or(LocateError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, LocateError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new().expect("failed to create default SourceParser")
    }
}

/// A parsed source buffer with its tree-sitter tree.
///
/// Never reused across patch requests: the file on disk is the source of
/// truth, so each request re-reads and re-parses.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    /// Get the root node of the tree.
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR nodes.
    pub fn has_errors(&self) -> bool {
        has_error_nodes(self.tree.root_node())
    }

    /// 1-indexed line of the first ERROR node, if any. Used for diagnostics
    /// when a buffer fails the strict-parse gate.
    pub fn first_error_line(&self) -> Option<usize> {
        first_error_node(self.tree.root_node()).map(|n| n.start_position().row + 1)
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

fn has_error_nodes(node: tree_sitter::Node<'_>) -> bool {
    first_error_node(node).is_some()
}

fn first_error_node<'t>(node: tree_sitter::Node<'t>) -> Option<tree_sitter::Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(err) = first_error_node(child) {
            return Some(err);
        }
    }

    None
}
