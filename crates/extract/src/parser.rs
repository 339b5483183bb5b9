//! Go 解析器 - tree-sitter-go

use crate::error::{ExtractError, Result};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// 已解析的源文件
pub struct SourceUnit {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl SourceUnit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub(crate) fn text(&self, node: Node) -> &str {
        &self.source[node.byte_range()]
    }
}

/// Go 解析器
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_go::language();
        parser
            .set_language(&language)
            .map_err(|e| ExtractError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// 解析一个源文件
    ///
    /// 语法树中出现任何 ERROR/MISSING 节点, 或缺少 package 子句, 都视为解析失败
    pub fn parse(
        &mut self,
        path: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Result<SourceUnit> {
        let path = path.into();
        let source = source.into();

        let tree = match self.parser.parse(&source, None) {
            Some(t) => t,
            None => {
                return Err(ExtractError::Parse {
                    path,
                    line: 1,
                    column: 1,
                    message: "parser produced no syntax tree".to_string(),
                })
            }
        };

        let root = tree.root_node();
        if let Some(node) = first_error(root) {
            let position = node.start_position();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                format!("unexpected `{}`", snippet(&source[node.byte_range()]))
            };
            return Err(ExtractError::Parse {
                path,
                line: position.row + 1,
                column: position.column + 1,
                message,
            });
        }

        if !root
            .children(&mut root.walk())
            .any(|c| c.kind() == "package_clause")
        {
            return Err(ExtractError::Parse {
                path,
                line: 1,
                column: 1,
                message: "expected package clause".to_string(),
            });
        }

        Ok(SourceUnit { path, source, tree })
    }
}

/// 深度优先找到第一个错误节点
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    Some(node)
}

fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > 24 {
        let head: String = line.chars().take(24).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_unit() {
        let mut parser = GoParser::new().unwrap();
        let unit = parser
            .parse("shapes.go", "package shapes\n\ntype Circle struct {\n\tR float64\n}\n")
            .unwrap();
        assert_eq!(unit.path(), Path::new("shapes.go"));
        assert_eq!(unit.root().kind(), "source_file");
    }

    #[test]
    fn test_parse_truncated_unit_reports_position() {
        let mut parser = GoParser::new().unwrap();
        let err = parser
            .parse("car.go", "package car\n\ntype Car struct {\n\tEngine *Eng")
            .err()
            .unwrap();
        match err {
            ExtractError::Parse { path, line, .. } => {
                assert_eq!(path, PathBuf::from("car.go"));
                assert!(line >= 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_empty_unit_is_failure() {
        let mut parser = GoParser::new().unwrap();
        let err = parser.parse("empty.go", "").err().unwrap();
        assert!(err.to_string().contains("expected package clause"));
        assert!(err.to_string().starts_with("empty.go:1:1"));
    }

    #[test]
    fn test_snippet_truncates_long_text() {
        assert_eq!(snippet("short"), "short");
        assert_eq!(snippet("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrstuvwx...");
    }
}
