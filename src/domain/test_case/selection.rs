//! Boolean selection expressions for `-k` (keywords) and `-m` (markers)
//!
//! Grammar:
//!
//! ```text
//! expr    := and ("or" and)*
//! and     := not ("and" not)*
//! not     := "not" not | primary
//! primary := "(" expr ")" | IDENT | QUOTED
//! ```

use std::collections::BTreeSet;

use thiserror::Error;

use super::TestCase;
use crate::domain::classifier::Approach;

/// Errors raised while parsing a selection expression
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SelectionError {
    #[error("Selection expression is empty")]
    Empty,

    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Unterminated quoted string starting at position {0}")]
    UnterminatedQuote(usize),

    #[error("Expression is nested too deeply at position {position}")]
    TooDeep { position: usize },
}

/// Limit on `not` and parenthesis nesting
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Ident(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Ident(s) => write!(f, "{}", s),
        }
    }
}

/// Parsed selection expression
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionExpr {
    Ident(String),
    Not(Box<SelectionExpr>),
    And(Box<SelectionExpr>, Box<SelectionExpr>),
    Or(Box<SelectionExpr>, Box<SelectionExpr>),
}

impl SelectionExpr {
    /// Parse an expression such as `generic and not rag`
    pub fn parse(input: &str) -> Result<Self, SelectionError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_or()?;

        if let Some((token, position)) = parser.tokens.get(parser.pos) {
            return Err(SelectionError::UnexpectedToken {
                token: token.to_string(),
                position: *position,
            });
        }

        Ok(expr)
    }

    /// Evaluate with a custom identifier predicate
    pub fn evaluate(&self, matches: &dyn Fn(&str) -> bool) -> bool {
        match self {
            SelectionExpr::Ident(name) => matches(name),
            SelectionExpr::Not(inner) => !inner.evaluate(matches),
            SelectionExpr::And(lhs, rhs) => lhs.evaluate(matches) && rhs.evaluate(matches),
            SelectionExpr::Or(lhs, rhs) => lhs.evaluate(matches) || rhs.evaluate(matches),
        }
    }

    /// `-k` semantics: case-insensitive substring match against any keyword
    pub fn matches_keywords(&self, keywords: &[String]) -> bool {
        let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        self.evaluate(&|ident| {
            let needle = ident.to_lowercase();
            lowered.iter().any(|k| k.contains(&needle))
        })
    }

    /// `-m` semantics: exact marker name match
    pub fn matches_markers(&self, markers: &BTreeSet<String>) -> bool {
        self.evaluate(&|ident| markers.contains(ident))
    }
}

/// Combined `-k` / `-m` selection applied to (test case, approach) pairs
#[derive(Debug, Clone, Default)]
pub struct Selection {
    keyword: Option<SelectionExpr>,
    marker: Option<SelectionExpr>,
}

impl Selection {
    /// Select everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse optional `-k` and `-m` expressions
    pub fn parse(keyword: Option<&str>, marker: Option<&str>) -> Result<Self, SelectionError> {
        Ok(Self {
            keyword: keyword.map(SelectionExpr::parse).transpose()?,
            marker: marker.map(SelectionExpr::parse).transpose()?,
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.keyword.is_none() && self.marker.is_none()
    }

    /// Keywords an assertion can be selected by
    pub fn keywords(test_case: &TestCase, approach: Approach) -> Vec<String> {
        let mut keywords = vec![
            test_case.query().to_string(),
            test_case.query_type().to_string(),
            approach.to_string(),
        ];
        keywords.extend(test_case.markers().iter().cloned());
        keywords
    }

    /// Whether the assertion of `approach` on `test_case` is selected
    pub fn selects(&self, test_case: &TestCase, approach: Approach) -> bool {
        let marker_ok = self
            .marker
            .as_ref()
            .map(|m| m.matches_markers(test_case.markers()))
            .unwrap_or(true);

        let keyword_ok = self
            .keyword
            .as_ref()
            .map(|k| k.matches_keywords(&Self::keywords(test_case, approach)))
            .unwrap_or(true);

        marker_ok && keyword_ok
    }

    /// Selected approaches for a test case (empty when the case is deselected)
    pub fn approaches(&self, test_case: &TestCase) -> Vec<Approach> {
        Approach::ALL
            .into_iter()
            .filter(|a| self.selects(test_case, *a))
            .collect()
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, SelectionError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (position, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                tokens.push((Token::LParen, position));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, position));
                i += 1;
            }
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some((_, ch)) if *ch == quote => {
                            i += 1;
                            break;
                        }
                        Some((_, ch)) => {
                            value.push(*ch);
                            i += 1;
                        }
                        None => return Err(SelectionError::UnterminatedQuote(position)),
                    }
                }
                tokens.push((Token::Ident(value), position));
            }
            _ => {
                let mut word = String::new();
                while let Some((_, ch)) = chars.get(i) {
                    if ch.is_whitespace() || *ch == '(' || *ch == ')' {
                        break;
                    }
                    word.push(*ch);
                    i += 1;
                }
                let token = match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Ident(word),
                };
                tokens.push((token, position));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn descend(&mut self, position: usize) -> Result<(), SelectionError> {
        if self.depth >= MAX_NESTING {
            return Err(SelectionError::TooDeep { position });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_or(&mut self) -> Result<SelectionExpr, SelectionError> {
        let mut expr = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            expr = SelectionExpr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<SelectionExpr, SelectionError> {
        let mut expr = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.parse_not()?;
            expr = SelectionExpr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<SelectionExpr, SelectionError> {
        if let Some((Token::Not, position)) = self.tokens.get(self.pos) {
            let position = *position;
            self.descend(position)?;
            self.pos += 1;
            let inner = self.parse_not()?;
            self.depth -= 1;
            return Ok(SelectionExpr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<SelectionExpr, SelectionError> {
        let (token, position) = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(SelectionError::UnexpectedEnd)?;
        self.pos += 1;

        match token {
            Token::Ident(name) => Ok(SelectionExpr::Ident(name)),
            Token::LParen => {
                self.descend(position)?;
                let expr = self.parse_or()?;
                self.depth -= 1;
                match self.tokens.get(self.pos) {
                    Some((Token::RParen, _)) => {
                        self.pos += 1;
                        Ok(expr)
                    }
                    Some((other, position)) => Err(SelectionError::UnexpectedToken {
                        token: other.to_string(),
                        position: *position,
                    }),
                    None => Err(SelectionError::UnexpectedEnd),
                }
            }
            other => Err(SelectionError::UnexpectedToken {
                token: other.to_string(),
                position,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_keyword_substring() {
        let expr = SelectionExpr::parse("exact").unwrap();
        assert!(expr.matches_keywords(&keywords(&["Ansell gloves", "exact_match", "old"])));
        assert!(!expr.matches_keywords(&keywords(&["pipettes", "generic", "old"])));
    }

    #[test]
    fn test_keyword_case_insensitive() {
        let expr = SelectionExpr::parse("ANSELL").unwrap();
        assert!(expr.matches_keywords(&keywords(&["Ansell gloves ANS 5789911"])));
    }

    #[test]
    fn test_and_not() {
        let expr = SelectionExpr::parse("generic and not rag").unwrap();
        assert!(expr.matches_keywords(&keywords(&["pipettes", "generic", "old"])));
        assert!(!expr.matches_keywords(&keywords(&["pipettes", "generic", "rag"])));
        assert!(!expr.matches_keywords(&keywords(&["tubes", "ambiguous", "old"])));
    }

    #[test]
    fn test_precedence_and_binds_tighter_than_or() {
        let expr = SelectionExpr::parse("brand or generic and rag").unwrap();
        assert!(expr.matches_keywords(&keywords(&["Yamato", "brand", "old"])));
        assert!(!expr.matches_keywords(&keywords(&["pipettes", "generic", "old"])));
    }

    #[test]
    fn test_parentheses() {
        let expr = SelectionExpr::parse("(brand or generic) and rag").unwrap();
        assert!(!expr.matches_keywords(&keywords(&["Yamato", "brand", "old"])));
        assert!(expr.matches_keywords(&keywords(&["Yamato", "brand", "rag"])));
    }

    #[test]
    fn test_quoted_phrase() {
        let expr = SelectionExpr::parse("'nitrile gloves'").unwrap();
        assert!(expr.matches_keywords(&keywords(&["blue nitrile gloves size medium"])));
        assert!(!expr.matches_keywords(&keywords(&["nitrile", "gloves"])));
    }

    #[test]
    fn test_markers_exact() {
        let expr = SelectionExpr::parse("not benchmark").unwrap();
        let mut markers = BTreeSet::new();
        assert!(expr.matches_markers(&markers));
        markers.insert("benchmark".to_string());
        assert!(!expr.matches_markers(&markers));
    }

    #[test]
    fn test_selection_by_approach() {
        use crate::domain::test_case::QueryType;

        let case = TestCase::filtered("pipettes", QueryType::Generic, "Pipettes", 0.8);
        let selection = Selection::parse(Some("rag"), None).unwrap();

        assert!(!selection.selects(&case, Approach::Old));
        assert!(selection.selects(&case, Approach::Rag));
        assert_eq!(selection.approaches(&case), vec![Approach::Rag]);
    }

    #[test]
    fn test_selection_by_marker() {
        use crate::domain::test_case::QueryType;

        let benchmark = TestCase::filtered("pipettes", QueryType::Generic, "Pipettes", 0.8)
            .with_marker("benchmark");
        let plain = TestCase::unfiltered("clear", QueryType::Ambiguous, 0.0);
        let selection = Selection::parse(None, Some("benchmark")).unwrap();

        assert_eq!(selection.approaches(&benchmark), vec![Approach::Old, Approach::Rag]);
        assert!(selection.approaches(&plain).is_empty());
    }

    #[test]
    fn test_selection_all() {
        use crate::domain::test_case::QueryType;

        let case = TestCase::unfiltered("clear", QueryType::Ambiguous, 0.0);
        let selection = Selection::all();

        assert!(selection.is_unfiltered());
        assert_eq!(selection.approaches(&case).len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SelectionExpr::parse("   "), Err(SelectionError::Empty));
        assert_eq!(SelectionExpr::parse("generic and"), Err(SelectionError::UnexpectedEnd));
        assert!(matches!(
            SelectionExpr::parse("generic rag"),
            Err(SelectionError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            SelectionExpr::parse("(generic"),
            Err(SelectionError::UnexpectedEnd)
        ));
        assert_eq!(
            SelectionExpr::parse("'open"),
            Err(SelectionError::UnterminatedQuote(0))
        );
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let parens = format!("{}generic{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(
            SelectionExpr::parse(&parens),
            Err(SelectionError::TooDeep {
                position: MAX_NESTING
            })
        );

        let nots = format!("{}generic", "not ".repeat(10_000));
        assert!(matches!(
            SelectionExpr::parse(&nots),
            Err(SelectionError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = MAX_NESTING / 2;
        let input = format!(
            "{}generic{} and {}rag",
            "(".repeat(depth),
            ")".repeat(depth),
            "not ".repeat(depth - 1)
        );
        let expr = SelectionExpr::parse(&input).unwrap();

        assert!(expr.matches_keywords(&keywords(&["pipettes", "generic", "old"])));
        assert!(!expr.matches_keywords(&keywords(&["pipettes", "generic", "rag"])));
    }
}
