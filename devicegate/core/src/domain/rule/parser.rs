// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::rule::ast::RuleExpression;
use crate::domain::rule::lexer::{tokenize, Token};
use crate::domain::rule::RuleError;

const THING_NAME_KEYWORD: &str = "thingName";
const AND_KEYWORD: &str = "AND";
const OR_KEYWORD: &str = "OR";

/// A structurally invalid rule: unterminated input, a missing value, or
/// a token out of place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of rule, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken { expected: &'static str, found: String },

    #[error("unexpected trailing input starting at `{found}`")]
    TrailingInput { found: String },
}

/// Parse rule source text into an expression tree.
pub fn parse(source: &str) -> Result<RuleExpression, RuleError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, position: 0 };
    let expression = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::TrailingInput {
            found: display(token),
        }
        .into());
    }
    Ok(expression)
}

fn display(token: &Token) -> String {
    match token {
        Token::Word(word) => word.clone(),
        Token::Colon => ":".to_string(),
    }
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek_is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(word)) if word == keyword)
    }

    // Or := And ( "OR" And )*
    fn parse_or(&mut self) -> Result<RuleExpression, ParseError> {
        let mut expression = self.parse_and()?;
        while self.peek_is_keyword(OR_KEYWORD) {
            self.advance();
            let rhs = self.parse_and()?;
            expression = RuleExpression::Or(Box::new(expression), Box::new(rhs));
        }
        Ok(expression)
    }

    // And := Thing ( "AND" Thing )*
    fn parse_and(&mut self) -> Result<RuleExpression, ParseError> {
        let mut expression = self.parse_thing()?;
        while self.peek_is_keyword(AND_KEYWORD) {
            self.advance();
            let rhs = self.parse_thing()?;
            expression = RuleExpression::And(Box::new(expression), Box::new(rhs));
        }
        Ok(expression)
    }

    // Thing := "thingName" ":" ThingName
    fn parse_thing(&mut self) -> Result<RuleExpression, ParseError> {
        match self.advance() {
            Some(Token::Word(word)) if word == THING_NAME_KEYWORD => {}
            Some(token) => {
                return Err(ParseError::UnexpectedToken {
                    expected: "`thingName`",
                    found: display(token),
                })
            }
            None => {
                return Err(ParseError::UnexpectedEnd {
                    expected: "`thingName`",
                })
            }
        }

        match self.advance() {
            Some(Token::Colon) => {}
            Some(token) => {
                return Err(ParseError::UnexpectedToken {
                    expected: "`:`",
                    found: display(token),
                })
            }
            None => return Err(ParseError::UnexpectedEnd { expected: "`:`" }),
        }

        match self.advance() {
            Some(Token::Word(value)) => Ok(RuleExpression::Thing(value.clone())),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: "a thing name",
                found: display(token),
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected: "a thing name",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_thing() {
        let expression = parse("thingName: MyThing").unwrap();
        assert_eq!(expression, RuleExpression::Thing("MyThing".to_string()));
    }

    #[test]
    fn test_or_of_ands_precedence() {
        let expression = parse("thingName: A OR thingName: B AND thingName: C").unwrap();
        assert_eq!(
            expression,
            RuleExpression::Or(
                Box::new(RuleExpression::Thing("A".to_string())),
                Box::new(RuleExpression::And(
                    Box::new(RuleExpression::Thing("B".to_string())),
                    Box::new(RuleExpression::Thing("C".to_string())),
                )),
            )
        );
    }

    #[test]
    fn test_left_associative_chains() {
        let expression = parse("thingName: A OR thingName: B OR thingName: C").unwrap();
        assert_eq!(
            expression,
            RuleExpression::Or(
                Box::new(RuleExpression::Or(
                    Box::new(RuleExpression::Thing("A".to_string())),
                    Box::new(RuleExpression::Thing("B".to_string())),
                )),
                Box::new(RuleExpression::Thing("C".to_string())),
            )
        );
    }

    #[test]
    fn test_unterminated_rule_fails() {
        let error = parse("thingName: A OR").unwrap_err();
        assert!(matches!(
            error,
            RuleError::Parse(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_missing_value_fails() {
        let error = parse("thingName:").unwrap_err();
        assert!(matches!(
            error,
            RuleError::Parse(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_missing_colon_fails() {
        let error = parse("thingName MyThing").unwrap_err();
        assert!(matches!(
            error,
            RuleError::Parse(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_illegal_character_is_token_error() {
        let error = parse("thingName: My#Thing").unwrap_err();
        assert!(matches!(error, RuleError::Token(_)));
    }

    #[test]
    fn test_trailing_input_fails() {
        let error = parse("thingName: A thingName: B").unwrap_err();
        assert!(matches!(
            error,
            RuleError::Parse(ParseError::TrailingInput { .. })
        ));
    }
}
