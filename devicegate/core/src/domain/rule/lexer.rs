// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

/// A lexical token of the selection-rule grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word: a keyword (`thingName`, `AND`, `OR`) or a thing name.
    /// Escaped colons (`\:`) are already unescaped in the payload.
    Word(String),

    /// An unescaped `:` separator.
    Colon,
}

/// An input character the rule grammar does not admit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("illegal character `{character}` at position {position}")]
    IllegalCharacter { character: char, position: usize },

    #[error("dangling escape at position {position}")]
    DanglingEscape { position: usize },
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '*'
}

/// Split rule source text into tokens. Whitespace separates tokens; a
/// `:` inside a name must be escaped as `\:`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = source.char_indices();

    while let Some((position, character)) = chars.next() {
        match character {
            c if c.is_whitespace() => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
            }
            ':' => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
                tokens.push(Token::Colon);
            }
            '\\' => match chars.next() {
                Some((_, ':')) => word.push(':'),
                Some((escaped_position, other)) => {
                    return Err(TokenError::IllegalCharacter {
                        character: other,
                        position: escaped_position,
                    })
                }
                None => return Err(TokenError::DanglingEscape { position }),
            },
            c if is_name_char(c) => word.push(c),
            other => {
                return Err(TokenError::IllegalCharacter {
                    character: other,
                    position,
                })
            }
        }
    }

    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    Ok(tokens)
}
