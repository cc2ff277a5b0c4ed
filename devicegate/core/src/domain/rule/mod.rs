// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Selection-rule expression language.
//
// Rules map authenticated devices into device groups. The grammar is
// LL(1); `AND` binds tighter than `OR`:
//
// ```text
// Start      := Or
// Or         := And ( "OR" And )*
// And        := Thing ( "AND" Thing )*
// Thing      := "thingName" ":" ThingName
// ThingName  := ( Letter | Digit | '-' | '_' | '*' | '\:' )+
// ```
//
// A `*` in a thing-name value matches with the wildcard semantics of
// the session's `Thing.thingName` attribute.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::RuleExpression;
pub use lexer::TokenError;
pub use parser::ParseError;

use thiserror::Error;

/// Failure to turn rule source text into a [`RuleExpression`].
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
