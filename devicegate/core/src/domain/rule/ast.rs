// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;

use crate::domain::rule::parser;
use crate::domain::rule::RuleError;
use crate::domain::session::{Session, THING_NAMESPACE, THING_NAME_ATTRIBUTE};

/// Parsed selection rule. `And` binds tighter than `Or`; both
/// short-circuit during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleExpression {
    /// `thingName: <value>`: matches when the session's
    /// `Thing.thingName` attribute matches the value expression.
    Thing(String),
    And(Box<RuleExpression>, Box<RuleExpression>),
    Or(Box<RuleExpression>, Box<RuleExpression>),
}

impl RuleExpression {
    /// Parse rule source text into an expression tree.
    pub fn parse(source: &str) -> Result<Self, RuleError> {
        parser::parse(source)
    }

    /// Evaluate this rule against a session. A missing attribute is
    /// `false`, never an error.
    pub fn evaluate(&self, session: &Session) -> bool {
        match self {
            Self::Thing(expression) => session
                .session_attribute(THING_NAMESPACE, THING_NAME_ATTRIBUTE)
                .is_some_and(|attribute| attribute.matches(Some(expression))),
            Self::And(lhs, rhs) => lhs.evaluate(session) && rhs.evaluate(session),
            Self::Or(lhs, rhs) => lhs.evaluate(session) || rhs.evaluate(session),
        }
    }
}

impl fmt::Display for RuleExpression {
    /// Pretty-print in the source grammar; re-parsing the output yields
    /// an equivalent tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thing(value) => {
                write!(f, "thingName: ")?;
                for character in value.chars() {
                    if character == ':' {
                        write!(f, "\\:")?;
                    } else {
                        write!(f, "{character}")?;
                    }
                }
                Ok(())
            }
            Self::And(lhs, rhs) => write!(f, "{lhs} AND {rhs}"),
            Self::Or(lhs, rhs) => write!(f, "{lhs} OR {rhs}"),
        }
    }
}
