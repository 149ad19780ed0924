//! Model-aware literal dispatch: custom parsers first, built-ins last.

use std::sync::Arc;

use super::{
    model_literals, BuiltinLiteralParser, LiteralParser, LiteralParserRegistry, LiteralParsingError,
    LiteralPrefixRegistry,
};
use crate::model::EdmModel;
use crate::types::TypeRef;
use crate::value::LiteralValue;

/// The literal parser of one model.
///
/// For a target type, the first of these that applies decides the result:
/// 1. the parser bound to an equivalent type;
/// 2. unbound parsers, in registration order, until one returns a value or an error;
/// 3. [`BuiltinLiteralParser`].
///
/// If none applies the result is `Ok(None)`.
#[derive(Debug)]
pub struct DefaultLiteralParser {
    parsers: Arc<LiteralParserRegistry>,
    prefixes: Arc<LiteralPrefixRegistry>,
}

impl DefaultLiteralParser {
    /// The parser of `model`, wired to the model's registries.
    #[must_use]
    pub fn get_or_create(model: &EdmModel) -> Arc<Self> {
        Arc::clone(&model_literals(model).default)
    }

    /// A parser over explicit registries, not attached to any model.
    #[must_use]
    pub fn with_registries(parsers: Arc<LiteralParserRegistry>, prefixes: Arc<LiteralPrefixRegistry>) -> Self {
        Self { parsers, prefixes }
    }

    #[must_use]
    pub fn parsers(&self) -> &Arc<LiteralParserRegistry> {
        &self.parsers
    }

    #[must_use]
    pub fn prefixes(&self) -> &Arc<LiteralPrefixRegistry> {
        &self.prefixes
    }

    /// Parse `text` as a literal of `target`.
    ///
    /// # Errors
    /// Returns the `LiteralParsingError` of the first parser that rejects the text.
    pub fn parse(&self, text: &str, target: &TypeRef) -> Result<Option<LiteralValue>, LiteralParsingError> {
        // One table for the whole dispatch; concurrent edits apply to the next call.
        let table = self.parsers.dispatch_view();

        if let Some(bound) = table.bound_to(target) {
            tracing::trace!(type_name = target.full_name(), "Dispatching literal to type-bound parser");
            return bound.parse(text, target);
        }

        for (index, parser) in table.unbound().iter().enumerate() {
            if let Some(value) = parser.parse(text, target)? {
                tracing::trace!(
                    type_name = target.full_name(),
                    index,
                    kind = value.kind(),
                    "Unbound parser accepted literal"
                );
                return Ok(Some(value));
            }
        }

        let parsed = BuiltinLiteralParser.parse(text, target)?;
        if parsed.is_none() {
            tracing::trace!(type_name = target.full_name(), "No parser applies to literal");
        }
        Ok(parsed)
    }

    /// Parse `prefix'body'` text using the type the prefix is registered for.
    ///
    /// The full text, prefix included, is handed to the dispatch so the parser
    /// for the mapped type sees the literal as written. Returns `Ok(None)` when
    /// the text carries no registered prefix.
    ///
    /// # Errors
    /// Same as [`Self::parse`].
    pub fn parse_prefixed(&self, text: &str) -> Result<Option<(TypeRef, LiteralValue)>, LiteralParsingError> {
        let Some((target, _body)) = self.prefixes.match_prefixed(text) else {
            return Ok(None);
        };
        Ok(self.parse(text, &target)?.map(|value| (target, value)))
    }
}

impl LiteralParser for DefaultLiteralParser {
    fn parse(&self, text: &str, target: &TypeRef) -> Result<Option<LiteralValue>, LiteralParsingError> {
        DefaultLiteralParser::parse(self, text, target)
    }
}
