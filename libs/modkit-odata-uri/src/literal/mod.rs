//! Literal parsing and its per-model extension points.
//!
//! Hosts register custom [`LiteralParser`]s in the model's
//! [`LiteralParserRegistry`], either unbound (the parser decides per target
//! type) or bound to one type. [`DefaultLiteralParser`] consults them before the
//! [`BuiltinLiteralParser`] fallback. [`LiteralPrefixRegistry`] maps custom
//! literal prefixes (`money'12.50'`) to the type they denote.

mod builtin;
mod default;
mod parsers;
mod prefixes;

pub use builtin::BuiltinLiteralParser;
pub use default::DefaultLiteralParser;
pub use parsers::{LiteralParserRegistry, TypeBoundParser};
pub use prefixes::LiteralPrefixRegistry;

use std::sync::{Arc, LazyLock};

use crate::model::{EdmModel, ModelStores};
use crate::types::TypeRef;
use crate::value::LiteralValue;

/// Converts literal text into a value of a target type.
///
/// Outcomes:
/// - `Ok(Some(value))`: the text was parsed
/// - `Err(error)`: the text is meant for this type but is malformed
/// - `Ok(None)`: the parser does not handle this type; the next one is tried
pub trait LiteralParser: Send + Sync {
    /// # Errors
    /// Returns `LiteralParsingError` when `text` is a malformed `target` literal.
    fn parse(&self, text: &str, target: &TypeRef) -> Result<Option<LiteralValue>, LiteralParsingError>;
}

impl<F> LiteralParser for F
where
    F: Fn(&str, &TypeRef) -> Result<Option<LiteralValue>, LiteralParsingError> + Send + Sync,
{
    fn parse(&self, text: &str, target: &TypeRef) -> Result<Option<LiteralValue>, LiteralParsingError> {
        self(text, target)
    }
}

/// Everything literal parsing keeps per model. Created and released as one
/// entry, so the default parser always reads the registries hosts write to.
#[derive(Debug)]
struct ModelLiterals {
    parsers: Arc<LiteralParserRegistry>,
    prefixes: Arc<LiteralPrefixRegistry>,
    default: Arc<DefaultLiteralParser>,
}

impl ModelLiterals {
    fn new() -> Self {
        let parsers = Arc::new(LiteralParserRegistry::new());
        let prefixes = Arc::new(LiteralPrefixRegistry::new());
        let default = Arc::new(DefaultLiteralParser::with_registries(
            Arc::clone(&parsers),
            Arc::clone(&prefixes),
        ));
        Self {
            parsers,
            prefixes,
            default,
        }
    }
}

static MODEL_LITERALS: LazyLock<ModelStores<ModelLiterals>> = LazyLock::new(ModelStores::new);

fn model_literals(model: &EdmModel) -> Arc<ModelLiterals> {
    MODEL_LITERALS.get_or_create_with(model, ModelLiterals::new)
}

/// Forget the literal registries and default parser of `model` in one step.
///
/// Runs when an [`EdmModel`] is dropped. Later `get_or_create` calls start from
/// empty registries; `Arc`s handed out before keep working on the old ones.
pub fn release_model(model: &EdmModel) {
    if MODEL_LITERALS.release(model).is_some() {
        tracing::debug!(model = %model.id(), "Released literal registries");
    }
}

/// Literal text that belongs to the target type but cannot be converted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse literal `{text}` as {type_name}: {reason}")]
pub struct LiteralParsingError {
    pub text: String,
    pub type_name: String,
    pub reason: String,
}

impl LiteralParsingError {
    #[must_use]
    pub fn new(text: impl Into<String>, type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn for_type(text: &str, target: &TypeRef, reason: impl Into<String>) -> Self {
        Self::new(text, target.full_name(), reason)
    }
}

/// Identity of a registered parser: the address of its allocation.
///
/// Unrelated to [`TypeRef::is_equivalent`]: parsers are members by instance,
/// type keys by structure.
pub(crate) fn same_parser(a: &Arc<dyn LiteralParser>, b: &Arc<dyn LiteralParser>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::types::EdmPrimitiveKind;

    #[test]
    fn test_closures_are_parsers() {
        let parser: Arc<dyn LiteralParser> = Arc::new(
            |text: &str, _: &TypeRef| -> Result<Option<LiteralValue>, LiteralParsingError> {
                Ok(Some(LiteralValue::String(text.to_uppercase())))
            },
        );
        let ty = TypeRef::primitive(EdmPrimitiveKind::String, false);
        assert_eq!(
            parser.parse("abc", &ty),
            Ok(Some(LiteralValue::String("ABC".to_owned())))
        );
    }

    #[test]
    fn test_identity_ignores_equal_behavior() {
        let make = || -> Arc<dyn LiteralParser> { Arc::new(BuiltinLiteralParser) };
        let a = make();
        let b = make();
        assert!(same_parser(&a, &Arc::clone(&a)));
        assert!(!same_parser(&a, &b));
    }

    #[test]
    fn test_error_message() {
        let ty = TypeRef::primitive(EdmPrimitiveKind::Int16, false);
        let err = LiteralParsingError::for_type("99999", &ty, "out of range");
        assert_eq!(
            err.to_string(),
            "cannot parse literal `99999` as Edm.Int16: out of range"
        );
    }
}
