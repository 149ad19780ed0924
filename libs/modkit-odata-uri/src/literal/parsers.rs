//! Per-model registry of custom literal parsers.
//!
//! The registry state is an immutable [`ParserTable`] behind an `ArcSwap`.
//! Every mutation builds the next table and installs it with compare-and-swap
//! (`ArcSwap::rcu`), so readers never lock and a snapshot can never observe a
//! half-applied change.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{model_literals, same_parser, LiteralParser};
use crate::model::EdmModel;
use crate::types::{TypeKey, TypeRef};

/// A parser bound to one type, as captured in a snapshot.
#[derive(Clone)]
pub struct TypeBoundParser {
    type_ref: TypeRef,
    parser: Arc<dyn LiteralParser>,
}

impl TypeBoundParser {
    /// The type reference the parser was registered with.
    #[must_use]
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    #[must_use]
    pub fn parser(&self) -> &Arc<dyn LiteralParser> {
        &self.parser
    }
}

impl fmt::Debug for TypeBoundParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBoundParser")
            .field("type_ref", &self.type_ref)
            .field("parser", &Arc::as_ptr(&self.parser).cast::<()>())
            .finish()
    }
}

/// One immutable version of the registry contents.
#[derive(Clone, Default)]
pub(super) struct ParserTable {
    /// Registration order is dispatch order.
    unbound: Vec<Arc<dyn LiteralParser>>,
    by_type: HashMap<TypeKey, TypeBoundParser>,
}

impl ParserTable {
    fn contains(&self, parser: &Arc<dyn LiteralParser>) -> bool {
        self.unbound.iter().any(|p| same_parser(p, parser))
    }

    pub(super) fn bound_to(&self, target: &TypeRef) -> Option<&Arc<dyn LiteralParser>> {
        self.by_type.get(&target.key()).map(TypeBoundParser::parser)
    }

    pub(super) fn unbound(&self) -> &[Arc<dyn LiteralParser>] {
        &self.unbound
    }
}

/// Custom literal parsers of one model.
pub struct LiteralParserRegistry {
    table: ArcSwap<ParserTable>,
}

impl fmt::Debug for LiteralParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.load();
        f.debug_struct("LiteralParserRegistry")
            .field("unbound", &table.unbound.len())
            .field("type_bound", &table.by_type.len())
            .finish()
    }
}

impl Default for LiteralParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteralParserRegistry {
    /// A standalone registry, not attached to any model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(ParserTable::default()),
        }
    }

    /// The registry of `model`, created on first access.
    #[must_use]
    pub fn get_or_create(model: &EdmModel) -> Arc<Self> {
        Arc::clone(&model_literals(model).parsers)
    }

    /// Whether `parser` (this exact instance) is registered as unbound.
    #[must_use]
    pub fn contains(&self, parser: &Arc<dyn LiteralParser>) -> bool {
        self.table.load().contains(parser)
    }

    /// The parser bound to a type equivalent to `type_ref`.
    #[must_use]
    pub fn try_get(&self, type_ref: &TypeRef) -> Option<Arc<dyn LiteralParser>> {
        self.table.load().bound_to(type_ref).cloned()
    }

    /// Register an unbound parser. Returns `false` if the instance is already registered.
    #[must_use]
    pub fn add(&self, parser: Arc<dyn LiteralParser>) -> bool {
        let mut added = false;
        self.table.rcu(|current| {
            added = !current.contains(&parser);
            if !added {
                return Arc::clone(current);
            }
            let mut next = ParserTable::clone(current);
            next.unbound.push(Arc::clone(&parser));
            Arc::new(next)
        });

        if added {
            tracing::debug!("Added unbound literal parser");
        } else {
            tracing::debug!("Unbound literal parser already registered, ignoring");
        }
        added
    }

    /// Bind `parser` to `type_ref`.
    ///
    /// Returns `false` and keeps the existing parser if an equivalent type is
    /// already bound.
    #[must_use]
    pub fn add_for_type(&self, type_ref: TypeRef, parser: Arc<dyn LiteralParser>) -> bool {
        let key = type_ref.key();
        let mut added = false;
        self.table.rcu(|current| {
            added = !current.by_type.contains_key(&key);
            if !added {
                return Arc::clone(current);
            }
            let mut next = ParserTable::clone(current);
            next.by_type.insert(
                key.clone(),
                TypeBoundParser {
                    type_ref: type_ref.clone(),
                    parser: Arc::clone(&parser),
                },
            );
            Arc::new(next)
        });

        if added {
            tracing::debug!(type_name = type_ref.full_name(), "Bound literal parser to type");
        } else {
            tracing::debug!(
                type_name = type_ref.full_name(),
                nullable = type_ref.is_nullable(),
                "Type already has a literal parser, keeping the existing one"
            );
        }
        added
    }

    /// Unregister `parser` everywhere: from the unbound set and from every type
    /// it is bound to.
    ///
    /// Returns whether it was registered as unbound.
    #[must_use]
    pub fn remove(&self, parser: &Arc<dyn LiteralParser>) -> bool {
        let mut was_unbound = false;
        let mut bound_types = 0;
        self.table.rcu(|current| {
            was_unbound = current.contains(parser);
            bound_types = current
                .by_type
                .values()
                .filter(|bound| same_parser(&bound.parser, parser))
                .count();
            if !was_unbound && bound_types == 0 {
                return Arc::clone(current);
            }
            let mut next = ParserTable::clone(current);
            next.unbound.retain(|p| !same_parser(p, parser));
            next.by_type.retain(|_, bound| !same_parser(&bound.parser, parser));
            Arc::new(next)
        });

        tracing::debug!(was_unbound, bound_types, "Removed literal parser");
        was_unbound
    }

    /// Unbind the parser of a type equivalent to `type_ref`.
    ///
    /// The unbound set is left alone, even if it holds the same instance.
    #[must_use]
    pub fn remove_for_type(&self, type_ref: &TypeRef) -> bool {
        let key = type_ref.key();
        let mut removed = false;
        self.table.rcu(|current| {
            removed = current.by_type.contains_key(&key);
            if !removed {
                return Arc::clone(current);
            }
            let mut next = ParserTable::clone(current);
            next.by_type.remove(&key);
            Arc::new(next)
        });

        if removed {
            tracing::debug!(type_name = type_ref.full_name(), "Unbound literal parser from type");
        }
        removed
    }

    /// Unbound parsers in registration order, as of now.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn LiteralParser>> {
        self.table.load().unbound.clone()
    }

    /// Type-bound parsers, as of now. Order is unspecified.
    #[must_use]
    pub fn snapshot_by_type(&self) -> Vec<TypeBoundParser> {
        self.table.load().by_type.values().cloned().collect()
    }

    /// Number of unbound parsers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.load().unbound.len()
    }

    /// Whether no unbound parser is registered. Type bindings are not counted,
    /// as in [`Self::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.load().unbound.is_empty()
    }

    /// The whole current table, for consistent multi-step reads.
    pub(super) fn dispatch_view(&self) -> Arc<ParserTable> {
        self.table.load_full()
    }
}
