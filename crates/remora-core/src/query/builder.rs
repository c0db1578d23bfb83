//! Fluent query builder validated against entity metadata
//!
//! Every operator is checked at translation time so that an unsupported
//! query shape fails here, in-process, and is never sent to the server.

use super::descriptor::{OrderKey, Predicate, QueryDescriptor, SortDirection};
use crate::errors::{RemoraError, Result};
use crate::metadata::{EntityDescriptor, PropertyDescriptor};

/// Builds a `QueryDescriptor` for one entity type
///
/// Building is lazy - no network call occurs until the resulting descriptor
/// is materialized through the engine.
#[derive(Debug)]
pub struct QueryBuilder<'d> {
    descriptor: &'d EntityDescriptor,
    query: QueryDescriptor,
}

impl<'d> QueryBuilder<'d> {
    /// Start a query against the given entity type
    pub fn for_entity(descriptor: &'d EntityDescriptor) -> Self {
        Self {
            descriptor,
            query: QueryDescriptor::default(),
        }
    }

    /// Apply a filter predicate
    ///
    /// Comparisons and string matches are supported on direct scalar fields
    /// only.
    ///
    /// # Errors
    ///
    /// `UnknownField` for a field the descriptor does not describe;
    /// `UnsupportedQuery` for predicates on path or navigation properties.
    pub fn filter(mut self, predicate: Predicate) -> Result<Self> {
        for field in predicate.fields() {
            self.direct_scalar(field)?;
        }
        self.query.filter = Some(match self.query.filter.take() {
            Some(existing) => Predicate::And(vec![existing, predicate]),
            None => predicate,
        });
        Ok(self)
    }

    /// Project the result to a subset of fields
    ///
    /// Selection is restricted to direct (non-path) properties; deep
    /// JSON-path properties are always fetched in full and extracted after
    /// the response arrives.
    ///
    /// # Errors
    ///
    /// `UnknownField` / `UnsupportedQuery` as for `filter`.
    pub fn select(mut self, fields: &[&str]) -> Result<Self> {
        for field in fields {
            self.direct_scalar(field)?;
            if !self.query.select.iter().any(|f| f == field) {
                self.query.select.push((*field).to_string());
            }
        }
        Ok(self)
    }

    /// Expand a navigation property inline
    ///
    /// # Errors
    ///
    /// `UnknownField` for an undescribed field; `NotExpandable` when the
    /// property is not marked expandable.
    pub fn expand(mut self, field: &str) -> Result<Self> {
        let property = self.known(field)?;
        if !property.expandable {
            return Err(RemoraError::NotExpandable {
                field: field.to_string(),
            });
        }
        if !self.query.expand.iter().any(|f| f == field) {
            self.query.expand.push(field.to_string());
        }
        Ok(self)
    }

    /// Add an ordering key; later keys act as tie-breakers
    ///
    /// # Errors
    ///
    /// `UnknownField` / `UnsupportedQuery` as for `filter`.
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Result<Self> {
        self.direct_scalar(field)?;
        self.query.order_by.push(OrderKey {
            field: field.to_string(),
            direction,
        });
        Ok(self)
    }

    /// Limit the page size (`$top`)
    pub fn take(mut self, n: u32) -> Self {
        self.query.top = Some(n);
        self
    }

    /// Skip the first `n` results - client-side, and expensive
    ///
    /// Neither target protocol supports server-side skip, so the skipped
    /// results are fully materialized (fetched and merged) before being
    /// sliced off the collection. Prefer a narrower filter when the skipped
    /// prefix is large.
    pub fn skip(mut self, n: u32) -> Self {
        self.query.skip = Some(n);
        self
    }

    /// Finish the descriptor
    ///
    /// Properties marked expand-by-default join the expand set here if the
    /// caller did not already name them.
    pub fn build(mut self) -> QueryDescriptor {
        for property in self.descriptor.properties() {
            if property.expand_by_default && !self.query.expand.iter().any(|f| *f == property.name)
            {
                self.query.expand.push(property.name.clone());
            }
        }
        self.query
    }

    fn known(&self, field: &str) -> Result<&'d PropertyDescriptor> {
        self.descriptor
            .property_named(field)
            .ok_or_else(|| RemoraError::UnknownField {
                entity: self.descriptor.tag().to_string(),
                field: field.to_string(),
            })
    }

    fn direct_scalar(&self, field: &str) -> Result<&'d PropertyDescriptor> {
        let property = self.known(field)?;
        if property.path.is_some() {
            return Err(RemoraError::UnsupportedQuery {
                reason: format!(
                    "'{}' is a path property and has no server-side form",
                    field
                ),
            });
        }
        if property.expandable {
            return Err(RemoraError::UnsupportedQuery {
                reason: format!("'{}' is a navigation property, not a scalar field", field),
            });
        }
        Ok(property)
    }
}
