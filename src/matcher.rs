//! Field selection predicates.
//!
//! Converters that need to pick key or join fields take a [`FieldMatcher`]
//! supplied by the caller instead of hard-coding a rule.

use std::collections::BTreeSet;

use crate::frame::{Field, FieldType, Frame};

pub trait FieldMatcher {
    /// `field` is always an element of `frame.fields`; `all` is the full
    /// batch the frame belongs to.
    fn matches(&self, field: &Field, frame: &Frame, all: &[Frame]) -> bool;
}

impl<F> FieldMatcher for F
where
    F: Fn(&Field, &Frame, &[Frame]) -> bool,
{
    fn matches(&self, field: &Field, frame: &Frame, all: &[Frame]) -> bool {
        self(field, frame, all)
    }
}

/// Matches the first time-typed field of each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTimeField;

impl FieldMatcher for FirstTimeField {
    fn matches(&self, field: &Field, frame: &Frame, _all: &[Frame]) -> bool {
        frame
            .first_time_field()
            .map(|index| std::ptr::eq(field, &frame.fields[index]))
            .unwrap_or(false)
    }
}

/// Matches every field of one type.
#[derive(Debug, Clone, Copy)]
pub struct ByType(pub FieldType);

impl FieldMatcher for ByType {
    fn matches(&self, field: &Field, _frame: &Frame, _all: &[Frame]) -> bool {
        field.field_type == self.0
    }
}

/// Matches fields whose name is in the set.
#[derive(Debug, Clone, Default)]
pub struct ByNames(BTreeSet<String>);

impl ByNames {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FieldMatcher for ByNames {
    fn matches(&self, field: &Field, _frame: &Frame, _all: &[Frame]) -> bool {
        self.0.contains(&field.name)
    }
}

/// Indices of the fields of `frame` selected by `matcher`.
pub(crate) fn matching_indices(
    matcher: &dyn FieldMatcher,
    frame: &Frame,
    all: &[Frame],
) -> Vec<usize> {
    frame
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| matcher.matches(field, frame, all))
        .map(|(index, _)| index)
        .collect()
}
