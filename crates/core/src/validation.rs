//! Presence checks for form input.
//!
//! Only presence is checked: an empty string is missing, anything else is
//! accepted as-is. Format validation is the identity provider's concern.

/// A named form field that must be non-empty before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField<'a> {
    pub name: &'static str,
    pub value: &'a str,
}

impl<'a> RequiredField<'a> {
    pub fn new(name: &'static str, value: &'a str) -> Self {
        Self { name, value }
    }

    pub fn is_present(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Names of the required fields that are empty, in declaration order.
pub fn missing_required(fields: &[RequiredField<'_>]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|f| !f.is_present())
        .map(|f| f.name)
        .collect()
}
