//! Property naming schemes.
//!
//! Each entity names its backend sub-key from a closed, typed argument set.

use crate::constants::property_names;

/// Deterministic mapping from entity arguments to a property name.
pub trait PropertyNaming: Send + Sync {
    type Args: Sync;

    fn property_name(&self, args: &Self::Args) -> String;
}

/// Addresses one version of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormRef {
    pub form_number: u32,
    pub version: u32,
}

impl FormRef {
    pub fn new(form_number: u32, version: u32) -> Self {
        Self { form_number, version }
    }
}

/// `formData.v{version}.{form_number}`
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDataNaming;

impl PropertyNaming for FormDataNaming {
    type Args = FormRef;

    fn property_name(&self, args: &FormRef) -> String {
        format!("{}.v{}.{}", property_names::FORM_DATA, args.version, args.form_number)
    }
}

/// A single constant property name.
#[derive(Debug, Clone)]
pub struct FixedName(String);

impl FixedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl PropertyNaming for FixedName {
    type Args = ();

    fn property_name(&self, _: &()) -> String {
        self.0.clone()
    }
}
