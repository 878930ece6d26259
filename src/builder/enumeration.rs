use crate::builder::{Owner, Standalone};
use crate::error::DefinitionError;
use crate::model::EnumEntry;
use crate::types::check_identifier;
use crate::value::Value;

/// Builds one enumeration constant with its constructor arguments.
pub struct EnumerationBuilder<P> {
    parent: P,
    name: String,
    arguments: Vec<Value>,
}

impl EnumerationBuilder<Standalone> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::owned(Standalone, name.into())
    }

    pub fn build(self) -> Result<EnumEntry, DefinitionError> {
        self.assemble().map(|(_, e)| e)
    }
}

impl<P> EnumerationBuilder<P> {
    pub(crate) fn owned(parent: P, name: String) -> Self {
        Self { parent, name, arguments: Vec::new() }
    }

    pub fn add_argument(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }

    fn assemble(self) -> Result<(P, EnumEntry), DefinitionError> {
        check_identifier(&self.name)?;
        Ok((self.parent, EnumEntry { name: self.name, arguments: self.arguments }))
    }
}

impl<P: Owner<EnumEntry>> EnumerationBuilder<P> {
    pub fn finish(self) -> Result<P, DefinitionError> {
        let (mut parent, entry) = self.assemble()?;
        parent.adopt(entry)?;
        Ok(parent)
    }
}
