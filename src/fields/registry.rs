// Ordered collection of fields bound to one binary dump

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::descriptor::FieldDescriptor;
use super::error::{FieldError, FieldResult};
use super::spec::FieldSpec;
use crate::bitwise::{AsciiMode, DataType, DecodedValue};
use crate::formats::{dict, text};
use crate::memmap::MemoryMap;

/// Registry behaviour that is not part of any single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Strictness of ASCII decoding for every field in the registry
    pub ascii_mode: AsciiMode,
    /// Refuse fields that share bits with an already registered one
    pub reject_overlaps: bool,
}

/// Fields mapped onto one immutable buffer.
///
/// Fields keep their declaration order for display; lookups by name go
/// through an index. Every failing mutation leaves the registry untouched.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    buffer: MemoryMap,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    options: RegistryOptions,
    unmapped_counter: usize,
}

impl FieldRegistry {
    pub fn new(buffer: impl Into<MemoryMap>) -> Self {
        Self::with_options(buffer, RegistryOptions::default())
    }

    pub fn with_options(buffer: impl Into<MemoryMap>, options: RegistryOptions) -> Self {
        Self {
            buffer: buffer.into(),
            fields: Vec::new(),
            index: HashMap::new(),
            options,
            unmapped_counter: 0,
        }
    }

    /// Build a registry and declare every field of `specs`
    pub fn from_spec(buffer: impl Into<MemoryMap>, specs: &[FieldSpec]) -> FieldResult<Self> {
        let mut registry = Self::new(buffer);
        registry.add_from_spec(specs)?;
        Ok(registry)
    }

    pub fn buffer(&self) -> &MemoryMap {
        &self.buffer
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Declare a field of `length` bits at absolute bit `start`
    pub fn add(
        &mut self,
        data_type: DataType,
        name: impl Into<String>,
        start: usize,
        length: usize,
    ) -> FieldResult<()> {
        let field = FieldDescriptor::new(data_type, name, start, length)?;
        self.add_field(field)
    }

    /// Declare a field by type tag; the tag's implied length is used when
    /// `length` is `None`
    pub fn add_tagged(
        &mut self,
        tag: &str,
        name: impl Into<String>,
        start: usize,
        length: Option<usize>,
    ) -> FieldResult<()> {
        let name = name.into();
        let (data_type, implied) = DataType::from_tag(tag)?;
        let length = length
            .or(implied)
            .ok_or_else(|| FieldError::invalid(&name, format!("type '{}' needs a length", tag)))?;

        self.add(data_type, name, start, length)
    }

    /// Register an already built descriptor
    pub fn add_field(&mut self, field: FieldDescriptor) -> FieldResult<()> {
        if self.index.contains_key(field.name()) {
            return Err(FieldError::DuplicateName(field.name().to_string()));
        }

        let available = self.buffer.bit_len();
        if field.start() + field.length() > available {
            return Err(FieldError::invalid(
                field.name(),
                format!(
                    "bits {}+{} exceed buffer of {} bits",
                    field.start(),
                    field.length(),
                    available
                ),
            ));
        }

        if let Some(other) = self
            .fields
            .iter()
            .find(|f| f.address().overlaps(&field.address()))
        {
            if self.options.reject_overlaps {
                return Err(FieldError::invalid(
                    field.name(),
                    format!("overlaps field '{}'", other.name()),
                ));
            }
            tracing::warn!("Field '{}' overlaps field '{}'", field.name(), other.name());
        }

        tracing::debug!(
            "Added field {} {} ({})",
            field.format_address(),
            field.name(),
            field.data_type()
        );

        self.index.insert(field.name().to_string(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Declare every field of `specs`. Either all of them are added or,
    /// on the first failure, none are.
    pub fn add_from_spec(&mut self, specs: &[FieldSpec]) -> FieldResult<()> {
        let before = self.fields.len();

        for spec in specs {
            if let Err(err) = spec.to_descriptor().and_then(|f| self.add_field(f)) {
                self.truncate(before);
                return Err(err);
            }
        }

        Ok(())
    }

    /// Declarations of all fields, in registration order
    pub fn get_spec(&self) -> Vec<FieldSpec> {
        self.fields.iter().map(FieldSpec::from).collect()
    }

    /// Drop a field; the others keep their relative order
    pub fn remove(&mut self, name: &str) -> FieldResult<FieldDescriptor> {
        let pos = self
            .index
            .remove(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;

        let field = self.fields.remove(pos);
        self.rebuild_index();

        tracing::debug!("Removed field {}", name);
        Ok(field)
    }

    pub fn get_item(&self, name: &str) -> FieldResult<&FieldDescriptor> {
        self.index
            .get(name)
            .map(|&pos| &self.fields[pos])
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))
    }

    pub fn get_value(&self, name: &str) -> FieldResult<DecodedValue> {
        self.value_of(self.get_item(name)?)
    }

    pub fn get_raw(&self, name: &str) -> FieldResult<Vec<u8>> {
        self.get_item(name)?.raw_value(&self.buffer)
    }

    /// Decode `field` against this registry's buffer and options
    pub fn value_of(&self, field: &FieldDescriptor) -> FieldResult<DecodedValue> {
        field.value(&self.buffer, self.options.ascii_mode)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in registration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// `(name, value)` pairs in registration order
    pub fn values(&self) -> impl Iterator<Item = (&str, FieldResult<DecodedValue>)> + '_ {
        self.fields.iter().map(|f| (f.name(), self.value_of(f)))
    }

    /// Snapshot of every field's value keyed by name
    pub fn get_dict(&self) -> FieldResult<HashMap<String, DecodedValue>> {
        dict::to_dict(self)
    }

    /// Pairs of field names that share at least one bit
    pub fn overlaps(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in self.fields.iter().enumerate() {
            for b in &self.fields[i + 1..] {
                if a.address().overlaps(&b.address()) {
                    pairs.push((a.name().to_string(), b.name().to_string()));
                }
            }
        }
        pairs
    }

    /// Cover every gap between mapped fields with `raw` fields named
    /// `unmapped_NNN`.
    ///
    /// Without `end_addr` the area after the last field is left alone;
    /// with it, the gap up to and including bit `end_addr` (clamped to the
    /// buffer) is filled as well. Returns the number of fields added.
    pub fn fill_unmapped(&mut self, end_addr: Option<usize>) -> FieldResult<usize> {
        if self.fields.is_empty() {
            return Ok(0);
        }

        let mut ranges: Vec<(usize, usize)> = self
            .fields
            .iter()
            .map(|f| (f.start(), f.end()))
            .collect();
        ranges.sort_unstable();

        let mut gaps = Vec::new();
        let mut next_free = 0;
        for (start, end) in ranges {
            if start > next_free {
                gaps.push((next_free, start - 1));
            }
            next_free = next_free.max(end + 1);
        }

        if let Some(end_addr) = end_addr {
            let last_bit = self.buffer.bit_len().saturating_sub(1);
            let end_addr = end_addr.min(last_bit);
            if end_addr >= next_free {
                gaps.push((next_free, end_addr));
            }
        }

        let before = self.fields.len();
        let counter = self.unmapped_counter;
        for (start, end) in &gaps {
            let name = self.next_unmapped_name();
            let added = FieldDescriptor::new(DataType::Raw, name, *start, end - start + 1)
                .and_then(|f| self.add_field(f));
            if let Err(err) = added {
                self.truncate(before);
                self.unmapped_counter = counter;
                return Err(err);
            }
        }

        tracing::debug!("Filled {} unmapped regions", gaps.len());
        Ok(gaps.len())
    }

    /// Render every field as one line, propagating decode failures
    pub fn render(&self) -> FieldResult<String> {
        text::render_registry(self)
    }

    fn next_unmapped_name(&mut self) -> String {
        loop {
            let name = format!("unmapped_{:03}", self.unmapped_counter);
            self.unmapped_counter += 1;
            if !self.index.contains_key(&name) {
                return name;
            }
        }
    }

    fn truncate(&mut self, len: usize) {
        for field in self.fields.drain(len..) {
            self.index.remove(field.name());
        }
    }

    /// Raw column of a display line; registered fields are always in bounds
    fn raw_column(&self, field: &FieldDescriptor) -> String {
        match field.raw_value(&self.buffer) {
            Ok(raw) => text::format_raw(&raw),
            Err(err) => format!("<error: {}>", err),
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .fields
            .iter()
            .enumerate()
            .map(|(pos, f)| (f.name().to_string(), pos))
            .collect();
    }
}

impl<'a> IntoIterator for &'a FieldRegistry {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let value = match self.value_of(field) {
                Ok(value) => value.to_string(),
                Err(err) => format!("<error: {}>", err),
            };
            let raw = self.raw_column(field);
            f.write_str(&text::format_line(field, &value, &raw))?;
        }
        Ok(())
    }
}
