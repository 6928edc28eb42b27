use std::collections::HashMap;
use std::error::Error as StdError;

use serde::Serialize;
use thiserror::Error;

use crate::convert::{self, ConvertError, LIST_SEPARATOR};

/// Handle to a section owned by an [`Ini`](crate::ini::Ini) document.
///
/// Sections refer to their fallback section through this handle instead of a
/// reference, so a reload can rebuild the table without leaving dangling links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub(crate) usize);

/// Errors raised when reading a property from a [`Section`].
#[derive(Debug, Error)]
pub enum PropertyError {
    /// The property does not exist in the section.
    #[error("Property \"{0}\" not exists")]
    NotFound(String),
    /// The property is missing or its value cannot be converted to the requested type.
    #[error("Property \"{name}\" is not a valid {expected} value: {source}")]
    InvalidType {
        /// Name of the requested property.
        name: String,
        /// Name of the requested type.
        expected: &'static str,
        /// Either the conversion failure or the wrapped `NotFound` error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl PropertyError {
    fn invalid_type<E>(name: &str, expected: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::InvalidType {
            name: name.to_string(),
            expected,
            source: Box::new(source),
        }
    }
}

/// A named group of properties, optionally carrying header attributes.
///
/// Property values are stored as cleaned raw text. Typed getters convert
/// that text on every call; nothing typed is cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Name from the header, or the default section name.
    name: String,
    /// Cleaned property values keyed by property name.
    properties: HashMap<String, String>,
    /// Attributes declared in the header, such as `type="Node2D"`.
    attributes: HashMap<String, String>,
    /// Fallback section handle. Not serialized, since it is only meaningful
    /// inside its document.
    #[serde(skip)]
    default_section: Option<SectionId>,
}

impl Section {
    /// Creates an empty section.
    ///
    /// # Arguments
    ///
    /// * `name` - The section name.
    /// * `default_section` - Optional handle to the fallback section.
    pub fn new(name: impl Into<String>, default_section: Option<SectionId>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            attributes: HashMap::new(),
            default_section,
        }
    }

    /// Name of the section as written in its header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to the fallback section, if any.
    ///
    /// Property lookups never consult it automatically. Resolve it with
    /// [`Ini::fallback_of`](crate::ini::Ini::fallback_of) to chain lookups.
    pub fn default_section(&self) -> Option<SectionId> {
        self.default_section
    }

    /// Renames the section. Names are not required to be unique.
    pub fn change_name(&mut self, new_name: impl Into<String>) {
        self.name = new_name.into();
    }

    /// Sets or clears the fallback section handle.
    ///
    /// # Arguments
    ///
    /// * `section` - Handle from the same document, or `None` to detach.
    pub fn set_default_section(&mut self, section: Option<SectionId>) {
        self.default_section = section;
    }

    /// Attributes declared on the section header.
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Returns the value of a single header attribute.
    ///
    /// # Arguments
    ///
    /// * `name` - The attribute name, for example `load_steps`.
    ///
    /// # Returns
    ///
    /// The cleaned attribute value, or `None` if the header does not declare it.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Adds or replaces a header attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Every property of the section, keyed by name.
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// Names of every property, in no particular order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Returns `true` if the section holds a property named `name`.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub(crate) fn insert_property(&mut self, name: String, value: String) {
        self.properties.insert(name, value);
    }

    pub(crate) fn extend_attributes(&mut self, attributes: HashMap<String, String>) {
        self.attributes.extend(attributes);
    }

    /// Returns the raw value of a property.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::NotFound` if the key is absent.
    pub fn property(&self, name: &str) -> Result<&str, PropertyError> {
        self.properties
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| PropertyError::NotFound(name.to_string()))
    }

    /// Returns the raw value of a property, or `default` if it is absent.
    pub fn property_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.property(name).unwrap_or(default)
    }

    fn typed_property<T>(
        &self,
        name: &str,
        expected: &'static str,
        convert: fn(&str) -> Result<T, ConvertError>,
    ) -> Result<T, PropertyError> {
        let raw = self
            .property(name)
            .map_err(|err| PropertyError::invalid_type(name, expected, err))?;
        convert(raw).map_err(|err| PropertyError::invalid_type(name, expected, err))
    }

    /// Reads a property as a boolean (`yes`/`y`/`true`/`1` or `no`/`n`/`false`/`0`).
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidType` if the property is missing or not a boolean literal.
    pub fn boolean_property(&self, name: &str) -> Result<bool, PropertyError> {
        self.typed_property(name, "boolean", convert::parse_boolean)
    }

    /// Reads a property as a boolean, falling back to a default.
    ///
    /// # Arguments
    ///
    /// * `name` - The property to read.
    /// * `default` - Value returned when the property is missing or not a
    ///   boolean literal.
    ///
    /// # Returns
    ///
    /// The parsed boolean, or `default`.
    pub fn boolean_property_or_default(&self, name: &str, default: bool) -> bool {
        self.boolean_property(name).unwrap_or(default)
    }

    /// Reads a property as an `i8`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidType` if the property is missing or out of range.
    pub fn byte_property(&self, name: &str) -> Result<i8, PropertyError> {
        self.typed_property(name, "byte", convert::parse_byte)
    }

    /// Like [`Section::byte_property`], returning `default` when the property
    /// is missing or invalid.
    pub fn byte_property_or_default(&self, name: &str, default: i8) -> i8 {
        self.byte_property(name).unwrap_or(default)
    }

    /// Reads a property as an `i16`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidType` if the property is missing or out of range.
    pub fn short_property(&self, name: &str) -> Result<i16, PropertyError> {
        self.typed_property(name, "short", convert::parse_short)
    }

    /// Like [`Section::short_property`], returning `default` when the property
    /// is missing or invalid.
    pub fn short_property_or_default(&self, name: &str, default: i16) -> i16 {
        self.short_property(name).unwrap_or(default)
    }

    /// Reads a property as an `i32`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidType` if the property is missing or out of range.
    pub fn integer_property(&self, name: &str) -> Result<i32, PropertyError> {
        self.typed_property(name, "integer", convert::parse_int)
    }

    /// Like [`Section::integer_property`], returning `default` when the property
    /// is missing or invalid.
    pub fn integer_property_or_default(&self, name: &str, default: i32) -> i32 {
        self.integer_property(name).unwrap_or(default)
    }

    /// Reads a property as an `f32`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidType` if the property is missing or not a number.
    pub fn float_property(&self, name: &str) -> Result<f32, PropertyError> {
        self.typed_property(name, "float", convert::parse_float)
    }

    /// Like [`Section::float_property`], returning `default` when the property
    /// is missing or invalid.
    pub fn float_property_or_default(&self, name: &str, default: f32) -> f32 {
        self.float_property(name).unwrap_or(default)
    }

    /// Reads a property as an `f64`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidType` if the property is missing or not a number.
    pub fn double_property(&self, name: &str) -> Result<f64, PropertyError> {
        self.typed_property(name, "double", convert::parse_double)
    }

    /// Like [`Section::double_property`], returning `default` when the property
    /// is missing or invalid.
    pub fn double_property_or_default(&self, name: &str, default: f64) -> f64 {
        self.double_property(name).unwrap_or(default)
    }

    /// Reads a property as an `i64`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::InvalidType` if the property is missing or out of range.
    pub fn long_property(&self, name: &str) -> Result<i64, PropertyError> {
        self.typed_property(name, "long", convert::parse_long)
    }

    /// Like [`Section::long_property`], returning `default` when the property
    /// is missing or invalid.
    pub fn long_property_or_default(&self, name: &str, default: i64) -> i64 {
        self.long_property(name).unwrap_or(default)
    }

    /// Splits a property value into a list.
    ///
    /// Items are neither trimmed nor cleaned. Trailing empty items are
    /// dropped, while an empty value yields a single empty item.
    ///
    /// # Arguments
    ///
    /// * `name` - The property to read.
    /// * `separator` - Item separator, [`LIST_SEPARATOR`] when `None`.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::NotFound` if the key is absent.
    pub fn property_list(
        &self,
        name: &str,
        separator: Option<&str>,
    ) -> Result<Vec<&str>, PropertyError> {
        let value = self.property(name)?;
        let separator = separator.unwrap_or(LIST_SEPARATOR);

        if value.is_empty() || separator.is_empty() {
            return Ok(vec![value]);
        }

        let mut items: Vec<&str> = value.split(separator).collect();
        while items.last().is_some_and(|item| item.is_empty()) {
            items.pop();
        }
        Ok(items)
    }

    /// Like [`Section::property_list`], returning `None` when the key is absent.
    pub fn property_list_or_none(&self, name: &str, separator: Option<&str>) -> Option<Vec<&str>> {
        self.property_list(name, separator).ok()
    }
}
