//! Class descriptor parsing (one TOML document per exposed class)
//!
//! Provides structures and parsing for the per-class metadata the
//! generator consumes. Descriptors are created once at generation time
//! and immutable afterward.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during descriptor parsing
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Failed to read descriptor file
    #[error("Failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse descriptor: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid descriptor: {0}")]
    Validation(String),

    /// Two descriptors claim the same identity name
    #[error("Duplicate class identity: {0}")]
    Duplicate(String),
}

/// Who may instantiate an exposed class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructionPolicy {
    /// Application code constructs the facade; the facade builds its
    /// adapter.
    #[default]
    ConstructorVisible,
    /// Only the engine constructs instances; the adapter builds the
    /// facade it hands out.
    InternalOnly,
    /// The facade constructs, but instantiation happens on the component
    /// side through the registered constructor table.
    ExternalOnly,
}

/// Whether a descriptor describes a class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    /// Concrete class: adapter + facade pair is generated.
    #[default]
    Class,
    /// Interface: only a facade trait is generated.
    Interface,
}

/// One constructor or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Parameter name as it appears in generated signatures.
    pub name: String,
    /// Raw internal type name.
    #[serde(rename = "type")]
    pub ty: String,
}

/// One constructor or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Method name; ignored for constructors.
    #[serde(default)]
    pub name: String,

    /// Ordered parameters.
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,

    /// Raw internal return type; "void" when absent.
    #[serde(default = "default_void")]
    pub returns: String,

    /// Static methods dispatch directly, with no primary entry.
    #[serde(rename = "static", default)]
    pub is_static: bool,

    /// Raw source lines emitted before the generated call. Positional
    /// placeholders %1..%8 expand to parameter names.
    #[serde(default)]
    pub pre: Vec<String>,

    /// Raw source lines emitted after the generated call.
    #[serde(default)]
    pub post: Vec<String>,
}

fn default_void() -> String {
    "void".to_string()
}

impl MemberDescriptor {
    /// True when the member neither takes parameters nor carries raw
    /// snippet lines.
    pub fn is_bare(&self) -> bool {
        self.params.is_empty() && self.pre.is_empty() && self.post.is_empty()
    }

    /// Mangled signature key: name plus each raw parameter type, the
    /// scheme the constructor-metadata cache is keyed by.
    pub fn signature_key(&self, suffix: &str) -> String {
        let mut key = self.name.clone();
        for param in &self.params {
            key.push_str(&param.ty);
        }
        key.push_str(suffix);
        key
    }
}

/// One public constant copied onto the facade at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Constant name.
    pub name: String,
    /// Simple self-describing value type: bool, int, float, or str.
    #[serde(rename = "type")]
    pub ty: String,
    /// Literal value, emitted verbatim.
    pub value: String,
}

impl FieldDescriptor {
    /// Only simple value types may be copied onto the facade.
    pub fn is_simple_type(&self) -> bool {
        matches!(self.ty.as_str(), "bool" | "int" | "float" | "str")
    }
}

/// Top-level identity section of a descriptor document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassIdentity {
    /// Identity name, stable across versions (e.g. "RenderViewInternal").
    pub name: String,

    /// Class or interface.
    #[serde(default)]
    pub kind: ClassKind,

    /// Construction policy.
    #[serde(default)]
    pub policy: ConstructionPolicy,

    /// Optional supertype the facade should extend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Optional interface the facade should implement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implements: Option<String>,

    /// Optional instance-override type: the concrete type the adapter of
    /// an internal-only class retains instead of the identity type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// One exposed class: identity plus ordered member lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Identity section.
    pub class: ClassIdentity,

    /// Declared constructors, in source order.
    #[serde(default, rename = "constructor")]
    pub constructors: Vec<MemberDescriptor>,

    /// Declared constants, in source order.
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDescriptor>,

    /// Declared methods, in source order.
    #[serde(default, rename = "method")]
    pub methods: Vec<MemberDescriptor>,
}

impl ClassDescriptor {
    /// Parse a descriptor from TOML text.
    pub fn from_str(content: &str) -> Result<Self, DescriptorError> {
        let descriptor: ClassDescriptor = toml::from_str(content)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Parse a descriptor from a file.
    pub fn from_file(path: &Path) -> Result<Self, DescriptorError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Identity name.
    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Construction policy.
    pub fn policy(&self) -> ConstructionPolicy {
        self.class.policy
    }

    /// Whether this descriptor generates a facade trait only.
    pub fn is_interface(&self) -> bool {
        self.class.kind == ClassKind::Interface
    }

    /// Instance methods, in declaration order.
    pub fn instance_methods(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.methods.iter().filter(|m| !m.is_static)
    }

    /// Static methods, in declaration order.
    pub fn static_methods(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.methods.iter().filter(|m| m.is_static)
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        if self.class.name.is_empty() {
            return Err(DescriptorError::Validation(
                "class name must not be empty".to_string(),
            ));
        }
        if self.is_interface() && !self.constructors.is_empty() {
            return Err(DescriptorError::Validation(format!(
                "interface '{}' must not declare constructors",
                self.class.name
            )));
        }
        if self.is_interface() && !self.fields.is_empty() {
            return Err(DescriptorError::Validation(format!(
                "interface '{}' must not declare fields",
                self.class.name
            )));
        }
        if self.class.instance.is_some() && self.class.policy != ConstructionPolicy::InternalOnly {
            return Err(DescriptorError::Validation(format!(
                "class '{}': instance override requires internal-only policy",
                self.class.name
            )));
        }
        for method in &self.methods {
            if method.name.is_empty() {
                return Err(DescriptorError::Validation(format!(
                    "class '{}': method with empty name",
                    self.class.name
                )));
            }
        }
        for field in &self.fields {
            if !field.is_simple_type() {
                return Err(DescriptorError::Validation(format!(
                    "class '{}': field '{}' has non-simple type '{}'",
                    self.class.name, field.name, field.ty
                )));
            }
        }
        Ok(())
    }
}
