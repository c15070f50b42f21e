//! Type transform rules.
//!
//! Pure mappings between the three layers a value can live in: the raw
//! internal type named by a descriptor, the adapter layer (boundary
//! values and handles), and the facade layer (the public surface).
//! Catalog types mangle (`RenderViewInternal` -> `RenderViewAdapter` /
//! `RenderView`); plain types pass through; `Vec<T>` and `Option<T>`
//! transform element-wise, recursively.

use crossbind_descriptor::{Catalog, ParamDescriptor};

use crate::error::GenError;

/// Parsed raw type, ready for per-layer rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawType {
    /// No value
    Void,
    /// bool
    Bool,
    /// 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// String
    Str,
    /// Class present in the catalog (identity name)
    CatalogClass(String),
    /// Interface present in the catalog (identity name)
    CatalogInterface(String),
    /// Opaque engine type not in the catalog
    Foreign(String),
    /// Homogeneous list
    Vec(Box<RawType>),
    /// Nullable reference
    Option(Box<RawType>),
}

/// Facade-layer stem for an internal identity: strips the `Internal`
/// suffix when present.
pub fn facade_stem(internal: &str) -> String {
    internal
        .strip_suffix("Internal")
        .unwrap_or(internal)
        .to_string()
}

/// Adapter-layer type name for an internal identity.
pub fn adapter_name(internal: &str) -> String {
    format!("{}Adapter", facade_stem(internal))
}

/// snake_case rendering of a CamelCase identifier, for file and module
/// names.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Module name of the generated facade unit.
pub fn facade_module(internal: &str) -> String {
    snake_case(&facade_stem(internal))
}

/// Module name of the generated adapter unit.
pub fn adapter_module(internal: &str) -> String {
    snake_case(&adapter_name(internal))
}

/// Transform rules over one loaded catalog.
pub struct TransformRules<'a> {
    catalog: &'a Catalog,
}

impl<'a> TransformRules<'a> {
    /// Rules consulting the given catalog for class identities.
    pub fn new(catalog: &'a Catalog) -> Self {
        TransformRules { catalog }
    }

    /// Parse a raw descriptor type. `class` names the descriptor being
    /// generated, for error reporting.
    pub fn parse(&self, class: &str, raw: &str) -> Result<RawType, GenError> {
        let raw = raw.trim();
        let unmappable = || GenError::UnmappableType {
            class: class.to_string(),
            ty: raw.to_string(),
        };

        if raw.is_empty() {
            return Err(unmappable());
        }
        if let Some(inner) = raw.strip_prefix("Vec<").and_then(|r| r.strip_suffix('>')) {
            return Ok(RawType::Vec(Box::new(self.parse(class, inner)?)));
        }
        if let Some(inner) = raw.strip_prefix("Option<").and_then(|r| r.strip_suffix('>')) {
            return Ok(RawType::Option(Box::new(self.parse(class, inner)?)));
        }
        // Fixed-size arrays cross the boundary as lists.
        if let Some(body) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let element = body.split(';').next().ok_or_else(unmappable)?;
            return Ok(RawType::Vec(Box::new(self.parse(class, element)?)));
        }
        match raw {
            "void" => return Ok(RawType::Void),
            "bool" => return Ok(RawType::Bool),
            "int" | "i64" => return Ok(RawType::Int),
            "float" | "f64" => return Ok(RawType::Float),
            "str" | "String" => return Ok(RawType::Str),
            _ => {}
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(unmappable());
        }
        if let Some(descriptor) = self.catalog.get(raw) {
            if descriptor.is_interface() {
                return Ok(RawType::CatalogInterface(raw.to_string()));
            }
            return Ok(RawType::CatalogClass(raw.to_string()));
        }
        Ok(RawType::Foreign(raw.to_string()))
    }

    /// Facade-layer type as it appears in generated signatures.
    pub fn facade_type(&self, class: &str, ty: &RawType) -> Result<String, GenError> {
        Ok(match ty {
            RawType::Void => "()".to_string(),
            RawType::Bool => "bool".to_string(),
            RawType::Int => "i64".to_string(),
            RawType::Float => "f64".to_string(),
            RawType::Str => "String".to_string(),
            RawType::CatalogClass(name) => format!("Arc<{}>", facade_stem(name)),
            RawType::CatalogInterface(name) => format!("Arc<dyn {}>", facade_stem(name)),
            RawType::Foreign(_) => "Instance".to_string(),
            RawType::Vec(inner) => format!("Vec<{}>", self.facade_type(class, inner)?),
            RawType::Option(inner) => format!("Option<{}>", self.facade_type(class, inner)?),
        })
    }

    /// `ParamType` constructor expression for the runtime signature.
    ///
    /// Interface-typed and void parameters have no boundary
    /// representation and are unmappable.
    pub fn param_type_expr(&self, class: &str, ty: &RawType) -> Result<String, GenError> {
        Ok(match ty {
            RawType::Bool => "ParamType::Bool".to_string(),
            RawType::Int => "ParamType::Int".to_string(),
            RawType::Float => "ParamType::Float".to_string(),
            RawType::Str => "ParamType::Str".to_string(),
            RawType::CatalogClass(name) | RawType::Foreign(name) => {
                format!("ParamType::object(\"{}\")", name)
            }
            RawType::Vec(inner) => {
                format!("ParamType::list({})", self.param_type_expr(class, inner)?)
            }
            RawType::Option(inner) => self.param_type_expr(class, inner)?,
            RawType::Void | RawType::CatalogInterface(_) => {
                return Err(GenError::UnmappableType {
                    class: class.to_string(),
                    ty: format!("{:?}", ty),
                })
            }
        })
    }

    /// Expression converting a facade-layer value named `var` into a
    /// boundary `Value` (the facade -> adapter unwrap direction).
    pub fn to_value_expr(&self, class: &str, ty: &RawType, var: &str) -> Result<String, GenError> {
        Ok(match ty {
            RawType::Bool | RawType::Int | RawType::Float | RawType::Str => {
                format!("Value::from({})", var)
            }
            RawType::Foreign(_) => format!("Value::Instance({})", var),
            // Unwrap through the facade's boundary accessor.
            RawType::CatalogClass(_) => format!("{}.as_value()", var),
            RawType::Vec(inner) => format!(
                "Value::List({}.into_iter().map(|item| {}).collect())",
                var,
                self.to_value_expr(class, inner, "item")?
            ),
            RawType::Option(inner) => format!(
                "match {} {{ Some(item) => {}, None => Value::Null }}",
                var,
                self.to_value_expr(class, inner, "item")?
            ),
            RawType::Void | RawType::CatalogInterface(_) => {
                return Err(GenError::UnmappableType {
                    class: class.to_string(),
                    ty: format!("{:?}", ty),
                })
            }
        })
    }

    /// Expression converting a boundary `Value` named `var` back to the
    /// facade layer (the adapter -> facade wrap direction). Evaluates to
    /// an `Option` of the facade type. Emitted where `resolver` and
    /// `component` bindings are in scope.
    pub fn from_value_expr(
        &self,
        class: &str,
        ty: &RawType,
        var: &str,
    ) -> Result<String, GenError> {
        Ok(match ty {
            RawType::Bool => format!("{}.as_bool()", var),
            RawType::Int => format!("{}.as_int()", var),
            RawType::Float => format!("{}.as_float()", var),
            RawType::Str => format!("{}.as_str().map(|s| s.to_string())", var),
            RawType::Foreign(_) => format!("{}.as_instance().cloned()", var),
            RawType::CatalogClass(name) => format!(
                "{}.as_instance().and_then(|inst| {}::from_instance(resolver, component, inst.clone()))",
                var,
                facade_stem(name)
            ),
            RawType::Vec(inner) => format!(
                "{}.as_list().and_then(|items| items.iter().map(|item| {}).collect::<Option<Vec<_>>>())",
                var,
                self.from_value_expr(class, inner, "item")?
            ),
            // Nullable folds into the Option every forwarded call yields.
            RawType::Option(inner) => self.from_value_expr(class, inner, var)?,
            RawType::Void | RawType::CatalogInterface(_) => {
                return Err(GenError::UnmappableType {
                    class: class.to_string(),
                    ty: format!("{:?}", ty),
                })
            }
        })
    }

    /// `name: Type, ...` parameter list in facade-layer types.
    pub fn facade_params(
        &self,
        class: &str,
        params: &[ParamDescriptor],
    ) -> Result<String, GenError> {
        let mut parts = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.parse(class, &param.ty)?;
            parts.push(format!("{}: {}", param.name, self.facade_type(class, &ty)?));
        }
        Ok(parts.join(", "))
    }

    /// `&[ParamType::..., ...]` slice expression for a signature.
    pub fn param_types_expr(
        &self,
        class: &str,
        params: &[ParamDescriptor],
    ) -> Result<String, GenError> {
        let mut parts = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.parse(class, &param.ty)?;
            parts.push(self.param_type_expr(class, &ty)?);
        }
        Ok(format!("&[{}]", parts.join(", ")))
    }

    /// `&[Value::..., ...]` argument slice expression, unwrapping each
    /// facade-layer parameter.
    pub fn args_expr(&self, class: &str, params: &[ParamDescriptor]) -> Result<String, GenError> {
        let mut parts = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.parse(class, &param.ty)?;
            parts.push(self.to_value_expr(class, &ty, &param.name)?);
        }
        Ok(format!("&[{}]", parts.join(", ")))
    }

    /// Bare `name, name, ...` forwarding list.
    pub fn arg_names(params: &[ParamDescriptor]) -> String {
        params
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Facade-layer return type of a forwarded call: absent results model
    /// every failure mode, so non-void returns wrap in `Option`.
    pub fn return_type(&self, class: &str, raw: &str) -> Result<(RawType, String), GenError> {
        let ty = self.parse(class, raw)?;
        let rendered = match ty {
            RawType::Void => "Option<()>".to_string(),
            ref other => format!("Option<{}>", self.facade_type(class, other)?),
        };
        Ok((ty, rendered))
    }
}
