//! Facade source generation.
//!
//! The facade is the application-facing half of a generated pair: the
//! public type callers hold, with the declared constants copied on and
//! every method forwarding to the adapter's default entry. An override
//! trait accompanies each class facade so applications can intercept
//! engine-initiated calls. Interface descriptors render to a bare trait
//! with no adapter.

use crossbind_descriptor::{
    Catalog, ClassDescriptor, ConstructionPolicy, FieldDescriptor, MemberDescriptor,
    ParamDescriptor,
};

use crate::adapter::{constructor_fn_name, effective_constructors};
use crate::builder::SourceBuilder;
use crate::error::GenError;
use crate::rules::{adapter_name, facade_stem, TransformRules};

/// Expand positional placeholders `%1`..`%8` in a raw snippet line to
/// the declared parameter names.
pub fn expand_placeholders(line: &str, params: &[ParamDescriptor]) -> String {
    let mut out = line.to_string();
    for (i, param) in params.iter().enumerate().take(8) {
        out = out.replace(&format!("%{}", i + 1), &param.name);
    }
    out
}

pub struct FacadeGenerator<'a> {
    catalog: &'a Catalog,
    rules: TransformRules<'a>,
}

impl<'a> FacadeGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        FacadeGenerator {
            catalog,
            rules: TransformRules::new(catalog),
        }
    }

    /// Render the facade unit for one descriptor: a trait for an
    /// interface, a struct + override trait for a class.
    pub fn generate(&self, descriptor: &ClassDescriptor) -> Result<String, GenError> {
        if descriptor.is_interface() {
            self.generate_interface(descriptor)
        } else {
            self.generate_class(descriptor)
        }
    }

    fn generate_interface(&self, descriptor: &ClassDescriptor) -> Result<String, GenError> {
        let internal = descriptor.name();
        let name = facade_stem(internal);

        let mut b = SourceBuilder::new();
        self.emit_header(&mut b, internal, false, false);

        b.push_line(&format!(
            "/// Application-implemented callback surface for `{}`.",
            internal
        ));
        b.open(&format!("pub trait {}: Send + Sync", name));
        for method in descriptor.instance_methods() {
            let params = self.rules.facade_params(internal, &method.params)?;
            let sep = if params.is_empty() { "" } else { ", " };
            let (_, ret) = self.rules.return_type(internal, &method.returns)?;
            b.push_line(&format!(
                "fn {}(&self{}{}) -> {};",
                method.name, sep, params, ret
            ));
        }
        b.close();
        Ok(b.build())
    }

    fn generate_class(&self, descriptor: &ClassDescriptor) -> Result<String, GenError> {
        let internal = descriptor.name();
        let facade = facade_stem(internal);
        let adapter = adapter_name(internal);
        let policy = descriptor.policy();
        let internal_only = policy == ConstructionPolicy::InternalOnly;

        let mut b = SourceBuilder::new();
        self.emit_header(&mut b, internal, true, internal_only);

        b.push_line(&format!("/// Public surface of `{}`.", internal));
        if let Some(extends) = &descriptor.class.extends {
            b.push_line("///");
            b.push_line(&format!(
                "/// Conceptually extends `{}` on the engine side.",
                extends
            ));
        }
        b.open(&format!("pub struct {}", facade));
        if internal_only {
            // Non-owning back-reference; the adapter is the pair's root.
            b.push_line("resolver: Arc<Resolver>,");
            b.push_line(&format!("adapter: Weak<{}>,", adapter));
        } else {
            b.push_line(&format!("adapter: Arc<{}>,", adapter));
        }
        b.push_line(&format!(
            "overrides: Mutex<Option<Arc<dyn {}Overrides>>>,",
            facade
        ));
        b.close();
        b.blank();

        self.emit_overrides_trait(&mut b, descriptor, &facade)?;

        b.open(&format!("impl {}", facade));
        for field in &descriptor.fields {
            self.emit_field(&mut b, field);
        }

        match policy {
            ConstructionPolicy::ConstructorVisible | ConstructionPolicy::ExternalOnly => {
                for (i, ctor) in effective_constructors(descriptor).iter().enumerate() {
                    self.emit_constructor(&mut b, internal, &adapter, ctor, i)?;
                }
                self.emit_from_instance(&mut b, &adapter);
            }
            ConstructionPolicy::InternalOnly => {
                b.blank();
                b.push_line("/// Wrap an engine-created instance, reusing the facade already");
                b.push_line("/// paired with it. A fresh pair is rooted at the adapter and");
                b.push_line("/// anchored on the resolver.");
                b.open(
                    "pub fn from_instance(resolver: &Arc<Resolver>, component: &ComponentHandle, instance: Instance) -> Option<Arc<Self>>",
                );
                b.open("if let Some(facade) = resolver.lookup_facade::<Self>(&instance)");
                b.push_line("return Some(facade);");
                b.close();
                b.push_line(&format!(
                    "let adapter = {}::from_internal(resolver.clone(), component.clone(), Some(instance.clone()))?;",
                    adapter
                ));
                b.push_line("let facade = adapter.facade()?;");
                b.push_line("resolver.cache_facade(&instance, &facade);");
                b.push_line("resolver.anchor_adapter(&instance, adapter);");
                b.push_line("Some(facade)");
                b.close();
            }
        }

        b.blank();
        b.push_line("/// Pair a facade with its adapter. Called once at construction.");
        if internal_only {
            b.open(&format!(
                "pub fn attach(resolver: Arc<Resolver>, adapter: &Arc<{}>) -> Arc<Self>",
                adapter
            ));
            b.open(&format!("Arc::new({}", facade));
            b.push_line("resolver,");
            b.push_line("adapter: Arc::downgrade(adapter),");
            b.push_line("overrides: Mutex::new(None),");
            b.close_with("})");
            b.close();
        } else {
            b.open(&format!("pub fn attach(adapter: Arc<{}>) -> Arc<Self>", adapter));
            b.open(&format!("let facade = Arc::new({}", facade));
            b.push_line("adapter,");
            b.push_line("overrides: Mutex::new(None),");
            b.close_with("});");
            b.push_line("facade.adapter.attach_facade(&facade);");
            b.push_line("facade");
            b.close();
        }
        b.blank();
        b.open(&format!(
            "pub fn install_overrides(&self, overrides: Arc<dyn {}Overrides>)",
            facade
        ));
        b.push_line("*self.overrides.lock() = Some(overrides);");
        b.close();
        b.blank();
        b.open(&format!(
            "pub fn overrides(&self) -> Option<Arc<dyn {}Overrides>>",
            facade
        ));
        b.push_line("self.overrides.lock().clone()");
        b.close();
        b.blank();
        if internal_only {
            b.open(&format!("pub fn adapter(&self) -> Option<Arc<{}>>", adapter));
            b.push_line("self.adapter.upgrade()");
            b.close();
        } else {
            b.open(&format!("pub fn adapter(&self) -> &Arc<{}>", adapter));
            b.push_line("&self.adapter");
            b.close();
        }
        b.blank();
        b.push_line("/// Boundary value for passing this facade back across the");
        b.push_line("/// component boundary.");
        b.open("pub fn as_value(&self) -> Value");
        if internal_only {
            b.open("match self.adapter.upgrade().and_then(|adapter| adapter.instance().cloned())");
            b.push_line("Some(instance) => Value::Instance(instance),");
            b.push_line("None => Value::Null,");
            b.close();
        } else {
            b.open("match self.adapter.instance()");
            b.push_line("Some(instance) => Value::Instance(instance.clone()),");
            b.push_line("None => Value::Null,");
            b.close();
        }
        b.close();

        for method in descriptor.instance_methods() {
            self.emit_instance_method(&mut b, internal, method, internal_only)?;
        }
        for method in descriptor.static_methods() {
            self.emit_static_method(&mut b, internal, &adapter, method)?;
        }
        b.close();

        if let Some(implements) = &descriptor.class.implements {
            self.emit_implements(&mut b, internal, &facade, implements)?;
        }

        Ok(b.build())
    }

    fn emit_header(&self, b: &mut SourceBuilder, internal: &str, class: bool, internal_only: bool) {
        b.push_line(&format!(
            "// Generated by crossbind-gen from `{}`. Do not edit.",
            internal
        ));
        b.blank();
        b.push_line("#![allow(unused)]");
        b.blank();
        if internal_only {
            b.push_line("use std::sync::{Arc, Weak};");
        } else {
            b.push_line("use std::sync::Arc;");
        }
        b.blank();
        b.push_line("use crossbind_runtime::{ComponentHandle, Instance, Resolver, Value};");
        if class {
            b.push_line("use parking_lot::Mutex;");
        }
        b.blank();
        b.push_line("use super::*;");
        if class {
            b.push_line("use super::super::adapter::*;");
        }
        b.blank();
    }

    fn emit_overrides_trait(
        &self,
        b: &mut SourceBuilder,
        descriptor: &ClassDescriptor,
        facade: &str,
    ) -> Result<(), GenError> {
        let internal = descriptor.name();
        b.push_line("/// Per-instance override hooks. Install with");
        b.push_line(&format!("/// [`{}::install_overrides`]; unoverridden methods fall", facade));
        b.push_line("/// through to the engine default path.");
        b.open(&format!("pub trait {}Overrides: Send + Sync", facade));
        let mut first = true;
        for method in descriptor.instance_methods() {
            if !first {
                b.blank();
            }
            first = false;
            let params = self.rules.facade_params(internal, &method.params)?;
            let sep = if params.is_empty() { "" } else { ", " };
            let (_, ret) = self.rules.return_type(internal, &method.returns)?;
            b.open(&format!(
                "fn {}(&self, facade: &{}{}{}) -> {}",
                method.name, facade, sep, params, ret
            ));
            b.push_line(&format!(
                "facade.{}({})",
                method.name,
                TransformRules::arg_names(&method.params)
            ));
            b.close();
        }
        b.close();
        b.blank();
        Ok(())
    }

    fn emit_field(&self, b: &mut SourceBuilder, field: &FieldDescriptor) {
        let (ty, value) = match field.ty.as_str() {
            "bool" => ("bool".to_string(), field.value.clone()),
            "int" => ("i64".to_string(), field.value.clone()),
            "float" => ("f64".to_string(), field.value.clone()),
            // Quote string constants at generation time.
            _ => ("&'static str".to_string(), format!("{:?}", field.value)),
        };
        b.push_line(&format!(
            "pub const {}: {} = {};",
            field.name, ty, value
        ));
    }

    fn emit_constructor(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        adapter: &str,
        ctor: &MemberDescriptor,
        index: usize,
    ) -> Result<(), GenError> {
        let params = self.rules.facade_params(internal, &ctor.params)?;
        let sep = if params.is_empty() { "" } else { ", " };
        let name = constructor_fn_name(index);
        let names = TransformRules::arg_names(&ctor.params);
        let forward = if names.is_empty() {
            String::new()
        } else {
            format!(", {}", names)
        };

        b.blank();
        b.open(&format!(
            "pub fn {}(resolver: Arc<Resolver>, component: ComponentHandle{}{}) -> Option<Arc<Self>>",
            name, sep, params
        ));
        for line in &ctor.pre {
            b.push_line(&expand_placeholders(line, &ctor.params));
        }
        b.push_line(&format!(
            "let adapter = {}::{}(resolver, component{})?;",
            adapter, name, forward
        ));
        for line in &ctor.post {
            b.push_line(&expand_placeholders(line, &ctor.params));
        }
        b.push_line("Some(Self::attach(adapter))");
        b.close();
        Ok(())
    }

    fn emit_from_instance(&self, b: &mut SourceBuilder, adapter: &str) {
        b.blank();
        b.push_line("/// Wrap an engine-created instance, reusing the facade already");
        b.push_line("/// paired with it.");
        b.open(
            "pub fn from_instance(resolver: &Arc<Resolver>, component: &ComponentHandle, instance: Instance) -> Option<Arc<Self>>",
        );
        b.open("if let Some(facade) = resolver.lookup_facade::<Self>(&instance)");
        b.push_line("return Some(facade);");
        b.close();
        b.push_line(&format!(
            "let adapter = {}::from_instance(resolver.clone(), component.clone(), instance.clone())?;",
            adapter
        ));
        b.push_line("let facade = Self::attach(adapter);");
        b.push_line("resolver.cache_facade(&instance, &facade);");
        b.push_line("Some(facade)");
        b.close();
    }

    fn emit_instance_method(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        method: &MemberDescriptor,
        internal_only: bool,
    ) -> Result<(), GenError> {
        let params = self.rules.facade_params(internal, &method.params)?;
        let sep = if params.is_empty() { "" } else { ", " };
        let (_, ret) = self.rules.return_type(internal, &method.returns)?;
        let names = TransformRules::arg_names(&method.params);
        let call = if internal_only {
            format!("adapter.{}_default({})", method.name, names)
        } else {
            format!("self.adapter.{}_default({})", method.name, names)
        };

        b.blank();
        b.open(&format!(
            "pub fn {}(&self{}{}) -> {}",
            method.name, sep, params, ret
        ));
        if internal_only {
            b.open("let adapter = match self.adapter.upgrade()");
            b.push_line("Some(adapter) => adapter,");
            b.open("None =>");
            b.push_line(&format!(
                "self.resolver.report_message(\"{}.{}: adapter detached\");",
                internal, method.name
            ));
            b.push_line("return None;");
            b.close();
            b.close_with("};");
        }
        self.emit_wrapped_call(b, method, &call);
        b.close();
        Ok(())
    }

    fn emit_static_method(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        adapter: &str,
        method: &MemberDescriptor,
    ) -> Result<(), GenError> {
        let params = self.rules.facade_params(internal, &method.params)?;
        let sep = if params.is_empty() { "" } else { ", " };
        let (_, ret) = self.rules.return_type(internal, &method.returns)?;
        let names = TransformRules::arg_names(&method.params);
        let forward = if names.is_empty() {
            String::new()
        } else {
            format!(", {}", names)
        };
        let call = format!("{}::{}(resolver, component{})", adapter, method.name, forward);

        b.blank();
        b.open(&format!(
            "pub fn {}(resolver: &Arc<Resolver>, component: &ComponentHandle{}{}) -> {}",
            method.name, sep, params, ret
        ));
        self.emit_wrapped_call(b, method, &call);
        b.close();
        Ok(())
    }

    /// Emit a forwarded call with the descriptor's raw pre/post lines
    /// around it.
    fn emit_wrapped_call(&self, b: &mut SourceBuilder, method: &MemberDescriptor, call: &str) {
        for line in &method.pre {
            b.push_line(&expand_placeholders(line, &method.params));
        }
        if method.post.is_empty() {
            b.push_line(call);
        } else {
            b.push_line(&format!("let result = {};", call));
            for line in &method.post {
                b.push_line(&expand_placeholders(line, &method.params));
            }
            b.push_line("result");
        }
    }

    fn emit_implements(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        facade: &str,
        implements: &str,
    ) -> Result<(), GenError> {
        let interface = self.catalog.get(implements).ok_or_else(|| {
            GenError::MetadataMissing {
                class: internal.to_string(),
                detail: format!("implemented interface '{}' not in catalog", implements),
            }
        })?;
        if !interface.is_interface() {
            return Err(GenError::MetadataMissing {
                class: internal.to_string(),
                detail: format!("'{}' is not an interface", implements),
            });
        }
        let trait_name = facade_stem(implements);

        b.blank();
        b.open(&format!("impl {} for {}", trait_name, facade));
        for method in interface.instance_methods() {
            let params = self.rules.facade_params(implements, &method.params)?;
            let sep = if params.is_empty() { "" } else { ", " };
            let (_, ret) = self.rules.return_type(implements, &method.returns)?;
            let names = TransformRules::arg_names(&method.params);
            let forward = if names.is_empty() {
                String::new()
            } else {
                format!(", {}", names)
            };
            b.open(&format!(
                "fn {}(&self{}{}) -> {}",
                method.name, sep, params, ret
            ));
            b.push_line(&format!("{}::{}(self{})", facade, method.name, forward));
            b.close();
        }
        b.close();
        Ok(())
    }
}
