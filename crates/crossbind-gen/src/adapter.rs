//! Adapter source generation.
//!
//! The adapter is the component-facing half of a generated pair: it
//! holds the resolved handles and the boundary instance, and every
//! engine-visible member funnels through it. Instance methods emit two
//! entries: the primary entry routes through an installed facade
//! override first; the `_default` entry forwards straight to the
//! engine. Static methods emit a single direct forward.

use crossbind_descriptor::{Catalog, ClassDescriptor, ConstructionPolicy, MemberDescriptor};

use crate::builder::SourceBuilder;
use crate::error::GenError;
use crate::rules::{adapter_name, facade_stem, RawType, TransformRules};

pub struct AdapterGenerator<'a> {
    rules: TransformRules<'a>,
}

/// Mangled metadata key for an externally constructed class, the same
/// scheme the resolver's constructor cache is keyed by.
pub fn constructor_key(internal: &str, ctor: &MemberDescriptor) -> String {
    let mut keyed = ctor.clone();
    keyed.name = adapter_name(internal);
    keyed.signature_key("Constructor")
}

/// Declared constructors, or the implicit no-argument one a
/// constructor-visible class gets when it declares none.
pub(crate) fn effective_constructors(descriptor: &ClassDescriptor) -> Vec<MemberDescriptor> {
    if descriptor.constructors.is_empty()
        && descriptor.policy() == ConstructionPolicy::ConstructorVisible
    {
        vec![MemberDescriptor {
            name: String::new(),
            params: Vec::new(),
            returns: "void".to_string(),
            is_static: false,
            pre: Vec::new(),
            post: Vec::new(),
        }]
    } else {
        descriptor.constructors.clone()
    }
}

/// Constructor fn name for the n-th declared overload.
pub fn constructor_fn_name(index: usize) -> String {
    if index == 0 {
        "new".to_string()
    } else {
        format!("new{}", index + 1)
    }
}

impl<'a> AdapterGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        AdapterGenerator {
            rules: TransformRules::new(catalog),
        }
    }

    /// Render the adapter unit for one concrete class.
    pub fn generate(&self, descriptor: &ClassDescriptor) -> Result<String, GenError> {
        let internal = descriptor.name();
        let adapter = adapter_name(internal);
        let facade = facade_stem(internal);
        let policy = descriptor.policy();
        let internal_only = policy == ConstructionPolicy::InternalOnly;
        // The class the adapter resolves against: internal-only classes
        // may retain a concrete implementation type instead.
        let resolve_target = descriptor
            .class
            .instance
            .as_deref()
            .unwrap_or(internal);

        let mut b = SourceBuilder::new();
        b.push_line(&format!(
            "// Generated by crossbind-gen from `{}`. Do not edit.",
            internal
        ));
        b.blank();
        b.push_line("#![allow(unused)]");
        b.blank();
        if internal_only {
            b.push_line("use std::sync::Arc;");
        } else {
            b.push_line("use std::sync::{Arc, Weak};");
        }
        b.blank();
        b.push_line(
            "use crossbind_runtime::{ClassHandle, ComponentHandle, Instance, ParamType, Resolver, Value};",
        );
        b.push_line("use parking_lot::Mutex;");
        b.blank();
        b.push_line("use super::super::facade::*;");
        b.blank();

        b.push_line(&format!("/// Component-facing half of `{}`.", facade));
        b.open(&format!("pub struct {}", adapter));
        b.push_line("resolver: Arc<Resolver>,");
        b.push_line("component: ComponentHandle,");
        b.push_line("class: ClassHandle,");
        if internal_only {
            b.push_line("internal: Option<Instance>,");
            // The adapter is the root of an internally constructed pair;
            // it owns the facade and the facade points back weakly.
            b.push_line(&format!("facade: Mutex<Option<Arc<{}>>>,", facade));
        } else {
            b.push_line("instance: Instance,");
            b.push_line(&format!("facade: Mutex<Weak<{}>>,", facade));
        }
        b.close();
        b.blank();

        b.open(&format!("impl {}", adapter));
        b.push_line("/// Boundary class this adapter resolves against.");
        b.push_line(&format!(
            "pub const CLASS: &'static str = \"{}\";",
            resolve_target
        ));

        match policy {
            ConstructionPolicy::ConstructorVisible => {
                for (i, ctor) in effective_constructors(descriptor).iter().enumerate() {
                    self.emit_visible_constructor(&mut b, internal, ctor, i)?;
                }
                self.emit_wrap(&mut b, &adapter);
                self.emit_from_instance(&mut b);
            }
            ConstructionPolicy::ExternalOnly => {
                self.emit_external_constructors(&mut b, descriptor, internal)?;
                self.emit_wrap(&mut b, &adapter);
                self.emit_from_instance(&mut b);
            }
            ConstructionPolicy::InternalOnly => {
                b.blank();
                b.push_line("/// Root the pair around an engine-created instance, or around");
                b.push_line("/// a standalone override object when no instance backs it.");
                b.open(
                    "pub fn from_internal(resolver: Arc<Resolver>, component: ComponentHandle, internal: Option<Instance>) -> Option<Arc<Self>>",
                );
                b.push_line("let class = resolver.resolve_class(&component, Self::CLASS)?;");
                b.open(&format!("let adapter = Arc::new({}", adapter));
                b.push_line("resolver: resolver.clone(),");
                b.push_line("component,");
                b.push_line("class,");
                b.push_line("internal,");
                b.push_line("facade: Mutex::new(None),");
                b.close_with("});");
                b.push_line(&format!(
                    "*adapter.facade.lock() = Some({}::attach(resolver, &adapter));",
                    facade
                ));
                b.push_line("Some(adapter)");
                b.close();
            }
        }

        if internal_only {
            b.blank();
            b.open(&format!("pub fn facade(&self) -> Option<Arc<{}>>", facade));
            b.push_line("self.facade.lock().clone()");
            b.close();
        } else {
            b.blank();
            b.push_line("/// Pair this adapter with its facade. Called once at construction.");
            b.open(&format!("pub fn attach_facade(&self, facade: &Arc<{}>)", facade));
            b.push_line("*self.facade.lock() = Arc::downgrade(facade);");
            b.close();
            b.blank();
            b.open(&format!("pub fn facade(&self) -> Option<Arc<{}>>", facade));
            b.push_line("self.facade.lock().upgrade()");
            b.close();
        }
        b.blank();
        b.push_line("/// Boundary instance, absent for a standalone adapter.");
        b.open("pub fn instance(&self) -> Option<&Instance>");
        if internal_only {
            b.push_line("self.internal.as_ref()");
        } else {
            b.push_line("Some(&self.instance)");
        }
        b.close();

        for method in descriptor.instance_methods() {
            self.emit_primary(&mut b, internal, method)?;
            self.emit_default(&mut b, internal, method, internal_only)?;
        }
        for method in descriptor.static_methods() {
            self.emit_static(&mut b, internal, method)?;
        }

        b.close();
        Ok(b.build())
    }

    fn emit_visible_constructor(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        ctor: &MemberDescriptor,
        index: usize,
    ) -> Result<(), GenError> {
        let params = self.rules.facade_params(internal, &ctor.params)?;
        let sep = if params.is_empty() { "" } else { ", " };
        b.blank();
        b.open(&format!(
            "pub fn {}(resolver: Arc<Resolver>, component: ComponentHandle{}{}) -> Option<Arc<Self>>",
            constructor_fn_name(index),
            sep,
            params
        ));
        b.push_line("let class = resolver.resolve_class(&component, Self::CLASS)?;");
        b.push_line(&format!(
            "let ctor = resolver.resolve_constructor(&class, {})?;",
            self.rules.param_types_expr(internal, &ctor.params)?
        ));
        b.push_line(&format!(
            "let instance = resolver.instantiate(&ctor, {})?;",
            self.rules.args_expr(internal, &ctor.params)?
        ));
        b.push_line("Some(Self::wrap(resolver, component, class, instance))");
        b.close();
        Ok(())
    }

    fn emit_external_constructors(
        &self,
        b: &mut SourceBuilder,
        descriptor: &ClassDescriptor,
        internal: &str,
    ) -> Result<(), GenError> {
        for (i, ctor) in descriptor.constructors.iter().enumerate() {
            b.blank();
            b.push_line(&format!(
                "pub const CTOR_KEY_{}: &'static str = \"{}\";",
                i,
                constructor_key(internal, ctor)
            ));
        }

        b.blank();
        b.push_line("/// Register constructor metadata; resolution is deferred to the");
        b.push_line("/// first instantiation for each key.");
        b.open("pub fn register(resolver: &Resolver)");
        for (i, ctor) in descriptor.constructors.iter().enumerate() {
            b.push_line(&format!(
                "resolver.register_constructor(Self::CTOR_KEY_{}, \"{}\", {});",
                i,
                internal,
                self.rules.param_types_expr(internal, &ctor.params)?
            ));
        }
        b.close();

        for (i, ctor) in descriptor.constructors.iter().enumerate() {
            let params = self.rules.facade_params(internal, &ctor.params)?;
            let sep = if params.is_empty() { "" } else { ", " };
            b.blank();
            b.open(&format!(
                "pub fn {}(resolver: Arc<Resolver>, component: ComponentHandle{}{}) -> Option<Arc<Self>>",
                constructor_fn_name(i),
                sep,
                params
            ));
            b.push_line("Self::register(&resolver);");
            b.push_line("let class = resolver.resolve_class(&component, Self::CLASS)?;");
            b.push_line(&format!(
                "let instance = resolver.create_instance(&component, Self::CTOR_KEY_{}, {})?;",
                i,
                self.rules.args_expr(internal, &ctor.params)?
            ));
            b.push_line("Some(Self::wrap(resolver, component, class, instance))");
            b.close();
        }
        Ok(())
    }

    fn emit_wrap(&self, b: &mut SourceBuilder, adapter: &str) {
        b.blank();
        b.open(
            "fn wrap(resolver: Arc<Resolver>, component: ComponentHandle, class: ClassHandle, instance: Instance) -> Arc<Self>",
        );
        b.open(&format!("Arc::new({}", adapter));
        b.push_line("resolver,");
        b.push_line("component,");
        b.push_line("class,");
        b.push_line("instance,");
        b.push_line("facade: Mutex::new(Weak::new()),");
        b.close_with("})");
        b.close();
    }

    fn emit_from_instance(&self, b: &mut SourceBuilder) {
        b.blank();
        b.push_line("/// Wrap an engine-created instance.");
        b.open(
            "pub fn from_instance(resolver: Arc<Resolver>, component: ComponentHandle, instance: Instance) -> Option<Arc<Self>>",
        );
        b.push_line("let class = resolver.resolve_class(&component, Self::CLASS)?;");
        b.push_line("Some(Self::wrap(resolver, component, class, instance))");
        b.close();
    }

    fn emit_primary(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        method: &MemberDescriptor,
    ) -> Result<(), GenError> {
        let params = self.rules.facade_params(internal, &method.params)?;
        let sep = if params.is_empty() { "" } else { ", " };
        let (_, ret) = self.rules.return_type(internal, &method.returns)?;
        let names = TransformRules::arg_names(&method.params);
        let override_args = if names.is_empty() {
            String::new()
        } else {
            format!(", {}", names)
        };

        b.blank();
        b.push_line("/// Engine-facing entry: an installed override intercepts ahead of");
        b.push_line("/// the default path.");
        b.open(&format!(
            "pub fn {}(&self{}{}) -> {}",
            method.name, sep, params, ret
        ));
        b.open("if let Some(facade) = self.facade()");
        b.open("if let Some(overrides) = facade.overrides()");
        b.push_line(&format!(
            "return overrides.{}(&facade{});",
            method.name, override_args
        ));
        b.close();
        b.close();
        b.push_line(&format!("self.{}_default({})", method.name, names));
        b.close();
        Ok(())
    }

    fn emit_default(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        method: &MemberDescriptor,
        internal_only: bool,
    ) -> Result<(), GenError> {
        let params = self.rules.facade_params(internal, &method.params)?;
        let sep = if params.is_empty() { "" } else { ", " };
        let (ret_ty, ret) = self.rules.return_type(internal, &method.returns)?;

        b.blank();
        b.push_line("/// Direct forward to the engine, bypassing overrides.");
        b.open(&format!(
            "pub fn {}_default(&self{}{}) -> {}",
            method.name, sep, params, ret
        ));
        if internal_only {
            b.open("if let Some(internal) = &self.internal");
            self.emit_forward_body(b, internal, method, &ret_ty, "Some(internal)")?;
            b.chain("} else {");
            b.push_line(&format!(
                "self.resolver.report_message(\"{}.{}: no engine instance attached\");",
                internal, method.name
            ));
            b.push_line("None");
            b.close();
        } else {
            self.emit_forward_body(b, internal, method, &ret_ty, "Some(&self.instance)")?;
        }
        b.close();
        Ok(())
    }

    fn emit_static(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        method: &MemberDescriptor,
    ) -> Result<(), GenError> {
        let params = self.rules.facade_params(internal, &method.params)?;
        let sep = if params.is_empty() { "" } else { ", " };
        let (ret_ty, ret) = self.rules.return_type(internal, &method.returns)?;

        b.blank();
        b.push_line("/// Static forward: resolves and dispatches with no receiver.");
        b.open(&format!(
            "pub fn {}(resolver: &Arc<Resolver>, component: &ComponentHandle{}{}) -> {}",
            method.name, sep, params, ret
        ));
        b.push_line("let class = resolver.resolve_class(component, Self::CLASS)?;");
        b.push_line(&format!(
            "let method = resolver.resolve_method(&class, \"{}\", {})?;",
            method.name,
            self.rules.param_types_expr(internal, &method.params)?
        ));
        self.emit_invoke_tail(b, internal, method, &ret_ty, "None")?;
        b.close();
        Ok(())
    }

    fn emit_forward_body(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        method: &MemberDescriptor,
        ret_ty: &RawType,
        receiver: &str,
    ) -> Result<(), GenError> {
        b.push_line("let resolver = &self.resolver;");
        if self.wrap_needs_component(internal, ret_ty)? {
            b.push_line("let component = &self.component;");
        }
        b.push_line(&format!(
            "let method = resolver.resolve_method(&self.class, \"{}\", {})?;",
            method.name,
            self.rules.param_types_expr(internal, &method.params)?
        ));
        self.emit_invoke_tail(b, internal, method, ret_ty, receiver)?;
        Ok(())
    }

    fn emit_invoke_tail(
        &self,
        b: &mut SourceBuilder,
        internal: &str,
        method: &MemberDescriptor,
        ret_ty: &RawType,
        receiver: &str,
    ) -> Result<(), GenError> {
        let args = self.rules.args_expr(internal, &method.params)?;
        if *ret_ty == RawType::Void {
            b.push_line(&format!(
                "resolver.invoke(&method, {}, {})?;",
                receiver, args
            ));
            b.push_line("Some(())");
        } else {
            b.push_line(&format!(
                "let out = resolver.invoke(&method, {}, {})?;",
                receiver, args
            ));
            b.push_line(&self.rules.from_value_expr(internal, ret_ty, "out")?);
        }
        Ok(())
    }

    fn wrap_needs_component(&self, internal: &str, ret_ty: &RawType) -> Result<bool, GenError> {
        if *ret_ty == RawType::Void {
            return Ok(false);
        }
        Ok(self
            .rules
            .from_value_expr(internal, ret_ty, "out")?
            .contains("from_instance"))
    }
}
