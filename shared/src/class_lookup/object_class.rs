use std::{cell::RefCell, rc::Rc};

use crate::object::public_object::{PublicObject, SharedObject};

/// Builds an empty proxy for a discovered instance
pub type ProxyFactory = fn() -> SharedObject;

/// Declaration of a class whose instances are shared through the federation
#[derive(Clone)]
pub struct ObjectClass {
    name: String,
    hla_name: String,
    variables: Vec<String>,
    factory: Option<ProxyFactory>,
}

impl ObjectClass {
    /// A class shared under its local name, with no proxy factory
    pub fn new(name: &str, variables: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            hla_name: name.to_string(),
            variables: variables.iter().map(|variable| variable.to_string()).collect(),
            factory: None,
        }
    }

    /// Declare `T`, using a default instance to read its name and variables
    pub fn of<T: PublicObject + Default>() -> Self {
        let sample = T::default();
        let mut class = Self::new(sample.class_name(), sample.public_variables());
        class.factory = Some(instantiate::<T>);
        class
    }

    /// Share the class under a different name in the federation object model
    pub fn with_hla_name(mut self, hla_name: &str) -> Self {
        self.hla_name = hla_name.to_string();
        self
    }

    pub fn with_factory(mut self, factory: ProxyFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hla_name(&self) -> &str {
        &self.hla_name
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn factory(&self) -> Option<ProxyFactory> {
        self.factory
    }
}

fn instantiate<T: PublicObject + Default>() -> SharedObject {
    Rc::new(RefCell::new(T::default()))
}
