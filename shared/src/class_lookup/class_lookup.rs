use std::collections::{HashMap, HashSet};

use log::info;

use crate::{
    ambassador::rti_ambassador::RtiAmbassador,
    class_lookup::{error::ClassLookupError, object_class::ObjectClass},
    constants::{FEDEX_CLASS, NODE_CLASS},
    types::{AttributeHandle, ClassHandle},
};

// ClassEntry
struct ClassEntry {
    class: ObjectClass,
    handle: Option<ClassHandle>,
    attributes: HashMap<String, AttributeHandle>,
    names: HashMap<AttributeHandle, String>,
}

impl ClassEntry {
    fn new(class: ObjectClass) -> Self {
        Self {
            class,
            handle: None,
            attributes: HashMap::new(),
            names: HashMap::new(),
        }
    }

    fn attribute_handles(&self) -> Vec<AttributeHandle> {
        self.class
            .variables()
            .iter()
            .filter_map(|variable| self.attributes.get(variable).copied())
            .collect()
    }
}

/// Bidirectional map between public class/variable names and RTI handles
///
/// Classes are declared up front with [`ClassLookup::add_class`]. A single call to
/// [`ClassLookup::resolve_names`] then fetches every handle and declares publication and
/// subscription interest, after which the mapping never changes.
pub struct ClassLookup {
    classes: HashMap<String, ClassEntry>,
    order: Vec<String>,
    by_handle: HashMap<ClassHandle, String>,
    resolved: bool,
}

impl ClassLookup {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            order: Vec::new(),
            by_handle: HashMap::new(),
            resolved: false,
        }
    }

    pub fn add_class(&mut self, class: ObjectClass) -> Result<(), ClassLookupError> {
        if self.resolved {
            return Err(ClassLookupError::AlreadyResolved);
        }
        let name = class.name().to_string();
        if self.classes.contains_key(&name) {
            return Err(ClassLookupError::DuplicateClass { class: name });
        }
        self.order.push(name.clone());
        self.classes.insert(name, ClassEntry::new(class));
        Ok(())
    }

    /// Reject declarations that cannot be shared, before anything touches the RTI
    pub fn verify(&self) -> Result<(), ClassLookupError> {
        let mut hla_names = HashSet::new();
        for name in &self.order {
            let Some(entry) = self.classes.get(name) else {
                continue;
            };
            let bad = |reason: &str| ClassLookupError::BadClassTree {
                class: name.clone(),
                reason: reason.to_string(),
            };
            if entry.class.variables().is_empty() {
                return Err(bad("declares no public variables"));
            }
            let mut seen = HashSet::new();
            if !entry.class.variables().iter().all(|variable| seen.insert(variable)) {
                return Err(bad("declares a public variable twice"));
            }
            let hla_name = entry.class.hla_name();
            if hla_name == NODE_CLASS || hla_name == FEDEX_CLASS {
                return Err(bad("reuses a coupling admin class name"));
            }
            if !hla_names.insert(hla_name) {
                return Err(bad("shares its federation name with another class"));
            }
        }
        Ok(())
    }

    /// Fetch every handle, then publish and subscribe each class's full attribute set
    pub fn resolve_names(&mut self, rti: &mut dyn RtiAmbassador) -> Result<(), ClassLookupError> {
        if self.resolved {
            return Err(ClassLookupError::AlreadyResolved);
        }

        for name in &self.order {
            let Some(entry) = self.classes.get_mut(name) else {
                continue;
            };
            let hla_name = entry.class.hla_name().to_string();
            let handle = rti
                .object_class_handle(&hla_name)
                .map_err(|source| ClassLookupError::Rti {
                    name: hla_name.clone(),
                    source,
                })?;
            entry.handle = Some(handle);

            for variable in entry.class.variables().to_vec() {
                let attribute =
                    rti.attribute_handle(&variable, handle)
                        .map_err(|source| ClassLookupError::Rti {
                            name: format!("{hla_name}.{variable}"),
                            source,
                        })?;
                entry.attributes.insert(variable.clone(), attribute);
                entry.names.insert(attribute, variable);
            }

            let attributes = entry.attribute_handles();
            rti.subscribe_object_class_attributes(handle, &attributes)
                .map_err(|source| ClassLookupError::Rti {
                    name: hla_name.clone(),
                    source,
                })?;
            rti.publish_object_class(handle, &attributes)
                .map_err(|source| ClassLookupError::Rti {
                    name: hla_name.clone(),
                    source,
                })?;

            self.by_handle.insert(handle, name.clone());
            info!("Resolved class {name} as {hla_name} ({handle})");
        }

        self.resolved = true;
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Declared class names, in declaration order
    pub fn classes(&self) -> &[String] {
        &self.order
    }

    pub fn object_class(&self, name: &str) -> Result<&ObjectClass, ClassLookupError> {
        Ok(&self.entry(name)?.class)
    }

    pub fn class_handle(&self, name: &str) -> Result<ClassHandle, ClassLookupError> {
        self.entry(name)?
            .handle
            .ok_or(ClassLookupError::NotResolved {
                operation: "look up a class handle",
            })
    }

    pub fn variable_names(&self, name: &str) -> Result<&[String], ClassLookupError> {
        Ok(self.entry(name)?.class.variables())
    }

    pub fn class_name_for(&self, handle: ClassHandle) -> Result<&str, ClassLookupError> {
        self.by_handle
            .get(&handle)
            .map(|name| name.as_str())
            .ok_or(ClassLookupError::UnknownClassHandle { handle })
    }

    pub fn attribute_handle(
        &self,
        class: ClassHandle,
        variable: &str,
    ) -> Result<AttributeHandle, ClassLookupError> {
        let name = self.class_name_for(class)?;
        let entry = self.entry(name)?;
        entry
            .attributes
            .get(variable)
            .copied()
            .ok_or_else(|| ClassLookupError::UnknownVariable {
                class: name.to_string(),
                variable: variable.to_string(),
            })
    }

    pub fn attribute_name(
        &self,
        class: ClassHandle,
        attribute: AttributeHandle,
    ) -> Result<&str, ClassLookupError> {
        let name = self.class_name_for(class)?;
        let entry = self.entry(name)?;
        entry
            .names
            .get(&attribute)
            .map(|variable| variable.as_str())
            .ok_or_else(|| ClassLookupError::UnknownAttributeHandle {
                class: name.to_string(),
                handle: attribute,
            })
    }

    /// Every resolved attribute handle of the class, in declaration order
    pub fn attribute_handles(
        &self,
        class: ClassHandle,
    ) -> Result<Vec<AttributeHandle>, ClassLookupError> {
        let name = self.class_name_for(class)?;
        Ok(self.entry(name)?.attribute_handles())
    }

    fn entry(&self, name: &str) -> Result<&ClassEntry, ClassLookupError> {
        self.classes
            .get(name)
            .ok_or_else(|| ClassLookupError::UnknownClass {
                class: name.to_string(),
            })
    }
}

impl Default for ClassLookup {
    fn default() -> Self {
        Self::new()
    }
}
