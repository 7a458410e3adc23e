use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::runtime::class::{Class, ClassInstance, STR_METHOD, SELF_NAME};
use crate::runtime::context::Context;
use crate::runtime::error::{RuntimeError, RuntimeResult};

/// Name→value mapping used both as an activation environment and as the
/// field table of an instance.
pub type Closure = HashMap<String, ObjectHolder>;

/// The closed set of runtime value kinds.
#[derive(Debug)]
pub enum Object {
    Number(i32),
    String(String),
    Bool(bool),
    Class(Rc<Class>),
    ClassInstance(ClassInstance),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Number(_) => "Number",
            Object::String(_) => "String",
            Object::Bool(_) => "Bool",
            Object::Class(_) => "Class",
            Object::ClassInstance(_) => "ClassInstance",
        }
    }
}

/// Handle to a runtime value. An empty holder denotes `None`; otherwise the
/// object is shared between every holder cloned from the same allocation,
/// which is what makes instance mutations visible through every binding of
/// the instance.
#[derive(Clone)]
pub struct ObjectHolder {
    data: Option<Rc<RefCell<Object>>>,
}

impl ObjectHolder {
    pub fn none() -> Self {
        Self { data: None }
    }

    /// Takes ownership of a value in a fresh allocation.
    pub fn own(object: Object) -> Self {
        Self {
            data: Some(Rc::new(RefCell::new(object))),
        }
    }

    /// Second holder aliasing the same allocation. This is how `self` is
    /// passed into method calls and how operands reach dunder methods.
    pub fn share(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Truthiness: empty is false, strings are non-empty, numbers non-zero,
    /// bools themselves, anything else false.
    pub fn is_true(&self) -> bool {
        let Some(cell) = &self.data else {
            return false;
        };
        match &*cell.borrow() {
            Object::String(value) => !value.is_empty(),
            Object::Number(value) => *value != 0,
            Object::Bool(value) => *value,
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.data {
            None => "None",
            Some(cell) => cell.borrow().type_name(),
        }
    }

    pub fn try_as_number(&self) -> Option<i32> {
        let cell = self.data.as_ref()?;
        match &*cell.borrow() {
            Object::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn try_as_bool(&self) -> Option<bool> {
        let cell = self.data.as_ref()?;
        match &*cell.borrow() {
            Object::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn try_as_string(&self) -> Option<Ref<'_, String>> {
        let cell = self.data.as_ref()?;
        Ref::filter_map(cell.borrow(), |object| match object {
            Object::String(value) => Some(value),
            _ => None,
        })
        .ok()
    }

    pub fn try_as_class(&self) -> Option<Rc<Class>> {
        let cell = self.data.as_ref()?;
        match &*cell.borrow() {
            Object::Class(class) => Some(class.clone()),
            _ => None,
        }
    }

    pub fn try_as_instance(&self) -> Option<Ref<'_, ClassInstance>> {
        let cell = self.data.as_ref()?;
        Ref::filter_map(cell.borrow(), |object| match object {
            Object::ClassInstance(instance) => Some(instance),
            _ => None,
        })
        .ok()
    }

    pub fn try_as_instance_mut(&self) -> Option<RefMut<'_, ClassInstance>> {
        let cell = self.data.as_ref()?;
        RefMut::filter_map(cell.borrow_mut(), |object| match object {
            Object::ClassInstance(instance) => Some(instance),
            _ => None,
        })
        .ok()
    }

    /// True when this holder is an instance whose class chain defines
    /// `method` with exactly `argc` formal parameters.
    pub fn has_method(&self, method: &str, argc: usize) -> bool {
        self.try_as_instance()
            .is_some_and(|instance| instance.has_method(method, argc))
    }

    /// Invokes a method on an instance: binds the formal parameters
    /// positionally to the evaluated arguments, binds `self` to an alias of
    /// this holder, and executes the body in that fresh closure. The
    /// activation sees nothing else; in particular globals are invisible
    /// inside method bodies.
    pub fn call_method(
        &self,
        method: &str,
        args: Vec<ObjectHolder>,
        context: &mut dyn Context,
    ) -> RuntimeResult<ObjectHolder> {
        let class = {
            let Some(instance) = self.try_as_instance() else {
                return Err(RuntimeError::NotAnInstance {
                    type_name: self.type_name(),
                });
            };
            instance.class().clone()
        };
        let Some(resolved) = class.get_method(method) else {
            return Err(RuntimeError::UnknownMethod {
                method: method.to_string(),
                class: class.name().to_string(),
            });
        };
        if resolved.formal_params.len() != args.len() {
            return Err(RuntimeError::MethodArityMismatch {
                method: method.to_string(),
                expected: resolved.formal_params.len(),
                found: args.len(),
            });
        }

        let mut activation = Closure::new();
        for (param, arg) in resolved.formal_params.iter().zip(args) {
            activation.insert(param.clone(), arg);
        }
        activation.insert(SELF_NAME.to_string(), self.share());
        resolved.body.execute(&mut activation, context)
    }

    /// Renders the value the way `print` writes a single argument. An
    /// instance defers to its zero-argument `__str__` when one exists,
    /// otherwise an address-like identifier is produced.
    pub fn to_output(&self, context: &mut dyn Context) -> RuntimeResult<String> {
        let Some(cell) = &self.data else {
            return Ok("None".to_string());
        };
        let direct = match &*cell.borrow() {
            Object::Number(value) => Some(value.to_string()),
            Object::String(value) => Some(value.clone()),
            Object::Bool(value) => Some(if *value { "True" } else { "False" }.to_string()),
            Object::Class(class) => Some(format!("Class {}", class.name())),
            Object::ClassInstance(instance) => {
                if instance.has_method(STR_METHOD, 0) {
                    None
                } else {
                    Some(format!(
                        "<{} object at {:p}>",
                        instance.class().name(),
                        Rc::as_ptr(cell)
                    ))
                }
            }
        };
        match direct {
            Some(text) => Ok(text),
            // The borrow above is released before __str__ runs, so the body
            // is free to touch self again.
            None => {
                let rendered = self.call_method(STR_METHOD, Vec::new(), context)?;
                rendered.to_output(context)
            }
        }
    }
}

impl fmt::Debug for ObjectHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHolder({})", self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::SimpleContext;

    #[test]
    fn truthiness_follows_the_value_kind() {
        assert!(!ObjectHolder::none().is_true());
        assert!(ObjectHolder::own(Object::Number(7)).is_true());
        assert!(!ObjectHolder::own(Object::Number(0)).is_true());
        assert!(ObjectHolder::own(Object::String("x".to_string())).is_true());
        assert!(!ObjectHolder::own(Object::String(String::new())).is_true());
        assert!(ObjectHolder::own(Object::Bool(true)).is_true());
        assert!(!ObjectHolder::own(Object::Bool(false)).is_true());

        let class = Rc::new(Class::new("Empty".to_string(), Vec::new(), None));
        assert!(!ObjectHolder::own(Object::ClassInstance(ClassInstance::new(class))).is_true());
    }

    #[test]
    fn share_aliases_the_same_instance() {
        let class = Rc::new(Class::new("Box".to_string(), Vec::new(), None));
        let original = ObjectHolder::own(Object::ClassInstance(ClassInstance::new(class)));
        let alias = original.share();

        alias
            .try_as_instance_mut()
            .expect("alias should be an instance")
            .fields_mut()
            .insert("value".to_string(), ObjectHolder::own(Object::Number(5)));

        let instance = original.try_as_instance().expect("instance");
        let field = instance.fields().get("value").expect("field set via alias");
        assert_eq!(field.try_as_number(), Some(5));
    }

    #[test]
    fn renders_primitives_and_none() {
        let mut output = String::new();
        let mut context = SimpleContext::new(&mut output);

        let cases = [
            (ObjectHolder::none(), "None"),
            (ObjectHolder::own(Object::Number(-3)), "-3"),
            (ObjectHolder::own(Object::Bool(true)), "True"),
            (ObjectHolder::own(Object::Bool(false)), "False"),
            (ObjectHolder::own(Object::String("hi".to_string())), "hi"),
        ];
        for (holder, expected) in cases {
            assert_eq!(holder.to_output(&mut context).expect("render"), expected);
        }

        let class = Rc::new(Class::new("Point".to_string(), Vec::new(), None));
        let as_value = ObjectHolder::own(Object::Class(class.clone()));
        assert_eq!(
            as_value.to_output(&mut context).expect("render"),
            "Class Point"
        );

        let instance = ObjectHolder::own(Object::ClassInstance(ClassInstance::new(class)));
        let rendered = instance.to_output(&mut context).expect("render");
        assert!(rendered.starts_with("<Point object at 0x"));
    }

    #[test]
    fn type_names_cover_every_kind() {
        assert_eq!(ObjectHolder::none().type_name(), "None");
        assert_eq!(ObjectHolder::own(Object::Number(1)).type_name(), "Number");
        assert_eq!(
            ObjectHolder::own(Object::String(String::new())).type_name(),
            "String"
        );
        assert_eq!(ObjectHolder::own(Object::Bool(true)).type_name(), "Bool");
    }

    #[test]
    fn downcasts_reach_the_right_variant_only() {
        let class = Rc::new(Class::new("Point".to_string(), Vec::new(), None));
        let as_value = ObjectHolder::own(Object::Class(class.clone()));

        let recovered = as_value.try_as_class().expect("class value");
        assert!(Rc::ptr_eq(&recovered, &class));
        assert!(as_value.try_as_number().is_none());
        assert!(as_value.try_as_instance().is_none());

        let number = ObjectHolder::own(Object::Number(3));
        assert!(number.try_as_class().is_none());
        assert!(number.try_as_string().is_none());
        assert_eq!(number.try_as_number(), Some(3));
    }
}
