use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Statement;
use crate::runtime::object::Closure;

pub(crate) const INIT_METHOD: &str = "__init__";
pub(crate) const STR_METHOD: &str = "__str__";
pub(crate) const EQUAL_METHOD: &str = "__eq__";
pub(crate) const LESS_METHOD: &str = "__lt__";
pub(crate) const ADD_METHOD: &str = "__add__";
pub(crate) const SUB_METHOD: &str = "__sub__";
pub(crate) const MUL_METHOD: &str = "__mul__";
pub(crate) const DIV_METHOD: &str = "__truediv__";
pub(crate) const SELF_NAME: &str = "self";

/// A named method: formal parameters (never including `self`, which the
/// call machinery binds implicitly) and the body statement.
#[derive(Debug, PartialEq)]
pub struct Method {
    pub name: String,
    pub formal_params: Vec<String>,
    pub body: Statement,
}

/// A user-defined class: name, method table, optional parent. Classes are
/// program-lifetime once defined and always referenced through `Rc`, so a
/// parent outlives every descendant and instance.
#[derive(Debug, PartialEq)]
pub struct Class {
    name: String,
    methods: HashMap<String, Method>,
    parent: Option<Rc<Class>>,
}

impl Class {
    pub fn new(name: String, methods: Vec<Method>, parent: Option<Rc<Class>>) -> Self {
        let methods = methods
            .into_iter()
            .map(|method| (method.name.clone(), method))
            .collect();
        Self {
            name,
            methods,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First definition of `name` found walking up the inheritance chain.
    pub fn get_method(&self, name: &str) -> Option<&Method> {
        match self.methods.get(name) {
            Some(method) => Some(method),
            None => self
                .parent
                .as_deref()
                .and_then(|parent| parent.get_method(name)),
        }
    }
}

/// Instance of a user class: shared class reference plus its own fields.
#[derive(Debug)]
pub struct ClassInstance {
    class: Rc<Class>,
    fields: Closure,
}

impl ClassInstance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: Closure::new(),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    pub fn fields(&self) -> &Closure {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Closure {
        &mut self.fields
    }

    /// True when the first definition of `method` in the inheritance chain
    /// takes exactly `argc` arguments. There is no overload resolution: the
    /// name match settles which definition gets its arity checked.
    pub fn has_method(&self, method: &str, argc: usize) -> bool {
        self.class
            .get_method(method)
            .is_some_and(|method| method.formal_params.len() == argc)
    }
}
