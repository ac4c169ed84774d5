//! Intermediate representation of one parsed source file.
//!
//! Extraction produces plain data with no cross-file references; the
//! provider turns it into objects and resolves imports lazily.

use docgraph_reflect_api::{OverrideValue, RoutineDecorator, Signature};
use indexmap::IndexMap;

/// Everything the provider needs from one module file
#[derive(Debug, Clone, Default)]
pub struct ModuleIR {
    /// Decoded (uncleaned) module docstring
    pub docstring: Option<String>,

    /// Top-level names in first-binding order; a later rebinding replaces
    /// the value but keeps the position
    pub bindings: IndexMap<String, Binding>,

    /// `__all__`, when declared with literals
    pub exports: Option<Vec<String>>,

    /// `__pdoc__` entries in declaration order
    pub overrides: Vec<(String, OverrideValue)>,
}

impl ModuleIR {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionIR> {
        self.bindings.values().filter_map(|binding| match binding {
            Binding::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassIR> {
        self.bindings.values().filter_map(|binding| match binding {
            Binding::Class(class) => Some(class),
            _ => None,
        })
    }
}

/// What a name is bound to
#[derive(Debug, Clone)]
pub enum Binding {
    Function(FunctionIR),
    Class(ClassIR),
    /// Result of an assignment
    Data,
    Import(ImportIR),
}

/// A `def` or `async def`
#[derive(Debug, Clone)]
pub struct FunctionIR {
    pub name: String,
    pub docstring: Option<String>,
    pub signature: Signature,
    pub is_async: bool,

    /// Decorator expressions without `@` and call arguments
    pub decorators: Vec<String>,

    /// Source text, padded so its first line keeps the original indentation
    pub source: String,
}

impl FunctionIR {
    pub fn routine_decorator(&self) -> RoutineDecorator {
        if self.has_decorator("staticmethod") {
            RoutineDecorator::StaticMethod
        } else if self.has_decorator("classmethod") {
            RoutineDecorator::ClassMethod
        } else {
            RoutineDecorator::Plain
        }
    }

    /// `@property` or `@functools.cached_property`
    pub fn is_property(&self) -> bool {
        self.decorators.iter().any(|decorator| {
            let last = decorator.rsplit('.').next().unwrap_or(decorator);
            last == "property" || last == "cached_property"
        })
    }

    /// `@<name>.setter` / `@<name>.deleter` on a property accessor
    pub fn is_accessor(&self) -> bool {
        self.decorators.iter().any(|decorator| {
            decorator == &format!("{}.setter", self.name)
                || decorator == &format!("{}.deleter", self.name)
        })
    }

    fn has_decorator(&self, name: &str) -> bool {
        self.decorators.iter().any(|decorator| decorator == name)
    }
}

/// A `class` statement
#[derive(Debug, Clone)]
pub struct ClassIR {
    pub name: String,
    pub docstring: Option<String>,

    /// Base expressions as written, subscripts stripped (`Generic[T]` is `Generic`)
    pub bases: Vec<String>,

    /// Names bound in the class body
    pub members: IndexMap<String, Binding>,

    pub slots: Vec<String>,

    pub source: String,
}

/// An import binding
///
/// `import a.b` binds `a` to module `a`; `import a.b as c` binds `c` to
/// `a.b`; `from .m import x` binds `x` to member `x` of `m` one level up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIR {
    /// Leading dots of a relative import
    pub level: usize,

    /// Dotted module path after the dots (may be empty)
    pub module: String,

    /// Imported member, for `from` imports
    pub member: Option<String>,
}

impl ImportIR {
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            level: 0,
            module: module.into(),
            member: None,
        }
    }

    pub fn member(level: usize, module: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            level,
            module: module.into(),
            member: Some(member.into()),
        }
    }

    /// Absolute module path, given the importing module's package
    ///
    /// `package` is the module's own name for a package and its parent
    /// otherwise. Returns `None` when the dots climb past the top-level package.
    pub fn absolute_module(&self, package: &str) -> Option<String> {
        if self.level == 0 {
            return Some(self.module.clone());
        }

        if package.is_empty() {
            return None;
        }
        let mut parts: Vec<&str> = package.split('.').collect();
        for _ in 1..self.level {
            parts.pop();
        }
        if parts.is_empty() {
            return None;
        }
        if !self.module.is_empty() {
            parts.push(&self.module);
        }
        Some(parts.join("."))
    }
}
