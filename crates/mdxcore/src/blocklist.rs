use lazy_static::lazy_static;
use std::collections::HashSet;

/// Identifiers that give direct access to code evaluation, the process, the
/// module system, the filesystem/network or the global scope object.
pub const BLOCKED_GLOBALS: &[&str] = &[
    "eval",
    "Function",
    "AsyncFunction",
    "GeneratorFunction",
    "FunctionConstructor",
    "require",
    "process",
    "global",
    "globalThis",
    "window",
    "self",
    "module",
    "exports",
    "__dirname",
    "__filename",
    "child_process",
    "fs",
    "net",
    "http",
    "https",
    "vm",
    "worker_threads",
    "Reflect",
];

/// Built-in constructors whose static methods can be reached through a
/// computed key (`Object[key]()`). Plain use of these names is fine.
pub const BUILTIN_CONSTRUCTORS: &[&str] = &[
    "Object", "Array", "String", "Number", "Boolean", "Symbol", "Error", "Date", "RegExp",
    "Promise", "Proxy", "Reflect", "WeakMap", "WeakSet", "Map", "Set",
];

/// Property names that walk towards a constructor, a prototype or an
/// evaluation entry point, whatever object they are read from.
pub const BLOCKED_PROPERTIES: &[&str] = &[
    "constructor",
    "prototype",
    "__proto__",
    "eval",
    "Reflect",
    "Function",
    "AsyncFunction",
    "GeneratorFunction",
    "FunctionConstructor",
    "require",
];

lazy_static! {
    static ref DEFAULT_BLOCKLIST: Blocklist = Blocklist::new();
}

/// The three name sets consulted by the danger classifier.
///
/// A blocklist is built once and then only read; it can be shared freely
/// between threads. Extra names can be added at construction time, but the
/// built-in names can never be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocklist {
    globals: HashSet<String>,
    constructors: HashSet<String>,
    properties: HashSet<String>,
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new()
    }
}

impl Blocklist {
    pub fn new() -> Self {
        Self {
            globals: to_set(BLOCKED_GLOBALS),
            constructors: to_set(BUILTIN_CONSTRUCTORS),
            properties: to_set(BLOCKED_PROPERTIES),
        }
    }

    /// Shared instance holding only the built-in names.
    pub fn shared() -> &'static Blocklist {
        &DEFAULT_BLOCKLIST
    }

    pub fn with_globals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globals.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_constructors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constructors.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_blocked_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    pub fn is_builtin_constructor(&self, name: &str) -> bool {
        self.constructors.contains(name)
    }

    pub fn is_blocked_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    pub fn len(&self) -> usize {
        self.globals.len() + self.constructors.len() + self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}
