//! Symbol Arena.
//!
//! Per-scope tables of variables, functions and namespaces, plus the two
//! bump-allocation cursors every address is handed out from. Cursors only
//! move forward; nothing is ever freed.

use std::rc::Rc;

use chonky_core::ValueType;
use rustc_hash::FxHashMap;

/// What was last stored into a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    /// Zero-initialised (parameters, padded list elements).
    Zeroed,
    /// A literal known at compile time.
    Literal(i64),
    /// Copied from another variable.
    Copied(String),
    /// The address of another variable.
    Address(u32),
    /// Computed at run time.
    Computed,
    /// A list holding this many elements.
    Elements(u32),
}

/// A declared variable.
///
/// The address is fixed at declaration; reassignment only changes `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub address: u32,
    pub ty: ValueType,
    pub value: StoredValue,
}

/// A formal parameter of a compiled function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// Where callers copy the argument to.
    pub address: u32,
    pub ty: ValueType,
}

/// A compiled function.
#[derive(Debug, Clone)]
pub struct Function {
    /// Declared name.
    pub name: String,
    /// Assembly label, qualified with the enclosing namespace.
    pub label: String,
    pub params: Vec<Param>,
    /// Cell the caller's return address is saved to.
    pub return_slot: u32,
    /// The body's symbols after compilation.
    pub symbols: SymbolArena,
    /// The generated definition block.
    pub text: String,
}

/// A namespace and the symbols declared inside it.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: String,
    pub symbols: SymbolArena,
}

/// Symbol tables and allocation cursors of one scope.
#[derive(Debug, Clone, Default)]
pub struct SymbolArena {
    variables: FxHashMap<String, Variable>,
    functions: FxHashMap<String, Rc<Function>>,
    namespaces: FxHashMap<String, Rc<Namespace>>,
    next_address: u32,
    next_data_address: u32,
}

impl SymbolArena {
    /// Create empty tables with cursors at the given addresses.
    pub fn new(next_address: u32, next_data_address: u32) -> Self {
        Self {
            next_address,
            next_data_address,
            ..Self::default()
        }
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Hand out `size` bytes of the variable region.
    ///
    /// Returns `None`, leaving the cursor alone, if the cells would run past
    /// the end of the address space.
    pub fn allocate(&mut self, size: u32) -> Option<u32> {
        let address = self.next_address;
        self.next_address = address.checked_add(size)?;
        Some(address)
    }

    pub fn next_address(&self) -> u32 {
        self.next_address
    }

    pub fn next_data_address(&self) -> u32 {
        self.next_data_address
    }

    /// Adopt another arena's cursors.
    pub(crate) fn adopt_cursors(&mut self, other: &SymbolArena) {
        self.next_address = other.next_address;
        self.next_data_address = other.next_data_address;
    }

    pub(crate) fn set_next_address(&mut self, address: u32) {
        self.next_address = address;
    }

    pub(crate) fn set_next_data_address(&mut self, address: u32) {
        self.next_data_address = address;
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.get_mut(name)
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Bind a variable, replacing any previous binding of the name.
    pub fn insert_variable(&mut self, name: impl Into<String>, variable: Variable) {
        self.variables.insert(name.into(), variable);
    }

    /// Every bound variable name, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.variables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables
            .iter()
            .map(|(name, var)| (name.as_str(), var))
    }

    // ========================================================================
    // Functions and namespaces
    // ========================================================================

    pub fn function(&self, name: &str) -> Option<&Rc<Function>> {
        self.functions.get(name)
    }

    pub fn insert_function(&mut self, name: impl Into<String>, function: Rc<Function>) {
        self.functions.insert(name.into(), function);
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &Rc<Function>)> {
        self.functions.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn namespace(&self, name: &str) -> Option<&Rc<Namespace>> {
        self.namespaces.get(name)
    }

    pub fn insert_namespace(&mut self, name: impl Into<String>, namespace: Rc<Namespace>) {
        self.namespaces.insert(name.into(), namespace);
    }

    /// Every namespace name, sorted.
    pub fn namespace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chonky_core::ScalarType;

    fn int_var(address: u32) -> Variable {
        Variable {
            address,
            ty: ValueType::Scalar(ScalarType::Int),
            value: StoredValue::Zeroed,
        }
    }

    #[test]
    fn bump_allocation() {
        let mut arena = SymbolArena::new(0x100, 0x800);
        assert_eq!(arena.allocate(4), Some(0x100));
        assert_eq!(arena.allocate(1), Some(0x104));
        assert_eq!(arena.allocate(0), Some(0x105));
        assert_eq!(arena.allocate(4), Some(0x105));
        assert_eq!(arena.next_address(), 0x109);
        assert_eq!(arena.next_data_address(), 0x800);
    }

    #[test]
    fn allocation_stops_at_the_end_of_memory() {
        let mut arena = SymbolArena::new(0xFFFF_FFFE, 0);
        assert_eq!(arena.allocate(1), Some(0xFFFF_FFFE));
        assert_eq!(arena.allocate(4), None);
        assert_eq!(arena.next_address(), 0xFFFF_FFFF);
    }

    #[test]
    fn variable_names_are_sorted() {
        let mut arena = SymbolArena::default();
        arena.insert_variable("zeta", int_var(0));
        arena.insert_variable("alpha", int_var(4));
        assert_eq!(arena.variable_names(), vec!["alpha", "zeta"]);
        assert_eq!(arena.variable("alpha").map(|v| v.address), Some(4));
    }

    #[test]
    fn clones_are_independent() {
        let mut parent = SymbolArena::new(0, 0);
        parent.insert_variable("a", int_var(0));
        let mut child = parent.clone();
        child.insert_variable("b", int_var(4));
        assert!(!parent.contains_variable("b"));
        assert!(child.contains_variable("a"));
    }
}
