//! Lexically nested symbol resolution for the compiler.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Where a resolved name lives at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// A slot in the session-wide globals array.
    Global,
    /// A slot above the current frame's base pointer.
    Local,
    /// A fixed index into the builtin registry.
    Builtin,
    /// A position in the enclosing closure's captured values.
    Free,
    /// The function-self binding; the index is unused.
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
}

/// One scope in the chain. A new enclosed table is pushed when the compiler
/// enters a function literal and popped when it leaves.
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub outer: Option<Rc<RefCell<SymbolTable>>>,
    store: HashMap<String, Symbol>,
    /// Count of Global/Local definitions in this scope; becomes the
    /// compiled function's `num_locals`.
    pub num_definitions: usize,
    /// Symbols captured from enclosing scopes, in capture order. The
    /// compiler replays these onto the stack before emitting OpClosure.
    pub free_symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_enclosed(outer: Rc<RefCell<SymbolTable>>) -> Self {
        Self {
            outer: Some(outer),
            ..Self::default()
        }
    }

    /// Define a name in this scope: Global at the outermost table, Local
    /// everywhere else.
    pub fn define(&mut self, name: &str) -> Symbol {
        let scope = if self.outer.is_none() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let symbol = Symbol {
            name: name.to_string(),
            scope,
            index: self.num_definitions,
        };
        self.store.insert(name.to_string(), symbol.clone());
        self.num_definitions += 1;
        symbol
    }

    pub fn define_builtin(&mut self, index: usize, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Builtin,
            index,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    pub fn define_function_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Function,
            index: 0,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Record a capture: the original symbol (as seen in the outer scope)
    /// joins `free_symbols`, and the name resolves here as Free.
    fn define_free(&mut self, original: Symbol) -> Symbol {
        self.free_symbols.push(original.clone());

        let symbol = Symbol {
            name: original.name,
            scope: SymbolScope::Free,
            index: self.free_symbols.len() - 1,
        };
        self.store.insert(symbol.name.clone(), symbol.clone());
        symbol
    }

    /// Resolve a name, promoting Local/Free bindings found in enclosing
    /// function scopes to Free bindings here. Global and Builtin symbols
    /// pass through unchanged.
    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.store.get(name) {
            return Some(symbol.clone());
        }

        let outer = self.outer.clone()?;
        let symbol = outer.borrow_mut().resolve(name)?;

        match symbol.scope {
            SymbolScope::Global | SymbolScope::Builtin => Some(symbol),
            _ => Some(self.define_free(symbol)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, scope: SymbolScope, index: usize) -> Symbol {
        Symbol {
            name: name.to_string(),
            scope,
            index,
        }
    }

    fn enclosed(outer: &Rc<RefCell<SymbolTable>>) -> Rc<RefCell<SymbolTable>> {
        Rc::new(RefCell::new(SymbolTable::new_enclosed(Rc::clone(outer))))
    }

    #[test]
    fn test_define() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        assert_eq!(
            global.borrow_mut().define("a"),
            symbol("a", SymbolScope::Global, 0)
        );
        assert_eq!(
            global.borrow_mut().define("b"),
            symbol("b", SymbolScope::Global, 1)
        );

        let first_local = enclosed(&global);
        assert_eq!(
            first_local.borrow_mut().define("c"),
            symbol("c", SymbolScope::Local, 0)
        );
        assert_eq!(
            first_local.borrow_mut().define("d"),
            symbol("d", SymbolScope::Local, 1)
        );

        let second_local = enclosed(&first_local);
        assert_eq!(
            second_local.borrow_mut().define("e"),
            symbol("e", SymbolScope::Local, 0)
        );
        assert_eq!(
            second_local.borrow_mut().define("f"),
            symbol("f", SymbolScope::Local, 1)
        );
    }

    #[test]
    fn test_resolve_global() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        global.borrow_mut().define("a");
        global.borrow_mut().define("b");

        assert_eq!(
            global.borrow_mut().resolve("a"),
            Some(symbol("a", SymbolScope::Global, 0))
        );
        assert_eq!(
            global.borrow_mut().resolve("b"),
            Some(symbol("b", SymbolScope::Global, 1))
        );
        assert_eq!(global.borrow_mut().resolve("c"), None);
    }

    #[test]
    fn test_resolve_local() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        global.borrow_mut().define("a");
        global.borrow_mut().define("b");

        let local = enclosed(&global);
        local.borrow_mut().define("c");
        local.borrow_mut().define("d");

        let expected = vec![
            symbol("a", SymbolScope::Global, 0),
            symbol("b", SymbolScope::Global, 1),
            symbol("c", SymbolScope::Local, 0),
            symbol("d", SymbolScope::Local, 1),
        ];
        for want in expected {
            assert_eq!(local.borrow_mut().resolve(&want.name), Some(want.clone()));
        }
    }

    #[test]
    fn test_resolve_nested_local() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        global.borrow_mut().define("a");
        global.borrow_mut().define("b");

        let first_local = enclosed(&global);
        first_local.borrow_mut().define("c");
        first_local.borrow_mut().define("d");

        let second_local = enclosed(&first_local);
        second_local.borrow_mut().define("e");
        second_local.borrow_mut().define("f");

        // Locals of the middle scope become Free in the inner scope.
        let expected = vec![
            symbol("a", SymbolScope::Global, 0),
            symbol("b", SymbolScope::Global, 1),
            symbol("c", SymbolScope::Free, 0),
            symbol("d", SymbolScope::Free, 1),
            symbol("e", SymbolScope::Local, 0),
            symbol("f", SymbolScope::Local, 1),
        ];
        for want in expected {
            assert_eq!(
                second_local.borrow_mut().resolve(&want.name),
                Some(want.clone())
            );
        }
    }

    #[test]
    fn test_resolve_builtins() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        let first_local = enclosed(&global);
        let second_local = enclosed(&first_local);

        let expected = vec![
            symbol("a", SymbolScope::Builtin, 0),
            symbol("c", SymbolScope::Builtin, 1),
            symbol("e", SymbolScope::Builtin, 2),
            symbol("f", SymbolScope::Builtin, 3),
        ];

        for (index, want) in expected.iter().enumerate() {
            global.borrow_mut().define_builtin(index, &want.name);
        }

        for table in [&global, &first_local, &second_local] {
            for want in &expected {
                assert_eq!(table.borrow_mut().resolve(&want.name), Some(want.clone()));
            }
        }
    }

    #[test]
    fn test_resolve_free() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        global.borrow_mut().define("a");
        global.borrow_mut().define("b");

        let first_local = enclosed(&global);
        first_local.borrow_mut().define("c");
        first_local.borrow_mut().define("d");

        let second_local = enclosed(&first_local);
        second_local.borrow_mut().define("e");
        second_local.borrow_mut().define("f");

        let expected = vec![
            symbol("a", SymbolScope::Global, 0),
            symbol("b", SymbolScope::Global, 1),
            symbol("c", SymbolScope::Free, 0),
            symbol("d", SymbolScope::Free, 1),
            symbol("e", SymbolScope::Local, 0),
            symbol("f", SymbolScope::Local, 1),
        ];
        for want in expected {
            assert_eq!(
                second_local.borrow_mut().resolve(&want.name),
                Some(want.clone())
            );
        }

        // The middle scope's locals were captured as seen there.
        let expected_free = vec![
            symbol("c", SymbolScope::Local, 0),
            symbol("d", SymbolScope::Local, 1),
        ];
        assert_eq!(second_local.borrow().free_symbols, expected_free);
        assert!(first_local.borrow().free_symbols.is_empty());
    }

    #[test]
    fn test_resolve_unresolvable_free() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        global.borrow_mut().define("a");

        let first_local = enclosed(&global);
        first_local.borrow_mut().define("c");

        let second_local = enclosed(&first_local);
        second_local.borrow_mut().define("e");
        second_local.borrow_mut().define("f");

        let expected = vec![
            symbol("a", SymbolScope::Global, 0),
            symbol("c", SymbolScope::Free, 0),
            symbol("e", SymbolScope::Local, 0),
            symbol("f", SymbolScope::Local, 1),
        ];
        for want in expected {
            assert_eq!(
                second_local.borrow_mut().resolve(&want.name),
                Some(want.clone())
            );
        }

        assert_eq!(second_local.borrow_mut().resolve("b"), None);
        assert_eq!(second_local.borrow_mut().resolve("d"), None);
    }

    #[test]
    fn test_define_and_resolve_function_name() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        global.borrow_mut().define_function_name("a");

        assert_eq!(
            global.borrow_mut().resolve("a"),
            Some(symbol("a", SymbolScope::Function, 0))
        );
    }

    #[test]
    fn test_shadowing_function_name() {
        let global = Rc::new(RefCell::new(SymbolTable::new()));
        global.borrow_mut().define_function_name("a");
        global.borrow_mut().define("a");

        assert_eq!(
            global.borrow_mut().resolve("a"),
            Some(symbol("a", SymbolScope::Global, 0))
        );
    }
}
