//! Builtin functions exposed to compiled programs.
//!
//! The registry order is fixed: `OpGetBuiltin` addresses builtins by index.
//! Failures are language-level `Object::Error` values that flow through the
//! operand stack like any other result.

use std::rc::Rc;

use super::{Builtin, Object};

/// Registry of builtins in `OpGetBuiltin` index order.
pub const BUILTINS: [Builtin; 6] = [
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
];

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

fn new_error(message: String) -> Object {
    Object::Error(message)
}

fn builtin_len(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments to `len`. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        Object::String(value) => Object::Integer(value.len() as i64),
        other => new_error(format!(
            "argument to `len` not supported, got {}",
            other.object_type()
        )),
    }
}

fn builtin_first(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments to `first`. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(Object::Null),
        other => new_error(format!(
            "argument to `first` not supported, got {}",
            other.object_type()
        )),
    }
}

fn builtin_last(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments to `last`. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(Object::Null),
        other => new_error(format!(
            "argument to `last` not supported, got {}",
            other.object_type()
        )),
    }
}

fn builtin_rest(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments to `rest`. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Object::Array(elements) => {
            if elements.is_empty() {
                return Object::Null;
            }
            Object::Array(Rc::new(elements[1..].to_vec()))
        }
        other => new_error(format!(
            "argument to `rest` not supported, got {}",
            other.object_type()
        )),
    }
}

fn builtin_push(args: Vec<Object>) -> Object {
    if args.len() != 2 {
        return new_error(format!(
            "wrong number of arguments to `push`. got={}, want=2",
            args.len()
        ));
    }

    match &args[0] {
        Object::Array(elements) => {
            let mut new_elements = elements.as_ref().clone();
            new_elements.push(args[1].clone());
            Object::Array(Rc::new(new_elements))
        }
        other => new_error(format!(
            "argument to `push` not supported, got {}",
            other.object_type()
        )),
    }
}

fn builtin_puts(args: Vec<Object>) -> Object {
    for arg in &args {
        println!("{}", arg);
    }
    Object::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_array(values: &[i64]) -> Object {
        Object::Array(Rc::new(
            values.iter().map(|&v| Object::Integer(v)).collect(),
        ))
    }

    #[test]
    fn test_registry_order() {
        let names: Vec<&str> = BUILTINS.iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["len", "first", "last", "rest", "push", "puts"]);
    }

    #[test]
    fn test_len() {
        match builtin_len(vec![int_array(&[1, 2, 3])]) {
            Object::Integer(3) => {}
            other => panic!("expected 3, got {:?}", other),
        }
        match builtin_len(vec![Object::String(Rc::new("four".to_string()))]) {
            Object::Integer(4) => {}
            other => panic!("expected 4, got {:?}", other),
        }
        match builtin_len(vec![Object::Integer(1)]) {
            Object::Error(message) => {
                assert_eq!(message, "argument to `len` not supported, got INTEGER")
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_first_last_on_empty_array() {
        assert!(matches!(builtin_first(vec![int_array(&[])]), Object::Null));
        assert!(matches!(builtin_last(vec![int_array(&[])]), Object::Null));
    }

    #[test]
    fn test_rest_returns_new_array() {
        match builtin_rest(vec![int_array(&[1, 2, 3])]) {
            Object::Array(elements) => assert_eq!(elements.len(), 2),
            other => panic!("expected array, got {:?}", other),
        }
        assert!(matches!(builtin_rest(vec![int_array(&[])]), Object::Null));
    }

    #[test]
    fn test_push_appends_without_mutating() {
        let original = int_array(&[1]);
        match builtin_push(vec![original.clone(), Object::Integer(2)]) {
            Object::Array(elements) => assert_eq!(elements.len(), 2),
            other => panic!("expected array, got {:?}", other),
        }
        match original {
            Object::Array(elements) => assert_eq!(elements.len(), 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_wrong_arity() {
        match builtin_push(vec![int_array(&[])]) {
            Object::Error(message) => {
                assert_eq!(message, "wrong number of arguments to `push`. got=1, want=2")
            }
            other => panic!("expected error, got {:?}", other),
        }
    }
}
