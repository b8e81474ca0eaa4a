//! Builtin names of the guest language, excluded from dependency edges.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Python builtin names that never count as used symbols.
static PYTHON_BUILTINS: &[&str] = &[
    "print", "len", "range", "str", "int", "float", "bool", "list", "dict", "set", "tuple", "abs",
    "all", "any", "bin", "callable", "chr", "dir", "enumerate", "eval", "exec", "filter", "format",
    "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input", "isinstance",
    "issubclass", "iter", "locals", "map", "max", "min", "next", "oct", "open", "ord", "pow",
    "repr", "reversed", "round", "setattr", "sorted", "sum", "type", "vars", "zip", "__import__",
    "True", "False", "None",
];

/// Whether `name` is a guest-language builtin.
pub fn is_builtin(name: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| PYTHON_BUILTINS.iter().copied().collect())
        .contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_builtins() {
        assert!(is_builtin("print"));
        assert!(is_builtin("None"));
        assert!(!is_builtin("pandas"));
        assert!(!is_builtin("my_var"));
    }
}
