use std::collections::{HashMap, HashSet};

/// The set of names bound while parsing.
///
/// A bound name is never treated as a function call, so `a(x+1)` parses as `a*(x+1)` when `a` is
/// bound. Unbound names that can be split into a sequence of bound names are parsed as the
/// implicit product of those names.
pub trait NameScope {
    /// Returns true if the name is bound.
    fn is_bound(&self, name: &str) -> bool;

    /// Returns every bound name.
    fn bound_names(&self) -> Vec<&str>;
}

impl NameScope for () {
    fn is_bound(&self, _: &str) -> bool {
        false
    }

    fn bound_names(&self) -> Vec<&str> {
        Vec::new()
    }
}

impl NameScope for HashSet<String> {
    fn is_bound(&self, name: &str) -> bool {
        self.contains(name)
    }

    fn bound_names(&self) -> Vec<&str> {
        self.iter().map(String::as_str).collect()
    }
}

impl<V> NameScope for HashMap<String, V> {
    fn is_bound(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn bound_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }
}

impl NameScope for [&str] {
    fn is_bound(&self, name: &str) -> bool {
        self.contains(&name)
    }

    fn bound_names(&self) -> Vec<&str> {
        self.to_vec()
    }
}

/// Splits the name into a sequence of bound names, if possible.
///
/// Longer names are tried first, so `abc` with `a`, `ab` and `c` bound splits into `ab` and `c`.
/// Returns [`None`] if the name cannot be completely covered by bound names.
pub fn split_name<'n, S: NameScope + ?Sized>(name: &'n str, scope: &S) -> Option<Vec<&'n str>> {
    if scope.is_bound(name) {
        return Some(vec![name]);
    }

    let mut prefixes = scope.bound_names()
        .into_iter()
        .filter(|bound| !bound.is_empty() && name.starts_with(bound))
        .map(str::len)
        .collect::<Vec<_>>();
    prefixes.sort_unstable_by(|a, b| b.cmp(a));
    prefixes.dedup();

    prefixes.into_iter().find_map(|len| {
        let mut rest = split_name(&name[len..], scope)?;
        rest.insert(0, &name[..len]);
        Some(rest)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn split_into_bound_names() {
        let scope: &[&str] = &["a", "b", "c"];
        assert_eq!(split_name("abc", scope), Some(vec!["a", "b", "c"]));
        assert_eq!(split_name("abd", scope), None);
    }

    #[test]
    fn longest_prefix_first() {
        let scope: &[&str] = &["a", "ab", "c"];
        assert_eq!(split_name("abc", scope), Some(vec!["ab", "c"]));
    }

    #[test]
    fn backtracks() {
        let scope: &[&str] = &["xy", "x", "yz"];
        assert_eq!(split_name("xyz", scope), Some(vec!["x", "yz"]));
    }

    #[test]
    fn nothing_bound() {
        assert_eq!(split_name("abc", &()), None);
    }
}
