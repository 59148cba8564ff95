//! JSON names of fields and extensions.

use std::sync::OnceLock;

/// The JSON name of a field: either declared in the schema or derived from
/// the field name on first request.
#[derive(Debug, Default)]
pub struct JsonName {
    has: bool,
    name: OnceLock<String>,
}

impl JsonName {
    /// A name declared in the schema, returned verbatim.
    pub fn explicit(name: impl Into<String>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(name.into());
        JsonName { has: true, name: cell }
    }

    /// A name derived from the field name when first requested.
    pub fn derived() -> Self {
        JsonName::default()
    }

    /// Whether the schema declared the name.
    pub fn has(&self) -> bool {
        self.has
    }

    pub fn get(&self, field_name: &str) -> &str {
        self.name.get_or_init(|| json_camel_case(field_name))
    }
}

/// Camel-case a snake-case identifier the way the JSON mapping expects.
///
/// Underscores are dropped and the ASCII letter after one is upper-cased. A
/// leading upper-case ASCII letter is lower-cased.
pub fn json_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut was_underscore = false;
    for c in s.chars() {
        if c == '_' {
            was_underscore = true;
            continue;
        }
        if out.is_empty() && !was_underscore {
            out.push(c.to_ascii_lowercase());
        } else if was_underscore {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        was_underscore = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    #[test]
    fn camel_case_examples() {
        assert_eq!(json_camel_case("foo_bar"), "fooBar");
        assert_eq!(json_camel_case("Foo"), "foo");
        assert_eq!(json_camel_case("foo_bar_baz"), "fooBarBaz");
        assert_eq!(json_camel_case("foo__bar"), "fooBar");
        assert_eq!(json_camel_case("foo_1"), "foo1");
        assert_eq!(json_camel_case("_foo"), "Foo");
        assert_eq!(json_camel_case("fooBar"), "fooBar");
        assert_eq!(json_camel_case(""), "");
    }

    #[test]
    fn explicit_name_is_verbatim() {
        let name = JsonName::explicit("custom_Name");
        assert!(name.has());
        assert_eq!(name.get("ignored_field"), "custom_Name");
    }

    #[test]
    fn derived_name_is_computed_once() {
        let name = JsonName::derived();
        assert!(!name.has());
        let barrier = Barrier::new(8);
        let ptrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        let got = name.get("foo_bar");
                        assert_eq!(got, "fooBar");
                        got.as_ptr() as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(ptrs.windows(2).all(|w| w[0] == w[1]));
    }
}
