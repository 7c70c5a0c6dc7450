use std::fmt;
use std::fmt::{Display, Formatter};

const NUM_SLOTS: usize = 26;

/// `Bindings` maps a variable name (`'A'..='Z'`) to the substring it is bound to
/// for one candidate word (a *decomposition*).
///
/// Uses array-based storage instead of `HashMap` since variables are limited to
/// 'A'-'Z'; iteration is therefore always in variable order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    slots: [Option<String>; NUM_SLOTS],
}

/// Convert a variable character to an array index
/// 'A' -> 0, 'B' -> 1, ..., 'Z' -> 25
///
/// # Panics
/// Panics if `c` is not in 'A'..='Z'. The parser validates variable names
/// before any binding is created, so this indicates a programming error.
#[inline]
fn char_to_index(c: char) -> usize {
    match c {
        'A'..='Z' => (c as u8 - b'A') as usize,
        _ => panic!("Invalid variable character: '{c}' (parser should have validated this)"),
    }
}

/// Renders as `A=noon - B=cat`, the same shape the CLI prints.
impl Display for Bindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", pairs.join(" - "))
    }
}

impl Bindings {
    pub fn set(&mut self, var_char: char, var_val: impl Into<String>) {
        self.slots[char_to_index(var_char)] = Some(var_val.into());
    }

    #[must_use]
    pub fn get(&self, var_char: char) -> Option<&str> {
        self.slots[char_to_index(var_char)].as_deref()
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, var_char: char) {
        self.slots[char_to_index(var_char)] = None;
    }

    /// Iterate over `(variable, value)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.slots.iter().zip('A'..='Z').filter_map(|(opt, c)| opt.as_deref().map(|val| (c, val)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letters::UPPERCASE_ALPHABET;

    #[test]
    fn test_bindings_set_and_get() {
        let mut b = Bindings::default();
        b.set('A', "test");
        assert_eq!(b.get('A'), Some("test"));
        assert_eq!(b.get('B'), None);
    }

    #[test]
    fn test_bindings_remove() {
        let mut b = Bindings::default();
        b.set('A', "test");
        b.remove('A');
        assert!(b.get('A').is_none());
        assert!(b.is_empty());
    }

    #[test]
    fn test_bindings_iter_in_variable_order() {
        let mut b = Bindings::default();
        b.set('C', "gamma");
        b.set('A', "alpha");
        let items: Vec<_> = b.iter().collect();
        assert_eq!(items, vec![('A', "alpha"), ('C', "gamma")]);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_bindings_all_26_variables() {
        let mut b = Bindings::default();
        for c in UPPERCASE_ALPHABET {
            b.set(c, c.to_ascii_lowercase().to_string());
        }
        assert_eq!(b.len(), 26);
        assert_eq!(b.get('Q'), Some("q"));
    }

    #[test]
    fn test_bindings_display() {
        let mut b = Bindings::default();
        b.set('B', "cat");
        b.set('A', "noon");
        assert_eq!(b.to_string(), "A=noon - B=cat");
        assert_eq!(Bindings::default().to_string(), "");
    }

    #[test]
    #[should_panic(expected = "Invalid variable character")]
    fn test_char_to_index_invalid() {
        char_to_index('a');
    }
}
