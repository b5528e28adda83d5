// Field-level updates for the modify operations.

/// Either leave a field as it is or replace it with a new value.
///
/// Unlike a bare `Option`, `Set(String::new())` is an explicit request to
/// store an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> Patch<T> {
    /// Writes the new value into `slot` if one was supplied.
    pub fn apply(self, slot: &mut T) {
        if let Patch::Set(value) = self {
            *slot = value;
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_leaves_value() {
        let mut name = "old".to_string();
        Patch::Keep.apply(&mut name);
        assert_eq!(name, "old");
    }

    #[test]
    fn test_set_empty_string_is_applied() {
        let mut name = "old".to_string();
        Patch::Set(String::new()).apply(&mut name);
        assert_eq!(name, "");
    }
}
