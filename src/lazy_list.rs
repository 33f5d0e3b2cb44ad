//! Comma-delimited attribute lists split on first use.

use std::cell::OnceCell;

use crate::config::AttributeValue;

/// Split a comma-delimited list, trimming whitespace and dropping empty pieces.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// A list-valued filter field.
///
/// The raw text is kept until the first query; the split list is then cached
/// for the lifetime of the filter.
#[derive(Debug, Clone, Default)]
pub struct LazyStringList {
    raw: Option<String>,
    values: OnceCell<Vec<String>>,
}

impl LazyStringList {
    pub fn new(attr: &AttributeValue) -> Self {
        if attr.blank() {
            Self {
                raw: None,
                values: OnceCell::from(Vec::new()),
            }
        } else {
            Self {
                raw: Some(attr.str()),
                values: OnceCell::new(),
            }
        }
    }

    /// True when the field was absent.
    pub fn is_blank(&self) -> bool {
        self.raw.is_none()
    }

    /// True when absent or when the split list has no elements.
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn values(&self) -> &[String] {
        self.values
            .get_or_init(|| self.raw.as_deref().map(split_list).unwrap_or_default())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().iter().any(|v| v == value)
    }

    /// True once the split has been computed.
    pub fn is_split(&self) -> bool {
        self.values.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_keeps_inner_spaces() {
        assert_eq!(
            split_list(" Elvish Archer ,Elvish Scout,, "),
            vec!["Elvish Archer".to_string(), "Elvish Scout".to_string()]
        );
    }

    #[test]
    fn test_blank_vs_empty() {
        let blank = LazyStringList::new(&AttributeValue::Blank);
        let empty = LazyStringList::new(&AttributeValue::from(""));
        assert!(blank.is_blank());
        assert!(!empty.is_blank());
        assert!(blank.is_empty());
        assert!(empty.is_empty());
        assert!(!empty.contains(""));
    }

    #[test]
    fn test_split_is_lazy_and_cached() {
        let list = LazyStringList::new(&AttributeValue::from("a,b,c"));
        assert!(!list.is_split());
        assert!(list.contains("b"));
        assert!(list.is_split());
        assert!(!list.contains("d"));
        assert_eq!(list.values().len(), 3);
    }

    #[test]
    fn test_numeric_attribute_is_listed_by_printed_form() {
        let list = LazyStringList::new(&AttributeValue::from(3));
        assert!(list.contains("3"));
    }
}
