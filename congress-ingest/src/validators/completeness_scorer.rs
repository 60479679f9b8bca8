//! Completeness Scorer
//!
//! Counts meaningfully populated fields in a record. The score is a relative
//! ranking signal between two candidates for the same identity key, never an
//! absolute quality measure.
//!
//! # Presence Rules
//! - `None` / absent: not counted
//! - Blank string (after trimming): not counted
//! - Empty list: not counted
//! - Any other scalar, non-empty string or non-empty list: counts 1
//!
//! # Example
//! ```rust,ignore
//! let score = FieldCounter::new()
//!     .field(&hearing.title)
//!     .field(&hearing.witnesses)
//!     .finish();
//! ```

/// Whether a field value carries information
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for u32 {
    fn is_present(&self) -> bool {
        true
    }
}

impl Presence for i64 {
    fn is_present(&self) -> bool {
        true
    }
}

impl Presence for bool {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().map_or(false, Presence::is_present)
    }
}

/// Accumulates a completeness score one field at a time
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldCounter {
    count: u32,
}

impl FieldCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `value` if it is meaningfully present
    pub fn field<T: Presence>(mut self, value: &T) -> Self {
        if value.is_present() {
            self.count += 1;
        }
        self
    }

    pub fn finish(self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_strings_are_absent() {
        assert!(!String::new().is_present());
        assert!(!"   \t".to_string().is_present());
        assert!("x".to_string().is_present());
    }

    #[test]
    fn test_option_and_list_presence() {
        let none: Option<String> = None;
        let empty: Option<Vec<u32>> = Some(vec![]);
        let full: Option<Vec<u32>> = Some(vec![1]);

        assert!(!none.is_present());
        assert!(!empty.is_present());
        assert!(full.is_present());
        assert!(Some(0u32).is_present());
    }

    #[test]
    fn test_counter_counts_only_present_fields() {
        let score = FieldCounter::new()
            .field(&Some("Budget Hearing".to_string()))
            .field(&Some(" ".to_string()))
            .field(&Some(117u32))
            .field(&Option::<Vec<String>>::None)
            .field(&Some(Vec::<String>::new()))
            .field(&Some(vec!["A".to_string()]))
            .finish();

        assert_eq!(score, 3);
    }
}
