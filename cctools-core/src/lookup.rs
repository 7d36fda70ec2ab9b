//! Unique-prefix lookup over a set of records.

use crate::error::LookupError;
use crate::models::Record;

/// Returns the single record where any of `key_fields` starts with `prefix`.
///
/// Matching is case-sensitive. A prefix may hit different key fields on
/// different records; what must be unique is the set of matching records,
/// so one record matching on two fields still counts once.
///
/// # Errors
///
/// Returns [`LookupError::AmbiguousMatch`] when several records match and
/// [`LookupError::NoMatch`] when none does.
pub fn find_unique<'a>(
    records: &'a [Record],
    prefix: &str,
    key_fields: &[&str],
) -> Result<&'a Record, LookupError> {
    let mut matches = records.iter().filter(|record| {
        key_fields
            .iter()
            .any(|field| record.get(field).is_some_and(|value| value.starts_with(prefix)))
    });

    let Some(first) = matches.next() else {
        return Err(LookupError::NoMatch {
            prefix: prefix.to_string(),
            key_fields: owned(key_fields),
        });
    };

    let others = matches.count();
    if others > 0 {
        return Err(LookupError::AmbiguousMatch {
            prefix: prefix.to_string(),
            key_fields: owned(key_fields),
            count: others + 1,
        });
    }

    Ok(first)
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            [("SKU", "A1"), ("Name", "Foo")].into_iter().collect(),
            [("SKU", "A2"), ("Name", "Bar")].into_iter().collect(),
        ]
    }

    #[test]
    fn test_ambiguous_prefix() {
        let records = records();
        let err = find_unique(&records, "A", &["SKU"]).unwrap_err();
        assert_eq!(
            err,
            LookupError::AmbiguousMatch {
                prefix: "A".to_string(),
                key_fields: vec!["SKU".to_string()],
                count: 2,
            }
        );
    }

    #[test]
    fn test_unique_prefix() {
        let records = records();
        let found = find_unique(&records, "A1", &["SKU"]).unwrap();
        assert_eq!(found, &records[0]);
    }

    #[test]
    fn test_no_match() {
        let records = records();
        let err = find_unique(&records, "Z", &["SKU"]).unwrap_err();
        assert!(matches!(err, LookupError::NoMatch { .. }));
        assert_eq!(err.prefix(), "Z");
    }

    #[test]
    fn test_record_matching_two_fields_counts_once() {
        let records: Vec<Record> = vec![
            [("SKU", "Bag1"), ("Name", "Bag of holding")].into_iter().collect(),
            [("SKU", "C3"), ("Name", "Cup")].into_iter().collect(),
        ];
        let found = find_unique(&records, "Bag", &["SKU", "Name"]).unwrap();
        assert_eq!(found.value("SKU"), "Bag1");
    }

    #[test]
    fn test_prefix_hits_different_fields_on_different_records() {
        let records: Vec<Record> = vec![
            [("SKU", "B1"), ("Name", "Apple")].into_iter().collect(),
            [("SKU", "B2"), ("Name", "Banana")].into_iter().collect(),
        ];
        let found = find_unique(&records, "B", &["Name"]).unwrap();
        assert_eq!(found.value("SKU"), "B2");
        assert!(find_unique(&records, "B", &["SKU", "Name"]).is_err());
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let records = records();
        assert!(find_unique(&records, "a1", &["SKU"]).is_err());
    }
}
