//! CLI output formatting tests.
//!
//! These tests verify that records, inventory rows and cache state render
//! correctly in text, CSV and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::{TableOptions, TextFormatter};
    use cctools_browser::InventoryItem;
    use cctools_core::{ObjectType, Record};
    use cctools_store::{CacheLocation, CacheStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    fn categories() -> Vec<Record> {
        vec![
            record(&[
                ("Category Id", "1"),
                ("Category Name", "Necklaces"),
                ("Category Description", "<p>Hand made &amp; <b>bold</b></p>"),
            ]),
            record(&[
                ("Category Id", "22"),
                ("Category Name", "Rings"),
                ("Category Description", ""),
            ]),
        ]
    }

    #[test]
    fn test_records_table_aligns_columns() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_records(ObjectType::Category, &categories());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Category Id  Category Name  Description");
        assert!(lines[1].starts_with("───────────  ─────────────"));
        assert_eq!(lines[2], "1            Necklaces      Hand made & bold");
        assert_eq!(lines[3], "22           Rings");
        assert_eq!(lines[4], "2 categories");
    }

    #[test]
    fn test_raw_html_keeps_markup() {
        let formatter = TextFormatter::new(false).with_options(TableOptions {
            strip_html: false,
            max_width: 0,
            ..TableOptions::default()
        });
        let output = formatter.format_records(ObjectType::Category, &categories());
        assert!(output.contains("<p>Hand made &amp; <b>bold</b></p>"));
    }

    #[test]
    fn test_long_values_are_truncated() {
        let formatter = TextFormatter::new(false).with_options(TableOptions {
            max_width: 6,
            ..TableOptions::default()
        });
        let records = vec![record(&[("SKU", "100"), ("Product Name", "Silver Necklace")])];
        let output = formatter.format_records(ObjectType::Product, &records);
        assert!(output.contains("Silve…"));
        assert!(!output.contains("Silver Necklace"));
    }

    #[test]
    fn test_empty_records() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_records(ObjectType::OptionSet, &[]), "No option sets.");
    }

    #[test]
    fn test_colors_only_when_enabled() {
        let plain = TextFormatter::new(false).format_records(ObjectType::Category, &categories());
        assert!(!plain.contains("\x1b["));

        let colored = TextFormatter::new(true).format_records(ObjectType::Category, &categories());
        assert!(colored.starts_with("\x1b[1m"));
    }

    #[test]
    fn test_single_record_listing() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_record(&record(&[
            ("SKU", "100"),
            ("Product Name", "Necklace"),
            ("Teaser", "<i>New</i>"),
        ]));
        assert_eq!(
            output,
            "SKU           100\nProduct Name  Necklace\nTeaser        New"
        );
    }

    #[test]
    fn test_inventory_table() {
        let formatter = TextFormatter::new(false);
        let items = vec![
            InventoryItem {
                sku: "100".to_string(),
                level: "4".to_string(),
                name: "Necklace".to_string(),
                enabled: "Y".to_string(),
            },
            InventoryItem {
                sku: "200-S".to_string(),
                level: "12".to_string(),
                name: "Bracelet (Small)".to_string(),
                enabled: "N".to_string(),
            },
        ];
        let output = formatter.format_inventory(&items);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "SKU    Level  Product Name      Enabled");
        assert_eq!(lines[2], "100    4      Necklace          Y");
        assert_eq!(lines[3], "200-S  12     Bracelet (Small)  N");
        assert_eq!(lines[4], "2 items");
    }

    #[test]
    fn test_cache_status_table() {
        let formatter = TextFormatter::new(false);
        let fetched_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let statuses = vec![
            CacheStatus {
                object_type: ObjectType::Product,
                location: CacheLocation::Disk,
                fetched_at: Some(fetched_at),
                record_count: Some(42),
                fresh: true,
            },
            CacheStatus {
                object_type: ObjectType::Variant,
                location: CacheLocation::Missing,
                fetched_at: None,
                record_count: None,
                fresh: false,
            },
        ];

        let output = formatter.format_cache_status(
            "shop.example.com/~acme",
            &statuses,
            fetched_at + Duration::minutes(5),
        );

        assert!(output.starts_with("Cache for shop.example.com/~acme"));
        assert!(output.contains("product  disk      42       5m 0s  fresh"));
        assert!(output.contains("variant  missing   -        -      -"));
    }
}

#[cfg(test)]
mod csv_formatter_tests {
    use super::super::CsvFormatter;
    use cctools_core::{ObjectType, Record};

    #[test]
    fn test_records_keep_raw_values() {
        let records: Vec<Record> = vec![
            [("SKU", "100"), ("Teaser", "<b>Bold</b>, \"new\"")]
                .into_iter()
                .collect(),
        ];
        let output = CsvFormatter::new()
            .format_records(ObjectType::Product, &records)
            .unwrap();
        assert_eq!(output, "SKU,Teaser\n100,\"<b>Bold</b>, \"\"new\"\"\"\n");
    }

    #[test]
    fn test_empty_records_write_schema_header() {
        let output = CsvFormatter::new()
            .format_records(ObjectType::OptionGroup, &[])
            .unwrap();
        assert_eq!(output, "Option Group Id,Option Group Name,Sort Order\n");
    }

    #[test]
    fn test_derived_fields_become_columns() {
        let records: Vec<Record> = vec![
            [("SKU", "100")].into_iter().collect(),
            [("SKU", "200"), ("_n_answers", "3")].into_iter().collect(),
        ];
        let output = CsvFormatter::new()
            .format_records(ObjectType::Product, &records)
            .unwrap();
        assert_eq!(output, "SKU,_n_answers\n100,\n200,3\n");
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::{CacheStatusOutput, JsonFormatter};
    use cctools_core::{ObjectType, Record};
    use cctools_store::{CacheLocation, CacheStatus};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_records_keep_field_order() {
        let record: Record = [("SKU", "100"), ("Available", "Y"), ("Category", "Rings")]
            .into_iter()
            .collect();
        let output = JsonFormatter::new(false).format(&vec![record]).unwrap();
        assert_eq!(output, r#"[{"SKU":"100","Available":"Y","Category":"Rings"}]"#);
    }

    #[test]
    fn test_format_pretty_json() {
        let record: Record = [("SKU", "100")].into_iter().collect();
        let output = JsonFormatter::new(true).format(&record).unwrap();
        assert!(output.contains('\n'));
        assert!(output.contains("  \"SKU\": \"100\""));
    }

    #[test]
    fn test_cache_status_output() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let status = CacheStatus {
            object_type: ObjectType::OptionItem,
            location: CacheLocation::Memory,
            fetched_at: Some(fetched_at),
            record_count: Some(7),
            fresh: false,
        };
        let output = CacheStatusOutput::new(&status, fetched_at + Duration::seconds(90));
        let json = JsonFormatter::new(false).format(&output).unwrap();

        assert!(json.contains(r#""objectType":"option""#));
        assert!(json.contains(r#""location":"memory""#));
        assert!(json.contains(r#""ageSecs":90"#));
        assert!(json.contains(r#""recordCount":7"#));
        assert!(json.contains(r#""fresh":false"#));
    }

    #[test]
    fn test_missing_cache_entry_omits_optional_fields() {
        let status = CacheStatus {
            object_type: ObjectType::Question,
            location: CacheLocation::Missing,
            fetched_at: None,
            record_count: None,
            fresh: false,
        };
        let json = JsonFormatter::new(false)
            .format(&CacheStatusOutput::new(&status, Utc::now()))
            .unwrap();
        assert_eq!(json, r#"{"objectType":"question","location":"missing","fresh":false}"#);
    }
}
