//! Export module tests

use dsv_export::{
    CsvExporter, EscapeRule, ExportConfig, ExportError, ExportOutput, OutputKind, Record,
};
use serde_json::{Value, json};

fn records(values: Value) -> Vec<Record> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

/// Split a document line into cells, honouring quoted cells
fn split_cells(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => cells.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    cells.push(current);
    cells
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_default_config_with_quoted_name() {
        let data = records(json!([
            {"name": "Al", "age": 30},
            {"name": "\"Bo\"", "age": 7}
        ]));
        let text = CsvExporter::new(ExportConfig::default())
            .export_as_text(&data)
            .unwrap();

        assert_eq!(text, "name,age\r\nAl,30\r\n\"\"\"Bo\"\"\",7");
    }

    #[test]
    fn test_semicolon_without_headers() {
        let data = records(json!([{"x": 1}, {"x": 2}]));
        let config = ExportConfig::builder()
            .delimiter(";")
            .include_headers(false)
            .build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "1\r\n2");
    }

    #[test]
    fn test_empty_records_without_columns() {
        let result = CsvExporter::default().export_as_text(&[]);
        assert!(matches!(result, Err(ExportError::EmptyInput)));

        let result = CsvExporter::default().export_as_artifact(&[]);
        assert!(matches!(result, Err(ExportError::EmptyInput)));
    }

    #[test]
    fn test_empty_records_with_columns_yield_header_only() {
        let config = ExportConfig::builder().columns(["a", "b"]).build();
        let text = CsvExporter::new(config).export_as_text(&[]).unwrap();
        assert_eq!(text, "a,b");
    }

    #[test]
    fn test_formatter_increments_age() {
        let data = records(json!([{"age": 5}]));
        let config = ExportConfig::builder()
            .include_headers(false)
            .formatter("age", |v| json!(v.as_i64().unwrap_or(0) + 1))
            .build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "6");
    }
}

mod column_tests {
    use super::*;

    #[test]
    fn test_explicit_column_order() {
        let data = records(json!([
            {"a": "first", "b": "second"},
            {"a": "third", "b": "fourth"}
        ]));
        let config = ExportConfig::builder().columns(["b", "a"]).build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "b,a\r\nsecond,first\r\nfourth,third");
    }

    #[test]
    fn test_header_labels() {
        let data = records(json!([{"first_name": "Al", "age": 30}]));
        let config = ExportConfig::builder()
            .header("first_name", "First name")
            .build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "First name,age\r\nAl,30");
    }

    #[test]
    fn test_header_labels_are_escaped() {
        let data = records(json!([{"n": 1}]));
        let config = ExportConfig::builder().header("n", "Number, total").build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "\"Number, total\"\r\n1");
    }

    #[test]
    fn test_missing_keys_become_empty_cells() {
        let data = records(json!([
            {"a": 1, "b": 2, "c": 3},
            {"a": 4},
            {"c": null}
        ]));

        let text = CsvExporter::default().export_as_text(&data).unwrap();
        assert_eq!(text, "a,b,c\r\n1,2,3\r\n4,,\r\n,,");
    }

    #[test]
    fn test_later_keys_outside_first_record_are_ignored() {
        let data = records(json!([{"a": 1}, {"a": 2, "extra": true}]));
        let text = CsvExporter::default().export_as_text(&data).unwrap();
        assert_eq!(text, "a\r\n1\r\n2");
    }
}

mod escaping_tests {
    use super::*;

    #[test]
    fn test_delimiter_inside_value_is_quoted() {
        let data = records(json!([{"city": "Berlin, Mitte"}]));
        let text = CsvExporter::default().export_as_text(&data).unwrap();
        assert_eq!(text, "city\r\n\"Berlin, Mitte\"");
    }

    #[test]
    fn test_newlines_are_quoted() {
        let data = records(json!([{"note": "line one\r\nline two"}]));
        let config = ExportConfig::builder().include_headers(false).build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "\"line one\r\nline two\"");
    }

    #[test]
    fn test_legacy_rule_matches_narrow_quoting() {
        let data = records(json!([
            {"name": "\"Bo\"", "note": "say \"hi\"\r\nbye", "city": "a,b"}
        ]));
        let config = ExportConfig::builder()
            .include_headers(false)
            .escape_rule(EscapeRule::Legacy)
            .build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "\"Bo\",\"say \"\"hi\"\"\r\nbye\",\"a,b\"");
    }

    #[test]
    fn test_other_delimiter_leaves_commas_alone() {
        let data = records(json!([{"a": "1,5", "b": "x;y"}]));
        let config = ExportConfig::builder()
            .delimiter(";")
            .include_headers(false)
            .build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "1,5;\"x;y\"");
    }

    #[test]
    fn test_quotes_are_doubled_inside_wrapped_cells() {
        let values = ["\"", "a\"b", "\"\"", "x,\"y\""];
        for value in values {
            let data = records(json!([{ "v": value }]));
            let config = ExportConfig::builder().include_headers(false).build();
            let text = CsvExporter::new(config).export_as_text(&data).unwrap();

            assert!(text.starts_with('"') && text.ends_with('"'), "{}", text);
            let inner = &text[1..text.len() - 1];
            assert_eq!(inner.replace("\"\"", ""), value.replace('"', ""));
        }
    }
}

mod property_tests {
    use super::*;

    fn sample() -> Vec<Record> {
        records(json!([
            {"id": 1, "name": "Al", "note": "plain"},
            {"id": 2, "name": "Bo, Jr.", "note": "say \"hi\""},
            {"id": 3, "name": null, "note": "a;b"},
            {"id": 4, "name": "Cy", "note": ""}
        ]))
    }

    #[test]
    fn test_row_count_matches_records() {
        let data = sample();
        for include_headers in [true, false] {
            let config = ExportConfig::builder()
                .include_headers(include_headers)
                .build();
            let text = CsvExporter::new(config).export_as_text(&data).unwrap();

            let expected = data.len() + usize::from(include_headers);
            assert_eq!(text.split("\r\n").count(), expected);
        }
    }

    #[test]
    fn test_cell_count_recovered_per_row() {
        let data = sample();
        for delimiter in [',', ';', '\t', '|'] {
            let config = ExportConfig::builder()
                .delimiter(delimiter.to_string())
                .build();
            let text = CsvExporter::new(config).export_as_text(&data).unwrap();

            for line in text.split("\r\n") {
                assert_eq!(split_cells(line, delimiter).len(), 3, "line: {:?}", line);
            }
        }
    }

    #[test]
    fn test_cells_round_trip_through_quote_aware_split() {
        let data = sample();
        let config = ExportConfig::builder().include_headers(false).build();
        let text = CsvExporter::new(config).export_as_text(&data).unwrap();

        let rows: Vec<Vec<String>> = text.split("\r\n").map(|l| split_cells(l, ',')).collect();
        assert_eq!(rows[1], ["2", "Bo, Jr.", "say \"hi\""]);
        assert_eq!(rows[2], ["3", "", "a;b"]);
    }

    #[test]
    fn test_repeated_exports_are_identical() {
        let exporter = CsvExporter::default();
        let data = sample();
        assert_eq!(
            exporter.export_as_text(&data).unwrap(),
            exporter.export_as_text(&data).unwrap()
        );
    }
}

mod output_kind_tests {
    use super::*;

    #[test]
    fn test_build_document_text() {
        let data = records(json!([{"a": 1}]));
        let output = CsvExporter::default()
            .build_document(&data, OutputKind::Text)
            .unwrap();
        assert_eq!(output, ExportOutput::Text("a\r\n1".to_string()));
        assert!(output.as_artifact().is_none());
    }

    #[test]
    fn test_build_document_artifact() {
        let data = records(json!([{"a": "ü"}]));
        let config = ExportConfig::builder()
            .content_type("text/plain;charset=utf-8")
            .build();
        let output = CsvExporter::new(config)
            .build_document(&data, OutputKind::Artifact)
            .unwrap();

        let artifact = output.as_artifact().unwrap();
        assert_eq!(artifact.content_type(), "text/plain;charset=utf-8");
        assert_eq!(artifact.as_text(), Some("a\r\nü"));
    }

    #[test]
    fn test_default_output_kind_is_artifact() {
        assert_eq!(OutputKind::default(), OutputKind::Artifact);
    }

    #[test]
    fn test_artifact_and_text_agree() {
        let data = records(json!([{"a": 1, "b": "x,y"}]));
        let exporter = CsvExporter::default();
        let text = exporter.export_as_text(&data).unwrap();
        let artifact = exporter.export_as_artifact(&data).unwrap();
        assert_eq!(artifact.bytes(), text.as_bytes());
        assert_eq!(artifact.content_type(), "text/csv");
    }
}

mod formatter_tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct BadValue;

    impl fmt::Display for BadValue {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "bad value")
        }
    }

    impl std::error::Error for BadValue {}

    #[test]
    fn test_formatter_error_propagates() {
        let data = records(json!([{"age": "x"}]));
        let config = ExportConfig::builder()
            .try_formatter("age", |_| Err(BadValue.into()))
            .build();

        let err = CsvExporter::new(config).export_as_text(&data).unwrap_err();
        match err {
            ExportError::Formatter { column, source } => {
                assert_eq!(column, "age");
                assert!(source.downcast_ref::<BadValue>().is_some());
            }
            other => panic!("Expected formatter error, got {:?}", other),
        }
    }

    #[test]
    fn test_formatter_output_is_escaped() {
        let data = records(json!([{"tags": ["a", "b"]}]));
        let config = ExportConfig::builder()
            .include_headers(false)
            .formatter("tags", |v| {
                let joined: Vec<String> = v
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|i| i.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                Value::String(joined.join(","))
            })
            .build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "\"a,b\"");
    }

    #[test]
    fn test_formatters_do_not_touch_headers() {
        let data = records(json!([{"n": 1}]));
        let config = ExportConfig::builder()
            .formatter("n", |_| json!("formatted"))
            .build();

        let text = CsvExporter::new(config).export_as_text(&data).unwrap();
        assert_eq!(text, "n\r\nformatted");
    }
}
