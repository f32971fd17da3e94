use std::io::IsTerminal;

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value, table_options()),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let max_width = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);
    table::TableOptions {
        max_width,
        color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn render_table<T: Serialize>(value: &T, options: table::TableOptions) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items, options)),
        Value::Object(map) => {
            let headers = ["key", "value"];
            let rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_table(&headers, &rows, options))
        }
        scalar => Ok(table::render_table(
            &["value"],
            &[vec![value_to_cell(&scalar)]],
            options,
        )),
    }
}

/// One row per array item; columns are the union of object keys in first-seen
/// order.
fn render_array_table(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options);
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|header| {
                    item.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render_table(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{render, render_table, table::TableOptions};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Tracked {
        path: &'static str,
        status: &'static str,
        proposal: Option<&'static str>,
    }

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn json_render_is_valid_json() {
        let value = Tracked {
            path: "/a/b.sqlite",
            status: "new",
            proposal: None,
        };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["status"], "new");
        assert!(parsed["proposal"].is_null());
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let value = vec![
            Tracked {
                path: "/a.sqlite",
                status: "new",
                proposal: Some("lb1"),
            },
            Tracked {
                path: "/b.sqlite",
                status: "unchanged",
                proposal: None,
            },
        ];
        let out = render(&value, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn array_table_has_one_row_per_item() {
        let value = vec![
            Tracked {
                path: "/a.sqlite",
                status: "new",
                proposal: Some("lb1"),
            },
            Tracked {
                path: "/b.sqlite",
                status: "unchanged",
                proposal: None,
            },
        ];
        let out = render_table(&value, PLAIN).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("path"));
        assert!(lines[3].contains("unchanged"));
        assert!(lines[3].contains('-'));
    }

    #[test]
    fn empty_array_renders_placeholder() {
        let value: Vec<Tracked> = Vec::new();
        assert_eq!(render_table(&value, PLAIN).unwrap(), "(no rows)");
    }
}
