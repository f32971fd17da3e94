#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN_WIDTH: usize = 6;

/// Render an aligned table for string rows.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
                .max(MIN_COLUMN_WIDTH)
        })
        .collect();

    shrink_to_fit(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&truncate(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string();
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push(divider);
    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = row.get(index).map_or("-", String::as_str);
                let text = truncate(cell, *width);
                let padded = pad(&text, *width, looks_numeric(&text));
                if options.color {
                    colorize_status(&padded, &text)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Narrow the widest columns one character at a time until the table fits.
fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * 2;

    while widths.iter().sum::<usize>() + separators > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > headers[*idx].len().max(MIN_COLUMN_WIDTH))
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);
        let Some(idx) = widest else {
            break;
        };
        widths[idx] -= 1;
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(value.chars().count()));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.'))
        && trimmed.chars().any(|ch| ch.is_ascii_digit())
}

/// Color sync statuses and validation results; `text` is the unpadded cell.
fn colorize_status(padded: &str, text: &str) -> String {
    let code = match text {
        "unchanged" | "clean" | "transferred" | "imported" => Some("32"),
        "new" | "changed" | "diffs" | "tableless" => Some("33"),
        "failed" | "unreported" => Some("31"),
        _ => None,
    };
    code.map_or_else(
        || padded.to_string(),
        |code| padded.replacen(text, &format!("\u{1b}[{code}m{text}\u{1b}[0m"), 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn columns_align_across_rows() {
        let headers = ["path", "status", "crystals"];
        let rows = vec![
            vec!["/a.sqlite".to_string(), "new".to_string(), "3".to_string()],
            vec![
                "/visits/lb18145-1/soakDBDataFile.sqlite".to_string(),
                "unchanged".to_string(),
                "120".to_string(),
            ],
        ];
        let table = render_table(&headers, &rows, PLAIN);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        let status_col = lines[0].find("status").unwrap();
        assert_eq!(lines[2].find("new"), Some(status_col));
        assert!(lines[3].ends_with("120"));
    }

    #[test]
    fn wide_tables_shrink_to_max_width() {
        let headers = ["path", "status"];
        let rows = vec![vec!["x".repeat(100), "new".to_string()]];
        let table = render_table(
            &headers,
            &rows,
            TableOptions {
                max_width: Some(40),
                color: false,
            },
        );
        let row = table.lines().nth(2).unwrap();
        assert!(row.chars().count() <= 40);
        assert!(row.contains('…'));
    }

    #[test]
    fn color_wraps_known_statuses_only() {
        assert!(colorize_status("failed  ", "failed").contains("\u{1b}[31m"));
        assert_eq!(colorize_status("lab     ", "lab"), "lab     ");
    }
}
