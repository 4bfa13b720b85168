/// Render a left-aligned table; each column is as wide as its longest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.len());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i == last {
            line.push_str(cell);
        } else {
            let width = widths.get(i).copied().unwrap_or(0);
            line.push_str(&format!("{:<width$}   ", cell, width = width));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// `NAMESPACE NAME` listing used by `rbacctl get`.
pub fn namespace_table<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let rows: Vec<Vec<String>> = items
        .into_iter()
        .map(|(ns, name)| vec![ns.to_string(), name.to_string()])
        .collect();
    render_table(&["NAMESPACE", "NAME"], &rows)
}
