use terminal_size::{terminal_size, Height, Width};

// Render a list as an ASCII table sized to the terminal.
// Returns false when there is nothing to print so callers can fall back to
// a plain message.
pub fn print_table(columns: &[&str], rows: &[Vec<String>]) -> bool {
    if rows.is_empty() {
        return false;
    }
    let termw = get_terminal_width();
    crate::tprintln!("[cli.outputformatter] detected terminal width={} columns", termw);

    let cap = (termw / columns.len().max(1)).max(8);
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len().min(cap)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(columns.len()) {
            let w = cell.chars().count().min(cap);
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let sep = build_separator(&widths);
    println!("{}", sep);
    println!("{}", build_row(&columns.iter().map(|c| c.to_string()).collect::<Vec<_>>(), &widths));
    println!("{}", sep);
    for r in rows {
        println!("{}", build_row(r, &widths));
    }
    println!("{}", sep);
    println!("rows: {}", rows.len());
    true
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(|c| c.as_str()).unwrap_or("");
        let fitted = fit_cell(cell, *w);
        s.push(' ');
        s.push_str(&fitted);
        s.push_str(&" ".repeat(w.saturating_sub(fitted.chars().count())));
        s.push_str(" |");
    }
    s
}

fn fit_cell(s: &str, maxw: usize) -> String {
    let len = s.chars().count();
    if len <= maxw {
        return s.to_string();
    }
    if maxw <= 1 {
        return "…".to_string();
    }
    let kept: String = s.chars().take(maxw - 1).collect();
    format!("{}…", kept)
}

fn get_terminal_width() -> usize {
    if let Some((Width(w), Height(_h))) = terminal_size() {
        return (w.saturating_sub(4)) as usize;
    }
    80
}
