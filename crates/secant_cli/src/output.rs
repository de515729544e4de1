//! Rendering helpers for JSON and table output.

use std::io::Write;

use secant_core::report::PointView;
use serde::Serialize;

use crate::Result;

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Formats an optional float, `-` when absent.
pub fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.6e}"))
}

/// Formats a point as `a+bi`, `-` for non-finite parts.
pub fn point(p: &PointView) -> String {
    match (p.real, p.imag) {
        (Some(re), Some(im)) if im < 0.0 => format!("{re:.10}-{:.10}i", -im),
        (Some(re), Some(im)) => format!("{re:.10}+{im:.10}i"),
        _ => "-".to_string(),
    }
}

/// A labelled key/value block.
pub fn write_fields(out: &mut dyn Write, title: &str, fields: &[(&str, String)]) -> Result<()> {
    writeln!(out, "{title}")?;
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        writeln!(out, "  {key:<width$}  {value}")?;
    }
    Ok(())
}

/// A box-drawn table with left-aligned cells.
pub fn write_table(out: &mut dyn Write, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {cell:<w$} ")
            })
            .collect();
        format!("│{}│", padded.join("│"))
    };

    writeln!(out, "{}", rule("┌", "┬", "┐"))?;
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    writeln!(out, "{}", line(&header_cells))?;
    writeln!(out, "{}", rule("├", "┼", "┤"))?;
    if rows.is_empty() {
        writeln!(out, "{}", line(&["(none)".to_string()]))?;
    }
    for row in rows {
        writeln!(out, "{}", line(row))?;
    }
    writeln!(out, "{}", rule("└", "┴", "┘"))?;
    Ok(())
}
