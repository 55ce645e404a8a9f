use client_core::{ScheduleView, TableState};
use client_core::schedules::UNAVAILABLE_NOTICE;

const HEADERS: [&str; 5] = ["ID", "URL", "INTERVAL", "ENABLED", "LAST RUN"];

/// Plain-text rendering of the schedule table plus the notice line, when one
/// is set. Column order is fixed; the whole block is rebuilt on every call.
pub fn schedule_table(view: &ScheduleView) -> String {
    let mut out = String::new();

    match &view.table {
        TableState::Rows(rows) => {
            let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
            for row in rows {
                for (width, cell) in widths.iter_mut().zip(row.cells.iter()) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            push_row(&mut out, &widths, &HEADERS.map(str::to_string));
            for row in rows {
                push_row(&mut out, &widths, &row.cells);
            }
            if rows.is_empty() {
                out.push_str("(no schedules)\n");
            }
        }
        TableState::Unavailable => {
            out.push_str(UNAVAILABLE_NOTICE);
            out.push('\n');
        }
    }

    if let Some(notice) = &view.notice {
        out.push_str(&notice.message());
        out.push('\n');
    }

    out
}

fn push_row(out: &mut String, widths: &[usize], cells: &[String; 5]) {
    let mut first = true;
    for (width, cell) in widths.iter().zip(cells.iter()) {
        if !first {
            out.push_str(" | ");
        }
        first = false;
        out.push_str(cell);
        for _ in cell.chars().count()..*width {
            out.push(' ');
        }
    }
    out.push('\n');
}
