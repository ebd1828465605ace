use std::io::{self, Write};

use catalog_core::{CatalogViewModel, Record, RecordKind, ScanStatus, Tag};
use chrono::{DateTime, Utc};

pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  more                          reveal more records (load-more)")?;
    writeln!(out, "  scroll <top> <client> <height> report scroll position")?;
    writeln!(out, "  search <text>                 search (empty text leaves search)")?;
    writeln!(out, "  category <id|->               filter by category, '-' clears")?;
    writeln!(out, "  company <id|->                filter by company, '-' clears")?;
    writeln!(out, "  saved <id,id,...|->           only these ids, '-' clears")?;
    writeln!(out, "  open <id>                     open a record")?;
    writeln!(out, "  quit")
}

pub fn render(out: &mut impl Write, view: &CatalogViewModel) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", status_line(view))?;
    let now = Utc::now();
    for (index, record) in view.visible.iter().enumerate() {
        writeln!(out, "{:>4}. {}", index + 1, record_line(record, now))?;
    }
    if view.visible.len() < view.total_known || view.has_more {
        writeln!(out, "      ... 'more' for more")?;
    }
    out.flush()
}

fn status_line(view: &CatalogViewModel) -> String {
    let mut parts = vec![
        format!("[{}]", view.list_key),
        format!("{} of {} shown", view.visible.len(), view.total_known),
    ];
    if view.premium_count > 0 {
        parts.push(format!("{} premium", view.premium_count));
    }
    parts.push(
        match view.scan {
            ScanStatus::Idle => "idle",
            ScanStatus::Running => "loading in background",
            ScanStatus::Complete => "all loaded",
            ScanStatus::Failed => "background load stopped",
        }
        .to_string(),
    );
    if view.loading.initial_loading {
        parts.push("loading...".to_string());
    }
    if view.loading.loading_more {
        parts.push("loading more...".to_string());
    }
    if view.loading.searching {
        parts.push("searching...".to_string());
    }
    parts.join(" | ")
}

fn record_line(record: &Record, now: DateTime<Utc>) -> String {
    let marker = if record.has_tag(Tag::Premium) { "*" } else { " " };
    let mut line = format!("{marker} {} ({})", record.title(), record.id());
    match record.kind() {
        RecordKind::Job => {
            if let Some(company) = record.field("company") {
                line.push_str(&format!(" @ {company}"));
            }
            if let Some(location) = record.field("location") {
                line.push_str(&format!(", {location}"));
            }
            line.push_str(&format!(" | {} views | {}", record.score(), age(record, now)));
        }
        RecordKind::Company => {
            line.push_str(&format!(" | {} jobs", record.score()));
        }
    }
    line
}

fn age(record: &Record, now: DateTime<Utc>) -> String {
    let days = (now - record.created_at()).num_days().max(0) as u64;
    match days {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=29 => format!("{} weeks ago", days.div_ceil(7)),
        _ => format!("{} months ago", days.div_ceil(30)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn job_line_shows_premium_company_and_age() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2024, 6, 7, 9, 0, 0).unwrap();
        let record = Record::builder("j1", RecordKind::Job, "Backend Developer", created)
            .tag(Tag::Premium)
            .field("company", "Acme")
            .field("location", "Baku")
            .score(12)
            .build();

        assert_eq!(
            record_line(&record, now),
            "* Backend Developer (j1) @ Acme, Baku | 12 views | 3 days ago"
        );
    }

    #[test]
    fn status_line_reports_progress() {
        let view = CatalogViewModel {
            list_key: "companies".to_string(),
            total_known: 140,
            has_more: true,
            scan: ScanStatus::Running,
            ..CatalogViewModel::default()
        };
        assert_eq!(
            status_line(&view),
            "[companies] | 0 of 140 shown | loading in background"
        );
    }
}
