use chrono::{DateTime, Utc};
use colored::Colorize;
use grimoire::commands::{CmdMessage, CollectionSummary, EntryView, MessageLevel};
use grimoire::model::{Millis, Settings};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const ID_WIDTH: usize = 8;
const RULE: &str = "--------------------------------";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// One line per entry plus an indented snippet line.
pub(super) fn print_entries(views: &[EntryView]) {
    if views.is_empty() {
        println!("No entries found.");
        return;
    }

    for view in views {
        let id = short_id(&view.entry.id);
        let collection = format!(" [{}]", view.collection_name);
        let time_ago = format_time_ago(view.entry.updated_at);

        let fixed = ID_WIDTH + 2 + collection.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let title = truncate_to_width(&view.entry.title, available);
        let padding = available.saturating_sub(title.width());

        println!(
            "{}  {}{}{}{}",
            id.yellow(),
            title.bold(),
            collection.dimmed(),
            " ".repeat(padding),
            time_ago.dimmed()
        );

        let detail = match (view.subtitle.is_empty(), view.snippet.is_empty()) {
            (true, true) => continue,
            (false, true) => view.subtitle.clone(),
            (true, false) => view.snippet.clone(),
            (false, false) => format!("{} · {}", view.subtitle, view.snippet),
        };
        let indent = " ".repeat(ID_WIDTH + 2);
        let detail = truncate_to_width(&detail, LINE_WIDTH.saturating_sub(indent.width()));
        println!("{}{}", indent, detail.dimmed());
    }
}

/// Full view of one entry: header, custom fields, tags, relations, body.
pub(super) fn print_entry(
    view: &EntryView,
    rows: &[(String, String)],
    related_titles: &[String],
    body: &str,
) {
    let entry = &view.entry;
    println!("{} {}", short_id(&entry.id).yellow(), entry.title.bold());
    println!(
        "{}",
        format!(
            "{} · created {} · updated {}",
            view.collection_name,
            format_time_ago(entry.created_at).trim_start(),
            format_time_ago(entry.updated_at).trim_start()
        )
        .dimmed()
    );

    if !rows.is_empty() {
        let label_width = rows.iter().map(|(label, _)| label.width()).max().unwrap_or(0);
        println!();
        for (label, value) in rows {
            let padding = label_width.saturating_sub(label.width());
            println!("  {}{}  {}", label.cyan(), " ".repeat(padding), value);
        }
    }

    if !entry.tags.is_empty() {
        println!();
        let tags: Vec<String> = entry.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("  {}", tags.join(" ").magenta());
    }

    if !related_titles.is_empty() {
        println!();
        println!("  {} {}", "→".dimmed(), related_titles.join(", "));
    }

    if !entry.images.is_empty() {
        println!("  {}", format!("{} image(s)", entry.images.len()).dimmed());
    }

    println!("{}", RULE);
    println!("{}", body);
}

pub(super) fn print_library(summaries: &[CollectionSummary]) {
    for summary in summaries {
        let icon = summary.collection.icon.as_deref().unwrap_or("•");
        println!(
            "{} {} {} {}",
            icon,
            summary.collection.name.bold(),
            format!("({})", summary.collection.id).dimmed(),
            summary.count.to_string().yellow()
        );
        if !summary.recent_titles.is_empty() {
            let titles = truncate_to_width(&summary.recent_titles.join(", "), LINE_WIDTH - 4);
            println!("    {}", titles.dimmed());
        }
    }
}

pub(super) fn print_settings(settings: &Settings) {
    println!("theme = {}", settings.theme);
    println!("language = {}", settings.language);
}

fn short_id(id: &str) -> String {
    id.chars().take(ID_WIDTH).collect()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(millis: Millis) -> String {
    let timestamp = DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now);
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
