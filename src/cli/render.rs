//! Text rendering of mirrored records
//!
//! Every function here is pure: records in, `String` out. Callers decide
//! where the text goes.

use chrono::{DateTime, Datelike, Utc};

use crate::mirror::Discovered;
use crate::model::{AutoResponse, Command, Converter, ForbiddenWord, Group, UsageSnapshot};
use crate::notify::Notification;

const TITLE_WIDTH: usize = 35;

pub fn groups<'a>(groups: impl IntoIterator<Item = &'a Group>) -> String {
    let groups: Vec<&Group> = groups.into_iter().collect();
    if groups.is_empty() {
        return "No groups registered. Use 'bot-console groups discover' to find joined groups.\n"
            .to_string();
    }

    let mut lines = vec![
        format!(
            "{:<32} {:<24} {:<8} {:<12} {}",
            "JID", "Name", "Active", "Added by", "Added"
        ),
        "-".repeat(95),
    ];
    lines.extend(groups.into_iter().map(|g| {
        format!(
            "{:<32} {:<24} {:<8} {:<12} {}",
            g.group_jid,
            truncate(&g.group_name, 24),
            yes_no(g.is_active),
            g.created_by,
            timestamp(g.created_at)
        )
    }));
    finish(lines)
}

pub fn commands<'a>(commands: impl IntoIterator<Item = &'a Command>) -> String {
    let commands: Vec<&Command> = commands.into_iter().collect();
    if commands.is_empty() {
        return "No commands found.\n".to_string();
    }

    let mut lines = vec![
        format!(
            "{:<16} {:<8} {:<12} {:<8} {:<7} {}",
            "Command", "Type", "Category", "Active", "Used", "Title"
        ),
        "-".repeat(90),
    ];
    for c in commands {
        lines.push(format!(
            "{:<16} {:<8} {:<12} {:<8} {:<7} {}",
            c.command,
            c.response_type.as_str(),
            dash(&c.category),
            yes_no(c.is_active),
            c.usage_count,
            truncate(first_line(&c.title), TITLE_WIDTH)
        ));
    }
    finish(lines)
}

pub fn command_detail(command: &Command) -> String {
    let mut lines = vec![
        format!("Command:     {}", command.command),
        format!("Title:       {}", command.title),
    ];
    if !command.description.is_empty() {
        lines.push(format!("Description: {}", command.description));
    }
    lines.push(format!("Type:        {}", command.response_type.as_str()));
    lines.push(format!("Category:    {}", dash(&command.category)));
    lines.push(format!("Active:      {}", yes_no(command.is_active)));
    lines.push(format!("Used:        {} times", command.usage_count));
    if let Some(path) = &command.media_file_path {
        lines.push(format!("Media:       {}", path));
    }
    if let Some(caption) = &command.caption {
        lines.push(format!("Caption:     {}", caption));
    }
    lines.push(format!("Updated:     {}", timestamp(command.updated_at)));
    if let Some(text) = &command.text_content {
        lines.push(String::new());
        lines.push(text.clone());
    }
    finish(lines)
}

pub fn auto_responses<'a>(responses: impl IntoIterator<Item = &'a AutoResponse>) -> String {
    let responses: Vec<&AutoResponse> = responses.into_iter().collect();
    if responses.is_empty() {
        return "No auto responses found.\n".to_string();
    }

    let mut lines = vec![
        format!(
            "{:<20} {:<8} {:<8} {:<7} {}",
            "Keyword", "Type", "Active", "Used", "Response"
        ),
        "-".repeat(90),
    ];
    for r in responses {
        let response = r
            .text_response
            .as_deref()
            .map(first_line)
            .or(r.sticker_path.as_deref())
            .or(r.audio_path.as_deref())
            .unwrap_or("-");
        lines.push(format!(
            "{:<20} {:<8} {:<8} {:<7} {}",
            truncate(&r.keyword, 20),
            r.response_type.as_str(),
            yes_no(r.is_active),
            r.usage_count,
            truncate(response, TITLE_WIDTH)
        ));
    }
    finish(lines)
}

pub fn converters<'a>(converters: impl IntoIterator<Item = &'a Converter>) -> String {
    let converters: Vec<&Converter> = converters.into_iter().collect();
    if converters.is_empty() {
        return "No converters found.\n".to_string();
    }

    let mut lines = vec![
        format!(
            "{:<16} {:<20} {:<28} {:<9} {:<8} {}",
            "Command", "Name", "Bug host", "Modify", "Active", "Used"
        ),
        "-".repeat(95),
    ];
    for c in converters {
        lines.push(format!(
            "{:<16} {:<20} {:<28} {:<9} {:<8} {}",
            c.command_name,
            truncate(&c.display_name, 20),
            truncate(&c.bug_host, 28),
            c.modify_type.as_str(),
            yes_no(c.is_active),
            c.usage_count
        ));
    }
    finish(lines)
}

pub fn stats(snapshot: &UsageSnapshot, top: usize, recent: usize) -> String {
    let mut lines = vec![
        format!("Groups:         {}", snapshot.counts.groups),
        format!("Commands:       {}", snapshot.counts.commands),
        format!("Auto responses: {}", snapshot.counts.auto_responses),
        format!(
            "Used in the last {} days: {} distinct",
            snapshot.days,
            snapshot.distinct_used()
        ),
        String::new(),
        "Most used".to_string(),
    ];

    let top_commands = snapshot.top_commands(top);
    if top_commands.is_empty() {
        lines.push("  No usage in this period.".to_string());
    }
    for (key, count) in top_commands {
        lines.push(format!("  {:<24} {}", key, count));
    }

    lines.push(String::new());
    lines.push("Recent activity".to_string());
    if snapshot.recent_logs.is_empty() {
        lines.push("  No recent activity.".to_string());
    }
    for log in snapshot.recent_logs.iter().take(recent) {
        let status = if log.success { "ok" } else { "failed" };
        lines.push(format!(
            "  {:<17} {:<20} {:<7} {}",
            timestamp(log.used_at),
            truncate(&log.command_value, 20),
            status,
            dash(&log.group_jid)
        ));
    }
    finish(lines)
}

pub fn discovered(groups: &[Discovered<'_>]) -> String {
    if groups.is_empty() {
        return "The bot has not joined any groups.\n".to_string();
    }

    let mut lines = vec![
        format!(
            "{:<32} {:<28} {:<8} {}",
            "JID", "Name", "Members", "Registered"
        ),
        "-".repeat(80),
    ];
    lines.extend(groups.iter().map(|d| {
        format!(
            "{:<32} {:<28} {:<8} {}",
            d.group.jid,
            truncate(&d.group.name, 28),
            d.group.participant_count,
            yes_no(d.registered)
        )
    }));
    finish(lines)
}

pub fn forbidden_words(group_jid: &str, words: &[ForbiddenWord]) -> String {
    if words.is_empty() {
        return format!("No forbidden words for {}.\n", group_jid);
    }

    let mut lines = vec![
        format!("{:<6} {:<24} {:<12} {}", "ID", "Word", "Added by", "Added"),
        "-".repeat(60),
    ];
    for w in words {
        lines.push(format!(
            "{:<6} {:<24} {:<12} {}",
            w.id,
            truncate(&w.word, 24),
            w.created_by,
            timestamp(w.created_at)
        ));
    }
    finish(lines)
}

/// One-line banner for a notification
pub fn banner(notification: &Notification) -> String {
    format!("[{}] {}", notification.level, notification.message)
}

/// Shorten to `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let cut: String = text.chars().take(keep).collect();
    format!("{}...", cut)
}

/// Go's zero time means "never set"
pub fn timestamp(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(ts) if ts.year() > 1 => ts.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

/// Join rendered lines, ending with a newline
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AutoResponseVariant, JoinedGroup, ModifyType, UsageCounts, UsageLog};
    use chrono::TimeZone;
    use std::collections::HashMap;

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("héllo wörld ünïcode", 8), "héllo...");
    }

    #[test]
    fn test_timestamp_hides_zero_time() {
        let zero: DateTime<Utc> = "0001-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(timestamp(Some(zero)), "-");
        assert_eq!(timestamp(None), "-");

        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap();
        assert_eq!(timestamp(Some(ts)), "2024-05-01 10:15");
    }

    #[test]
    fn test_empty_collections() {
        assert!(groups(std::iter::empty()).starts_with("No groups registered"));
        assert_eq!(commands(std::iter::empty()), "No commands found.\n");
        assert_eq!(
            forbidden_words("1@g.us", &[]),
            "No forbidden words for 1@g.us.\n"
        );
    }

    #[test]
    fn test_auto_response_row_falls_back_to_media() {
        let sticker = AutoResponse {
            id: 1,
            keyword: "lol".into(),
            response_type: AutoResponseVariant::Sticker,
            text_response: None,
            sticker_path: Some("media/stickers/lol.webp".into()),
            audio_path: None,
            is_active: true,
            usage_count: 3,
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        };
        let table = auto_responses([&sticker]);
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("lol"));
        assert!(row.contains("sticker"));
        assert!(row.ends_with("media/stickers/lol.webp"));
    }

    #[test]
    fn test_stats_report() {
        let snapshot = UsageSnapshot {
            counts: UsageCounts {
                groups: 2,
                commands: 14,
                auto_responses: 5,
            },
            usage_stats: HashMap::from([(".ping".to_string(), 9), (".help".to_string(), 4)]),
            recent_logs: vec![UsageLog {
                id: 1,
                command_type: "learning_command".into(),
                command_value: ".ping".into(),
                group_jid: "1@g.us".into(),
                response_type: "text".into(),
                success: false,
                error_message: Some("send failed".into()),
                used_at: None,
            }],
            days: 7,
        };

        let report = stats(&snapshot, 1, 10);
        assert!(report.contains("Commands:       14"));
        assert!(report.contains("last 7 days: 2 distinct"));
        assert!(report.contains(".ping"));
        assert!(!report.contains(".help"));
        assert!(report.contains("failed"));
    }

    #[test]
    fn test_command_detail_ends_with_text() {
        let command = Command {
            id: 1,
            command: ".ping".into(),
            title: "Ping".into(),
            description: String::new(),
            response_type: crate::model::CommandVariant::Text,
            text_content: Some("pong".into()),
            media_file_path: None,
            caption: None,
            category: String::new(),
            is_active: true,
            usage_count: 0,
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        };
        let detail = command_detail(&command);
        assert!(detail.contains("Category:    -\n"));
        assert!(detail.ends_with("\n\npong\n"));
    }

    #[test]
    fn test_converter_row() {
        let converter = Converter {
            id: 1,
            command_name: ".xlvidio".into(),
            display_name: "XL Vidio".into(),
            bug_host: "quiz.vidio.com".into(),
            modify_type: ModifyType::Grpc,
            server_template: String::new(),
            host_template: String::new(),
            sni_template: String::new(),
            path_template: String::new(),
            grpc_service_name: "vidio".into(),
            port_override: None,
            is_active: false,
            usage_count: 8,
            created_by: "admin".into(),
            created_at: None,
            updated_at: None,
        };
        let table = converters([&converter]);
        assert_eq!(table.lines().count(), 3);
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with(".xlvidio"));
        assert!(row.contains("grpc"));
        assert!(row.ends_with('8'));
        assert_eq!(converters(std::iter::empty()), "No converters found.\n");
    }

    #[test]
    fn test_discovered_marks_registration() {
        let joined = JoinedGroup {
            jid: "9@g.us".into(),
            name: "Family".into(),
            participant_count: 4,
        };
        let table = discovered(&[Discovered {
            group: &joined,
            registered: false,
        }]);
        assert!(table.lines().nth(2).unwrap().ends_with("no"));
    }
}
