//! One-line summaries shown to the agent above each tool's JSON payload.

use crate::models::{Calendar, CalendarEvent, Folder, Note, Reminder, Timestamp};

const DATE_TIME: &str = "%Y-%m-%d %H:%M UTC";
const DATE: &str = "%Y-%m-%d";

fn date_time(ts: &Timestamp) -> String {
    ts.format(DATE_TIME).to_string()
}

/// Render a counted list as a header line followed by one bullet per item.
///
/// Example output:
/// ```text
/// Found 2 reminders:
/// - Renew passport (pending, flagged, priority 1)
/// - Call the plumber (completed)
/// ```
fn render_list<T>(noun: &str, items: &[T], line: impl Fn(&T) -> String) -> String {
    let mut output = format!("Found {} {}:", items.len(), noun);
    for item in items {
        output.push_str("\n- ");
        output.push_str(&line(item));
    }
    output
}

fn reminder_line(r: &Reminder) -> String {
    let mut state = String::from(if r.completed { "completed" } else { "pending" });
    if r.flagged {
        state.push_str(", flagged");
    }
    if r.priority > 0 {
        state.push_str(&format!(", priority {}", r.priority));
    }
    format!("{} ({})", r.name, state)
}

fn note_line(n: &Note) -> String {
    format!(
        "{} (in {}, created {}, modified {})",
        n.name,
        n.container.name,
        n.creation_date.format(DATE),
        n.modification_date.format(DATE)
    )
}

fn event_span(e: &CalendarEvent) -> String {
    format!("{} - {}", date_time(&e.start_date), date_time(&e.end_date))
}

fn event_line(e: &CalendarEvent) -> String {
    let mut line = format!("{} (in {}, {})", e.summary, e.calendar.name, event_span(e));
    if !e.location.is_empty() {
        line.push_str(" at ");
        line.push_str(&e.location);
    }
    line
}

fn calendar_line(c: &Calendar) -> String {
    let mut line = c.name.clone();
    if !c.description.is_empty() {
        line.push_str(&format!(" ({})", c.description));
    }
    if !c.writable {
        line.push_str(" (read-only)");
    }
    line
}

pub fn reminder_list(reminders: &[Reminder]) -> String {
    render_list("reminders", reminders, reminder_line)
}

pub fn reminder_created(r: &Reminder) -> String {
    format!("Created reminder {}: {}", r.id, r.name)
}

pub fn reminder_updated(r: &Reminder) -> String {
    format!("Updated reminder {}: {}", r.id, r.name)
}

pub fn reminder_completed(r: &Reminder) -> String {
    format!("Marked reminder {}: {} as completed", r.id, r.name)
}

pub fn reminder_flagged(r: &Reminder) -> String {
    let verb = if r.flagged { "Flagged" } else { "Unflagged" };
    format!("{} reminder {}: {}", verb, r.id, r.name)
}

pub fn reminder_priority(r: &Reminder) -> String {
    format!("Set priority of reminder {}: {} to {}", r.id, r.name, r.priority)
}

pub fn note_list(notes: &[Note]) -> String {
    render_list("notes", notes, note_line)
}

pub fn note_created(n: &Note) -> String {
    format!("Created note \"{}\" in {}", n.name, n.container.name)
}

pub fn note_updated(n: &Note) -> String {
    format!("Updated note \"{}\" in {}", n.name, n.container.name)
}

pub fn folder_list(folders: &[Folder]) -> String {
    render_list("folders", folders, |f| f.name.clone())
}

pub fn event_list(events: &[CalendarEvent]) -> String {
    render_list("events", events, event_line)
}

pub fn event_created(e: &CalendarEvent) -> String {
    format!("Created event \"{}\" in {} ({})", e.summary, e.calendar.name, event_span(e))
}

pub fn event_updated(e: &CalendarEvent) -> String {
    format!("Updated event \"{}\" in {} ({})", e.summary, e.calendar.name, event_span(e))
}

pub fn conflict_list(events: &[CalendarEvent]) -> String {
    render_list("conflicting events", events, event_line)
}

pub fn calendar_list(calendars: &[Calendar]) -> String {
    render_list("calendars", calendars, calendar_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerRef, EventStatus};
    use chrono::{TimeZone, Utc};

    fn make_reminder(name: &str, completed: bool, flagged: bool, priority: i64) -> Reminder {
        Reminder {
            id: format!("r-{}", name.len()),
            name: name.to_string(),
            body: String::new(),
            completed,
            completed_date: None,
            due_date: None,
            allday_due_date: None,
            remind_me_date: None,
            priority,
            flagged,
            creation_date: None,
            modification_date: None,
        }
    }

    fn make_event(summary: &str, location: &str) -> CalendarEvent {
        CalendarEvent {
            id: "E1".to_string(),
            name: summary.to_string(),
            body: String::new(),
            description: String::new(),
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap(),
            allday_event: false,
            recurrence: String::new(),
            sequence: 0,
            stamp_date: None,
            excluded_dates: vec![],
            status: EventStatus::Confirmed,
            summary: summary.to_string(),
            location: location.to_string(),
            uid: "E1".to_string(),
            url: String::new(),
            calendar: ContainerRef::new("c1", "Work"),
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(reminder_list(&[]), "Found 0 reminders:");
    }

    #[test]
    fn test_reminder_states() {
        let output = reminder_list(&[
            make_reminder("Renew passport", false, true, 1),
            make_reminder("Call the plumber", true, false, 0),
        ]);
        assert_eq!(
            output,
            "Found 2 reminders:\n- Renew passport (pending, flagged, priority 1)\n- Call the plumber (completed)"
        );
    }

    #[test]
    fn test_event_with_location() {
        let output = event_list(&[make_event("Standup", "Room 4"), make_event("Lunch", "")]);
        assert_eq!(
            output,
            "Found 2 events:\n\
             - Standup (in Work, 2024-03-01 09:00 UTC - 2024-03-01 10:30 UTC) at Room 4\n\
             - Lunch (in Work, 2024-03-01 09:00 UTC - 2024-03-01 10:30 UTC)"
        );
    }

    #[test]
    fn test_read_only_calendar() {
        let holidays = Calendar {
            id: "c9".to_string(),
            name: "Holidays".to_string(),
            body: "Public holidays".to_string(),
            description: "Public holidays".to_string(),
            writable: false,
        };
        assert_eq!(
            calendar_list(&[holidays]),
            "Found 1 calendars:\n- Holidays (Public holidays) (read-only)"
        );
    }

    #[test]
    fn test_unflagged_summary() {
        let r = make_reminder("Tax return", false, false, 0);
        assert_eq!(reminder_flagged(&r), format!("Unflagged reminder {}: Tax return", r.id));
    }
}
