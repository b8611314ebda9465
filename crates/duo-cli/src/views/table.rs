use chrono::Utc;
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use duo_core::models::{DayTask, EventOccurrence, Member, MemberSummary, MonthlySummary, Overlay};

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub fn display_members(members: &[Member]) {
    if members.is_empty() {
        println!("No members found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Joined"]);
    for member in members {
        let mut row = Row::new();
        row.add_cell(Cell::new(member.id.to_string()));
        row.add_cell(Cell::new(&member.display_name));
        row.add_cell(Cell::new(member.created_at.humanize()));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_day(tasks: &[DayTask]) {
    if tasks.is_empty() {
        println!("No tasks due.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Task", "Status", "Details"]);

    for day_task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&day_task.task.id)));

        let mut title = String::new();
        if day_task.task.is_recurring() {
            title.push_str("↻ ");
        }
        title.push_str(&day_task.task.title);

        match &day_task.overlay {
            Overlay::Completion(completion) => {
                row.add_cell(
                    Cell::new(title)
                        .add_attribute(Attribute::CrossedOut)
                        .fg(Color::DarkGrey),
                );
                row.add_cell(Cell::new("Done").fg(Color::Green));
                row.add_cell(Cell::new(format!(
                    "by {} {} ({})",
                    completion.completed_by_name,
                    completion.completed_at.humanize(),
                    short_id(&completion.id)
                )));
            }
            Overlay::Exception(exception) => {
                row.add_cell(Cell::new(title).fg(Color::DarkGrey));
                row.add_cell(Cell::new("Skipped").fg(Color::DarkGrey));
                row.add_cell(Cell::new(format!("exception {}", short_id(&exception.id))));
            }
            Overlay::None => {
                let overdue = day_task.date < Utc::now().date_naive();
                let title_cell = if overdue {
                    Cell::new(title).fg(Color::Red)
                } else {
                    Cell::new(title).add_attribute(Attribute::Bold)
                };
                row.add_cell(title_cell);
                row.add_cell(Cell::new("Due"));
                row.add_cell(Cell::new(day_task.task.description.as_deref().unwrap_or("")));
            }
        }
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_occurrences(occurrences: &[EventOccurrence]) {
    if occurrences.is_empty() {
        println!("No events found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Event", "Starts (UTC)", "Ends (UTC)"]);

    for occurrence in occurrences {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&occurrence.event.id)));

        let mut title = occurrence.event.title.clone();
        if occurrence.event.is_recurring() {
            title.insert_str(0, "↻ ");
        }
        row.add_cell(Cell::new(title));

        let format = if occurrence.event.is_all_day { "%a %Y-%m-%d" } else { "%a %Y-%m-%d %H:%M" };
        row.add_cell(Cell::new(occurrence.occurrence_start.format(format)));
        row.add_cell(Cell::new(occurrence.occurrence_end.format(format)));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_member_counts(members: &[MemberSummary]) {
    let mut table = Table::new();
    table.set_header(vec!["Member", "Completed"]);
    for member in members {
        let mut row = Row::new();
        row.add_cell(Cell::new(&member.display_name));
        row.add_cell(Cell::new(member.completed));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_summary(summary: &MonthlySummary) {
    println!("{}-{:02}", summary.year, summary.month);

    let rate = if summary.total_planned == 0 {
        0.0
    } else {
        summary.total_completed as f64 * 100.0 / summary.total_planned as f64
    };
    println!(
        "Planned: {}  Completed: {}  ({:.0}%)",
        summary.total_planned, summary.total_completed, rate
    );

    display_member_counts(&summary.members);
}
