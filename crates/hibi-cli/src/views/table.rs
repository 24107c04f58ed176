use chrono::NaiveDate;
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use hibi_core::models::{Task, UserProfile};
use hibi_core::view::{TaskRow, TaskView};
use hibi_core::weather::DailyForecast;

fn due_cell(due: Option<NaiveDate>, done: bool, today: NaiveDate) -> Cell {
    match due {
        Some(due) => {
            let cell = Cell::new(due.format("%Y-%m-%d").to_string());
            if done {
                cell
            } else if due < today {
                cell.fg(Color::Red) // Overdue
            } else if due == today {
                cell.fg(Color::Yellow) // Due today
            } else {
                cell
            }
        }
        None => Cell::new("None"),
    }
}

fn title_cell(text: String, done: bool) -> Cell {
    let cell = Cell::new(text);
    if done {
        cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey)
    } else {
        cell
    }
}

fn done_cell(task: &Task) -> Cell {
    match task.completed_at {
        Some(at) if task.done => Cell::new(format!("✓ {}", at.humanize())).fg(Color::Green),
        _ if task.done => Cell::new("✓").fg(Color::Green),
        _ => Cell::new(""),
    }
}

fn task_row(task: &Task, display_title: String, series: String, today: NaiveDate) -> Row {
    let mut row = Row::new();
    row.add_cell(Cell::new(task.id.to_string()));
    row.add_cell(title_cell(display_title, task.done));
    row.add_cell(done_cell(task));
    row.add_cell(due_cell(task.due_date, task.done, today));
    row.add_cell(Cell::new(series));
    row
}

fn progress(members: &[Task], head: Option<&Task>) -> String {
    let total = members.len() + usize::from(head.is_some());
    let done = members.iter().chain(head).filter(|t| t.done).count();
    format!("{}/{} done", done, total)
}

/// Renders a derived view. With `expand`, every series member gets its own
/// indented row under the series row.
pub fn display_view(view: &TaskView, expand: bool, today: NaiveDate) {
    if view.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Done", "Due Date", "Series"]);

    for row in &view.rows {
        match row {
            TaskRow::Standalone(task) => {
                table.add_row(task_row(task, task.title.clone(), String::new(), today));
            }
            TaskRow::SeriesHead { head, members } => {
                let label = format!("↻ {}", progress(members, Some(head)));
                table.add_row(task_row(head, format!("↻ {}", head.title), label, today));
            }
            TaskRow::OrphanGhost { series_id, members } => {
                let mut ghost = Row::new();
                ghost.add_cell(Cell::new(series_id.to_string()).fg(Color::DarkGrey));
                ghost.add_cell(Cell::new(format!("↻ {} (series head deleted)", row.title())).fg(Color::DarkGrey));
                ghost.add_cell(Cell::new(if row.is_done() { "✓" } else { "" }));
                ghost.add_cell(due_cell(row.due_date(), row.is_done(), today));
                ghost.add_cell(Cell::new(format!("↻ {}", progress(members, None))));
                table.add_row(ghost);
            }
        }

        if expand {
            for member in row.members() {
                table.add_row(task_row(member, format!("    {}", member.title), String::new(), today));
            }
        }
    }

    println!("{table}");
    println!("{} rows, {} tasks", view.rows.len(), view.task_count());
}

pub fn display_users(users: &[UserProfile]) {
    if users.is_empty() {
        println!("No profiles found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Email", "Display Name", "Created At"]);

    for user in users {
        let mut row = Row::new();
        row.add_cell(Cell::new(user.id.to_string()));
        row.add_cell(Cell::new(&user.email));
        row.add_cell(Cell::new(user.display_name.as_deref().unwrap_or("None")));
        row.add_cell(Cell::new(user.created_at.humanize()));
        table.add_row(row);
    }

    println!("{table}");
}

/// Human text for a weather label key ("weather.rain_light" -> "rain light").
pub fn weather_label(key: &str) -> String {
    key.trim_start_matches("weather.").replace('_', " ")
}

pub fn display_forecast(days: &[DailyForecast], today: NaiveDate) {
    if days.is_empty() {
        println!("No forecast days found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Weather", "Max", "Min"]);

    for day in days {
        let info = day.info();
        let mut date_cell = Cell::new(day.date.format("%Y-%m-%d").to_string());
        if day.date == today {
            date_cell = date_cell.add_attribute(Attribute::Bold);
        }
        let mut row = Row::new();
        row.add_cell(date_cell);
        row.add_cell(Cell::new(format!("{} {}", info.icon, weather_label(info.label))));
        row.add_cell(Cell::new(format!("{:.1}°", day.max)));
        row.add_cell(Cell::new(format!("{:.1}°", day.min)));
        table.add_row(row);
    }

    println!("{table}");
}
