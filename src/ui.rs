use crate::api::ApiClient;
use crate::app::{
    App, Counterpart, Dashboard, FormKind, FormModal, InputMode, Links, Modal, Screen, View,
};
use crate::format::{format_currency, format_shekels, initials};
use crate::forms::{salary_preview, FormState};
use crate::models::{Caregiver, Elderly};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

/// `percent` of `len`, computed wide so large terminals cannot overflow.
fn percent_of(len: u16, percent: u32) -> u16 {
    u16::try_from(u32::from(len) * percent / 100).unwrap_or(u16::MAX)
}

fn key_line(keys: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (key, label) in keys {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Red),
        ));
        spans.push(Span::raw(format!(": {} ", label)));
    }
    Line::from(spans)
}

fn get_legend(app: &App) -> Text<'static> {
    if app.is_busy() {
        return Text::from(Span::styled(
            " Working...",
            Style::default().fg(Color::Yellow),
        ));
    }
    let editing = [
        ("i", "Insert"),
        ("Tab", "Next Field"),
        ("Enter", "Submit"),
        ("Esc", "Cancel"),
    ];
    let inserting = [
        ("Esc", "Stop Typing"),
        ("Tab", "Next Field"),
        ("Enter", "Submit"),
    ];
    let line = match (&app.modal, &app.input_mode) {
        (_, InputMode::Insert) => key_line(&inserting),
        (Some(Modal::Form(_)), _) => key_line(&editing),
        (Some(Modal::ConfirmDelete(_)), _) => key_line(&[("y", "Delete"), ("n", "Cancel")]),
        (Some(Modal::Links(links)), _) if links.manage => key_line(&[
            ("j", "Down"),
            ("k", "Up"),
            ("Space", "Assign / Unassign"),
            ("Esc", "Close"),
        ]),
        (Some(_), _) => key_line(&[("j", "Down"), ("k", "Up"), ("Esc", "Close")]),
        (None, _) => match app.screen {
            Screen::Login => key_line(&[
                ("i", "Insert"),
                ("Tab", "Next Field"),
                ("Enter", "Login"),
                ("r", "Register"),
                ("q", "Quit"),
            ]),
            Screen::Register => key_line(&[
                ("i", "Insert"),
                ("Tab", "Next Field"),
                ("Enter", "Register"),
                ("Esc", "Back to Login"),
            ]),
            Screen::Home => key_line(&[
                ("c", "Caregivers"),
                ("e", "Elderly"),
                ("o", "Sign Out"),
                ("q", "Quit"),
            ]),
            Screen::Caregivers => key_line(&[
                ("j/k", "Move"),
                ("a", "Add"),
                ("s", "Salary"),
                ("d", "Delete"),
                ("p", "PDF"),
                ("v", "View Elderly"),
                ("g", "Assign"),
                ("e", "Elderly"),
                ("h", "Home"),
                ("q", "Quit"),
            ]),
            Screen::Elderly => key_line(&[
                ("j/k", "Move"),
                ("a", "Add"),
                ("d", "Delete"),
                ("t/T", "Add/View Tasks"),
                ("m/M", "Add/View Meds"),
                ("v", "View Caregivers"),
                ("g", "Assign"),
                ("c", "Caregivers"),
                ("h", "Home"),
                ("q", "Quit"),
            ]),
        },
    };
    let mut text = Text::from(line);
    if let Some(status) = &app.status {
        text.push_line(Line::from(Span::styled(
            format!(" {}", status),
            Style::default().fg(Color::Cyan),
        )));
    }
    text
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    client: &ApiClient,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        // Queued work runs after the frame showing its loading state.
        if let Some(action) = app.pending.take() {
            app.perform(action, client).await;
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_input(key) {
                    return Ok(());
                }
            }
        }
    }
}

fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    f.render_widget(header(app), chunks[0]);

    let body = chunks[1];
    match app.screen {
        Screen::Login | Screen::Register => draw_auth(f, app, body),
        Screen::Home => draw_home(f, app, body),
        Screen::Caregivers => draw_caregivers(f, &mut app.caregivers, body),
        Screen::Elderly => draw_elderly(f, &mut app.elderly, body),
    }

    if let Some(modal) = &mut app.modal {
        draw_modal(f, modal, &app.input_mode, body);
    }

    let legend = Paragraph::new(get_legend(app))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(legend, chunks[2]);
}

fn header(app: &App) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(
        " Elder Care Manager ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(user) = &app.user {
        spans.push(Span::raw(format!(
            "  [{}] {} <{}>",
            initials(&user.full_name),
            user.full_name,
            user.email
        )));
    }
    Paragraph::new(Line::from(spans))
}

fn form_lines(form: &FormState, input_mode: &InputMode) -> Vec<Line<'static>> {
    form.fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let active = i == form.active;
            let label_style = if active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            let mut value = field.display();
            if active && matches!(input_mode, InputMode::Insert) {
                value.push('_');
            }
            Line::from(vec![
                Span::styled(if active { ">> " } else { "   " }, label_style),
                Span::styled(format!("{}: ", field.label), label_style),
                Span::raw(value),
            ])
        })
        .collect()
}

fn message_line(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(color)))
}

fn draw_auth(f: &mut Frame, app: &App, area: Rect) {
    let (title, form) = match app.screen {
        Screen::Register => ("Create Account", &app.register_form),
        _ => ("Login", &app.login_form),
    };

    let mut lines = Vec::new();
    if let Some(notice) = &app.notice {
        lines.push(message_line(notice, Color::Green));
        lines.push(Line::default());
    }
    lines.extend(form_lines(form, &app.input_mode));
    if let Some(err) = &app.auth_error {
        lines.push(Line::default());
        lines.push(message_line(err, Color::Red));
    }

    let height = lines.len() as u16 + 2;
    let popup = centered_rect_absolute(60, height, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(Color::White))
            .block(block)
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn draw_home(f: &mut Frame, app: &App, area: Rect) {
    let name = app
        .user
        .as_ref()
        .map(|u| u.full_name.as_str())
        .unwrap_or("there");
    let lines = vec![
        Line::from(Span::styled(
            format!("Welcome, {}", name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        key_line(&[("c", "Manage caregivers")]),
        key_line(&[("e", "Manage elderly clients")]),
        key_line(&[("o", "Sign out")]),
    ];
    let popup = centered_rect_absolute(50, lines.len() as u16 + 2, area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().title("Home").borders(Borders::ALL)),
        popup,
    );
}

/// Draws the loading or error placeholder; returns false when the table
/// itself should be drawn.
fn draw_placeholder<T>(
    f: &mut Frame,
    dashboard: &Dashboard<T>,
    block: Block<'static>,
    what: &str,
    area: Rect,
) -> bool {
    let text = match dashboard.view() {
        View::Loading => message_line(&format!("Loading {}...", what), Color::Yellow),
        View::Failed(err) => message_line(&format!("Error: {}", err), Color::Red),
        View::Ready if dashboard.items.is_empty() => message_line(
            &format!("No {} found. Press a to add one.", what),
            Color::Gray,
        ),
        View::Ready => return false,
    };
    f.render_widget(Paragraph::new(text).block(block), area);
    true
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

fn draw_caregivers(f: &mut Frame, dashboard: &mut Dashboard<Caregiver>, area: Rect) {
    let block = Block::default().title("Caregivers").borders(Borders::ALL);
    if draw_placeholder(f, dashboard, block.clone(), "caregivers", area) {
        return;
    }

    let rows: Vec<Row> = dashboard
        .items
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(c.display_id().to_string()),
                Cell::from(c.name.clone()),
                Cell::from(c.bank_name.clone()),
                Cell::from(format!("{} / {}", c.branch_number, c.bank_account)),
                Cell::from(format_currency(c.salary.price)),
                Cell::from(format_currency(c.saturday.price)),
                Cell::from(format_currency(c.allowance.price)),
                Cell::from(format_currency(c.card_total())),
                Cell::from(c.assignments.len().to_string()),
            ])
        })
        .collect();

    let header = Row::new(vec![
        "ID", "Name", "Bank", "Branch / Acct", "Salary", "Saturday", "Allowance", "Total",
        "Elderly",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let widths = [
        Constraint::Length(6),
        Constraint::Min(14),
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(12),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(highlight())
        .highlight_symbol(">> ");
    f.render_stateful_widget(table, area, &mut dashboard.state);
}

fn draw_elderly(f: &mut Frame, dashboard: &mut Dashboard<Elderly>, area: Rect) {
    let block = Block::default().title("Elderly").borders(Borders::ALL);
    if draw_placeholder(f, dashboard, block.clone(), "elderly clients", area) {
        return;
    }

    let rows: Vec<Row> = dashboard
        .items
        .iter()
        .map(|e| {
            Row::new(vec![
                e.display_id().to_string(),
                e.name.clone(),
                e.assignments.len().to_string(),
                e.tasks.len().to_string(),
                e.medications.len().to_string(),
            ])
        })
        .collect();

    let header = Row::new(vec!["ID", "Name", "Caregivers", "Tasks", "Medications"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(6),
        Constraint::Min(16),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(highlight())
        .highlight_symbol(">> ");
    f.render_stateful_widget(table, area, &mut dashboard.state);
}

fn draw_modal(f: &mut Frame, modal: &mut Modal, input_mode: &InputMode, area: Rect) {
    match modal {
        Modal::Form(form) => draw_form_modal(f, form, input_mode, area),
        Modal::ConfirmDelete(target) => {
            let lines = vec![
                Line::from(format!("Are you sure you want to delete {}?", target.name)),
                Line::from("This also removes their assignments."),
            ];
            draw_popup(f, "Confirm Delete", lines, Color::Red, area);
        }
        Modal::Tasks(elderly) => {
            let lines = if elderly.tasks.is_empty() {
                vec![Line::from("No tasks yet.")]
            } else {
                elderly
                    .tasks
                    .iter()
                    .map(|t| {
                        Line::from(vec![
                            Span::styled(
                                format!("[{}] ", t.status.label()),
                                Style::default().fg(Color::Yellow),
                            ),
                            Span::raw(t.description.clone()),
                        ])
                    })
                    .collect()
            };
            draw_popup(
                f,
                &format!("Tasks - {}", elderly.name),
                lines,
                Color::Green,
                area,
            );
        }
        Modal::Medications(elderly) => {
            let lines = if elderly.medications.is_empty() {
                vec![Line::from("No medications recorded.")]
            } else {
                elderly
                    .medications
                    .iter()
                    .map(|m| {
                        Line::from(vec![
                            Span::styled(
                                m.name.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::raw(format!("  {}, {}", m.dosage, m.frequency)),
                        ])
                    })
                    .collect()
            };
            draw_popup(
                f,
                &format!("Medications - {}", elderly.name),
                lines,
                Color::Green,
                area,
            );
        }
        Modal::Links(links) => draw_links(f, links, area),
    }
}

fn draw_popup(f: &mut Frame, title: &str, lines: Vec<Line<'static>>, color: Color, area: Rect) {
    let width = percent_of(area.width, 60).max(40);
    let height = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2);
    let popup = centered_rect_absolute(width, height, area);
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .style(Style::default().fg(color));
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(Color::White))
            .block(block)
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn draw_form_modal(f: &mut Frame, modal: &FormModal, input_mode: &InputMode, area: Rect) {
    let mut lines = form_lines(&modal.form, input_mode);
    if let FormKind::UpdateSalary(caregiver) = &modal.kind {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("Total Salary: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format_shekels(salary_preview(&modal.form).preview_total())),
        ]));
        lines.push(Line::from(format!(
            "Current bank total: {}",
            format_shekels(caregiver.total_bank)
        )));
    }
    if modal.busy {
        lines.push(Line::default());
        lines.push(message_line("Saving...", Color::Yellow));
    }
    if let Some(err) = &modal.error {
        lines.push(Line::default());
        lines.push(message_line(err, Color::Red));
    }
    draw_popup(f, &modal.title(), lines, Color::Green, area);
}

fn counterpart_item(entry: &Counterpart, manage: bool) -> ListItem<'static> {
    let mut spans = Vec::new();
    if manage {
        let (mark, color) = if entry.assigned {
            ("[x] ", Color::Green)
        } else {
            ("[ ] ", Color::Gray)
        };
        spans.push(Span::styled(mark, Style::default().fg(color)));
    }
    spans.push(Span::styled(
        format!("#{} ", entry.display_id),
        Style::default().fg(Color::Yellow),
    ));
    spans.push(Span::raw(entry.name.clone()));
    ListItem::new(Line::from(spans))
}

fn draw_links(f: &mut Frame, links: &mut Links, area: Rect) {
    let height = u16::try_from(links.entries.len())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .max(5)
        .min(area.height);
    let width = percent_of(area.width, 60).max(40);
    let popup = centered_rect_absolute(width, height, area);
    let block = Block::default()
        .title(links.title())
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    f.render_widget(Clear, popup);

    let placeholder = if links.loading {
        Some(message_line("Loading...", Color::Yellow))
    } else if links.entries.is_empty() {
        Some(message_line("Nothing assigned yet.", Color::Gray))
    } else {
        None
    };

    let inner = block.inner(popup);
    f.render_widget(block, popup);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(inner);

    match placeholder {
        Some(line) => f.render_widget(Paragraph::new(line), parts[0]),
        None => {
            let items: Vec<ListItem> = links
                .entries
                .iter()
                .map(|e| counterpart_item(e, links.manage))
                .collect();
            let list = List::new(items)
                .style(Style::default().fg(Color::White))
                .highlight_style(highlight())
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, parts[0], &mut links.state);
        }
    }

    if let Some(err) = &links.error {
        f.render_widget(Paragraph::new(message_line(err, Color::Red)), parts[1]);
    }
}
