use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use rust_decimal::Decimal;

use crate::models::expense::Expense;
use crate::store::session::Session;
use crate::ui::pane::{FetchState, ListPane};

use super::app::{App, InputMode, Modal, Screen};

pub fn render(f: &mut Frame, app: &App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(size);

    match &app.screen {
        Screen::Login => render_login(f, app, chunks[0]),
        Screen::Register => render_register(f, app, chunks[0]),
        Screen::Categories => render_categories(f, app, chunks[0]),
        Screen::Expenses { category_name, .. } => render_expense_list(
            f,
            app,
            &app.expenses,
            &format!("Expenses: {category_name}"),
            chunks[0],
        ),
        Screen::AllExpenses => {
            render_expense_list(f, app, &app.all_expenses, "Your Expenses", chunks[0])
        }
        Screen::Profile => render_profile(f, app, chunks[0]),
    }

    render_help_panel(f, app, chunks[1]);
    render_modal(f, app, size);
}

fn render_field(f: &mut Frame, title: &str, value: &str, focused: bool, secret: bool, area: Rect) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let shown = if secret {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };

    let field = Paragraph::new(shown).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style),
    );
    f.render_widget(field, area);
}

fn render_login(f: &mut Frame, app: &App, area: Rect) {
    let column = centered_rect(50, 70, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(column);

    let title = Paragraph::new("Expense Tracker")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    render_field(f, "Email", &app.login_form.email, app.login_form.focus == 0, false, chunks[1]);
    render_field(
        f,
        "Password",
        &app.login_form.password,
        app.login_form.focus == 1,
        true,
        chunks[2],
    );

    let status = if app.busy {
        Line::from(Span::styled("Logging in...", Style::default().fg(Color::Yellow)))
    } else if let Some(notice) = &app.register_notice {
        Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Green)))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[3]);
}

fn render_register(f: &mut Frame, app: &App, area: Rect) {
    let column = centered_rect(50, 90, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(column);

    let title = Paragraph::new("Create Account")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let form = &app.register_form;
    render_field(f, "Name", &form.name, form.focus == 0, false, chunks[1]);
    render_field(f, "Email", &form.email, form.focus == 1, false, chunks[2]);
    render_field(f, "Password", &form.password, form.focus == 2, true, chunks[3]);
    render_field(f, "Confirm Password", &form.confirm, form.focus == 3, true, chunks[4]);

    if app.busy {
        let status = Paragraph::new(Span::styled(
            "Registering...",
            Style::default().fg(Color::Yellow),
        ))
        .alignment(Alignment::Center);
        f.render_widget(status, chunks[5]);
    }
}

fn render_search_bar(f: &mut Frame, query: &str, active: bool, area: Rect) {
    let border_style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if query.is_empty() && !active {
        Line::from(Span::styled(
            "Press / to search",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(query.to_string())
    };

    let bar = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(border_style),
    );
    f.render_widget(bar, area);
}

fn render_status(f: &mut Frame, message: &str, area: Rect) {
    let status = Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(status, area);
}

fn render_error(f: &mut Frame, message: &str, area: Rect) {
    let error = Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    ))
    .block(Block::default().borders(Borders::ALL).title("Error"))
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center);
    f.render_widget(error, area);
}

fn render_categories(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    render_search_bar(
        f,
        &app.categories.query,
        app.input_mode == InputMode::Searching,
        chunks[0],
    );

    match &app.categories.state {
        FetchState::Idle | FetchState::Loading => {
            render_status(f, "Loading categories...", chunks[1])
        }
        FetchState::Error(message) => render_error(f, message, chunks[1]),
        FetchState::Ready => {
            if app.categories.items.is_empty() {
                render_status(f, "No categories found.", chunks[1]);
                return;
            }

            let items: Vec<ListItem> = app
                .categories
                .filtered
                .iter()
                .map(|&idx| app.categories.items[idx].to_list_item())
                .collect();

            let header = format!(
                "Your Categories ({} total, {} shown)",
                app.categories.items.len(),
                app.categories.filtered.len(),
            );

            let list = List::new(items)
                .block(Block::default().title(header).borders(Borders::ALL))
                .highlight_style(
                    Style::default()
                        .add_modifier(Modifier::REVERSED)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("➤ ");

            f.render_stateful_widget(list, chunks[1], &mut app.categories.list_state.clone());
        }
    }
}

fn render_expense_list(
    f: &mut Frame,
    app: &App,
    pane: &ListPane<Expense>,
    title: &str,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    render_search_bar(
        f,
        &pane.query,
        app.input_mode == InputMode::Searching,
        chunks[0],
    );

    match &pane.state {
        FetchState::Idle | FetchState::Loading => render_status(f, "Loading expenses...", chunks[1]),
        FetchState::Error(message) => render_error(f, message, chunks[1]),
        FetchState::Ready => {
            if pane.items.is_empty() {
                render_status(f, "No expenses found.", chunks[1]);
                return;
            }

            let items: Vec<ListItem> = pane
                .filtered
                .iter()
                .map(|&idx| pane.items[idx].to_list_item())
                .collect();

            let total_amount: Decimal = pane.items.iter().map(|e| e.amount).sum();
            let header = format!(
                "{title} ({} total, {} shown) Total: {:.2}",
                pane.items.len(),
                pane.filtered.len(),
                total_amount,
            );

            let list = List::new(items)
                .block(Block::default().title(header).borders(Borders::ALL))
                .highlight_style(
                    Style::default()
                        .add_modifier(Modifier::REVERSED)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("➤ ");

            f.render_stateful_widget(list, chunks[1], &mut pane.list_state.clone());
        }
    }
}

fn render_profile(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    let name = match &app.session {
        Session::Authenticated(auth) if !auth.display_name.is_empty() => auth.display_name.clone(),
        _ => "Signed in".to_string(),
    };
    let profile = Paragraph::new(Span::styled(
        name,
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().borders(Borders::ALL).title("Profile"));
    f.render_widget(profile, chunks[0]);

    match &app.stats_state {
        FetchState::Idle | FetchState::Loading => {
            render_status(f, "Loading monthly spending...", chunks[1])
        }
        FetchState::Error(message) => render_error(f, message, chunks[1]),
        FetchState::Ready => {
            if app.stats.is_empty() {
                render_status(f, "No spending data.", chunks[1]);
                return;
            }

            let items: Vec<ListItem> = app.stats.iter().map(|s| s.to_list_item()).collect();
            let total_amount: Decimal = app.stats.iter().map(|s| s.total_amount).sum();

            let list = List::new(items).block(
                Block::default()
                    .title(format!("Monthly Spending (Total: {total_amount:.2})"))
                    .borders(Borders::ALL),
            );
            f.render_widget(list, chunks[1]);
        }
    }
}

fn render_modal(f: &mut Frame, app: &App, area: Rect) {
    match &app.modal {
        Modal::None => {}
        Modal::Message { title, body } => {
            let text = vec![
                Line::from(body.clone()),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Enter", Style::default().fg(Color::Yellow)),
                    Span::raw(" dismiss"),
                ]),
            ];
            let popup = Paragraph::new(text)
                .block(
                    Block::default()
                        .title(title.clone())
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                )
                .wrap(Wrap { trim: true });

            let popup_area = centered_rect(50, 30, area);
            f.render_widget(Clear, popup_area);
            f.render_widget(popup, popup_area);
        }
        Modal::AddCategory { name } => {
            render_input_popup(
                f,
                "New Category (Enter to save, Esc to cancel)",
                name,
                "Enter category name...",
                area,
            );
        }
        Modal::ConfirmDeleteCategory { .. } => {
            render_confirm_popup(f, "Are you sure you want to delete this category?", area)
        }
        Modal::ConfirmDeleteExpense { .. } => {
            render_confirm_popup(f, "Are you sure you want to delete this expense?", area)
        }
        Modal::ExpenseForm {
            editing,
            description,
            amount,
            focus,
            ..
        } => {
            let popup_area = centered_rect(50, 45, area);
            f.render_widget(Clear, popup_area);

            let title = if editing.is_some() {
                "Edit Expense (Enter to save, Esc to cancel)"
            } else {
                "Add Expense (Enter to save, Esc to cancel)"
            };
            let frame_block = Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow));
            let inner = frame_block.inner(popup_area);
            f.render_widget(frame_block, popup_area);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Min(0),
                    ]
                    .as_ref(),
                )
                .split(inner);

            render_field(f, "Description", description, *focus == 0, false, chunks[0]);
            render_field(f, "Amount", amount, *focus == 1, false, chunks[1]);
        }
    }
}

fn render_input_popup(f: &mut Frame, title: &str, value: &str, placeholder: &str, area: Rect) {
    let input = Paragraph::new(if value.is_empty() {
        Line::from(placeholder).style(Style::default().fg(Color::DarkGray))
    } else {
        Line::from(value)
    })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(Color::Yellow)),
    );

    let popup_area = centered_rect(60, 10, area);
    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn render_confirm_popup(f: &mut Frame, question: &str, area: Rect) {
    let text = vec![
        Line::from(question.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Yellow)),
            Span::raw(" delete • "),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(" cancel"),
        ]),
    ];

    let popup = Paragraph::new(text)
        .block(
            Block::default()
                .title("Confirm Delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    let popup_area = centered_rect(50, 30, area);
    f.render_widget(Clear, popup_area);
    f.render_widget(popup, popup_area);
}

fn render_help_panel(f: &mut Frame, app: &App, area: Rect) {
    let entries: &[(&str, &str)] = if app.modal != Modal::None {
        &[("Enter", "Confirm"), ("Esc", "Cancel")]
    } else if app.input_mode == InputMode::Searching {
        &[("Esc", "Done"), ("Backspace", "Erase"), ("↑/↓", "Move")]
    } else {
        match &app.screen {
            Screen::Login => &[
                ("Enter", "Login"),
                ("Tab", "Next field"),
                ("Ctrl+r", "Register"),
                ("Esc", "Quit"),
            ],
            Screen::Register => &[
                ("Enter", "Register"),
                ("Tab", "Next field"),
                ("Esc", "Back"),
            ],
            Screen::Categories => &[
                ("↑/↓", "Move"),
                ("Enter", "Open"),
                ("a", "Add"),
                ("d", "Delete"),
                ("/", "Search"),
                ("r", "Refresh"),
                ("Tab", "View"),
                ("q", "Quit"),
            ],
            Screen::Expenses { .. } => &[
                ("↑/↓", "Move"),
                ("a", "Add"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("/", "Search"),
                ("r", "Refresh"),
                ("Esc", "Back"),
                ("q", "Quit"),
            ],
            Screen::AllExpenses => &[
                ("↑/↓", "Move"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("/", "Search"),
                ("r", "Refresh"),
                ("Tab", "View"),
                ("q", "Quit"),
            ],
            Screen::Profile => &[
                ("l", "Logout"),
                ("r", "Refresh"),
                ("Tab", "View"),
                ("q", "Quit"),
            ],
        }
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in entries.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" • "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw(format!(" {action}")));
    }

    let help = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Help "),
        )
        .alignment(Alignment::Center);

    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(layout[1])[1]
}
