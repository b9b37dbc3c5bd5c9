use std::str::FromStr;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rust_decimal::Decimal;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::{ApiError, ExpenseApi, NewExpense};
use crate::models::category::Category;
use crate::models::expense::{Expense, MonthlyStat};
use crate::store::session::{AuthToken, Session, SessionStore};

use super::pane::{FetchState, ListPane};

/// Top-level screens. Categories, All Expenses and Profile cycle with Tab;
/// the per-category expense list is pushed from Categories and popped with
/// Esc, carrying the category id as its navigation parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Login,
    Register,
    Categories,
    Expenses { category_id: i64, category_name: String },
    AllExpenses,
    Profile,
}

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Searching,
}

/// Blocking dialogs layered over the current screen. `Message` doubles as
/// the acknowledgment alert for validation and request failures.
#[derive(Debug, PartialEq)]
pub enum Modal {
    None,
    Message {
        title: String,
        body: String,
    },
    AddCategory {
        name: String,
    },
    ConfirmDeleteCategory {
        id: i64,
    },
    ExpenseForm {
        editing: Option<i64>,
        category_id: i64,
        description: String,
        amount: String,
        focus: usize,
    },
    ConfirmDeleteExpense {
        id: i64,
    },
}

impl Modal {
    fn message(title: &str, body: impl Into<String>) -> Self {
        Modal::Message {
            title: title.to_string(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: usize,
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub focus: usize,
}

/// Results of spawned backend calls, posted back to the UI loop.
///
/// Every variant carries the focus generation it was spawned under; a
/// result that arrives after the user left the screen carries a stale
/// generation and is dropped instead of touching a no-longer-visible view.
#[derive(Debug)]
pub enum AppEvent {
    LoginFinished {
        generation: u64,
        result: Result<AuthToken, ApiError>,
    },
    RegisterFinished {
        generation: u64,
        result: Result<(), ApiError>,
    },
    CategoriesLoaded {
        generation: u64,
        result: Result<Vec<Category>, ApiError>,
    },
    ExpensesLoaded {
        generation: u64,
        result: Result<Vec<Expense>, ApiError>,
    },
    StatsLoaded {
        generation: u64,
        result: Result<Vec<MonthlyStat>, ApiError>,
    },
    MutationFinished {
        generation: u64,
        result: Result<(), ApiError>,
    },
}

pub struct App {
    pub screen: Screen,
    pub session: Session,
    pub input_mode: InputMode,
    pub modal: Modal,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub register_notice: Option<String>,
    pub categories: ListPane<Category>,
    pub expenses: ListPane<Expense>,
    pub all_expenses: ListPane<Expense>,
    pub stats: Vec<MonthlyStat>,
    pub stats_state: FetchState,
    pub busy: bool,
    pub should_quit: bool,
    api: Arc<dyn ExpenseApi>,
    store: SessionStore,
    tx: UnboundedSender<AppEvent>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        api: Arc<dyn ExpenseApi>,
        store: SessionStore,
        session: Session,
        tx: UnboundedSender<AppEvent>,
    ) -> Self {
        let screen = match &session {
            Session::Authenticated(_) => Screen::Categories,
            Session::Unauthenticated => Screen::Login,
        };

        App {
            screen,
            session,
            input_mode: InputMode::Normal,
            modal: Modal::None,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            register_notice: None,
            categories: ListPane::new(),
            expenses: ListPane::new(),
            all_expenses: ListPane::new(),
            stats: Vec::new(),
            stats_state: FetchState::Idle,
            busy: false,
            should_quit: false,
            api,
            store,
            tx,
            generation: 0,
            in_flight: None,
        }
    }

    /// Kicks off the first focus cycle. Call once the runtime is up.
    pub fn start(&mut self) {
        self.on_focus();
    }

    /// Switches screens. Bumps the focus generation and aborts the pending
    /// read so a response for the old screen can never land on the new one.
    pub fn navigate(&mut self, screen: Screen) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.modal = Modal::None;
        self.input_mode = InputMode::Normal;
        self.busy = false;
        self.register_notice = None;
        self.screen = screen;
        self.on_focus();
    }

    /// Every list screen re-fetches on focus; the in-memory lists are a
    /// read-through cache, never incrementally maintained.
    fn on_focus(&mut self) {
        match self.screen.clone() {
            Screen::Login | Screen::Register => {}
            Screen::Categories => self.fetch_categories(),
            Screen::Expenses { category_id, .. } => self.fetch_expenses(Some(category_id)),
            Screen::AllExpenses => self.fetch_expenses(None),
            Screen::Profile => self.fetch_stats(),
        }
    }

    fn auth(&self) -> Option<AuthToken> {
        match &self.session {
            Session::Authenticated(token) => Some(token.clone()),
            Session::Unauthenticated => None,
        }
    }

    fn fetch_categories(&mut self) {
        let Some(auth) = self.auth() else {
            self.screen = Screen::Login;
            return;
        };
        self.categories.begin_loading();

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.categories(&auth).await;
            let _ = tx.send(AppEvent::CategoriesLoaded { generation, result });
        }));
    }

    fn fetch_expenses(&mut self, category_id: Option<i64>) {
        let Some(auth) = self.auth() else {
            self.screen = Screen::Login;
            return;
        };
        match category_id {
            Some(_) => self.expenses.begin_loading(),
            None => self.all_expenses.begin_loading(),
        }

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        self.in_flight = Some(tokio::spawn(async move {
            let result = match category_id {
                Some(id) => api.expenses_for_category(&auth, id).await,
                None => api.expenses_for_user(&auth).await,
            };
            let _ = tx.send(AppEvent::ExpensesLoaded { generation, result });
        }));
    }

    fn fetch_stats(&mut self) {
        let Some(auth) = self.auth() else {
            self.screen = Screen::Login;
            return;
        };
        self.stats.clear();
        self.stats_state = FetchState::Loading;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.monthly_totals(&auth).await;
            let _ = tx.send(AppEvent::StatsLoaded { generation, result });
        }));
    }

    pub fn submit_login(&mut self) {
        let email = self.login_form.email.trim().to_string();
        let password = self.login_form.password.clone();
        if email.is_empty() || password.is_empty() {
            self.modal = Modal::message("Validation", "Please enter email and password");
            return;
        }

        self.register_notice = None;
        self.busy = true;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.login(&email, &password).await;
            let _ = tx.send(AppEvent::LoginFinished { generation, result });
        }));
    }

    pub fn submit_register(&mut self) {
        let form = &self.register_form;
        if form.name.trim().is_empty()
            || form.email.trim().is_empty()
            || form.password.is_empty()
            || form.confirm.is_empty()
        {
            self.modal = Modal::message("Validation", "Please fill all fields");
            return;
        }
        if form.password != form.confirm {
            self.modal = Modal::message("Validation", "Password and confirmation do not match");
            return;
        }

        let name = form.name.trim().to_string();
        let email = form.email.trim().to_string();
        let password = form.password.clone();
        self.busy = true;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.register(&name, &email, &password).await;
            let _ = tx.send(AppEvent::RegisterFinished { generation, result });
        }));
    }

    pub fn submit_add_category(&mut self, name: String) {
        let name = name.trim().to_string();
        if name.is_empty() {
            self.modal = Modal::message("Validation", "Please enter category name");
            return;
        }
        let Some(auth) = self.auth() else {
            return;
        };

        self.modal = Modal::None;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = api.create_category(&auth, &name).await;
            let _ = tx.send(AppEvent::MutationFinished { generation, result });
        });
    }

    fn delete_category(&mut self, id: i64) {
        let Some(auth) = self.auth() else {
            return;
        };
        self.modal = Modal::None;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = api.delete_category(&auth, id).await;
            let _ = tx.send(AppEvent::MutationFinished { generation, result });
        });
    }

    pub fn submit_expense_form(&mut self) {
        let (editing, category_id, description, amount) = match &self.modal {
            Modal::ExpenseForm {
                editing,
                category_id,
                description,
                amount,
                ..
            } => (
                *editing,
                *category_id,
                description.trim().to_string(),
                amount.trim().to_string(),
            ),
            _ => return,
        };

        if description.is_empty() || amount.is_empty() {
            self.modal = Modal::message("Validation", "Please fill all fields");
            return;
        }
        let amount = match Decimal::from_str(&amount) {
            Ok(value) => value,
            Err(_) => {
                self.modal = Modal::message("Validation", "Amount must be a number");
                return;
            }
        };
        let Some(auth) = self.auth() else {
            return;
        };

        self.modal = Modal::None;
        let expense = NewExpense {
            description,
            amount,
            category_id,
        };
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = match editing {
                Some(id) => api.update_expense(&auth, id, &expense).await,
                None => api.create_expense(&auth, &expense).await,
            };
            let _ = tx.send(AppEvent::MutationFinished { generation, result });
        });
    }

    fn delete_expense(&mut self, id: i64) {
        let Some(auth) = self.auth() else {
            return;
        };
        self.modal = Modal::None;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = api.delete_expense(&auth, id).await;
            let _ = tx.send(AppEvent::MutationFinished { generation, result });
        });
    }

    pub fn logout(&mut self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!("Failed to clear session: {err}");
        }
        self.session = Session::Unauthenticated;
        self.navigate(Screen::Login);
    }

    /// Applies a finished backend call to the UI state. Results from a
    /// previous focus generation are discarded.
    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoginFinished { generation, result } => {
                if generation != self.generation {
                    return;
                }
                self.in_flight = None;
                self.busy = false;
                match result {
                    Ok(auth) => {
                        if let Err(err) = self.store.save(&auth) {
                            tracing::warn!("Failed to persist session: {err}");
                        }
                        self.session = Session::Authenticated(auth);
                        self.login_form = LoginForm::default();
                        self.navigate(Screen::Categories);
                    }
                    Err(err) => self.modal = Modal::message("Login failed", err.to_string()),
                }
            }
            AppEvent::RegisterFinished { generation, result } => {
                if generation != self.generation {
                    return;
                }
                self.in_flight = None;
                self.busy = false;
                match result {
                    Ok(()) => {
                        self.register_form = RegisterForm::default();
                        self.navigate(Screen::Login);
                        self.register_notice =
                            Some("Account created, please log in".to_string());
                    }
                    Err(err) => self.modal = Modal::message("Register failed", err.to_string()),
                }
            }
            AppEvent::CategoriesLoaded { generation, result } => {
                if generation != self.generation {
                    return;
                }
                self.in_flight = None;
                match result {
                    Ok(items) => self.categories.finish(items),
                    Err(err) => self.categories.fail(err.to_string()),
                }
            }
            AppEvent::ExpensesLoaded { generation, result } => {
                if generation != self.generation {
                    return;
                }
                self.in_flight = None;
                let pane = match self.screen {
                    Screen::Expenses { .. } => &mut self.expenses,
                    _ => &mut self.all_expenses,
                };
                match result {
                    Ok(items) => pane.finish(items),
                    Err(err) => pane.fail(err.to_string()),
                }
            }
            AppEvent::StatsLoaded { generation, result } => {
                if generation != self.generation {
                    return;
                }
                self.in_flight = None;
                match result {
                    Ok(stats) => {
                        self.stats = stats;
                        self.stats_state = FetchState::Ready;
                    }
                    Err(err) => {
                        self.stats = Vec::new();
                        self.stats_state = FetchState::Error(err.to_string());
                    }
                }
            }
            AppEvent::MutationFinished { generation, result } => {
                if generation != self.generation {
                    return;
                }
                match result {
                    // The view must reflect server state after every
                    // mutation: always a fresh read, never a local patch.
                    Ok(()) => self.on_focus(),
                    Err(err) => self.modal = Modal::message("Error", err.to_string()),
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.modal != Modal::None {
            self.handle_modal_key(key);
            return;
        }
        match self.input_mode {
            InputMode::Searching => self.handle_search_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => match self.screen {
                Screen::Categories => self.categories.pop_query(),
                Screen::Expenses { .. } => self.expenses.pop_query(),
                Screen::AllExpenses => self.all_expenses.pop_query(),
                _ => {}
            },
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Char(c) => match self.screen {
                Screen::Categories => self.categories.push_query(c),
                Screen::Expenses { .. } => self.expenses.push_query(c),
                Screen::AllExpenses => self.all_expenses.push_query(c),
                _ => {}
            },
            _ => {}
        }
    }

    fn select_next(&mut self) {
        match self.screen {
            Screen::Categories => self.categories.select_next(),
            Screen::Expenses { .. } => self.expenses.select_next(),
            Screen::AllExpenses => self.all_expenses.select_next(),
            _ => {}
        }
    }

    fn select_previous(&mut self) {
        match self.screen {
            Screen::Categories => self.categories.select_previous(),
            Screen::Expenses { .. } => self.expenses.select_previous(),
            Screen::AllExpenses => self.all_expenses.select_previous(),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match self.screen.clone() {
            Screen::Login => self.handle_login_key(key),
            Screen::Register => self.handle_register_key(key),
            Screen::Categories => self.handle_categories_key(key),
            Screen::Expenses { category_id, .. } => self.handle_expenses_key(key, Some(category_id)),
            Screen::AllExpenses => self.handle_expenses_key(key, None),
            Screen::Profile => self.handle_profile_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.navigate(Screen::Register);
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit_login(),
            KeyCode::Tab | KeyCode::Down => self.login_form.focus = (self.login_form.focus + 1) % 2,
            KeyCode::BackTab | KeyCode::Up => {
                self.login_form.focus = (self.login_form.focus + 1) % 2
            }
            KeyCode::Backspace => {
                let form = &mut self.login_form;
                match form.focus {
                    0 => form.email.pop(),
                    _ => form.password.pop(),
                };
            }
            KeyCode::Char(c) => {
                let form = &mut self.login_form;
                match form.focus {
                    0 => form.email.push(c),
                    _ => form.password.push(c),
                }
            }
            _ => {}
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.navigate(Screen::Login),
            KeyCode::Enter => self.submit_register(),
            KeyCode::Tab | KeyCode::Down => {
                self.register_form.focus = (self.register_form.focus + 1) % 4
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.register_form.focus = (self.register_form.focus + 3) % 4
            }
            KeyCode::Backspace => {
                self.register_field_mut().pop();
            }
            KeyCode::Char(c) => self.register_field_mut().push(c),
            _ => {}
        }
    }

    fn register_field_mut(&mut self) -> &mut String {
        let form = &mut self.register_form;
        match form.focus {
            0 => &mut form.name,
            1 => &mut form.email,
            2 => &mut form.password,
            _ => &mut form.confirm,
        }
    }

    fn handle_categories_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.navigate(Screen::AllExpenses),
            KeyCode::Char('/') => self.input_mode = InputMode::Searching,
            KeyCode::Char('r') => self.on_focus(),
            KeyCode::Char('a') => self.modal = Modal::AddCategory { name: String::new() },
            KeyCode::Char('d') => {
                if let Some(category) = self.categories.selected() {
                    self.modal = Modal::ConfirmDeleteCategory { id: category.id };
                }
            }
            KeyCode::Enter => {
                if let Some(category) = self.categories.selected() {
                    let screen = Screen::Expenses {
                        category_id: category.id,
                        category_name: category.name.clone(),
                    };
                    self.navigate(screen);
                }
            }
            KeyCode::Up => self.categories.select_previous(),
            KeyCode::Down => self.categories.select_next(),
            _ => {}
        }
    }

    fn handle_expenses_key(&mut self, key: KeyEvent, scope: Option<i64>) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if scope.is_some() {
                    self.navigate(Screen::Categories);
                }
            }
            KeyCode::Tab => {
                if scope.is_none() {
                    self.navigate(Screen::Profile);
                }
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Searching,
            KeyCode::Char('r') => self.on_focus(),
            KeyCode::Char('a') => {
                // Adding is scoped to a category, as on the original screen.
                if let Some(category_id) = scope {
                    self.modal = Modal::ExpenseForm {
                        editing: None,
                        category_id,
                        description: String::new(),
                        amount: String::new(),
                        focus: 0,
                    };
                }
            }
            KeyCode::Char('e') => {
                let pane = match scope {
                    Some(_) => &self.expenses,
                    None => &self.all_expenses,
                };
                if let Some(expense) = pane.selected() {
                    self.modal = Modal::ExpenseForm {
                        editing: Some(expense.id),
                        category_id: scope.unwrap_or(expense.category_id),
                        description: expense.description.clone(),
                        amount: expense.amount.to_string(),
                        focus: 0,
                    };
                }
            }
            KeyCode::Char('d') => {
                let pane = match scope {
                    Some(_) => &self.expenses,
                    None => &self.all_expenses,
                };
                if let Some(expense) = pane.selected() {
                    self.modal = Modal::ConfirmDeleteExpense { id: expense.id };
                }
            }
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            _ => {}
        }
    }

    fn handle_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.navigate(Screen::Categories),
            KeyCode::Char('r') => self.on_focus(),
            KeyCode::Char('l') => self.logout(),
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match &mut self.modal {
            Modal::None => {}
            Modal::Message { .. } => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.modal = Modal::None;
                }
            }
            Modal::AddCategory { name } => match key.code {
                KeyCode::Esc => self.modal = Modal::None,
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Enter => {
                    let name = name.clone();
                    self.submit_add_category(name);
                }
                KeyCode::Char(c) => name.push(c),
                _ => {}
            },
            Modal::ConfirmDeleteCategory { id } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let id = *id;
                    self.delete_category(id);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.modal = Modal::None,
                _ => {}
            },
            Modal::ConfirmDeleteExpense { id } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let id = *id;
                    self.delete_expense(id);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.modal = Modal::None,
                _ => {}
            },
            Modal::ExpenseForm {
                description,
                amount,
                focus,
                ..
            } => match key.code {
                KeyCode::Esc => self.modal = Modal::None,
                KeyCode::Enter => self.submit_expense_form(),
                KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab => {
                    *focus = (*focus + 1) % 2
                }
                KeyCode::Backspace => {
                    if *focus == 0 {
                        description.pop();
                    } else {
                        amount.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if *focus == 0 {
                        description.push(c);
                    } else {
                        amount.push(c);
                    }
                }
                _ => {}
            },
        }
    }
}
