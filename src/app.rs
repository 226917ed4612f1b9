use crate::api::assignments::{
    caregivers_for_elderly, caregivers_with_status, create_assignment, delete_assignment,
    elderly_for_caregiver, elderly_with_status,
};
use crate::api::auth::{current_user, login, logout, register};
use crate::api::caregivers::{
    create_caregiver, delete_caregiver, fetch_caregivers, generate_caregiver_pdf,
    update_caregiver_salary,
};
use crate::api::elderly::{
    add_medication, add_task, create_elderly, delete_elderly, fetch_elderly_list,
};
use crate::api::ApiClient;
use crate::download::save_pdf;
use crate::error::ApiError;
use crate::forms::{
    validate_caregiver, validate_elderly, validate_login, validate_medication, validate_register,
    validate_salary, validate_task, FieldKind, FormState,
};
use crate::models::{
    Caregiver, Credentials, Elderly, NewCaregiver, NewElderly, NewMedication, NewTask,
    Registration, SalaryUpdate, User,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::{ListState, TableState};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Home,
    Caregivers,
    Elderly,
}

pub enum InputMode {
    Normal,
    Editing,
    Insert,
}

/// Which side of the caregiver/elderly relation an operation starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Caregiver,
    Elderly,
}

/// What a dashboard should render.
#[derive(Debug, PartialEq)]
pub enum View<'a> {
    Loading,
    Failed(&'a str),
    Ready,
}

pub struct Dashboard<T> {
    pub items: Vec<T>,
    pub state: TableState,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Dashboard<T> {
    fn new() -> Dashboard<T> {
        Dashboard {
            items: Vec::new(),
            state: TableState::default(),
            loading: false,
            error: None,
        }
    }

    pub fn view(&self) -> View<'_> {
        if self.loading {
            View::Loading
        } else if let Some(err) = &self.error {
            View::Failed(err)
        } else {
            View::Ready
        }
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        let selected = match self.state.selected() {
            _ if self.items.is_empty() => None,
            Some(i) => Some(i.min(self.items.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub enum FormKind {
    AddCaregiver,
    UpdateSalary(Caregiver),
    AddElderly,
    AddTask { elderly_id: u64, name: String },
    AddMedication { elderly_id: u64, name: String },
}

pub struct FormModal {
    pub kind: FormKind,
    pub form: FormState,
    pub error: Option<String>,
    pub busy: bool,
}

impl FormModal {
    fn new(kind: FormKind) -> FormModal {
        let form = match &kind {
            FormKind::AddCaregiver => FormState::caregiver(),
            FormKind::UpdateSalary(c) => FormState::salary(&SalaryUpdate::from_caregiver(c)),
            FormKind::AddElderly => FormState::elderly(),
            FormKind::AddTask { .. } => FormState::task(),
            FormKind::AddMedication { .. } => FormState::medication(),
        };
        FormModal {
            kind,
            form,
            error: None,
            busy: false,
        }
    }

    pub fn title(&self) -> String {
        match &self.kind {
            FormKind::AddCaregiver => "Add New Caregiver".to_string(),
            FormKind::UpdateSalary(c) => format!("Update Salary - {}", c.name),
            FormKind::AddElderly => "Add New Elderly".to_string(),
            FormKind::AddTask { name, .. } => format!("Add Task for {}", name),
            FormKind::AddMedication { name, .. } => format!("Add Medication for {}", name),
        }
    }

    fn submission(&self) -> Result<Submission, ApiError> {
        Ok(match &self.kind {
            FormKind::AddCaregiver => Submission::Caregiver(validate_caregiver(&self.form)?),
            FormKind::UpdateSalary(c) => Submission::Salary(c.id, validate_salary(&self.form)?),
            FormKind::AddElderly => Submission::Elderly(validate_elderly(&self.form)?),
            FormKind::AddTask { elderly_id, .. } => {
                Submission::Task(*elderly_id, validate_task(&self.form)?)
            }
            FormKind::AddMedication { elderly_id, .. } => {
                Submission::Medication(*elderly_id, validate_medication(&self.form)?)
            }
        })
    }
}

pub struct DeleteTarget {
    pub side: Side,
    pub id: u64,
    pub name: String,
}

/// One counterpart row in a view or manage modal.
#[derive(Clone, Debug, PartialEq)]
pub struct Counterpart {
    pub id: u64,
    pub display_id: u64,
    pub name: String,
    pub assigned: bool,
}

impl From<&Elderly> for Counterpart {
    fn from(e: &Elderly) -> Counterpart {
        Counterpart {
            id: e.id,
            display_id: e.display_id(),
            name: e.name.clone(),
            assigned: true,
        }
    }
}

impl From<&Caregiver> for Counterpart {
    fn from(c: &Caregiver) -> Counterpart {
        Counterpart {
            id: c.id,
            display_id: c.display_id(),
            name: c.name.clone(),
            assigned: true,
        }
    }
}

/// Linked records for one caregiver or elderly client. In manage mode every
/// counterpart is listed with its assignment flag and can be toggled.
pub struct Links {
    pub side: Side,
    pub owner_id: u64,
    pub owner_name: String,
    pub manage: bool,
    pub entries: Vec<Counterpart>,
    pub state: ListState,
    pub loading: bool,
    pub error: Option<String>,
}

impl Links {
    pub fn new(side: Side, owner_id: u64, owner_name: String, manage: bool) -> Links {
        Links {
            side,
            owner_id,
            owner_name,
            manage,
            entries: Vec::new(),
            state: ListState::default(),
            loading: true,
            error: None,
        }
    }

    pub fn title(&self) -> String {
        match (self.side, self.manage) {
            (Side::Caregiver, false) => format!("Elderly assigned to {}", self.owner_name),
            (Side::Caregiver, true) => format!("Assign Elderly to {}", self.owner_name),
            (Side::Elderly, false) => format!("Caregivers assigned to {}", self.owner_name),
            (Side::Elderly, true) => format!("Assign Caregivers to {}", self.owner_name),
        }
    }

    fn set_entries(&mut self, entries: Vec<Counterpart>) {
        self.entries = entries;
        let selected = match self.state.selected() {
            _ if self.entries.is_empty() => None,
            Some(i) => Some(i.min(self.entries.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    fn move_by(&mut self, forward: bool) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().unwrap_or(0);
        let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
        self.state.select(Some(next));
    }

    /// The (caregiver_id, elderly_id) pair for the highlighted entry.
    fn selected_pair(&self) -> Option<(u64, u64, bool)> {
        let entry = self.entries.get(self.state.selected()?)?;
        Some(match self.side {
            Side::Caregiver => (self.owner_id, entry.id, entry.assigned),
            Side::Elderly => (entry.id, self.owner_id, entry.assigned),
        })
    }
}

pub enum Modal {
    Form(FormModal),
    ConfirmDelete(DeleteTarget),
    Tasks(Elderly),
    Medications(Elderly),
    Links(Links),
}

pub enum Submission {
    Caregiver(NewCaregiver),
    Salary(u64, SalaryUpdate),
    Elderly(NewElderly),
    Task(u64, NewTask),
    Medication(u64, NewMedication),
}

/// Network work queued by a key press, run after the next frame is drawn.
pub enum Action {
    CheckSession,
    SignOut,
    Login(Credentials),
    Register(Registration),
    LoadCaregivers,
    LoadElderly,
    Submit(Submission),
    Delete(Side, u64),
    GeneratePdf(Caregiver),
    LoadLinks,
    ToggleLink {
        caregiver_id: u64,
        elderly_id: u64,
        assign: bool,
    },
}

pub struct App {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub login_form: FormState,
    pub register_form: FormState,
    pub auth_error: Option<String>,
    pub notice: Option<String>,
    pub user: Option<User>,
    pub caregivers: Dashboard<Caregiver>,
    pub elderly: Dashboard<Elderly>,
    pub modal: Option<Modal>,
    pub status: Option<String>,
    pub pending: Option<Action>,
    pub download_dir: PathBuf,
}

impl App {
    /// Starts on Home when a token is stored (verified on the first tick),
    /// on Login otherwise.
    pub fn new(user: Option<User>, signed_in: bool, download_dir: PathBuf) -> App {
        let mut app = App {
            screen: Screen::Login,
            input_mode: InputMode::Editing,
            login_form: FormState::login(),
            register_form: FormState::register(),
            auth_error: None,
            notice: None,
            user,
            caregivers: Dashboard::new(),
            elderly: Dashboard::new(),
            modal: None,
            status: None,
            pending: None,
            download_dir,
        };
        if signed_in {
            app.screen = Screen::Home;
            app.input_mode = InputMode::Normal;
            app.pending = Some(Action::CheckSession);
        }
        app
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    fn go_to_login(&mut self, notice: Option<String>) {
        self.screen = Screen::Login;
        self.input_mode = InputMode::Editing;
        self.login_form = FormState::login();
        self.modal = None;
        self.user = None;
        self.caregivers = Dashboard::new();
        self.elderly = Dashboard::new();
        self.notice = notice;
        self.auth_error = None;
    }

    fn open_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = InputMode::Normal;
        self.status = None;
        match screen {
            Screen::Caregivers => {
                self.caregivers.loading = true;
                self.pending = Some(Action::LoadCaregivers);
            }
            Screen::Elderly => {
                self.elderly.loading = true;
                self.pending = Some(Action::LoadElderly);
            }
            _ => {}
        }
    }

    fn open_form(&mut self, kind: FormKind) {
        self.modal = Some(Modal::Form(FormModal::new(kind)));
        self.input_mode = InputMode::Editing;
    }

    fn open_links(&mut self, side: Side, owner_id: u64, owner_name: String, manage: bool) {
        self.modal = Some(Modal::Links(Links::new(side, owner_id, owner_name, manage)));
        self.pending = Some(Action::LoadLinks);
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    /// Returns true when the app should quit.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        if self.is_busy() {
            return false;
        }
        if let Some(modal) = self.modal.take() {
            self.modal = self.modal_input(modal, key);
            return false;
        }
        match self.screen {
            Screen::Login | Screen::Register => self.auth_input(key),
            Screen::Home => self.home_input(key),
            Screen::Caregivers => self.caregivers_input(key),
            Screen::Elderly => self.elderly_input(key),
        }
    }

    fn auth_input(&mut self, key: KeyEvent) -> bool {
        let on_login = self.screen == Screen::Login;
        let form = if on_login {
            &mut self.login_form
        } else {
            &mut self.register_form
        };
        match self.input_mode {
            InputMode::Insert => match key.code {
                KeyCode::Esc => self.input_mode = InputMode::Editing,
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                KeyCode::Backspace => form.pop(),
                KeyCode::Enter => self.submit_auth(),
                KeyCode::Char(c) => form.push(c),
                _ => {}
            },
            _ => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('i') => self.input_mode = InputMode::Insert,
                KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => form.next_field(),
                KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => form.previous_field(),
                KeyCode::Enter => self.submit_auth(),
                KeyCode::Char('r') if on_login => {
                    self.screen = Screen::Register;
                    self.register_form = FormState::register();
                    self.auth_error = None;
                    self.notice = None;
                }
                KeyCode::Esc if !on_login => {
                    self.screen = Screen::Login;
                    self.auth_error = None;
                }
                _ => {}
            },
        }
        false
    }

    fn submit_auth(&mut self) {
        let action = if self.screen == Screen::Login {
            validate_login(&self.login_form).map(Action::Login)
        } else {
            validate_register(&self.register_form).map(Action::Register)
        };
        match action {
            Ok(action) => {
                self.auth_error = None;
                self.pending = Some(action);
            }
            Err(err) => self.auth_error = Some(err.to_string()),
        }
    }

    fn home_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') => self.open_screen(Screen::Caregivers),
            KeyCode::Char('e') => self.open_screen(Screen::Elderly),
            KeyCode::Char('o') => self.pending = Some(Action::SignOut),
            _ => {}
        }
        false
    }

    fn caregivers_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => self.caregivers.next(),
            KeyCode::Char('k') | KeyCode::Up => self.caregivers.previous(),
            KeyCode::Char('r') => self.open_screen(Screen::Caregivers),
            KeyCode::Char('e') => self.open_screen(Screen::Elderly),
            KeyCode::Char('h') | KeyCode::Esc => self.open_screen(Screen::Home),
            KeyCode::Char('a') => self.open_form(FormKind::AddCaregiver),
            _ => {
                let Some(caregiver) = self.caregivers.selected().cloned() else {
                    return false;
                };
                match key.code {
                    KeyCode::Char('s') => self.open_form(FormKind::UpdateSalary(caregiver)),
                    KeyCode::Char('d') => {
                        self.modal = Some(Modal::ConfirmDelete(DeleteTarget {
                            side: Side::Caregiver,
                            id: caregiver.id,
                            name: caregiver.name,
                        }))
                    }
                    KeyCode::Char('p') => {
                        self.status = Some(format!("Generating PDF for {}...", caregiver.name));
                        self.pending = Some(Action::GeneratePdf(caregiver));
                    }
                    KeyCode::Char('v') | KeyCode::Enter => {
                        self.open_links(Side::Caregiver, caregiver.id, caregiver.name, false)
                    }
                    KeyCode::Char('g') => {
                        self.open_links(Side::Caregiver, caregiver.id, caregiver.name, true)
                    }
                    _ => {}
                }
            }
        }
        false
    }

    fn elderly_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => self.elderly.next(),
            KeyCode::Char('k') | KeyCode::Up => self.elderly.previous(),
            KeyCode::Char('r') => self.open_screen(Screen::Elderly),
            KeyCode::Char('c') => self.open_screen(Screen::Caregivers),
            KeyCode::Char('h') | KeyCode::Esc => self.open_screen(Screen::Home),
            KeyCode::Char('a') => self.open_form(FormKind::AddElderly),
            _ => {
                let Some(elderly) = self.elderly.selected().cloned() else {
                    return false;
                };
                match key.code {
                    KeyCode::Char('d') => {
                        self.modal = Some(Modal::ConfirmDelete(DeleteTarget {
                            side: Side::Elderly,
                            id: elderly.id,
                            name: elderly.name,
                        }))
                    }
                    KeyCode::Char('t') => self.open_form(FormKind::AddTask {
                        elderly_id: elderly.id,
                        name: elderly.name,
                    }),
                    KeyCode::Char('T') => self.modal = Some(Modal::Tasks(elderly)),
                    KeyCode::Char('m') => self.open_form(FormKind::AddMedication {
                        elderly_id: elderly.id,
                        name: elderly.name,
                    }),
                    KeyCode::Char('M') => self.modal = Some(Modal::Medications(elderly)),
                    KeyCode::Char('v') | KeyCode::Enter => {
                        self.open_links(Side::Elderly, elderly.id, elderly.name, false)
                    }
                    KeyCode::Char('g') => {
                        self.open_links(Side::Elderly, elderly.id, elderly.name, true)
                    }
                    _ => {}
                }
            }
        }
        false
    }

    fn modal_input(&mut self, modal: Modal, key: KeyEvent) -> Option<Modal> {
        match modal {
            Modal::Form(form) => self.form_input(form, key),
            Modal::ConfirmDelete(target) => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.pending = Some(Action::Delete(target.side, target.id));
                    None
                }
                KeyCode::Char('n') | KeyCode::Esc => None,
                _ => Some(Modal::ConfirmDelete(target)),
            },
            Modal::Tasks(_) | Modal::Medications(_) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => None,
                _ => Some(modal),
            },
            Modal::Links(mut links) => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => return None,
                    KeyCode::Char('j') | KeyCode::Down => links.move_by(true),
                    KeyCode::Char('k') | KeyCode::Up => links.move_by(false),
                    KeyCode::Enter | KeyCode::Char(' ') if links.manage => {
                        if let Some((caregiver_id, elderly_id, assigned)) = links.selected_pair() {
                            links.error = None;
                            self.pending = Some(Action::ToggleLink {
                                caregiver_id,
                                elderly_id,
                                assign: !assigned,
                            });
                        }
                    }
                    _ => {}
                }
                Some(Modal::Links(links))
            }
        }
    }

    fn form_input(&mut self, mut modal: FormModal, key: KeyEvent) -> Option<Modal> {
        match self.input_mode {
            InputMode::Insert => match key.code {
                KeyCode::Esc => self.input_mode = InputMode::Editing,
                KeyCode::Tab | KeyCode::Down => modal.form.next_field(),
                KeyCode::BackTab | KeyCode::Up => modal.form.previous_field(),
                KeyCode::Backspace => modal.form.pop(),
                KeyCode::Enter => self.submit_form(&mut modal),
                KeyCode::Char(c) => modal.form.push(c),
                _ => {}
            },
            _ => match key.code {
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    return None;
                }
                KeyCode::Char('i') => self.input_mode = InputMode::Insert,
                KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => modal.form.next_field(),
                KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                    modal.form.previous_field()
                }
                KeyCode::Char(' ') if modal.form.active_kind() == Some(FieldKind::Status) => {
                    modal.form.push(' ')
                }
                KeyCode::Enter => self.submit_form(&mut modal),
                _ => {}
            },
        }
        Some(Modal::Form(modal))
    }

    /// Validation failures stay in the modal and never reach the network.
    fn submit_form(&mut self, modal: &mut FormModal) {
        match modal.submission() {
            Ok(submission) => {
                modal.error = None;
                modal.busy = true;
                self.pending = Some(Action::Submit(submission));
            }
            Err(err) => modal.error = Some(err.to_string()),
        }
    }

    /// Logs the failure and sends the user back to login on a 401.
    fn report(&mut self, context: &str, err: &ApiError) -> String {
        error!("{}: {}", context, err);
        if err.is_unauthorized() {
            info!("authentication lost; returning to login");
            self.go_to_login(Some(err.to_string()));
        }
        err.to_string()
    }

    pub async fn perform(&mut self, action: Action, client: &ApiClient) {
        match action {
            Action::CheckSession => match current_user(client).await {
                Ok(user) => self.user = Some(user),
                Err(err) => {
                    self.report("Error loading current user", &err);
                }
            },
            Action::SignOut => {
                if let Err(err) = logout(client) {
                    error!("Error signing out: {}", err);
                }
                self.go_to_login(Some("Signed out".to_string()));
            }
            Action::Login(credentials) => match login(client, &credentials).await {
                Ok(user) => {
                    self.user = Some(user);
                    self.notice = None;
                    self.open_screen(Screen::Home);
                }
                Err(err) => self.auth_error = Some(self.report("Error logging in", &err)),
            },
            Action::Register(registration) => match register(client, &registration).await {
                Ok(_) => {
                    self.go_to_login(Some("Registration successful! Please login.".to_string()));
                    if let Some(field) = self.login_form.fields.first_mut() {
                        field.value = registration.email;
                    }
                }
                Err(err) => self.auth_error = Some(self.report("Error registering", &err)),
            },
            Action::LoadCaregivers => self.load_caregivers(client).await,
            Action::LoadElderly => self.load_elderly(client).await,
            Action::Submit(submission) => self.submit(submission, client).await,
            Action::Delete(side, id) => {
                let result = match side {
                    Side::Caregiver => delete_caregiver(client, id).await,
                    Side::Elderly => delete_elderly(client, id).await,
                };
                match (result, side) {
                    (Ok(()), Side::Caregiver) => self.load_caregivers(client).await,
                    (Ok(()), Side::Elderly) => self.load_elderly(client).await,
                    (Err(err), Side::Caregiver) => {
                        self.caregivers.error = Some(self.report("Error deleting caregiver", &err))
                    }
                    (Err(err), Side::Elderly) => {
                        self.elderly.error = Some(self.report("Error deleting elderly", &err))
                    }
                }
            }
            Action::GeneratePdf(caregiver) => {
                let saved = match generate_caregiver_pdf(client, caregiver.id).await {
                    Ok(report) => {
                        save_pdf(&self.download_dir, &caregiver, &report).map_err(ApiError::from)
                    }
                    Err(err) => Err(err),
                };
                self.status = Some(match saved {
                    Ok(path) => format!("Saved report to {}", path.display()),
                    Err(err) => format!(
                        "Failed to generate PDF: {}",
                        self.report("Error generating PDF", &err)
                    ),
                });
            }
            Action::LoadLinks => self.load_links(client).await,
            Action::ToggleLink {
                caregiver_id,
                elderly_id,
                assign,
            } => {
                let result = if assign {
                    create_assignment(client, caregiver_id, elderly_id)
                        .await
                        .map(|_| ())
                } else {
                    delete_assignment(client, caregiver_id, elderly_id).await
                };
                match result {
                    Ok(()) => {
                        self.load_links(client).await;
                        self.reload_current(client).await;
                    }
                    Err(err) => {
                        let msg = self.report("Error updating assignment", &err);
                        if let Some(Modal::Links(links)) = &mut self.modal {
                            links.error = Some(msg);
                        }
                    }
                }
            }
        }
    }

    async fn submit(&mut self, submission: Submission, client: &ApiClient) {
        let (result, side) = match &submission {
            Submission::Caregiver(c) => (create_caregiver(client, c).await.map(|_| ()), Side::Caregiver),
            Submission::Salary(id, s) => (
                update_caregiver_salary(client, *id, s).await.map(|_| ()),
                Side::Caregiver,
            ),
            Submission::Elderly(e) => (create_elderly(client, e).await.map(|_| ()), Side::Elderly),
            Submission::Task(id, t) => (add_task(client, *id, t).await.map(|_| ()), Side::Elderly),
            Submission::Medication(id, m) => (
                add_medication(client, *id, m).await.map(|_| ()),
                Side::Elderly,
            ),
        };
        match result {
            Ok(()) => {
                self.close_modal();
                match side {
                    Side::Caregiver => self.load_caregivers(client).await,
                    Side::Elderly => self.load_elderly(client).await,
                }
            }
            Err(err) => {
                let msg = self.report("Error submitting form", &err);
                if let Some(Modal::Form(form)) = &mut self.modal {
                    form.busy = false;
                    form.error = Some(msg);
                }
            }
        }
    }

    async fn reload_current(&mut self, client: &ApiClient) {
        match self.screen {
            Screen::Caregivers => self.load_caregivers(client).await,
            Screen::Elderly => self.load_elderly(client).await,
            _ => {}
        }
    }

    async fn load_caregivers(&mut self, client: &ApiClient) {
        self.caregivers.loading = true;
        match fetch_caregivers(client).await {
            Ok(mut list) => {
                list.sort_by_key(|c| c.id);
                self.caregivers.error = None;
                self.caregivers.set_items(list);
            }
            Err(err) => {
                self.caregivers.error = Some(self.report("Error fetching caregivers", &err));
            }
        }
        self.caregivers.loading = false;
    }

    async fn load_elderly(&mut self, client: &ApiClient) {
        self.elderly.loading = true;
        match fetch_elderly_list(client).await {
            Ok(mut list) => {
                list.sort_by_key(|e| e.id);
                self.elderly.error = None;
                self.elderly.set_items(list);
            }
            Err(err) => {
                self.elderly.error = Some(self.report("Error fetching elderly", &err));
            }
        }
        self.elderly.loading = false;
    }

    async fn load_links(&mut self, client: &ApiClient) {
        let Some(Modal::Links(links)) = &self.modal else {
            return;
        };
        let (side, owner_id, manage) = (links.side, links.owner_id, links.manage);

        let result: Result<Vec<Counterpart>, ApiError> = match (side, manage) {
            (Side::Caregiver, false) => elderly_for_caregiver(client, owner_id)
                .await
                .map(|list| list.iter().map(Counterpart::from).collect()),
            (Side::Elderly, false) => caregivers_for_elderly(client, owner_id)
                .await
                .map(|list| list.iter().map(Counterpart::from).collect()),
            (Side::Caregiver, true) => elderly_with_status(client, owner_id).await.map(|list| {
                list.iter()
                    .map(|l| Counterpart {
                        assigned: l.assigned,
                        ..Counterpart::from(&l.record)
                    })
                    .collect()
            }),
            (Side::Elderly, true) => caregivers_with_status(client, owner_id).await.map(|list| {
                list.iter()
                    .map(|l| Counterpart {
                        assigned: l.assigned,
                        ..Counterpart::from(&l.record)
                    })
                    .collect()
            }),
        };

        let outcome = result.map_err(|err| self.report("Error loading assignments", &err));
        if let Some(Modal::Links(links)) = &mut self.modal {
            links.loading = false;
            match outcome {
                Ok(entries) => {
                    links.error = None;
                    links.set_entries(entries);
                }
                Err(msg) => links.error = Some(msg),
            }
        }
    }
}
