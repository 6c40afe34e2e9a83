//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the database for the
//! session, handles keyboard input, renders the Focus / Bilan / Profil tabs and
//! runs AI requests behind a busy overlay. Every list is recomputed from the
//! database after each change.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::ai::{AiGate, TaskAssistant};
use crate::cmd::{celebration, run_breakdown, run_voice, VoiceOutcome};
use crate::db::{format_due_relative, format_timestamp, truncate, Database};
use crate::fields::{AccountType, ActiveFilter, Category, TaskStatus};
use crate::lifecycle::status;
use crate::store::{FileStore, KeyValueStore, StoreError};
use crate::task::Task;
use crate::tui::{
    colors::{priority_color, DARK_RED, EMERALD, GOLD, INDIGO, ORANGE, SLATE},
    enums::{AppState, ConfirmAction, InputPurpose, PendingAi, SettingsItem, Tab},
    input::InputField,
    task_form::TaskForm,
    utils::centered_rect,
};
use crate::views;

/// Main application state for the terminal user interface.
pub struct App<S: KeyValueStore = FileStore> {
    state: AppState,
    tab: Tab,
    db: Database<S>,
    filter: ActiveFilter,
    list_state: TableState,
    /// Mission ids of the Focus or Bilan list, in display order.
    rows: Vec<String>,
    detail_id: Option<String>,
    subtask_state: TableState,
    settings_state: TableState,
    task_form: TaskForm,
    input: InputField,
    input_purpose: Option<InputPurpose>,
    confirm_action: Option<ConfirmAction>,
    pending: Option<PendingAi>,
    status_message: String,
    assistant: Box<dyn TaskAssistant>,
    runtime: Runtime,
    gate: AiGate,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(db: Database<S>, assistant: Box<dyn TaskAssistant>, runtime: Runtime) -> Self {
        let task_form = TaskForm::new(db.current_account());
        let mut app = App {
            state: AppState::Main,
            tab: Tab::Focus,
            db,
            filter: ActiveFilter::All,
            list_state: TableState::default(),
            rows: Vec::new(),
            detail_id: None,
            subtask_state: TableState::default(),
            settings_state: TableState::default(),
            task_form,
            input: InputField::new(),
            input_purpose: None,
            confirm_action: None,
            pending: None,
            status_message: String::new(),
            assistant,
            runtime,
            gate: AiGate::new(),
        };
        app.refresh();
        app
    }

    /// Active missions of the Focus tab. The team view lists members in
    /// order and skips those without missions.
    fn focus_tasks(&self) -> Vec<&Task> {
        let tasks = self.db.account_tasks();
        if self.filter == ActiveFilter::Team {
            let account = self.db.current_account();
            views::group_by_member(&tasks, &account.employees)
                .into_iter()
                .flat_map(|g| g.tasks)
                .collect()
        } else {
            views::active_filter(&tasks, &self.filter)
        }
    }

    /// Recompute the visible rows and keep selections in range.
    fn refresh(&mut self) {
        let ids: Vec<String> = match self.tab {
            Tab::Focus => self.focus_tasks().iter().map(|t| t.id.clone()).collect(),
            Tab::History => {
                let tasks = self.db.account_tasks();
                views::history_partition(&tasks)
                    .journal()
                    .iter()
                    .map(|t| t.id.clone())
                    .collect()
            }
            Tab::Settings => Vec::new(),
        };
        self.rows = ids;
        clamp_selection(&mut self.list_state, self.rows.len());
        let settings_len = self.settings_items().len();
        clamp_selection(&mut self.settings_state, settings_len);
        if let Some(id) = &self.detail_id {
            if self.db.get(id).is_none() {
                self.detail_id = None;
                if self.state == AppState::Detail {
                    self.state = AppState::Main;
                }
            }
        }
        let subtask_len = self
            .detail_id
            .as_deref()
            .and_then(|id| self.db.get(id))
            .map(|t| t.subtasks().len())
            .unwrap_or(0);
        clamp_selection(&mut self.subtask_state, subtask_len);
    }

    fn selected_id(&self) -> Option<String> {
        self.list_state
            .selected()
            .and_then(|i| self.rows.get(i))
            .cloned()
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Filters offered for the active account, in cycling order.
    fn filter_options(&self) -> Vec<ActiveFilter> {
        let account = self.db.current_account();
        let mut options = vec![ActiveFilter::All];
        if account.is_work() {
            options.push(ActiveFilter::Team);
        }
        options.extend(Category::ALL.into_iter().map(ActiveFilter::Category));
        if account.is_work() {
            options.push(ActiveFilter::Me);
            options.extend(
                account
                    .employees
                    .iter()
                    .map(|e| ActiveFilter::Employee(e.id.clone())),
            );
        }
        options
    }

    fn filter_label(&self, filter: &ActiveFilter) -> String {
        match filter {
            ActiveFilter::All => "Tous".to_string(),
            ActiveFilter::Team => "Équipe".to_string(),
            ActiveFilter::Category(c) => format!("{} {}", c.icon(), c.label()),
            ActiveFilter::Me => "Moi".to_string(),
            ActiveFilter::Employee(id) => self
                .db
                .current_account()
                .employee(id)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }

    fn cycle_filter(&mut self, forward: bool) {
        let options = self.filter_options();
        let len = options.len();
        let pos = options.iter().position(|f| *f == self.filter).unwrap_or(0);
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.filter = options[next].clone();
        self.list_state.select(None);
        self.refresh();
        let label = self.filter_label(&self.filter);
        self.set_status_message(format!("Filtre: {label}"));
    }

    fn cycle_account(&mut self, forward: bool) {
        let accounts = self.db.accounts();
        let len = accounts.len();
        let current = self.db.current_account().id.clone();
        let pos = accounts.iter().position(|a| a.id == current).unwrap_or(0);
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        let id = accounts[next].id.clone();
        self.switch_account(&id);
    }

    fn switch_account(&mut self, id: &str) {
        if report(&mut self.status_message, self.db.switch_account(id)).is_none() {
            return;
        }
        self.filter = ActiveFilter::All;
        self.list_state.select(None);
        self.refresh();
        let name = self.db.current_account().name.clone();
        self.set_status_message(format!("Compte: {name}"));
    }

    fn toggle_complete(&mut self, id: &str) {
        let title = self.db.get(id).map(|t| t.title.clone()).unwrap_or_default();
        match report(&mut self.status_message, self.db.toggle_complete(id)) {
            Some(Some(true)) => self.set_status_message(celebration(&title)),
            Some(Some(false)) => self.set_status_message(format!("« {title} » rouverte")),
            _ => {}
        }
        self.refresh();
    }

    fn toggle_cancelled(&mut self, id: &str) {
        report(&mut self.status_message, self.db.toggle_cancelled(id));
        if let Some(t) = self.db.get(id) {
            let msg = if t.is_cancelled { "Mission annulée" } else { "Mission rétablie" };
            self.set_status_message(msg.to_string());
        }
        self.refresh();
    }

    fn toggle_postponed(&mut self, id: &str) {
        report(&mut self.status_message, self.db.toggle_postponed(id));
        if let Some(t) = self.db.get(id) {
            let msg = if t.is_postponed { "Mission reportée" } else { "Mission réactivée" };
            self.set_status_message(msg.to_string());
        }
        self.refresh();
    }

    /// Undo whatever took a mission out of the active list.
    fn restore(&mut self, id: &str) {
        let Some(state) = self.db.get(id).map(status) else {
            return;
        };
        let result = match state {
            TaskStatus::Completed => self.db.toggle_complete(id).map(|_| true),
            TaskStatus::Cancelled => self.db.toggle_cancelled(id),
            TaskStatus::Postponed => self.db.toggle_postponed(id),
            TaskStatus::Active => Ok(false),
        };
        if let Some(true) = report(&mut self.status_message, result) {
            self.set_status_message("Mission de retour dans Focus".to_string());
        }
        self.refresh();
    }

    /// Hand the mission to the next employee, then back to yourself.
    fn cycle_assignee(&mut self, id: &str) {
        let account = self.db.current_account();
        if !account.is_work() || account.employees.is_empty() {
            self.set_status_message("Aucun membre dans ce compte".to_string());
            return;
        }
        let current = self.db.get(id).and_then(|t| t.employee_id.clone());
        let pos = current
            .as_deref()
            .and_then(|e| account.employees.iter().position(|x| x.id == e));
        let next = match pos {
            None => Some(0),
            Some(i) if i + 1 < account.employees.len() => Some(i + 1),
            Some(_) => None,
        };
        let (next_id, name) = match next {
            Some(i) => (
                Some(account.employees[i].id.clone()),
                account.employees[i].name.clone(),
            ),
            None => (None, "Moi".to_string()),
        };
        let assigned = self.db.assign(id, next_id.as_deref());
        if report(&mut self.status_message, assigned).is_some() {
            self.set_status_message(format!("Assignée à {name}"));
        }
        self.refresh();
    }

    fn request_delete(&mut self, id: &str) {
        if let Some(t) = self.db.get(id) {
            self.confirm_action = Some(ConfirmAction::DeleteTask {
                id: t.id.clone(),
                title: t.title.clone(),
            });
            self.state = AppState::Confirm;
        }
    }

    fn request_breakdown(&mut self, id: &str) {
        if self.gate.is_busy() || self.pending.is_some() {
            self.set_status_message("L'IA est déjà occupée".to_string());
            return;
        }
        self.pending = Some(PendingAi::Breakdown(id.to_string()));
        self.state = AppState::Busy;
    }

    fn open_input(&mut self, purpose: InputPurpose, initial: &str) {
        self.input = InputField::with_value(initial);
        self.input.active = true;
        self.input_purpose = Some(purpose);
        self.state = AppState::Input;
    }

    fn open_detail(&mut self, id: String) {
        self.detail_id = Some(id);
        self.subtask_state.select(None);
        self.state = AppState::Detail;
        self.refresh();
    }

    /// Run queued AI work. Called once the busy overlay is on screen.
    fn run_pending(&mut self) {
        let Some(job) = self.pending.take() else {
            return;
        };
        debug!(?job, "running AI job");
        match job {
            PendingAi::Breakdown(id) => {
                let result = run_breakdown(
                    &mut self.db,
                    self.assistant.as_ref(),
                    &self.runtime,
                    &self.gate,
                    &id,
                );
                match report(&mut self.status_message, result) {
                    Some(Some(steps)) => {
                        self.set_status_message(format!("{} petites étapes prêtes ✨", steps.len()));
                        self.detail_id = Some(id);
                        self.subtask_state.select(Some(0));
                        self.state = AppState::Detail;
                    }
                    Some(None) => {
                        self.set_status_message("Découpage indisponible pour le moment".to_string());
                        self.state = AppState::Main;
                    }
                    None => self.state = AppState::Main,
                }
            }
            PendingAi::Voice(transcript) => {
                let result = run_voice(
                    &mut self.db,
                    self.assistant.as_ref(),
                    &self.runtime,
                    &self.gate,
                    &transcript,
                );
                match report(&mut self.status_message, result) {
                    Some(VoiceOutcome::Created { title, priority, .. }) => self.set_status_message(
                        format!("Mission ajoutée: {} {}", priority.icon(), title),
                    ),
                    Some(VoiceOutcome::NothingDetected) => {
                        self.set_status_message("Aucune mission détectée".to_string())
                    }
                    Some(VoiceOutcome::Busy) => {
                        self.set_status_message("L'IA est déjà occupée".to_string())
                    }
                    None => {}
                }
                self.tab = Tab::Focus;
                self.state = AppState::Main;
            }
        }
        self.refresh();
    }

    fn settings_items(&self) -> Vec<SettingsItem> {
        let mut items = vec![SettingsItem::Name];
        items.extend(
            self.db
                .accounts()
                .iter()
                .map(|a| SettingsItem::Account(a.id.clone())),
        );
        items.push(SettingsItem::NewAccount(AccountType::Personal));
        items.push(SettingsItem::NewAccount(AccountType::Work));
        let account = self.db.current_account();
        if account.is_work() {
            items.extend(
                account
                    .employees
                    .iter()
                    .map(|e| SettingsItem::Employee(e.id.clone())),
            );
            items.push(SettingsItem::NewEmployee);
        }
        items.push(SettingsItem::Reset);
        items
    }

    fn selected_setting(&self) -> Option<SettingsItem> {
        let items = self.settings_items();
        self.settings_state
            .selected()
            .and_then(|i| items.get(i).cloned())
    }

    fn submit_input(&mut self) {
        let Some(purpose) = self.input_purpose.take() else {
            self.state = AppState::Main;
            return;
        };
        let value = self.input.value.trim().to_string();
        self.state = AppState::Main;
        match purpose {
            InputPurpose::Voice => {
                if value.is_empty() {
                    self.set_status_message("Rien entendu".to_string());
                } else {
                    self.pending = Some(PendingAi::Voice(value));
                    self.state = AppState::Busy;
                }
            }
            InputPurpose::DisplayName => {
                let saved = !value.is_empty()
                    && report(&mut self.status_message, self.db.set_display_name(&value)).is_some();
                if saved {
                    self.set_status_message(format!("Bonjour {value} !"));
                }
            }
            InputPurpose::NewAccount(kind) => {
                let created = self.db.add_account(&value, kind);
                if let Some(Some(acc)) = report(&mut self.status_message, created) {
                    let msg = format!("Compte créé: {}", acc.name);
                    self.set_status_message(msg);
                }
            }
            InputPurpose::RenameAccount(id) => {
                report(&mut self.status_message, self.db.rename_account(&id, &value));
            }
            InputPurpose::NewEmployee => {
                let account_id = self.db.current_account().id.clone();
                let added = self.db.add_employee(&account_id, &value);
                if let Some(Some(_)) = report(&mut self.status_message, added) {
                    self.set_status_message(format!("{value} rejoint l'équipe"));
                }
            }
        }
        self.refresh();
    }

    fn execute_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteTask { id, title } => {
                if let Some(true) = report(&mut self.status_message, self.db.delete_task(&id)) {
                    self.set_status_message(format!("« {title} » supprimée"));
                }
                if self.detail_id.as_deref() == Some(id.as_str()) {
                    self.detail_id = None;
                }
            }
            ConfirmAction::DeleteAccount { id, name } => {
                let deleted = self.db.delete_account(&id);
                match report(&mut self.status_message, deleted) {
                    Some(true) => {
                        self.filter = ActiveFilter::All;
                        self.set_status_message(format!("Compte « {name} » supprimé"));
                    }
                    Some(false) => self.set_status_message(
                        "Le dernier compte ne peut pas être supprimé".to_string(),
                    ),
                    None => {}
                }
            }
            ConfirmAction::RemoveEmployee { id, name } => {
                let account_id = self.db.current_account().id.clone();
                let removed = self.db.remove_employee(&account_id, &id);
                if let Some(true) = report(&mut self.status_message, removed) {
                    if self.filter == ActiveFilter::Employee(id) {
                        self.filter = ActiveFilter::All;
                    }
                    self.set_status_message(format!("{name} a quitté l'équipe"));
                }
            }
            ConfirmAction::Reset => {
                if report(&mut self.status_message, self.db.reset()).is_some() {
                    self.filter = ActiveFilter::All;
                    self.tab = Tab::Focus;
                    self.set_status_message("Toutes les données ont été effacées".to_string());
                }
            }
        }
        self.state = AppState::Main;
        self.list_state.select(None);
        self.refresh();
    }

    /// Handle keyboard input on the tab screens.
    /// Returns true if the application should quit.
    fn handle_main_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.prev()),
            KeyCode::Char('1') => self.switch_tab(Tab::Focus),
            KeyCode::Char('2') => self.switch_tab(Tab::History),
            KeyCode::Char('3') => self.switch_tab(Tab::Settings),
            KeyCode::Char(']') => self.cycle_account(true),
            KeyCode::Char('[') => self.cycle_account(false),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new(self.db.current_account());
                self.state = AppState::AddTask;
            }
            KeyCode::Char('v') => self.open_input(InputPurpose::Voice, ""),
            _ => match self.tab {
                Tab::Focus => self.handle_focus_key(key),
                Tab::History => self.handle_history_key(key),
                Tab::Settings => self.handle_settings_key(key),
            },
        }
        Ok(false)
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.list_state.select(None);
        self.refresh();
    }

    fn handle_focus_key(&mut self, key: KeyCode) {
        if move_selection(&mut self.list_state, self.rows.len(), key) {
            return;
        }
        match key {
            KeyCode::Char('f') => self.cycle_filter(true),
            KeyCode::Char('F') => self.cycle_filter(false),
            _ => {
                let Some(id) = self.selected_id() else {
                    return;
                };
                match key {
                    KeyCode::Enter | KeyCode::Char(' ') => self.open_detail(id),
                    KeyCode::Char('c') => self.toggle_complete(&id),
                    KeyCode::Char('x') => self.toggle_cancelled(&id),
                    KeyCode::Char('p') => self.toggle_postponed(&id),
                    KeyCode::Char('d') | KeyCode::Delete => self.request_delete(&id),
                    KeyCode::Char('b') => self.request_breakdown(&id),
                    KeyCode::Char('e') => self.cycle_assignee(&id),
                    _ => {}
                }
            }
        }
    }

    fn handle_history_key(&mut self, key: KeyCode) {
        if move_selection(&mut self.list_state, self.rows.len(), key) {
            return;
        }
        let Some(id) = self.selected_id() else {
            return;
        };
        match key {
            KeyCode::Enter | KeyCode::Char(' ') => self.open_detail(id),
            KeyCode::Char('r') => self.restore(&id),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(&id),
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyCode) {
        let len = self.settings_items().len();
        if move_selection(&mut self.settings_state, len, key) {
            return;
        }
        let Some(item) = self.selected_setting() else {
            return;
        };
        match (key, item) {
            (KeyCode::Enter, SettingsItem::Name) => {
                let name = self.db.display_name().to_string();
                self.open_input(InputPurpose::DisplayName, &name);
            }
            (KeyCode::Enter, SettingsItem::Account(id)) => self.switch_account(&id),
            (KeyCode::Enter, SettingsItem::NewAccount(kind)) => {
                self.open_input(InputPurpose::NewAccount(kind), "")
            }
            (KeyCode::Enter, SettingsItem::NewEmployee) => self.open_input(InputPurpose::NewEmployee, ""),
            (KeyCode::Enter, SettingsItem::Reset) => {
                self.confirm_action = Some(ConfirmAction::Reset);
                self.state = AppState::Confirm;
            }
            (KeyCode::Char('r'), SettingsItem::Account(id)) => {
                let name = self
                    .db
                    .resolve_account(&id)
                    .map(|a| a.name.clone())
                    .unwrap_or_default();
                self.open_input(InputPurpose::RenameAccount(id), &name);
            }
            (KeyCode::Char('d') | KeyCode::Delete, SettingsItem::Account(id)) => {
                if self.db.accounts().len() <= 1 {
                    self.set_status_message("Le dernier compte ne peut pas être supprimé".to_string());
                } else if let Some(a) = self.db.resolve_account(&id) {
                    self.confirm_action = Some(ConfirmAction::DeleteAccount {
                        id: a.id.clone(),
                        name: a.name.clone(),
                    });
                    self.state = AppState::Confirm;
                }
            }
            (KeyCode::Char('d') | KeyCode::Delete, SettingsItem::Employee(id)) => {
                if let Some(e) = self.db.current_account().employee(&id) {
                    self.confirm_action = Some(ConfirmAction::RemoveEmployee {
                        id: e.id.clone(),
                        name: e.name.clone(),
                    });
                    self.state = AppState::Confirm;
                }
            }
            _ => {}
        }
    }

    /// Handle keyboard input in the mission detail view.
    fn handle_detail_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        let Some(id) = self.detail_id.clone() else {
            self.state = AppState::Main;
            return Ok(false);
        };
        let subtasks: Vec<String> = self
            .db
            .get(&id)
            .map(|t| t.subtasks().iter().map(|s| s.id.clone()).collect())
            .unwrap_or_default();
        if move_selection(&mut self.subtask_state, subtasks.len(), key) {
            return Ok(false);
        }
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Left => {
                self.state = AppState::Main;
                self.refresh();
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(sub) = self.subtask_state.selected().and_then(|i| subtasks.get(i)) {
                    report(&mut self.status_message, self.db.toggle_subtask(&id, sub));
                }
            }
            KeyCode::Char('c') => self.toggle_complete(&id),
            KeyCode::Char('x') => self.toggle_cancelled(&id),
            KeyCode::Char('p') => self.toggle_postponed(&id),
            KeyCode::Char('b') => self.request_breakdown(&id),
            KeyCode::Char('e') => self.cycle_assignee(&id),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(&id),
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the add-mission form.
    fn handle_form_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Esc => self.state = AppState::Main,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.create_task(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    fn create_task(&mut self) {
        let draft = match self.task_form.to_new_task() {
            Ok(d) => d,
            Err(e) => {
                self.set_status_message(e);
                return;
            }
        };
        if draft.title.is_empty() {
            self.set_status_message("Le titre est requis".to_string());
            return;
        }
        if let Some(Some(t)) = report(&mut self.status_message, self.db.add_task(draft)) {
            let msg = format!("Mission ajoutée: {}", t.title);
            self.set_status_message(msg);
            self.state = AppState::Main;
            self.tab = Tab::Focus;
            self.list_state.select(Some(0));
            self.refresh();
        }
    }

    /// Handle keyboard input in the single-line input dialog.
    fn handle_text_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Esc => {
                self.input_purpose = None;
                self.state = AppState::Main;
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    fn handle_confirm_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match self.confirm_action.take() {
                    Some(action) => self.execute_confirm(action),
                    None => self.state = AppState::Main,
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::Main;
                self.confirm_action = None;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Dispatch one key press according to the current state.
    /// Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        match self.state {
            AppState::Main => self.handle_main_input(key, modifiers),
            AppState::Detail => self.handle_detail_input(key, modifiers),
            AppState::AddTask => self.handle_form_input(key, modifiers),
            AppState::Input => self.handle_text_input(key, modifiers),
            AppState::Confirm => self.handle_confirm_input(key, modifiers),
            AppState::Help => {
                self.state = AppState::Main;
                Ok(false)
            }
            AppState::Busy => Ok(false),
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                self.status_message.clear();
                return self.handle_key(key.code, key.modifiers);
            }
        }
        Ok(false)
    }

    fn render_header(&mut self, f: &mut Frame, area: Rect) {
        let current = self.db.current_account().id.clone();
        let mut spans = vec![
            Span::styled("MewFocus 🐾", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("Bonjour {}", self.db.display_name()),
                Style::default().fg(SLATE).add_modifier(Modifier::ITALIC),
            ),
            Span::raw("   "),
        ];
        for a in self.db.accounts() {
            let icon = if a.is_work() { "💼" } else { "👤" };
            let style = if a.id == current {
                Style::default().bg(INDIGO).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(SLATE)
            };
            spans.push(Span::styled(format!(" {} {} ", icon, a.name), style));
            spans.push(Span::raw(" "));
        }
        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_tabs(&mut self, f: &mut Frame, area: Rect) {
        let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL))
            .select(self.tab.index())
            .highlight_style(Style::default().fg(INDIGO).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn render_focus(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let rate = {
            let tasks = self.db.account_tasks();
            views::completion_rate(&tasks)
        };
        let (label, color) = if rate == 100 {
            (format!("{rate}% 🏆"), EMERALD)
        } else {
            (format!("{rate}%"), INDIGO)
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progrès Focus"))
            .gauge_style(Style::default().fg(color))
            .percent(u16::from(rate))
            .label(label);
        f.render_widget(gauge, chunks[0]);

        let mut chips = vec![Span::styled("Filtre: ", Style::default().fg(SLATE))];
        for option in self.filter_options() {
            let style = if option == self.filter {
                Style::default().bg(INDIGO).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(SLATE)
            };
            chips.push(Span::styled(format!(" {} ", self.filter_label(&option)), style));
        }
        f.render_widget(Paragraph::new(Line::from(chips)), chunks[1]);

        let today = Local::now().date_naive();
        let account = self.db.current_account();
        let team = self.filter == ActiveFilter::Team;
        let mut previous_owner: Option<Option<String>> = None;
        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter_map(|id| self.db.get(id))
            .map(|t| {
                let (done, total) = views::subtask_progress(t);
                let steps = if total == 0 {
                    String::new()
                } else {
                    format!("{done}/{total}")
                };
                let who = t
                    .employee_id
                    .as_deref()
                    .and_then(|e| account.employee(e))
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| "Moi".to_string());
                let first_of_group = previous_owner.as_ref() != Some(&t.employee_id);
                previous_owner = Some(t.employee_id.clone());
                let who_style = if team && first_of_group {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(SLATE)
                };
                let mut title = t.title.clone();
                if let Some(rec) = &t.recurrence {
                    title.push_str(&format!("  ({})", rec.summary()));
                }
                Row::new(vec![
                    Cell::from(format!("{} {}", t.priority.icon(), t.priority.label()))
                        .style(Style::default().fg(priority_color(t.priority))),
                    Cell::from(t.category.icon()),
                    Cell::from(title),
                    Cell::from(format_due_relative(t.due_date, today)),
                    Cell::from(steps),
                    Cell::from(who).style(who_style),
                ])
            })
            .collect();

        let header = Row::new(["Urgence", "", "Mission", "Échéance", "Étapes", "Qui"])
            .style(Style::default().bg(INDIGO).fg(Color::White).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(12),
            Constraint::Length(3),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(12),
        ];
        let title = match self.filter {
            ActiveFilter::All => "Missions Actives",
            ActiveFilter::Team => "Équipe",
            _ => "Filtrage",
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} ({}) - 'h' for help", title, self.rows.len())),
            )
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[2], &mut self.list_state);
    }

    fn render_history(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let tasks = self.db.account_tasks();
        let parts = views::history_partition(&tasks);
        let counts = Line::from(vec![
            Span::styled(format!("✅ {} terminées", parts.completed.len()), Style::default().fg(EMERALD)),
            Span::raw("   "),
            Span::styled(format!("✖ {} annulées", parts.cancelled.len()), Style::default().fg(SLATE)),
            Span::raw("   "),
            Span::styled(format!("⏸ {} reportées", parts.postponed.len()), Style::default().fg(ORANGE)),
            Span::raw("   "),
            Span::raw(format!("⏳ {} en cours", parts.pending_count())),
        ]);
        f.render_widget(
            Paragraph::new(counts)
                .block(Block::default().borders(Borders::ALL).title("Bilan"))
                .alignment(Alignment::Center),
            chunks[0],
        );

        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter_map(|id| self.db.get(id))
            .map(|t| {
                let state = status(t);
                let style = match state {
                    TaskStatus::Completed => Style::default().fg(EMERALD),
                    TaskStatus::Cancelled => Style::default().fg(SLATE).add_modifier(Modifier::CROSSED_OUT),
                    TaskStatus::Postponed => Style::default().fg(ORANGE),
                    TaskStatus::Active => Style::default(),
                };
                Row::new(vec![
                    Cell::from(state.label()),
                    Cell::from(format_timestamp(t.created_at)),
                    Cell::from(format!("{} {}", t.category.icon(), t.title)),
                ])
                .style(style)
            })
            .collect();
        let table = Table::new(
            rows,
            [Constraint::Length(10), Constraint::Length(17), Constraint::Min(20)],
        )
        .header(
            Row::new(["Statut", "Créée le", "Mission"])
                .style(Style::default().bg(INDIGO).fg(Color::White).add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Journal - r: restore  d: delete"),
        )
        .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
        .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[1], &mut self.list_state);
    }

    fn render_settings(&mut self, f: &mut Frame, area: Rect) {
        let current = self.db.current_account().id.clone();
        let rows: Vec<Row> = self
            .settings_items()
            .into_iter()
            .map(|item| {
                let (text, style) = match item {
                    SettingsItem::Name => (
                        format!("Nom: {}", self.db.display_name()),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    SettingsItem::Account(id) => {
                        let a = self.db.resolve_account(&id);
                        let name = a.map(|a| a.name.clone()).unwrap_or_default();
                        let icon = if a.is_some_and(|a| a.is_work()) { "💼" } else { "👤" };
                        let marker = if id == current { "●" } else { " " };
                        (format!("{marker} {icon} {name}"), Style::default())
                    }
                    SettingsItem::NewAccount(AccountType::Personal) => {
                        ("+ Nouveau compte personnel".to_string(), Style::default().fg(INDIGO))
                    }
                    SettingsItem::NewAccount(AccountType::Work) => {
                        ("+ Nouveau compte pro".to_string(), Style::default().fg(INDIGO))
                    }
                    SettingsItem::Employee(id) => {
                        let name = self
                            .db
                            .current_account()
                            .employee(&id)
                            .map(|e| e.name.clone())
                            .unwrap_or_default();
                        (format!("    👥 {name}"), Style::default())
                    }
                    SettingsItem::NewEmployee => {
                        ("    + Ajouter un employé".to_string(), Style::default().fg(INDIGO))
                    }
                    SettingsItem::Reset => (
                        "⚠ Réinitialiser toutes les données".to_string(),
                        Style::default().fg(Color::Red),
                    ),
                };
                Row::new(vec![Cell::from(text)]).style(style)
            })
            .collect();
        let table = Table::new(rows, [Constraint::Min(10)])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Préférences ⚙️  Enter: select  r: rename  d: delete"),
            )
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, area, &mut self.settings_state);
    }

    /// Render the detailed view of a single mission with its steps.
    fn render_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(t) = self.detail_id.as_deref().and_then(|id| self.db.get(id)) else {
            return;
        };
        let today = Local::now().date_naive();
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled(format!("{} {}", t.category.icon(), t.title), bold)),
            Line::from(""),
            Line::from(format!("Statut:    {}", status(t).label())),
            Line::from(vec![
                Span::raw("Urgence:   "),
                Span::styled(
                    format!("{} {}", t.priority.icon(), t.priority.label()),
                    Style::default().fg(priority_color(t.priority)),
                ),
            ]),
            Line::from(format!("Type:      {}", t.category.label())),
        ];
        if let Some(due) = t.due_date {
            lines.push(Line::from(format!(
                "Échéance:  {} ({})",
                format_timestamp(due),
                format_due_relative(Some(due), today)
            )));
        }
        if let Some(e) = t.employee_id.as_deref() {
            let name = self
                .db
                .current_account()
                .employee(e)
                .map(|x| x.name.clone())
                .unwrap_or_else(|| e.to_string());
            lines.push(Line::from(format!("Pour:      {name}")));
        }
        if let Some(rec) = &t.recurrence {
            lines.push(Line::from(format!("Récurrence: {}", rec.summary())));
        }
        for n in t.notification_list() {
            let when = n
                .fires_at(t.due_date)
                .map(|at| format!(" ({})", format_timestamp(at)))
                .unwrap_or_default();
            lines.push(Line::from(format!("🔔 {}{}", n.label, when)));
        }
        if !t.description.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(t.description.clone()));
        }

        let (done, total) = views::subtask_progress(t);
        let rows: Vec<Row> = t
            .subtasks()
            .iter()
            .map(|s| {
                let (mark, style) = if s.completed {
                    ("[x]", Style::default().fg(EMERALD).add_modifier(Modifier::CROSSED_OUT))
                } else {
                    ("[ ]", Style::default())
                };
                let due = s.due_date.map(format_timestamp).unwrap_or_default();
                Row::new(vec![Cell::from(mark), Cell::from(s.title.clone()), Cell::from(due)]).style(style)
            })
            .collect();
        let steps_title = if total == 0 {
            "Plan de vol - press 'b' to let the AI break this mission down".to_string()
        } else {
            format!("Plan de vol {done}/{total} - Space: toggle step  b: new breakdown")
        };

        let info_height = (lines.len() as u16 + 2).min(area.height / 2);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(info_height), Constraint::Min(0)])
            .split(area);
        f.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Mission"))
                .wrap(Wrap { trim: true }),
            chunks[0],
        );
        let table = Table::new(
            rows,
            [Constraint::Length(3), Constraint::Min(20), Constraint::Length(17)],
        )
        .block(Block::default().borders(Borders::ALL).title(steps_title))
        .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
        .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[1], &mut self.subtask_state);
    }

    fn render_task_form(&mut self, f: &mut Frame, area: Rect) {
        let fields = self.task_form.visible_fields();
        let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(0));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let current = self.task_form.current();
        for (i, field) in fields.iter().enumerate() {
            let style = if *field == current {
                Style::default().fg(GOLD)
            } else {
                Style::default()
            };
            let widget = Paragraph::new(self.task_form.display_value(*field)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(field.label())
                    .border_style(style),
            );
            f.render_widget(widget, chunks[i]);
            if *field == current {
                if let Some(cursor) = self.task_form.cursor() {
                    let x = chunks[i].x + 1 + (cursor as u16).min(chunks[i].width.saturating_sub(2));
                    f.set_cursor_position((x, chunks[i].y + 1));
                }
            }
        }
        let instructions = Paragraph::new(
            "Tab/↑↓ move  ←→ change choice  Space toggle  Enter create  Esc cancel",
        )
        .alignment(Alignment::Center)
        .style(Style::default().fg(SLATE));
        f.render_widget(instructions, chunks[fields.len()]);
    }

    fn render_input(&mut self, f: &mut Frame, area: Rect) {
        let title = self
            .input_purpose
            .as_ref()
            .map(|p| p.title())
            .unwrap_or("");
        let area = centered_rect(60, 20, area);
        f.render_widget(Clear, area);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(INDIGO));
        let inner = block.inner(area);
        f.render_widget(Paragraph::new(self.input.value.as_str()).block(block), area);
        let x = inner.x + (self.input.cursor as u16).min(inner.width.saturating_sub(1));
        f.set_cursor_position((x, inner.y));
    }

    /// Render a confirmation dialog for destructive actions.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let action = self
            .confirm_action
            .as_ref()
            .map(|a| a.describe())
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(action),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_busy(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(40, 20, area);
        f.render_widget(Clear, area);
        let what = match &self.pending {
            Some(PendingAi::Voice(_)) => "Analyse de votre demande...",
            _ => "Découpage en petites étapes...",
        };
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("🐾 L'IA réfléchit", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(what),
        ];
        f.render_widget(
            Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(INDIGO)))
                .alignment(Alignment::Center),
            area,
        );
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let section = |s: &'static str| {
            Line::from(Span::styled(s, Style::default().add_modifier(Modifier::BOLD)))
        };
        let help_text = vec![
            section("MewFocus Help"),
            Line::from(""),
            section("Everywhere:"),
            Line::from("  Tab/Shift+Tab, 1-3  Switch tab (Focus, Bilan, Profil)"),
            Line::from("  [ / ]               Previous / next account"),
            Line::from("  a                   Add a mission"),
            Line::from("  v                   Voice capture (type what you would say)"),
            Line::from("  h/F1                Show this help"),
            Line::from("  q/Esc/Ctrl+C        Quit"),
            Line::from(""),
            section("Focus:"),
            Line::from("  ↑↓ / j k            Select a mission"),
            Line::from("  Enter/Space         Open the mission and its steps"),
            Line::from("  c                   Complete (or reopen)"),
            Line::from("  x                   Cancel (or restore)"),
            Line::from("  p                   Postpone (or bring back)"),
            Line::from("  b                   AI breakdown into small steps"),
            Line::from("  e                   Assign to the next employee"),
            Line::from("  d                   Delete"),
            Line::from("  f / F               Next / previous filter"),
            Line::from(""),
            section("Bilan:"),
            Line::from("  r                   Bring the mission back to Focus"),
            Line::from("  d                   Delete"),
            Line::from(""),
            section("Profil:"),
            Line::from("  Enter               Edit name, switch account, add, reset"),
            Line::from("  r / d               Rename / delete account or employee"),
            Line::from(""),
            section("Due Date Formats:"),
            Line::from("  today, tomorrow, friday, next monday, in 3d, end of week, YYYY-MM-DD"),
            Line::from("  add a time with HH:MM, e.g. \"tomorrow 18:00\" (default 09:00)"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Main => match self.tab {
                    Tab::Focus => format!(
                        "{} | c done  x cancel  p postpone  b breakdown  a add  f filter  h help",
                        self.db.current_account().name
                    ),
                    Tab::History => "r restore  d delete  h help".to_string(),
                    Tab::Settings => "Enter select  r rename  d delete".to_string(),
                },
                AppState::Detail => "Space toggle step  c done  b breakdown  Esc back".to_string(),
                AppState::AddTask => "Nouvelle mission".to_string(),
                AppState::Input => "Enter to confirm, Esc to cancel".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Busy => "L'IA réfléchit...".to_string(),
            }
        };
        let status = Paragraph::new(truncate(&status_text, area.width as usize))
            .style(Style::default().bg(INDIGO).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_tab_body(&mut self, f: &mut Frame, area: Rect) {
        match self.tab {
            Tab::Focus => self.render_focus(f, area),
            Tab::History => self.render_history(f, area),
            Tab::Settings => self.render_settings(f, area),
        }
    }

    /// Main render function that dispatches to the view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_tabs(f, chunks[1]);
        match self.state {
            AppState::Main => self.render_tab_body(f, chunks[2]),
            AppState::Detail => self.render_detail(f, chunks[2]),
            AppState::AddTask => self.render_task_form(f, chunks[2]),
            AppState::Help => self.render_help(f, chunks[2]),
            AppState::Input => {
                self.render_tab_body(f, chunks[2]);
                self.render_input(f, chunks[2]);
            }
            AppState::Confirm => {
                self.render_tab_body(f, chunks[2]);
                self.render_confirm(f, chunks[2]);
            }
            AppState::Busy => {
                if self.detail_id.is_some() && matches!(self.pending, Some(PendingAi::Breakdown(_))) {
                    self.render_detail(f, chunks[2]);
                } else {
                    self.render_tab_body(f, chunks[2]);
                }
                self.render_busy(f, chunks[2]);
            }
        }
        self.render_status_bar(f, chunks[3]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Pending AI work runs right after a frame showing the busy overlay.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.pending.is_some() {
                self.run_pending();
                continue;
            }
            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Surface a store failure in the status bar.
fn report<T>(status: &mut String, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, "could not save");
            *status = format!("Error saving data: {e}");
            None
        }
    }
}

fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        match state.selected() {
            Some(i) if i >= len => state.select(Some(len - 1)),
            None => state.select(Some(0)),
            _ => {}
        }
    }
}

/// Apply an up/down key to a list selection. Returns whether the key was used.
fn move_selection(state: &mut TableState, len: usize, key: KeyCode) -> bool {
    let up = matches!(key, KeyCode::Up | KeyCode::Char('k'));
    let down = matches!(key, KeyCode::Down | KeyCode::Char('j'));
    if !up && !down {
        return false;
    }
    if len == 0 {
        state.select(None);
        return true;
    }
    let next = match state.selected() {
        None => 0,
        Some(i) if up => i.saturating_sub(1),
        Some(i) => (i + 1).min(len - 1),
    };
    state.select(Some(next));
    true
}
