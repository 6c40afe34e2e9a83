//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers behind every subcommand, plus the
//! AI flows (breakdown and voice capture) the TUI shares with them. Handlers
//! print their result; user errors print a message and exit with status 1.

use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};
use chrono::Local;
use tokio::runtime::Runtime;
use tracing::info;

use crate::account::Account;
use crate::ai::{self, AiGate, GeminiAssistant, TaskAssistant};
use crate::config::Config;
use crate::db::*;
use crate::fields::*;
use crate::lifecycle::status;
use crate::store::{KeyValueStore, StoreError};
use crate::task::{NewSubTask, NewTask, RecurrenceConfig, SubTask, Task, TaskNotification};
use crate::tui::run::run_tui;
use crate::views;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI.
    Ui,

    /// Add a mission to the active account.
    Add(AddArgs),

    /// List active missions.
    List {
        /// ALL | TEAM | CAT_<category> | EMP_ME | EMP_<employee id>
        #[arg(long, default_value = "ALL")]
        filter: ActiveFilter,
    },

    /// Show one mission with its steps and reminders.
    View {
        /// Mission id, id prefix or title
        id: String,
    },

    /// Active missions grouped per team member (work accounts).
    Team,

    /// Journal of completed, cancelled and postponed missions.
    History,

    /// Focus progress of the active account.
    Progress,

    /// Toggle completion of a mission.
    Done {
        /// Mission id, id prefix or title
        id: String,
    },

    /// Toggle cancellation of a mission.
    Cancel {
        /// Mission id, id prefix or title
        id: String,
    },

    /// Postpone a mission, or bring a postponed one back.
    Postpone {
        /// Mission id, id prefix or title
        id: String,
    },

    /// Delete a mission for good.
    Delete {
        /// Mission id, id prefix or title
        id: String,
    },

    /// Toggle one step of a mission.
    Subtask {
        /// Mission id, id prefix or title
        task: String,
        /// Step id, 1-based position or title
        subtask: String,
    },

    /// Ask the AI to break a mission into small steps.
    Breakdown {
        /// Mission id, id prefix or title
        id: String,
    },

    /// Create a mission from a spoken sentence.
    Voice {
        /// Transcript of what was said
        #[arg(required = true, num_args = 1..)]
        transcript: Vec<String>,
    },

    /// Assign a mission to an employee, or back to yourself.
    Assign {
        /// Mission id, id prefix or title
        id: String,
        /// Employee id or name; omit to take the mission back.
        #[arg(long)]
        employee: Option<String>,
    },

    /// Manage accounts.
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Manage the employees of the active account.
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },

    /// Show or change your display name.
    Name {
        name: Option<String>,
    },

    /// Erase every mission and account.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options of `mf add`.
#[derive(Args, Debug, Clone, Default)]
pub struct AddArgs {
    /// Short title for the mission.
    pub title: String,
    /// Optional longer description.
    #[arg(long)]
    pub desc: Option<String>,
    #[arg(long, value_enum, default_value_t = Priority::Moyenne)]
    pub priority: Priority,
    #[arg(long, value_enum, default_value_t = Category::Tache)]
    pub category: Category,
    /// Due date: YYYY-MM-DD, "today", "tomorrow", "in 3d", "friday"; optionally followed by HH:MM.
    #[arg(long)]
    pub due: Option<String>,
    /// Employee id or name (work accounts).
    #[arg(long)]
    pub employee: Option<String>,
    /// Step of a project mission. May be repeated.
    #[arg(long = "step")]
    pub steps: Vec<String>,
    /// Recurrence of a recurring mission.
    #[arg(long, value_enum)]
    pub every: Option<Frequency>,
    /// Weekday of a weekly mission, 0 = Monday. May be repeated.
    #[arg(long = "day")]
    pub days: Vec<u8>,
    /// Quarter (1-4) of a quarterly mission. May be repeated.
    #[arg(long = "quarter")]
    pub quarters: Vec<u8>,
    /// Last occurrence of a recurring mission, same format as --due.
    #[arg(long)]
    pub until: Option<String>,
    /// Remind one day before the due date.
    #[arg(long)]
    pub remind_day: bool,
    /// Remind one hour before the due date.
    #[arg(long)]
    pub remind_hour: bool,
    /// Remind at a given moment, same format as --due. May be repeated.
    #[arg(long = "remind-at")]
    pub remind_at: Vec<String>,
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// List accounts; the active one is starred.
    List,
    /// Create an account.
    Add {
        name: String,
        #[arg(long, value_enum, default_value_t = AccountType::Personal)]
        kind: AccountType,
    },
    /// Rename an account.
    Rename {
        /// Account id or name
        account: String,
        name: String,
    },
    /// Delete an account. The last account cannot be deleted.
    Delete {
        /// Account id or name
        account: String,
    },
    /// Make an account the active one.
    Switch {
        /// Account id or name
        account: String,
    },
}

#[derive(Subcommand)]
pub enum EmployeeAction {
    /// List employees of the active account.
    List,
    /// Add an employee to the active account.
    Add { name: String },
    /// Remove an employee; their missions come back to you.
    Remove {
        /// Employee id or name
        employee: String,
    },
}

impl AddArgs {
    /// Turn command-line input into a mission draft for `account`.
    pub fn into_new_task(self, account: &Account) -> Result<NewTask, String> {
        let due_date = self.due.as_deref().map(parse_due_flag).transpose()?;
        let employee_id = match self.employee.as_deref() {
            Some(e) => resolve_employee(account, e)?,
            None => None,
        };
        let recurrence = if self.category == Category::Recurrente {
            let end = self.until.as_deref().map(parse_due_flag).transpose()?;
            Some(RecurrenceConfig::new(
                self.every.unwrap_or_default(),
                self.days,
                self.quarters,
                end,
            ))
        } else {
            None
        };

        let mut notifications = Vec::new();
        if self.remind_day {
            notifications.push(TaskNotification::one_day_before());
        }
        if self.remind_hour {
            notifications.push(TaskNotification::one_hour_before());
        }
        for at in &self.remind_at {
            notifications.push(TaskNotification::custom(parse_due_flag(at)?));
        }

        Ok(NewTask {
            title: self.title,
            description: self.desc.unwrap_or_default(),
            priority: self.priority,
            category: self.category,
            due_date,
            employee_id,
            sub_tasks: self
                .steps
                .into_iter()
                .map(|title| NewSubTask { title, due_date: None })
                .collect(),
            recurrence,
            notifications,
        })
    }
}

fn parse_due_flag(s: &str) -> Result<i64, String> {
    parse_due_input(s).ok_or_else(|| format!("Could not understand date '{s}'"))
}

/// Resolve an employee of `account` by id or name. "me" and "moi" mean nobody.
pub fn resolve_employee(account: &Account, identifier: &str) -> Result<Option<String>, String> {
    let identifier = identifier.trim();
    if identifier.eq_ignore_ascii_case("me") || identifier.eq_ignore_ascii_case("moi") {
        return Ok(None);
    }
    account
        .find_employee(identifier)
        .map(|e| Some(e.id.clone()))
        .ok_or_else(|| format!("No employee '{}' in account '{}'", identifier, account.name))
}

/// Resolve a step by id, 1-based position or case-insensitive title.
pub fn resolve_subtask<'a>(task: &'a Task, identifier: &str) -> Option<&'a SubTask> {
    let subs = task.subtasks();
    let identifier = identifier.trim();
    subs.iter()
        .find(|s| s.id == identifier)
        .or_else(|| {
            identifier
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| subs.get(i))
        })
        .or_else(|| {
            subs.iter()
                .find(|s| s.title.to_lowercase() == identifier.to_lowercase())
        })
}

/// Ask the assistant for steps and store them as the mission's sub-tasks.
///
/// `Ok(None)` when another AI request is running or the mission is gone.
pub fn run_breakdown<S: KeyValueStore>(
    db: &mut Database<S>,
    assistant: &dyn TaskAssistant,
    rt: &Runtime,
    gate: &AiGate,
    id: &str,
) -> Result<Option<Vec<String>>, StoreError> {
    let Some(task) = db.get(id) else {
        return Ok(None);
    };
    let (title, description) = (task.title.clone(), task.description.clone());
    let Some(steps) = ai::run_gated(rt, gate, ai::breakdown_task_ai(assistant, &title, &description))
    else {
        return Ok(None);
    };
    db.apply_breakdown(id, &steps)?;
    Ok(Some(steps))
}

/// What a voice capture produced.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOutcome {
    Busy,
    NothingDetected,
    Created { id: String, title: String, priority: Priority },
}

/// Parse a transcript and, when it names a mission, create it as a plain task.
pub fn run_voice<S: KeyValueStore>(
    db: &mut Database<S>,
    assistant: &dyn TaskAssistant,
    rt: &Runtime,
    gate: &AiGate,
    transcript: &str,
) -> Result<VoiceOutcome, StoreError> {
    let Some(parsed) = ai::run_gated(rt, gate, ai::parse_voice_command(assistant, transcript)) else {
        return Ok(VoiceOutcome::Busy);
    };
    let Some(voice) = parsed else {
        return Ok(VoiceOutcome::NothingDetected);
    };
    Ok(match db.add_task(NewTask::quick(&voice.title, voice.priority))? {
        Some(t) => VoiceOutcome::Created {
            id: t.id.clone(),
            title: t.title.clone(),
            priority: t.priority,
        },
        None => VoiceOutcome::NothingDetected,
    })
}

/// Message shown when a mission gets completed.
pub fn celebration(title: &str) -> String {
    format!("🎉 Bravo ! « {title} » est terminée.")
}

fn exit_on_store_error<T>(result: Result<T, StoreError>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to save data: {e}");
            std::process::exit(1);
        }
    }
}

fn resolve_or_exit(db: &Database, identifier: &str) -> String {
    match db.resolve_task_identifier(identifier) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error resolving mission: {}", e);
            std::process::exit(1);
        }
    }
}

fn account_or_exit<'a>(db: &'a Database, identifier: &str) -> &'a Account {
    match db.resolve_account(identifier) {
        Some(a) => a,
        None => {
            eprintln!("No account with id or name '{}'", identifier);
            std::process::exit(1);
        }
    }
}

fn runtime_or_exit() -> Runtime {
    match ai::runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn assistant(config: &Config) -> GeminiAssistant {
    GeminiAssistant::new(config.api_key.clone(), &config.model)
}

fn title_of(db: &Database, id: &str) -> String {
    db.get(id).map(|t| t.title.clone()).unwrap_or_default()
}

pub fn cmd_ui(db: Database, config: &Config) {
    if let Err(e) = run_tui(db, config) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

pub fn cmd_add(db: &mut Database, args: AddArgs) {
    let input = match args.into_new_task(db.current_account()) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    match exit_on_store_error(db.add_task(input)) {
        Some(task) => println!("Added mission {} ({})", task.id, task.title),
        None => {
            eprintln!("Error: a mission needs a title.");
            std::process::exit(1);
        }
    }
}

/// Print missions in a formatted table.
pub fn print_table(tasks: &[&Task], account: &Account) {
    println!(
        "{:<10} {:<10} {:<11} {:<10} {:<6} {:<12} {}",
        "ID", "Priority", "Category", "Due", "Steps", "Who", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        let (done, total) = views::subtask_progress(t);
        let steps = if total == 0 {
            "-".to_string()
        } else {
            format!("{done}/{total}")
        };
        let who = t
            .employee_id
            .as_deref()
            .and_then(|id| account.employee(id))
            .map(|e| e.name.as_str())
            .unwrap_or("Moi");
        println!(
            "{:<10} {:<10} {:<11} {:<10} {:<6} {:<12} {}",
            t.id,
            t.priority.label(),
            t.category.label(),
            format_due_relative(t.due_date, today),
            steps,
            truncate(who, 12),
            t.title
        );
    }
}

pub fn cmd_list(db: &Database, filter: ActiveFilter) {
    let account = db.current_account();
    if filter == ActiveFilter::Team {
        cmd_team(db);
        return;
    }
    if let ActiveFilter::Employee(ref id) = filter {
        if account.employee(id).is_none() {
            eprintln!("No employee '{}' in account '{}'", id, account.name);
            std::process::exit(1);
        }
    }
    let tasks = db.account_tasks();
    let shown = views::active_filter(&tasks, &filter);
    if shown.is_empty() {
        println!("No active missions. Time for a break 🐾");
        return;
    }
    print_table(&shown, account);
}

pub fn cmd_view(db: &Database, id: String) {
    let id = resolve_or_exit(db, &id);
    let Some(t) = db.get(&id) else {
        eprintln!("Mission {} not found.", id);
        std::process::exit(1);
    };
    let account = db
        .accounts()
        .iter()
        .find(|a| a.id == t.account_id);

    println!("{} {}", t.category.icon(), t.title);
    println!("  id:        {}", t.id);
    println!("  status:    {}", status(t).label());
    println!("  priority:  {} {}", t.priority.icon(), t.priority.label());
    println!("  category:  {}", t.category.label());
    println!("  created:   {}", format_timestamp(t.created_at));
    if let Some(due) = t.due_date {
        println!("  due:       {}", format_timestamp(due));
    }
    if let Some(emp) = t.employee_id.as_deref() {
        let name = account
            .and_then(|a| a.employee(emp))
            .map(|e| e.name.as_str())
            .unwrap_or(emp);
        println!("  assigned:  {}", name);
    }
    if let Some(rec) = &t.recurrence {
        println!("  repeats:   {}", rec.summary());
        if let Some(end) = rec.end_date {
            println!("  until:     {}", format_timestamp(end));
        }
    }
    if !t.description.is_empty() {
        println!();
        println!("{}", t.description);
    }
    if !t.notification_list().is_empty() {
        println!();
        println!("Reminders:");
        for n in t.notification_list() {
            match n.fires_at(t.due_date) {
                Some(at) => println!("  🔔 {} ({})", n.label, format_timestamp(at)),
                None => println!("  🔔 {}", n.label),
            }
        }
    }
    if !t.subtasks().is_empty() {
        let (done, total) = views::subtask_progress(t);
        println!();
        println!("Steps {done}/{total}:");
        for (i, s) in t.subtasks().iter().enumerate() {
            let mark = if s.completed { "x" } else { " " };
            let due = s
                .due_date
                .map(|d| format!("  ({})", format_timestamp(d)))
                .unwrap_or_default();
            println!("  {:>2}. [{}] {}{}", i + 1, mark, s.title, due);
        }
    }
}

pub fn cmd_team(db: &Database) {
    let account = db.current_account();
    if !account.is_work() {
        eprintln!("The team view is only available for work accounts.");
        std::process::exit(1);
    }
    let tasks = db.account_tasks();
    let groups = views::group_by_member(&tasks, &account.employees);
    let mut printed = false;
    for group in groups.iter().filter(|g| !g.tasks.is_empty()) {
        if printed {
            println!();
        }
        println!("── {} ({})", group.member.name(), group.tasks.len());
        print_table(&group.tasks, account);
        printed = true;
    }
    if !printed {
        println!("Nobody has an active mission.");
    }
}

pub fn cmd_history(db: &Database) {
    let tasks = db.account_tasks();
    let parts = views::history_partition(&tasks);
    println!(
        "Terminées: {}  Annulées: {}  Reportées: {}  En cours: {}",
        parts.completed.len(),
        parts.cancelled.len(),
        parts.postponed.len(),
        parts.pending_count()
    );
    let journal = parts.journal();
    if journal.is_empty() {
        return;
    }
    println!();
    for t in journal {
        println!(
            "{:<10} {:<16} {:<9} {}",
            t.id,
            format_timestamp(t.created_at),
            status(t).label(),
            t.title
        );
    }
}

pub fn cmd_progress(db: &Database) {
    let tasks = db.account_tasks();
    let rate = views::completion_rate(&tasks);
    let filled = usize::from(rate) / 5;
    println!(
        "Progrès Focus: {}%{}",
        rate,
        if rate == 100 { " 🏆" } else { "" }
    );
    println!("[{}{}]", "█".repeat(filled), "·".repeat(20 - filled));
}

pub fn cmd_done(db: &mut Database, id: String) {
    let id = resolve_or_exit(db, &id);
    let title = title_of(db, &id);
    match exit_on_store_error(db.toggle_complete(&id)) {
        Some(true) => println!("{}", celebration(&title)),
        Some(false) => println!("Reopened {} ({})", id, title),
        None => {
            eprintln!("Mission {} not found.", id);
            std::process::exit(1);
        }
    }
}

pub fn cmd_cancel(db: &mut Database, id: String) {
    let id = resolve_or_exit(db, &id);
    exit_on_store_error(db.toggle_cancelled(&id));
    match db.get(&id) {
        Some(t) if t.is_cancelled => println!("Cancelled {} ({})", id, t.title),
        Some(t) => println!("Restored {} ({})", id, t.title),
        None => {}
    }
}

pub fn cmd_postpone(db: &mut Database, id: String) {
    let id = resolve_or_exit(db, &id);
    exit_on_store_error(db.toggle_postponed(&id));
    match db.get(&id) {
        Some(t) if t.is_postponed => println!("Postponed {} ({})", id, t.title),
        Some(t) => println!("Back on {} ({})", id, t.title),
        None => {}
    }
}

pub fn cmd_delete(db: &mut Database, id: String) {
    let id = resolve_or_exit(db, &id);
    let title = title_of(db, &id);
    if exit_on_store_error(db.delete_task(&id)) {
        println!("Deleted mission {} ({})", id, title);
    }
}

pub fn cmd_subtask(db: &mut Database, task: String, subtask: String) {
    let id = resolve_or_exit(db, &task);
    let Some(sub) = db.get(&id).and_then(|t| resolve_subtask(t, &subtask)) else {
        eprintln!("No step '{}' in mission {}", subtask, id);
        std::process::exit(1);
    };
    let (sub_id, sub_title, was_done) = (sub.id.clone(), sub.title.clone(), sub.completed);
    exit_on_store_error(db.toggle_subtask(&id, &sub_id));
    let mark = if was_done { "[ ]" } else { "[x]" };
    println!("{} {}", mark, sub_title);
}

pub fn cmd_breakdown(db: &mut Database, config: &Config, id: String) {
    let id = resolve_or_exit(db, &id);
    let rt = runtime_or_exit();
    let gate = AiGate::new();
    let assistant = assistant(config);
    println!("Breaking down « {} »...", title_of(db, &id));
    match exit_on_store_error(run_breakdown(db, &assistant, &rt, &gate, &id)) {
        Some(steps) => {
            info!(id = %id, steps = steps.len(), "breakdown stored");
            for (i, step) in steps.iter().enumerate() {
                println!("  {:>2}. [ ] {}", i + 1, step);
            }
        }
        None => {
            eprintln!("Mission {} not found.", id);
            std::process::exit(1);
        }
    }
}

pub fn cmd_voice(db: &mut Database, config: &Config, transcript: Vec<String>) {
    let transcript = transcript.join(" ");
    let rt = runtime_or_exit();
    let gate = AiGate::new();
    let assistant = assistant(config);
    match exit_on_store_error(run_voice(db, &assistant, &rt, &gate, &transcript)) {
        VoiceOutcome::Created { id, title, priority } => {
            println!("Added mission {} ({} {})", id, priority.icon(), title)
        }
        VoiceOutcome::NothingDetected => {
            eprintln!("No mission detected in what was said.");
            std::process::exit(1);
        }
        VoiceOutcome::Busy => {
            eprintln!("Another AI request is already running.");
            std::process::exit(1);
        }
    }
}

pub fn cmd_assign(db: &mut Database, id: String, employee: Option<String>) {
    let id = resolve_or_exit(db, &id);
    let Some(task) = db.get(&id) else {
        eprintln!("Mission {} not found.", id);
        std::process::exit(1);
    };
    let Some(account) = db.accounts().iter().find(|a| a.id == task.account_id) else {
        eprintln!("Mission {} belongs to a deleted account.", id);
        std::process::exit(1);
    };
    let employee_id = match employee.as_deref().map(|e| resolve_employee(account, e)) {
        Some(Ok(e)) => e,
        Some(Err(e)) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        None => None,
    };
    let who = employee_id
        .as_deref()
        .and_then(|e| account.employee(e))
        .map(|e| e.name.clone())
        .unwrap_or_else(|| "Moi".to_string());
    exit_on_store_error(db.assign(&id, employee_id.as_deref()));
    println!("Assigned {} to {}", id, who);
}

pub fn cmd_account(db: &mut Database, action: AccountAction) {
    match action {
        AccountAction::List => {
            let current = db.current_account().id.clone();
            for a in db.accounts() {
                let star = if a.id == current { "*" } else { " " };
                let kind = if a.is_work() { "work" } else { "personal" };
                println!("{} {:<12} {:<9} {}", star, a.id, kind, a.name);
            }
        }
        AccountAction::Add { name, kind } => match exit_on_store_error(db.add_account(&name, kind)) {
            Some(a) => println!("Added account {} ({})", a.id, a.name),
            None => {
                eprintln!("Error: an account needs a name.");
                std::process::exit(1);
            }
        },
        AccountAction::Rename { account, name } => {
            let id = account_or_exit(db, &account).id.clone();
            if !exit_on_store_error(db.rename_account(&id, &name)) {
                eprintln!("Error: an account needs a name.");
                std::process::exit(1);
            }
            println!("Renamed {} to {}", id, name.trim());
        }
        AccountAction::Delete { account } => {
            let id = account_or_exit(db, &account).id.clone();
            if !exit_on_store_error(db.delete_account(&id)) {
                eprintln!("Error: the last account cannot be deleted.");
                std::process::exit(1);
            }
            println!("Deleted account {}; active account is {}", id, db.current_account().name);
        }
        AccountAction::Switch { account } => {
            let id = account_or_exit(db, &account).id.clone();
            exit_on_store_error(db.switch_account(&id));
            println!("Now working in {}", db.current_account().name);
        }
    }
}

pub fn cmd_employee(db: &mut Database, action: EmployeeAction) {
    let account = db.current_account();
    if !account.is_work() {
        eprintln!("Employees can only be managed in work accounts.");
        std::process::exit(1);
    }
    let account_id = account.id.clone();
    match action {
        EmployeeAction::List => {
            if account.employees.is_empty() {
                println!("No employees in {}.", account.name);
            }
            for e in &account.employees {
                println!("{:<12} {}", e.id, e.name);
            }
        }
        EmployeeAction::Add { name } => match exit_on_store_error(db.add_employee(&account_id, &name)) {
            Some(id) => println!("Added employee {} ({})", id, name.trim()),
            None => {
                eprintln!("Error: an employee needs a name.");
                std::process::exit(1);
            }
        },
        EmployeeAction::Remove { employee } => {
            let employee_id = match resolve_employee(account, &employee) {
                Ok(Some(id)) => id,
                Ok(None) | Err(_) => {
                    eprintln!("No employee '{}' in account '{}'", employee, account.name);
                    std::process::exit(1);
                }
            };
            exit_on_store_error(db.remove_employee(&account_id, &employee_id));
            println!("Removed employee {}; their missions are yours again.", employee_id);
        }
    }
}

pub fn cmd_name(db: &mut Database, name: Option<String>) {
    match name {
        None => println!("{}", db.display_name()),
        Some(name) => {
            exit_on_store_error(db.set_display_name(&name));
            println!("Hello, {}!", db.display_name());
        }
    }
}

pub fn cmd_reset(db: &mut Database, yes: bool) {
    if !yes {
        eprintln!("This erases every mission and account. Run again with --yes to confirm.");
        std::process::exit(1);
    }
    exit_on_store_error(db.reset());
    println!("All data erased.");
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::default_accounts;
    use crate::ai::{AiError, VoiceTask};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct FixedAssistant {
        steps: Vec<String>,
        voice: Option<VoiceTask>,
    }

    #[async_trait]
    impl TaskAssistant for FixedAssistant {
        async fn suggest_steps(&self, _: &str, _: &str) -> Result<Vec<String>, AiError> {
            Ok(self.steps.clone())
        }

        async fn interpret_voice(&self, _: &str) -> Result<Option<VoiceTask>, AiError> {
            Ok(self.voice.clone())
        }
    }

    fn work_account() -> Account {
        let mut acc = default_accounts().remove(1);
        acc.add_employee("Chloé");
        acc
    }

    #[test]
    fn add_args_build_a_project_draft() {
        let args = AddArgs {
            title: "Site web".into(),
            category: Category::Projet,
            priority: Priority::Haute,
            steps: vec!["Maquette".into(), "Intégration".into()],
            employee: Some("chloé".into()),
            remind_day: true,
            due: Some("2030-05-04 14:30".into()),
            ..AddArgs::default()
        };
        let account = work_account();
        let draft = args.into_new_task(&account).unwrap();
        assert_eq!(draft.priority, Priority::Haute);
        assert_eq!(draft.sub_tasks.len(), 2);
        assert_eq!(draft.employee_id.as_deref(), Some(account.employees[0].id.as_str()));
        assert_eq!(draft.notifications.len(), 1);
        assert!(draft.due_date.is_some());
        assert!(draft.recurrence.is_none());
    }

    #[test]
    fn add_args_build_recurrence_only_for_recurring() {
        let args = AddArgs {
            title: "Sport".into(),
            category: Category::Recurrente,
            every: Some(Frequency::Weekly),
            days: vec![0, 2],
            ..AddArgs::default()
        };
        let draft = args.into_new_task(&work_account()).unwrap();
        let rec = draft.recurrence.unwrap();
        assert_eq!(rec.frequency, Frequency::Weekly);
        assert_eq!(rec.days_of_week, Some(vec![0, 2]));
    }

    #[test]
    fn add_args_reject_bad_input() {
        let bad_due = AddArgs {
            title: "x".into(),
            due: Some("someday".into()),
            ..AddArgs::default()
        };
        assert!(bad_due.into_new_task(&work_account()).is_err());

        let unknown = AddArgs {
            title: "x".into(),
            employee: Some("Nobody".into()),
            ..AddArgs::default()
        };
        assert!(unknown.into_new_task(&work_account()).is_err());
    }

    #[test]
    fn employee_resolution_accepts_me() {
        let account = work_account();
        assert_eq!(resolve_employee(&account, "moi").unwrap(), None);
        assert_eq!(resolve_employee(&account, "ME").unwrap(), None);
        let id = account.employees[0].id.clone();
        assert_eq!(resolve_employee(&account, &id).unwrap(), Some(id));
    }

    #[test]
    fn subtask_resolution_by_id_position_and_title() {
        let mut db = Database::load(MemoryStore::new());
        let id = db.add_task(NewTask::quick("Ranger", Priority::Basse)).unwrap().unwrap().id.clone();
        db.apply_breakdown(&id, &["Bureau".to_string(), "Cuisine".to_string()]).unwrap();
        let task = db.get(&id).unwrap();
        let second = task.subtasks()[1].id.clone();

        assert_eq!(resolve_subtask(task, "2").unwrap().id, second);
        assert_eq!(resolve_subtask(task, &second).unwrap().title, "Cuisine");
        assert_eq!(resolve_subtask(task, "bureau").unwrap().title, "Bureau");
        assert!(resolve_subtask(task, "0").is_none());
        assert!(resolve_subtask(task, "3").is_none());
    }

    #[test]
    fn breakdown_flow_stores_steps() {
        let mut db = Database::load(MemoryStore::new());
        let id = db.add_task(NewTask::quick("Déménager", Priority::Urgent)).unwrap().unwrap().id.clone();
        let rt = ai::runtime().unwrap();
        let gate = AiGate::new();
        let assistant = FixedAssistant {
            steps: vec!["Cartons".into(), " ".into(), "Camion".into()],
            voice: None,
        };

        let steps = run_breakdown(&mut db, &assistant, &rt, &gate, &id).unwrap().unwrap();
        assert_eq!(steps, ["Cartons", "Camion"]);
        let titles: Vec<&str> = db.get(&id).unwrap().subtasks().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Cartons", "Camion"]);
        assert!(!gate.is_busy());

        assert_eq!(run_breakdown(&mut db, &assistant, &rt, &gate, "missing").unwrap(), None);
    }

    #[test]
    fn breakdown_is_refused_while_busy() {
        let mut db = Database::load(MemoryStore::new());
        let id = db.add_task(NewTask::quick("Trier", Priority::Basse)).unwrap().unwrap().id.clone();
        let rt = ai::runtime().unwrap();
        let gate = AiGate::new();
        let assistant = FixedAssistant { steps: vec!["a".into()], voice: None };

        let _held = gate.try_begin().unwrap();
        assert_eq!(run_breakdown(&mut db, &assistant, &rt, &gate, &id).unwrap(), None);
        assert!(db.get(&id).unwrap().subtasks().is_empty());
    }

    #[test]
    fn voice_flow_creates_a_plain_task() {
        let mut db = Database::load(MemoryStore::new());
        let rt = ai::runtime().unwrap();
        let gate = AiGate::new();
        let assistant = FixedAssistant {
            steps: Vec::new(),
            voice: Some(VoiceTask { title: "Appeler le garage".into(), priority: Priority::Urgent }),
        };

        let outcome = run_voice(&mut db, &assistant, &rt, &gate, "appeler le garage vite").unwrap();
        let VoiceOutcome::Created { id, priority, .. } = outcome else {
            panic!("expected a mission to be created");
        };
        assert_eq!(priority, Priority::Urgent);
        let t = db.get(&id).unwrap();
        assert_eq!(t.category, Category::Tache);
        assert_eq!(t.description, "");
        assert_eq!(t.account_id, db.current_account().id);

        let silent = FixedAssistant { steps: Vec::new(), voice: None };
        assert_eq!(
            run_voice(&mut db, &silent, &rt, &gate, "bonjour").unwrap(),
            VoiceOutcome::NothingDetected
        );
        assert_eq!(db.tasks().len(), 1);
    }
}
