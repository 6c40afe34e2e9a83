//! Mission database and shared helpers.
//!
//! `Database` is the single owner of the mission and account collections. It
//! loads every key once at start, applies each mutation through the
//! [`crate::lifecycle`] transitions, and writes the collections back right
//! away. The module also carries the date parsing and formatting helpers the
//! CLI and TUI share.

use std::collections::HashSet;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::account::{default_accounts, Account};
use crate::fields::AccountType;
use crate::lifecycle;
use crate::store::{FileStore, KeyValueStore, StoreError};
use crate::task::{now_millis, NewTask, Task};
use crate::views;

pub const TASKS_KEY: &str = "mewfocus_tasks";
pub const ACCOUNTS_KEY: &str = "mewfocus_accounts";
pub const CURRENT_ACCOUNT_KEY: &str = "mewfocus_current_acc_id";
pub const USER_KEY: &str = "mewfocus_user";

pub const DEFAULT_USER_NAME: &str = "Utilisateur";

/// In-memory state for missions and accounts, written through to a store.
#[derive(Debug)]
pub struct Database<S: KeyValueStore = FileStore> {
    store: S,
    tasks: Vec<Task>,
    accounts: Vec<Account>,
    current_account_id: String,
    display_name: String,
}

impl<S: KeyValueStore> Database<S> {
    /// Load every key independently. Missing or unreadable values fall back to
    /// their defaults without affecting the others.
    pub fn load(store: S) -> Self {
        let tasks: Vec<Task> = load_json(&store, TASKS_KEY).unwrap_or_default();
        let mut accounts: Vec<Account> =
            load_json(&store, ACCOUNTS_KEY).unwrap_or_else(default_accounts);
        if accounts.is_empty() {
            warn!("stored account list was empty, restoring defaults");
            accounts = default_accounts();
        }
        let current_account_id = load_raw(&store, CURRENT_ACCOUNT_KEY)
            .unwrap_or_else(|| accounts[0].id.clone());
        let display_name =
            load_raw(&store, USER_KEY).unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        info!(
            tasks = tasks.len(),
            accounts = accounts.len(),
            "database loaded"
        );
        Database {
            store,
            tasks,
            accounts,
            current_account_id,
            display_name,
        }
    }

    /// Write missions, accounts and the active account id back to the store.
    pub fn save(&self) -> Result<(), StoreError> {
        self.store.set(TASKS_KEY, &to_json(TASKS_KEY, &self.tasks)?)?;
        self.store
            .set(ACCOUNTS_KEY, &to_json(ACCOUNTS_KEY, &self.accounts)?)?;
        self.store
            .set(CURRENT_ACCOUNT_KEY, &self.current_account_id)?;
        debug!("database saved");
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The active account; an unknown stored id resolves to the first account.
    pub fn current_account(&self) -> &Account {
        self.accounts
            .iter()
            .find(|a| a.id == self.current_account_id)
            .unwrap_or(&self.accounts[0])
    }

    /// Missions of the active account.
    pub fn account_tasks(&self) -> Vec<&Task> {
        views::for_account(&self.tasks, &self.current_account().id)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a mission in the active account. Blank titles are ignored.
    pub fn add_task(&mut self, input: NewTask) -> Result<Option<&Task>, StoreError> {
        let account_id = self.current_account().id.clone();
        let ids: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let Some(task) = lifecycle::create(input, &account_id, &ids, now_millis()) else {
            return Ok(None);
        };
        info!(id = %task.id, account = %account_id, "mission added");
        self.tasks.insert(0, task);
        self.save()?;
        Ok(self.tasks.first())
    }

    /// Toggle completion. Returns `Some(celebrate)` when the mission exists.
    pub fn toggle_complete(&mut self, id: &str) -> Result<Option<bool>, StoreError> {
        let mut celebrate = None;
        self.replace(id, |t| {
            let c = lifecycle::toggle_complete(t);
            celebrate = Some(c.celebrate);
            c.task
        })?;
        Ok(celebrate)
    }

    pub fn toggle_cancelled(&mut self, id: &str) -> Result<bool, StoreError> {
        self.replace(id, lifecycle::toggle_cancelled)
    }

    /// Postpone, or reactivate a postponed mission.
    pub fn toggle_postponed(&mut self, id: &str) -> Result<bool, StoreError> {
        self.replace(id, lifecycle::toggle_postponed)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool, StoreError> {
        self.replace(task_id, |t| lifecycle::toggle_subtask(t, subtask_id))
    }

    /// Replace the sub-tasks of a mission with the given steps.
    pub fn apply_breakdown(&mut self, id: &str, steps: &[String]) -> Result<bool, StoreError> {
        self.replace(id, |t| lifecycle::apply_breakdown(t, steps))
    }

    pub fn assign(&mut self, id: &str, employee_id: Option<&str>) -> Result<bool, StoreError> {
        self.replace(id, |t| lifecycle::assign(t, employee_id))
    }

    /// Remove a mission for good. Unknown ids are a no-op.
    pub fn delete_task(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        info!(id, "mission deleted");
        self.save()?;
        Ok(true)
    }

    pub fn add_account(&mut self, name: &str, kind: AccountType) -> Result<Option<&Account>, StoreError> {
        let Some(mut account) = Account::new(name, kind) else {
            return Ok(None);
        };
        while self.accounts.iter().any(|a| a.id == account.id) {
            account = Account::new(name, kind).unwrap_or(account);
        }
        info!(id = %account.id, "account added");
        self.accounts.push(account);
        self.save()?;
        Ok(self.accounts.last())
    }

    pub fn rename_account(&mut self, id: &str, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let Some(acc) = self.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };
        acc.name = name.to_string();
        self.save()?;
        Ok(true)
    }

    /// Delete an account. The last remaining account cannot be deleted.
    /// Its missions stay in storage but are no longer shown.
    pub fn delete_account(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.accounts.len() <= 1 || !self.accounts.iter().any(|a| a.id == id) {
            return Ok(false);
        }
        self.accounts.retain(|a| a.id != id);
        if self.current_account_id == id {
            self.current_account_id = self.accounts[0].id.clone();
        }
        info!(id, "account deleted");
        self.save()?;
        Ok(true)
    }

    pub fn switch_account(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.accounts.iter().any(|a| a.id == id) {
            return Ok(false);
        }
        self.current_account_id = id.to_string();
        info!(id, "active account switched");
        self.save()?;
        Ok(true)
    }

    /// Add an employee to an account and return its id.
    pub fn add_employee(&mut self, account_id: &str, name: &str) -> Result<Option<String>, StoreError> {
        let Some(acc) = self.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Ok(None);
        };
        let Some(id) = acc.add_employee(name).map(|e| e.id.clone()) else {
            return Ok(None);
        };
        self.save()?;
        Ok(Some(id))
    }

    /// Remove an employee. Missions assigned to them go back to self.
    pub fn remove_employee(&mut self, account_id: &str, employee_id: &str) -> Result<bool, StoreError> {
        let Some(acc) = self.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Ok(false);
        };
        if !acc.remove_employee(employee_id) {
            return Ok(false);
        }
        let mut released = 0;
        for t in self.tasks.iter_mut().filter(|t| {
            t.account_id == account_id && t.employee_id.as_deref() == Some(employee_id)
        }) {
            t.employee_id = None;
            released += 1;
        }
        info!(employee_id, released, "employee removed");
        self.save()?;
        Ok(true)
    }

    pub fn set_display_name(&mut self, name: &str) -> Result<(), StoreError> {
        self.display_name = name.to_string();
        self.store.set(USER_KEY, &self.display_name)
    }

    /// Wipe the store and go back to a fresh install.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.tasks.clear();
        self.accounts = default_accounts();
        self.current_account_id = self.accounts[0].id.clone();
        self.display_name = DEFAULT_USER_NAME.to_string();
        warn!("all data reset");
        Ok(())
    }

    /// Resolve a mission of the active account by id, unique id prefix, or
    /// case-insensitive title.
    pub fn resolve_task_identifier(&self, identifier: &str) -> Result<String, String> {
        let identifier = identifier.trim();
        let scoped = self.account_tasks();
        if let Some(t) = scoped.iter().find(|t| t.id == identifier) {
            return Ok(t.id.clone());
        }

        let by_prefix: Vec<&&Task> = scoped
            .iter()
            .filter(|t| t.id.starts_with(identifier))
            .collect();
        if by_prefix.len() == 1 && identifier.len() >= 3 {
            return Ok(by_prefix[0].id.clone());
        }

        let matches: Vec<&Task> = scoped
            .into_iter()
            .filter(|t| t.title.to_lowercase() == identifier.to_lowercase())
            .collect();
        match matches.len() {
            0 => Err(format!("No mission found with id or title '{}'", identifier)),
            1 => Ok(matches[0].id.clone()),
            _ => {
                let mut error_msg = format!("Multiple missions found with title '{}':\n", identifier);
                for task in matches {
                    error_msg.push_str(&format!("  {}: {}\n", task.id, task.title));
                }
                error_msg.push_str("Please use the specific id instead.");
                Err(error_msg)
            }
        }
    }

    /// Resolve an account by id or case-insensitive name.
    pub fn resolve_account(&self, identifier: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.id == identifier)
            .or_else(|| {
                self.accounts
                    .iter()
                    .find(|a| a.name.to_lowercase() == identifier.to_lowercase())
            })
    }

    fn replace<F>(&mut self, id: &str, f: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&Task) -> Task,
    {
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "no mission to update");
            return Ok(false);
        };
        *slot = f(slot);
        self.save()?;
        Ok(true)
    }
}

fn load_json<T: DeserializeOwned, S: KeyValueStore>(store: &S, key: &str) -> Option<T> {
    let raw = load_raw(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, error = %e, "stored value is malformed, using default");
            None
        }
    }
}

fn load_raw<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "could not read stored value, using default");
            None
        }
    }
}

fn to_json<T: Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })
}

/// Parse a human-readable due date with an optional `HH:MM` time.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday", "next friday", "this sunday" and short forms
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
///
/// Without a time the due moment is 09:00 local time.
pub fn parse_due_input(s: &str) -> Option<i64> {
    let s = s.trim().to_lowercase();
    let (date_part, time) = match s.rsplit_once(' ') {
        Some((rest, last)) => match NaiveTime::parse_from_str(last, "%H:%M") {
            Ok(t) => (rest.trim().to_string(), t),
            Err(_) => (s.clone(), default_due_time()),
        },
        None => match NaiveTime::parse_from_str(&s, "%H:%M") {
            Ok(t) => ("today".to_string(), t),
            Err(_) => (s.clone(), default_due_time()),
        },
    };
    let date = parse_due_date(&date_part, Local::now().date_naive())?;
    Local
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

fn default_due_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn parse_due_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    match s {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_this_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let year = today.year();
            let month = today.month();
            let next_month = if month == 12 { 1 } else { month + 1 };
            let next_year = if month == 12 { year + 1 } else { year };
            let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        _ => {}
    }

    // Offsets too large for a calendar date are not understood.
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_days(days)?);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_weeks(weeks)?);
            }
        }
        if let Some(nm) = rest.strip_suffix('m') {
            if let Ok(months) = nm.trim().parse::<i64>() {
                // Approximate: 30 days per month
                return today.checked_add_signed(Duration::try_days(months.checked_mul(30)?)?);
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current_day = today.weekday().num_days_from_monday() as i64;
    for (day_name, target_day) in weekdays {
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name || s == format!("this {}", day_name) {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {}", day_name) {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days_to_add));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Calculate the start and end dates of the current ISO week (Monday to Sunday).
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    let end = start + Duration::days(6);
    (start, end)
}

fn local_date(ms: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.date_naive())
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<i64>, today: NaiveDate) -> String {
    match due.and_then(local_date) {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {}d", delta)
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

/// Format an epoch-millisecond instant as local "YYYY-MM-DD HH:MM".
pub fn format_timestamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Category, Priority};
    use crate::store::MemoryStore;

    fn project_input(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            category: Category::Projet,
            ..NewTask::default()
        }
    }

    #[test]
    fn fresh_store_gives_defaults() {
        let store = MemoryStore::new();
        let db = Database::load(&store);
        assert!(db.tasks().is_empty());
        assert_eq!(db.accounts().len(), 2);
        assert_eq!(db.current_account().id, "acc_perso");
        assert_eq!(db.display_name(), DEFAULT_USER_NAME);
    }

    #[test]
    fn malformed_keys_fall_back_independently() {
        let store = MemoryStore::with(&[
            (TASKS_KEY, "{not json"),
            (ACCOUNTS_KEY, r#"[{"id":"acc_x","name":"Solo","type":"WORK","employees":[]}]"#),
            (CURRENT_ACCOUNT_KEY, "acc_x"),
            (USER_KEY, "Camille"),
        ]);
        let db = Database::load(&store);
        assert!(db.tasks().is_empty());
        assert_eq!(db.accounts().len(), 1);
        assert_eq!(db.current_account().name, "Solo");
        assert_eq!(db.display_name(), "Camille");
    }

    #[test]
    fn unknown_current_account_resolves_to_first() {
        let store = MemoryStore::with(&[(CURRENT_ACCOUNT_KEY, "acc_gone")]);
        let db = Database::load(&store);
        assert_eq!(db.current_account().id, "acc_perso");
    }

    #[test]
    fn every_mutation_is_written_through() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        let id = db
            .add_task(NewTask::quick("Appeler maman", Priority::Haute))
            .unwrap()
            .unwrap()
            .id
            .clone();
        assert_eq!(db.toggle_complete(&id).unwrap(), Some(true));

        let reloaded = Database::load(&store);
        let t = reloaded.get(&id).unwrap();
        assert!(t.completed);
        assert_eq!(t.account_id, "acc_perso");
    }

    #[test]
    fn blank_title_adds_nothing() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        assert!(db.add_task(NewTask::quick(" ", Priority::Basse)).unwrap().is_none());
        assert!(db.tasks().is_empty());
        assert_eq!(store.get(TASKS_KEY).unwrap(), None);
    }

    #[test]
    fn new_missions_go_to_the_active_account_and_front() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        db.add_task(NewTask::quick("perso", Priority::Basse)).unwrap();
        assert!(db.switch_account("acc_work1").unwrap());
        db.add_task(NewTask::quick("boulot", Priority::Basse)).unwrap();
        assert_eq!(db.tasks()[0].title, "boulot");
        assert_eq!(db.tasks()[0].account_id, "acc_work1");
        let titles: Vec<&str> = db.account_tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["boulot"]);
        assert!(!db.switch_account("acc_nope").unwrap());
    }

    #[test]
    fn transitions_and_delete_on_unknown_ids_are_noops() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        assert_eq!(db.toggle_complete("missing").unwrap(), None);
        assert!(!db.toggle_cancelled("missing").unwrap());
        assert!(!db.toggle_postponed("missing").unwrap());
        assert!(!db.delete_task("missing").unwrap());
    }

    #[test]
    fn breakdown_and_subtasks_persist() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        let id = db.add_task(project_input("Déménager")).unwrap().unwrap().id.clone();
        let steps = vec!["Cartons".to_string(), "Camion".to_string()];
        assert!(db.apply_breakdown(&id, &steps).unwrap());
        let sub = db.get(&id).unwrap().subtasks()[1].id.clone();
        assert!(db.toggle_subtask(&id, &sub).unwrap());

        let reloaded = Database::load(&store);
        let subs = reloaded.get(&id).unwrap().subtasks();
        assert_eq!(subs.len(), 2);
        assert!(!subs[0].completed);
        assert!(subs[1].completed);
    }

    #[test]
    fn removing_an_employee_releases_their_missions() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        db.switch_account("acc_work1").unwrap();
        let emp = db.add_employee("acc_work1", "Chloé").unwrap().unwrap();
        let id = db.add_task(NewTask::quick("Audit", Priority::Urgent)).unwrap().unwrap().id.clone();
        assert!(db.assign(&id, Some(emp.as_str())).unwrap());
        assert_eq!(db.get(&id).unwrap().employee_id.as_deref(), Some(emp.as_str()));

        assert!(db.remove_employee("acc_work1", &emp).unwrap());
        assert_eq!(db.get(&id).unwrap().employee_id, None);
        assert!(db.current_account().employees.is_empty());
    }

    #[test]
    fn account_management_rules() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        assert!(db.add_account("  ", AccountType::Work).unwrap().is_none());
        let id = db.add_account("Asso", AccountType::Personal).unwrap().unwrap().id.clone();
        assert!(!db.rename_account(&id, "").unwrap());
        assert!(db.rename_account(&id, "Association").unwrap());
        assert_eq!(db.resolve_account("association").map(|a| a.id.clone()), Some(id.clone()));

        db.switch_account(&id).unwrap();
        assert!(db.delete_account(&id).unwrap());
        assert_eq!(db.current_account().id, "acc_perso");
        assert!(db.delete_account("acc_work1").unwrap());
        assert!(!db.delete_account("acc_perso").unwrap());
        assert_eq!(db.accounts().len(), 1);
    }

    #[test]
    fn reset_restores_fresh_install() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        db.add_task(NewTask::quick("x", Priority::Basse)).unwrap();
        db.set_display_name("Alex").unwrap();
        db.reset().unwrap();
        assert!(db.tasks().is_empty());
        assert_eq!(db.display_name(), DEFAULT_USER_NAME);
        let reloaded = Database::load(&store);
        assert!(reloaded.tasks().is_empty());
        assert_eq!(reloaded.display_name(), DEFAULT_USER_NAME);
    }

    #[test]
    fn identifiers_resolve_by_id_prefix_and_title() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        let id = db.add_task(NewTask::quick("Lire", Priority::Basse)).unwrap().unwrap().id.clone();
        assert_eq!(db.resolve_task_identifier(&id), Ok(id.clone()));
        assert_eq!(db.resolve_task_identifier(&id[..5]), Ok(id.clone()));
        assert_eq!(db.resolve_task_identifier("LIRE"), Ok(id.clone()));
        assert!(db.resolve_task_identifier("Écrire").is_err());
    }

    #[test]
    fn file_backed_database_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::load(FileStore::new(dir.path()));
        db.add_task(NewTask::quick("Sur disque", Priority::Moyenne)).unwrap();
        let again = Database::load(FileStore::new(dir.path()));
        assert_eq!(again.tasks()[0].title, "Sur disque");
    }

    #[test]
    fn due_input_parsing() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(); // Wednesday
        assert_eq!(parse_due_date("tomorrow", today), NaiveDate::from_ymd_opt(2026, 10, 15));
        assert_eq!(parse_due_date("in 3d", today), NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(parse_due_date("friday", today), NaiveDate::from_ymd_opt(2026, 10, 16));
        assert_eq!(parse_due_date("next wednesday", today), NaiveDate::from_ymd_opt(2026, 10, 21));
        assert_eq!(parse_due_date("eom", today), NaiveDate::from_ymd_opt(2026, 10, 31));
        assert_eq!(parse_due_date("2027-01-02", today), NaiveDate::from_ymd_opt(2027, 1, 2));
        assert_eq!(parse_due_date("someday", today), None);
        assert_eq!(parse_due_date("in 2w", today), NaiveDate::from_ymd_opt(2026, 10, 28));

        let with_time = parse_due_input("2027-01-02 14:30").unwrap();
        assert_eq!(format_timestamp(with_time), "2027-01-02 14:30");
        let morning = parse_due_input("2027-01-02").unwrap();
        assert_eq!(format_timestamp(morning), "2027-01-02 09:00");
    }

    #[test]
    fn huge_relative_offsets_are_not_understood() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        assert_eq!(parse_due_date("in 999999999999d", today), None);
        assert_eq!(parse_due_date("in 999999999999w", today), None);
        assert_eq!(parse_due_date("in 999999999999999999m", today), None);
        assert_eq!(parse_due_input("in 999999999999d"), None);
        assert_eq!(parse_due_input("in 999999999999999999m 10:00"), None);
    }

    #[test]
    fn identifiers_only_match_the_active_account() {
        let store = MemoryStore::new();
        let mut db = Database::load(&store);
        let id = db.add_task(NewTask::quick("Lire", Priority::Basse)).unwrap().unwrap().id.clone();
        db.switch_account("acc_work1").unwrap();
        assert!(db.resolve_task_identifier(&id).is_err());
        assert!(db.resolve_task_identifier(&id[..5]).is_err());
        assert!(db.resolve_task_identifier("Lire").is_err());
        db.switch_account("acc_perso").unwrap();
        assert_eq!(db.resolve_task_identifier(&id[..5]), Ok(id));
    }

    #[test]
    fn relative_due_formatting() {
        let today = Local::now().date_naive();
        let now = now_millis();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(now), today), "today");
        assert_eq!(truncate("Ranger la cave", 6), "Range…");
    }
}
