//! Mission form handling for the terminal user interface.
//!
//! The form shows only the fields that apply to the chosen category: steps
//! for projects, frequency and its details for recurring missions. Focus is an
//! index into [`TaskForm::visible_fields`], which is recomputed on every
//! change, so switching category never leaves focus on a hidden field.

use crate::account::Account;
use crate::db::parse_due_input;
use crate::fields::{Category, Frequency, Priority};
use crate::task::{NewSubTask, NewTask, RecurrenceConfig, TaskNotification};
use crate::tui::input::InputField;

pub const FREQUENCIES: [Frequency; 5] = [
    Frequency::Daily,
    Frequency::Weekly,
    Frequency::Monthly,
    Frequency::Quarterly,
    Frequency::Yearly,
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    Title,
    Description,
    Priority,
    Category,
    Due,
    Assignee,
    Steps,
    Frequency,
    Days,
    Quarters,
    Until,
    RemindDay,
    RemindHour,
    RemindAt,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Titre *",
            FormField::Description => "Description / Notes",
            FormField::Priority => "Urgence",
            FormField::Category => "Type",
            FormField::Due => "Échéance (today, tomorrow 18:00, friday, in 3d, YYYY-MM-DD)",
            FormField::Assignee => "Pour qui",
            FormField::Steps => "Plan de vol (étapes séparées par ;)",
            FormField::Frequency => "Fréquence",
            FormField::Days => "Jours (0 = lundi ... 6 = dimanche, ex: 0,2,4)",
            FormField::Quarters => "Trimestres (1-4, ex: 1,3)",
            FormField::Until => "Jusqu'au",
            FormField::RemindDay => "Rappel 1 jour avant",
            FormField::RemindHour => "Rappel 1 heure avant",
            FormField::RemindAt => "Rappel personnalisé (même format que l'échéance)",
        }
    }

    pub fn is_text(self) -> bool {
        !matches!(
            self,
            FormField::Priority
                | FormField::Category
                | FormField::Assignee
                | FormField::Frequency
                | FormField::RemindDay
                | FormField::RemindHour
        )
    }
}

/// Add-mission form state.
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub steps: InputField,
    pub days: InputField,
    pub quarters: InputField,
    pub until: InputField,
    pub remind_at: InputField,
    pub priority: usize,
    pub category: usize,
    pub frequency: usize,
    /// 0 is yourself, `i` is `employees[i - 1]`.
    pub assignee: usize,
    pub remind_day: bool,
    pub remind_hour: bool,
    pub current_field: usize,
    /// (id, name) of the employees the mission can be assigned to.
    pub employees: Vec<(String, String)>,
}

impl TaskForm {
    /// Empty form for the given account.
    pub fn new(account: &Account) -> Self {
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            steps: InputField::new(),
            days: InputField::new(),
            quarters: InputField::new(),
            until: InputField::new(),
            remind_at: InputField::new(),
            priority: Priority::ALL
                .iter()
                .position(|&p| p == Priority::default())
                .unwrap_or(0),
            category: 0,
            frequency: 0,
            assignee: 0,
            remind_day: false,
            remind_hour: false,
            current_field: 0,
            employees: account
                .employees
                .iter()
                .map(|e| (e.id.clone(), e.name.clone()))
                .collect(),
        };
        form.update_active_field();
        form
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    pub fn selected_category(&self) -> Category {
        Category::ALL[self.category % Category::ALL.len()]
    }

    pub fn selected_frequency(&self) -> Frequency {
        FREQUENCIES[self.frequency % FREQUENCIES.len()]
    }

    pub fn assignee_name(&self) -> &str {
        match self.assignee {
            0 => "Moi",
            i => self.employees.get(i - 1).map(|(_, n)| n.as_str()).unwrap_or("Moi"),
        }
    }

    /// Fields shown for the current category, in focus order.
    pub fn visible_fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Title,
            FormField::Description,
            FormField::Priority,
            FormField::Category,
            FormField::Due,
        ];
        if !self.employees.is_empty() {
            fields.push(FormField::Assignee);
        }
        match self.selected_category() {
            Category::Projet => fields.push(FormField::Steps),
            Category::Recurrente => {
                fields.push(FormField::Frequency);
                match self.selected_frequency() {
                    Frequency::Weekly => fields.push(FormField::Days),
                    Frequency::Quarterly => fields.push(FormField::Quarters),
                    _ => {}
                }
                fields.push(FormField::Until);
            }
            _ => {}
        }
        fields.extend([FormField::RemindDay, FormField::RemindHour, FormField::RemindAt]);
        fields
    }

    pub fn current(&self) -> FormField {
        let fields = self.visible_fields();
        fields[self.current_field.min(fields.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.visible_fields().len();
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        let len = self.visible_fields().len();
        self.current_field = (self.current_field + len - 1) % len;
        self.update_active_field();
    }

    fn input_mut(&mut self, field: FormField) -> Option<&mut InputField> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Due => Some(&mut self.due),
            FormField::Steps => Some(&mut self.steps),
            FormField::Days => Some(&mut self.days),
            FormField::Quarters => Some(&mut self.quarters),
            FormField::Until => Some(&mut self.until),
            FormField::RemindAt => Some(&mut self.remind_at),
            _ => None,
        }
    }

    /// Text shown for a field.
    pub fn display_value(&self, field: FormField) -> String {
        let toggle = |on: bool| if on { "[x]" } else { "[ ]" }.to_string();
        match field {
            FormField::Title => self.title.value.clone(),
            FormField::Description => self.description.value.clone(),
            FormField::Due => self.due.value.clone(),
            FormField::Steps => self.steps.value.clone(),
            FormField::Days => self.days.value.clone(),
            FormField::Quarters => self.quarters.value.clone(),
            FormField::Until => self.until.value.clone(),
            FormField::RemindAt => self.remind_at.value.clone(),
            FormField::Priority => {
                let p = self.selected_priority();
                format!("< {} {} >", p.icon(), p.label())
            }
            FormField::Category => {
                let c = self.selected_category();
                format!("< {} {} >", c.icon(), c.label())
            }
            FormField::Frequency => format!("< {:?} >", self.selected_frequency()),
            FormField::Assignee => format!("< {} >", self.assignee_name()),
            FormField::RemindDay => toggle(self.remind_day),
            FormField::RemindHour => toggle(self.remind_hour),
        }
    }

    /// Cursor position of the focused text field, in characters.
    pub fn cursor(&self) -> Option<usize> {
        let f = match self.current() {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Due => &self.due,
            FormField::Steps => &self.steps,
            FormField::Days => &self.days,
            FormField::Quarters => &self.quarters,
            FormField::Until => &self.until,
            FormField::RemindAt => &self.remind_at,
            _ => return None,
        };
        Some(f.cursor)
    }

    pub fn update_active_field(&mut self) {
        let current = self.current();
        for field in [
            FormField::Title,
            FormField::Description,
            FormField::Due,
            FormField::Steps,
            FormField::Days,
            FormField::Quarters,
            FormField::Until,
            FormField::RemindAt,
        ] {
            if let Some(input) = self.input_mut(field) {
                input.active = field == current;
            }
        }
    }

    /// Type into the focused field. Space flips a focused toggle.
    pub fn handle_char(&mut self, c: char) {
        let current = self.current();
        match current {
            FormField::RemindDay if c == ' ' => self.remind_day = !self.remind_day,
            FormField::RemindHour if c == ' ' => self.remind_hour = !self.remind_hour,
            _ => {
                if let Some(input) = self.input_mut(current) {
                    input.handle_char(c);
                }
            }
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.input_mut(self.current()) {
            input.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.input_mut(self.current()) {
            input.handle_delete();
        }
    }

    /// Left/right: move the cursor, cycle a selector or flip a toggle.
    pub fn handle_left_right(&mut self, right: bool) {
        let cycle = |i: usize, len: usize| if right { (i + 1) % len } else { (i + len - 1) % len };
        match self.current() {
            FormField::Priority => self.priority = cycle(self.priority, Priority::ALL.len()),
            FormField::Category => self.category = cycle(self.category, Category::ALL.len()),
            FormField::Frequency => self.frequency = cycle(self.frequency, FREQUENCIES.len()),
            FormField::Assignee => self.assignee = cycle(self.assignee, self.employees.len() + 1),
            FormField::RemindDay => self.remind_day = !self.remind_day,
            FormField::RemindHour => self.remind_hour = !self.remind_hour,
            field => {
                if let Some(input) = self.input_mut(field) {
                    if right {
                        input.move_cursor_right();
                    } else {
                        input.move_cursor_left();
                    }
                }
            }
        }
        // Focus may sit past a field that just disappeared.
        let len = self.visible_fields().len();
        if self.current_field >= len {
            self.current_field = len - 1;
        }
        self.update_active_field();
    }

    /// Build the mission draft, or explain which field is wrong.
    pub fn to_new_task(&self) -> Result<NewTask, String> {
        let date = |field: &InputField, what: &str| -> Result<Option<i64>, String> {
            let raw = field.value.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            parse_due_input(raw)
                .map(Some)
                .ok_or_else(|| format!("{what}: date '{raw}' not understood"))
        };
        let numbers = |field: &InputField, what: &str| -> Result<Vec<u8>, String> {
            field
                .value
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<u8>().map_err(|_| format!("{what}: '{s}' is not a number")))
                .collect()
        };

        let category = self.selected_category();
        let recurrence = if category == Category::Recurrente {
            Some(RecurrenceConfig::new(
                self.selected_frequency(),
                numbers(&self.days, "Jours")?,
                numbers(&self.quarters, "Trimestres")?,
                date(&self.until, "Jusqu'au")?,
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
        if let Some(at) = date(&self.remind_at, "Rappel")? {
            notifications.push(TaskNotification::custom(at));
        }

        Ok(NewTask {
            title: self.title.value.trim().to_string(),
            description: self.description.value.trim().to_string(),
            priority: self.selected_priority(),
            category,
            due_date: date(&self.due, "Échéance")?,
            employee_id: self
                .assignee
                .checked_sub(1)
                .and_then(|i| self.employees.get(i))
                .map(|(id, _)| id.clone()),
            sub_tasks: self
                .steps
                .value
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| NewSubTask { title: s.to_string(), due_date: None })
                .collect(),
            recurrence,
            notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::default_accounts;

    fn form() -> TaskForm {
        let mut acc = default_accounts().remove(1);
        acc.add_employee("Chloé");
        TaskForm::new(&acc)
    }

    fn focus(form: &mut TaskForm, field: FormField) {
        form.current_field = form.visible_fields().iter().position(|&f| f == field).unwrap();
        form.update_active_field();
    }

    fn type_str(form: &mut TaskForm, s: &str) {
        for c in s.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn fields_follow_the_category() {
        let mut f = form();
        assert!(!f.visible_fields().contains(&FormField::Steps));
        f.category = Category::ALL.iter().position(|&c| c == Category::Projet).unwrap();
        assert!(f.visible_fields().contains(&FormField::Steps));
        assert!(!f.visible_fields().contains(&FormField::Frequency));

        f.category = Category::ALL.iter().position(|&c| c == Category::Recurrente).unwrap();
        f.frequency = 1; // weekly
        let fields = f.visible_fields();
        assert!(fields.contains(&FormField::Days));
        assert!(!fields.contains(&FormField::Quarters));
    }

    #[test]
    fn personal_forms_hide_the_assignee() {
        let f = TaskForm::new(&default_accounts()[0]);
        assert!(!f.visible_fields().contains(&FormField::Assignee));
        assert_eq!(f.selected_priority(), Priority::Moyenne);
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut f = form();
        type_str(&mut f, "Réunion");
        f.next_field();
        type_str(&mut f, "Salle B");
        assert_eq!(f.title.value, "Réunion");
        assert_eq!(f.description.value, "Salle B");
        assert!(f.description.active && !f.title.active);
    }

    #[test]
    fn project_draft_splits_steps() {
        let mut f = form();
        focus(&mut f, FormField::Title);
        type_str(&mut f, "Site web");
        focus(&mut f, FormField::Category);
        while f.selected_category() != Category::Projet {
            f.handle_left_right(true);
        }
        focus(&mut f, FormField::Steps);
        type_str(&mut f, "Maquette; ;Intégration");
        focus(&mut f, FormField::Assignee);
        f.handle_left_right(true);
        focus(&mut f, FormField::RemindHour);
        f.handle_char(' ');

        let draft = f.to_new_task().unwrap();
        assert_eq!(draft.category, Category::Projet);
        let steps: Vec<&str> = draft.sub_tasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(steps, ["Maquette", "Intégration"]);
        assert_eq!(draft.employee_id.as_deref(), Some(f.employees[0].0.as_str()));
        assert_eq!(draft.notifications.len(), 1);
        assert_eq!(draft.notifications[0].offset_minutes, Some(60));
    }

    #[test]
    fn bad_dates_and_numbers_are_reported() {
        let mut f = form();
        focus(&mut f, FormField::Due);
        type_str(&mut f, "someday");
        assert!(f.to_new_task().unwrap_err().contains("someday"));

        let mut f = form();
        f.category = Category::ALL.iter().position(|&c| c == Category::Recurrente).unwrap();
        f.frequency = 1;
        focus(&mut f, FormField::Days);
        type_str(&mut f, "0,x");
        assert!(f.to_new_task().is_err());
    }

    #[test]
    fn leaving_recurrence_keeps_focus_in_range() {
        let mut f = form();
        f.category = Category::ALL.iter().position(|&c| c == Category::Recurrente).unwrap();
        focus(&mut f, FormField::Category);
        // Recurrente -> Projet drops the frequency fields.
        f.handle_left_right(true);
        assert_eq!(f.selected_category(), Category::Projet);
        assert_eq!(f.current(), FormField::Category);
        let last = f.visible_fields().len() - 1;
        f.current_field = last + 3;
        assert_eq!(f.current(), FormField::RemindAt);
    }
}
