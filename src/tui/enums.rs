//! Enumerations for TUI state management.

use crate::fields::AccountType;

/// Screen currently owning the keyboard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Main,
    Detail,
    AddTask,
    Input,
    Help,
    Confirm,
    Busy,
}

/// Top-level tabs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Focus,
    History,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Focus, Tab::History, Tab::Settings];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Focus => "Focus",
            Tab::History => "Bilan",
            Tab::Settings => "Profil",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Destructive actions waiting for a yes/no.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConfirmAction {
    DeleteTask { id: String, title: String },
    DeleteAccount { id: String, name: String },
    RemoveEmployee { id: String, name: String },
    Reset,
}

impl ConfirmAction {
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::DeleteTask { title, .. } => format!("Delete mission « {title} »"),
            ConfirmAction::DeleteAccount { name, .. } => format!("Delete account « {name} »"),
            ConfirmAction::RemoveEmployee { name, .. } => {
                format!("Remove {name}; their missions come back to you")
            }
            ConfirmAction::Reset => "Erase every mission and account".to_string(),
        }
    }
}

/// What the single-line input dialog is collecting.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum InputPurpose {
    Voice,
    DisplayName,
    NewAccount(AccountType),
    RenameAccount(String),
    NewEmployee,
}

impl InputPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            InputPurpose::Voice => "Dites ce que vous avez à faire",
            InputPurpose::DisplayName => "Nom",
            InputPurpose::NewAccount(AccountType::Personal) => "Nouveau compte personnel",
            InputPurpose::NewAccount(AccountType::Work) => "Nouveau compte pro",
            InputPurpose::RenameAccount(_) => "Renommer le compte",
            InputPurpose::NewEmployee => "Nouvel employé",
        }
    }
}

/// AI work queued to run right after the busy overlay is drawn.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PendingAi {
    Breakdown(String),
    Voice(String),
}

/// Rows of the settings tab.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SettingsItem {
    Name,
    Account(String),
    NewAccount(AccountType),
    Employee(String),
    NewEmployee,
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(Tab::Focus.next(), Tab::History);
        assert_eq!(Tab::Settings.next(), Tab::Focus);
        assert_eq!(Tab::Focus.prev(), Tab::Settings);
    }
}
