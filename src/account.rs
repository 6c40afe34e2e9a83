//! Accounts (personal and work spaces) and their employees.
//!
//! Missions are not nested inside accounts: they reference one by
//! `account_id` and are filtered per account when a view is computed.

use serde::{Deserialize, Serialize};

use crate::fields::AccountType;
use crate::task::short_id;

/// A workspace owning missions by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// A team member missions can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
}

impl Account {
    /// Create an account with a fresh `acc_` id. Blank names produce nothing.
    pub fn new(name: &str, kind: AccountType) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Account {
            id: format!("acc_{}", &short_id()[..7]),
            name: name.to_string(),
            kind,
            employees: Vec::new(),
        })
    }

    pub fn is_work(&self) -> bool {
        self.kind == AccountType::Work
    }

    /// Append an employee with a fresh id unique within this account.
    pub fn add_employee(&mut self, name: &str) -> Option<&Employee> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = loop {
            let candidate = format!("emp_{}", &short_id()[..7]);
            if self.employee(&candidate).is_none() {
                break candidate;
            }
        };
        self.employees.push(Employee {
            id,
            name: name.to_string(),
        });
        self.employees.last()
    }

    /// Remove an employee. Returns whether one was removed.
    pub fn remove_employee(&mut self, employee_id: &str) -> bool {
        let before = self.employees.len();
        self.employees.retain(|e| e.id != employee_id);
        self.employees.len() != before
    }

    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == employee_id)
    }

    /// Resolve an employee by id or case-insensitive name.
    pub fn find_employee(&self, identifier: &str) -> Option<&Employee> {
        self.employee(identifier).or_else(|| {
            self.employees
                .iter()
                .find(|e| e.name.to_lowercase() == identifier.to_lowercase())
        })
    }
}

/// Accounts present on a fresh install.
pub fn default_accounts() -> Vec<Account> {
    vec![
        Account {
            id: "acc_perso".to_string(),
            name: "Personnel".to_string(),
            kind: AccountType::Personal,
            employees: Vec::new(),
        },
        Account {
            id: "acc_work1".to_string(),
            name: "Travail 1".to_string(),
            kind: AccountType::Work,
            employees: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_ignored() {
        assert!(Account::new("   ", AccountType::Work).is_none());
        let mut acc = Account::new("Boulot", AccountType::Work).unwrap();
        assert!(acc.id.starts_with("acc_"));
        assert!(acc.add_employee("").is_none());
        assert!(acc.employees.is_empty());
    }

    #[test]
    fn employees_are_added_and_removed_by_id() {
        let mut acc = Account::new("Boulot", AccountType::Work).unwrap();
        let id = acc.add_employee("Chloé").unwrap().id.clone();
        acc.add_employee("Marc").unwrap();
        assert_eq!(acc.employees.len(), 2);
        assert_eq!(acc.find_employee("chloé").map(|e| e.id.as_str()), Some(id.as_str()));
        assert!(acc.remove_employee(&id));
        assert!(!acc.remove_employee(&id));
        assert_eq!(acc.employees.len(), 1);
    }

    #[test]
    fn account_serializes_type_field() {
        let raw = serde_json::to_value(&default_accounts()[1]).unwrap();
        assert_eq!(raw["type"], "WORK");
        assert_eq!(raw["employees"], serde_json::json!([]));
    }
}
