//! Mission lifecycle transitions.
//!
//! A mission is in exactly one of four states: Active, Completed, Cancelled or
//! Postponed. Every transition here takes the current mission by reference and
//! returns the next value; entering a state clears the other two flags, so no
//! sequence of calls can leave more than one flag set.

use std::collections::HashSet;

use tracing::debug;

use crate::fields::{Category, TaskStatus};
use crate::task::{short_id, NewTask, SubTask, Task};

/// Result of toggling completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub task: Task,
    /// Set only on the Active/other -> Completed edge.
    pub celebrate: bool,
}

/// Build a mission from form input. Blank titles produce nothing.
pub fn create(
    input: NewTask,
    account_id: &str,
    existing_ids: &HashSet<&str>,
    now: i64,
) -> Option<Task> {
    let title = input.title.trim();
    if title.is_empty() {
        debug!("ignoring mission with empty title");
        return None;
    }

    let id = fresh_id(existing_ids);
    let sub_tasks = if input.category == Category::Projet {
        let mut taken = HashSet::new();
        input
            .sub_tasks
            .into_iter()
            .filter(|s| !s.title.trim().is_empty())
            .map(|s| SubTask {
                id: fresh_sub_id(&mut taken),
                title: s.title.trim().to_string(),
                description: None,
                completed: false,
                due_date: s.due_date,
            })
            .collect()
    } else {
        Vec::new()
    };
    let recurrence = if input.category == Category::Recurrente {
        input.recurrence
    } else {
        None
    };

    Some(Task {
        id,
        title: title.to_string(),
        description: input.description,
        priority: input.priority,
        category: input.category,
        completed: false,
        is_cancelled: false,
        is_postponed: false,
        created_at: now,
        due_date: input.due_date,
        account_id: account_id.to_string(),
        employee_id: input.employee_id.filter(|e| !e.is_empty()),
        sub_tasks: Some(sub_tasks),
        recurrence,
        notifications: (!input.notifications.is_empty()).then_some(input.notifications),
    })
}

/// Derive the lifecycle state. Stored data with several flags set resolves as
/// completed, then cancelled, then postponed.
pub fn status(task: &Task) -> TaskStatus {
    if task.completed {
        TaskStatus::Completed
    } else if task.is_cancelled {
        TaskStatus::Cancelled
    } else if task.is_postponed {
        TaskStatus::Postponed
    } else {
        TaskStatus::Active
    }
}

pub fn is_active(task: &Task) -> bool {
    status(task) == TaskStatus::Active
}

/// Flip completion. Completing clears cancelled/postponed and asks for a celebration.
pub fn toggle_complete(task: &Task) -> Completion {
    let mut next = task.clone();
    if task.completed {
        next.completed = false;
        debug!(id = %task.id, "mission reopened");
        Completion {
            task: next,
            celebrate: false,
        }
    } else {
        next.completed = true;
        next.is_cancelled = false;
        next.is_postponed = false;
        debug!(id = %task.id, "mission completed");
        Completion {
            task: next,
            celebrate: true,
        }
    }
}

/// Flip cancellation. Cancelling clears completed/postponed.
pub fn toggle_cancelled(task: &Task) -> Task {
    let mut next = task.clone();
    next.is_cancelled = !task.is_cancelled;
    if next.is_cancelled {
        next.completed = false;
        next.is_postponed = false;
    }
    debug!(id = %task.id, cancelled = next.is_cancelled, "mission cancel toggled");
    next
}

/// Flip postponement. Postponing clears completed/cancelled; flipping back
/// reactivates the mission.
pub fn toggle_postponed(task: &Task) -> Task {
    let mut next = task.clone();
    next.is_postponed = !task.is_postponed;
    if next.is_postponed {
        next.completed = false;
        next.is_cancelled = false;
    }
    debug!(id = %task.id, postponed = next.is_postponed, "mission postpone toggled");
    next
}

/// Flip one sub-task. The parent's own flags are untouched; unknown ids change nothing.
pub fn toggle_subtask(task: &Task, subtask_id: &str) -> Task {
    let mut next = task.clone();
    if let Some(subs) = next.sub_tasks.as_mut() {
        if let Some(sub) = subs.iter_mut().find(|s| s.id == subtask_id) {
            sub.completed = !sub.completed;
        }
    }
    next
}

/// Replace the sub-tasks with one fresh, unchecked sub-task per step.
///
/// Previous sub-tasks and their progress are discarded.
pub fn apply_breakdown<S: AsRef<str>>(task: &Task, steps: &[S]) -> Task {
    let mut next = task.clone();
    let mut taken = HashSet::new();
    next.sub_tasks = Some(
        steps
            .iter()
            .map(|step| SubTask {
                id: fresh_sub_id(&mut taken),
                title: step.as_ref().to_string(),
                description: None,
                completed: false,
                due_date: None,
            })
            .collect(),
    );
    debug!(id = %task.id, steps = steps.len(), "breakdown applied");
    next
}

/// Assign the mission to an employee, or back to self with `None`.
pub fn assign(task: &Task, employee_id: Option<&str>) -> Task {
    let mut next = task.clone();
    next.employee_id = employee_id.map(str::to_string);
    next
}

fn fresh_id(existing: &HashSet<&str>) -> String {
    loop {
        let id = short_id();
        if !existing.contains(id.as_str()) {
            return id;
        }
    }
}

fn fresh_sub_id(taken: &mut HashSet<String>) -> String {
    loop {
        let id = short_id()[..7].to_string();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Frequency, Priority};
    use crate::task::{NewSubTask, RecurrenceConfig};

    fn active(title: &str) -> Task {
        create(NewTask::quick(title, Priority::Moyenne), "acc_perso", &HashSet::new(), 1_000)
            .unwrap()
    }

    fn flags(t: &Task) -> (bool, bool, bool) {
        (t.completed, t.is_cancelled, t.is_postponed)
    }

    fn at_most_one_flag(t: &Task) -> bool {
        [t.completed, t.is_cancelled, t.is_postponed]
            .iter()
            .filter(|&&f| f)
            .count()
            <= 1
    }

    #[test]
    fn create_rejects_blank_title() {
        let input = NewTask::quick("   ", Priority::Urgent);
        assert!(create(input, "acc_perso", &HashSet::new(), 0).is_none());
    }

    #[test]
    fn create_fills_generated_fields() {
        let t = active("Ranger le bureau");
        assert_eq!(t.title, "Ranger le bureau");
        assert_eq!(t.created_at, 1_000);
        assert_eq!(t.account_id, "acc_perso");
        assert_eq!(flags(&t), (false, false, false));
        assert!(t.subtasks().is_empty());
        assert!(t.notifications.is_none());
        assert_eq!(status(&t), TaskStatus::Active);
    }

    #[test]
    fn create_copies_subtasks_only_for_projects() {
        let subs = vec![
            NewSubTask { title: "Plan".into(), due_date: Some(5) },
            NewSubTask { title: "  ".into(), due_date: None },
            NewSubTask { title: "Build".into(), due_date: None },
        ];
        let project = NewTask {
            title: "Site web".into(),
            category: Category::Projet,
            sub_tasks: subs.clone(),
            ..NewTask::default()
        };
        let t = create(project, "acc_work1", &HashSet::new(), 0).unwrap();
        let titles: Vec<&str> = t.subtasks().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Plan", "Build"]);
        assert_eq!(t.subtasks()[0].due_date, Some(5));
        assert!(t.subtasks().iter().all(|s| !s.completed));

        let plain = NewTask {
            title: "Pas un projet".into(),
            category: Category::Tache,
            sub_tasks: subs,
            ..NewTask::default()
        };
        let t = create(plain, "acc_work1", &HashSet::new(), 0).unwrap();
        assert!(t.subtasks().is_empty());
    }

    #[test]
    fn create_keeps_recurrence_only_for_recurring() {
        let rec = RecurrenceConfig::new(Frequency::Weekly, vec![1], vec![], None);
        let input = NewTask {
            title: "Sport".into(),
            category: Category::Recurrente,
            recurrence: Some(rec.clone()),
            ..NewTask::default()
        };
        let t = create(input, "acc_perso", &HashSet::new(), 0).unwrap();
        assert_eq!(t.recurrence, Some(rec.clone()));

        let input = NewTask {
            title: "Sport".into(),
            category: Category::Suivi,
            recurrence: Some(rec),
            ..NewTask::default()
        };
        let t = create(input, "acc_perso", &HashSet::new(), 0).unwrap();
        assert!(t.recurrence.is_none());
    }

    #[test]
    fn completing_clears_other_flags_and_celebrates_once() {
        let t = toggle_postponed(&active("Courses"));
        assert_eq!(flags(&t), (false, false, true));

        let done = toggle_complete(&t);
        assert!(done.celebrate);
        assert_eq!(flags(&done.task), (true, false, false));

        let reopened = toggle_complete(&done.task);
        assert!(!reopened.celebrate);
        assert_eq!(flags(&reopened.task), (false, false, false));
    }

    #[test]
    fn cancelling_and_postponing_clear_the_others() {
        let done = toggle_complete(&active("Rapport")).task;
        let cancelled = toggle_cancelled(&done);
        assert_eq!(flags(&cancelled), (false, true, false));
        let postponed = toggle_postponed(&cancelled);
        assert_eq!(flags(&postponed), (false, false, true));
        assert_eq!(status(&postponed), TaskStatus::Postponed);
    }

    #[test]
    fn toggle_sequences_never_set_two_flags() {
        type Op = fn(&Task) -> Task;
        let ops: [Op; 3] = [
            |t| toggle_complete(t).task,
            toggle_cancelled,
            toggle_postponed,
        ];
        // Every sequence of length 4 over the three transitions.
        for n in 0..81usize {
            let mut t = active("x");
            let mut code = n;
            for _ in 0..4 {
                t = ops[code % 3](&t);
                code /= 3;
                assert!(at_most_one_flag(&t), "sequence {n} broke exclusivity");
            }
        }
    }

    #[test]
    fn postponing_twice_reactivates() {
        let t = active("Dentiste");
        let back = toggle_postponed(&toggle_postponed(&t));
        assert_eq!(flags(&back), (false, false, false));
        assert_eq!(back, t);
    }

    #[test]
    fn subtask_toggle_is_local_and_ignores_unknown_ids() {
        let t = apply_breakdown(&active("Projet"), &["a", "b"]);
        let first = t.subtasks()[0].id.clone();
        let toggled = toggle_subtask(&t, &first);
        assert!(toggled.subtasks()[0].completed);
        assert!(!toggled.subtasks()[1].completed);
        assert_eq!(flags(&toggled), (false, false, false));

        assert_eq!(toggle_subtask(&t, "nonexistent"), t);
        let bare = active("Sans étapes");
        assert_eq!(toggle_subtask(&bare, "nonexistent"), bare);
    }

    #[test]
    fn breakdown_replaces_existing_subtasks() {
        let t = apply_breakdown(&active("Déménager"), &["s1", "s2"]);
        let t = toggle_subtask(&t, &t.subtasks()[0].id.clone());
        let old_ids: Vec<String> = t.subtasks().iter().map(|s| s.id.clone()).collect();

        let next = apply_breakdown(&t, &["x", "y", "z"]);
        let titles: Vec<&str> = next.subtasks().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["x", "y", "z"]);
        assert!(next.subtasks().iter().all(|s| !s.completed));
        assert!(next.subtasks().iter().all(|s| !old_ids.contains(&s.id)));
    }

    #[test]
    fn stored_data_with_several_flags_resolves_by_precedence() {
        let mut t = active("Bizarre");
        t.completed = true;
        t.is_postponed = true;
        assert_eq!(status(&t), TaskStatus::Completed);
        t.completed = false;
        t.is_cancelled = true;
        assert_eq!(status(&t), TaskStatus::Cancelled);
    }
}
