//! Derived views over the mission collection.
//!
//! Everything here is a pure function of the current collection, the active
//! account and the active filter. Nothing is cached: callers recompute on
//! every read so a view always reflects the latest mutation.

use crate::account::Employee;
use crate::fields::{ActiveFilter, TaskStatus};
use crate::lifecycle::{is_active, status};
use crate::task::Task;

/// Missions belonging to one account, in storage order.
pub fn for_account<'a>(tasks: &'a [Task], account_id: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.account_id == account_id).collect()
}

/// Focus progress in percent.
///
/// Cancelled and postponed missions count neither as done nor as due, so they
/// never drag the score down. No relevant mission gives 0.
pub fn completion_rate(tasks: &[&Task]) -> u8 {
    let relevant: Vec<&&Task> = tasks
        .iter()
        .filter(|t| !t.is_cancelled && !t.is_postponed)
        .collect();
    let total = relevant.len();
    if total == 0 {
        return 0;
    }
    let done = relevant.iter().filter(|t| t.completed).count();
    ((done * 100 + total / 2) / total) as u8
}

/// The four disjoint lifecycle groups of a collection.
#[derive(Debug, Default)]
pub struct HistoryPartition<'a> {
    pub completed: Vec<&'a Task>,
    pub cancelled: Vec<&'a Task>,
    pub postponed: Vec<&'a Task>,
    pub pending: Vec<&'a Task>,
}

impl<'a> HistoryPartition<'a> {
    /// Completed, cancelled and postponed missions, newest first.
    pub fn journal(&self) -> Vec<&'a Task> {
        let mut entries: Vec<&'a Task> = self
            .completed
            .iter()
            .chain(&self.cancelled)
            .chain(&self.postponed)
            .copied()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Split missions by lifecycle state.
pub fn history_partition<'a>(tasks: &[&'a Task]) -> HistoryPartition<'a> {
    let mut out = HistoryPartition::default();
    for &t in tasks {
        match status(t) {
            TaskStatus::Completed => out.completed.push(t),
            TaskStatus::Cancelled => out.cancelled.push(t),
            TaskStatus::Postponed => out.postponed.push(t),
            TaskStatus::Active => out.pending.push(t),
        }
    }
    out
}

/// Active missions matching the Focus filter, newest first.
///
/// `Team` lets everything through; it only changes how the list is grouped.
pub fn active_filter<'a>(tasks: &[&'a Task], filter: &ActiveFilter) -> Vec<&'a Task> {
    let mut out: Vec<&'a Task> = tasks
        .iter()
        .copied()
        .filter(|t| is_active(t))
        .filter(|t| match filter {
            ActiveFilter::All | ActiveFilter::Team => true,
            ActiveFilter::Category(c) => t.category == *c,
            ActiveFilter::Me => t.employee_id.is_none(),
            ActiveFilter::Employee(id) => t.employee_id.as_deref() == Some(id.as_str()),
        })
        .collect();
    sort_newest_first(&mut out);
    out
}

/// Who a group of missions belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Member<'a> {
    Me,
    Employee(&'a Employee),
}

impl Member<'_> {
    pub fn name(&self) -> &str {
        match self {
            Member::Me => "Moi",
            Member::Employee(e) => &e.name,
        }
    }
}

#[derive(Debug)]
pub struct MemberGroup<'a> {
    pub member: Member<'a>,
    pub tasks: Vec<&'a Task>,
}

/// Active missions grouped per member: self first, then each employee in
/// account order. Missions pointing at an unknown employee land nowhere.
pub fn group_by_member<'a>(tasks: &[&'a Task], employees: &'a [Employee]) -> Vec<MemberGroup<'a>> {
    let active = active_filter(tasks, &ActiveFilter::All);
    let mut groups = Vec::with_capacity(employees.len() + 1);
    groups.push(MemberGroup {
        member: Member::Me,
        tasks: active.iter().copied().filter(|t| t.employee_id.is_none()).collect(),
    });
    for e in employees {
        groups.push(MemberGroup {
            member: Member::Employee(e),
            tasks: active
                .iter()
                .copied()
                .filter(|t| t.employee_id.as_deref() == Some(e.id.as_str()))
                .collect(),
        });
    }
    groups
}

/// Checked and total sub-task counts of one mission.
pub fn subtask_progress(task: &Task) -> (usize, usize) {
    let subs = task.subtasks();
    (subs.iter().filter(|s| s.completed).count(), subs.len())
}

fn sort_newest_first(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Category, Priority};

    fn task(id: &str, created_at: i64, category: Category) -> Task {
        Task {
            id: id.to_string(),
            title: format!("mission {id}"),
            description: String::new(),
            priority: Priority::Moyenne,
            category,
            completed: false,
            is_cancelled: false,
            is_postponed: false,
            created_at,
            due_date: None,
            account_id: "acc_work1".to_string(),
            employee_id: None,
            sub_tasks: None,
            recurrence: None,
            notifications: None,
        }
    }

    fn refs(tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().collect()
    }

    fn ids<'a>(tasks: &[&'a Task]) -> Vec<&'a str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn rate_ignores_cancelled_and_postponed() {
        let mut a = task("a", 1, Category::Tache);
        a.completed = true;
        let mut b = task("b", 2, Category::Tache);
        b.is_cancelled = true;
        let mut c = task("c", 3, Category::Tache);
        c.is_postponed = true;
        let all = [a, b, c];
        assert_eq!(completion_rate(&refs(&all)), 100);
    }

    #[test]
    fn rate_is_zero_without_relevant_missions() {
        assert_eq!(completion_rate(&[]), 0);
        let mut b = task("b", 2, Category::Tache);
        b.is_cancelled = true;
        assert_eq!(completion_rate(&[&b]), 0);
    }

    #[test]
    fn rate_rounds_to_nearest() {
        let mut done = task("d", 1, Category::Tache);
        done.completed = true;
        let open1 = task("o1", 2, Category::Tache);
        let open2 = task("o2", 3, Category::Tache);
        // 1/3 -> 33, 2/3 -> 67
        assert_eq!(completion_rate(&[&done, &open1, &open2]), 33);
        let mut done2 = open2.clone();
        done2.completed = true;
        assert_eq!(completion_rate(&[&done, &open1, &done2]), 67);
        // 1/8 = 12.5 -> 13
        let mut many: Vec<Task> = (0..8).map(|i| task(&i.to_string(), i, Category::Tache)).collect();
        many[0].completed = true;
        assert_eq!(completion_rate(&refs(&many)), 13);
    }

    #[test]
    fn category_filter_returns_matches_newest_first() {
        let all = [
            task("t", 10, Category::Tache),
            task("p1", 20, Category::Projet),
            task("p2", 30, Category::Projet),
        ];
        let got = active_filter(&refs(&all), &"CAT_PROJET".parse().unwrap());
        assert_eq!(ids(&got), ["p2", "p1"]);
    }

    #[test]
    fn filters_only_consider_active_missions() {
        let mut done = task("done", 50, Category::Tache);
        done.completed = true;
        let mut later = task("later", 40, Category::Tache);
        later.is_postponed = true;
        let open = task("open", 30, Category::Tache);
        let all = [done, later, open];
        assert_eq!(ids(&active_filter(&refs(&all), &ActiveFilter::All)), ["open"]);
        assert_eq!(ids(&active_filter(&refs(&all), &ActiveFilter::Team)), ["open"]);
    }

    #[test]
    fn employee_filters_match_assignment() {
        let mine = task("mine", 1, Category::Tache);
        let mut hers = task("hers", 2, Category::Tache);
        hers.employee_id = Some("emp_1".into());
        let all = [mine, hers];
        assert_eq!(ids(&active_filter(&refs(&all), &ActiveFilter::Me)), ["mine"]);
        assert_eq!(
            ids(&active_filter(&refs(&all), &ActiveFilter::Employee("emp_1".into()))),
            ["hers"]
        );
        assert!(active_filter(&refs(&all), &ActiveFilter::Employee("emp_2".into())).is_empty());
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let mut all: Vec<Task> = (0..12).map(|i| task(&format!("t{i}"), i, Category::Tache)).collect();
        for (i, t) in all.iter_mut().enumerate() {
            // Include malformed combinations to exercise precedence.
            t.completed = i % 2 == 0;
            t.is_cancelled = i % 3 == 0;
            t.is_postponed = i % 4 == 0;
        }
        let input = refs(&all);
        let parts = history_partition(&input);

        let mut seen: Vec<&str> = Vec::new();
        for group in [&parts.completed, &parts.cancelled, &parts.postponed, &parts.pending] {
            seen.extend(ids(group));
        }
        let mut expected = ids(&input);
        seen.sort_unstable();
        expected.sort_unstable();
        assert_eq!(seen, expected);

        let total = parts.completed.len() + parts.cancelled.len() + parts.postponed.len() + parts.pending.len();
        assert_eq!(total, input.len());
    }

    #[test]
    fn journal_is_newest_first_without_pending() {
        let mut a = task("a", 1, Category::Tache);
        a.completed = true;
        let mut b = task("b", 3, Category::Tache);
        b.is_cancelled = true;
        let mut c = task("c", 2, Category::Tache);
        c.is_postponed = true;
        let d = task("d", 4, Category::Tache);
        let all = [a, b, c, d];
        let parts = history_partition(&refs(&all));
        assert_eq!(ids(&parts.journal()), ["b", "c", "a"]);
        assert_eq!(parts.pending_count(), 1);
    }

    #[test]
    fn grouping_puts_self_first_then_employees() {
        let employees = vec![
            Employee { id: "emp_1".into(), name: "Chloé".into() },
            Employee { id: "emp_2".into(), name: "Marc".into() },
        ];
        let mine = task("mine", 1, Category::Tache);
        let mut c1 = task("c1", 2, Category::Tache);
        c1.employee_id = Some("emp_1".into());
        let mut c2 = task("c2", 3, Category::Tache);
        c2.employee_id = Some("emp_1".into());
        let mut gone = task("gone", 4, Category::Tache);
        gone.employee_id = Some("emp_deleted".into());
        let mut done = task("done", 5, Category::Tache);
        done.completed = true;
        let all = [mine, c1, c2, gone, done];

        let groups = group_by_member(&refs(&all), &employees);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].member, Member::Me);
        assert_eq!(groups[0].member.name(), "Moi");
        assert_eq!(ids(&groups[0].tasks), ["mine"]);
        assert_eq!(groups[1].member.name(), "Chloé");
        assert_eq!(ids(&groups[1].tasks), ["c2", "c1"]);
        assert!(groups[2].tasks.is_empty());
    }

    #[test]
    fn account_scope_and_subtask_progress() {
        let mut other = task("x", 1, Category::Tache);
        other.account_id = "acc_perso".into();
        let mine = task("y", 2, Category::Projet);
        let all = [other, mine];
        assert_eq!(ids(&for_account(&all, "acc_work1")), ["y"]);

        let stepped = crate::lifecycle::apply_breakdown(&all[1], &["a", "b", "c"]);
        let first = stepped.subtasks()[0].id.clone();
        let stepped = crate::lifecycle::toggle_subtask(&stepped, &first);
        assert_eq!(subtask_progress(&stepped), (1, 3));
        assert_eq!(subtask_progress(&all[0]), (0, 0));
    }
}
