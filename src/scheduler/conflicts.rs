use super::TaskConflict;
use crate::calendar::CalendarDay;
use crate::model::{AmAssignment, Employee, EmployeeId, ShiftRecord, TaskOption};
use crate::rest::DayIndex;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Signale, jour par jour, toute tâche hors repli tenue par plusieurs présents.
/// Consultatif : rien n'est corrigé.
pub(super) fn detect_conflicts(
    days: &[CalendarDay],
    employees: &[Employee],
    shifts: &[ShiftRecord],
    assignments: &[AmAssignment],
    options: &[TaskOption],
) -> Vec<TaskConflict> {
    let index = DayIndex::build(shifts, days);
    let by_cell: HashMap<(&EmployeeId, NaiveDate), &str> = assignments
        .iter()
        .map(|a| ((&a.employee_id, a.date), a.task_name.as_str()))
        .collect();
    let is_fallback = |task: &str| {
        options
            .iter()
            .find(|o| o.name == task)
            .is_some_and(|o| o.is_fallback)
    };

    let mut out = Vec::new();
    for day in days.iter().filter(|d| d.is_current_month) {
        let mut holders: BTreeMap<&str, Vec<EmployeeId>> = BTreeMap::new();
        for employee in employees {
            let Some(task) = by_cell.get(&(&employee.id, day.date)).copied() else {
                continue;
            };
            if index.am_absence(&employee.id, day.date).is_some() || is_fallback(task) {
                continue;
            }
            holders.entry(task).or_default().push(employee.id.clone());
        }

        for (task, ids) in holders {
            if ids.len() > 1 {
                out.push(TaskConflict {
                    date: day.date,
                    task_name: task.to_string(),
                    employees: ids,
                });
            }
        }
    }
    out
}
