//! Répartition automatique des tâches du matin entre pharmaciens présents.
//!
//! Pour chaque jour du mois : les absents sont écartés, les affectations
//! manuelles restent en place (et comptent dans les totaux), les tâches
//! régulières vont au pharmacien qui les a le moins faites, la tâche de
//! repli absorbe le reste.

use crate::calendar::CalendarDay;
use crate::model::{AmAssignment, Employee, EmployeeId, ShiftRecord, TaskOption};
use crate::rest::DayIndex;
use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;

/// Entrées du moteur de tâches du matin, pour un mois.
#[derive(Debug, Clone, Copy)]
pub struct AmTaskRequest<'a> {
    /// Tout le personnel ; seuls les pharmaciens sont pris en compte.
    pub employees: &'a [Employee],
    pub options: &'a [TaskOption],
    pub shifts: &'a [ShiftRecord],
    /// Affectations existantes du mois (manuelles et automatiques).
    pub assignments: &'a [AmAssignment],
}

/// Totaux par employé et par tâche.
#[derive(Debug, Default)]
struct TaskTally {
    counts: HashMap<EmployeeId, HashMap<String, usize>>,
}

impl TaskTally {
    fn get(&self, employee: &EmployeeId, task: &str) -> usize {
        self.counts
            .get(employee)
            .and_then(|per_task| per_task.get(task))
            .copied()
            .unwrap_or(0)
    }

    fn bump(&mut self, employee: &EmployeeId, task: &str) {
        *self
            .counts
            .entry(employee.clone())
            .or_default()
            .entry(task.to_string())
            .or_insert(0) += 1;
    }
}

/// Tâches régulières triées par `order`, et tâche de repli (premier drapeau).
pub(crate) fn split_options(options: &[TaskOption]) -> (Vec<&TaskOption>, Option<&TaskOption>) {
    let mut regular: Vec<&TaskOption> = options
        .iter()
        .filter(|t| !t.is_fallback && !t.exclude_from_auto)
        .collect();
    regular.sort_by_key(|t| t.order);
    let fallback = options.iter().find(|t| t.is_fallback);
    (regular, fallback)
}

/// Calcule un jeu complet d'affectations automatiques (`is_auto_assigned`).
/// L'appelant doit supprimer toutes les affectations automatiques du mois
/// avant d'insérer ce résultat.
pub(super) fn assign_am_tasks<R: Rng + ?Sized>(
    days: &[CalendarDay],
    req: &AmTaskRequest<'_>,
    rng: &mut R,
) -> Vec<AmAssignment> {
    let pharmacists: Vec<&Employee> = req.employees.iter().filter(|e| e.is_pharmacist()).collect();
    let index = DayIndex::build(req.shifts, days);

    let fallback_flags = req.options.iter().filter(|t| t.is_fallback).count();
    if fallback_flags > 1 {
        tracing::warn!(fallback_flags, "several fallback tasks flagged, first one wins");
    }
    let (regular, fallback) = split_options(req.options);

    let manual: HashMap<(EmployeeId, NaiveDate), &str> = req
        .assignments
        .iter()
        .filter(|a| !a.is_auto_assigned)
        .map(|a| ((a.employee_id.clone(), a.date), a.task_name.as_str()))
        .collect();

    let mut tally = TaskTally::default();
    for ((employee, _), task) in &manual {
        if pharmacists.iter().any(|p| &p.id == employee) {
            tally.bump(employee, task);
        }
    }

    let mut out = Vec::new();
    for day in days.iter().filter(|d| d.is_current_month) {
        let date = day.date;
        let mut pool: Vec<&EmployeeId> = pharmacists
            .iter()
            .map(|p| &p.id)
            .filter(|id| index.am_absence(id, date).is_none())
            .filter(|id| !manual.contains_key(&((*id).clone(), date)))
            .collect();

        for task in &regular {
            if pool.is_empty() {
                break;
            }
            let Some(min) = pool.iter().map(|id| tally.get(id, &task.name)).min() else {
                break;
            };
            let tied: Vec<&EmployeeId> = pool
                .iter()
                .copied()
                .filter(|id| tally.get(id, &task.name) == min)
                .collect();
            let Some(&chosen) = tied.choose(rng) else {
                continue;
            };
            out.push(AmAssignment::auto(chosen.clone(), date, task.name.clone()));
            tally.bump(chosen, &task.name);
            pool.retain(|id| *id != chosen);
        }

        if let Some(fallback) = fallback {
            for id in pool.drain(..) {
                out.push(AmAssignment::auto(id.clone(), date, fallback.name.clone()));
                tally.bump(id, &fallback.name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Calendar, GridCalendar};
    use crate::model::{JobType, ShiftKind, YearMonth};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn june_days() -> Vec<CalendarDay> {
        GridCalendar::new()
            .month_days(YearMonth::new(2026, 6).unwrap())
            .unwrap()
    }

    #[test]
    fn first_flagged_fallback_wins() {
        let options = vec![
            TaskOption::new("病棟", 2).fallback(),
            TaskOption::new("外来", 1),
            TaskOption::new("散剤混注", 3).fallback(),
            TaskOption::new("早出", 0).manual_only(),
        ];
        let (regular, fallback) = split_options(&options);
        assert_eq!(regular.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["外来"]);
        assert_eq!(fallback.map(|t| t.name.as_str()), Some("病棟"));
    }

    #[test]
    fn only_pharmacists_on_open_days_get_tasks() {
        let ph = Employee::new("薬剤師A", JobType::Pharmacist);
        let asst = Employee::new("助手B", JobType::Assistant);
        let employees = vec![ph.clone(), asst.clone()];
        let options = vec![TaskOption::new("外来", 1)];
        let req = AmTaskRequest {
            employees: &employees,
            options: &options,
            shifts: &[],
            assignments: &[],
        };
        let mut rng = StdRng::seed_from_u64(2);

        let out = assign_am_tasks(&june_days(), &req, &mut rng);

        // 30 jours - 4 dimanches
        assert_eq!(out.len(), 26);
        assert!(out.iter().all(|a| a.employee_id == ph.id && a.is_auto_assigned));
    }

    #[test]
    fn tasks_rotate_to_the_least_loaded() {
        let a = Employee::new("A", JobType::Pharmacist);
        let b = Employee::new("B", JobType::Pharmacist);
        let employees = vec![a.clone(), b.clone()];
        let options = vec![TaskOption::new("外来", 1), TaskOption::new("病棟", 2)];
        let req = AmTaskRequest {
            employees: &employees,
            options: &options,
            shifts: &[],
            assignments: &[],
        };
        let mut rng = StdRng::seed_from_u64(4);

        let out = assign_am_tasks(&june_days(), &req, &mut rng);

        let outpatient = |id: &EmployeeId| {
            out.iter()
                .filter(|x| &x.employee_id == id && x.task_name == "外来")
                .count() as i64
        };
        assert!((outpatient(&a.id) - outpatient(&b.id)).abs() <= 1);
    }

    #[test]
    fn leave_and_holiday_duty_remove_from_pool() {
        let a = Employee::new("A", JobType::Pharmacist);
        let b = Employee::new("B", JobType::Pharmacist);
        let employees = vec![a.clone(), b.clone()];
        let options = vec![TaskOption::new("外来", 1), TaskOption::new("病棟", 2).fallback()];
        let tue = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();
        let sun = NaiveDate::from_ymd_opt(2026, 6, 7).unwrap();
        let shifts = vec![
            ShiftRecord::new(a.id.clone(), tue, ShiftKind::TripPm),
            ShiftRecord::new(b.id.clone(), sun, ShiftKind::HolidayWorkFull),
        ];
        let req = AmTaskRequest {
            employees: &employees,
            options: &options,
            shifts: &shifts,
            assignments: &[],
        };
        let mut rng = StdRng::seed_from_u64(8);

        let out = assign_am_tasks(&june_days(), &req, &mut rng);

        let on = |date: NaiveDate| out.iter().filter(|x| x.date == date).collect::<Vec<_>>();
        assert_eq!(on(tue).len(), 1);
        assert_eq!(on(tue)[0].employee_id, b.id);
        assert_eq!(on(sun).len(), 1);
        assert_eq!(on(sun)[0].employee_id, b.id);
        assert_eq!(on(sun)[0].task_name, "外来");
    }
}
