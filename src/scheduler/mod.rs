mod am_tasks;
mod conflicts;
mod grid;
mod quota;
mod streak;
mod types;
mod util;

pub use am_tasks::AmTaskRequest;
pub use types::{
    AssignOptions, AutoShiftOutcome, EmployeeSummary, SchedError, TaskConflict, UnresolvedStreak,
};

use crate::calendar::{current_month_days, evaluation_span, Calendar, GridCalendar};
use crate::model::{
    expand_schedules, AmAssignment, Employee, EmployeeId, RestGoal, ScheduleEntry, ShiftKind,
    ShiftRecord, TaskOption, YearMonth,
};
use chrono::NaiveDate;
use grid::ShiftGrid;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use util::{format_days, PlanContext};

/// Entrées du moteur de repos pour un mois cible.
#[derive(Debug, Clone, Copy)]
pub struct AutoShiftRequest<'a> {
    pub month: YearMonth,
    pub employees: &'a [Employee],
    /// Shifts des mois précédent, cible et suivant.
    pub shifts: &'a [ShiftRecord],
    pub schedules: &'a [ScheduleEntry],
    pub goals: &'a HashMap<EmployeeId, RestGoal>,
    /// Modifications non enregistrées, appliquées par-dessus `shifts`.
    pub pending: &'a HashMap<(EmployeeId, NaiveDate), ShiftKind>,
    pub opts: AssignOptions,
}

/// Scheduler : moteurs de planification sur un calendrier donné.
#[derive(Debug, Default)]
pub struct Scheduler<C = GridCalendar> {
    calendar: C,
}

impl<C: Calendar> Scheduler<C> {
    pub fn new(calendar: C) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Repos forcés (séries de 6 jours) puis remplissage jusqu'aux minimums.
    /// Les échecs partiels sont rapportés dans le bilan, jamais en erreur.
    pub fn auto_shifts<R: Rng + ?Sized>(
        &self,
        req: &AutoShiftRequest<'_>,
        rng: &mut R,
    ) -> Result<AutoShiftOutcome, SchedError> {
        let span = evaluation_span(&self.calendar, req.month)?;
        let ctx = PlanContext {
            employees: req.employees,
            span: span.iter().map(|d| d.date).collect(),
            month_dates: span
                .iter()
                .filter(|d| d.is_current_month)
                .map(|d| d.date)
                .collect(),
            commitments: expand_schedules(req.schedules, req.month)
                .into_iter()
                .collect(),
            opts: req.opts,
        };
        let mut grid = ShiftGrid::seed(req.shifts, req.pending, req.employees, &span);

        let initial: HashMap<&EmployeeId, f64> = req
            .employees
            .iter()
            .map(|e| (&e.id, grid.rest_total(&e.id, &ctx.month_dates)))
            .collect();

        let mut unresolved = Vec::new();
        for employee in req.employees {
            let outcome = streak::break_streaks(&ctx, &mut grid, employee, rng);
            tracing::debug!(
                employee = %employee.id,
                placed = outcome.placed,
                budget_exhausted = outcome.budget_exhausted,
                "streak phase done"
            );
            for u in &outcome.unresolved {
                tracing::warn!(employee = %u.employee_id, date = %u.date, "streak left unresolved");
            }
            unresolved.extend(outcome.unresolved);
        }

        // les plus en retard d'abord, ex-aequo dans un ordre aléatoire
        let mut order: Vec<(&Employee, f64)> = req
            .employees
            .iter()
            .map(|e| {
                let min = req.goals.get(&e.id).map_or(0.0, |g| g.min);
                (e, min - grid.rest_total(&e.id, &ctx.month_dates))
            })
            .collect();
        order.shuffle(rng);
        order.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (employee, _) in order {
            let Some(goal) = req.goals.get(&employee.id).copied() else {
                continue;
            };
            let placed = quota::fill_quota(&ctx, &mut grid, employee, goal, rng);
            tracing::debug!(employee = %employee.id, placed, "quota phase done");
        }

        let results = req
            .employees
            .iter()
            .map(|e| {
                let current = initial.get(&e.id).copied().unwrap_or(0.0);
                let total = grid.rest_total(&e.id, &ctx.month_dates);
                let streaks: Vec<&UnresolvedStreak> =
                    unresolved.iter().filter(|u| u.employee_id == e.id).collect();
                summarize(e, current, total, req.goals.get(&e.id).copied(), &streaks)
            })
            .collect();

        Ok(AutoShiftOutcome {
            new_shifts: grid.into_generated(),
            results,
            unresolved,
        })
    }

    /// Affectations automatiques des tâches du matin pour le mois.
    pub fn am_tasks<R: Rng + ?Sized>(
        &self,
        month: YearMonth,
        req: &AmTaskRequest<'_>,
        rng: &mut R,
    ) -> Result<Vec<AmAssignment>, SchedError> {
        let days = current_month_days(&self.calendar, month)?;
        Ok(am_tasks::assign_am_tasks(&days, req, rng))
    }

    /// Doublons de tâches du matin à vérifier à la main.
    pub fn detect_conflicts(
        &self,
        month: YearMonth,
        employees: &[Employee],
        shifts: &[ShiftRecord],
        assignments: &[AmAssignment],
        options: &[TaskOption],
    ) -> Result<Vec<TaskConflict>, SchedError> {
        let days = current_month_days(&self.calendar, month)?;
        Ok(conflicts::detect_conflicts(
            &days,
            employees,
            shifts,
            assignments,
            options,
        ))
    }
}

fn summarize(
    employee: &Employee,
    current: f64,
    total: f64,
    goal: Option<RestGoal>,
    streaks: &[&UnresolvedStreak],
) -> EmployeeSummary {
    let mut messages = Vec::new();
    let (goal_min, goal_max, is_goal_reached) = match goal {
        Some(goal) => {
            if total < goal.min {
                messages.push(format!("{}日不足", format_days(goal.min - total)));
            }
            if total > goal.max {
                messages.push(format!("{}日超過", format_days(total - goal.max)));
            }
            (goal.min, goal.max, goal.contains(total))
        }
        None => {
            messages.push("目標未設定".to_string());
            (0.0, 0.0, false)
        }
    };
    for streak in streaks {
        messages.push(format!("{} 連勤解消不可", streak.date));
    }
    if goal.is_some_and(|g| total < g.min) {
        tracing::warn!(employee = %employee.id, total, "rest goal not reached");
    }

    EmployeeSummary {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        current,
        added: total - current,
        total,
        goal_min,
        goal_max,
        is_goal_reached,
        messages,
    }
}
