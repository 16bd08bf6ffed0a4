use super::grid::ShiftGrid;
use super::util::PlanContext;
use super::UnresolvedStreak;
use crate::model::{Employee, RestReason};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Résultat de la phase de rupture pour un employé.
#[derive(Debug, Default)]
pub(super) struct StreakOutcome {
    pub placed: usize,
    pub unresolved: Vec<UnresolvedStreak>,
    pub budget_exhausted: bool,
}

/// Casse les séries de `max_consecutive_work_days` jours travaillés en posant
/// des repos dans le mois cible, un par balayage, jusqu'à épuisement du budget.
pub(super) fn break_streaks<R: Rng + ?Sized>(
    ctx: &PlanContext<'_>,
    grid: &mut ShiftGrid,
    employee: &Employee,
    rng: &mut R,
) -> StreakOutcome {
    let mut outcome = StreakOutcome::default();
    let peers = ctx.peers(employee.job_type);

    for _ in 0..ctx.opts.streak_restarts {
        let scan = scan_once(ctx, grid, employee);
        outcome.unresolved = scan.unresolved;

        let Some(mut candidates) = scan.candidates else {
            return outcome;
        };

        candidates.shuffle(rng);
        let best = candidates
            .iter()
            .copied()
            .min_by_key(|d| grid.peer_rest_count(&peers, *d));
        if let Some(date) = best {
            if grid.place_rest(&employee.id, date, RestReason::StreakPrevention) {
                outcome.placed += 1;
            }
        }
    }

    // dernier balayage pour savoir si le budget a laissé une série cassable
    let scan = scan_once(ctx, grid, employee);
    outcome.unresolved = scan.unresolved;
    if scan.candidates.is_some() {
        outcome.budget_exhausted = true;
        tracing::warn!(employee = %employee.id, "streak restart budget exhausted");
    }
    outcome
}

struct Scan {
    /// Jours libres de la première série cassable rencontrée.
    candidates: Option<Vec<NaiveDate>>,
    unresolved: Vec<UnresolvedStreak>,
}

fn scan_once(ctx: &PlanContext<'_>, grid: &ShiftGrid, employee: &Employee) -> Scan {
    let cap = ctx.opts.max_consecutive_work_days.max(1);
    let mut window: VecDeque<NaiveDate> = VecDeque::with_capacity(cap);
    let mut reported = false;
    let mut unresolved = Vec::new();

    for &date in &ctx.span {
        if !grid.index().is_working_day(&employee.id, date) {
            window.clear();
            reported = false;
            continue;
        }
        window.push_back(date);
        if window.len() < cap {
            continue;
        }

        let candidates: Vec<NaiveDate> = window
            .iter()
            .copied()
            .filter(|d| {
                ctx.in_month(*d) && grid.is_free(&employee.id, *d) && !ctx.is_committed(&employee.id, *d)
            })
            .collect();
        if !candidates.is_empty() {
            return Scan {
                candidates: Some(candidates),
                unresolved,
            };
        }

        // fenêtre glissante : la série reste ouverte sans échec global
        if !reported && window.iter().any(|d| ctx.in_month(*d)) {
            unresolved.push(UnresolvedStreak {
                employee_id: employee.id.clone(),
                date,
            });
            reported = true;
        }
        window.pop_front();
    }

    Scan {
        candidates: None,
        unresolved,
    }
}
