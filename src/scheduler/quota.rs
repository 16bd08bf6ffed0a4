use super::grid::ShiftGrid;
use super::util::PlanContext;
use crate::model::{iso_week_start, Employee, RestGoal, RestReason};
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

/// Fenêtre examinée de part et d'autre d'un candidat pour la règle des repos consécutifs.
const REST_RUN_LOOKAROUND: i64 = 5;

/// Ajoute des repos jusqu'à `goal.min`, sans jamais atteindre le plafond
/// journalier de la catégorie. Retourne le nombre de repos posés.
pub(super) fn fill_quota<R: Rng + ?Sized>(
    ctx: &PlanContext<'_>,
    grid: &mut ShiftGrid,
    employee: &Employee,
    goal: RestGoal,
    rng: &mut R,
) -> usize {
    let peers = ctx.peers(employee.job_type);
    let ceiling = ctx.opts.rest_ceiling(employee.job_type);
    let mut placed = 0;

    for _ in 0..ctx.opts.quota_attempts {
        if grid.rest_total(&employee.id, &ctx.month_dates) >= goal.min {
            break;
        }

        let mut candidates: Vec<NaiveDate> = ctx
            .month_dates
            .iter()
            .copied()
            .filter(|d| {
                grid.is_free(&employee.id, *d)
                    && !grid.index().is_closing_day(*d)
                    && !ctx.is_committed(&employee.id, *d)
                    && !would_exceed_rest_run(ctx, grid, employee, *d)
            })
            .collect();
        if candidates.is_empty() {
            tracing::debug!(employee = %employee.id, "no free day left for quota fill");
            break;
        }

        candidates.shuffle(rng);
        let mut ranked: Vec<(usize, usize, NaiveDate)> = candidates
            .into_iter()
            .map(|d| {
                (
                    grid.peer_rest_count(&peers, d),
                    weekly_rest_count(grid, employee, d),
                    d,
                )
            })
            .collect();
        // tri stable : les ex-aequo gardent l'ordre aléatoire
        ranked.sort_by_key(|(peer, week, _)| (*peer, *week));

        let Some(&(_, _, date)) = ranked.iter().find(|(peer, _, _)| *peer < ceiling) else {
            tracing::debug!(employee = %employee.id, ceiling, "daily rest ceiling reached");
            break;
        };
        if grid.place_rest(&employee.id, date, RestReason::QuotaFill) {
            placed += 1;
        }
    }
    placed
}

/// Vrai si poser un repos ce jour formerait plus de `max_consecutive_rest_days`
/// jours non travaillés d'affilée.
fn would_exceed_rest_run(
    ctx: &PlanContext<'_>,
    grid: &ShiftGrid,
    employee: &Employee,
    date: NaiveDate,
) -> bool {
    let off = |k: i64| !grid.index().is_working_day(&employee.id, date + Duration::days(k));
    let before = (1..=REST_RUN_LOOKAROUND).take_while(|k| off(-k)).count();
    let after = (1..=REST_RUN_LOOKAROUND).take_while(|k| off(*k)).count();
    before + 1 + after > ctx.opts.max_consecutive_rest_days
}

/// Jours non travaillés dans la semaine ISO du candidat.
fn weekly_rest_count(grid: &ShiftGrid, employee: &Employee, date: NaiveDate) -> usize {
    let monday = iso_week_start(date);
    (0..7)
        .map(|k| monday + Duration::days(k))
        .filter(|d| !grid.index().is_working_day(&employee.id, *d))
        .count()
}
