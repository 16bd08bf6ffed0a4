use crate::calendar::CalendarDay;
use crate::model::{AmAssignment, Employee, EmployeeId, ShiftRecord, YearMonth};
use crate::rest::DayIndex;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Jours de repos effectifs d'un employé sur le mois.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestTally {
    pub employee_id: EmployeeId,
    pub name: String,
    pub rest_days: f64,
}

/// Tableau d'agrégation : contributions explicites + 1 pour chaque jour où
/// quelqu'un d'autre travaille en jour férié sans shift pour l'employé.
pub fn rest_summary(
    employees: &[Employee],
    shifts: &[ShiftRecord],
    days: &[CalendarDay],
) -> Vec<RestTally> {
    let index = DayIndex::build(shifts, days);
    employees
        .iter()
        .map(|e| RestTally {
            employee_id: e.id.clone(),
            name: e.name.clone(),
            rest_days: days
                .iter()
                .filter(|d| d.is_current_month)
                .map(|d| index.effective_rest(&e.id, d.date))
                .sum(),
        })
        .collect()
}

/// Nombre d'occurrences d'une tâche par employé sur `[from, to]`, mois exclu
/// (statistiques annuelles, ex. 早出).
pub fn task_tally(
    assignments: &[AmAssignment],
    task_name: &str,
    from: NaiveDate,
    to: NaiveDate,
    excluded: Option<YearMonth>,
) -> BTreeMap<EmployeeId, usize> {
    let mut out = BTreeMap::new();
    for a in assignments {
        if a.task_name != task_name || a.date < from || a.date > to {
            continue;
        }
        if excluded.is_some_and(|m| m.contains(a.date)) {
            continue;
        }
        *out.entry(a.employee_id.clone()).or_insert(0) += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{current_month_days, GridCalendar};
    use crate::model::{JobType, ShiftKind};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).unwrap()
    }

    #[test]
    fn rest_summary_counts_implicit_holiday_rest() {
        let a = Employee::new("A", JobType::Pharmacist);
        let b = Employee::new("B", JobType::Assistant);
        let shifts = vec![
            ShiftRecord::new(a.id.clone(), d(6, 7), ShiftKind::HolidayWorkFull),
            ShiftRecord::new(a.id.clone(), d(6, 2), ShiftKind::RestAm),
            ShiftRecord::new(b.id.clone(), d(6, 3), ShiftKind::RestFull),
        ];
        let days = current_month_days(&GridCalendar::new(), YearMonth::new(2026, 6).unwrap()).unwrap();

        let tallies = rest_summary(&[a, b], &shifts, &days);

        assert_eq!(tallies[0].rest_days, 0.5);
        assert_eq!(tallies[1].rest_days, 2.0);
    }

    #[test]
    fn task_tally_skips_the_excluded_month() {
        let a = EmployeeId::new("a");
        let assignments = vec![
            AmAssignment::manual(a.clone(), d(1, 5), "早出"),
            AmAssignment::auto(a.clone(), d(6, 5), "早出"),
            AmAssignment::auto(a.clone(), d(7, 6), "早出"),
            AmAssignment::auto(a.clone(), d(7, 7), "外来"),
        ];
        let tally = task_tally(
            &assignments,
            "早出",
            d(1, 1),
            d(12, 31),
            YearMonth::new(2026, 6).ok(),
        );
        assert_eq!(tally.get(&a), Some(&2));
    }
}
