use super::AssignOptions;
use crate::model::{Employee, EmployeeId, JobType};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Données figées d'une invocation du moteur de repos.
pub(super) struct PlanContext<'a> {
    pub employees: &'a [Employee],
    /// Plage de trois mois, chronologique.
    pub span: Vec<NaiveDate>,
    /// Dates du mois cible.
    pub month_dates: Vec<NaiveDate>,
    pub commitments: HashSet<(EmployeeId, NaiveDate)>,
    pub opts: AssignOptions,
}

impl<'a> PlanContext<'a> {
    pub fn peers(&self, job_type: JobType) -> Vec<&'a Employee> {
        self.employees
            .iter()
            .filter(|e| e.job_type == job_type)
            .collect()
    }

    pub fn in_month(&self, date: NaiveDate) -> bool {
        self.month_dates.binary_search(&date).is_ok()
    }

    pub fn is_committed(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        self.commitments.contains(&(employee.clone(), date))
    }
}

/// Affiche un nombre de jours sans décimale inutile (4, 0.5, 2.5).
pub(super) fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{days:.0}")
    } else {
        format!("{days}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_are_formatted_compactly() {
        assert_eq!(format_days(4.0), "4");
        assert_eq!(format_days(0.5), "0.5");
        assert_eq!(format_days(2.5), "2.5");
    }
}
