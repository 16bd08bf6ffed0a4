use crate::calendar::CalendarDay;
use crate::model::{Employee, EmployeeId, GeneratedShift, RestReason, ShiftKind, ShiftRecord};
use crate::rest::DayIndex;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Grille de travail `(employé, date) -> type` d'une invocation : construite
/// depuis l'instantané, modifiée uniquement par ajout de repos, jetée à la fin.
#[derive(Debug)]
pub(crate) struct ShiftGrid {
    index: DayIndex,
    generated: Vec<GeneratedShift>,
}

impl ShiftGrid {
    /// Shifts persistés puis surcharges en attente (non enregistrées).
    pub(crate) fn seed(
        shifts: &[ShiftRecord],
        pending: &HashMap<(EmployeeId, NaiveDate), ShiftKind>,
        roster: &[Employee],
        days: &[CalendarDay],
    ) -> Self {
        let mut cells: HashMap<(EmployeeId, NaiveDate), ShiftKind> = shifts
            .iter()
            .map(|s| ((s.employee_id.clone(), s.date), s.kind.clone()))
            .collect();
        for ((employee, date), kind) in pending {
            if !roster.iter().any(|e| &e.id == employee) {
                tracing::warn!(%employee, %date, "pending override for unknown employee ignored");
                continue;
            }
            cells.insert((employee.clone(), *date), kind.clone());
        }
        Self {
            index: DayIndex::from_cells(cells, days),
            generated: Vec::new(),
        }
    }

    pub(crate) fn index(&self) -> &DayIndex {
        &self.index
    }

    pub(crate) fn is_free(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        !self.index.has_shift(employee, date)
    }

    /// Pose un repos complet ; refuse une case déjà occupée.
    pub(crate) fn place_rest(
        &mut self,
        employee: &EmployeeId,
        date: NaiveDate,
        reason: RestReason,
    ) -> bool {
        if !self.is_free(employee, date) {
            return false;
        }
        self.index.insert(employee.clone(), date, ShiftKind::RestFull);
        self.generated
            .push(GeneratedShift::rest(employee.clone(), date, reason));
        tracing::debug!(%employee, %date, reason = reason.label(), "rest placed");
        true
    }

    /// Pairs au repos ce jour-là (persistés et générés confondus).
    pub(crate) fn peer_rest_count(&self, peers: &[&Employee], date: NaiveDate) -> usize {
        peers
            .iter()
            .filter(|p| self.index.is_rest_day(&p.id, date))
            .count()
    }

    pub(crate) fn rest_total(&self, employee: &EmployeeId, dates: &[NaiveDate]) -> f64 {
        dates
            .iter()
            .map(|d| self.index.effective_rest(employee, *d))
            .sum()
    }

    #[cfg(test)]
    pub(crate) fn generated(&self) -> &[GeneratedShift] {
        &self.generated
    }

    pub(crate) fn into_generated(self) -> Vec<GeneratedShift> {
        self.generated
    }
}
