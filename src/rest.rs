//! Classement des jours : contribution au repos, jour travaillé, jour de repos,
//! absence pour les tâches du matin.
//!
//! Les absences implicites ne sont jamais stockées : elles sont recalculées
//! à chaque requête à partir de l'index courant.

use crate::calendar::CalendarDay;
use crate::model::{EmployeeId, ShiftKind, ShiftRecord};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Contribution d'un type de shift au compte mensuel de repos (0, 0.5 ou 1).
pub fn rest_contribution(kind: &ShiftKind) -> f64 {
    match kind {
        ShiftKind::RestFull | ShiftKind::HopedRestFull => 1.0,
        ShiftKind::RestAm
        | ShiftKind::RestPm
        | ShiftKind::HopedRestAm
        | ShiftKind::HopedRestPm
        | ShiftKind::HolidayWorkAm
        | ShiftKind::HolidayWorkPm
        | ShiftKind::WorkAm
        | ShiftKind::WorkPm
        | ShiftKind::TripAm
        | ShiftKind::TripPm => 0.5,
        ShiftKind::SpecialLeave
        | ShiftKind::HolidayWorkFull
        | ShiftKind::WorkFull
        | ShiftKind::TripFull => 0.0,
        // libellés libres hérités
        ShiftKind::Other(label) => {
            if label.contains("午前") || label.contains("午後") {
                0.5
            } else if label.contains("休み") {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Raison d'une absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsenceReason {
    /// Repos, déplacement ou congé spécial explicite.
    ExplicitLeave,
    /// Quelqu'un d'autre assure le travail du jour férié.
    NotOnHolidayDuty,
    /// Dimanche ou férié sans aucun travail.
    PharmacyClosed,
}

/// État d'un employé pour un jour donné.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayStatus {
    Working,
    Resting(f64),
    Absent(AbsenceReason),
}

impl DayStatus {
    /// Jour compté dans une série de jours travaillés consécutifs.
    pub fn is_working(self) -> bool {
        match self {
            DayStatus::Working => true,
            DayStatus::Resting(amount) => amount < 1.0,
            DayStatus::Absent(_) => false,
        }
    }

    /// Jour compté dans les plafonds journaliers de repos. Un jour fermé sans
    /// travail n'est pas travaillé mais n'est pas non plus un repos.
    pub fn is_rest(self) -> bool {
        match self {
            DayStatus::Resting(amount) => amount >= 1.0,
            DayStatus::Absent(AbsenceReason::NotOnHolidayDuty) => true,
            _ => false,
        }
    }

    /// Valeur ajoutée au compte mensuel de repos.
    pub fn rest_amount(self) -> f64 {
        match self {
            DayStatus::Resting(amount) => amount,
            DayStatus::Absent(AbsenceReason::NotOnHolidayDuty) => 1.0,
            _ => 0.0,
        }
    }
}

/// Index `(employé, date) -> type` construit une fois par invocation, avec
/// l'ensemble des dates de travail en jour férié et des jours fermés.
#[derive(Debug, Clone, Default)]
pub struct DayIndex {
    cells: HashMap<(EmployeeId, NaiveDate), ShiftKind>,
    duty_dates: HashSet<NaiveDate>,
    closed_dates: HashSet<NaiveDate>,
}

impl DayIndex {
    /// Construit l'index ; en cas de doublon le dernier enregistrement gagne.
    pub fn build<'a, I>(shifts: I, days: &[CalendarDay]) -> Self
    where
        I: IntoIterator<Item = &'a ShiftRecord>,
    {
        let cells = shifts
            .into_iter()
            .map(|s| ((s.employee_id.clone(), s.date), s.kind.clone()))
            .collect();
        Self::from_cells(cells, days)
    }

    pub(crate) fn from_cells(
        cells: HashMap<(EmployeeId, NaiveDate), ShiftKind>,
        days: &[CalendarDay],
    ) -> Self {
        let duty_dates = cells
            .iter()
            .filter(|(_, kind)| kind.is_duty())
            .map(|((_, date), _)| *date)
            .collect();
        let closed_dates = days
            .iter()
            .filter(|d| d.is_closed())
            .map(|d| d.date)
            .collect();
        Self {
            cells,
            duty_dates,
            closed_dates,
        }
    }

    pub fn kind(&self, employee: &EmployeeId, date: NaiveDate) -> Option<&ShiftKind> {
        self.cells.get(&(employee.clone(), date))
    }

    pub fn has_shift(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        self.cells.contains_key(&(employee.clone(), date))
    }

    /// Quelqu'un travaille explicitement ce jour-là.
    pub fn is_duty_date(&self, date: NaiveDate) -> bool {
        self.duty_dates.contains(&date)
    }

    /// Dimanche ou jour férié.
    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.closed_dates.contains(&date)
    }

    /// Jour fermé pour un employé sans shift explicite.
    pub fn is_closing_day(&self, date: NaiveDate) -> bool {
        self.is_closed(date) || self.is_duty_date(date)
    }

    pub fn classify_day(&self, employee: &EmployeeId, date: NaiveDate) -> DayStatus {
        if let Some(kind) = self.kind(employee, date) {
            let amount = rest_contribution(kind);
            if amount > 0.0 {
                return DayStatus::Resting(amount);
            }
            return DayStatus::Working;
        }
        if self.is_duty_date(date) {
            DayStatus::Absent(AbsenceReason::NotOnHolidayDuty)
        } else if self.is_closed(date) {
            DayStatus::Absent(AbsenceReason::PharmacyClosed)
        } else {
            DayStatus::Working
        }
    }

    pub fn is_working_day(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        self.classify_day(employee, date).is_working()
    }

    pub fn is_rest_day(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        self.classify_day(employee, date).is_rest()
    }

    pub fn effective_rest(&self, employee: &EmployeeId, date: NaiveDate) -> f64 {
        self.classify_day(employee, date).rest_amount()
    }

    /// Absence pour les tâches du matin. Plus large que `is_rest_day` : tout
    /// libellé de repos, déplacement ou congé (même demi-journée) exclut.
    pub fn am_absence(&self, employee: &EmployeeId, date: NaiveDate) -> Option<AbsenceReason> {
        let kind = self.kind(employee, date);
        if let Some(kind) = kind {
            let label = kind.label();
            let leave = label.contains('休') && !label.contains("休日出勤");
            if leave || label.contains("出張") || label.contains("特別休暇") {
                return Some(AbsenceReason::ExplicitLeave);
            }
        }
        let on_duty = kind.is_some_and(ShiftKind::is_duty);
        let duty_date = self.is_duty_date(date);
        if duty_date && !on_duty {
            return Some(AbsenceReason::NotOnHolidayDuty);
        }
        if self.is_closed(date) && !duty_date {
            return Some(AbsenceReason::PharmacyClosed);
        }
        None
    }

    pub(crate) fn insert(&mut self, employee: EmployeeId, date: NaiveDate, kind: ShiftKind) {
        if kind.is_duty() {
            self.duty_dates.insert(date);
        }
        self.cells.insert((employee, date), kind);
    }
}
