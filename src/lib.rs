#![forbid(unsafe_code)]
//! Pharmashift : planification locale des repos et des tâches du matin
//! d'une pharmacie (sans BD).
//!
//! - Stockage fichiers (JSON/CSV).
//! - Repos forcés contre les séries de travail, puis remplissage des quotas.
//! - Répartition équitable des tâches du matin entre pharmaciens présents.
//! - Dates civiles locales (`NaiveDate`), pas de fuseau horaire.

pub mod calendar;
pub mod io;
pub mod model;
pub mod report;
pub mod rest;
pub mod scheduler;
pub mod settings;
pub mod storage;

pub use calendar::{Calendar, CalendarDay, GridCalendar};
pub use model::{
    AmAssignment, Employee, EmployeeId, GeneratedShift, JobType, RestGoal, RestReason,
    ScheduleDate, ScheduleEntry, ShiftKind, ShiftRecord, TaskOption, YearMonth,
};
pub use report::{rest_summary, task_tally, RestTally};
pub use rest::{rest_contribution, AbsenceReason, DayIndex, DayStatus};
pub use scheduler::{
    AmTaskRequest, AssignOptions, AutoShiftOutcome, AutoShiftRequest, EmployeeSummary, SchedError,
    Scheduler, TaskConflict, UnresolvedStreak,
};
pub use settings::PlannerSettings;
pub use storage::{Dataset, JsonStorage, Storage};
