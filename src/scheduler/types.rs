use crate::model::{EmployeeId, GeneratedShift, JobType};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Options d'assignation des repos
#[derive(Debug, Clone, Copy)]
pub struct AssignOptions {
    /// Plafond journalier de repos parmi les pharmaciens.
    pub max_rest_pharmacist: usize,
    /// Plafond journalier pour toutes les autres catégories.
    pub max_rest_assistant: usize,
    pub max_consecutive_work_days: usize,
    pub max_consecutive_rest_days: usize,
    /// Nombre de balayages par employé en phase de rupture des séries.
    pub streak_restarts: u32,
    /// Nombre de tentatives par employé en phase de remplissage.
    pub quota_attempts: u32,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            max_rest_pharmacist: 3,
            max_rest_assistant: 3,
            max_consecutive_work_days: 6,
            max_consecutive_rest_days: 3,
            streak_restarts: 20,
            quota_attempts: 31,
        }
    }
}

impl AssignOptions {
    pub fn rest_ceiling(&self, job_type: JobType) -> usize {
        match job_type {
            JobType::Pharmacist => self.max_rest_pharmacist,
            _ => self.max_rest_assistant,
        }
    }
}

/// Série de jours travaillés qu'aucun jour libre du mois cible ne permet de casser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedStreak {
    pub employee_id: EmployeeId,
    /// Jour où la série atteint le plafond.
    pub date: NaiveDate,
}

/// Bilan par employé
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub employee_id: EmployeeId,
    pub name: String,
    pub current: f64,
    pub added: f64,
    pub total: f64,
    pub goal_min: f64,
    pub goal_max: f64,
    pub is_goal_reached: bool,
    pub messages: Vec<String>,
}

/// Résultat du moteur de repos : à persister par l'appelant.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AutoShiftOutcome {
    pub new_shifts: Vec<GeneratedShift>,
    pub results: Vec<EmployeeSummary>,
    pub unresolved: Vec<UnresolvedStreak>,
}

/// Même tâche (hors tâche de repli) donnée à plusieurs présents le même jour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskConflict {
    pub date: NaiveDate,
    pub task_name: String,
    pub employees: Vec<EmployeeId>,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("date overflow while enumerating calendar")]
    DateOverflow,
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),
    #[error("shift already exists for {employee} on {date}")]
    Occupied { employee: String, date: NaiveDate },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
