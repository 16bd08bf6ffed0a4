use crate::model::{
    AmAssignment, Employee, EmployeeId, GeneratedShift, ScheduleEntry, ShiftRecord, TaskOption,
    YearMonth,
};
use crate::scheduler::SchedError;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Toutes les données persistées de la pharmacie.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Dataset {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub shifts: Vec<ShiftRecord>,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
    #[serde(default)]
    pub task_options: Vec<TaskOption>,
    #[serde(default)]
    pub am_assignments: Vec<AmAssignment>,
}

impl Dataset {
    pub fn find_employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    pub fn find_employee_by_name(&self, name: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.name == name)
    }

    /// Shifts sur `[from, to]`, tous employés confondus.
    pub fn shifts_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<ShiftRecord> {
        self.shifts
            .iter()
            .filter(|s| from <= s.date && s.date <= to)
            .cloned()
            .collect()
    }

    /// Shifts du mois précédent au mois suivant (continuité des séries).
    pub fn shifts_around(&self, month: YearMonth) -> Vec<ShiftRecord> {
        match (month.prev().first_day(), month.next().last_day()) {
            (Some(from), Some(to)) => self.shifts_between(from, to),
            _ => Vec::new(),
        }
    }

    pub fn month_shifts(&self, month: YearMonth) -> Vec<ShiftRecord> {
        self.shifts
            .iter()
            .filter(|s| month.contains(s.date))
            .cloned()
            .collect()
    }

    pub fn month_assignments(&self, month: YearMonth) -> Vec<AmAssignment> {
        self.am_assignments
            .iter()
            .filter(|a| month.contains(a.date))
            .cloned()
            .collect()
    }

    /// Ajoute ou remplace des shifts (un seul par couple employé/date).
    pub fn upsert_shifts(&mut self, shifts: Vec<ShiftRecord>) -> Result<usize, SchedError> {
        if let Some(unknown) = shifts
            .iter()
            .find(|s| self.find_employee(&s.employee_id).is_none())
        {
            return Err(SchedError::UnknownEmployee(unknown.employee_id.to_string()));
        }
        let count = shifts.len();
        for shift in shifts {
            match self
                .shifts
                .iter_mut()
                .find(|s| s.employee_id == shift.employee_id && s.date == shift.date)
            {
                Some(existing) => existing.kind = shift.kind,
                None => self.shifts.push(shift),
            }
        }
        Ok(count)
    }

    /// Enregistre les repos générés. Tout ou rien : refuse si une case a été
    /// occupée depuis le calcul.
    pub fn apply_generated_shifts(&mut self, generated: &[GeneratedShift]) -> Result<usize, SchedError> {
        let occupied: HashSet<(&EmployeeId, NaiveDate)> =
            self.shifts.iter().map(|s| (&s.employee_id, s.date)).collect();
        if let Some(clash) = generated
            .iter()
            .find(|g| occupied.contains(&(&g.employee_id, g.date)))
        {
            return Err(SchedError::Occupied {
                employee: clash.employee_id.to_string(),
                date: clash.date,
            });
        }
        self.shifts.extend(generated.iter().map(GeneratedShift::to_record));
        Ok(generated.len())
    }

    /// Supprime toutes les affectations automatiques du mois puis insère le
    /// nouveau jeu ; les affectations manuelles ne sont pas touchées.
    /// Retourne le nombre de lignes supprimées.
    pub fn replace_auto_assignments(&mut self, month: YearMonth, fresh: Vec<AmAssignment>) -> usize {
        let before = self.am_assignments.len();
        self.am_assignments
            .retain(|a| !(a.is_auto_assigned && month.contains(a.date)));
        let removed = before - self.am_assignments.len();
        self.am_assignments.extend(fresh);
        removed
    }
}

pub trait Storage {
    /// Charge le jeu de données depuis un support.
    fn load(&self) -> anyhow::Result<Dataset>;
    /// Sauvegarde de manière atomique.
    fn save(&self, data: &Dataset) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Jeu vide si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> anyhow::Result<Dataset> {
        if !self.path.exists() {
            return Ok(Dataset::default());
        }
        self.load()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Dataset> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let dataset: Dataset =
            serde_json::from_slice(&data).with_context(|| "parsing dataset json")?;
        Ok(dataset)
    }

    fn save(&self, data: &Dataset) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
