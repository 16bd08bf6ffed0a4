use crate::calendar::GridCalendar;
use crate::model::{Employee, EmployeeId, RestGoal};
use crate::scheduler::AssignOptions;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Réglages du planificateur, persistés en JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    #[serde(default = "default_ceiling")]
    pub max_rest_pharmacist: usize,
    #[serde(default = "default_ceiling")]
    pub max_rest_assistant: usize,
    /// Objectif appliqué aux employés sans objectif propre.
    #[serde(default)]
    pub default_goal: Option<RestGoal>,
    #[serde(default)]
    pub goals: HashMap<EmployeeId, RestGoal>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub rules: Rules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default)]
    pub name: String,
}

/// Contraintes et budgets de tentatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default = "default_work_run")]
    pub max_consecutive_work_days: usize,
    #[serde(default = "default_rest_run")]
    pub max_consecutive_rest_days: usize,
    #[serde(default = "default_streak_restarts")]
    pub streak_restarts: u32,
    #[serde(default = "default_quota_attempts")]
    pub quota_attempts: u32,
}

fn default_ceiling() -> usize {
    AssignOptions::default().max_rest_pharmacist
}
fn default_work_run() -> usize {
    AssignOptions::default().max_consecutive_work_days
}
fn default_rest_run() -> usize {
    AssignOptions::default().max_consecutive_rest_days
}
fn default_streak_restarts() -> u32 {
    AssignOptions::default().streak_restarts
}
fn default_quota_attempts() -> u32 {
    AssignOptions::default().quota_attempts
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_consecutive_work_days: default_work_run(),
            max_consecutive_rest_days: default_rest_run(),
            streak_restarts: default_streak_restarts(),
            quota_attempts: default_quota_attempts(),
        }
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_rest_pharmacist: default_ceiling(),
            max_rest_assistant: default_ceiling(),
            default_goal: None,
            goals: HashMap::new(),
            holidays: Vec::new(),
            rules: Rules::default(),
        }
    }
}

impl PlannerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.rules.max_consecutive_work_days == 0 {
            bail!("max_consecutive_work_days must be > 0");
        }
        if self.rules.max_consecutive_rest_days == 0 {
            bail!("max_consecutive_rest_days must be > 0");
        }
        if self.rules.streak_restarts == 0 || self.rules.quota_attempts == 0 {
            bail!("attempt budgets must be > 0");
        }
        if let Some(goal) = &self.default_goal {
            check_goal("default_goal", goal)?;
        }
        for (id, goal) in &self.goals {
            check_goal(id.as_str(), goal)?;
        }
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading settings {}", path.display()))?;
        let settings: Self = serde_json::from_slice(&data)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn assign_options(&self) -> AssignOptions {
        AssignOptions {
            max_rest_pharmacist: self.max_rest_pharmacist,
            max_rest_assistant: self.max_rest_assistant,
            max_consecutive_work_days: self.rules.max_consecutive_work_days,
            max_consecutive_rest_days: self.rules.max_consecutive_rest_days,
            streak_restarts: self.rules.streak_restarts,
            quota_attempts: self.rules.quota_attempts,
        }
    }

    /// Objectif propre, sinon objectif par défaut ; absent si aucun des deux.
    pub fn goals_for(&self, employees: &[Employee]) -> HashMap<EmployeeId, RestGoal> {
        employees
            .iter()
            .filter_map(|e| {
                let goal = self.goals.get(&e.id).or(self.default_goal.as_ref())?;
                Some((e.id.clone(), *goal))
            })
            .collect()
    }

    pub fn calendar(&self) -> GridCalendar {
        GridCalendar::with_holidays(self.holidays.iter().map(|h| (h.date, h.name.clone())))
    }
}

fn check_goal(owner: &str, goal: &RestGoal) -> Result<()> {
    if goal.min < 0.0 || goal.min > goal.max {
        bail!("invalid rest goal for {owner}: min {} / max {}", goal.min, goal.max);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobType;

    #[test]
    fn empty_json_yields_defaults() {
        let settings: PlannerSettings = serde_json::from_str("{}").unwrap();
        settings.validate().unwrap();
        let opts = settings.assign_options();
        assert_eq!(opts.max_rest_pharmacist, 3);
        assert_eq!(opts.max_consecutive_work_days, 6);
        assert_eq!(opts.streak_restarts, 20);
        assert_eq!(opts.quota_attempts, 31);
    }

    #[test]
    fn inverted_goal_is_rejected() {
        let mut settings = PlannerSettings::default();
        settings
            .goals
            .insert(EmployeeId::new("a"), RestGoal { min: 10.0, max: 8.0 });
        assert!(settings.validate().is_err());
    }

    #[test]
    fn own_goal_overrides_default() {
        let a = Employee::new("A", JobType::Pharmacist);
        let b = Employee::new("B", JobType::Assistant);
        let mut settings = PlannerSettings {
            default_goal: Some(RestGoal { min: 8.0, max: 10.0 }),
            ..PlannerSettings::default()
        };
        settings.goals.insert(a.id.clone(), RestGoal { min: 9.0, max: 9.0 });

        let goals = settings.goals_for(&[a.clone(), b.clone()]);
        assert_eq!(goals[&a.id].min, 9.0);
        assert_eq!(goals[&b.id].min, 8.0);
    }
}
