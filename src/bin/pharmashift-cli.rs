#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use pharmashift::{
    calendar::current_month_days,
    io,
    model::{TaskOption, YearMonth},
    report::rest_summary,
    scheduler::{AmTaskRequest, AutoShiftRequest, Scheduler},
    settings::PlannerSettings,
    storage::{JsonStorage, Storage},
};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des repos et tâches du matin (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON des données
    #[arg(long, global = true, default_value = "pharmashift.json")]
    data: String,

    /// Fichier JSON de réglages (plafonds, objectifs, jours fériés)
    #[arg(long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct MonthArg {
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
}

impl MonthArg {
    fn resolve(self) -> Result<YearMonth> {
        YearMonth::new(self.year, self.month).map_err(anyhow::Error::msg)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer le personnel depuis un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
    },

    /// Importer des shifts depuis un CSV
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Déclarer une tâche du matin
    AddTask {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        order: i32,
        /// Tâche de repli (absorbe les pharmaciens restants)
        #[arg(long)]
        fallback: bool,
        /// Jamais distribuée automatiquement
        #[arg(long)]
        manual_only: bool,
    },

    /// Calculer les repos automatiques du mois (simulation par défaut)
    AutoShifts {
        #[command(flatten)]
        month: MonthArg,
        /// Enregistrer les repos générés
        #[arg(long)]
        apply: bool,
        /// Export CSV des repos générés
        #[arg(long)]
        out_csv: Option<String>,
        /// Export CSV du bilan par employé
        #[arg(long)]
        summary_csv: Option<String>,
        /// Graine du tirage aléatoire (résultat reproductible)
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        max_rest_pharmacist: Option<usize>,
        #[arg(long)]
        max_rest_assistant: Option<usize>,
    },

    /// Répartir les tâches du matin du mois
    AmTasks {
        #[command(flatten)]
        month: MonthArg,
        /// Remplacer les affectations automatiques existantes
        #[arg(long)]
        apply: bool,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Vérifier les doublons de tâches du matin
    CheckTasks {
        #[command(flatten)]
        month: MonthArg,
    },

    /// Jours de repos effectifs par employé
    RestSummary {
        #[command(flatten)]
        month: MonthArg,
    },
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let settings = match &cli.settings {
        Some(path) => PlannerSettings::load_from_file(path)?,
        None => PlannerSettings::default(),
    };
    let storage = JsonStorage::open(&cli.data)?;
    let mut data = storage.load_or_default()?;
    let scheduler = Scheduler::new(settings.calendar());

    let code = match cli.cmd {
        Commands::ImportEmployees { csv } => {
            let employees = io::import_employees_csv(csv)?;
            for e in &employees {
                if data.find_employee(&e.id).is_some() {
                    bail!("duplicate employee id: {}", e.id);
                }
            }
            println!("{} employee(s) imported", employees.len());
            data.employees.extend(employees);
            storage.save(&data)?;
            0
        }
        Commands::ImportShifts { csv } => {
            let shifts = io::import_shifts_csv(csv)?;
            let count = data.upsert_shifts(shifts)?;
            println!("{count} shift(s) imported");
            storage.save(&data)?;
            0
        }
        Commands::AddTask {
            name,
            order,
            fallback,
            manual_only,
        } => {
            if data.task_options.iter().any(|t| t.name == name) {
                bail!("task already exists: {name}");
            }
            let mut task = TaskOption::new(name, order);
            if fallback {
                task = task.fallback();
            }
            if manual_only {
                task = task.manual_only();
            }
            data.task_options.push(task);
            storage.save(&data)?;
            0
        }
        Commands::AutoShifts {
            month,
            apply,
            out_csv,
            summary_csv,
            seed,
            max_rest_pharmacist,
            max_rest_assistant,
        } => {
            let month = month.resolve()?;
            let mut opts = settings.assign_options();
            if let Some(max) = max_rest_pharmacist {
                opts.max_rest_pharmacist = max;
            }
            if let Some(max) = max_rest_assistant {
                opts.max_rest_assistant = max;
            }
            let shifts = data.shifts_around(month);
            let goals = settings.goals_for(&data.employees);
            let pending = HashMap::new();
            let req = AutoShiftRequest {
                month,
                employees: &data.employees,
                shifts: &shifts,
                schedules: &data.schedules,
                goals: &goals,
                pending: &pending,
                opts,
            };
            let outcome = scheduler.auto_shifts(&req, &mut make_rng(seed))?;

            for r in &outcome.results {
                println!(
                    "{} | {} + {} = {} | {}-{} | {}",
                    r.name,
                    r.current,
                    r.added,
                    r.total,
                    r.goal_min,
                    r.goal_max,
                    if r.messages.is_empty() {
                        "OK".to_string()
                    } else {
                        r.messages.join(", ")
                    }
                );
            }
            if let Some(path) = out_csv {
                io::export_generated_csv(path, &outcome.new_shifts)?;
            }
            if let Some(path) = summary_csv {
                io::export_summary_csv(path, &outcome.results)?;
            }
            if apply {
                let count = data.apply_generated_shifts(&outcome.new_shifts)?;
                storage.save(&data)?;
                println!("{count} rest day(s) saved");
            } else {
                println!("{} rest day(s) proposed (dry run)", outcome.new_shifts.len());
            }
            // Code 2 = WARNING/INCOMPLETE
            let incomplete = !outcome.unresolved.is_empty()
                || outcome.results.iter().any(|r| !r.is_goal_reached);
            if incomplete {
                2
            } else {
                0
            }
        }
        Commands::AmTasks {
            month,
            apply,
            out_csv,
            seed,
        } => {
            let month = month.resolve()?;
            let shifts = data.month_shifts(month);
            let existing = data.month_assignments(month);
            let req = AmTaskRequest {
                employees: &data.employees,
                options: &data.task_options,
                shifts: &shifts,
                assignments: &existing,
            };
            let fresh = scheduler.am_tasks(month, &req, &mut make_rng(seed))?;
            if let Some(path) = out_csv {
                io::export_am_csv(path, &fresh)?;
            }
            if apply {
                let count = fresh.len();
                let removed = data.replace_auto_assignments(month, fresh);
                storage.save(&data)?;
                println!("{removed} auto assignment(s) replaced by {count}");
            } else {
                for a in &fresh {
                    println!("{} | {} | {}", a.date, a.employee_id, a.task_name);
                }
            }
            0
        }
        Commands::CheckTasks { month } => {
            let month = month.resolve()?;
            let conflicts = scheduler.detect_conflicts(
                month,
                &data.employees,
                &data.month_shifts(month),
                &data.month_assignments(month),
                &data.task_options,
            )?;
            if conflicts.is_empty() {
                println!("OK: no duplicate task");
                0
            } else {
                eprintln!("Found {} duplicate task(s)", conflicts.len());
                for c in &conflicts {
                    let who: Vec<&str> = c.employees.iter().map(|e| e.as_str()).collect();
                    eprintln!("{} | {} | {}", c.date, c.task_name, who.join(","));
                }
                2
            }
        }
        Commands::RestSummary { month } => {
            let month = month.resolve()?;
            let days = current_month_days(scheduler.calendar(), month)?;
            for t in rest_summary(&data.employees, &data.month_shifts(month), &days) {
                println!("{}\t{}", t.name, t.rest_days);
            }
            0
        }
    };

    std::process::exit(code);
}
