//! # MewFocus - ADHD-friendly mission manager
//!
//! A command-line mission manager with an optional terminal user interface
//! (TUI), built around small wins: missions, quick status toggles, a progress
//! gauge and AI-generated step-by-step breakdowns.
//!
//! ## Key Features
//!
//! - **Missions with a clear lifecycle**: active, completed, cancelled or postponed, never two at once
//! - **Categories**: plain tasks, follow-ups, recurring missions and projects with steps
//! - **Accounts**: personal and work spaces; work accounts have employees and a team view
//! - **AI help**: break a mission into 4 to 6 tiny steps, or create one from a spoken sentence
//! - **Local storage**: one file per key in `~/.mewfocus/`, written atomically
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! mf ui
//!
//! # Add a mission
//! mf add "Ranger le bureau" --priority haute --due "tomorrow 18:00"
//!
//! # Break it down with the AI (needs GEMINI_API_KEY)
//! mf breakdown "Ranger le bureau"
//!
//! # Check progress
//! mf progress
//! ```
//!
//! ## Key Commands
//!
//! - `mf ui` - Launch the TUI
//! - `mf add <title>` - Create a mission in the active account
//! - `mf list --filter <FILTER>` - Active missions (ALL, TEAM, CAT_PROJET, EMP_ME, ...)
//! - `mf done <id>` - Toggle completion and celebrate
//! - `mf history` - Journal of finished, cancelled and postponed missions
//! - `mf account switch <name>` - Change the active account
//!
//! Logging is controlled by `MEWFOCUS_LOG` (default `warn`).

use clap::Parser;

pub mod account;
pub mod ai;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod fields;
pub mod lifecycle;
pub mod logging;
pub mod store;
pub mod task;
pub mod views;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use db::Database;
use logging::LogTarget;
use store::FileStore;

fn main() {
    let cli = Cli::parse();

    // Completions need neither data nor logging
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let config = Config::resolve(cli.data_dir, cli.model);
    if let Err(e) = config.ensure_data_dir() {
        eprintln!(
            "Failed to create data directory {}: {}",
            config.data_dir.display(),
            e
        );
        std::process::exit(1);
    }

    let target = if matches!(cli.command, Commands::Ui) {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    logging::init(&config.log_filter, target, &config.data_dir);

    let mut db = Database::load(FileStore::new(&config.data_dir));

    match cli.command {
        Commands::Ui => cmd_ui(db, &config),
        Commands::Add(args) => cmd_add(&mut db, args),
        Commands::List { filter } => cmd_list(&db, filter),
        Commands::View { id } => cmd_view(&db, id),
        Commands::Team => cmd_team(&db),
        Commands::History => cmd_history(&db),
        Commands::Progress => cmd_progress(&db),
        Commands::Done { id } => cmd_done(&mut db, id),
        Commands::Cancel { id } => cmd_cancel(&mut db, id),
        Commands::Postpone { id } => cmd_postpone(&mut db, id),
        Commands::Delete { id } => cmd_delete(&mut db, id),
        Commands::Subtask { task, subtask } => cmd_subtask(&mut db, task, subtask),
        Commands::Breakdown { id } => cmd_breakdown(&mut db, &config, id),
        Commands::Voice { transcript } => cmd_voice(&mut db, &config, transcript),
        Commands::Assign { id, employee } => cmd_assign(&mut db, id, employee),
        Commands::Account { action } => cmd_account(&mut db, action),
        Commands::Employee { action } => cmd_employee(&mut db, action),
        Commands::Name { name } => cmd_name(&mut db, name),
        Commands::Reset { yes } => cmd_reset(&mut db, yes),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
