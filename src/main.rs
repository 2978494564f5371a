mod cli;
mod logging;
mod reporter;

use std::io::{self, Write};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use archive_keeper::duplicates::{self, FilterMode};
use archive_keeper::lists;
use archive_keeper::storage::{ClassificationStore, Database};
use archive_keeper::{AppConfig, ManageFilesEngine, ManageOptions};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, DuplicatesArgs, ListsArgs, ManageArgs};
use colored::*;
use dotenv::dotenv;
use reporter::CliReporter;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match archive_keeper::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Manage(manage)) => run_manage(&config, manage),
        Some(Commands::Duplicates(dupes)) => run_duplicates(&config, dupes),
        Some(Commands::Lists(list)) => run_lists(&config, list),
        Some(Commands::AddTag { tag }) => run_add_tag(&config, &tag),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        Some(Commands::TruncateDb) => run_truncate(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }
    Ok(())
}

fn run_manage(config: &AppConfig, args: ManageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db: Arc<dyn ClassificationStore> = Arc::new(Database::open(&config.database_path)?);
    let engine = ManageFilesEngine::new(db, config.pipeline_settings());
    let options = ManageOptions {
        check_blacklist: args.check_blacklist,
        move_only: args.move_only,
        dnw: args.dnw.map(Into::into),
        check_index: args.index,
        skip_indexed: args.skip_indexed,
        prune_index: args.prune_index,
        storage_root: args.storage_root,
    };

    let reporter = CliReporter::new();
    let report = engine.start(&args.root, &args.tag, &options, &reporter)?;
    let stats = report.stats;

    println!();
    info!(
        "Hashed: {}, to index: {}, skipped: {}, already indexed: {}",
        format!("{}", stats.hashed).green(),
        format!("{}", stats.to_index).green(),
        format!("{}", stats.skipped).green(),
        format!("{}", stats.already_indexed).green(),
    );
    info!(
        "Blocked: {}, DNW: {}, directories moved: {}, read failures: {}",
        format!("{}", stats.blocked).red(),
        format!("{}", stats.dnw).red(),
        format!("{}", stats.directories_moved).red(),
        format!("{}", stats.read_failures).red(),
    );
    info!(
        "Indexed {} new files in {} batches ({} failed), pruned {}, took {}",
        format!("{}", report.persist.committed).cyan(),
        report.persist.batches,
        report.persist.failed,
        stats.pruned,
        format!("{:.2}s", report.duration.as_secs_f64()).cyan(),
    );
    for dir in &report.flagged_dirs {
        println!("{} {}", "CHECK".red().bold(), dir.display());
    }
    if report.cancelled {
        println!("{}", "Run was cancelled before all files were processed".yellow());
    }

    if let Some(csv_path) = &config.stats_csv {
        if let Err(e) = stats.write_csv(
            csv_path,
            &args.tag,
            report.cancelled,
            report.duration.as_secs_f64(),
        ) {
            error!("Failed to write stats to {}: {}", csv_path, e);
        }
    }

    Ok(())
}

fn run_duplicates(
    config: &AppConfig,
    args: DuplicatesArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.database_path)?;
    let mounts = config.tag_mounts();
    let mut groups = duplicates::load_duplicates(&db, args.tag.as_deref(), &mounts)?;
    duplicates::filter_groups(&mut groups, FilterMode::from(args.filter), &mounts);

    for path in &args.select {
        if !groups.iter_mut().any(|g| g.set_selected(path, true)) {
            println!("{} {}", "Not in any group:".yellow(), path.display());
        }
    }

    for group in &groups {
        println!("{}", group.hash().unwrap_or_default().bold());
        for entry in group.entries() {
            let marker = if entry.is_selected() {
                "[x]".red()
            } else if entry.is_valid() {
                "[ ]".normal()
            } else {
                "[?]".dimmed()
            };
            println!("  {} {} ({})", marker, entry.path().display(), entry.location());
        }
    }
    info!("{} duplicate groups", format!("{}", groups.len()).cyan());

    let selected: usize = groups.iter().map(|g| g.selected().count()).sum();
    if !args.delete || selected == 0 {
        return Ok(());
    }

    let prompt = format!("Delete {} selected files?", selected);
    if !prompt_confirm(&prompt, Some(false))? {
        return Ok(());
    }

    let (mut deleted, mut failed) = (0, 0);
    for group in &mut groups {
        let outcome = duplicates::delete_selected(group);
        deleted += outcome.deleted;
        failed += outcome.failed;
    }
    info!(
        "Deleted {} files, {} failed",
        format!("{}", deleted).green(),
        format!("{}", failed).red(),
    );
    Ok(())
}

fn run_lists(config: &AppConfig, args: ListsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.database_path)?;
    let outcome =
        lists::hash_directory_into_list(&db, &args.dir, args.list.into(), &AtomicBool::new(false))?;
    info!(
        "Hashed {}, added {}, failed {}, skipped {}",
        format!("{}", outcome.hashed).green(),
        format!("{}", outcome.added).green(),
        format!("{}", outcome.failed).red(),
        format!("{}", outcome.skipped).yellow(),
    );
    Ok(())
}

fn run_add_tag(config: &AppConfig, tag: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.database_path)?;
    let id = db.add_location(tag)?;
    println!("Location {} registered (id {})", tag.green(), id);
    Ok(())
}

fn run_truncate(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !prompt_confirm(
        "Are you SURE you want to COMPLETELY DELETE the Database?",
        Some(false),
    )? {
        return Ok(());
    }
    Database::open(&config.database_path)?.truncate_all()?;
    println!("All tables truncated");
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
