//! dashmig command line

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dashmig_core::{EntityRef, MetabaseClient, MigrationConfig, MigrationSession};
use dashmig_schema::{read_document, CardId, DashboardId};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn entity_args() -> [Arg; 2] {
    [
        Arg::new("kind")
            .required(true)
            .value_parser(["card", "dashboard"])
            .help("Entity kind"),
        Arg::new("id")
            .required(true)
            .value_parser(value_parser!(u64))
            .help("Entity id on the destination installation"),
    ]
}

fn cli() -> Command {
    Command::new("dashmig")
        .version(dashmig_core::VERSION)
        .about("Migrate cards and dashboards to a new database schema")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .default_value("dashmig.yml")
                .value_parser(value_parser!(PathBuf))
                .help("Run configuration (YAML or JSON)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging (RUST_LOG takes precedence)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log as JSON lines"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Rewrite without pushing anything"),
        )
        .subcommand(
            Command::new("migrate-card")
                .about("Migrate cards, and every card they depend on")
                .arg(
                    Arg::new("ids")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(u64))
                        .help("Card ids on the destination installation"),
                ),
        )
        .subcommand(
            Command::new("migrate-dashboard")
                .about("Migrate dashboards and the cards they place")
                .arg(
                    Arg::new("ids")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(u64))
                        .help("Dashboard ids on the destination installation"),
                ),
        )
        .subcommand(
            Command::new("labels")
                .about("Print the labels of a card or dashboard, one per line")
                .args(entity_args()),
        )
        .subcommand(
            Command::new("relabel")
                .about("Replace labels of a card or dashboard")
                .args(entity_args())
                .arg(
                    Arg::new("replacements")
                        .long("replacements")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML or JSON map of label to replacement"),
                ),
        )
        .subcommand(Command::new("check-config").about("Load and validate the run configuration"))
}

fn init_tracing(matches: &ArgMatches) {
    let default = if matches.get_flag("verbose") { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if matches.get_flag("log-json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn entity(args: &ArgMatches) -> Result<EntityRef> {
    let id = *args.get_one::<u64>("id").context("missing entity id")?;
    match args.get_one::<String>("kind").map(String::as_str) {
        Some("card") => Ok(EntityRef::card(CardId(id))),
        Some("dashboard") => Ok(EntityRef::dashboard(DashboardId(id))),
        other => bail!("unknown entity kind {other:?}"),
    }
}

fn ids(args: &ArgMatches) -> Vec<u64> {
    args.get_many::<u64>("ids").into_iter().flatten().copied().collect()
}

fn load_config(matches: &ArgMatches) -> Result<MigrationConfig> {
    let path = matches
        .get_one::<PathBuf>("config")
        .context("missing --config")?;
    let config = MigrationConfig::from_path(path)
        .with_context(|| format!("loading configuration {}", path.display()))?;
    let dry_run = config.dry_run || matches.get_flag("dry-run");
    Ok(config.with_dry_run(dry_run))
}

fn session(config: &MigrationConfig) -> Result<MigrationSession<MetabaseClient>> {
    let client = config.client().context("building HTTP client")?;
    config.session(client).context("preparing migration session")
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("migrate-card", args)) => {
            let mut session = session(&config)?;
            for id in ids(args) {
                session
                    .migrate_card(CardId(id))
                    .with_context(|| format!("migrating card {id}"))?;
            }
            tracing::info!(cards = session.migrated_cards().count(), "done");
        }
        Some(("migrate-dashboard", args)) => {
            let mut session = session(&config)?;
            for id in ids(args) {
                session
                    .migrate_dashboard(DashboardId(id))
                    .with_context(|| format!("migrating dashboard {id}"))?;
            }
            tracing::info!(cards = session.migrated_cards().count(), "done");
        }
        Some(("labels", args)) => {
            let entity = entity(args)?;
            let labels = session(&config)?
                .collect_labels(entity)
                .with_context(|| format!("collecting labels of {entity}"))?;
            for label in labels {
                println!("{label}");
            }
        }
        Some(("relabel", args)) => {
            let entity = entity(args)?;
            let path = args
                .get_one::<PathBuf>("replacements")
                .context("missing --replacements")?;
            let replacements: BTreeMap<String, String> = read_document(path)
                .with_context(|| format!("reading replacements {}", path.display()))?;
            let count = session(&config)?
                .relabel(entity, &replacements)
                .with_context(|| format!("relabelling {entity}"))?;
            println!("{count} label(s) replaced on {entity}");
        }
        Some(("check-config", _)) => {
            let schema = config.migration_schema().context("building schema mapping")?;
            let translator = config.translator().context("building translator")?;
            println!("server:          {}", config.server.base_url);
            println!("target database: {}", schema.db_target);
            println!("tables mapped:   {}", schema.tables.table_count());
            println!("columns mapped:  {}", schema.tables.column_count());
            println!("cards:           {}", schema.transformations.cards.len());
            println!("dashboards:      {}", schema.transformations.dashboards.len());
            match translator {
                Some(t) => println!("translation:     {} ({:?} on miss)", t.language(), t.on_miss()),
                None => println!("translation:     off"),
            }
            println!("dry run:         {}", config.dry_run);
        }
        _ => bail!("no command given"),
    }
    Ok(())
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(&matches);

    if let Err(err) = run(&matches) {
        tracing::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmig_core::EntityKind;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["dashmig", "migrate-card", "112", "113", "--dry-run", "-c", "run.yml"])
            .unwrap();
        assert!(matches.get_flag("dry-run"));
        assert_eq!(matches.get_one::<PathBuf>("config").unwrap(), &PathBuf::from("run.yml"));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "migrate-card");
        assert_eq!(ids(args), vec![112, 113]);
    }

    #[test]
    fn entity_arguments() {
        let matches = cli()
            .try_get_matches_from(["dashmig", "labels", "dashboard", "104"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(entity(args).unwrap(), EntityRef::dashboard(DashboardId(104)));
        assert_eq!(entity(args).unwrap().kind, EntityKind::Dashboard);

        assert!(cli()
            .try_get_matches_from(["dashmig", "labels", "question", "1"])
            .is_err());
    }
}
