use super::{Cli, Commands, ConfigAction};
use crate::api::{HttpProjectsApi, ProjectsApi};
use crate::cli::formatter::{CliFormatter, StringFormat};
use crate::models::{filter_projects, Config, DashboardStats, FilterCategory};
use crate::state::{DashboardController, FileQueryStore, QueryStore, SharedState, SEARCH_PARAM};
use crate::ui::dashboard::{Dashboard, DashboardExit};
use crate::ui::{restore_terminal, setup_terminal};
use crate::utils::config::{get_config_path, get_location_path, load_config_from, save_config_to};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MISSING_TOKEN_HINT: &str =
    "No auth token configured. Pass --token, set PROJDASH_AUTH_TOKEN, or run `projdash config set auth_token <TOKEN>`";

pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => get_config_path(),
    }
}

/// Loads the config file, then layers environment and command-line
/// overrides on top of it.
pub fn load_effective_config(cli: &Cli) -> Result<Config> {
    let mut config = load_config_from(&config_path(cli)?)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    apply_cli_overrides(&mut config, cli);
    config
        .validate()
        .context("Invalid configuration after applying overrides")?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.base_url {
        config.api_base_url = url.clone();
    }
    if let Some(token) = cli.token.as_ref().filter(|t| !t.is_empty()) {
        config.auth_token = Some(token.clone());
    }
}

pub async fn handle_command(cli: Cli, config: Config) -> Result<()> {
    let path = config_path(&cli)?;
    let command = cli.command.unwrap_or(Commands::Dashboard {
        search: None,
        filter: None,
    });

    match command {
        Commands::Dashboard { search, filter } => run_dashboard(&config, search, filter).await,

        Commands::List {
            search,
            filter,
            json,
        } => list_projects(&config, search, filter, json).await,

        Commands::Config { action } => handle_config_action(&path, &action),

        Commands::Completions { shell } => {
            Cli::generate_completions(shell);
            Ok(())
        }
    }
}

fn parse_filter(filter: Option<String>) -> Result<FilterCategory> {
    match filter {
        Some(raw) => raw.parse(),
        None => Ok(FilterCategory::All),
    }
}

async fn run_dashboard(
    config: &Config,
    search: Option<String>,
    filter: Option<String>,
) -> Result<()> {
    let category = parse_filter(filter)?;
    if config.token().is_empty() {
        warn!("{}", MISSING_TOKEN_HINT);
    }

    let api = Arc::new(HttpProjectsApi::from_config(config)?);
    let mut query = FileQueryStore::open(&get_location_path()?)?;
    if let Some(search) = search {
        query.replace(&[(SEARCH_PARAM, search.as_str())])?;
    }
    debug!("Dashboard location: ?{}", query.to_query_string());

    // No other writer of the shared term here, so it starts from the stored one
    let shared = SharedState::new(
        config.token(),
        query.get(SEARCH_PARAM).unwrap_or_default(),
    );

    let controller = DashboardController::mount(
        api,
        shared.subscribe(),
        Box::new(query),
        config.tasks_this_week,
    );
    let mut dashboard = Dashboard::new(controller, config.projects_per_row);
    dashboard
        .controller_mut()
        .state_mut()
        .set_filter_category(category);

    let mut terminal = setup_terminal()?;
    let result = dashboard.run(&mut terminal).await;
    restore_terminal()?;
    terminal.show_cursor()?;

    match result? {
        DashboardExit::Quit => {}
        DashboardExit::Navigate(route) => println!("{}", route),
    }
    Ok(())
}

async fn list_projects(
    config: &Config,
    search: Option<String>,
    filter: Option<String>,
    json: bool,
) -> Result<()> {
    let category = parse_filter(filter)?;
    if config.token().is_empty() {
        return Err(anyhow::anyhow!(MISSING_TOKEN_HINT));
    }

    let api = HttpProjectsApi::from_config(config)?;
    let search = search.unwrap_or_default();
    let projects = api
        .fetch_projects(config.token(), &search)
        .await
        .with_context(|| format!("Error fetching projects from {}", api.projects_url()))?;

    let visible = filter_projects(&projects, category);
    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    CliFormatter::print_section_header("Project Dashboard");
    CliFormatter::print_stats(&DashboardStats::compute(&projects, config.tasks_this_week));

    CliFormatter::print_section_header(&format!("{} Projects", category.label()));
    if projects.is_empty() {
        CliFormatter::print_empty_state("No projects. Get started by creating a new project.");
    } else if visible.is_empty() {
        CliFormatter::print_empty_state(&format!(
            "No {} projects",
            category.label().to_lowercase()
        ));
    } else {
        for project in visible {
            CliFormatter::print_project_entry(project);
        }
    }
    Ok(())
}

fn handle_config_action(path: &Path, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config_from(path)?;
            CliFormatter::print_section_header("Configuration");
            CliFormatter::print_field("File", &path.display().to_string(), Some("gray"));
            CliFormatter::print_field("api_base_url", &config.api_base_url, Some("cyan"));
            let token = if config.token().is_empty() {
                "(not set)".dimmed()
            } else {
                "********".to_string()
            };
            CliFormatter::print_field("auth_token", &token, None);
            for key in ["request_timeout_secs", "projects_per_row", "tasks_this_week", "log_level"] {
                let value = config
                    .get_value(key)
                    .unwrap_or_else(|| "(not set)".dimmed());
                CliFormatter::print_field(key, &value, None);
            }

            if !config.custom_settings.is_empty() {
                CliFormatter::print_section_header("Custom Settings");
                let mut keys: Vec<_> = config.custom_settings.keys().collect();
                keys.sort();
                for key in keys {
                    CliFormatter::print_field(key, &config.custom_settings[key], None);
                }
            }
            Ok(())
        }

        ConfigAction::Set { key, value } => {
            let mut config = load_config_from(path)?;
            config.set_value(key, value)?;
            save_config_to(&config, path)?;
            CliFormatter::print_success(&format!("Set {} = {}", key, value));
            Ok(())
        }

        ConfigAction::Get { key } => {
            let config = load_config_from(path)?;
            match config.get_value(key) {
                Some(value) => println!("{}", value),
                None => CliFormatter::print_warning(&format!("{} is not set", key)),
            }
            Ok(())
        }

        ConfigAction::Reset => {
            save_config_to(&Config::default(), path)?;
            CliFormatter::print_success("Configuration reset to defaults");
            CliFormatter::print_info(&format!("Written to {}", path.display()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_cli_overrides_win() {
        let cli = Cli::try_parse_from([
            "projdash",
            "--base-url",
            "https://api.example.com",
            "--token",
            "cli-token",
            "list",
        ])
        .unwrap();

        let mut config = Config::default();
        config.auth_token = Some("file-token".to_string());
        apply_cli_overrides(&mut config, &cli);

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.token(), "cli-token");
    }

    #[test]
    fn test_empty_cli_token_is_ignored() {
        let cli = Cli::try_parse_from(["projdash", "--token", "", "list"]).unwrap();
        let mut config = Config::default();
        config.auth_token = Some("file-token".to_string());
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.token(), "file-token");
    }

    #[test]
    fn test_parse_filter_rejects_unknown() {
        assert_eq!(parse_filter(None).unwrap(), FilterCategory::All);
        assert_eq!(
            parse_filter(Some("Recent".to_string())).unwrap(),
            FilterCategory::Recent
        );
        assert!(parse_filter(Some("archived".to_string())).is_err());
    }

    #[test]
    fn test_config_set_get_reset_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        handle_config_action(
            &path,
            &ConfigAction::Set {
                key: "projects_per_row".to_string(),
                value: "4".to_string(),
            },
        )
        .unwrap();
        assert_eq!(load_config_from(&path).unwrap().projects_per_row, 4);

        let bad = handle_config_action(
            &path,
            &ConfigAction::Set {
                key: "projects_per_row".to_string(),
                value: "0".to_string(),
            },
        );
        assert!(bad.is_err());
        assert_eq!(load_config_from(&path).unwrap().projects_per_row, 4);

        handle_config_action(&path, &ConfigAction::Reset).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), Config::default());
    }

    #[tokio::test]
    async fn test_list_without_token_fails_before_any_request() {
        let config = Config::default();
        let err = list_projects(&config, None, None, false).await.unwrap_err();
        assert!(err.to_string().contains("No auth token configured"));
    }
}
