use std::{fmt, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode, Select, Text, error::InquireResult};
use skynow_core::{
    Config, Coordinates, Dashboard, GeocodingResult, OpenWeatherClient, StateStore, Theme,
    WeatherData, WeatherError, alerts,
    compare::CompareBoard,
    explore,
    location::FixedLocator,
    map::MapView,
    presets,
    provider::current_for_city,
    search::{SearchPhase, SuggestionController},
    statistics,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skynow", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and response language.
    Configure,

    /// Current conditions and forecast for a city.
    Show {
        /// City name as you would type it in the search box.
        city: String,
    },

    /// Interactive search with suggestions.
    Search,

    /// Weather at your position.
    ///
    /// Without --lat/--lon the `[location]` from the config file is used.
    Locate {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Recent searches.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Saved places.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Compare two or more cities side by side.
    Compare {
        #[arg(required = true, num_args = 2..)]
        cities: Vec<String>,
    },

    /// Threshold alerts for a city.
    Alerts { city: String },

    /// 30-day statistics card for a city.
    Stats { city: String },

    /// Current conditions across African cities.
    Explore,

    /// Map markers for a city or for the popular cities.
    Map {
        city: Option<String>,
        #[arg(long, conflicts_with = "city")]
        popular: bool,
    },

    /// Show or change the color theme.
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },

    /// Pick one of the popular cities.
    Popular,
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    List,
    Clear,
    /// Re-open entry N (1-based).
    Open { index: usize },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    /// Add or remove a city.
    Toggle { city: String },
    /// Remove entry N (1-based).
    Remove { index: usize },
    /// Open entry N (1-based).
    Open { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        // Reconfiguring must work even when the saved state cannot be opened.
        if !self.command.needs_state() {
            return configure().await;
        }
        App::load()?.run(self.command).await
    }
}

impl Command {
    fn needs_state(&self) -> bool {
        !matches!(self, Command::Configure)
    }
}

struct App {
    config: Config,
    client: Arc<OpenWeatherClient>,
    store: Arc<StateStore>,
}

impl App {
    fn load() -> anyhow::Result<Self> {
        let config = Config::load()?;
        let client = OpenWeatherClient::from_config(&config)
            .context("Failed to set up the OpenWeather client")?;

        let dir = config.state_dir()?;
        let store = StateStore::open(&dir)
            .with_context(|| format!("Failed to open saved state in {}", dir.display()))?;

        Ok(Self {
            config,
            client: Arc::new(client),
            store: Arc::new(store),
        })
    }

    fn dashboard(&self) -> Dashboard {
        Dashboard::new(
            self.client.clone(),
            self.client.clone(),
            Arc::clone(&self.store),
        )
    }

    async fn run(self, command: Command) -> anyhow::Result<()> {
        tracing::debug!(?command, "running command");

        match command {
            Command::Configure => configure().await,
            Command::Show { city } => {
                let mut dash = self.dashboard();
                match dash.submit(&city).await {
                    Ok(true) => render::dashboard(&dash),
                    Ok(false) => println!("Type a city name."),
                    Err(err) => report(err)?,
                }
                Ok(())
            }
            Command::Search => self.search().await,
            Command::Locate { lat, lon } => {
                let position = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
                    _ => self.config.location,
                };
                let mut dash = self.dashboard();
                let result = dash.locate(&FixedLocator::new(position)).await;
                finish(&dash, result)
            }
            Command::History { action } => self.history(action).await,
            Command::Favorites { action } => self.favorites(action).await,
            Command::Compare { cities } => {
                let mut board = CompareBoard::with_cities(cities);
                board
                    .fetch_all(self.client.clone(), self.client.clone())
                    .await;
                render::compare(&board);
                Ok(())
            }
            Command::Alerts { city } => {
                let Some(weather) = self.current(&city).await? else {
                    return Ok(());
                };
                render::alerts(city.trim(), &alerts::evaluate(city.trim(), &weather));
                Ok(())
            }
            Command::Stats { city } => {
                let Some(weather) = self.current(&city).await? else {
                    return Ok(());
                };
                render::stats(&statistics::simulate(city.trim(), &weather));
                Ok(())
            }
            Command::Explore => {
                let cities =
                    explore::fetch_presets(self.client.clone(), presets::EXPLORE_CITIES).await;
                render::explore(&cities);
                Ok(())
            }
            Command::Map { city, popular } => self.map(city, popular).await,
            Command::Theme { action } => {
                let theme = match action {
                    None => self.store.theme(),
                    Some(ThemeAction::Toggle) => self.store.toggle_theme()?,
                    Some(ThemeAction::Light) => set_theme(&self.store, Theme::Light)?,
                    Some(ThemeAction::Dark) => set_theme(&self.store, Theme::Dark)?,
                };
                println!("Theme: {theme}");
                Ok(())
            }
            Command::Popular => {
                let choices = presets::POPULAR_CITIES.to_vec();
                let Some(city) =
                    blocking(move || Select::new("Popular cities:", choices).prompt_skippable())
                        .await?
                else {
                    return Ok(());
                };
                let mut dash = self.dashboard();
                let result = dash.select_popular(city).await.map(|_| ());
                finish(&dash, result)
            }
        }
    }

    /// Current conditions only; lookup errors are reported inline as `None`.
    async fn current(&self, city: &str) -> anyhow::Result<Option<WeatherData>> {
        match current_for_city(self.client.as_ref(), self.client.as_ref(), city).await {
            Ok((_, weather)) => Ok(Some(weather)),
            Err(err) => report(err).map(|()| None),
        }
    }

    async fn search(&self) -> anyhow::Result<()> {
        let controller =
            SuggestionController::new(self.client.clone(), self.config.search.debounce());
        let mut dash = self.dashboard();

        loop {
            let text = blocking(|| {
                Text::new("City:")
                    .with_help_message("Enter on an empty line to quit")
                    .prompt_skippable()
            })
            .await?
            .unwrap_or_default();

            let text = text.trim().to_string();
            if text.is_empty() {
                break;
            }

            let mut choices = match settle(&controller, &text).await? {
                SearchPhase::Resolved(places) => {
                    places.into_iter().map(Choice::Place).collect::<Vec<_>>()
                }
                SearchPhase::Failed(msg) => {
                    eprintln!("⚠ {msg}");
                    continue;
                }
                _ => {
                    println!("No place matches \"{text}\".");
                    continue;
                }
            };
            choices.push(Choice::Typed(text));

            let Some(choice) =
                blocking(move || Select::new("Pick a place:", choices).prompt_skippable()).await?
            else {
                continue;
            };

            let result = match choice {
                Choice::Place(place) => dash.select_suggestion(place).await,
                Choice::Typed(text) => dash.submit(&text).await.map(|_| ()),
            };
            finish(&dash, result)?;
            println!();
        }

        controller.reset();
        Ok(())
    }

    async fn history(&self, action: Option<HistoryAction>) -> anyhow::Result<()> {
        match action.unwrap_or(HistoryAction::List) {
            HistoryAction::List => render::history(&self.store.history()),
            HistoryAction::Clear => {
                self.store.clear_history()?;
                println!("History cleared.");
            }
            HistoryAction::Open { index } => {
                let entry = nth(self.store.history(), index, "history entry")?;
                let mut dash = self.dashboard();
                match dash.select_history(&entry).await {
                    Ok(true) => render::dashboard(&dash),
                    Ok(false) => println!(
                        "\"{}\" was saved without coordinates; try `skynow show {}`.",
                        entry.city, entry.city
                    ),
                    Err(err) => report(err)?,
                }
            }
        }
        Ok(())
    }

    async fn favorites(&self, action: Option<FavoritesAction>) -> anyhow::Result<()> {
        match action.unwrap_or(FavoritesAction::List) {
            FavoritesAction::List => render::favorites(&self.store.favorites()),
            FavoritesAction::Toggle { city } => {
                match self.dashboard().toggle_favorite_city(&city).await {
                    Ok(Some(true)) => println!("Added {} to favorites.", city.trim()),
                    Ok(Some(false)) => println!("Removed {} from favorites.", city.trim()),
                    Ok(None) => println!("Type a city name."),
                    Err(err) => report(err)?,
                }
            }
            FavoritesAction::Remove { index } => {
                let place = nth(self.store.favorites(), index, "favorite")?;
                if self.store.remove_favorite(&place)? {
                    println!("Removed {}.", render::place_label(&place));
                }
            }
            FavoritesAction::Open { index } => {
                let place = nth(self.store.favorites(), index, "favorite")?;
                let mut dash = self.dashboard();
                let result = dash.select_favorite(place).await;
                finish(&dash, result)?;
            }
        }
        Ok(())
    }

    async fn map(&self, city: Option<String>, popular: bool) -> anyhow::Result<()> {
        let mut view = MapView::default();
        if let Some(position) = self.config.location {
            view.center_on(position);
        }

        if popular {
            view.show_popular(self.client.clone()).await;
        } else if let Some(city) = city {
            let result = view
                .search(self.client.as_ref(), self.client.as_ref(), &city)
                .await;
            if let Err(err) = result {
                return report(err);
            }
        } else {
            self.map_prompt(&mut view).await?;
        }

        render::map(&view);
        Ok(())
    }

    /// Pins the top suggestion once typing has settled for the auto-submit delay.
    async fn map_prompt(&self, view: &mut MapView) -> anyhow::Result<()> {
        let Some(text) = blocking(|| Text::new("City to pin:").prompt_skippable()).await? else {
            return Ok(());
        };

        let controller =
            SuggestionController::new(self.client.clone(), self.config.search.auto_submit());
        match settle(&controller, &text).await? {
            SearchPhase::Resolved(places) => {
                let Some(top) = places.first() else {
                    return Ok(());
                };
                if let Err(err) = view.show_place(self.client.as_ref(), top).await {
                    report(err)?;
                }
            }
            SearchPhase::Failed(msg) => eprintln!("⚠ {msg}"),
            SearchPhase::NotFound => println!("No place matches \"{}\".", text.trim()),
            _ => {}
        }
        Ok(())
    }
}

/// A suggestion, or the raw text submitted as typed.
enum Choice {
    Place(GeocodingResult),
    Typed(String),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Place(place) => f.write_str(&render::place_label(place)),
            Choice::Typed(text) => write!(f, "Search \"{text}\" as typed"),
        }
    }
}

async fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;
    let current_language = config.language.clone();
    let key_help = if config.is_configured() {
        "Leave empty to keep the current key"
    } else {
        "Get one at https://openweathermap.org/api"
    };

    let (api_key, language) = blocking(move || {
        let api_key = Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_help_message(key_help)
            .without_confirmation()
            .prompt()?;
        let language = Text::new("Response language:")
            .with_default(&current_language)
            .prompt()?;
        Ok((api_key, language))
    })
    .await?;

    apply_answers(&mut config, &api_key, &language)?;
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// A blank key keeps the configured one; it is an error only when none exists.
fn apply_answers(config: &mut Config, api_key: &str, language: &str) -> anyhow::Result<()> {
    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.upsert_api_key(api_key.to_string());
    } else if !config.is_configured() {
        bail!("The API key cannot be empty");
    }

    let language = language.trim();
    if !language.is_empty() {
        config.language = language.to_string();
    }
    Ok(())
}

fn set_theme(store: &StateStore, theme: Theme) -> anyhow::Result<Theme> {
    store.set_theme(theme)?;
    Ok(theme)
}

/// Feeds `text` to the controller and waits for the search to settle.
async fn settle(controller: &SuggestionController, text: &str) -> anyhow::Result<SearchPhase> {
    let mut updates = controller.subscribe();
    controller.on_input(text);

    let snapshot = updates
        .wait_for(|s| s.phase.is_settled())
        .await
        .context("Suggestion search stopped unexpectedly")?;
    Ok(snapshot.phase.clone())
}

/// Runs a blocking `inquire` prompt off the async worker threads.
async fn blocking<T, F>(prompt: F) -> anyhow::Result<T>
where
    F: FnOnce() -> InquireResult<T> + Send + 'static,
    T: Send + 'static,
{
    let answer = tokio::task::spawn_blocking(prompt)
        .await
        .context("Prompt task failed")??;
    Ok(answer)
}

/// 1-based lookup used by `open N` / `remove N`.
fn nth<T>(items: Vec<T>, index: usize, what: &str) -> anyhow::Result<T> {
    index
        .checked_sub(1)
        .and_then(|i| items.into_iter().nth(i))
        .with_context(|| format!("No {what} #{index}"))
}

/// Prints a lookup error inline. Only a missing API key ends the command with an error.
fn report(err: WeatherError) -> anyhow::Result<()> {
    if err.is_recoverable() {
        eprintln!("⚠ {err}");
        Ok(())
    } else {
        Err(err.into())
    }
}

fn finish(dash: &Dashboard, result: Result<(), WeatherError>) -> anyhow::Result<()> {
    match result {
        Ok(()) => {
            render::dashboard(dash);
            Ok(())
        }
        Err(err) => report(err),
    }
}
