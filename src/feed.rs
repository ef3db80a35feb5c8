use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::fixtures::{FixtureSource, load_roster, load_schedule, load_seasons, load_standings};
use crate::merge::merge_with_store;
use crate::name_key::NameKeyResolver;
use crate::profile_store::ProfileStore;
use crate::state::{Delta, Selection, SeasonCommand, SeasonView, SelectionGate};
use crate::stats::{recent_form, team_record};

/// Standings, schedule and merged roster for one selection, fetched concurrently.
/// Each part falls back to empty on its own.
pub fn load_season_view(
    fixtures: &dyn FixtureSource,
    store: &dyn ProfileStore,
    selection: &Selection,
) -> SeasonView {
    let competition = selection.competition.as_str();
    let season = selection.season.as_str();

    let (standings, (games, roster)) = rayon::join(
        || load_standings(fixtures, competition, season),
        || {
            rayon::join(
                || load_schedule(fixtures, competition, season),
                || {
                    let entries = load_roster(fixtures, season);
                    merge_with_store(&entries, store, &NameKeyResolver)
                },
            )
        },
    );

    SeasonView {
        selection: selection.clone(),
        record: team_record(&games),
        form: recent_form(&games),
        standings,
        games,
        roster: roster.members,
        roster_degraded: roster.degraded,
    }
}

/// Serves season commands on a background thread. Each load runs on its own worker so a
/// slow request never blocks a newer one; loads already superseded when they start are skipped.
pub fn spawn_season_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<SeasonCommand>,
    fixtures: Arc<dyn FixtureSource>,
    store: Arc<dyn ProfileStore>,
    gate: Arc<SelectionGate>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            match cmd {
                SeasonCommand::LoadCatalogue => {
                    let catalogue = load_seasons(fixtures.as_ref());
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Loaded {} seasons",
                        catalogue.seasons.len()
                    )));
                    let _ = tx.send(Delta::SetCatalogue(catalogue));
                }
                SeasonCommand::LoadSeason { token, selection } => {
                    let tx = tx.clone();
                    let fixtures = Arc::clone(&fixtures);
                    let store = Arc::clone(&store);
                    let gate = Arc::clone(&gate);
                    thread::spawn(move || {
                        if !gate.is_current(token) {
                            debug!(season = %selection.season, "season load superseded before start");
                            return;
                        }
                        let view = load_season_view(fixtures.as_ref(), store.as_ref(), &selection);
                        info!(
                            competition = %selection.competition,
                            season = %selection.season,
                            games = view.games.len(),
                            roster = view.roster.len(),
                            "season view loaded"
                        );
                        let _ = tx.send(Delta::SeasonLoaded {
                            token,
                            view: Box::new(view),
                        });
                    });
                }
                SeasonCommand::Shutdown => break,
            }
        }
    })
}
