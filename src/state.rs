use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{
    FormLetter, MergedMember, SeasonGameRecord, SeasonsConfig, StandingRow, TeamRecord,
};

const MAX_LOGS: usize = 200;

/// Identifies one selection request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Mints request tokens and remembers the newest one.
#[derive(Debug, Default)]
pub struct SelectionGate {
    latest: AtomicU64,
}

impl SelectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub competition: String,
    pub season: String,
}

/// Everything the team page shows for one competition and season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonView {
    pub selection: Selection,
    pub standings: Vec<StandingRow>,
    pub games: Vec<SeasonGameRecord>,
    pub roster: Vec<MergedMember>,
    pub record: TeamRecord,
    pub form: Vec<FormLetter>,
    pub roster_degraded: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeasonCommand {
    LoadCatalogue,
    LoadSeason {
        token: RequestToken,
        selection: Selection,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    SetCatalogue(SeasonsConfig),
    SeasonLoaded {
        token: RequestToken,
        view: Box<SeasonView>,
    },
    Log(String),
}

pub struct ClubState {
    pub catalogue: SeasonsConfig,
    pub selection: Option<Selection>,
    pub view: Option<SeasonView>,
    pub loading: bool,
    pub logs: VecDeque<String>,
    gate: Arc<SelectionGate>,
    pending: Option<RequestToken>,
}

impl Default for ClubState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClubState {
    pub fn new() -> Self {
        Self::with_gate(Arc::new(SelectionGate::new()))
    }

    pub fn with_gate(gate: Arc<SelectionGate>) -> Self {
        Self {
            catalogue: SeasonsConfig::default(),
            selection: None,
            view: None,
            loading: false,
            logs: VecDeque::new(),
            gate,
            pending: None,
        }
    }

    pub fn gate(&self) -> Arc<SelectionGate> {
        Arc::clone(&self.gate)
    }

    /// Records a new selection and returns the command that loads it. Any result still in
    /// flight for an earlier selection will be discarded on arrival.
    pub fn select(&mut self, competition: &str, season: &str) -> SeasonCommand {
        let selection = Selection {
            competition: competition.to_string(),
            season: season.to_string(),
        };
        let token = self.gate.issue();
        self.pending = Some(token);
        self.selection = Some(selection.clone());
        self.loading = true;
        SeasonCommand::LoadSeason { token, selection }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut ClubState, delta: Delta) {
    match delta {
        Delta::SetCatalogue(catalogue) => {
            state.catalogue = catalogue;
        }
        Delta::SeasonLoaded { token, view } => {
            if state.pending != Some(token) || !state.gate.is_current(token) {
                state.push_log(format!(
                    "[INFO] Dropped stale {} {} result",
                    view.selection.competition, view.selection.season
                ));
                return;
            }
            if let Some(reason) = view.roster_degraded.as_ref() {
                state.push_log(format!("[WARN] Roster shown without profiles: {reason}"));
            }
            state.pending = None;
            state.loading = false;
            state.view = Some(*view);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
