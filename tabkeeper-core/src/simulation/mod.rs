//! Seeded random exercise of the tab model
//!
//! A [`Simulator`] drives a [`TabModelSelector`] through a weighted random
//! sequence of operations and checks the ordering invariants after every
//! step. The same seed always produces the same operation log, so a failing
//! run can be replayed from the seed it reports.

use std::collections::HashSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::{OperationWeights, SimulationSettings};
use crate::error::TabError;
use crate::model::{
    ClosureParams, LiveTabCreator, TabCollection, TabCreationRequest, TabCreator,
    TabModelSelector,
};
use crate::tab::{Tab, TabGroupColor, TabId, TabIdAllocator, TabLaunchType, TabSelectionType};
use crate::tracing::span_names;

/// Errors raised by a simulation run
#[derive(Debug, Error)]
pub enum SimulationError {
    /// An invariant did not hold after a step
    #[error("invariant violated at step {step} ({op}) with seed {seed}: {detail}")]
    InvariantViolated {
        /// Seed of the run
        seed: u64,
        /// Zero-based step index
        step: usize,
        /// Operation of the failing step
        op: SimOp,
        /// What did not hold
        detail: String,
    },

    /// Every operation weight is zero or the weights are otherwise unusable
    #[error("invalid operation weights: {0}")]
    InvalidWeights(String),

    /// The selector rejected an operation
    #[error(transparent)]
    Model(#[from] TabError),
}

/// Simulated operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SimOp {
    AddTab,
    CloseTab,
    CancelClosure,
    CommitClosures,
    MoveTab,
    MoveRelatedTabs,
    SetIndex,
    PinTab,
    UnpinTab,
    MergeTabs,
    UngroupTabs,
    UngroupGroup,
    GroupVisuals,
    SelectModel,
    CloseAll,
}

impl SimOp {
    const ALL: [Self; 15] = [
        Self::AddTab,
        Self::CloseTab,
        Self::CancelClosure,
        Self::CommitClosures,
        Self::MoveTab,
        Self::MoveRelatedTabs,
        Self::SetIndex,
        Self::PinTab,
        Self::UnpinTab,
        Self::MergeTabs,
        Self::UngroupTabs,
        Self::UngroupGroup,
        Self::GroupVisuals,
        Self::SelectModel,
        Self::CloseAll,
    ];

    const fn weight(self, weights: &OperationWeights) -> u32 {
        match self {
            Self::AddTab => weights.add_tab,
            Self::CloseTab => weights.close_tab,
            Self::CancelClosure => weights.cancel_closure,
            Self::CommitClosures => weights.commit_closures,
            Self::MoveTab => weights.move_tab,
            Self::MoveRelatedTabs => weights.move_related_tabs,
            Self::SetIndex => weights.set_index,
            Self::PinTab => weights.pin_tab,
            Self::UnpinTab => weights.unpin_tab,
            Self::MergeTabs => weights.merge_tabs,
            Self::UngroupTabs => weights.ungroup_tabs,
            Self::UngroupGroup => weights.ungroup_group,
            Self::GroupVisuals => weights.group_visuals,
            Self::SelectModel => weights.select_model,
            Self::CloseAll => weights.close_all,
        }
    }

    /// Short name used in the operation log
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddTab => "add_tab",
            Self::CloseTab => "close_tab",
            Self::CancelClosure => "cancel_closure",
            Self::CommitClosures => "commit_closures",
            Self::MoveTab => "move_tab",
            Self::MoveRelatedTabs => "move_related_tabs",
            Self::SetIndex => "set_index",
            Self::PinTab => "pin_tab",
            Self::UnpinTab => "unpin_tab",
            Self::MergeTabs => "merge_tabs",
            Self::UngroupTabs => "ungroup_tabs",
            Self::UngroupGroup => "ungroup_group",
            Self::GroupVisuals => "group_visuals",
            Self::SelectModel => "select_model",
            Self::CloseAll => "close_all",
        }
    }
}

impl std::fmt::Display for SimOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Seed; a random one is drawn when `None`
    pub seed: Option<u64>,
    /// Number of steps
    pub steps: usize,
    /// Relative operation weights
    pub weights: OperationWeights,
}

impl SimulationConfig {
    /// A run of `steps` steps with default weights
    #[must_use]
    pub fn new(seed: Option<u64>, steps: usize) -> Self {
        Self {
            seed,
            steps,
            weights: OperationWeights::default(),
        }
    }

    /// A run using the configured step count and weights
    #[must_use]
    pub fn from_settings(settings: &SimulationSettings, seed: Option<u64>) -> Self {
        Self {
            seed,
            steps: settings.default_steps,
            weights: settings.weights.clone(),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// Seed of the run
    pub seed: u64,
    /// Steps executed
    pub steps: usize,
    /// One line per step
    pub log: Vec<String>,
    /// Live regular tabs at the end
    pub regular_tabs: usize,
    /// Live incognito tabs at the end
    pub incognito_tabs: usize,
    /// Tabs pending closure at the end
    pub pending_closures: usize,
    /// Groups at the end
    pub groups: usize,
}

/// Drives a selector with seeded random operations
#[derive(Debug)]
pub struct Simulator {
    seed: u64,
    steps: usize,
    step: usize,
    rng: StdRng,
    ops: WeightedIndex<u32>,
    selector: TabModelSelector,
    allocator: TabIdAllocator,
    creator: LiveTabCreator,
    log: Vec<String>,
}

impl Simulator {
    /// Prepares a run.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidWeights` if every weight is zero.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let weights = SimOp::ALL.map(|op| op.weight(&config.weights));
        let ops =
            WeightedIndex::new(weights).map_err(|e| SimulationError::InvalidWeights(e.to_string()))?;
        let allocator = TabIdAllocator::new();
        tracing::info!(seed, steps = config.steps, "Starting tab model simulation");
        Ok(Self {
            seed,
            steps: config.steps,
            step: 0,
            rng: StdRng::seed_from_u64(seed),
            ops,
            selector: TabModelSelector::new(allocator.clone()),
            allocator,
            creator: LiveTabCreator,
            log: Vec::with_capacity(config.steps),
        })
    }

    /// Seed of this run
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The selector being driven
    #[must_use]
    pub const fn selector(&self) -> &TabModelSelector {
        &self.selector
    }

    /// Log lines so far
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Runs one step and checks the invariants; returns the log line.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvariantViolated` if an invariant does not
    /// hold afterwards.
    pub fn step(&mut self) -> Result<&str, SimulationError> {
        let op = SimOp::ALL[self.ops.sample(&mut self.rng)];
        let outcome = self.apply(op)?;
        let line = format!("{}: {op} {outcome}", self.step);
        tracing::trace!(step = self.step, %op, %outcome, "Simulation step");

        if let Err(detail) = check_selector_invariants(&self.selector) {
            tracing::error!(seed = self.seed, step = self.step, %op, %detail, "Invariant violated");
            return Err(SimulationError::InvariantViolated {
                seed: self.seed,
                step: self.step,
                op,
                detail,
            });
        }
        self.step += 1;
        self.log.push(line);
        Ok(self.log.last().map_or("", String::as_str))
    }

    /// Runs all remaining steps
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation.
    pub fn run(mut self) -> Result<SimulationReport, SimulationError> {
        let _span = tracing::info_span!(span_names::SIMULATION_RUN, seed = self.seed).entered();
        while self.step < self.steps {
            self.step()?;
        }
        let regular = self.selector.model(false)?;
        let incognito = self.selector.model(true)?;
        let report = SimulationReport {
            seed: self.seed,
            steps: self.step,
            regular_tabs: regular.count(),
            incognito_tabs: incognito.count(),
            pending_closures: regular.pending_closure_count() + incognito.pending_closure_count(),
            groups: regular.group_count() + incognito.group_count(),
            log: self.log,
        };
        tracing::info!(
            seed = report.seed,
            steps = report.steps,
            tabs = report.regular_tabs + report.incognito_tabs,
            "Simulation finished"
        );
        Ok(report)
    }

    fn pick(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    fn pick_live_tab(&mut self, count: usize) -> Result<Option<TabId>, TabError> {
        let Some(index) = self.pick(count) else {
            return Ok(None);
        };
        Ok(self.selector.current_model()?.tab_at(index).map(Tab::id))
    }

    fn apply(&mut self, op: SimOp) -> Result<String, SimulationError> {
        let count = self.selector.current_model()?.count();
        let outcome = match op {
            SimOp::AddTab => {
                let site = self.rng.gen_range(0..1000);
                let launch = [
                    TabLaunchType::FromLink,
                    TabLaunchType::FromBrowserUi,
                    TabLaunchType::FromExternalApp,
                    TabLaunchType::FromLongPressBackground,
                ][self.rng.gen_range(0..4)];
                let mut request =
                    TabCreationRequest::new(format!("https://site{site}.test/"), launch);
                if self.rng.gen_bool(0.5) {
                    request = request.at_index(self.rng.gen_range(0..=count));
                }
                let model = self.selector.current_model_mut()?;
                match self.creator.create_new_tab(request, model, &self.allocator) {
                    Some(id) => format!("tab {id} ({launch:?})"),
                    None => "rejected".to_string(),
                }
            }
            SimOp::CloseTab => {
                let allow_undo = self.rng.gen_bool(0.7);
                let target = self.pick_live_tab(count)?;
                match target {
                    Some(id) => {
                        let closed = self
                            .selector
                            .current_model_mut()?
                            .close_tabs(ClosureParams::tab(id, allow_undo));
                        format!("tab {id} undo={allow_undo} closed={closed}")
                    }
                    None => "noop".to_string(),
                }
            }
            SimOp::CancelClosure => {
                let pending: Vec<TabId> = {
                    let model = self.selector.current_model()?;
                    model
                        .comprehensive_tabs()
                        .map(Tab::id)
                        .filter(|id| model.is_pending_closure(*id))
                        .collect()
                };
                if pending.is_empty() {
                    "noop".to_string()
                } else {
                    let target = if self.rng.gen_bool(0.2) {
                        TabId::INVALID
                    } else {
                        pending[self.rng.gen_range(0..pending.len())]
                    };
                    let restored = self.selector.current_model_mut()?.cancel_tab_closure(target);
                    format!("tab {target} restored={restored}")
                }
            }
            SimOp::CommitClosures => {
                let model = self.selector.current_model_mut()?;
                let pending = model.pending_closure_count();
                model.commit_all_tab_closures();
                format!("committed={pending}")
            }
            SimOp::MoveTab | SimOp::MoveRelatedTabs => {
                let target = self.pick_live_tab(count)?;
                let new_index = self.rng.gen_range(0..=count);
                match target {
                    Some(id) => {
                        let model = self.selector.current_model_mut()?;
                        let moved = if op == SimOp::MoveTab {
                            model.move_tab(id, new_index)
                        } else {
                            model.move_related_tabs(id, new_index)
                        };
                        format!("tab {id} to {new_index} moved={moved}")
                    }
                    None => "noop".to_string(),
                }
            }
            SimOp::SetIndex => match self.pick(count) {
                Some(index) => {
                    let selected = self
                        .selector
                        .current_model_mut()?
                        .set_index(index, TabSelectionType::FromUser);
                    format!("index {index} selected={selected}")
                }
                None => "noop".to_string(),
            },
            SimOp::PinTab | SimOp::UnpinTab => {
                let pin = op == SimOp::PinTab;
                let candidates: Vec<TabId> = self
                    .selector
                    .current_model()?
                    .tabs()
                    .filter(|tab| tab.is_pinned() != pin)
                    .map(Tab::id)
                    .collect();
                match self.pick(candidates.len()).map(|i| candidates[i]) {
                    Some(id) => {
                        let model = self.selector.current_model_mut()?;
                        let changed = if pin {
                            model.pin_tab(id)
                        } else {
                            model.unpin_tab(id)
                        };
                        format!("tab {id} changed={changed}")
                    }
                    None => "noop".to_string(),
                }
            }
            SimOp::MergeTabs => {
                let source = self.pick_live_tab(count)?;
                let dest = self.pick_live_tab(count)?;
                match (source, dest) {
                    (Some(source), Some(dest)) => {
                        let merged = self
                            .selector
                            .current_model_mut()?
                            .merge_tabs_to_group(source, dest)
                            .is_some();
                        format!("tab {source} into {dest} merged={merged}")
                    }
                    _ => "noop".to_string(),
                }
            }
            SimOp::UngroupTabs => {
                let groups = self.selector.current_model()?.group_ids();
                match self.pick(groups.len()) {
                    Some(ordinal) => {
                        let members = self.selector.current_model()?.tabs_in_group(groups[ordinal]);
                        let take = self.rng.gen_range(0..=members.len());
                        let removed = self
                            .selector
                            .current_model_mut()?
                            .ungroup_tabs(&members[..take], false);
                        format!("group #{ordinal} removed={removed}")
                    }
                    None => "noop".to_string(),
                }
            }
            SimOp::UngroupGroup => {
                let groups = self.selector.current_model()?.group_ids();
                match self.pick(groups.len()) {
                    Some(ordinal) => {
                        let dissolved = self
                            .selector
                            .current_model_mut()?
                            .ungroup_tab_group(groups[ordinal], false);
                        format!("group #{ordinal} dissolved={dissolved}")
                    }
                    None => "noop".to_string(),
                }
            }
            SimOp::GroupVisuals => {
                let groups = self.selector.current_model()?.group_ids();
                match self.pick(groups.len()) {
                    Some(ordinal) => {
                        let group_id = groups[ordinal];
                        let slot = self.rng.gen_range(0..TabGroupColor::PALETTE.len());
                        let color = TabGroupColor::from_palette_index(slot);
                        let collapsed = self.rng.gen_bool(0.3);
                        let model = self.selector.current_model_mut()?;
                        model.try_set_tab_group_title(group_id, format!("Group {ordinal}"))?;
                        model.try_set_tab_group_color(group_id, color)?;
                        model.try_set_tab_group_collapsed(group_id, collapsed)?;
                        format!("group #{ordinal} {color} collapsed={collapsed}")
                    }
                    None => "noop".to_string(),
                }
            }
            SimOp::SelectModel => {
                let incognito = !self.selector.is_incognito_selected();
                self.selector.select_model(incognito);
                format!("incognito={incognito}")
            }
            SimOp::CloseAll => {
                let allow_undo = self.rng.gen_bool(0.5);
                let closed = self.selector.close_all_tabs(allow_undo);
                format!("undo={allow_undo} closed={closed}")
            }
        };
        Ok(outcome)
    }
}

/// Runs a complete simulation
///
/// # Errors
///
/// Returns the first invariant violation or a weights error.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationReport, SimulationError> {
    Simulator::new(config)?.run()
}

/// Checks the ordering, selection and group invariants of one collection.
///
/// # Errors
///
/// Returns a description of the first invariant that does not hold.
pub fn check_collection_invariants(model: &TabCollection) -> Result<(), String> {
    let entries: Vec<_> = model.comprehensive_tabs().collect();

    match model.selected_tab_id() {
        Some(id) if model.is_pending_closure(id) => {
            return Err(format!("selected tab {id} is pending closure"));
        }
        Some(id) if !model.contains(id) => return Err(format!("selected tab {id} is missing")),
        None if model.count() > 0 => {
            return Err(format!("{} live tabs but no selection", model.count()));
        }
        _ => {}
    }

    if let Some(pos) = entries
        .windows(2)
        .position(|pair| !pair[0].is_pinned() && pair[1].is_pinned())
    {
        return Err(format!("pinned tab {} after unpinned tab", entries[pos + 1].id()));
    }

    let mut seen = HashSet::new();
    let mut closed_groups = HashSet::new();
    let mut current = None;
    for tab in &entries {
        if !seen.insert(tab.id()) {
            return Err(format!("duplicate tab {}", tab.id()));
        }
        if tab.is_pinned() && tab.group_id().is_some() {
            return Err(format!("pinned tab {} is grouped", tab.id()));
        }
        if tab.group_id() != current {
            if let Some(previous) = current {
                closed_groups.insert(previous);
            }
            if let Some(group_id) = tab.group_id() {
                if closed_groups.contains(&group_id) {
                    return Err(format!("group of tab {} is not contiguous", tab.id()));
                }
                if !model.has_group(group_id) {
                    return Err(format!("group of tab {} is not registered", tab.id()));
                }
            }
            current = tab.group_id();
        }
    }

    let used = model.group_ids().len();
    if used != model.group_count() {
        return Err(format!(
            "{} registered groups but {used} in use",
            model.group_count()
        ));
    }
    Ok(())
}

/// Checks both collections of a selector and that tab ids are unique across
/// them.
///
/// # Errors
///
/// Returns a description of the first invariant that does not hold.
pub fn check_selector_invariants(selector: &TabModelSelector) -> Result<(), String> {
    let regular = selector.model(false).map_err(|e| e.to_string())?;
    let incognito = selector.model(true).map_err(|e| e.to_string())?;
    check_collection_invariants(regular).map_err(|e| format!("regular: {e}"))?;
    check_collection_invariants(incognito).map_err(|e| format!("incognito: {e}"))?;
    if let Some(tab) = incognito.comprehensive_tabs().find(|tab| regular.contains(tab.id())) {
        return Err(format!("tab {} is in both collections", tab.id()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_log() {
        let config = SimulationConfig::new(Some(42), 300);
        let first = run_simulation(&config).expect("run");
        let second = run_simulation(&config).expect("run");
        assert_eq!(first, second);
        assert_eq!(first.log.len(), 300);
        assert!(first.log[0].starts_with("0: "));
    }

    #[test]
    fn zero_weights_are_rejected() {
        let mut config = SimulationConfig::new(Some(1), 10);
        config.weights = OperationWeights {
            add_tab: 0,
            close_tab: 0,
            cancel_closure: 0,
            commit_closures: 0,
            move_tab: 0,
            move_related_tabs: 0,
            set_index: 0,
            pin_tab: 0,
            unpin_tab: 0,
            merge_tabs: 0,
            ungroup_tabs: 0,
            ungroup_group: 0,
            group_visuals: 0,
            select_model: 0,
            close_all: 0,
        };
        assert!(matches!(
            Simulator::new(&config),
            Err(SimulationError::InvalidWeights(_))
        ));
    }

    #[test]
    fn only_adds_grow_the_collection() {
        let mut config = SimulationConfig::new(Some(7), 25);
        config.weights = OperationWeights {
            add_tab: 1,
            close_tab: 0,
            cancel_closure: 0,
            commit_closures: 0,
            move_tab: 0,
            move_related_tabs: 0,
            set_index: 0,
            pin_tab: 0,
            unpin_tab: 0,
            merge_tabs: 0,
            ungroup_tabs: 0,
            ungroup_group: 0,
            group_visuals: 0,
            select_model: 0,
            close_all: 0,
        };
        let report = run_simulation(&config).expect("run");
        assert_eq!(report.regular_tabs, 25);
        assert_eq!(report.groups, 0);
    }

    #[test]
    fn invariants_hold_on_empty_selector() {
        let selector = TabModelSelector::new(TabIdAllocator::new());
        assert!(check_selector_invariants(&selector).is_ok());
    }
}
