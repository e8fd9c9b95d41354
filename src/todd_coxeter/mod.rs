//! # Todd–Coxeter Engine
//!
//! Coset enumeration over a finitely presented monoid or semigroup: a
//! word graph whose nodes are potential congruence classes is refined by
//! two interleavable inference strategies sharing one coincidence-
//! resolution core.
//!
//! - **HLT** — for each node and each relation, trace both sides,
//!   allocating fresh nodes for missing edges and queueing a coincidence
//!   when the two traces end at distinct nodes. After tracing, every
//!   remaining undefined edge of the node is filled with a fresh node, so
//!   a drained queue means a complete graph.
//! - **Felsch** — every definition is pushed onto a deduction stack;
//!   popping a deduction scans all relation instances through the new
//!   edge (backward over in-edge lists, forward over out-edges) and
//!   either deduces a forced edge or queues a coincidence.
//!
//! A **coincidence** `m ≡ n` is resolved by merging the larger-indexed
//! node into the smaller: in-edges are redirected wholesale through the
//! source lists, out-edges are inducted (conflicts queue further
//! coincidences), and the dead slot is recycled. The queue is drained to
//! fixed point before any further inference. When the queue exceeds the
//! `large_collapse` threshold the drain switches to a bulk mode that
//! skips per-edge source splicing and instead rebuilds the source lists
//! once at the end.
//!
//! **Lookahead** periodically re-scans a prefix of the graph (HLT style)
//! or re-propagates every definition (Felsch style) to surface postponed
//! coincidences. **Standardisation** renumbers the active nodes so a
//! traversal in a chosen word order visits them in ascending order; it
//! is idempotent and invalidates previously returned indices.
//!
//! Every run, whatever the strategy, ends with a full verification scan;
//! the engine only reports `finished` once a complete scan finds no new
//! coincidence.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::CongruenceKind;
use crate::presentation::{self, Presentation, PresentationError};
use crate::runner::{Cardinality, RunState, StopPolicy, Tril, reporting_enabled};
use crate::word::{Letter, Word, WordOrder};
use crate::word_graph::sourced::{MergeEvents, SourcedWordGraph};
use crate::word_graph::{Node, UNDEFINED, WordGraph};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors raised by [`ToddCoxeter`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToddCoxeterError {
    /// Error validating the presentation or an input word.
    #[error("presentation error: {0}")]
    Presentation(#[from] PresentationError),

    /// A query was posed that the engine cannot answer in its current
    /// state.
    #[error("engine not ready: {0}")]
    EngineNotReady(String),

    /// A malformed argument (word graph of the wrong degree, etc.).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// ------------------------------------------------------------------------------------------------
// Configuration
// ------------------------------------------------------------------------------------------------

/// Inference strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Pure HLT relation tracing.
    #[default]
    Hlt,

    /// Pure Felsch deduction propagation.
    Felsch,

    /// Alternate Felsch then HLT phases (`f_defs` / `hlt_defs` at a time).
    Cr,

    /// HLT until the first lookahead, then as [`Strategy::Cr`].
    ROverC,

    /// Alternate HLT then Felsch phases.
    Rc,

    /// One Felsch phase, one HLT phase, then Felsch to the end.
    CrPrime,
}

/// Which pass a lookahead performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookaheadStyle {
    /// Re-trace every relation at scanned nodes.
    #[default]
    Hlt,

    /// Re-propagate every existing definition.
    Felsch,
}

/// How much of the graph a lookahead scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookaheadExtent {
    /// Only nodes in the first half of the index range.
    #[default]
    Partial,

    /// Every active node.
    Full,
}

/// What happens when the Felsch deduction stack exceeds `def_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefPolicy {
    /// Never discard deductions.
    Unlimited,

    /// Drop stack entries whose node has died, then keep stacking.
    Purge,

    /// Clear the whole stack.
    DiscardAllIfNoSpace,

    /// Stop pushing until the stack shrinks.
    #[default]
    NoStackIfNoSpace,
}

/// Which definitions reach the Felsch stack during coincidence
/// processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefVersion {
    /// Fresh definitions and edges inducted onto survivors.
    V1,

    /// As `V1`, plus in-edges redirected during merges.
    #[default]
    V2,
}

/// Configuration for a [`ToddCoxeter`] instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ToddCoxeterConfig {
    /// Inference strategy.
    pub strategy: Strategy,

    /// Style of periodic lookaheads.
    pub lookahead_style: LookaheadStyle,

    /// Extent of periodic lookaheads.
    pub lookahead_extent: LookaheadExtent,

    /// Active-node count that triggers the next lookahead.
    pub lookahead_next: usize,

    /// Floor for the recomputed trigger after a lookahead.
    pub lookahead_min: usize,

    /// Multiplier applied to the trigger when a lookahead kills little.
    pub lookahead_growth_factor: f64,

    /// A lookahead is "unproductive" when it kills fewer than
    /// `scanned / lookahead_growth_threshold` nodes.
    pub lookahead_growth_threshold: usize,

    /// Abort an HLT lookahead interval whose kill ratio drops below this.
    pub lookahead_stop_early_ratio: f64,

    /// In HLT phases, also stack definitions for Felsch processing.
    pub save: bool,

    /// Order applied by automatic standardisation, or `None` to
    /// standardise only on demand (shortlex is then used).
    pub standardization_order: Option<WordOrder>,

    /// Deduction-stack overflow policy.
    pub def_policy: DefPolicy,

    /// Which merge side effects are stacked as deductions.
    pub def_version: DefVersion,

    /// Deduction-stack size limit consulted by `def_policy`.
    pub def_max: usize,

    /// Definitions per HLT phase in mixed strategies.
    pub hlt_defs: usize,

    /// Definitions per Felsch phase in mixed strategies.
    pub f_defs: usize,

    /// Coincidence-queue length beyond which a drain switches to bulk
    /// mode.
    pub large_collapse: usize,

    /// Declared lower bound on the class count: when the graph is
    /// complete with exactly this many active nodes, the run finishes
    /// without the final verification scan.
    pub lower_bound: Option<usize>,
}

impl Default for ToddCoxeterConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            lookahead_style: LookaheadStyle::default(),
            lookahead_extent: LookaheadExtent::default(),
            lookahead_next: 5_000_000,
            lookahead_min: 10_000,
            lookahead_growth_factor: 2.0,
            lookahead_growth_threshold: 4,
            lookahead_stop_early_ratio: 0.01,
            save: false,
            standardization_order: None,
            def_policy: DefPolicy::default(),
            def_version: DefVersion::default(),
            def_max: 2000,
            hlt_defs: 200_000,
            f_defs: 100_000,
            large_collapse: 100_000,
            lower_bound: None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Engine
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Hlt,
    Felsch,
}

/// Snapshot of engine statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToddCoxeterStats {
    /// Total node definitions made.
    pub definitions: u64,

    /// Lookahead passes performed.
    pub lookaheads: u64,

    /// Coincidence drains that entered bulk mode.
    pub large_collapses: u64,
}

/// Todd–Coxeter coset enumeration over a finitely presented structure.
pub struct ToddCoxeter {
    kind: CongruenceKind,
    presentation: Presentation,
    config: ToddCoxeterConfig,
    /// Relations in internal letters (reversed for left congruences);
    /// includes the generating pairs of a two-sided congruence.
    relations: Vec<(Word, Word)>,
    /// Generating pairs of a one-sided congruence, traced at the base
    /// node only.
    root_pairs: Vec<(Word, Word)>,
    pairs_external: Vec<(Word, Word)>,
    /// Occurrences of each letter inside the relations:
    /// `(relation, in_lhs, position)`.
    felsch_index: Vec<Vec<(usize, bool, usize)>>,
    graph: SourcedWordGraph,
    coincidences: VecDeque<(Node, Node)>,
    deductions: Vec<(Node, Letter)>,
    /// Nodes whose relations HLT has not yet traced.
    to_trace: VecDeque<Node>,
    /// Next `(node, letter)` the Felsch filler examines.
    fill_cursor: usize,
    phase: Phase,
    defs_in_phase: usize,
    cr_started: bool,
    crprime_hlt_done: bool,
    lookahead_trigger: usize,
    initialized: bool,
    state: RunState,
    standardized: Option<WordOrder>,
    /// Standardisation spanning tree: `tree[node] = (parent, letter)`.
    tree: Vec<(Node, Letter)>,
    stats: ToddCoxeterStats,
}

struct TcEvents<'a> {
    coincidences: &'a mut VecDeque<(Node, Node)>,
    deductions: Option<&'a mut Vec<(Node, Letter)>>,
    def_version: DefVersion,
    def_policy: DefPolicy,
    def_max: usize,
}

impl TcEvents<'_> {
    fn stack(&mut self, node: Node, letter: Letter) {
        let Some(deductions) = self.deductions.as_deref_mut() else {
            return;
        };
        if deductions.len() >= self.def_max {
            match self.def_policy {
                // Purging needs the liveness table; the owning engine
                // sweeps dead entries at checkpoint boundaries instead.
                DefPolicy::Unlimited | DefPolicy::Purge => {}
                DefPolicy::DiscardAllIfNoSpace => {
                    deductions.clear();
                    return;
                }
                DefPolicy::NoStackIfNoSpace => return,
            }
        }
        deductions.push((node, letter));
    }
}

impl MergeEvents for TcEvents<'_> {
    fn coincide(&mut self, a: Node, b: Node) {
        self.coincidences.push_back((a, b));
    }

    fn copied(&mut self, node: Node, letter: Letter) {
        self.stack(node, letter);
    }

    fn redirected(&mut self, source: Node, letter: Letter) {
        if self.def_version == DefVersion::V2 {
            self.stack(source, letter);
        }
    }
}

impl ToddCoxeter {
    /// A new engine for the congruence of `kind` defined by
    /// `presentation`, with default configuration.
    pub fn new(kind: CongruenceKind, presentation: Presentation) -> Result<Self, ToddCoxeterError> {
        Self::with_config(kind, presentation, ToddCoxeterConfig::default())
    }

    /// A new engine with explicit configuration.
    pub fn with_config(
        kind: CongruenceKind,
        presentation: Presentation,
        config: ToddCoxeterConfig,
    ) -> Result<Self, ToddCoxeterError> {
        presentation.validate()?;
        if config.lookahead_growth_factor < 1.0 {
            return Err(ToddCoxeterError::InvalidArgument(
                "lookahead_growth_factor must be at least 1.0".to_string(),
            ));
        }
        if config.lookahead_growth_threshold == 0 {
            return Err(ToddCoxeterError::InvalidArgument(
                "lookahead_growth_threshold must be positive".to_string(),
            ));
        }
        let alphabet_size = presentation.alphabet_size();
        let relations: Vec<(Word, Word)> = presentation
            .rules()
            .map(|(u, v)| (internal(kind, u), internal(kind, v)))
            .collect();
        let phase = match config.strategy {
            Strategy::Felsch | Strategy::Cr | Strategy::CrPrime => Phase::Felsch,
            Strategy::Hlt | Strategy::ROverC | Strategy::Rc => Phase::Hlt,
        };
        let lookahead_trigger = config.lookahead_next;
        let mut engine = Self {
            kind,
            presentation,
            config,
            relations,
            root_pairs: Vec::new(),
            pairs_external: Vec::new(),
            felsch_index: Vec::new(),
            graph: SourcedWordGraph::new(1, alphabet_size),
            coincidences: VecDeque::new(),
            deductions: Vec::new(),
            to_trace: VecDeque::from([0]),
            fill_cursor: 0,
            phase,
            defs_in_phase: 0,
            cr_started: false,
            crprime_hlt_done: false,
            lookahead_trigger,
            initialized: false,
            state: RunState::NotStarted,
            standardized: None,
            tree: Vec::new(),
            stats: ToddCoxeterStats::default(),
        };
        engine.rebuild_felsch_index();
        Ok(engine)
    }

    /// A new engine that adopts `graph` as its initial state: the nodes
    /// become the initial classes and every one of them is scheduled for
    /// relation tracing.
    pub fn with_word_graph(
        kind: CongruenceKind,
        presentation: Presentation,
        graph: &WordGraph,
    ) -> Result<Self, ToddCoxeterError> {
        if graph.out_degree() != presentation.alphabet_size() {
            return Err(ToddCoxeterError::InvalidArgument(format!(
                "word graph out-degree {} does not match alphabet size {}",
                graph.out_degree(),
                presentation.alphabet_size()
            )));
        }
        if graph.number_of_nodes() > 0
            && graph.nodes_reachable_from(0).len() != graph.number_of_nodes()
        {
            return Err(ToddCoxeterError::InvalidArgument(
                "every node of an adopted word graph must be reachable from node 0".to_string(),
            ));
        }
        let mut engine = Self::new(kind, presentation)?;
        let nodes = graph.number_of_nodes().max(1);
        engine.graph = SourcedWordGraph::new(nodes, graph.out_degree());
        for node in 0..nodes as Node {
            for letter in 0..graph.out_degree() as u8 {
                if let Some(t) = graph.target(node, letter) {
                    engine.graph.set_target(node, letter, t);
                }
            }
        }
        engine.to_trace = (0..nodes as Node).collect();
        Ok(engine)
    }

    /// The congruence kind.
    pub fn kind(&self) -> CongruenceKind {
        self.kind
    }

    /// The presentation this engine was seeded from.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// The generating pairs added so far.
    pub fn generating_pairs(&self) -> &[(Word, Word)] {
        &self.pairs_external
    }

    /// Engine statistics.
    pub fn stats(&self) -> ToddCoxeterStats {
        self.stats
    }

    /// The number of active nodes (potential classes) right now.
    pub fn number_of_nodes_active(&self) -> usize {
        self.graph.number_of_nodes_active()
    }

    /// Snapshot of the current word graph.
    pub fn word_graph(&self) -> WordGraph {
        self.graph.to_word_graph()
    }

    /// Declares `u = v` in the congruence.
    ///
    /// Legal at any time before completion: pairs added mid-run append to
    /// the relation set and every node is re-scheduled for tracing at the
    /// next checkpoint.
    pub fn add_generating_pair(&mut self, u: &[Letter], v: &[Letter]) -> Result<(), ToddCoxeterError> {
        if self.finished() {
            return Err(ToddCoxeterError::EngineNotReady(
                "generating pairs cannot be added after completion".to_string(),
            ));
        }
        self.presentation.validate_word(u)?;
        self.presentation.validate_word(v)?;
        self.pairs_external.push((u.to_vec(), v.to_vec()));
        let iu = internal(self.kind, u);
        let iv = internal(self.kind, v);
        if self.kind == CongruenceKind::TwoSided {
            self.relations.push((iu, iv));
            self.rebuild_felsch_index();
            // Already-traced nodes must see the new relation.
            self.to_trace = self.graph.active_nodes().collect();
            self.refresh_deductions();
        } else {
            self.root_pairs.push((iu.clone(), iv.clone()));
            if self.initialized {
                self.trace_root_pair(&iu, &iv);
                self.process_coincidences();
            }
        }
        self.standardized = None;
        Ok(())
    }

    fn rebuild_felsch_index(&mut self) {
        let n = self.presentation.alphabet_size();
        self.felsch_index = vec![Vec::new(); n];
        for (r, (u, v)) in self.relations.iter().enumerate() {
            for (pos, &a) in u.iter().enumerate() {
                self.felsch_index[usize::from(a)].push((r, true, pos));
            }
            for (pos, &a) in v.iter().enumerate() {
                self.felsch_index[usize::from(a)].push((r, false, pos));
            }
        }
    }

    // --------------------------------------------------------------------------------------------
    // Running
    // --------------------------------------------------------------------------------------------

    /// Whether the enumeration has finished.
    pub fn finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Runs until finished. Never returns on congruences with infinitely
    /// many classes; bound those with [`ToddCoxeter::run_for`].
    pub fn run(&mut self) {
        self.run_with_policy(StopPolicy::none(), |_| false);
    }

    /// Runs until `duration` elapses (polled at checkpoint boundaries).
    pub fn run_for(&mut self, duration: Duration) {
        self.run_with_policy(StopPolicy::timeout(duration), |_| false);
    }

    /// Runs until `predicate` fires at a checkpoint boundary.
    pub fn run_until<P>(&mut self, predicate: P)
    where
        P: FnMut(&Self) -> bool,
    {
        self.run_with_policy(StopPolicy::none(), predicate);
    }

    fn run_with_policy<P>(&mut self, policy: StopPolicy, mut predicate: P)
    where
        P: FnMut(&Self) -> bool,
    {
        if self.finished() {
            return;
        }
        self.state = RunState::Running;
        let mut checkpoints = 0u64;
        loop {
            if self.step() {
                self.state = RunState::Finished;
                self.finish_standardization();
                info!(
                    classes = self.graph.number_of_nodes_active(),
                    definitions = self.stats.definitions,
                    "Todd-Coxeter enumeration finished"
                );
                return;
            }
            checkpoints += 1;
            if reporting_enabled() && checkpoints % 8192 == 0 {
                info!(
                    active = self.graph.number_of_nodes_active(),
                    total = self.graph.number_of_nodes(),
                    definitions = self.stats.definitions,
                    "Todd-Coxeter progress"
                );
            }
            if policy.should_stop() || predicate(self) {
                self.state = RunState::Stopped;
                return;
            }
        }
    }

    /// One checkpoint of work. Returns true when enumeration is complete
    /// and verified.
    fn step(&mut self) -> bool {
        if !self.initialized {
            self.init_run();
        }
        self.maybe_switch_phase();
        let exhausted = match self.phase {
            Phase::Hlt => {
                self.hlt_step();
                self.to_trace.is_empty()
            }
            Phase::Felsch => !self.felsch_step(),
        };
        if self.graph.number_of_nodes_active() >= self.lookahead_trigger {
            self.perform_lookahead(self.config.lookahead_style, self.config.lookahead_extent);
        }
        if exhausted {
            if self.try_finish() {
                return true;
            }
            // Verification collapsed something; re-schedule tracing so
            // the next checkpoints make progress.
            self.to_trace = self.graph.active_nodes().collect();
        }
        false
    }

    fn init_run(&mut self) {
        self.initialized = true;
        let pairs = self.root_pairs.clone();
        for (u, v) in &pairs {
            self.trace_root_pair(u, v);
            self.process_coincidences();
        }
    }

    fn trace_root_pair(&mut self, u: &[Letter], v: &[Letter]) {
        let x = self.define_path(0, u);
        let y = self.define_path(0, v);
        if x != y {
            self.coincidences.push_back((x, y));
        }
    }

    /// Phase scheduling for the mixed strategies.
    fn maybe_switch_phase(&mut self) {
        let (hlt_cap, f_cap) = (self.config.hlt_defs, self.config.f_defs);
        let switch = |defs: usize, cap: usize| defs >= cap.max(1);
        match self.config.strategy {
            Strategy::Hlt | Strategy::Felsch => {}
            Strategy::Cr | Strategy::Rc => {
                let cap = match self.phase {
                    Phase::Hlt => hlt_cap,
                    Phase::Felsch => f_cap,
                };
                if switch(self.defs_in_phase, cap) {
                    self.toggle_phase();
                }
            }
            Strategy::ROverC => {
                if !self.cr_started {
                    if self.stats.lookaheads > 0 {
                        self.cr_started = true;
                        self.set_phase(Phase::Felsch);
                    }
                } else {
                    let cap = match self.phase {
                        Phase::Hlt => hlt_cap,
                        Phase::Felsch => f_cap,
                    };
                    if switch(self.defs_in_phase, cap) {
                        self.toggle_phase();
                    }
                }
            }
            Strategy::CrPrime => {
                if !self.crprime_hlt_done {
                    match self.phase {
                        Phase::Felsch if switch(self.defs_in_phase, f_cap) => {
                            self.set_phase(Phase::Hlt);
                        }
                        Phase::Hlt if switch(self.defs_in_phase, hlt_cap) => {
                            self.crprime_hlt_done = true;
                            self.set_phase(Phase::Felsch);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn toggle_phase(&mut self) {
        let next = match self.phase {
            Phase::Hlt => Phase::Felsch,
            Phase::Felsch => Phase::Hlt,
        };
        self.set_phase(next);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        debug!(?phase, "switching inference phase");
        self.phase = phase;
        self.defs_in_phase = 0;
        if phase == Phase::Felsch {
            // Edges defined by the HLT phase were never stacked; refresh
            // so deduction processing sees the whole graph.
            self.refresh_deductions();
        }
    }

    fn refresh_deductions(&mut self) {
        self.deductions.clear();
        let nodes: Vec<Node> = self.graph.active_nodes().collect();
        for node in nodes {
            for letter in 0..self.graph.out_degree() as u8 {
                if self.graph.target(node, letter) != UNDEFINED {
                    self.deductions.push((node, letter));
                }
            }
        }
    }

    fn stacking(&self) -> bool {
        self.phase == Phase::Felsch || self.config.save
    }

    /// Checkpoint-boundary sweep for [`DefPolicy::Purge`]: drop stacked
    /// deductions whose node has died.
    fn purge_deductions(&mut self) {
        if self.config.def_policy == DefPolicy::Purge
            && self.deductions.len() >= self.config.def_max
        {
            let graph = &self.graph;
            self.deductions.retain(|&(n, _)| graph.is_active(n));
        }
    }

    // --------------------------------------------------------------------------------------------
    // HLT
    // --------------------------------------------------------------------------------------------

    /// Traces all relations at one node, then fills its remaining
    /// undefined edges.
    fn hlt_step(&mut self) {
        let node = loop {
            match self.to_trace.pop_front() {
                Some(n) if self.graph.is_active(n) => break n,
                Some(_) => continue,
                None => return,
            }
        };
        for r in 0..self.relations.len() {
            if !self.graph.is_active(node) {
                return;
            }
            let (u, v) = self.relations[r].clone();
            self.hlt_push_relation(node, &u, &v);
            self.process_coincidences();
        }
        if self.graph.is_active(node) {
            for letter in 0..self.graph.out_degree() as u8 {
                if self.graph.target(node, letter) == UNDEFINED {
                    let fresh = self.new_node();
                    self.define_edge(node, letter, fresh);
                }
            }
        }
        if self.stacking() {
            self.purge_deductions();
            self.process_deductions();
        }
    }

    /// Sims-style scan and fill of one relation at one node.
    fn hlt_push_relation(&mut self, node: Node, u: &[Letter], v: &[Letter]) {
        match (u.split_last(), v.split_last()) {
            (None, None) => {}
            (Some((last, init)), None) => {
                let x = self.define_path(node, init);
                self.resolve_last(x, *last, node);
            }
            (None, Some((last, init))) => {
                let y = self.define_path(node, init);
                self.resolve_last(y, *last, node);
            }
            (Some((u_last, u_init)), Some((v_last, v_init))) => {
                let x = self.define_path(node, u_init);
                let y = self.define_path(node, v_init);
                let tx = self.graph.target(x, *u_last);
                let ty = self.graph.target(y, *v_last);
                match (tx, ty) {
                    (UNDEFINED, UNDEFINED) => {
                        let fresh = self.new_node();
                        self.define_edge(x, *u_last, fresh);
                        // x may equal y with the same letter; re-read.
                        if self.graph.target(y, *v_last) == UNDEFINED {
                            self.define_edge(y, *v_last, fresh);
                        } else if self.graph.target(y, *v_last) != fresh {
                            self.coincidences
                                .push_back((self.graph.target(y, *v_last), fresh));
                        }
                    }
                    (UNDEFINED, t) => self.define_edge(x, *u_last, t),
                    (t, UNDEFINED) => self.define_edge(y, *v_last, t),
                    (tx, ty) => {
                        if tx != ty {
                            self.coincidences.push_back((tx, ty));
                        }
                    }
                }
            }
        }
    }

    /// Forces `target(x, letter) == expected`.
    fn resolve_last(&mut self, x: Node, letter: Letter, expected: Node) {
        let t = self.graph.target(x, letter);
        if t == UNDEFINED {
            self.define_edge(x, letter, expected);
        } else if t != expected {
            self.coincidences.push_back((t, expected));
        }
    }

    /// Follows `word` from `node`, allocating fresh nodes for missing
    /// edges.
    fn define_path(&mut self, node: Node, word: &[Letter]) -> Node {
        let mut current = node;
        for &letter in word {
            let next = self.graph.target(current, letter);
            current = if next == UNDEFINED {
                let fresh = self.new_node();
                self.define_edge(current, letter, fresh);
                fresh
            } else {
                next
            };
        }
        current
    }

    fn new_node(&mut self) -> Node {
        debug_assert!(self.coincidences.is_empty(), "definition during a drain");
        let node = self.graph.new_node();
        self.to_trace.push_back(node);
        self.stats.definitions += 1;
        self.defs_in_phase += 1;
        node
    }

    /// Defines an edge and stacks it when a Felsch pass will run.
    fn define_edge(&mut self, node: Node, letter: Letter, target: Node) {
        self.graph.set_target(node, letter, target);
        if self.stacking() {
            let mut events = TcEvents {
                coincidences: &mut self.coincidences,
                deductions: Some(&mut self.deductions),
                def_version: self.config.def_version,
                def_policy: self.config.def_policy,
                def_max: self.config.def_max,
            };
            events.stack(node, letter);
        }
    }

    // --------------------------------------------------------------------------------------------
    // Felsch
    // --------------------------------------------------------------------------------------------

    /// Processes the deduction stack to fixed point, then makes one
    /// definition at the first undefined edge. Returns false once neither
    /// is possible (the graph is complete and propagated).
    fn felsch_step(&mut self) -> bool {
        self.purge_deductions();
        let had_deductions = !self.deductions.is_empty();
        self.process_deductions();
        if let Some((node, letter)) = self.next_undefined_edge() {
            let fresh = self.new_node();
            self.define_edge(node, letter, fresh);
            self.process_deductions();
            true
        } else {
            had_deductions
        }
    }

    fn process_deductions(&mut self) {
        while let Some((node, letter)) = self.deductions.pop() {
            if !self.graph.is_active(node) || self.graph.target(node, letter) == UNDEFINED {
                continue;
            }
            let instances = self.felsch_index[usize::from(letter)].clone();
            for (r, in_lhs, pos) in instances {
                if !self.graph.is_active(node) {
                    break;
                }
                self.push_definition(node, r, in_lhs, pos);
                self.process_coincidences();
            }
        }
    }

    /// Examines every instance of relation `r` whose `pos`-th letter (of
    /// the side selected by `in_lhs`) crosses the edge at `node`.
    fn push_definition(&mut self, node: Node, r: usize, in_lhs: bool, pos: usize) {
        let (u, v) = {
            let (lhs, rhs) = &self.relations[r];
            if in_lhs {
                (lhs.clone(), rhs.clone())
            } else {
                (rhs.clone(), lhs.clone())
            }
        };
        // All nodes s with s --u[..pos]--> node, via backward tracing.
        let mut starts = vec![node];
        for &letter in u[..pos].iter().rev() {
            let mut previous = Vec::new();
            for &n in &starts {
                let mut s = self.graph.first_source_of(n, letter);
                while s != UNDEFINED {
                    previous.push(s);
                    s = self.graph.next_source_of(s, letter);
                }
            }
            if previous.is_empty() {
                return;
            }
            starts = previous;
        }
        for s in starts {
            let s = self.graph.find(s);
            if !self.graph.is_active(s) {
                continue;
            }
            self.scan_relation_instance(s, &u, &v);
            self.process_coincidences();
        }
    }

    /// Scans `u` and `v` from `s` without definitions; deduces the last
    /// edge of a side that is one edge short, queues a coincidence when
    /// both complete and disagree.
    fn scan_relation_instance(&mut self, s: Node, u: &[Letter], v: &[Letter]) {
        let walk = |graph: &SourcedWordGraph, from: Node, word: &[Letter]| {
            // Ok(end) on completion, Err(Some((y, c))) when exactly the
            // last edge is missing, Err(None) otherwise.
            let mut current = from;
            for (i, &letter) in word.iter().enumerate() {
                let next = graph.target(current, letter);
                if next == UNDEFINED {
                    return if i + 1 == word.len() {
                        Err(Some((current, letter)))
                    } else {
                        Err(None)
                    };
                }
                current = next;
            }
            Ok(current)
        };
        match (walk(&self.graph, s, u), walk(&self.graph, s, v)) {
            (Ok(x), Ok(y)) => {
                if x != y {
                    self.coincidences.push_back((x, y));
                }
            }
            (Ok(x), Err(Some((y, c)))) => self.define_edge(y, c, x),
            (Err(Some((y, c))), Ok(x)) => self.define_edge(y, c, x),
            _ => {}
        }
    }

    /// First undefined `(node, letter)` in index order, starting at the
    /// persistent cursor and wrapping once.
    fn next_undefined_edge(&mut self) -> Option<(Node, Letter)> {
        let degree = self.graph.out_degree();
        if degree == 0 {
            return None;
        }
        let total = self.graph.number_of_nodes() * degree;
        for offset in 0..total {
            let position = (self.fill_cursor + offset) % total;
            let node = (position / degree) as Node;
            let letter = (position % degree) as Letter;
            if self.graph.is_active(node) && self.graph.target(node, letter) == UNDEFINED {
                self.fill_cursor = position;
                return Some((node, letter));
            }
        }
        None
    }

    // --------------------------------------------------------------------------------------------
    // Coincidences
    // --------------------------------------------------------------------------------------------

    /// Drains the coincidence queue to fixed point, switching to bulk
    /// mode beyond the large-collapse threshold.
    fn process_coincidences(&mut self) {
        if self.coincidences.is_empty() {
            return;
        }
        let stacking = self.stacking();
        let mut bulk = false;
        while let Some((a, b)) = self.coincidences.pop_front() {
            let a = self.graph.find(a);
            let b = self.graph.find(b);
            if a == b {
                continue;
            }
            let (min, max) = (a.min(b), a.max(b));
            if !bulk && self.coincidences.len() > self.config.large_collapse {
                bulk = true;
                self.stats.large_collapses += 1;
                trace!(
                    queued = self.coincidences.len(),
                    "switching to bulk collapse mode"
                );
            }
            let mut events = TcEvents {
                coincidences: &mut self.coincidences,
                deductions: if stacking {
                    Some(&mut self.deductions)
                } else {
                    None
                },
                def_version: self.config.def_version,
                def_policy: self.config.def_policy,
                def_max: self.config.def_max,
            };
            if bulk {
                self.graph.merge_nodes_raw(min, max, &mut events);
            } else {
                self.graph.merge_nodes(min, max, &mut events);
            }
        }
        if bulk {
            self.graph.rebuild_sources();
        }
        self.standardized = None;
    }

    // --------------------------------------------------------------------------------------------
    // Lookahead
    // --------------------------------------------------------------------------------------------

    /// One lookahead pass; detects postponed coincidences in bulk.
    pub fn perform_lookahead(&mut self, style: LookaheadStyle, extent: LookaheadExtent) {
        self.stats.lookaheads += 1;
        let before = self.graph.number_of_nodes_active();
        match style {
            LookaheadStyle::Hlt => self.hlt_lookahead(extent),
            LookaheadStyle::Felsch => {
                self.refresh_deductions();
                self.process_deductions();
            }
        }
        let after = self.graph.number_of_nodes_active();
        let killed = before - after;
        debug!(before, after, killed, "lookahead complete");

        // Recompute the trigger; grow it faster when unproductive.
        let mut next = (after as f64 * self.config.lookahead_growth_factor) as usize;
        if killed < before / self.config.lookahead_growth_threshold {
            next = next.max(
                (self.lookahead_trigger as f64 * self.config.lookahead_growth_factor) as usize,
            );
        }
        self.lookahead_trigger = next.max(self.config.lookahead_min).max(after + 1);
    }

    fn hlt_lookahead(&mut self, extent: LookaheadExtent) {
        let limit = match extent {
            LookaheadExtent::Full => self.graph.number_of_nodes(),
            LookaheadExtent::Partial => self.graph.number_of_nodes().div_ceil(2),
        };
        let interval = 10_000usize;
        let mut scanned_in_interval = 0usize;
        let mut active_at_interval = self.graph.number_of_nodes_active();
        for node in 0..limit as Node {
            if !self.graph.is_active(node) {
                continue;
            }
            for r in 0..self.relations.len() {
                if !self.graph.is_active(node) {
                    break;
                }
                let (u, v) = self.relations[r].clone();
                let x = self.graph.follow_path(node, &u);
                let y = self.graph.follow_path(node, &v);
                if x != UNDEFINED && y != UNDEFINED && x != y {
                    self.coincidences.push_back((x, y));
                    self.process_coincidences();
                }
            }
            scanned_in_interval += 1;
            if scanned_in_interval >= interval {
                let active = self.graph.number_of_nodes_active();
                let killed = active_at_interval - active;
                if (killed as f64) < self.config.lookahead_stop_early_ratio * interval as f64 {
                    trace!(killed, "lookahead stopped early");
                    break;
                }
                scanned_in_interval = 0;
                active_at_interval = active;
            }
        }
    }

    // --------------------------------------------------------------------------------------------
    // Finishing
    // --------------------------------------------------------------------------------------------

    /// Verifies completeness and compatibility; enumeration is finished
    /// only when a full scan is clean.
    fn try_finish(&mut self) -> bool {
        if let Some(bound) = self.config.lower_bound
            && self.graph.number_of_nodes_active() == bound
            && self.graph_complete()
        {
            return true;
        }
        if !self.graph_complete() {
            return false;
        }
        loop {
            let before = self.graph.number_of_nodes_active();
            let mut dirty = false;
            let nodes: Vec<Node> = self.graph.active_nodes().collect();
            for node in nodes {
                if !self.graph.is_active(node) {
                    continue;
                }
                for r in 0..self.relations.len() {
                    let (u, v) = self.relations[r].clone();
                    let x = self.graph.follow_path(node, &u);
                    let y = self.graph.follow_path(node, &v);
                    if x != y {
                        dirty = true;
                        self.coincidences.push_back((x, y));
                        self.process_coincidences();
                    }
                    if !self.graph.is_active(node) {
                        break;
                    }
                }
            }
            if !dirty {
                return true;
            }
            debug!(
                before,
                after = self.graph.number_of_nodes_active(),
                "verification pass found coincidences"
            );
            if !self.graph_complete() {
                // A merge can only keep rows complete, but work may
                // remain in HLT queues after a collapse.
                return false;
            }
        }
    }

    fn graph_complete(&mut self) -> bool {
        let nodes: Vec<Node> = self.graph.active_nodes().collect();
        nodes.iter().all(|&n| {
            (0..self.graph.out_degree() as u8).all(|a| self.graph.target(n, a) != UNDEFINED)
        })
    }

    fn finish_standardization(&mut self) {
        if let Some(order) = self.config.standardization_order {
            self.standardize(order);
        }
    }

    // --------------------------------------------------------------------------------------------
    // Standardisation
    // --------------------------------------------------------------------------------------------

    /// Whether the node numbering currently realises `order`.
    pub fn is_standardized_as(&self, order: WordOrder) -> bool {
        self.standardized == Some(order)
    }

    /// Whether any standardisation order is currently in force.
    pub fn is_standardized(&self) -> bool {
        self.standardized.is_some()
    }

    /// Renumbers the active nodes so a traversal in `order` visits them
    /// in ascending index, compacting dead slots away. Idempotent;
    /// invalidates previously returned node indices. Returns whether the
    /// numbering changed.
    pub fn standardize(&mut self, order: WordOrder) -> bool {
        if self.standardized == Some(order) {
            return false;
        }
        let (traversal, tree) = self.traverse(order);
        debug_assert_eq!(traversal.len(), self.graph.number_of_nodes_active());

        let mut old_to_new = vec![UNDEFINED; self.graph.number_of_nodes()];
        for (new, &old) in traversal.iter().enumerate() {
            old_to_new[old as usize] = new as Node;
        }
        let degree = self.graph.out_degree();
        let mut fresh = SourcedWordGraph::new(traversal.len(), degree);
        for (new, &old) in traversal.iter().enumerate() {
            for letter in 0..degree as u8 {
                let t = self.graph.target(old, letter);
                if t != UNDEFINED {
                    fresh.set_target(new as Node, letter, old_to_new[t as usize]);
                }
            }
        }
        self.graph = fresh;
        self.tree = tree;
        self.to_trace = self
            .to_trace
            .iter()
            .filter_map(|&n| match old_to_new[n as usize] {
                UNDEFINED => None,
                n => Some(n),
            })
            .collect();
        self.deductions = self
            .deductions
            .iter()
            .filter_map(|&(n, a)| match old_to_new[n as usize] {
                UNDEFINED => None,
                n => Some((n, a)),
            })
            .collect();
        self.fill_cursor = 0;
        self.standardized = Some(order);
        true
    }

    /// Discovery order and spanning tree of the active nodes under
    /// `order`.
    fn traverse(&mut self, order: WordOrder) -> (Vec<Node>, Vec<(Node, Letter)>) {
        let degree = self.graph.out_degree();
        let mut seen = vec![false; self.graph.number_of_nodes()];
        let mut traversal = Vec::new();
        let mut tree = Vec::new();
        seen[0] = true;
        match order {
            WordOrder::Shortlex => {
                let mut queue = VecDeque::from([0 as Node]);
                traversal.push(0);
                tree.push((UNDEFINED, 0));
                while let Some(node) = queue.pop_front() {
                    for letter in 0..degree as u8 {
                        let t = self.graph.target(node, letter);
                        if t != UNDEFINED && !seen[t as usize] {
                            seen[t as usize] = true;
                            traversal.push(t);
                            tree.push((node, letter));
                            queue.push_back(t);
                        }
                    }
                }
            }
            WordOrder::Lex | WordOrder::Recursive => {
                // Pre-order DFS; lex ascends through letters, the
                // recursive path order descends.
                let mut stack: Vec<(Node, usize)> = vec![(0, 0)];
                traversal.push(0);
                tree.push((UNDEFINED, 0));
                while let Some(top) = stack.len().checked_sub(1) {
                    let (node, cursor) = stack[top];
                    if cursor >= degree {
                        stack.pop();
                        continue;
                    }
                    stack[top].1 += 1;
                    let letter = match order {
                        WordOrder::Lex => cursor as u8,
                        _ => (degree - 1 - cursor) as u8,
                    };
                    let t = self.graph.target(node, letter);
                    if t != UNDEFINED && !seen[t as usize] {
                        seen[t as usize] = true;
                        traversal.push(t);
                        tree.push((node, letter));
                        stack.push((t, 0));
                    }
                }
            }
        }
        // Remap the spanning tree parents into new indices.
        let mut old_to_new = vec![UNDEFINED; self.graph.number_of_nodes()];
        for (new, &old) in traversal.iter().enumerate() {
            old_to_new[old as usize] = new as Node;
        }
        let tree = traversal
            .iter()
            .zip(tree)
            .map(|(_, (parent, letter))| {
                if parent == UNDEFINED {
                    (UNDEFINED, letter)
                } else {
                    (old_to_new[parent as usize], letter)
                }
            })
            .collect();
        (traversal, tree)
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    fn class_offset(&self) -> u32 {
        if self.presentation.contains_empty_word() {
            0
        } else {
            1
        }
    }

    /// The number of congruence classes: obvious-infinity detection
    /// first, then a full run.
    pub fn number_of_classes(&mut self) -> Cardinality {
        if presentation::obviously_infinite(&self.presentation, &self.pairs_external) {
            return Cardinality::Infinite;
        }
        self.run();
        Cardinality::Finite(
            (self.graph.number_of_nodes_active() as u64) - u64::from(self.class_offset()),
        )
    }

    /// The class index of `word` (runs and standardises first).
    pub fn index_of(&mut self, word: &[Letter]) -> Result<usize, ToddCoxeterError> {
        self.presentation.validate_word(word)?;
        self.run();
        self.ensure_standardized();
        let internal = internal(self.kind, word);
        let node = self.graph.follow_path(0, &internal);
        debug_assert_ne!(node, UNDEFINED, "complete graph cannot lose a path");
        let offset = self.class_offset();
        debug_assert!(node >= offset, "empty-word class has no external index");
        Ok((node - offset) as usize)
    }

    /// The least word (in the standardisation order) reaching class
    /// `index`.
    pub fn word_of(&mut self, index: usize) -> Result<Word, ToddCoxeterError> {
        self.run();
        self.ensure_standardized();
        let node = index as u32 + self.class_offset();
        if node as usize >= self.graph.number_of_nodes_active() {
            return Err(ToddCoxeterError::InvalidArgument(format!(
                "class index {index} out of range"
            )));
        }
        let mut letters = Vec::new();
        let mut current = node;
        while self.tree[current as usize].0 != UNDEFINED {
            let (parent, letter) = self.tree[current as usize];
            letters.push(letter);
            current = parent;
        }
        letters.reverse();
        Ok(external(self.kind, &letters))
    }

    fn ensure_standardized(&mut self) {
        if self.standardized.is_none() {
            let order = self.config.standardization_order.unwrap_or_default();
            self.standardize(order);
        }
    }

    /// Whether `u` and `v` are congruent (runs to completion).
    pub fn contains(&mut self, u: &[Letter], v: &[Letter]) -> Result<bool, ToddCoxeterError> {
        Ok(self.index_of(u)? == self.index_of(v)?)
    }

    /// Tri-valued congruence test against the current graph; never runs.
    pub fn currently_contains(&self, u: &[Letter], v: &[Letter]) -> Result<Tril, ToddCoxeterError> {
        self.presentation.validate_word(u)?;
        self.presentation.validate_word(v)?;
        if u == v {
            return Ok(Tril::True);
        }
        let iu = internal(self.kind, u);
        let iv = internal(self.kind, v);
        // follow_path does not canonicalise, so only trust it between
        // drains (public checkpoints), where targets are canonical.
        let x = self.graph.follow_path(0, &iu);
        let y = self.graph.follow_path(0, &iv);
        if x != UNDEFINED && x == y {
            Ok(Tril::True)
        } else if self.finished() && x != UNDEFINED && y != UNDEFINED {
            Ok(Tril::False)
        } else {
            Ok(Tril::Unknown)
        }
    }

    /// The normal forms of all classes, in standardisation order.
    pub fn normal_forms(&mut self) -> Result<Vec<Word>, ToddCoxeterError> {
        self.run();
        self.ensure_standardized();
        let count =
            self.graph.number_of_nodes_active() - self.class_offset() as usize;
        (0..count).map(|i| self.word_of(i)).collect()
    }

    /// Groups `words` into their classes and returns the classes with
    /// more than one member.
    pub fn non_trivial_classes(
        &mut self,
        words: impl IntoIterator<Item = Word>,
    ) -> Result<Vec<Vec<Word>>, ToddCoxeterError> {
        let mut by_class: std::collections::BTreeMap<usize, Vec<Word>> =
            std::collections::BTreeMap::new();
        for word in words {
            let index = self.index_of(&word)?;
            by_class.entry(index).or_default().push(word);
        }
        Ok(by_class
            .into_values()
            .filter(|class| class.len() > 1)
            .collect())
    }
}

impl fmt::Display for ToddCoxeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} ToddCoxeter over {} with {} generating pairs, {} active nodes>",
            self.kind,
            self.presentation,
            self.pairs_external.len(),
            self.graph.number_of_nodes_active()
        )
    }
}

/// Internal form of a word: reversed for left congruences.
fn internal(kind: CongruenceKind, word: &[Letter]) -> Word {
    match kind {
        CongruenceKind::Left => word.iter().rev().copied().collect(),
        _ => word.to_vec(),
    }
}

/// External form of an internal word.
fn external(kind: CongruenceKind, word: &[Letter]) -> Word {
    internal(kind, word)
}
