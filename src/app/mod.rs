use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::Context;

use crate::graph::{GraphModel, GroupTag, RelatedEntry};
use crate::source::GraphSource;

mod graph;
pub mod physics;
pub mod render;
mod ui;

pub use graph::interaction::pick_node;
use physics::{Layout, LayoutPass, SimulationConfig, Viewport};
use render::DrawStats;

pub struct GraphLensApp {
    fetcher: Fetcher,
    view: ViewModel,
}

/// Lifecycle of the graph data behind the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RelatedPanel {
    #[default]
    Empty,
    Loading,
    Entries(Vec<RelatedEntry>),
    Unavailable(String),
}

/// A fetch the host has to perform. Results are handed back with the same
/// generation; older generations are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub groups: BTreeSet<GroupTag>,
}

impl LoadRequest {
    pub fn fetch(&self, source: &dyn GraphSource) -> Result<GraphModel, String> {
        source
            .fetch_visualization(&self.groups)
            .map_err(|error| format!("{error:#}"))
    }
}

/// Related-entity lookup for the node that was just selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedRequest {
    pub generation: u64,
    pub node_id: String,
    pub depth: usize,
    pub limit: usize,
}

impl RelatedRequest {
    pub fn fetch(&self, source: &dyn GraphSource) -> Result<Vec<RelatedEntry>, String> {
        source
            .fetch_related(&self.node_id, self.depth, self.limit)
            .map_err(|error| format!("{error:#}"))
    }
}

/// Work the view hands to the host at the end of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fetch {
    Graph(LoadRequest),
    Related(RelatedRequest),
}

#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub simulation: SimulationConfig,
    pub related_depth: usize,
    pub related_limit: usize,
    pub groups: BTreeSet<GroupTag>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            related_depth: 2,
            related_limit: 25,
            groups: BTreeSet::new(),
        }
    }
}

/// Owns everything the graph view shows: the current snapshot, its layout,
/// the selection and the related-entity panel.
pub struct ViewModel {
    config: ViewConfig,
    phase: Phase,
    generation: u64,
    groups: BTreeSet<GroupTag>,
    model: Option<GraphModel>,
    layout: Option<Layout>,
    pending: Option<LayoutPass>,
    /// Unknown until the graph area has been measured once.
    viewport: Option<Viewport>,
    selected: Option<String>,
    related: RelatedPanel,
    related_generation: u64,
    draw_stats: DrawStats,
}

struct InFlight<T> {
    generation: u64,
    rx: Receiver<Result<T, String>>,
}

impl<T: Send + 'static> InFlight<T> {
    fn spawn(generation: u64, job: impl FnOnce() -> Result<T, String> + Send + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(job());
        });
        Self { generation, rx }
    }
}

/// Takes the result out of `slot` once its worker is done. A worker that went
/// away without answering counts as a failed fetch.
fn take_finished<T>(slot: &mut Option<InFlight<T>>) -> Option<(u64, Result<T, String>)> {
    let in_flight = slot.take()?;
    match in_flight.rx.try_recv() {
        Ok(result) => Some((in_flight.generation, result)),
        Err(TryRecvError::Empty) => {
            *slot = Some(in_flight);
            None
        }
        Err(TryRecvError::Disconnected) => Some((
            in_flight.generation,
            Err("Background worker disconnected".to_owned()),
        )),
    }
}

/// Runs graph and related fetches on worker threads, at most one of each at
/// a time. Starting a fetch abandons the previous one of the same kind.
struct Fetcher {
    source: Arc<dyn GraphSource>,
    graph: Option<InFlight<GraphModel>>,
    related: Option<InFlight<Vec<RelatedEntry>>>,
}

impl Fetcher {
    fn new(source: Arc<dyn GraphSource>) -> Self {
        Self {
            source,
            graph: None,
            related: None,
        }
    }

    fn start(&mut self, fetch: Fetch) {
        let source = Arc::clone(&self.source);
        match fetch {
            Fetch::Graph(request) => {
                tracing::info!(generation = request.generation, groups = ?request.groups, "fetching graph");
                self.graph = Some(InFlight::spawn(request.generation, move || {
                    request.fetch(source.as_ref())
                }));
            }
            Fetch::Related(request) => {
                tracing::debug!(node = %request.node_id, "fetching related entities");
                self.related = Some(InFlight::spawn(request.generation, move || {
                    request.fetch(source.as_ref())
                }));
            }
        }
    }

    fn deliver(&mut self, view: &mut ViewModel) {
        if let Some((generation, result)) = take_finished(&mut self.graph) {
            view.finish_load(generation, result);
        }
        if let Some((generation, result)) = take_finished(&mut self.related) {
            view.finish_related(generation, result);
        }
    }

    fn is_busy(&self) -> bool {
        self.graph.is_some() || self.related.is_some()
    }
}

impl GraphLensApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: Arc<dyn GraphSource>,
        config: ViewConfig,
    ) -> Self {
        let mut view = ViewModel::new(config);
        let mut fetcher = Fetcher::new(source);
        fetcher.start(Fetch::Graph(view.begin_load()));
        Self { fetcher, view }
    }
}

impl eframe::App for GraphLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.fetcher.deliver(&mut self.view);

        for fetch in self.view.show(ctx) {
            self.fetcher.start(fetch);
        }

        if self.fetcher.is_busy() || self.view.layout_in_progress() {
            ctx.request_repaint();
        }
    }
}
