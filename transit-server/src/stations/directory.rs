//! The station directory actor.
//!
//! One task owns the directory state and handles events in arrival order,
//! so no lock guards the state. Queries enqueue their event as soon as they
//! are called and return a future for the reply.
//!
//! Before the station index loads only one nearby request is held; a later
//! request replaces it and the earlier caller receives
//! [`DirectoryError::Superseded`].

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::domain::{Destination, InvalidTransition, Station, StationDetails};
use crate::gtfs::ReferenceStore;

use super::error::DirectoryError;
use super::index::{StationIndex, load_station_index, stations_within};

/// Radius used by [`StationDirectory::find_nearby_stations`].
pub const DEFAULT_RADIUS_KM: f64 = 1.0;

type NearbyReply = oneshot::Sender<Result<Vec<Station>, DirectoryError>>;
type DetailsReply = oneshot::Sender<Result<Arc<StationDetails>, DirectoryError>>;

#[derive(Debug)]
struct NearbyRequest {
    destination: Destination,
    radius_km: f64,
    reply: NearbyReply,
}

#[derive(Debug)]
enum Event {
    StationIndexLoaded { index: Arc<StationIndex> },
    NearbyRequested { request: NearbyRequest },
    DetailsRequested { station: Station, reply: DetailsReply },
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::StationIndexLoaded { .. } => "StationIndexLoaded",
            Event::NearbyRequested { .. } => "NearbyRequested",
            Event::DetailsRequested { .. } => "DetailsRequested",
        }
    }
}

#[derive(Debug)]
enum DirectoryState {
    Loading,
    AwaitingNearbyRequest { request: NearbyRequest },
    Ready { index: Arc<StationIndex> },
}

impl DirectoryState {
    fn name(&self) -> &'static str {
        match self {
            DirectoryState::Loading => "Loading",
            DirectoryState::AwaitingNearbyRequest { .. } => "AwaitingNearbyRequest",
            DirectoryState::Ready { .. } => "Ready",
        }
    }
}

/// Work to do once a transition is committed.
#[derive(Debug)]
enum Effect {
    None,
    AnswerNearby {
        request: NearbyRequest,
        index: Arc<StationIndex>,
    },
    Supersede {
        request: NearbyRequest,
    },
    LookupDetails {
        station: Station,
        reply: DetailsReply,
    },
}

fn transition(
    state: DirectoryState,
    event: Event,
) -> Result<(DirectoryState, Effect), InvalidTransition> {
    use DirectoryState::*;

    match (state, event) {
        (Loading, Event::StationIndexLoaded { index }) => Ok((Ready { index }, Effect::None)),
        (Loading, Event::NearbyRequested { request }) => {
            Ok((AwaitingNearbyRequest { request }, Effect::None))
        }
        (AwaitingNearbyRequest { request }, Event::StationIndexLoaded { index }) => Ok((
            Ready {
                index: index.clone(),
            },
            Effect::AnswerNearby { request, index },
        )),
        (AwaitingNearbyRequest { request: previous }, Event::NearbyRequested { request }) => Ok((
            AwaitingNearbyRequest { request },
            Effect::Supersede { request: previous },
        )),
        (Ready { index }, Event::NearbyRequested { request }) => Ok((
            Ready {
                index: index.clone(),
            },
            Effect::AnswerNearby { request, index },
        )),
        (Ready { index }, Event::DetailsRequested { station, reply }) => {
            Ok((Ready { index }, Effect::LookupDetails { station, reply }))
        }
        (state, event) => Err(InvalidTransition {
            state: state.name(),
            event: event.name(),
        }),
    }
}

fn apply(effect: Effect, store: &ReferenceStore) {
    match effect {
        Effect::None => {}
        Effect::AnswerNearby { request, index } => {
            let stations = stations_within(
                &index,
                request.destination.coordinates,
                request.radius_km,
            );
            debug!(
                destination = %request.destination.name,
                radius_km = request.radius_km,
                found = stations.len(),
                "answering nearby request"
            );
            let _ = request.reply.send(Ok(stations));
        }
        Effect::Supersede { request } => {
            debug!(destination = %request.destination.name, "nearby request superseded");
            let _ = request.reply.send(Err(DirectoryError::Superseded));
        }
        Effect::LookupDetails { station, reply } => {
            let data = store.get();
            tokio::spawn(async move {
                let result = match data.await {
                    Ok(data) => data
                        .station_at(station.coordinates)
                        .cloned()
                        .ok_or(DirectoryError::NotFound { name: station.name }),
                    Err(e) => {
                        debug!(
                            error = %e,
                            station = %station.name,
                            "station details unavailable"
                        );
                        Err(e.into())
                    }
                };
                let _ = reply.send(result);
            });
        }
    }
}

async fn run(mut events: mpsc::UnboundedReceiver<Event>, store: ReferenceStore) {
    let mut state = DirectoryState::Loading;

    while let Some(event) = events.recv().await {
        let (next, effect) = match transition(state, event) {
            Ok(step) => step,
            Err(e) => {
                error!(error = %e, "station directory received an unexpected event");
                panic!("{e}");
            }
        };
        state = next;
        apply(effect, &store);
    }

    debug!("station directory stopped");
}

/// Answers nearby-station and station-detail queries.
///
/// Dropping the directory (or calling [`shutdown`](Self::shutdown)) stops
/// it; unanswered queries resolve to [`DirectoryError::Closed`].
#[derive(Debug)]
pub struct StationDirectory {
    events: mpsc::UnboundedSender<Event>,
    actor: JoinHandle<()>,
    loader: Option<JoinHandle<()>>,
}

impl StationDirectory {
    /// Start a directory whose index is supplied later with
    /// [`publish_index`](Self::publish_index).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(store: ReferenceStore) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        let actor = tokio::spawn(run(rx, store));
        Self {
            events,
            actor,
            loader: None,
        }
    }

    /// Start a directory and load the station table at `table` in the
    /// background.
    pub fn spawn(table: impl Into<PathBuf>, store: ReferenceStore) -> Self {
        let table = table.into();
        Self::spawn_with(move || load_station_index(&table), store)
    }

    /// Start a directory with a custom index loader.
    pub fn spawn_with<F>(load: F, store: ReferenceStore) -> Self
    where
        F: FnOnce() -> StationIndex + Send + 'static,
    {
        let mut directory = Self::new(store);
        let events = directory.events.clone();

        directory.loader = Some(tokio::spawn(async move {
            let index = match tokio::task::spawn_blocking(load).await {
                Ok(index) => index,
                Err(e) => {
                    error!(error = %e, "station table loader did not finish");
                    StationIndex::new()
                }
            };
            let _ = events.send(Event::StationIndexLoaded {
                index: Arc::new(index),
            });
        }));
        directory
    }

    /// Hand the directory its station index.
    ///
    /// The index may be published once; a second index is a protocol
    /// violation that stops the directory.
    pub fn publish_index(&self, index: StationIndex) {
        let _ = self.events.send(Event::StationIndexLoaded {
            index: Arc::new(index),
        });
    }

    /// Stations within [`DEFAULT_RADIUS_KM`] of `destination`.
    pub fn find_nearby_stations(
        &self,
        destination: &Destination,
    ) -> impl Future<Output = Result<Vec<Station>, DirectoryError>> + use<> {
        self.find_nearby_stations_within(destination, DEFAULT_RADIUS_KM)
    }

    /// Stations within `radius_km` of `destination`, in index order.
    ///
    /// The request is queued when this is called, not when the future is
    /// first polled.
    pub fn find_nearby_stations_within(
        &self,
        destination: &Destination,
        radius_km: f64,
    ) -> impl Future<Output = Result<Vec<Station>, DirectoryError>> + use<> {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .events
            .send(Event::NearbyRequested {
                request: NearbyRequest {
                    destination: destination.clone(),
                    radius_km,
                    reply,
                },
            })
            .is_ok();
        receive(sent, rx)
    }

    /// GTFS details for a station returned by a nearby search.
    ///
    /// Waits for the reference data if it is still loading, and resolves to
    /// [`DirectoryError::Unavailable`] if it never loads.
    pub fn find_station_details(
        &self,
        station: &Station,
    ) -> impl Future<Output = Result<Arc<StationDetails>, DirectoryError>> + use<> {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .events
            .send(Event::DetailsRequested {
                station: station.clone(),
                reply,
            })
            .is_ok();
        receive(sent, rx)
    }

    /// Stop the directory and its loader.
    pub fn shutdown(&self) {
        if let Some(loader) = &self.loader {
            loader.abort();
        }
        self.actor.abort();
    }
}

impl Drop for StationDirectory {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn receive<T>(
    sent: bool,
    rx: oneshot::Receiver<Result<T, DirectoryError>>,
) -> Result<T, DirectoryError> {
    if !sent {
        return Err(DirectoryError::Closed);
    }
    rx.await.unwrap_or(Err(DirectoryError::Closed))
}
