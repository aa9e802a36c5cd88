use anyhow::Context;
use log::{info, warn};
use radarcore::{ControlCommand, RadarSnapshot};
use serde_json::json;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use warp::{http::StatusCode, Filter, Rejection, Reply};

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

type SharedSnapshot = Arc<RwLock<RadarSnapshot>>;
type CommandQueue = Arc<Mutex<VecDeque<ControlCommand>>>;

/// Hands frames to an out-of-process renderer over HTTP and queues the
/// operator commands it sends back.
///
/// `GET /snapshot` serves the latest published frame. `POST /control` takes a
/// [`ControlCommand`] that the runner applies before its next tick.
#[derive(Clone, Default)]
pub struct RenderBridge {
    state: SharedSnapshot,
    commands: CommandQueue,
}

impl RenderBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: RadarSnapshot) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot;
    }

    #[cfg(test)]
    pub fn latest(&self) -> RadarSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(test)]
    pub fn push_command(&self, command: ControlCommand) {
        enqueue(&self.commands, command);
    }

    pub fn drain_commands(&self) -> Vec<ControlCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let commands = self.commands.clone();
        let command_filter = warp::any().map(move || commands.clone());

        let snapshot_route = warp::path("snapshot")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter)
            .map(|state: SharedSnapshot| {
                let guard = state.read().unwrap_or_else(PoisonError::into_inner);
                warp::reply::json(&*guard)
            });

        let control_route = warp::path("control")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(command_filter)
            .map(|command: ControlCommand, commands: CommandQueue| {
                let queued = enqueue(&commands, command);
                warp::reply::with_status(
                    warp::reply::json(&json!({"status": "queued", "pending": queued})),
                    StatusCode::ACCEPTED,
                )
            });

        snapshot_route.or(control_route)
    }

    /// Binds the HTTP endpoint on the current runtime and returns the bound
    /// address.
    pub fn serve(&self, addr: SocketAddr) -> anyhow::Result<SocketAddr> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_ephemeral(addr)
            .with_context(|| format!("binding render bridge on {}", addr))?;
        tokio::spawn(server);
        info!("render bridge listening on http://{}", bound);
        Ok(bound)
    }
}

fn enqueue(commands: &CommandQueue, command: ControlCommand) -> usize {
    let mut queue = commands.lock().unwrap_or_else(PoisonError::into_inner);
    if queue.len() >= MAX_PENDING {
        if let Some(dropped) = queue.pop_front() {
            warn!("control queue full, dropping {:?}", dropped);
        }
    }
    queue.push_back(command);
    queue.len()
}

const MAX_PENDING: usize = 64;
