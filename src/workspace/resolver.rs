use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::api::WorkspaceDirectory;
use crate::error::{AppError, AppResult};
use crate::session::SessionStore;
use crate::storage::{KeyValueStorage, ACTIVE_WORKSPACE_KEY};
use crate::tprintln;

use super::model::Workspace;

#[derive(Debug, Default)]
struct ResolverState {
    workspaces: Vec<Workspace>,
    active: Option<Workspace>,
    loading: bool,
    /// Ticket of the load that owns the `loading` flag. A superseded load
    /// only clears the flag it set itself.
    load_ticket: u64,
}

/// Owns the workspace list and the active selection for the current
/// identity. The active workspace is always a member of the loaded list;
/// the persisted id is a hint, never a reference the resolver trusts.
pub struct WorkspaceResolver {
    directory: Arc<dyn WorkspaceDirectory>,
    storage: Arc<dyn KeyValueStorage>,
    session: Arc<SessionStore>,
    state: RwLock<ResolverState>,
    /// Monotonic sequence guard. `load()` takes a ticket before fetching and
    /// discards its result if any later `load()` or `set_active()` has moved
    /// the sequence on: completion order wins, not initiation order.
    seq: AtomicU64,
}

impl WorkspaceResolver {
    pub fn new(
        directory: Arc<dyn WorkspaceDirectory>,
        storage: Arc<dyn KeyValueStorage>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            directory,
            storage,
            session,
            state: RwLock::new(ResolverState::default()),
            seq: AtomicU64::new(0),
        }
    }

    /// Fetch the full workspace list for the current identity, replacing any
    /// previous list. Selection after load: a persisted id still present in
    /// the new list is kept; otherwise the first entry is selected and
    /// persisted; an empty list clears both the selection and the persisted
    /// key.
    pub async fn load(&self) -> AppResult<()> {
        // Load is meaningless until session resolution has finished.
        if self.session.is_loading() {
            return Err(AppError::internal(
                "session_not_ready".to_string(),
                "workspace load before session initialization completed".to_string(),
            ));
        }
        if !self.session.is_authenticated() {
            // Valid state, not an error: an anonymous session has no
            // workspaces. Matches the empty-list branch of the policy.
            let mut state = self.state.write();
            state.workspaces.clear();
            state.active = None;
            state.loading = false;
            return Ok(());
        }

        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write();
            state.loading = true;
            state.load_ticket = ticket;
        }

        let fetched = self.directory.list_workspaces().await;

        if self.seq.load(Ordering::SeqCst) != ticket {
            // A newer load() or set_active() superseded this fetch.
            tprintln!("workspace.load discarding stale result (ticket {})", ticket);
            debug!(target: "agendo::workspace", "discarding superseded load, ticket={}", ticket);
            self.finish_loading(ticket);
            return Ok(());
        }

        let list = match fetched {
            Ok(list) => list,
            Err(e) => {
                // Load failure keeps the previous list so callers can tell
                // "load failed" apart from "no workspaces yet".
                self.finish_loading(ticket);
                return Err(e);
            }
        };

        let persisted = match self.storage.get(ACTIVE_WORKSPACE_KEY) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "agendo::workspace", "persisted selection unreadable: {}", e);
                None
            }
        };

        let selected = self.select(&list, persisted);
        let active = match selected {
            Ok(active) => active,
            Err(e) => {
                self.finish_loading(ticket);
                return Err(e);
            }
        };

        info!(
            target: "agendo::workspace",
            "loaded {} workspace(s), active={}",
            list.len(),
            active.as_ref().map(|w| w.id.as_str()).unwrap_or("none")
        );
        let mut state = self.state.write();
        // Re-check under the lock: set_active holds it while bumping the
        // sequence, so a selection that raced the fetch is not clobbered.
        if self.seq.load(Ordering::SeqCst) != ticket {
            if state.load_ticket == ticket {
                state.loading = false;
            }
            return Ok(());
        }
        state.workspaces = list;
        state.active = active;
        state.loading = false;
        Ok(())
    }

    /// Selection policy after a load: keep a persisted id that is still a
    /// member, otherwise take the first entry (persisting it), otherwise
    /// nothing (clearing the persisted key).
    fn select(&self, list: &[Workspace], persisted: Option<String>) -> AppResult<Option<Workspace>> {
        if let Some(w) = persisted.and_then(|id| list.iter().find(|w| w.id == id).cloned()) {
            return Ok(Some(w));
        }
        match list.first().cloned() {
            Some(first) => {
                self.storage.set(ACTIVE_WORKSPACE_KEY, &first.id)?;
                Ok(Some(first))
            }
            None => {
                self.storage.remove(ACTIVE_WORKSPACE_KEY)?;
                Ok(None)
            }
        }
    }

    /// Clear the loading flag, but only for the load that set it.
    fn finish_loading(&self, ticket: u64) {
        let mut state = self.state.write();
        if state.load_ticket == ticket {
            state.loading = false;
        }
    }

    /// Re-invoke `load()` after a mutation that changes membership, e.g.
    /// onboarding creating the first workspace.
    pub async fn refresh(&self) -> AppResult<()> {
        self.load().await
    }

    /// Explicit selection override. The workspace must be a member of the
    /// currently loaded list; an unknown id fails and changes nothing.
    /// `None` clears the selection and the persisted key.
    pub fn set_active(&self, workspace: Option<&Workspace>) -> AppResult<()> {
        let mut state = self.state.write();
        match workspace {
            Some(w) => {
                let member = state.workspaces.iter().find(|m| m.id == w.id).cloned();
                let Some(member) = member else {
                    return Err(AppError::user(
                        "workspace_not_loaded".to_string(),
                        format!("workspace {} is not in the loaded list", w.id),
                    ));
                };
                self.storage.set(ACTIVE_WORKSPACE_KEY, &member.id)?;
                info!(target: "agendo::workspace", "active workspace -> {}", member.id);
                state.active = Some(member);
            }
            None => {
                self.storage.remove(ACTIVE_WORKSPACE_KEY)?;
                info!(target: "agendo::workspace", "active workspace cleared");
                state.active = None;
            }
        }
        // Invalidate any in-flight load so it cannot clobber this selection.
        self.seq.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Drop the in-memory list and selection (logout/teardown path). The
    /// persisted keys are the session store's to clear.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.workspaces.clear();
        state.active = None;
        state.loading = false;
        self.seq.fetch_add(1, Ordering::SeqCst);
    }

    pub fn workspaces(&self) -> Vec<Workspace> {
        self.state.read().workspaces.clone()
    }

    pub fn active(&self) -> Option<Workspace> {
        self.state.read().active.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }
}
