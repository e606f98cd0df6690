use crate::collab::{AuthProvider, DocumentStore, LocationSensor};
use crate::error::{AppError, Notice};
use crate::flows::location;
use crate::flows::{commit, ConfirmFlow, Consequence, LocationState, Mutation};
use crate::navigation::{screens, HeaderAction, Navigator, RegionId, RouteParams};
use crate::session::Session;
use leptos::prelude::*;
use log::{error, info, warn};
use std::sync::Arc;

/// Collaborators the orchestration layer talks to.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DocumentStore>,
    pub sensor: Arc<dyn LocationSensor>,
}

#[derive(Clone)]
pub struct AppState {
    pub services: Services,

    /// Written only by the session observer.
    pub session: ReadSignal<Session>,

    pub navigator: RwSignal<Navigator>,
    pub confirm: RwSignal<ConfirmFlow>,
    pub location: RwSignal<LocationState>,

    /// Last user-visible failure. Cleared when the user dismisses it.
    pub notice: RwSignal<Option<Notice>>,

    /// Stack entry whose picker params were already applied.
    picker_entry: RwSignal<Option<u64>>,

    /// EditProfile visit (entry origin) the location state belongs to.
    location_owner: RwSignal<Option<u64>>,

    /// Stack entry that activated the pending delete.
    mutation_entry: RwSignal<Option<u64>>,
}

impl AppState {
    pub fn new(services: Services, session: ReadSignal<Session>) -> Self {
        let active = session.with_untracked(Session::is_active);
        Self {
            services,
            session,
            navigator: RwSignal::new(Navigator::new(active)),
            confirm: RwSignal::new(ConfirmFlow::default()),
            location: RwSignal::new(LocationState::default()),
            notice: RwSignal::new(None),
            picker_entry: RwSignal::new(None),
            location_owner: RwSignal::new(None),
            mutation_entry: RwSignal::new(None),
        }
    }

    /// Re-selects the navigation tree from the current session.
    pub fn sync_navigation(&self) {
        let active = self.session.with_untracked(Session::is_active);
        let rebuilt = self
            .navigator
            .try_update(|nav| nav.sync_session(active))
            .unwrap_or(false);
        if rebuilt {
            // A fresh tree means a fresh location manager.
            self.location.set(LocationState::default());
            self.confirm.set(ConfirmFlow::default());
            self.picker_entry.set(None);
            self.location_owner.set(None);
            self.mutation_entry.set(None);
        }
    }

    fn report(&self, err: &AppError) {
        self.notice.set(Some(err.notice()));
    }

    pub fn navigate(&self, name: &str, params: Option<RouteParams>) {
        let result = self
            .navigator
            .try_update(|nav| nav.navigate(name, params))
            .unwrap_or(Ok(()));
        if let Err(err) = result {
            warn!("event=navigate module=state status=error error={err}");
            self.report(&AppError::Navigation(err));
        }
    }

    pub fn go_back(&self) {
        self.navigator.update(|nav| {
            nav.go_back();
        });
    }

    pub fn focus_tab(&self, region: RegionId) {
        let result = self
            .navigator
            .try_update(|nav| nav.focus_tab(region))
            .unwrap_or(Ok(()));
        if let Err(err) = result {
            self.report(&AppError::Navigation(err));
        }
    }

    /// Actions for the focused screen, resolved fresh on every call.
    pub fn header_actions(&self) -> Vec<HeaderAction> {
        self.navigator.with(Navigator::header_actions)
    }

    pub fn dispatch(&self, action: HeaderAction) {
        match &action {
            HeaderAction::Add { target } => self.navigate(target, None),
            HeaderAction::Logout | HeaderAction::Delete { .. } => {
                if let Some(mutation) = Mutation::from_action(&action) {
                    let accepted = self
                        .confirm
                        .try_update(|flow| flow.activate(mutation))
                        .unwrap_or(false);
                    if !accepted {
                        info!("event=dispatch module=state status=ignored reason=flow_busy");
                        return;
                    }
                    let entry = self.navigator.with_untracked(Navigator::focused).key;
                    self.mutation_entry.set(Some(entry));
                }
            }
        }
    }

    pub fn dismiss_confirmation(&self) {
        self.confirm.update(|flow| {
            flow.dismiss();
        });
        self.mutation_entry.set(None);
    }

    /// Commits the pending mutation. Navigation consequences are applied only
    /// after the mutation call has resolved successfully.
    pub async fn confirm_pending(&self) {
        let Some(mutation) = self.confirm.try_update(|flow| flow.confirm()).flatten() else {
            return;
        };

        let result = commit(
            &mutation,
            self.services.auth.as_ref(),
            self.services.store.as_ref(),
        )
        .await;

        // Cleared if the tree was rebuilt while the call was in flight.
        let entry = self.mutation_entry.try_update(Option::take).flatten();
        match result {
            Ok(Consequence::PopScreen) => {
                let popped = entry
                    .and_then(|key| self.navigator.try_update(|nav| nav.pop_entry(key)))
                    .unwrap_or(false);
                if !popped {
                    info!("event=delete_pop module=state status=skipped reason=entry_gone");
                }
            }
            Ok(Consequence::AwaitSession) => {}
            Err(err) => self.report(&err),
        }
        self.confirm.update(ConfirmFlow::settle);
    }

    fn user_id(&self) -> Option<String> {
        self.session
            .with_untracked(|s| s.user_id().map(str::to_string))
    }

    /// Binds the location state to the focused EditProfile visit. A fresh
    /// visit starts from Unset; the same visit (tab switch, picker return)
    /// keeps its value.
    fn claim_location(&self) {
        let ctx = self.navigator.with_untracked(Navigator::focused);
        if ctx.screen != screens::EDIT_PROFILE
            || self.location_owner.get_untracked() == Some(ctx.origin)
        {
            return;
        }
        self.location_owner.set(Some(ctx.origin));
        self.location.set(LocationState::default());
    }

    /// Fills the location manager from the signed-in user's record.
    pub async fn load_persisted_location(&self) {
        self.claim_location();
        let Some(uid) = self.user_id() else {
            return;
        };
        match location::load_persisted(self.services.store.as_ref(), &uid).await {
            Ok(Some(coordinates)) => {
                self.location.update(|state| {
                    state.apply_persisted(coordinates);
                });
            }
            Ok(None) => {}
            Err(err) => {
                let err = AppError::LoadProfile(err);
                error!("event=location_load module=state status=error error={err}");
                self.report(&err);
            }
        }
    }

    /// Applies a picker selection carried by the focused screen's params,
    /// once per stack entry.
    pub fn apply_focused_route_params(&self) -> bool {
        let ctx = self.navigator.with_untracked(Navigator::focused);
        if ctx.screen != screens::EDIT_PROFILE
            || self.picker_entry.get_untracked() == Some(ctx.key)
        {
            return false;
        }
        self.claim_location();
        self.picker_entry.set(Some(ctx.key));
        self.location
            .try_update(|state| state.apply_picker_result(ctx.params.as_ref()))
            .unwrap_or(false)
    }

    pub async fn acquire_location(&self) {
        self.claim_location();
        match location::acquire_from_sensor(self.services.sensor.as_ref()).await {
            Ok(coordinates) => self.location.update(|state| state.apply_sensed(coordinates)),
            Err(err) => {
                warn!("event=location_acquire module=state status=error error={err}");
                self.report(&err);
            }
        }
    }

    pub fn open_map_picker(&self) {
        self.navigate(screens::MAP, None);
    }

    /// Persists the current location. No-op while nothing is set.
    pub async fn save_location(&self) {
        self.claim_location();
        let Some(coordinates) = self.location.with_untracked(LocationState::current) else {
            return;
        };
        let Some(uid) = self.user_id() else {
            self.report(&AppError::NoSession);
            return;
        };

        match location::persist(self.services.store.as_ref(), &uid, coordinates).await {
            Ok(()) => {
                info!("event=location_save module=state status=ok");
                self.navigate(RegionId::Home.as_ref(), None);
            }
            Err(err) => {
                let err = AppError::SaveLocation(err);
                error!("event=location_save module=state status=error error={err}");
                self.report(&err);
            }
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
