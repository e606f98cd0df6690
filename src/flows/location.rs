//! Location reconciliation.
//!
//! Three sources compete for the current location: the persisted user record,
//! a live sensor reading, and a map-picker selection arriving through route
//! params. The last write wins, except that a persisted read only fills an
//! unset value so a slow load cannot clobber a fresher reading.

use crate::collab::{DocumentStore, LocationSensor};
use crate::error::{AppError, StoreError};
use crate::models::{Coordinates, Document, USERS_COLLECTION};
use crate::navigation::RouteParams;
use log::{info, warn};

pub const LOCATION_FIELD: &str = "location";
pub const SELECTED_LOCATION_PARAM: &str = "selectedLocation";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    Persisted,
    Sensed,
    Picked,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationState {
    current: Option<(Coordinates, Provenance)>,
}

impl LocationState {
    pub fn current(&self) -> Option<Coordinates> {
        self.current.map(|(c, _)| c)
    }

    pub fn provenance(&self) -> Option<Provenance> {
        self.current.map(|(_, p)| p)
    }

    pub fn can_save(&self) -> bool {
        self.current.is_some()
    }

    pub fn apply_persisted(&mut self, coordinates: Coordinates) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some((coordinates, Provenance::Persisted));
        true
    }

    pub fn apply_sensed(&mut self, coordinates: Coordinates) {
        self.current = Some((coordinates, Provenance::Sensed));
    }

    /// Overwrites the current value when `params` carry a picker selection.
    pub fn apply_picker_result(&mut self, params: Option<&RouteParams>) -> bool {
        match selected_location(params) {
            Some(coordinates) => {
                self.current = Some((coordinates, Provenance::Picked));
                true
            }
            None => false,
        }
    }
}

fn selected_location(params: Option<&RouteParams>) -> Option<Coordinates> {
    let value = params?.get(SELECTED_LOCATION_PARAM)?;
    match serde_json::from_value::<Coordinates>(value.clone()) {
        Ok(coordinates) => Some(coordinates),
        Err(err) => {
            warn!("event=picker_result module=flows status=ignored error={err}");
            None
        }
    }
}

/// Params a picker screen hands back to the location manager.
pub fn picker_params(coordinates: Coordinates) -> RouteParams {
    let mut params = RouteParams::new();
    params.insert(
        SELECTED_LOCATION_PARAM.to_string(),
        serde_json::json!({
            "latitude": coordinates.latitude,
            "longitude": coordinates.longitude,
        }),
    );
    params
}

pub async fn load_persisted(
    store: &dyn DocumentStore,
    user_id: &str,
) -> Result<Option<Coordinates>, StoreError> {
    let doc = store.get_one(user_id, USERS_COLLECTION).await?;
    Ok(doc.and_then(|d| Coordinates::from_field(&d, LOCATION_FIELD)))
}

/// Checks the grant on every call and asks for it when absent.
pub async fn acquire_from_sensor(sensor: &dyn LocationSensor) -> Result<Coordinates, AppError> {
    let mut grant = sensor.check_permission();
    if !grant.granted {
        grant = sensor.request_permission().await;
    }
    if !grant.granted {
        info!("event=locate module=flows status=denied");
        return Err(AppError::PermissionDenied);
    }
    let coordinates = sensor.read_once().await?;
    info!("event=locate module=flows status=ok");
    Ok(coordinates)
}

pub async fn persist(
    store: &dyn DocumentStore,
    user_id: &str,
    coordinates: Coordinates,
) -> Result<(), StoreError> {
    let mut partial = Document::new();
    partial.insert(
        LOCATION_FIELD.to_string(),
        serde_json::json!({
            "latitude": coordinates.latitude,
            "longitude": coordinates.longitude,
        }),
    );
    store.update(user_id, partial, USERS_COLLECTION).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::{FakeSensor, FakeStore, StoreCall};
    use crate::error::SensorError;
    use crate::navigation::route_params;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_save_disabled_until_a_value_arrives() {
        let mut state = LocationState::default();
        assert!(!state.can_save());
        state.apply_sensed(Coordinates::new(1.0, 1.0));
        assert!(state.can_save());

        let mut state = LocationState::default();
        state.apply_persisted(Coordinates::new(1.0, 1.0));
        assert!(state.can_save());

        let mut state = LocationState::default();
        state.apply_picker_result(Some(&picker_params(Coordinates::new(1.0, 1.0))));
        assert!(state.can_save());
    }

    #[test]
    fn test_picker_overwrites_sensed_value() {
        let mut state = LocationState::default();
        state.apply_sensed(Coordinates::new(9.0, 9.0));

        let params = route_params(json!({ "selectedLocation": { "latitude": 1, "longitude": 2 } }));
        assert!(state.apply_picker_result(params.as_ref()));
        assert_eq!(state.current(), Some(Coordinates::new(1.0, 2.0)));
        assert_eq!(state.provenance(), Some(Provenance::Picked));
    }

    #[test]
    fn test_picker_overwrites_persisted_and_sensor_overwrites_picker() {
        let mut state = LocationState::default();
        state.apply_persisted(Coordinates::new(5.0, 5.0));
        state.apply_picker_result(Some(&picker_params(Coordinates::new(1.0, 2.0))));
        assert_eq!(state.current(), Some(Coordinates::new(1.0, 2.0)));

        state.apply_sensed(Coordinates::new(3.0, 4.0));
        assert_eq!(state.current(), Some(Coordinates::new(3.0, 4.0)));
        assert_eq!(state.provenance(), Some(Provenance::Sensed));
    }

    #[test]
    fn test_late_persisted_read_does_not_clobber() {
        let mut state = LocationState::default();
        state.apply_sensed(Coordinates::new(9.0, 9.0));
        assert!(!state.apply_persisted(Coordinates::new(5.0, 5.0)));
        assert_eq!(state.current(), Some(Coordinates::new(9.0, 9.0)));
    }

    #[test]
    fn test_params_without_selection_leave_value() {
        let mut state = LocationState::default();
        state.apply_sensed(Coordinates::new(9.0, 9.0));

        assert!(!state.apply_picker_result(None));
        let other = route_params(json!({ "journalId": "J1" }));
        assert!(!state.apply_picker_result(other.as_ref()));
        let malformed = route_params(json!({ "selectedLocation": "here" }));
        assert!(!state.apply_picker_result(malformed.as_ref()));

        assert_eq!(state.current(), Some(Coordinates::new(9.0, 9.0)));
    }

    #[test]
    fn test_out_of_range_values_are_trusted() {
        let mut state = LocationState::default();
        state.apply_picker_result(Some(&picker_params(Coordinates::new(123.0, -500.0))));
        assert_eq!(state.current(), Some(Coordinates::new(123.0, -500.0)));
    }

    #[test]
    fn test_acquire_requests_permission_when_absent() {
        let sensor = FakeSensor::new(false, true, Coordinates::new(49.0, -123.0));
        let result = block_on(acquire_from_sensor(&sensor));
        assert_eq!(result, Ok(Coordinates::new(49.0, -123.0)));
        assert_eq!(
            sensor.calls(),
            vec!["check_permission", "request_permission", "read_once"]
        );
    }

    #[test]
    fn test_acquire_skips_request_when_granted() {
        let sensor = FakeSensor::new(true, true, Coordinates::new(1.0, 1.0));
        block_on(acquire_from_sensor(&sensor)).expect("granted");
        assert_eq!(sensor.calls(), vec!["check_permission", "read_once"]);
    }

    #[test]
    fn test_acquire_rechecks_grant_each_time() {
        let sensor = FakeSensor::new(true, false, Coordinates::new(1.0, 1.0));
        block_on(acquire_from_sensor(&sensor)).expect("granted");

        sensor.revoke();
        let result = block_on(acquire_from_sensor(&sensor));
        assert_eq!(result, Err(AppError::PermissionDenied));
        assert_eq!(
            sensor.calls(),
            vec!["check_permission", "read_once", "check_permission", "request_permission"]
        );
    }

    #[test]
    fn test_acquire_reports_sensor_failure() {
        let sensor = FakeSensor::failing(SensorError::Read("timeout".to_string()));
        let result = block_on(acquire_from_sensor(&sensor));
        assert_eq!(
            result,
            Err(AppError::Sensor(SensorError::Read("timeout".to_string())))
        );
    }

    #[test]
    fn test_load_and_persist_use_users_collection() {
        let store = FakeStore::default();
        assert_eq!(block_on(load_persisted(&store, "u-1")), Ok(None));

        block_on(persist(&store, "u-1", Coordinates::new(1.5, 2.5))).expect("saved");
        assert_eq!(
            block_on(load_persisted(&store, "u-1")),
            Ok(Some(Coordinates::new(1.5, 2.5)))
        );

        let calls = store.calls();
        assert!(matches!(
            &calls[1],
            StoreCall::Update { id, collection, .. } if id == "u-1" && collection == "users"
        ));
    }
}
