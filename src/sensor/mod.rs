//! Browser geolocation adapter.

use crate::collab::{LocationSensor, PermissionGrant};
use crate::error::SensorError;
use crate::models::Coordinates;
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{PermissionState, PermissionStatus, Position, PositionError};

#[derive(Debug, PartialEq)]
enum PositionFailure {
    Denied,
    Other(SensorError),
}

/// [`LocationSensor`] over `navigator.geolocation`.
///
/// `check_permission` answers from the last observed grant. Every read and
/// request refreshes it, so a revoked grant is noticed on the next attempt.
#[derive(Default)]
pub struct BrowserLocationSensor {
    granted: Mutex<bool>,
    primed: Mutex<Option<Coordinates>>,
}

impl BrowserLocationSensor {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_grant(&self, granted: bool) {
        *self.granted.lock() = granted;
    }
}

fn geolocation() -> Result<web_sys::Geolocation, SensorError> {
    web_sys::window()
        .ok_or(SensorError::Unavailable)?
        .navigator()
        .geolocation()
        .map_err(|_| SensorError::Unavailable)
}

async fn query_permission_state() -> Option<PermissionState> {
    let permissions = web_sys::window()?.navigator().permissions().ok()?;
    let descriptor = js_sys::Object::new();
    js_sys::Reflect::set(&descriptor, &"name".into(), &"geolocation".into()).ok()?;
    let promise = permissions.query(&descriptor).ok()?;
    let status: PermissionStatus = JsFuture::from(promise).await.ok()?.unchecked_into();
    Some(status.state())
}

async fn current_position() -> Result<Coordinates, PositionFailure> {
    let geolocation = geolocation().map_err(PositionFailure::Other)?;
    let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function, reject: js_sys::Function| {
        if let Err(err) = geolocation.get_current_position_with_error_callback(&resolve, Some(&reject))
        {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
    });

    match JsFuture::from(promise).await {
        Ok(value) => {
            let coords = value.unchecked_into::<Position>().coords();
            Ok(Coordinates::new(coords.latitude(), coords.longitude()))
        }
        Err(err) => Err(position_failure(err)),
    }
}

fn position_failure(err: JsValue) -> PositionFailure {
    // Browsers name the class GeolocationPositionError, so match on shape.
    let has_code = err.is_object()
        && js_sys::Reflect::has(&err, &"code".into()).unwrap_or(false);
    if !has_code {
        return PositionFailure::Other(SensorError::Read(
            err.as_string().unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    let e: PositionError = err.unchecked_into();
    if e.code() == PositionError::PERMISSION_DENIED {
        PositionFailure::Denied
    } else {
        PositionFailure::Other(SensorError::Read(e.message()))
    }
}

#[async_trait(?Send)]
impl LocationSensor for BrowserLocationSensor {
    fn check_permission(&self) -> PermissionGrant {
        PermissionGrant {
            granted: *self.granted.lock(),
        }
    }

    async fn request_permission(&self) -> PermissionGrant {
        let granted = match query_permission_state().await {
            Some(PermissionState::Granted) => true,
            Some(PermissionState::Denied) => false,
            // Only a position read makes the browser show its prompt.
            _ => match current_position().await {
                Ok(coordinates) => {
                    *self.primed.lock() = Some(coordinates);
                    true
                }
                Err(PositionFailure::Denied) => false,
                Err(PositionFailure::Other(err)) => {
                    debug!("event=locate_prompt module=sensor status=error error={err}");
                    matches!(query_permission_state().await, Some(PermissionState::Granted))
                }
            },
        };
        self.record_grant(granted);
        PermissionGrant { granted }
    }

    async fn read_once(&self) -> Result<Coordinates, SensorError> {
        if let Some(coordinates) = self.primed.lock().take() {
            return Ok(coordinates);
        }
        match current_position().await {
            Ok(coordinates) => {
                self.record_grant(true);
                Ok(coordinates)
            }
            Err(PositionFailure::Denied) => {
                warn!("event=locate module=sensor status=denied");
                self.record_grant(false);
                Err(SensorError::Read("permission denied".to_string()))
            }
            Err(PositionFailure::Other(err)) => Err(err),
        }
    }
}
