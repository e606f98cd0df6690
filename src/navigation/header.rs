//! Header actions resolved from the focused screen context.

use super::tree::{screens, RegionId};
use super::RouteParams;
use log::warn;

pub const JOURNAL_ID_PARAM: &str = "journalId";

/// Header-region control of the focused screen.
///
/// Actions are plain values resolved from the focused screen's context, so a
/// `Delete` always carries the id of the record on screen at resolution time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderAction {
    Logout,
    Add { target: &'static str },
    Delete { journal_id: String },
}

pub fn resolve(region: RegionId, screen: &str, params: Option<&RouteParams>) -> Vec<HeaderAction> {
    match region {
        RegionId::Auth => Vec::new(),
        RegionId::Home | RegionId::History | RegionId::Favorite | RegionId::Cart => {
            vec![HeaderAction::Logout]
        }
        RegionId::Profile => match screen {
            screens::PROFILE => vec![HeaderAction::Logout],
            screens::JOURNAL => vec![HeaderAction::Add {
                target: screens::ADD_JOURNAL,
            }],
            screens::JOURNAL_DETAIL => match journal_id(params) {
                Some(journal_id) => vec![HeaderAction::Delete { journal_id }],
                None => {
                    warn!("event=header_resolve module=navigation status=skipped reason=missing_journal_id");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        },
    }
}

fn journal_id(params: Option<&RouteParams>) -> Option<String> {
    params?
        .get(JOURNAL_ID_PARAM)?
        .as_str()
        .filter(|id| !id.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::route_params;
    use serde_json::json;

    #[test]
    fn test_top_level_stacks_get_logout() {
        for (region, screen) in [
            (RegionId::Home, screens::HOME),
            (RegionId::History, screens::HISTORY),
            (RegionId::Favorite, screens::FAVORITE),
            (RegionId::Cart, screens::CART),
            (RegionId::Cart, screens::PAYMENT),
            (RegionId::Profile, screens::PROFILE),
        ] {
            assert_eq!(resolve(region, screen, None), vec![HeaderAction::Logout]);
        }
    }

    #[test]
    fn test_unauthenticated_screens_have_no_controls() {
        assert!(resolve(RegionId::Auth, screens::LOGIN, None).is_empty());
        assert!(resolve(RegionId::Auth, screens::SIGNUP, None).is_empty());
    }

    #[test]
    fn test_profile_sub_screens_without_actions() {
        for screen in [screens::ADD_JOURNAL, screens::EDIT_PROFILE, screens::MAP] {
            assert!(resolve(RegionId::Profile, screen, None).is_empty());
        }
    }

    #[test]
    fn test_delete_binds_to_current_params() {
        let a = route_params(json!({ "journalId": "A" }));
        let b = route_params(json!({ "journalId": "B" }));

        let first = resolve(RegionId::Profile, screens::JOURNAL_DETAIL, a.as_ref());
        let second = resolve(RegionId::Profile, screens::JOURNAL_DETAIL, b.as_ref());

        assert_eq!(first, vec![HeaderAction::Delete { journal_id: "A".to_string() }]);
        assert_eq!(second, vec![HeaderAction::Delete { journal_id: "B".to_string() }]);
    }

    #[test]
    fn test_detail_without_usable_id_has_no_delete() {
        assert!(resolve(RegionId::Profile, screens::JOURNAL_DETAIL, None).is_empty());

        let numeric = route_params(json!({ "journalId": 7 }));
        assert!(resolve(RegionId::Profile, screens::JOURNAL_DETAIL, numeric.as_ref()).is_empty());

        let blank = route_params(json!({ "journalId": "  " }));
        assert!(resolve(RegionId::Profile, screens::JOURNAL_DETAIL, blank.as_ref()).is_empty());
    }
}
