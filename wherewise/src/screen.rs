//! Pure construction of the screen description from a state snapshot.
//!
//! The UI layer renders [`Screen`] values and nothing else, so everything the
//! user sees is decided here and can be tested without a window.

use crate::geo::{GeoPoint, GeoRegion};
use crate::state::{Alert, AppState, PermissionPrompt};

/// Title shown at the top of the screen.
pub const SCREEN_TITLE: &str = "Location and Advice";
/// Heading of the location card.
pub const LOCATION_CARD_TITLE: &str = "Check Your Location Here!";
/// Label shown above the advice text.
pub const ADVICE_CARD_LABEL: &str = "Your advice:";
/// Caption of the advice button.
pub const ADVICE_BUTTON_CAPTION: &str = "Get Advice";
/// Title of the marker pinned to the user's location.
pub const MARKER_TITLE: &str = "You are here!";

/// Latitude span of the location map, in degrees.
pub const MAP_LAT_SPAN: f64 = 0.0922;
/// Longitude span of the location map, in degrees.
pub const MAP_LON_SPAN: f64 = 0.0421;

/// A titled marker pinned on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Geographic position of the marker.
    pub position: GeoPoint,
    /// Title shown when the marker is activated.
    pub title: String,
}

/// Contents of the location card.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCard {
    /// Latitude of the acquired location, in degrees.
    pub latitude: f64,
    /// Longitude of the acquired location, in degrees.
    pub longitude: f64,
    /// Region the embedded map is fitted to.
    pub map_region: GeoRegion,
    /// The single marker shown on the map.
    pub marker: Marker,
}

/// Contents of the advice card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceCard {
    /// The advice text.
    pub text: String,
}

/// Complete description of the screen for one state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    /// Title of the screen.
    pub title: &'static str,
    /// Location card, present once the device location is known.
    pub location_card: Option<LocationCard>,
    /// Advice card, present once an advice slip has been received.
    pub advice_card: Option<AdviceCard>,
    /// Whether the advice button is shown.
    pub advice_button_visible: bool,
    /// The frontmost alert, if any.
    pub alert: Option<Alert>,
    /// The pending permission prompt, if any.
    pub permission_prompt: Option<PermissionPrompt>,
}

/// Builds the screen description for the given state snapshot.
///
/// This is a pure function: equal states produce equal screens.
pub fn build_screen(state: &AppState) -> Screen {
    let location_card = state.location().map(|position| {
        let point = position.point();
        LocationCard {
            latitude: point.lat(),
            longitude: point.lon(),
            map_region: GeoRegion::new(point, MAP_LAT_SPAN, MAP_LON_SPAN),
            marker: Marker {
                position: point,
                title: MARKER_TITLE.to_string(),
            },
        }
    });

    let advice_card = state.advice().map(|slip| AdviceCard {
        text: slip.advice().to_string(),
    });

    Screen {
        title: SCREEN_TITLE,
        location_card,
        advice_card,
        advice_button_visible: state.advice_button_visible(),
        alert: state.current_alert().cloned(),
        permission_prompt: state.permission_prompt().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_compact_debug_snapshot;

    use super::*;
    use crate::advice::AdviceSlip;
    use crate::geo::Position;
    use crate::state::Store;

    #[test]
    fn initial_screen_shows_only_title_and_button() {
        let screen = build_screen(&AppState::default());
        assert_compact_debug_snapshot!(screen, @r#"Screen { title: "Location and Advice", location_card: None, advice_card: None, advice_button_visible: true, alert: None, permission_prompt: None }"#);
    }

    #[test]
    fn location_card_is_centered_on_the_reading() {
        let store = Store::new();
        store.set_location(Position::new(GeoPoint::latlon(40.0, -74.0)));

        let screen = build_screen(&store.snapshot());
        let card = screen.location_card.expect("location card must be shown");

        assert_eq!(card.latitude, 40.0);
        assert_eq!(card.longitude, -74.0);

        // The map region and the marker sit exactly on the acquired
        // coordinates.
        assert_eq!(card.map_region.center(), GeoPoint::latlon(40.0, -74.0));
        assert_eq!(card.marker.position, card.map_region.center());
        assert_eq!(card.marker.title, "You are here!");
        assert_eq!(card.map_region.lat_span(), MAP_LAT_SPAN);
        assert_eq!(card.map_region.lon_span(), MAP_LON_SPAN);
    }

    #[test]
    fn advice_card_appears_only_with_advice_text() {
        let store = Store::new();
        let screen = build_screen(&store.snapshot());
        assert!(screen.advice_card.is_none());
        assert!(screen.advice_button_visible);

        store.set_advice(AdviceSlip::new(Some(1), "Be kind."));
        let screen = build_screen(&store.snapshot());
        assert_eq!(
            screen.advice_card.map(|card| card.text),
            Some("Be kind.".to_string())
        );
        assert!(!screen.advice_button_visible);
    }

    #[test]
    fn hidden_button_stays_hidden_on_rebuild() {
        let store = Store::new();
        store.set_advice(AdviceSlip::new(None, "text"));

        let state = store.snapshot();
        let first = build_screen(&state);
        let second = build_screen(&state);

        assert!(!first.advice_button_visible);
        assert_eq!(first, second);
    }

    #[test]
    fn only_the_frontmost_alert_is_shown() {
        let store = Store::new();
        store.push_alert(Alert::new("first"));
        store.push_alert(Alert::new("second"));

        let screen = build_screen(&store.snapshot());
        assert_eq!(screen.alert.map(|alert| alert.title().to_string()), Some("first".to_string()));
    }

    #[test]
    fn permission_prompt_is_carried_to_the_screen() {
        let store = Store::new();
        let (sender, _receiver) = tokio::sync::oneshot::channel();
        store.open_permission_prompt(PermissionPrompt::new("may we?"), sender);

        let screen = build_screen(&store.snapshot());
        assert_eq!(
            screen.permission_prompt.map(|prompt| prompt.message().to_string()),
            Some("may we?".to_string())
        );
    }
}
