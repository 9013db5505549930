//! Click-count activation of chakra modes.
//!
//! Repeated clicks on the acting unit inside a short window select the
//! action the next enemy click performs. The gate owns the click tracking;
//! the selected mode lives on the unit.
mod gate;

pub use gate::{
    ChakraGate, ClickTrack, GateOutcome, JUTSU_THRESHOLD, SECRET_THRESHOLD, ULTIMATE_THRESHOLD,
    mode_for_clicks,
};
