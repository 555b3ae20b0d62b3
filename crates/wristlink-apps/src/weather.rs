//! Weather condition mapping.
//!
//! Watch faces render weather with a one-character icon identifier. The
//! host maps numeric condition codes (OpenWeatherMap-style, where the
//! hundreds digit selects the general condition) onto day icons; night
//! variants are the uppercase form of the same letter, so a single table
//! covers both.

/// Clear sky.
pub const ICON_CLEAR: char = 'a';
/// A few clouds.
pub const ICON_FEW_CLOUDS: char = 'b';
/// Scattered clouds.
pub const ICON_SCATTERED_CLOUDS: char = 'c';
/// Broken/overcast clouds.
pub const ICON_BROKEN_CLOUDS: char = 'd';
/// Shower rain.
pub const ICON_SHOWER_RAIN: char = 'e';
/// Rain.
pub const ICON_RAIN: char = 'f';
/// Thunderstorm.
pub const ICON_THUNDERSTORM: char = 'g';
/// Snow.
pub const ICON_SNOW: char = 'h';
/// Mist, fog, dust.
pub const ICON_MIST: char = 'i';

/// A host-side weather snapshot pushed to watch-face codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherUpdate {
    /// Current temperature in degrees Celsius.
    pub temperature_celsius: i32,
    /// Numeric condition code.
    pub condition_code: i32,
    /// Whether it is currently night at the observed location.
    pub is_night: bool,
}

/// Map a condition code to its icon identifier.
///
/// Codes 500 and 520+ share the shower-rain icon with the drizzle group;
/// light-to-heavy rain (501-504) and freezing rain (511) use the rain icon.
pub fn icon_for_condition(condition_code: i32, is_night: bool) -> char {
    let icon = match condition_code / 100 {
        2 => ICON_THUNDERSTORM,
        3 => ICON_SHOWER_RAIN,
        5 => {
            if condition_code == 500 {
                ICON_SHOWER_RAIN
            } else if condition_code < 505 {
                ICON_RAIN
            } else if condition_code == 511 {
                ICON_RAIN
            } else {
                ICON_SHOWER_RAIN
            }
        }
        6 => ICON_SNOW,
        7 => ICON_MIST,
        8 => {
            if condition_code == 800 {
                ICON_CLEAR
            } else if condition_code < 803 {
                ICON_FEW_CLOUDS
            } else {
                ICON_BROKEN_CLOUDS
            }
        }
        _ => ICON_FEW_CLOUDS,
    };

    if is_night {
        icon.to_ascii_uppercase()
    } else {
        icon
    }
}
