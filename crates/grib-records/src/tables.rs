//! Parameter and level naming tables.
//!
//! Codes at or below [`STANDARD_MAX`] resolve through the standard table.
//! Codes above it are provider local use and resolve through per-provider
//! override tables: ordered lists searched front to back, first match
//! wins, terminated by a [`TABLE_END`] sentinel code. Entries after the
//! sentinel are dead.

use std::collections::HashMap;

/// Name/unit entry for one parameter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
    pub code: i32,
    pub short_name: &'static str,
    pub long_name: &'static str,
    pub units: &'static str,
}

/// Sentinel code terminating an override table.
pub const TABLE_END: i32 = -1;

/// Highest code in the standard parameter range.
pub const STANDARD_MAX: i32 = 127;

/// Runtime lookup remapping provider ensemble codes to display names.
pub type EnsembleMap = HashMap<i32, String>;

/// Well-known parameter codes (table-2 numbering).
pub mod params {
    pub const PRES: i32 = 1;
    pub const PRMSL: i32 = 2;
    pub const HGT: i32 = 7;
    pub const TMP: i32 = 11;
    pub const DPT: i32 = 17;
    pub const VIS: i32 = 20;
    pub const WDIR: i32 = 31;
    pub const WIND: i32 = 32;
    pub const UGRD: i32 = 33;
    pub const VGRD: i32 = 34;
    pub const VVEL: i32 = 39;
    pub const ABSV: i32 = 41;
    pub const SPFH: i32 = 51;
    pub const RH: i32 = 52;
    pub const PWAT: i32 = 54;
    pub const APCP: i32 = 61;
    pub const SNOD: i32 = 66;
    pub const TCDC: i32 = 71;
}

/// Well-known level-type codes.
pub mod levels {
    pub const SURFACE: i32 = 1;
    pub const CLOUD_BASE: i32 = 2;
    pub const CLOUD_TOP: i32 = 3;
    pub const ISOTHERM_0C: i32 = 4;
    pub const MAX_WIND: i32 = 6;
    pub const TROPOPAUSE: i32 = 7;
    pub const ISOBARIC: i32 = 100;
    pub const MEAN_SEA_LEVEL: i32 = 102;
    pub const HEIGHT_ABOVE_MSL: i32 = 103;
    pub const HEIGHT_ABOVE_GROUND: i32 = 105;
    pub const SIGMA: i32 = 107;
    pub const HYBRID: i32 = 109;
    pub const DEPTH_BELOW_SURFACE: i32 = 111;
    pub const ENTIRE_ATMOSPHERE: i32 = 200;
}

/// Standard-range parameter table.
static STANDARD_TABLE: &[ParameterInfo] = &[
    ParameterInfo { code: 1, short_name: "PRES", long_name: "Pressure", units: "Pa" },
    ParameterInfo { code: 2, short_name: "PRMSL", long_name: "Pressure reduced to MSL", units: "Pa" },
    ParameterInfo { code: 6, short_name: "GP", long_name: "Geopotential", units: "m2/s2" },
    ParameterInfo { code: 7, short_name: "HGT", long_name: "Geopotential height", units: "gpm" },
    ParameterInfo { code: 11, short_name: "TMP", long_name: "Temperature", units: "K" },
    ParameterInfo { code: 13, short_name: "POT", long_name: "Potential temperature", units: "K" },
    ParameterInfo { code: 17, short_name: "DPT", long_name: "Dew point temperature", units: "K" },
    ParameterInfo { code: 20, short_name: "VIS", long_name: "Visibility", units: "m" },
    ParameterInfo { code: 31, short_name: "WDIR", long_name: "Wind direction", units: "deg" },
    ParameterInfo { code: 32, short_name: "WIND", long_name: "Wind speed", units: "m/s" },
    ParameterInfo { code: 33, short_name: "UGRD", long_name: "u-component of wind", units: "m/s" },
    ParameterInfo { code: 34, short_name: "VGRD", long_name: "v-component of wind", units: "m/s" },
    ParameterInfo { code: 39, short_name: "VVEL", long_name: "Vertical velocity (pressure)", units: "Pa/s" },
    ParameterInfo { code: 41, short_name: "ABSV", long_name: "Absolute vorticity", units: "1/s" },
    ParameterInfo { code: 51, short_name: "SPFH", long_name: "Specific humidity", units: "kg/kg" },
    ParameterInfo { code: 52, short_name: "RH", long_name: "Relative humidity", units: "%" },
    ParameterInfo { code: 54, short_name: "PWAT", long_name: "Precipitable water", units: "kg/m2" },
    ParameterInfo { code: 61, short_name: "APCP", long_name: "Total precipitation", units: "kg/m2" },
    ParameterInfo { code: 65, short_name: "WEASD", long_name: "Water equiv of accum snow depth", units: "kg/m2" },
    ParameterInfo { code: 66, short_name: "SNOD", long_name: "Snow depth", units: "m" },
    ParameterInfo { code: 71, short_name: "TCDC", long_name: "Total cloud cover", units: "%" },
    ParameterInfo { code: 73, short_name: "LCDC", long_name: "Low cloud cover", units: "%" },
    ParameterInfo { code: 74, short_name: "MCDC", long_name: "Medium cloud cover", units: "%" },
    ParameterInfo { code: 75, short_name: "HCDC", long_name: "High cloud cover", units: "%" },
    ParameterInfo { code: 81, short_name: "LAND", long_name: "Land cover", units: "fraction" },
    ParameterInfo { code: 84, short_name: "ALBDO", long_name: "Albedo", units: "%" },
    ParameterInfo { code: 85, short_name: "TSOIL", long_name: "Soil temperature", units: "K" },
];

/// Look up a code in the standard table.
pub fn standard_parameter(code: i32) -> Option<&'static ParameterInfo> {
    STANDARD_TABLE.iter().find(|p| p.code == code)
}

/// Look up a code in a provider override table.
///
/// The search stops at the first [`TABLE_END`] sentinel; first match wins.
pub fn lookup_override(table: &[ParameterInfo], code: i32) -> Option<&ParameterInfo> {
    table
        .iter()
        .take_while(|p| p.code != TABLE_END)
        .find(|p| p.code == code)
}

/// True for level types whose values are pressures, where altitude
/// ordering is the inverse of numeric ordering.
pub fn is_isobaric(level_type: i32) -> bool {
    level_type == levels::ISOBARIC
}

/// Human-readable level description for diagnostics.
pub fn level_description(level_type: i32, level_value: f32) -> String {
    match level_type {
        1 => "surface".to_string(),
        2 => "cloud base".to_string(),
        3 => "cloud top".to_string(),
        4 => "0C isotherm".to_string(),
        6 => "max wind".to_string(),
        7 => "tropopause".to_string(),
        100 => format!("{} mb", level_value),
        102 => "mean sea level".to_string(),
        103 => format!("{} m above MSL", level_value),
        105 => format!("{} m above ground", level_value),
        107 => format!("sigma level {}", level_value),
        109 => format!("hybrid level {}", level_value),
        111 => format!("{} m below surface", level_value),
        200 => "entire atmosphere".to_string(),
        _ => format!("level type {} value {}", level_type, level_value),
    }
}
