//! Provider capability profiles.
//!
//! Providers differ only in their local-use parameter table, whether the
//! file carries a non-standard header before the first record, and whether
//! their grids are quasi-regular. Everything else is shared adapter
//! behavior, so a provider is a plain capability record rather than a
//! type of its own.

use grib_records::{EnsembleMap, ParameterInfo, TABLE_END};

/// The supported data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ruc,
    Avn,
    Wafs,
    Afwa,
    Dtra,
}

/// Capability record driving per-provider adapter behavior.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub provider: Provider,
    /// Local-use parameter table, sentinel-terminated, first match wins.
    pub overrides: &'static [ParameterInfo],
    /// Leading bytes to consume before the first record marker.
    pub header_skip: usize,
    /// Whether grids from this provider may need quasi-regular repair.
    pub quasi_regrid: bool,
    /// Runtime ensemble code map, consulted before the static tables for
    /// ensemble-flagged records.
    pub ensemble_map: Option<EnsembleMap>,
}

impl ProviderProfile {
    pub fn with_ensemble_map(mut self, map: EnsembleMap) -> Self {
        self.ensemble_map = Some(map);
        self
    }
}

impl Provider {
    pub fn profile(self) -> ProviderProfile {
        match self {
            Provider::Ruc => ProviderProfile {
                provider: self,
                overrides: RUC_OVERRIDES,
                header_skip: 0,
                quasi_regrid: false,
                ensemble_map: None,
            },
            Provider::Avn => ProviderProfile {
                provider: self,
                overrides: AVN_OVERRIDES,
                header_skip: 0,
                quasi_regrid: false,
                ensemble_map: None,
            },
            Provider::Wafs => ProviderProfile {
                provider: self,
                overrides: AVN_OVERRIDES,
                header_skip: 0,
                quasi_regrid: true,
                ensemble_map: None,
            },
            Provider::Afwa => ProviderProfile {
                provider: self,
                overrides: AFWA_OVERRIDES,
                header_skip: AFWA_HEADER_LEN,
                quasi_regrid: false,
                ensemble_map: None,
            },
            Provider::Dtra => ProviderProfile {
                provider: self,
                overrides: DTRA_OVERRIDES,
                header_skip: 0,
                quasi_regrid: false,
                ensemble_map: None,
            },
        }
    }
}

/// AFWA files open with a fixed-size text header before the first marker.
const AFWA_HEADER_LEN: usize = 80;

static RUC_OVERRIDES: &[ParameterInfo] = &[
    ParameterInfo { code: 129, short_name: "MSLMA", long_name: "MAPS mean sea level pressure", units: "Pa" },
    ParameterInfo { code: 130, short_name: "MSLET", long_name: "ETA mean sea level pressure", units: "Pa" },
    ParameterInfo { code: 153, short_name: "CLWMR", long_name: "Cloud water mixing ratio", units: "kg/kg" },
    ParameterInfo { code: 156, short_name: "CIN", long_name: "Convective inhibition", units: "J/kg" },
    ParameterInfo { code: 157, short_name: "CAPE", long_name: "Convective available potential energy", units: "J/kg" },
    ParameterInfo { code: 158, short_name: "TKE", long_name: "Turbulent kinetic energy", units: "J/kg" },
    ParameterInfo { code: 170, short_name: "RWMR", long_name: "Rain water mixing ratio", units: "kg/kg" },
    ParameterInfo { code: 171, short_name: "SNMR", long_name: "Snow mixing ratio", units: "kg/kg" },
    ParameterInfo { code: 178, short_name: "ICMR", long_name: "Ice mixing ratio", units: "kg/kg" },
    ParameterInfo { code: 179, short_name: "GRMR", long_name: "Graupel mixing ratio", units: "kg/kg" },
    ParameterInfo { code: 190, short_name: "HLCY", long_name: "Storm relative helicity", units: "m2/s2" },
    ParameterInfo { code: TABLE_END, short_name: "", long_name: "", units: "" },
];

static AVN_OVERRIDES: &[ParameterInfo] = &[
    ParameterInfo { code: 130, short_name: "MSLET", long_name: "ETA mean sea level pressure", units: "Pa" },
    ParameterInfo { code: 131, short_name: "LFTX", long_name: "Surface lifted index", units: "K" },
    ParameterInfo { code: 132, short_name: "4LFTX", long_name: "Best 4-layer lifted index", units: "K" },
    ParameterInfo { code: 135, short_name: "MCONV", long_name: "Horizontal moisture divergence", units: "kg/kg/s" },
    ParameterInfo { code: 136, short_name: "VWSH", long_name: "Vertical speed shear", units: "1/s" },
    ParameterInfo { code: 140, short_name: "CRAIN", long_name: "Categorical rain", units: "" },
    ParameterInfo { code: 141, short_name: "CFRZR", long_name: "Categorical freezing rain", units: "" },
    ParameterInfo { code: 142, short_name: "CICEP", long_name: "Categorical ice pellets", units: "" },
    ParameterInfo { code: 143, short_name: "CSNOW", long_name: "Categorical snow", units: "" },
    ParameterInfo { code: 153, short_name: "CLWMR", long_name: "Cloud water mixing ratio", units: "kg/kg" },
    ParameterInfo { code: 156, short_name: "CIN", long_name: "Convective inhibition", units: "J/kg" },
    ParameterInfo { code: 157, short_name: "CAPE", long_name: "Convective available potential energy", units: "J/kg" },
    ParameterInfo { code: TABLE_END, short_name: "", long_name: "", units: "" },
];

static AFWA_OVERRIDES: &[ParameterInfo] = &[
    ParameterInfo { code: 128, short_name: "MSLSA", long_name: "Mean sea level pressure (std atm)", units: "Pa" },
    ParameterInfo { code: 144, short_name: "SOILW", long_name: "Volumetric soil moisture", units: "fraction" },
    ParameterInfo { code: 157, short_name: "CAPE", long_name: "Convective available potential energy", units: "J/kg" },
    ParameterInfo { code: 174, short_name: "SNOWC", long_name: "Snow cover", units: "%" },
    ParameterInfo { code: TABLE_END, short_name: "", long_name: "", units: "" },
];

static DTRA_OVERRIDES: &[ParameterInfo] = &[
    ParameterInfo { code: 156, short_name: "CIN", long_name: "Convective inhibition", units: "J/kg" },
    ParameterInfo { code: 157, short_name: "CAPE", long_name: "Convective available potential energy", units: "J/kg" },
    ParameterInfo { code: 158, short_name: "TKE", long_name: "Turbulent kinetic energy", units: "J/kg" },
    ParameterInfo { code: TABLE_END, short_name: "", long_name: "", units: "" },
];
