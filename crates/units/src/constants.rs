/// Planck constant, erg s.
pub const PLANCK_CGS: f64 = 6.626_070_15e-27;

/// Speed of light, Å/s.
pub const SPEED_OF_LIGHT_AA_S: f64 = 2.997_924_58e18;

/// h·c in erg Å.
pub const HC_ERG_AA: f64 = PLANCK_CGS * SPEED_OF_LIGHT_AA_S;

/// 1 Å in metres.
pub const ANGSTROM_M: f64 = 1e-10;

/// 1 erg in joules.
pub const ERG_J: f64 = 1e-7;

/// 1 eV in joules.
pub const ELECTRON_VOLT_J: f64 = 1.602_176_634e-19;

pub const ARCSEC_PER_DEG: f64 = 3600.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub const MJD_ZERO_POINT: f64 = 2_400_000.5;

pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// AB magnitude zero point for f_ν in erg s⁻¹ cm⁻² Hz⁻¹.
pub const AB_ZERO_POINT: f64 = 48.6;

/// ST magnitude zero point for f_λ in erg s⁻¹ cm⁻² Å⁻¹.
pub const ST_ZERO_POINT: f64 = 21.1;

/// Rotation from IAU 1958 Galactic coordinates to ICRS (rows are the
/// galactic basis vectors expressed in ICRS).
#[allow(clippy::excessive_precision)]
pub const GALACTIC_TO_ICRS: [[f64; 3]; 3] = [
    [
        -0.054875560416215368492398900454,
        -0.873437090234885048760383168409,
        -0.483835015548713226831774175116,
    ],
    [
        0.494109427875583673525222371358,
        -0.444829629960011178146614061616,
        0.746982244497218890527388004556,
    ],
    [
        -0.867666149019004701181616534570,
        -0.198076373431201528180486091412,
        0.455983776175066922272100478348,
    ],
];
