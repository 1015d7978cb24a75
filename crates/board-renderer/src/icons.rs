//! Icon lookup table.
//!
//! Maps a marker type to the object image that draws it, the icon's half
//! extent in raster pixels and an optional crop into a shared sprite sheet.

/// Sub-rectangle of a source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// How one icon type is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconSpec {
    /// Object image name, `objects/<src>.webp` in the asset directory.
    pub src: &'static str,
    /// Half the drawn width and height. The icon is drawn `2·size` square,
    /// centered on the marker.
    pub size: f64,
    pub crop: Option<CropRect>,
}

const fn plain(src: &'static str, size: f64) -> IconSpec {
    IconSpec {
        src,
        size,
        crop: None,
    }
}

const fn sprite(src: &'static str, size: f64, crop: CropRect) -> IconSpec {
    IconSpec {
        src,
        size,
        crop: Some(crop),
    }
}

const ROLE_SIZE: f64 = 24.0;
const WAYMARK_SIZE: f64 = 30.0;
const SIGN_SIZE: f64 = 22.0;
const MECHANIC_SIZE: f64 = 40.0;

/// Cells of the `enemies` sprite sheet: three 256px cells in a row.
const ENEMY_CELL: u32 = 256;

static ICONS: &[(&str, IconSpec)] = &[
    // Roles
    ("tank", plain("tank", ROLE_SIZE)),
    ("tank_1", plain("tank_1", ROLE_SIZE)),
    ("tank_2", plain("tank_2", ROLE_SIZE)),
    ("healer", plain("healer", ROLE_SIZE)),
    ("healer_1", plain("healer_1", ROLE_SIZE)),
    ("healer_2", plain("healer_2", ROLE_SIZE)),
    ("pure_healer", plain("pure_healer", ROLE_SIZE)),
    ("barrier_healer", plain("barrier_healer", ROLE_SIZE)),
    ("dps", plain("dps", ROLE_SIZE)),
    ("dps_1", plain("dps_1", ROLE_SIZE)),
    ("dps_2", plain("dps_2", ROLE_SIZE)),
    ("dps_3", plain("dps_3", ROLE_SIZE)),
    ("dps_4", plain("dps_4", ROLE_SIZE)),
    ("melee_dps", plain("melee_dps", ROLE_SIZE)),
    ("ranged_dps", plain("ranged_dps", ROLE_SIZE)),
    ("physical_ranged_dps", plain("physical_ranged_dps", ROLE_SIZE)),
    ("magical_ranged_dps", plain("magical_ranged_dps", ROLE_SIZE)),
    // Waymarks
    ("waymark_a", plain("waymark_a", WAYMARK_SIZE)),
    ("waymark_b", plain("waymark_b", WAYMARK_SIZE)),
    ("waymark_c", plain("waymark_c", WAYMARK_SIZE)),
    ("waymark_d", plain("waymark_d", WAYMARK_SIZE)),
    ("waymark_1", plain("waymark_1", WAYMARK_SIZE)),
    ("waymark_2", plain("waymark_2", WAYMARK_SIZE)),
    ("waymark_3", plain("waymark_3", WAYMARK_SIZE)),
    ("waymark_4", plain("waymark_4", WAYMARK_SIZE)),
    // Target signs
    ("attack_1", plain("attack_1", SIGN_SIZE)),
    ("attack_2", plain("attack_2", SIGN_SIZE)),
    ("attack_3", plain("attack_3", SIGN_SIZE)),
    ("attack_4", plain("attack_4", SIGN_SIZE)),
    ("attack_5", plain("attack_5", SIGN_SIZE)),
    ("attack_6", plain("attack_6", SIGN_SIZE)),
    ("attack_7", plain("attack_7", SIGN_SIZE)),
    ("attack_8", plain("attack_8", SIGN_SIZE)),
    ("bind_1", plain("bind_1", SIGN_SIZE)),
    ("bind_2", plain("bind_2", SIGN_SIZE)),
    ("bind_3", plain("bind_3", SIGN_SIZE)),
    ("ignore_1", plain("ignore_1", SIGN_SIZE)),
    ("ignore_2", plain("ignore_2", SIGN_SIZE)),
    ("square", plain("square", SIGN_SIZE)),
    ("circle", plain("circle", SIGN_SIZE)),
    ("plus", plain("plus", SIGN_SIZE)),
    ("triangle", plain("triangle", SIGN_SIZE)),
    // Mechanics
    ("stack", plain("stack", MECHANIC_SIZE)),
    ("line_stack", plain("line_stack", MECHANIC_SIZE)),
    ("spread", plain("spread", MECHANIC_SIZE)),
    ("gaze", plain("gaze", MECHANIC_SIZE)),
    ("tower", plain("tower", MECHANIC_SIZE)),
    ("proximity", plain("proximity", MECHANIC_SIZE)),
    ("tankbuster", plain("tankbuster", MECHANIC_SIZE)),
    ("knockback", plain("knockback", MECHANIC_SIZE)),
    ("targeting", plain("targeting", MECHANIC_SIZE)),
    // Enemies share one sprite sheet.
    (
        "small_enemy",
        sprite("enemies", 32.0, CropRect::new(0, 0, ENEMY_CELL, ENEMY_CELL)),
    ),
    (
        "medium_enemy",
        sprite("enemies", 48.0, CropRect::new(ENEMY_CELL, 0, ENEMY_CELL, ENEMY_CELL)),
    ),
    (
        "large_enemy",
        sprite("enemies", 64.0, CropRect::new(2 * ENEMY_CELL, 0, ENEMY_CELL, ENEMY_CELL)),
    ),
];

/// Look up how to draw an icon type. `None` for unknown types.
pub fn icon_spec(name: &str) -> Option<IconSpec> {
    ICONS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, spec)| *spec)
}
