//! State for the cosmetic effects. The browser shell owns the DOM side.

/// Elements that switch the custom cursor into its active state.
pub const CURSOR_INTERACTIVE_SELECTOR: &str =
    "button, a, .card, .module-card, .featured-card, input, textarea, .social-icon";

pub const TRAIL_PARTICLE_MS: u32 = 550;
pub const KONAMI_EFFECT_MS: u32 = 3000;
pub const CLOCK_TICK_MS: u32 = 1000;
pub const STATS_TICK_MS: u32 = 2000;

/// Keycodes for up up down down left right left right B A.
pub const KONAMI_CODE: [u32; 10] = [38, 38, 40, 40, 37, 39, 37, 39, 66, 65];

#[derive(Debug, Default)]
pub struct KonamiTracker {
    position: usize,
}

impl KonamiTracker {
    /// Feed one keydown. Returns `true` when the sequence completes.
    ///
    /// A wrong key resets progress to zero, even if it would begin a new run.
    pub fn press(&mut self, key_code: u32) -> bool {
        if KONAMI_CODE.get(self.position) == Some(&key_code) {
            self.position += 1;
            if self.position == KONAMI_CODE.len() {
                self.position = 0;
                return true;
            }
        } else {
            self.position = 0;
        }
        false
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

/// Fires once, the first time the pointer leaves through the top edge.
#[derive(Debug, Default)]
pub struct ExitIntent {
    triggered: bool,
}

impl ExitIntent {
    pub fn pointer_left(&mut self, client_y: f64) -> bool {
        if client_y <= 0.0 && !self.triggered {
            self.triggered = true;
            return true;
        }
        false
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

/// Whether a pointer move with random `roll` in [0, 1) spawns a trail particle.
pub fn trail_spawn(roll: f64) -> bool {
    roll > 0.7
}

/// Hero card rotation in degrees `(rotate_y, rotate_x)` for a pointer position.
pub fn hero_tilt(viewport: (f64, f64), page: (f64, f64)) -> (f64, f64) {
    let (width, height) = viewport;
    let (x, y) = page;
    ((width / 2.0 - x) / 40.0, (height / 2.0 - y) / 40.0)
}

pub fn tilt_transform((rotate_y, rotate_x): (f64, f64)) -> String {
    format!("rotateY({rotate_y}deg) rotateX({rotate_x}deg)")
}

/// Simulated footer load figures from two random rolls in [0, 1).
/// CPU lands in 20..50, memory in 30..70.
pub fn simulated_stats(cpu_roll: f64, mem_roll: f64) -> String {
    let cpu = (cpu_roll * 30.0 + 20.0).floor() as u32;
    let mem = (mem_roll * 40.0 + 30.0).floor() as u32;
    format!("CPU:{cpu}% MEM:{mem}%")
}

/// Footer identity text.
pub fn footer_username(username: Option<&str>) -> String {
    username.map(str::to_uppercase).unwrap_or_else(|| "GUEST".to_owned())
}
