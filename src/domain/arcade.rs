//! Fixed-tick invader shooting game.
//!
//! [`reduce`] maps one state and the current input flags to the next state.
//! Per tick: move the player, advance bullets, fire (one shot per press),
//! march or drop the invader block, resolve hits, rescale speed, then check
//! for victory or defeat. Terminal states are returned unchanged.

/// Field geometry and tuning. Coordinates grow right and down; every entity
/// position is its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcadeConfig {
    pub field_width: f64,
    pub field_height: f64,
    pub player_width: f64,
    pub player_height: f64,
    pub player_y: f64,
    pub player_speed: f64,
    pub bullet_width: f64,
    pub bullet_height: f64,
    pub bullet_speed: f64,
    pub invader_cols: usize,
    pub invader_rows: usize,
    pub invader_width: f64,
    pub invader_height: f64,
    pub invader_gap_x: f64,
    pub invader_gap_y: f64,
    pub invader_origin_x: f64,
    pub invader_origin_y: f64,
    pub drop_distance: f64,
    pub points_per_hit: u32,
    pub base_speed: f64,
    pub speed_step: f64,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        ArcadeConfig {
            field_width: 600.0,
            field_height: 400.0,
            player_width: 40.0,
            player_height: 20.0,
            player_y: 360.0,
            player_speed: 6.0,
            bullet_width: 4.0,
            bullet_height: 10.0,
            bullet_speed: 8.0,
            invader_cols: 8,
            invader_rows: 4,
            invader_width: 30.0,
            invader_height: 20.0,
            invader_gap_x: 20.0,
            invader_gap_y: 15.0,
            invader_origin_x: 40.0,
            invader_origin_y: 40.0,
            drop_distance: 20.0,
            points_per_hit: 10,
            base_speed: 1.0,
            speed_step: 0.15,
        }
    }
}

impl ArcadeConfig {
    pub fn invader_count(&self) -> usize {
        self.invader_cols * self.invader_rows
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invader {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub player_x: f64,
    pub bullets: Vec<Bullet>,
    pub invaders: Vec<Invader>,
    /// +1 marching right, -1 marching left.
    pub direction: f64,
    pub speed: f64,
    pub score: u32,
    pub game_over: bool,
    pub victory: bool,
    /// Set while fire is held after a shot; cleared on release.
    pub fire_latched: bool,
    pub ticks: u64,
}

impl GameState {
    pub fn new(config: &ArcadeConfig) -> Self {
        let mut invaders = Vec::with_capacity(config.invader_count());
        for row in 0..config.invader_rows {
            for col in 0..config.invader_cols {
                invaders.push(Invader {
                    id: row * config.invader_cols + col,
                    x: config.invader_origin_x
                        + col as f64 * (config.invader_width + config.invader_gap_x),
                    y: config.invader_origin_y
                        + row as f64 * (config.invader_height + config.invader_gap_y),
                    alive: true,
                });
            }
        }

        GameState {
            player_x: (config.field_width - config.player_width) / 2.0,
            bullets: Vec::new(),
            invaders,
            direction: 1.0,
            speed: config.base_speed,
            score: 0,
            game_over: false,
            victory: false,
            fire_latched: false,
            ticks: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.game_over || self.victory
    }

    pub fn phase(&self) -> Phase {
        if self.victory {
            Phase::Victory
        } else if self.game_over {
            Phase::Defeat
        } else {
            Phase::Running
        }
    }

    pub fn alive_count(&self) -> usize {
        self.invaders.iter().filter(|i| i.alive).count()
    }

    fn living(&self) -> impl Iterator<Item = &Invader> {
        self.invaders.iter().filter(|i| i.alive)
    }
}

pub fn reduce(state: &GameState, input: Input, config: &ArcadeConfig) -> GameState {
    if state.is_terminal() {
        return state.clone();
    }
    let mut next = state.clone();
    next.ticks += 1;

    // Player.
    let dx = (input.right as i8 - input.left as i8) as f64 * config.player_speed;
    next.player_x = (next.player_x + dx).clamp(0.0, config.field_width - config.player_width);

    // Bullets in flight.
    for bullet in &mut next.bullets {
        bullet.y -= config.bullet_speed;
    }
    next.bullets.retain(|b| b.y + config.bullet_height > 0.0);

    // Firing.
    if input.fire {
        if !next.fire_latched {
            next.bullets.push(Bullet {
                x: next.player_x + (config.player_width - config.bullet_width) / 2.0,
                y: config.player_y - config.bullet_height,
            });
            next.fire_latched = true;
        }
    } else {
        next.fire_latched = false;
    }

    // Invader march: flip and drop at the edges, otherwise step sideways.
    let step = next.direction * next.speed;
    let extent = next.living().fold(None, |acc: Option<(f64, f64)>, inv| {
        let right = inv.x + config.invader_width;
        Some(match acc {
            Some((lo, hi)) => (lo.min(inv.x), hi.max(right)),
            None => (inv.x, right),
        })
    });
    if let Some((left, right)) = extent {
        let hits_edge = left + step < 0.0 || right + step > config.field_width;
        for inv in next.invaders.iter_mut().filter(|i| i.alive) {
            if hits_edge {
                inv.y += config.drop_distance;
            } else {
                inv.x += step;
            }
        }
        if hits_edge {
            next.direction = -next.direction;
        }
    }

    // Hits: the first overlapping invader per bullet.
    let mut survivors = Vec::with_capacity(next.bullets.len());
    for bullet in next.bullets.drain(..) {
        let hit = next
            .invaders
            .iter_mut()
            .find(|inv| inv.alive && overlaps(&bullet, inv, config));
        match hit {
            Some(inv) => {
                inv.alive = false;
                next.score += config.points_per_hit;
            }
            None => survivors.push(bullet),
        }
    }
    next.bullets = survivors;

    let alive = next.alive_count();
    let destroyed = next.invaders.len() - alive;
    next.speed = config.base_speed + config.speed_step * destroyed as f64;

    if alive == 0 {
        next.victory = true;
    } else if next
        .living()
        .any(|inv| inv.y + config.invader_height >= config.player_y)
    {
        next.game_over = true;
    }

    next
}

fn overlaps(bullet: &Bullet, inv: &Invader, config: &ArcadeConfig) -> bool {
    bullet.x < inv.x + config.invader_width
        && bullet.x + config.bullet_width > inv.x
        && bullet.y < inv.y + config.invader_height
        && bullet.y + config.bullet_height > inv.y
}

/// Deterministic input source: steer under the lowest living invader and
/// tap fire whenever lined up.
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    fired_last_tick: bool,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_input(&mut self, state: &GameState, config: &ArcadeConfig) -> Input {
        let Some(target) = state
            .invaders
            .iter()
            .filter(|i| i.alive)
            .max_by(|a, b| a.y.total_cmp(&b.y).then(b.x.total_cmp(&a.x)))
        else {
            return Input::default();
        };

        let aim = target.x + config.invader_width / 2.0;
        let muzzle = state.player_x + config.player_width / 2.0;
        let tolerance = config.invader_width / 2.0;

        let mut input = Input {
            left: muzzle > aim + tolerance / 2.0,
            right: muzzle < aim - tolerance / 2.0,
            fire: false,
        };
        if (muzzle - aim).abs() <= tolerance && !self.fired_last_tick {
            input.fire = true;
        }
        self.fired_last_tick = input.fire;
        input
    }
}
