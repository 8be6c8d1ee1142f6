use glam::Vec3;

/// How the observer moves during a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Stay at `start` and edit one block per frame near the observer.
    Stationary,
    /// Move by `velocity` camera units per frame.
    Linear { velocity: Vec3 },
    /// Circle around `start` in the XZ plane.
    Orbit { radius: f32, frames_per_turn: u32 },
    /// Jump by `offset` every `interval` frames.
    Teleport { offset: Vec3, interval: u32 },
}

/// Configuration for a single walk scene.
pub struct SceneConfig {
    pub name: &'static str,
    /// Camera-space start position.
    pub start: Vec3,
    pub motion: Motion,
    /// Place a block next to the observer every frame.
    pub edits: bool,
}

impl SceneConfig {
    /// Camera-space observer position at `frame`.
    pub fn position_at(&self, frame: u32) -> Vec3 {
        match self.motion {
            Motion::Stationary => self.start,
            Motion::Linear { velocity } => self.start + velocity * frame as f32,
            Motion::Orbit {
                radius,
                frames_per_turn,
            } => {
                let turns = frame as f32 / frames_per_turn.max(1) as f32;
                let angle = turns * std::f32::consts::TAU;
                self.start + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
            }
            Motion::Teleport { offset, interval } => {
                let jumps = frame / interval.max(1);
                self.start + offset * jumps as f32
            }
        }
    }
}

/// Return the standard suite of walk scenes.
pub fn standard_scenes() -> Vec<SceneConfig> {
    let start = Vec3::new(8.0, 24.0, 8.0);
    vec![
        SceneConfig {
            name: "idle",
            start,
            motion: Motion::Stationary,
            edits: false,
        },
        SceneConfig {
            name: "edit",
            start,
            motion: Motion::Stationary,
            edits: true,
        },
        SceneConfig {
            name: "walk",
            start,
            motion: Motion::Linear {
                velocity: Vec3::new(2.0, 0.0, 0.5),
            },
            edits: false,
        },
        SceneConfig {
            name: "orbit",
            start,
            motion: Motion::Orbit {
                radius: 96.0,
                frames_per_turn: 120,
            },
            edits: true,
        },
        SceneConfig {
            name: "teleport",
            start,
            motion: Motion::Teleport {
                offset: Vec3::new(-1024.0, 0.0, 512.0),
                interval: 30,
            },
            edits: false,
        },
    ]
}
