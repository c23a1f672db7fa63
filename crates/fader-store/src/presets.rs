#![forbid(unsafe_code)]

//! Built-in preset scenarios.
//!
//! Each preset is a complete, already-balanced starting point for a common
//! allocation exercise. The catalog is static data; loading one clones it
//! into a live [`Scenario`].

use fader_core::{DEFAULT_PALETTE, Scenario};

/// One entity row inside a preset.
#[derive(Debug, Clone, Copy)]
pub struct PresetEntity {
    pub label: &'static str,
    pub value: u32,
    pub locked: bool,
    pub color: &'static str,
}

/// A named, balanced starting scenario.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    /// Stable identifier, usable as a CLI argument or persistence key.
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub entities: &'static [PresetEntity],
}

impl Preset {
    /// Instantiate the preset as a live scenario.
    #[must_use]
    pub fn to_scenario(&self) -> Scenario {
        Scenario::new(
            self.entities.iter().map(|e| e.value).collect(),
            self.entities.iter().map(|e| e.locked).collect(),
            self.entities.iter().map(|e| e.label.to_string()).collect(),
            self.entities.iter().map(|e| e.color.to_string()).collect(),
            self.unit,
        )
    }
}

/// Look up a preset by its stable id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// The built-in preset catalog.
pub const PRESETS: &[Preset] = &[
    Preset {
        id: "family-work-balance",
        name: "Family vs Work (Three Kids)",
        description: "Balance time between children, work, and essential rest",
        unit: "Time",
        entities: &[
            PresetEntity { label: "Kid A", value: 25, locked: false, color: DEFAULT_PALETTE[0] },
            PresetEntity { label: "Kid B", value: 20, locked: false, color: DEFAULT_PALETTE[1] },
            PresetEntity { label: "Kid C", value: 15, locked: false, color: DEFAULT_PALETTE[2] },
            PresetEntity { label: "Work", value: 25, locked: false, color: DEFAULT_PALETTE[3] },
            PresetEntity { label: "Sleep", value: 15, locked: true, color: DEFAULT_PALETTE[4] },
        ],
    },
    Preset {
        id: "screen-time-split",
        name: "2-Hour Screen Time Split",
        description: "Allocate screen time across entertainment and learning",
        unit: "Screen Time",
        entities: &[
            PresetEntity { label: "Movie", value: 50, locked: false, color: DEFAULT_PALETTE[0] },
            PresetEntity { label: "Minecraft", value: 30, locked: false, color: DEFAULT_PALETTE[1] },
            PresetEntity { label: "YouTube", value: 15, locked: false, color: DEFAULT_PALETTE[2] },
            PresetEntity { label: "Reading", value: 5, locked: false, color: DEFAULT_PALETTE[3] },
        ],
    },
    Preset {
        id: "work-life-juggle",
        name: "Work-Life Juggle",
        description: "Balance full-time job, side projects, and personal life",
        unit: "Time",
        entities: &[
            PresetEntity { label: "Full-time Job", value: 45, locked: false, color: DEFAULT_PALETTE[0] },
            PresetEntity { label: "Side Hustle", value: 15, locked: false, color: DEFAULT_PALETTE[1] },
            PresetEntity { label: "Family", value: 20, locked: false, color: DEFAULT_PALETTE[2] },
            PresetEntity { label: "Sleep", value: 20, locked: false, color: DEFAULT_PALETTE[3] },
        ],
    },
    Preset {
        id: "health-social-study",
        name: "Health • Social • Study",
        description: "Distribute energy across fitness, relationships, and learning",
        unit: "Energy",
        entities: &[
            PresetEntity { label: "Fitness", value: 30, locked: false, color: DEFAULT_PALETTE[0] },
            PresetEntity { label: "Meal Prep", value: 15, locked: false, color: DEFAULT_PALETTE[1] },
            PresetEntity { label: "Social Life", value: 20, locked: false, color: DEFAULT_PALETTE[2] },
            PresetEntity { label: "Study", value: 35, locked: false, color: DEFAULT_PALETTE[3] },
        ],
    },
    Preset {
        id: "creative-sprint",
        name: "Creative Sprint",
        description: "Allocate focus across creative projects and admin tasks",
        unit: "Focus",
        entities: &[
            PresetEntity { label: "Writing", value: 35, locked: false, color: DEFAULT_PALETTE[0] },
            PresetEntity { label: "Music", value: 25, locked: false, color: DEFAULT_PALETTE[1] },
            PresetEntity { label: "Visual Design", value: 25, locked: false, color: DEFAULT_PALETTE[2] },
            PresetEntity { label: "Admin", value: 15, locked: false, color: DEFAULT_PALETTE[3] },
        ],
    },
    Preset {
        id: "care-factor-meter",
        name: "Care Factor Meter",
        description: "Measure how much you care about different aspects of life",
        unit: "Care",
        entities: &[
            PresetEntity { label: "News", value: 10, locked: false, color: DEFAULT_PALETTE[0] },
            PresetEntity { label: "Social Media", value: 10, locked: false, color: DEFAULT_PALETTE[1] },
            PresetEntity { label: "Office Politics", value: 5, locked: false, color: DEFAULT_PALETTE[2] },
            PresetEntity { label: "Family", value: 40, locked: false, color: DEFAULT_PALETTE[3] },
            PresetEntity { label: "Self", value: 35, locked: false, color: DEFAULT_PALETTE[4] },
        ],
    },
];
