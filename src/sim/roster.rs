//! Fixed racer roster

use serde::Serialize;

/// Static identity of one racer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RacerProfile {
    /// Racer id, 1-8
    pub id: u8,
    pub name: &'static str,
    /// CSS color, used by the DOM overlay
    pub css: &'static str,
    /// Linear RGBA, used by the renderer
    pub color: [f32; 4],
    pub emoji: &'static str,
}

/// Convert a packed 0xRRGGBB value to an opaque RGBA color
const fn rgb(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// The eight racers, ordered by id
pub const ROSTER: [RacerProfile; 8] = [
    RacerProfile { id: 1, name: "Red Shift", css: "#ff4d4f", color: rgb(0xff4d4f), emoji: "🔴" },
    RacerProfile { id: 2, name: "Blue Streak", css: "#1890ff", color: rgb(0x1890ff), emoji: "🔵" },
    RacerProfile { id: 3, name: "Lime Ghost", css: "#a0d911", color: rgb(0xa0d911), emoji: "🟢" },
    RacerProfile { id: 4, name: "Golden Gallop", css: "#ffc53d", color: rgb(0xffc53d), emoji: "🟡" },
    RacerProfile { id: 5, name: "Cyan Comet", css: "#597ef7", color: rgb(0x597ef7), emoji: "🧊" },
    RacerProfile { id: 6, name: "Violet Venom", css: "#722ed1", color: rgb(0x722ed1), emoji: "🟣" },
    RacerProfile { id: 7, name: "Orange Fury", css: "#fa8c16", color: rgb(0xfa8c16), emoji: "🟠" },
    RacerProfile { id: 8, name: "Pink Phantom", css: "#eb2f96", color: rgb(0xeb2f96), emoji: "🌸" },
];

/// Look up a profile by racer id
pub fn profile(id: u8) -> Option<&'static RacerProfile> {
    ROSTER.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_roster_ids_unique_and_sequential() {
        let ids: HashSet<u8> = ROSTER.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 8);
        for (i, p) in ROSTER.iter().enumerate() {
            assert_eq!(p.id as usize, i + 1);
        }
    }

    #[test]
    fn test_profile_lookup() {
        assert_eq!(profile(3).map(|p| p.name), Some("Lime Ghost"));
        assert!(profile(0).is_none());
        assert!(profile(9).is_none());
    }

    #[test]
    fn test_rgb_unpacks_channels() {
        let red = profile(1).unwrap().color;
        assert!((red[0] - 1.0).abs() < 1e-6);
        assert!((red[1] - 0x4d as f32 / 255.0).abs() < 1e-6);
        assert!((red[3] - 1.0).abs() < 1e-6);
    }
}
