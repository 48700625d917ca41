//! Built-in levels.
//!
//! `W` wall, `P` player, `B` crate, `G` goal, `.` floor.
//!
//! [`builtin`] is the play rotation. [`fixtures`] holds extra maps for tests
//! and demos that are not part of it.

use crate::level::LevelMap;

const HAZEL_START: &[&str] = &[
    "WWWWWWW",
    "W.....W",
    "W.PBW.W",
    "W.....W",
    "WWWWWWW",
];

const TUTORIAL: &[&str] = &[
    "WWWWWWWWWW",
    "W........W",
    "WG....B.PW",
    "W........W",
    "WWWWWWWWWW",
];

const TUTORIAL_ANGLED: &[&str] = &[
    "WWWWWWWWWW",
    "W........W",
    "W.....B.PW",
    "WG.......W",
    "WWWWWWWWWW",
];

const TWO_CRATES: &[&str] = &[
    "WWWWWWWWWW",
    "WG.......W",
    "WB....B.PW",
    "WG.......W",
    "WWWWWWWWWW",
];

const BASIC_1: &[&str] = &[
    "WWWWWWWWWW",
    "W...WW...W",
    "W.B..W...W",
    "W....W...W",
    "W........W",
    "WGWWWWW.PW",
    "WWW......W",
    "W....B...W",
    "WG.......W",
    "WWWWWWWWWW",
];

const HAZEL: &[&str] = &[
    "WWWWWWWWWW",
    "W.......PW",
    "W........W",
    "W..W..W..W",
    "W..WG.W..W",
    "W.BWWWWB.W",
    "W..W.GW..W",
    "W..W..W..W",
    "W........W",
    "W........W",
    "WWWWWWWWWW",
];

const SPIRAL: &[&str] = &[
    "WWWWWWWWWW",
    "W.....WPWW",
    "W.....WBWW",
    "W..W..W..W",
    "W..W..W..W",
    "W..W.GW..W",
    "W..WWWW..W",
    "W........W",
    "W........W",
    "WWWWWWWWWW",
];

const STAR: &[&str] = &[
    "WWWWWWWWWW",
    "WG..WW..GW",
    "W......P.W",
    "W........W",
    "WW..BB..WW",
    "WW..BB..WW",
    "W........W",
    "W........W",
    "WG..WW..GW",
    "WWWWWWWWWW",
];

const BASIC_2: &[&str] = &[
    "WWWWWWWWWW",
    "W...WW...W",
    "W.B..W...W",
    "W..W.W...W",
    "W..W.....W",
    "WGWWWWW.PW",
    "WWW......W",
    "WG..BB...W",
    "WG.......W",
    "WWWWWWWWWW",
];

const BIG_SPIRAL: &[&str] = &[
    "WWWWWWWWWW",
    "W.....WPWW",
    "W.....WBWW",
    "W.BW..W..W",
    "W..WGGW..W",
    "W..WGGW..W",
    "W..WWWWB.W",
    "W..B.....W",
    "W........W",
    "WWWWWWWWWW",
];

const MIRROR: &[&str] = &[
    "WWWWWWWWWW",
    "W........W",
    "WG....B.PW",
    "W........W",
    "WWWWWWWWWW",
    "W........W",
    "WG....B.PW",
    "W........W",
    "WWWWWWWWWW",
];

const HARD: &[&str] = &[
    "WWWWWWWWWW",
    "WG.......W",
    "WG.WBB..PW",
    "WG..B....W",
    "W..WWWWW.W",
    "WWWWWWWW.W",
    "W..GGWG..W",
    "W......B.W",
    "WW.W.WBB.W",
    "WW.......W",
    "WWWWWWWWWW",
];

const HAZEL_CUSTOM_1: &[&str] = &[
    "WWWWWWWWWW",
    "W........W",
    "W..G.....W",
    "W........W",
    "W..G...B.W",
    "W......W.W",
    "W.W......W",
    "W.B..P...W",
    "W........W",
    "WWWWWWWWWW",
];

const HAZEL_CUSTOM_2: &[&str] = &[
    "WWWWWWWWWW",
    "WWWW.....W",
    "WWWW.B.G.W",
    "WWWW.....W",
    "W........W",
    "W....P.W.W",
    "W........W",
    "W.G..WB..W",
    "W........W",
    "WWWWWWWWWW",
];

const HAZEL_CUSTOM_3: &[&str] = &[
    "WWWWWWWWWWWWW",
    "W..G.G.....GW",
    "W........P..W",
    "W..BBB......W",
    "W...........W",
    "WWWWWWWWWWWWW",
    "W...........W",
    "W....BBB.G..W",
    "W..G.WWWP...W",
    "W.........G.W",
    "WWWWWWWWWWWWW",
];

const HAZEL_CUSTOM_4: &[&str] = &[
    "WWWWWWWWW",
    "W.......W",
    "W.B.....W",
    "W.W.G...W",
    "W....B..W",
    "W....W.PW",
    "W..G....W",
    "WWWWWWWWW",
];

const HAZEL_CUSTOM_5: &[&str] = &[
    "WWWWWWWWWW",
    "W........W",
    "W.B..B...W",
    "W...G....W",
    "W....P...W",
    "W....B.G.W",
    "W........W",
    "W...G....W",
    "W........W",
    "WWWWWWWWWW",
];

const HAZEL_CUSTOM_6: &[&str] = &[
    "WWWWWWWWWW",
    "W.....G..W",
    "W..G.P...W",
    "W........W",
    "W.B......W",
    "W......B.W",
    "W........W",
    "WWWWWWWWWW",
];

const HAZEL_CUSTOM_7: &[&str] = &[
    "WWWWWWWWW",
    "W.......W",
    "W.GBP.B.W",
    "W...B.G.W",
    "W..G....W",
    "WWWWWWWWW",
];

// -- fixtures outside the rotation ---------------------------------------

/// Two players in separate corridors, both solved by walking right.
const TWINS: &[&str] = &[
    "WWWWWWWWW",
    "WP.B..G.W",
    "WWWWWWWWW",
    "WP.B..G.W",
    "WWWWWWWWW",
];

const BLANK: &[&str] = &[
    "WWWWWWWWWW",
    "W........W",
    "W........W",
    "W........W",
    "W........W",
    "W........W",
    "W........W",
    "W........W",
    "W........W",
    "WWWWWWWWWW",
];

const LEVELS: &[(&str, &[&str])] = &[
    ("hazel_start", HAZEL_START),
    ("tutorial", TUTORIAL),
    ("tutorial_angled", TUTORIAL_ANGLED),
    ("two_crates", TWO_CRATES),
    ("basic_1", BASIC_1),
    ("hazel", HAZEL),
    ("spiral", SPIRAL),
    ("star", STAR),
    ("basic_2", BASIC_2),
    ("big_spiral", BIG_SPIRAL),
    ("mirror", MIRROR),
    ("hard", HARD),
    ("hazel_custom_1", HAZEL_CUSTOM_1),
    ("hazel_custom_2", HAZEL_CUSTOM_2),
    ("hazel_custom_3", HAZEL_CUSTOM_3),
    ("hazel_custom_4", HAZEL_CUSTOM_4),
    ("hazel_custom_5", HAZEL_CUSTOM_5),
    ("hazel_custom_6", HAZEL_CUSTOM_6),
    ("hazel_custom_7", HAZEL_CUSTOM_7),
];

const FIXTURES: &[(&str, &[&str])] = &[("twins", TWINS), ("blank", BLANK)];

fn parse_all(levels: &[(&str, &[&str])]) -> Vec<LevelMap> {
    levels
        .iter()
        .map(|(name, rows)| {
            LevelMap::parse(*name, rows).expect("built-in maps should always be rectangular")
        })
        .collect()
}

/// Every built-in level, in play order.
pub fn builtin() -> Vec<LevelMap> {
    parse_all(LEVELS)
}

/// Maps outside the rotation: `twins` (two players) and `blank` (walls only).
pub fn fixtures() -> Vec<LevelMap> {
    parse_all(FIXTURES)
}

/// The built-in level or fixture called `name`.
pub fn by_name(name: &str) -> Option<LevelMap> {
    builtin()
        .into_iter()
        .chain(fixtures())
        .find(|map| map.name() == name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::level::Level;

    #[test]
    fn every_builtin_loads_unsolved() {
        for map in builtin() {
            let level = Level::load(&map, GameConfig::default()).unwrap();
            assert!(!level.players().is_empty(), "{} has no player", map.name());
            assert!(!level.is_won().unwrap(), "{} starts solved", map.name());
        }
    }

    #[test]
    fn rotation_order() {
        let names: Vec<String> = builtin().iter().map(|m| m.name().to_owned()).collect();
        assert_eq!(names.len(), 19);
        assert_eq!(names[..4], ["hazel_start", "tutorial", "tutorial_angled", "two_crates"]);
        assert_eq!(names.last().map(String::as_str), Some("hazel_custom_7"));
        assert!(!names.iter().any(|n| n == "twins" || n == "blank"));
    }

    #[test]
    fn blank_fixture_has_only_walls_and_floor() {
        let level = Level::load(&by_name("blank").unwrap(), GameConfig::default()).unwrap();
        assert!(level.players().is_empty());
        assert!(level.crates().is_empty());
        assert_eq!((level.grid().width(), level.grid().height()), (10, 10));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("twins").unwrap().height(), 5);
        assert!(by_name("missing").is_none());
    }
}
