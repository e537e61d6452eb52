use voicedrone_core::MarkerColor;

/// Fixed mapping from spoken direction to marker colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorDirectionMap;

impl ColorDirectionMap {
    const ENTRIES: [(&'static str, MarkerColor); 6] = [
        ("front", MarkerColor::Cyan),
        ("left", MarkerColor::Yellow),
        ("right", MarkerColor::Magenta),
        ("back", MarkerColor::Blue),
        ("up", MarkerColor::Green),
        ("down", MarkerColor::Red),
    ];

    /// Colour for `direction`, or `None` if the word is not a direction.
    pub fn color_for(&self, direction: &str) -> Option<MarkerColor> {
        Self::ENTRIES
            .iter()
            .find(|(word, _)| *word == direction)
            .map(|(_, color)| *color)
    }

    pub fn directions(&self) -> impl Iterator<Item = &'static str> {
        Self::ENTRIES.iter().map(|(word, _)| *word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicedrone_core::vocabulary::DIRECTIONS;

    #[test]
    fn test_every_direction_has_a_color() {
        let map = ColorDirectionMap;
        for direction in DIRECTIONS {
            assert!(map.color_for(direction).is_some(), "{direction} unmapped");
        }
        assert_eq!(map.directions().count(), DIRECTIONS.len());
    }

    #[test]
    fn test_known_colors() {
        let map = ColorDirectionMap;
        assert_eq!(map.color_for("front"), Some(MarkerColor::Cyan));
        assert_eq!(map.color_for("left"), Some(MarkerColor::Yellow));
        assert_eq!(map.color_for("right"), Some(MarkerColor::Magenta));
        assert_eq!(map.color_for("back"), Some(MarkerColor::Blue));
        assert_eq!(map.color_for("up"), Some(MarkerColor::Green));
        assert_eq!(map.color_for("down"), Some(MarkerColor::Red));
    }

    #[test]
    fn test_unknown_direction_is_none() {
        let map = ColorDirectionMap;
        assert_eq!(map.color_for("purple"), None);
        assert_eq!(map.color_for(""), None);
        assert_eq!(map.color_for("Left"), None);
    }
}
