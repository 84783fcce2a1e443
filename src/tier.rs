// Size tiers selected from the input file's base name

use std::path::Path;

/// Which size bundle a graph is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    Default,
    Medium,
    Large,
}

/// Figure size in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

/// Rendering parameters for one tier.
///
/// `node_size` is a marker area in points squared; `font_size` and
/// `arrow_size` are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTier {
    pub kind: TierKind,
    pub figure: FigureSize,
    pub node_size: f64,
    pub font_size: f64,
    pub arrow_size: f64,
}

impl RenderTier {
    pub const DEFAULT: RenderTier = RenderTier {
        kind: TierKind::Default,
        figure: FigureSize {
            width: 12.0,
            height: 12.0,
        },
        node_size: 2000.0,
        font_size: 8.0,
        arrow_size: 20.0,
    };

    pub const MEDIUM: RenderTier = RenderTier {
        kind: TierKind::Medium,
        figure: FigureSize {
            width: 20.0,
            height: 20.0,
        },
        node_size: 2500.0,
        font_size: 9.0,
        // medium keeps the default arrowhead
        arrow_size: 20.0,
    };

    pub const LARGE: RenderTier = RenderTier {
        kind: TierKind::Large,
        figure: FigureSize {
            width: 35.0,
            height: 35.0,
        },
        node_size: 1500.0,
        font_size: 7.0,
        arrow_size: 15.0,
    };
}

/// Pick the tier for a base name. `"medium"` is checked before `"large"`.
pub fn select_tier(base_name: &str) -> RenderTier {
    if base_name.contains("medium") {
        RenderTier::MEDIUM
    } else if base_name.contains("large") {
        RenderTier::LARGE
    } else {
        RenderTier::DEFAULT
    }
}

/// File name with its extension removed (`"dir/medium.gph"` -> `"medium"`)
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_by_substring() {
        assert_eq!(select_tier("medium_v1").kind, TierKind::Medium);
        assert_eq!(select_tier("large_graph").kind, TierKind::Large);
        assert_eq!(select_tier("small").kind, TierKind::Default);
        assert_eq!(select_tier("").kind, TierKind::Default);
    }

    #[test]
    fn test_medium_wins_over_large() {
        assert_eq!(select_tier("large_medium").kind, TierKind::Medium);
        assert_eq!(select_tier("medium_large").kind, TierKind::Medium);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(select_tier("MEDIUM").kind, TierKind::Default);
        assert_eq!(select_tier("Large").kind, TierKind::Default);
    }

    #[test]
    fn test_tier_table() {
        let d = select_tier("small");
        assert_eq!((d.figure.width, d.figure.height), (12.0, 12.0));
        assert_eq!((d.node_size, d.font_size, d.arrow_size), (2000.0, 8.0, 20.0));

        let m = select_tier("medium");
        assert_eq!((m.figure.width, m.figure.height), (20.0, 20.0));
        assert_eq!((m.node_size, m.font_size, m.arrow_size), (2500.0, 9.0, 20.0));

        let l = select_tier("large");
        assert_eq!((l.figure.width, l.figure.height), (35.0, 35.0));
        assert_eq!((l.node_size, l.font_size, l.arrow_size), (1500.0, 7.0, 15.0));
    }

    #[test]
    fn test_base_name_strips_extension() {
        assert_eq!(base_name(Path::new("graphs/medium.gph")), "medium");
        assert_eq!(base_name(Path::new("small")), "small");
    }
}
