//! Static registry of named cell patterns.
//!
//! Each pattern is a fixed set of relative `(x, y)` offsets marking live
//! cells. The registry is read-only data resolved at compile time; lookup is
//! by exact, case-sensitive name and unknown names yield a typed `None`
//! rather than an error.

/// A named set of relative live-cell coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(u16, u16)],
}

impl Pattern {
    /// Bounding extent: the maximum relative x and y across all cells.
    pub fn extent(&self) -> (u16, u16) {
        let max_x = self.cells.iter().map(|c| c.0).max().unwrap_or(0);
        let max_y = self.cells.iter().map(|c| c.1).max().unwrap_or(0);
        (max_x, max_y)
    }
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "blinker",
        cells: &[(1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "toad",
        cells: &[(1, 1), (2, 1), (3, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "pulsar",
        cells: &[
            // Top edge
            (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
            (0, 2), (5, 2), (7, 2), (12, 2),
            (0, 3), (5, 3), (7, 3), (12, 3),
            (0, 4), (5, 4), (7, 4), (12, 4),
            (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
            // Mirrored lower half
            (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
            (0, 8), (5, 8), (7, 8), (12, 8),
            (0, 9), (5, 9), (7, 9), (12, 9),
            (0, 10), (5, 10), (7, 10), (12, 10),
            (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
        ],
    },
    Pattern {
        name: "gosper_glider_gun",
        cells: &[
            // Left block
            (0, 4), (0, 5), (1, 4), (1, 5),
            // First assembly
            (10, 4), (10, 5), (10, 6),
            (11, 3), (11, 7),
            (12, 2), (12, 8),
            (13, 2), (13, 8),
            (14, 5),
            (15, 3), (15, 7),
            (16, 4), (16, 5), (16, 6),
            (17, 5),
            // Right assembly
            (20, 2), (20, 3), (20, 4),
            (21, 2), (21, 3), (21, 4),
            (22, 1), (22, 5),
            (24, 0), (24, 1), (24, 5), (24, 6),
            // Right block
            (34, 2), (34, 3), (35, 2), (35, 3),
        ],
    },
    Pattern {
        name: "diehard",
        cells: &[
            (6, 0),
            (0, 1), (1, 1),
            (1, 2), (5, 2), (6, 2), (7, 2),
        ],
    },
    Pattern {
        name: "acorn",
        cells: &[
            (1, 0),
            (3, 1),
            (0, 2), (1, 2), (4, 2), (5, 2), (6, 2),
        ],
    },
    Pattern {
        name: "lightweight_spaceship",
        cells: &[
            (1, 0), (4, 0),
            (0, 1),
            (0, 2), (4, 2),
            (0, 3), (1, 3), (2, 3), (3, 3),
        ],
    },
    Pattern {
        name: "r_pentomino",
        cells: &[
            (1, 0), (2, 0),
            (0, 1), (1, 1),
            (1, 2),
        ],
    },
    Pattern {
        name: "infinite_growth",
        cells: &[
            (0, 4), (0, 5), (1, 4), (1, 5),
            (10, 4), (10, 5), (10, 6),
            (11, 3), (11, 7),
            (12, 2), (12, 8),
            (13, 2), (13, 8),
            (14, 5),
            (15, 3), (15, 7),
            (16, 4), (16, 5), (16, 6),
            (17, 5),
            (20, 2), (20, 3), (20, 4), (21, 2), (21, 3), (21, 4),
            (22, 1), (22, 5),
            (24, 0), (24, 1), (24, 5), (24, 6),
        ],
    },
    Pattern {
        name: "glider_gun",
        cells: &[
            (0, 4), (0, 5), (1, 4), (1, 5),
            (10, 4), (10, 5), (10, 6),
            (11, 3), (11, 7),
            (12, 2), (12, 8),
            (13, 2), (13, 8),
            (14, 5),
            (15, 3), (15, 7),
            (16, 4), (16, 5), (16, 6),
            (17, 5),
            (20, 2), (20, 3), (20, 4), (21, 2), (21, 3), (21, 4),
            (22, 1), (22, 5),
            (24, 0), (24, 1), (24, 5), (24, 6),
            (34, 2), (34, 3), (35, 2), (35, 3),
        ],
    },
    Pattern {
        name: "line_puffer",
        cells: &[
            (0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0),
            (0, 1), (6, 1),
            (6, 2),
            (0, 3), (5, 3),
            (0, 4), (1, 4), (2, 4), (3, 4), (4, 4),
        ],
    },
];

/// Looks up a pattern by exact name.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name == name)
}

/// All registered pattern names, in registry order.
pub fn names() -> Vec<&'static str> {
    PATTERNS.iter().map(|p| p.name).collect()
}
