//! UCI info line parsing.

use serde::{Deserialize, Serialize};

/// Score in centipawns or mate distance, from the side to move's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = side to move mates, negative = gets mated).
    Mate(i32),
}

impl Score {
    /// The same score seen from the other side.
    pub fn negate(self) -> Self {
        match self {
            Score::Cp(cp) => Score::Cp(-cp),
            Score::Mate(m) => Score::Mate(-m),
        }
    }
}

/// Search information from engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Selective search depth.
    pub seldepth: Option<u32>,
    /// 1-based rank of this line when MultiPV is above 1.
    pub multipv: Option<u32>,
    /// Score evaluation.
    pub score: Option<Score>,
    /// The score is only a lower or upper bound.
    pub bound: bool,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Nodes per second.
    pub nps: Option<u64>,
    /// Time spent in milliseconds.
    pub time: Option<u64>,
    /// Principal variation (best line found).
    pub pv: Vec<String>,
    /// Arbitrary string info.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Parse UCI info line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut parts = line.split_whitespace().peekable();
        if parts.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::default();

        while let Some(keyword) = parts.next() {
            match keyword {
                "depth" => info.depth = parts.next().and_then(|v| v.parse().ok()),
                "seldepth" => info.seldepth = parts.next().and_then(|v| v.parse().ok()),
                "multipv" => info.multipv = parts.next().and_then(|v| v.parse().ok()),
                "nodes" => info.nodes = parts.next().and_then(|v| v.parse().ok()),
                "nps" => info.nps = parts.next().and_then(|v| v.parse().ok()),
                "time" => info.time = parts.next().and_then(|v| v.parse().ok()),
                "score" => {
                    let kind = parts.next();
                    let value = parts.next().and_then(|v| v.parse().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => None,
                    };
                    if let Some(&("lowerbound" | "upperbound")) = parts.peek() {
                        info.bound = true;
                        parts.next();
                    }
                }
                "pv" => {
                    // Collect all remaining moves until another keyword or end
                    while let Some(mv) = parts.next_if(|p| !is_info_keyword(p)) {
                        info.pv.push(mv.to_string());
                    }
                }
                "string" => {
                    // String consumes rest of line
                    info.string = Some(parts.by_ref().collect::<Vec<_>>().join(" "));
                }
                _ => {}
            }
        }

        Some(info)
    }

    /// The line's rank, treating a missing `multipv` field as the top line.
    pub fn rank(&self) -> u32 {
        self.multipv.unwrap_or(1)
    }

    /// True for lines that carry an exact score and a principal variation.
    pub fn is_scored_line(&self) -> bool {
        self.score.is_some() && !self.bound && !self.pv.is_empty()
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth"
            | "seldepth"
            | "multipv"
            | "score"
            | "nodes"
            | "nps"
            | "time"
            | "pv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "tbhits"
            | "cpuload"
            | "string"
    )
}
