//! Text and JSON rendering of a review.

use std::fmt::Write;

use chess_analysis::{BestLine, MistakeRecord};
use chess_core::Side;
use serde::Serialize;

use crate::{GameReview, Insights};

/// Move label in the usual notation: `12.` for White, `12...` for Black.
pub fn move_label(move_number: u32, side: Side) -> String {
    match side {
        Side::White => format!("{}.", move_number),
        Side::Black => format!("{}...", move_number),
    }
}

fn write_record(out: &mut String, record: &MistakeRecord) {
    let _ = writeln!(
        out,
        "  {} {:<8} {:+.2}  (eval {})",
        move_label(record.move_number, record.side),
        record.san,
        record.delta,
        record.evaluation
    );
}

/// The human-readable report printed by `analyze`.
pub fn render_text(review: &GameReview, insights: Option<&Insights>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "White: {}", review.white);
    let _ = writeln!(out, "Black: {}", review.black);
    let _ = writeln!(
        out,
        "Player: {} ({})",
        review.player,
        review.tracked_side.as_str()
    );
    let _ = writeln!(out, "Accuracy: {:.1}%", review.accuracy.percent());

    if review.buckets.is_empty() {
        let _ = writeln!(out, "\nNo mistakes found.");
    }
    for (name, bucket) in review.buckets.named() {
        if bucket.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\nMistakes ({}):", name);
        for record in bucket {
            write_record(&mut out, record);
        }
    }

    if let Some(insights) = insights {
        render_insights(&mut out, insights);
    }
    out
}

fn render_lines(out: &mut String, indent: &str, lines: &[BestLine]) {
    if lines.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}Best lines:", indent);
    for line in lines {
        let _ = writeln!(out, "{}  {}", indent, line);
    }
}

fn render_insights(out: &mut String, insights: &Insights) {
    let count = insights.mistakes.len();
    for (i, mistake) in insights.mistakes.iter().enumerate() {
        let view = &mistake.view;
        let _ = writeln!(
            out,
            "\nMistake {}/{} ({}): {} {}",
            i + 1,
            count,
            insights.bucket,
            move_label(view.move_number, view.orientation),
            view.san
        );
        let _ = writeln!(out, "  Position: {}", view.fen_before);
        let _ = writeln!(out, "  Played: {} -> {}", view.from, view.to);
        if let Some(current) = mistake.current {
            let _ = writeln!(out, "  Evaluation after: {}", current);
        }
        match &mistake.alternative {
            Some(alt) => {
                let _ = writeln!(out, "  Best was: {} ({} -> {})", alt.san, alt.from, alt.to);
            }
            None => {
                let _ = writeln!(out, "  Best was: unavailable");
            }
        }
        render_lines(out, "  ", &mistake.lines);
    }

    if !insights.lines.is_empty() {
        let _ = writeln!(out);
        render_lines(out, "", &insights.lines);
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    review: &'a GameReview,
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<&'a Insights>,
}

/// The review summary as pretty-printed JSON, with insights when given.
pub fn render_json(review: &GameReview, insights: Option<&Insights>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport { review, insights })
}
