//! End-to-end review tests driven by a scripted evaluator.

use chess_analysis::testing::ScriptedEvaluator;
use chess_analysis::{AnalysisConfig, EvaluationSample, GamePhase, PvLine};
use chess_core::{MoveOracle, Side, StandardRules};
use game_review::{
    prepare, report, review_game, review_game_with_insights, review_with, ReviewConfig, ReviewError,
};

fn pgn(movetext: &str) -> String {
    format!(
        "[Event \"Club Night\"]\n[Site \"Ghent\"]\n[Date \"2024.05.04\"]\n\
         [White \"alice\"]\n[Black \"bob\"]\n[Result \"*\"]\n\n{} *",
        movetext
    )
}

#[test]
fn test_engine_moves_review_is_perfect() {
    let text = pgn("1. e4 e5");
    let prepared = prepare(&text, "alice").unwrap();
    let mut evaluator = ScriptedEvaluator::following(&StandardRules, prepared.game.plies());

    let review = prepared.classify(&mut evaluator, &AnalysisConfig::default());
    assert_eq!(review.tracked_side, Side::White);
    assert_eq!(review.plies, 2);
    assert!(review.buckets.is_empty());
    assert_eq!(review.accuracy.percent(), 100.0);

    let text = report::render_text(&review, None);
    assert!(text.contains("Accuracy: 100.0%"));
    assert!(text.contains("No mistakes found."));
}

#[test]
fn test_missing_header_is_structure_error() {
    let text = "[Event \"x\"]\n[Site \"y\"]\n[Date \"z\"]\n[White \"alice\"]\n\n1. e4 e5 *";
    let mut evaluator = ScriptedEvaluator::default();
    let err = review_with(text, "alice", &mut evaluator, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, ReviewError::Structure(_)));
    assert_eq!(err.to_string(), "PGN Structure Error");
    assert_eq!(evaluator.calls(), 0);
}

#[test]
fn test_illegal_move_is_reported() {
    let mut evaluator = ScriptedEvaluator::default();
    let err = review_with(&pgn("1. e4 e5 2. Qh4"), "alice", &mut evaluator, &AnalysisConfig::default())
        .unwrap_err();
    assert!(matches!(err, ReviewError::Resolution(_)));
    assert_eq!(err.to_string(), "Illegal move 2. Qh4 (White)");

    let err = review_with(&pgn("1. e4 e5 2. Nf3 Ke3"), "alice", &mut evaluator, &AnalysisConfig::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "Illegal move 2... Ke3 (Black)");
    assert_eq!(evaluator.calls(), 0);
}

#[test]
fn test_unknown_player_is_color_error() {
    let mut evaluator = ScriptedEvaluator::default();
    let err = review_with(&pgn("1. e4 e5"), "carol", &mut evaluator, &AnalysisConfig::default())
        .unwrap_err();
    assert!(matches!(err, ReviewError::Color(_)));
    assert_eq!(err.to_string(), "player not found in this game: carol");
}

#[test]
fn test_missing_engine_is_reported_after_validation() {
    let config = ReviewConfig {
        engine_path: "/nonexistent/engines/stockfish".to_string(),
        ..ReviewConfig::default()
    };

    let err = review_game(&pgn("1. e4 e5"), "alice", &config).unwrap_err();
    assert!(matches!(err, ReviewError::Engine(_)));

    // Validation runs first, so a broken game never reaches the engine.
    let err = review_game(&pgn("1. e4 e5 2. Qh4"), "alice", &config).unwrap_err();
    assert!(matches!(err, ReviewError::Resolution(_)));
}

#[test]
fn test_black_mistake_with_insights() {
    let rules = StandardRules;
    let text = pgn("1. e4 e5 2. Nf3 f6");
    let prepared = prepare(&text, "BOB").unwrap();
    assert_eq!(prepared.side, Side::Black);

    let plies = prepared.game.plies().to_vec();
    let mut evaluator = ScriptedEvaluator::default();
    evaluator.set_eval(&rules.fen(&plies[0].after), Side::White, 0.3);
    evaluator.set_eval(&rules.fen(&plies[1].after), Side::White, 0.3);
    evaluator.set_eval(&rules.fen(&plies[2].after), Side::White, 0.4);
    evaluator.set_eval(&rules.fen(&plies[3].after), Side::White, 1.1);

    let config = AnalysisConfig::default();
    let review = prepared.classify(&mut evaluator, &config);
    assert_eq!(review.buckets.all.len(), 1);
    let mistake = &review.buckets.opening[0];
    assert_eq!(mistake.san, "f6");
    assert_eq!(mistake.side, Side::Black);
    assert_eq!(mistake.phase, GamePhase::Opening);
    assert!((mistake.delta + 0.7).abs() < 1e-9);
    assert!((review.accuracy.value() - 0.65).abs() < 1e-9);

    let before_f6 = rules.fen(&plies[3].before);
    let after_f6 = rules.fen(&plies[3].after);
    evaluator.set_best_move(&before_f6, "b8c6");
    evaluator.set_lines(
        &after_f6,
        vec![PvLine {
            moves: vec!["f3e5".to_string(), "f6e5".to_string()],
            score: EvaluationSample::Pawns(1.1),
        }],
    );

    let insights = review.insights(&mut evaluator, &config, "all").unwrap();
    assert_eq!(insights.bucket, "all");
    assert_eq!(insights.mistakes.len(), 1);
    assert!(insights.lines.is_empty());
    let mistake = &insights.mistakes[0];
    assert_eq!(mistake.view.orientation, Side::Black);
    assert_eq!((mistake.view.from.as_str(), mistake.view.to.as_str()), ("f7", "f6"));
    assert_eq!(mistake.current, Some(EvaluationSample::Pawns(-1.1)));
    assert_eq!(mistake.alternative.as_ref().unwrap().san, "Nc6");
    // Lines start from the position after the mistake, with White to move.
    assert_eq!(mistake.lines[0].to_string(), "1: Nxe5 fxe5 (Eval: +1.10)");

    let text = report::render_text(&review, Some(&insights));
    assert!(text.contains("Accuracy: 65.0%"));
    assert!(text.contains("Mistakes (opening):"));
    assert!(text.contains("Mistake 1/1 (all): 2... f6"));
    assert!(text.contains("Best was: Nc6 (b8 -> c6)"));
    assert!(text.contains("1: Nxe5 fxe5 (Eval: +1.10)"));
    assert!(!text.contains("Mistakes (endgame):"));
}

#[test]
fn test_insights_cover_every_mistake_in_bucket() {
    let rules = StandardRules;
    let text = pgn("1. e4 e5 2. Qh5 Nc6 3. Qxf7+ Kxf7");
    let prepared = prepare(&text, "alice").unwrap();
    let plies = prepared.game.plies().to_vec();
    let mut evaluator = ScriptedEvaluator::default();
    // White's view: Qh5 drops 0.5, Qxf7+ drops 8.
    for (ply, eval) in plies.iter().zip([0.3, 0.3, -0.2, -0.2, -8.2, -8.2]) {
        evaluator.set_eval(&rules.fen(&ply.after), Side::White, eval);
    }
    let config = AnalysisConfig::default();
    let review = prepared.classify(&mut evaluator, &config);
    assert_eq!(review.buckets.opening.len(), 2);

    for ply in &plies {
        evaluator.set_lines(&rules.fen(&ply.after), Vec::new());
    }
    let insights = review.insights(&mut evaluator, &config, "opening").unwrap();
    let played: Vec<&str> = insights.mistakes.iter().map(|m| m.view.san.as_str()).collect();
    assert_eq!(played, vec!["Qxf7+", "Qh5"]);
    assert!(insights.mistakes.iter().all(|m| m.alternative.is_none()));

    let text = report::render_text(&review, Some(&insights));
    assert!(text.contains("Mistake 1/2 (opening): 3. Qxf7+"));
    assert!(text.contains("Mistake 2/2 (opening): 2. Qh5"));
}

#[test]
fn test_empty_bucket_shows_final_position_lines() {
    let rules = StandardRules;
    let text = pgn("1. e4 e5 2. Nf3 f6");
    let prepared = prepare(&text, "bob").unwrap();
    let plies = prepared.game.plies().to_vec();
    let mut evaluator = ScriptedEvaluator::following(&rules, &plies);
    for ply in &plies {
        evaluator.set_eval(&rules.fen(&ply.after), Side::White, 0.2);
    }
    evaluator.set_lines(
        &rules.fen(prepared.game.final_position()),
        vec![PvLine {
            moves: vec!["f1c4".to_string()],
            score: EvaluationSample::Pawns(0.6),
        }],
    );
    let config = AnalysisConfig::default();
    let review = prepared.classify(&mut evaluator, &config);

    let insights = review.insights(&mut evaluator, &config, "Endgame").unwrap();
    assert_eq!(insights.bucket, "endgame");
    assert!(insights.mistakes.is_empty());
    assert_eq!(insights.lines[0].to_string(), "1: Bc4 (Eval: +0.60)");

    let err = review.insights(&mut evaluator, &config, "blunders").unwrap_err();
    assert!(matches!(err, ReviewError::UnknownBucket(_)));
    assert_eq!(err.to_string(), "unknown mistake bucket: blunders");
}

#[test]
fn test_unknown_bucket_fails_before_engine_starts() {
    let config = ReviewConfig {
        engine_path: "/nonexistent/engines/stockfish".to_string(),
        ..ReviewConfig::default()
    };
    let err = review_game_with_insights(&pgn("1. e4 e5"), "alice", &config, "blunders").unwrap_err();
    assert!(matches!(err, ReviewError::UnknownBucket(_)));

    let err = review_game_with_insights(&pgn("1. e4 e5"), "alice", &config, "all").unwrap_err();
    assert!(matches!(err, ReviewError::Engine(_)));
}

#[test]
fn test_json_summary() {
    let text = pgn("1. e4 e5");
    let prepared = prepare(&text, "alice").unwrap();
    let mut evaluator = ScriptedEvaluator::following(&StandardRules, prepared.game.plies());
    let review = prepared.classify(&mut evaluator, &AnalysisConfig::default());

    let json: serde_json::Value =
        serde_json::from_str(&report::render_json(&review, None).unwrap()).unwrap();
    assert_eq!(json["white"], "alice");
    assert_eq!(json["black"], "bob");
    assert_eq!(json["tracked_side"], "white");
    assert_eq!(json["plies"], 2);
    assert_eq!(json["accuracy"], 1.0);
    assert!(json["buckets"]["all"].as_array().unwrap().is_empty());
    assert!(json.get("game").is_none());
    assert!(json.get("insights").is_none());
}

#[test]
fn test_json_includes_insights() {
    let rules = StandardRules;
    let text = pgn("1. e4 e5 2. Nf3 f6");
    let prepared = prepare(&text, "bob").unwrap();
    let plies = prepared.game.plies().to_vec();
    let mut evaluator = ScriptedEvaluator::default();
    for (ply, eval) in plies.iter().zip([0.3, 0.3, 0.4, 1.1]) {
        evaluator.set_eval(&rules.fen(&ply.after), Side::White, eval);
    }
    evaluator.set_best_move(&rules.fen(&plies[3].before), "b8c6");
    evaluator.set_lines(
        &rules.fen(&plies[3].after),
        vec![PvLine {
            moves: vec!["f3e5".to_string()],
            score: EvaluationSample::Pawns(1.1),
        }],
    );
    let config = AnalysisConfig::default();
    let review = prepared.classify(&mut evaluator, &config);
    let insights = review.insights(&mut evaluator, &config, "all").unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&report::render_json(&review, Some(&insights)).unwrap()).unwrap();
    assert_eq!(json["tracked_side"], "black");
    assert_eq!(json["buckets"]["all"][0]["san"], "f6");
    let mistake = &json["insights"]["mistakes"][0];
    assert_eq!(json["insights"]["bucket"], "all");
    assert_eq!(mistake["view"]["san"], "f6");
    assert_eq!(mistake["alternative"]["san"], "Nc6");
    assert_eq!(mistake["lines"][0]["moves"][0], "Nxe5");
}
