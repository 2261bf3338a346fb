mod common;

use aiscout::application::scoring::advanced::{AgentAnalysis, OpportunityContext};
use aiscout::domain::entities::market_signal::MarketSignal;
use aiscout::domain::values::ai_solution_type::AiSolutionType;
use aiscout::domain::values::level::{Level, MarketPositioning};
use aiscout::domain::values::signal_type::SignalType;
use chrono::{Duration, Utc};
use common::{invoice_signals, scheduling_signals, setup, signal};

fn urgent_signals() -> Vec<MarketSignal> {
    let text = "Critical blocking bug, urgent: exports are broken and we need a fix. We would pay for it, must have.";
    vec![
        signal("u1", text, SignalType::PainPoint, "github"),
        signal("u2", text, SignalType::Complaint, "reddit"),
        signal("u3", text, SignalType::FeatureRequest, "stackoverflow"),
    ]
    .into_iter()
    .map(|s| s.with_engagement(80.0, 30.0, 10.0).with_confidence(0.8))
    .collect()
}

fn blue_ocean_signals() -> Vec<MarketSignal> {
    [
        "There is no solution for tracking freelance hours. An AI-powered tracker would be cost-effective.",
        "Honestly no solution handles recurring reminders well. AI-powered reminders please.",
        "This is a gap in the market for hobby gardeners. Something cost-effective is overdue.",
        "A real gap in the market exists for small clubs.",
    ]
    .iter()
    .enumerate()
    .map(|(i, c)| signal(&format!("b{i}"), c, SignalType::PainPoint, "reddit"))
    .collect()
}

fn red_ocean_signals() -> Vec<MarketSignal> {
    [
        "We switched from Asana last year. The market is saturated.",
        "Asana vs Trello vs Jira is a tired debate in a crowded market.",
        "Everyone asks for an alternative to Jira or an alternative to Asana. It is dominated by incumbents.",
        "Compared to Trello nothing stands out, too many options.",
    ]
    .iter()
    .enumerate()
    .map(|(i, c)| signal(&format!("r{i}"), c, SignalType::Discussion, "hackernews"))
    .collect()
}

#[test]
fn test_urgent_engaged_signals_validate_strongly() {
    let scout = setup();
    let score = scout.validate_market(&urgent_signals());
    assert!(score.pain_intensity > 60.0, "pain {}", score.pain_intensity);
    assert!(score.overall_score > 60.0, "overall {}", score.overall_score);
    assert_eq!(score.signal_count, 3);
}

#[test]
fn test_old_vague_signal_validates_weakly() {
    let scout = setup();
    let old = signal("v", "It would be nice to have dark mode", SignalType::Discussion, "twitter")
        .with_engagement(1.0, 0.0, 0.0)
        .with_extracted_at(Some(Utc::now() - Duration::days(200)));
    let score = scout.validate_market(&[old]);
    assert!(score.overall_score < 30.0, "overall {}", score.overall_score);
}

#[test]
fn test_gaps_and_advantages_without_competitors_is_blue_ocean() {
    let scout = setup();
    let analysis = scout.analyze_competition(&blue_ocean_signals());
    assert!(analysis.competitors.is_empty());
    assert_eq!(analysis.market_gaps.len(), 2);
    assert_eq!(analysis.competitive_advantages.len(), 2);
    assert!(analysis.competition_score < 40.0);
    assert_eq!(analysis.market_positioning, MarketPositioning::BlueOcean);
    assert_eq!(analysis.competition_level, Level::Low);
}

#[test]
fn test_named_competitors_and_saturation_is_red_ocean() {
    let scout = setup();
    let analysis = scout.analyze_competition(&red_ocean_signals());
    let mut names: Vec<&str> = analysis.competitors.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Asana", "Jira", "Trello"]);
    assert!(analysis.market_saturation > 40.0);
    assert_eq!(analysis.market_positioning, MarketPositioning::RedOcean);
    assert!(analysis
        .competitive_threats
        .iter()
        .any(|t| t.contains("incumbents")));
}

#[test]
fn test_empty_input_yields_neutral_values() {
    let scout = setup();
    let validation = scout.validate_market(&[]);
    assert_eq!(validation.overall_score, 0.0);
    assert_eq!(validation.signal_count, 0);

    let competition = scout.analyze_competition(&[]);
    assert_eq!(competition.competition_score, 50.0);
    assert_eq!(competition.confidence_level, 0.0);

    let advanced = scout.score(&[], None, None);
    assert!((0.0..=100.0).contains(&advanced.overall_score));
    assert!((0.0..=1.0).contains(&advanced.confidence_level));
}

#[test]
fn test_scores_stay_in_bounds() {
    let scout = setup();
    let fixtures = vec![
        urgent_signals(),
        blue_ocean_signals(),
        red_ocean_signals(),
        invoice_signals("a"),
        scheduling_signals("b"),
    ];
    for signals in fixtures {
        let s = scout.score(&signals, None, None);
        for v in [
            s.overall_score,
            s.ai_feasibility_score,
            s.implementation_complexity_score,
            s.market_timing_score,
            s.business_viability_score,
            s.risk_assessment_score,
            s.market_validation.overall_score,
            s.market_validation.pain_intensity,
            s.market_validation.market_demand,
            s.market_validation.engagement_quality,
            s.market_validation.source_credibility,
            s.market_validation.temporal_relevance,
            s.competitive_analysis.competition_score,
            s.competitive_analysis.market_saturation,
        ] {
            assert!((0.0..=100.0).contains(&v), "score {v} out of range");
        }
        for c in [
            s.confidence_level,
            s.market_validation.confidence_level,
            s.competitive_analysis.confidence_level,
        ] {
            assert!((0.0..=1.0).contains(&c), "confidence {c} out of range");
        }
        let total: f64 = s.score_breakdown.values().sum();
        assert!((total.clamp(0.0, 100.0) - s.overall_score).abs() < 1e-9);
    }
}

#[test]
fn test_validation_pain_never_drops_when_adding_dense_signal() {
    let scout = setup();
    let mut signals = urgent_signals();
    let before = scout.validate_market(&signals).pain_intensity;
    signals.push(
        signal("dense", "critical crash, broken and unusable", SignalType::PainPoint, "github")
            .with_engagement(200.0, 50.0, 10.0),
    );
    assert!(scout.validate_market(&signals).pain_intensity >= before);
}

#[test]
fn test_agent_analysis_overrides_estimates() {
    let scout = setup();
    let agent = AgentAnalysis {
        ai_feasibility_score: Some(91.0),
        implementation_complexity: Some(20.0),
        market_timing_score: Some(140.0),
    };
    let s = scout.score(&invoice_signals("a"), None, Some(&agent));
    assert_eq!(s.ai_feasibility_score, 91.0);
    assert_eq!(s.implementation_complexity_score, 20.0);
    assert_eq!(s.implementation_complexity, Level::Low);
    assert_eq!(s.market_timing_score, 100.0);
}

#[test]
fn test_context_types_lift_feasibility() {
    let scout = setup();
    let signals = invoice_signals("a");
    let context = OpportunityContext {
        ai_solution_types: vec![AiSolutionType::Automation],
        ..Default::default()
    };
    let plain = scout.score(&signals, None, None);
    let with_context = scout.score(&signals, Some(&context), None);
    assert!(with_context.ai_feasibility_score > plain.ai_feasibility_score);
    // automation has the lowest complexity in the built-in table
    assert!(with_context.implementation_complexity_score < plain.implementation_complexity_score);
}
