// ==========================================
// DiagnosticEngine 集成测试（内置知识库）
// ==========================================

use fish_farm_client::domain::SymptomSelection;
use fish_farm_client::engine::DiagnosticEngine;

fn select(engine: &DiagnosticEngine, picks: &[(&str, &str)]) -> SymptomSelection {
    let mut selection = SymptomSelection::new();
    for (organ, condition) in picks {
        if !selection.is_selected(organ) {
            engine.toggle_organ(&mut selection, organ);
        }
        engine.toggle_condition(&mut selection, organ, condition);
    }
    selection
}

#[test]
fn test_no_selection() {
    let engine = DiagnosticEngine::new().unwrap();
    let diagnosis = engine.analyze(&SymptomSelection::new());
    assert_eq!(diagnosis.disease, "কোনো লক্ষণ নির্বাচন করা হয়নি");
    assert_eq!(diagnosis.confidence, 0);
}

#[test]
fn test_only_healthy_conditions() {
    let engine = DiagnosticEngine::new().unwrap();
    let selection = select(
        &engine,
        &[
            ("skin", "স্বাভাবিক রঙ"),
            ("eye", "স্বচ্ছ, উজ্জ্বল"),
            ("gill", "উজ্জ্বল লাল"),
        ],
    );
    let diagnosis = engine.analyze(&selection);
    assert_eq!(diagnosis.disease, "স্বাস্থ্যকর অবস্থা");
    assert_eq!(diagnosis.confidence, 95);
}

#[test]
fn test_unhealthy_condition_is_scored_within_bounds() {
    let engine = DiagnosticEngine::new().unwrap();
    let selection = select(
        &engine,
        &[("gill", "ফ্যাকাশে/সাদা (অ্যানিমিয়া)"), ("skin", "রক্তক্ষরণ")],
    );
    let diagnosis = engine.analyze(&selection);
    assert_ne!(diagnosis.disease, "স্বাস্থ্যকর অবস্থা");
    assert!(diagnosis.confidence <= 95);
    assert!(!diagnosis.treatment.is_empty());
}

#[test]
fn test_toggle_unknown_organ_is_ignored() {
    let engine = DiagnosticEngine::new().unwrap();
    let mut selection = SymptomSelection::new();
    engine.toggle_organ(&mut selection, "wing");
    assert!(selection.organs.is_empty());
}
