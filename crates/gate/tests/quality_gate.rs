//! End-to-end scoring properties of the quality gate.

use gate::fixtures::{ArticleFixture, FIXTURE_KEYWORD};
use gate::{
    Article, Category, Keyword, QualityGate, RubricConfig, Severity, TargetWordCount,
    WordCountTier, WorkflowError,
};

fn target(n: u32) -> TargetWordCount {
    TargetWordCount::new(n).unwrap()
}

fn default_gate() -> QualityGate {
    QualityGate::new(RubricConfig::default()).unwrap()
}

#[test]
fn clean_article_scores_full_marks() {
    let article = ArticleFixture::new(target(2000)).with_keyword().build();
    let report = default_gate().evaluate(&article).unwrap();

    assert_eq!(report.total(), 100, "findings: {:?}", report.findings());
    assert!(report.passed());
    assert!(report.findings().is_empty());
    assert_eq!(report.word_count().tier, WordCountTier::Full);
}

#[test]
fn total_is_sum_of_categories_within_ceilings() {
    let gate = default_gate();
    let articles = [
        ArticleFixture::new(target(2000)).build(),
        ArticleFixture::new(target(2000))
            .with_first_person()
            .with_anecdote()
            .without_disclaimer()
            .with_repeated_paragraphs(9)
            .with_word_count(300)
            .build(),
        Article::from_markdown("Μόνο μία πρόταση εδώ.", target(1500)),
    ];

    for article in &articles {
        let report = gate.evaluate(article).unwrap();
        let sum: u32 = report.scores().iter().map(|s| s.points).sum();
        assert_eq!(report.total(), sum);
        for score in report.scores().iter() {
            assert!(score.points <= score.ceiling, "{:?}", score);
        }
    }
}

#[test]
fn critical_violation_fails_regardless_of_total() {
    let mut rubric = RubricConfig::default();
    rubric.penalties.first_person = 5;
    let gate = QualityGate::new(rubric).unwrap();

    let article = ArticleFixture::new(target(2000)).with_first_person().build();
    let report = gate.evaluate(&article).unwrap();

    assert_eq!(report.total(), 95);
    assert!(report.total() >= report.threshold());
    assert!(!report.passed());
    assert!(report
        .critical_findings()
        .any(|f| f.violation.tag() == "first_person_voice"));
}

#[test]
fn first_person_with_raw_total_ninety_fails() {
    let article = ArticleFixture::new(target(1500)).with_first_person().build();
    let report = default_gate().evaluate(&article).unwrap();

    assert_eq!(report.total(), 90);
    assert_eq!(report.scores().get(Category::Voice).points, 15);
    assert!(!report.passed());
}

#[test]
fn ratio_exactly_at_floor_gets_minimal_sub_score() {
    let article = ArticleFixture::new(target(10_000))
        .with_word_count(8_500)
        .build();
    let report = default_gate().evaluate(&article).unwrap();

    assert_eq!(report.word_count().tier, WordCountTier::Minimal);
    assert_eq!(report.word_count().sub_score, 2);
    assert!(!report.has_critical());
    assert!(report.passed());
}

#[test]
fn ratio_just_below_floor_is_critical() {
    let article = ArticleFixture::new(target(10_000))
        .with_word_count(8_499)
        .build();
    let report = default_gate().evaluate(&article).unwrap();

    assert_eq!(report.word_count().tier, WordCountTier::BelowFloor);
    assert_eq!(report.word_count().sub_score, 0);
    assert!(report
        .critical_findings()
        .any(|f| f.violation.tag() == "word_count_below_floor"));
    assert!(!report.passed());
}

#[test]
fn seventeen_hundred_of_two_thousand_is_minimal_tier() {
    let article = ArticleFixture::new(target(2000)).with_word_count(1700).build();
    let report = default_gate().evaluate(&article).unwrap();

    assert_eq!(report.word_count().tier, WordCountTier::Minimal);
    assert_eq!(report.total(), 96);
    assert!(report.passed());

    // The same length with another critical problem fails.
    let article = ArticleFixture::new(target(2000))
        .with_word_count(1700)
        .without_disclaimer()
        .build();
    let report = default_gate().evaluate(&article).unwrap();
    assert_eq!(report.word_count().tier, WordCountTier::Minimal);
    assert!(!report.passed());
}

#[test]
fn scoring_is_idempotent() {
    let gate = default_gate();
    let article = ArticleFixture::new(target(1800))
        .with_word_count(1650)
        .with_repeated_paragraphs(2)
        .build();

    let first = gate.evaluate(&article).unwrap();
    let second = gate.evaluate(&article).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn duplicate_deductions_are_capped() {
    let gate = default_gate();

    let two = gate
        .evaluate(&ArticleFixture::new(target(1500)).with_repeated_paragraphs(2).build())
        .unwrap();
    assert_eq!(two.scores().get(Category::Structure).points, 21);
    assert!(two.passed());

    let many = gate
        .evaluate(&ArticleFixture::new(target(1500)).with_repeated_paragraphs(7).build())
        .unwrap();
    assert_eq!(many.scores().get(Category::Structure).points, 17);
}

#[test]
fn each_critical_marker_is_reported_with_its_category() {
    let gate = default_gate();
    let cases = [
        (
            ArticleFixture::new(target(1500)).with_anecdote(),
            "personal_anecdote",
            Category::Structure,
        ),
        (
            ArticleFixture::new(target(1500)).without_disclaimer(),
            "missing_variability_disclaimer",
            Category::MedicalAccuracy,
        ),
    ];

    for (fixture, tag, category) in cases {
        let report = gate.evaluate(&fixture.build()).unwrap();
        let finding = report
            .findings()
            .iter()
            .find(|f| f.violation.tag() == tag)
            .unwrap_or_else(|| panic!("missing {tag}"));
        assert_eq!(finding.category, category);
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(report.total(), 92);
        assert!(!report.passed());
    }
}

#[test]
fn empty_article_is_malformed_input() {
    let err = default_gate()
        .evaluate(&Article::from_markdown("", target(1000)))
        .unwrap_err();
    assert!(matches!(err, WorkflowError::MalformedInput { .. }));
}

#[test]
fn custom_rubric_threshold_applies() {
    let rubric = RubricConfig::from_json_str(r#"{ "pass_threshold": 97 }"#).unwrap();
    let gate = QualityGate::new(rubric).unwrap();
    let article = ArticleFixture::new(target(2000)).with_word_count(1700).build();

    let report = gate.evaluate(&article).unwrap();
    assert_eq!(report.total(), 96);
    assert_eq!(report.threshold(), 97);
    assert!(!report.passed());
}

/// The clean keyworded fixture with `paragraph` appended as its last block.
fn clean_article_with(paragraph: &str) -> Article {
    let markdown = format!("{}\n{paragraph}\n", ArticleFixture::new(target(2000)).markdown());
    Article::from_markdown(markdown, target(2000)).with_main_keyword(Keyword::new(FIXTURE_KEYWORD))
}

#[test]
fn first_person_at_paragraph_start_and_before_punctuation_fails() {
    let article = clean_article_with("Εγώ εξετάζω κάθε ασθενή προσεκτικά. Η ομάδα μου, επίσης.");
    let report = default_gate().evaluate(&article).unwrap();

    assert!(!report.passed());
    assert!(report.violation_tags().contains("first_person_voice"));
    assert_eq!(report.total(), 90);
}

#[test]
fn first_person_markers_inside_longer_words_are_ignored() {
    let article = clean_article_with(
        "Η μουσική βοηθά τη χαλάρωση του ασθενή. Η ομάδα συνεργάζεται με τον φυσικοθεραπευτή.",
    );
    let report = default_gate().evaluate(&article).unwrap();

    assert!(!report.violation_tags().contains("first_person_voice"));
    assert!(report.passed(), "findings: {:?}", report.findings());
}

#[test]
fn missing_required_signature_costs_voice_points() {
    let mut rubric = RubricConfig::default();
    rubric.markers.required_signature = Some("Δρ. Γεώργιος Χλωρός".to_string());
    let gate = QualityGate::new(rubric).unwrap();

    let unsigned = gate.evaluate(&clean_article_with("")).unwrap();
    assert!(unsigned.violation_tags().contains("missing_signature"));
    assert_eq!(unsigned.total(), 97);
    assert_eq!(unsigned.scores().get(Category::Voice).points, 22);

    let signed = gate
        .evaluate(&clean_article_with("**Δρ. Γεώργιος Χλωρός**"))
        .unwrap();
    assert!(!signed.violation_tags().contains("missing_signature"));
    assert!(signed.passed());
}
