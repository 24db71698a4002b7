mod support;

use std::io::Write;

use aspect_eval::{
    cli::{evaluate::render_summary, extract::render_pairs},
    data::ReviewRecord,
    nlp::{evaluation::Evaluator, extraction::Extractor, run_from_csv, run_pipeline},
};
use support::{BrokenEmbedder, HashingEmbedder, ScriptedBackend};

fn food_record() -> ReviewRecord {
    ReviewRecord {
        review: "The food is decent".into(),
        true_entity: "food".into(),
        true_aspect: "decent".into(),
    }
}

#[tokio::test]
async fn decent_food_review_is_kept_on_both_fields() {
    let backend =
        ScriptedBackend::replying(r#"{"1": {"named_entity": "food", "aspect": ["decent"]}}"#);
    let extractor = Extractor::new(&backend, "test-model");
    let mut embedder = HashingEmbedder::default();

    let report = run_pipeline(&food_record(), &extractor, &mut embedder, &Evaluator::default())
        .await
        .unwrap();

    assert_eq!(report.extraction.prediction.entity, "food");
    assert_eq!(report.extraction.prediction.aspect, "decent");
    assert!((report.evaluation.entity_score() - 1.0).abs() < 1e-5);
    assert!((report.evaluation.aspect_score() - 1.0).abs() < 1e-5);
    assert!(report.evaluation.keep_entity());
    assert!(report.evaluation.keep_aspect());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn second_pair_does_not_affect_scores() {
    let backend = ScriptedBackend::replying(
        r#"{"1": {"named_entity": "waitress", "aspect": ["slow"]},
            "2": {"named_entity": "food", "aspect": ["decent"]}}"#,
    );
    let extractor = Extractor::new(&backend, "test-model");
    let mut embedder = HashingEmbedder::default();

    let report = run_pipeline(&food_record(), &extractor, &mut embedder, &Evaluator::default())
        .await
        .unwrap();

    assert_eq!(report.extraction.extraction.len(), 2);
    assert!(!report.evaluation.keep_entity());
    assert!(!report.evaluation.keep_aspect());
}

#[tokio::test]
async fn pipeline_reads_row_zero_of_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "review,true_entity,true_aspect").unwrap();
    writeln!(file, "The service is slow,service,slow").unwrap();
    writeln!(file, "The food is decent,food,decent").unwrap();

    let backend =
        ScriptedBackend::replying(r#"{"1": {"named_entity": "service", "aspect": ["slow"]}}"#);
    let extractor = Extractor::new(&backend, "test-model");
    let mut embedder = HashingEmbedder::default();

    let report = run_from_csv(file.path(), &extractor, &mut embedder, &Evaluator::default())
        .await
        .unwrap();

    assert_eq!(report.review, "The service is slow");
    let (messages, _) = backend.last_request();
    assert_eq!(messages.last().unwrap().content, "The service is slow");
    assert!(report.evaluation.keep_entity());
}

#[tokio::test]
async fn malformed_completion_aborts_before_scoring() {
    let backend = ScriptedBackend::replying("{\"1\": ");
    let extractor = Extractor::new(&backend, "test-model");
    let mut embedder = HashingEmbedder::default();

    let err = run_pipeline(&food_record(), &extractor, &mut embedder, &Evaluator::default())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("not a valid extraction object"));
    assert_eq!(embedder.calls, 0);
}

#[tokio::test]
async fn embedding_failure_aborts_the_run() {
    let backend =
        ScriptedBackend::replying(r#"{"1": {"named_entity": "food", "aspect": ["decent"]}}"#);
    let extractor = Extractor::new(&backend, "test-model");

    let err = run_pipeline(&food_record(), &extractor, &mut BrokenEmbedder, &Evaluator::default())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("model file missing"));
}

#[tokio::test]
async fn reports_render_for_humans_and_json() {
    let backend = ScriptedBackend::replying(
        r#"{"1": {"named_entity": "food", "aspect": ["decent", "fresh"]}}"#,
    );
    let extractor = Extractor::new(&backend, "test-model");
    let mut embedder = HashingEmbedder::default();
    let report = run_pipeline(&food_record(), &extractor, &mut embedder, &Evaluator::default())
        .await
        .unwrap();

    let summary = render_summary(&report);
    assert!(summary.contains("\"food\" vs \"food\" -> 1.000 (keep)"));
    assert!(summary.contains("threshold: 0.85"));
    assert_eq!(
        render_pairs(&report.extraction),
        "1. food -> decent | fresh\nprediction: food / decent\n"
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["extraction"]["extraction"]["1"]["named_entity"], "food");
    assert_eq!(json["evaluation"]["entity"]["keep"], true);
}
