//! Human-readable rendering of an aggregate report (`--text`).

use scorer::pipeline::AggregateReport;
use scorer::result::ScorerResult;
use std::fmt::Write;

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_entry(out: &mut String, result: &ScorerResult) {
    let status = match result.elapsed {
        Some(elapsed) => format!("{:.2}s", elapsed.as_secs_f64()),
        None => "failed".to_string(),
    };
    let _ = writeln!(out, "{}: {:.2} ({})", result.name, result.score, status);
    let _ = writeln!(out, "{}", indent(&result.brief.render(), "  "));
    for block in &result.detail {
        let _ = writeln!(out, "{}", indent(&block.render(), "    "));
    }
}

pub fn render(report: &AggregateReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        render_entry(&mut out, result);
        out.push('\n');
    }
    let _ = writeln!(out, "Final score: {:.2}", report.final_score);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorer::pipeline::Pipeline;
    use scorer::scorers::input_class::InputClassScorer;
    use scorer::input::check_class::CheckClasses;
    use scorer::input::schema::{FieldKind, FieldSpec, RecordSchema};

    fn classes() -> CheckClasses {
        CheckClasses::builder()
            .rule("x is negative", |r| r.int("x").is_some_and(|x| x < 0))
            .rule("x is zero", |r| r.int("x") == Some(0))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_render_lists_entries_and_final_score() {
        let schema = RecordSchema::new().field(FieldSpec::new("x", FieldKind::Int));
        let report = Pipeline::new()
            .add(InputClassScorer::new(schema.clone(), "x\n-4\n", classes()), 1.0)
            .add(InputClassScorer::new(schema, "x\nnope\n", classes()), 1.0)
            .run()
            .await
            .unwrap();

        let text = render(&report);
        assert!(text.contains("InputClass Scorer: 50.00 ("));
        assert!(text.contains("  50.00% input classes (1 out of 2) covered\n"));
        assert!(text.contains("    COVERED: x is negative\n"));
        assert!(text.contains("    NOT COVERED: x is zero\n"));
        assert!(text.contains("InputClass Scorer: 0.00 (failed)\n  CSV data does not match schema.\n"));
        assert!(text.ends_with("Final score: 25.00\n"));
    }

    #[test]
    fn test_indent_keeps_blank_lines_empty() {
        assert_eq!(indent("a\n\nb", "  "), "  a\n\n  b");
    }
}
