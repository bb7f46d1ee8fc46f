use cadence_quiz::error::AppError;
use cadence_quiz::funnel::catalog::{phase_label, QuestionCatalog, QuestionKind};
use cadence_quiz::funnel::domain::{QuizResponse, DEFAULT_DISPLAY_NAME};
use cadence_quiz::funnel::handoff::{demo_responses, demo_user, ResultsSource, ResultsView};
use cadence_quiz::funnel::offer::format_cents;
use cadence_quiz::funnel::personalization::derive;
use chrono::Utc;
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DeriveArgs {
    /// JSON file holding quiz responses keyed by question id
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Display name used in the generated copy
    #[arg(long, default_value = DEFAULT_DISPLAY_NAME)]
    pub(crate) name: String,
}

pub(crate) fn run_derive(args: DeriveArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.responses)?;
    let responses: QuizResponse = serde_json::from_str(&raw)?;

    let result = derive(&responses, &args.name);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let now = Utc::now();
    let view = ResultsView::build(
        ResultsSource::Demo,
        demo_user(),
        &demo_responses(),
        now,
        now,
    );

    render_results(&mut io::stdout().lock(), &view)?;
    Ok(())
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    render_catalog(&mut io::stdout().lock(), &QuestionCatalog::standard())?;
    Ok(())
}

pub(crate) fn render_results(out: &mut impl Write, view: &ResultsView) -> io::Result<()> {
    let result = &view.personalization;

    writeln!(out, "{}", result.headline)?;
    writeln!(out, "{}", plain(&result.subheadline))?;
    writeln!(
        out,
        "\nPrimary issue: {} | Bundle: {} | Top ingredient: {:?}",
        result.primary_issue, result.bundle, result.top_ingredient
    )?;
    let applied: Vec<String> = result.applied_rules.iter().map(ToString::to_string).collect();
    writeln!(out, "Rules fired: {}", applied.join(", "))?;

    writeln!(out, "\nDosing ({})", result.dosage_time)?;
    writeln!(out, "- {}", result.dosing_instructions)?;

    if !result.symptom_highlights.is_empty() {
        writeln!(out, "\nWhat it targets")?;
        for highlight in &result.symptom_highlights {
            writeln!(out, "- {highlight}")?;
        }
    }

    writeln!(out, "\nA note from {}, {}", result.expert.name, result.expert.role)?;
    for line in result.expert.message.lines() {
        writeln!(out, "  {line}")?;
    }

    if let Some(copy) = &result.switcher_copy {
        writeln!(out, "\nWhy switch\n- {copy}")?;
    }
    if result.comparison_table {
        writeln!(out, "- Includes melatonin vs Calm+Rest comparison")?;
    }
    if let Some(warning) = &result.hormonal_warning {
        writeln!(out, "\n{}", plain(warning))?;
    }

    let testimonial = &result.primary_testimonial;
    writeln!(
        out,
        "\n\"{}\"\n  {} ({})",
        plain(&testimonial.quote),
        testimonial.author,
        testimonial.role
    )?;

    writeln!(out, "\n{}", result.bundle_name)?;
    for item in &view.price_stack.items {
        writeln!(out, "- {}: {}", item.name, format_cents(item.price_cents))?;
    }
    let summary = view.price_summary;
    writeln!(out, "Subtotal {}", format_cents(summary.subtotal_cents))?;
    writeln!(
        out,
        "Subscribe & Save -{}",
        format_cents(view.price_stack.subscribe_discount_cents)
    )?;
    writeln!(
        out,
        "Quiz Bonus -{}",
        format_cents(view.price_stack.quiz_bonus_cents)
    )?;
    writeln!(
        out,
        "Your Total {} (you save {}, {}%)",
        format_cents(summary.total_cents),
        format_cents(summary.savings_cents),
        summary.savings_percent
    )?;
    writeln!(
        out,
        "Code {} | bonus clock {} | {}",
        view.bonus_code, view.countdown, view.checkout_url
    )?;

    Ok(())
}

pub(crate) fn render_catalog(out: &mut impl Write, catalog: &QuestionCatalog) -> io::Result<()> {
    let mut current_phase = None;

    for question in catalog.questions() {
        if current_phase != Some(question.phase) {
            current_phase = Some(question.phase);
            writeln!(
                out,
                "\nPhase {}: {}",
                question.phase,
                phase_label(question.phase).unwrap_or("Other")
            )?;
        }

        let kind = match question.kind {
            QuestionKind::Single => "single".to_string(),
            QuestionKind::Multi => "multi".to_string(),
            QuestionKind::MultiLimited { max } => format!("up to {max}"),
        };
        writeln!(out, "- {} [{}] {}", question.id, kind, question.prompt)?;
        let options: Vec<&str> = question.options.iter().map(|option| option.id).collect();
        writeln!(out, "    {}", options.join(" | "))?;
    }

    Ok(())
}

/// Drop the `**bold**` markers used by the results copy.
fn plain(text: &str) -> String {
    text.replace("**", "")
}
