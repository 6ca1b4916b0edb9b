use crate::infra::Engine;
use clap::Args;
use csf_compliance::config::{AppConfig, RetrievalConfig};
use csf_compliance::decisions::{DecisionRequest, DecisionResult, DecisionType, Evidence};
use csf_compliance::error::AppError;
use csf_compliance::knowledge::{
    standard_entries, standard_passages, AskRequest, AskResponse, GateDecision, KbCsvImporter,
    KnowledgeBase, LexicalEmbedder,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Decision type, e.g. csf_practitioner or ohio-tddd
    #[arg(long)]
    pub(crate) decision_type: String,
    /// JSON file holding the evidence object. Omit to evaluate empty evidence.
    #[arg(long)]
    pub(crate) evidence: Option<PathBuf>,
    /// Print the raw decision payload instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AskArgs {
    /// Question to route through the confidence gate
    #[arg(long)]
    pub(crate) question: String,
    /// Restrict matching to entries tagged with this decision type
    #[arg(long)]
    pub(crate) decision_type: Option<String>,
    /// Print the raw gate payload instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct KbImportArgs {
    /// CSV export with id, canonical_question, answer, decision_type, jurisdiction columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the knowledge-base portion of the demo.
    #[arg(long)]
    pub(crate) skip_retrieval: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        decision_type,
        evidence,
        json,
    } = args;

    let evidence = match evidence {
        Some(path) => serde_json::from_str::<Evidence>(&std::fs::read_to_string(path)?)?,
        None => Evidence::new(),
    };
    let config = AppConfig::load()?;
    let engine = Engine::load(&config.retrieval)?;
    let result = engine.decisions.decide(&DecisionRequest {
        decision_type,
        evidence,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_decision(&result);
    }
    Ok(())
}

pub(crate) fn run_ask(args: AskArgs) -> Result<(), AppError> {
    let AskArgs {
        question,
        decision_type,
        json,
    } = args;

    let config = AppConfig::load()?;
    let engine = Engine::load(&config.retrieval)?;
    let response = engine.knowledge.ask(&AskRequest {
        question,
        decision_type,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        render_answer(&response);
    }
    Ok(())
}

/// Checks the export against the standard corpus without touching a running service.
pub(crate) fn run_kb_import(args: KbImportArgs) -> Result<(), AppError> {
    let drafts = KbCsvImporter::from_path(&args.csv)?;
    let standard_ids: HashSet<String> = standard_entries()
        .into_iter()
        .filter_map(|draft| draft.id.map(|id| id.0))
        .collect();

    println!("Knowledge-base import check: {}", args.csv.display());
    println!("- {} row(s) parsed", drafts.len());
    for draft in &drafts {
        let id = draft
            .id
            .as_ref()
            .map(|id| id.0.as_str())
            .unwrap_or("(assigned on publish)");
        let scope = draft
            .decision_type
            .map(|decision_type| decision_type.to_string())
            .unwrap_or_else(|| "any decision".to_string());
        println!(
            "  - {} [{} | {}] {}",
            id, draft.jurisdiction, scope, draft.canonical_question
        );
    }

    let mut merged = standard_entries();
    merged.extend(drafts);
    let knowledge = KnowledgeBase::new(
        Arc::new(LexicalEmbedder::default()),
        RetrievalConfig::default(),
    );
    knowledge.rebuild(merged, standard_passages())?;
    let index = knowledge.snapshot();
    let standard = index
        .entries()
        .iter()
        .filter(|entry| standard_ids.contains(&entry.id.0))
        .count();
    let variants: usize = index.entries().iter().map(|entry| entry.variants.len()).sum();
    println!(
        "- Merged index: {} entries ({} standard) | {} question variants | {} passages",
        index.entries().len(),
        standard,
        variants,
        index.passages().len()
    );
    println!("Set APP_KB_SEED_CSV to this path to load it at startup.");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine = Engine::load(&RetrievalConfig::default())?;

    println!(
        "Compliance decision demo (registry {})",
        engine.decisions.registry().version()
    );
    for (label, evidence) in demo_practitioners() {
        println!("\n{label}");
        let result = engine
            .decisions
            .decide_typed(DecisionType::CsfPractitioner, &evidence);
        render_decision(&result);
    }

    if args.skip_retrieval {
        return Ok(());
    }

    println!("\nKnowledge-base retrieval demo");
    for question in [
        "How do I renew my DEA license?",
        "Steps to renew a DEA registration?",
        "What time does the cafeteria open on weekends?",
    ] {
        println!("\nQ: {question}");
        let response = engine.knowledge.ask(&AskRequest {
            question: question.to_string(),
            decision_type: None,
        })?;
        render_answer(&response);
    }

    let tickets = engine.queue.tickets();
    if tickets.is_empty() {
        println!("\nReview queue: empty");
    } else {
        println!("\nReview queue:");
        for ticket in tickets {
            println!(
                "  - {} queued {} -> {}",
                ticket.id,
                ticket.queued_at.format("%Y-%m-%d %H:%M:%S UTC"),
                ticket.escalation.question
            );
        }
    }

    Ok(())
}

fn demo_practitioners() -> Vec<(&'static str, Evidence)> {
    vec![
        (
            "Practitioner without a DEA registration",
            Evidence::new()
                .with("dea_registration", false)
                .with("state_license_status", "Active")
                .with("requested_schedules", vec!["II", "III"])
                .with("authorized_schedules", Vec::<String>::new()),
        ),
        (
            "Telemedicine practitioner near DEA expiry",
            Evidence::new()
                .with("dea_registration", true)
                .with("dea_expiry_days", 20_i64)
                .with("telemedicine_practice", true)
                .with("has_ryan_haight_attestation", false)
                .with("state_license_status", "Active")
                .with("state_license_expiry_days", 365_i64)
                .with("authorized_schedules", vec!["II", "III", "IV", "V"])
                .with("requested_schedules", vec!["III", "IV", "V"]),
        ),
        (
            "Fully documented practitioner",
            Evidence::new()
                .with("dea_registration", true)
                .with("dea_expiry_days", 400_i64)
                .with("telemedicine_practice", false)
                .with("state_license_status", "Active")
                .with("state_license_expiry_days", 365_i64)
                .with("authorized_schedules", vec!["II", "IIN", "III", "IV", "V"])
                .with("requested_schedules", vec!["II", "IV"])
                .with("schedule_ii_order_channel", "CSOS"),
        ),
    ]
}

pub(crate) fn render_decision(result: &DecisionResult) {
    println!(
        "- {} -> {} ({} rules evaluated)",
        result.decision_type,
        result.outcome.label(),
        result.evaluated_rules.len()
    );
    println!("  {}", result.decision_summary);
    for fired in &result.fired_rules {
        println!(
            "  - [{}] {}: {}",
            fired.rule.severity.label(),
            fired.rule.rule_id,
            fired.rule.title
        );
        for chip in &fired.evidence {
            println!(
                "      cites {} {} ({}, relevance {:.2})",
                chip.doc_title, chip.section, chip.jurisdiction, chip.relevance
            );
        }
    }
    if !result.next_steps.is_empty() {
        println!("  Next steps:");
        for step in &result.next_steps {
            println!("    - {step}");
        }
    }
}

pub(crate) fn render_answer(response: &AskResponse) {
    match &response.decision {
        GateDecision::Answered(answer) => {
            let via = match answer.top_match.matched_variant_index {
                Some(index) => format!("variant {index}"),
                None => "canonical question".to_string(),
            };
            println!(
                "- Answered from {} via {} (score {:.2} >= {:.2})",
                answer.kb_entry_id, via, answer.top_match.score, answer.threshold
            );
            println!("  {}", answer.answer);
        }
        GateDecision::Escalate(escalation) => {
            let best = escalation
                .best_match
                .as_ref()
                .map(|best| format!("best {} at {:.2}", best.kb_entry_id, best.score))
                .unwrap_or_else(|| "no candidates".to_string());
            println!(
                "- Escalated to human review ({best}, threshold {:.2})",
                escalation.threshold
            );
            if let Some(ticket) = &response.review_ticket {
                println!("  Review ticket {ticket}");
            }
        }
    }
}
