//! Rendering of query outcomes for the terminal.

use verdict_session::{QueryOutcome, Session};

const RULE_LINE: &str =
    "────────────────────────────────────────────────────────────";

/// Display switches for each response.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplayOptions {
    pub show_proof: bool,
    pub show_audit: bool,
    pub json: bool,
}

/// Render one outcome as text or JSON, per the display options.
pub fn render_outcome(outcome: &QueryOutcome, session: &Session, options: DisplayOptions) -> String {
    if options.json {
        return render_json(outcome, session);
    }
    render_text(outcome, session, options)
}

fn render_text(outcome: &QueryOutcome, session: &Session, options: DisplayOptions) -> String {
    let mut lines: Vec<String> = Vec::new();
    let persona = session.persona();

    match outcome {
        QueryOutcome::Answer(answer) => {
            lines.push(format!("\n[OUTPUT] Persona: {}", persona.name));
            lines.push(RULE_LINE.to_string());
            lines.push(answer.text.clone());
            if options.show_proof {
                lines.push("\n── Proof Chain ──".to_string());
                for (i, step) in answer.proof.steps.iter().enumerate() {
                    lines.push(format!("  {:>2}. {step}", i + 1));
                }
            }
        }
        QueryOutcome::Halted(report) => {
            lines.push(format!("\n[HALT] Persona: {}", persona.name));
            lines.push(RULE_LINE.to_string());
            lines.push(format!("HALT ({}): {}", report.cause, report.detail));
        }
    }

    if options.show_audit && !session.audit().is_empty() {
        lines.push("\n── Audit Log ──".to_string());
        for entry in session.audit().entries() {
            lines.push(format!(
                "  [{:<26}] {:?}: {}",
                entry.check, entry.result, entry.detail
            ));
        }
    }

    lines.push(RULE_LINE.to_string());
    lines.join("\n")
}

fn render_json(outcome: &QueryOutcome, session: &Session) -> String {
    let value = match outcome {
        QueryOutcome::Answer(answer) => serde_json::json!({
            "state": "OUTPUT",
            "persona": session.persona().name,
            "answer": answer.text,
            "halt_reason": serde_json::Value::Null,
            "proof": answer.proof.steps.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            "audit_log": session.audit().entries(),
        }),
        QueryOutcome::Halted(report) => serde_json::json!({
            "state": "HALT",
            "persona": session.persona().name,
            "answer": serde_json::Value::Null,
            "halt_reason": format!("{}: {}", report.cause, report.detail),
            "proof": Vec::<String>::new(),
            "audit_log": session.audit().entries(),
        }),
    };
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
