//! End-to-end properties of the full pipeline: controller, reasoner,
//! knowledge base, and governance gate working together.

use verdict_gate::CheckResult;
use verdict_kb::KnowledgeBase;
use verdict_session::{
    HaltCause, QueryOutcome, SessionController, SessionState, StaticPersonaSource,
};
use verdict_types::{
    Consequent, Constitution, DomainId, GovernancePolicy, Literal, Persona, Proposition, Rule,
    RuleId, SourceId, Statement,
};

const DOMAIN: &str = "general";

fn stmt(text: &str) -> Statement {
    text.parse().unwrap()
}

fn persona() -> Persona {
    Persona {
        id: "default".into(),
        name: "Verdict".into(),
        archetype: "General Assistant".into(),
        domains: vec![DomainId::new(DOMAIN)],
        allow_inference: true,
        inference_depth: 3,
        skills_enabled: vec!["data_query".into()],
        skills_disabled: vec![],
        policy: GovernancePolicy::default(),
        evolution_enabled: false,
    }
}

fn fact(kb: &mut KnowledgeBase, text: &str, value: bool) {
    kb.assert_fact(Proposition::asserted(
        stmt(text),
        value,
        DomainId::new(DOMAIN),
        SourceId::new("test"),
    ))
    .unwrap();
}

fn rule(kb: &mut KnowledgeBase, id: &str, body: &[&str], head: &str, value: bool) {
    kb.assert_rule(Rule::new(
        RuleId::new(id),
        DomainId::new(DOMAIN),
        body.iter().map(|s| Literal::wants(stmt(s))).collect(),
        Consequent {
            statement: stmt(head),
            value,
        },
    ))
    .unwrap();
}

fn controller(kb: KnowledgeBase) -> SessionController<StaticPersonaSource> {
    let source = StaticPersonaSource::new().with_persona(persona(), kb);
    let mut c = SessionController::new(source, Constitution::builtin());
    c.switch_persona("default").unwrap();
    c
}

#[test]
fn determinism_repeated_resolution_is_identical() {
    let build = || {
        let mut kb = KnowledgeBase::new();
        fact(&mut kb, "parent(tom,bob)", true);
        fact(&mut kb, "parent(bob,ann)", true);
        rule(
            &mut kb,
            "grandparent",
            &["parent(X,Y)", "parent(Y,Z)"],
            "grandparent(X,Z)",
            true,
        );
        kb
    };

    for query in ["grandparent(tom,ann)", "parent(tom,X)", "nothing.known"] {
        let first = controller(build()).handle_query(query).unwrap();
        let second = controller(build()).handle_query(query).unwrap();
        let first = match first {
            QueryOutcome::Answer(a) => format!("{:?}|{:?}", a.conclusion, a.proof),
            QueryOutcome::Halted(h) => format!("{:?}|{}", h.cause, h.detail),
        };
        let second = match second {
            QueryOutcome::Answer(a) => format!("{:?}|{:?}", a.conclusion, a.proof),
            QueryOutcome::Halted(h) => format!("{:?}|{}", h.cause, h.detail),
        };
        assert_eq!(first, second, "query '{query}' resolved differently");
    }
}

#[test]
fn no_bypass_output_implies_governance_accept_entry() {
    let mut kb = KnowledgeBase::new();
    fact(&mut kb, "parent(tom,bob)", true);
    let mut c = controller(kb);

    let outcome = c.handle_query("parent(tom,bob)").unwrap();
    assert!(outcome.is_answer());

    let accepted = c
        .session()
        .unwrap()
        .audit()
        .entries()
        .iter()
        .any(|e| {
            e.check == "governance.verdict"
                && e.result == CheckResult::Pass
                && e.inputs.iter().any(|i| i == "query:parent(tom,bob)")
        });
    assert!(accepted, "answer released without a governance accept entry");
}

#[test]
fn audit_completeness_every_halt_has_one_terminal_entry() {
    // one controller per halt cause
    let scenarios: Vec<(KnowledgeBase, &str, HaltCause)> = vec![
        (KnowledgeBase::new(), "nothing.known", HaltCause::NoSolution),
        (
            {
                let mut kb = KnowledgeBase::new();
                fact(&mut kb, "a", true);
                fact(&mut kb, "b", true);
                rule(&mut kb, "r1", &["a"], "q", true);
                rule(&mut kb, "r2", &["b"], "q", false);
                kb
            },
            "q",
            HaltCause::Ambiguity,
        ),
        (
            {
                let mut kb = KnowledgeBase::new();
                fact(&mut kb, "a", true);
                rule(&mut kb, "r1", &["a"], "b", true);
                rule(&mut kb, "r2", &["b"], "c", true);
                rule(&mut kb, "r3", &["c"], "d", true);
                rule(&mut kb, "r4", &["d"], "e", true);
                kb
            },
            "e", // needs four applications, persona allows three
            HaltCause::DepthExceeded,
        ),
        (KnowledgeBase::new(), "", HaltCause::ConstraintViolation),
    ];

    for (kb, query, expected_cause) in scenarios {
        let mut c = controller(kb);
        match c.handle_query(query).unwrap() {
            QueryOutcome::Halted(report) => assert_eq!(report.cause, expected_cause),
            QueryOutcome::Answer(a) => panic!("expected halt for '{query}', got {a:?}"),
        }

        let terminal: Vec<_> = c
            .session()
            .unwrap()
            .audit()
            .entries()
            .iter()
            .filter(|e| e.check == "session.halt")
            .collect();
        assert_eq!(terminal.len(), 1, "cause {expected_cause:?}");
        assert_eq!(terminal[0].result, CheckResult::Fail);
        assert!(!terminal[0].detail.is_empty());
        assert_eq!(c.state(), Some(SessionState::Halt));
    }
}

#[test]
fn contradiction_detection_is_not_a_silent_overwrite() {
    let mut kb = KnowledgeBase::new();
    fact(&mut kb, "x", true);
    let err = kb.assert_fact(Proposition::asserted(
        stmt("x"),
        false,
        DomainId::new(DOMAIN),
        SourceId::new("test"),
    ));
    assert!(err.is_err(), "conflicting assertion must be flagged");
    assert_eq!(kb.contradiction_check().len(), 1);

    // any query touching x is a contradiction halt
    let mut c = controller(kb);
    match c.handle_query("x").unwrap() {
        QueryOutcome::Halted(report) => {
            assert_eq!(report.cause, HaltCause::Contradiction);
            assert!(report.detail.contains("x=true"));
            assert!(report.detail.contains("x=false"));
        }
        other => panic!("expected contradiction halt, got {other:?}"),
    }
}

#[test]
fn ambiguity_is_never_an_arbitrary_pick() {
    let mut kb = KnowledgeBase::new();
    fact(&mut kb, "a", true);
    fact(&mut kb, "b", true);
    rule(&mut kb, "r1", &["a"], "q", true);
    rule(&mut kb, "r2", &["b"], "q", false);

    let mut c = controller(kb);
    match c.handle_query("q").unwrap() {
        QueryOutcome::Halted(report) => {
            assert_eq!(report.cause, HaltCause::Ambiguity);
            assert!(report.detail.contains("q = true"));
            assert!(report.detail.contains("q = false"));
        }
        other => panic!("expected ambiguity halt, got {other:?}"),
    }
}

#[test]
fn depth_enforcement_never_truncates_into_a_partial_answer() {
    let mut kb = KnowledgeBase::new();
    fact(&mut kb, "s0", true);
    rule(&mut kb, "r1", &["s0"], "s1", true);
    rule(&mut kb, "r2", &["s1"], "s2", true);
    rule(&mut kb, "r3", &["s2"], "s3", true);
    rule(&mut kb, "r4", &["s3"], "s4", true);

    // persona depth is 3: s3 is reachable, s4 is not
    let mut c = controller(kb.clone());
    assert!(c.handle_query("s3").unwrap().is_answer());

    let mut c = controller(kb);
    match c.handle_query("s4").unwrap() {
        QueryOutcome::Halted(report) => assert_eq!(report.cause, HaltCause::DepthExceeded),
        other => panic!("expected depth halt, got {other:?}"),
    }
}

#[test]
fn unmet_antecedent_is_named_in_the_halt() {
    let mut kb = KnowledgeBase::new();
    fact(&mut kb, "a", true);
    rule(&mut kb, "r1", &["a", "b"], "c", true);

    let mut c = controller(kb);
    match c.handle_query("c").unwrap() {
        QueryOutcome::Halted(report) => {
            assert_eq!(report.cause, HaltCause::NoSolution);
            assert_eq!(report.detail, "unmet antecedent: b");
        }
        other => panic!("expected no-solution halt, got {other:?}"),
    }
}

#[test]
fn oversized_answer_is_rejected_quantitatively() {
    // a short query whose answer renders to ~5000 tokens against the
    // default 4096-token persona limit
    let long_fact = format!("blob({})", "a".repeat(20_000));
    let mut kb = KnowledgeBase::new();
    fact(&mut kb, &long_fact, true);

    let mut c = controller(kb);
    match c.handle_query("blob(X)").unwrap() {
        QueryOutcome::Halted(report) => {
            assert_eq!(report.cause, HaltCause::GovernanceRejection);
            assert!(report.detail.contains("quantitative check: length"));
        }
        other => panic!("expected governance rejection, got {other:?}"),
    }
}

#[test]
fn proof_travels_with_every_answer() {
    let mut kb = KnowledgeBase::new();
    fact(&mut kb, "parent(tom,bob)", true);
    fact(&mut kb, "parent(bob,ann)", true);
    rule(
        &mut kb,
        "grandparent",
        &["parent(X,Y)", "parent(Y,Z)"],
        "grandparent(X,Z)",
        true,
    );

    let mut c = controller(kb);
    match c.handle_query("grandparent(tom,ann)").unwrap() {
        QueryOutcome::Answer(answer) => {
            assert!(!answer.proof.is_empty());
            let conclusion = answer.proof.conclusion().unwrap();
            assert_eq!(conclusion.statement(), &stmt("grandparent(tom,ann)"));
        }
        other => panic!("expected answer, got {other:?}"),
    }
}
