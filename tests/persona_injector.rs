// tests/persona_injector.rs
// Trigger policy, provider fallback and system prompt injection


use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use dynamic_persona::llm::Message;
use dynamic_persona::persona::TIMESTAMP_FORMAT;
use dynamic_persona::{
    InjectionOutcome, PersonaConfig, PersonaError, PersonaInjector, ProviderRequest,
    SessionCounters,
};
use test_helpers::{MockGenerator, MockRegistry, capture_logs, injector_with};

fn request(prompt: &str, system: &str) -> ProviderRequest {
    ProviderRequest::new(prompt).with_system_prompt(system)
}

// ============================================================================
// Counting and cadence
// ============================================================================

#[tokio::test]
async fn counter_equals_number_of_enabled_requests() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    for _ in 0..5 {
        injector.on_request("s1", &mut request("hi", "")).await;
    }
    assert_eq!(injector.session_count("s1"), Some(5));
    assert_eq!(injector.session_count("s2"), None);
}

#[tokio::test]
async fn disabled_injector_is_inert() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default().with_enabled(false), &generator);

    let mut req = request("hi", "Be helpful.");
    let before = req.clone();
    let outcome = injector.process("s1", &mut req).await;

    assert!(matches!(outcome, InjectionOutcome::Disabled));
    assert_eq!(req, before);
    assert_eq!(injector.session_count("s1"), None);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn default_frequency_triggers_every_request() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    for _ in 0..3 {
        let outcome = injector.process("s1", &mut request("hi", "")).await;
        assert!(outcome.is_injected());
    }
    assert_eq!(generator.call_count(), 3);
}

#[tokio::test]
async fn triggers_only_on_multiples_of_frequency() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default().with_update_frequency(3), &generator);

    let mut injected_at = Vec::new();
    for _ in 0..7 {
        let mut req = request("hi", "Base.");
        let outcome = injector.process("s1", &mut req).await;
        match outcome {
            InjectionOutcome::Injected { count, .. } => {
                assert_eq!(req.system_prompt.as_deref(), Some("Persona\nBase."));
                injected_at.push(count);
            }
            InjectionOutcome::Skipped { .. } => {
                assert_eq!(req.system_prompt.as_deref(), Some("Base."));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
    assert_eq!(injected_at, vec![3, 6]);
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn sessions_are_counted_independently() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default().with_update_frequency(2), &generator);

    injector.on_request("a", &mut request("hi", "")).await;
    let outcome = injector.process("b", &mut request("hi", "")).await;
    assert!(matches!(outcome, InjectionOutcome::Skipped { count: 1 }));

    let outcome = injector.process("a", &mut request("hi", "")).await;
    assert!(outcome.is_injected());
}

#[tokio::test]
async fn injectors_can_share_a_counter_table() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let counters = Arc::new(SessionCounters::new());
    let registry = MockRegistry::new().with_default(generator.clone()).shared();
    let first = PersonaInjector::with_counters(PersonaConfig::default(), registry.clone(), counters.clone());
    let second = PersonaInjector::with_counters(PersonaConfig::default(), registry, counters.clone());

    first.on_request("s1", &mut request("hi", "")).await;
    second.on_request("s1", &mut request("hi", "")).await;
    assert_eq!(counters.get("s1"), Some(2));
}

// ============================================================================
// Injection
// ============================================================================

#[tokio::test]
async fn persona_is_trimmed_and_prepended() {
    let generator = MockGenerator::replying("gen", " Cheerful guide ").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = request("hello", "Be helpful.");
    injector.on_request("s1", &mut req).await;
    assert_eq!(req.system_prompt.as_deref(), Some("Cheerful guide\nBe helpful."));
}

#[tokio::test]
async fn absent_system_prompt_becomes_persona() {
    let generator = MockGenerator::replying("gen", "Cheerful guide").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = ProviderRequest::new("hello");
    injector.on_request("s1", &mut req).await;
    assert_eq!(req.system_prompt.as_deref(), Some("Cheerful guide"));
}

#[tokio::test]
async fn multiline_persona_is_collapsed() {
    let generator = MockGenerator::replying("gen", "\nYou are calm.\nYou are brief.\n").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = request("hello", "Rules.");
    injector.on_request("s1", &mut req).await;
    assert_eq!(
        req.system_prompt.as_deref(),
        Some("You are calm. You are brief.\nRules.")
    );
}

#[tokio::test]
async fn whitespace_only_output_leaves_request_unchanged() {
    let (logs, _guard) = capture_logs();
    let generator = MockGenerator::replying("gen", " \n\t\n ").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = request("hello", "Be helpful.");
    let outcome = injector.process("s1", &mut req).await;

    assert!(matches!(
        outcome,
        InjectionOutcome::Failed {
            error: PersonaError::EmptyResult,
            ..
        }
    ));
    assert_eq!(req.system_prompt.as_deref(), Some("Be helpful."));
    assert!(
        logs.lines_at("WARN")
            .iter()
            .any(|l| l.contains("empty content"))
    );
}

#[tokio::test]
async fn only_system_prompt_is_modified() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = request("hello", "Base.").with_contexts(vec![
        Message::user("earlier"),
        Message::assistant("reply"),
    ]);
    req.image_urls = vec!["https://example.com/cat.png".into()];
    let before = req.clone();

    injector.on_request("s1", &mut req).await;
    assert_eq!(req.prompt, before.prompt);
    assert_eq!(req.contexts, before.contexts);
    assert_eq!(req.image_urls, before.image_urls);
    assert_ne!(req.system_prompt, before.system_prompt);
}

// ============================================================================
// Generation request
// ============================================================================

#[tokio::test]
async fn generation_envelope_is_bare() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = request("What's up?", "Base.").with_contexts(vec![Message::user("earlier")]);
    injector.on_request("s1", &mut req).await;

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].history.is_empty());
    assert!(calls[0].system_prompt.is_empty());
    assert!(calls[0].prompt.contains("- User's latest message: \"What's up?\""));
}

#[tokio::test]
async fn include_time_false_omits_timestamp() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default().with_include_time(false), &generator);

    injector.on_request("s1", &mut request("Tell me a joke", "")).await;
    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("Tell me a joke"));
    assert!(!prompt.contains("Current time"));
}

#[tokio::test]
async fn include_time_appends_local_timestamp() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    injector.on_request("s1", &mut request("Tell me a joke", "")).await;
    let prompt = generator.last_prompt().unwrap();
    let marker = "- Current time: ";
    let start = prompt.find(marker).expect("timestamp line") + marker.len();
    let stamp: String = prompt[start..].chars().take(19).collect();
    assert!(NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok(), "{stamp}");
}

#[tokio::test]
async fn custom_template_is_rendered() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let config = PersonaConfig::default()
        .with_include_time(false)
        .with_generation_prompt("Reply as JSON {{\"persona\": ...}}\n{context_info}");
    let injector = injector_with(config, &generator);

    injector.on_request("s1", &mut request("hi", "")).await;
    assert_eq!(
        generator.last_prompt().unwrap(),
        "Reply as JSON {\"persona\": ...}\n- User's latest message: \"hi\""
    );
}

#[tokio::test]
async fn broken_template_fails_without_calling_generator() {
    let (logs, _guard) = capture_logs();
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let config = PersonaConfig::default().with_generation_prompt("Hello {user_name}");
    let injector = injector_with(config, &generator);

    let mut req = request("hi", "Base.");
    let outcome = injector.process("s1", &mut req).await;

    assert!(matches!(
        outcome,
        InjectionOutcome::Failed {
            count: 1,
            error: PersonaError::Template(_)
        }
    ));
    assert_eq!(req.system_prompt.as_deref(), Some("Base."));
    assert_eq!(generator.call_count(), 0);
    assert!(logs.lines_at("ERROR").iter().any(|l| l.contains("user_name")));
}

// ============================================================================
// Provider resolution
// ============================================================================

#[tokio::test]
async fn configured_provider_is_preferred() {
    let named = MockGenerator::replying("named", "Named persona").shared();
    let default = MockGenerator::replying("default", "Default persona").shared();
    let registry = MockRegistry::new()
        .with_provider(named.clone())
        .with_default(default.clone())
        .shared();
    let injector = PersonaInjector::new(PersonaConfig::default().with_provider_id("named"), registry);

    let mut req = request("hi", "");
    injector.on_request("s1", &mut req).await;
    assert_eq!(req.system_prompt.as_deref(), Some("Named persona"));
    assert_eq!(named.call_count(), 1);
    assert_eq!(default.call_count(), 0);
}

#[tokio::test]
async fn missing_provider_falls_back_with_warning() {
    let (logs, _guard) = capture_logs();
    let default = MockGenerator::replying("default", "Default persona").shared();
    let registry = MockRegistry::new().with_default(default.clone()).shared();
    let injector = PersonaInjector::new(PersonaConfig::default().with_provider_id("missing"), registry);

    let mut req = request("hi", "Base.");
    injector.on_request("s1", &mut req).await;

    assert_eq!(req.system_prompt.as_deref(), Some("Default persona\nBase."));
    assert_eq!(default.call_count(), 1);
    let warnings = logs.lines_at("WARN");
    assert!(
        warnings
            .iter()
            .any(|l| l.contains("Persona provider not found") && l.contains("missing")),
        "warnings: {:?}",
        warnings
    );
}

#[tokio::test]
async fn no_provider_at_all_logs_error() {
    let (logs, _guard) = capture_logs();
    let injector = PersonaInjector::new(
        PersonaConfig::default().with_provider_id("missing"),
        MockRegistry::new().shared(),
    );

    let mut req = request("hi", "Base.");
    let outcome = injector.process("s1", &mut req).await;

    assert!(matches!(
        outcome,
        InjectionOutcome::Failed {
            error: PersonaError::NoProvider,
            ..
        }
    ));
    assert_eq!(req.system_prompt.as_deref(), Some("Base."));
    assert_eq!(injector.session_count("s1"), Some(1));
    assert!(!logs.lines_at("WARN").is_empty());
    assert!(
        logs.lines_at("ERROR")
            .iter()
            .any(|l| l.contains("no LLM provider available"))
    );
}

#[tokio::test]
async fn generator_error_leaves_request_unchanged() {
    let (logs, _guard) = capture_logs();
    let generator = MockGenerator::failing("gen", "rate limited").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = request("hi", "Base.");
    let outcome = injector.process("s1", &mut req).await;

    assert!(matches!(
        outcome,
        InjectionOutcome::Failed {
            error: PersonaError::Generation(_),
            ..
        }
    ));
    assert_eq!(req.system_prompt.as_deref(), Some("Base."));
    assert_eq!(generator.call_count(), 1);
    assert!(logs.lines_at("ERROR").iter().any(|l| l.contains("rate limited")));
}

// ============================================================================
// Lifecycle and concurrency
// ============================================================================

#[tokio::test]
async fn terminate_is_idempotent_and_resets_sessions() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default().with_update_frequency(2), &generator);

    injector.on_request("s1", &mut request("hi", "")).await;
    injector.on_request("s1", &mut request("hi", "")).await;
    assert_eq!(injector.session_count("s1"), Some(2));

    injector.terminate();
    injector.terminate();
    assert_eq!(injector.session_count("s1"), None);

    let outcome = injector.process("s1", &mut request("hi", "")).await;
    assert!(matches!(outcome, InjectionOutcome::Skipped { count: 1 }));
}

#[tokio::test]
async fn terminate_on_fresh_injector_is_harmless() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = injector_with(PersonaConfig::default(), &generator);
    injector.terminate();
    assert_eq!(injector.session_count("anything"), None);
}

#[tokio::test]
async fn overlapping_triggers_do_not_stack() {
    // First call finishes last
    let generator = MockGenerator::replying("gen", "unused")
        .then_reply("A", Duration::from_millis(60))
        .then_reply("B", Duration::from_millis(5))
        .shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut first = request("one", "S");
    let mut second = request("two", "S");
    let (a, b) = tokio::join!(
        injector.process("s1", &mut first),
        injector.process("s1", &mut second),
    );

    assert!(a.is_injected() && b.is_injected());
    assert_eq!(first.system_prompt.as_deref(), Some("A\nS"));
    assert_eq!(second.system_prompt.as_deref(), Some("B\nS"));
    assert_eq!(injector.session_count("s1"), Some(2));
}

#[tokio::test]
async fn cancelled_generation_leaves_request_unchanged() {
    let (logs, _guard) = capture_logs();
    let generator = MockGenerator::replying("gen", "Too late")
        .with_delay(Duration::from_secs(5))
        .shared();
    let injector = injector_with(PersonaConfig::default(), &generator);

    let mut req = request("hi", "Base.");
    let result =
        tokio::time::timeout(Duration::from_millis(50), injector.process("s1", &mut req)).await;

    assert!(result.is_err());
    assert_eq!(req.system_prompt.as_deref(), Some("Base."));
    assert_eq!(injector.session_count("s1"), Some(1));
    assert!(logs.lines_at("ERROR").iter().any(|l| l.contains("cancelled")));
}
