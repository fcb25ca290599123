// tests/hook_pipeline.rs
// Persona hook running inside a host hook pipeline


use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dynamic_persona::hooks::{PERSONA_HOOK_PRIORITY, PLUGIN_NAME, PLUGIN_VERSION};
use dynamic_persona::{HookPipeline, LlmRequestHook, PersonaConfig, ProviderRequest};
use test_helpers::{MockGenerator, injector_with};

/// Records the system prompt it sees, then appends its own marker
struct ObserverHook {
    name: &'static str,
    priority: i32,
    seen: Arc<Mutex<Vec<Option<String>>>>,
}

#[async_trait]
impl LlmRequestHook for ObserverHook {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn on_llm_request(&self, _session_id: &str, request: &mut ProviderRequest) {
        self.seen.lock().unwrap().push(request.system_prompt.clone());
    }
}

#[test]
fn plugin_metadata() {
    assert_eq!(PLUGIN_NAME, "dynamic_persona");
    assert_eq!(PLUGIN_VERSION, env!("CARGO_PKG_VERSION"));
    assert_eq!(PERSONA_HOOK_PRIORITY, 100);
}

#[tokio::test]
async fn later_hooks_see_the_injected_persona() {
    let generator = MockGenerator::replying("gen", "Cheerful guide").shared();
    let injector = Arc::new(injector_with(PersonaConfig::default(), &generator));

    let before = Arc::new(Mutex::new(Vec::new()));
    let after = Arc::new(Mutex::new(Vec::new()));
    let pipeline = HookPipeline::new()
        .with_hook(Arc::new(ObserverHook {
            name: "after",
            priority: 10,
            seen: after.clone(),
        }))
        .with_hook(injector.clone())
        .with_hook(Arc::new(ObserverHook {
            name: "before",
            priority: 200,
            seen: before.clone(),
        }));

    assert_eq!(pipeline.hook_names(), vec!["before", PLUGIN_NAME, "after"]);

    let mut request = ProviderRequest::new("hello").with_system_prompt("Be helpful.");
    pipeline.dispatch("s1", &mut request).await;

    assert_eq!(*before.lock().unwrap(), vec![Some("Be helpful.".to_string())]);
    assert_eq!(
        *after.lock().unwrap(),
        vec![Some("Cheerful guide\nBe helpful.".to_string())]
    );
}

#[tokio::test]
async fn pipeline_terminate_clears_persona_counters() {
    let generator = MockGenerator::replying("gen", "Persona").shared();
    let injector = Arc::new(injector_with(PersonaConfig::default(), &generator));
    let pipeline = HookPipeline::new().with_hook(injector.clone());

    pipeline.dispatch("s1", &mut ProviderRequest::new("hi")).await;
    assert_eq!(injector.session_count("s1"), Some(1));

    pipeline.terminate();
    pipeline.terminate();
    assert_eq!(injector.session_count("s1"), None);
}

#[tokio::test]
async fn failing_persona_hook_does_not_stop_pipeline() {
    let generator = MockGenerator::failing("gen", "upstream down").shared();
    let injector = Arc::new(injector_with(PersonaConfig::default(), &generator));
    let after = Arc::new(Mutex::new(Vec::new()));
    let pipeline = HookPipeline::new()
        .with_hook(injector)
        .with_hook(Arc::new(ObserverHook {
            name: "after",
            priority: 0,
            seen: after.clone(),
        }));

    let mut request = ProviderRequest::new("hello").with_system_prompt("Base.");
    pipeline.dispatch("s1", &mut request).await;

    assert_eq!(request.system_prompt.as_deref(), Some("Base."));
    assert_eq!(*after.lock().unwrap(), vec![Some("Base.".to_string())]);
}
