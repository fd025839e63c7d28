// Modular translation architecture
//
// Two engine implementations sit behind the TranslationEngine trait:
// - Remote: one cloud API for every pair, accepts "auto" as source
// - Local: one pretrained model per language pair on a local inference server
//
// The orchestrator never talks to an engine directly; it goes through a
// PairCache which lazily creates and then reuses one engine per ordered
// (source, target) pair.

pub mod local;
pub mod remote;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{TranslateConfig, TranslationProvider};
use crate::error::Result;

/// Source language value understood by the remote engine when detection
/// should happen service-side.
pub const AUTO_SOURCE: &str = "auto";

/// Main trait for translation operations
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate text from source to target language code.
    async fn translate(&self, text: &str, source_code: &str, target_code: &str) -> Result<String>;
}

/// Creates the engine for one (source, target) pair on first use.
pub type EngineFactory =
    Box<dyn Fn(&str, &str) -> Result<Arc<dyn TranslationEngine>> + Send + Sync>;

/// Lazily-populated engine cache keyed by ordered language pair. At most one
/// engine is created per pair per process lifetime.
pub struct PairCache {
    engines: HashMap<(String, String), Arc<dyn TranslationEngine>>,
    factory: EngineFactory,
}

impl PairCache {
    pub fn new(factory: EngineFactory) -> Self {
        Self {
            engines: HashMap::new(),
            factory,
        }
    }

    /// Return the cached engine for the pair, creating it on first request.
    pub fn engine_for(&mut self, source: &str, target: &str) -> Result<Arc<dyn TranslationEngine>> {
        let key = (source.to_string(), target.to_string());
        if let Some(engine) = self.engines.get(&key) {
            return Ok(engine.clone());
        }

        let engine = (self.factory)(source, target)?;
        self.engines.insert(key, engine.clone());
        Ok(engine)
    }

    pub fn loaded_pairs(&self) -> usize {
        self.engines.len()
    }
}

/// Build the engine factory for the configured provider.
pub fn engine_factory(config: &TranslateConfig) -> Result<EngineFactory> {
    match config.provider {
        TranslationProvider::Cloud => {
            // One shared client serves every pair
            let engine: Arc<dyn TranslationEngine> =
                Arc::new(remote::RemoteTranslationEngine::new(config.clone())?);
            Ok(Box::new(move |_source, _target| Ok(engine.clone())))
        }
        TranslationProvider::Local => {
            let config = config.clone();
            Ok(Box::new(move |source, target| {
                let engine = local::LocalModelEngine::for_pair(config.clone(), source, target)?;
                Ok(Arc::new(engine) as Arc<dyn TranslationEngine>)
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoEngine;

    #[async_trait]
    impl TranslationEngine for EchoEngine {
        async fn translate(&self, text: &str, _s: &str, _t: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    #[test]
    fn test_pair_cache_creates_each_pair_once() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let factory: EngineFactory = Box::new(move |_s, _t| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EchoEngine) as Arc<dyn TranslationEngine>)
        });

        let mut cache = PairCache::new(factory);
        cache.engine_for("en", "es").unwrap();
        cache.engine_for("en", "es").unwrap();
        cache.engine_for("en", "fr").unwrap();
        cache.engine_for("fr", "en").unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 3);
        assert_eq!(cache.loaded_pairs(), 3);
    }
}
