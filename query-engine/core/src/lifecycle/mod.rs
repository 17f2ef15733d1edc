//! Schema generation lifecycle: build, publish, reload, and retire. Each
//! generation owns its resources and an atomic reference count; a
//! superseded generation is disposed only once the last in-flight request
//! referencing it completes. Reloads are serialized and never take down
//! the active generation on failure.

mod catalog_loader;

pub use catalog_loader::CatalogSchemaLoader;

use crate::CoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use schema::{QuerySchema, QuerySchemaRef};
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    None,
    Loading,
    Active,
    Reloading,
}

/// Status information the schema endpoints expose.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    pub state: SchemaState,
    pub load_date: DateTime<Utc>,
    pub generation: u64,
}

/// Builds one schema generation; implemented over the metadata accessor
/// and the schema builder by the wiring outside the core.
#[async_trait]
pub trait SchemaLoader: Send + Sync {
    async fn load(&self) -> CoreResult<(QuerySchema, ResourceScope)>;
}

/// The resources a generation owns (its connection scope). Dropped exactly
/// once, when the generation retires with no requests in flight.
#[derive(Default)]
pub struct ResourceScope {
    resources: Mutex<Option<Box<dyn Any + Send + Sync>>>,
}

impl ResourceScope {
    pub fn new(resources: Box<dyn Any + Send + Sync>) -> Self {
        ResourceScope {
            resources: Mutex::new(Some(resources)),
        }
    }

    pub fn empty() -> Self {
        ResourceScope::default()
    }

    fn dispose(&self) -> bool {
        self.resources.lock().take().is_some()
    }
}

/// One published schema generation.
pub struct SchemaGeneration {
    pub number: u64,
    pub schema: QuerySchemaRef,
    pub load_date: DateTime<Utc>,

    refcount: AtomicUsize,
    retired: AtomicBool,
    resources: ResourceScope,
}

impl SchemaGeneration {
    pub fn in_flight(&self) -> usize {
        self.refcount.load(Ordering::SeqCst)
    }

    fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
        self.dispose_if_idle();
    }

    fn dispose_if_idle(&self) {
        if self.retired.load(Ordering::SeqCst)
            && self.refcount.load(Ordering::SeqCst) == 0
            && self.resources.dispose()
        {
            tracing::info!(generation = self.number, "schema generation disposed");
        }
    }
}

/// Keeps a generation alive for the duration of one request.
pub struct GenerationGuard {
    generation: Arc<SchemaGeneration>,
}

impl GenerationGuard {
    pub fn schema(&self) -> &QuerySchema {
        &self.generation.schema
    }

    pub fn schema_ref(&self) -> QuerySchemaRef {
        self.generation.schema.clone()
    }

    pub fn generation(&self) -> &SchemaGeneration {
        &self.generation
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.generation.refcount.fetch_sub(1, Ordering::SeqCst);
        self.generation.dispose_if_idle();
    }
}

/// Owns the active generation pointer and the reload procedure.
pub struct LifecycleManager {
    loader: Box<dyn SchemaLoader>,
    active: RwLock<Option<Arc<SchemaGeneration>>>,
    retired: Mutex<Vec<Arc<SchemaGeneration>>>,
    reload_lock: tokio::sync::Mutex<()>,
    state: Mutex<(SchemaState, DateTime<Utc>)>,
    generations: AtomicU64,
}

impl LifecycleManager {
    pub fn new(loader: Box<dyn SchemaLoader>) -> Self {
        LifecycleManager {
            loader,
            active: RwLock::new(None),
            retired: Mutex::new(Vec::new()),
            reload_lock: tokio::sync::Mutex::new(()),
            state: Mutex::new((SchemaState::None, Utc::now())),
            generations: AtomicU64::new(0),
        }
    }

    /// Acquire the active generation for one request. The guard holds the
    /// reference count until dropped.
    pub fn acquire(&self) -> Option<GenerationGuard> {
        let active = self.active.read();
        let generation = active.as_ref()?.clone();

        generation.refcount.fetch_add(1, Ordering::SeqCst);

        Some(GenerationGuard { generation })
    }

    pub fn context(&self) -> SchemaContext {
        let (state, load_date) = *self.state.lock();

        SchemaContext {
            state,
            load_date,
            generation: self.generations.load(Ordering::SeqCst),
        }
    }

    /// Build and publish the next generation. Serialized against other
    /// reloads; on failure the previous generation stays active.
    pub async fn reload(&self) -> CoreResult<SchemaContext> {
        let _serialized = self.reload_lock.lock().await;

        {
            let mut state = self.state.lock();
            state.0 = if self.active.read().is_some() {
                SchemaState::Reloading
            } else {
                SchemaState::Loading
            };
        }

        match self.loader.load().await {
            Ok((schema, resources)) => {
                let number = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
                let generation = Arc::new(SchemaGeneration {
                    number,
                    schema: Arc::new(schema),
                    load_date: Utc::now(),
                    refcount: AtomicUsize::new(0),
                    retired: AtomicBool::new(false),
                    resources,
                });

                let previous = self.active.write().replace(generation);

                if let Some(previous) = previous {
                    previous.retire();
                    self.retired.lock().push(previous);
                }

                self.sweep_retired();

                let context = {
                    let mut state = self.state.lock();
                    *state = (SchemaState::Active, Utc::now());

                    SchemaContext {
                        state: SchemaState::Active,
                        load_date: state.1,
                        generation: number,
                    }
                };

                tracing::info!(generation = number, "schema generation published");

                Ok(context)
            }
            Err(error) => {
                tracing::error!(error = %error, "schema reload failed, keeping previous generation");

                let mut state = self.state.lock();
                state.0 = if self.active.read().is_some() {
                    SchemaState::Active
                } else {
                    SchemaState::None
                };

                Err(error)
            }
        }
    }

    /// Drop retired generations whose last request has finished.
    fn sweep_retired(&self) {
        self.retired.lock().retain(|generation| {
            generation.dispose_if_idle();
            generation.in_flight() > 0
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::QuerySchema;
    use std::sync::atomic::AtomicUsize;

    struct CountingLoader {
        loads: AtomicUsize,
        fail: AtomicBool,
        disposal_flags: Mutex<Vec<Arc<AtomicBool>>>,
    }

    /// Flips its flag when the generation's resource scope drops it.
    struct FlagResource(Arc<AtomicBool>);

    impl Drop for FlagResource {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SchemaLoader for CountingLoader {
        async fn load(&self) -> CoreResult<(QuerySchema, ResourceScope)> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(crate::CoreError::argument("catalog unavailable"));
            }

            self.loads.fetch_add(1, Ordering::SeqCst);

            let flag = Arc::new(AtomicBool::new(false));
            self.disposal_flags.lock().push(flag.clone());

            Ok((
                QuerySchema::default(),
                ResourceScope::new(Box::new(FlagResource(flag))),
            ))
        }
    }

    fn manager() -> (Arc<LifecycleManager>, Arc<CountingLoader>) {
        let loader = Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            disposal_flags: Mutex::new(Vec::new()),
        });

        struct Forward(Arc<CountingLoader>);

        #[async_trait]
        impl SchemaLoader for Forward {
            async fn load(&self) -> CoreResult<(QuerySchema, ResourceScope)> {
                self.0.load().await
            }
        }

        (
            Arc::new(LifecycleManager::new(Box::new(Forward(loader.clone())))),
            loader,
        )
    }

    #[tokio::test]
    async fn startup_publishes_generation_one() {
        let (manager, _) = manager();

        assert_eq!(manager.context().state, SchemaState::None);
        assert!(manager.acquire().is_none());

        let context = manager.reload().await.unwrap();

        assert_eq!(context.state, SchemaState::Active);
        assert_eq!(context.generation, 1);
        assert!(manager.acquire().is_some());
    }

    #[tokio::test]
    async fn failed_reload_keeps_the_previous_generation() {
        let (manager, loader) = manager();

        manager.reload().await.unwrap();
        loader.fail.store(true, Ordering::SeqCst);

        assert!(manager.reload().await.is_err());
        assert_eq!(manager.context().state, SchemaState::Active);

        let guard = manager.acquire().unwrap();
        assert_eq!(guard.generation().number, 1);
    }

    #[tokio::test]
    async fn superseded_generations_dispose_only_after_the_last_guard_drops() {
        let (manager, loader) = manager();

        manager.reload().await.unwrap();
        let in_flight = manager.acquire().unwrap();
        assert_eq!(in_flight.generation().number, 1);

        manager.reload().await.unwrap();

        // Generation 1 is superseded but still referenced.
        let first_flag = loader.disposal_flags.lock()[0].clone();
        assert!(!first_flag.load(Ordering::SeqCst));

        // New requests land on generation 2.
        let fresh = manager.acquire().unwrap();
        assert_eq!(fresh.generation().number, 2);

        drop(in_flight);
        assert!(first_flag.load(Ordering::SeqCst));

        // The active generation's resources are untouched.
        let second_flag = loader.disposal_flags.lock()[1].clone();
        assert!(!second_flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn disposal_happens_exactly_once() {
        let (manager, loader) = manager();

        manager.reload().await.unwrap();
        let guard_a = manager.acquire().unwrap();
        let guard_b = manager.acquire().unwrap();

        manager.reload().await.unwrap();

        let flag = loader.disposal_flags.lock()[0].clone();

        drop(guard_a);
        assert!(!flag.load(Ordering::SeqCst));

        drop(guard_b);
        assert!(flag.load(Ordering::SeqCst));

        // A later sweep finds nothing left to dispose.
        manager.reload().await.unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 3);
    }
}
