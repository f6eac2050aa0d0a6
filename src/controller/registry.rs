//! Explicit registration table of available controllers.

use std::fmt;

use super::{Controller, ControllerInfo, GameMode, RandomBot, SweepBot};

type Build = Box<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Builds fresh instances of one controller implementation.
pub struct ControllerFactory {
    info: ControllerInfo,
    build: Build,
}

impl ControllerFactory {
    pub fn new<F>(info: ControllerInfo, build: F) -> Self
    where
        F: Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    {
        Self {
            info,
            build: Box::new(build),
        }
    }

    pub fn info(&self) -> &ControllerInfo {
        &self.info
    }

    pub fn create(&self) -> Box<dyn Controller> {
        (self.build)()
    }
}

impl fmt::Debug for ControllerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerFactory")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Controllers known to a host, looked up by name.
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    factories: Vec<ControllerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the controllers shipped with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ControllerFactory::new(
            ControllerInfo::new(
                "random",
                env!("CARGO_PKG_VERSION"),
                &[GameMode::Classic, GameMode::MultiPlayer],
            ),
            || Box::new(RandomBot::new()) as Box<dyn Controller>,
        ));
        registry.register(ControllerFactory::new(
            ControllerInfo::new(
                "sweep",
                env!("CARGO_PKG_VERSION"),
                &[GameMode::Classic, GameMode::MultiPlayer],
            ),
            || Box::new(SweepBot::new()) as Box<dyn Controller>,
        ));
        registry
    }

    /// Add a factory. A later registration under the same name replaces the
    /// earlier one.
    pub fn register(&mut self, factory: ControllerFactory) {
        self.factories
            .retain(|existing| existing.info.name != factory.info.name);
        self.factories.push(factory);
    }

    pub fn get(&self, name: &str) -> Option<&ControllerFactory> {
        self.factories.iter().find(|f| f.info.name == name)
    }

    /// Build a controller by name together with its description.
    pub fn create(&self, name: &str) -> Option<(ControllerInfo, Box<dyn Controller>)> {
        self.get(name).map(|f| (f.info.clone(), f.create()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerInfo> {
        self.factories.iter().map(|f| &f.info)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
