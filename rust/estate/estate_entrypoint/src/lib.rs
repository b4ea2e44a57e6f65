#![deny(missing_docs)]
//! Standardized initialization for every binary in the workspace.
//! Loads `.env`, installs the panic hook and picks the tracing output format for the [Environment].

use anyhow::anyhow;
use estate_env::Environment;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};
use tracing_tree::HierarchicalLayer;

/// describes how a binary should be initialized
#[derive(Debug)]
pub struct EstateEntrypoint {
    env: Environment,
    /// options that only apply in local dev
    local: LocalOptions,
}

impl Default for EstateEntrypoint {
    fn default() -> Self {
        EstateEntrypoint {
            env: Environment::new_or_prod(),
            local: Default::default(),
        }
    }
}

/// sentinel struct which guarantees that we called [EstateEntrypoint::init]
#[derive(Debug)]
pub struct InitializedEntrypoint(());

impl EstateEntrypoint {
    /// create a new instance of [Self] from an input [Environment]
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    /// consume self, initialize this binary, and return a proof that it was initialized
    pub fn init(self) -> anyhow::Result<InitializedEntrypoint> {
        dotenv::dotenv().ok();
        std::panic::set_hook(Box::new(tracing_panic::panic_hook));

        match (self.env, self.local) {
            (Environment::Local, LocalOptions { tree_tracing: None }) => {
                tracing_subscriber::fmt()
                    .with_ansi(true)
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .try_init()
                    .map_err(|e| anyhow!(e))?;
            }
            (
                Environment::Local,
                LocalOptions {
                    tree_tracing: Some(indent),
                },
            ) => {
                let subscriber = Registry::default()
                    .with(EnvFilter::from_default_env())
                    .with(HierarchicalLayer::new(indent));
                tracing::subscriber::set_global_default(subscriber)?;
            }
            (Environment::Production | Environment::Develop, _) => {
                tracing_subscriber::fmt()
                    .with_ansi(false)
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .try_init()
                    .map_err(|e| anyhow!(e))?;
            }
        }

        Ok(InitializedEntrypoint(()))
    }

    /// begin modifying the options for the local environment
    pub fn local(self) -> LocalOptionsBuilder {
        LocalOptionsBuilder {
            prev: self,
            next: Default::default(),
        }
    }
}

/// builder struct for modifying the local environment options
pub struct LocalOptionsBuilder {
    prev: EstateEntrypoint,
    next: LocalOptions,
}

impl LocalOptionsBuilder {
    /// render spans as an indented tree with the given indent width
    pub fn tree_tracing(mut self, indent: Option<usize>) -> Self {
        self.next.tree_tracing = indent;
        self
    }

    /// finish modifying the options for the local environment
    pub fn build(self) -> EstateEntrypoint {
        EstateEntrypoint {
            env: self.prev.env,
            local: self.next,
        }
    }
}

#[derive(Debug, Default)]
struct LocalOptions {
    tree_tracing: Option<usize>,
}
