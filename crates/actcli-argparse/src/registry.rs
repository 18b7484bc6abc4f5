use crate::action::ActionDef;
use crate::error::{CommandOptionError, CommandResult, DefinitionError};

/// Registered actions, in registration order, plus the optional global action.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    actions: Vec<ActionDef>,
    global: Option<ActionDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action.
    ///
    /// Fails when its name or alias is already taken by another action's
    /// name or alias. A global action replaces the current global one.
    pub fn register(&mut self, action: ActionDef) -> Result<(), DefinitionError> {
        if action.is_global() {
            self.set_global(action);
            return Ok(());
        }

        let mut keys = vec![action.name()];
        if let Some(alias) = action.alias().filter(|a| *a != action.name()) {
            keys.push(alias);
        }
        for key in keys {
            if let Some(existing) = self.find(key) {
                return Err(DefinitionError::DuplicateAction {
                    name: key.to_string(),
                    existing: existing.name().to_string(),
                });
            }
        }

        tracing::debug!(
            action = action.name(),
            alias = action.alias().unwrap_or_default(),
            options = action.options().len(),
            "registered action"
        );
        self.actions.push(action);
        Ok(())
    }

    pub fn set_global(&mut self, action: ActionDef) {
        tracing::debug!(options = action.options().len(), "registered global action");
        self.global = Some(action);
    }

    /// Look up an action by primary name, then by alias.
    pub fn find(&self, name: &str) -> Option<&ActionDef> {
        self.actions
            .iter()
            .find(|a| a.name() == name)
            .or_else(|| self.actions.iter().find(|a| a.alias() == Some(name)))
    }

    /// Like [`Registry::find`], failing with `<name>: unknown action.`.
    pub fn resolve(&self, name: &str) -> CommandResult<&ActionDef> {
        self.find(name)
            .ok_or_else(|| CommandOptionError::new(format!("{name}: unknown action.")))
    }

    pub fn global(&self) -> Option<&ActionDef> {
        self.global.as_ref()
    }

    pub fn actions(&self) -> &[ActionDef] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
