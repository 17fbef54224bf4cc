use crate::commands::command::Command;

/// Commands by name, kept in registration order for help output.
#[derive(Default)]
pub struct Registry {
    commands: Vec<Box<dyn Command>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `command` under its own name. A later registration with the
    /// same name replaces the earlier one in place.
    pub fn register(&mut self, command: Box<dyn Command>) {
        match self
            .commands
            .iter()
            .position(|existing| existing.name() == command.name())
        {
            Some(idx) => self.commands[idx] = command,
            None => self.commands.push(command),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .map(Box::as_ref)
    }

    pub fn list(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(Box::as_ref)
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|command| command.name()).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppContext;
    use anyhow::Result;
    use std::collections::BTreeSet;

    struct Named(&'static str, &'static str);

    impl Command for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            self.1
        }

        fn execute(&self, _ctx: &mut AppContext, _args: &[String]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = Registry::new();
        registry.register(Box::new(Named("ls", "first")));
        registry.register(Box::new(Named("cd", "change")));
        registry.register(Box::new(Named("ls", "second")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("ls").map(|c| c.description()), Some("second"));
        assert!(registry.lookup("rm").is_none());
    }

    #[test]
    fn lists_every_registered_command() {
        let mut registry = Registry::new();
        for name in ["pwd", "ls", "cd"] {
            registry.register(Box::new(Named(name, "")));
        }
        let names: BTreeSet<_> = registry.list().map(|c| c.name()).collect();
        assert_eq!(names, BTreeSet::from(["cd", "ls", "pwd"]));
    }
}
