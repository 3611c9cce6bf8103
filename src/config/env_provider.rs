use std::collections::HashMap;

/// Source of environment variables
///
/// Settings read through this trait so tests can supply values without
/// mutating the process environment.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables for tests
#[derive(Debug, Default, Clone)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_vars(self, vars: &[(&str, &str)]) -> Self {
        vars.iter()
            .fold(self, |env, (key, value)| env.with_var(key, value))
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_environment_missing_var() {
        assert_eq!(SystemEnvironment.get_var("EQUIPLEND_SURELY_UNSET_98765"), None);
    }

    #[test]
    fn test_mock_environment_with_vars() {
        let provider = MockEnvironment::empty()
            .with_var("LOCK_THRESHOLD", "3")
            .with_vars(&[("KEY1", "value1"), ("KEY2", "value2")]);

        assert_eq!(provider.get_var("LOCK_THRESHOLD"), Some("3".to_string()));
        assert_eq!(provider.get_var("KEY2"), Some("value2".to_string()));
        assert_eq!(provider.get_var("KEY3"), None);
    }
}
