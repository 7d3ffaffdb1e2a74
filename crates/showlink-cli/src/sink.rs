//! A projection sink that reports to the log and, optionally, stdout.

use std::collections::BTreeMap;

use showlink_core::{
    ConnectionStatus, FeedbackId, ProjectionSink, Snapshot, VariableValue, Variables,
};

/// Keeps the last value of every variable and reports changes.
#[derive(Debug, Default)]
pub struct LogSink {
    values: BTreeMap<String, VariableValue>,
    print: bool,
    status: Option<ConnectionStatus>,
}

impl LogSink {
    /// `print` echoes every changed variable to stdout as `name = value`.
    pub fn new(print: bool) -> Self {
        Self {
            print,
            ..Default::default()
        }
    }

    pub fn value(&self, name: &str) -> Option<&VariableValue> {
        self.values.get(name)
    }

    pub fn status(&self) -> Option<&ConnectionStatus> {
        self.status.as_ref()
    }

    /// Store `variables`, returning the names whose value changed.
    fn merge(&mut self, variables: &Variables) -> Vec<String> {
        let mut changed = Vec::new();
        for (name, value) in variables {
            if self.values.get(name) != Some(value) {
                self.values.insert(name.clone(), value.clone());
                changed.push(name.clone());
            }
        }
        changed
    }
}

impl ProjectionSink for LogSink {
    fn set_variables(&mut self, variables: &Variables) {
        for name in self.merge(variables) {
            let value = &self.values[&name];
            log::debug!("[VARS] {} = {}", name, value);
            if self.print {
                println!("{} = {}", name, value);
            }
        }
    }

    fn check_feedbacks(&mut self, ids: &[FeedbackId], snapshot: &Snapshot) {
        log::trace!("[FEEDBACK] recheck {:?} at version {}", ids, snapshot.version);
    }

    fn update_status(&mut self, status: &ConnectionStatus) {
        match status {
            ConnectionStatus::Ok | ConnectionStatus::Connecting => {
                log::info!("[STATUS] {}", status)
            }
            _ => log::warn!("[STATUS] {}", status),
        }
        self.status = Some(status.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, VariableValue)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_only_changes_are_reported() {
        let mut sink = LogSink::new(false);
        let first = vars(&[
            ("tempo", VariableValue::Number(120.0)),
            ("isPlaying", VariableValue::Bool(false)),
        ]);
        assert_eq!(sink.merge(&first).len(), 2);

        let second = vars(&[
            ("tempo", VariableValue::Number(120.0)),
            ("isPlaying", VariableValue::Bool(true)),
        ]);
        assert_eq!(sink.merge(&second), vec!["isPlaying".to_string()]);
        assert_eq!(sink.value("isPlaying"), Some(&VariableValue::Bool(true)));
    }

    #[test]
    fn test_status_is_kept() {
        let mut sink = LogSink::new(false);
        assert!(sink.status().is_none());
        sink.update_status(&ConnectionStatus::Connecting);
        sink.update_status(&ConnectionStatus::Ok);
        assert_eq!(sink.status(), Some(&ConnectionStatus::Ok));
    }
}
