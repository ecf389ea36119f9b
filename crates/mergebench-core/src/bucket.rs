use serde::{Deserialize, Serialize};

/// A named tally plus the scenarios that contributed to it, in the order
/// they were classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricBucket {
    count: usize,
    scenarios: Vec<String>,
}

impl MetricBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scenario: impl Into<String>) {
        self.scenarios.push(scenario.into());
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn scenarios(&self) -> &[String] {
        &self.scenarios
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, scenario: &str) -> bool {
        self.scenarios.iter().any(|s| s == scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_count_and_order() {
        let mut bucket = MetricBucket::new();
        assert!(bucket.is_empty());
        bucket.push("s2");
        bucket.push("s1");
        assert_eq!(bucket.count(), 2);
        assert_eq!(bucket.scenarios(), ["s2".to_string(), "s1".to_string()]);
        assert!(bucket.contains("s1"));
        assert!(!bucket.contains("s3"));
    }
}
