//! Ordered candidate list walked on fallover.

pub struct FallbackChain<'a> {
    candidates: &'a [String],
}

impl<'a> FallbackChain<'a> {
    pub fn new(candidates: &'a [String]) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + 'a {
        let candidates: &'a [String] = self.candidates;
        candidates.iter().map(|s| s.as_str())
    }

    /// Candidate to try after `current_failed_model`, or the head of the list
    /// when `current_failed_model` is unknown.
    pub fn next_after(&self, current_failed_model: &str) -> Option<&'a str> {
        let candidates: &'a [String] = self.candidates;
        let idx = candidates.iter().position(|r| r == current_failed_model);
        match idx {
            Some(i) => candidates.get(i + 1).map(|s| s.as_str()),
            None => candidates.first().map(|s| s.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<String> {
        vec!["A".into(), "B".into(), "C".into()]
    }

    #[test]
    fn test_next_after_follows_priority() {
        let list = abc();
        let chain = FallbackChain::new(&list);
        assert_eq!(chain.next_after("A"), Some("B"));
        assert_eq!(chain.next_after("B"), Some("C"));
        assert_eq!(chain.next_after("C"), None);
        assert_eq!(chain.next_after("unknown"), Some("A"));
    }

    #[test]
    fn test_iter_preserves_order() {
        let list = abc();
        let chain = FallbackChain::new(&list);
        assert_eq!(chain.iter().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(chain.len(), 3);
    }
}
