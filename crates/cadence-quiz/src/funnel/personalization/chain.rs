/// First-match-wins selection over ordered predicate arms with a mandatory fallback.
pub(crate) struct PriorityChain<C, T> {
    arms: Vec<(fn(&C) -> bool, T)>,
    fallback: T,
}

impl<C, T> PriorityChain<C, T> {
    pub(crate) fn new(fallback: T) -> Self {
        Self {
            arms: Vec::new(),
            fallback,
        }
    }

    pub(crate) fn when(mut self, predicate: fn(&C) -> bool, value: T) -> Self {
        self.arms.push((predicate, value));
        self
    }

    pub(crate) fn resolve(self, context: &C) -> T {
        self.arms
            .into_iter()
            .find(|(predicate, _)| predicate(context))
            .map(|(_, value)| value)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::PriorityChain;

    #[test]
    fn earliest_matching_arm_wins() {
        let chain = PriorityChain::new("fallback")
            .when(|n: &u8| *n > 10, "large")
            .when(|n: &u8| *n > 5, "medium");

        assert_eq!(chain.resolve(&20), "large");
    }

    #[test]
    fn fallback_used_when_nothing_matches() {
        let chain = PriorityChain::new(None).when(|n: &u8| *n == 1, Some("one"));

        assert_eq!(chain.resolve(&2), None);
    }
}
